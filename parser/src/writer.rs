//! Wire encoding for [`Message`]. Every field is written back in exactly the
//! form it was decoded from, so an unmodified message re-encodes to the same
//! bytes.

use crate::message::{
    Baseline, ClientData, ClientDataFlags, EntityUpdate, Message, QString, ServerInfo, Sound,
    SoundFlags, TempEntity, UPDATE_SIGNAL, UpdateFlags,
};
use crate::types::{Angle, Coord, Position};

trait WireWriter {
    fn byte(&mut self, v: u8);
    fn char(&mut self, v: i8);
    fn short(&mut self, v: i16);
    fn ushort(&mut self, v: u16);
    fn long(&mut self, v: i32);
    fn float(&mut self, v: f32);
    fn string(&mut self, s: &QString);
    fn coord(&mut self, c: Coord);
    fn angle(&mut self, a: Angle);
    fn position(&mut self, p: &Position);
}

impl WireWriter for Vec<u8> {
    fn byte(&mut self, v: u8) {
        self.push(v);
    }

    fn char(&mut self, v: i8) {
        self.push(v as u8);
    }

    fn short(&mut self, v: i16) {
        self.extend_from_slice(&v.to_le_bytes());
    }

    fn ushort(&mut self, v: u16) {
        self.extend_from_slice(&v.to_le_bytes());
    }

    fn long(&mut self, v: i32) {
        self.extend_from_slice(&v.to_le_bytes());
    }

    fn float(&mut self, v: f32) {
        self.extend_from_slice(&v.to_le_bytes());
    }

    fn string(&mut self, s: &QString) {
        self.extend_from_slice(s.as_bytes());
        self.push(0);
    }

    fn coord(&mut self, c: Coord) {
        self.short(c.0);
    }

    fn angle(&mut self, a: Angle) {
        self.char(a.0);
    }

    fn position(&mut self, p: &Position) {
        for c in p {
            self.coord(*c);
        }
    }
}

fn write_sound(out: &mut Vec<u8>, sound: &Sound) {
    out.byte(sound.flags.bits());
    if sound.flags.contains(SoundFlags::VOLUME) {
        out.byte(sound.volume.unwrap_or_default());
    }
    if sound.flags.contains(SoundFlags::ATTENUATION) {
        out.byte(sound.attenuation.unwrap_or_default());
    }
    out.ushort(sound.channel);
    out.byte(sound.sound);
    out.position(&sound.origin);
}

fn write_server_info(out: &mut Vec<u8>, info: &ServerInfo) {
    out.long(info.protocol);
    out.byte(info.max_clients);
    out.byte(info.game_type);
    out.string(&info.level_name);
    for model in &info.models {
        out.string(model);
    }
    out.byte(0);
    for sound in &info.sounds {
        out.string(sound);
    }
    out.byte(0);
}

fn write_client_data(out: &mut Vec<u8>, cd: &ClientData) {
    let flags = cd.flags;
    out.ushort(flags.bits());
    if flags.contains(ClientDataFlags::VIEWHEIGHT) {
        out.char(cd.view_height.unwrap_or_default());
    }
    if flags.contains(ClientDataFlags::IDEALPITCH) {
        out.char(cd.ideal_pitch.unwrap_or_default());
    }
    for axis in 0..3 {
        if flags.contains(ClientDataFlags::PUNCHES[axis]) {
            out.char(cd.punch[axis].unwrap_or_default());
        }
        if flags.contains(ClientDataFlags::VELOCITIES[axis]) {
            out.char(cd.velocity[axis].unwrap_or_default());
        }
    }
    out.long(cd.items);
    if flags.contains(ClientDataFlags::WEAPONFRAME) {
        out.byte(cd.weapon_frame());
    }
    if flags.contains(ClientDataFlags::ARMOR) {
        out.byte(cd.armor.unwrap_or_default());
    }
    if flags.contains(ClientDataFlags::WEAPON) {
        out.byte(cd.weapon_model());
    }
    out.short(cd.health);
    out.byte(cd.ammo);
    out.byte(cd.shells);
    out.byte(cd.nails);
    out.byte(cd.rockets);
    out.byte(cd.cells);
    out.byte(cd.active_weapon);
}

fn write_baseline(out: &mut Vec<u8>, baseline: &Baseline) {
    out.byte(baseline.model);
    out.byte(baseline.frame);
    out.byte(baseline.colormap);
    out.byte(baseline.skin);
    for axis in 0..3 {
        out.coord(baseline.origin[axis]);
        out.angle(baseline.angles[axis]);
    }
}

fn write_temp_entity(out: &mut Vec<u8>, te: &TempEntity) {
    out.byte(te.kind());
    match te {
        TempEntity::Point { origin, .. } => out.position(origin),
        TempEntity::Beam {
            entity, start, end, ..
        } => {
            out.ushort(entity.raw());
            out.position(start);
            out.position(end);
        }
        TempEntity::Explosion2 {
            origin,
            color_start,
            color_length,
        } => {
            out.position(origin);
            out.byte(*color_start);
            out.byte(*color_length);
        }
    }
}

fn write_entity_update(out: &mut Vec<u8>, update: &EntityUpdate) {
    let flags = update.flags;
    let bits = flags.bits();
    out.byte((bits as u8 & !UPDATE_SIGNAL) | UPDATE_SIGNAL);
    if flags.contains(UpdateFlags::MOREBITS) {
        out.byte((bits >> 8) as u8);
    }

    if flags.contains(UpdateFlags::LONGENTITY) {
        out.ushort(update.entity.raw());
    } else {
        out.byte(update.entity.raw() as u8);
    }

    let optional_bytes = [
        (UpdateFlags::MODEL, update.model),
        (UpdateFlags::FRAME, update.frame),
        (UpdateFlags::COLORMAP, update.colormap),
        (UpdateFlags::SKIN, update.skin),
        (UpdateFlags::EFFECTS, update.effects),
    ];
    for (flag, value) in optional_bytes {
        if flags.contains(flag) {
            out.byte(value.unwrap_or_default());
        }
    }

    for axis in 0..3 {
        if flags.contains(UpdateFlags::ORIGINS[axis]) {
            out.coord(update.origin[axis].unwrap_or_default());
        }
        if flags.contains(UpdateFlags::ANGLES[axis]) {
            out.angle(update.angles[axis].unwrap_or_default());
        }
    }
}

impl Message {
    /// Append the wire encoding of this message to `out`.
    pub fn write_to(&self, out: &mut Vec<u8>) {
        if let Message::EntityUpdate(update) = self {
            write_entity_update(out, update);
            return;
        }

        if let Some(command) = self.command() {
            out.byte(command as u8);
        }

        match self {
            Message::Nop
            | Message::Disconnect
            | Message::KilledMonster
            | Message::FoundSecret
            | Message::Intermission
            | Message::SellScreen
            | Message::EntityUpdate(_) => {}
            Message::UpdateStat { stat, value } => {
                out.byte(*stat);
                out.long(*value);
            }
            Message::Version(version) => out.long(*version),
            Message::SetView(entity) => out.ushort(entity.raw()),
            Message::Sound(sound) => write_sound(out, sound),
            Message::Time(time) => out.float(time.seconds()),
            Message::Print(s)
            | Message::StuffText(s)
            | Message::CenterPrint(s)
            | Message::Finale(s)
            | Message::Cutscene(s) => out.string(s),
            Message::SetAngle(angles) => {
                for a in angles {
                    out.angle(*a);
                }
            }
            Message::ServerInfo(info) => write_server_info(out, info),
            Message::LightStyle { style, pattern } => {
                out.byte(*style);
                out.string(pattern);
            }
            Message::UpdateName { player, name } => {
                out.byte(*player);
                out.string(name);
            }
            Message::UpdateFrags { player, frags } => {
                out.byte(*player);
                out.short(*frags);
            }
            Message::ClientData(cd) => write_client_data(out, cd),
            Message::StopSound(channel) => out.ushort(*channel),
            Message::UpdateColors { player, colors } => {
                out.byte(*player);
                out.byte(*colors);
            }
            Message::Particle {
                origin,
                direction,
                count,
                color,
            } => {
                out.position(origin);
                for d in direction {
                    out.char(*d);
                }
                out.byte(*count);
                out.byte(*color);
            }
            Message::Damage {
                armor,
                blood,
                origin,
            } => {
                out.byte(*armor);
                out.byte(*blood);
                out.position(origin);
            }
            Message::SpawnStatic(baseline) => write_baseline(out, baseline),
            Message::SpawnBaseline { entity, baseline } => {
                out.ushort(entity.raw());
                write_baseline(out, baseline);
            }
            Message::TempEntity(te) => write_temp_entity(out, te),
            Message::SetPause(paused) => out.byte(*paused),
            Message::SignonNum(num) => out.byte(*num),
            Message::SpawnStaticSound {
                origin,
                sound,
                volume,
                attenuation,
            } => {
                out.position(origin);
                out.byte(*sound);
                out.byte(*volume);
                out.byte(*attenuation);
            }
            Message::CdTrack { track, loop_track } => {
                out.byte(*track);
                out.byte(*loop_track);
            }
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.write_to(&mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use crate::message::{ServerCommand, parse_message, parse_messages};

    fn reencode(data: &[u8]) -> Vec<u8> {
        let (rest, messages) = parse_messages(data).unwrap();
        assert!(rest.is_empty());
        let mut out = Vec::new();
        for m in &messages {
            m.write_to(&mut out);
        }
        out
    }

    #[test]
    fn entity_update_reencodes_exactly() {
        // Every optional field on a long entity.
        let data: &[u8] = &[
            0x80 | 0x01 | 0x02 | 0x04 | 0x08 | 0x10 | 0x40,
            0x7f,
            0x01,
            0x01,
            0x2a,
            0x05,
            0x03,
            0x04,
            0x10,
            0x00,
            0x80,
            0xff,
            0x02,
            0x20,
            0x00,
            0x40,
            0x30,
            0x00,
        ];
        assert_eq!(reencode(data), data);
    }

    #[test]
    fn mixed_block_reencodes_exactly() {
        let mut data = vec![ServerCommand::Time as u8];
        data.extend_from_slice(&12.5f32.to_le_bytes());
        data.push(ServerCommand::Sound as u8);
        data.extend_from_slice(&[0x03, 200, 64, 0x0a, 0x00, 5, 0x10, 0x00, 0x20, 0x00, 0x30, 0x00]);
        data.push(ServerCommand::TempEntity as u8);
        data.extend_from_slice(&[5, 0x01, 0x00, 1, 0, 2, 0, 3, 0, 4, 0, 5, 0, 6, 0]);
        data.push(ServerCommand::TempEntity as u8);
        data.extend_from_slice(&[12, 1, 0, 2, 0, 3, 0, 97, 8]);
        data.push(ServerCommand::SpawnBaseline as u8);
        data.extend_from_slice(&[0x05, 0x00, 3, 0, 0, 0, 0x10, 0x00, 0x20, 0x20, 0x00, 0x40, 0x30, 0x00, 0x60]);
        data.push(ServerCommand::Print as u8);
        data.extend_from_slice(b"You got the shells\n\0");
        data.push(ServerCommand::Nop as u8);
        assert_eq!(reencode(&data), data);
    }

    #[test]
    fn client_data_reencodes_exactly() {
        let mut data = vec![ServerCommand::ClientData as u8];
        let bits: u16 = 0x0001 | 0x0004 | 0x0020 | 0x0200 | 0x0400 | 0x1000 | 0x4000;
        data.extend_from_slice(&bits.to_le_bytes());
        data.extend_from_slice(&[22, 0xfe, 0x10]);
        data.extend_from_slice(&0x1001i32.to_le_bytes());
        data.extend_from_slice(&[3, 12]);
        data.extend_from_slice(&87i16.to_le_bytes());
        data.extend_from_slice(&[20, 20, 0, 5, 0, 2]);
        assert_eq!(reencode(&data), data);
    }

    #[test]
    fn shown_frame_is_written_without_model() {
        let data: &[u8] = &[0x80 | 0x01 | 0x40, 0x04, 0x01, 0x09, 0x02];
        let (_, message) = parse_message(data).unwrap();
        let crate::Message::EntityUpdate(mut update) = message else {
            panic!("expected entity update");
        };
        update.show_frame(42);
        assert_eq!(crate::Message::EntityUpdate(update).to_bytes(), vec![0xc0u8, 0x01, 42]);
    }
}
