use std::fmt;

use kinded::Kinded;
use nom::bytes::complete::{tag, take_till};
use nom::number::complete::{le_f32, le_i8, le_i16, le_i32, le_u8, le_u16};
use serde::{Serialize, Serializer};
use strum_macros::{FromRepr, IntoStaticStr};

use crate::IResult;
use crate::error::Error;
use crate::types::{Angle, Coord, DemoTime, EntityId, Position};

/// Entity update commands are flagged by the high bit of the command byte
/// instead of having a server command number.
pub const UPDATE_SIGNAL: u8 = 0x80;

/// Server to client command numbers for protocol 15.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRepr, IntoStaticStr)]
#[repr(u8)]
pub enum ServerCommand {
    Bad = 0,
    Nop = 1,
    Disconnect = 2,
    UpdateStat = 3,
    Version = 4,
    SetView = 5,
    Sound = 6,
    Time = 7,
    Print = 8,
    StuffText = 9,
    SetAngle = 10,
    ServerInfo = 11,
    LightStyle = 12,
    UpdateName = 13,
    UpdateFrags = 14,
    ClientData = 15,
    StopSound = 16,
    UpdateColors = 17,
    Particle = 18,
    Damage = 19,
    SpawnStatic = 20,
    SpawnBinary = 21,
    SpawnBaseline = 22,
    TempEntity = 23,
    SetPause = 24,
    SignonNum = 25,
    CenterPrint = 26,
    KilledMonster = 27,
    FoundSecret = 28,
    SpawnStaticSound = 29,
    Intermission = 30,
    Finale = 31,
    CdTrack = 32,
    SellScreen = 33,
    Cutscene = 34,
}

bitflags::bitflags! {
    /// `U_*` bits of a fast entity update. The signal bit is implied by the
    /// command byte and never stored here.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
    pub struct UpdateFlags: u16 {
        const MOREBITS   = 1 << 0;
        const ORIGIN1    = 1 << 1;
        const ORIGIN2    = 1 << 2;
        const ORIGIN3    = 1 << 3;
        const ANGLE2     = 1 << 4;
        const NOLERP     = 1 << 5;
        const FRAME      = 1 << 6;
        const ANGLE1     = 1 << 8;
        const ANGLE3     = 1 << 9;
        const MODEL      = 1 << 10;
        const COLORMAP   = 1 << 11;
        const SKIN       = 1 << 12;
        const EFFECTS    = 1 << 13;
        const LONGENTITY = 1 << 14;
    }
}

impl UpdateFlags {
    pub const ORIGINS: [UpdateFlags; 3] = [Self::ORIGIN1, Self::ORIGIN2, Self::ORIGIN3];
    pub const ANGLES: [UpdateFlags; 3] = [Self::ANGLE1, Self::ANGLE2, Self::ANGLE3];

    /// Whether any bit that lives in the second flag byte is set.
    pub fn needs_more_bits(self) -> bool {
        self.bits() & 0xff00 != 0
    }
}

bitflags::bitflags! {
    /// `SU_*` bits of `svc_clientdata`.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
    pub struct ClientDataFlags: u16 {
        const VIEWHEIGHT  = 1 << 0;
        const IDEALPITCH  = 1 << 1;
        const PUNCH1      = 1 << 2;
        const PUNCH2      = 1 << 3;
        const PUNCH3      = 1 << 4;
        const VELOCITY1   = 1 << 5;
        const VELOCITY2   = 1 << 6;
        const VELOCITY3   = 1 << 7;
        const AIMENT      = 1 << 8;
        const ITEMS       = 1 << 9;
        const ONGROUND    = 1 << 10;
        const INWATER     = 1 << 11;
        const WEAPONFRAME = 1 << 12;
        const ARMOR       = 1 << 13;
        const WEAPON      = 1 << 14;
    }
}

impl ClientDataFlags {
    pub const PUNCHES: [ClientDataFlags; 3] = [Self::PUNCH1, Self::PUNCH2, Self::PUNCH3];
    pub const VELOCITIES: [ClientDataFlags; 3] =
        [Self::VELOCITY1, Self::VELOCITY2, Self::VELOCITY3];
}

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
    pub struct SoundFlags: u8 {
        const VOLUME      = 1 << 0;
        const ATTENUATION = 1 << 1;
    }
}

/// A zero terminated protocol string. Kept as raw bytes since the game's
/// character set is not UTF-8.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct QString(pub Vec<u8>);

impl QString {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.0).into_owned()
    }
}

impl From<&str> for QString {
    fn from(s: &str) -> Self {
        QString(s.as_bytes().to_vec())
    }
}

impl fmt::Display for QString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.0))
    }
}

impl Serialize for QString {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&String::from_utf8_lossy(&self.0))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sound {
    pub flags: SoundFlags,
    pub volume: Option<u8>,
    pub attenuation: Option<u8>,
    /// Entity number shifted left by three, or'd with the channel.
    pub channel: u16,
    pub sound: u8,
    pub origin: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServerInfo {
    pub protocol: i32,
    pub max_clients: u8,
    pub game_type: u8,
    pub level_name: QString,
    /// Model precache list, starting at model index 1.
    pub models: Vec<QString>,
    /// Sound precache list, starting at sound index 1.
    pub sounds: Vec<QString>,
}

/// Per-frame status of the client the demo was recorded from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientData {
    pub flags: ClientDataFlags,
    pub view_height: Option<i8>,
    pub ideal_pitch: Option<i8>,
    pub punch: [Option<i8>; 3],
    pub velocity: [Option<i8>; 3],
    pub items: i32,
    pub weapon_frame: Option<u8>,
    pub armor: Option<u8>,
    /// Model index of the first person weapon.
    pub weapon: Option<u8>,
    pub health: i16,
    pub ammo: u8,
    pub shells: u8,
    pub nails: u8,
    pub rockets: u8,
    pub cells: u8,
    pub active_weapon: u8,
}

impl ClientData {
    /// Weapon animation frame, zero while the weapon is idle.
    pub fn weapon_frame(&self) -> u8 {
        self.weapon_frame.unwrap_or(0)
    }

    pub fn weapon_model(&self) -> u8 {
        self.weapon.unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Baseline {
    pub model: u8,
    pub frame: u8,
    pub colormap: u8,
    pub skin: u8,
    pub origin: Position,
    pub angles: [Angle; 3],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TempEntity {
    /// Spikes, gunshots, explosions, splashes and teleport effects.
    Point { kind: u8, origin: Position },
    /// Lightning bolts and grapple beams.
    Beam {
        kind: u8,
        entity: EntityId,
        start: Position,
        end: Position,
    },
    Explosion2 {
        origin: Position,
        color_start: u8,
        color_length: u8,
    },
}

impl TempEntity {
    pub const EXPLOSION2: u8 = 12;

    pub fn kind(&self) -> u8 {
        match self {
            TempEntity::Point { kind, .. } | TempEntity::Beam { kind, .. } => *kind,
            TempEntity::Explosion2 { .. } => Self::EXPLOSION2,
        }
    }
}

/// A fast entity update. Only fields whose bit is set in `flags` are present.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityUpdate {
    pub flags: UpdateFlags,
    pub entity: EntityId,
    pub model: Option<u8>,
    pub frame: Option<u8>,
    pub colormap: Option<u8>,
    pub skin: Option<u8>,
    pub effects: Option<u8>,
    pub origin: [Option<Coord>; 3],
    pub angles: [Option<Angle>; 3],
}

impl EntityUpdate {
    /// Replace any model change carried by this update with an explicit frame
    /// number.
    pub fn show_frame(&mut self, frame: u8) {
        self.flags.remove(UpdateFlags::MODEL);
        self.flags.insert(UpdateFlags::FRAME);
        self.model = None;
        self.frame = Some(frame);
        let more = self.flags.needs_more_bits();
        self.flags.set(UpdateFlags::MOREBITS, more);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Kinded)]
#[kinded(derive(Hash))]
pub enum Message {
    Nop,
    Disconnect,
    UpdateStat {
        stat: u8,
        value: i32,
    },
    Version(i32),
    SetView(EntityId),
    Sound(Sound),
    Time(DemoTime),
    Print(QString),
    StuffText(QString),
    SetAngle([Angle; 3]),
    ServerInfo(ServerInfo),
    LightStyle {
        style: u8,
        pattern: QString,
    },
    UpdateName {
        player: u8,
        name: QString,
    },
    UpdateFrags {
        player: u8,
        frags: i16,
    },
    ClientData(ClientData),
    StopSound(u16),
    UpdateColors {
        player: u8,
        colors: u8,
    },
    Particle {
        origin: Position,
        direction: [i8; 3],
        count: u8,
        color: u8,
    },
    Damage {
        armor: u8,
        blood: u8,
        origin: Position,
    },
    SpawnStatic(Baseline),
    SpawnBaseline {
        entity: EntityId,
        baseline: Baseline,
    },
    TempEntity(TempEntity),
    SetPause(u8),
    SignonNum(u8),
    CenterPrint(QString),
    KilledMonster,
    FoundSecret,
    SpawnStaticSound {
        origin: Position,
        sound: u8,
        volume: u8,
        attenuation: u8,
    },
    Intermission,
    Finale(QString),
    CdTrack {
        track: u8,
        loop_track: u8,
    },
    SellScreen,
    Cutscene(QString),
    EntityUpdate(EntityUpdate),
}

impl Message {
    /// The command number this message is written with. Entity updates have
    /// none.
    pub fn command(&self) -> Option<ServerCommand> {
        let cmd = match self {
            Message::Nop => ServerCommand::Nop,
            Message::Disconnect => ServerCommand::Disconnect,
            Message::UpdateStat { .. } => ServerCommand::UpdateStat,
            Message::Version(_) => ServerCommand::Version,
            Message::SetView(_) => ServerCommand::SetView,
            Message::Sound(_) => ServerCommand::Sound,
            Message::Time(_) => ServerCommand::Time,
            Message::Print(_) => ServerCommand::Print,
            Message::StuffText(_) => ServerCommand::StuffText,
            Message::SetAngle(_) => ServerCommand::SetAngle,
            Message::ServerInfo(_) => ServerCommand::ServerInfo,
            Message::LightStyle { .. } => ServerCommand::LightStyle,
            Message::UpdateName { .. } => ServerCommand::UpdateName,
            Message::UpdateFrags { .. } => ServerCommand::UpdateFrags,
            Message::ClientData(_) => ServerCommand::ClientData,
            Message::StopSound(_) => ServerCommand::StopSound,
            Message::UpdateColors { .. } => ServerCommand::UpdateColors,
            Message::Particle { .. } => ServerCommand::Particle,
            Message::Damage { .. } => ServerCommand::Damage,
            Message::SpawnStatic(_) => ServerCommand::SpawnStatic,
            Message::SpawnBaseline { .. } => ServerCommand::SpawnBaseline,
            Message::TempEntity(_) => ServerCommand::TempEntity,
            Message::SetPause(_) => ServerCommand::SetPause,
            Message::SignonNum(_) => ServerCommand::SignonNum,
            Message::CenterPrint(_) => ServerCommand::CenterPrint,
            Message::KilledMonster => ServerCommand::KilledMonster,
            Message::FoundSecret => ServerCommand::FoundSecret,
            Message::SpawnStaticSound { .. } => ServerCommand::SpawnStaticSound,
            Message::Intermission => ServerCommand::Intermission,
            Message::Finale(_) => ServerCommand::Finale,
            Message::CdTrack { .. } => ServerCommand::CdTrack,
            Message::SellScreen => ServerCommand::SellScreen,
            Message::Cutscene(_) => ServerCommand::Cutscene,
            Message::EntityUpdate(_) => return None,
        };
        Some(cmd)
    }
}

fn string(i: &[u8]) -> IResult<&[u8], QString> {
    let (i, bytes) = take_till(|b| b == 0)(i)?;
    let (i, _) = tag(&b"\0"[..])(i)?;
    Ok((i, QString(bytes.to_vec())))
}

fn coord(i: &[u8]) -> IResult<&[u8], Coord> {
    let (i, v) = le_i16(i)?;
    Ok((i, Coord(v)))
}

fn angle(i: &[u8]) -> IResult<&[u8], Angle> {
    let (i, v) = le_i8(i)?;
    Ok((i, Angle(v)))
}

fn position(i: &[u8]) -> IResult<&[u8], Position> {
    let (i, x) = coord(i)?;
    let (i, y) = coord(i)?;
    let (i, z) = coord(i)?;
    Ok((i, [x, y, z]))
}

fn angles(i: &[u8]) -> IResult<&[u8], [Angle; 3]> {
    let (i, x) = angle(i)?;
    let (i, y) = angle(i)?;
    let (i, z) = angle(i)?;
    Ok((i, [x, y, z]))
}

/// Read `parser` only when `present`, leaving the input untouched otherwise.
fn optional<'a, O>(
    present: bool,
    parser: impl Fn(&'a [u8]) -> IResult<&'a [u8], O>,
    i: &'a [u8],
) -> IResult<&'a [u8], Option<O>> {
    if present {
        let (i, v) = parser(i)?;
        Ok((i, Some(v)))
    } else {
        Ok((i, None))
    }
}

/// Read a zero-string-terminated list of strings.
fn string_list(mut i: &[u8]) -> IResult<&[u8], Vec<QString>> {
    let mut list = Vec::new();
    loop {
        let (rest, s) = string(i)?;
        i = rest;
        if s.is_empty() {
            return Ok((i, list));
        }
        list.push(s);
    }
}

fn parse_server_info(i: &[u8]) -> IResult<&[u8], ServerInfo> {
    let (i, protocol) = le_i32(i)?;
    let (i, max_clients) = le_u8(i)?;
    let (i, game_type) = le_u8(i)?;
    let (i, level_name) = string(i)?;
    let (i, models) = string_list(i)?;
    let (i, sounds) = string_list(i)?;
    Ok((
        i,
        ServerInfo {
            protocol,
            max_clients,
            game_type,
            level_name,
            models,
            sounds,
        },
    ))
}

fn parse_sound(i: &[u8]) -> IResult<&[u8], Sound> {
    let (i, raw) = le_u8(i)?;
    let flags = SoundFlags::from_bits_retain(raw);
    let (i, volume) = optional(flags.contains(SoundFlags::VOLUME), le_u8, i)?;
    let (i, attenuation) = optional(flags.contains(SoundFlags::ATTENUATION), le_u8, i)?;
    let (i, channel) = le_u16(i)?;
    let (i, sound) = le_u8(i)?;
    let (i, origin) = position(i)?;
    Ok((
        i,
        Sound {
            flags,
            volume,
            attenuation,
            channel,
            sound,
            origin,
        },
    ))
}

fn parse_client_data(i: &[u8]) -> IResult<&[u8], ClientData> {
    let (i, raw) = le_u16(i)?;
    let flags = ClientDataFlags::from_bits_retain(raw);
    let (i, view_height) = optional(flags.contains(ClientDataFlags::VIEWHEIGHT), le_i8, i)?;
    let (mut i, ideal_pitch) = optional(flags.contains(ClientDataFlags::IDEALPITCH), le_i8, i)?;

    let mut punch = [None; 3];
    let mut velocity = [None; 3];
    for axis in 0..3 {
        let (rest, p) = optional(flags.contains(ClientDataFlags::PUNCHES[axis]), le_i8, i)?;
        let (rest, v) = optional(flags.contains(ClientDataFlags::VELOCITIES[axis]), le_i8, rest)?;
        punch[axis] = p;
        velocity[axis] = v;
        i = rest;
    }

    // Items are written regardless of SU_ITEMS.
    let (i, items) = le_i32(i)?;
    let (i, weapon_frame) = optional(flags.contains(ClientDataFlags::WEAPONFRAME), le_u8, i)?;
    let (i, armor) = optional(flags.contains(ClientDataFlags::ARMOR), le_u8, i)?;
    let (i, weapon) = optional(flags.contains(ClientDataFlags::WEAPON), le_u8, i)?;
    let (i, health) = le_i16(i)?;
    let (i, ammo) = le_u8(i)?;
    let (i, shells) = le_u8(i)?;
    let (i, nails) = le_u8(i)?;
    let (i, rockets) = le_u8(i)?;
    let (i, cells) = le_u8(i)?;
    let (i, active_weapon) = le_u8(i)?;

    Ok((
        i,
        ClientData {
            flags,
            view_height,
            ideal_pitch,
            punch,
            velocity,
            items,
            weapon_frame,
            armor,
            weapon,
            health,
            ammo,
            shells,
            nails,
            rockets,
            cells,
            active_weapon,
        },
    ))
}

fn parse_baseline(i: &[u8]) -> IResult<&[u8], Baseline> {
    let (i, model) = le_u8(i)?;
    let (i, frame) = le_u8(i)?;
    let (i, colormap) = le_u8(i)?;
    let (mut i, skin) = le_u8(i)?;

    let mut origin = [Coord::default(); 3];
    let mut angles = [Angle::default(); 3];
    for axis in 0..3 {
        let (rest, c) = coord(i)?;
        let (rest, a) = angle(rest)?;
        origin[axis] = c;
        angles[axis] = a;
        i = rest;
    }

    Ok((
        i,
        Baseline {
            model,
            frame,
            colormap,
            skin,
            origin,
            angles,
        },
    ))
}

fn parse_temp_entity(i: &[u8]) -> IResult<&[u8], TempEntity> {
    let (i, kind) = le_u8(i)?;
    match kind {
        0..=4 | 7 | 8 | 10 | 11 => {
            let (i, origin) = position(i)?;
            Ok((i, TempEntity::Point { kind, origin }))
        }
        5 | 6 | 9 | 13 => {
            let (i, entity) = le_u16(i)?;
            let (i, start) = position(i)?;
            let (i, end) = position(i)?;
            Ok((
                i,
                TempEntity::Beam {
                    kind,
                    entity: EntityId(entity),
                    start,
                    end,
                },
            ))
        }
        TempEntity::EXPLOSION2 => {
            let (i, origin) = position(i)?;
            let (i, color_start) = le_u8(i)?;
            let (i, color_length) = le_u8(i)?;
            Ok((
                i,
                TempEntity::Explosion2 {
                    origin,
                    color_start,
                    color_length,
                },
            ))
        }
        kind => Err(nom::Err::Failure(Error::UnknownTempEntity { kind })),
    }
}

fn parse_entity_update(cmd: u8, i: &[u8]) -> IResult<&[u8], EntityUpdate> {
    let mut bits = (cmd & !UPDATE_SIGNAL) as u16;
    let mut i = i;
    if bits & UpdateFlags::MOREBITS.bits() != 0 {
        let (rest, more) = le_u8(i)?;
        bits |= (more as u16) << 8;
        i = rest;
    }
    let flags = UpdateFlags::from_bits_retain(bits);

    let (i, entity) = if flags.contains(UpdateFlags::LONGENTITY) {
        le_u16(i)?
    } else {
        let (i, entity) = le_u8(i)?;
        (i, entity as u16)
    };
    let (i, model) = optional(flags.contains(UpdateFlags::MODEL), le_u8, i)?;
    let (i, frame) = optional(flags.contains(UpdateFlags::FRAME), le_u8, i)?;
    let (i, colormap) = optional(flags.contains(UpdateFlags::COLORMAP), le_u8, i)?;
    let (i, skin) = optional(flags.contains(UpdateFlags::SKIN), le_u8, i)?;
    let (mut i, effects) = optional(flags.contains(UpdateFlags::EFFECTS), le_u8, i)?;

    let mut origin = [None; 3];
    let mut angles = [None; 3];
    for axis in 0..3 {
        let (rest, c) = optional(flags.contains(UpdateFlags::ORIGINS[axis]), coord, i)?;
        let (rest, a) = optional(flags.contains(UpdateFlags::ANGLES[axis]), angle, rest)?;
        origin[axis] = c;
        angles[axis] = a;
        i = rest;
    }

    Ok((
        i,
        EntityUpdate {
            flags,
            entity: EntityId(entity),
            model,
            frame,
            colormap,
            skin,
            effects,
            origin,
            angles,
        },
    ))
}

/// Parse a single message from a block payload.
pub fn parse_message(i: &[u8]) -> IResult<&[u8], Message> {
    let (i, cmd) = le_u8(i)?;
    if cmd & UPDATE_SIGNAL != 0 {
        let (i, update) = parse_entity_update(cmd, i)?;
        return Ok((i, Message::EntityUpdate(update)));
    }

    let Some(command) = ServerCommand::from_repr(cmd) else {
        return Err(nom::Err::Failure(Error::UnknownCommand { cmd }));
    };

    let (i, message) = match command {
        ServerCommand::Bad | ServerCommand::SpawnBinary => {
            return Err(nom::Err::Failure(Error::UnsupportedCommand {
                command: command.into(),
            }));
        }
        ServerCommand::Nop => (i, Message::Nop),
        ServerCommand::Disconnect => (i, Message::Disconnect),
        ServerCommand::UpdateStat => {
            let (i, stat) = le_u8(i)?;
            let (i, value) = le_i32(i)?;
            (i, Message::UpdateStat { stat, value })
        }
        ServerCommand::Version => {
            let (i, version) = le_i32(i)?;
            (i, Message::Version(version))
        }
        ServerCommand::SetView => {
            let (i, entity) = le_u16(i)?;
            (i, Message::SetView(EntityId(entity)))
        }
        ServerCommand::Sound => {
            let (i, sound) = parse_sound(i)?;
            (i, Message::Sound(sound))
        }
        ServerCommand::Time => {
            let (i, time) = le_f32(i)?;
            (i, Message::Time(DemoTime(time)))
        }
        ServerCommand::Print => {
            let (i, s) = string(i)?;
            (i, Message::Print(s))
        }
        ServerCommand::StuffText => {
            let (i, s) = string(i)?;
            (i, Message::StuffText(s))
        }
        ServerCommand::SetAngle => {
            let (i, a) = angles(i)?;
            (i, Message::SetAngle(a))
        }
        ServerCommand::ServerInfo => {
            let (i, info) = parse_server_info(i)?;
            (i, Message::ServerInfo(info))
        }
        ServerCommand::LightStyle => {
            let (i, style) = le_u8(i)?;
            let (i, pattern) = string(i)?;
            (i, Message::LightStyle { style, pattern })
        }
        ServerCommand::UpdateName => {
            let (i, player) = le_u8(i)?;
            let (i, name) = string(i)?;
            (i, Message::UpdateName { player, name })
        }
        ServerCommand::UpdateFrags => {
            let (i, player) = le_u8(i)?;
            let (i, frags) = le_i16(i)?;
            (i, Message::UpdateFrags { player, frags })
        }
        ServerCommand::ClientData => {
            let (i, data) = parse_client_data(i)?;
            (i, Message::ClientData(data))
        }
        ServerCommand::StopSound => {
            let (i, channel) = le_u16(i)?;
            (i, Message::StopSound(channel))
        }
        ServerCommand::UpdateColors => {
            let (i, player) = le_u8(i)?;
            let (i, colors) = le_u8(i)?;
            (i, Message::UpdateColors { player, colors })
        }
        ServerCommand::Particle => {
            let (i, origin) = position(i)?;
            let (i, dx) = le_i8(i)?;
            let (i, dy) = le_i8(i)?;
            let (i, dz) = le_i8(i)?;
            let (i, count) = le_u8(i)?;
            let (i, color) = le_u8(i)?;
            (
                i,
                Message::Particle {
                    origin,
                    direction: [dx, dy, dz],
                    count,
                    color,
                },
            )
        }
        ServerCommand::Damage => {
            let (i, armor) = le_u8(i)?;
            let (i, blood) = le_u8(i)?;
            let (i, origin) = position(i)?;
            (
                i,
                Message::Damage {
                    armor,
                    blood,
                    origin,
                },
            )
        }
        ServerCommand::SpawnStatic => {
            let (i, baseline) = parse_baseline(i)?;
            (i, Message::SpawnStatic(baseline))
        }
        ServerCommand::SpawnBaseline => {
            let (i, entity) = le_u16(i)?;
            let (i, baseline) = parse_baseline(i)?;
            (
                i,
                Message::SpawnBaseline {
                    entity: EntityId(entity),
                    baseline,
                },
            )
        }
        ServerCommand::TempEntity => {
            let (i, te) = parse_temp_entity(i)?;
            (i, Message::TempEntity(te))
        }
        ServerCommand::SetPause => {
            let (i, paused) = le_u8(i)?;
            (i, Message::SetPause(paused))
        }
        ServerCommand::SignonNum => {
            let (i, num) = le_u8(i)?;
            (i, Message::SignonNum(num))
        }
        ServerCommand::CenterPrint => {
            let (i, s) = string(i)?;
            (i, Message::CenterPrint(s))
        }
        ServerCommand::KilledMonster => (i, Message::KilledMonster),
        ServerCommand::FoundSecret => (i, Message::FoundSecret),
        ServerCommand::SpawnStaticSound => {
            let (i, origin) = position(i)?;
            let (i, sound) = le_u8(i)?;
            let (i, volume) = le_u8(i)?;
            let (i, attenuation) = le_u8(i)?;
            (
                i,
                Message::SpawnStaticSound {
                    origin,
                    sound,
                    volume,
                    attenuation,
                },
            )
        }
        ServerCommand::Intermission => (i, Message::Intermission),
        ServerCommand::Finale => {
            let (i, s) = string(i)?;
            (i, Message::Finale(s))
        }
        ServerCommand::CdTrack => {
            let (i, track) = le_u8(i)?;
            let (i, loop_track) = le_u8(i)?;
            (i, Message::CdTrack { track, loop_track })
        }
        ServerCommand::SellScreen => (i, Message::SellScreen),
        ServerCommand::Cutscene => {
            let (i, s) = string(i)?;
            (i, Message::Cutscene(s))
        }
    };

    Ok((i, message))
}

/// Parse every message in a block payload. The payload must be consumed
/// exactly.
pub fn parse_messages(mut i: &[u8]) -> IResult<&[u8], Vec<Message>> {
    let mut messages = Vec::new();
    while !i.is_empty() {
        let (rest, message) = parse_message(i)?;
        messages.push(message);
        i = rest;
    }
    Ok((i, messages))
}
