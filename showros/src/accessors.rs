//! Lookups of the individual messages the fixer reads out of a block.

use quake_demo::message::{ClientData, EntityUpdate, ServerInfo};
use quake_demo::types::{DemoTime, EntityId};
use quake_demo::{Block, Message, MessageKind};

use crate::error::{FixError, NotFound};

/// Model precache names indexed by model number. Slot 0 is the empty "no
/// model" entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelTable {
    names: Vec<String>,
}

impl ModelTable {
    pub fn from_server_info(info: &ServerInfo) -> Self {
        let mut names = Vec::with_capacity(info.models.len() + 1);
        names.push(String::new());
        names.extend(info.models.iter().map(|m| m.to_string_lossy()));
        Self { names }
    }

    pub fn name(&self, index: u8) -> Result<&str, FixError> {
        self.names
            .get(index as usize)
            .map(String::as_str)
            .ok_or(FixError::UnknownModelIndex(index))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// True when the server sent no precache names.
    pub fn is_empty(&self) -> bool {
        self.names.len() <= 1
    }
}

pub fn time(block: &Block) -> Result<DemoTime, NotFound> {
    block
        .messages
        .iter()
        .find_map(|m| match m {
            Message::Time(t) => Some(*t),
            _ => None,
        })
        .ok_or(NotFound(MessageKind::Time))
}

pub fn view_entity(block: &Block) -> Result<EntityId, NotFound> {
    block
        .messages
        .iter()
        .find_map(|m| match m {
            Message::SetView(entity) => Some(*entity),
            _ => None,
        })
        .ok_or(NotFound(MessageKind::SetView))
}

pub fn client_data(block: &Block) -> Result<&ClientData, NotFound> {
    block
        .messages
        .iter()
        .find_map(|m| match m {
            Message::ClientData(cd) => Some(cd),
            _ => None,
        })
        .ok_or(NotFound(MessageKind::ClientData))
}

pub fn player_update_mut(block: &mut Block, entity: EntityId) -> Result<&mut EntityUpdate, NotFound> {
    block
        .messages
        .iter_mut()
        .find_map(|m| match m {
            Message::EntityUpdate(update) if update.entity == entity => Some(update),
            _ => None,
        })
        .ok_or(NotFound(MessageKind::EntityUpdate))
}

pub fn server_info(block: &Block) -> Result<&ServerInfo, NotFound> {
    block
        .messages
        .iter()
        .find_map(|m| match m {
            Message::ServerInfo(info) => Some(info),
            _ => None,
        })
        .ok_or(NotFound(MessageKind::ServerInfo))
}

pub fn models(block: &Block) -> Result<ModelTable, NotFound> {
    server_info(block).map(ModelTable::from_server_info)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use quake_demo::message::{
        ClientData, ClientDataFlags, EntityUpdate, QString, ServerInfo, UpdateFlags,
    };
    use quake_demo::types::{DemoTime, EntityId};
    use quake_demo::{Block, Message};

    pub const PLAYER: EntityId = EntityId(1);

    /// Model numbers in [`server_info`].
    pub const WORLD: u8 = 1;
    pub const EYES: u8 = 2;
    pub const PLAYER_MDL: u8 = 3;
    pub const V_AXE: u8 = 4;
    pub const V_SHOT: u8 = 5;
    pub const V_ROCK: u8 = 6;

    pub fn sample_server_info() -> ServerInfo {
        ServerInfo {
            protocol: 15,
            max_clients: 1,
            game_type: 0,
            level_name: QString::from("the Slipgate Complex"),
            models: [
                "maps/e1m1.bsp",
                "progs/eyes.mdl",
                "progs/player.mdl",
                "progs/v_axe.mdl",
                "progs/v_shot.mdl",
                "progs/v_rock.mdl",
            ]
            .into_iter()
            .map(QString::from)
            .collect(),
            sounds: vec![QString::from("weapons/r_exp3.wav")],
        }
    }

    pub fn update(entity: EntityId, model: Option<u8>) -> EntityUpdate {
        let mut flags = UpdateFlags::ORIGIN1 | UpdateFlags::FRAME;
        if model.is_some() {
            flags |= UpdateFlags::MOREBITS | UpdateFlags::MODEL;
        }
        EntityUpdate {
            flags,
            entity,
            model,
            frame: Some(0),
            colormap: None,
            skin: None,
            effects: None,
            origin: [Some(quake_demo::types::Coord(64)), None, None],
            angles: [None; 3],
        }
    }

    pub fn sample_client_data(health: i16, weapon: u8, weapon_frame: u8) -> ClientData {
        let mut flags = ClientDataFlags::ITEMS | ClientDataFlags::ONGROUND | ClientDataFlags::WEAPON;
        if weapon_frame != 0 {
            flags |= ClientDataFlags::WEAPONFRAME;
        }
        ClientData {
            flags,
            view_height: None,
            ideal_pitch: None,
            punch: [None; 3],
            velocity: [None; 3],
            items: 1,
            weapon_frame: (weapon_frame != 0).then_some(weapon_frame),
            armor: None,
            weapon: Some(weapon),
            health,
            ammo: 25,
            shells: 25,
            nails: 0,
            rockets: 0,
            cells: 0,
            active_weapon: 1,
        }
    }

    /// A typical in-game block for the tracked player.
    pub fn game_block(time: f32, model: u8, health: i16, weapon: u8, weapon_frame: u8) -> Block {
        Block {
            view_angles: [0.0, 90.0, 0.0],
            messages: vec![
                Message::Time(DemoTime(time)),
                Message::ClientData(sample_client_data(health, weapon, weapon_frame)),
                Message::EntityUpdate(update(PLAYER, Some(model))),
                Message::EntityUpdate(update(EntityId(7), Some(PLAYER_MDL))),
            ],
        }
    }

    pub fn displayed_frame(block: &Block) -> Option<u8> {
        block.messages.iter().find_map(|m| match m {
            Message::EntityUpdate(u) if u.entity == PLAYER => u.frame,
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn finds_time_and_client_data() {
        let block = game_block(3.5, EYES, 100, V_SHOT, 0);
        assert_eq!(time(&block).unwrap(), DemoTime(3.5));
        assert_eq!(client_data(&block).unwrap().health, 100);
    }

    #[test]
    fn player_update_matches_entity() {
        let mut block = game_block(3.5, EYES, 100, V_SHOT, 0);
        assert_eq!(player_update_mut(&mut block, PLAYER).unwrap().model, Some(EYES));
        assert_eq!(
            player_update_mut(&mut block, EntityId(7)).unwrap().model,
            Some(PLAYER_MDL)
        );
        assert_eq!(
            player_update_mut(&mut block, EntityId(9)).unwrap_err(),
            NotFound(MessageKind::EntityUpdate)
        );
    }

    #[test]
    fn missing_messages_are_reported_by_kind() {
        let block = Block {
            view_angles: [0.0; 3],
            messages: vec![Message::Nop],
        };
        assert_eq!(time(&block).unwrap_err(), NotFound(MessageKind::Time));
        assert_eq!(view_entity(&block).unwrap_err(), NotFound(MessageKind::SetView));
        assert_eq!(client_data(&block).unwrap_err(), NotFound(MessageKind::ClientData));
        assert_eq!(models(&block).unwrap_err(), NotFound(MessageKind::ServerInfo));
    }

    #[test]
    fn model_table_is_indexed_from_one() {
        let block = Block {
            view_angles: [0.0; 3],
            messages: vec![
                Message::ServerInfo(sample_server_info()),
                Message::SetView(PLAYER),
            ],
        };
        let table = models(&block).unwrap();
        assert_eq!(table.name(0).unwrap(), "");
        assert_eq!(table.name(WORLD).unwrap(), "maps/e1m1.bsp");
        assert_eq!(table.name(EYES).unwrap(), "progs/eyes.mdl");
        assert_eq!(table.name(V_AXE).unwrap(), "progs/v_axe.mdl");
        assert_eq!(table.len(), 7);
        assert!(matches!(table.name(200), Err(FixError::UnknownModelIndex(200))));
        assert_eq!(view_entity(&block).unwrap(), PLAYER);
    }
}
