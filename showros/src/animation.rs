use std::collections::HashMap;
use std::sync::LazyLock;

use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::error::FixError;

/// Player model animations, named after the frame macros in `player.qc`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumString, IntoStaticStr, Display,
)]
#[strum(serialize_all = "lowercase")]
pub enum Anim {
    AxRun,
    RockRun,
    Stand,
    AxStnd,
    AxPain,
    Pain,
    AxDeth,
    DeathA,
    DeathB,
    DeathC,
    DeathD,
    DeathE,
    NailAtt,
    Light,
    RockAtt,
    ShotAtt,
    AxAtt,
    AxAttB,
    AxAttC,
    AxAttD,
}

/// Animations in the order their frames appear in `progs/player.mdl`, with
/// their frame counts. The order must match the model file.
pub const PLAYER_ANIMATIONS: &[(Anim, u8)] = &[
    (Anim::AxRun, 6),
    (Anim::RockRun, 6),
    (Anim::Stand, 5),
    (Anim::AxStnd, 12),
    (Anim::AxPain, 6),
    (Anim::Pain, 6),
    (Anim::AxDeth, 9),
    (Anim::DeathA, 11),
    (Anim::DeathB, 9),
    (Anim::DeathC, 15),
    (Anim::DeathD, 9),
    (Anim::DeathE, 9),
    (Anim::NailAtt, 2),
    (Anim::Light, 2),
    (Anim::RockAtt, 6),
    (Anim::ShotAtt, 6),
    (Anim::AxAtt, 6),
    (Anim::AxAttB, 6),
    (Anim::AxAttC, 6),
    (Anim::AxAttD, 6),
];

/// Shared catalog for [`PLAYER_ANIMATIONS`].
pub static CATALOG: LazyLock<AnimationCatalog> =
    LazyLock::new(|| AnimationCatalog::new(PLAYER_ANIMATIONS));

/// Maps (animation, 1-based local frame) pairs to model frame numbers.
#[derive(Debug, Clone)]
pub struct AnimationCatalog {
    frames: HashMap<(Anim, u32), u8>,
    lengths: HashMap<Anim, u32>,
}

impl AnimationCatalog {
    /// Model frame numbers are handed out in table order starting at 0.
    pub fn new(table: &[(Anim, u8)]) -> Self {
        let mut frames = HashMap::new();
        let mut lengths = HashMap::new();
        let mut next: u8 = 0;

        for &(anim, count) in table {
            for local in 1..=count as u32 {
                frames.insert((anim, local), next);
                next += 1;
            }
            lengths.insert(anim, count as u32);
        }

        Self { frames, lengths }
    }

    /// Number of frames in `anim`, or zero if the catalog does not contain it.
    pub fn length(&self, anim: Anim) -> u32 {
        self.lengths.get(&anim).copied().unwrap_or(0)
    }

    pub fn frame_index(&self, anim: Anim, local: i64) -> Result<u8, FixError> {
        u32::try_from(local)
            .ok()
            .and_then(|local| self.frames.get(&(anim, local)).copied())
            .ok_or(FixError::MissingFrame { anim, local })
    }

    pub fn total_frames(&self) -> usize {
        self.frames.len()
    }
}
