use quake_demo::Block;
use quake_demo::message::{ClientData, EntityUpdate};
use quake_demo::types::{DemoTime, EntityId};
use tracing::{debug, trace};

use crate::accessors::{self, ModelTable};
use crate::animation::{Anim, AnimationCatalog, CATALOG};
use crate::config::FixerConfig;
use crate::error::{FixError, NotFound};
use crate::weapons::{ANIM_FPS, WeaponAnims};

/// Whole animation frames elapsed over `seconds`, truncated toward zero.
fn elapsed_frames(seconds: f64) -> i64 {
    (seconds * ANIM_FPS).trunc() as i64
}

/// What the view model is currently doing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Playback {
    /// Running. The run cycle is phased from `since`, the moment the last
    /// animation ended.
    Idle { since: f64 },
    Playing { anim: Anim, since: f64 },
}

impl Playback {
    /// Switch to `anim` unless it is already playing, in which case it keeps
    /// its start time.
    fn request(self, anim: Anim, now: f64) -> Self {
        match self {
            Playback::Playing { anim: current, .. } if current == anim => self,
            _ => Playback::Playing { anim, since: now },
        }
    }

    pub fn anim(&self) -> Option<Anim> {
        match self {
            Playback::Idle { .. } => None,
            Playback::Playing { anim, .. } => Some(*anim),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimState {
    pub playback: Playback,
    pub last_health: Option<i16>,
}

impl Default for AnimState {
    fn default() -> Self {
        Self {
            playback: Playback::Idle { since: 0.0 },
            last_health: None,
        }
    }
}

/// The player's status as of one block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Inputs {
    pub time: f64,
    pub health: i16,
    /// First person weapon animation frame, non-zero while firing.
    pub weapon_frame: u8,
    pub weapon: WeaponAnims,
}

/// An animation and the 1-based frame within it that should be displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShownFrame {
    pub anim: Anim,
    pub local: i64,
}

/// Advance the animation state by one block.
///
/// Attack and pain are override requests checked every call, in that order,
/// so a pain request made in the same block wins over an attack. Once a
/// special animation runs out the view model falls back to the run cycle,
/// except while the weapon is still firing, where the attack restarts at its
/// first frame.
pub fn step(
    state: AnimState,
    inputs: &Inputs,
    catalog: &AnimationCatalog,
    pain_threshold: i16,
) -> (AnimState, ShownFrame) {
    let now = inputs.time;
    let weapon = inputs.weapon;
    let firing = inputs.weapon_frame != 0;
    let hurt = state
        .last_health
        .is_some_and(|last| i32::from(inputs.health) <= i32::from(last) - i32::from(pain_threshold));

    let requests = [(firing, weapon.attack), (hurt, weapon.pain())];
    let mut playback = state.playback;
    for (triggered, anim) in requests {
        if triggered {
            playback = playback.request(anim, now);
        }
    }

    let mut local = 0;
    if let Playback::Playing { anim, since } = playback {
        local = elapsed_frames(now - since) + 1;
        if local > i64::from(catalog.length(anim)) {
            playback = Playback::Idle { since: now };
        }
    }

    if firing && matches!(playback, Playback::Idle { .. }) {
        playback = Playback::Playing {
            anim: weapon.attack,
            since: now,
        };
        local = 1;
    }

    let shown = match playback {
        Playback::Idle { since } => {
            let run = weapon.run();
            let length = i64::from(catalog.length(run));
            ShownFrame {
                anim: run,
                local: elapsed_frames(now - since).rem_euclid(length) + 1,
            }
        }
        Playback::Playing { anim, .. } => ShownFrame { anim, local },
    };

    let next = AnimState {
        playback,
        last_health: Some(inputs.health),
    };
    (next, shown)
}

/// What [`BlockFixer::fix`] did with a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A message the fixer needs was missing.
    Skipped(NotFound),
    /// The player's update does not show the sentinel model.
    NotSentinel,
    /// The update now displays this frame.
    Rewritten(ShownFrame),
}

/// Rewrites the tracked player's entity updates so they show the view model
/// animation for the current moment. One fixer handles one demo, and blocks
/// must be fed to it in order.
pub struct BlockFixer {
    state: AnimState,
    models: ModelTable,
    view_entity: EntityId,
    sentinel_model: String,
    pain_threshold: i16,
}

impl BlockFixer {
    pub fn new(models: ModelTable, view_entity: EntityId, config: &FixerConfig) -> Self {
        Self {
            state: AnimState::default(),
            models,
            view_entity,
            sentinel_model: config.sentinel_model.clone(),
            pain_threshold: config.pain_threshold,
        }
    }

    pub fn state(&self) -> &AnimState {
        &self.state
    }

    /// Rewrite `block` in place if it is eligible. Ineligible blocks are left
    /// exactly as they were.
    pub fn fix(&mut self, block: &mut Block) -> Result<Outcome, FixError> {
        let time = match accessors::time(block) {
            Ok(time) => time,
            Err(missing) => return Ok(Outcome::Skipped(missing)),
        };
        let status = match accessors::client_data(block) {
            Ok(cd) => cd.clone(),
            Err(missing) => return Ok(Outcome::Skipped(missing)),
        };
        let update = match accessors::player_update_mut(block, self.view_entity) {
            Ok(update) => update,
            Err(missing) => return Ok(Outcome::Skipped(missing)),
        };

        self.process(time, update, &status)
    }

    /// Decide the frame for one block from its clock, the tracked player's
    /// update and the client status, and write it into `update`.
    pub fn process(
        &mut self,
        time: DemoTime,
        update: &mut EntityUpdate,
        status: &ClientData,
    ) -> Result<Outcome, FixError> {
        let Some(model) = update.model else {
            return Ok(Outcome::NotSentinel);
        };
        if self.models.name(model)? != self.sentinel_model {
            return Ok(Outcome::NotSentinel);
        }

        let weapon_model = self.models.name(status.weapon_model())?;
        let inputs = Inputs {
            time: time.as_f64(),
            health: status.health,
            weapon_frame: status.weapon_frame(),
            weapon: WeaponAnims::for_view_model(weapon_model)?,
        };

        let previous = self.state.playback.anim();
        let (state, shown) = step(self.state, &inputs, &CATALOG, self.pain_threshold);
        if state.playback.anim() != previous {
            debug!(
                "{time}: view model animation {:?} -> {:?}",
                previous,
                state.playback.anim()
            );
        }
        self.state = state;

        let frame = CATALOG.frame_index(shown.anim, shown.local)?;
        trace!("{time}: showing {}{} (model frame {frame})", shown.anim, shown.local);
        update.show_frame(frame);

        Ok(Outcome::Rewritten(shown))
    }
}
