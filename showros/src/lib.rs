//! Restores the recorded player's animations in Quake demos.
//!
//! Demos recorded from the player's own point of view show the player entity
//! with a placeholder model. This crate rewrites those entity updates so the
//! entity plays the run, attack and pain animations of `progs/player.mdl`
//! instead, timed from the demo clock and the client's status messages.

pub mod accessors;
pub mod animation;
pub mod config;
pub mod driver;
mod error;
pub mod fixer;
pub mod weapons;

pub use driver::{FixStats, fix_demo, fix_file};
pub use error::*;
pub use fixer::BlockFixer;
