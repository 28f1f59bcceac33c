use quake_demo::MessageKind;
use thiserror::Error;

use crate::animation::Anim;

/// A block did not carry a message the fixer needs. Blocks like this are
/// passed through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("block has no {0} message")]
pub struct NotFound(pub MessageKind);

#[derive(Debug, Error)]
pub enum FixError {
    /// The held weapon's model has no attack animation.
    #[error("no attack animation for view model {0:?}")]
    UnknownWeaponModel(String),
    /// A local frame number fell outside its animation.
    #[error("animation {anim} has no frame {local}")]
    MissingFrame { anim: Anim, local: i64 },
    /// A model index pointed past the end of the precache list.
    #[error("model index {0} is not in the model table")]
    UnknownModelIndex(u8),
    #[error("demo has no server info block")]
    MissingServerInfo,
    #[error("no view entity was given and the server info block has no set view message")]
    MissingViewEntity(#[source] NotFound),
    #[error(transparent)]
    Demo(#[from] quake_demo::Error),
}
