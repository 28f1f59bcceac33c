use serde::{Deserialize, Serialize};
use std::fmt;

/// Server-side entity number. The wire format is a byte or a short depending
/// on the message, so it is widened to u16 everywhere.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub u16);

impl EntityId {
    pub fn raw(self) -> u16 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Server time carried by `svc_time`, in seconds since the level started.
#[derive(Debug, Default, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct DemoTime(pub f32);

impl DemoTime {
    pub fn seconds(self) -> f32 {
        self.0
    }

    /// Widened value used for elapsed-time arithmetic.
    pub fn as_f64(self) -> f64 {
        f64::from(self.0)
    }
}

impl fmt::Display for DemoTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}s", self.0)
    }
}

/// A world coordinate in its wire form (1/8 unit fixed point).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Coord(pub i16);

/// An angle in its wire form (1/256 of a turn).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Angle(pub i8);

pub type Position = [Coord; 3];
