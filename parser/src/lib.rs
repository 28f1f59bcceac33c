//! Reading and writing of NetQuake (protocol 15) `.dem` recordings.
//!
//! A demo is a cd track line followed by a sequence of [`Block`]s, each of
//! which carries the client's view angles and the server messages received
//! in one network frame. Every message is decoded into a [`Message`] and can
//! be encoded back to the exact bytes it was read from.

pub mod analyzer;
mod demo;
mod error;
pub mod message;
pub mod types;
mod writer;

pub use demo::*;
pub use error::*;
pub use message::{Message, MessageKind};
pub use strum;
