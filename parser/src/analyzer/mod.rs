mod analyzer;
pub mod block_dump;
pub mod survey;

pub use analyzer::*;
