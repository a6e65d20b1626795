//! Protocol error types

use thiserror::Error;

/// Errors produced while building or parsing control commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Button index outside 0..=7
    #[error("Invalid button index {0} (expected 0-7)")]
    InvalidButtonIndex(u8),

    /// Command kind bits held a value with no assigned meaning
    #[error("Unknown command kind {kind} (button {index})")]
    UnknownKind { kind: u8, index: u8 },

    /// Motion bytes are framed but carry no defined payload yet
    #[error("Motion commands are reserved")]
    MotionReserved,

    /// Textual command could not be parsed
    #[error("Cannot parse command: {0}")]
    ParseCommand(String),
}
