//! Wire codec for the vmouse control surface
//!
//! A write to the control surface is a sequence of single-byte commands,
//! at most [`MAX_WRITE_LEN`] bytes long. This crate decodes those bytes into
//! typed [`Command`] values and encodes them again for clients.

pub mod command;
pub mod error;

pub use command::{
    decode, encode, kind, ButtonIndex, Command, Commands, BUTTON_COUNT, MOTION_FLAG,
};
pub use error::ProtocolError;

/// Largest payload accepted in a single write
pub const MAX_WRITE_LEN: usize = 128;
