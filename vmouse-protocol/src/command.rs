//! Command byte decoding and encoding
//!
//! Every byte written to the control surface is one command:
//!
//! ```text
//!   bit  7    6 5 4    3      2 1 0
//!      [ M | kind   | rsvd | index ]
//! ```
//!
//! With `M` set the byte is a motion marker (reserved, no payload defined).
//! Otherwise `kind` selects reset/down/up/click and `index` the button.

use std::fmt;
use std::iter::FusedIterator;
use std::str::FromStr;

use crate::error::ProtocolError;

/// Marks a motion byte
pub const MOTION_FLAG: u8 = 0x80;
/// Shift of the kind field
pub const KIND_SHIFT: u8 = 4;
/// Mask of the kind field after shifting
pub const KIND_MASK: u8 = 0x07;
/// Mask of the button index field
pub const INDEX_MASK: u8 = 0x07;
/// Number of addressable buttons
pub const BUTTON_COUNT: usize = 8;

/// Command kind values (bits 6..4)
pub mod kind {
    pub const RESET: u8 = 0;
    pub const DOWN: u8 = 1;
    pub const UP: u8 = 2;
    pub const CLICK: u8 = 3;

    /// Get human-readable name for a kind value
    pub fn name(kind: u8) -> &'static str {
        match kind {
            RESET => "RESET",
            DOWN => "DOWN",
            UP => "UP",
            CLICK => "CLICK",
            _ => "UNKNOWN",
        }
    }
}

/// Button index on the wire (0-7)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ButtonIndex(u8);

impl ButtonIndex {
    /// Create an index, rejecting values above 7
    pub fn new(index: u8) -> Result<Self, ProtocolError> {
        if (index as usize) < BUTTON_COUNT {
            Ok(Self(index))
        } else {
            Err(ProtocolError::InvalidButtonIndex(index))
        }
    }

    /// Take the low three bits of a command byte
    pub const fn from_bits(byte: u8) -> Self {
        Self(byte & INDEX_MASK)
    }

    pub const fn get(self) -> u8 {
        self.0
    }

    /// All eight indices in ascending order
    pub fn all() -> impl Iterator<Item = ButtonIndex> {
        (0..BUTTON_COUNT as u8).map(ButtonIndex)
    }
}

impl TryFrom<u8> for ButtonIndex {
    type Error = ProtocolError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for ButtonIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One decoded control byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Release every button
    Reset,
    ButtonDown(ButtonIndex),
    ButtonUp(ButtonIndex),
    /// Press, flush, release
    ButtonClick(ButtonIndex),
    /// Motion marker; the lower seven bits are reserved
    Motion(u8),
    /// Button byte with a kind in 4..=7
    Unknown { kind: u8, index: u8 },
}

impl Command {
    /// Decode a single control byte
    pub fn decode(byte: u8) -> Self {
        if byte & MOTION_FLAG != 0 {
            return Command::Motion(byte);
        }

        let index = ButtonIndex::from_bits(byte);
        match (byte >> KIND_SHIFT) & KIND_MASK {
            kind::RESET => Command::Reset,
            kind::DOWN => Command::ButtonDown(index),
            kind::UP => Command::ButtonUp(index),
            kind::CLICK => Command::ButtonClick(index),
            other => Command::Unknown {
                kind: other,
                index: index.get(),
            },
        }
    }

    /// Encode to a control byte
    ///
    /// Motion and unknown commands have no canonical encoding and yield `None`.
    pub fn encode(&self) -> Option<u8> {
        let (kind, index) = match *self {
            Command::Reset => (kind::RESET, 0),
            Command::ButtonDown(i) => (kind::DOWN, i.get()),
            Command::ButtonUp(i) => (kind::UP, i.get()),
            Command::ButtonClick(i) => (kind::CLICK, i.get()),
            Command::Motion(_) | Command::Unknown { .. } => return None,
        };
        Some((kind << KIND_SHIFT) | index)
    }

    /// Button index this command targets, if any
    pub fn button(&self) -> Option<ButtonIndex> {
        match *self {
            Command::ButtonDown(i) | Command::ButtonUp(i) | Command::ButtonClick(i) => Some(i),
            _ => None,
        }
    }

    /// Protocol fault carried by this command, if it is not a valid button command
    pub fn fault(&self) -> Option<ProtocolError> {
        match *self {
            Command::Unknown { kind, index } => Some(ProtocolError::UnknownKind { kind, index }),
            _ => None,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Reset => write!(f, "reset"),
            Command::ButtonDown(i) => write!(f, "down:{i}"),
            Command::ButtonUp(i) => write!(f, "up:{i}"),
            Command::ButtonClick(i) => write!(f, "click:{i}"),
            Command::Motion(raw) => write!(f, "motion(0x{raw:02X})"),
            Command::Unknown { kind, index } => write!(f, "unknown(kind={kind}, button={index})"),
        }
    }
}

/// Parses `reset`, `down:N`, `up:N` and `click:N` (case-insensitive)
impl FromStr for Command {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (verb, arg) = match s.split_once(':') {
            Some((verb, arg)) => (verb.trim(), Some(arg.trim())),
            None => (s, None),
        };

        let index = |arg: Option<&str>| -> Result<ButtonIndex, ProtocolError> {
            let arg = arg.ok_or_else(|| {
                ProtocolError::ParseCommand(format!("\"{s}\" needs a button index"))
            })?;
            let value: u8 = arg
                .parse()
                .map_err(|_| ProtocolError::ParseCommand(format!("bad button index \"{arg}\"")))?;
            ButtonIndex::new(value)
        };

        match verb.to_ascii_lowercase().as_str() {
            "reset" if arg.is_none() => Ok(Command::Reset),
            "down" | "press" => Ok(Command::ButtonDown(index(arg)?)),
            "up" | "release" => Ok(Command::ButtonUp(index(arg)?)),
            "click" => Ok(Command::ButtonClick(index(arg)?)),
            _ => Err(ProtocolError::ParseCommand(format!("unknown command \"{s}\""))),
        }
    }
}

/// Lazily decode a buffer, one command per byte
pub fn decode(buf: &[u8]) -> Commands<'_> {
    Commands { bytes: buf.iter() }
}

/// Encode a command list into one write payload
pub fn encode(commands: &[Command]) -> Result<Vec<u8>, ProtocolError> {
    commands
        .iter()
        .map(|cmd| match cmd.encode() {
            Some(byte) => Ok(byte),
            None => match cmd.fault() {
                Some(fault) => Err(fault),
                None => Err(ProtocolError::MotionReserved),
            },
        })
        .collect()
}

/// Iterator returned by [`decode`]
///
/// Single pass: it is not `Clone`, so a write cannot be replayed from it.
///
/// ```compile_fail
/// let commands = vmouse_protocol::decode(&[0x10]);
/// let _again = commands.clone();
/// ```
#[derive(Debug)]
pub struct Commands<'a> {
    bytes: std::slice::Iter<'a, u8>,
}

impl Iterator for Commands<'_> {
    type Item = Command;

    fn next(&mut self) -> Option<Command> {
        self.bytes.next().map(|&b| Command::decode(b))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.bytes.size_hint()
    }
}

impl ExactSizeIterator for Commands<'_> {}
impl FusedIterator for Commands<'_> {}
