//! Mouse button identifiers in the Linux input code space

use std::fmt;

/// `BTN_MOUSE`, the code of the first mouse button
pub const BUTTON_BASE: u16 = 0x110;

/// The eight buttons the virtual mouse advertises, in code order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Side,
    Extra,
    Forward,
    Back,
    Task,
}

impl MouseButton {
    /// All buttons, ordered by offset from [`BUTTON_BASE`]
    pub const ALL: [MouseButton; 8] = [
        MouseButton::Left,
        MouseButton::Right,
        MouseButton::Middle,
        MouseButton::Side,
        MouseButton::Extra,
        MouseButton::Forward,
        MouseButton::Back,
        MouseButton::Task,
    ];

    /// Button at `offset` from [`BUTTON_BASE`]
    pub fn from_offset(offset: u8) -> Option<Self> {
        Self::ALL.get(offset as usize).copied()
    }

    pub fn offset(self) -> usize {
        self as usize
    }

    /// Linux key code (`BTN_LEFT` .. `BTN_TASK`)
    pub fn code(self) -> u16 {
        BUTTON_BASE + self as u16
    }

    pub fn name(self) -> &'static str {
        match self {
            MouseButton::Left => "BTN_LEFT",
            MouseButton::Right => "BTN_RIGHT",
            MouseButton::Middle => "BTN_MIDDLE",
            MouseButton::Side => "BTN_SIDE",
            MouseButton::Extra => "BTN_EXTRA",
            MouseButton::Forward => "BTN_FORWARD",
            MouseButton::Back => "BTN_BACK",
            MouseButton::Task => "BTN_TASK",
        }
    }
}

impl fmt::Display for MouseButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
