//! Virtual mouse device
//!
//! [`VirtualMouse`] owns the button state and registration lifecycle and
//! delivers synchronized frames through an [`InputBackend`]. The
//! [`UinputBackend`] talks to the kernel via `/dev/uinput`;
//! [`RecordingBackend`] keeps frames in memory.

pub mod backend;
pub mod button;
pub mod error;
pub mod mouse;
pub mod recording;
pub mod uinput;

pub use backend::{
    ButtonEvent, Capabilities, DeviceIdentity, InputBackend, RelativeAxis, BUS_VIRTUAL,
};
pub use button::{MouseButton, BUTTON_BASE};
pub use error::DeviceError;
pub use mouse::{Lifecycle, VirtualMouse};
pub use recording::RecordingBackend;
pub use uinput::UinputBackend;
