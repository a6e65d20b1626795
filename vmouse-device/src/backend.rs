//! Input subsystem capability used by the virtual mouse

use std::path::PathBuf;

use crate::button::MouseButton;
use crate::error::DeviceError;

/// Linux `BUS_VIRTUAL`
pub const BUS_VIRTUAL: u16 = 0x06;

/// How the device identifies itself to the input subsystem
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceIdentity {
    pub name: String,
    pub bus: u16,
    pub vendor: u16,
    pub product: u16,
    pub version: u16,
}

impl Default for DeviceIdentity {
    fn default() -> Self {
        Self {
            name: "Simulated Clicking and Pointing Device (vmouse)".to_string(),
            bus: BUS_VIRTUAL,
            vendor: 0,
            product: 0,
            version: 1,
        }
    }
}

/// Relative axes declared by the device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelativeAxis {
    X,
    Y,
}

/// Event types and codes advertised at registration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capabilities {
    pub buttons: Vec<MouseButton>,
    /// Declared so consumers classify the device as a mouse; never emitted
    pub relative_axes: Vec<RelativeAxis>,
}

impl Capabilities {
    /// The fixed capability set of the virtual mouse
    pub fn mouse() -> Self {
        Self {
            buttons: MouseButton::ALL.to_vec(),
            relative_axes: vec![RelativeAxis::X, RelativeAxis::Y],
        }
    }
}

/// One button transition inside a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonEvent {
    pub button: MouseButton,
    pub pressed: bool,
}

impl ButtonEvent {
    pub fn new(button: MouseButton, pressed: bool) -> Self {
        Self { button, pressed }
    }
}

/// Delivery side of the virtual mouse
///
/// Implementations talk to whatever consumes input events. A frame passed to
/// [`emit`](InputBackend::emit) must reach the consumer as one synchronized
/// batch.
pub trait InputBackend {
    /// Allocate and expose the device
    ///
    /// On failure nothing may remain allocated.
    fn register(
        &mut self,
        identity: &DeviceIdentity,
        capabilities: &Capabilities,
    ) -> Result<(), DeviceError>;

    /// Deliver one frame of button transitions, terminated by a sync
    fn emit(&mut self, frame: &[ButtonEvent]) -> Result<(), DeviceError>;

    /// Release the device. Must be a no-op when nothing is registered.
    fn unregister(&mut self);

    /// Event node of the registered device, if the backend has one
    fn dev_node(&mut self) -> Option<PathBuf> {
        None
    }
}
