//! uinput backend using evdev
//!
//! Creates a virtual mouse that appears as a regular pointing device to
//! libinput, X11 and Wayland compositors.

use std::path::PathBuf;

use evdev::{
    uinput::{VirtualDevice, VirtualDeviceBuilder},
    AttributeSet, BusType, EventType, InputEvent, InputId, Key, RelativeAxisType,
};
use tracing::debug;

use crate::backend::{ButtonEvent, Capabilities, DeviceIdentity, InputBackend, RelativeAxis};
use crate::error::DeviceError;

/// Backend writing to `/dev/uinput`
#[derive(Default)]
pub struct UinputBackend {
    device: Option<VirtualDevice>,
}

impl UinputBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl InputBackend for UinputBackend {
    fn register(
        &mut self,
        identity: &DeviceIdentity,
        capabilities: &Capabilities,
    ) -> Result<(), DeviceError> {
        if self.device.is_some() {
            return Err(DeviceError::AlreadyRegistered);
        }

        let mut keys = AttributeSet::<Key>::new();
        for button in &capabilities.buttons {
            keys.insert(Key::new(button.code()));
        }

        let mut axes = AttributeSet::<RelativeAxisType>::new();
        for axis in &capabilities.relative_axes {
            axes.insert(axis_to_code(*axis));
        }

        // A failed step drops the builder, which closes the uinput handle
        let device = VirtualDeviceBuilder::new()
            .map_err(DeviceError::Registration)?
            .name(identity.name.as_str())
            .input_id(InputId::new(
                BusType(identity.bus),
                identity.vendor,
                identity.product,
                identity.version,
            ))
            .with_keys(&keys)
            .map_err(DeviceError::Registration)?
            .with_relative_axes(&axes)
            .map_err(DeviceError::Registration)?
            .build()
            .map_err(DeviceError::Registration)?;

        debug!("uinput device \"{}\" created", identity.name);
        self.device = Some(device);
        Ok(())
    }

    fn emit(&mut self, frame: &[ButtonEvent]) -> Result<(), DeviceError> {
        let device = self.device.as_mut().ok_or(DeviceError::NotReady)?;

        let events: Vec<InputEvent> = frame
            .iter()
            .map(|ev| InputEvent::new(EventType::KEY, ev.button.code(), ev.pressed as i32))
            .collect();

        // emit() appends SYN_REPORT
        device.emit(&events).map_err(DeviceError::Emit)
    }

    fn unregister(&mut self) {
        // Closing the handle destroys the device
        if self.device.take().is_some() {
            debug!("uinput device destroyed");
        }
    }

    fn dev_node(&mut self) -> Option<PathBuf> {
        self.device
            .as_mut()?
            .enumerate_dev_nodes_blocking()
            .ok()?
            .next()?
            .ok()
    }
}

fn axis_to_code(axis: RelativeAxis) -> RelativeAxisType {
    match axis {
        RelativeAxis::X => RelativeAxisType::REL_X,
        RelativeAxis::Y => RelativeAxisType::REL_Y,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::button::MouseButton;

    #[test]
    fn test_emit_before_register_fails() {
        let mut backend = UinputBackend::new();
        let err = backend
            .emit(&[ButtonEvent::new(MouseButton::Left, true)])
            .unwrap_err();
        assert!(matches!(err, DeviceError::NotReady));
    }

    #[test]
    fn test_unregister_without_device_is_noop() {
        let mut backend = UinputBackend::new();
        backend.unregister();
        backend.unregister();
        assert!(backend.dev_node().is_none());
    }

    #[test]
    #[ignore] // Requires uinput access (run with: cargo test -- --ignored)
    fn test_create_mouse() {
        let mut backend = UinputBackend::new();
        backend
            .register(&DeviceIdentity::default(), &Capabilities::mouse())
            .unwrap();
        backend
            .emit(&[ButtonEvent::new(MouseButton::Left, false)])
            .unwrap();
        backend.unregister();
    }
}
