//! Virtual mouse state machine
//!
//! Tracks the eight button states and the registration lifecycle, and batches
//! button transitions into frames handed to an [`InputBackend`].

use tracing::{debug, info};

use crate::backend::{ButtonEvent, Capabilities, DeviceIdentity, InputBackend};
use crate::button::MouseButton;
use crate::error::DeviceError;

/// Registration lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Unregistered,
    Registered,
}

/// Virtual mouse device
pub struct VirtualMouse<B: InputBackend> {
    backend: B,
    identity: DeviceIdentity,
    lifecycle: Lifecycle,
    buttons: [bool; 8],
    /// Transitions since the last sync, in the order they were made
    pending: Vec<ButtonEvent>,
}

impl<B: InputBackend> VirtualMouse<B> {
    /// Create an unregistered device
    pub fn new(backend: B, identity: DeviceIdentity) -> Self {
        Self {
            backend,
            identity,
            lifecycle: Lifecycle::Unregistered,
            buttons: [false; 8],
            pending: Vec::new(),
        }
    }

    /// Register the device with the input subsystem
    pub fn register(&mut self) -> Result<(), DeviceError> {
        if self.lifecycle == Lifecycle::Registered {
            return Err(DeviceError::AlreadyRegistered);
        }

        if let Err(e) = self
            .backend
            .register(&self.identity, &Capabilities::mouse())
        {
            self.backend.unregister();
            return Err(e);
        }

        self.buttons = [false; 8];
        self.pending.clear();
        self.lifecycle = Lifecycle::Registered;
        info!("Virtual mouse registered: {}", self.identity.name);
        Ok(())
    }

    pub fn is_registered(&self) -> bool {
        self.lifecycle == Lifecycle::Registered
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn identity(&self) -> &DeviceIdentity {
        &self.identity
    }

    /// Set a button's in-memory state
    ///
    /// Only an actual transition is queued for the next sync.
    pub fn set_button(&mut self, button: MouseButton, pressed: bool) -> Result<(), DeviceError> {
        if !self.is_registered() {
            return Err(DeviceError::NotReady);
        }

        let slot = &mut self.buttons[button.offset()];
        if *slot != pressed {
            *slot = pressed;
            self.pending.push(ButtonEvent::new(button, pressed));
        }
        Ok(())
    }

    /// Release all buttons
    pub fn release_all(&mut self) -> Result<(), DeviceError> {
        for button in MouseButton::ALL {
            self.set_button(button, false)?;
        }
        Ok(())
    }

    /// Flush queued transitions as one synchronized frame
    ///
    /// Returns whether a frame was emitted; with nothing queued the consumer
    /// sees nothing. A frame that fails to emit is discarded.
    pub fn sync_all(&mut self) -> Result<bool, DeviceError> {
        if !self.is_registered() {
            return Err(DeviceError::NotReady);
        }
        if self.pending.is_empty() {
            return Ok(false);
        }

        let frame = std::mem::take(&mut self.pending);
        self.backend.emit(&frame)?;
        Ok(true)
    }

    /// Tear the device down. Safe to call in any state.
    pub fn unregister(&mut self) {
        if self.lifecycle == Lifecycle::Unregistered {
            return;
        }
        self.backend.unregister();
        self.lifecycle = Lifecycle::Unregistered;
        self.buttons = [false; 8];
        self.pending.clear();
        info!("Virtual mouse removed");
    }

    pub fn is_pressed(&self, button: MouseButton) -> bool {
        self.buttons[button.offset()]
    }

    /// Snapshot of all button states, indexed by offset
    pub fn buttons(&self) -> [bool; 8] {
        self.buttons
    }

    /// Number of transitions waiting for the next sync
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Event node of the registered device, if known
    pub fn dev_node(&mut self) -> Option<std::path::PathBuf> {
        self.backend.dev_node()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}

impl<B: InputBackend> Drop for VirtualMouse<B> {
    fn drop(&mut self) {
        if self.is_registered() {
            debug!("Dropping registered virtual mouse");
        }
        self.unregister();
    }
}
