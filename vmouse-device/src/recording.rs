//! In-memory backend that records frames instead of delivering them
//!
//! Cloning a [`RecordingBackend`] shares the same log, so a test can hand one
//! clone to a [`VirtualMouse`](crate::VirtualMouse) and inspect the other.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::backend::{ButtonEvent, Capabilities, DeviceIdentity, InputBackend};
use crate::error::DeviceError;

#[derive(Debug, Default)]
struct Log {
    live: bool,
    identity: Option<DeviceIdentity>,
    capabilities: Option<Capabilities>,
    frames: Vec<Vec<ButtonEvent>>,
    registrations: usize,
    unregistrations: usize,
    refuse_registration: bool,
    fail_emits: bool,
}

/// Recording backend for tests and dry runs
#[derive(Debug, Clone, Default)]
pub struct RecordingBackend {
    log: Arc<Mutex<Log>>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend whose registration always fails
    pub fn refusing() -> Self {
        let backend = Self::new();
        backend.log.lock().refuse_registration = true;
        backend
    }

    /// Make subsequent emits fail (or succeed again)
    pub fn set_fail_emits(&self, fail: bool) {
        self.log.lock().fail_emits = fail;
    }

    /// Whether a device is currently registered
    pub fn is_live(&self) -> bool {
        self.log.lock().live
    }

    /// All frames delivered so far
    pub fn frames(&self) -> Vec<Vec<ButtonEvent>> {
        self.log.lock().frames.clone()
    }

    /// Remove and return the frames delivered so far
    pub fn take_frames(&self) -> Vec<Vec<ButtonEvent>> {
        std::mem::take(&mut self.log.lock().frames)
    }

    pub fn identity(&self) -> Option<DeviceIdentity> {
        self.log.lock().identity.clone()
    }

    pub fn capabilities(&self) -> Option<Capabilities> {
        self.log.lock().capabilities.clone()
    }

    pub fn registrations(&self) -> usize {
        self.log.lock().registrations
    }

    pub fn unregistrations(&self) -> usize {
        self.log.lock().unregistrations
    }
}

impl InputBackend for RecordingBackend {
    fn register(
        &mut self,
        identity: &DeviceIdentity,
        capabilities: &Capabilities,
    ) -> Result<(), DeviceError> {
        let mut log = self.log.lock();
        if log.live {
            return Err(DeviceError::AlreadyRegistered);
        }
        if log.refuse_registration {
            return Err(DeviceError::Registration(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "registration refused",
            )));
        }
        log.live = true;
        log.registrations += 1;
        log.identity = Some(identity.clone());
        log.capabilities = Some(capabilities.clone());
        Ok(())
    }

    fn emit(&mut self, frame: &[ButtonEvent]) -> Result<(), DeviceError> {
        let mut log = self.log.lock();
        if !log.live {
            return Err(DeviceError::NotReady);
        }
        if log.fail_emits {
            return Err(DeviceError::Emit(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "emit failure injected",
            )));
        }
        log.frames.push(frame.to_vec());
        Ok(())
    }

    fn unregister(&mut self) {
        let mut log = self.log.lock();
        if log.live {
            log.live = false;
            log.unregistrations += 1;
        }
    }
}
