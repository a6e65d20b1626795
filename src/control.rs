//! Write-side control surface
//!
//! Each write is checked against [`MAX_WRITE_LEN`], decoded and dispatched
//! while holding the device lock, so a write's frames are never interleaved
//! with another writer's.

use parking_lot::Mutex;
use thiserror::Error;
use tracing::{debug, warn};
use vmouse_device::{InputBackend, VirtualMouse};
use vmouse_protocol::{decode, MAX_WRITE_LEN};

use crate::dispatch::{dispatch, DispatchReport};

/// A write rejected before any command was applied
#[derive(Debug, Error)]
pub enum WriteFault {
    #[error("Write of {len} bytes exceeds the {max}-byte limit")]
    TooLarge { len: usize, max: usize },

    /// The payload could not be received from the writer
    #[error("Failed to copy payload: {0}")]
    Copy(#[source] std::io::Error),
}

/// Owns the virtual mouse and serializes writes to it
pub struct ControlSurface<B: InputBackend> {
    mouse: Mutex<VirtualMouse<B>>,
}

impl<B: InputBackend> ControlSurface<B> {
    pub fn new(mouse: VirtualMouse<B>) -> Self {
        Self {
            mouse: Mutex::new(mouse),
        }
    }

    /// Handle one write
    ///
    /// Oversized payloads are rejected whole. Everything else is decoded and
    /// applied in order, followed by one sync.
    pub fn write(&self, payload: &[u8]) -> Result<DispatchReport, WriteFault> {
        if payload.len() > MAX_WRITE_LEN {
            let fault = WriteFault::TooLarge {
                len: payload.len(),
                max: MAX_WRITE_LEN,
            };
            warn!("vmouse: {fault}");
            return Err(fault);
        }

        let mut mouse = self.mouse.lock();
        let report = dispatch(&mut *mouse, decode(payload));
        debug!(
            "vmouse: write of {} bytes: {} applied, {} unknown, {} motion, {} dropped, {} frames",
            payload.len(),
            report.applied,
            report.unknown,
            report.motion,
            report.dropped,
            report.frames
        );
        Ok(report)
    }

    /// Snapshot of the button states
    pub fn buttons(&self) -> [bool; 8] {
        self.mouse.lock().buttons()
    }

    pub fn is_registered(&self) -> bool {
        self.mouse.lock().is_registered()
    }

    /// Run `f` with the device locked
    pub fn with_mouse<R>(&self, f: impl FnOnce(&mut VirtualMouse<B>) -> R) -> R {
        f(&mut *self.mouse.lock())
    }

    /// Unregister the device; later writes are dropped
    pub fn shutdown(&self) {
        self.mouse.lock().unregister();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use vmouse_device::{ButtonEvent, DeviceIdentity, MouseButton, RecordingBackend};

    fn surface() -> (ControlSurface<RecordingBackend>, RecordingBackend) {
        let backend = RecordingBackend::new();
        let mut mouse = VirtualMouse::new(backend.clone(), DeviceIdentity::default());
        mouse.register().unwrap();
        (ControlSurface::new(mouse), backend)
    }

    #[test]
    fn test_write_at_limit_accepted() {
        let (control, _backend) = surface();
        let payload = vec![0x10; MAX_WRITE_LEN];
        let report = control.write(&payload).unwrap();
        assert_eq!(report.applied, MAX_WRITE_LEN);
        assert!(control.buttons()[0]);
    }

    #[test]
    fn test_write_over_limit_rejected_untouched() {
        let (control, backend) = surface();
        let payload = vec![0x10; MAX_WRITE_LEN + 1];
        let err = control.write(&payload).unwrap_err();
        assert!(matches!(
            err,
            WriteFault::TooLarge {
                len: 129,
                max: 128
            }
        ));
        assert_eq!(control.buttons(), [false; 8]);
        assert!(backend.frames().is_empty());
    }

    #[test]
    fn test_empty_write_is_ok() {
        let (control, backend) = surface();
        let report = control.write(&[]).unwrap();
        assert_eq!(report, DispatchReport::default());
        assert!(backend.frames().is_empty());
    }

    #[test]
    fn test_shutdown_drops_later_writes() {
        let (control, backend) = surface();
        control.shutdown();
        assert!(!control.is_registered());
        let report = control.write(&[0x10]).unwrap();
        assert_eq!(report.dropped, 1);
        assert!(!backend.is_live());
        assert!(backend.frames().is_empty());
    }

    #[test]
    fn test_concurrent_writers_keep_frames_whole() {
        let (control, backend) = surface();
        let control = Arc::new(control);

        let handles: Vec<_> = (0..4u8)
            .map(|i| {
                let control = Arc::clone(&control);
                std::thread::spawn(move || {
                    for _ in 0..50 {
                        // press i and i+4 together, then release both together
                        control.write(&[0x10 | i, 0x14 | i]).unwrap();
                        control.write(&[0x20 | i, 0x24 | i]).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let frames = backend.frames();
        assert_eq!(frames.len(), 4 * 50 * 2);
        for frame in frames {
            assert_eq!(frame.len(), 2);
            let ButtonEvent { button, pressed } = frame[0];
            assert_eq!(frame[1].pressed, pressed);
            assert_eq!(frame[1].button.offset(), button.offset() + 4);
        }
        assert_eq!(control.buttons(), [false; 8]);
        assert!(!control.with_mouse(|m| m.is_pressed(MouseButton::Left)));
    }
}
