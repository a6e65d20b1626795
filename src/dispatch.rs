//! Applies decoded commands to the virtual mouse
//!
//! One call to [`dispatch`] handles the commands of one write. Commands are
//! applied in order, a click flushes its press before releasing, and a final
//! sync closes the write.

use tracing::{trace, warn};
use vmouse_device::{DeviceError, InputBackend, MouseButton, VirtualMouse};
use vmouse_protocol::{ButtonIndex, Command};

/// What happened while dispatching one write
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Commands that reached the device
    pub applied: usize,
    /// Bytes with an unassigned command kind
    pub unknown: usize,
    /// Motion bytes (reserved, ignored)
    pub motion: usize,
    /// Commands dropped because the device was not registered
    pub dropped: usize,
    /// Frames delivered to the input subsystem
    pub frames: usize,
    /// Frames the input subsystem failed to accept
    pub emit_failures: usize,
}

/// Map a wire button index onto the device button at the same offset
pub fn button_for(index: ButtonIndex) -> MouseButton {
    MouseButton::ALL[index.get() as usize]
}

/// Apply one write's commands, then sync once
pub fn dispatch<B, I>(mouse: &mut VirtualMouse<B>, commands: I) -> DispatchReport
where
    B: InputBackend,
    I: IntoIterator<Item = Command>,
{
    let mut report = DispatchReport::default();

    if !mouse.is_registered() {
        for cmd in commands {
            warn!("vmouse: device not registered, dropping {cmd}");
            report.dropped += 1;
        }
        return report;
    }

    for cmd in commands {
        apply(mouse, cmd, &mut report);
    }

    flush(mouse, &mut report);
    report
}

fn apply<B: InputBackend>(mouse: &mut VirtualMouse<B>, cmd: Command, report: &mut DispatchReport) {
    let result = match cmd {
        Command::Reset => mouse.release_all(),
        Command::ButtonDown(i) => mouse.set_button(button_for(i), true),
        Command::ButtonUp(i) => mouse.set_button(button_for(i), false),
        Command::ButtonClick(i) => {
            let button = button_for(i);
            mouse.set_button(button, true).and_then(|()| {
                // Press and release must land in separate frames
                flush(mouse, report);
                mouse.set_button(button, false)
            })
        }
        Command::Motion(raw) => {
            trace!("vmouse: ignoring motion byte 0x{raw:02X}");
            report.motion += 1;
            return;
        }
        Command::Unknown { kind, index } => {
            warn!("vmouse: received unknown command {kind} with payload {index}");
            report.unknown += 1;
            return;
        }
    };

    match result {
        Ok(()) => report.applied += 1,
        Err(DeviceError::NotReady) => {
            warn!("vmouse: device not ready, dropping {cmd}");
            report.dropped += 1;
        }
        Err(e) => {
            warn!("vmouse: {cmd} failed: {e}");
            report.dropped += 1;
        }
    }
}

fn flush<B: InputBackend>(mouse: &mut VirtualMouse<B>, report: &mut DispatchReport) {
    match mouse.sync_all() {
        Ok(true) => report.frames += 1,
        Ok(false) => {}
        Err(e) => {
            warn!("vmouse: sync failed: {e}");
            report.emit_failures += 1;
        }
    }
}
