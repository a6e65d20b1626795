//! Integration tests for the write pipeline.
//!
//! Bytes go through the public control surface into a virtual mouse backed
//! by the recording backend, exercising the boundary between the codec,
//! the dispatcher and the device state machine.

use vmouse::device::{ButtonEvent, DeviceIdentity, MouseButton, RecordingBackend, VirtualMouse};
use vmouse::protocol::{encode, ButtonIndex, Command, MAX_WRITE_LEN};
use vmouse::{ControlSurface, WriteFault};

fn surface() -> (ControlSurface<RecordingBackend>, RecordingBackend) {
    let backend = RecordingBackend::new();
    let mut mouse = VirtualMouse::new(backend.clone(), DeviceIdentity::default());
    mouse.register().unwrap();
    (ControlSurface::new(mouse), backend)
}

fn idx(i: u8) -> ButtonIndex {
    ButtonIndex::new(i).unwrap()
}

// ── Scenarios ──

#[test]
fn down_then_click_in_one_write() {
    let (control, backend) = surface();
    let report = control.write(&[0x10, 0x33]).unwrap();

    assert_eq!(report.applied, 2);
    assert_eq!(
        control.buttons(),
        [true, false, false, false, false, false, false, false]
    );

    // click flush + final flush
    let frames = backend.frames();
    assert_eq!(frames.len(), 2);
    assert_eq!(
        frames[0],
        vec![
            ButtonEvent::new(MouseButton::Left, true),
            ButtonEvent::new(MouseButton::Side, true),
        ]
    );
    assert_eq!(frames[1], vec![ButtonEvent::new(MouseButton::Side, false)]);
}

#[test]
fn zero_length_write() {
    let (control, backend) = surface();
    let report = control.write(&[]).unwrap();
    assert_eq!(report.applied, 0);
    assert_eq!(report.frames, 0);
    assert!(backend.frames().is_empty());
}

#[test]
fn several_changes_in_one_write_are_one_frame() {
    let (control, backend) = surface();
    control
        .write(&encode(&[
            Command::ButtonDown(idx(0)),
            Command::ButtonDown(idx(1)),
            Command::ButtonDown(idx(2)),
        ])
        .unwrap())
        .unwrap();
    assert_eq!(backend.frames().len(), 1);
    assert_eq!(backend.frames()[0].len(), 3);
}

// ── Properties ──

#[test]
fn reset_releases_all_from_any_state() {
    for mask in 0u16..256 {
        let (control, _backend) = surface();
        let downs: Vec<u8> = (0..8u8)
            .filter(|i| mask & (1 << i) != 0)
            .map(|i| 0x10 | i)
            .collect();
        control.write(&downs).unwrap();
        assert_eq!(control.buttons().iter().filter(|&&b| b).count(), mask.count_ones() as usize);

        control.write(&[0x00]).unwrap();
        assert_eq!(control.buttons(), [false; 8]);
    }
}

#[test]
fn click_is_press_sync_release() {
    for i in 0..8u8 {
        let (control, backend) = surface();
        control.write(&[0x30 | i]).unwrap();

        let button = MouseButton::from_offset(i).unwrap();
        assert_eq!(
            backend.frames(),
            vec![
                vec![ButtonEvent::new(button, true)],
                vec![ButtonEvent::new(button, false)],
            ]
        );
    }
}

#[test]
fn repeated_reset_has_no_further_effect() {
    let (control, backend) = surface();
    control.write(&[0x14, 0x00]).unwrap();
    let after_first = backend.frames();

    control.write(&[0x00]).unwrap();
    control.write(&[0x00, 0x00, 0x00]).unwrap();
    assert_eq!(backend.frames(), after_first);
    assert_eq!(control.buttons(), [false; 8]);
}

#[test]
fn write_boundary_at_128_bytes() {
    let (control, backend) = surface();

    let mut payload = vec![0x00; MAX_WRITE_LEN];
    payload[MAX_WRITE_LEN - 1] = 0x12;
    let report = control.write(&payload).unwrap();
    assert_eq!(report.applied, MAX_WRITE_LEN);
    assert!(control.buttons()[2]);
    let frames_before = backend.frames().len();

    let oversized = vec![0x20; MAX_WRITE_LEN + 1];
    let err = control.write(&oversized).unwrap_err();
    assert!(matches!(err, WriteFault::TooLarge { len: 129, .. }));
    // Nothing applied: button 2 still held, no new frames
    assert!(control.buttons()[2]);
    assert_eq!(backend.frames().len(), frames_before);
}

#[test]
fn unknown_kinds_never_mutate_and_never_abort() {
    let (control, backend) = surface();
    let mut payload = Vec::new();
    for kind in 4u8..8 {
        for index in 0u8..8 {
            payload.push((kind << 4) | index);
        }
    }
    payload.push(0x17);

    let report = control.write(&payload).unwrap();
    assert_eq!(report.unknown, 32);
    assert_eq!(report.applied, 1);
    assert_eq!(
        backend.frames(),
        vec![vec![ButtonEvent::new(MouseButton::Task, true)]]
    );
}

#[test]
fn motion_bytes_keep_stream_aligned() {
    let (control, _backend) = surface();
    let report = control.write(&[0x80, 0x11, 0xFF, 0x12]).unwrap();
    assert_eq!(report.motion, 2);
    assert_eq!(report.applied, 2);
    assert!(control.buttons()[1]);
    assert!(control.buttons()[2]);
}

// ── Lifecycle ──

#[test]
fn writes_before_registration_are_dropped() {
    let backend = RecordingBackend::new();
    let mouse = VirtualMouse::new(backend.clone(), DeviceIdentity::default());
    let control = ControlSurface::new(mouse);

    let report = control.write(&[0x10, 0x31, 0x00]).unwrap();
    assert_eq!(report.dropped, 3);
    assert_eq!(control.buttons(), [false; 8]);
    assert!(backend.frames().is_empty());

    control.with_mouse(|m| m.register()).unwrap();
    control.write(&[0x10]).unwrap();
    assert_eq!(backend.frames().len(), 1);
}

#[test]
fn writes_after_teardown_are_dropped() {
    let (control, backend) = surface();
    control.write(&[0x10]).unwrap();
    control.shutdown();
    control.shutdown();

    let report = control.write(&[0x20]).unwrap();
    assert_eq!(report.dropped, 1);
    assert_eq!(backend.frames().len(), 1);
    assert_eq!(backend.unregistrations(), 1);
}
