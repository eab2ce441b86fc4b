//! Backend decoders feeding a real window through the virtual source.

use htwin::backends::hid_values::{decode_value, BootMouseParser};
use htwin::backends::raw_input::{decode_mouse, RawMouse, VirtualDesktopScale};
use htwin::backends::virtual_input::VirtualSource;
use htwin::backends::xinput2::{decode_raw, XiRawKind, XiRawRecord};
use htwin::{
    Context, DeviceClass, EventKind, MotionMode, MouseSnapshot, RawInput, Window, WindowAttribute,
};
use pretty_assertions::assert_eq;
use std::cell::RefCell;
use std::rc::Rc;

fn window() -> Window {
    let mut window = Window::new(&Context::new(), 0, 0, 200, 200).unwrap();
    window.create_input_manager_with(VirtualSource::new("replay")).unwrap();
    window
}

/// Dispatch everything queued, recording the snapshot each handler call sees.
fn drain(window: &mut Window) -> Vec<MouseSnapshot> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&seen);
    window
        .set_event_handler(EventKind::Mouse, move |w| log.borrow_mut().push(w.mouse()))
        .unwrap();
    window.poll_input_events().unwrap();
    let out = seen.borrow().clone();
    out
}

#[test]
fn boot_mouse_reports_become_complete_snapshots() {
    let mut w = window();
    let mut parser = BootMouseParser::new(None);
    let mut values = Vec::new();
    parser.parse(1, &[0b001, 3, 0], &mut values);
    parser.parse(1, &[0b001, 0, 2], &mut values);
    parser.parse(1, &[0b000, 0, 0], &mut values);

    let src = w.input_source_mut::<VirtualSource>().unwrap();
    for v in &values {
        if let Some(input) = decode_value(v) {
            src.feed(input);
        }
    }

    // One element per callback: button, then x, then y, then release.
    assert_eq!(
        drain(&mut w),
        vec![
            MouseSnapshot::new(0, 0, 0b001),
            MouseSnapshot::new(3, 0, 0b001),
            MouseSnapshot::new(3, 2, 0b001),
            MouseSnapshot::new(3, 2, 0b000),
        ]
    );
}

#[test]
fn gamepad_values_are_not_queued() {
    let mut w = window();
    let mut parser = BootMouseParser::new(None);
    let mut values = Vec::new();
    parser.parse(1, &[0, 1, 1], &mut values);
    for v in &mut values {
        v.device_usage = DeviceClass::Gamepad.usage();
    }
    let src = w.input_source_mut::<VirtualSource>().unwrap();
    for v in &values {
        let input = decode_value(v).unwrap();
        assert_eq!(input, RawInput::Ignored(DeviceClass::Gamepad));
        src.feed(input);
    }
    assert!(drain(&mut w).is_empty());
}

#[test]
fn raw_input_packets_patch_button_masks() {
    let mut w = window();
    let scale = VirtualDesktopScale::default();
    let packets = [
        RawMouse { last_x: 2, button_flags: 0x001 | 0x010, ..RawMouse::default() },
        RawMouse { last_y: 1, button_flags: 0x002, ..RawMouse::default() },
    ];
    let src = w.input_source_mut::<VirtualSource>().unwrap();
    for p in &packets {
        src.feed(RawInput::Mouse(decode_mouse(p, scale)));
    }

    assert_eq!(
        drain(&mut w),
        vec![MouseSnapshot::new(2, 0, 0b101), MouseSnapshot::new(2, 1, 0b100)]
    );
    assert_eq!(w.get_integer(WindowAttribute::MouseRelative).unwrap(), 1);
}

#[test]
fn xinput2_records_map_buttons_and_motion() {
    let mut w = window();
    let rec = |kind, detail, values| XiRawRecord {
        device: 12,
        kind,
        detail,
        values,
        mode: MotionMode::Relative,
    };
    let records = [
        rec(XiRawKind::ButtonPress, 3, [None; 2]),
        rec(XiRawKind::Motion, 0, [Some(-1.2), Some(0.0)]),
        rec(XiRawKind::ButtonPress, 4, [None; 2]),
        rec(XiRawKind::ButtonRelease, 3, [None; 2]),
    ];
    let src = w.input_source_mut::<VirtualSource>().unwrap();
    for r in &records {
        if let Some(report) = decode_raw(r) {
            src.feed(RawInput::Mouse(report));
        }
    }

    assert_eq!(
        drain(&mut w),
        vec![
            MouseSnapshot::new(0, 0, 0b010),
            MouseSnapshot::new(-1, 0, 0b010),
            MouseSnapshot::new(-1, 0, 0),
        ]
    );
}
