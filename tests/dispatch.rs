use htwin::backends::virtual_input::VirtualSource;
use htwin::{
    Context, ErrorInfo, EventKind, FocusPolicy, HtError, MouseSnapshot, StreamKind, Window,
    WindowAttribute, WindowEvent,
};
use pretty_assertions::assert_eq;
use std::cell::RefCell;
use std::rc::Rc;

fn window_with_source(source: VirtualSource) -> Window {
    let ctx = Context::new();
    let mut window = Window::new(&ctx, 0, 0, 320, 240).unwrap();
    window.create_input_manager_with(source).unwrap();
    window
}

fn source(window: &mut Window) -> &mut VirtualSource {
    window.input_source_mut::<VirtualSource>().unwrap()
}

/// Records (MouseX, MouseY, MouseButton) as seen from inside the mouse handler.
fn record_mouse(window: &mut Window) -> Rc<RefCell<Vec<(i32, i32, i32)>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&seen);
    window
        .set_event_handler(EventKind::Mouse, move |w| {
            log.borrow_mut().push((
                w.get_integer(WindowAttribute::MouseX).unwrap(),
                w.get_integer(WindowAttribute::MouseY).unwrap(),
                w.get_integer(WindowAttribute::MouseButton).unwrap(),
            ));
        })
        .unwrap();
    seen
}

#[test]
fn duplicate_motion_is_coalesced() {
    let mut window = window_with_source(VirtualSource::new("e2e"));
    let seen = record_mouse(&mut window);

    let src = source(&mut window);
    src.move_by(1, 0);
    src.move_by(0, 0);
    src.move_by(0, -1);

    assert_eq!(window.poll_input_events().unwrap(), 2);
    assert_eq!(*seen.borrow(), vec![(1, 0, 0), (1, -1, 0)]);

    // Nothing left over.
    assert_eq!(window.poll_input_events().unwrap(), 0);
    assert_eq!(seen.borrow().len(), 2);
}

#[test]
fn button_edges_carry_forward() {
    let mut window = window_with_source(VirtualSource::new("buttons"));
    let src = source(&mut window);
    src.press(0);
    src.press(2);
    src.release(0);

    assert_eq!(window.poll_input_events().unwrap(), 3);
    assert_eq!(window.get_integer(WindowAttribute::MouseButton).unwrap(), 0b100);
    assert_eq!(window.mouse(), MouseSnapshot::new(0, 0, 0b100));
}

#[test]
fn handler_sees_snapshots_in_push_order() {
    let mut window = window_with_source(VirtualSource::new("fifo"));
    let seen = record_mouse(&mut window);

    let src = source(&mut window);
    for i in 1..=10 {
        src.move_to(i * 10, -i);
    }
    assert_eq!(window.poll_input_events().unwrap(), 10);

    // Absolute devices report the change against the preceding slot.
    let got = seen.borrow().clone();
    assert_eq!(got[0], (10, -1, 0));
    assert!(got[1..].iter().all(|&d| d == (10, -1, 0)));
    assert_eq!(window.mouse_delta(), (10, -1));
    assert_eq!(window.get_integer(WindowAttribute::MouseRelative).unwrap(), 0);
}

#[test]
fn overflow_keeps_the_most_recent_sixteen() {
    let mut window = window_with_source(VirtualSource::new("flood"));
    let seen = record_mouse(&mut window);

    let src = source(&mut window);
    for _ in 0..20 {
        src.move_by(1, 0);
    }
    assert_eq!(window.poll_input_events().unwrap(), 16);
    let xs: Vec<i32> = seen.borrow().iter().map(|s| s.0).collect();
    assert_eq!(xs, (5..=20).collect::<Vec<_>>());
    assert_eq!(window.get_integer(WindowAttribute::InputDropped).unwrap(), 4);
}

#[test]
fn missing_manager_is_reported_through_the_callback() {
    let ctx = Context::new();
    let reports: Rc<RefCell<Vec<ErrorInfo>>> = Rc::default();
    let sink = Rc::clone(&reports);
    ctx.set_error_callback(move |info| sink.borrow_mut().push(*info));

    let mut window = Window::new(&ctx, 0, 0, 100, 100).unwrap();
    assert_eq!(window.poll_input_events(), Err(HtError::UninitializedInputManager));
    assert_eq!(window.destroy_input_manager(), Err(HtError::UninitializedInputManager));

    let reports = reports.borrow();
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].function, "Window::poll_input_events");
    assert_eq!(reports[0].error(), Some(HtError::UninitializedInputManager));
    assert!(reports[0].file.ends_with("window.rs"));
    assert_eq!(reports[1].result, HtError::UninitializedInputManager.code());
}

#[test]
fn second_manager_on_the_same_window_fails() {
    let mut window = window_with_source(VirtualSource::new("one"));
    assert_eq!(
        window.create_input_manager_with(VirtualSource::new("two")),
        Err(HtError::InputManagerCreation)
    );
    window.destroy_input_manager().unwrap();
    window.create_input_manager_with(VirtualSource::new("two")).unwrap();
}

#[test]
fn stream_claims_are_exclusive_until_dropped() {
    let ctx = Context::new();
    let claim = ctx.claim(StreamKind::XInput2Display).unwrap();
    assert_eq!(ctx.claim(StreamKind::XInput2Display).err(), Some(HtError::InputManagerCreation));
    drop(claim);
    assert!(!ctx.is_claimed(StreamKind::XInput2Display));
    assert!(ctx.claim(StreamKind::XInput2Display).is_ok());
}

#[test]
fn nested_poll_from_a_handler_is_a_no_op() {
    let mut window = window_with_source(VirtualSource::new("nested"));
    let inner = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&inner);
    window
        .set_event_handler(EventKind::Mouse, move |w| {
            log.borrow_mut().push(w.poll_input_events().unwrap());
        })
        .unwrap();

    let src = source(&mut window);
    src.move_by(1, 1);
    src.move_by(1, 1);
    assert_eq!(window.poll_input_events().unwrap(), 2);
    assert_eq!(*inner.borrow(), vec![0, 0]);
    assert!(window.queue().is_empty());
}

#[test]
fn handler_may_destroy_the_window() {
    let mut window = window_with_source(VirtualSource::new("close"));
    let calls = Rc::new(RefCell::new(0));
    let count = Rc::clone(&calls);
    window
        .set_event_handler(EventKind::Mouse, move |w| {
            *count.borrow_mut() += 1;
            w.destroy().unwrap();
        })
        .unwrap();

    let src = source(&mut window);
    src.move_by(1, 0);
    src.move_by(1, 0);
    assert_eq!(window.poll_input_events().unwrap(), 1);
    assert_eq!(*calls.borrow(), 1);
    assert!(!window.is_alive());
}

#[test]
fn unfocused_window_discards_adapter_gated_input() {
    let mut window = window_with_source(VirtualSource::new("gated"));
    let seen = record_mouse(&mut window);

    window.handle_window_event(WindowEvent::Focus(false)).unwrap();
    assert_eq!(source(&mut window).last_focus(), Some(false));
    source(&mut window).move_by(4, 4);
    assert_eq!(window.poll_input_events().unwrap(), 0);

    window.handle_window_event(WindowEvent::Focus(true)).unwrap();
    source(&mut window).move_by(1, 0);
    assert_eq!(window.poll_input_events().unwrap(), 1);
    assert_eq!(*seen.borrow(), vec![(1, 0, 0)]);
}

#[test]
fn background_sources_queue_while_unfocused() {
    let mut window =
        window_with_source(VirtualSource::new("sink").with_policy(FocusPolicy::Consumer));
    let focused = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&focused);
    window
        .set_event_handler(EventKind::Mouse, move |w| log.borrow_mut().push(w.is_focused()))
        .unwrap();

    window.handle_window_event(WindowEvent::Focus(false)).unwrap();
    source(&mut window).move_by(2, 2);
    assert_eq!(window.poll_input_events().unwrap(), 1);
    assert_eq!(*focused.borrow(), vec![false]);
}

#[test]
fn query_without_pending_input_reads_the_last_snapshot() {
    let mut window = window_with_source(VirtualSource::new("idle"));
    source(&mut window).move_by(7, -3);
    window.poll_input_events().unwrap();
    assert_eq!(window.get_integer(WindowAttribute::MouseX).unwrap(), 7);
    assert_eq!(window.get_integer(WindowAttribute::MouseY).unwrap(), -3);
    assert_eq!(window.get_integer(WindowAttribute::MouseRelative).unwrap(), 1);
}

#[test]
fn each_snapshot_reports_the_mode_of_its_own_device() {
    let mut window = window_with_source(VirtualSource::new("mixed"));
    let seen = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&seen);
    window
        .set_event_handler(EventKind::Mouse, move |w| {
            log.borrow_mut().push((
                w.get_integer(WindowAttribute::MouseRelative).unwrap(),
                w.get_integer(WindowAttribute::MouseX).unwrap(),
            ));
        })
        .unwrap();

    let src = source(&mut window);
    src.move_by(5, 0);
    src.move_to(300, 0);
    src.move_by(2, 0);
    assert_eq!(window.poll_input_events().unwrap(), 3);
    assert_eq!(*seen.borrow(), vec![(1, 5), (0, 295), (1, 302)]);
}

#[test]
fn failed_backend_leaves_no_input_manager() {
    let ctx = Context::new();
    let reports: Rc<RefCell<Vec<ErrorInfo>>> = Rc::default();
    let sink = Rc::clone(&reports);
    ctx.set_error_callback(move |info| sink.borrow_mut().push(*info));

    // Whichever backend this platform builds, its stream is already taken.
    let _held = [
        ctx.claim(StreamKind::HidManager).unwrap(),
        ctx.claim(StreamKind::XInput2Display).unwrap(),
        ctx.claim(StreamKind::Win32RawInput).unwrap(),
    ];

    let mut window = Window::new(&ctx, 0, 0, 100, 100).unwrap();
    assert_eq!(window.create_input_manager(), Err(HtError::InputManagerCreation));
    assert!(!window.has_input_manager());
    {
        let reports = reports.borrow();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].function, "Window::create_input_manager");
        assert_eq!(reports[0].error(), Some(HtError::InputManagerCreation));
    }

    assert_eq!(window.poll_input_events(), Err(HtError::UninitializedInputManager));
    assert_eq!(reports.borrow().len(), 2);
}
