use htwin::backends::virtual_input::VirtualSource;
use htwin::{Context, DeviceClass, EventKind, Window, WindowAttribute};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), htwin::HtError> {
    // RUST_LOG=htwin=debug shows device notices and queue warnings.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let ctx = Context::new();
    ctx.set_error_callback(|info| {
        eprintln!("{}:{} {} -> {}", info.file, info.line, info.function, info.result);
    });

    let mut window = Window::new(&ctx, 0, 0, 640, 480)?;
    window.create_input_manager_with(VirtualSource::new("demo").with_device(1))?;
    window.set_event_handler(EventKind::Mouse, |w| {
        let x = w.get_integer(WindowAttribute::MouseX).unwrap_or(0);
        let y = w.get_integer(WindowAttribute::MouseY).unwrap_or(0);
        let buttons = w.get_integer(WindowAttribute::MouseButton).unwrap_or(0);
        println!("(Virtual) mouse at ({x}, {y}) buttons={buttons:05b}");
    })?;

    // Inject some sample input
    if let Some(src) = window.input_source_mut::<VirtualSource>() {
        src.arrive(DeviceClass::Mouse);
        src.move_by(1, 0);
        src.move_by(0, 0); // coalesced
        src.move_by(0, -1);
        src.press(0);
        src.press(2);
        src.release(0);
    }

    let n = window.poll_input_events()?;
    println!("dispatched {n} snapshots");

    // Reported through the callback as well as returned.
    window.destroy_input_manager()?;
    let _ = window.poll_input_events();
    Ok(())
}
