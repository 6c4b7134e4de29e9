use swm_core::config::Cfg;
use swm_core::state::State;
use x11rb::connection::Connection;
use x11rb::protocol::Event;
use x11rb::rust_connection::RustConnection;

use crate::error::{Error, Result};
use crate::manager::bar::BarManager;
use crate::manager::spawn::ignore_children;
use crate::manager::Manager;
use crate::x11::call_wrapper::CallWrapper;
use crate::x11::colors::alloc_colors;
use crate::x11::error_handler::is_expected;
use crate::x11::state_lifecycle::{
    create_missing_bars, create_wm_check_win, get_screen_dimensions, load_cursors, open_font,
};

pub(crate) fn run_wm() -> Result<()> {
    ignore_children()?;
    let (connection, screen_num) = RustConnection::connect(None)?;
    let mut call_wrapper = CallWrapper::new(connection)?;
    let screen = call_wrapper.inner().setup().roots[screen_num].clone();
    call_wrapper.try_become_wm(screen.root)?;
    tracing::info!("Became wm on screen {screen_num}");

    let cfg = Cfg::new();
    let font_name = cfg.options.font.clone();
    let cursor_name = cfg.options.cursor_name.clone();
    let color_builder = cfg.colors;
    let autostart = cfg.autostart.clone();

    let font = open_font(call_wrapper.inner(), &font_name)?;
    let bar_height = font.metrics.bar_height() as i32;
    let mut state = State::new(
        cfg,
        screen.root,
        screen.width_in_pixels as i32,
        screen.height_in_pixels as i32,
        bar_height,
    );
    let screens = get_screen_dimensions(
        call_wrapper.inner(),
        state.screen_width,
        state.screen_height,
    )?;
    state.update_geometry(&screens);
    tracing::debug!("Created {} monitors", state.monitors.len());

    let cursors = load_cursors(call_wrapper.inner(), screen_num, &cursor_name)?;
    state.colors = alloc_colors(call_wrapper.inner(), screen.default_colormap, color_builder)?;
    let bar_manager = BarManager::new(call_wrapper.inner(), &screen, font, bar_height)?;
    create_missing_bars(call_wrapper.inner(), &screen, &mut state, cursors.normal)?;
    state.wm_check_win = create_wm_check_win(call_wrapper.inner(), screen.root)?;
    call_wrapper.set_default_manager_props(&state)?;

    let mut manager = Manager::new(bar_manager, cursors, screen);
    manager.init(&mut call_wrapper, &mut state, &autostart)?;
    call_wrapper.sync()?;
    tracing::info!("Starting event loop");
    let result = event_loop(&mut call_wrapper, &manager, &mut state);
    match result {
        Err(Error::GracefulShutdown) => {
            manager.cleanup(&mut call_wrapper, &mut state)?;
            Ok(())
        }
        other => other,
    }
}

fn event_loop(call_wrapper: &mut CallWrapper, manager: &Manager, state: &mut State) -> Result<()> {
    loop {
        let event = call_wrapper.next_event()?;
        handle_event(event, call_wrapper, manager, state)?;
    }
}

pub(crate) fn handle_event(
    event: Event,
    call_wrapper: &mut CallWrapper,
    manager: &Manager,
    state: &mut State,
) -> Result<()> {
    tracing::trace!("Got event {event:?}");
    match event {
        Event::ButtonPress(e) => manager.handle_button_press(call_wrapper, e, state),
        Event::ClientMessage(e) => manager.handle_client_message(call_wrapper, e, state),
        Event::ConfigureRequest(e) => manager.handle_configure_request(call_wrapper, e, state),
        Event::ConfigureNotify(e) => manager.handle_configure_notify(call_wrapper, e, state),
        Event::DestroyNotify(e) => manager.handle_destroy_notify(call_wrapper, e, state),
        Event::EnterNotify(e) => manager.handle_enter_notify(call_wrapper, e, state),
        Event::Expose(e) => manager.handle_expose(call_wrapper, e, state),
        Event::FocusIn(e) => manager.handle_focus_in(call_wrapper, e, state),
        Event::KeyPress(e) => manager.handle_key_press(call_wrapper, e, state),
        Event::MappingNotify(e) => manager.handle_mapping_notify(call_wrapper, e, state),
        Event::MapRequest(e) => manager.handle_map_request(call_wrapper, e, state),
        Event::MotionNotify(e) => manager.handle_motion_notify(call_wrapper, e, state),
        Event::PropertyNotify(e) => manager.handle_property_notify(call_wrapper, e, state),
        Event::UnmapNotify(e) => manager.handle_unmap_notify(call_wrapper, e, state),
        Event::Error(e) => {
            if state.should_ignore_error(e.sequence) || is_expected(e.error_kind, e.major_opcode) {
                tracing::debug!(
                    "Ignoring error {:?} from request {} ({:?})",
                    e.error_kind,
                    e.major_opcode,
                    e.request_name
                );
                Ok(())
            } else {
                Err(Error::FatalX11 {
                    kind: e.error_kind,
                    request_code: e.major_opcode,
                    error_code: e.error_code,
                })
            }
        }
        _ => Ok(()),
    }
}
