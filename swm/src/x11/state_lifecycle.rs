use swm_core::geometry::Rect;
use swm_core::render::FontMetrics;
use swm_core::state::State;
use x11rb::connection::{Connection, RequestConnection};
use x11rb::protocol::xproto::{
    AtomEnum, BackPixmap, ConnectionExt, CreateWindowAux, Cursor, EventMask, Font,
    QueryFontReply, Screen, Window, WindowClass,
};
use x11rb::rust_connection::RustConnection;
use x11rb::wrapper::ConnectionExt as _;
use x11rb::COPY_DEPTH_FROM_PARENT;

use crate::error::{Error, Result};
use crate::x11::call_wrapper::CallWrapper;

const MOVE_CURSOR: &str = "fleur";
const RESIZE_CURSOR: &str = "sizing";

pub(crate) struct LoadedFont {
    pub(crate) id: Font,
    pub(crate) metrics: FontMetrics,
}

pub(crate) fn open_font(connection: &RustConnection, name: &str) -> Result<LoadedFont> {
    let id = connection.generate_id()?;
    connection
        .open_font(id, name.as_bytes())?
        .check()
        .map_err(|_| Error::NoFont(name.to_owned()))?;
    let reply = connection.query_font(id)?.reply()?;
    tracing::debug!(
        "Opened font {name}, ascent {} descent {}",
        reply.font_ascent,
        reply.font_descent
    );
    Ok(LoadedFont {
        id,
        metrics: font_metrics(&reply),
    })
}

fn font_metrics(reply: &QueryFontReply) -> FontMetrics {
    FontMetrics {
        ascent: reply.font_ascent,
        descent: reply.font_descent,
        min_char: u8::try_from(reply.min_char_or_byte2).unwrap_or(u8::MAX),
        widths: reply
            .char_infos
            .iter()
            .map(|info| info.character_width)
            .collect(),
        default_width: reply.max_bounds.character_width,
    }
}

pub(crate) struct Cursors {
    pub(crate) normal: Cursor,
    pub(crate) resize: Cursor,
    pub(crate) moving: Cursor,
}

pub(crate) fn load_cursors(
    connection: &RustConnection,
    screen_num: usize,
    cursor_name: &str,
) -> Result<Cursors> {
    let resource_db = x11rb::resource_manager::new_from_default(connection)?;
    let handle = x11rb::cursor::Handle::new(connection, screen_num, &resource_db)?.reply()?;
    Ok(Cursors {
        normal: handle.load_cursor(connection, cursor_name)?,
        resize: handle.load_cursor(connection, RESIZE_CURSOR)?,
        moving: handle.load_cursor(connection, MOVE_CURSOR)?,
    })
}

#[cfg(not(feature = "xinerama"))]
#[allow(clippy::unnecessary_wraps)]
pub(crate) fn get_screen_dimensions(
    _connection: &RustConnection,
    root_width: i32,
    root_height: i32,
) -> Result<Vec<Rect>> {
    Ok(vec![Rect::new(0, 0, root_width, root_height)])
}

/// Xinerama screens if the extension is there and active, otherwise the whole root.
#[cfg(feature = "xinerama")]
pub(crate) fn get_screen_dimensions(
    connection: &RustConnection,
    root_width: i32,
    root_height: i32,
) -> Result<Vec<Rect>> {
    use x11rb::protocol::xinerama::{self, ConnectionExt as _};
    if connection
        .extension_information(xinerama::X11_EXTENSION_NAME)?
        .is_none()
        || connection.xinerama_is_active()?.reply()?.state == 0
    {
        return Ok(vec![Rect::new(0, 0, root_width, root_height)]);
    }
    let screens: Vec<Rect> = connection
        .xinerama_query_screens()?
        .reply()?
        .screen_info
        .iter()
        .map(|info| {
            Rect::new(
                info.x_org as i32,
                info.y_org as i32,
                info.width as i32,
                info.height as i32,
            )
        })
        .collect();
    if screens.is_empty() {
        Ok(vec![Rect::new(0, 0, root_width, root_height)])
    } else {
        Ok(screens)
    }
}

pub(crate) fn create_wm_check_win(connection: &RustConnection, root: Window) -> Result<Window> {
    let check_win = connection.generate_id()?;
    let cw = CreateWindowAux::new()
        .event_mask(EventMask::NO_EVENT)
        .background_pixel(0);
    connection.create_window(
        COPY_DEPTH_FROM_PARENT,
        check_win,
        root,
        0,
        0,
        1,
        1,
        0,
        WindowClass::INPUT_OUTPUT,
        0,
        &cw,
    )?;
    Ok(check_win)
}

/// Creates bars for every monitor that doesn't have one yet.
pub(crate) fn create_missing_bars(
    connection: &RustConnection,
    screen: &Screen,
    state: &mut State,
    cursor: Cursor,
) -> Result<()> {
    let bar_height = state.bar_height;
    for mon in state.monitors.iter_mut().filter(|mon| mon.bar_win == 0) {
        let bar_win = connection.generate_id()?;
        let cw = CreateWindowAux::new()
            .override_redirect(1)
            .background_pixmap(u32::from(BackPixmap::PARENT_RELATIVE))
            .event_mask(EventMask::BUTTON_PRESS | EventMask::EXPOSURE)
            .cursor(cursor);
        connection.create_window(
            screen.root_depth,
            bar_win,
            screen.root,
            mon.work.x as i16,
            mon.bar_y as i16,
            mon.work.width as u16,
            bar_height as u16,
            0,
            WindowClass::COPY_FROM_PARENT,
            screen.root_visual,
            &cw,
        )?;
        connection.change_property8(
            x11rb::protocol::xproto::PropMode::REPLACE,
            bar_win,
            AtomEnum::WM_CLASS,
            AtomEnum::STRING,
            b"swm\0swm\0",
        )?;
        connection.map_window(bar_win)?;
        tracing::debug!("Created bar {bar_win} for monitor {}", mon.num);
        mon.bar_win = bar_win;
    }
    Ok(())
}

/// Puts every bar where its monitor wants it, hidden bars end up above the screen.
pub(crate) fn move_bars(call_wrapper: &CallWrapper, state: &State) -> Result<()> {
    for mon in &state.monitors {
        call_wrapper.move_resize_window(
            mon.bar_win,
            Rect::new(mon.work.x, mon.bar_y, mon.work.width, state.bar_height),
        )?;
    }
    Ok(())
}

pub(crate) fn teardown_full_state(
    connection: &RustConnection,
    state: &State,
    cursors: &Cursors,
    font: Font,
) -> Result<()> {
    for mon in &state.monitors {
        connection.unmap_window(mon.bar_win)?;
        connection.destroy_window(mon.bar_win)?;
    }
    connection.destroy_window(state.wm_check_win)?;
    connection.free_cursor(cursors.normal)?;
    connection.free_cursor(cursors.resize)?;
    connection.free_cursor(cursors.moving)?;
    connection.close_font(font)?;
    Ok(())
}
