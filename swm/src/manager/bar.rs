use std::cell::Cell;

use swm_core::colors::Scheme;
use swm_core::geometry::Line;
use swm_core::state::bar_geometry::BarGeometry;
use swm_core::state::State;
use x11rb::connection::Connection;
use x11rb::protocol::xproto::{
    ChangeGCAux, ConnectionExt, CreateGCAux, Gcontext, Pixmap, Rectangle, Screen,
};
use x11rb::rust_connection::RustConnection;

use crate::error::Result;
use crate::x11::call_wrapper::CallWrapper;
use crate::x11::state_lifecycle::LoadedFont;

/// Longest string a single `TEXTITEM8` can carry.
const TEXT_ITEM_LIMIT: usize = 254;

/// Draws every bar into one screen wide pixmap and copies the result onto the bar window.
pub(crate) struct BarManager {
    font: LoadedFont,
    gc: Gcontext,
    pixmap: Cell<Pixmap>,
    depth: u8,
    root: u32,
}

impl BarManager {
    pub(crate) fn new(
        connection: &RustConnection,
        screen: &Screen,
        font: LoadedFont,
        bar_height: i32,
    ) -> Result<Self> {
        let gc = connection.generate_id()?;
        connection.create_gc(
            gc,
            screen.root,
            &CreateGCAux::new().font(font.id).graphics_exposures(0),
        )?;
        let pixmap = connection.generate_id()?;
        connection.create_pixmap(
            screen.root_depth,
            pixmap,
            screen.root,
            screen.width_in_pixels,
            bar_height as u16,
        )?;
        Ok(Self {
            font,
            gc,
            pixmap: Cell::new(pixmap),
            depth: screen.root_depth,
            root: screen.root,
        })
    }

    #[inline]
    pub(crate) fn font_id(&self) -> u32 {
        self.font.id
    }

    /// The pixmap has to cover the widest bar, recreated when the root window changes size.
    pub(crate) fn resize(&self, connection: &RustConnection, width: i32, height: i32) -> Result<()> {
        connection.free_pixmap(self.pixmap.get())?;
        let pixmap = connection.generate_id()?;
        connection.create_pixmap(self.depth, pixmap, self.root, width as u16, height as u16)?;
        self.pixmap.set(pixmap);
        Ok(())
    }

    pub(crate) fn bar_geometry(&self, state: &State, mon_ind: usize) -> BarGeometry {
        let mon = &state.monitors[mon_ind];
        BarGeometry::new(
            &self.font.metrics,
            mon.work.width as i16,
            &state.tags,
            &mon.layout_symbol,
            &state.status_text,
            mon_ind == state.selmon,
        )
    }

    pub(crate) fn draw_bars(&self, call_wrapper: &CallWrapper, state: &State) -> Result<()> {
        for mon_ind in 0..state.monitors.len() {
            self.draw_bar(call_wrapper, state, mon_ind)?;
        }
        Ok(())
    }

    pub(crate) fn draw_bar(&self, call_wrapper: &CallWrapper, state: &State, mon_ind: usize) -> Result<()> {
        let mon = &state.monitors[mon_ind];
        if !mon.show_bar {
            return Ok(());
        }
        let connection = call_wrapper.inner();
        let metrics = &self.font.metrics;
        let is_selected_mon = mon_ind == state.selmon;
        let geometry = self.bar_geometry(state, mon_ind);
        let height = state.bar_height as i16;
        let lpad = metrics.lrpad() / 2;
        let boxs = metrics.height() / 9;
        let boxw = metrics.height() / 6 + 2;
        // Status first, the sections left of it never overlap it
        if is_selected_mon {
            self.draw_text(connection, state.colors.norm, geometry.status, height, 0, &state.status_text, false)?;
        }
        let (occupied, urgent) = state.tag_occupancy(mon_ind);
        let selected_tags = state
            .sel_client()
            .and_then(|id| state.client(id))
            .map_or(0, |c| c.tags);
        for (ind, (tag, line)) in state.tags.iter().zip(geometry.tags.iter()).enumerate() {
            let bit = 1 << ind;
            let scheme = state.colors.scheme(mon.current_tags() & bit != 0);
            self.draw_text(connection, scheme, *line, height, lpad, tag, urgent & bit != 0)?;
            if occupied & bit != 0 {
                self.draw_box(
                    connection,
                    scheme,
                    Rectangle {
                        x: line.start + boxs,
                        y: boxs,
                        width: boxw as u16,
                        height: boxw as u16,
                    },
                    is_selected_mon && selected_tags & bit != 0,
                    urgent & bit != 0,
                )?;
            }
        }
        self.draw_text(connection, state.colors.norm, geometry.layout_symbol, height, lpad, &mon.layout_symbol, false)?;
        if geometry.title.length > height {
            if let Some(sel) = mon.sel.and_then(|id| state.client(id)) {
                let scheme = state.colors.scheme(is_selected_mon);
                self.draw_text(connection, scheme, geometry.title, height, lpad, &sel.name, false)?;
                if sel.is_floating {
                    self.draw_box(
                        connection,
                        scheme,
                        Rectangle {
                            x: geometry.title.start + boxs,
                            y: boxs,
                            width: boxw as u16,
                            height: boxw as u16,
                        },
                        sel.is_fixed,
                        false,
                    )?;
                }
            } else {
                self.fill(connection, state.colors.norm.bg.pixel, geometry.title, height)?;
            }
        }
        connection.copy_area(
            self.pixmap.get(),
            mon.bar_win,
            self.gc,
            0,
            0,
            0,
            0,
            mon.work.width as u16,
            height as u16,
        )?;
        Ok(())
    }

    fn fill(&self, connection: &RustConnection, pixel: u32, line: Line, height: i16) -> Result<()> {
        connection.change_gc(self.gc, &ChangeGCAux::new().foreground(pixel))?;
        connection.poly_fill_rectangle(
            self.pixmap.get(),
            self.gc,
            &[Rectangle {
                x: line.start,
                y: 0,
                width: line.length as u16,
                height: height as u16,
            }],
        )?;
        Ok(())
    }

    /// Background over the whole section, then as much of `text` as fits after `lpad`.
    fn draw_text(
        &self,
        connection: &RustConnection,
        scheme: Scheme,
        line: Line,
        height: i16,
        lpad: i16,
        text: &str,
        invert: bool,
    ) -> Result<()> {
        if line.length <= 0 {
            return Ok(());
        }
        let (fg, bg) = if invert {
            (scheme.bg, scheme.fg)
        } else {
            (scheme.fg, scheme.bg)
        };
        self.fill(connection, bg.pixel, line, height)?;
        let metrics = &self.font.metrics;
        let bytes = metrics.fit(text, line.length - lpad);
        if bytes.is_empty() {
            return Ok(());
        }
        connection.change_gc(self.gc, &ChangeGCAux::new().foreground(fg.pixel))?;
        let y = (height - metrics.height()) / 2 + metrics.ascent;
        connection.poly_text8(self.pixmap.get(), self.gc, line.start + lpad, y, &text_items(&bytes))?;
        Ok(())
    }

    fn draw_box(
        &self,
        connection: &RustConnection,
        scheme: Scheme,
        rect: Rectangle,
        filled: bool,
        invert: bool,
    ) -> Result<()> {
        let pixel = if invert { scheme.bg.pixel } else { scheme.fg.pixel };
        connection.change_gc(self.gc, &ChangeGCAux::new().foreground(pixel))?;
        if filled {
            connection.poly_fill_rectangle(self.pixmap.get(), self.gc, &[rect])?;
        } else {
            let outline = Rectangle {
                width: rect.width.saturating_sub(1),
                height: rect.height.saturating_sub(1),
                ..rect
            };
            connection.poly_rectangle(self.pixmap.get(), self.gc, &[outline])?;
        }
        Ok(())
    }

    pub(crate) fn teardown(&self, connection: &RustConnection) -> Result<()> {
        connection.free_pixmap(self.pixmap.get())?;
        connection.free_gc(self.gc)?;
        Ok(())
    }
}

/// Encodes text as `TEXTITEM8`s, a length byte and a zero delta ahead of each chunk.
fn text_items(bytes: &[u8]) -> Vec<u8> {
    let mut items = Vec::with_capacity(bytes.len() + 2 * (bytes.len() / TEXT_ITEM_LIMIT + 1));
    for chunk in bytes.chunks(TEXT_ITEM_LIMIT) {
        items.push(chunk.len() as u8);
        items.push(0);
        items.extend_from_slice(chunk);
    }
    items
}

#[cfg(test)]
mod tests {
    use crate::manager::bar::{text_items, TEXT_ITEM_LIMIT};

    #[test]
    fn short_text_is_one_item() {
        assert_eq!(vec![3, 0, b'a', b'b', b'c'], text_items(b"abc"));
        assert!(text_items(b"").is_empty());
    }

    #[test]
    fn long_text_is_split() {
        let text = vec![b'x'; TEXT_ITEM_LIMIT + 6];
        let items = text_items(&text);
        assert_eq!(TEXT_ITEM_LIMIT + 6 + 4, items.len());
        assert_eq!(TEXT_ITEM_LIMIT as u8, items[0]);
        assert_eq!(0, items[1]);
        let second = 2 + TEXT_ITEM_LIMIT;
        assert_eq!(6, items[second]);
        assert_eq!(0, items[second + 1]);
    }
}
