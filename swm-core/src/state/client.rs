use x11rb::protocol::xproto::Window;

use crate::config::WM_NAME_LIMIT;
use crate::geometry::size_hints::SizeHints;
use crate::geometry::Rect;

/// Stable handle into the client arena, stays valid until the client is removed.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ClientId(pub(crate) usize);

/// Title shown for clients that have none.
pub const BROKEN: &str = "broken";

#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone)]
pub struct Client {
    pub window: Window,
    pub name: heapless::String<WM_NAME_LIMIT>,
    pub rect: Rect,
    pub old_rect: Rect,
    pub border_width: i32,
    pub old_border_width: i32,
    pub hints: SizeHints,
    pub tags: u32,
    pub is_fixed: bool,
    pub is_floating: bool,
    pub is_urgent: bool,
    pub never_focus: bool,
    /// Floating state from before going fullscreen
    pub old_state: bool,
    pub is_fullscreen: bool,
    /// Index of the owning monitor
    pub mon: usize,
}

impl Client {
    /// A fresh client with the window's current geometry, in no list yet.
    #[must_use]
    pub fn new(window: Window, rect: Rect, border_width: i32, mon: usize) -> Self {
        Self {
            window,
            name: heapless::String::new(),
            rect,
            old_rect: rect,
            border_width,
            old_border_width: border_width,
            hints: SizeHints::default(),
            tags: 0,
            is_fixed: false,
            is_floating: false,
            is_urgent: false,
            never_focus: false,
            old_state: false,
            is_fullscreen: false,
            mon,
        }
    }

    /// Outer width including both borders.
    #[inline]
    #[must_use]
    pub fn width(&self) -> i32 {
        self.rect.width + 2 * self.border_width
    }

    #[inline]
    #[must_use]
    pub fn height(&self) -> i32 {
        self.rect.height + 2 * self.border_width
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = crate::util::macros::truncate_heapless(name);
        if self.name.is_empty() {
            self.name = crate::util::macros::truncate_heapless(BROKEN);
        }
    }

    /// Stores `rect` as the current geometry and remembers the previous one.
    pub fn commit_geometry(&mut self, rect: Rect) {
        self.old_rect = self.rect;
        self.rect = rect;
    }
}

#[cfg(test)]
mod tests {
    use crate::geometry::Rect;
    use crate::state::client::Client;

    #[test]
    fn size_counts_both_borders() {
        let c = Client::new(1, Rect::new(5, 5, 100, 50), 2, 0);
        assert_eq!(104, c.width());
        assert_eq!(54, c.height());
    }

    #[test]
    fn empty_name_reads_broken() {
        let mut c = Client::new(1, Rect::default(), 0, 0);
        c.set_name("");
        assert_eq!("broken", c.name.as_str());
        c.set_name("xterm");
        assert_eq!("xterm", c.name.as_str());
    }

    #[test]
    fn commit_keeps_previous_geometry() {
        let mut c = Client::new(1, Rect::new(0, 0, 10, 10), 0, 0);
        c.commit_geometry(Rect::new(1, 2, 3, 4));
        assert_eq!(Rect::new(0, 0, 10, 10), c.old_rect);
        assert_eq!(Rect::new(1, 2, 3, 4), c.rect);
    }
}
