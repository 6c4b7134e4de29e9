use x11rb::protocol::xproto::Window;

use crate::config::{Options, LAYOUTS, LAYOUT_SYMBOL_LIMIT};
use crate::geometry::layout::Layout;
use crate::geometry::Rect;
use crate::state::client::ClientId;

pub struct Monitor {
    pub num: usize,
    pub layout_symbol: heapless::String<LAYOUT_SYMBOL_LIMIT>,
    pub mfact: f32,
    pub nmaster: u32,
    pub bar_y: i32,
    /// Full bounds
    pub screen: Rect,
    /// Screen minus the bar
    pub work: Rect,
    pub seltags: usize,
    pub sellt: usize,
    pub tagset: [u32; 2],
    pub show_bar: bool,
    pub top_bar: bool,
    /// Tiling order, most recently attached first
    pub clients: Vec<ClientId>,
    /// Focus order, most recently focused first
    pub stack: Vec<ClientId>,
    pub sel: Option<ClientId>,
    pub bar_win: Window,
    pub layouts: [Layout; 2],
}

impl Monitor {
    #[must_use]
    pub fn new(num: usize, screen: Rect, options: &Options, bar_height: i32) -> Self {
        let mut mon = Self {
            num,
            layout_symbol: crate::util::macros::truncate_heapless(LAYOUTS[0].symbol()),
            mfact: options.master_factor,
            nmaster: options.master_count,
            bar_y: 0,
            screen,
            work: screen,
            seltags: 0,
            sellt: 0,
            tagset: [1, 1],
            show_bar: options.show_bar,
            top_bar: options.top_bar,
            clients: Vec::new(),
            stack: Vec::new(),
            sel: None,
            bar_win: 0,
            layouts: [LAYOUTS[0], LAYOUTS[1 % LAYOUTS.len()]],
        };
        mon.update_bar_geometry(bar_height);
        mon
    }

    #[inline]
    #[must_use]
    pub fn current_tags(&self) -> u32 {
        self.tagset[self.seltags]
    }

    #[inline]
    #[must_use]
    pub fn layout(&self) -> Layout {
        self.layouts[self.sellt]
    }

    /// Derives the work area and bar position from the screen and the bar flags.
    pub fn update_bar_geometry(&mut self, bar_height: i32) {
        self.work = self.screen;
        if self.show_bar {
            self.work.height -= bar_height;
            if self.top_bar {
                self.bar_y = self.work.y;
                self.work.y += bar_height;
            } else {
                self.bar_y = self.work.y + self.work.height;
            }
        } else {
            self.bar_y = -bar_height;
        }
    }

    /// Moves to new screen bounds, returns whether anything changed.
    pub fn set_screen(&mut self, screen: Rect, bar_height: i32) -> bool {
        if self.screen == screen {
            return false;
        }
        self.screen = screen;
        self.update_bar_geometry(bar_height);
        true
    }
}

#[cfg(test)]
mod tests {
    use crate::config::Options;
    use crate::geometry::layout::Layout;
    use crate::geometry::Rect;
    use crate::state::monitor::Monitor;

    const BAR: i32 = 15;

    fn monitor(show_bar: bool, top_bar: bool) -> Monitor {
        let options = Options {
            show_bar,
            top_bar,
            ..Options::default()
        };
        Monitor::new(0, Rect::new(1920, 0, 1280, 1024), &options, BAR)
    }

    #[test]
    fn starts_on_first_tag_with_first_layouts() {
        let mon = monitor(true, true);
        assert_eq!([1, 1], mon.tagset);
        assert_eq!(1, mon.current_tags());
        assert_eq!(Layout::Tile, mon.layout());
        assert_eq!([Layout::Tile, Layout::Floating], mon.layouts);
        assert_eq!("[]=", mon.layout_symbol.as_str());
    }

    #[test]
    fn bar_geometry_for_every_flag_combination() {
        let top = monitor(true, true);
        assert_eq!(0, top.bar_y);
        assert_eq!(Rect::new(1920, BAR, 1280, 1024 - BAR), top.work);

        let bottom = monitor(true, false);
        assert_eq!(1024 - BAR, bottom.bar_y);
        assert_eq!(Rect::new(1920, 0, 1280, 1024 - BAR), bottom.work);

        for top_bar in [true, false] {
            let hidden = monitor(false, top_bar);
            assert_eq!(-BAR, hidden.bar_y);
            assert_eq!(hidden.screen, hidden.work);
        }
    }

    #[test]
    fn work_area_stays_inside_screen() {
        for (show, top) in [(true, true), (true, false), (false, true), (false, false)] {
            let mon = monitor(show, top);
            assert!(mon.work.y + mon.work.height <= mon.screen.y + mon.screen.height);
            assert!(mon.work.y >= mon.screen.y);
            assert_eq!(mon.screen.x, mon.work.x);
            assert_eq!(mon.screen.width, mon.work.width);
        }
    }

    #[test]
    fn set_screen_reports_changes() {
        let mut mon = monitor(true, true);
        assert!(!mon.set_screen(Rect::new(1920, 0, 1280, 1024), BAR));
        assert!(mon.set_screen(Rect::new(0, 0, 800, 600), BAR));
        assert_eq!(Rect::new(0, BAR, 800, 600 - BAR), mon.work);
    }
}
