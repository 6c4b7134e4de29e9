use crate::config::mouse_map::MouseTarget;
use crate::geometry::Line;
use crate::render::FontMetrics;

/// Horizontal sections of one monitor's bar, left to right: tags, layout symbol, title, status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarGeometry {
    pub tags: Vec<Line>,
    pub layout_symbol: Line,
    pub title: Line,
    /// Where the status text is drawn, empty on bars without it
    pub status: Line,
    /// Clicks right of this hit the status, measured with padding on both sides
    status_hit_start: i16,
}

impl BarGeometry {
    /// Status text is only drawn on the selected monitor's bar but is clickable on every bar.
    #[must_use]
    pub fn new(
        font: &FontMetrics,
        width: i16,
        tags: &[String],
        layout_symbol: &str,
        status: &str,
        draw_status: bool,
    ) -> Self {
        let mut x = 0;
        let tags = tags
            .iter()
            .map(|tag| {
                let w = font.textw(tag);
                let line = Line::new(x, w);
                x += w;
                line
            })
            .collect();
        let layout_symbol = Line::new(x, font.textw(layout_symbol));
        x += layout_symbol.length;
        let status_width = if draw_status {
            font.text_width(status) + 2
        } else {
            0
        };
        Self {
            tags,
            layout_symbol,
            title: Line::new(x, width - status_width - x),
            status: Line::new(width - status_width, status_width),
            status_hit_start: width - font.textw(status),
        }
    }

    /// What a click at `x` relative to the bar hit, and which tag if it was one.
    #[must_use]
    pub fn hit_on_click(&self, x: i16) -> (MouseTarget, Option<usize>) {
        if let Some(ind) = self.tags.iter().position(|t| t.contains(x)) {
            (MouseTarget::TagBar, Some(ind))
        } else if x < self.layout_symbol.start + self.layout_symbol.length {
            (MouseTarget::LtSymbol, None)
        } else if x > self.status_hit_start {
            (MouseTarget::StatusText, None)
        } else {
            (MouseTarget::WinTitle, None)
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::config::mouse_map::MouseTarget;
    use crate::geometry::Line;
    use crate::render::FontMetrics;
    use crate::state::bar_geometry::BarGeometry;

    fn tags() -> Vec<String> {
        ["1", "2", "www"].iter().map(|t| (*t).to_owned()).collect()
    }

    // 6 wide, 10 high, so every section is padded by 10
    fn font() -> FontMetrics {
        FontMetrics::monospace(6, 8, 2)
    }

    #[test]
    fn sections_are_laid_out_left_to_right() {
        let geometry = BarGeometry::new(&font(), 1000, &tags(), "[]=", "12:00", true);
        assert_eq!(
            vec![Line::new(0, 16), Line::new(16, 16), Line::new(32, 28)],
            geometry.tags
        );
        assert_eq!(Line::new(60, 28), geometry.layout_symbol);
        assert_eq!(Line::new(1000 - 32, 32), geometry.status);
        assert_eq!(Line::new(88, 1000 - 32 - 88), geometry.title);
    }

    #[test]
    fn status_takes_no_room_when_not_drawn() {
        let geometry = BarGeometry::new(&font(), 1000, &tags(), "[]=", "12:00", false);
        assert_eq!(0, geometry.status.length);
        assert_eq!(1000 - 88, geometry.title.length);
    }

    #[test]
    fn clicks_hit_sections() {
        let geometry = BarGeometry::new(&font(), 1000, &tags(), "[]=", "12:00", true);
        assert_eq!((MouseTarget::TagBar, Some(0)), geometry.hit_on_click(0));
        assert_eq!((MouseTarget::TagBar, Some(1)), geometry.hit_on_click(16));
        assert_eq!((MouseTarget::TagBar, Some(2)), geometry.hit_on_click(59));
        assert_eq!((MouseTarget::LtSymbol, None), geometry.hit_on_click(60));
        assert_eq!((MouseTarget::LtSymbol, None), geometry.hit_on_click(87));
        assert_eq!((MouseTarget::WinTitle, None), geometry.hit_on_click(88));
        // Status is measured with padding for clicks
        assert_eq!((MouseTarget::WinTitle, None), geometry.hit_on_click(1000 - 40));
        assert_eq!((MouseTarget::StatusText, None), geometry.hit_on_click(1000 - 39));
        assert_eq!((MouseTarget::StatusText, None), geometry.hit_on_click(999));
    }
}
