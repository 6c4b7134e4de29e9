use crate::geometry::Rect;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "config-file", derive(serde::Deserialize))]
pub enum Layout {
    /// Master column to the left, stack to the right
    Tile,
    /// Leaves every client where it was last put
    Floating,
    /// Every tiled client gets the whole work area
    Monocle,
}

impl Layout {
    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Layout::Tile => "[]=",
            Layout::Floating => "><>",
            Layout::Monocle => "[M]",
        }
    }

    /// Whether the layout positions clients at all, floating doesn't.
    #[must_use]
    pub const fn arranges(&self) -> bool {
        !matches!(self, Layout::Floating)
    }
}

/// Master-stack tiling over `n` clients in list order.
/// `place(i, rect)` resizes client `i` to `rect` (border already subtracted) and returns its outer
/// height after size hints have been applied, which is what the next slot is stacked under.
pub fn tile<F>(area: Rect, mfact: f32, nmaster: u32, borders: &[i32], mut place: F)
where
    F: FnMut(usize, Rect) -> i32,
{
    let n = borders.len();
    if n == 0 {
        return;
    }
    let nmaster = nmaster as usize;
    let master_width = if n > nmaster {
        if nmaster == 0 {
            0
        } else {
            (area.width as f32 * mfact) as i32
        }
    } else {
        area.width
    };
    let mut master_y = 0;
    let mut stack_y = 0;
    for (i, bw) in borders.iter().copied().enumerate() {
        if i < nmaster {
            let height = (area.height - master_y) / (n.min(nmaster) - i) as i32;
            let outer = place(
                i,
                Rect::new(
                    area.x,
                    area.y + master_y,
                    master_width - 2 * bw,
                    height - 2 * bw,
                ),
            );
            if master_y + outer < area.height {
                master_y += outer;
            }
        } else {
            let height = (area.height - stack_y) / (n - i) as i32;
            let outer = place(
                i,
                Rect::new(
                    area.x + master_width,
                    area.y + stack_y,
                    area.width - master_width - 2 * bw,
                    height - 2 * bw,
                ),
            );
            if stack_y + outer < area.height {
                stack_y += outer;
            }
        }
    }
}

/// Every client covers the work area.
pub fn monocle<F>(area: Rect, borders: &[i32], mut place: F)
where
    F: FnMut(usize, Rect),
{
    for (i, bw) in borders.iter().copied().enumerate() {
        place(
            i,
            Rect::new(area.x, area.y, area.width - 2 * bw, area.height - 2 * bw),
        );
    }
}

#[cfg(test)]
mod tests {
    use crate::geometry::layout::{monocle, tile, Layout};
    use crate::geometry::Rect;

    const TEST_WIDTH: i32 = 1000;
    const TEST_HEIGHT: i32 = 800;
    const TEST_AREA: Rect = Rect::new(0, 0, TEST_WIDTH, TEST_HEIGHT);

    fn run_tile(area: Rect, mfact: f32, nmaster: u32, borders: &[i32]) -> Vec<Rect> {
        let mut placed = vec![Rect::default(); borders.len()];
        tile(area, mfact, nmaster, borders, |i, rect| {
            placed[i] = rect;
            rect.height + 2 * borders[i]
        });
        placed
    }

    #[test]
    fn tile_three_clients_half_split() {
        let placed = run_tile(TEST_AREA, 0.5, 1, &[0, 0, 0]);
        assert_eq!(Rect::new(0, 0, 500, 800), placed[0]);
        assert_eq!(Rect::new(500, 0, 500, 400), placed[1]);
        assert_eq!(Rect::new(500, 400, 500, 400), placed[2]);
    }

    #[test]
    fn tile_subtracts_borders() {
        let placed = run_tile(TEST_AREA, 0.5, 1, &[2, 2, 2]);
        assert_eq!(Rect::new(0, 0, 496, 796), placed[0]);
        assert_eq!(Rect::new(500, 0, 496, 396), placed[1]);
        assert_eq!(Rect::new(500, 400, 496, 396), placed[2]);
    }

    #[test]
    fn tile_single_client_takes_full_width() {
        let placed = run_tile(TEST_AREA, 0.55, 1, &[0]);
        assert_eq!(Rect::new(0, 0, TEST_WIDTH, TEST_HEIGHT), placed[0]);
    }

    #[test]
    fn tile_without_master_stacks_everything() {
        let placed = run_tile(TEST_AREA, 0.55, 0, &[0, 0]);
        assert_eq!(Rect::new(0, 0, 1000, 400), placed[0]);
        assert_eq!(Rect::new(0, 400, 1000, 400), placed[1]);
    }

    #[test]
    fn tile_respects_work_area_offset() {
        let area = Rect::new(1920, 18, TEST_WIDTH, TEST_HEIGHT);
        let placed = run_tile(area, 0.5, 1, &[0, 0]);
        assert_eq!(Rect::new(1920, 18, 500, 800), placed[0]);
        assert_eq!(Rect::new(2420, 18, 500, 800), placed[1]);
    }

    #[test]
    fn master_stack_law() {
        for n in 1..12usize {
            let borders = vec![1; n];
            let placed = run_tile(Rect::new(0, 0, 1001, 797), 0.55, 1, &borders);
            let masters = placed.iter().filter(|r| r.x == 0).count();
            assert_eq!(1, masters);
            let stacked: Vec<&Rect> = placed.iter().filter(|r| r.x != 0).collect();
            assert_eq!(n - 1, stacked.len());
            if n > 1 {
                let column: i32 = stacked.iter().map(|r| r.height + 2).sum();
                assert!(797 - column >= 0);
                assert!(797 - column <= (n - 1) as i32);
                // Slots are stacked without gaps
                for pair in stacked.windows(2) {
                    assert_eq!(pair[0].y + pair[0].height + 2, pair[1].y);
                }
            }
        }
    }

    #[test]
    fn tile_rounding_goes_to_the_last_slot() {
        let placed = run_tile(Rect::new(0, 0, 1000, 100), 0.5, 1, &[0, 0, 0, 0]);
        // 100 split over three stack slots: 33, 33, 34
        assert_eq!(33, placed[1].height);
        assert_eq!(33, placed[2].height);
        assert_eq!(34, placed[3].height);
    }

    #[test]
    fn tile_does_not_advance_past_the_bottom_when_hints_grow_a_client() {
        let borders = [0, 0, 0];
        let mut placed = vec![Rect::default(); 3];
        tile(TEST_AREA, 0.5, 1, &borders, |i, rect| {
            placed[i] = rect;
            // The first stack client refuses to shrink below the full height
            if i == 1 {
                TEST_HEIGHT
            } else {
                rect.height
            }
        });
        assert_eq!(0, placed[2].y);
        assert_eq!(TEST_HEIGHT, placed[2].height);
    }

    #[test]
    fn monocle_law() {
        let mut placed = vec![];
        monocle(Rect::new(10, 20, 300, 200), &[2, 0, 5], |_, rect| {
            placed.push(rect);
        });
        assert_eq!(
            vec![
                Rect::new(10, 20, 296, 196),
                Rect::new(10, 20, 300, 200),
                Rect::new(10, 20, 290, 190),
            ],
            placed
        );
    }

    #[test]
    fn only_floating_skips_arranging() {
        assert!(Layout::Tile.arranges());
        assert!(Layout::Monocle.arranges());
        assert!(!Layout::Floating.arranges());
        assert_eq!("><>", Layout::Floating.symbol());
    }
}
