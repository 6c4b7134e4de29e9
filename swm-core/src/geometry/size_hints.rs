/// ICCCM `WM_NORMAL_HINTS` reduced to what constrains a client's size.
/// Zeroes mean "not set" for every field.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct SizeHints {
    pub base_width: i32,
    pub base_height: i32,
    pub inc_width: i32,
    pub inc_height: i32,
    pub max_width: i32,
    pub max_height: i32,
    pub min_width: i32,
    pub min_height: i32,
    pub min_aspect: f32,
    pub max_aspect: f32,
    /// Cleared when the property changes, the hints are re-read before they are next applied
    pub valid: bool,
}

/// Raw hints as read off the window, each field present only if the client set its flag.
#[derive(Debug, Copy, Clone, Default)]
pub struct RawSizeHints {
    pub base: Option<(i32, i32)>,
    pub min: Option<(i32, i32)>,
    pub max: Option<(i32, i32)>,
    pub inc: Option<(i32, i32)>,
    /// `((min_num, min_den), (max_num, max_den))`
    pub aspect: Option<((i32, i32), (i32, i32))>,
}

impl SizeHints {
    /// Base falls back to min and min falls back to base.
    #[must_use]
    pub fn from_raw(raw: RawSizeHints) -> Self {
        let (base_width, base_height) = raw.base.or(raw.min).unwrap_or((0, 0));
        let (min_width, min_height) = raw.min.or(raw.base).unwrap_or((0, 0));
        let (inc_width, inc_height) = raw.inc.unwrap_or((0, 0));
        let (max_width, max_height) = raw.max.unwrap_or((0, 0));
        let (min_aspect, max_aspect) = raw
            .aspect
            .filter(|((min_num, _), (_, max_den))| *min_num != 0 && *max_den != 0)
            .map_or((0.0, 0.0), |((min_num, min_den), (max_num, max_den))| {
                (
                    min_den as f32 / min_num as f32,
                    max_num as f32 / max_den as f32,
                )
            });
        Self {
            base_width,
            base_height,
            inc_width,
            inc_height,
            max_width,
            max_height,
            min_width,
            min_height,
            min_aspect,
            max_aspect,
            valid: true,
        }
    }

    /// A client that can't be resized, gets floated when managed.
    #[must_use]
    pub fn is_fixed(&self) -> bool {
        self.max_width != 0
            && self.max_height != 0
            && self.max_width == self.min_width
            && self.max_height == self.min_height
    }

    /// Applies base size, aspect, increments and min/max bounds to a client size (without border).
    #[must_use]
    pub fn constrain(&self, width: i32, height: i32) -> (i32, i32) {
        let (mut w, mut h) = (width, height);
        // See ICCCM 4.1.2.3, base size counts as minimum unless they're equal
        let base_is_min = self.base_width == self.min_width && self.base_height == self.min_height;
        if !base_is_min {
            w -= self.base_width;
            h -= self.base_height;
        }
        if self.min_aspect > 0.0 && self.max_aspect > 0.0 && w > 0 && h > 0 {
            if self.max_aspect < w as f32 / h as f32 {
                w = (h as f32 * self.max_aspect + 0.5) as i32;
            } else if self.min_aspect < h as f32 / w as f32 {
                h = (w as f32 * self.min_aspect + 0.5) as i32;
            }
        }
        if base_is_min {
            w -= self.base_width;
            h -= self.base_height;
        }
        if self.inc_width > 0 {
            w -= w % self.inc_width;
        }
        if self.inc_height > 0 {
            h -= h % self.inc_height;
        }
        w = (w + self.base_width).max(self.min_width);
        h = (h + self.base_height).max(self.min_height);
        if self.max_width > 0 {
            w = w.min(self.max_width);
        }
        if self.max_height > 0 {
            h = h.min(self.max_height);
        }
        (w, h)
    }
}

#[cfg(test)]
mod tests {
    use crate::geometry::size_hints::{RawSizeHints, SizeHints};

    #[test]
    fn base_and_min_fall_back_on_each_other() {
        let only_min = SizeHints::from_raw(RawSizeHints {
            min: Some((10, 20)),
            ..RawSizeHints::default()
        });
        assert_eq!((10, 20), (only_min.base_width, only_min.base_height));
        assert_eq!((10, 20), (only_min.min_width, only_min.min_height));
        let only_base = SizeHints::from_raw(RawSizeHints {
            base: Some((4, 6)),
            ..RawSizeHints::default()
        });
        assert_eq!((4, 6), (only_base.min_width, only_base.min_height));
        let none = SizeHints::from_raw(RawSizeHints::default());
        assert_eq!(0, none.base_width);
        assert_eq!(0, none.min_height);
        assert!(none.valid);
    }

    #[test]
    fn fixed_requires_equal_nonzero_bounds() {
        let fixed = SizeHints::from_raw(RawSizeHints {
            min: Some((300, 200)),
            max: Some((300, 200)),
            ..RawSizeHints::default()
        });
        assert!(fixed.is_fixed());
        let unbounded = SizeHints::from_raw(RawSizeHints {
            min: Some((300, 200)),
            ..RawSizeHints::default()
        });
        assert!(!unbounded.is_fixed());
        let one_axis = SizeHints::from_raw(RawSizeHints {
            min: Some((300, 200)),
            max: Some((300, 400)),
            ..RawSizeHints::default()
        });
        assert!(!one_axis.is_fixed());
    }

    #[test]
    fn increments_snap_above_base() {
        // Terminal style, 2px base with 7x13 cells
        let hints = SizeHints::from_raw(RawSizeHints {
            base: Some((2, 2)),
            min: Some((9, 15)),
            inc: Some((7, 13)),
            ..RawSizeHints::default()
        });
        let (w, h) = hints.constrain(500, 400);
        assert_eq!(0, (w - 2) % 7);
        assert_eq!(0, (h - 2) % 13);
        assert!(w <= 500 && w > 500 - 7);
        assert!(h <= 400 && h > 400 - 13);
        assert_eq!((w, h), hints.constrain(w, h));
    }

    #[test]
    fn min_max_clamp() {
        let hints = SizeHints::from_raw(RawSizeHints {
            min: Some((100, 100)),
            max: Some((400, 300)),
            ..RawSizeHints::default()
        });
        assert_eq!((100, 100), hints.constrain(10, 10));
        assert_eq!((400, 300), hints.constrain(1000, 1000));
        assert_eq!((250, 250), hints.constrain(250, 250));
    }

    #[test]
    fn aspect_limits_the_wider_side() {
        // Exactly 2:1
        let hints = SizeHints::from_raw(RawSizeHints {
            aspect: Some(((2, 1), (2, 1))),
            ..RawSizeHints::default()
        });
        assert!((hints.min_aspect - 0.5).abs() < f32::EPSILON);
        assert!((hints.max_aspect - 2.0).abs() < f32::EPSILON);
        assert_eq!((400, 200), hints.constrain(1000, 200));
        assert_eq!((400, 200), hints.constrain(400, 1000));
        let (w, h) = hints.constrain(1000, 200);
        assert_eq!((w, h), hints.constrain(w, h));
    }

    #[test]
    fn zero_aspect_denominator_is_ignored() {
        let hints = SizeHints::from_raw(RawSizeHints {
            aspect: Some(((0, 1), (2, 0))),
            ..RawSizeHints::default()
        });
        assert_eq!((1000, 200), hints.constrain(1000, 200));
    }
}
