use x11rb::protocol::xproto::Rectangle;

pub mod layout;
pub mod size_hints;

/// A window or screen area, kept in `i32` so that border and offscreen arithmetic can't overflow
/// before being narrowed for the wire.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    #[must_use]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Area of the overlap between two rectangles, 0 if they are disjoint.
    #[must_use]
    pub fn intersect_area(&self, other: &Rect) -> i32 {
        let w = ((self.x + self.width).min(other.x + other.width) - self.x.max(other.x)).max(0);
        let h = ((self.y + self.height).min(other.y + other.height) - self.y.max(other.y)).max(0);
        w * h
    }

    #[must_use]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }

    #[must_use]
    pub fn to_rectangle(&self) -> Rectangle {
        Rectangle {
            x: self.x as i16,
            y: self.y as i16,
            width: self.width as u16,
            height: self.height as u16,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Line {
    pub start: i16,
    pub length: i16,
}

impl Line {
    #[must_use]
    pub fn new(start: i16, length: i16) -> Self {
        Self { start, length }
    }

    /// Half open, a click on the last pixel belongs to the next section
    #[must_use]
    pub fn contains(&self, x: i16) -> bool {
        x >= self.start && x < self.start + self.length
    }
}

#[cfg(test)]
mod tests {
    use crate::geometry::{Line, Rect};

    #[test]
    fn intersect_area_of_overlapping_and_disjoint() {
        let left = Rect::new(0, 0, 1000, 800);
        let right = Rect::new(1000, 0, 1000, 800);
        let straddling = Rect::new(900, 100, 200, 100);
        assert_eq!(100 * 100, left.intersect_area(&straddling));
        assert_eq!(100 * 100, right.intersect_area(&straddling));
        assert_eq!(0, left.intersect_area(&right));
        assert_eq!(1000 * 800, left.intersect_area(&left));
    }

    #[test]
    fn rect_contains_is_half_open() {
        let r = Rect::new(10, 10, 10, 10);
        assert!(r.contains(10, 10));
        assert!(r.contains(19, 19));
        assert!(!r.contains(20, 10));
        assert!(!r.contains(9, 15));
    }

    #[test]
    fn line_contains() {
        let line = Line::new(5, 10);
        assert!(!line.contains(4));
        assert!(line.contains(5));
        assert!(line.contains(14));
        assert!(!line.contains(15));
    }
}
