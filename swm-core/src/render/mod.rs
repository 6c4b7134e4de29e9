/// Glyph metrics of the core font the bars are drawn with.
/// Core fonts are indexed by single bytes, anything outside Latin-1 is drawn as `?`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontMetrics {
    pub ascent: i16,
    pub descent: i16,
    pub min_char: u8,
    /// Advance per char starting at `min_char`, empty for fonts where every char has the same advance
    pub widths: Vec<i16>,
    pub default_width: i16,
}

pub const ELLIPSIS: &[u8] = b"...";

impl FontMetrics {
    #[must_use]
    pub fn monospace(width: i16, ascent: i16, descent: i16) -> Self {
        Self {
            ascent,
            descent,
            min_char: 0,
            widths: Vec::new(),
            default_width: width,
        }
    }

    #[inline]
    #[must_use]
    pub fn height(&self) -> i16 {
        self.ascent + self.descent
    }

    /// Horizontal padding around every text section, one font height split on both sides.
    #[inline]
    #[must_use]
    pub fn lrpad(&self) -> i16 {
        self.height()
    }

    #[inline]
    #[must_use]
    pub fn bar_height(&self) -> i16 {
        self.height() + 2
    }

    #[must_use]
    pub fn char_width(&self, byte: u8) -> i16 {
        byte.checked_sub(self.min_char)
            .and_then(|ind| self.widths.get(ind as usize))
            .copied()
            .unwrap_or(self.default_width)
    }

    /// Encodes into what a core font can draw.
    #[must_use]
    pub fn encode(text: &str) -> Vec<u8> {
        text.chars()
            .map(|ch| u8::try_from(u32::from(ch)).unwrap_or(b'?'))
            .collect()
    }

    #[must_use]
    pub fn bytes_width(&self, bytes: &[u8]) -> i16 {
        bytes
            .iter()
            .fold(0i16, |width, b| width.saturating_add(self.char_width(*b)))
    }

    #[must_use]
    pub fn text_width(&self, text: &str) -> i16 {
        self.bytes_width(&Self::encode(text))
    }

    /// Width of a padded text section.
    #[must_use]
    pub fn textw(&self, text: &str) -> i16 {
        self.text_width(text).saturating_add(self.lrpad())
    }

    /// Cuts `text` down to what fits in `max_width` pixels, ending with an ellipsis if cut.
    #[must_use]
    pub fn fit(&self, text: &str, max_width: i16) -> Vec<u8> {
        let mut bytes = Self::encode(text);
        if self.bytes_width(&bytes) <= max_width {
            return bytes;
        }
        let ellipsis = self.bytes_width(ELLIPSIS);
        let mut used: i16 = 0;
        let mut keep = 0;
        for b in &bytes {
            let w = self.char_width(*b);
            if used.saturating_add(w).saturating_add(ellipsis) > max_width {
                break;
            }
            used += w;
            keep += 1;
        }
        bytes.truncate(keep);
        if used.saturating_add(ellipsis) <= max_width {
            bytes.extend_from_slice(ELLIPSIS);
        }
        bytes
    }
}

#[cfg(test)]
mod tests {
    use crate::render::FontMetrics;

    #[test]
    fn bar_height_is_font_height_plus_two() {
        let font = FontMetrics::monospace(6, 11, 2);
        assert_eq!(13, font.height());
        assert_eq!(13, font.lrpad());
        assert_eq!(15, font.bar_height());
    }

    #[test]
    fn textw_adds_padding() {
        let font = FontMetrics::monospace(6, 11, 2);
        assert_eq!(18, font.text_width("abc"));
        assert_eq!(31, font.textw("abc"));
        assert_eq!(13, font.textw(""));
    }

    #[test]
    fn proportional_widths() {
        let font = FontMetrics {
            ascent: 10,
            descent: 2,
            min_char: b'a',
            widths: vec![5, 7, 9],
            default_width: 4,
        };
        assert_eq!(5 + 7 + 9, font.text_width("abc"));
        // Outside the table on both ends
        assert_eq!(8, font.text_width("Az"));
    }

    #[test]
    fn long_text_in_wide_font_saturates() {
        let font = FontMetrics::monospace(200, 150, 40);
        let status = "x".repeat(256);
        assert_eq!(i16::MAX, font.text_width(&status));
        assert_eq!(i16::MAX, font.textw(&status));
    }

    #[test]
    fn non_latin_encodes_as_question_mark() {
        assert_eq!(b"a?\xe5".to_vec(), FontMetrics::encode("a\u{f121}å"));
    }

    #[test]
    fn fit_truncates_with_ellipsis() {
        let font = FontMetrics::monospace(5, 8, 2);
        assert_eq!(b"hello".to_vec(), font.fit("hello", 25));
        assert_eq!(b"he...".to_vec(), font.fit("hello world", 25));
        assert_eq!(Vec::<u8>::new(), font.fit("hello", 10));
    }
}
