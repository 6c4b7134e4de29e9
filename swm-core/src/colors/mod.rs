use crate::error::Error;

/// An 8-bit per channel color, written as `#rrggbb` in the config.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config-file", derive(serde::Deserialize))]
#[cfg_attr(feature = "config-file", serde(try_from = "String"))]
pub struct Rgb8 {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Rgb8 {
    #[must_use]
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    pub fn parse(hex: &str) -> Result<Self, Error> {
        let digits = hex
            .strip_prefix('#')
            .filter(|d| d.len() == 6 && d.is_ascii())
            .ok_or_else(|| Error::ColorParse(hex.to_owned()))?;
        let channel = |range: core::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16).map_err(|_| Error::ColorParse(hex.to_owned()))
        };
        Ok(Self {
            red: channel(0..2)?,
            green: channel(2..4)?,
            blue: channel(4..6)?,
        })
    }

    /// X11 wants 16 bits per channel.
    #[must_use]
    pub const fn to_rgb16(&self) -> (u16, u16, u16) {
        (
            convert_up(self.red),
            convert_up(self.green),
            convert_up(self.blue),
        )
    }
}

impl TryFrom<String> for Rgb8 {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Rgb8::parse(&value)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config-file", derive(serde::Deserialize))]
pub struct SchemeBuilder {
    pub fg: Rgb8,
    pub bg: Rgb8,
    pub border: Rgb8,
}

/**
Color configuration, one scheme for everything normal and one for the selected client,
tag and title.
 **/
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config-file", derive(serde::Deserialize))]
#[cfg_attr(feature = "config-file", serde(default))]
pub struct ColorBuilder {
    pub norm: SchemeBuilder,
    pub sel: SchemeBuilder,
}

impl Default for ColorBuilder {
    fn default() -> Self {
        Self {
            norm: SchemeBuilder {
                fg: Rgb8::new(0xdd, 0xe1, 0xe6),
                bg: Rgb8::new(0x1a, 0x1b, 0x26),
                border: Rgb8::new(0x39, 0x39, 0x39),
            },
            sel: SchemeBuilder {
                fg: Rgb8::new(0x24, 0x28, 0x3b),
                bg: Rgb8::new(0x7a, 0xa2, 0xf7),
                border: Rgb8::new(0x7a, 0xa2, 0xf7),
            },
        }
    }
}

/// An allocated colormap pixel.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct Color {
    pub pixel: u32,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct Scheme {
    pub fg: Color,
    pub bg: Color,
    pub border: Color,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct Colors {
    pub norm: Scheme,
    pub sel: Scheme,
}

impl Colors {
    #[inline]
    #[must_use]
    pub const fn scheme(&self, selected: bool) -> Scheme {
        if selected {
            self.sel
        } else {
            self.norm
        }
    }
}

const fn convert_up(v: u8) -> u16 {
    v as u16 * 256
}

#[cfg(test)]
mod tests {
    use crate::colors::{ColorBuilder, Rgb8};

    #[test]
    fn parses_hex() {
        assert_eq!(Rgb8::new(0x7a, 0xa2, 0xf7), Rgb8::parse("#7aa2f7").unwrap());
        assert_eq!(Rgb8::new(0xff, 0, 0x10), Rgb8::parse("#FF0010").unwrap());
    }

    #[test]
    fn rejects_malformed_hex() {
        assert!(Rgb8::parse("7aa2f7").is_err());
        assert!(Rgb8::parse("#7aa2f").is_err());
        assert!(Rgb8::parse("#7aa2fg").is_err());
        assert!(Rgb8::parse("#7aa2f77").is_err());
        assert!(Rgb8::parse("#ééé").is_err());
    }

    #[test]
    fn widens_channels() {
        assert_eq!((0xff00, 0, 0x0100), Rgb8::new(0xff, 0, 1).to_rgb16());
    }

    #[test]
    fn default_selected_border_matches_background() {
        let colors = ColorBuilder::default();
        assert_eq!(colors.sel.bg, colors.sel.border);
        assert_ne!(colors.norm.border, colors.sel.border);
    }
}
