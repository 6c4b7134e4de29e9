use crate::colors::ColorBuilder;
use crate::config::key_map::KeyboardMapping;
use crate::config::mouse_map::MouseMapping;
use crate::config::rules::Rule;
use crate::error::{Error, Result};
use crate::geometry::layout::Layout;

pub mod key_map;
pub mod mouse_map;
pub mod rules;

/**
The name that the window manager will broadcast itself as. Will also affect where
configuration is placed/read from.
 **/
pub const WINDOW_MANAGER_NAME: &str = "swm";

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const WM_NAME_LIMIT: usize = 256;

pub const WM_CLASS_NAME_LIMIT: usize = 128;

pub const STATUS_TEXT_LIMIT: usize = 256;

pub const LAYOUT_SYMBOL_LIMIT: usize = 16;

/// A tag is a bit of a `u32` and the all-tags mask has to stay representable.
pub const TAG_LIMIT: usize = 31;

pub const DEFAULT_TAGS: [&str; 9] = ["1", "2", "3", "4", "5", "6", "7", "8", "9"];

const _: () = assert!(DEFAULT_TAGS.len() <= TAG_LIMIT);

/// Layouts selectable at runtime, the first is what monitors start with.
pub const LAYOUTS: [Layout; 3] = [Layout::Tile, Layout::Floating, Layout::Monocle];

// Core protocol modifier bits, mirrors of `ModMask` that can be or'ed in a const context
pub const SHIFT: u16 = 1 << 0;
pub const LOCK: u16 = 1 << 1;
pub const CONTROL: u16 = 1 << 2;
pub const MOD1: u16 = 1 << 3;
pub const MOD2: u16 = 1 << 4;
pub const MOD3: u16 = 1 << 5;
pub const MOD4: u16 = 1 << 6;
pub const MOD5: u16 = 1 << 7;

pub const BUTTON1: u8 = 1;
pub const BUTTON2: u8 = 2;
pub const BUTTON3: u8 = 3;

/**
The mod key, maps to alt. Change to `MOD4` for super.
 **/
pub const MOD_KEY: u16 = MOD1;

pub const TERMINAL_CMD: &[&str] = &["xterm"];

/// The launcher gets `-m <monitor number>` inserted when spawned.
pub const DMENU_CMD: &[&str] = &[
    "dmenu_run",
    "-fn",
    "fixed",
    "-nb",
    "#1a1b26",
    "-nf",
    "#dde1e6",
    "-sb",
    "#7aa2f7",
    "-sf",
    "#24283b",
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    Spawn(&'static [&'static str]),
    ToggleBar,
    FocusStack(i32),
    IncNMaster(i32),
    /// Relative below 1.0, absolute `value - 1.0` above
    SetMfact(f32),
    Zoom,
    /// A zero mask goes back to the previous tag-set
    View(u32),
    KillClient,
    /// `None` toggles between the two last layouts
    SetLayout(Option<Layout>),
    ToggleFloating,
    ToggleView(u32),
    Tag(u32),
    ToggleTag(u32),
    FocusMon(i32),
    TagMon(i32),
    MoveMouse,
    ResizeMouse,
    Quit,
}

impl Action {
    /// Tag bar bindings are configured with a zero mask and act on the clicked tag.
    #[must_use]
    pub fn with_clicked_tag(self, tag: usize) -> Self {
        let mask = 1 << tag;
        match self {
            Action::View(0) => Action::View(mask),
            Action::ToggleView(0) => Action::ToggleView(mask),
            Action::Tag(0) => Action::Tag(mask),
            Action::ToggleTag(0) => Action::ToggleTag(mask),
            other => other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "config-file", derive(serde::Deserialize))]
#[cfg_attr(feature = "config-file", serde(default))]
pub struct Sizing {
    pub border_width: u32,
    /// Distance in pixels from a work area edge where dragged clients snap to it
    pub snap: u32,
}

impl Default for Sizing {
    fn default() -> Self {
        Self {
            border_width: 2,
            snap: 32,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config-file", derive(serde::Deserialize))]
#[cfg_attr(feature = "config-file", serde(default))]
#[allow(clippy::struct_excessive_bools)]
pub struct Options {
    pub show_bar: bool,
    pub top_bar: bool,
    pub master_factor: f32,
    pub master_count: u32,
    /// Honor size hints of tiled clients too
    pub resize_hints: bool,
    /// Keep focus on a fullscreen client when cycling the stack
    pub lock_fullscreen: bool,
    pub font: String,
    pub cursor_name: String,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            show_bar: true,
            top_bar: true,
            master_factor: 0.55,
            master_count: 1,
            resize_hints: true,
            lock_fullscreen: true,
            font: "fixed".to_owned(),
            cursor_name: "left_ptr".to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config-file", derive(serde::Deserialize))]
#[cfg_attr(feature = "config-file", serde(default))]
pub struct Cfg {
    pub sizing: Sizing,
    pub options: Options,
    pub colors: ColorBuilder,
    pub tags: Vec<String>,
    pub rules: Vec<Rule>,
    /// Shell commands run once at startup, terminated again on shutdown
    pub autostart: Vec<String>,
    #[cfg_attr(
        feature = "config-file",
        serde(skip, default = "key_map::default_key_mappings")
    )]
    pub key_mappings: Vec<KeyboardMapping>,
    #[cfg_attr(
        feature = "config-file",
        serde(skip, default = "mouse_map::default_mouse_mappings")
    )]
    pub mouse_mappings: Vec<MouseMapping>,
}

impl Default for Cfg {
    fn default() -> Self {
        Self {
            sizing: Sizing::default(),
            options: Options::default(),
            colors: ColorBuilder::default(),
            tags: DEFAULT_TAGS.iter().map(|t| (*t).to_owned()).collect(),
            rules: rules::default_rules(),
            autostart: Vec::new(),
            key_mappings: key_map::default_key_mappings(),
            mouse_mappings: mouse_map::default_mouse_mappings(),
        }
    }
}

impl Cfg {
    /// Compiled defaults overlaid with the user's config file if there is a usable one.
    #[must_use]
    pub fn new() -> Self {
        #[cfg(feature = "config-file")]
        {
            match crate::util::load_cfg::load_cfg().and_then(Cfg::validated) {
                Ok(cfg) => cfg,
                Err(Error::ConfigDirFind | Error::ConfigFileFind) => {
                    tracing::info!("No config file found, using defaults");
                    Self::default()
                }
                Err(e) => {
                    tracing::warn!("Failed to load config file, using defaults: {e}");
                    Self::default()
                }
            }
        }
        #[cfg(not(feature = "config-file"))]
        {
            Self::default()
        }
    }

    pub fn validated(self) -> Result<Self> {
        if self.tags.is_empty() || self.tags.len() > TAG_LIMIT {
            return Err(Error::TooManyTags(self.tags.len()));
        }
        Ok(self)
    }

    #[must_use]
    pub fn tag_mask(&self) -> u32 {
        tag_mask(self.tags.len())
    }
}

#[inline]
#[must_use]
pub const fn tag_mask(tag_count: usize) -> u32 {
    (1 << tag_count) - 1
}

#[cfg(test)]
mod tests {
    use crate::config::{tag_mask, Action, Cfg, DEFAULT_TAGS, TAG_LIMIT};
    use crate::error::Error;

    #[test]
    fn tag_mask_covers_tags() {
        assert_eq!(0b1_1111_1111, tag_mask(DEFAULT_TAGS.len()));
        assert_eq!(i32::MAX as u32, tag_mask(TAG_LIMIT));
        assert_eq!(0x1ff, Cfg::default().tag_mask());
    }

    #[test]
    fn tag_bar_actions_get_the_clicked_tag() {
        assert_eq!(Action::View(1 << 3), Action::View(0).with_clicked_tag(3));
        assert_eq!(Action::ToggleTag(1), Action::ToggleTag(0).with_clicked_tag(0));
        // Only the zero sentinel is replaced
        assert_eq!(Action::View(4), Action::View(4).with_clicked_tag(0));
        assert_eq!(Action::Zoom, Action::Zoom.with_clicked_tag(2));
    }

    #[test]
    fn rejects_tag_counts_that_do_not_fit() {
        let mut cfg = Cfg::default();
        cfg.tags = (0..32).map(|i| i.to_string()).collect();
        assert!(matches!(cfg.validated(), Err(Error::TooManyTags(32))));
        let mut cfg = Cfg::default();
        cfg.tags.clear();
        assert!(cfg.validated().is_err());
        assert!(Cfg::default().validated().is_ok());
    }

    #[test]
    fn defaults() {
        let cfg = Cfg::default();
        assert_eq!(2, cfg.sizing.border_width);
        assert_eq!(32, cfg.sizing.snap);
        assert!((cfg.options.master_factor - 0.55).abs() < f32::EPSILON);
        assert_eq!(1, cfg.options.master_count);
        assert_eq!(9, cfg.tags.len());
        assert!(!cfg.key_mappings.is_empty());
        assert!(!cfg.mouse_mappings.is_empty());
    }
}
