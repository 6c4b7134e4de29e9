use crate::config::WM_CLASS_NAME_LIMIT;
use crate::geometry::size_hints::RawSizeHints;
use crate::util::macros::truncate_heapless;

/// [`WM_STATE`](https://tronche.com/gui/x/icccm/sec-4.html#s-4.1.3.1)
#[derive(PartialEq, Eq, Debug, Copy, Clone)]
pub enum WmState {
    Withdrawn,
    Normal,
    Iconic,
}

impl WmState {
    #[must_use]
    pub const fn get_value(&self) -> u32 {
        match self {
            WmState::Withdrawn => 0,
            WmState::Normal => 1,
            WmState::Iconic => 3,
        }
    }

    #[must_use]
    pub fn from_value(val: u32) -> Option<Self> {
        match val {
            0 => Some(WmState::Withdrawn),
            1 => Some(WmState::Normal),
            3 => Some(WmState::Iconic),
            _ => None,
        }
    }
}

// WM_NORMAL_HINTS flags
const P_MIN_SIZE: u32 = 1 << 4;
const P_MAX_SIZE: u32 = 1 << 5;
const P_RESIZE_INC: u32 = 1 << 6;
const P_ASPECT: u32 = 1 << 7;
const P_BASE_SIZE: u32 = 1 << 8;

// WM_HINTS flags
const INPUT_HINT: u32 = 1 << 0;
const URGENCY_HINT: u32 = 1 << 8;

/// Reads the 18 words of a `WM_NORMAL_HINTS` property, older clients send 15 without base size.
#[must_use]
pub fn parse_normal_hints(words: &[u32]) -> Option<RawSizeHints> {
    let flags = *words.first()?;
    let pair = |ind: usize| -> Option<(i32, i32)> {
        Some((*words.get(ind)? as i32, *words.get(ind + 1)? as i32))
    };
    let when = |flag: u32, ind: usize| (flags & flag != 0).then(|| pair(ind)).flatten();
    Some(RawSizeHints {
        min: when(P_MIN_SIZE, 5),
        max: when(P_MAX_SIZE, 7),
        inc: when(P_RESIZE_INC, 9),
        aspect: (flags & P_ASPECT != 0)
            .then(|| Some((pair(11)?, pair(13)?)))
            .flatten(),
        base: when(P_BASE_SIZE, 15),
    })
}

/// The parts of `WM_HINTS` that matter for focus and attention.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct WmHints {
    /// `None` if the client didn't say
    pub input: Option<bool>,
    pub urgent: bool,
}

impl WmHints {
    #[must_use]
    pub fn parse(words: &[u32]) -> Option<Self> {
        let flags = *words.first()?;
        let input = if flags & INPUT_HINT == 0 {
            None
        } else {
            Some(words.get(1).is_some_and(|input| *input != 0))
        };
        Some(Self {
            input,
            urgent: flags & URGENCY_HINT != 0,
        })
    }

    /// A client that explicitly refuses input focus.
    #[must_use]
    pub fn never_focus(&self) -> bool {
        self.input == Some(false)
    }
}

/// The same `WM_HINTS` words with the urgency flag set or cleared.
#[must_use]
pub fn with_urgency(words: &[u32], urgent: bool) -> Vec<u32> {
    let mut out = words.to_vec();
    if out.is_empty() {
        out.push(0);
    }
    if urgent {
        out[0] |= URGENCY_HINT;
    } else {
        out[0] &= !URGENCY_HINT;
    }
    out
}

/// `WM_CLASS` is two nul terminated strings, instance first.
#[must_use]
pub fn parse_class(
    raw: &[u8],
) -> (
    Option<heapless::String<WM_CLASS_NAME_LIMIT>>,
    Option<heapless::String<WM_CLASS_NAME_LIMIT>>,
) {
    let mut parts = raw
        .split(|b| *b == 0)
        .map(|part| core::str::from_utf8(part).ok().map(truncate_heapless));
    let instance = parts.next().flatten().filter(|s| !s.is_empty());
    let class = parts.next().flatten().filter(|s| !s.is_empty());
    (instance, class)
}
