use x11_keysyms::{
    XK_Return, XK_Tab, XK_b, XK_c, XK_comma, XK_d, XK_f, XK_h, XK_i, XK_j, XK_k, XK_l, XK_m, XK_p,
    XK_period, XK_q, XK_space, XK_t, XK_0, XK_1, XK_2, XK_3, XK_4, XK_5, XK_6, XK_7, XK_8, XK_9,
};

use crate::config::{Action, CONTROL, DMENU_CMD, MOD_KEY, SHIFT, TERMINAL_CMD};
use crate::geometry::layout::Layout;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyboardMapping {
    pub mods: u16,
    pub keysym: u32,
    pub action: Action,
}

impl KeyboardMapping {
    #[must_use]
    pub const fn new(mods: u16, keysym: u32, action: Action) -> Self {
        KeyboardMapping {
            mods,
            keysym,
            action,
        }
    }

    /// Matches against an already cleaned event state.
    #[inline]
    #[must_use]
    pub fn matches(&self, keysym: u32, clean_state: u16) -> bool {
        self.keysym == keysym && self.mods == clean_state
    }
}

const TAG_KEYS: [u32; 9] = [XK_1, XK_2, XK_3, XK_4, XK_5, XK_6, XK_7, XK_8, XK_9];

const KEYBOARD_MAPPINGS: [KeyboardMapping; 24] = [
    KeyboardMapping::new(MOD_KEY, XK_p, Action::Spawn(DMENU_CMD)),
    KeyboardMapping::new(MOD_KEY | SHIFT, XK_Return, Action::Spawn(TERMINAL_CMD)),
    KeyboardMapping::new(MOD_KEY, XK_b, Action::ToggleBar),
    KeyboardMapping::new(MOD_KEY, XK_j, Action::FocusStack(1)),
    KeyboardMapping::new(MOD_KEY, XK_k, Action::FocusStack(-1)),
    KeyboardMapping::new(MOD_KEY, XK_i, Action::IncNMaster(1)),
    KeyboardMapping::new(MOD_KEY, XK_d, Action::IncNMaster(-1)),
    KeyboardMapping::new(MOD_KEY, XK_h, Action::SetMfact(-0.05)),
    KeyboardMapping::new(MOD_KEY, XK_l, Action::SetMfact(0.05)),
    KeyboardMapping::new(MOD_KEY, XK_Return, Action::Zoom),
    // Back to the previous tag-set
    KeyboardMapping::new(MOD_KEY, XK_Tab, Action::View(0)),
    KeyboardMapping::new(MOD_KEY | SHIFT, XK_c, Action::KillClient),
    KeyboardMapping::new(MOD_KEY, XK_t, Action::SetLayout(Some(Layout::Tile))),
    KeyboardMapping::new(MOD_KEY, XK_f, Action::SetLayout(Some(Layout::Floating))),
    KeyboardMapping::new(MOD_KEY, XK_m, Action::SetLayout(Some(Layout::Monocle))),
    KeyboardMapping::new(MOD_KEY, XK_space, Action::SetLayout(None)),
    KeyboardMapping::new(MOD_KEY | SHIFT, XK_space, Action::ToggleFloating),
    KeyboardMapping::new(MOD_KEY, XK_0, Action::View(!0)),
    KeyboardMapping::new(MOD_KEY | SHIFT, XK_0, Action::Tag(!0)),
    KeyboardMapping::new(MOD_KEY, XK_comma, Action::FocusMon(-1)),
    KeyboardMapping::new(MOD_KEY, XK_period, Action::FocusMon(1)),
    KeyboardMapping::new(MOD_KEY | SHIFT, XK_comma, Action::TagMon(-1)),
    KeyboardMapping::new(MOD_KEY | SHIFT, XK_period, Action::TagMon(1)),
    KeyboardMapping::new(MOD_KEY | SHIFT, XK_q, Action::Quit),
];

/// The fixed bindings followed by the four bindings per tag key.
#[must_use]
pub fn default_key_mappings() -> Vec<KeyboardMapping> {
    let mut mappings = KEYBOARD_MAPPINGS.to_vec();
    for (ind, keysym) in TAG_KEYS.iter().copied().enumerate() {
        let mask = 1 << ind;
        mappings.push(KeyboardMapping::new(MOD_KEY, keysym, Action::View(mask)));
        mappings.push(KeyboardMapping::new(
            MOD_KEY | CONTROL,
            keysym,
            Action::ToggleView(mask),
        ));
        mappings.push(KeyboardMapping::new(
            MOD_KEY | SHIFT,
            keysym,
            Action::Tag(mask),
        ));
        mappings.push(KeyboardMapping::new(
            MOD_KEY | CONTROL | SHIFT,
            keysym,
            Action::ToggleTag(mask),
        ));
    }
    mappings
}

#[cfg(test)]
mod tests {
    use x11_keysyms::{XK_Return, XK_3};

    use crate::config::key_map::default_key_mappings;
    use crate::config::{Action, CONTROL, MOD_KEY, SHIFT, TERMINAL_CMD};

    #[test]
    fn tag_keys_cover_all_four_actions() {
        let mappings = default_key_mappings();
        let on_3: Vec<_> = mappings.iter().filter(|m| m.keysym == XK_3).collect();
        assert_eq!(4, on_3.len());
        assert!(on_3
            .iter()
            .any(|m| m.mods == MOD_KEY | CONTROL | SHIFT && m.action == Action::ToggleTag(1 << 2)));
        assert!(on_3
            .iter()
            .any(|m| m.mods == MOD_KEY && m.action == Action::View(1 << 2)));
    }

    #[test]
    fn no_duplicate_bindings() {
        let mappings = default_key_mappings();
        for (i, a) in mappings.iter().enumerate() {
            for b in &mappings[i + 1..] {
                assert!(!(a.keysym == b.keysym && a.mods == b.mods), "{a:?} {b:?}");
            }
        }
    }

    #[test]
    fn match_requires_exact_mods() {
        let mappings = default_key_mappings();
        let found: Vec<_> = mappings
            .iter()
            .filter(|m| m.matches(XK_Return, MOD_KEY | SHIFT))
            .collect();
        assert_eq!(1, found.len());
        assert_eq!(Action::Spawn(TERMINAL_CMD), found[0].action);
        assert_eq!(
            Action::Zoom,
            mappings
                .iter()
                .find(|m| m.matches(XK_Return, MOD_KEY))
                .unwrap()
                .action
        );
    }
}
