use crate::config::{Action, BUTTON1, BUTTON2, BUTTON3, MOD_KEY, TERMINAL_CMD};
use crate::geometry::layout::Layout;

/// Where a button press landed.
#[derive(Debug, Eq, PartialEq, Hash, Clone, Copy)]
pub enum MouseTarget {
    TagBar,
    LtSymbol,
    StatusText,
    WinTitle,
    ClientWin,
    RootWin,
}

impl MouseTarget {
    #[must_use]
    pub fn on_bar(&self) -> bool {
        matches!(
            self,
            MouseTarget::TagBar
                | MouseTarget::LtSymbol
                | MouseTarget::StatusText
                | MouseTarget::WinTitle
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouseMapping {
    pub target: MouseTarget,
    pub action: Action,
    pub mods: u16,
    pub button: u8,
}

impl MouseMapping {
    #[must_use]
    pub const fn new(target: MouseTarget, mods: u16, button: u8, action: Action) -> Self {
        MouseMapping {
            target,
            action,
            mods,
            button,
        }
    }

    #[inline]
    #[must_use]
    pub fn matches(&self, target: MouseTarget, button: u8, clean_state: u16) -> bool {
        self.target == target && self.button == button && self.mods == clean_state
    }
}

/**
Tag bar bindings take a zero mask, the clicked tag is filled in when they fire.
Client window bindings are the only ones grabbed on the focused client.
 **/
pub const MOUSE_MAPPINGS: [MouseMapping; 11] = [
    MouseMapping::new(MouseTarget::LtSymbol, 0, BUTTON1, Action::SetLayout(None)),
    MouseMapping::new(
        MouseTarget::LtSymbol,
        0,
        BUTTON3,
        Action::SetLayout(Some(Layout::Monocle)),
    ),
    MouseMapping::new(MouseTarget::WinTitle, 0, BUTTON2, Action::Zoom),
    MouseMapping::new(MouseTarget::StatusText, 0, BUTTON2, Action::Spawn(TERMINAL_CMD)),
    MouseMapping::new(MouseTarget::ClientWin, MOD_KEY, BUTTON1, Action::MoveMouse),
    MouseMapping::new(MouseTarget::ClientWin, MOD_KEY, BUTTON2, Action::ToggleFloating),
    MouseMapping::new(MouseTarget::ClientWin, MOD_KEY, BUTTON3, Action::ResizeMouse),
    MouseMapping::new(MouseTarget::TagBar, 0, BUTTON1, Action::View(0)),
    MouseMapping::new(MouseTarget::TagBar, 0, BUTTON3, Action::ToggleView(0)),
    MouseMapping::new(MouseTarget::TagBar, MOD_KEY, BUTTON1, Action::Tag(0)),
    MouseMapping::new(MouseTarget::TagBar, MOD_KEY, BUTTON3, Action::ToggleTag(0)),
];

#[must_use]
pub fn default_mouse_mappings() -> Vec<MouseMapping> {
    MOUSE_MAPPINGS.to_vec()
}

#[cfg(test)]
mod tests {
    use crate::config::mouse_map::{MouseTarget, MOUSE_MAPPINGS};
    use crate::config::{Action, BUTTON1, MOD_KEY};

    #[test]
    fn client_bindings_need_the_modifier() {
        assert!(MOUSE_MAPPINGS
            .iter()
            .filter(|m| m.target == MouseTarget::ClientWin)
            .all(|m| m.mods == MOD_KEY));
    }

    #[test]
    fn matches_on_target_button_and_mods() {
        let hits: Vec<_> = MOUSE_MAPPINGS
            .iter()
            .filter(|m| m.matches(MouseTarget::TagBar, BUTTON1, 0))
            .collect();
        assert_eq!(1, hits.len());
        assert_eq!(Action::View(0), hits[0].action);
        assert!(!MOUSE_MAPPINGS
            .iter()
            .any(|m| m.matches(MouseTarget::RootWin, BUTTON1, 0)));
    }

    #[test]
    fn only_bar_targets_are_on_bar() {
        assert!(MouseTarget::TagBar.on_bar());
        assert!(MouseTarget::WinTitle.on_bar());
        assert!(!MouseTarget::ClientWin.on_bar());
        assert!(!MouseTarget::RootWin.on_bar());
    }
}
