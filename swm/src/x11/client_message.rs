use x11rb::protocol::xproto::{AtomEnum, ClientMessageEvent, Property, PropertyNotifyEvent, Window};

use crate::error::Result;
use crate::x11::call_wrapper::{CallWrapper, SupportedAtom};
use crate::x11::cookies::{FallbackNameConvertCookie, TextCookie, TransientConvertCookie, WordsCookie};

pub(crate) enum PropertyChangeMessage<'a> {
    /// The root window's name changed
    Status(TextCookie<'a>),
    TransientFor((Window, TransientConvertCookie<'a>)),
    /// Hints are re-read lazily the next time they're applied
    NormalHints(Window),
    Hints((Window, WordsCookie<'a>)),
    Name((Window, FallbackNameConvertCookie<'a>)),
    WindowType(Window),
}

pub(crate) fn convert_property_change<'a>(
    call_wrapper: &'a CallWrapper,
    event: &PropertyNotifyEvent,
    root: Window,
) -> Result<Option<PropertyChangeMessage<'a>>> {
    if event.window == root {
        return if event.atom == u32::from(AtomEnum::WM_NAME) {
            Ok(Some(PropertyChangeMessage::Status(
                call_wrapper.get_root_name(root)?,
            )))
        } else {
            Ok(None)
        };
    }
    if event.state == Property::DELETE {
        return Ok(None);
    }
    let win = event.window;
    let message = if event.atom == u32::from(AtomEnum::WM_TRANSIENT_FOR) {
        Some(PropertyChangeMessage::TransientFor((
            win,
            call_wrapper.get_is_transient_for(win)?,
        )))
    } else if event.atom == u32::from(AtomEnum::WM_NORMAL_HINTS) {
        Some(PropertyChangeMessage::NormalHints(win))
    } else if event.atom == u32::from(AtomEnum::WM_HINTS) {
        Some(PropertyChangeMessage::Hints((
            win,
            call_wrapper.get_wm_hints(win)?,
        )))
    } else if event.atom == u32::from(AtomEnum::WM_NAME) {
        Some(PropertyChangeMessage::Name((win, call_wrapper.get_name(win)?)))
    } else {
        match call_wrapper.resolve_atom(event.atom) {
            Some(SupportedAtom::NetWmName) => {
                Some(PropertyChangeMessage::Name((win, call_wrapper.get_name(win)?)))
            }
            Some(SupportedAtom::NetWmWindowType) => Some(PropertyChangeMessage::WindowType(win)),
            _ => None,
        }
    };
    Ok(message)
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum ClientMessage {
    Fullscreen((Window, ChangeType)),
    RequestActiveWindow(Window),
}

pub(crate) fn convert_message(
    call_wrapper: &CallWrapper,
    event: &ClientMessageEvent,
) -> Option<ClientMessage> {
    match call_wrapper.resolve_atom(event.type_)? {
        SupportedAtom::NetWmState => {
            let data = event.data.as_data32();
            let fullscreen = call_wrapper.atom(crate::x11::call_wrapper::_NET_WM_STATE_FULLSCREEN);
            if data[1] == fullscreen || data[2] == fullscreen {
                tracing::debug!("Got fullscreen state change for {}", event.window);
                Some(ClientMessage::Fullscreen((
                    event.window,
                    ChangeType::from_number(data[0]),
                )))
            } else {
                None
            }
        }
        SupportedAtom::NetActiveWindow => Some(ClientMessage::RequestActiveWindow(event.window)),
        _ => None,
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum ChangeType {
    Remove,
    Add,
    Toggle,
}

impl ChangeType {
    fn from_number(num: u32) -> Self {
        match num {
            1 => ChangeType::Add,
            2 => ChangeType::Toggle,
            _ => ChangeType::Remove,
        }
    }

    /// The state after applying the change to `current`.
    pub(crate) fn apply(self, current: bool) -> bool {
        match self {
            ChangeType::Remove => false,
            ChangeType::Add => true,
            ChangeType::Toggle => !current,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::x11::client_message::ChangeType;

    #[test]
    fn unknown_actions_remove() {
        assert_eq!(ChangeType::Remove, ChangeType::from_number(0));
        assert_eq!(ChangeType::Add, ChangeType::from_number(1));
        assert_eq!(ChangeType::Toggle, ChangeType::from_number(2));
        assert_eq!(ChangeType::Remove, ChangeType::from_number(7));
    }

    #[test]
    fn toggle_flips_current() {
        assert!(ChangeType::Toggle.apply(false));
        assert!(!ChangeType::Toggle.apply(true));
        assert!(ChangeType::Add.apply(true));
        assert!(!ChangeType::Remove.apply(true));
    }
}
