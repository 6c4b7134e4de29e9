use heapless::FnvIndexMap;
use swm_core::config::mouse_map::MouseTarget;
use swm_core::config::{LOCK, WINDOW_MANAGER_NAME};
use swm_core::geometry::Rect;
use swm_core::state::properties::WmState;
use swm_core::state::State;
use x11rb::connection::Connection;
use x11rb::errors::ReplyError;
use x11rb::protocol::xproto::{
    Allow, Atom, AtomEnum, ButtonIndex, ChangeWindowAttributesAux, ClientMessageEvent, CloseDown,
    ConfigureNotifyEvent, ConfigureRequestEvent, ConfigureWindowAux, ConnectionExt, Cursor,
    EventMask, GetWindowAttributesReply, Grab, GrabMode, GrabStatus, InputFocus, ModMask,
    PropMode, StackMode, Window, CONFIGURE_NOTIFY_EVENT,
};
use x11rb::protocol::{ErrorKind, Event};
use x11rb::rust_connection::RustConnection;
use x11rb::wrapper::ConnectionExt as _;
use x11rb::{CURRENT_TIME, NONE};

use crate::error::{Error, Result};
use crate::x11::cookies::{
    ClassConvertCookie, FallbackNameConvertCookie, GeometryCookie, QueryTreeCookie, TextCookie,
    TransientConvertCookie, WordsCookie,
};
use crate::x11::event_queue::EventQueue;

const ATOM_LIMIT: usize = 32;

/// `PointerRoot` as a focus target.
const POINTER_ROOT: Window = 1;

type AtomMap<K> = FnvIndexMap<K, ResolvedAtom, ATOM_LIMIT>;

macro_rules! impl_atoms {
    ($( $const_name:ident, $enum_name:ident, $is_ewmh: expr),* ) => {
        // Init consts
        $(
            pub(crate) const $const_name: &[u8] = stringify!($const_name).as_bytes();
        )*
        // Init Enum
        #[derive(Clone, Copy, Debug, Eq, PartialEq)]
        pub(crate) enum SupportedAtom {
            $(
                $enum_name,
            )*
        }

        fn init_maps(connection: &RustConnection) -> Result<(AtomMap<&'static [u8]>, AtomMap<Atom>)> {
            let mut name_to_atom = FnvIndexMap::new();
            let mut atom_to_resolved = FnvIndexMap::new();
            // Every intern request is sent before the first reply is awaited
            let cookies = [
                $(
                    ($const_name, SupportedAtom::$enum_name, $is_ewmh, connection.intern_atom(false, $const_name)?),
                )*
            ];
            for (name, intern_atom, ewmh, cookie) in cookies {
                let resolved = ResolvedAtom {
                    intern_atom,
                    value: cookie.reply()?.atom,
                    ewmh,
                };
                name_to_atom
                    .insert(name, resolved)
                    .map_err(|_| swm_core::error::Error::HeaplessPush(ATOM_LIMIT))?;
                atom_to_resolved
                    .insert(resolved.value, resolved)
                    .map_err(|_| swm_core::error::Error::HeaplessPush(ATOM_LIMIT))?;
            }
            Ok((name_to_atom, atom_to_resolved))
        }
    };
}

impl_atoms!(
    WM_PROTOCOLS,
    WmProtocols,
    false,
    WM_DELETE_WINDOW,
    WmDeleteWindow,
    false,
    WM_STATE,
    WmState,
    false,
    WM_TAKE_FOCUS,
    WmTakeFocus,
    false,
    UTF8_STRING,
    Utf8String,
    false,
    _NET_ACTIVE_WINDOW,
    NetActiveWindow,
    true,
    _NET_SUPPORTED,
    NetSupported,
    true,
    _NET_WM_NAME,
    NetWmName,
    true,
    _NET_WM_STATE,
    NetWmState,
    true,
    _NET_SUPPORTING_WM_CHECK,
    NetSupportingWmCheck,
    true,
    _NET_WM_STATE_FULLSCREEN,
    NetWmStateFullscreen,
    true,
    _NET_WM_WINDOW_TYPE,
    NetWmWindowType,
    true,
    _NET_WM_WINDOW_TYPE_DIALOG,
    NetWmWindowTypeDialog,
    true,
    _NET_CLIENT_LIST,
    NetClientList,
    true
);

#[derive(Clone, Copy, Debug)]
pub(crate) struct ResolvedAtom {
    pub(crate) intern_atom: SupportedAtom,
    pub(crate) value: u32,
    pub(crate) ewmh: bool,
}

/// Keysyms of every keycode, bindings only look at the first column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct KeysymTable {
    min_keycode: u8,
    per_keycode: u8,
    keysyms: Vec<u32>,
}

impl KeysymTable {
    fn fetch(connection: &RustConnection) -> Result<Self> {
        let setup = connection.setup();
        let lo = setup.min_keycode;
        let count = setup.max_keycode.saturating_sub(lo).saturating_add(1);
        let mapping = connection.get_keyboard_mapping(lo, count)?.reply()?;
        Ok(Self {
            min_keycode: lo,
            per_keycode: mapping.keysyms_per_keycode,
            keysyms: mapping.keysyms,
        })
    }

    #[must_use]
    pub(crate) fn keysym(&self, code: u8) -> u32 {
        code.checked_sub(self.min_keycode)
            .and_then(|ind| {
                self.keysyms
                    .get(ind as usize * self.per_keycode as usize)
            })
            .copied()
            .unwrap_or(0)
    }

    pub(crate) fn keycodes(&self, keysym: u32) -> impl Iterator<Item = u8> + '_ {
        self.keysyms
            .chunks(self.per_keycode.max(1) as usize)
            .enumerate()
            .filter(move |(_, syms)| syms.first() == Some(&keysym))
            .map(|(ind, _)| self.min_keycode.wrapping_add(ind as u8))
    }
}

/// The modifier bit num lock is mapped to, 0 if it isn't.
fn numlock_mask(per_modifier: usize, modifier_keycodes: &[u8], numlock_codes: &[u8]) -> u16 {
    modifier_keycodes
        .chunks(per_modifier.max(1))
        .take(8)
        .position(|codes| {
            codes
                .iter()
                .any(|code| *code != 0 && numlock_codes.contains(code))
        })
        .map_or(0, |ind| 1 << ind)
}

/// Bindings are grabbed under every combination of the lock modifiers so that they work with
/// num lock and caps lock on.
fn lock_combinations(numlock: u16) -> [u16; 4] {
    [0, LOCK, numlock, numlock | LOCK]
}

pub(crate) struct CallWrapper {
    connection: RustConnection,
    name_to_atom: AtomMap<&'static [u8]>,
    atom_to_resolved: AtomMap<Atom>,
    keysyms: KeysymTable,
    queue: EventQueue<Event>,
}

impl CallWrapper {
    pub(crate) fn new(connection: RustConnection) -> Result<Self> {
        let (name_to_atom, atom_to_resolved) = init_maps(&connection)?;
        let keysyms = KeysymTable::fetch(&connection)?;
        Ok(CallWrapper {
            connection,
            name_to_atom,
            atom_to_resolved,
            keysyms,
            queue: EventQueue::new(),
        })
    }

    #[inline]
    pub(crate) fn inner(&self) -> &RustConnection {
        &self.connection
    }

    pub(crate) fn atom(&self, name: &[u8]) -> Atom {
        self.name_to_atom.get(name).map_or(NONE, |resolved| resolved.value)
    }

    pub(crate) fn resolve_atom(&self, atom: Atom) -> Option<SupportedAtom> {
        self.atom_to_resolved
            .get(&atom)
            .map(|resolved| resolved.intern_atom)
    }

    pub(crate) fn try_become_wm(&self, root: Window) -> Result<()> {
        let change = ChangeWindowAttributesAux::default()
            .event_mask(EventMask::SUBSTRUCTURE_REDIRECT);
        let res = self
            .connection
            .change_window_attributes(root, &change)?
            .check();
        match res {
            Err(ReplyError::X11Error(ref error)) if error.error_kind == ErrorKind::Access => {
                tracing::error!("Failed to start, another window manager is already running");
                Err(Error::BecomeWm)
            }
            Err(e) => Err(e.into()),
            Ok(()) => Ok(()),
        }
    }

    pub(crate) fn set_default_manager_props(&self, state: &State) -> Result<()> {
        let check = state.wm_check_win;
        self.connection.change_property32(
            PropMode::REPLACE,
            check,
            self.atom(_NET_SUPPORTING_WM_CHECK),
            AtomEnum::WINDOW,
            &[check],
        )?;
        self.connection.change_property8(
            PropMode::REPLACE,
            check,
            self.atom(_NET_WM_NAME),
            self.atom(UTF8_STRING),
            WINDOW_MANAGER_NAME.as_bytes(),
        )?;
        self.connection.change_property32(
            PropMode::REPLACE,
            state.root,
            self.atom(_NET_SUPPORTING_WM_CHECK),
            AtomEnum::WINDOW,
            &[check],
        )?;
        self.connection.change_property32(
            PropMode::REPLACE,
            state.root,
            self.atom(_NET_SUPPORTED),
            AtomEnum::ATOM,
            self.name_to_atom
                .values()
                .filter(|resolved| resolved.ewmh)
                .map(|resolved| resolved.value)
                .collect::<heapless::Vec<u32, ATOM_LIMIT>>()
                .as_slice(),
        )?;
        self.connection
            .delete_property(state.root, self.atom(_NET_CLIENT_LIST))?;
        Ok(())
    }

    pub(crate) fn set_root_event_mask(&self, root: Window, cursor: Cursor) -> Result<()> {
        let change_attrs_aux = ChangeWindowAttributesAux::new()
            .event_mask(
                EventMask::SUBSTRUCTURE_REDIRECT
                    | EventMask::SUBSTRUCTURE_NOTIFY
                    | EventMask::BUTTON_PRESS
                    | EventMask::POINTER_MOTION
                    | EventMask::ENTER_WINDOW
                    | EventMask::LEAVE_WINDOW
                    | EventMask::STRUCTURE_NOTIFY
                    | EventMask::PROPERTY_CHANGE,
            )
            .cursor(cursor);
        self.connection
            .change_window_attributes(root, &change_attrs_aux)?
            .check()?;
        Ok(())
    }

    pub(crate) fn set_client_event_mask(&self, window: Window) -> Result<()> {
        let cw = ChangeWindowAttributesAux::new().event_mask(
            EventMask::ENTER_WINDOW
                | EventMask::FOCUS_CHANGE
                | EventMask::PROPERTY_CHANGE
                | EventMask::STRUCTURE_NOTIFY,
        );
        self.connection.change_window_attributes(window, &cw)?;
        Ok(())
    }

    pub(crate) fn refresh_keyboard_mapping(&mut self) -> Result<()> {
        self.keysyms = KeysymTable::fetch(&self.connection)?;
        Ok(())
    }

    #[inline]
    pub(crate) fn keycode_to_keysym(&self, code: u8) -> u32 {
        self.keysyms.keysym(code)
    }

    pub(crate) fn fetch_numlock_mask(&self) -> Result<u16> {
        let mapping = self.connection.get_modifier_mapping()?.reply()?;
        let numlock_codes: Vec<u8> = self
            .keysyms
            .keycodes(x11_keysyms::XK_Num_Lock)
            .collect();
        Ok(numlock_mask(
            mapping.keycodes_per_modifier() as usize,
            &mapping.keycodes,
            &numlock_codes,
        ))
    }

    pub(crate) fn grab_keys(&self, state: &State) -> Result<()> {
        self.ungrab_keys(state.root)?;
        for mapping in &state.key_mappings {
            for code in self.keysyms.keycodes(mapping.keysym) {
                for modifier in lock_combinations(state.numlock_mask) {
                    self.connection.grab_key(
                        true,
                        state.root,
                        ModMask::from(mapping.mods | modifier),
                        code,
                        GrabMode::ASYNC,
                        GrabMode::ASYNC,
                    )?;
                }
            }
        }
        Ok(())
    }

    pub(crate) fn ungrab_keys(&self, root: Window) -> Result<()> {
        self.connection.ungrab_key(Grab::ANY, root, ModMask::ANY)?;
        Ok(())
    }

    /// Unfocused clients grab every button so that a click focuses them, the focused one only
    /// what's bound on client windows.
    pub(crate) fn grab_buttons(&self, window: Window, focused: bool, state: &State) -> Result<()> {
        let mask = EventMask::BUTTON_PRESS | EventMask::BUTTON_RELEASE;
        self.connection
            .ungrab_button(ButtonIndex::ANY, window, ModMask::ANY)?;
        if !focused {
            self.connection.grab_button(
                false,
                window,
                mask,
                GrabMode::SYNC,
                GrabMode::SYNC,
                NONE,
                NONE,
                ButtonIndex::ANY,
                ModMask::ANY,
            )?;
        }
        for mapping in state
            .mouse_mappings
            .iter()
            .filter(|m| m.target == MouseTarget::ClientWin)
        {
            for modifier in lock_combinations(state.numlock_mask) {
                self.connection.grab_button(
                    false,
                    window,
                    mask,
                    GrabMode::ASYNC,
                    GrabMode::SYNC,
                    NONE,
                    NONE,
                    ButtonIndex::from(mapping.button),
                    ModMask::from(mapping.mods | modifier),
                )?;
            }
        }
        Ok(())
    }

    /// Lets a click that focused a client through to it.
    pub(crate) fn replay_pointer(&self) -> Result<()> {
        self.connection
            .allow_events(Allow::REPLAY_POINTER, CURRENT_TIME)?;
        Ok(())
    }

    /// Input focus and `_NET_ACTIVE_WINDOW` unless the client refuses focus, then `WM_TAKE_FOCUS`
    /// for clients that want to decide themselves.
    pub(crate) fn take_focus(&self, root: Window, target: Window, never_focus: bool) -> Result<()> {
        if !never_focus {
            self.connection
                .set_input_focus(InputFocus::POINTER_ROOT, target, CURRENT_TIME)?;
            self.connection.change_property32(
                PropMode::REPLACE,
                root,
                self.atom(_NET_ACTIVE_WINDOW),
                AtomEnum::WINDOW,
                &[target],
            )?;
        }
        self.send_protocol(target, WM_TAKE_FOCUS)?;
        Ok(())
    }

    pub(crate) fn reset_root_focus(&self, root: Window) -> Result<()> {
        self.connection
            .set_input_focus(InputFocus::POINTER_ROOT, root, CURRENT_TIME)?;
        self.connection
            .delete_property(root, self.atom(_NET_ACTIVE_WINDOW))?;
        Ok(())
    }

    /// Hands focus back to whatever is under the pointer, used when exiting.
    pub(crate) fn focus_pointer_root(&self, root: Window) -> Result<()> {
        self.connection
            .set_input_focus(InputFocus::POINTER_ROOT, POINTER_ROOT, CURRENT_TIME)?;
        self.connection
            .delete_property(root, self.atom(_NET_ACTIVE_WINDOW))?;
        Ok(())
    }

    /// Sends `protocol` if the client lists it in `WM_PROTOCOLS`, returns whether it did.
    pub(crate) fn send_protocol(&self, win: Window, protocol: &[u8]) -> Result<bool> {
        let protocol = self.atom(protocol);
        let supported = self
            .connection
            .get_property(
                false,
                win,
                self.atom(WM_PROTOCOLS),
                AtomEnum::ATOM,
                0,
                32,
            )?
            .reply()
            .ok()
            .and_then(|reply| reply.value32().map(|mut atoms| atoms.any(|a| a == protocol)))
            .unwrap_or(false);
        if supported {
            let event = ClientMessageEvent::new(
                32,
                win,
                self.atom(WM_PROTOCOLS),
                [protocol, CURRENT_TIME, 0, 0, 0],
            );
            tracing::debug!("Sending protocol {protocol} to {win}");
            self.connection
                .send_event(false, win, EventMask::NO_EVENT, &event)?;
        }
        Ok(supported)
    }

    /// Kills the client's connection, returns the sequence range whose errors should be ignored.
    pub(crate) fn kill_client(&self, win: Window) -> Result<(u16, u16)> {
        let first = self.connection.grab_server()?.sequence_number();
        self.connection
            .set_close_down_mode(CloseDown::DESTROY_ALL)?;
        self.connection.kill_client(win)?;
        let last = self.connection.ungrab_server()?.sequence_number();
        self.connection.sync()?;
        Ok((first as u16, last as u16))
    }

    /// Hands a window that's still alive back in the state we found it.
    /// Returns the sequence range whose errors should be ignored.
    pub(crate) fn release_window(&self, win: Window, old_border_width: i32) -> Result<(u16, u16)> {
        let first = self.connection.grab_server()?.sequence_number();
        self.connection.change_window_attributes(
            win,
            &ChangeWindowAttributesAux::new().event_mask(EventMask::NO_EVENT),
        )?;
        self.connection.configure_window(
            win,
            &ConfigureWindowAux::new().border_width(old_border_width as u32),
        )?;
        self.connection
            .ungrab_button(ButtonIndex::ANY, win, ModMask::ANY)?;
        self.set_state(win, WmState::Withdrawn)?;
        let last = self.connection.ungrab_server()?.sequence_number();
        self.connection.sync()?;
        Ok((first as u16, last as u16))
    }

    pub(crate) fn set_state(&self, win: Window, state: WmState) -> Result<()> {
        self.connection.change_property32(
            PropMode::REPLACE,
            win,
            self.atom(WM_STATE),
            self.atom(WM_STATE),
            &[state.get_value(), NONE],
        )?;
        Ok(())
    }

    pub(crate) fn get_state(&self, win: Window) -> Result<Option<WmState>> {
        let cookie = self.connection.get_property(
            false,
            win,
            self.atom(WM_STATE),
            self.atom(WM_STATE),
            0,
            2,
        )?;
        Ok(cookie
            .reply()
            .ok()
            .and_then(|val| val.value32().and_then(|mut v| v.next()))
            .and_then(WmState::from_value))
    }

    pub(crate) fn get_name(&self, win: Window) -> Result<FallbackNameConvertCookie> {
        Ok(FallbackNameConvertCookie {
            ewmh_inner: self.connection.get_property(
                false,
                win,
                self.atom(_NET_WM_NAME),
                self.atom(UTF8_STRING),
                0,
                1028,
            )?,
            wm_inner: self.connection.get_property(
                false,
                win,
                AtomEnum::WM_NAME,
                AtomEnum::ANY,
                0,
                1028,
            )?,
        })
    }

    /// The root window's name is the status text.
    pub(crate) fn get_root_name(&self, root: Window) -> Result<TextCookie> {
        Ok(TextCookie {
            inner: self.connection.get_property(
                false,
                root,
                AtomEnum::WM_NAME,
                AtomEnum::ANY,
                0,
                1028,
            )?,
        })
    }

    pub(crate) fn get_class_names(&self, win: Window) -> Result<ClassConvertCookie> {
        let inner = self.connection.get_property(
            false,
            win,
            AtomEnum::WM_CLASS,
            AtomEnum::STRING,
            0,
            64,
        )?;
        Ok(ClassConvertCookie { inner })
    }

    pub(crate) fn get_is_transient_for(&self, win: Window) -> Result<TransientConvertCookie> {
        let inner = self.connection.get_property(
            false,
            win,
            AtomEnum::WM_TRANSIENT_FOR,
            AtomEnum::WINDOW,
            0,
            1,
        )?;
        Ok(TransientConvertCookie { inner })
    }

    pub(crate) fn get_normal_hints(&self, win: Window) -> Result<WordsCookie> {
        let inner = self.connection.get_property(
            false,
            win,
            AtomEnum::WM_NORMAL_HINTS,
            AtomEnum::WM_SIZE_HINTS,
            0,
            18,
        )?;
        Ok(WordsCookie { inner })
    }

    pub(crate) fn get_wm_hints(&self, win: Window) -> Result<WordsCookie> {
        let inner = self.connection.get_property(
            false,
            win,
            AtomEnum::WM_HINTS,
            AtomEnum::WM_HINTS,
            0,
            9,
        )?;
        Ok(WordsCookie { inner })
    }

    pub(crate) fn set_wm_hints(&self, win: Window, words: &[u32]) -> Result<()> {
        self.connection.change_property32(
            PropMode::REPLACE,
            win,
            AtomEnum::WM_HINTS,
            AtomEnum::WM_HINTS,
            words,
        )?;
        Ok(())
    }

    /// `_NET_WM_STATE` and `_NET_WM_WINDOW_TYPE`, in that order.
    pub(crate) fn get_window_type(&self, win: Window) -> Result<(WordsCookie, WordsCookie)> {
        let state = self.connection.get_property(
            false,
            win,
            self.atom(_NET_WM_STATE),
            AtomEnum::ATOM,
            0,
            16,
        )?;
        let window_type = self.connection.get_property(
            false,
            win,
            self.atom(_NET_WM_WINDOW_TYPE),
            AtomEnum::ATOM,
            0,
            16,
        )?;
        Ok((WordsCookie { inner: state }, WordsCookie { inner: window_type }))
    }

    pub(crate) fn set_fullscreen_state(&self, win: Window, fullscreen: bool) -> Result<()> {
        let fs = self.atom(_NET_WM_STATE_FULLSCREEN);
        let data: &[u32] = if fullscreen { &[fs] } else { &[] };
        self.connection.change_property32(
            PropMode::REPLACE,
            win,
            self.atom(_NET_WM_STATE),
            AtomEnum::ATOM,
            data,
        )?;
        Ok(())
    }

    pub(crate) fn push_to_client_list(&self, root: Window, new_win: Window) -> Result<()> {
        self.connection.change_property32(
            PropMode::APPEND,
            root,
            self.atom(_NET_CLIENT_LIST),
            AtomEnum::WINDOW,
            &[new_win],
        )?;
        Ok(())
    }

    pub(crate) fn update_client_list(&self, root: Window, managed: &[Window]) -> Result<()> {
        self.connection.delete_property(root, self.atom(_NET_CLIENT_LIST))?;
        if !managed.is_empty() {
            self.connection.change_property32(
                PropMode::APPEND,
                root,
                self.atom(_NET_CLIENT_LIST),
                AtomEnum::WINDOW,
                managed,
            )?;
        }
        Ok(())
    }

    pub(crate) fn delete_client_list(&self, root: Window) -> Result<()> {
        self.connection.delete_property(root, self.atom(_NET_CLIENT_LIST))?;
        Ok(())
    }

    pub(crate) fn query_subwindows(&self, window: Window) -> Result<QueryTreeCookie> {
        Ok(QueryTreeCookie {
            inner: self.connection.query_tree(window)?,
        })
    }

    pub(crate) fn get_geometry(&self, window: Window) -> Result<GeometryCookie> {
        Ok(GeometryCookie {
            inner: self.connection.get_geometry(window)?,
        })
    }

    /// `None` if the window is already gone.
    pub(crate) fn get_window_attributes(
        &self,
        window: Window,
    ) -> Result<Option<GetWindowAttributesReply>> {
        Ok(self.connection.get_window_attributes(window)?.reply().ok())
    }

    pub(crate) fn query_pointer(&self, root: Window) -> Result<Option<(i32, i32)>> {
        Ok(self
            .connection
            .query_pointer(root)?
            .reply()
            .ok()
            .map(|reply| (reply.root_x as i32, reply.root_y as i32)))
    }

    pub(crate) fn warp_pointer(&self, window: Window, x: i32, y: i32) -> Result<()> {
        self.connection
            .warp_pointer(NONE, window, 0, 0, 0, 0, x as i16, y as i16)?;
        Ok(())
    }

    /// Returns whether the grab succeeded.
    pub(crate) fn grab_pointer(&self, root: Window, cursor: Cursor) -> Result<bool> {
        let status = self
            .connection
            .grab_pointer(
                false,
                root,
                EventMask::BUTTON_PRESS | EventMask::BUTTON_RELEASE | EventMask::POINTER_MOTION,
                GrabMode::ASYNC,
                GrabMode::ASYNC,
                NONE,
                cursor,
                CURRENT_TIME,
            )?
            .reply()?
            .status;
        Ok(status == GrabStatus::SUCCESS)
    }

    pub(crate) fn ungrab_pointer(&self) -> Result<()> {
        self.connection.ungrab_pointer(CURRENT_TIME)?;
        Ok(())
    }

    pub(crate) fn configure_client(&self, window: Window, rect: Rect, border_width: i32) -> Result<()> {
        let cfg = ConfigureWindowAux::new()
            .x(rect.x)
            .y(rect.y)
            .width(rect.width as u32)
            .height(rect.height as u32)
            .border_width(border_width as u32);
        self.connection.configure_window(window, &cfg)?;
        Ok(())
    }

    pub(crate) fn move_window(&self, window: Window, x: i32, y: i32) -> Result<()> {
        let cfg = ConfigureWindowAux::new().x(x).y(y);
        self.connection.configure_window(window, &cfg)?;
        Ok(())
    }

    pub(crate) fn move_resize_window(&self, window: Window, rect: Rect) -> Result<()> {
        let cfg = ConfigureWindowAux::new()
            .x(rect.x)
            .y(rect.y)
            .width(rect.width as u32)
            .height(rect.height as u32);
        self.connection.configure_window(window, &cfg)?;
        Ok(())
    }

    pub(crate) fn set_border_width(&self, window: Window, border_width: i32) -> Result<()> {
        let cfg = ConfigureWindowAux::new().border_width(border_width as u32);
        self.connection.configure_window(window, &cfg)?;
        Ok(())
    }

    /// Tells the client its geometry without it having changed, what ICCCM wants as an answer
    /// to a denied configure request.
    pub(crate) fn send_configure_notify(
        &self,
        window: Window,
        rect: Rect,
        border_width: i32,
    ) -> Result<()> {
        let event = ConfigureNotifyEvent {
            response_type: CONFIGURE_NOTIFY_EVENT,
            sequence: 0,
            event: window,
            window,
            above_sibling: NONE,
            x: rect.x as i16,
            y: rect.y as i16,
            width: rect.width as u16,
            height: rect.height as u16,
            border_width: border_width as u16,
            override_redirect: false,
        };
        self.connection
            .send_event(false, window, EventMask::STRUCTURE_NOTIFY, &event)?;
        Ok(())
    }

    // Unmanaged windows configure however they like
    pub(crate) fn configure_from_request(&self, event: &ConfigureRequestEvent) -> Result<()> {
        let cfg = ConfigureWindowAux::from_configure_request(event);
        self.connection.configure_window(event.window, &cfg)?;
        Ok(())
    }

    pub(crate) fn change_border_color(&self, window: Window, pixel: u32) -> Result<()> {
        let cw = ChangeWindowAttributesAux::new().border_pixel(pixel);
        self.connection.change_window_attributes(window, &cw)?;
        Ok(())
    }

    pub(crate) fn raise(&self, window: Window) -> Result<()> {
        let cfg = ConfigureWindowAux::new().stack_mode(StackMode::ABOVE);
        self.connection.configure_window(window, &cfg)?;
        Ok(())
    }

    pub(crate) fn stack_below(&self, window: Window, sibling: Window) -> Result<()> {
        let cfg = ConfigureWindowAux::new()
            .sibling(sibling)
            .stack_mode(StackMode::BELOW);
        self.connection.configure_window(window, &cfg)?;
        Ok(())
    }

    pub(crate) fn map_window(&self, window: Window) -> Result<()> {
        self.connection.map_window(window)?;
        Ok(())
    }

    pub(crate) fn destroy_window(&self, window: Window) -> Result<()> {
        self.connection.destroy_window(window)?;
        Ok(())
    }

    pub(crate) fn sync(&self) -> Result<()> {
        self.connection.sync()?;
        Ok(())
    }

    pub(crate) fn flush(&self) -> Result<()> {
        self.connection.flush()?;
        Ok(())
    }

    /// Events deferred during a pointer grab come first, in the order they arrived.
    pub(crate) fn next_event(&mut self) -> Result<Event> {
        if let Some(event) = self.queue.pop() {
            return Ok(event);
        }
        self.flush()?;
        Ok(self.connection.wait_for_event()?)
    }

    /// For pointer grabs, skips anything deferred but not what was read ahead.
    pub(crate) fn wait_for_event(&mut self) -> Result<Event> {
        if let Some(event) = self.queue.pop_read_ahead() {
            return Ok(event);
        }
        self.flush()?;
        Ok(self.connection.wait_for_event()?)
    }

    /// Handled by the main loop once the pointer grab ends.
    pub(crate) fn defer(&mut self, event: Event) {
        self.queue.defer(event);
    }

    /// Syncs and throws away every queued `EnterNotify`, restacking generates them for windows
    /// the pointer didn't actually move into.
    pub(crate) fn drop_enter_events(&mut self) -> Result<()> {
        self.sync()?;
        while let Some(event) = self.connection.poll_for_event()? {
            self.queue.push_read_ahead(event);
        }
        self.queue
            .discard(|event| matches!(event, Event::EnterNotify(_)));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use swm_core::config::{LOCK, MOD2};

    use crate::x11::call_wrapper::{lock_combinations, numlock_mask, KeysymTable};

    fn table() -> KeysymTable {
        // Two columns per keycode starting at 8
        KeysymTable {
            min_keycode: 8,
            per_keycode: 2,
            keysyms: vec![0x61, 0x41, 0x62, 0x42, 0xff7f, 0, 0x41, 0x61],
        }
    }

    #[test]
    fn keysym_reads_first_column() {
        let table = table();
        assert_eq!(0x61, table.keysym(8));
        assert_eq!(0x62, table.keysym(9));
        assert_eq!(0xff7f, table.keysym(10));
        // Outside the table on both ends
        assert_eq!(0, table.keysym(7));
        assert_eq!(0, table.keysym(12));
    }

    #[test]
    fn keycodes_only_match_first_column() {
        let table = table();
        assert_eq!(vec![8], table.keycodes(0x61).collect::<Vec<_>>());
        assert_eq!(vec![11], table.keycodes(0x41).collect::<Vec<_>>());
        assert!(table.keycodes(0x42).next().is_none());
    }

    #[test]
    fn numlock_is_found_on_its_modifier() {
        // Shift, Lock, Control, Mod1, Mod2 with num lock (77) on Mod2
        let mods = [50, 62, 66, 0, 37, 105, 64, 108, 77, 0, 0, 0, 0, 0, 0, 0];
        assert_eq!(MOD2, numlock_mask(2, &mods, &[77]));
        assert_eq!(0, numlock_mask(2, &mods, &[200]));
        // Empty slots never match
        assert_eq!(0, numlock_mask(2, &mods, &[0]));
    }

    #[test]
    fn grabs_cover_lock_combinations() {
        assert_eq!([0, LOCK, MOD2, MOD2 | LOCK], lock_combinations(MOD2));
    }
}
