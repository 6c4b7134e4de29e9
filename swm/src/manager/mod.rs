pub(crate) mod actions;
pub(crate) mod bar;
pub(crate) mod mouse;
pub(crate) mod spawn;

use std::cell::Cell;

use swm_core::config::mouse_map::MouseTarget;
use swm_core::geometry::layout::Layout;
use swm_core::geometry::size_hints::SizeHints;
use swm_core::geometry::Rect;
use swm_core::state::client::{Client, ClientId};
use swm_core::state::properties::{parse_normal_hints, with_urgency, WmHints, WmState};
use swm_core::state::{ConfigureFields, ConfigureOutcome, ShowHide, State};
use x11rb::protocol::xproto::{
    ButtonPressEvent, ClientMessageEvent, ConfigWindow, ConfigureNotifyEvent,
    ConfigureRequestEvent, DestroyNotifyEvent, EnterNotifyEvent, ExposeEvent, FocusInEvent,
    KeyPressEvent, MapRequestEvent, MapState, Mapping, MappingNotifyEvent, MotionNotifyEvent,
    NotifyDetail, NotifyMode, PropertyNotifyEvent, Screen, UnmapNotifyEvent, Window,
};
use x11rb::NONE;

use crate::error::Result;
use crate::manager::bar::BarManager;
use crate::x11::call_wrapper::{
    CallWrapper, _NET_WM_STATE_FULLSCREEN, _NET_WM_WINDOW_TYPE_DIALOG,
};
use crate::x11::client_message::{
    convert_message, convert_property_change, ClientMessage, PropertyChangeMessage,
};
use crate::x11::state_lifecycle::{
    create_missing_bars, get_screen_dimensions, move_bars, teardown_full_state, Cursors,
};

/// Set on events that were sent with `SendEvent` rather than generated by the server.
const SYNTHETIC_EVENT: u8 = 0x80;

pub(crate) struct Manager {
    bar_manager: BarManager,
    cursors: Cursors,
    screen: Screen,
    /// Monitor the pointer was on at the last root motion event
    motion_mon: Cell<Option<usize>>,
    autostarted: Vec<u32>,
}

impl Manager {
    pub(crate) fn new(bar_manager: BarManager, cursors: Cursors, screen: Screen) -> Self {
        Self {
            bar_manager,
            cursors,
            screen,
            motion_mon: Cell::new(None),
            autostarted: Vec::new(),
        }
    }

    pub(crate) fn init(
        &mut self,
        call_wrapper: &mut CallWrapper,
        state: &mut State,
        autostart: &[String],
    ) -> Result<()> {
        call_wrapper.set_root_event_mask(state.root, self.cursors.normal)?;
        tracing::debug!("Set root event mask");
        state.numlock_mask = call_wrapper.fetch_numlock_mask()?;
        call_wrapper.grab_keys(state)?;
        tracing::debug!("Grabbed keys");
        self.focus(call_wrapper, state, None)?;
        self.scan(call_wrapper, state)?;
        let status = call_wrapper
            .get_root_name(state.root)?
            .await_text()
            .unwrap_or_default();
        state.set_status(&status);
        self.bar_manager.draw_bars(call_wrapper, state)?;
        self.autostarted = spawn::autostart(autostart);
        tracing::info!("Initialized");
        Ok(())
    }

    /// Manages windows that existed before we started, transients after the windows they belong to.
    fn scan(&self, call_wrapper: &mut CallWrapper, state: &mut State) -> Result<()> {
        let children = call_wrapper
            .query_subwindows(state.root)?
            .await_children()?;
        let mut transients = Vec::new();
        for win in children {
            let Some(attrs) = call_wrapper.get_window_attributes(win)? else {
                continue;
            };
            if attrs.override_redirect {
                continue;
            }
            if call_wrapper
                .get_is_transient_for(win)?
                .await_is_transient_for()
                .is_some()
            {
                transients.push((win, attrs.map_state));
                continue;
            }
            if self.should_scan_manage(call_wrapper, win, attrs.map_state)? {
                self.manage(call_wrapper, state, win)?;
            }
        }
        for (win, map_state) in transients {
            if self.should_scan_manage(call_wrapper, win, map_state)? {
                self.manage(call_wrapper, state, win)?;
            }
        }
        tracing::info!("Scanned existing windows");
        Ok(())
    }

    fn should_scan_manage(
        &self,
        call_wrapper: &CallWrapper,
        win: Window,
        map_state: MapState,
    ) -> Result<bool> {
        Ok(map_state == MapState::VIEWABLE
            || call_wrapper.get_state(win)? == Some(WmState::Iconic))
    }

    pub(crate) fn manage(
        &self,
        call_wrapper: &mut CallWrapper,
        state: &mut State,
        win: Window,
    ) -> Result<()> {
        let Some(geometry) = call_wrapper.get_geometry(win)?.await_geometry() else {
            return Ok(());
        };
        let name_cookie = call_wrapper.get_name(win)?;
        let transient_cookie = call_wrapper.get_is_transient_for(win)?;
        let class_cookie = call_wrapper.get_class_names(win)?;
        let name = name_cookie.await_name();
        let transient_for = transient_cookie
            .await_is_transient_for()
            .filter(|parent| *parent != NONE);
        let (instance, class) = class_cookie.await_class_names();

        let rect = Rect::new(
            geometry.x as i32,
            geometry.y as i32,
            geometry.width as i32,
            geometry.height as i32,
        );
        let mut client = Client::new(win, rect, geometry.border_width as i32, state.selmon);
        client.set_name(name.as_deref().unwrap_or_default());
        let parent = transient_for
            .and_then(|parent| state.win_to_client(parent))
            .and_then(|parent| state.client(parent))
            .map(|parent| (parent.mon, parent.tags));
        if let Some((mon, tags)) = parent {
            client.mon = mon;
            client.tags = tags;
        }
        let id = state.insert_client(client);
        if parent.is_none() {
            state.apply_rules(id, class.as_deref(), instance.as_deref());
        }
        state.place_new_client(id);
        if let Some(c) = state.client(id) {
            call_wrapper.set_border_width(win, c.border_width)?;
            call_wrapper.change_border_color(win, state.colors.norm.border.pixel)?;
            call_wrapper.send_configure_notify(win, c.rect, c.border_width)?;
        }
        self.update_window_type(call_wrapper, state, id)?;
        self.update_size_hints(call_wrapper, state, id)?;
        self.update_wm_hints(call_wrapper, state, id)?;
        call_wrapper.set_client_event_mask(win)?;
        call_wrapper.grab_buttons(win, false, state)?;
        let Some(c) = state.client_mut(id) else {
            return Ok(());
        };
        if !c.is_floating {
            c.is_floating = transient_for.is_some() || c.is_fixed;
            c.old_state = c.is_floating;
        }
        let (floating, rect, mon) = (c.is_floating, c.rect, c.mon);
        if floating {
            call_wrapper.raise(win)?;
        }
        state.attach(id);
        state.attach_stack(id);
        call_wrapper.push_to_client_list(state.root, win)?;
        // Mapped off screen first, arranging moves it into place
        call_wrapper.move_resize_window(
            win,
            Rect::new(rect.x + 2 * state.screen_width, rect.y, rect.width, rect.height),
        )?;
        call_wrapper.set_state(win, WmState::Normal)?;
        if mon == state.selmon {
            if let Some(sel) = state.sel_client() {
                self.unfocus(call_wrapper, state, sel, false)?;
            }
        }
        state.monitors[mon].sel = Some(id);
        self.arrange(call_wrapper, state, Some(mon))?;
        call_wrapper.map_window(win)?;
        self.focus(call_wrapper, state, None)?;
        tracing::debug!("Managed {win} on monitor {mon}");
        Ok(())
    }

    pub(crate) fn unmanage(
        &self,
        call_wrapper: &mut CallWrapper,
        state: &mut State,
        id: ClientId,
        destroyed: bool,
    ) -> Result<()> {
        let Some(client) = state.unmanage(id) else {
            return Ok(());
        };
        if !destroyed {
            let (first, last) =
                call_wrapper.release_window(client.window, client.old_border_width)?;
            state.ignore_errors_between(first, last);
        }
        self.focus(call_wrapper, state, None)?;
        self.update_client_list(call_wrapper, state)?;
        self.arrange(call_wrapper, state, Some(client.mon))
    }

    /// Focuses `target`, or the most recently focused visible client on the selected monitor.
    pub(crate) fn focus(
        &self,
        call_wrapper: &CallWrapper,
        state: &mut State,
        target: Option<ClientId>,
    ) -> Result<()> {
        let target = state.focus_candidate(target);
        if let Some(sel) = state.sel_client() {
            if Some(sel) != target {
                self.unfocus(call_wrapper, state, sel, false)?;
            }
        }
        if let Some(id) = target {
            let Some((mon, urgent, win, never_focus)) = state
                .client(id)
                .map(|c| (c.mon, c.is_urgent, c.window, c.never_focus))
            else {
                return Ok(());
            };
            state.selmon = mon;
            if urgent {
                self.set_urgent(call_wrapper, state, id, false)?;
            }
            state.detach_stack(id);
            state.attach_stack(id);
            call_wrapper.grab_buttons(win, true, state)?;
            call_wrapper.change_border_color(win, state.colors.sel.border.pixel)?;
            call_wrapper.take_focus(state.root, win, never_focus)?;
        } else {
            call_wrapper.reset_root_focus(state.root)?;
        }
        let selmon = state.selmon;
        state.monitors[selmon].sel = target;
        self.bar_manager.draw_bars(call_wrapper, state)
    }

    pub(crate) fn unfocus(
        &self,
        call_wrapper: &CallWrapper,
        state: &State,
        id: ClientId,
        reset_focus: bool,
    ) -> Result<()> {
        let Some(c) = state.client(id) else {
            return Ok(());
        };
        call_wrapper.grab_buttons(c.window, false, state)?;
        call_wrapper.change_border_color(c.window, state.colors.norm.border.pixel)?;
        if reset_focus {
            call_wrapper.reset_root_focus(state.root)?;
        }
        Ok(())
    }

    /// Shows and hides clients, then lays out and restacks a single monitor or every monitor.
    pub(crate) fn arrange(
        &self,
        call_wrapper: &mut CallWrapper,
        state: &mut State,
        mon: Option<usize>,
    ) -> Result<()> {
        let targets: Vec<usize> = match mon {
            Some(mon) => vec![mon],
            None => (0..state.monitors.len()).collect(),
        };
        for mon in &targets {
            self.show_hide(call_wrapper, state, *mon)?;
        }
        for mon in &targets {
            self.arrange_mon(call_wrapper, state, *mon)?;
        }
        if let Some(mon) = mon {
            self.restack(call_wrapper, state, mon)?;
        }
        Ok(())
    }

    pub(crate) fn arrange_selected(
        &self,
        call_wrapper: &mut CallWrapper,
        state: &mut State,
    ) -> Result<()> {
        let selmon = state.selmon;
        self.arrange(call_wrapper, state, Some(selmon))
    }

    fn show_hide(&self, call_wrapper: &CallWrapper, state: &mut State, mon: usize) -> Result<()> {
        for step in state.show_hide_plan(mon) {
            match step {
                ShowHide::Show { id, refit } => {
                    let Some((win, rect)) = state.client(id).map(|c| (c.window, c.rect)) else {
                        continue;
                    };
                    call_wrapper.move_window(win, rect.x, rect.y)?;
                    if refit {
                        self.resize(call_wrapper, state, id, rect, false)?;
                    }
                }
                ShowHide::Hide(id) => {
                    if let Some(c) = state.client(id) {
                        call_wrapper.move_window(c.window, -2 * c.width(), c.rect.y)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn arrange_mon(&self, call_wrapper: &CallWrapper, state: &mut State, mon: usize) -> Result<()> {
        for id in state.tiled_clients(mon) {
            self.ensure_size_hints(call_wrapper, state, id)?;
        }
        for id in state.arrange_layout(mon) {
            self.push_geometry(call_wrapper, state, id)?;
        }
        Ok(())
    }

    /// Redraws the bar and puts the selection on top, tiled clients below the bar in focus order.
    pub(crate) fn restack(
        &self,
        call_wrapper: &mut CallWrapper,
        state: &State,
        mon: usize,
    ) -> Result<()> {
        self.bar_manager.draw_bar(call_wrapper, state, mon)?;
        let m = &state.monitors[mon];
        let Some(sel) = m.sel.and_then(|id| state.client(id)) else {
            return Ok(());
        };
        let arranges = m.layout().arranges();
        if sel.is_floating || !arranges {
            call_wrapper.raise(sel.window)?;
        }
        if arranges {
            let mut sibling = m.bar_win;
            for c in m
                .stack
                .iter()
                .filter(|id| state.is_visible(**id))
                .filter_map(|id| state.client(*id))
                .filter(|c| !c.is_floating)
            {
                call_wrapper.stack_below(c.window, sibling)?;
                sibling = c.window;
            }
        }
        call_wrapper.drop_enter_events()
    }

    /// Applies size hints, pushes the geometry to the server if it changed.
    pub(crate) fn resize(
        &self,
        call_wrapper: &CallWrapper,
        state: &mut State,
        id: ClientId,
        rect: Rect,
        interact: bool,
    ) -> Result<()> {
        self.ensure_size_hints(call_wrapper, state, id)?;
        if state.resize(id, rect, interact) {
            self.push_geometry(call_wrapper, state, id)?;
        }
        Ok(())
    }

    fn push_geometry(&self, call_wrapper: &CallWrapper, state: &State, id: ClientId) -> Result<()> {
        if let Some(c) = state.client(id) {
            call_wrapper.configure_client(c.window, c.rect, c.border_width)?;
            call_wrapper.send_configure_notify(c.window, c.rect, c.border_width)?;
        }
        Ok(())
    }

    fn ensure_size_hints(
        &self,
        call_wrapper: &CallWrapper,
        state: &mut State,
        id: ClientId,
    ) -> Result<()> {
        if state.client(id).is_some_and(|c| !c.hints.valid) {
            self.update_size_hints(call_wrapper, state, id)?;
        }
        Ok(())
    }

    fn update_size_hints(
        &self,
        call_wrapper: &CallWrapper,
        state: &mut State,
        id: ClientId,
    ) -> Result<()> {
        let Some(win) = state.client(id).map(|c| c.window) else {
            return Ok(());
        };
        let raw = call_wrapper
            .get_normal_hints(win)?
            .await_words()
            .and_then(|words| parse_normal_hints(&words))
            .unwrap_or_default();
        let hints = SizeHints::from_raw(raw);
        if let Some(c) = state.client_mut(id) {
            c.is_fixed = hints.is_fixed();
            c.hints = hints;
        }
        Ok(())
    }

    fn update_wm_hints(&self, call_wrapper: &CallWrapper, state: &mut State, id: ClientId) -> Result<()> {
        let Some(win) = state.client(id).map(|c| c.window) else {
            return Ok(());
        };
        let words = call_wrapper.get_wm_hints(win)?.await_words();
        self.apply_wm_hints(call_wrapper, state, id, words)
    }

    /// The selected client can't be urgent, its urgency flag is cleared on the window instead.
    fn apply_wm_hints(
        &self,
        call_wrapper: &CallWrapper,
        state: &mut State,
        id: ClientId,
        words: Option<Vec<u32>>,
    ) -> Result<()> {
        let Some((words, hints)) = words.and_then(|w| WmHints::parse(&w).map(|h| (w, h))) else {
            return Ok(());
        };
        let is_sel = state.sel_client() == Some(id);
        let Some(c) = state.client_mut(id) else {
            return Ok(());
        };
        if is_sel && hints.urgent {
            call_wrapper.set_wm_hints(c.window, &with_urgency(&words, false))?;
        } else {
            c.is_urgent = hints.urgent;
        }
        c.never_focus = hints.never_focus();
        Ok(())
    }

    fn set_urgent(
        &self,
        call_wrapper: &CallWrapper,
        state: &mut State,
        id: ClientId,
        urgent: bool,
    ) -> Result<()> {
        let Some(c) = state.client_mut(id) else {
            return Ok(());
        };
        c.is_urgent = urgent;
        let win = c.window;
        if let Some(words) = call_wrapper.get_wm_hints(win)?.await_words() {
            call_wrapper.set_wm_hints(win, &with_urgency(&words, urgent))?;
        }
        Ok(())
    }

    fn update_window_type(
        &self,
        call_wrapper: &mut CallWrapper,
        state: &mut State,
        id: ClientId,
    ) -> Result<()> {
        let Some(win) = state.client(id).map(|c| c.window) else {
            return Ok(());
        };
        let (state_cookie, type_cookie) = call_wrapper.get_window_type(win)?;
        let wm_state = state_cookie.await_words();
        let window_type = type_cookie.await_words();
        let fullscreen = call_wrapper.atom(_NET_WM_STATE_FULLSCREEN);
        let dialog = call_wrapper.atom(_NET_WM_WINDOW_TYPE_DIALOG);
        if wm_state.as_deref().and_then(<[u32]>::first) == Some(&fullscreen) {
            self.set_fullscreen(call_wrapper, state, id, true)?;
        }
        if window_type.as_deref().and_then(<[u32]>::first) == Some(&dialog) {
            if let Some(c) = state.client_mut(id) {
                c.is_floating = true;
            }
        }
        Ok(())
    }

    pub(crate) fn set_fullscreen(
        &self,
        call_wrapper: &mut CallWrapper,
        state: &mut State,
        id: ClientId,
        fullscreen: bool,
    ) -> Result<()> {
        let Some(rect) = state.set_fullscreen(id, fullscreen) else {
            return Ok(());
        };
        let Some((win, mon, is_fullscreen)) = state
            .client(id)
            .map(|c| (c.window, c.mon, c.is_fullscreen))
        else {
            return Ok(());
        };
        call_wrapper.set_fullscreen_state(win, is_fullscreen)?;
        state.commit_geometry(id, rect);
        self.push_geometry(call_wrapper, state, id)?;
        if is_fullscreen {
            call_wrapper.raise(win)
        } else {
            self.arrange(call_wrapper, state, Some(mon))
        }
    }

    /// Moves a client over to `target`, it lands on the target's visible tags.
    pub(crate) fn send_to_monitor(
        &self,
        call_wrapper: &mut CallWrapper,
        state: &mut State,
        id: ClientId,
        target: usize,
    ) -> Result<()> {
        if state.client(id).map_or(true, |c| c.mon == target) {
            return Ok(());
        }
        self.unfocus(call_wrapper, state, id, true)?;
        state.send_mon(id, target);
        self.focus(call_wrapper, state, None)?;
        self.arrange(call_wrapper, state, None)
    }

    fn update_client_list(&self, call_wrapper: &CallWrapper, state: &State) -> Result<()> {
        let managed: Vec<Window> = state
            .monitors
            .iter()
            .flat_map(|mon| mon.clients.iter())
            .filter_map(|id| state.client(*id).map(|c| c.window))
            .collect();
        call_wrapper.update_client_list(state.root, &managed)
    }

    /// Moves the selection to monitor `mon`, used when the pointer crosses over.
    fn switch_monitor(&self, call_wrapper: &CallWrapper, state: &mut State, mon: usize) -> Result<()> {
        if let Some(sel) = state.sel_client() {
            self.unfocus(call_wrapper, state, sel, true)?;
        }
        state.selmon = mon;
        Ok(())
    }

    pub(crate) fn handle_button_press(
        &self,
        call_wrapper: &mut CallWrapper,
        event: ButtonPressEvent,
        state: &mut State,
    ) -> Result<()> {
        let root_pointer = (event.event == state.root)
            .then_some((event.root_x as i32, event.root_y as i32));
        let mon = state.win_to_mon(event.event, root_pointer);
        if mon != state.selmon {
            self.switch_monitor(call_wrapper, state, mon)?;
            self.focus(call_wrapper, state, None)?;
        }
        let (target, tag) = if event.event == state.sel_mon().bar_win {
            self.bar_manager
                .bar_geometry(state, state.selmon)
                .hit_on_click(event.event_x)
        } else if let Some(id) = state.win_to_client(event.event) {
            self.focus(call_wrapper, state, Some(id))?;
            self.restack(call_wrapper, state, state.selmon)?;
            call_wrapper.replay_pointer()?;
            (MouseTarget::ClientWin, None)
        } else {
            (MouseTarget::RootWin, None)
        };
        for action in state.mouse_actions(target, tag, event.detail, u16::from(event.state)) {
            self.exec_action(call_wrapper, state, action)?;
        }
        Ok(())
    }

    pub(crate) fn handle_key_press(
        &self,
        call_wrapper: &mut CallWrapper,
        event: KeyPressEvent,
        state: &mut State,
    ) -> Result<()> {
        let keysym = call_wrapper.keycode_to_keysym(event.detail);
        for action in state.key_actions(keysym, u16::from(event.state)) {
            self.exec_action(call_wrapper, state, action)?;
        }
        Ok(())
    }

    pub(crate) fn handle_client_message(
        &self,
        call_wrapper: &mut CallWrapper,
        event: ClientMessageEvent,
        state: &mut State,
    ) -> Result<()> {
        match convert_message(call_wrapper, &event) {
            Some(ClientMessage::Fullscreen((win, change))) => {
                if let Some((id, current)) = state
                    .win_to_client(win)
                    .and_then(|id| state.client(id).map(|c| (id, c.is_fullscreen)))
                {
                    self.set_fullscreen(call_wrapper, state, id, change.apply(current))?;
                }
            }
            Some(ClientMessage::RequestActiveWindow(win)) => {
                if let Some(id) = state.win_to_client(win) {
                    let urgent = state.client(id).is_some_and(|c| c.is_urgent);
                    if state.sel_client() != Some(id) && !urgent {
                        self.set_urgent(call_wrapper, state, id, true)?;
                    }
                }
            }
            None => {}
        }
        Ok(())
    }

    pub(crate) fn handle_configure_request(
        &self,
        call_wrapper: &mut CallWrapper,
        event: ConfigureRequestEvent,
        state: &mut State,
    ) -> Result<()> {
        let Some(id) = state.win_to_client(event.window) else {
            call_wrapper.configure_from_request(&event)?;
            return call_wrapper.sync();
        };
        let mask = u16::from(event.value_mask);
        let has = |flag: ConfigWindow| mask & u16::from(flag) != 0;
        let fields = ConfigureFields {
            x: has(ConfigWindow::X).then_some(event.x as i32),
            y: has(ConfigWindow::Y).then_some(event.y as i32),
            width: has(ConfigWindow::WIDTH).then_some(event.width as i32),
            height: has(ConfigWindow::HEIGHT).then_some(event.height as i32),
        };
        let border_width = has(ConfigWindow::BORDER_WIDTH).then_some(event.border_width as i32);
        let outcome = state.configure_request(id, border_width, fields);
        if let (Some(outcome), Some(c)) = (outcome, state.client(id)) {
            match outcome {
                ConfigureOutcome::BorderWidth => {}
                ConfigureOutcome::Repositioned { notify, visible } => {
                    if notify {
                        call_wrapper.send_configure_notify(c.window, c.rect, c.border_width)?;
                    }
                    if visible {
                        call_wrapper.move_resize_window(c.window, c.rect)?;
                    }
                }
                ConfigureOutcome::Tiled => {
                    call_wrapper.send_configure_notify(c.window, c.rect, c.border_width)?;
                }
            }
        }
        call_wrapper.sync()
    }

    pub(crate) fn handle_configure_notify(
        &self,
        call_wrapper: &mut CallWrapper,
        event: ConfigureNotifyEvent,
        state: &mut State,
    ) -> Result<()> {
        if event.window != state.root {
            return Ok(());
        }
        let dirty = state.screen_width != event.width as i32
            || state.screen_height != event.height as i32;
        state.screen_width = event.width as i32;
        state.screen_height = event.height as i32;
        let screens = get_screen_dimensions(
            call_wrapper.inner(),
            state.screen_width,
            state.screen_height,
        )?;
        let update = state.update_geometry(&screens);
        for bar in update.removed_bars {
            call_wrapper.destroy_window(bar)?;
        }
        if !(update.dirty || dirty) {
            return Ok(());
        }
        tracing::info!(
            "Root geometry changed to {}x{}",
            state.screen_width,
            state.screen_height
        );
        self.bar_manager
            .resize(call_wrapper.inner(), state.screen_width, state.bar_height)?;
        create_missing_bars(call_wrapper.inner(), &self.screen, state, self.cursors.normal)?;
        for id in state.refit_fullscreen() {
            self.push_geometry(call_wrapper, state, id)?;
        }
        move_bars(call_wrapper, state)?;
        self.focus(call_wrapper, state, None)?;
        self.arrange(call_wrapper, state, None)
    }

    pub(crate) fn handle_destroy_notify(
        &self,
        call_wrapper: &mut CallWrapper,
        event: DestroyNotifyEvent,
        state: &mut State,
    ) -> Result<()> {
        if let Some(id) = state.win_to_client(event.window) {
            self.unmanage(call_wrapper, state, id, true)?;
        }
        Ok(())
    }

    /// A synthetic unmap is a client withdrawing itself, a real one means it's gone.
    pub(crate) fn handle_unmap_notify(
        &self,
        call_wrapper: &mut CallWrapper,
        event: UnmapNotifyEvent,
        state: &mut State,
    ) -> Result<()> {
        if let Some(id) = state.win_to_client(event.window) {
            if event.response_type & SYNTHETIC_EVENT != 0 {
                call_wrapper.set_state(event.window, WmState::Withdrawn)?;
            } else {
                self.unmanage(call_wrapper, state, id, false)?;
            }
        }
        Ok(())
    }

    pub(crate) fn handle_enter_notify(
        &self,
        call_wrapper: &mut CallWrapper,
        event: EnterNotifyEvent,
        state: &mut State,
    ) -> Result<()> {
        if (event.mode != NotifyMode::NORMAL || event.detail == NotifyDetail::INFERIOR)
            && event.event != state.root
        {
            return Ok(());
        }
        let client = state.win_to_client(event.event);
        let root_pointer = (event.event == state.root)
            .then_some((event.root_x as i32, event.root_y as i32));
        let mon = client
            .and_then(|id| state.client(id))
            .map_or_else(|| state.win_to_mon(event.event, root_pointer), |c| c.mon);
        if mon != state.selmon {
            self.switch_monitor(call_wrapper, state, mon)?;
        } else if client.is_none() || client == state.sel_client() {
            return Ok(());
        }
        self.focus(call_wrapper, state, client)
    }

    pub(crate) fn handle_expose(
        &self,
        call_wrapper: &mut CallWrapper,
        event: ExposeEvent,
        state: &mut State,
    ) -> Result<()> {
        if event.count == 0 {
            let mon = state.win_to_mon(event.window, None);
            self.bar_manager.draw_bar(call_wrapper, state, mon)?;
        }
        Ok(())
    }

    /// Some clients grab focus on their own, it goes back to the selection.
    pub(crate) fn handle_focus_in(
        &self,
        call_wrapper: &mut CallWrapper,
        event: FocusInEvent,
        state: &mut State,
    ) -> Result<()> {
        if let Some(c) = state.sel_client().and_then(|id| state.client(id)) {
            if c.window != event.event {
                call_wrapper.take_focus(state.root, c.window, c.never_focus)?;
            }
        }
        Ok(())
    }

    pub(crate) fn handle_mapping_notify(
        &self,
        call_wrapper: &mut CallWrapper,
        event: MappingNotifyEvent,
        state: &mut State,
    ) -> Result<()> {
        call_wrapper.refresh_keyboard_mapping()?;
        if event.request == Mapping::KEYBOARD {
            state.numlock_mask = call_wrapper.fetch_numlock_mask()?;
            call_wrapper.grab_keys(state)?;
        }
        Ok(())
    }

    pub(crate) fn handle_map_request(
        &self,
        call_wrapper: &mut CallWrapper,
        event: MapRequestEvent,
        state: &mut State,
    ) -> Result<()> {
        let Some(attrs) = call_wrapper.get_window_attributes(event.window)? else {
            return Ok(());
        };
        if attrs.override_redirect || state.win_to_client(event.window).is_some() {
            return Ok(());
        }
        self.manage(call_wrapper, state, event.window)
    }

    pub(crate) fn handle_motion_notify(
        &self,
        call_wrapper: &mut CallWrapper,
        event: MotionNotifyEvent,
        state: &mut State,
    ) -> Result<()> {
        if event.event != state.root {
            return Ok(());
        }
        let mon = state.rect_to_mon(Rect::new(event.root_x as i32, event.root_y as i32, 1, 1));
        if self.motion_mon.get().is_some_and(|last| last != mon) {
            self.switch_monitor(call_wrapper, state, mon)?;
            self.focus(call_wrapper, state, None)?;
        }
        self.motion_mon.set(Some(mon));
        Ok(())
    }

    pub(crate) fn handle_property_notify(
        &self,
        call_wrapper: &mut CallWrapper,
        event: PropertyNotifyEvent,
        state: &mut State,
    ) -> Result<()> {
        let Some(message) = convert_property_change(call_wrapper, &event, state.root)? else {
            return Ok(());
        };
        match message {
            PropertyChangeMessage::Status(cookie) => {
                let status = cookie.await_text().unwrap_or_default();
                state.set_status(&status);
                self.bar_manager.draw_bar(call_wrapper, state, state.selmon)?;
            }
            PropertyChangeMessage::TransientFor((win, cookie)) => {
                let parent = cookie.await_is_transient_for();
                let Some(id) = state.win_to_client(win) else {
                    return Ok(());
                };
                let has_managed_parent = parent.and_then(|p| state.win_to_client(p)).is_some();
                let Some(c) = state.client_mut(id) else {
                    return Ok(());
                };
                if !c.is_floating && has_managed_parent {
                    c.is_floating = true;
                    let mon = c.mon;
                    self.arrange(call_wrapper, state, Some(mon))?;
                }
            }
            PropertyChangeMessage::NormalHints(win) => {
                if let Some(c) = state.win_to_client(win).and_then(|id| state.client_mut(id)) {
                    c.hints.valid = false;
                }
            }
            PropertyChangeMessage::Hints((win, cookie)) => {
                let words = cookie.await_words();
                if let Some(id) = state.win_to_client(win) {
                    self.apply_wm_hints(call_wrapper, state, id, words)?;
                    self.bar_manager.draw_bars(call_wrapper, state)?;
                }
            }
            PropertyChangeMessage::Name((win, cookie)) => {
                let name = cookie.await_name();
                let Some(id) = state.win_to_client(win) else {
                    return Ok(());
                };
                let Some(c) = state.client_mut(id) else {
                    return Ok(());
                };
                c.set_name(name.as_deref().unwrap_or_default());
                let mon = c.mon;
                if state.monitors[mon].sel == Some(id) {
                    self.bar_manager.draw_bar(call_wrapper, state, mon)?;
                }
            }
            PropertyChangeMessage::WindowType(win) => {
                if let Some(id) = state.win_to_client(win) {
                    self.update_window_type(call_wrapper, state, id)?;
                }
            }
        }
        Ok(())
    }

    /// Gives every client back in a usable state, all tags visible and floating where they are.
    pub(crate) fn cleanup(&self, call_wrapper: &mut CallWrapper, state: &mut State) -> Result<()> {
        spawn::kill_autostarted(&self.autostarted);
        state.view(!0);
        for mon in &mut state.monitors {
            let sellt = mon.sellt;
            mon.layouts[sellt] = Layout::Floating;
        }
        let stacked: Vec<ClientId> = state
            .monitors
            .iter()
            .flat_map(|mon| mon.stack.iter().copied())
            .collect();
        for id in stacked {
            self.unmanage(call_wrapper, state, id, false)?;
        }
        call_wrapper.ungrab_keys(state.root)?;
        self.bar_manager.teardown(call_wrapper.inner())?;
        teardown_full_state(
            call_wrapper.inner(),
            state,
            &self.cursors,
            self.bar_manager.font_id(),
        )?;
        call_wrapper.delete_client_list(state.root)?;
        call_wrapper.focus_pointer_root(state.root)?;
        call_wrapper.sync()?;
        tracing::info!("Cleaned up");
        Ok(())
    }
}
