pub mod bar_geometry;
pub mod client;
pub mod monitor;
pub mod properties;

use x11rb::protocol::xproto::Window;

use crate::colors::Colors;
use crate::config::key_map::KeyboardMapping;
use crate::config::mouse_map::{MouseMapping, MouseTarget};
use crate::config::rules::Rule;
use crate::config::{
    Action, Cfg, Options, Sizing, CONTROL, LOCK, MOD1, MOD2, MOD3, MOD4, MOD5, SHIFT,
    STATUS_TEXT_LIMIT, VERSION, WINDOW_MANAGER_NAME,
};
use crate::geometry::layout::{self, Layout};
use crate::geometry::Rect;
use crate::state::client::{Client, ClientId, BROKEN};
use crate::state::monitor::Monitor;
use crate::util::macros::truncate_heapless;
use crate::format_heapless;

/// One step of showing and hiding a monitor's clients, in the order they should be applied.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ShowHide {
    /// Move back on screen, `refit` clients get their size hints re-applied
    Show { id: ClientId, refit: bool },
    /// Move off screen to the left
    Hide(ClientId),
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct GeometryUpdate {
    pub dirty: bool,
    /// Indices of monitors that need a bar
    pub added: Vec<usize>,
    /// Bars of monitors that no longer exist
    pub removed_bars: Vec<Window>,
}

/// Result of one pointer motion during an interactive move or resize.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DragStep {
    pub rect: Rect,
    /// A tiled client dragged past the snap distance, toggle it floating before applying
    pub make_floating: bool,
    /// Whether `rect` should be applied at all, tiled clients stay put
    pub apply: bool,
}

/// The geometry fields a `ConfigureRequest` asked for.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct ConfigureFields {
    pub x: Option<i32>,
    pub y: Option<i32>,
    pub width: Option<i32>,
    pub height: Option<i32>,
}

/// How a managed client's `ConfigureRequest` was handled.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ConfigureOutcome {
    /// Only the border width was taken, nothing is sent back
    BorderWidth,
    /// A floating client, or any client without an arranging layout, got the requested geometry
    Repositioned {
        /// Moved without being resized, the server won't tell the client
        notify: bool,
        /// On a visible tag, the new geometry goes to the server
        visible: bool,
    },
    /// Arranged by the layout, the current geometry is resent as a synthetic notify
    Tiled,
}

pub struct State {
    clients: Vec<Option<Client>>,
    free_slots: Vec<usize>,
    pub monitors: Vec<Monitor>,
    pub selmon: usize,
    pub root: Window,
    pub wm_check_win: Window,
    pub screen_width: i32,
    pub screen_height: i32,
    pub bar_height: i32,
    pub tag_mask: u32,
    pub tags: Vec<String>,
    pub rules: Vec<Rule>,
    pub sizing: Sizing,
    pub options: Options,
    pub colors: Colors,
    pub numlock_mask: u16,
    pub status_text: heapless::String<STATUS_TEXT_LIMIT>,
    pub key_mappings: Vec<KeyboardMapping>,
    pub mouse_mappings: Vec<MouseMapping>,
    ignored_errors: Vec<(u16, u16)>,
}

impl State {
    /// State without monitors, `update_geometry` creates them.
    #[must_use]
    pub fn new(cfg: Cfg, root: Window, screen_width: i32, screen_height: i32, bar_height: i32) -> Self {
        let tag_mask = cfg.tag_mask();
        let mut state = Self {
            clients: Vec::new(),
            free_slots: Vec::new(),
            monitors: Vec::new(),
            selmon: 0,
            root,
            wm_check_win: 0,
            screen_width,
            screen_height,
            bar_height,
            tag_mask,
            tags: cfg.tags,
            rules: cfg.rules,
            sizing: cfg.sizing,
            options: cfg.options,
            colors: Colors::default(),
            numlock_mask: 0,
            status_text: heapless::String::new(),
            key_mappings: cfg.key_mappings,
            mouse_mappings: cfg.mouse_mappings,
            ignored_errors: Vec::new(),
        };
        state.set_status("");
        state
    }

    pub fn insert_client(&mut self, client: Client) -> ClientId {
        if let Some(slot) = self.free_slots.pop() {
            self.clients[slot] = Some(client);
            ClientId(slot)
        } else {
            self.clients.push(Some(client));
            ClientId(self.clients.len() - 1)
        }
    }

    /// Takes the client out of the arena, it has to be detached from its lists first.
    pub fn remove_client(&mut self, id: ClientId) -> Option<Client> {
        let client = self.clients.get_mut(id.0)?.take()?;
        self.free_slots.push(id.0);
        Some(client)
    }

    #[must_use]
    pub fn client(&self, id: ClientId) -> Option<&Client> {
        self.clients.get(id.0).and_then(Option::as_ref)
    }

    pub fn client_mut(&mut self, id: ClientId) -> Option<&mut Client> {
        self.clients.get_mut(id.0).and_then(Option::as_mut)
    }

    /// Every managed client in no particular order.
    pub fn client_ids(&self) -> impl Iterator<Item = ClientId> + '_ {
        self.clients
            .iter()
            .enumerate()
            .filter_map(|(ind, c)| c.as_ref().map(|_| ClientId(ind)))
    }

    #[must_use]
    pub fn win_to_client(&self, window: Window) -> Option<ClientId> {
        self.client_ids()
            .find(|id| self.client(*id).is_some_and(|c| c.window == window))
    }

    /// Monitor a window belongs to, the root window resolves to the monitor under the pointer.
    #[must_use]
    pub fn win_to_mon(&self, window: Window, root_pointer: Option<(i32, i32)>) -> usize {
        if window == self.root {
            if let Some((x, y)) = root_pointer {
                return self.rect_to_mon(Rect::new(x, y, 1, 1));
            }
        }
        if let Some(ind) = self.monitors.iter().position(|m| m.bar_win == window) {
            return ind;
        }
        self.win_to_client(window)
            .and_then(|id| self.client(id))
            .map_or(self.selmon, |c| c.mon)
    }

    /// The monitor whose work area overlaps `rect` the most, the selected one if none does.
    #[must_use]
    pub fn rect_to_mon(&self, rect: Rect) -> usize {
        let mut found = self.selmon;
        let mut largest = 0;
        for (ind, mon) in self.monitors.iter().enumerate() {
            let area = rect.intersect_area(&mon.work);
            if area > largest {
                largest = area;
                found = ind;
            }
        }
        found
    }

    /// Next or previous monitor from the selected one, wrapping around.
    #[must_use]
    pub fn dir_to_mon(&self, dir: i32) -> usize {
        let len = self.monitors.len().max(1);
        if dir > 0 {
            (self.selmon + 1) % len
        } else {
            (self.selmon + len - 1) % len
        }
    }

    #[must_use]
    pub fn sel_mon(&self) -> &Monitor {
        &self.monitors[self.selmon]
    }

    #[must_use]
    pub fn sel_client(&self) -> Option<ClientId> {
        self.monitors.get(self.selmon).and_then(|m| m.sel)
    }

    #[must_use]
    pub fn is_visible(&self, id: ClientId) -> bool {
        self.client(id).is_some_and(|c| {
            self.monitors
                .get(c.mon)
                .is_some_and(|m| c.tags & m.current_tags() != 0)
        })
    }

    fn is_tiled(&self, id: ClientId) -> bool {
        self.is_visible(id) && self.client(id).is_some_and(|c| !c.is_floating)
    }

    /// Visible non-floating clients of a monitor in tiling order.
    #[must_use]
    pub fn tiled_clients(&self, mon: usize) -> Vec<ClientId> {
        self.monitors[mon]
            .clients
            .iter()
            .copied()
            .filter(|id| self.is_tiled(*id))
            .collect()
    }

    /// Puts the client first in its monitor's tiling order.
    pub fn attach(&mut self, id: ClientId) {
        if let Some(mon) = self.client(id).map(|c| c.mon) {
            self.monitors[mon].clients.insert(0, id);
        }
    }

    pub fn detach(&mut self, id: ClientId) {
        if let Some(mon) = self.client(id).map(|c| c.mon) {
            self.monitors[mon].clients.retain(|c| *c != id);
        }
    }

    /// Puts the client first in its monitor's focus order.
    pub fn attach_stack(&mut self, id: ClientId) {
        if let Some(mon) = self.client(id).map(|c| c.mon) {
            self.monitors[mon].stack.insert(0, id);
        }
    }

    /// Removes from the focus order, a removed selection passes to the next visible client.
    pub fn detach_stack(&mut self, id: ClientId) {
        let Some(mon) = self.client(id).map(|c| c.mon) else {
            return;
        };
        self.monitors[mon].stack.retain(|c| *c != id);
        if self.monitors[mon].sel == Some(id) {
            self.monitors[mon].sel = self.first_visible_in_stack(mon);
        }
    }

    #[must_use]
    pub fn first_visible_in_stack(&self, mon: usize) -> Option<ClientId> {
        self.monitors[mon]
            .stack
            .iter()
            .copied()
            .find(|id| self.is_visible(*id))
    }

    /// The client that should get focus when asked to focus `id`, visible or the most recently focused.
    #[must_use]
    pub fn focus_candidate(&self, id: Option<ClientId>) -> Option<ClientId> {
        id.filter(|c| self.is_visible(*c))
            .or_else(|| self.first_visible_in_stack(self.selmon))
    }

    /// Detaches the client from both lists and drops it.
    pub fn unmanage(&mut self, id: ClientId) -> Option<Client> {
        self.detach(id);
        self.detach_stack(id);
        let client = self.remove_client(id)?;
        tracing::debug!("Unmanaged {}", client.window);
        Some(client)
    }

    /// Sets floating state, tags and monitor from the first matching rules.
    pub fn apply_rules(&mut self, id: ClientId, class: Option<&str>, instance: Option<&str>) {
        let class = class.unwrap_or(BROKEN);
        let instance = instance.unwrap_or(BROKEN);
        let Some(client) = self.client(id) else {
            return;
        };
        let mut floating = false;
        let mut tags = 0;
        let mut mon = client.mon;
        for rule in &self.rules {
            if rule.matches(class, instance, client.name.as_str()) {
                floating = rule.floating;
                tags |= rule.tags;
                if let Some(ind) = self
                    .monitors
                    .iter()
                    .position(|m| i32::try_from(m.num).is_ok_and(|num| num == rule.monitor))
                {
                    mon = ind;
                }
            }
        }
        let masked = tags & self.tag_mask;
        let tags = if masked == 0 {
            self.monitors[mon].current_tags()
        } else {
            masked
        };
        if let Some(client) = self.client_mut(id) {
            client.is_floating = floating;
            client.mon = mon;
            client.tags = tags;
        }
    }

    /// Pulls a new client's position inside its monitor's work area and gives it the configured border.
    pub fn place_new_client(&mut self, id: ClientId) {
        let border_width = self.sizing.border_width as i32;
        let Some(mon) = self.client(id).map(|c| c.mon) else {
            return;
        };
        let work = self.monitors[mon].work;
        if let Some(c) = self.client_mut(id) {
            // Border width from the attributes only counts as the one to restore
            if c.rect.x + c.rect.width > work.x + work.width {
                c.rect.x = work.x + work.width - c.rect.width;
            }
            if c.rect.y + c.rect.height > work.y + work.height {
                c.rect.y = work.y + work.height - c.rect.height;
            }
            c.rect.x = c.rect.x.max(work.x);
            c.rect.y = c.rect.y.max(work.y);
            c.border_width = border_width;
        }
    }

    /// Clamps a requested geometry onto the screen and applies the client's size hints if they
    /// should be honored. Hints have to be valid before calling this.
    /// Returns the resulting geometry and whether it differs from the current one.
    #[must_use]
    pub fn apply_size_hints(&self, id: ClientId, rect: Rect, interact: bool) -> Option<(Rect, bool)> {
        let c = self.client(id)?;
        let m = &self.monitors[c.mon];
        let bw = c.border_width;
        let mut r = rect;
        r.width = r.width.max(1);
        r.height = r.height.max(1);
        if interact {
            if r.x > self.screen_width {
                r.x = self.screen_width - c.width();
            }
            if r.y > self.screen_height {
                r.y = self.screen_height - c.height();
            }
            if r.x + r.width + 2 * bw < 0 {
                r.x = 0;
            }
            if r.y + r.height + 2 * bw < 0 {
                r.y = 0;
            }
        } else {
            let work = m.work;
            if r.x >= work.x + work.width {
                r.x = work.x + work.width - c.width();
            }
            if r.y >= work.y + work.height {
                r.y = work.y + work.height - c.height();
            }
            if r.x + r.width + 2 * bw <= work.x {
                r.x = work.x;
            }
            if r.y + r.height + 2 * bw <= work.y {
                r.y = work.y;
            }
        }
        r.height = r.height.max(self.bar_height);
        r.width = r.width.max(self.bar_height);
        if self.options.resize_hints || c.is_floating || !m.layout().arranges() {
            let (w, h) = c.hints.constrain(r.width, r.height);
            r.width = w;
            r.height = h;
        }
        Some((r, r != c.rect))
    }

    /// Applies size hints and commits the geometry if it changed, the caller pushes it to the server.
    pub fn resize(&mut self, id: ClientId, rect: Rect, interact: bool) -> bool {
        match self.apply_size_hints(id, rect, interact) {
            Some((fitted, true)) => {
                self.commit_geometry(id, fitted);
                true
            }
            _ => false,
        }
    }

    pub fn commit_geometry(&mut self, id: ClientId, rect: Rect) {
        if let Some(c) = self.client_mut(id) {
            c.commit_geometry(rect);
        }
    }

    /// Order in which a monitor's clients are moved on or off screen, visible ones top down and
    /// hidden ones bottom up.
    #[must_use]
    pub fn show_hide_plan(&self, mon: usize) -> Vec<ShowHide> {
        let m = &self.monitors[mon];
        let arranges = m.layout().arranges();
        let mut shown = Vec::new();
        let mut hidden = Vec::new();
        for id in m.stack.iter().copied() {
            let Some(c) = self.client(id) else {
                continue;
            };
            if self.is_visible(id) {
                shown.push(ShowHide::Show {
                    id,
                    refit: (!arranges || c.is_floating) && !c.is_fullscreen,
                });
            } else {
                hidden.push(ShowHide::Hide(id));
            }
        }
        shown.extend(hidden.into_iter().rev());
        shown
    }

    /// Runs the monitor's layout over its tiled clients.
    /// Returns the clients whose geometry changed and has to be pushed to the server.
    pub fn arrange_layout(&mut self, mon: usize) -> Vec<ClientId> {
        let layout = self.monitors[mon].layout();
        self.monitors[mon].layout_symbol = truncate_heapless(layout.symbol());
        let tiled = self.tiled_clients(mon);
        let borders: Vec<i32> = tiled
            .iter()
            .filter_map(|id| self.client(*id).map(|c| c.border_width))
            .collect();
        let work = self.monitors[mon].work;
        let mut changed = Vec::new();
        match layout {
            Layout::Tile => {
                let mfact = self.monitors[mon].mfact;
                let nmaster = self.monitors[mon].nmaster;
                layout::tile(work, mfact, nmaster, &borders, |ind, rect| {
                    let id = tiled[ind];
                    if self.resize(id, rect, false) {
                        changed.push(id);
                    }
                    self.client(id).map_or(0, Client::height)
                });
            }
            Layout::Monocle => {
                if !tiled.is_empty() {
                    self.monitors[mon].layout_symbol = format_heapless!("[{}]", tiled.len());
                }
                layout::monocle(work, &borders, |ind, rect| {
                    let id = tiled[ind];
                    if self.resize(id, rect, false) {
                        changed.push(id);
                    }
                });
            }
            Layout::Floating => {}
        }
        changed
    }

    /// Switches the selected monitor to `mask`, a zero mask swaps back to the previous tag-set.
    /// Returns false if nothing changed.
    pub fn view(&mut self, mask: u32) -> bool {
        let masked = mask & self.tag_mask;
        let m = &mut self.monitors[self.selmon];
        if masked == m.current_tags() {
            return false;
        }
        m.seltags ^= 1;
        if masked != 0 {
            m.tagset[m.seltags] = masked;
        }
        true
    }

    pub fn toggle_view(&mut self, mask: u32) -> bool {
        let m = &mut self.monitors[self.selmon];
        let new_tags = m.current_tags() ^ (mask & self.tag_mask);
        if new_tags == 0 {
            return false;
        }
        m.tagset[m.seltags] = new_tags;
        true
    }

    /// Moves the selection to `mask`.
    pub fn tag(&mut self, mask: u32) -> bool {
        let masked = mask & self.tag_mask;
        if masked == 0 {
            return false;
        }
        let Some(sel) = self.sel_client() else {
            return false;
        };
        self.client_mut(sel).map(|c| c.tags = masked).is_some()
    }

    pub fn toggle_tag(&mut self, mask: u32) -> bool {
        let tag_mask = self.tag_mask;
        let Some(sel) = self.sel_client() else {
            return false;
        };
        let Some(c) = self.client_mut(sel) else {
            return false;
        };
        let new_tags = c.tags ^ (mask & tag_mask);
        if new_tags == 0 {
            return false;
        }
        c.tags = new_tags;
        true
    }

    /// Below 1.0 the factor is relative, above it's absolute after subtracting 1.0.
    pub fn set_mfact(&mut self, arg: f32) -> bool {
        let m = &mut self.monitors[self.selmon];
        if !m.layout().arranges() {
            return false;
        }
        let mfact = if arg < 1.0 { arg + m.mfact } else { arg - 1.0 };
        if !(0.05..=0.95).contains(&mfact) {
            return false;
        }
        m.mfact = mfact;
        true
    }

    pub fn inc_nmaster(&mut self, inc: i32) {
        let m = &mut self.monitors[self.selmon];
        m.nmaster = (m.nmaster as i32 + inc).max(0) as u32;
    }

    /// `None` flips to the other layout slot, a layout flips slots unless it's already selected
    /// and is then stored in the selected slot.
    pub fn set_layout(&mut self, layout: Option<Layout>) {
        let m = &mut self.monitors[self.selmon];
        if layout != Some(m.layout()) {
            m.sellt ^= 1;
        }
        if let Some(layout) = layout {
            m.layouts[m.sellt] = layout;
        }
        m.layout_symbol = truncate_heapless(m.layout().symbol());
    }

    /// Flips the selection's floating state, see `toggle_floating_client`.
    pub fn toggle_floating(&mut self) -> Option<ClientId> {
        let sel = self.sel_client()?;
        self.toggle_floating_client(sel)
    }

    /// Flips a client's floating state, fixed size clients stay floating.
    /// Returns the client unless it's fullscreen.
    pub fn toggle_floating_client(&mut self, id: ClientId) -> Option<ClientId> {
        let c = self.client_mut(id)?;
        if c.is_fullscreen {
            return None;
        }
        c.is_floating = !c.is_floating || c.is_fixed;
        Some(id)
    }

    /// Moves the selection to master, or the next tiled client if the selection already is master.
    /// Returns the client that was moved.
    pub fn zoom(&mut self) -> Option<ClientId> {
        if !self.sel_mon().layout().arranges() {
            return None;
        }
        let sel = self.sel_client()?;
        if self.client(sel)?.is_floating {
            return None;
        }
        let tiled = self.tiled_clients(self.selmon);
        let target = if tiled.first() == Some(&sel) {
            *tiled.get(1)?
        } else {
            sel
        };
        self.detach(target);
        self.attach(target);
        Some(target)
    }

    /// The next or previous visible client in tiling order from the selection, wrapping around.
    #[must_use]
    pub fn focus_stack(&self, dir: i32) -> Option<ClientId> {
        let sel = self.sel_client()?;
        if self.options.lock_fullscreen && self.client(sel)?.is_fullscreen {
            return None;
        }
        let clients = &self.sel_mon().clients;
        let pos = clients.iter().position(|c| *c == sel)?;
        let visible = |id: &&ClientId| self.is_visible(**id);
        let found = if dir > 0 {
            clients[pos + 1..]
                .iter()
                .find(visible)
                .or_else(|| clients.iter().find(visible))
        } else {
            clients[..pos]
                .iter()
                .rev()
                .find(visible)
                .or_else(|| clients[pos + 1..].iter().rev().find(visible))
        };
        found.copied().filter(|c| *c != sel)
    }

    /// Moves a client to another monitor's lists and tag-set.
    /// Returns false if it's already there.
    pub fn send_mon(&mut self, id: ClientId, target: usize) -> bool {
        if target >= self.monitors.len() || self.client(id).map_or(true, |c| c.mon == target) {
            return false;
        }
        self.detach(id);
        self.detach_stack(id);
        let tags = self.monitors[target].current_tags();
        if let Some(c) = self.client_mut(id) {
            c.mon = target;
            c.tags = tags;
        }
        self.attach(id);
        self.attach_stack(id);
        true
    }

    /// Decides how a managed client's `ConfigureRequest` is answered. A border width request
    /// replaces everything else, tiled clients on an arranging monitor keep their geometry.
    pub fn configure_request(
        &mut self,
        id: ClientId,
        border_width: Option<i32>,
        fields: ConfigureFields,
    ) -> Option<ConfigureOutcome> {
        let floating = self.client(id)?.is_floating;
        if let Some(border_width) = border_width {
            self.client_mut(id)?.border_width = border_width;
            return Some(ConfigureOutcome::BorderWidth);
        }
        if !floating && self.sel_mon().layout().arranges() {
            return Some(ConfigureOutcome::Tiled);
        }
        self.configure_floating(id, fields);
        let moved = fields.x.is_some() || fields.y.is_some();
        let resized = fields.width.is_some() || fields.height.is_some();
        Some(ConfigureOutcome::Repositioned {
            notify: moved && !resized,
            visible: self.is_visible(id),
        })
    }

    /// Applies a `ConfigureRequest` to a client that positions itself, relative to its monitor.
    /// Floating clients that end up overflowing the monitor are centered on it.
    pub fn configure_floating(&mut self, id: ClientId, fields: ConfigureFields) {
        let Some(mon) = self.client(id).map(|c| c.mon) else {
            return;
        };
        let screen = self.monitors[mon].screen;
        let Some(c) = self.client_mut(id) else {
            return;
        };
        if let Some(x) = fields.x {
            c.old_rect.x = c.rect.x;
            c.rect.x = screen.x + x;
        }
        if let Some(y) = fields.y {
            c.old_rect.y = c.rect.y;
            c.rect.y = screen.y + y;
        }
        if let Some(width) = fields.width {
            c.old_rect.width = c.rect.width;
            c.rect.width = width;
        }
        if let Some(height) = fields.height {
            c.old_rect.height = c.rect.height;
            c.rect.height = height;
        }
        if c.rect.x + c.rect.width > screen.x + screen.width && c.is_floating {
            c.rect.x = screen.x + (screen.width / 2 - c.width() / 2);
        }
        if c.rect.y + c.rect.height > screen.y + screen.height && c.is_floating {
            c.rect.y = screen.y + (screen.height / 2 - c.height() / 2);
        }
    }

    /// Flips fullscreen state, returns the geometry the client should get if anything changed.
    pub fn set_fullscreen(&mut self, id: ClientId, fullscreen: bool) -> Option<Rect> {
        let mon = self.client(id)?.mon;
        let screen = self.monitors[mon].screen;
        let c = self.client_mut(id)?;
        if fullscreen && !c.is_fullscreen {
            c.is_fullscreen = true;
            c.old_state = c.is_floating;
            c.old_border_width = c.border_width;
            c.border_width = 0;
            c.is_floating = true;
            Some(screen)
        } else if !fullscreen && c.is_fullscreen {
            c.is_fullscreen = false;
            c.is_floating = c.old_state;
            c.border_width = c.old_border_width;
            c.rect = c.old_rect;
            Some(c.rect)
        } else {
            None
        }
    }

    /// One pointer motion while moving a client, with edge snapping against the selected monitor.
    #[must_use]
    pub fn drag_move(&self, id: ClientId, origin: (i32, i32), delta: (i32, i32)) -> Option<DragStep> {
        let c = self.client(id)?;
        let m = self.sel_mon();
        let snap = self.sizing.snap as i32;
        let work = m.work;
        let mut nx = origin.0 + delta.0;
        let mut ny = origin.1 + delta.1;
        if (work.x - nx).abs() < snap {
            nx = work.x;
        } else if ((work.x + work.width) - (nx + c.width())).abs() < snap {
            nx = work.x + work.width - c.width();
        }
        if (work.y - ny).abs() < snap {
            ny = work.y;
        } else if ((work.y + work.height) - (ny + c.height())).abs() < snap {
            ny = work.y + work.height - c.height();
        }
        let arranges = m.layout().arranges();
        let make_floating = !c.is_floating
            && arranges
            && ((nx - c.rect.x).abs() > snap || (ny - c.rect.y).abs() > snap);
        Some(DragStep {
            rect: Rect::new(nx, ny, c.rect.width, c.rect.height),
            make_floating,
            apply: !arranges || c.is_floating || make_floating,
        })
    }

    /// One pointer motion while resizing a client from its bottom right corner.
    #[must_use]
    pub fn drag_resize(&self, id: ClientId, origin: (i32, i32), pointer: (i32, i32)) -> Option<DragStep> {
        let c = self.client(id)?;
        let m = self.sel_mon();
        let owner = &self.monitors[c.mon];
        let snap = self.sizing.snap as i32;
        let nw = (pointer.0 - origin.0 - 2 * c.border_width + 1).max(1);
        let nh = (pointer.1 - origin.1 - 2 * c.border_width + 1).max(1);
        let within = owner.work.x + nw >= m.work.x
            && owner.work.x + nw <= m.work.x + m.work.width
            && owner.work.y + nh >= m.work.y
            && owner.work.y + nh <= m.work.y + m.work.height;
        let arranges = m.layout().arranges();
        let make_floating = within
            && !c.is_floating
            && arranges
            && ((nw - c.rect.width).abs() > snap || (nh - c.rect.height).abs() > snap);
        Some(DragStep {
            rect: Rect::new(c.rect.x, c.rect.y, nw, nh),
            make_floating,
            apply: !arranges || c.is_floating || make_floating,
        })
    }

    /// Syncs monitors with the screens the server reports, duplicates are dropped.
    /// Clients of removed monitors move to the first one.
    pub fn update_geometry(&mut self, screens: &[Rect]) -> GeometryUpdate {
        let mut unique: Vec<Rect> = Vec::new();
        for screen in screens {
            if !unique.contains(screen) {
                unique.push(*screen);
            }
        }
        if unique.is_empty() {
            unique.push(Rect::new(0, 0, self.screen_width, self.screen_height));
        }
        let mut update = GeometryUpdate::default();
        for (ind, screen) in unique.iter().enumerate().skip(self.monitors.len()) {
            tracing::info!("Adding monitor {ind} at {screen:?}");
            self.monitors
                .push(Monitor::new(ind, *screen, &self.options, self.bar_height));
            update.added.push(ind);
            update.dirty = true;
        }
        for (ind, (mon, screen)) in self.monitors.iter_mut().zip(unique.iter()).enumerate() {
            mon.num = ind;
            if mon.set_screen(*screen, self.bar_height) {
                update.dirty = true;
            }
        }
        while self.monitors.len() > unique.len() {
            let Some(removed) = self.monitors.pop() else {
                break;
            };
            tracing::info!("Removing monitor {}", removed.num);
            for id in removed.clients {
                if let Some(c) = self.client_mut(id) {
                    c.mon = 0;
                }
                self.attach(id);
                self.attach_stack(id);
                update.dirty = true;
            }
            update.removed_bars.push(removed.bar_win);
            if self.selmon >= self.monitors.len() {
                self.selmon = 0;
            }
        }
        update
    }

    /// Gives every fullscreen client its monitor's current screen, after the screens changed.
    /// Returns the clients whose geometry has to be pushed to the server.
    pub fn refit_fullscreen(&mut self) -> Vec<ClientId> {
        let refits: Vec<(ClientId, Rect)> = self
            .client_ids()
            .filter_map(|id| {
                self.client(id)
                    .filter(|c| c.is_fullscreen)
                    .map(|c| (id, self.monitors[c.mon].screen))
            })
            .collect();
        for (id, screen) in &refits {
            self.commit_geometry(*id, *screen);
        }
        refits.into_iter().map(|(id, _)| id).collect()
    }

    /// Moves the bar and work area after the bar was shown or hidden.
    pub fn toggle_bar(&mut self) {
        let bar_height = self.bar_height;
        let m = &mut self.monitors[self.selmon];
        m.show_bar = !m.show_bar;
        m.update_bar_geometry(bar_height);
    }

    /// Tags with clients and tags with urgent clients on a monitor.
    #[must_use]
    pub fn tag_occupancy(&self, mon: usize) -> (u32, u32) {
        let mut occupied = 0;
        let mut urgent = 0;
        for c in self.monitors[mon].clients.iter().filter_map(|id| self.client(*id)) {
            occupied |= c.tags;
            if c.is_urgent {
                urgent |= c.tags;
            }
        }
        (occupied, urgent)
    }

    /// Root window name, falls back to the name and version.
    pub fn set_status(&mut self, text: &str) {
        self.status_text = if text.is_empty() {
            format_heapless!("{WINDOW_MANAGER_NAME}-{VERSION}")
        } else {
            truncate_heapless(text)
        };
    }

    /// Strips num lock and caps lock, keeps the modifiers bindings are made of.
    #[must_use]
    pub fn clean_mask(&self, state: u16) -> u16 {
        state & !(self.numlock_mask | LOCK) & (SHIFT | CONTROL | MOD1 | MOD2 | MOD3 | MOD4 | MOD5)
    }

    #[must_use]
    pub fn key_actions(&self, keysym: u32, state: u16) -> Vec<Action> {
        let clean = self.clean_mask(state);
        self.key_mappings
            .iter()
            .filter(|m| m.matches(keysym, clean))
            .map(|m| m.action)
            .collect()
    }

    /// Actions bound to a click, tag bar actions with a zero mask get the clicked tag.
    #[must_use]
    pub fn mouse_actions(
        &self,
        target: MouseTarget,
        tag: Option<usize>,
        button: u8,
        state: u16,
    ) -> Vec<Action> {
        let clean = self.clean_mask(state);
        self.mouse_mappings
            .iter()
            .filter(|m| m.matches(target, button, clean))
            .map(|m| match (target, tag) {
                (MouseTarget::TagBar, Some(tag)) => m.action.with_clicked_tag(tag),
                _ => m.action,
            })
            .collect()
    }

    /// Ignores errors caused by requests in `first..=last`, used around requests on windows that
    /// may already be gone.
    pub fn ignore_errors_between(&mut self, first: u16, last: u16) {
        self.ignored_errors.push((first, last));
    }

    /// Errors arrive in sequence order, ranges that ended before `sequence` are dropped.
    pub fn should_ignore_error(&mut self, sequence: u16) -> bool {
        self.ignored_errors
            .retain(|(_, last)| sequence_at_or_before(sequence, *last));
        self.ignored_errors
            .iter()
            .any(|(first, _)| sequence_at_or_before(*first, sequence))
    }
}

/// Sequence numbers wrap, the half of the number space behind `b` counts as before it.
fn sequence_at_or_before(a: u16, b: u16) -> bool {
    b.wrapping_sub(a) <= u16::MAX / 2
}
