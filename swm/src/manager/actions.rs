use swm_core::config::Action;
use swm_core::state::State;

use crate::error::{Error, Result};
use crate::manager::spawn::{command_line, spawn};
use crate::manager::Manager;
use crate::x11::call_wrapper::{CallWrapper, WM_DELETE_WINDOW};
use crate::x11::state_lifecycle::move_bars;

impl Manager {
    pub(crate) fn exec_action(
        &self,
        call_wrapper: &mut CallWrapper,
        state: &mut State,
        action: Action,
    ) -> Result<()> {
        tracing::debug!("Executing action {action:?}");
        match action {
            Action::Spawn(cmd) => {
                let argv = command_line(cmd, state.selmon);
                if let Err(e) = spawn(&argv) {
                    tracing::warn!("Failed to spawn {argv:?}: {e}");
                }
            }
            Action::ToggleBar => {
                state.toggle_bar();
                move_bars(call_wrapper, state)?;
                self.arrange_selected(call_wrapper, state)?;
            }
            Action::FocusStack(dir) => {
                if let Some(id) = state.focus_stack(dir) {
                    self.focus(call_wrapper, state, Some(id))?;
                    self.restack(call_wrapper, state, state.selmon)?;
                }
            }
            Action::IncNMaster(inc) => {
                state.inc_nmaster(inc);
                self.arrange_selected(call_wrapper, state)?;
            }
            Action::SetMfact(arg) => {
                if state.set_mfact(arg) {
                    self.arrange_selected(call_wrapper, state)?;
                }
            }
            Action::Zoom => {
                if let Some(id) = state.zoom() {
                    self.focus(call_wrapper, state, Some(id))?;
                    self.arrange_selected(call_wrapper, state)?;
                }
            }
            Action::View(mask) => {
                if state.view(mask) {
                    self.refocus_selected(call_wrapper, state)?;
                }
            }
            Action::ToggleView(mask) => {
                if state.toggle_view(mask) {
                    self.refocus_selected(call_wrapper, state)?;
                }
            }
            Action::Tag(mask) => {
                if state.tag(mask) {
                    self.refocus_selected(call_wrapper, state)?;
                }
            }
            Action::ToggleTag(mask) => {
                if state.toggle_tag(mask) {
                    self.refocus_selected(call_wrapper, state)?;
                }
            }
            Action::KillClient => {
                let Some(win) = state.sel_client().and_then(|id| state.client(id)).map(|c| c.window)
                else {
                    return Ok(());
                };
                if !call_wrapper.send_protocol(win, WM_DELETE_WINDOW)? {
                    tracing::info!("Killing {win}, it doesn't support WM_DELETE_WINDOW");
                    let (first, last) = call_wrapper.kill_client(win)?;
                    state.ignore_errors_between(first, last);
                }
            }
            Action::SetLayout(layout) => {
                state.set_layout(layout);
                if state.sel_client().is_some() {
                    self.arrange_selected(call_wrapper, state)?;
                } else {
                    self.bar_manager.draw_bar(call_wrapper, state, state.selmon)?;
                }
            }
            Action::ToggleFloating => {
                if let Some(id) = state.toggle_floating() {
                    if let Some(c) = state.client(id).filter(|c| c.is_floating) {
                        let rect = c.rect;
                        self.resize(call_wrapper, state, id, rect, false)?;
                    }
                    self.arrange_selected(call_wrapper, state)?;
                }
            }
            Action::FocusMon(dir) => {
                if state.monitors.len() <= 1 {
                    return Ok(());
                }
                let target = state.dir_to_mon(dir);
                if target == state.selmon {
                    return Ok(());
                }
                if let Some(sel) = state.sel_client() {
                    self.unfocus(call_wrapper, state, sel, false)?;
                }
                state.selmon = target;
                self.focus(call_wrapper, state, None)?;
            }
            Action::TagMon(dir) => {
                if state.monitors.len() <= 1 {
                    return Ok(());
                }
                if let Some(sel) = state.sel_client() {
                    let target = state.dir_to_mon(dir);
                    self.send_to_monitor(call_wrapper, state, sel, target)?;
                }
            }
            Action::MoveMouse => self.move_mouse(call_wrapper, state)?,
            Action::ResizeMouse => self.resize_mouse(call_wrapper, state)?,
            Action::Quit => {
                tracing::info!("Quit requested");
                return Err(Error::GracefulShutdown);
            }
        }
        Ok(())
    }

    /// After the visible tags or the selection's tags changed.
    fn refocus_selected(&self, call_wrapper: &mut CallWrapper, state: &mut State) -> Result<()> {
        self.focus(call_wrapper, state, None)?;
        self.arrange_selected(call_wrapper, state)
    }
}
