use swm_core::state::client::ClientId;
use swm_core::state::{DragStep, State};
use x11rb::protocol::xproto::Timestamp;
use x11rb::protocol::Event;

use crate::error::Result;
use crate::manager::Manager;
use crate::x11::call_wrapper::CallWrapper;

/// Motion is handled at most this often while dragging, in milliseconds.
const DRAG_INTERVAL: Timestamp = 1000 / 60;

#[derive(Copy, Clone)]
enum Drag {
    Move { pointer: (i32, i32) },
    Resize,
}

impl Manager {
    pub(crate) fn move_mouse(&self, call_wrapper: &mut CallWrapper, state: &mut State) -> Result<()> {
        let Some(id) = self.prepare_drag(call_wrapper, state)? else {
            return Ok(());
        };
        if !call_wrapper.grab_pointer(state.root, self.cursors.moving)? {
            return Ok(());
        }
        let Some(pointer) = call_wrapper.query_pointer(state.root)? else {
            return call_wrapper.ungrab_pointer();
        };
        let dragged = self.drag_loop(call_wrapper, state, id, Drag::Move { pointer });
        call_wrapper.ungrab_pointer()?;
        dragged?;
        self.finish_drag(call_wrapper, state, id)
    }

    /// Resizes from the bottom right corner, the pointer is warped there first.
    pub(crate) fn resize_mouse(&self, call_wrapper: &mut CallWrapper, state: &mut State) -> Result<()> {
        let Some(id) = self.prepare_drag(call_wrapper, state)? else {
            return Ok(());
        };
        if !call_wrapper.grab_pointer(state.root, self.cursors.resize)? {
            return Ok(());
        }
        self.warp_to_corner(call_wrapper, state, id)?;
        let dragged = self.drag_loop(call_wrapper, state, id, Drag::Resize);
        if dragged.is_ok() {
            self.warp_to_corner(call_wrapper, state, id)?;
        }
        call_wrapper.ungrab_pointer()?;
        dragged?;
        call_wrapper.drop_enter_events()?;
        self.finish_drag(call_wrapper, state, id)
    }

    /// The selection if it can be dragged, restacked so it's on top.
    fn prepare_drag(
        &self,
        call_wrapper: &mut CallWrapper,
        state: &mut State,
    ) -> Result<Option<ClientId>> {
        let Some(id) = state.sel_client() else {
            return Ok(None);
        };
        if state.client(id).map_or(true, |c| c.is_fullscreen) {
            return Ok(None);
        }
        let selmon = state.selmon;
        self.restack(call_wrapper, state, selmon)?;
        Ok(Some(id))
    }

    fn warp_to_corner(&self, call_wrapper: &CallWrapper, state: &State, id: ClientId) -> Result<()> {
        if let Some(c) = state.client(id) {
            call_wrapper.warp_pointer(
                c.window,
                c.rect.width + c.border_width - 1,
                c.rect.height + c.border_width - 1,
            )?;
        }
        Ok(())
    }

    /// Runs until the button is released. Requests that can't wait for the drag to end are
    /// handled in place, everything else is queued up for the main loop.
    fn drag_loop(
        &self,
        call_wrapper: &mut CallWrapper,
        state: &mut State,
        id: ClientId,
        drag: Drag,
    ) -> Result<()> {
        let Some(origin) = state.client(id).map(|c| (c.rect.x, c.rect.y)) else {
            return Ok(());
        };
        let mut last_time: Timestamp = 0;
        loop {
            let event = call_wrapper.wait_for_event()?;
            match event {
                Event::MotionNotify(motion) => {
                    if motion.time.wrapping_sub(last_time) <= DRAG_INTERVAL {
                        continue;
                    }
                    last_time = motion.time;
                    let at = (motion.root_x as i32, motion.root_y as i32);
                    let step = match drag {
                        Drag::Move { pointer } => {
                            state.drag_move(id, origin, (at.0 - pointer.0, at.1 - pointer.1))
                        }
                        Drag::Resize => state.drag_resize(id, origin, at),
                    };
                    if let Some(step) = step {
                        self.apply_drag_step(call_wrapper, state, id, step)?;
                    }
                }
                Event::ButtonRelease(_) => return Ok(()),
                Event::ConfigureRequest(_)
                | Event::Expose(_)
                | Event::MapRequest(_)
                | Event::Error(_) => crate::wm::handle_event(event, call_wrapper, self, state)?,
                other => call_wrapper.defer(other),
            }
            if state.client(id).is_none() {
                return Ok(());
            }
        }
    }

    fn apply_drag_step(
        &self,
        call_wrapper: &mut CallWrapper,
        state: &mut State,
        id: ClientId,
        step: DragStep,
    ) -> Result<()> {
        if step.make_floating && state.toggle_floating_client(id).is_some() {
            if let Some(rect) = state.client(id).filter(|c| c.is_floating).map(|c| c.rect) {
                self.resize(call_wrapper, state, id, rect, false)?;
            }
            self.arrange_selected(call_wrapper, state)?;
        }
        if step.apply {
            self.resize(call_wrapper, state, id, step.rect, true)?;
        }
        Ok(())
    }

    /// A client dropped onto another monitor moves there, and that monitor gets selected.
    fn finish_drag(&self, call_wrapper: &mut CallWrapper, state: &mut State, id: ClientId) -> Result<()> {
        let Some(rect) = state.client(id).map(|c| c.rect) else {
            return Ok(());
        };
        let mon = state.rect_to_mon(rect);
        if mon != state.selmon {
            self.send_to_monitor(call_wrapper, state, id, mon)?;
            state.selmon = mon;
            self.focus(call_wrapper, state, None)?;
        }
        Ok(())
    }
}
