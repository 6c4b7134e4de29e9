use std::collections::VecDeque;

/// Events taken off the connection before anyone asked for them.
/// `read_ahead` is what the next reader gets, pointer grabs included. `deferred` holds what a
/// pointer grab put aside, only the main loop picks those up.
#[derive(Debug)]
pub(crate) struct EventQueue<E> {
    read_ahead: VecDeque<E>,
    deferred: VecDeque<E>,
}

impl<E> EventQueue<E> {
    pub(crate) fn new() -> Self {
        Self {
            read_ahead: VecDeque::new(),
            deferred: VecDeque::new(),
        }
    }

    /// For the main loop, put aside events first since they arrived earlier.
    pub(crate) fn pop(&mut self) -> Option<E> {
        self.deferred
            .pop_front()
            .or_else(|| self.read_ahead.pop_front())
    }

    /// For a pointer grab, which must not see what it already put aside.
    pub(crate) fn pop_read_ahead(&mut self) -> Option<E> {
        self.read_ahead.pop_front()
    }

    pub(crate) fn push_read_ahead(&mut self, event: E) {
        self.read_ahead.push_back(event);
    }

    pub(crate) fn defer(&mut self, event: E) {
        self.deferred.push_back(event);
    }

    /// Drops every queued event matching `discard`, wherever it's queued.
    pub(crate) fn discard(&mut self, discard: impl Fn(&E) -> bool) {
        self.read_ahead.retain(|event| !discard(event));
        self.deferred.retain(|event| !discard(event));
    }
}

#[cfg(test)]
mod tests {
    use crate::x11::event_queue::EventQueue;

    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    enum Ev {
        Enter,
        Motion(i32),
        Release,
        Property,
    }

    #[test]
    fn grab_still_sees_release_read_while_dropping_enters() {
        let mut queue = EventQueue::new();
        // Put aside by the grab before a restack happened
        queue.defer(Ev::Property);
        queue.defer(Ev::Enter);
        // Read off the connection while syncing after the restack
        for ev in [Ev::Enter, Ev::Motion(1), Ev::Enter, Ev::Release] {
            queue.push_read_ahead(ev);
        }
        queue.discard(|ev| *ev == Ev::Enter);
        assert_eq!(Some(Ev::Motion(1)), queue.pop_read_ahead());
        assert_eq!(Some(Ev::Release), queue.pop_read_ahead());
        assert_eq!(None, queue.pop_read_ahead());
        assert_eq!(Some(Ev::Property), queue.pop());
        assert_eq!(None, queue.pop());
    }

    #[test]
    fn main_loop_gets_deferred_before_read_ahead() {
        let mut queue = EventQueue::new();
        queue.push_read_ahead(Ev::Motion(2));
        queue.defer(Ev::Property);
        queue.defer(Ev::Motion(1));
        assert_eq!(Some(Ev::Property), queue.pop());
        assert_eq!(Some(Ev::Motion(1)), queue.pop());
        assert_eq!(Some(Ev::Motion(2)), queue.pop());
        assert_eq!(None, queue.pop());
    }
}
