pub(crate) mod call_wrapper;
pub(crate) mod client_message;
pub(crate) mod colors;
pub(crate) mod cookies;
pub(crate) mod error_handler;
pub(crate) mod event_queue;
pub(crate) mod state_lifecycle;
