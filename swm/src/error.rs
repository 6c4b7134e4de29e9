use std::io;

use x11rb::errors::{ConnectError, ConnectionError, ReplyError, ReplyOrIdError};
use x11rb::protocol::ErrorKind;

pub(crate) type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub(crate) enum Error {
    #[error(transparent)]
    Core(#[from] swm_core::error::Error),
    #[error(transparent)]
    X11Connect(#[from] ConnectError),
    #[error(transparent)]
    X11Connection(#[from] ConnectionError),
    #[error(transparent)]
    X11Reply(#[from] ReplyError),
    #[error(transparent)]
    X11IdCreation(#[from] ReplyOrIdError),
    #[error("Could not become wm, access denied, there is likely another WM running")]
    BecomeWm,
    #[error("Failed to open font {0:?}")]
    NoFont(String),
    #[error("Fatal X11 error {kind:?}, request code {request_code}, error code {error_code}")]
    FatalX11 {
        kind: ErrorKind,
        request_code: u8,
        error_code: u8,
    },
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Nix(#[from] nix::Error),
    #[error("Exit triggered")]
    GracefulShutdown,
}
