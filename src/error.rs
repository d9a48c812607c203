//! Error types for the display surface and its controller

use thiserror::Error;
use x11rb::errors::{ConnectError, ConnectionError, ReplyError, ReplyOrIdError};

/// Errors raised by a display surface or by the controller driving it
#[derive(Debug, Error)]
pub enum SurfaceError {
    /// Fullscreen/maximized state was queried while the surface is not shown.
    /// The window manager only reports real state for mapped windows, so this
    /// is a caller bug rather than something to paper over with `false`.
    #[error("surface state queried before the window was shown")]
    NotShown,

    #[error("failed to connect to display: {0}")]
    Connect(#[from] ConnectError),

    #[error("display connection error: {0}")]
    Connection(#[from] ConnectionError),

    #[error("display request failed: {0}")]
    Reply(#[from] ReplyError),

    #[error("display request failed: {0}")]
    ReplyOrId(#[from] ReplyOrIdError),
}

pub type Result<T> = std::result::Result<T, SurfaceError>;
