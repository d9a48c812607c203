//! Display Surface Module
//!
//! The capability the controller drives: one top-level window plus the
//! notifications it delivers. Backends implement [`DisplaySurface`] for
//! commands and queries, and [`EventSource`] for inbound events.

pub mod ewmh;
pub mod flags;
pub mod keysyms;
pub mod x11;

#[cfg(test)]
pub mod recording;

use crate::error::Result;

pub use flags::{Modifiers, WindowStateFlags};

/// Notification delivered by the display surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceEvent {
    /// Key pressed; `keysym` is the toolkit key symbol
    KeyPress { keysym: u32 },
    /// Pointer button pressed over the video area
    ButtonPress { button: u8, modifiers: Modifiers },
    /// Pointer moved inside the window
    Motion,
    /// Window manager changed the window state
    WindowState {
        changed: WindowStateFlags,
        new_state: WindowStateFlags,
    },
    /// User asked the window manager to close the window
    CloseRequest,
    /// Periodic idle tick
    Tick,
}

/// Outbound commands and synchronous queries against the on-screen window
pub trait DisplaySurface {
    /// Backend cursor handle
    type Cursor: Copy + PartialEq + std::fmt::Debug;

    fn resize(&mut self, width: u32, height: u32) -> Result<()>;

    /// Make the window visible and wait until the request reached the display
    fn show(&mut self) -> Result<()>;

    fn hide(&mut self) -> Result<()>;

    fn set_fullscreen(&mut self, fullscreen: bool) -> Result<()>;

    fn set_maximized(&mut self, maximized: bool) -> Result<()>;

    /// Show or hide the title bar decoration
    fn set_titlebar_visible(&mut self, visible: bool) -> Result<()>;

    fn set_title(&mut self, title: &str) -> Result<()>;

    /// Current window opacity in [0, 1]
    fn opacity(&self) -> f64;

    fn set_opacity(&mut self, alpha: f64) -> Result<()>;

    fn is_fullscreen(&self) -> Result<bool>;

    fn is_maximized(&self) -> Result<bool>;

    /// Cursor currently installed on the window
    fn current_cursor(&self) -> Self::Cursor;

    /// Invisible cursor used while the pointer is idle
    fn blank_cursor(&self) -> Self::Cursor;

    fn set_cursor(&mut self, cursor: Self::Cursor) -> Result<()>;

    /// Native window id usable by `xdg-screensaver`, if the backend has one
    fn native_handle(&self) -> Option<u64>;
}

/// Source of inbound surface notifications
pub trait EventSource {
    /// Next pending notification, or `None` once the queue is drained
    fn next_event(&mut self) -> Result<Option<SurfaceEvent>>;
}
