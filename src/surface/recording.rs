//! In-memory display surface for tests
//!
//! Records every command and plays the window manager: fullscreen/maximize
//! requests are honoured immediately, and `wm_set_*` changes state the way a
//! user acting through the window manager would, returning the matching
//! notification payload.

use std::collections::VecDeque;

use crate::error::{Result, SurfaceError};
use crate::surface::{DisplaySurface, EventSource, SurfaceEvent, WindowStateFlags};

pub const INITIAL_CURSOR: u32 = 7;
pub const BLANK_CURSOR: u32 = 99;
pub const NATIVE_HANDLE: u64 = 0x2a0_0001;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Resize(u32, u32),
    Show,
    Hide,
    SetFullscreen(bool),
    SetMaximized(bool),
    SetTitlebarVisible(bool),
    SetTitle(String),
    SetOpacity(f64),
    SetCursor(u32),
}

#[derive(Debug)]
pub struct RecordingSurface {
    calls: Vec<Call>,
    state: WindowStateFlags,
    visible: bool,
    opacity: f64,
    cursor: u32,
    handle: Option<u64>,
    events: VecDeque<SurfaceEvent>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            state: WindowStateFlags::empty(),
            visible: false,
            opacity: 1.0,
            cursor: INITIAL_CURSOR,
            handle: Some(NATIVE_HANDLE),
            events: VecDeque::new(),
        }
    }

    /// A backend without a native window id (e.g. Wayland)
    pub fn without_native_handle() -> Self {
        Self {
            handle: None,
            ..Self::new()
        }
    }

    pub fn take_calls(&mut self) -> Vec<Call> {
        std::mem::take(&mut self.calls)
    }

    pub fn push_event(&mut self, event: SurfaceEvent) {
        self.events.push_back(event);
    }

    pub fn wm_set_fullscreen(&mut self, on: bool) -> (WindowStateFlags, WindowStateFlags) {
        self.wm_set(WindowStateFlags::FULLSCREEN, on)
    }

    pub fn wm_set_maximized(&mut self, on: bool) -> (WindowStateFlags, WindowStateFlags) {
        self.wm_set(WindowStateFlags::MAXIMIZED, on)
    }

    fn wm_set(&mut self, flag: WindowStateFlags, on: bool) -> (WindowStateFlags, WindowStateFlags) {
        let before = self.state;
        self.state.set(flag, on);
        (before ^ self.state, self.state)
    }

    fn ensure_visible(&self) -> Result<()> {
        if self.visible {
            Ok(())
        } else {
            Err(SurfaceError::NotShown)
        }
    }
}

impl DisplaySurface for RecordingSurface {
    type Cursor = u32;

    fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        self.calls.push(Call::Resize(width, height));
        Ok(())
    }

    fn show(&mut self) -> Result<()> {
        self.calls.push(Call::Show);
        self.visible = true;
        Ok(())
    }

    fn hide(&mut self) -> Result<()> {
        self.calls.push(Call::Hide);
        self.visible = false;
        Ok(())
    }

    fn set_fullscreen(&mut self, fullscreen: bool) -> Result<()> {
        self.calls.push(Call::SetFullscreen(fullscreen));
        self.state.set(WindowStateFlags::FULLSCREEN, fullscreen);
        Ok(())
    }

    fn set_maximized(&mut self, maximized: bool) -> Result<()> {
        self.calls.push(Call::SetMaximized(maximized));
        self.state.set(WindowStateFlags::MAXIMIZED, maximized);
        Ok(())
    }

    fn set_titlebar_visible(&mut self, visible: bool) -> Result<()> {
        self.calls.push(Call::SetTitlebarVisible(visible));
        Ok(())
    }

    fn set_title(&mut self, title: &str) -> Result<()> {
        self.calls.push(Call::SetTitle(title.to_string()));
        Ok(())
    }

    fn opacity(&self) -> f64 {
        self.opacity
    }

    fn set_opacity(&mut self, alpha: f64) -> Result<()> {
        self.calls.push(Call::SetOpacity(alpha));
        self.opacity = alpha;
        Ok(())
    }

    fn is_fullscreen(&self) -> Result<bool> {
        self.ensure_visible()?;
        Ok(self.state.contains(WindowStateFlags::FULLSCREEN))
    }

    fn is_maximized(&self) -> Result<bool> {
        self.ensure_visible()?;
        Ok(self.state.contains(WindowStateFlags::MAXIMIZED))
    }

    fn current_cursor(&self) -> u32 {
        self.cursor
    }

    fn blank_cursor(&self) -> u32 {
        BLANK_CURSOR
    }

    fn set_cursor(&mut self, cursor: u32) -> Result<()> {
        self.calls.push(Call::SetCursor(cursor));
        self.cursor = cursor;
        Ok(())
    }

    fn native_handle(&self) -> Option<u64> {
        self.handle
    }
}

impl EventSource for RecordingSurface {
    fn next_event(&mut self) -> Result<Option<SurfaceEvent>> {
        Ok(self.events.pop_front())
    }
}
