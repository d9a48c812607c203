//! Surface lifecycle controller
//!
//! Owns the display surface and sequences show/hide/end on top of the window
//! state reconciler, the cursor idle tracker and the screen-saver suppressor.
//! Inbound surface notifications are dispatched through [`SurfaceController::handle_event`].
//!
//! Built without a surface (the display could not be opened) the controller is
//! permanently disabled: every operation succeeds without doing anything and
//! [`SurfaceController::init_ok`] reports `false`.

use tracing::{debug, info};

use crate::cursor::{CursorAction, CursorIdleTracker};
use crate::error::{Result, SurfaceError};
use crate::input::{InputCode, KeyMap, normalize_button};
use crate::player::InputHandler;
use crate::screensaver::{ScreenSaverControl, ScreenSaverSetting};
use crate::surface::{DisplaySurface, EventSource, SurfaceEvent, WindowStateFlags};
use crate::window_state::WindowState;

pub struct SurfaceController<S: DisplaySurface, H: InputHandler> {
    /// `None` when the display could not be initialized
    surface: Option<S>,
    handler: H,
    keymap: KeyMap,
    window_state: WindowState,
    /// Exists once the surface is realized
    cursor: Option<CursorIdleTracker>,
    /// Cursor to put back when the pointer moves after being hidden
    visible_cursor: Option<S::Cursor>,
    screensaver: Option<Box<dyn ScreenSaverControl>>,
    shown: bool,
}

impl<S: DisplaySurface, H: InputHandler> SurfaceController<S, H> {
    /// `fullscreen` is the initial fullscreen intent; `hide_cursor_after` the
    /// number of idle ticks before the pointer disappears
    pub fn new(surface: Option<S>, handler: H, fullscreen: bool, hide_cursor_after: u32) -> Self {
        let cursor = surface.as_ref().map(|_| CursorIdleTracker::new(hide_cursor_after));
        Self {
            surface,
            handler,
            keymap: KeyMap::new(),
            window_state: WindowState::new(fullscreen),
            cursor,
            visible_cursor: None,
            screensaver: None,
            shown: false,
        }
    }

    pub fn with_screensaver(mut self, screensaver: impl ScreenSaverControl + 'static) -> Self {
        self.screensaver = Some(Box::new(screensaver));
        self
    }

    /// Whether the display surface exists
    pub fn init_ok(&self) -> bool {
        self.surface.is_some()
    }

    pub fn is_shown(&self) -> bool {
        self.shown
    }

    pub fn window_state(&self) -> &WindowState {
        &self.window_state
    }

    #[cfg(test)]
    pub fn cursor_tracker(&self) -> Option<&CursorIdleTracker> {
        self.cursor.as_ref()
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    #[cfg(test)]
    pub fn surface_mut(&mut self) -> Option<&mut S> {
        self.surface.as_mut()
    }

    #[cfg(test)]
    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Surface, if it is currently shown
    fn shown_surface(&self) -> Result<&S> {
        match &self.surface {
            Some(surface) if self.shown => Ok(surface),
            _ => Err(SurfaceError::NotShown),
        }
    }

    pub fn is_fullscreen(&self) -> Result<bool> {
        self.shown_surface()?.is_fullscreen()
    }

    pub fn is_maximized(&self) -> Result<bool> {
        self.shown_surface()?.is_maximized()
    }

    /// Show the window at `width`x`height`, restoring fullscreen/maximized
    /// intent. No-op if already shown.
    pub fn show(&mut self, width: u32, height: u32) -> Result<()> {
        let Some(surface) = self.surface.as_mut() else {
            return Ok(());
        };
        if self.shown {
            return Ok(());
        }

        debug!("Showing window at {}x{}", width, height);
        self.window_state.set_desired(width, height);

        // Resize while still unmapped so the window never flashes at the old size
        surface.resize(width, height)?;
        self.window_state.restore_intent(surface)?;

        apply_screensaver(&mut self.screensaver, surface.native_handle(), ScreenSaverSetting::Suspend);

        surface.show()?;
        if self.visible_cursor.is_none() {
            self.visible_cursor = Some(surface.current_cursor());
        }
        self.shown = true;
        Ok(())
    }

    /// Hide the window, remembering fullscreen/maximized for the next show.
    /// No-op if not shown.
    pub fn hide(&mut self) -> Result<()> {
        let Some(surface) = self.surface.as_mut() else {
            return Ok(());
        };
        if !self.shown {
            return Ok(());
        }

        self.window_state.capture_intent(surface)?;
        debug!(
            "Hiding window (fullscreen={}, maximized={})",
            self.window_state.fullscreen_requested(),
            self.window_state.maximized_requested()
        );

        surface.hide()?;
        self.shown = false;

        apply_screensaver(&mut self.screensaver, surface.native_handle(), ScreenSaverSetting::Resume);
        Ok(())
    }

    /// Final teardown. Safe to call repeatedly or without ever showing.
    pub fn end(&mut self) {
        if let Some(surface) = self.surface.as_ref() {
            apply_screensaver(&mut self.screensaver, surface.native_handle(), ScreenSaverSetting::Resume);
        }
    }

    /// New video size. Applied now if possible, deferred while fullscreen or
    /// maximized, and only recorded while hidden.
    pub fn request_resize(&mut self, width: u32, height: u32) -> Result<()> {
        let Some(surface) = self.surface.as_mut() else {
            return Ok(());
        };
        if !self.shown {
            self.window_state.set_desired(width, height);
            return Ok(());
        }
        self.window_state.request_resize(surface, width, height)
    }

    pub fn enter_fullscreen(&mut self) -> Result<()> {
        match self.surface.as_mut() {
            Some(surface) if self.shown => self.window_state.enter_fullscreen(surface),
            _ => Ok(()),
        }
    }

    pub fn exit_fullscreen(&mut self) -> Result<()> {
        match self.surface.as_mut() {
            Some(surface) if self.shown => self.window_state.exit_fullscreen(surface),
            _ => Ok(()),
        }
    }

    pub fn toggle_fullscreen(&mut self) -> Result<()> {
        if !self.init_ok() || !self.shown {
            return Ok(());
        }
        if self.is_fullscreen()? {
            self.exit_fullscreen()
        } else {
            self.enter_fullscreen()
        }
    }

    /// Explicit "reset window": leave fullscreen/maximized, back to video size
    pub fn restore_normal(&mut self) -> Result<()> {
        match self.surface.as_mut() {
            Some(surface) if self.shown => self.window_state.restore_normal(surface),
            _ => Ok(()),
        }
    }

    /// Change opacity by `delta`, clamped to [0, 1]
    pub fn adjust_opacity(&mut self, delta: f64) -> Result<()> {
        let Some(surface) = self.surface.as_mut() else {
            return Ok(());
        };
        if !self.shown {
            return Ok(());
        }

        let alpha = (surface.opacity() + delta).clamp(0.0, 1.0);
        info!("Opacity: {:3.1}%", alpha * 100.0);
        surface.set_opacity(alpha)
    }

    pub fn set_title(&mut self, title: &str) -> Result<()> {
        match self.surface.as_mut() {
            Some(surface) => surface.set_title(title),
            None => Ok(()),
        }
    }

    /// Dispatch one surface notification. Returns whether it was consumed.
    pub fn handle_event(&mut self, event: SurfaceEvent) -> Result<bool> {
        if self.surface.is_none() {
            return Ok(false);
        }

        match event {
            SurfaceEvent::KeyPress { keysym } => {
                let code = self.keymap.normalize_key(keysym);
                Ok(self.forward(code))
            }
            SurfaceEvent::ButtonPress { button, modifiers } => {
                Ok(self.forward(normalize_button(button, modifiers)))
            }
            SurfaceEvent::Motion => {
                self.on_motion()?;
                Ok(true)
            }
            SurfaceEvent::WindowState { changed, new_state } => {
                self.on_window_state_changed(changed, new_state)?;
                Ok(true)
            }
            SurfaceEvent::CloseRequest => {
                // quit on close
                self.handler.process_input(InputCode::Char(b'q'));
                Ok(true)
            }
            SurfaceEvent::Tick => {
                self.on_tick()?;
                Ok(true)
            }
        }
    }

    fn forward(&mut self, code: Option<InputCode>) -> bool {
        match code {
            Some(code) => {
                self.handler.process_input(code);
                true
            }
            None => false,
        }
    }

    fn on_tick(&mut self) -> Result<()> {
        let (Some(surface), Some(cursor)) = (self.surface.as_mut(), self.cursor.as_mut()) else {
            return Ok(());
        };
        if !self.shown {
            return Ok(());
        }

        if cursor.tick() == CursorAction::Hide {
            debug!("Pointer idle, hiding cursor");
            let blank = surface.blank_cursor();
            surface.set_cursor(blank)?;
        }
        Ok(())
    }

    fn on_motion(&mut self) -> Result<()> {
        let (Some(surface), Some(cursor)) = (self.surface.as_mut(), self.cursor.as_mut()) else {
            return Ok(());
        };
        if !self.shown {
            return Ok(());
        }

        if cursor.is_hidden() {
            debug!("Pointer moved, showing cursor");
        }
        if cursor.motion() == CursorAction::Restore {
            let visible = self.visible_cursor.unwrap_or_else(|| surface.current_cursor());
            surface.set_cursor(visible)?;
        }
        Ok(())
    }

    fn on_window_state_changed(&mut self, changed: WindowStateFlags, new_state: WindowStateFlags) -> Result<()> {
        let Some(surface) = self.surface.as_mut() else {
            return Ok(());
        };
        if !self.shown {
            debug!("Ignoring window state change {:?} while hidden", changed);
            return Ok(());
        }
        self.window_state.on_window_state_changed(surface, changed, new_state)
    }
}

impl<S: DisplaySurface + EventSource, H: InputHandler> SurfaceController<S, H> {
    /// Dispatch every pending surface notification. Returns how many were handled.
    pub fn pump_events(&mut self) -> Result<usize> {
        let mut handled = 0;
        loop {
            let event = match self.surface.as_mut() {
                Some(surface) => surface.next_event()?,
                None => None,
            };
            let Some(event) = event else {
                return Ok(handled);
            };
            self.handle_event(event)?;
            handled += 1;
        }
    }
}

/// Skipped when the backend has no native window id for the tool to act on
fn apply_screensaver(
    screensaver: &mut Option<Box<dyn ScreenSaverControl>>,
    handle: Option<u64>,
    setting: ScreenSaverSetting,
) {
    match (screensaver.as_mut(), handle) {
        (Some(screensaver), Some(handle)) => screensaver.apply(setting, handle),
        (Some(_), None) => debug!("No native window handle, screen-saver {} skipped", setting.as_arg()),
        (None, _) => {}
    }
}
