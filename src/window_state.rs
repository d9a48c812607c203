//! Window state reconciliation
//!
//! Keeps the window at the video's desired size whenever the window manager
//! allows it. Only intent is stored here (desired size, fullscreen/maximized
//! wishes, a pending resize); the actual fullscreen and maximized state is
//! always queried from the surface.
//!
//! Every function taking a surface assumes it is currently shown; the
//! controller enforces that before calling in.

use tracing::debug;

use crate::error::Result;
use crate::surface::{DisplaySurface, WindowStateFlags};

/// Window size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Default)]
pub struct WindowState {
    /// Size the playback source wants
    desired: Size,
    /// Restored on the next show
    fullscreen_requested: bool,
    maximized_requested: bool,
    /// A resize is owed once the window leaves fullscreen/maximized.
    /// Only true while the window is in one of those states.
    resize_pending: bool,
}

impl WindowState {
    pub fn new(fullscreen_requested: bool) -> Self {
        Self {
            fullscreen_requested,
            ..Self::default()
        }
    }

    pub fn desired(&self) -> Size {
        self.desired
    }

    pub fn fullscreen_requested(&self) -> bool {
        self.fullscreen_requested
    }

    pub fn maximized_requested(&self) -> bool {
        self.maximized_requested
    }

    pub fn resize_pending(&self) -> bool {
        self.resize_pending
    }

    /// Record a new desired size without touching the window
    pub fn set_desired(&mut self, width: u32, height: u32) {
        self.desired = Size::new(width, height);
    }

    /// Resize to `width`x`height` now, or once the window leaves
    /// fullscreen/maximized if it is in either
    pub fn request_resize<S: DisplaySurface>(&mut self, surface: &mut S, width: u32, height: u32) -> Result<()> {
        self.set_desired(width, height);

        if is_obstructed(surface)? {
            debug!("Window fullscreen or maximized, deferring resize to {}x{}", width, height);
            self.resize_pending = true;
            return Ok(());
        }

        surface.resize(width, height)
    }

    /// Apply a deferred resize if one is owed and nothing obstructs it.
    /// Returns whether a resize was issued.
    pub fn resize_if_needed<S: DisplaySurface>(&mut self, surface: &mut S) -> Result<bool> {
        if !self.resize_pending || is_obstructed(surface)? {
            return Ok(false);
        }

        debug!("Applying deferred resize to {}x{}", self.desired.width, self.desired.height);
        surface.resize(self.desired.width, self.desired.height)?;
        self.resize_pending = false;
        Ok(true)
    }

    /// Window manager reported a state change. Leaving maximized and leaving
    /// fullscreen in the same notification still yields a single resize.
    pub fn on_window_state_changed<S: DisplaySurface>(
        &mut self,
        surface: &mut S,
        changed: WindowStateFlags,
        new_state: WindowStateFlags,
    ) -> Result<()> {
        let left = |flag: WindowStateFlags| changed.contains(flag) && !new_state.contains(flag);

        if left(WindowStateFlags::MAXIMIZED) || left(WindowStateFlags::FULLSCREEN) {
            self.resize_if_needed(surface)?;
        }
        Ok(())
    }

    /// Fullscreen without a title bar
    pub fn enter_fullscreen<S: DisplaySurface>(&mut self, surface: &mut S) -> Result<()> {
        surface.set_fullscreen(true)?;
        surface.set_titlebar_visible(false)
    }

    pub fn exit_fullscreen<S: DisplaySurface>(&mut self, surface: &mut S) -> Result<()> {
        surface.set_fullscreen(false)?;
        surface.set_titlebar_visible(true)
    }

    /// Leave fullscreen and maximized and snap back to the desired size.
    /// Both obstructions are cleared here, so nothing stays pending.
    pub fn restore_normal<S: DisplaySurface>(&mut self, surface: &mut S) -> Result<()> {
        self.exit_fullscreen(surface)?;
        surface.set_maximized(false)?;
        surface.resize(self.desired.width, self.desired.height)?;
        self.resize_pending = false;
        Ok(())
    }

    /// Re-apply persisted fullscreen/maximized intent. Either one obstructs
    /// the resize issued just before, so it becomes pending.
    pub fn restore_intent<S: DisplaySurface>(&mut self, surface: &mut S) -> Result<()> {
        if self.fullscreen_requested {
            self.enter_fullscreen(surface)?;
            self.resize_pending = true;
        } else {
            surface.set_titlebar_visible(true)?;
        }

        if self.maximized_requested {
            surface.set_maximized(true)?;
            self.resize_pending = true;
        }
        Ok(())
    }

    /// Remember the current fullscreen/maximized state as intent, then leave
    /// both so the window is in its baseline state when hidden
    pub fn capture_intent<S: DisplaySurface>(&mut self, surface: &mut S) -> Result<()> {
        self.fullscreen_requested = surface.is_fullscreen()?;
        if self.fullscreen_requested {
            self.exit_fullscreen(surface)?;
        }

        self.maximized_requested = surface.is_maximized()?;
        if self.maximized_requested {
            surface.set_maximized(false)?;
        }

        self.resize_pending = false;
        Ok(())
    }
}

fn is_obstructed<S: DisplaySurface>(surface: &S) -> Result<bool> {
    let mut state = WindowStateFlags::empty();
    state.set(WindowStateFlags::FULLSCREEN, surface.is_fullscreen()?);
    state.set(WindowStateFlags::MAXIMIZED, surface.is_maximized()?);
    Ok(state.is_obstructed())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::recording::{Call, RecordingSurface};

    fn shown_surface() -> RecordingSurface {
        let mut surface = RecordingSurface::new();
        surface.show().unwrap();
        surface.take_calls();
        surface
    }

    fn resizes(calls: &[Call]) -> Vec<(u32, u32)> {
        calls
            .iter()
            .filter_map(|call| match call {
                Call::Resize(w, h) => Some((*w, *h)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_request_resize_in_normal_state_is_immediate() {
        let mut surface = shown_surface();
        let mut state = WindowState::new(false);

        state.request_resize(&mut surface, 640, 480).unwrap();
        assert_eq!(resizes(&surface.take_calls()), vec![(640, 480)]);
        assert!(!state.resize_pending());
        assert_eq!(state.desired(), Size::new(640, 480));
    }

    #[test]
    fn test_request_resize_while_fullscreen_is_deferred() {
        let mut surface = shown_surface();
        let mut state = WindowState::new(false);
        state.enter_fullscreen(&mut surface).unwrap();
        surface.take_calls();

        state.request_resize(&mut surface, 640, 480).unwrap();
        state.request_resize(&mut surface, 1280, 720).unwrap();
        assert!(resizes(&surface.take_calls()).is_empty());
        assert!(state.resize_pending());

        let (changed, new_state) = surface.wm_set_fullscreen(false);
        state.on_window_state_changed(&mut surface, changed, new_state).unwrap();
        assert_eq!(resizes(&surface.take_calls()), vec![(1280, 720)]);
        assert!(!state.resize_pending());
    }

    #[test]
    fn test_deferred_resize_waits_for_all_obstructions() {
        let mut surface = shown_surface();
        let mut state = WindowState::new(false);
        surface.wm_set_fullscreen(true);
        surface.wm_set_maximized(true);

        state.request_resize(&mut surface, 800, 600).unwrap();
        assert!(state.resize_pending());

        let (changed, new_state) = surface.wm_set_fullscreen(false);
        state.on_window_state_changed(&mut surface, changed, new_state).unwrap();
        assert!(resizes(&surface.take_calls()).is_empty());
        assert!(state.resize_pending());

        let (changed, new_state) = surface.wm_set_maximized(false);
        state.on_window_state_changed(&mut surface, changed, new_state).unwrap();
        assert_eq!(resizes(&surface.take_calls()), vec![(800, 600)]);
        assert!(!state.resize_pending());
    }

    #[test]
    fn test_both_obstructions_clearing_together_resize_once() {
        let mut surface = shown_surface();
        let mut state = WindowState::new(false);
        surface.wm_set_fullscreen(true);
        surface.wm_set_maximized(true);
        state.request_resize(&mut surface, 800, 600).unwrap();

        surface.wm_set_fullscreen(false);
        surface.wm_set_maximized(false);
        let both = WindowStateFlags::FULLSCREEN | WindowStateFlags::MAXIMIZED;
        state
            .on_window_state_changed(&mut surface, both, WindowStateFlags::empty())
            .unwrap();
        assert_eq!(resizes(&surface.take_calls()), vec![(800, 600)]);
    }

    #[test]
    fn test_entering_obstruction_does_not_resize() {
        let mut surface = shown_surface();
        let mut state = WindowState::new(false);
        surface.wm_set_maximized(true);
        state.request_resize(&mut surface, 800, 600).unwrap();

        let (changed, new_state) = surface.wm_set_fullscreen(true);
        state.on_window_state_changed(&mut surface, changed, new_state).unwrap();
        assert!(resizes(&surface.take_calls()).is_empty());
        assert!(state.resize_pending());
    }

    #[test]
    fn test_state_change_without_pending_resize_is_noop() {
        let mut surface = shown_surface();
        let mut state = WindowState::new(false);
        surface.wm_set_maximized(true);

        let (changed, new_state) = surface.wm_set_maximized(false);
        state.on_window_state_changed(&mut surface, changed, new_state).unwrap();
        assert!(resizes(&surface.take_calls()).is_empty());
    }

    #[test]
    fn test_restore_normal_resizes_once_and_clears_pending() {
        let mut surface = shown_surface();
        let mut state = WindowState::new(false);
        surface.wm_set_fullscreen(true);
        surface.wm_set_maximized(true);
        state.request_resize(&mut surface, 720, 576).unwrap();
        assert!(state.resize_pending());

        state.restore_normal(&mut surface).unwrap();
        let calls = surface.take_calls();
        assert_eq!(resizes(&calls), vec![(720, 576)]);
        assert!(calls.contains(&Call::SetFullscreen(false)));
        assert!(calls.contains(&Call::SetMaximized(false)));
        assert!(calls.contains(&Call::SetTitlebarVisible(true)));
        assert!(!state.resize_pending());

        // the window manager's follow-up notification must not resize again
        let both = WindowStateFlags::FULLSCREEN | WindowStateFlags::MAXIMIZED;
        state
            .on_window_state_changed(&mut surface, both, WindowStateFlags::empty())
            .unwrap();
        assert!(resizes(&surface.take_calls()).is_empty());
    }

    #[test]
    fn test_fullscreen_toggles_titlebar() {
        let mut surface = shown_surface();
        let mut state = WindowState::new(false);

        state.enter_fullscreen(&mut surface).unwrap();
        assert_eq!(
            surface.take_calls(),
            vec![Call::SetFullscreen(true), Call::SetTitlebarVisible(false)]
        );

        state.exit_fullscreen(&mut surface).unwrap();
        assert_eq!(
            surface.take_calls(),
            vec![Call::SetFullscreen(false), Call::SetTitlebarVisible(true)]
        );
    }
}
