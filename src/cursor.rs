//! Pointer auto-hide
//!
//! Counts idle ticks while the window is shown and hides the pointer once the
//! count runs out. Motion always wins: it restores the pointer and restarts
//! the count, whatever state the tracker was in.

/// Idle ticks before the pointer is hidden (at 500 ms per tick)
pub const DEFAULT_HIDE_AFTER_TICKS: u32 = 3;

/// What the caller has to do to the on-screen cursor after an update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorAction {
    None,
    Hide,
    Restore,
}

#[derive(Debug, Clone)]
pub struct CursorIdleTracker {
    hide_after: u32,
    /// Idle ticks left; `None` once the hide action fired
    ticks_remaining: Option<u32>,
}

impl CursorIdleTracker {
    pub fn new(hide_after: u32) -> Self {
        Self {
            hide_after,
            ticks_remaining: Some(hide_after),
        }
    }

    /// One idle tick. Returns [`CursorAction::Hide`] exactly once per idle period.
    pub fn tick(&mut self) -> CursorAction {
        match self.ticks_remaining {
            None => CursorAction::None,
            Some(remaining) => {
                let remaining = remaining.saturating_sub(1);
                if remaining == 0 {
                    self.ticks_remaining = None;
                    CursorAction::Hide
                } else {
                    self.ticks_remaining = Some(remaining);
                    CursorAction::None
                }
            }
        }
    }

    /// Pointer moved: restart the idle period and show the pointer again
    pub fn motion(&mut self) -> CursorAction {
        self.ticks_remaining = Some(self.hide_after);
        CursorAction::Restore
    }

    pub fn is_hidden(&self) -> bool {
        self.ticks_remaining.is_none()
    }

    /// Idle ticks left before hiding, `None` while hidden
    #[cfg(test)]
    pub fn ticks_remaining(&self) -> Option<u32> {
        self.ticks_remaining
    }
}

impl Default for CursorIdleTracker {
    fn default() -> Self {
        Self::new(DEFAULT_HIDE_AFTER_TICKS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hides_on_third_tick_once() {
        let mut tracker = CursorIdleTracker::default();
        assert_eq!(tracker.tick(), CursorAction::None);
        assert_eq!(tracker.tick(), CursorAction::None);
        assert!(!tracker.is_hidden());
        assert_eq!(tracker.tick(), CursorAction::Hide);
        assert!(tracker.is_hidden());

        for _ in 0..10 {
            assert_eq!(tracker.tick(), CursorAction::None);
        }
        assert!(tracker.is_hidden());
    }

    #[test]
    fn test_motion_after_hide_restores_and_resets() {
        let mut tracker = CursorIdleTracker::default();
        for _ in 0..4 {
            tracker.tick();
        }
        assert!(tracker.is_hidden());

        assert_eq!(tracker.motion(), CursorAction::Restore);
        assert!(!tracker.is_hidden());
        assert_eq!(tracker.ticks_remaining(), Some(DEFAULT_HIDE_AFTER_TICKS));

        // a fresh idle period hides again
        tracker.tick();
        tracker.tick();
        assert_eq!(tracker.tick(), CursorAction::Hide);
    }

    #[test]
    fn test_motion_mid_countdown_resets() {
        let mut tracker = CursorIdleTracker::new(5);
        tracker.tick();
        tracker.tick();
        assert_eq!(tracker.ticks_remaining(), Some(3));

        assert_eq!(tracker.motion(), CursorAction::Restore);
        assert_eq!(tracker.ticks_remaining(), Some(5));
    }

    #[test]
    fn test_motion_while_visible_still_restores() {
        let mut tracker = CursorIdleTracker::default();
        assert_eq!(tracker.motion(), CursorAction::Restore);
        assert_eq!(tracker.motion(), CursorAction::Restore);
        assert_eq!(tracker.ticks_remaining(), Some(DEFAULT_HIDE_AFTER_TICKS));
    }

    #[test]
    fn test_zero_ticks_hides_on_first_tick() {
        let mut tracker = CursorIdleTracker::new(0);
        assert_eq!(tracker.tick(), CursorAction::Hide);
        assert_eq!(tracker.tick(), CursorAction::None);
    }
}
