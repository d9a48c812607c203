//! Playback controller seam
//!
//! The window layer forwards normalized input through [`InputHandler`]. The
//! bundled [`ActionBridge`] turns it into [`ControlAction`]s on a channel so
//! the event loop applies them after the current event has been handled.

use tokio::sync::mpsc;
use tracing::debug;

use crate::input::InputCode;

/// Receives normalized input from the window
pub trait InputHandler {
    fn process_input(&mut self, code: InputCode);
}

/// Keyboard/remote control action
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlAction {
    Quit,
    ToggleFullscreen,
    /// Leave fullscreen/maximized and return to the video size
    NormalSize,
    /// Change window opacity by this amount
    Opacity(f64),
    /// Anything else belongs to the player's transport
    Transport(InputCode),
}

/// Default key bindings
pub fn action_for(code: InputCode, opacity_step: f64) -> ControlAction {
    match code.as_char() {
        Some('q') => ControlAction::Quit,
        Some('f') => ControlAction::ToggleFullscreen,
        Some('1') => ControlAction::NormalSize,
        Some('*') => ControlAction::Opacity(opacity_step),
        Some('/') => ControlAction::Opacity(-opacity_step),
        _ => ControlAction::Transport(code),
    }
}

/// Sends the action for every input on an unbounded channel
pub struct ActionBridge {
    tx: mpsc::UnboundedSender<ControlAction>,
    opacity_step: f64,
}

impl ActionBridge {
    pub fn new(opacity_step: f64) -> (Self, mpsc::UnboundedReceiver<ControlAction>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx, opacity_step }, rx)
    }
}

impl InputHandler for ActionBridge {
    fn process_input(&mut self, code: InputCode) {
        let action = action_for(code, self.opacity_step);
        debug!("Input {} -> {:?}", code, action);
        if self.tx.send(action).is_err() {
            debug!("Action receiver closed, dropping {:?}", action);
        }
    }
}
