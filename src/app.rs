//! Event loop for the video window
//!
//! Waits on X11 socket readiness, the cursor tick timer, control actions from
//! the input bridge and the shutdown channel. X11 events are drained through
//! the controller on every iteration, since x11rb can buffer events while
//! waiting for a reply.

use anyhow::{Context, Result};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::controller::SurfaceController;
use crate::error::SurfaceError;
use crate::player::{ActionBridge, ControlAction};
use crate::surface::SurfaceEvent;
use crate::surface::x11::X11Surface;
use crate::x11_async::X11EventStream;

pub type Controller = SurfaceController<X11Surface, ActionBridge>;

pub struct App {
    controller: Controller,
    stream: X11EventStream,
    actions: mpsc::UnboundedReceiver<ControlAction>,
    tick_interval: Duration,
}

impl App {
    /// Must be called inside a tokio runtime with an initialized controller
    pub fn new(
        controller: Controller,
        actions: mpsc::UnboundedReceiver<ControlAction>,
        tick_interval: Duration,
    ) -> Result<Self> {
        let conn = controller
            .surface()
            .map(X11Surface::connection)
            .context("Video window is not initialized")?;
        let stream = X11EventStream::new(conn)?;

        Ok(Self {
            controller,
            stream,
            actions,
            tick_interval,
        })
    }

    /// Show the window at `width`x`height` and run until quit or shutdown.
    /// The window is hidden and the screen-saver restored on the way out.
    pub async fn run(mut self, width: u32, height: u32, mut shutdown: mpsc::Receiver<()>) -> Result<()> {
        self.controller.show(width, height).context("Failed to show video window")?;
        info!("Video window shown at {}x{}", width, height);

        let mut ticks = tokio::time::interval(self.tick_interval);
        ticks.tick().await; // first tick completes immediately

        let result = self.event_loop(&mut ticks, &mut shutdown).await;

        if let Err(e) = self.controller.hide() {
            warn!("Failed to hide video window: {}", e);
        }
        self.controller.end();
        result
    }

    async fn event_loop(
        &mut self,
        ticks: &mut tokio::time::Interval,
        shutdown: &mut mpsc::Receiver<()>,
    ) -> Result<()> {
        loop {
            if let Err(e) = self.stream.flush() {
                warn!("Failed to flush X11 requests: {}", e);
            }

            let pumped = self.controller.pump_events();
            Self::check(pumped.map(|_| ()), "handling X11 events")?;

            tokio::select! {
                () = self.stream.wait_readable() => {}
                _ = ticks.tick() => {
                    let handled = self.controller.handle_event(SurfaceEvent::Tick);
                    Self::check(handled.map(|_| ()), "cursor tick")?;
                }
                Some(action) = self.actions.recv() => {
                    if action == ControlAction::Quit {
                        info!("Quit requested");
                        return Ok(());
                    }
                    self.apply(action)?;
                }
                _ = shutdown.recv() => {
                    info!("Shutdown signal received, closing video window");
                    return Ok(());
                }
            }
        }
    }

    fn apply(&mut self, action: ControlAction) -> Result<()> {
        debug!("Applying {:?}", action);
        match action {
            ControlAction::Quit => Ok(()),
            ControlAction::ToggleFullscreen => {
                Self::check(self.controller.toggle_fullscreen(), "toggling fullscreen")?;
                self.log_window_state();
                Ok(())
            }
            ControlAction::NormalSize => {
                Self::check(self.controller.restore_normal(), "restoring normal size")?;
                self.log_window_state();
                Ok(())
            }
            ControlAction::Opacity(delta) => {
                Self::check(self.controller.adjust_opacity(delta), "changing opacity")
            }
            ControlAction::Transport(code) => {
                info!("Player input {}", code);
                Ok(())
            }
        }
    }

    fn log_window_state(&self) {
        if !self.controller.is_shown() {
            return;
        }
        let state = self.controller.window_state();
        let desired = state.desired();
        match (self.controller.is_fullscreen(), self.controller.is_maximized()) {
            (Ok(fullscreen), Ok(maximized)) => debug!(
                "Window state: fullscreen={} maximized={} video={}x{} resize_pending={}",
                fullscreen,
                maximized,
                desired.width,
                desired.height,
                state.resize_pending()
            ),
            (Err(e), _) | (_, Err(e)) => debug!("Window state unavailable: {}", e),
        }
    }

    /// A lost connection ends the loop; anything else is logged and skipped
    fn check(result: crate::error::Result<()>, what: &str) -> Result<()> {
        match result {
            Ok(()) => Ok(()),
            Err(SurfaceError::Connection(e)) => {
                Err(e).with_context(|| format!("X11 connection lost while {}", what))
            }
            Err(e) => {
                warn!("Error while {}: {}", what, e);
                Ok(())
            }
        }
    }
}
