//! reel - video window for a media player
//!
//! Owns the X11 window the video is drawn into: keyboard and pointer input,
//! fullscreen/maximize across hide and show, pointer auto-hide and
//! screen-saver suppression.

mod app;
mod config;
mod controller;
mod cursor;
mod error;
mod input;
mod player;
mod screensaver;
mod surface;
mod window_state;
mod x11_async;

use anyhow::{Context, Result, bail};
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::app::App;
use crate::config::{Config, parse_size};
use crate::controller::SurfaceController;
use crate::player::ActionBridge;
use crate::screensaver::XdgScreenSaver;
use crate::surface::x11::X11Surface;

/// Command line overrides for the config file
#[derive(Debug, Default, PartialEq)]
struct Args {
    fullscreen: bool,
    size: Option<(u32, u32)>,
    title: Option<String>,
}

impl Args {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Self> {
        let mut parsed = Self::default();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--fullscreen" | "-f" => parsed.fullscreen = true,
                "--size" => {
                    let value = args.next().context("--size needs a value, e.g. 1280x720")?;
                    parsed.size = Some(parse_size(&value)?);
                }
                "--title" => {
                    parsed.title = Some(args.next().context("--title needs a value")?);
                }
                other => bail!("Unknown argument {:?}", other),
            }
        }
        Ok(parsed)
    }

    fn apply(self, config: &mut Config) {
        if self.fullscreen {
            config.window.fullscreen = true;
        }
        if let Some((width, height)) = self.size {
            config.window.width = width;
            config.window.height = height;
        }
        if let Some(title) = self.title {
            config.window.title = title;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "reel=debug,info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting reel video window");

    let args = Args::parse(std::env::args().skip(1))?;
    let mut config = Config::load().unwrap_or_else(|e| {
        warn!("Failed to load config, using defaults: {:#}", e);
        Config::default()
    });
    args.apply(&mut config);

    // Setup signal handlers for graceful shutdown
    let (shutdown_tx, shutdown_rx) = tokio::sync::mpsc::channel::<()>(1);

    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        let mut sigterm = signal(SignalKind::terminate())?;
        let mut sigint = signal(SignalKind::interrupt())?;
        let tx = shutdown_tx.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = sigterm.recv() => {
                    info!("Received SIGTERM, shutting down gracefully");
                    let _ = tx.send(()).await;
                }
                _ = sigint.recv() => {
                    info!("Received SIGINT, shutting down gracefully");
                    let _ = tx.send(()).await;
                }
            }
        });
    }

    let surface = match X11Surface::new(&config.window) {
        Ok(surface) => Some(surface),
        Err(e) => {
            warn!("Cannot open video window: {}", e);
            None
        }
    };

    let (bridge, actions) = ActionBridge::new(config.window.opacity_step);
    let mut controller = SurfaceController::new(
        surface,
        bridge,
        config.window.fullscreen,
        config.cursor.hide_after_ticks,
    );
    if config.screensaver.enabled {
        controller = controller.with_screensaver(XdgScreenSaver::from_config(&config.screensaver));
    }

    if !controller.init_ok() {
        warn!("Video window disabled, nothing to show");
        controller.end();
        return Ok(());
    }

    if let Err(e) = controller.set_title(&config.window.title) {
        warn!("Failed to set window title: {}", e);
    }

    let app = App::new(
        controller,
        actions,
        Duration::from_millis(config.cursor.tick_interval_ms),
    )?;

    if let Err(e) = app
        .run(config.window.width, config.window.height, shutdown_rx)
        .await
    {
        error!("Application error: {:#}", e);
        return Err(e);
    }

    info!("reel exiting");
    Ok(())
}
