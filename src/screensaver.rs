//! Screen-saver suppression
//!
//! Suspends the desktop screen-saver while the video window is shown, through
//! `xdg-screensaver suspend|resume <window-id>`. Best effort: a missing tool or
//! a failing command is logged at debug level and otherwise ignored.

use std::process::{Command, Stdio};
use std::time::{Duration, Instant};
use tracing::debug;

use crate::config::ScreenSaverConfig;

/// How often the reaper thread checks a running command
const REAP_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenSaverSetting {
    Suspend,
    Resume,
}

impl ScreenSaverSetting {
    pub fn as_arg(&self) -> &'static str {
        match self {
            Self::Suspend => "suspend",
            Self::Resume => "resume",
        }
    }
}

/// Something that can suspend/resume the screen-saver for a native window
pub trait ScreenSaverControl {
    /// Fire and forget; must not block the caller
    fn apply(&mut self, setting: ScreenSaverSetting, window: u64);
}

/// Runs the `xdg-screensaver` tool (or a configured replacement)
#[derive(Debug, Clone)]
pub struct XdgScreenSaver {
    command: String,
    timeout: Duration,
}

impl XdgScreenSaver {
    pub fn new(command: impl Into<String>, timeout: Duration) -> Self {
        Self {
            command: command.into(),
            timeout,
        }
    }

    pub fn from_config(config: &ScreenSaverConfig) -> Self {
        Self::new(config.command.clone(), Duration::from_millis(config.timeout_ms))
    }
}

impl ScreenSaverControl for XdgScreenSaver {
    fn apply(&mut self, setting: ScreenSaverSetting, window: u64) {
        let spawned = Command::new(&self.command)
            .arg(setting.as_arg())
            .arg(window.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();

        let mut child = match spawned {
            Ok(child) => child,
            Err(e) => {
                debug!("{} {} not run: {}", self.command, setting.as_arg(), e);
                return;
            }
        };

        debug!("{} {} 0x{:x} started", self.command, setting.as_arg(), window);

        // Reap off-thread so the child never becomes a zombie and the event
        // loop never waits on it; give up and kill it after the timeout.
        let timeout = self.timeout;
        let command = self.command.clone();
        std::thread::spawn(move || {
            let started = Instant::now();
            loop {
                match child.try_wait() {
                    Ok(Some(status)) => {
                        if !status.success() {
                            debug!("{} exited with {}", command, status);
                        }
                        return;
                    }
                    Ok(None) if started.elapsed() >= timeout => {
                        debug!("{} still running after {:?}, killing it", command, timeout);
                        let _ = child.kill();
                        let _ = child.wait();
                        return;
                    }
                    Ok(None) => std::thread::sleep(REAP_INTERVAL),
                    Err(e) => {
                        debug!("Failed to wait for {}: {}", command, e);
                        return;
                    }
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setting_args() {
        assert_eq!(ScreenSaverSetting::Suspend.as_arg(), "suspend");
        assert_eq!(ScreenSaverSetting::Resume.as_arg(), "resume");
    }

    #[test]
    fn test_missing_tool_is_ignored() {
        let mut saver = XdgScreenSaver::new("/nonexistent/xdg-screensaver", Duration::from_millis(100));
        saver.apply(ScreenSaverSetting::Suspend, 0x1234);
        saver.apply(ScreenSaverSetting::Resume, 0x1234);
    }
}
