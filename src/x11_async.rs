//! Display socket readiness for the tokio loop
//!
//! A named helper thread blocks in `mio::Poll` on the X11 connection's socket
//! and pings a [`Notify`] whenever it turns readable. The loop then drains
//! decoded events through the surface. Dropping [`X11EventStream`] wakes the
//! helper through a `mio::Waker` so it exits right away.

use anyhow::{Context, Result};
use std::os::unix::io::AsRawFd;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use tokio::sync::Notify;
use tracing::{debug, warn};
use x11rb::connection::Connection;
use x11rb::rust_connection::RustConnection;

const SOCKET: mio::Token = mio::Token(0);
const STOP: mio::Token = mio::Token(1);

pub struct X11EventStream {
    conn: Arc<RustConnection>,
    readable: Arc<Notify>,
    stopping: Arc<AtomicBool>,
    waker: mio::Waker,
    poller: Option<JoinHandle<()>>,
}

impl X11EventStream {
    /// Start watching the connection's socket
    pub fn new(conn: Arc<RustConnection>) -> Result<Self> {
        let mut poll = mio::Poll::new().context("Failed to create display poller")?;
        let fd = conn.stream().as_raw_fd();
        poll.registry()
            .register(&mut mio::unix::SourceFd(&fd), SOCKET, mio::Interest::READABLE)
            .context("Failed to watch the display socket")?;
        let waker = mio::Waker::new(poll.registry(), STOP).context("Failed to create poller waker")?;

        let readable = Arc::new(Notify::new());
        let stopping = Arc::new(AtomicBool::new(false));

        let poller = {
            let readable = readable.clone();
            let stopping = stopping.clone();
            std::thread::Builder::new()
                .name("reel-x11-poll".into())
                .spawn(move || watch_socket(poll, &readable, &stopping))
                .context("Failed to start display poller thread")?
        };

        Ok(Self {
            conn,
            readable,
            stopping,
            waker,
            poller: Some(poller),
        })
    }

    /// Resolves once the display socket had data since the last call.
    ///
    /// x11rb can also pull events off the socket while waiting for a reply,
    /// so callers drain the surface after every wakeup and every batch of
    /// requests, not only after this resolves.
    pub async fn wait_readable(&self) {
        self.readable.notified().await;
    }

    /// Push buffered requests to the server
    pub fn flush(&self) -> Result<()> {
        self.conn.flush().context("Failed to flush display connection")
    }
}

impl Drop for X11EventStream {
    fn drop(&mut self) {
        self.stopping.store(true, Ordering::Release);
        if let Err(e) = self.waker.wake() {
            warn!("Failed to stop display poller: {}", e);
            return;
        }
        if let Some(poller) = self.poller.take() {
            let _ = poller.join();
        }
    }
}

fn watch_socket(mut poll: mio::Poll, readable: &Notify, stopping: &AtomicBool) {
    let mut events = mio::Events::with_capacity(2);
    while !stopping.load(Ordering::Acquire) {
        if let Err(e) = poll.poll(&mut events, None) {
            if e.kind() == std::io::ErrorKind::Interrupted {
                continue;
            }
            warn!("Display socket poll failed: {}", e);
            return;
        }
        if events.iter().any(|event| event.token() == SOCKET) {
            readable.notify_one();
        }
    }
    debug!("Display poller stopped");
}
