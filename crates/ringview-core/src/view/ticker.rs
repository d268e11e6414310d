// src/view/ticker.rs
//! Periodic background task with a stop channel.

use std::io;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{RecvTimeoutError, Sender};
use log::{debug, info};

/// Runs `tick` every `period` on a dedicated thread until stopped.
///
/// Stopping drops the channel sender, which wakes the sleeping thread
/// immediately; dropping the ticker stops it and joins the thread.
pub(crate) struct Ticker {
    name: String,
    stop_tx: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl Ticker {
    /// Spawn the thread. `tick` returns `false` to end the loop on its own.
    pub fn spawn<F>(name: &str, period: Duration, mut tick: F) -> io::Result<Self>
    where
        F: FnMut() -> bool + Send + 'static,
    {
        let (stop_tx, stop_rx) = crossbeam_channel::bounded::<()>(1);

        let handle = thread::Builder::new().name(name.to_owned()).spawn(move || {
            loop {
                if !tick() {
                    debug!("Ticker owner gone, exiting");
                    break;
                }
                match stop_rx.recv_timeout(period) {
                    Err(RecvTimeoutError::Timeout) => continue,
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }
        })?;

        info!("Started '{}' every {:?}", name, period);
        Ok(Self {
            name: name.to_owned(),
            stop_tx: Some(stop_tx),
            handle: Some(handle),
        })
    }

    /// Signal the thread and wait for it, unless called from the thread itself.
    pub fn stop(&mut self) {
        drop(self.stop_tx.take());

        let Some(handle) = self.handle.take() else {
            return;
        };
        if handle.thread().id() == thread::current().id() {
            // Owner dropped from inside a tick; the loop exits on its next wait.
            return;
        }
        if handle.join().is_err() {
            log::error!("Ticker '{}' panicked", self.name);
        }
        info!("Stopped '{}'", self.name);
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.stop();
    }
}
