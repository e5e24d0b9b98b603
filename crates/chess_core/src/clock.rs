//! Periodic clock ticker for timed games.
//!
//! The ticker never touches game state. It runs on its own thread and posts
//! [`Command::Tick`] into the game's command channel at a fixed rate; the
//! thread owning the game applies the tick. Stopping is idempotent and joins
//! the thread, so no tick is produced after [`Clock::stop`] returns.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::trace;

use crate::game::Command;

#[derive(Debug)]
pub struct Clock {
    /// Shared stop flag
    stopped: Arc<AtomicBool>,
    /// Dropping this wakes the ticker immediately
    wake: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl Clock {
    /// Start ticking every `interval`, first tick one interval from now.
    pub fn start(interval: Duration, commands: Sender<Command>) -> Self {
        let stopped = Arc::new(AtomicBool::new(false));
        let (wake, wait) = mpsc::channel::<()>();
        let flag = Arc::clone(&stopped);

        let handle = thread::spawn(move || {
            let mut next = Instant::now() + interval;
            loop {
                let timeout = next.saturating_duration_since(Instant::now());
                match wait.recv_timeout(timeout) {
                    Err(RecvTimeoutError::Timeout) => {}
                    // Woken or the owner went away.
                    _ => break,
                }
                if flag.load(Ordering::SeqCst) {
                    break;
                }
                trace!("clock tick");
                if commands.send(Command::Tick).is_err() {
                    break;
                }
                next += interval;
            }
        });

        Self {
            stopped,
            wake: Some(wake),
            handle: Some(handle),
        }
    }

    /// Cancel the ticker. Returns `true` only for the call that actually
    /// stopped it.
    pub fn stop(&mut self) -> bool {
        if self.stopped.swap(true, Ordering::SeqCst) {
            return false;
        }
        self.wake.take();
        if let Some(handle) = self.handle.take() {
            // A panicking ticker has nothing left to clean up.
            let _ = handle.join();
        }
        true
    }

    #[inline]
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Relaxed)
    }
}

impl Drop for Clock {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod clock_tests;
