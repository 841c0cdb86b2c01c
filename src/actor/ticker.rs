//! Tick producer: dedicated thread for periodic timer events.
//!
//! Feeds [`Event::Tick`] into the same bounded queue the input producer
//! uses. Ticks are sent non-blocking: a full queue drops the tick rather
//! than stalling the timer. The main loop treats ticks as a reserved
//! no-op, and the application leaves this producer unarmed by default.

use super::messages::Event;
use crossbeam_channel::{Sender, TrySendError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Ticker actor that enqueues periodic tick events.
pub struct TickerActor {
    /// Handle to the ticker thread.
    handle: Option<JoinHandle<()>>,
    /// Flag to signal shutdown.
    shutdown: Arc<AtomicBool>,
}

impl TickerActor {
    /// Spawn a new ticker actor with the given interval.
    ///
    /// # Panics
    ///
    /// Panics if the OS fails to spawn the ticker thread.
    pub fn spawn(sender: Sender<Event>, interval: Duration) -> Self {
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = shutdown.clone();

        let handle = thread::Builder::new()
            .name("tonebox-ticker".to_string())
            .spawn(move || {
                Self::run_loop(&sender, &shutdown_clone, interval);
            })
            .expect("Failed to spawn ticker thread");

        Self {
            handle: Some(handle),
            shutdown,
        }
    }

    /// Signal the ticker to shutdown.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// Wait for the ticker thread to finish.
    pub fn join(mut self) {
        self.shutdown();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    /// Main ticker loop.
    fn run_loop(sender: &Sender<Event>, shutdown: &Arc<AtomicBool>, interval: Duration) {
        let start = Instant::now();
        let mut next_tick = start + interval;

        loop {
            if shutdown.load(Ordering::Relaxed) {
                break;
            }

            let now = Instant::now();
            if now >= next_tick {
                // Non-blocking send - if the queue is full, skip this tick
                // (the consumer is busy, prevent queue buildup)
                match sender.try_send(Event::Tick) {
                    Ok(()) | Err(TrySendError::Full(_)) => {}
                    Err(TrySendError::Disconnected(_)) => break,
                }

                next_tick += interval;

                // Handle case where we're behind (catch up without queuing)
                if next_tick < now {
                    next_tick = now + interval;
                }
            } else {
                // Sleep until next tick
                let sleep_duration = next_tick - now;
                thread::sleep(sleep_duration.min(Duration::from_millis(1)));
            }
        }
    }
}

impl Drop for TickerActor {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::bounded;

    #[test]
    fn armed_ticker_enqueues_ticks() {
        let (tx, rx) = bounded(8);
        let ticker = TickerActor::spawn(tx, Duration::from_millis(10));

        let first = rx.recv_timeout(Duration::from_millis(200));
        assert_eq!(first, Ok(Event::Tick));
        let second = rx.recv_timeout(Duration::from_millis(200));
        assert_eq!(second, Ok(Event::Tick));

        ticker.join();
    }

    #[test]
    fn shutdown_stops_the_ticker() {
        let (tx, rx) = bounded(8);
        let ticker = TickerActor::spawn(tx, Duration::from_millis(5));
        ticker.join();

        // Whatever was queued before the join drains, then nothing more.
        while rx.try_recv().is_ok() {}
        thread::sleep(Duration::from_millis(20));
        assert!(rx.try_recv().is_err());
    }
}
