//! Input producer: dedicated thread for polling terminal key events.
//!
//! Converts raw crossterm key events into queued [`Event::Key`] messages.
//! No phase filtering happens here; press-only policy is the main loop's
//! decision. Enqueueing blocks when the queue is full, so a burst is
//! back-pressured rather than dropped.

use super::messages::{Event, InputPhase, Key};
use crossbeam_channel::Sender;
use crossterm::event::{self, Event as TermEvent, KeyCode, KeyEventKind};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Input actor that polls terminal events.
pub struct InputActor {
    /// Handle to the input thread.
    handle: Option<JoinHandle<()>>,
    /// Flag to signal shutdown.
    shutdown: Arc<AtomicBool>,
}

impl InputActor {
    /// Spawn the input actor thread.
    ///
    /// `poll_timeout` bounds how long the thread waits for a terminal
    /// event before re-checking the shutdown flag.
    ///
    /// # Panics
    ///
    /// Panics if the OS fails to spawn the input thread.
    pub fn spawn(sender: Sender<Event>, poll_timeout: Duration) -> Self {
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = shutdown.clone();

        let handle = thread::Builder::new()
            .name("tonebox-input".to_string())
            .spawn(move || {
                Self::run_loop(&sender, &shutdown_clone, poll_timeout);
            })
            .expect("Failed to spawn input thread");

        Self {
            handle: Some(handle),
            shutdown,
        }
    }

    /// Signal the input thread to shutdown.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// Wait for the input thread to finish.
    pub fn join(mut self) {
        self.shutdown();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    /// Main input polling loop.
    fn run_loop(sender: &Sender<Event>, shutdown: &Arc<AtomicBool>, poll_timeout: Duration) {
        loop {
            if shutdown.load(Ordering::Relaxed) {
                break;
            }

            match event::poll(poll_timeout) {
                Ok(true) => match event::read() {
                    Ok(term_event) => {
                        if let Some(ev) = Self::convert_event(&term_event) {
                            // Blocking send: back-pressure, never drop.
                            if sender.send(ev).is_err() {
                                // Receiver dropped, exit
                                break;
                            }
                        }
                    }
                    Err(e) => log::error!("reading terminal event failed: {e}"),
                },
                Ok(false) => {
                    // No event, continue loop (will check shutdown)
                }
                Err(e) => log::error!("polling terminal events failed: {e}"),
            }
        }
    }

    /// Map a terminal event to a queued key event.
    fn convert_event(term_event: &TermEvent) -> Option<Event> {
        let TermEvent::Key(key_event) = term_event else {
            return None;
        };
        let phase = match key_event.kind {
            KeyEventKind::Press => InputPhase::Press,
            KeyEventKind::Release => InputPhase::Release,
            KeyEventKind::Repeat => InputPhase::Repeat,
        };
        let key = Self::convert_key_code(key_event.code)?;
        Some(Event::Key { key, phase })
    }

    /// Map crossterm key codes onto the device's logical keys.
    fn convert_key_code(code: KeyCode) -> Option<Key> {
        Some(match code {
            KeyCode::Up => Key::Up,
            KeyCode::Down => Key::Down,
            KeyCode::Left => Key::Left,
            KeyCode::Right => Key::Right,
            KeyCode::Enter => Key::Ok,
            KeyCode::Esc => Key::Back,
            _ => return None, // Ignore other key codes
        })
    }
}

impl Drop for InputActor {
    fn drop(&mut self) {
        self.shutdown();
    }
}
