//! Renderer actor: dedicated thread for drawing the status screen.
//!
//! Receives redraw commands from the main loop and draws the frame, the
//! selected tone and the ON/OFF label from a snapshot of the shared
//! state. The snapshot read is opportunistic: if the lock cannot be
//! taken within the bounded wait, the frame is skipped so the render
//! thread never stalls behind the main loop.

use super::messages::RenderCommand;
use crate::canvas::{Align, Canvas};
use crate::freq::format_tone;
use crate::state::{SelectionState, SharedState};
use crossbeam_channel::Receiver;
use std::io::{self, Stdout, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Anchor of the frequency readout; the text's last column lands here.
const TONE_ANCHOR: (u16, u16) = (25, 8);
/// Anchor of the ON/OFF label.
const STATUS_ANCHOR: (u16, u16) = (60, 2);

/// Renderer actor that owns terminal output.
pub struct RendererActor {
    /// Handle to the render thread.
    handle: Option<JoinHandle<()>>,
    /// Flag to signal shutdown.
    shutdown: Arc<AtomicBool>,
}

/// Internal renderer state.
struct Renderer {
    /// The logical screen.
    canvas: Canvas,
    /// Pre-allocated output buffer.
    output: Vec<u8>,
    /// Terminal stdout handle.
    stdout: Stdout,
    /// Shared selection state, read under a bounded wait.
    state: SharedState,
    /// Bound on the snapshot lock acquisition.
    lock_timeout: Duration,
}

impl Renderer {
    fn new(state: SharedState, lock_timeout: Duration) -> Self {
        Self {
            canvas: Canvas::default(),
            output: Vec::with_capacity(4096),
            stdout: io::stdout(),
            state,
            lock_timeout,
        }
    }

    /// Draw one frame from a state snapshot.
    fn draw(canvas: &mut Canvas, snapshot: &SelectionState) {
        canvas.clear();
        canvas.draw_frame();
        canvas.draw_str_aligned(
            TONE_ANCHOR.0,
            TONE_ANCHOR.1,
            Align::Right,
            &format_tone(snapshot.tone()),
        );
        let label = if snapshot.running { "ON" } else { "OFF" };
        canvas.draw_str_aligned(STATUS_ANCHOR.0, STATUS_ANCHOR.1, Align::Right, label);
    }

    /// Perform a render cycle.
    fn render(&mut self) -> io::Result<()> {
        let Some(snapshot) = self.state.snapshot_timeout(self.lock_timeout) else {
            // Writer holds the lock; skip the frame rather than block.
            log::trace!("state lock busy, skipping frame");
            return Ok(());
        };

        Self::draw(&mut self.canvas, &snapshot);

        self.output.clear();
        self.canvas.emit(&mut self.output)?;

        // Flush to terminal in a single write
        self.stdout.write_all(&self.output)?;
        self.stdout.flush()
    }
}

impl RendererActor {
    /// Spawn the renderer actor thread.
    ///
    /// # Panics
    ///
    /// Panics if the OS fails to spawn the render thread.
    pub fn spawn(
        receiver: Receiver<RenderCommand>,
        state: SharedState,
        lock_timeout: Duration,
    ) -> Self {
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = shutdown.clone();

        let handle = thread::Builder::new()
            .name("tonebox-render".to_string())
            .spawn(move || {
                if let Err(e) = Self::run_loop(&receiver, &shutdown_clone, state, lock_timeout) {
                    log::error!("render thread error: {e}");
                }
            })
            .expect("Failed to spawn render thread");

        Self {
            handle: Some(handle),
            shutdown,
        }
    }

    /// Signal the render thread to shutdown.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// Wait for the render thread to finish.
    pub fn join(mut self) {
        self.shutdown();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }

    /// Main render loop.
    fn run_loop(
        receiver: &Receiver<RenderCommand>,
        shutdown: &Arc<AtomicBool>,
        state: SharedState,
        lock_timeout: Duration,
    ) -> io::Result<()> {
        let mut renderer = Renderer::new(state, lock_timeout);

        loop {
            if shutdown.load(Ordering::Relaxed) {
                break;
            }

            // Wait for command with timeout so shutdown stays responsive.
            if let Ok(command) = receiver.recv_timeout(Duration::from_millis(16)) {
                match command {
                    RenderCommand::Redraw => renderer.render()?,
                    RenderCommand::Shutdown => break,
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::bounded;

    #[test]
    fn join_stops_the_thread_without_a_shutdown_command() {
        let (tx, rx) = bounded(4);
        let actor = RendererActor::spawn(rx, SharedState::new(), Duration::from_millis(25));
        // No command ever sent; join alone must bring the thread down.
        actor.join();
        drop(tx);
    }

    #[test]
    fn frame_shows_tone_and_off_label() {
        let mut canvas = Canvas::default();
        let snapshot = SelectionState::new();
        Renderer::draw(&mut canvas, &snapshot);

        // "67.0" right-aligned on the tone anchor.
        let (ax, ay) = TONE_ANCHOR;
        let text: String = (ax - 3..=ax).map(|x| canvas.get(x, ay)).collect();
        assert_eq!(text, "67.0");

        let (sx, sy) = STATUS_ANCHOR;
        let label: String = (sx - 2..=sx).map(|x| canvas.get(x, sy)).collect();
        assert_eq!(label, "OFF");
    }

    #[test]
    fn running_state_shows_on_label() {
        let mut canvas = Canvas::default();
        let mut snapshot = SelectionState::new();
        snapshot.selected = 13;
        snapshot.running = true;
        Renderer::draw(&mut canvas, &snapshot);

        let (ax, ay) = TONE_ANCHOR;
        let text: String = (ax - 4..=ax).map(|x| canvas.get(x, ay)).collect();
        assert_eq!(text, "100.0");

        let (sx, sy) = STATUS_ANCHOR;
        let label: String = (sx - 1..=sx).map(|x| canvas.get(x, sy)).collect();
        assert_eq!(label, "ON");
        // No stale OFF glyph to the left of the label.
        assert_eq!(canvas.get(sx - 2, sy), ' ');
    }

    #[test]
    fn border_survives_every_redraw() {
        let mut canvas = Canvas::default();
        let snapshot = SelectionState::new();
        Renderer::draw(&mut canvas, &snapshot);
        Renderer::draw(&mut canvas, &snapshot);
        assert_eq!(canvas.get(0, 0), '┌');
        assert_eq!(canvas.get(canvas.width() - 1, canvas.height() - 1), '┘');
    }
}
