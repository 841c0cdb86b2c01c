//! Application: the event-consuming main loop and terminal lifecycle.
//!
//! [`Session`] is the state machine proper: it owns the shared selection
//! state and the generator handle, and applies one transition per event.
//! [`App`] wraps a session with the terminal bootstrap, the bounded event
//! queue and the producer/renderer threads, and restores everything in
//! reverse order on every exit path.

use crate::actor::{Event, InputActor, InputPhase, Key, RenderCommand, RendererActor, TickerActor};
use crate::generator::{GeneratorError, ToneGenerator};
use crate::state::SharedState;
use crossbeam_channel::{bounded, never, Receiver, RecvTimeoutError, Sender};
use crossterm::{
    cursor, execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::io::{self, Write};
use std::time::Duration;
use thiserror::Error;

/// Idle base frequency handed to the generator at startup, in Hz.
const BASE_HZ: f32 = 500.0;

/// A startup failure. Fatal: the binary maps this to a distinct
/// non-zero exit code and never retries.
#[derive(Debug, Error)]
pub enum SetupError {
    /// Raw mode, alternate screen or cursor control failed.
    #[error("terminal setup failed: {0}")]
    Terminal(#[from] io::Error),
    /// The generator could not be configured.
    #[error("generator setup failed: {0}")]
    Generator(#[from] GeneratorError),
}

/// Configuration for the application loop.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Capacity of the bounded event queue.
    pub queue_capacity: usize,
    /// How long the main loop waits for an event before redrawing anyway.
    pub poll_timeout: Duration,
    /// Input thread's terminal poll timeout.
    pub input_poll_timeout: Duration,
    /// Bound on the renderer's state lock acquisition.
    pub render_lock_timeout: Duration,
    /// Interval of the tick producer; `None` leaves it unarmed.
    pub tick_interval: Option<Duration>,
    /// Whether to use the alternate screen buffer.
    pub alternate_screen: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 8,
            poll_timeout: Duration::from_millis(100),
            input_poll_timeout: Duration::from_millis(10),
            render_lock_timeout: Duration::from_millis(25),
            // Present in the design, unarmed in the product.
            tick_interval: None,
            alternate_screen: true,
        }
    }
}

/// Scoped terminal modes: acquired stepwise at startup, restored in
/// reverse on drop. Construction failure restores exactly the modes
/// already acquired, so a fatal-startup exit never leaves the terminal
/// raw or on the alternate screen.
struct TerminalGuard {
    raw_mode: bool,
    alternate_screen: bool,
    cursor_hidden: bool,
}

impl TerminalGuard {
    fn acquire(alternate_screen: bool) -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let mut guard = Self {
            raw_mode: true,
            alternate_screen: false,
            cursor_hidden: false,
        };
        let mut stdout = io::stdout();
        if alternate_screen {
            execute!(stdout, EnterAlternateScreen)?;
            guard.alternate_screen = true;
        }
        execute!(stdout, cursor::Hide)?;
        guard.cursor_hidden = true;
        Ok(guard)
    }

    /// Emit the restore sequences for the modes actually acquired.
    fn restore<W: Write>(&self, out: &mut W) {
        if self.cursor_hidden {
            let _ = execute!(out, cursor::Show);
        }
        if self.alternate_screen {
            let _ = execute!(out, LeaveAlternateScreen);
        }
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        self.restore(&mut io::stdout());
        if self.raw_mode {
            let _ = terminal::disable_raw_mode();
        }
    }
}

/// The state machine: sole writer of the selection state, sole owner of
/// the generator handle.
pub struct Session {
    state: SharedState,
    generator: Box<dyn ToneGenerator>,
    processing: bool,
}

impl Session {
    /// Create a session over the given state and generator.
    pub fn new(state: SharedState, generator: Box<dyn ToneGenerator>) -> Self {
        Self {
            state,
            generator,
            processing: true,
        }
    }

    /// Whether the loop should keep running.
    pub const fn is_processing(&self) -> bool {
        self.processing
    }

    /// The shared state handle this session writes.
    pub const fn state(&self) -> &SharedState {
        &self.state
    }

    /// Apply one event. Only key presses trigger transitions; releases
    /// and repeats pass through untouched, as does the reserved tick.
    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key {
                key,
                phase: InputPhase::Press,
            } => self.handle_key(key),
            Event::Key { .. } => {}
            Event::Tick => self.handle_tick(),
        }
    }

    fn handle_key(&mut self, key: Key) {
        let mut state = self.state.lock();
        match key {
            Key::Up => state.select_next(),
            Key::Down => state.select_prev(),
            Key::Right => state.select_last(),
            Key::Left => state.select_first(),
            Key::Ok => {
                if state.running {
                    match self.generator.stop() {
                        Ok(()) => state.running = false,
                        // Do not assume the tone died; keep the flag.
                        Err(e) => log::error!("stopping tone generator failed: {e}"),
                    }
                } else {
                    let tone = state.tone();
                    match self.generator.start(tone, state.duty) {
                        Ok(()) => state.running = true,
                        Err(e) => log::error!("starting tone generator failed: {e}"),
                    }
                }
            }
            Key::Back => self.processing = false,
        }
    }

    /// Reserved extension point; deliberately a no-op.
    fn handle_tick(&mut self) {}

    /// Silence the generator if it is still sounding.
    fn shutdown(&mut self) {
        let mut state = self.state.lock();
        if state.running {
            match self.generator.stop() {
                Ok(()) => state.running = false,
                Err(e) => log::error!("stopping tone generator failed: {e}"),
            }
        }
    }
}

/// The application: terminal, actors and the main loop.
pub struct App {
    config: AppConfig,
    events_rx: Receiver<Event>,
    render_tx: Sender<RenderCommand>,
    input_actor: Option<InputActor>,
    renderer_actor: Option<RendererActor>,
    ticker: Option<TickerActor>,
    session: Session,
    /// Restores terminal modes when the application drops.
    terminal: TerminalGuard,
}

impl App {
    /// Create an application with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if generator configuration or terminal setup
    /// fails; the terminal guard restores any modes acquired before the
    /// failing step.
    pub fn new(generator: Box<dyn ToneGenerator>) -> Result<Self, SetupError> {
        Self::with_config(generator, AppConfig::default())
    }

    /// Create an application with custom configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if generator configuration or terminal setup fails.
    pub fn with_config(
        mut generator: Box<dyn ToneGenerator>,
        config: AppConfig,
    ) -> Result<Self, SetupError> {
        generator.configure(BASE_HZ)?;

        let terminal = TerminalGuard::acquire(config.alternate_screen)?;

        // Create channels
        let (event_tx, events_rx) = bounded::<Event>(config.queue_capacity);
        let (render_tx, render_rx) = bounded::<RenderCommand>(4);

        let state = SharedState::new();

        // Spawn actors
        let input_actor = InputActor::spawn(event_tx.clone(), config.input_poll_timeout);
        let renderer_actor =
            RendererActor::spawn(render_rx, state.clone(), config.render_lock_timeout);
        let ticker = config
            .tick_interval
            .map(|interval| TickerActor::spawn(event_tx, interval));

        Ok(Self {
            config,
            events_rx,
            render_tx,
            input_actor: Some(input_actor),
            renderer_actor: Some(renderer_actor),
            ticker,
            session: Session::new(state, generator),
            terminal,
        })
    }

    /// Run the main loop until the Back key is pressed.
    ///
    /// Every iteration processes at most one event (or a poll timeout)
    /// and then requests a redraw, so the screen refreshes even when the
    /// pad is idle.
    pub fn run(&mut self) {
        while self.session.is_processing() {
            match self.events_rx.recv_timeout(self.config.poll_timeout) {
                Ok(event) => self.session.handle_event(event),
                Err(RecvTimeoutError::Timeout) => {
                    log::debug!("event queue: poll timeout");
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }

            // A full render channel means a redraw is already pending.
            let _ = self.render_tx.try_send(RenderCommand::Redraw);
        }
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.session.shutdown();

        // Drop the queue first: a producer parked on a blocking send
        // into a full queue only unparks when the channel disconnects.
        drop(std::mem::replace(&mut self.events_rx, never()));

        // Stop actors
        if let Some(actor) = self.input_actor.take() {
            actor.join();
        }
        if let Some(ticker) = self.ticker.take() {
            ticker.join();
        }
        let _ = self.render_tx.send(RenderCommand::Shutdown);
        if let Some(actor) = self.renderer_actor.take() {
            actor.join();
        }

        // Terminal modes are restored when the guard field drops.
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::freq::LAST_INDEX;
    use crate::state::SelectionState;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::thread;

    #[derive(Default)]
    struct CallLog {
        starts: Vec<(f32, f32)>,
        stops: u32,
        fail_start: bool,
    }

    struct MockGenerator {
        log: Rc<RefCell<CallLog>>,
        running: bool,
    }

    impl ToneGenerator for MockGenerator {
        fn configure(&mut self, _base_hz: f32) -> Result<(), GeneratorError> {
            Ok(())
        }

        fn start(&mut self, frequency: f32, duty: f32) -> Result<(), GeneratorError> {
            assert!(!self.running, "start issued while already running");
            if self.log.borrow().fail_start {
                return Err(GeneratorError::NoDevice);
            }
            self.log.borrow_mut().starts.push((frequency, duty));
            self.running = true;
            Ok(())
        }

        fn stop(&mut self) -> Result<(), GeneratorError> {
            assert!(self.running, "stop issued while already stopped");
            self.log.borrow_mut().stops += 1;
            self.running = false;
            Ok(())
        }

        fn is_running(&self) -> bool {
            self.running
        }
    }

    fn session() -> (Session, Rc<RefCell<CallLog>>) {
        let log = Rc::new(RefCell::new(CallLog::default()));
        let generator = MockGenerator {
            log: log.clone(),
            running: false,
        };
        (
            Session::new(SharedState::new(), Box::new(generator)),
            log,
        )
    }

    fn press(key: Key) -> Event {
        Event::Key {
            key,
            phase: InputPhase::Press,
        }
    }

    fn snapshot(session: &Session) -> SelectionState {
        *session.state().lock()
    }

    #[test]
    fn confirm_toggles_and_balances_actor_calls() {
        let (mut session, log) = session();

        session.handle_event(press(Key::Ok));
        assert!(snapshot(&session).running);
        session.handle_event(press(Key::Ok));
        assert!(!snapshot(&session).running);
        session.handle_event(press(Key::Ok));
        session.handle_event(press(Key::Ok));

        let log = log.borrow();
        assert_eq!(log.starts.len(), 2);
        assert_eq!(log.stops, 2);
    }

    #[test]
    fn movement_issues_no_actor_calls_while_running() {
        let (mut session, log) = session();
        session.handle_event(press(Key::Ok));

        for key in [Key::Up, Key::Down, Key::Left, Key::Right, Key::Up] {
            session.handle_event(press(key));
        }

        assert!(snapshot(&session).running);
        let log = log.borrow();
        assert_eq!(log.starts.len(), 1);
        assert_eq!(log.stops, 0);
    }

    #[test]
    fn movement_keys_drive_the_cursor() {
        let (mut session, _log) = session();

        session.handle_event(press(Key::Right));
        assert_eq!(snapshot(&session).selected, LAST_INDEX);
        session.handle_event(press(Key::Up));
        assert_eq!(snapshot(&session).selected, 0);
        session.handle_event(press(Key::Down));
        assert_eq!(snapshot(&session).selected, LAST_INDEX);
        session.handle_event(press(Key::Left));
        assert_eq!(snapshot(&session).selected, 0);
    }

    #[test]
    fn releases_repeats_and_ticks_change_nothing() {
        let (mut session, log) = session();
        let before = snapshot(&session);

        session.handle_event(Event::Key {
            key: Key::Ok,
            phase: InputPhase::Release,
        });
        session.handle_event(Event::Key {
            key: Key::Up,
            phase: InputPhase::Repeat,
        });
        session.handle_event(Event::Tick);

        assert_eq!(snapshot(&session), before);
        assert!(session.is_processing());
        assert!(log.borrow().starts.is_empty());
    }

    #[test]
    fn failed_start_leaves_generator_stopped() {
        let (mut session, log) = session();
        log.borrow_mut().fail_start = true;

        session.handle_event(press(Key::Ok));

        assert!(!snapshot(&session).running);
        assert!(log.borrow().starts.is_empty());
        // A later successful press still works.
        log.borrow_mut().fail_start = false;
        session.handle_event(press(Key::Ok));
        assert!(snapshot(&session).running);
    }

    #[test]
    fn back_key_ends_processing_after_cleanup() {
        let (mut session, log) = session();
        session.handle_event(press(Key::Ok));
        session.handle_event(press(Key::Back));
        assert!(!session.is_processing());

        session.shutdown();
        assert!(!snapshot(&session).running);
        assert_eq!(log.borrow().stops, 1);
    }

    #[test]
    fn end_to_end_browse_toggle_and_exit() {
        let (mut session, log) = session();
        assert_eq!(snapshot(&session).selected, 0);
        assert_eq!(crate::freq::format_tone(snapshot(&session).tone()), "67.0");

        for _ in 0..3 {
            session.handle_event(press(Key::Up));
        }
        let state = snapshot(&session);
        assert_eq!(state.selected, 3);
        assert_eq!(crate::freq::format_tone(state.tone()), "71.9");
        assert!(!state.running);

        session.handle_event(press(Key::Ok));
        assert!(snapshot(&session).running);
        assert_eq!(log.borrow().starts, vec![(71.9, 0.5)]);

        session.handle_event(press(Key::Ok));
        assert!(!snapshot(&session).running);
        assert_eq!(log.borrow().stops, 1);

        session.handle_event(press(Key::Back));
        assert!(!session.is_processing());
    }

    #[test]
    fn queue_applies_back_pressure_at_capacity() {
        let (tx, rx) = bounded::<Event>(8);
        for _ in 0..8 {
            tx.send(press(Key::Up)).expect("queue below capacity");
        }
        // The 9th does not fit.
        assert!(tx.try_send(press(Key::Up)).is_err());

        // A blocking producer parks until the consumer drains one slot.
        let producer = thread::spawn(move || tx.send(press(Key::Down)).is_ok());
        thread::sleep(Duration::from_millis(20));
        rx.recv().expect("queued event");
        assert!(producer.join().expect("producer thread"));

        // Nothing was dropped: the remaining 7 plus the late event.
        assert_eq!(rx.try_iter().count(), 8);
    }

    #[test]
    fn dropping_the_queue_unblocks_a_parked_producer() {
        let (tx, rx) = bounded::<Event>(8);
        for _ in 0..8 {
            tx.send(press(Key::Up)).expect("queue below capacity");
        }

        // The producer parks on the blocking send into the full queue,
        // the shape the input thread is in when shutdown begins.
        let producer = thread::spawn(move || tx.send(press(Key::Down)));
        thread::sleep(Duration::from_millis(20));

        // The consumer goes away without draining; the parked send must
        // return an error instead of waiting forever.
        drop(rx);
        let result = producer.join().expect("producer thread");
        assert!(result.is_err());
    }

    #[test]
    fn terminal_guard_restores_only_what_was_acquired() {
        let guard = TerminalGuard {
            raw_mode: false,
            alternate_screen: true,
            cursor_hidden: true,
        };
        let mut out = Vec::new();
        guard.restore(&mut out);
        let seq = String::from_utf8(out).expect("ansi restore sequence");
        assert!(seq.contains("\u{1b}[?25h"), "cursor restore missing");
        assert!(seq.contains("\u{1b}[?1049l"), "screen restore missing");

        let bare = TerminalGuard {
            raw_mode: false,
            alternate_screen: false,
            cursor_hidden: false,
        };
        let mut out = Vec::new();
        bare.restore(&mut out);
        assert!(out.is_empty(), "nothing acquired, nothing restored");

        // Keep the drop impls away from the terminal running the tests.
        std::mem::forget(guard);
        std::mem::forget(bare);
    }
}
