//! Message types for actor communication.
//!
//! These enums define the protocol between the producer threads and the
//! main loop, and between the main loop and the renderer.

/// Logical keys of the handheld's directional-plus-confirm-plus-back pad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Advance the selection (next tone).
    Up,
    /// Retreat the selection (previous tone).
    Down,
    /// Jump to the first tone.
    Left,
    /// Jump to the last tone.
    Right,
    /// Toggle the generator.
    Ok,
    /// Leave the application.
    Back,
}

/// Phase of a key notification.
///
/// Producers forward every phase; the main loop alone decides that only
/// presses trigger transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputPhase {
    /// Key went down.
    Press,
    /// Key came back up.
    Release,
    /// Key is being held.
    Repeat,
}

/// Events flowing through the bounded queue into the main loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Event {
    /// A key notification from the input producer.
    Key {
        /// Which logical key.
        key: Key,
        /// Press, release or repeat.
        phase: InputPhase,
    },
    /// A periodic timer event from the tick producer.
    Tick,
}

/// Commands sent to the render thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderCommand {
    /// Redraw the screen from the current state snapshot.
    Redraw,
    /// Shut the render thread down.
    Shutdown,
}
