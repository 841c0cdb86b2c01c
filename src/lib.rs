//! # Tonebox
//!
//! A CTCSS tone browser and generator for the terminal.
//!
//! Tonebox shows one screen: the selected squelch tone from the fixed
//! 38-entry table and whether the generator is sounding it. Arrow keys
//! move the selection (wrapping at both ends, Left/Right jump to the
//! table ends), Enter toggles the tone, Esc quits.
//!
//! ## Core Concepts
//!
//! - **Actor model**: Isolated threads for input, ticking and rendering,
//!   joined by bounded crossbeam channels
//! - **Single writer**: The main loop alone mutates the selection state;
//!   the renderer takes bounded-wait snapshots and skips contended frames
//! - **Opaque actuator**: The tone generator sits behind a trait; the
//!   shipped implementation drives a pulse wave through cpal
//!
//! ## Example
//!
//! ```rust,ignore
//! use tonebox::{App, AudioGenerator};
//!
//! let generator = AudioGenerator::new()?;
//! let mut app = App::new(Box::new(generator))?;
//! app.run();
//! ```

#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod actor;
pub mod app;
pub mod canvas;
pub mod freq;
pub mod generator;
pub mod state;

// Re-exports for convenience
pub use actor::{Event, InputPhase, Key, RenderCommand};
pub use app::{App, AppConfig, Session, SetupError};
pub use canvas::{Align, Canvas};
pub use freq::{format_tone, CTCSS_TONES, LAST_INDEX, TONE_COUNT};
pub use generator::{AudioGenerator, GeneratorError, PulseWave, ToneGenerator};
pub use state::{SelectionState, SharedState, DEFAULT_DUTY};
