//! Actor Model: Message-passing concurrency for the control loop.
//!
//! This module implements a simple actor system using crossbeam channels:
//! - **Input Actor**: Polls terminal key events, forwards to the main loop
//! - **Ticker Actor**: Optional periodic tick source (unarmed by default)
//! - **Render Actor**: Receives redraw commands, draws from a state snapshot
//! - **Main Loop**: Sole consumer of the event queue, sole writer of state
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐      Event::Key       ┌──────────────┐
//! │ Input Thread │ ─────────────────▶    │              │
//! └──────────────┘   bounded(8) queue    │  Main Loop   │
//! ┌──────────────┐      Event::Tick      │              │
//! │ Tick Thread  │ ─────────────────▶    │              │
//! └──────────────┘                       └──────┬───────┘
//!                                               │ RenderCommand
//!                                               ▼
//!                                        ┌──────────────┐
//!                                        │Render Thread │── reads state
//!                                        └──────────────┘   snapshot
//! ```

mod input;
mod messages;
mod renderer;
mod ticker;

pub use input::InputActor;
pub use messages::{Event, InputPhase, Key, RenderCommand};
pub use renderer::RendererActor;
pub use ticker::TickerActor;
