pub mod bitmap_font;
pub mod board;
pub mod canvas;
pub mod error;
pub mod registry;
pub mod scenes;
pub mod scheduler;
pub mod sinks;
pub mod state;

pub use board::{Board, InputKind, TickContext};
pub use error::{BoardsError, Result};
pub use scheduler::BoardScheduler;
pub use sinks::{DisplaySink, HardwareSink, MockFailureMode, MockSink, SimulatorSink};
pub use state::{BoardRotation, BoardState, StateManager};
