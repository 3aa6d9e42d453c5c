//! LED matrix multi-league sports scoreboard — orchestrator crate.
//!
//! Ties together the fetcher/sports/priority/refresh/device-config/boards/
//! assets library crates into the per-tick loop described by the
//! orchestrator component.

pub mod command_listener;
pub mod demo;
pub mod heartbeat;
pub mod logging;
pub mod orchestrator;
pub mod shutdown;

pub use orchestrator::{Orchestrator, OrchestratorConfig};
pub use shutdown::ShutdownManager;
