//! Logging initialization, mirroring the teacher's
//! `infrastructure::logging::init_tracing_with_level`: `RUST_LOG` always
//! wins, otherwise a default filter keyed to this crate's own modules.

use tracing_subscriber::EnvFilter;

pub fn init_tracing() {
    init_tracing_with_level("info");
}

pub fn init_tracing_with_level(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "led_scoreboard={level},boards={level},sports={level},fetcher={level},{level}",
            level = level
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(false)
        .init();
}
