//! Signal handling and cooperative shutdown, generalized from the teacher's
//! `ShutdownManager` (single Ctrl+C handler) to the three signals the
//! orchestrator cares about: SIGINT shuts down, SIGHUP and SIGUSR1 both
//! request a configuration reload.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::signal::unix::{signal, SignalKind};
use tokio::time::sleep;
use tracing::info;

pub struct ShutdownManager {
    running: Arc<AtomicBool>,
    reload_requested: Arc<AtomicBool>,
}

impl ShutdownManager {
    pub fn new() -> Self {
        Self {
            running: Arc::new(AtomicBool::new(true)),
            reload_requested: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Spawns one task per signal kind; a handler failure to install (e.g.
    /// unsupported platform) is logged, not fatal.
    pub fn spawn_signal_handlers(&self) {
        self.spawn_shutdown_on(SignalKind::interrupt());
        self.spawn_reload_on(SignalKind::hangup());
        self.spawn_reload_on(SignalKind::user_defined1());
    }

    fn spawn_shutdown_on(&self, kind: SignalKind) {
        let running = Arc::clone(&self.running);
        match signal(kind) {
            Ok(mut stream) => {
                tokio::spawn(async move {
                    stream.recv().await;
                    info!("received shutdown signal, stopping after this tick");
                    running.store(false, Ordering::Release);
                });
            }
            Err(e) => tracing::warn!("failed to install signal handler: {}", e),
        }
    }

    fn spawn_reload_on(&self, kind: SignalKind) {
        let reload_requested = Arc::clone(&self.reload_requested);
        match signal(kind) {
            Ok(mut stream) => {
                tokio::spawn(async move {
                    loop {
                        if stream.recv().await.is_none() {
                            break;
                        }
                        info!("received reload signal");
                        reload_requested.store(true, Ordering::Release);
                    }
                });
            }
            Err(e) => tracing::warn!("failed to install signal handler: {}", e),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn take_reload_requested(&self) -> bool {
        self.reload_requested.swap(false, Ordering::AcqRel)
    }

    pub fn request_reload(&self) {
        self.reload_requested.store(true, Ordering::Release);
    }

    pub fn reload_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.reload_requested)
    }

    /// Sleeps in short slices so shutdown latency is bounded to about 1s,
    /// matching the concurrency model's responsiveness requirement.
    pub async fn interruptible_sleep(&self, duration: Duration) {
        let check_interval = Duration::from_millis(100);
        let mut elapsed = Duration::ZERO;
        while elapsed < duration && self.is_running() {
            sleep(check_interval).await;
            elapsed += check_interval;
        }
    }
}

impl Default for ShutdownManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn interruptible_sleep_returns_early_when_stopped() {
        let manager = ShutdownManager::new();
        manager.running.store(false, Ordering::Release);
        let start = std::time::Instant::now();
        manager.interruptible_sleep(Duration::from_secs(5)).await;
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn reload_flag_is_consumed_on_take() {
        let manager = ShutdownManager::new();
        manager.request_reload();
        assert!(manager.take_reload_requested());
        assert!(!manager.take_reload_requested());
    }
}
