//! The main loop (C10): fetch → select → render → flush → reload → sleep,
//! per the orchestrator's per-tick sequence.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use chrono_tz::Tz;
use device_config::{CloudConfigSource, UnifiedConfigurationProvider};
use priority::{choose_featured, ManualOverride, Rules};
use refresh::{AdaptiveRefreshController, RefreshConfig};
use sports::LeagueClient;
use tracing::{error, info, warn};

use crate::demo::synthesize_games;
use crate::shutdown::ShutdownManager;
use boards::{BoardScheduler, DisplaySink, TickContext};

pub struct OrchestratorConfig {
    pub demo: bool,
    pub demo_leagues: Vec<String>,
    pub demo_rotation_secs: u64,
    pub once: bool,
}

/// Owns every long-lived service the tick loop touches. Config reloads
/// atomically replace `provider`'s current snapshot; other services are
/// rebuilt from it only when their inputs actually depend on config.
pub struct Orchestrator {
    config: OrchestratorConfig,
    provider: UnifiedConfigurationProvider,
    league_clients: Vec<Box<dyn LeagueClient>>,
    refresh: AdaptiveRefreshController,
    scheduler: BoardScheduler,
    sink: Box<dyn DisplaySink>,
    shutdown: Arc<ShutdownManager>,
    manual_override: Option<ManualOverride>,
    demo_rotation_step: u64,
}

impl Orchestrator {
    pub fn new(
        config: OrchestratorConfig,
        provider: UnifiedConfigurationProvider,
        league_clients: Vec<Box<dyn LeagueClient>>,
        scheduler: BoardScheduler,
        sink: Box<dyn DisplaySink>,
        shutdown: Arc<ShutdownManager>,
    ) -> Self {
        let refresh_cfg = {
            let c = &provider.current().refresh;
            RefreshConfig { pregame_sec: c.pregame_sec, live_sec: c.live_sec, final_sec: c.final_sec }
        };
        Self {
            config,
            provider,
            league_clients,
            refresh: AdaptiveRefreshController::new(refresh_cfg),
            scheduler,
            sink,
            shutdown,
            manual_override: None,
            demo_rotation_step: 0,
        }
    }

    pub fn set_manual_override(&mut self, ovr: Option<ManualOverride>) {
        self.manual_override = ovr;
    }

    /// Runs until shutdown (or once, if `--once`). Errors inside the loop
    /// are caught and logged; the loop retries after a cooldown rather
    /// than propagating, per the error handling design.
    pub async fn run(&mut self, cloud: &dyn CloudConfigSource) -> anyhow::Result<()> {
        loop {
            if let Err(e) = self.tick(cloud).await {
                error!(error = %e, "tick failed, retrying after cooldown");
                self.shutdown.interruptible_sleep(std::time::Duration::from_secs(5)).await;
                continue;
            }

            if self.config.once || !self.shutdown.is_running() {
                return Ok(());
            }
        }
    }

    async fn tick(&mut self, cloud: &dyn CloudConfigSource) -> anyhow::Result<()> {
        let device_config = self.provider.current().clone();
        let tz: Tz = device_config.timezone.parse().unwrap_or(chrono_tz::America::New_York);
        let now_utc = Utc::now();
        let now_local = now_utc.with_timezone(&tz);

        let games_by_league = self.fetch_games(now_local.date_naive()).await;

        let league_priority_order = device_config.enabled_leagues.clone();
        let decision = choose_featured(
            &games_by_league,
            &league_priority_order,
            now_local,
            &device_config.favorites_by_league,
            Rules::default(),
            self.manual_override.as_ref(),
        );
        let snapshot = decision.as_ref().map(|d| &d.game);

        let favorites: Vec<String> = device_config
            .favorites_by_league
            .values()
            .flatten()
            .cloned()
            .collect();

        let board_state = self.scheduler.state_manager_mut().determine_state(snapshot, now_utc);
        self.scheduler.state_manager_mut().update_state(board_state);

        let ctx = TickContext {
            snapshot,
            now: now_utc,
            state: board_state,
            favorites: &favorites,
            device_config: &device_config,
        };
        self.scheduler.select_and_transition(&ctx);

        let (w, h) = (device_config.matrix.width, device_config.matrix.height);
        let mut buffer = image::RgbImage::new(w, h);
        self.scheduler.render_current(&mut buffer, &ctx);

        if let Err(e) = self.sink.flush(&buffer) {
            warn!(error = %e, "display flush failed; continuing so a later tick may succeed");
        }

        if self.shutdown.take_reload_requested() || self.provider.is_stale() {
            self.provider.reload(cloud).await;
            info!("configuration reloaded");
        }

        if !self.config.once {
            let interval_secs = self.refresh.next_interval(snapshot, now_utc);
            self.shutdown
                .interruptible_sleep(std::time::Duration::from_secs(interval_secs as u64))
                .await;
        }

        Ok(())
    }

    async fn fetch_games(&mut self, date: chrono::NaiveDate) -> HashMap<String, Vec<sports::Game>> {
        if self.config.demo {
            self.demo_rotation_step += 1;
            return synthesize_games(&self.config.demo_leagues, self.demo_rotation_step);
        }
        let result = sports::all_games(date, &mut self.league_clients).await;
        if result.values().all(|games| games.is_empty()) {
            self.refresh.record_failure(Utc::now());
        } else {
            self.refresh.record_success();
        }
        result
    }
}

pub fn resolve_config_path(cli_path: &str) -> PathBuf {
    PathBuf::from(cli_path)
}
