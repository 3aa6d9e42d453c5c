//! Integration test: one orchestrator tick in demo mode, end to end.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use boards::{BoardScheduler, MockFailureMode, MockSink};
use device_config::{CloudConfigSource, DefaultConfigSource, UnifiedConfigurationProvider};
use led_scoreboard::{Orchestrator, OrchestratorConfig, ShutdownManager};
use serde_json::Value;

struct EmptyCloud;

#[async_trait]
impl CloudConfigSource for EmptyCloud {
    async fn fetch(&self) -> Option<HashMap<String, Value>> {
        Some(HashMap::new())
    }
}

#[tokio::test]
async fn demo_mode_runs_one_tick_without_a_network() {
    let provider = UnifiedConfigurationProvider::new(vec![Box::new(DefaultConfigSource::default())]);
    let scheduler = BoardScheduler::new(Vec::new());
    let sink = Box::new(MockSink::new(MockFailureMode::default()));
    let shutdown = Arc::new(ShutdownManager::new());

    let config = OrchestratorConfig {
        demo: true,
        demo_leagues: vec!["nhl".to_string()],
        demo_rotation_secs: 10,
        once: true,
    };

    let mut orchestrator = Orchestrator::new(config, provider, Vec::new(), scheduler, sink, shutdown);

    orchestrator.run(&EmptyCloud).await.expect("a single demo tick must not error");
}
