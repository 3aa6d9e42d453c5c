use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use device_config::{
    Cli, CloudConfigSource, EnvironmentConfigSource, HttpCloudConfigSource, RuntimeConfigSource, StaticCloudConfigSource,
    UnifiedConfigurationProvider,
};
use fetcher::{FetcherConfig, ResilientFetcher};
use led_scoreboard::orchestrator::{Orchestrator, OrchestratorConfig};
use led_scoreboard::{logging, ShutdownManager};
use sports::LeagueClient;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    logging::init_tracing();
    let cli = Cli::parse();

    if let Err(msg) = validate_args(&cli) {
        error!(error = %msg, "invalid arguments");
        std::process::exit(2);
    }

    match run(cli).await {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            error!(error = %e, "fatal error during setup or loop");
            std::process::exit(1);
        }
    }
}

/// Outside --demo, a cloud base URL, a service credential, and a device id
/// are required inputs, not optional ones — enforced here rather than left
/// to silently default, per the external-collaborator contract.
fn validate_args(cli: &Cli) -> Result<(), String> {
    if cli.demo {
        return Ok(());
    }
    if cli.cloud_url.is_none() {
        return Err("--cloud-url is required unless --demo is set".into());
    }
    if cli.service_credential.is_none() {
        return Err("--service-credential is required unless --demo is set".into());
    }
    if cli.device_id.trim().is_empty() {
        return Err("--device-id must not be empty".into());
    }
    Ok(())
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config_path = PathBuf::from(&cli.config);
    let once = cli.once;
    let demo = cli.demo;
    let demo_leagues = if cli.demo_league.is_empty() {
        vec!["nhl".to_string(), "wnba".to_string(), "nba".to_string()]
    } else {
        cli.demo_league.clone()
    };
    let demo_rotation_secs = cli.demo_rotation;

    let env_source = EnvironmentConfigSource::from_env();
    let mut provider = UnifiedConfigurationProvider::new(vec![
        Box::new(RuntimeConfigSource::new(cli.clone().into_runtime_options())),
        Box::new(env_source),
    ]);

    let cloud: Box<dyn CloudConfigSource> = match (cli.cloud_url.clone(), cli.service_credential.clone()) {
        (Some(url), Some(credential)) => Box::new(HttpCloudConfigSource::new(url, credential)),
        _ => Box::new(StaticCloudConfigSource { record: std::collections::HashMap::new() }),
    };
    provider.reload(cloud.as_ref()).await;

    let enabled_leagues = provider.current().enabled_leagues.clone();
    let league_clients: Vec<Box<dyn LeagueClient>> = if demo {
        Vec::new()
    } else {
        build_league_clients(&enabled_leagues)
    };

    let mut boards = build_builtin_boards(&enabled_leagues);
    if let Some(dir) = cli.plugins_dir.clone() {
        let plugin_boards = boards::registry::load_plugin_boards(std::path::Path::new(&dir));
        info!(count = plugin_boards.len(), dir = %dir, "loaded plugin boards");
        boards.extend(plugin_boards);
    }
    let scheduler = boards::BoardScheduler::new(boards);

    let sink: Box<dyn boards::DisplaySink> = if cli.sim || demo {
        Box::new(boards::SimulatorSink::new("out")?)
    } else {
        Box::new(boards::HardwareSink)
    };

    let shutdown = Arc::new(ShutdownManager::new());
    shutdown.spawn_signal_handlers();

    if let Some(addr) = cli.command_addr.clone() {
        spawn_command_listener(addr, config_path.clone(), Arc::clone(&shutdown)).await?;
    }
    if let Some(url) = cli.heartbeat_url.clone() {
        spawn_heartbeat(url, cli.device_id.clone(), cli.heartbeat_interval, Arc::clone(&shutdown));
    }

    let orchestrator_config = OrchestratorConfig {
        demo,
        demo_leagues,
        demo_rotation_secs,
        once,
    };

    let mut orchestrator = Orchestrator::new(
        orchestrator_config,
        provider,
        league_clients,
        scheduler,
        sink,
        Arc::clone(&shutdown),
    );

    info!(config = %config_path.display(), "starting scoreboard orchestrator");
    orchestrator.run(cloud.as_ref()).await
}

/// Binds the command socket and spawns its accept loop. A bind failure is
/// fatal (the operator asked for a listener and didn't get one); a
/// connection-level error inside the loop is not, per `command_listener`'s
/// own isolation.
async fn spawn_command_listener(addr: String, config_path: PathBuf, shutdown: Arc<ShutdownManager>) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "command listener bound");
    tokio::spawn(async move {
        if let Err(e) = led_scoreboard::command_listener::run(listener, config_path, shutdown).await {
            error!(error = %e, "command listener exited");
        }
    });
    Ok(())
}

/// Posts a heartbeat on `interval_secs` cadence until shutdown. Runs as its
/// own task so an unresponsive cloud endpoint never stalls the tick loop.
fn spawn_heartbeat(url: String, device_id: String, interval_secs: u64, shutdown: Arc<ShutdownManager>) {
    tokio::spawn(async move {
        let client = reqwest::Client::new();
        let mut heartbeat = led_scoreboard::heartbeat::Heartbeat::new(interval_secs);
        while shutdown.is_running() {
            if heartbeat.should_beat() {
                heartbeat.post_last_seen(&client, &url, &device_id).await;
            }
            shutdown.interruptible_sleep(std::time::Duration::from_secs(1)).await;
        }
    });
}

fn build_league_clients(enabled_leagues: &[String]) -> Vec<Box<dyn LeagueClient>> {
    let mut clients: Vec<Box<dyn LeagueClient>> = Vec::new();
    for code in enabled_leagues {
        match code.as_str() {
            "nhl" => clients.push(Box::new(sports::leagues::nhl::NhlClient::new(
                ResilientFetcher::new(FetcherConfig::new("https://api-web.nhle.com/v1")),
            ))),
            "wnba" => clients.push(Box::new(sports::leagues::wnba::EspnBasketballClient::wnba(
                ResilientFetcher::new(FetcherConfig::new("https://site.api.espn.com/apis/site/v2/sports/basketball/wnba")),
            ))),
            "nba" => clients.push(Box::new(sports::leagues::nba::client(ResilientFetcher::new(FetcherConfig::new(
                "https://site.api.espn.com/apis/site/v2/sports/basketball/nba",
            ))))),
            other => tracing::warn!(league = other, "no client available for enabled league, skipping"),
        }
    }
    clients
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_mode_skips_required_arg_validation() {
        let cli = Cli::parse_from(["scoreboard", "--demo"]);
        assert!(validate_args(&cli).is_ok());
    }

    #[test]
    fn non_demo_without_cloud_url_is_rejected() {
        let cli = Cli::parse_from(["scoreboard"]);
        assert!(validate_args(&cli).is_err());
    }

    #[test]
    fn non_demo_without_service_credential_is_rejected() {
        let cli = Cli::parse_from(["scoreboard", "--cloud-url", "https://cloud.example/config"]);
        assert!(validate_args(&cli).is_err());
    }

    #[test]
    fn non_demo_with_cloud_url_and_credential_is_accepted() {
        let cli = Cli::parse_from([
            "scoreboard",
            "--cloud-url",
            "https://cloud.example/config",
            "--service-credential",
            "secret-token",
        ]);
        assert!(validate_args(&cli).is_ok());
    }
}

fn build_builtin_boards(enabled_leagues: &[String]) -> Vec<Box<dyn boards::Board>> {
    // standings/schedule/team_stats are not built in by default — see
    // state.rs's rotation table comment for why — but remain available
    // through a plugin manifest for a deployment with real data behind them.
    let mut built: Vec<Box<dyn boards::Board>> = vec![
        Box::new(boards::registry::ClockBoard::new("clock", 10)),
        Box::new(boards::registry::AlertBoard::new("alert", 1000)),
        Box::new(boards::registry::ScoreboardBoard::new("scoreboard_generic", 90, None)),
    ];
    let sport_codes: std::collections::HashSet<&str> = enabled_leagues
        .iter()
        .map(|l| match l.as_str() {
            "nhl" => "hockey",
            "wnba" | "nba" => "basketball",
            _ => "basketball",
        })
        .collect();
    for sport_code in sport_codes {
        let name = format!("scoreboard_{sport_code}");
        built.push(Box::new(boards::registry::ScoreboardBoard::new(name, 100, Some(sport_code.to_string()))));
    }
    built
}
