use clap::Parser;

/// Command-line flags for the scoreboard binary.
#[derive(Debug, Parser, Clone)]
#[command(name = "scoreboard", about = "LED matrix multi-league sports scoreboard")]
pub struct Cli {
    /// Path to the on-disk favorites/config file.
    #[arg(long, default_value = "config/favorites.json")]
    pub config: String,

    /// Run against a simulated matrix instead of real hardware.
    #[arg(long)]
    pub sim: bool,

    /// Render a single tick and exit.
    #[arg(long)]
    pub once: bool,

    /// Run in demo mode, cycling synthetic games instead of live data.
    #[arg(long)]
    pub demo: bool,

    /// League codes to include in demo rotation. Repeatable.
    #[arg(long = "demo-league")]
    pub demo_league: Vec<String>,

    /// Seconds between demo rotation steps.
    #[arg(long, default_value_t = 10)]
    pub demo_rotation: u64,

    /// Bind address for the remote command socket, e.g. 127.0.0.1:7777.
    /// Omit to run without a command listener.
    #[arg(long)]
    pub command_addr: Option<String>,

    /// URL of the cloud configuration store (device config + favorites).
    /// Required unless --demo is set.
    #[arg(long)]
    pub cloud_url: Option<String>,

    /// Credential used to authenticate against the cloud configuration
    /// store. Required unless --demo is set.
    #[arg(long)]
    pub service_credential: Option<String>,

    /// Directory scanned at startup for plugin board manifests
    /// (`board.toml`). Omit to run with only the built-in boards.
    #[arg(long)]
    pub plugins_dir: Option<String>,

    /// Cloud endpoint to post heartbeat last-seen pings to. Omit to run
    /// without a heartbeat worker.
    #[arg(long)]
    pub heartbeat_url: Option<String>,

    /// Device identifier included in heartbeat posts.
    #[arg(long, default_value = "scoreboard-1")]
    pub device_id: String,

    /// Seconds between heartbeat posts.
    #[arg(long, default_value_t = 300)]
    pub heartbeat_interval: u64,
}

impl Cli {
    pub fn into_runtime_options(self) -> std::collections::HashMap<String, serde_json::Value> {
        // Only flags that map onto DeviceConfig keys belong here; --sim/--once/
        // --demo* are orchestrator-level and read directly off `Cli`.
        std::collections::HashMap::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_args() {
        let cli = Cli::parse_from(["scoreboard"]);
        assert_eq!(cli.config, "config/favorites.json");
        assert!(!cli.sim);
        assert!(!cli.once);
    }

    #[test]
    fn parses_demo_flags() {
        let cli = Cli::parse_from([
            "scoreboard",
            "--demo",
            "--demo-league",
            "nhl",
            "--demo-league",
            "wnba",
            "--demo-rotation",
            "20",
        ]);
        assert!(cli.demo);
        assert_eq!(cli.demo_league, vec!["nhl", "wnba"]);
        assert_eq!(cli.demo_rotation, 20);
    }
}
