use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde_json::Value;
use tracing::{info, warn};

use crate::model::{DeviceConfig, HardwareMapping, Layout, LogoVariant, MatrixGeometry, RefreshIntervals, RenderOptions};
use crate::sources::{CloudCachedConfigSource, CloudConfigSource, ConfigSource, DefaultConfigSource};

const STALENESS_INTERVAL: Duration = Duration::from_secs(60);

/// Merges configuration sources by priority and produces a validated
/// [`DeviceConfig`], matching `UnifiedConfigurationProvider`'s precedence
/// rules.
pub struct UnifiedConfigurationProvider {
    static_sources: Vec<Box<dyn ConfigSource>>,
    cloud_cache: CloudCachedConfigSource,
    merged: HashMap<String, Value>,
    last_loaded: Instant,
    reload_requested: bool,
    current: DeviceConfig,
}

impl UnifiedConfigurationProvider {
    pub fn new(mut static_sources: Vec<Box<dyn ConfigSource>>) -> Self {
        static_sources.push(Box::new(DefaultConfigSource::default()));
        let mut provider = Self {
            static_sources,
            cloud_cache: CloudCachedConfigSource::empty(),
            merged: HashMap::new(),
            last_loaded: Instant::now(),
            reload_requested: false,
            current: DeviceConfig::default(),
        };
        provider.rebuild();
        provider
    }

    pub fn request_reload(&mut self) {
        self.reload_requested = true;
    }

    pub fn is_stale(&self) -> bool {
        self.reload_requested || self.last_loaded.elapsed() >= STALENESS_INTERVAL
    }

    /// Polls the cloud source, re-merges, validates, and swaps in the new
    /// config only if it passes validation — otherwise the previous config
    /// is retained.
    pub async fn reload(&mut self, cloud: &dyn CloudConfigSource) {
        if let Some(record) = cloud.fetch().await {
            self.cloud_cache.update(record);
        } else {
            warn!("cloud config fetch failed; using last known cloud record");
        }
        self.rebuild();
        self.reload_requested = false;
        self.last_loaded = Instant::now();

        match self.build_typed() {
            Ok(config) => match config.validate() {
                Ok(()) => {
                    self.current = config;
                    info!("configuration reloaded");
                }
                Err(e) => warn!("reload produced invalid configuration, keeping previous: {}", e),
            },
            Err(e) => warn!("reload produced malformed configuration, keeping previous: {}", e),
        }
    }

    pub fn current(&self) -> &DeviceConfig {
        &self.current
    }

    fn rebuild(&mut self) {
        self.merged.clear();
        let mut sources: Vec<&dyn ConfigSource> = self.static_sources.iter().map(|b| b.as_ref()).collect();
        sources.push(&self.cloud_cache);
        sources.sort_by_key(|s| s.priority());
        for source in sources {
            self.merged.extend(source.get_all());
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.merged.get(key)
    }

    fn get_str(&self, key: &str, default: &str) -> String {
        self.get(key).and_then(Value::as_str).unwrap_or(default).to_string()
    }

    fn get_u64(&self, key: &str, default: u64) -> u64 {
        self.get(key).and_then(Value::as_u64).unwrap_or(default)
    }

    fn get_str_list(&self, key: &str, default: Vec<&str>) -> Vec<String> {
        self.get(key)
            .and_then(Value::as_array)
            .map(|arr| arr.iter().filter_map(|v| v.as_str().map(String::from)).collect())
            .unwrap_or_else(|| default.into_iter().map(String::from).collect())
    }

    /// Shapes the merged key/value cache into a typed [`DeviceConfig`],
    /// before validation.
    pub fn build_typed(&self) -> Result<DeviceConfig, String> {
        let hardware_mapping = match self.get_str("matrix_hardware_mapping", "adafruit-hat").as_str() {
            "regular" => HardwareMapping::Regular,
            "adafruit-hat-pwm" => HardwareMapping::AdafruitHatPwm,
            _ => HardwareMapping::AdafruitHat,
        };
        let layout = match self.get_str("render_layout", "stacked").as_str() {
            "big-logos" => Layout::BigLogos,
            "large" => Layout::Large,
            _ => Layout::Stacked,
        };
        let logo_variant = match self.get_str("render_logo_variant", "mini").as_str() {
            "banner" => LogoVariant::Banner,
            "large" => LogoVariant::Large,
            _ => LogoVariant::Mini,
        };

        let mut favorites_by_league = HashMap::new();
        for league in self.get_str_list("enabled_leagues", vec!["nhl", "wnba", "nba"]) {
            let key = format!("favorites_{league}");
            let favs = self.get_str_list(&key, vec![]);
            favorites_by_league.insert(league, favs);
        }

        Ok(DeviceConfig {
            matrix: MatrixGeometry {
                width: self.get_u64("matrix_width", 64) as u32,
                height: self.get_u64("matrix_height", 32) as u32,
                brightness: self.get_u64("matrix_brightness", 80) as u8,
                pwm_bits: self.get_u64("matrix_pwm_bits", 11) as u8,
                hardware_mapping,
            },
            refresh: RefreshIntervals {
                pregame_sec: self.get_u64("refresh_pregame_sec", 30) as u32,
                live_sec: self.get_u64("refresh_live_sec", 5) as u32,
                final_sec: self.get_u64("refresh_final_sec", 60) as u32,
            },
            render: RenderOptions { layout, logo_variant },
            timezone: self.get_str("timezone", "America/New_York"),
            enabled_leagues: self.get_str_list("enabled_leagues", vec!["nhl", "wnba", "nba"]),
            favorites_by_league,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::{EnvironmentConfigSource, RuntimeConfigSource, StaticCloudConfigSource};

    #[tokio::test]
    async fn runtime_source_overrides_defaults() {
        let mut options = HashMap::new();
        options.insert("matrix_width".to_string(), Value::from(128));
        let runtime = RuntimeConfigSource::new(options);
        let mut provider = UnifiedConfigurationProvider::new(vec![Box::new(runtime)]);
        let cloud = StaticCloudConfigSource { record: HashMap::new() };
        provider.reload(&cloud).await;
        assert_eq!(provider.current().matrix.width, 128);
    }

    #[tokio::test]
    async fn invalid_reload_keeps_previous_config() {
        let mut provider = UnifiedConfigurationProvider::new(vec![]);
        let before = provider.current().matrix.width;

        let mut bad_record = HashMap::new();
        bad_record.insert("matrix_width".to_string(), Value::from(65)); // not multiple of 8
        let cloud = StaticCloudConfigSource { record: bad_record };
        provider.reload(&cloud).await;

        assert_eq!(provider.current().matrix.width, before);
    }

    #[test]
    fn cli_flags_outrank_env_vars() {
        std::env::set_var("SCOREBOARD_MATRIX_WIDTH", "32");
        let env = EnvironmentConfigSource::from_env();
        let mut options = HashMap::new();
        options.insert("matrix_width".to_string(), Value::from(128));
        let runtime = RuntimeConfigSource::new(options);
        let provider = UnifiedConfigurationProvider::new(vec![Box::new(runtime), Box::new(env)]);
        assert_eq!(provider.get("matrix_width").and_then(Value::as_u64), Some(128));
        std::env::remove_var("SCOREBOARD_MATRIX_WIDTH");
    }
}
