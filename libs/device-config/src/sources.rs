use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tracing::warn;

/// One layer in the priority-merged configuration stack. Higher
/// [`ConfigSource::priority`] wins on key collision.
pub trait ConfigSource: Send + Sync {
    fn get(&self, key: &str) -> Option<Value>;
    fn get_all(&self) -> HashMap<String, Value>;
    fn priority(&self) -> u32;
}

/// Parsed CLI flags, highest precedence (100).
pub struct RuntimeConfigSource {
    options: HashMap<String, Value>,
}

impl RuntimeConfigSource {
    pub fn new(options: HashMap<String, Value>) -> Self {
        Self { options }
    }
}

impl ConfigSource for RuntimeConfigSource {
    fn get(&self, key: &str) -> Option<Value> {
        self.options.get(key).cloned()
    }
    fn get_all(&self) -> HashMap<String, Value> {
        self.options.clone()
    }
    fn priority(&self) -> u32 {
        100
    }
}

/// Environment variables under a fixed prefix (priority 90). Values are
/// parsed JSON-first, then boolean, then number, then left as a string.
pub struct EnvironmentConfigSource {
    cache: HashMap<String, Value>,
}

impl EnvironmentConfigSource {
    pub const PREFIX: &'static str = "SCOREBOARD_";

    pub fn from_env() -> Self {
        let mut cache = HashMap::new();
        for (key, value) in std::env::vars() {
            if let Some(clean) = key.strip_prefix(Self::PREFIX) {
                cache.insert(clean.to_lowercase(), parse_value(&value));
            }
        }
        Self { cache }
    }
}

fn parse_value(raw: &str) -> Value {
    if let Ok(v) = serde_json::from_str::<Value>(raw) {
        return v;
    }
    match raw.to_lowercase().as_str() {
        "true" | "yes" | "1" => return Value::Bool(true),
        "false" | "no" | "0" => return Value::Bool(false),
        _ => {}
    }
    if let Ok(i) = raw.parse::<i64>() {
        return Value::Number(i.into());
    }
    if let Ok(f) = raw.parse::<f64>() {
        if let Some(n) = serde_json::Number::from_f64(f) {
            return Value::Number(n);
        }
    }
    Value::String(raw.to_string())
}

impl ConfigSource for EnvironmentConfigSource {
    fn get(&self, key: &str) -> Option<Value> {
        self.cache.get(&key.to_lowercase()).cloned()
    }
    fn get_all(&self) -> HashMap<String, Value> {
        self.cache.clone()
    }
    fn priority(&self) -> u32 {
        90
    }
}

/// External collaborator for the device-scoped cloud record (priority 50).
/// Production code polls this on an interval; out of this crate's reach is
/// the actual cloud API, hence the trait boundary.
#[async_trait]
pub trait CloudConfigSource: Send + Sync {
    async fn fetch(&self) -> Option<HashMap<String, Value>>;
}

/// Polls a cloud key/value store over HTTP and flattens the response.
/// Authenticates with a bearer service credential, per the external
/// collaborator contract of a cloud base URL plus a service credential.
pub struct HttpCloudConfigSource {
    client: reqwest::Client,
    url: String,
    credential: String,
}

impl HttpCloudConfigSource {
    pub fn new(url: impl Into<String>, credential: impl Into<String>) -> Self {
        Self { client: reqwest::Client::new(), url: url.into(), credential: credential.into() }
    }
}

#[async_trait]
impl CloudConfigSource for HttpCloudConfigSource {
    async fn fetch(&self) -> Option<HashMap<String, Value>> {
        match self.client.get(&self.url).bearer_auth(&self.credential).send().await {
            Ok(resp) => match resp.json::<HashMap<String, Value>>().await {
                Ok(map) => Some(map),
                Err(e) => {
                    warn!("cloud config response was not a flat JSON object: {}", e);
                    None
                }
            },
            Err(e) => {
                warn!("cloud config fetch failed: {}", e);
                None
            }
        }
    }
}

/// Fixed-record test double for [`CloudConfigSource`].
pub struct StaticCloudConfigSource {
    pub record: HashMap<String, Value>,
}

#[async_trait]
impl CloudConfigSource for StaticCloudConfigSource {
    async fn fetch(&self) -> Option<HashMap<String, Value>> {
        Some(self.record.clone())
    }
}

/// The cached, last-polled result of a [`CloudConfigSource`] (priority 50).
pub struct CloudCachedConfigSource {
    cache: HashMap<String, Value>,
}

impl CloudCachedConfigSource {
    pub fn empty() -> Self {
        Self { cache: HashMap::new() }
    }

    pub fn update(&mut self, record: HashMap<String, Value>) {
        self.cache = record;
    }
}

impl ConfigSource for CloudCachedConfigSource {
    fn get(&self, key: &str) -> Option<Value> {
        self.cache.get(key).cloned()
    }
    fn get_all(&self) -> HashMap<String, Value> {
        self.cache.clone()
    }
    fn priority(&self) -> u32 {
        50
    }
}

/// Built-in defaults (priority 10), matching [`crate::model::DeviceConfig::default`].
pub struct DefaultConfigSource {
    defaults: HashMap<String, Value>,
}

impl Default for DefaultConfigSource {
    fn default() -> Self {
        let mut defaults = HashMap::new();
        defaults.insert("matrix_width".into(), Value::from(64));
        defaults.insert("matrix_height".into(), Value::from(32));
        defaults.insert("matrix_brightness".into(), Value::from(80));
        defaults.insert("matrix_pwm_bits".into(), Value::from(11));
        defaults.insert("matrix_hardware_mapping".into(), Value::from("adafruit-hat"));
        defaults.insert("refresh_pregame_sec".into(), Value::from(30));
        defaults.insert("refresh_live_sec".into(), Value::from(5));
        defaults.insert("refresh_final_sec".into(), Value::from(60));
        defaults.insert("render_layout".into(), Value::from("stacked"));
        defaults.insert("render_logo_variant".into(), Value::from("mini"));
        defaults.insert("timezone".into(), Value::from("America/New_York"));
        defaults.insert(
            "enabled_leagues".into(),
            Value::from(vec!["nhl", "wnba", "nba"]),
        );
        Self { defaults }
    }
}

impl ConfigSource for DefaultConfigSource {
    fn get(&self, key: &str) -> Option<Value> {
        self.defaults.get(key).cloned()
    }
    fn get_all(&self) -> HashMap<String, Value> {
        self.defaults.clone()
    }
    fn priority(&self) -> u32 {
        10
    }
}
