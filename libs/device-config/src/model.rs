use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HardwareMapping {
    Regular,
    AdafruitHat,
    AdafruitHatPwm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Layout {
    Stacked,
    BigLogos,
    Large,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogoVariant {
    Mini,
    Banner,
    Large,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatrixGeometry {
    pub width: u32,
    pub height: u32,
    pub brightness: u8,
    pub pwm_bits: u8,
    pub hardware_mapping: HardwareMapping,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshIntervals {
    pub pregame_sec: u32,
    pub live_sec: u32,
    pub final_sec: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderOptions {
    pub layout: Layout,
    pub logo_variant: LogoVariant,
}

/// Fully resolved, validated device configuration — the output of layering
/// every [`crate::provider::UnifiedConfigurationProvider`] source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    pub matrix: MatrixGeometry,
    pub refresh: RefreshIntervals,
    pub render: RenderOptions,
    pub timezone: String,
    /// Order is priority: index 0 is the highest-priority league.
    pub enabled_leagues: Vec<String>,
    pub favorites_by_league: std::collections::HashMap<String, Vec<String>>,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            matrix: MatrixGeometry {
                width: 64,
                height: 32,
                brightness: 80,
                pwm_bits: 11,
                hardware_mapping: HardwareMapping::AdafruitHat,
            },
            refresh: RefreshIntervals { pregame_sec: 30, live_sec: 5, final_sec: 60 },
            render: RenderOptions { layout: Layout::Stacked, logo_variant: LogoVariant::Mini },
            timezone: "America/New_York".to_string(),
            enabled_leagues: vec!["nhl".to_string(), "wnba".to_string(), "nba".to_string()],
            favorites_by_league: std::collections::HashMap::new(),
        }
    }
}

const KNOWN_LEAGUES: &[&str] = &["nhl", "wnba", "nba"];

impl DeviceConfig {
    /// Checks the validation rules from C6; returns the first violation.
    pub fn validate(&self) -> Result<(), String> {
        if self.matrix.width % 8 != 0 || !(8..=256).contains(&self.matrix.width) {
            return Err(format!("matrix width {} is not a multiple of 8 in [8,256]", self.matrix.width));
        }
        if self.matrix.height % 8 != 0 || !(8..=256).contains(&self.matrix.height) {
            return Err(format!("matrix height {} is not a multiple of 8 in [8,256]", self.matrix.height));
        }
        if !(1..=100).contains(&self.matrix.brightness) {
            return Err(format!("brightness {} out of [1,100]", self.matrix.brightness));
        }
        if !(1..=11).contains(&self.matrix.pwm_bits) {
            return Err(format!("pwm_bits {} out of [1,11]", self.matrix.pwm_bits));
        }
        if !(5..=300).contains(&self.refresh.pregame_sec) {
            return Err("pregame refresh interval out of [5,300]".to_string());
        }
        if !(1..=60).contains(&self.refresh.live_sec) {
            return Err("live refresh interval out of [1,60]".to_string());
        }
        if !(10..=600).contains(&self.refresh.final_sec) {
            return Err("final refresh interval out of [10,600]".to_string());
        }
        if self.timezone.parse::<chrono_tz::Tz>().is_err() {
            return Err(format!("unknown timezone: {}", self.timezone));
        }
        if self.enabled_leagues.is_empty() {
            return Err("at least one league must be enabled".to_string());
        }
        for league in &self.enabled_leagues {
            if !KNOWN_LEAGUES.contains(&league.as_str()) {
                return Err(format!("unknown league code: {league}"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        assert!(DeviceConfig::default().validate().is_ok());
    }

    #[test]
    fn geometry_not_multiple_of_8_fails() {
        let mut c = DeviceConfig::default();
        c.matrix.width = 65;
        assert!(c.validate().is_err());
    }

    #[test]
    fn brightness_out_of_range_fails() {
        let mut c = DeviceConfig::default();
        c.matrix.brightness = 150;
        assert!(c.validate().is_err());
    }

    #[test]
    fn unknown_league_fails() {
        let mut c = DeviceConfig::default();
        c.enabled_leagues = vec!["xfl".to_string()];
        assert!(c.validate().is_err());
    }

    #[test]
    fn zero_enabled_leagues_fails() {
        let mut c = DeviceConfig::default();
        c.enabled_leagues.clear();
        assert!(c.validate().is_err());
    }

    #[test]
    fn invalid_timezone_fails() {
        let mut c = DeviceConfig::default();
        c.timezone = "Narnia/Cair_Paravel".to_string();
        assert!(c.validate().is_err());
    }
}
