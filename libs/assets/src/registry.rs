use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::Result;

/// One team's on-disk logo hints, as loaded from a sport's team registry
/// JSON file.
#[derive(Debug, Clone, Deserialize)]
pub struct TeamAssetRecord {
    pub id: String,
    pub abbr: String,
    /// Explicit path, relative to the registry file's directory, if set.
    #[serde(default)]
    pub logo_path: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RegistryFile {
    teams: Vec<TeamAssetRecord>,
}

/// Loaded team records for one sport, keyed by lowercase id and by
/// lowercase abbreviation for the fallback search order.
pub struct TeamRegistry {
    base_dir: PathBuf,
    by_id: HashMap<String, TeamAssetRecord>,
    by_abbr: HashMap<String, TeamAssetRecord>,
}

impl TeamRegistry {
    /// Loads `registry_path` (a JSON file with a `teams` array); an absent
    /// file yields an empty registry rather than an error, since assets
    /// are best-effort — a logo miss is not fatal to rendering.
    pub fn load(registry_path: &Path) -> Result<Self> {
        let base_dir = registry_path.parent().unwrap_or_else(|| Path::new(".")).to_path_buf();
        let file = match std::fs::read_to_string(registry_path) {
            Ok(contents) => serde_json::from_str::<RegistryFile>(&contents)?,
            Err(_) => RegistryFile::default(),
        };

        let mut by_id = HashMap::new();
        let mut by_abbr = HashMap::new();
        for team in file.teams {
            by_id.insert(team.id.to_lowercase(), team.clone());
            by_abbr.insert(team.abbr.to_lowercase(), team);
        }
        Ok(Self { base_dir, by_id, by_abbr })
    }

    pub fn explicit_path(&self, team_id_or_abbr: &str) -> Option<PathBuf> {
        let needle = team_id_or_abbr.to_lowercase();
        let record = self.by_id.get(&needle).or_else(|| self.by_abbr.get(&needle))?;
        record.logo_path.as_ref().map(|p| self.base_dir.join(p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_registry_file_yields_empty_registry() {
        let registry = TeamRegistry::load(Path::new("/nonexistent/teams.json")).unwrap();
        assert!(registry.explicit_path("bos").is_none());
    }

    #[test]
    fn explicit_path_resolves_relative_to_registry_dir() {
        let dir = tempfile::tempdir().unwrap();
        let registry_path = dir.path().join("teams.json");
        std::fs::write(&registry_path, r#"{"teams":[{"id":"bos","abbr":"BOS","logo_path":"logos/bos.png"}]}"#).unwrap();

        let registry = TeamRegistry::load(&registry_path).unwrap();
        assert_eq!(registry.explicit_path("bos"), Some(dir.path().join("logos/bos.png")));
        assert_eq!(registry.explicit_path("BOS"), Some(dir.path().join("logos/bos.png")));
    }
}
