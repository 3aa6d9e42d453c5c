//! Built-in boards plus the plugin manifest scanner, grounded on
//! `manager.py`'s `_load_builtin_boards`/`_load_plugin_boards`. Dynamic
//! (`importlib`) loading is re-expressed as a compile-time closed set of
//! board kinds selected by a directory-scanned `board.toml` manifest.

use std::path::Path;

use assets::{LogoCache, LogoVariant, TeamRegistry};
use image::RgbImage;
use serde::Deserialize;
use tracing::{info, warn};

use crate::board::{Board, InputKind, TickContext};
use crate::canvas::{self, FontSet};
use crate::scenes;

#[derive(Debug, Deserialize)]
struct PluginManifest {
    kind: String,
    #[serde(default)]
    priority: i32,
    #[serde(default)]
    config: serde_json::Value,
}

/// Board kinds a plugin manifest may name — the closed set standing in for
/// `importlib`'s dynamic class discovery.
fn instantiate_kind(kind: &str, name: String, priority: i32) -> Option<Box<dyn Board>> {
    match kind {
        "clock" => Some(Box::new(ClockBoard::new(name, priority))),
        "standings" => Some(Box::new(StandingsBoard::new(name, priority))),
        "schedule" => Some(Box::new(ScheduleBoard::new(name, priority))),
        "team_stats" => Some(Box::new(TeamStatsBoard::new(name, priority))),
        "alert" => Some(Box::new(AlertBoard::new(name, priority))),
        "scoreboard_generic" => Some(Box::new(ScoreboardBoard::new(name, priority, None))),
        _ if kind.starts_with("scoreboard_") => {
            let sport = kind.trim_start_matches("scoreboard_").to_string();
            Some(Box::new(ScoreboardBoard::new(name, priority, Some(sport))))
        }
        _ => None,
    }
}

/// Scans `plugins_dir` for subdirectories containing a `board.toml`
/// manifest. A manifest naming an unknown kind, or one that fails to
/// parse, is logged and skipped — one bad plugin must not block the rest.
pub fn load_plugin_boards(plugins_dir: &Path) -> Vec<Box<dyn Board>> {
    let mut boards = Vec::new();
    let Ok(entries) = std::fs::read_dir(plugins_dir) else {
        return boards;
    };
    for entry in entries.flatten() {
        let dir = entry.path();
        if !dir.is_dir() {
            continue;
        }
        let manifest_path = dir.join("board.toml");
        if !manifest_path.exists() {
            continue;
        }
        let name = dir.file_name().and_then(|s| s.to_str()).unwrap_or("plugin").to_string();
        match std::fs::read_to_string(&manifest_path).and_then(|s| {
            toml::from_str::<PluginManifest>(&s).map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
        }) {
            Ok(manifest) => {
                let board_name = format!("plugin_{name}");
                match instantiate_kind(&manifest.kind, board_name.clone(), manifest.priority) {
                    Some(board) => {
                        info!(board = %board_name, kind = %manifest.kind, "loaded plugin board");
                        boards.push(board);
                    }
                    None => warn!(plugin = %name, kind = %manifest.kind, "unknown plugin board kind, skipping"),
                }
            }
            Err(e) => warn!(plugin = %name, error = %e, "failed to load plugin manifest, skipping"),
        }
    }
    boards
}

pub struct ClockBoard {
    name: String,
    priority: i32,
    fonts: FontSet,
}
impl ClockBoard {
    pub fn new(name: impl Into<String>, priority: i32) -> Self {
        Self { name: name.into(), priority, fonts: FontSet::bitmap() }
    }
}
impl Board for ClockBoard {
    fn name(&self) -> &str {
        &self.name
    }
    fn should_display(&self, _ctx: &TickContext) -> bool {
        true
    }
    fn update(&mut self, _ctx: &TickContext) {}
    fn render(&mut self, buffer: &mut RgbImage, ctx: &TickContext) {
        let local = ctx.now.with_timezone(&chrono::Local);
        scenes::idle(buffer, local, &self.fonts);
    }
    fn refresh_rate_secs(&self) -> u32 {
        30
    }
}

macro_rules! stub_board {
    ($ty:ident) => {
        pub struct $ty {
            name: String,
            priority: i32,
        }
        impl $ty {
            pub fn new(name: impl Into<String>, priority: i32) -> Self {
                Self { name: name.into(), priority }
            }
        }
        impl Board for $ty {
            fn name(&self) -> &str {
                &self.name
            }
            fn should_display(&self, _ctx: &TickContext) -> bool {
                true
            }
            fn update(&mut self, _ctx: &TickContext) {}
            fn render(&mut self, buffer: &mut RgbImage, _ctx: &TickContext) {
                canvas::clear(buffer);
            }
        }
    };
}

stub_board!(StandingsBoard);
stub_board!(ScheduleBoard);
stub_board!(TeamStatsBoard);

pub struct AlertBoard {
    name: String,
    priority: i32,
    message: Option<String>,
}
impl AlertBoard {
    pub fn new(name: impl Into<String>, priority: i32) -> Self {
        Self { name: name.into(), priority, message: None }
    }
}
impl Board for AlertBoard {
    fn name(&self) -> &str {
        &self.name
    }
    fn should_display(&self, _ctx: &TickContext) -> bool {
        self.message.is_some()
    }
    fn update(&mut self, _ctx: &TickContext) {}
    fn render(&mut self, buffer: &mut RgbImage, _ctx: &TickContext) {
        canvas::clear(buffer);
    }
    fn handle_input(&mut self, kind: InputKind, data: &str) -> bool {
        if matches!(kind, InputKind::Interrupt) {
            self.message = Some(data.to_string());
            true
        } else {
            false
        }
    }
}

/// The sport-aware scoreboard; `sport` narrows it to a `scoreboard_{sport}`
/// board, `None` makes it the generic fallback used when no sport-specific
/// board wants to display.
pub struct ScoreboardBoard {
    name: String,
    priority: i32,
    sport: Option<String>,
    fonts: FontSet,
    logos: LogoCache,
    team_registry: TeamRegistry,
}

impl ScoreboardBoard {
    pub fn new(name: impl Into<String>, priority: i32, sport: Option<String>) -> Self {
        let assets_dir = Path::new("assets");
        let team_registry = TeamRegistry::load(&assets_dir.join("teams.json")).unwrap_or_else(|e| {
            warn!(error = %e, "failed to load team registry, logos will be blank");
            TeamRegistry::load(Path::new("/nonexistent")).expect("empty fallback registry never errors")
        });
        Self {
            name: name.into(),
            priority,
            sport,
            fonts: FontSet::bitmap(),
            logos: LogoCache::new(assets_dir),
            team_registry,
        }
    }

    /// Looks up a team's logo, sized for `variant`, using only local
    /// sources — safe to call from the synchronous render path.
    fn logo_for(&self, sport: &str, team_id: &str, abbr: &str, variant: LogoVariant) -> Option<RgbImage> {
        self.logos.get_logo_sync(&self.team_registry, sport, team_id, abbr, variant)
    }
}

impl Board for ScoreboardBoard {
    fn name(&self) -> &str {
        &self.name
    }

    fn should_display(&self, ctx: &TickContext) -> bool {
        match (&self.sport, ctx.snapshot) {
            (Some(sport), Some(game)) => &game.sport.code == sport,
            (None, Some(_)) => true,
            _ => false,
        }
    }

    fn update(&mut self, _ctx: &TickContext) {}

    fn render(&mut self, buffer: &mut RgbImage, ctx: &TickContext) {
        let Some(game) = ctx.snapshot else {
            canvas::clear(buffer);
            return;
        };
        use device_config::Layout;
        use sports::GameState;

        let mini_logos = || {
            (
                self.logo_for(&game.sport.code, &game.away.id, &game.away.abbr, LogoVariant::Mini),
                self.logo_for(&game.sport.code, &game.home.id, &game.home.abbr, LogoVariant::Mini),
            )
        };

        match game.state {
            GameState::Pre => {
                let (away, home) = mini_logos();
                scenes::pregame(buffer, game, ctx.now.with_timezone(&chrono::Local), &self.fonts, away.as_ref(), home.as_ref());
            }
            GameState::Live => match ctx.device_config.render.layout {
                Layout::Stacked => scenes::live_stacked(buffer, game, &self.fonts),
                Layout::BigLogos => {
                    let away = self.logo_for(&game.sport.code, &game.away.id, &game.away.abbr, LogoVariant::Banner);
                    let home = self.logo_for(&game.sport.code, &game.home.id, &game.home.abbr, LogoVariant::Banner);
                    scenes::live_big_logos(buffer, game, &self.fonts, away.as_ref(), home.as_ref());
                }
                Layout::Large => {
                    let away = self.logo_for(&game.sport.code, &game.away.id, &game.away.abbr, LogoVariant::Large);
                    let home = self.logo_for(&game.sport.code, &game.home.id, &game.home.abbr, LogoVariant::Large);
                    scenes::nhl_large(buffer, game, &self.fonts, away.as_ref(), home.as_ref());
                }
            },
            GameState::Final => {
                let (away, home) = mini_logos();
                scenes::final_scene(buffer, game, &self.fonts, away.as_ref(), home.as_ref());
            }
        }
    }

    fn refresh_rate_secs(&self) -> u32 {
        2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_plugin_kind_is_skipped_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let plugin_dir = dir.path().join("weird");
        std::fs::create_dir_all(&plugin_dir).unwrap();
        std::fs::write(plugin_dir.join("board.toml"), "kind = \"nonsense\"\npriority = 1\n").unwrap();

        let valid_dir = dir.path().join("good");
        std::fs::create_dir_all(&valid_dir).unwrap();
        std::fs::write(valid_dir.join("board.toml"), "kind = \"clock\"\npriority = 5\n").unwrap();

        let boards = load_plugin_boards(dir.path());
        assert_eq!(boards.len(), 1);
        assert_eq!(boards[0].name(), "plugin_good");
    }

    #[test]
    fn malformed_manifest_is_skipped_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let plugin_dir = dir.path().join("broken");
        std::fs::create_dir_all(&plugin_dir).unwrap();
        std::fs::write(plugin_dir.join("board.toml"), "not valid toml {{{").unwrap();

        let boards = load_plugin_boards(dir.path());
        assert!(boards.is_empty());
    }

    #[test]
    fn missing_plugins_dir_returns_empty() {
        let boards = load_plugin_boards(Path::new("/nonexistent/plugins"));
        assert!(boards.is_empty());
    }
}
