//! Logo resolution and variant memoization (C11). Search order: explicit
//! registry path, then sport-scoped directory by id, then by abbreviation,
//! then a rasterized SVG variant; a remote CDN download is a last resort
//! before giving up. Resized variants are memoized both in memory and on
//! disk at `variants/{sport}_{id}_{variant}.png`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use image::{imageops::FilterType, Rgb, RgbImage};
use parking_lot::Mutex;
use tracing::{info, warn};

use crate::registry::TeamRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogoVariant {
    Mini,
    Banner,
    Large,
}

impl LogoVariant {
    fn label(&self) -> &'static str {
        match self {
            LogoVariant::Mini => "mini",
            LogoVariant::Banner => "banner",
            LogoVariant::Large => "large",
        }
    }

    /// (max_width, max_height) box the variant is resized to fit within.
    fn bounds(&self) -> (u32, u32) {
        match self {
            LogoVariant::Mini => (18, 10),
            LogoVariant::Banner => (60, 20),
            LogoVariant::Large => (64, 64),
        }
    }
}

pub struct LogoCache {
    assets_dir: PathBuf,
    variants_dir: PathBuf,
    http: reqwest::Client,
    memory: Mutex<HashMap<String, RgbImage>>,
}

impl LogoCache {
    pub fn new(assets_dir: impl Into<PathBuf>) -> Self {
        let assets_dir = assets_dir.into();
        let variants_dir = assets_dir.join("variants");
        let _ = std::fs::create_dir_all(&variants_dir);
        Self { assets_dir, variants_dir, http: reqwest::Client::new(), memory: Mutex::new(HashMap::new()) }
    }

    fn memory_key(&self, sport: &str, team_id: &str, variant: LogoVariant) -> String {
        format!("{sport}_{team_id}_{}", variant.label())
    }

    fn variant_path(&self, sport: &str, team_id: &str, variant: LogoVariant) -> PathBuf {
        self.variants_dir.join(format!("{sport}_{team_id}_{}.png", variant.label()))
    }

    fn source_search_paths(&self, registry: &TeamRegistry, sport: &str, team_id: &str, abbr: &str) -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Some(explicit) = registry.explicit_path(team_id) {
            paths.push(explicit);
        }
        let sport_dir = self.assets_dir.join("sports").join(sport);
        paths.push(sport_dir.join(format!("{team_id}.png")));
        paths.push(sport_dir.join(format!("{}.png", abbr.to_lowercase())));
        paths.push(sport_dir.join(format!("{team_id}.svg")));
        paths
    }

    fn load_source_image(&self, path: &Path) -> Option<RgbImage> {
        if path.extension().and_then(|e| e.to_str()) == Some("svg") {
            // SVG rasterization requires an external rasterizer; none is
            // bundled, so this path is a documented miss until one is wired in.
            warn!(path = %path.display(), "SVG logo source found but no rasterizer is configured");
            return None;
        }
        image::open(path).ok().map(|img| img.to_rgb8())
    }

    async fn fetch_remote(&self, cdn_base_url: &str, sport: &str, team_id: &str) -> Option<RgbImage> {
        let url = format!("{cdn_base_url}/{sport}/{team_id}.png");
        let resp = self.http.get(&url).send().await.ok()?;
        if !resp.status().is_success() {
            return None;
        }
        let bytes = resp.bytes().await.ok()?;
        image::load_from_memory(&bytes).ok().map(|img| img.to_rgb8())
    }

    fn resize_and_posterize(&self, source: &RgbImage, variant: LogoVariant) -> RgbImage {
        let (max_w, max_h) = variant.bounds();
        let (sw, sh) = (source.width() as f32, source.height() as f32);
        let scale = (max_w as f32 / sw).min(max_h as f32 / sh).min(1.0);
        let (tw, th) = ((sw * scale).round().max(1.0) as u32, (sh * scale).round().max(1.0) as u32);
        let resized = image::imageops::resize(source, tw, th, FilterType::CatmullRom);
        posterize(&resized, 5)
    }

    /// Memory cache, then disk variant cache, then the local source search
    /// order — no network I/O. Shared by the sync render-path lookup and as
    /// the first phase of [`Self::get_logo`]'s full resolution.
    fn resolve_local(&self, registry: &TeamRegistry, sport: &str, team_id: &str, abbr: &str, variant: LogoVariant) -> Option<RgbImage> {
        let mem_key = self.memory_key(sport, team_id, variant);
        if let Some(img) = self.memory.lock().get(&mem_key) {
            return Some(img.clone());
        }

        let variant_path = self.variant_path(sport, team_id, variant);
        if let Some(img) = image::open(&variant_path).ok().map(|i| i.to_rgb8()) {
            self.memory.lock().insert(mem_key, img.clone());
            return Some(img);
        }

        let source = self
            .source_search_paths(registry, sport, team_id, abbr)
            .iter()
            .find_map(|p| self.load_source_image(p))?;
        let resized = self.resize_and_posterize(&source, variant);
        let _ = resized.save(&variant_path);
        self.memory.lock().insert(mem_key, resized.clone());
        Some(resized)
    }

    /// Synchronous lookup for the render hot path: memory, disk variant
    /// cache, and local source files only. Never reaches out to the
    /// network, so it is safe to call from a non-async `Board::render`.
    /// A remote CDN miss here is filled in later by [`Self::get_logo`],
    /// run from an async context (e.g. a periodic prefetch task).
    pub fn get_logo_sync(&self, registry: &TeamRegistry, sport: &str, team_id: &str, abbr: &str, variant: LogoVariant) -> Option<RgbImage> {
        self.resolve_local(registry, sport, team_id, abbr, variant)
    }

    /// Resolves, resizes, and memoizes a logo. `cdn_base_url` is consulted
    /// only when nothing is found locally.
    pub async fn get_logo(
        &self,
        registry: &TeamRegistry,
        sport: &str,
        team_id: &str,
        abbr: &str,
        variant: LogoVariant,
        cdn_base_url: Option<&str>,
    ) -> Option<RgbImage> {
        if let Some(img) = self.resolve_local(registry, sport, team_id, abbr, variant) {
            return Some(img);
        }

        let cdn = cdn_base_url?;
        let source = self.fetch_remote(cdn, sport, team_id).await?;
        let source_path = self.assets_dir.join("sports").join(sport).join(format!("{team_id}.png"));
        if let Some(parent) = source_path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        let _ = source.save(&source_path);
        info!(sport, team_id, "downloaded and persisted logo from remote CDN");

        let mem_key = self.memory_key(sport, team_id, variant);
        let variant_path = self.variant_path(sport, team_id, variant);
        let resized = self.resize_and_posterize(&source, variant);
        let _ = resized.save(&variant_path);
        self.memory.lock().insert(mem_key, resized.clone());
        Some(resized)
    }
}

/// Slight per-channel quantization so the image stabilizes on low-bit
/// panels instead of dithering noisily frame to frame.
fn posterize(img: &RgbImage, levels: u8) -> RgbImage {
    let step = 255 / (levels.max(1) - 1).max(1) as u32;
    let mut out = img.clone();
    for pixel in out.pixels_mut() {
        let Rgb([r, g, b]) = *pixel;
        *pixel = Rgb([quantize(r, step), quantize(g, step), quantize(b, step)]);
    }
    out
}

fn quantize(channel: u8, step: u32) -> u8 {
    let rounded = ((channel as u32 + step / 2) / step) * step;
    rounded.min(255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::TeamRegistry;

    #[tokio::test]
    async fn missing_source_and_no_cdn_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let cache = LogoCache::new(dir.path());
        let registry = TeamRegistry::load(&dir.path().join("teams.json")).unwrap();
        let logo = cache.get_logo(&registry, "nhl", "bos", "BOS", LogoVariant::Mini, None).await;
        assert!(logo.is_none());
    }

    #[tokio::test]
    async fn resolves_from_sport_scoped_directory_by_id() {
        let dir = tempfile::tempdir().unwrap();
        let sport_dir = dir.path().join("sports").join("nhl");
        std::fs::create_dir_all(&sport_dir).unwrap();
        let source = RgbImage::from_pixel(100, 100, Rgb([10, 20, 30]));
        source.save(sport_dir.join("bos.png")).unwrap();

        let cache = LogoCache::new(dir.path());
        let registry = TeamRegistry::load(&dir.path().join("teams.json")).unwrap();
        let logo = cache.get_logo(&registry, "nhl", "bos", "BOS", LogoVariant::Mini, None).await.unwrap();
        assert!(logo.width() <= 18 && logo.height() <= 10);
        assert!(dir.path().join("variants/nhl_bos_mini.png").exists());
    }

    #[test]
    fn posterize_quantizes_channels() {
        let img = RgbImage::from_pixel(2, 2, Rgb([130, 130, 130]));
        let out = posterize(&img, 5);
        let Rgb([r, _, _]) = out.get_pixel(0, 0);
        assert_eq!(*r % 63, 0);
    }
}
