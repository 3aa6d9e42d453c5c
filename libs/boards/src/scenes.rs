//! One pure paint function per game state, mirroring the original's
//! `render/scenes/{pregame,live,live_big,final,nhl_large_logo}.py` layouts.
//! Every function clears the buffer first and never draws outside its
//! bounds; all text positions are computed from measured glyph widths.

use chrono::{DateTime, Local};
use image::RgbImage;
use sports::Game;

use crate::canvas::{self, FontSet};

pub fn idle(buffer: &mut RgbImage, now: DateTime<Local>, fonts: &FontSet) {
    canvas::clear(buffer);
    let label = canvas::truncate(&format!("{} — No games", now.format("%a %m/%d")), 20);
    canvas::draw_text_centered(buffer, fonts, buffer.width() as i32 / 2, 12, 8.0, canvas::white(), &label);
    // Animated dot position derives from the wall-clock second so it's
    // deterministic per-tick rather than a stateful frame counter.
    let dot_x = (now.timestamp() % buffer.width() as i64) as i32;
    canvas::draw_text_left(buffer, fonts, dot_x, buffer.height() as i32 - 4, 4.0, canvas::white(), ".");
}

fn format_countdown(seconds_to_start: i64) -> String {
    let secs = seconds_to_start.max(0);
    if secs >= 3600 {
        format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
    } else {
        format!("{:02}:{:02}", secs / 60, secs % 60)
    }
}

pub fn pregame(buffer: &mut RgbImage, game: &Game, now: DateTime<Local>, fonts: &FontSet, away_logo: Option<&RgbImage>, home_logo: Option<&RgbImage>) {
    canvas::clear(buffer);
    let w = buffer.width() as i32;

    if let Some(logo) = away_logo {
        canvas::blit_logo_fit(buffer, logo, 0, 0, 14, 8);
    }
    if let Some(logo) = home_logo {
        canvas::blit_logo_fit(buffer, logo, w - 14, 0, 14, 8);
    }
    canvas::draw_text_left(buffer, fonts, 1, 9, 6.0, canvas::white(), &game.away.abbr);
    canvas::draw_text_centered(buffer, fonts, w / 2, 9, 6.0, canvas::white(), "VS");
    canvas::draw_text_right(buffer, fonts, w - 1, 9, 6.0, canvas::white(), &game.home.abbr);

    let countdown = format_countdown(game.seconds_to_start);
    canvas::draw_text_centered(buffer, fonts, w / 2, buffer.height() as i32 / 2 - 4, 10.0, canvas::amber(), &countdown);

    let verb = if game.sport.start_verb.is_empty() { "Start" } else { game.sport.start_verb.as_str() };
    let start_line = format!("{verb} {}", now.format("%-I:%M %p"));
    canvas::draw_text_centered(buffer, fonts, w / 2, buffer.height() as i32 - 8, 6.0, canvas::white(), &canvas::truncate(&start_line, 20));
}

/// LiveScene, stacked layout: scores on row 1, period+clock centered,
/// status detail on the bottom row.
pub fn live_stacked(buffer: &mut RgbImage, game: &Game, fonts: &FontSet) {
    canvas::clear(buffer);
    let w = buffer.width() as i32;

    let row1 = format!("{} {}", game.away.abbr, game.away.score);
    canvas::draw_text_left(buffer, fonts, 1, 1, 6.0, canvas::white(), &row1);
    let row1_home = format!("{} {}", game.home.abbr, game.home.score);
    canvas::draw_text_right(buffer, fonts, w - 1, 1, 6.0, canvas::white(), &row1_home);

    let clock_line = format!("{} {}", game.period_name, game.display_clock);
    canvas::draw_text_centered(buffer, fonts, w / 2, buffer.height() as i32 / 2 - 5, 10.0, canvas::green(), clock_line.trim());

    let status = canvas::truncate(&game.status_detail, 20);
    canvas::draw_text_centered(buffer, fonts, w / 2, buffer.height() as i32 - 8, 6.0, canvas::white(), &status);
}

/// LiveScene, big-logos layout: two large logos with abbreviations below,
/// scores stacked in the center column, status line on top.
pub fn live_big_logos(buffer: &mut RgbImage, game: &Game, fonts: &FontSet, away_logo: Option<&RgbImage>, home_logo: Option<&RgbImage>) {
    canvas::clear(buffer);
    let (w, h) = (buffer.width() as i32, buffer.height() as i32);

    let status_line = format!("{} {}", game.period_name, game.display_clock);
    canvas::draw_text_centered(buffer, fonts, w / 2, 1, 6.0, canvas::white(), status_line.trim());

    let logo_box = 20u32;
    if let Some(logo) = away_logo {
        canvas::blit_logo_fit(buffer, logo, 0, 8, logo_box, logo_box);
    }
    if let Some(logo) = home_logo {
        canvas::blit_logo_fit(buffer, logo, w - logo_box as i32, 8, logo_box, logo_box);
    }
    canvas::draw_text_left(buffer, fonts, 1, h - 6, 6.0, canvas::white(), &game.away.abbr);
    canvas::draw_text_right(buffer, fonts, w - 1, h - 6, 6.0, canvas::white(), &game.home.abbr);

    // Score rows must not overlap the abbreviation labels below; a score
    // over two digits uses a smaller font and the band shifts up slightly.
    let (away_score, home_score) = (game.away.score.to_string(), game.home.score.to_string());
    let score_px = if away_score.len() > 2 || home_score.len() > 2 { 10.0 } else { 14.0 };
    let score_y = if score_px > 10.0 { h / 2 - 10 } else { h / 2 - 7 };
    canvas::draw_text_centered(buffer, fonts, w / 2 - 6, score_y, score_px, canvas::white(), &away_score);
    canvas::draw_text_centered(buffer, fonts, w / 2 + 6, score_y, score_px, canvas::white(), &home_score);
}

/// FinalScene: red "FINAL" stamp top-left, then two rows of logo + abbr +
/// right-aligned score.
pub fn final_scene(buffer: &mut RgbImage, game: &Game, fonts: &FontSet, away_logo: Option<&RgbImage>, home_logo: Option<&RgbImage>) {
    canvas::clear(buffer);
    let (w, h) = (buffer.width() as i32, buffer.height() as i32);

    canvas::draw_text_left(buffer, fonts, 1, 1, 8.0, canvas::red(), "FINAL");

    let row_y = h / 2 - 6;
    if let Some(logo) = away_logo {
        canvas::blit_logo_fit(buffer, logo, 1, row_y, 10, 8);
    }
    canvas::draw_text_left(buffer, fonts, 13, row_y, 8.0, canvas::white(), &game.away.abbr);
    canvas::draw_text_right(buffer, fonts, w - 1, row_y, 10.0, canvas::white(), &game.away.score.to_string());

    let row2_y = h / 2 + 2;
    if let Some(logo) = home_logo {
        canvas::blit_logo_fit(buffer, logo, 1, row2_y, 10, 8);
    }
    canvas::draw_text_left(buffer, fonts, 13, row2_y, 8.0, canvas::white(), &game.home.abbr);
    canvas::draw_text_right(buffer, fonts, w - 1, row2_y, 10.0, canvas::white(), &game.home.score.to_string());
}

/// NHL-large layout for taller panels: 24x24 or 48x48 logos left/right,
/// centered period abbreviation, centered away-home score, clock below
/// while live.
pub fn nhl_large(buffer: &mut RgbImage, game: &Game, fonts: &FontSet, away_logo: Option<&RgbImage>, home_logo: Option<&RgbImage>) {
    canvas::clear(buffer);
    let (w, h) = (buffer.width() as i32, buffer.height() as i32);
    let logo_box = if h >= 48 { 48u32 } else { 24u32 };

    if let Some(logo) = away_logo {
        canvas::blit_logo_fit(buffer, logo, 0, 0, logo_box, logo_box);
    }
    if let Some(logo) = home_logo {
        canvas::blit_logo_fit(buffer, logo, w - logo_box as i32, 0, logo_box, logo_box);
    }

    canvas::draw_text_centered(buffer, fonts, w / 2, 1, 8.0, canvas::white(), &game.period_name);
    let score_line = format!("{} - {}", game.away.score, game.home.score);
    canvas::draw_text_centered(buffer, fonts, w / 2, h / 2 - 5, 12.0, canvas::white(), &score_line);

    if game.state == sports::GameState::Live {
        canvas::draw_text_centered(buffer, fonts, w / 2, h - 8, 6.0, canvas::green(), &game.display_clock);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sports::{definitions, GameState, Team};

    fn sample_game() -> Game {
        Game {
            league: "nhl".into(),
            sport: definitions::hockey(),
            event_id: "1".into(),
            start_time: chrono::Utc::now(),
            state: GameState::Live,
            home: Team::new("h", "Bruins", "BOS"),
            away: Team::new("a", "Kraken", "SEA"),
            period: 2,
            period_name: "P2".into(),
            display_clock: "12:34".into(),
            seconds_to_start: -1,
            status_detail: "2nd Period".into(),
            is_intermission: Some(false),
            sport_specific: Default::default(),
        }
    }

    #[test]
    fn countdown_uses_hms_above_an_hour() {
        assert_eq!(format_countdown(3661), "01:01:01");
        assert_eq!(format_countdown(90), "01:30");
        assert_eq!(format_countdown(-5), "00:00");
    }

    #[test]
    fn live_stacked_renders_without_panicking() {
        let mut buf = RgbImage::new(64, 32);
        let fonts = FontSet::bitmap();
        live_stacked(&mut buf, &sample_game(), &fonts);
    }

    #[test]
    fn big_logos_renders_without_logos() {
        let mut buf = RgbImage::new(64, 32);
        let fonts = FontSet::bitmap();
        live_big_logos(&mut buf, &sample_game(), &fonts, None, None);
    }

    #[test]
    fn pregame_renders_without_logos() {
        let mut buf = RgbImage::new(64, 32);
        let fonts = FontSet::bitmap();
        let mut game = sample_game();
        game.state = GameState::Pre;
        game.seconds_to_start = 600;
        pregame(&mut buf, &game, chrono::Local::now(), &fonts, None, None);
    }

    #[test]
    fn final_scene_renders_without_panicking() {
        let mut buf = RgbImage::new(64, 32);
        let fonts = FontSet::bitmap();
        let mut game = sample_game();
        game.state = GameState::Final;
        final_scene(&mut buf, &game, &fonts, None, None);
    }

    #[test]
    fn nhl_large_skips_clock_when_not_live() {
        let mut buf = RgbImage::new(64, 48);
        let fonts = FontSet::bitmap();
        let mut game = sample_game();
        game.state = GameState::Final;
        nhl_large(&mut buf, &game, &fonts, None, None);
    }
}
