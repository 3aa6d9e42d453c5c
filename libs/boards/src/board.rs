use chrono::{DateTime, Utc};
use device_config::DeviceConfig;
use image::RgbImage;
use sports::Game;

use crate::state::BoardState;

/// Everything a [`Board`] needs to decide whether and how to render this
/// tick. Boards never mutate shared runtime state directly — they read the
/// context and return render calls.
pub struct TickContext<'a> {
    pub snapshot: Option<&'a Game>,
    pub now: DateTime<Utc>,
    pub state: BoardState,
    pub favorites: &'a [String],
    pub device_config: &'a DeviceConfig,
}

/// Input to [`Board::handle_input`] — a remote-command-style interrupt.
pub enum InputKind {
    Interrupt,
    Refresh,
}

/// Capability set every board (built-in or plugin) implements. Boards are
/// kept alive across ticks so `on_enter`/`on_exit` can carry animation state.
pub trait Board: Send {
    fn name(&self) -> &str;

    fn should_display(&self, ctx: &TickContext) -> bool;

    fn update(&mut self, ctx: &TickContext);

    fn render(&mut self, buffer: &mut RgbImage, ctx: &TickContext);

    fn on_enter(&mut self) {}

    fn on_exit(&mut self) {}

    fn handle_input(&mut self, _kind: InputKind, _data: &str) -> bool {
        false
    }

    fn refresh_rate_secs(&self) -> u32 {
        5
    }
}
