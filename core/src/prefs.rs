use alloc::string::{String, ToString};
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

use crate::*;

pub const GAME_KEY: &str = "minesweeper:game";
pub const LEVEL_KEY: &str = "minesweeper:level";
pub const MARKS_KEY: &str = "minesweeper:marks";
pub const SCALE_KEY: &str = "minesweeper:scale";
pub const STATUS_BAR_KEY: &str = "minesweeper:status-bar";

/// Zoom levels offered by the view menu, in percent.
pub const SCALES: [u16; 5] = [50, 100, 150, 200, 300];
pub const DEFAULT_SCALE: u16 = 100;

/// User choices that outlive a page reload.
///
/// The storage itself is left to the caller: [`Preferences::load`] reads through a lookup
/// function and [`Preferences::entries`] hands back the key/value pairs to write. Values are
/// plain strings: booleans as `"1"`/`"0"`, numbers in decimal, the field config as JSON.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    pub config: GameConfig,
    pub level: Level,
    /// Whether the flag cycle passes through the question mark.
    pub marks: bool,
    pub scale: u16,
    pub status_bar: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            config: GameConfig::BEGINNER,
            level: Level::Beginner,
            marks: true,
            scale: DEFAULT_SCALE,
            status_bar: true,
        }
    }
}

impl Preferences {
    /// Reads every preference, falling back to its default when missing or malformed.
    pub fn load(mut get: impl FnMut(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let config = get(GAME_KEY)
            .and_then(|raw| {
                serde_json::from_str::<GameConfig>(&raw)
                    .inspect_err(|err| log::warn!("ignoring stored game {:?}: {}", raw, err))
                    .ok()
            })
            .unwrap_or(defaults.config);
        let level = get(LEVEL_KEY)
            .and_then(|raw| {
                let level = Level::from_name(&raw);
                if level.is_none() {
                    log::warn!("ignoring stored level {:?}", raw);
                }
                level
            })
            .unwrap_or_else(|| Level::of(config));
        let marks = get(MARKS_KEY).map_or(defaults.marks, |raw| decode_bool(&raw));
        let scale = get(SCALE_KEY)
            .and_then(|raw| decode_scale(&raw))
            .unwrap_or(defaults.scale);
        let status_bar = get(STATUS_BAR_KEY).map_or(defaults.status_bar, |raw| decode_bool(&raw));

        let prefs = Self {
            config,
            level,
            marks,
            scale,
            status_bar,
        };
        log::debug!("loaded preferences: {:?}", prefs);
        prefs
    }

    /// Key/value pairs to persist, one per preference.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        let config = serde_json::to_string(&self.config).unwrap_or_else(|err| {
            log::error!("could not encode game config: {}", err);
            String::new()
        });
        alloc::vec![
            (GAME_KEY, config),
            (LEVEL_KEY, self.level.name().to_string()),
            (MARKS_KEY, encode_bool(self.marks).to_string()),
            (SCALE_KEY, self.scale.to_string()),
            (STATUS_BAR_KEY, encode_bool(self.status_bar).to_string()),
        ]
    }

    /// Switches to a preset, or to `custom` with a clamped config. Returns the config to play.
    pub fn select(&mut self, level: Level, custom: Option<GameConfig>) -> GameConfig {
        let config = match (level.config(), custom) {
            (Some(preset), _) => preset,
            (None, Some(custom)) => custom.clamped(),
            (None, None) => self.config,
        };
        self.level = level;
        self.config = config;
        config
    }
}

const fn encode_bool(value: bool) -> &'static str {
    if value { "1" } else { "0" }
}

/// Only `"1"` counts as set.
fn decode_bool(raw: &str) -> bool {
    raw == "1"
}

fn decode_scale(raw: &str) -> Option<u16> {
    match raw.trim().parse::<u16>() {
        Ok(scale) if SCALES.contains(&scale) => Some(scale),
        _ => {
            log::warn!("ignoring stored scale {:?}", raw);
            None
        }
    }
}
