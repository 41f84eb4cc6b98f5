use serde::{Deserialize, Serialize};

use crate::*;

pub const MIN_ROWS: Coord = 8;
pub const MAX_ROWS: Coord = 24;
pub const MIN_COLUMNS: Coord = 8;
pub const MAX_COLUMNS: Coord = 30;
pub const MIN_MINES: CellCount = 10;

/// Substituted for a height or width that is not a number.
pub const DEFAULT_SIDE: Coord = 8;
/// Substituted for a mine count that is not a number.
pub const DEFAULT_MINES: CellCount = 10;

/// Board dimensions and mine count, always within the supported range when built through
/// [`GameConfig::new`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawConfig")]
pub struct GameConfig {
    pub rows: Coord,
    pub columns: Coord,
    pub mines: CellCount,
}

/// Persisted shape of a config, wide enough to hold any out-of-range value before clamping.
#[derive(Deserialize)]
struct RawConfig {
    rows: i64,
    columns: i64,
    mines: i64,
}

impl From<RawConfig> for GameConfig {
    fn from(raw: RawConfig) -> Self {
        Self::new(raw.rows, raw.columns, raw.mines)
    }
}

impl GameConfig {
    pub const BEGINNER: Self = Self::new_unchecked(9, 9, 10);
    pub const INTERMEDIATE: Self = Self::new_unchecked(16, 16, 40);
    pub const EXPERT: Self = Self::new_unchecked(16, 30, 99);

    pub const fn new_unchecked(rows: Coord, columns: Coord, mines: CellCount) -> Self {
        Self {
            rows,
            columns,
            mines,
        }
    }

    /// Clamps every value into range: rows `8..=24`, columns `8..=30`,
    /// mines `10..=(rows-1)*(columns-1)`.
    pub fn new(rows: i64, columns: i64, mines: i64) -> Self {
        let rows = rows.clamp(MIN_ROWS.into(), MAX_ROWS.into()) as Coord;
        let columns = columns.clamp(MIN_COLUMNS.into(), MAX_COLUMNS.into()) as Coord;
        let mines = mines.clamp(MIN_MINES.into(), Self::max_mines(rows, columns).into())
            as CellCount;
        Self::new_unchecked(rows, columns, mines)
    }

    /// Builds a config from free-form text fields, as typed into a custom-field dialog.
    pub fn parse(height: &str, width: &str, mines: &str) -> Self {
        fn field(text: &str, name: &str, default: i64) -> i64 {
            text.trim().parse().unwrap_or_else(|_| {
                log::warn!("{} {:?} is not a number, using {}", name, text, default);
                default
            })
        }

        Self::new(
            field(height, "height", DEFAULT_SIDE.into()),
            field(width, "width", DEFAULT_SIDE.into()),
            field(mines, "mines", DEFAULT_MINES.into()),
        )
    }

    /// Re-applies the range rules to a config whose fields were set directly.
    pub fn clamped(self) -> Self {
        Self::new(self.rows.into(), self.columns.into(), self.mines.into())
    }

    pub const fn max_mines(rows: Coord, columns: Coord) -> CellCount {
        mult(rows.saturating_sub(1), columns.saturating_sub(1))
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.rows, self.columns)
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::BEGINNER
    }
}

/// Preset difficulty, or a custom field.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Level {
    Beginner,
    Intermediate,
    Expert,
    Custom,
}

impl Level {
    pub const ALL: [Level; 4] = [
        Level::Beginner,
        Level::Intermediate,
        Level::Expert,
        Level::Custom,
    ];

    /// Preset config, `None` for [`Level::Custom`].
    pub const fn config(self) -> Option<GameConfig> {
        match self {
            Self::Beginner => Some(GameConfig::BEGINNER),
            Self::Intermediate => Some(GameConfig::INTERMEDIATE),
            Self::Expert => Some(GameConfig::EXPERT),
            Self::Custom => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Expert => "expert",
            Self::Custom => "custom",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|level| level.name() == name)
    }

    /// The preset matching `config`, or [`Level::Custom`].
    pub fn of(config: GameConfig) -> Self {
        Self::ALL
            .into_iter()
            .find(|level| level.config() == Some(config))
            .unwrap_or(Self::Custom)
    }
}

impl Default for Level {
    fn default() -> Self {
        Self::Beginner
    }
}
