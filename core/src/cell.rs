use serde::{Deserialize, Serialize};

/// What lies under a cell, fixed when the board is generated.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Content {
    Mine,
    /// Safe cell with the number of mines among its neighbors.
    Empty(u8),
}

impl Default for Content {
    fn default() -> Self {
        Self::Empty(0)
    }
}

/// Player-visible state of a cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cover {
    Covered,
    Flagged,
    Questioned,
    Revealed,
    /// Mine uncovered by a reveal, ends the round.
    Detonated,
}

impl Cover {
    /// Flagged and questioned cells still count as covered.
    pub const fn is_covered(self) -> bool {
        matches!(self, Self::Covered | Self::Flagged | Self::Questioned)
    }
}

impl Default for Cover {
    fn default() -> Self {
        Self::Covered
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub(crate) content: Content,
    pub(crate) cover: Cover,
}

impl Cell {
    pub const fn content(self) -> Content {
        self.content
    }

    pub const fn cover(self) -> Cover {
        self.cover
    }

    pub const fn is_mine(self) -> bool {
        matches!(self.content, Content::Mine)
    }

    /// Adjacent mine count, `None` for mines.
    pub const fn adjacent_mines(self) -> Option<u8> {
        match self.content {
            Content::Mine => None,
            Content::Empty(count) => Some(count),
        }
    }
}
