use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// What a renderer shows for one cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tile {
    Closed,
    Open(u8),
    Flag,
    Question,
    Exploded,
    // these are only used to show result after the game finishes:
    Mine,
    IncorrectFlag,
}

impl Tile {
    /// Display form of `cell` in the given phase; a lost round uncovers mines and wrong flags.
    pub const fn of(cell: Cell, phase: Phase) -> Self {
        let lost = matches!(phase, Phase::Exploded);
        match (cell.cover, cell.content) {
            (Cover::Detonated, _) => Tile::Exploded,
            (Cover::Revealed, Content::Empty(count)) => Tile::Open(count),
            (Cover::Revealed, Content::Mine) => Tile::Exploded,
            (Cover::Covered | Cover::Questioned, Content::Mine) if lost => Tile::Mine,
            (Cover::Covered, _) => Tile::Closed,
            (Cover::Questioned, _) => Tile::Question,
            (Cover::Flagged, Content::Empty(_)) if lost => Tile::IncorrectFlag,
            (Cover::Flagged, _) => Tile::Flag,
        }
    }

    /// Whether the tile is visually closed.
    pub const fn is_closed(self) -> bool {
        use Tile::*;
        match self {
            Closed => true,
            Open(_) => false,
            Flag => true,
            Question => true,
            Exploded => false,
            Mine => false,
            IncorrectFlag => true,
        }
    }
}

impl Default for Tile {
    fn default() -> Self {
        Self::Closed
    }
}

/// Read-only picture of the board handed to the renderer after every action.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub phase: Phase,
    pub tiles: Array2<Tile>,
}

impl Snapshot {
    pub fn of(board: &Board, phase: Phase) -> Self {
        let tiles = Array2::from_shape_fn(
            (usize::from(board.rows()), usize::from(board.columns())),
            |(row, column)| {
                board
                    .cell(row * usize::from(board.columns()) + column)
                    .map_or(Tile::Closed, |cell| Tile::of(cell, phase))
            },
        );
        Self { phase, tiles }
    }

    pub fn rows(&self) -> usize {
        self.tiles.nrows()
    }

    pub fn columns(&self) -> usize {
        self.tiles.ncols()
    }

    pub fn tile(&self, index: CellIndex) -> Option<Tile> {
        let columns = self.columns();
        if columns == 0 {
            return None;
        }
        self.tiles.get((index / columns, index % columns)).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lost_round_shows_mines_and_wrong_flags() {
        let mut board = Board::from_mines(2, 2, &[0, 1]).unwrap();
        board.set_cover(0, Cover::Flagged);
        board.set_cover(2, Cover::Flagged);
        board.set_cover(1, Cover::Detonated);

        let snapshot = Snapshot::of(&board, Phase::Exploded);

        assert_eq!(snapshot.tile(0), Some(Tile::Flag));
        assert_eq!(snapshot.tile(1), Some(Tile::Exploded));
        assert_eq!(snapshot.tile(2), Some(Tile::IncorrectFlag));
        assert_eq!(snapshot.tile(3), Some(Tile::Closed));
        assert_eq!(snapshot.tile(4), None);
    }

    #[test]
    fn playing_round_hides_mines() {
        let mut board = Board::from_mines(2, 2, &[0]).unwrap();
        board.set_cover(1, Cover::Questioned);
        board.set_cover(3, Cover::Revealed);

        let snapshot = Snapshot::of(&board, Phase::Playing);

        assert_eq!(snapshot.tile(0), Some(Tile::Closed));
        assert_eq!(snapshot.tile(1), Some(Tile::Question));
        assert_eq!(snapshot.tile(3), Some(Tile::Open(1)));
        assert!(snapshot.tile(0).unwrap().is_closed());
    }
}
