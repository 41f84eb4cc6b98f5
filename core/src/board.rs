use ndarray::Array2;
use rand::prelude::*;

use crate::*;

/// The minefield of a single round: every cell's content and cover, plus how many cells are
/// still covered.
#[derive(Clone, Debug, PartialEq)]
pub struct Board {
    cells: Array2<Cell>,
    size: (Coord, Coord),
    mine_count: CellCount,
    remaining_covered: CellCount,
}

impl Board {
    /// Places `mines` mines by rejection sampling: pick a random cell, skip it if already
    /// mined, repeat until the count is reached.
    pub fn generate<R: Rng + ?Sized>(
        rows: Coord,
        columns: Coord,
        mines: CellCount,
        rng: &mut R,
    ) -> Result<Self> {
        let total_cells = Self::check_size(rows, columns, mines)?;
        let mut mine_mask: Array2<bool> = Array2::default((usize::from(rows), usize::from(columns)));
        let mut mines_placed = 0;

        while mines_placed < mines {
            let place = rng.random_range(0..usize::from(total_cells));
            let coords = [place / usize::from(columns), place % usize::from(columns)];
            if !mine_mask[coords] {
                mine_mask[coords] = true;
                mines_placed += 1;
            }
        }

        log::debug!("generated {}x{} board with {} mines", rows, columns, mines);
        Ok(Self::from_mine_mask(mine_mask, (rows, columns), mines))
    }

    pub fn generate_seeded(rows: Coord, columns: Coord, mines: CellCount, seed: u64) -> Result<Self> {
        let mut rng = SmallRng::seed_from_u64(seed);
        Self::generate(rows, columns, mines, &mut rng)
    }

    /// Builds a board with mines at exactly the given linear indices, duplicates ignored.
    pub fn from_mines(rows: Coord, columns: Coord, mines: &[CellIndex]) -> Result<Self> {
        let total_cells = Self::check_size(rows, columns, 0)?;
        let mut mine_mask: Array2<bool> = Array2::default((usize::from(rows), usize::from(columns)));

        for &index in mines {
            if index >= usize::from(total_cells) {
                return Err(GameError::InvalidIndex);
            }
            mine_mask[[index / usize::from(columns), index % usize::from(columns)]] = true;
        }

        let mine_count = mine_mask.iter().filter(|&&is_mine| is_mine).count() as CellCount;
        if mine_count >= total_cells {
            return Err(GameError::TooManyMines);
        }

        Ok(Self::from_mine_mask(mine_mask, (rows, columns), mine_count))
    }

    fn check_size(rows: Coord, columns: Coord, mines: CellCount) -> Result<CellCount> {
        let total_cells = mult(rows, columns);
        if total_cells == 0 {
            return Err(GameError::InvalidSize);
        }
        if mines >= total_cells {
            log::warn!(
                "refusing to place {} mines on a board of {} cells",
                mines,
                total_cells
            );
            return Err(GameError::TooManyMines);
        }
        Ok(total_cells)
    }

    fn from_mine_mask(mine_mask: Array2<bool>, size: (Coord, Coord), mine_count: CellCount) -> Self {
        let mut board = Self {
            cells: Array2::default(mine_mask.dim()),
            size,
            mine_count,
            remaining_covered: mult(size.0, size.1),
        };

        for (coords, &is_mine) in mine_mask.indexed_iter() {
            if is_mine {
                board.cells[coords].content = Content::Mine;
            }
        }
        for index in 0..board.len() {
            board.recount(index);
        }

        board
    }

    pub fn rows(&self) -> Coord {
        self.size.0
    }

    pub fn columns(&self) -> Coord {
        self.size.1
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    /// Cells not yet revealed, flagged and questioned ones included.
    pub fn remaining_covered(&self) -> CellCount {
        self.remaining_covered
    }

    /// Whether only mines are left covered.
    pub fn is_cleared(&self) -> bool {
        self.remaining_covered == self.mine_count
    }

    pub fn contains(&self, index: CellIndex) -> bool {
        index < self.len()
    }

    pub fn validate_index(&self, index: CellIndex) -> Result<CellIndex> {
        if self.contains(index) {
            Ok(index)
        } else {
            Err(GameError::InvalidIndex)
        }
    }

    pub fn cell(&self, index: CellIndex) -> Option<Cell> {
        self.contains(index).then(|| self.cells[self.nd(index)])
    }

    pub fn index_of(&self, row: Coord, column: Coord) -> Option<CellIndex> {
        (row < self.size.0 && column < self.size.1)
            .then(|| usize::from(row) * usize::from(self.size.1) + usize::from(column))
    }

    /// The up to eight cells around `index`; empty when `index` is out of range.
    pub fn neighbors(&self, index: CellIndex) -> NeighborIter {
        let dim = self.cells.dim();
        if self.contains(index) {
            NeighborIter::new(index, dim)
        } else {
            NeighborIter::new(0, (0, 0))
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (CellIndex, Cell)> + '_ {
        self.cells.iter().copied().enumerate()
    }

    pub fn mines(&self) -> impl Iterator<Item = CellIndex> + '_ {
        self.iter()
            .filter(|(_, cell)| cell.is_mine())
            .map(|(index, _)| index)
    }

    /// Moves the mine at `index` to a uniformly random mine-free cell, updating adjacency
    /// around both spots. Returns where the mine went, or `None` when `index` held no mine.
    pub fn relocate_mine<R: Rng + ?Sized>(
        &mut self,
        index: CellIndex,
        rng: &mut R,
    ) -> Result<Option<CellIndex>> {
        let index = self.validate_index(index)?;
        if !self.cells[self.nd(index)].is_mine() {
            return Ok(None);
        }

        let free_cells = self.len() - usize::from(self.mine_count);
        if free_cells == 0 {
            return Err(GameError::TooManyMines);
        }

        let pick = rng.random_range(0..free_cells);
        let target = self
            .iter()
            .filter(|(_, cell)| !cell.is_mine())
            .map(|(index, _)| index)
            .nth(pick)
            .ok_or(GameError::TooManyMines)?;

        let from = self.nd(index);
        let to = self.nd(target);
        self.cells[from].content = Content::Empty(0);
        self.cells[to].content = Content::Mine;

        let affected: alloc::vec::Vec<CellIndex> = [index, target]
            .into_iter()
            .chain(self.neighbors(index))
            .chain(self.neighbors(target))
            .collect();
        for pos in affected {
            self.recount(pos);
        }

        log::debug!("moved mine from {} to {}", index, target);
        Ok(Some(target))
    }

    /// Recomputes the adjacency count of a safe cell; mines are left alone.
    fn recount(&mut self, index: CellIndex) {
        let coords = self.nd(index);
        if self.cells[coords].is_mine() {
            return;
        }
        let count = self
            .neighbors(index)
            .filter(|&pos| self.cells[self.nd(pos)].is_mine())
            .count() as u8;
        self.cells[coords].content = Content::Empty(count);
    }

    pub(crate) fn set_cover(&mut self, index: CellIndex, cover: Cover) {
        let coords = self.nd(index);
        let cell = &mut self.cells[coords];
        if cell.cover.is_covered() && !cover.is_covered() && !cell.is_mine() {
            self.remaining_covered -= 1;
        }
        cell.cover = cover;
    }

    /// Flags every mine still covered or questioned, returning how many new flags were set.
    pub(crate) fn flag_remaining_mines(&mut self) -> CellCount {
        let mut flagged = 0;
        for cell in self.cells.iter_mut() {
            if cell.is_mine() && matches!(cell.cover, Cover::Covered | Cover::Questioned) {
                cell.cover = Cover::Flagged;
                flagged += 1;
            }
        }
        flagged
    }

    fn nd(&self, index: CellIndex) -> [usize; 2] {
        let columns = usize::from(self.size.1);
        [index / columns, index % columns]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    #[test]
    fn generate_places_exact_mine_count() {
        for (seed, config) in [
            GameConfig::BEGINNER,
            GameConfig::INTERMEDIATE,
            GameConfig::EXPERT,
            GameConfig::new(24, 30, 667),
        ]
        .into_iter()
        .enumerate()
        {
            let board =
                Board::generate_seeded(config.rows, config.columns, config.mines, seed as u64)
                    .unwrap();
            let mines = board.mines().count();
            assert_eq!(mines, usize::from(config.mines));
            assert_eq!(board.len() - mines, usize::from(config.total_cells() - config.mines));
            assert_eq!(board.remaining_covered(), config.total_cells());
            assert!(board.iter().all(|(_, cell)| cell.cover() == Cover::Covered));
        }
    }

    #[test]
    fn generate_is_deterministic_per_seed() {
        let a = Board::generate_seeded(16, 30, 99, 42).unwrap();
        let b = Board::generate_seeded(16, 30, 99, 42).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn generate_rejects_full_board() {
        assert_eq!(
            Board::generate_seeded(3, 3, 9, 0),
            Err(GameError::TooManyMines)
        );
        assert_eq!(Board::generate_seeded(0, 3, 0, 0), Err(GameError::InvalidSize));
        assert_eq!(Board::from_mines(1, 2, &[0, 1]), Err(GameError::TooManyMines));
    }

    #[test]
    fn adjacency_counts_match_neighbor_mines() {
        let board = Board::generate_seeded(9, 9, 10, 7).unwrap();
        for (index, cell) in board.iter() {
            if let Some(count) = cell.adjacent_mines() {
                let expected = board
                    .neighbors(index)
                    .filter(|&pos| board.cell(pos).is_some_and(Cell::is_mine))
                    .count();
                assert_eq!(usize::from(count), expected);
            }
        }
    }

    #[test]
    fn neighbor_counts_stay_in_range() {
        let board = Board::from_mines(8, 8, &[]).unwrap();
        for index in 0..board.len() {
            let found: Vec<_> = board.neighbors(index).collect();
            assert!((3..=8).contains(&found.len()));
            assert!(!found.contains(&index));
            assert!(found.iter().all(|&pos| board.contains(pos)));
        }
        assert_eq!(board.neighbors(64).count(), 0);
    }

    #[test]
    fn from_mines_rejects_out_of_range() {
        assert_eq!(Board::from_mines(2, 2, &[4]), Err(GameError::InvalidIndex));
    }

    #[test]
    fn relocate_moves_mine_and_updates_counts() {
        let mut board = Board::from_mines(3, 3, &[4]).unwrap();
        let mut rng = SmallRng::seed_from_u64(3);

        let target = board.relocate_mine(4, &mut rng).unwrap().unwrap();

        assert_ne!(target, 4);
        assert_eq!(board.mines().collect::<Vec<_>>(), [target]);
        assert_eq!(board.mine_count(), 1);
        for (index, cell) in board.iter() {
            if let Some(count) = cell.adjacent_mines() {
                let expected = board.neighbors(index).filter(|&pos| pos == target).count();
                assert_eq!(usize::from(count), expected);
            }
        }
    }

    #[test]
    fn relocate_ignores_safe_cells() {
        let mut board = Board::from_mines(3, 3, &[0]).unwrap();
        let mut rng = SmallRng::seed_from_u64(3);
        let before = board.clone();

        assert_eq!(board.relocate_mine(8, &mut rng), Ok(None));
        assert_eq!(board, before);
        assert_eq!(board.relocate_mine(9, &mut rng), Err(GameError::InvalidIndex));
    }
}
