/// Single coordinate axis used for board rows and columns.
pub type Coord = u8;

/// Count type used for mine counts, flag counts and total-cell counts.
pub type CellCount = u16;

/// Linear cell position, `row * columns + column`.
pub type CellIndex = usize;

pub const fn mult(a: Coord, b: Coord) -> CellCount {
    let a = a as CellCount;
    let b = b as CellCount;
    a.saturating_mul(b)
}

const DISPLACEMENTS: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Applies `delta` to `(row, column)`, returning a value only when it remains in bounds.
fn apply_delta(
    coords: (usize, usize),
    delta: (isize, isize),
    bounds: (usize, usize),
) -> Option<(usize, usize)> {
    let (row, column) = coords;
    let (d_row, d_column) = delta;
    let (rows, columns) = bounds;

    let next_row = row.checked_add_signed(d_row)?;
    if next_row >= rows {
        return None;
    }

    let next_column = column.checked_add_signed(d_column)?;
    if next_column >= columns {
        return None;
    }

    Some((next_row, next_column))
}

/// Iterates the linear indices of the up to eight cells around a center cell.
///
/// Rows never wrap: column 0 is not adjacent to the last column of the previous row.
#[derive(Clone, Debug)]
pub struct NeighborIter {
    center: (usize, usize),
    bounds: (usize, usize),
    index: u8,
}

impl NeighborIter {
    /// `bounds` is `(rows, columns)`; `center` must lie inside it.
    pub(crate) fn new(center: CellIndex, bounds: (usize, usize)) -> Self {
        let columns = bounds.1.max(1);
        Self {
            center: (center / columns, center % columns),
            bounds,
            index: 0,
        }
    }
}

impl Iterator for NeighborIter {
    type Item = CellIndex;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if usize::from(self.index) >= DISPLACEMENTS.len() {
                return None;
            }

            let next_item =
                apply_delta(self.center, DISPLACEMENTS[self.index as usize], self.bounds);
            self.index += 1;

            if let Some((row, column)) = next_item {
                return Some(row * self.bounds.1 + column);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    fn neighbors(index: CellIndex, bounds: (usize, usize)) -> Vec<CellIndex> {
        let mut found: Vec<_> = NeighborIter::new(index, bounds).collect();
        found.sort_unstable();
        found
    }

    #[test]
    fn corner_has_three_neighbors() {
        assert_eq!(neighbors(0, (3, 4)), [1, 4, 5]);
        assert_eq!(neighbors(11, (3, 4)), [6, 7, 10]);
    }

    #[test]
    fn interior_has_eight_neighbors() {
        assert_eq!(neighbors(5, (3, 4)), [0, 1, 2, 4, 6, 8, 9, 10]);
    }

    #[test]
    fn row_edges_do_not_wrap() {
        // column 0 of row 1 must not see column 3 of row 0
        assert_eq!(neighbors(4, (3, 4)), [0, 1, 5, 8, 9]);
        assert_eq!(neighbors(7, (3, 4)), [2, 3, 6, 10, 11]);
    }

    #[test]
    fn mult_saturates() {
        assert_eq!(mult(24, 30), 720);
        assert_eq!(mult(Coord::MAX, Coord::MAX), 65025);
    }
}
