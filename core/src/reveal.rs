use alloc::collections::VecDeque;
use core::ops::BitOr;

use crate::*;

/// What a reveal did to the board.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RevealReport {
    /// Safe cells newly revealed, cascades included.
    pub revealed: CellCount,
    pub hit_mine: bool,
}

impl RevealReport {
    pub const fn has_update(self) -> bool {
        self.revealed > 0 || self.hit_mine
    }
}

/// Used to merge reports when revealing several cells at once.
impl BitOr for RevealReport {
    type Output = RevealReport;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self {
            revealed: self.revealed + rhs.revealed,
            hit_mine: self.hit_mine || rhs.hit_mine,
        }
    }
}

/// Reveals a covered cell and floods outward through zero-count cells.
///
/// Revealed, flagged, questioned and out-of-range cells are left untouched. A mine is
/// marked as detonated.
pub fn reveal(board: &mut Board, index: CellIndex) -> RevealReport {
    let Some(cell) = board.cell(index) else {
        return RevealReport::default();
    };
    if cell.cover() != Cover::Covered {
        return RevealReport::default();
    }

    if cell.is_mine() {
        log::debug!("mine hit at {}", index);
        board.set_cover(index, Cover::Detonated);
        return RevealReport {
            revealed: 0,
            hit_mine: true,
        };
    }

    let mut report = RevealReport::default();
    let mut to_visit = VecDeque::from([index]);

    while let Some(visit) = to_visit.pop_front() {
        let Some(visit_cell) = board.cell(visit) else {
            continue;
        };
        // the cover doubles as the visited marker
        if visit_cell.cover() != Cover::Covered || visit_cell.is_mine() {
            continue;
        }

        board.set_cover(visit, Cover::Revealed);
        report.revealed += 1;
        log::trace!("revealed {} ({:?})", visit, visit_cell.content());

        if visit_cell.adjacent_mines() == Some(0) {
            let covered: alloc::vec::Vec<_> = board
                .neighbors(visit)
                .filter(|&pos| board.cell(pos).is_some_and(|c| c.cover() == Cover::Covered))
                .collect();
            to_visit.extend(covered);
        }
    }

    report
}

/// Number of flagged cells around `index`.
pub fn flagged_neighbors(board: &Board, index: CellIndex) -> u8 {
    board
        .neighbors(index)
        .filter(|&pos| board.cell(pos).is_some_and(|c| c.cover() == Cover::Flagged))
        .count() as u8
}

/// Whether `index` is a revealed number whose flagged neighbors match its count.
pub fn can_chord(board: &Board, index: CellIndex) -> bool {
    match board.cell(index) {
        Some(cell) if cell.cover() == Cover::Revealed => match cell.adjacent_mines() {
            Some(count) if count > 0 => count == flagged_neighbors(board, index),
            _ => false,
        },
        _ => false,
    }
}

/// Reveals every covered neighbor of a revealed number, but only when the flags around it
/// account for all of its mines. Otherwise nothing happens.
pub fn chord_reveal(board: &mut Board, index: CellIndex) -> RevealReport {
    if !can_chord(board, index) {
        log::trace!("chord at {} does not match its flags", index);
        return RevealReport::default();
    }

    let neighbors: alloc::vec::Vec<_> = board.neighbors(index).collect();
    neighbors
        .into_iter()
        .map(|pos| reveal(board, pos))
        .fold(RevealReport::default(), BitOr::bitor)
}
