use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::*;

bitflags! {
    /// Live mouse button state, laid out like `MouseEvent.buttons`.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct MouseButtons: u16 {
        const PRIMARY   = 1;
        const SECONDARY = 1 << 1;
        const AUXILIARY = 1 << 2;
        const BACK      = 1 << 3;
        const FORWARD   = 1 << 4;
    }
}

impl MouseButtons {
    /// The buttons that take part in play; back and forward are ignored.
    pub const PLAY: Self = Self::PRIMARY.union(Self::SECONDARY).union(Self::AUXILIARY);

    /// Auxiliary alone, or primary and secondary together.
    pub fn is_chord(self) -> bool {
        let play = self & Self::PLAY;
        play == Self::AUXILIARY || play == Self::PRIMARY | Self::SECONDARY
    }

    fn is_primary_only(self) -> bool {
        self & Self::PLAY == Self::PRIMARY
    }
}

/// Element a pointer event happened on.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Target {
    Cell(CellIndex),
    /// The new-game button between the counters.
    Face,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerKind {
    Down,
    Up,
    Enter,
    Leave,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub kind: PointerKind,
    /// `None` when the event happened outside the board and the face.
    pub target: Option<Target>,
    /// Buttons still held after the event.
    pub buttons: MouseButtons,
}

impl PointerEvent {
    pub const fn new(kind: PointerKind, target: Option<Target>, buttons: MouseButtons) -> Self {
        Self {
            kind,
            target,
            buttons,
        }
    }

    /// Builds an event from the raw `MouseEvent.buttons` bitmask, dropping unknown bits.
    pub const fn from_raw(kind: PointerKind, target: Option<Target>, buttons: u16) -> Self {
        Self::new(kind, target, MouseButtons::from_bits_truncate(buttons))
    }
}

/// What the face button shows.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Face {
    Smile,
    /// A cell is being pressed.
    Surprised,
    /// The face itself is being pressed.
    Sunken,
    Dead,
    Win,
}

/// Turns a press / move / release sequence into at most one [`Action`].
///
/// Tracks where the sequence started (`origin`), what the pointer is over now (`current`),
/// the live buttons, and every button held since the sequence began. All of it is cleared
/// once every button is released.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PointerTracker {
    origin: Option<Target>,
    current: Option<Target>,
    buttons: MouseButtons,
    held: MouseButtons,
}

impl PointerTracker {
    pub fn origin(&self) -> Option<Target> {
        self.origin
    }

    pub fn current(&self) -> Option<Target> {
        self.current
    }

    pub fn buttons(&self) -> MouseButtons {
        self.buttons
    }

    pub fn is_idle(&self) -> bool {
        self.origin.is_none() && self.buttons.is_empty()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn handle(&mut self, event: PointerEvent) -> Option<Action> {
        use PointerKind::*;

        log::trace!("pointer {:?}", event);
        match event.kind {
            Down => {
                self.origin = self.origin.or(event.target);
                self.current = event.target;
                self.buttons = event.buttons;
                self.held |= event.buttons;

                // flagging reacts on press, not on release
                match event.target {
                    Some(Target::Cell(index)) if event.buttons == MouseButtons::SECONDARY => {
                        Some(Action::ToggleFlag(index))
                    }
                    _ => None,
                }
            }
            Enter => {
                if event.buttons.is_empty() {
                    // buttons were released somewhere we could not see
                    if !self.is_idle() {
                        self.reset();
                    }
                    return None;
                }
                // entering the face mid-press never starts a sequence on it
                if self.origin.is_none() && event.target == Some(Target::Face) {
                    return None;
                }
                self.origin = self.origin.or(event.target);
                self.current = event.target;
                self.buttons = event.buttons;
                self.held |= event.buttons;
                None
            }
            Leave => {
                self.current = None;
                self.buttons = event.buttons;
                if event.buttons.is_empty() {
                    self.reset();
                }
                None
            }
            Up => {
                self.current = event.target;
                self.buttons = event.buttons;
                if !event.buttons.is_empty() {
                    return None;
                }
                let action = self.release_action();
                self.reset();
                action
            }
        }
    }

    fn release_action(&self) -> Option<Action> {
        match (self.origin, self.current) {
            (Some(Target::Face), Some(Target::Face)) if self.held.is_primary_only() => {
                Some(Action::NewGame)
            }
            (Some(Target::Cell(_)), Some(Target::Cell(index))) if self.held.is_primary_only() => {
                Some(Action::Reveal(index))
            }
            (Some(Target::Cell(_)), Some(Target::Cell(index))) if self.held.is_chord() => {
                Some(Action::ChordReveal(index))
            }
            _ => None,
        }
    }

    /// Cells to draw pressed: the cell under a primary-only press, or that cell and its
    /// neighbors under a chord combination. Only covered or questioned cells qualify.
    pub fn pressed_cells(&self, board: &Board, phase: Phase) -> SmallVec<[CellIndex; 9]> {
        let mut pressed = SmallVec::new();
        if phase.is_final() || matches!(self.origin, None | Some(Target::Face)) {
            return pressed;
        }
        let Some(Target::Cell(index)) = self.current else {
            return pressed;
        };

        let qualifies = |pos: CellIndex| {
            board
                .cell(pos)
                .is_some_and(|cell| matches!(cell.cover(), Cover::Covered | Cover::Questioned))
        };

        if self.buttons.is_primary_only() {
            pressed.extend(Some(index).into_iter().filter(|&pos| qualifies(pos)));
        } else if self.buttons.is_chord() {
            pressed.extend(
                Some(index)
                    .into_iter()
                    .chain(board.neighbors(index))
                    .filter(|&pos| qualifies(pos)),
            );
        }
        pressed
    }

    pub fn face(&self, phase: Phase) -> Face {
        let on_face =
            self.origin == Some(Target::Face) && self.current == Some(Target::Face);
        if on_face && self.buttons.is_primary_only() {
            return Face::Sunken;
        }
        match phase {
            Phase::Exploded => Face::Dead,
            Phase::Won => Face::Win,
            Phase::New | Phase::Playing => {
                let pressing_cell = matches!(self.origin, Some(Target::Cell(_)))
                    && self.buttons.contains(MouseButtons::PRIMARY);
                if pressing_cell {
                    Face::Surprised
                } else {
                    Face::Smile
                }
            }
        }
    }
}
