use rand::prelude::*;
use serde::{Deserialize, Serialize};

use crate::*;

/// Valid transitions:
/// - New -> Playing
/// - Playing -> Exploded
/// - Playing -> Won
/// - any -> New, only through a new game
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Board generated, nothing revealed yet
    New,
    /// First reveal done, clock running
    Playing,
    /// A mine was revealed
    Exploded,
    /// Every safe cell was revealed
    Won,
}

impl Phase {
    pub const fn is_new(self) -> bool {
        matches!(self, Self::New)
    }

    /// Indicates the round has ended and no moves can be made anymore
    pub const fn is_final(self) -> bool {
        matches!(self, Self::Exploded | Self::Won)
    }
}

impl Default for Phase {
    fn default() -> Self {
        Self::New
    }
}

/// Receives the session changes a renderer cares about. Each callback fires independently
/// and only when its value actually changed.
pub trait SessionObserver {
    fn on_flags_change(&mut self, _flags: CellCount) {}

    fn on_time_change(&mut self, _seconds: u32) {}

    fn on_status_change(&mut self, _phase: Phase) {}

    /// The one-second ticker should be started (`true`) or dropped (`false`).
    fn on_timer_change(&mut self, _running: bool) {}
}

impl SessionObserver for () {}

/// One round of play plus what is needed to start the next: owns the board, the phase, the
/// flag count and the clock.
#[derive(Clone, Debug)]
pub struct Session {
    config: GameConfig,
    board: Board,
    phase: Phase,
    flag_count: CellCount,
    clock: Clock,
    marks_enabled: bool,
    rng: SmallRng,
}

impl Session {
    /// Clamps `config` and generates the first board from `seed`.
    pub fn new(config: GameConfig, seed: u64) -> Result<Self> {
        let config = config.clamped();
        let mut rng = SmallRng::seed_from_u64(seed);
        let board = Board::generate(config.rows, config.columns, config.mines, &mut rng)?;
        Ok(Self::from_parts(config, board, rng))
    }

    /// Starts from a prepared board; later rounds reuse its dimensions and mine count as-is.
    pub fn with_board(board: Board, seed: u64) -> Self {
        let config = GameConfig::new_unchecked(board.rows(), board.columns(), board.mine_count());
        Self::from_parts(config, board, SmallRng::seed_from_u64(seed))
    }

    fn from_parts(config: GameConfig, board: Board, rng: SmallRng) -> Self {
        Self {
            config,
            board,
            phase: Phase::New,
            flag_count: 0,
            clock: Clock::default(),
            marks_enabled: true,
            rng,
        }
    }

    pub fn config(&self) -> GameConfig {
        self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn flag_count(&self) -> CellCount {
        self.flag_count
    }

    pub fn elapsed_secs(&self) -> u32 {
        self.clock.elapsed_secs()
    }

    pub fn timer_running(&self) -> bool {
        self.clock.is_running()
    }

    /// How many mines have not been flagged yet, negative when over-flagged.
    pub fn mines_left(&self) -> i32 {
        i32::from(self.board.mine_count()) - i32::from(self.flag_count)
    }

    pub fn marks_enabled(&self) -> bool {
        self.marks_enabled
    }

    /// With marks disabled a flag cycles straight back to covered.
    pub fn set_marks_enabled(&mut self, enabled: bool) {
        self.marks_enabled = enabled;
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::of(&self.board, self.phase)
    }

    /// Whether a chord at `index` would fire right now.
    pub fn is_chordable(&self, index: CellIndex) -> bool {
        !self.phase.is_final() && can_chord(&self.board, index)
    }

    /// Applies one action, returning whether anything changed.
    pub fn dispatch(&mut self, action: Action, observer: &mut impl SessionObserver) -> Result<bool> {
        log::debug!("dispatch {:?} in {:?}", action, self.phase);
        Ok(match action {
            Action::Reveal(index) => self.reveal(index, observer).has_update(),
            Action::ChordReveal(index) => self.chord_reveal(index, observer).has_update(),
            Action::ToggleFlag(index) => self.toggle_flag(index, observer).has_update(),
            Action::NewGame => {
                self.new_game(observer)?;
                true
            }
        })
    }

    /// Reveals a covered cell. The first reveal of a round starts the clock and never hits a
    /// mine: a mine under it is moved elsewhere first.
    pub fn reveal(&mut self, index: CellIndex, observer: &mut impl SessionObserver) -> RevealOutcome {
        if self.phase.is_final() {
            return RevealOutcome::NoChange;
        }
        match self.board.cell(index) {
            Some(cell) if cell.cover() == Cover::Covered => {}
            _ => return RevealOutcome::NoChange,
        }

        if self.phase.is_new() {
            match self.board.relocate_mine(index, &mut self.rng) {
                Ok(Some(target)) => log::debug!("first reveal on a mine, moved it to {}", target),
                Ok(None) => {}
                Err(err) => {
                    log::error!("could not make first reveal safe: {}", err);
                    return RevealOutcome::NoChange;
                }
            }
            self.set_phase(Phase::Playing, observer);
            if self.clock.start() {
                observer.on_timer_change(true);
            }
        }

        let report = reveal(&mut self.board, index);
        self.settle(report, observer)
    }

    /// Reveals around a satisfied number; no-op unless its flags match its count.
    pub fn chord_reveal(
        &mut self,
        index: CellIndex,
        observer: &mut impl SessionObserver,
    ) -> RevealOutcome {
        if !matches!(self.phase, Phase::Playing) {
            return RevealOutcome::NoChange;
        }
        let report = chord_reveal(&mut self.board, index);
        self.settle(report, observer)
    }

    /// Cycles covered -> flagged -> questioned -> covered (questioned is skipped when marks
    /// are disabled).
    pub fn toggle_flag(&mut self, index: CellIndex, observer: &mut impl SessionObserver) -> MarkOutcome {
        use Cover::*;

        if self.phase.is_final() {
            return MarkOutcome::NoChange;
        }
        let Some(cell) = self.board.cell(index) else {
            return MarkOutcome::NoChange;
        };

        let (next, flags) = match cell.cover() {
            Covered => (Flagged, self.flag_count + 1),
            Flagged if self.marks_enabled => (Questioned, self.flag_count - 1),
            Flagged => (Covered, self.flag_count - 1),
            Questioned => (Covered, self.flag_count),
            Revealed | Detonated => return MarkOutcome::NoChange,
        };

        log::trace!("mark {} as {:?}", index, next);
        self.board.set_cover(index, next);
        self.set_flag_count(flags, observer);
        MarkOutcome::Changed
    }

    /// One tick of the external one-second ticker.
    pub fn tick(&mut self, observer: &mut impl SessionObserver) -> bool {
        if !matches!(self.phase, Phase::Playing) {
            return false;
        }
        match self.clock.tick() {
            Some(seconds) => {
                observer.on_time_change(seconds);
                true
            }
            None => false,
        }
    }

    /// Throws the current round away and generates a fresh board from the current config.
    pub fn new_game(&mut self, observer: &mut impl SessionObserver) -> Result<()> {
        let GameConfig {
            rows,
            columns,
            mines,
        } = self.config;
        self.board = Board::generate(rows, columns, mines, &mut self.rng)?;
        log::debug!("new game {}x{} with {} mines", rows, columns, mines);

        if self.clock.stop() {
            observer.on_timer_change(false);
        }
        if self.clock.elapsed_secs() != 0 {
            self.clock.reset();
            observer.on_time_change(0);
        }
        self.set_flag_count(0, observer);
        self.set_phase(Phase::New, observer);
        Ok(())
    }

    /// Applies a new (clamped) config and starts a new game with it.
    pub fn reconfigure(
        &mut self,
        config: GameConfig,
        observer: &mut impl SessionObserver,
    ) -> Result<()> {
        let config = config.clamped();
        let previous = core::mem::replace(&mut self.config, config);
        if let Err(err) = self.new_game(observer) {
            self.config = previous;
            return Err(err);
        }
        Ok(())
    }

    fn settle(&mut self, report: RevealReport, observer: &mut impl SessionObserver) -> RevealOutcome {
        if report.hit_mine {
            self.finish(Phase::Exploded, observer);
            RevealOutcome::HitMine
        } else if self.board.is_cleared() {
            let auto_flagged = self.board.flag_remaining_mines();
            self.set_flag_count(self.flag_count + auto_flagged, observer);
            self.finish(Phase::Won, observer);
            RevealOutcome::Won
        } else if report.has_update() {
            RevealOutcome::Revealed
        } else {
            RevealOutcome::NoChange
        }
    }

    fn finish(&mut self, phase: Phase, observer: &mut impl SessionObserver) {
        if self.clock.stop() {
            observer.on_timer_change(false);
        }
        log::debug!("round ended {:?} after {}s", phase, self.clock.elapsed_secs());
        self.set_phase(phase, observer);
    }

    fn set_phase(&mut self, phase: Phase, observer: &mut impl SessionObserver) {
        if self.phase != phase {
            self.phase = phase;
            observer.on_status_change(phase);
        }
    }

    fn set_flag_count(&mut self, flags: CellCount, observer: &mut impl SessionObserver) {
        if self.flag_count != flags {
            self.flag_count = flags;
            observer.on_flags_change(flags);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    #[derive(Debug, Default)]
    struct Recorder {
        flags: Vec<CellCount>,
        times: Vec<u32>,
        phases: Vec<Phase>,
        timer: Vec<bool>,
    }

    impl SessionObserver for Recorder {
        fn on_flags_change(&mut self, flags: CellCount) {
            self.flags.push(flags);
        }

        fn on_time_change(&mut self, seconds: u32) {
            self.times.push(seconds);
        }

        fn on_status_change(&mut self, phase: Phase) {
            self.phases.push(phase);
        }

        fn on_timer_change(&mut self, running: bool) {
            self.timer.push(running);
        }
    }

    fn session(rows: Coord, columns: Coord, mines: &[CellIndex]) -> Session {
        Session::with_board(Board::from_mines(rows, columns, mines).unwrap(), 5)
    }

    #[test]
    fn first_reveal_starts_playing_and_timer() {
        let mut session = session(3, 3, &[0]);
        let mut recorder = Recorder::default();

        assert_eq!(session.reveal(1, &mut recorder), RevealOutcome::Revealed);

        assert_eq!(session.phase(), Phase::Playing);
        assert!(session.timer_running());
        assert_eq!(recorder.phases, [Phase::Playing]);
        assert_eq!(recorder.timer, [true]);
    }

    #[test]
    fn first_reveal_on_mine_is_relocated() {
        let mut session = session(3, 3, &[4]);

        let outcome = session.reveal(4, &mut ());

        assert_ne!(outcome, RevealOutcome::HitMine);
        assert_eq!(session.phase(), Phase::Playing);
        assert!(!session.board().cell(4).unwrap().is_mine());
        assert_eq!(session.board().mine_count(), 1);
    }

    #[test]
    fn hitting_mine_explodes_and_stops_timer() {
        let mut session = session(3, 3, &[0]);
        let mut recorder = Recorder::default();
        session.toggle_flag(1, &mut recorder);
        session.toggle_flag(1, &mut recorder);
        session.reveal(8, &mut recorder);

        // 8 flooded everything but the mine and the questioned cell
        assert_eq!(session.phase(), Phase::Playing);
        assert_eq!(session.board().remaining_covered(), 2);
        assert_eq!(session.reveal(0, &mut recorder), RevealOutcome::HitMine);

        assert_eq!(session.phase(), Phase::Exploded);
        assert!(!session.timer_running());
        assert_eq!(recorder.timer, [true, false]);
        assert_eq!(recorder.phases, [Phase::Playing, Phase::Exploded]);
        assert_eq!(session.snapshot().tile(0), Some(Tile::Exploded));
    }

    #[test]
    fn win_auto_flags_mines_and_freezes_time() {
        let mut session = session(2, 2, &[0]);
        let mut recorder = Recorder::default();

        session.reveal(1, &mut recorder);
        session.tick(&mut recorder);
        session.reveal(2, &mut recorder);
        assert_eq!(session.reveal(3, &mut recorder), RevealOutcome::Won);

        assert_eq!(session.phase(), Phase::Won);
        assert_eq!(session.flag_count(), 1);
        assert_eq!(session.board().cell(0).unwrap().cover(), Cover::Flagged);
        assert_eq!(recorder.flags, [1]);
        assert!(!session.tick(&mut recorder));
        assert_eq!(session.elapsed_secs(), 1);
        assert_eq!(recorder.times, [1]);
    }

    #[test]
    fn flag_cycle_returns_to_covered() {
        let mut session = session(3, 3, &[0]);
        let mut recorder = Recorder::default();

        for _ in 0..3 {
            assert_eq!(session.toggle_flag(4, &mut recorder), MarkOutcome::Changed);
        }

        assert_eq!(session.board().cell(4).unwrap().cover(), Cover::Covered);
        assert_eq!(session.flag_count(), 0);
        assert_eq!(recorder.flags, [1, 0]);
    }

    #[test]
    fn flag_cycle_without_marks_skips_question() {
        let mut session = session(3, 3, &[0]);
        session.set_marks_enabled(false);

        session.toggle_flag(4, &mut ());
        session.toggle_flag(4, &mut ());

        assert_eq!(session.board().cell(4).unwrap().cover(), Cover::Covered);
        assert_eq!(session.flag_count(), 0);
    }

    #[test]
    fn flagged_cell_ignores_reveal() {
        let mut session = session(3, 3, &[0]);
        session.toggle_flag(8, &mut ());
        let before = session.board().clone();

        assert_eq!(session.reveal(8, &mut ()), RevealOutcome::NoChange);
        assert_eq!(session.board(), &before);
        assert_eq!(session.phase(), Phase::New);
    }

    #[test]
    fn actions_after_end_are_ignored() {
        let mut session = session(2, 2, &[0]);
        session.reveal(3, &mut ());
        session.reveal(0, &mut ());
        assert_eq!(session.phase(), Phase::Exploded);

        assert_eq!(session.toggle_flag(1, &mut ()), MarkOutcome::NoChange);
        assert_eq!(session.reveal(1, &mut ()), RevealOutcome::NoChange);
        assert!(!session.tick(&mut ()));
    }

    #[test]
    fn out_of_range_actions_are_noops() {
        let mut session = session(3, 3, &[0]);
        assert_eq!(session.dispatch(Action::Reveal(99), &mut ()), Ok(false));
        assert_eq!(session.dispatch(Action::ToggleFlag(99), &mut ()), Ok(false));
        assert_eq!(session.dispatch(Action::ChordReveal(99), &mut ()), Ok(false));
        assert_eq!(session.phase(), Phase::New);
    }

    #[test]
    fn new_game_resets_everything() {
        let mut session = session(3, 3, &[0, 8]);
        let mut recorder = Recorder::default();
        session.toggle_flag(2, &mut recorder);
        session.reveal(1, &mut recorder);
        session.tick(&mut recorder);
        assert_eq!(session.elapsed_secs(), 1);

        session.new_game(&mut recorder).unwrap();

        assert_eq!(session.phase(), Phase::New);
        assert_eq!(session.flag_count(), 0);
        assert_eq!(session.elapsed_secs(), 0);
        assert!(!session.timer_running());
        assert_eq!(session.board().remaining_covered(), 9);
        assert_eq!(session.board().mine_count(), 2);
        assert_eq!(recorder.flags, [1, 0]);
        assert_eq!(recorder.times, [1, 0]);
        assert_eq!(recorder.timer, [true, false]);
        assert_eq!(recorder.phases, [Phase::Playing, Phase::New]);
    }

    #[test]
    fn reconfigure_clamps_and_regenerates() {
        let mut session = Session::new(GameConfig::BEGINNER, 1).unwrap();
        let mut recorder = Recorder::default();

        session
            .reconfigure(GameConfig::new_unchecked(100, 2, 5000), &mut recorder)
            .unwrap();

        assert_eq!(session.config(), GameConfig::new_unchecked(24, 8, 161));
        assert_eq!(session.board().len(), 24 * 8);
        assert_eq!(session.board().mine_count(), 161);
    }

    #[test]
    fn timer_start_is_reported_once() {
        let mut session = session(3, 3, &[4]);
        let mut recorder = Recorder::default();

        session.reveal(0, &mut recorder);
        session.reveal(8, &mut recorder);
        session.tick(&mut recorder);

        assert_eq!(recorder.timer, [true]);
    }
}
