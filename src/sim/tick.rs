//! State machine transitions
//!
//! Every user input or timer callback becomes exactly one call here. Time is
//! always passed in by the caller so the whole module stays deterministic.

use super::grid::Direction;
use super::resolve::{MergeEvent, resolve};
use super::spawn::Spawned;
use super::state::{GameEvent, GameState, GameStatus, LossReason};
use crate::consts::*;

/// A decoded user command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Move(Direction),
    Undo,
    /// Resume after a win
    Continue,
}

/// Why a move was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// The previous move is still settling
    Busy,
    /// The game is over (or won and not continued)
    Finished,
}

/// What a move did to the board
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveReport {
    pub merges: Vec<MergeEvent>,
    pub spawned: Option<Spawned>,
    /// Points added by this move
    pub points: u64,
    /// Combo level after this move
    pub combo: u32,
    pub status: GameStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    Rejected(Rejection),
    /// Nothing could slide or merge that way
    Unchanged,
    Applied(MoveReport),
}

impl MoveOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, MoveOutcome::Applied(_))
    }
}

/// Apply one move at caller time `now_ms`
pub fn apply_move(state: &mut GameState, dir: Direction, now_ms: u64) -> MoveOutcome {
    if state.is_locked(now_ms) {
        return MoveOutcome::Rejected(Rejection::Busy);
    }
    if !state.accepts_moves() {
        return MoveOutcome::Rejected(Rejection::Finished);
    }
    state.lock_until_ms = Some(now_ms + MOVE_SETTLE_MS);

    let snapshot = state.take_snapshot();
    let res = resolve(&state.grid, dir);
    if !res.changed {
        state.undo = None;
        state.combo.reset();
        return MoveOutcome::Unchanged;
    }

    state.undo = Some(snapshot);
    state.grid = res.grid;
    state.score.moves += 1;

    // Merges score at the combo level the move started with
    let points = state.score.apply_merges(&res.merges, state.combo.count);
    let combo = state.combo.record_move(!res.merges.is_empty(), now_ms);
    state.score.observe_combo(combo);
    if state.combo.is_streak() {
        state.emit(GameEvent::Combo(combo));
    }
    if state.score.score > state.best_score {
        state.best_score = state.score.score;
        state.emit(GameEvent::NewBestScore(state.best_score));
    }

    let spawned = state.spawn();
    state.score.observe_tile(state.grid.max_tile());

    log::debug!(
        "move {:?}: {} merges, +{} (combo {}), score {}",
        dir,
        res.merges.len(),
        points,
        combo,
        state.score.score
    );

    state.emit(GameEvent::Moved {
        direction: dir,
        merges: res.merges.clone(),
        spawned,
        points,
        combo,
    });
    evaluate_status(state);

    MoveOutcome::Applied(MoveReport {
        merges: res.merges,
        spawned,
        points,
        combo,
        status: state.status,
    })
}

/// Check the win tile first, then move exhaustion. Zen never ends.
fn evaluate_status(state: &mut GameState) {
    if state.mode.is_zen() || state.status != GameStatus::Active {
        return;
    }

    if !state.has_won && state.grid.max_tile() >= WIN_TILE {
        state.has_won = true;
        finish(state, GameStatus::Won);
        state.emit(GameEvent::Won);
        return;
    }

    if !state.grid.has_moves() {
        finish(state, GameStatus::Lost);
        state.emit(GameEvent::Lost(LossReason::NoMoves));
    }
}

fn finish(state: &mut GameState, status: GameStatus) {
    state.status = status;
    if let Some(countdown) = state.countdown.as_mut() {
        countdown.cancel();
    }
    log::info!(
        "Game {:?} with score {} after {} moves",
        status,
        state.score.score,
        state.score.moves
    );
}

/// Restore the state saved before the last move. Returns false when there is
/// nothing to undo, the game is not active, or a move is still settling.
pub fn undo(state: &mut GameState, now_ms: u64) -> bool {
    if state.is_locked(now_ms) || !state.can_undo() {
        return false;
    }
    let Some(snapshot) = state.undo.take() else {
        return false;
    };
    state.restore(snapshot);
    state.lock_until_ms = Some(now_ms + MOVE_SETTLE_MS);
    state.emit(GameEvent::Undone);
    true
}

/// Leave the Won screen and keep playing the same board
pub fn continue_game(state: &mut GameState) -> bool {
    if state.status != GameStatus::Won {
        return false;
    }
    state.status = GameStatus::Active;
    state.emit(GameEvent::Continued);
    // Winning may have happened on a board that is also stuck
    evaluate_status(state);
    true
}

/// Dispatch a decoded command
pub fn handle(state: &mut GameState, command: Command, now_ms: u64) -> bool {
    match command {
        Command::Move(dir) => apply_move(state, dir, now_ms).is_applied(),
        Command::Undo => undo(state, now_ms),
        Command::Continue => continue_game(state),
    }
}

/// Release the input lock early (render finished)
pub fn settle(state: &mut GameState) {
    state.lock_until_ms = None;
}

/// Advance the time-attack countdown by `dt_ms`
pub fn tick(state: &mut GameState, dt_ms: u64) {
    if state.status != GameStatus::Active {
        return;
    }
    let Some(countdown) = state.countdown.as_mut() else {
        return;
    };

    let before = countdown.remaining_secs();
    let expired = countdown.advance(dt_ms);
    let after = countdown.remaining_secs();

    if after != before {
        state.emit(GameEvent::TimerTick {
            remaining_secs: after,
        });
    }
    if expired {
        finish(state, GameStatus::Lost);
        state.emit(GameEvent::Lost(LossReason::TimeUp));
    }
}

/// Page visibility changed. Hidden pauses the countdown, visible resumes it.
pub fn set_visible(state: &mut GameState, visible: bool) {
    let active = state.status == GameStatus::Active;
    let Some(countdown) = state.countdown.as_mut() else {
        return;
    };

    if !visible {
        if countdown.pause() {
            state.emit(GameEvent::TimerPaused);
        }
    } else if active && countdown.resume() {
        state.emit(GameEvent::TimerResumed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::grid::Grid;
    use crate::sim::state::{CountdownStatus, GameMode};

    fn state_with(rows: [[u32; 4]; 4], mode: GameMode) -> GameState {
        GameState::with_grid(Grid::from(rows), mode, 12345)
    }

    #[test]
    fn test_move_scores_and_spawns() {
        let mut state = state_with(
            [[2, 2, 4, 4], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]],
            GameMode::Classic,
        );

        let MoveOutcome::Applied(report) = apply_move(&mut state, Direction::Left, 0) else {
            panic!("move should apply");
        };
        assert_eq!(report.merges.len(), 2);
        assert_eq!(report.combo, 1);
        assert_eq!(report.points, 12);
        assert!(report.spawned.is_some());
        assert_eq!(state.score.score, 12);
        assert_eq!(state.score.moves, 1);
        assert_eq!(state.grid.get(0, 0), 4);
        assert_eq!(state.grid.get(0, 1), 8);
        // Slid tiles plus one spawn
        assert_eq!(state.grid.tile_count(), 3);
        assert_eq!(state.grid.sum(), 12 + u64::from(report.spawned.unwrap().value));
    }

    #[test]
    fn test_reentrancy_lock() {
        let mut state = state_with(
            [[2, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 4]],
            GameMode::Classic,
        );

        assert!(apply_move(&mut state, Direction::Right, 1_000).is_applied());
        assert_eq!(
            apply_move(&mut state, Direction::Left, 1_050),
            MoveOutcome::Rejected(Rejection::Busy)
        );
        assert!(apply_move(&mut state, Direction::Left, 1_000 + MOVE_SETTLE_MS).is_applied());

        settle(&mut state);
        assert!(!state.is_locked(1_000 + MOVE_SETTLE_MS));
    }

    #[test]
    fn test_unchanged_move_clears_undo_and_combo() {
        let mut state = state_with(
            [[2, 2, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]],
            GameMode::Classic,
        );
        assert!(apply_move(&mut state, Direction::Left, 0).is_applied());
        assert!(state.undo.is_some());
        assert_eq!(state.combo.count, 1);

        // Pin everything against the top so Up cannot move
        state.grid = Grid::from([[4, 2, 8, 16], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]]);
        assert_eq!(apply_move(&mut state, Direction::Up, 500), MoveOutcome::Unchanged);
        assert!(state.undo.is_none());
        assert_eq!(state.combo.count, 0);
        assert_eq!(state.score.moves, 1);
    }

    #[test]
    fn test_combo_multiplies_later_moves() {
        let mut state = state_with(
            [[2, 2, 0, 0], [4, 4, 0, 0], [8, 8, 0, 0], [0, 0, 0, 0]],
            GameMode::Classic,
        );
        // Reset the board before each move so exactly one pair merges
        let rows: [[u32; 4]; 3] = [[2, 2, 0, 0], [4, 4, 0, 0], [8, 8, 0, 0]];
        let mut combos = Vec::new();
        for (i, row) in rows.iter().enumerate() {
            state.grid = Grid::from([*row, [0; 4], [0; 4], [0; 4]]);
            let now = i as u64 * 300;
            let MoveOutcome::Applied(report) = apply_move(&mut state, Direction::Left, now) else {
                panic!("move {} should apply", i);
            };
            combos.push((report.combo, report.points));
        }
        // Scored at the starting levels 0, 1, 2: multipliers 1.0, 1.0, 1.5
        assert_eq!(combos, vec![(1, 4), (2, 8), (3, 24)]);
        assert_eq!(state.score.best_combo, 3);
        assert!(state.drain_events().contains(&GameEvent::Combo(3)));

        // After a long pause the streak restarts, but this move still scores
        // at the level it started from
        state.grid = Grid::from([[16, 16, 0, 0], [0; 4], [0; 4], [0; 4]]);
        let MoveOutcome::Applied(report) = apply_move(&mut state, Direction::Left, 2_000) else {
            panic!("move should apply");
        };
        assert_eq!(report.combo, 1);
        assert_eq!(report.points, 64);
        assert_eq!(state.score.best_combo, 3);
    }

    #[test]
    fn test_second_quick_merge_scores_base_value() {
        let mut state = state_with(
            [[2, 2, 0, 0], [0; 4], [0; 4], [0; 4]],
            GameMode::Classic,
        );
        let mut points = Vec::new();
        for now in [0, 300] {
            state.grid = Grid::from([[2, 2, 0, 0], [0; 4], [0; 4], [0; 4]]);
            let MoveOutcome::Applied(report) = apply_move(&mut state, Direction::Left, now) else {
                panic!("move should apply");
            };
            points.push(report.points);
        }
        assert_eq!(points, vec![4, 4]);
        assert_eq!(state.combo.count, 2);
    }

    #[test]
    fn test_undo_restores_exact_state() {
        let mut state = state_with(
            [[16, 16, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]],
            GameMode::Classic,
        );
        state.score.score = 100;
        let before_grid = state.grid.clone();
        let before_score = state.score.clone();

        assert!(apply_move(&mut state, Direction::Left, 0).is_applied());
        assert_eq!(state.score.score, 132);

        assert!(undo(&mut state, 500));
        assert_eq!(state.score, before_score);
        assert_eq!(state.grid, before_grid);
        assert_eq!(state.status, GameStatus::Active);

        // Only one level
        assert!(!undo(&mut state, 1_000));
        assert_eq!(state.grid, before_grid);
    }

    #[test]
    fn test_undo_blocked_while_settling() {
        let mut state = state_with(
            [[2, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]],
            GameMode::Classic,
        );
        assert!(apply_move(&mut state, Direction::Right, 0).is_applied());
        assert!(!undo(&mut state, 10));
        assert!(undo(&mut state, MOVE_SETTLE_MS));
    }

    #[test]
    fn test_stuck_board_loses() {
        // Only the leading pair can merge; the spawn then fills the single gap
        let mut state = state_with(
            [[2, 2, 8, 16], [32, 64, 128, 256], [2, 4, 8, 16], [32, 64, 128, 256]],
            GameMode::Classic,
        );
        let MoveOutcome::Applied(report) = apply_move(&mut state, Direction::Left, 0) else {
            panic!("move should apply");
        };
        let spawned = report.spawned.unwrap();
        assert_eq!((spawned.row, spawned.col), (0, 3));
        assert_eq!(state.status, GameStatus::Lost);
        assert!(state.drain_events().contains(&GameEvent::Lost(LossReason::NoMoves)));
        assert_eq!(
            apply_move(&mut state, Direction::Right, 1_000),
            MoveOutcome::Rejected(Rejection::Finished)
        );
    }

    #[test]
    fn test_last_spawn_filling_small_board_ends_game() {
        // The only gap after the merge is (0, 2); whichever tile lands there,
        // no neighbours match
        let rows = [[2, 2, 8], [16, 32, 64], [128, 256, 512]];

        let mut state = GameState::with_grid(Grid::from(rows), GameMode::Classic, 9);
        let MoveOutcome::Applied(report) = apply_move(&mut state, Direction::Left, 0) else {
            panic!("move should apply");
        };
        let spawned = report.spawned.unwrap();
        assert_eq!((spawned.row, spawned.col), (0, 2));
        assert!(state.grid.is_full());
        assert_eq!(report.status, GameStatus::Lost);
        assert!(state.drain_events().contains(&GameEvent::Lost(LossReason::NoMoves)));
        for dir in Direction::ALL {
            assert_eq!(
                apply_move(&mut state, dir, 1_000),
                MoveOutcome::Rejected(Rejection::Finished)
            );
        }

        let mut zen = GameState::with_grid(Grid::from(rows), GameMode::Zen, 9);
        assert!(apply_move(&mut zen, Direction::Left, 0).is_applied());
        assert!(!zen.grid.has_moves());
        assert_eq!(zen.status, GameStatus::Active);
        for (i, dir) in Direction::ALL.into_iter().enumerate() {
            let now = 1_000 + i as u64 * MOVE_SETTLE_MS;
            assert_eq!(apply_move(&mut zen, dir, now), MoveOutcome::Unchanged);
        }
    }

    #[test]
    fn test_zen_never_loses() {
        let mut state = state_with(
            [[2, 2, 8, 16], [32, 64, 128, 256], [2, 4, 8, 16], [32, 64, 128, 256]],
            GameMode::Zen,
        );
        assert!(apply_move(&mut state, Direction::Left, 0).is_applied());
        assert!(!state.grid.has_moves());
        assert_eq!(state.status, GameStatus::Active);
        // Further moves are accepted but cannot change anything
        assert_eq!(apply_move(&mut state, Direction::Right, 1_000), MoveOutcome::Unchanged);
    }

    #[test]
    fn test_win_is_soft_stop() {
        let mut state = state_with(
            [[1024, 1024, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]],
            GameMode::Classic,
        );
        let MoveOutcome::Applied(report) = apply_move(&mut state, Direction::Left, 0) else {
            panic!("move should apply");
        };
        assert_eq!(report.status, GameStatus::Won);
        assert!(state.has_won);
        assert!(state.drain_events().contains(&GameEvent::Won));
        assert_eq!(
            apply_move(&mut state, Direction::Right, 1_000),
            MoveOutcome::Rejected(Rejection::Finished)
        );

        assert!(continue_game(&mut state));
        assert_eq!(state.status, GameStatus::Active);
        assert_eq!(state.score.score, 2048);
        assert!(apply_move(&mut state, Direction::Right, 2_000).is_applied());
        // Win fires once per game
        assert_eq!(state.status, GameStatus::Active);
        assert!(!state.drain_events().contains(&GameEvent::Won));
    }

    #[test]
    fn test_zen_ignores_win_tile() {
        let mut state = state_with(
            [[1024, 1024, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]],
            GameMode::Zen,
        );
        assert!(apply_move(&mut state, Direction::Left, 0).is_applied());
        assert_eq!(state.status, GameStatus::Active);
        assert!(!state.has_won);
        assert!(!continue_game(&mut state));
    }

    #[test]
    fn test_time_attack_expires() {
        let mut state = GameState::new(4, GameMode::TimeAttack { duration_secs: 3 }, 1, 0);
        tick(&mut state, 1_000);
        tick(&mut state, 1_000);
        assert_eq!(state.status, GameStatus::Active);
        let events = state.drain_events();
        assert_eq!(
            events,
            vec![
                GameEvent::TimerTick { remaining_secs: 2 },
                GameEvent::TimerTick { remaining_secs: 1 },
            ]
        );

        tick(&mut state, 1_000);
        assert_eq!(state.status, GameStatus::Lost);
        assert!(state.drain_events().contains(&GameEvent::Lost(LossReason::TimeUp)));

        // Stale tick after the game ended
        tick(&mut state, 1_000);
        assert!(state.drain_events().is_empty());
    }

    #[test]
    fn test_hidden_page_pauses_countdown() {
        let mut state = GameState::new(4, GameMode::TimeAttack { duration_secs: 10 }, 1, 0);
        set_visible(&mut state, false);
        tick(&mut state, 5_000);
        assert_eq!(state.countdown.as_ref().unwrap().remaining_secs(), 10);

        set_visible(&mut state, true);
        tick(&mut state, 5_000);
        assert_eq!(state.countdown.as_ref().unwrap().remaining_secs(), 5);
        let events = state.drain_events();
        assert_eq!(events[0], GameEvent::TimerPaused);
        assert_eq!(events[1], GameEvent::TimerResumed);
    }

    #[test]
    fn test_terminal_transition_cancels_countdown() {
        let mut state = state_with(
            [[1024, 1024, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]],
            GameMode::TimeAttack { duration_secs: 60 },
        );
        assert!(apply_move(&mut state, Direction::Left, 0).is_applied());
        assert_eq!(state.status, GameStatus::Won);
        let countdown = state.countdown.as_ref().unwrap();
        assert_eq!(countdown.status, CountdownStatus::Cancelled);

        // Visibility changes cannot revive it
        set_visible(&mut state, true);
        assert!(!state.countdown.as_ref().unwrap().is_running());
    }

    #[test]
    fn test_handle_dispatch() {
        let mut state = state_with(
            [[2, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]],
            GameMode::Classic,
        );
        assert!(handle(&mut state, Command::Move(Direction::Down), 0));
        assert!(handle(&mut state, Command::Undo, 200));
        assert!(!handle(&mut state, Command::Continue, 400));
    }
}
