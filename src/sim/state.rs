//! Game state and core simulation types
//!
//! All state that must be persisted for the save slot lives here.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::grid::{Direction, Grid};
use super::resolve::MergeEvent;
use super::scoring::{ComboState, ScoreState};
use super::spawn::{Spawned, spawn_tile};
use crate::consts::*;

/// Rule set for a game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GameMode {
    #[default]
    Classic,
    /// Lose when the countdown reaches zero
    TimeAttack { duration_secs: u32 },
    /// Every spawned tile is a 4
    Extreme,
    /// No game over, and reaching 2048 does not stop play
    Zen,
}

impl GameMode {
    pub fn is_zen(&self) -> bool {
        matches!(self, GameMode::Zen)
    }

    pub fn time_limit_secs(&self) -> Option<u32> {
        match self {
            GameMode::TimeAttack { duration_secs } => Some(*duration_secs),
            _ => None,
        }
    }
}

/// Current phase of a game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    Active,
    /// Reached the win tile; `continue_game` resumes play
    Won,
    Lost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LossReason {
    /// Grid full with no equal neighbours
    NoMoves,
    /// Time-attack countdown ran out
    TimeUp,
}

/// Single-level undo point, taken right before a move
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub grid: Grid,
    pub score: ScoreState,
    pub combo: ComboState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CountdownStatus {
    Running,
    /// Suspended while the page is hidden
    Paused,
    /// Stopped for good; further ticks are ignored
    Cancelled,
}

/// Time-attack countdown, advanced by caller-supplied elapsed time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Countdown {
    pub remaining_ms: u64,
    pub status: CountdownStatus,
}

impl Countdown {
    pub fn new(duration_secs: u32) -> Self {
        Self {
            remaining_ms: u64::from(duration_secs) * 1000,
            status: CountdownStatus::Running,
        }
    }

    /// Advance by `dt_ms`. Returns true on the tick that reaches zero.
    pub fn advance(&mut self, dt_ms: u64) -> bool {
        if self.status != CountdownStatus::Running || self.remaining_ms == 0 {
            return false;
        }
        self.remaining_ms = self.remaining_ms.saturating_sub(dt_ms);
        if self.remaining_ms == 0 {
            self.status = CountdownStatus::Cancelled;
            return true;
        }
        false
    }

    pub fn pause(&mut self) -> bool {
        if self.status == CountdownStatus::Running {
            self.status = CountdownStatus::Paused;
            return true;
        }
        false
    }

    pub fn resume(&mut self) -> bool {
        if self.status == CountdownStatus::Paused {
            self.status = CountdownStatus::Running;
            return true;
        }
        false
    }

    pub fn cancel(&mut self) {
        self.status = CountdownStatus::Cancelled;
    }

    pub fn is_running(&self) -> bool {
        self.status == CountdownStatus::Running
    }

    /// Whole seconds left, rounded up
    pub fn remaining_secs(&self) -> u32 {
        self.remaining_ms.div_ceil(1000) as u32
    }

    /// `MM:SS`
    pub fn display(&self) -> String {
        let secs = self.remaining_secs();
        format!("{:02}:{:02}", secs / 60, secs % 60)
    }

    pub fn is_urgent(&self) -> bool {
        self.remaining_secs() <= URGENT_TIME_SECS
    }
}

/// Something observers may react to. Drained after each command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A move changed the grid
    Moved {
        direction: Direction,
        merges: Vec<MergeEvent>,
        spawned: Option<Spawned>,
        points: u64,
        combo: u32,
    },
    /// Combo streak of two or more
    Combo(u32),
    NewBestScore(u64),
    Won,
    Lost(LossReason),
    /// Play resumed after a win
    Continued,
    Undone,
    /// The countdown crossed a whole second
    TimerTick { remaining_secs: u32 },
    TimerPaused,
    TimerResumed,
}

fn default_rng() -> Pcg32 {
    Pcg32::seed_from_u64(0)
}

/// Complete game state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Game seed for reproducibility
    pub seed: u64,
    pub mode: GameMode,
    pub grid: Grid,
    pub score: ScoreState,
    pub combo: ComboState,
    pub status: GameStatus,
    /// Set on the first win so it fires once per game
    pub has_won: bool,
    /// Best score across games, raised as soon as `score` passes it
    pub best_score: u64,
    pub countdown: Option<Countdown>,
    pub undo: Option<Snapshot>,
    /// Spawn RNG. Restored saves are reseeded.
    #[serde(skip, default = "default_rng")]
    pub(crate) rng: Pcg32,
    /// Moves are refused until the caller clock reaches this
    #[serde(skip)]
    pub(crate) lock_until_ms: Option<u64>,
    #[serde(skip)]
    pub(crate) events: Vec<GameEvent>,
}

impl GameState {
    /// Start a game on an empty `size`×`size` grid with two spawned tiles
    pub fn new(size: usize, mode: GameMode, seed: u64, best_score: u64) -> Self {
        let mut state = Self::with_grid(Grid::new(size), mode, seed);
        state.best_score = best_score;

        state.spawn();
        state.spawn();
        state.score.observe_tile(state.grid.max_tile());

        state
    }

    /// Start from an explicit grid without spawning. Used for replays and tests.
    pub fn with_grid(grid: Grid, mode: GameMode, seed: u64) -> Self {
        let mut score = ScoreState::default();
        score.observe_tile(grid.max_tile());
        Self {
            seed,
            mode,
            grid,
            score,
            combo: ComboState::default(),
            status: GameStatus::Active,
            has_won: false,
            best_score: 0,
            countdown: mode.time_limit_secs().map(Countdown::new),
            undo: None,
            rng: Pcg32::seed_from_u64(seed),
            lock_until_ms: None,
            events: Vec::new(),
        }
    }

    /// Place one tile using the game RNG
    pub fn spawn(&mut self) -> Option<Spawned> {
        spawn_tile(&mut self.grid, &self.mode, &mut self.rng)
    }

    pub fn board_size(&self) -> usize {
        self.grid.size()
    }

    /// Whether a move request would be considered at all
    pub fn accepts_moves(&self) -> bool {
        self.status == GameStatus::Active || self.mode.is_zen()
    }

    pub fn is_locked(&self, now_ms: u64) -> bool {
        self.lock_until_ms.is_some_and(|until| now_ms < until)
    }

    pub fn can_undo(&self) -> bool {
        self.undo.is_some() && self.status == GameStatus::Active
    }

    pub(crate) fn take_snapshot(&self) -> Snapshot {
        Snapshot {
            grid: self.grid.clone(),
            score: self.score.clone(),
            combo: self.combo.clone(),
        }
    }

    pub(crate) fn restore(&mut self, snapshot: Snapshot) {
        self.grid = snapshot.grid;
        self.score = snapshot.score;
        self.combo = snapshot.combo;
    }

    /// Reseed the spawn RNG, e.g. after loading a save
    pub fn reseed(&mut self, seed: u64) {
        self.seed = seed;
        self.rng = Pcg32::seed_from_u64(seed);
    }

    /// Take all events emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_game_has_two_tiles() {
        for size in BOARD_SIZES {
            let state = GameState::new(size, GameMode::Classic, 12345, 0);
            assert_eq!(state.grid.size(), size);
            assert_eq!(state.grid.tile_count(), 2);
            assert_eq!(state.status, GameStatus::Active);
            assert!(state.undo.is_none());
            assert!(state.countdown.is_none());
        }
    }

    #[test]
    fn test_same_seed_same_board() {
        let a = GameState::new(4, GameMode::Classic, 99999, 0);
        let b = GameState::new(4, GameMode::Classic, 99999, 0);
        assert_eq!(a.grid, b.grid);
    }

    #[test]
    fn test_time_attack_starts_countdown() {
        let state = GameState::new(4, GameMode::TimeAttack { duration_secs: 180 }, 1, 0);
        let countdown = state.countdown.as_ref().unwrap();
        assert!(countdown.is_running());
        assert_eq!(countdown.display(), "03:00");
        assert!(!countdown.is_urgent());
    }

    #[test]
    fn test_countdown_pause_and_expiry() {
        let mut countdown = Countdown::new(2);
        assert!(!countdown.advance(1_000));
        assert_eq!(countdown.remaining_secs(), 1);
        assert!(countdown.is_urgent());

        assert!(countdown.pause());
        assert!(!countdown.advance(5_000));
        assert_eq!(countdown.remaining_secs(), 1);

        assert!(countdown.resume());
        assert!(countdown.advance(1_000));
        assert_eq!(countdown.status, CountdownStatus::Cancelled);
        // Stale tick after expiry
        assert!(!countdown.advance(1_000));
    }

    #[test]
    fn test_cancelled_countdown_does_not_resume() {
        let mut countdown = Countdown::new(60);
        countdown.cancel();
        assert!(!countdown.resume());
        assert!(!countdown.advance(60_000));
    }

    #[test]
    fn test_save_round_trip_reseeds() {
        let state = GameState::new(5, GameMode::Extreme, 7, 300);
        let json = serde_json::to_string(&state).unwrap();
        let mut loaded: GameState = serde_json::from_str(&json).unwrap();
        loaded.reseed(8);
        assert_eq!(loaded.grid, state.grid);
        assert_eq!(loaded.best_score, 300);
        assert_eq!(loaded.mode, GameMode::Extreme);
        assert!(loaded.spawn().is_some());
    }
}
