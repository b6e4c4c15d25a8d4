//! A running game plus everything that outlives it
//!
//! The session owns the [`GameState`] and the persisted collaborators (best
//! score, achievements, leaderboard, settings, save slot). It feeds inputs to
//! the state machine, then drains the emitted events and lets each
//! collaborator react. The front end only talks to the session.

use crate::achievements::{Achievement, AchievementContext, Achievements};
use crate::leaderboard::Leaderboard;
use crate::persistence::{self, Storage};
use crate::platform::InputAction;
use crate::renderer::{BoardView, ParticleBurst, particle_bursts};
use crate::settings::{ModeKind, Settings};
use crate::sim::{self, GameEvent, GameState, GameStatus};

/// Everything the front end needs to redraw after one input
#[derive(Debug, Clone, Default)]
pub struct Update {
    pub events: Vec<GameEvent>,
    /// New board to draw, if the grid changed
    pub board: Option<BoardView>,
    pub particles: Vec<ParticleBurst>,
    pub unlocked: Vec<Achievement>,
    /// Leaderboard rank reached when the game ended
    pub rank: Option<usize>,
    /// One-line notices (mode changes, achievements)
    pub toasts: Vec<String>,
}

impl Update {
    pub fn is_empty(&self) -> bool {
        self.events.is_empty() && self.board.is_none() && self.toasts.is_empty()
    }
}

pub struct Session<S: Storage> {
    storage: S,
    pub state: GameState,
    pub settings: Settings,
    pub achievements: Achievements,
    pub leaderboard: Leaderboard,
}

impl<S: Storage> Session<S> {
    /// Load persisted data and start a fresh game
    pub fn new(storage: S, seed: u64) -> Self {
        let settings = Settings::load(&storage);
        let best = persistence::load_best_score(&storage);
        let state = GameState::new(settings.board_size, settings.game_mode(), seed, best);
        log::info!(
            "Game initialized: {}×{} {} (seed {})",
            settings.board_size,
            settings.board_size,
            settings.mode.as_str(),
            seed
        );
        Self {
            achievements: Achievements::load(&storage),
            leaderboard: Leaderboard::load(&storage),
            storage,
            state,
            settings,
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Throw away the current game and start over with the current settings
    pub fn restart(&mut self, seed: u64) -> Update {
        self.state = GameState::new(
            self.settings.board_size,
            self.settings.game_mode(),
            seed,
            self.state.best_score,
        );
        log::info!("Game restarted with seed: {}", seed);
        Update {
            board: Some(BoardView::still(&self.state)),
            ..Default::default()
        }
    }

    /// Apply one decoded input at caller time `now_ms`
    pub fn input(&mut self, action: InputAction, now_ms: u64) -> Update {
        match action {
            InputAction::Restart => self.restart(now_ms),
            InputAction::SetBoardSize(size) => {
                if !self.settings.set_board_size(size) {
                    return Update::default();
                }
                self.settings.save(&mut self.storage);
                self.restart(now_ms)
            }
            InputAction::SetMode(mode) => self.set_mode(mode, now_ms),
            InputAction::Move(_) | InputAction::Undo | InputAction::Continue => {
                let Some(command) = action.as_command() else {
                    return Update::default();
                };
                sim::handle(&mut self.state, command, now_ms);
                self.process_events()
            }
        }
    }

    fn set_mode(&mut self, mode: ModeKind, seed: u64) -> Update {
        self.settings.mode = mode;
        self.settings.save(&mut self.storage);
        let mut update = self.restart(seed);
        update
            .toasts
            .push(mode.announcement(self.settings.time_limit_secs));
        update
    }

    /// Advance the countdown by `dt_ms`
    pub fn tick(&mut self, dt_ms: u64) -> Update {
        sim::tick(&mut self.state, dt_ms);
        self.process_events()
    }

    /// Page shown or hidden
    pub fn set_visible(&mut self, visible: bool) -> Update {
        sim::set_visible(&mut self.state, visible);
        self.process_events()
    }

    /// Render finished; accept the next move immediately
    pub fn settle(&mut self) {
        sim::settle(&mut self.state);
    }

    /// Store the current game in the save slot
    pub fn save_game(&mut self) -> bool {
        persistence::save_game(&mut self.storage, &self.state)
    }

    /// Resume the saved game, if any
    pub fn load_game(&mut self, seed: u64) -> Option<Update> {
        let mut state = persistence::load_game(&self.storage, seed)?;
        state.best_score = state.best_score.max(self.state.best_score);

        // Restart and the option chips follow the resumed game
        self.settings.board_size = state.board_size();
        self.settings.mode = ModeKind::of(&state.mode);
        if let Some(secs) = state.mode.time_limit_secs() {
            self.settings.time_limit_secs = secs;
        }
        self.settings.save(&mut self.storage);

        self.state = state;
        log::info!("Loaded saved game ({} moves)", self.state.score.moves);
        Some(Update {
            board: Some(BoardView::still(&self.state)),
            ..Default::default()
        })
    }

    /// Drain state-machine events and let each collaborator react
    fn process_events(&mut self) -> Update {
        let events = self.state.drain_events();
        let mut update = Update::default();
        let mut evaluate = false;

        for event in &events {
            match event {
                GameEvent::Moved {
                    merges,
                    spawned,
                    combo,
                    ..
                } => {
                    update.board = Some(BoardView::after_move(&self.state, merges, *spawned));
                    update.particles = particle_bursts(merges, *combo, &self.settings);
                    evaluate = true;
                }
                GameEvent::Undone => {
                    update.board = Some(BoardView::still(&self.state));
                }
                GameEvent::NewBestScore(best) => {
                    persistence::save_best_score(&mut self.storage, *best);
                }
                GameEvent::Won | GameEvent::Lost(_) => {
                    update.rank = self.record_result();
                    evaluate = true;
                }
                _ => {}
            }
        }

        if evaluate {
            let ctx = achievement_context(&self.state);
            let unlocked = self.achievements.evaluate(&ctx);
            if !unlocked.is_empty() {
                self.achievements.save(&mut self.storage);
                for a in &unlocked {
                    log::info!("Achievement unlocked: {}", a.id());
                    update.toasts.push(format!("Achievement: {}", a.name()));
                }
            }
            update.unlocked = unlocked;
        }

        update.events = events;
        update
    }

    /// Leaderboard entry for a finished game; clears the save slot on loss
    fn record_result(&mut self) -> Option<usize> {
        if self.state.status == GameStatus::Lost {
            persistence::clear_saved_game(&mut self.storage);
        }
        let rank = self.leaderboard.record(
            self.state.score.score,
            ModeKind::of(&self.state.mode),
            self.state.board_size(),
            crate::platform::now_ms() as f64,
        );
        if rank.is_some() {
            self.leaderboard.save(&mut self.storage);
        }
        rank
    }
}

fn achievement_context(state: &GameState) -> AchievementContext<'_> {
    AchievementContext {
        score: &state.score,
        mode: state.mode,
        board_size: state.board_size(),
        status: state.status,
        has_won: state.has_won,
        max_tile: state.grid.max_tile(),
    }
}
