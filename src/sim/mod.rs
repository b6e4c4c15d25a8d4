//! Deterministic game core
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only
//! - Time is supplied by the caller, never read from a clock
//! - Stable iteration order (line by line, in slide order)
//! - No rendering or platform dependencies

pub mod grid;
pub mod resolve;
pub mod scoring;
pub mod spawn;
pub mod state;
pub mod tick;

pub use grid::{Direction, Grid};
pub use resolve::{MergeEvent, Resolution, resolve, resolve_named};
pub use scoring::{ComboState, ScoreState, combo_multiplier};
pub use spawn::{Spawned, spawn_tile};
pub use state::{
    Countdown, CountdownStatus, GameEvent, GameMode, GameState, GameStatus, LossReason, Snapshot,
};
pub use tick::{
    Command, MoveOutcome, MoveReport, Rejection, apply_move, continue_game, handle, set_visible,
    settle, tick, undo,
};
