//! Achievements
//!
//! Evaluated after every accepted move and when a game ends. Unlocks are
//! permanent and persisted as an `id -> bool` map.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::persistence::{self, ACHIEVEMENTS_KEY, Storage};
use crate::sim::{GameMode, GameStatus, ScoreState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Achievement {
    /// Reach 2048
    FirstWin,
    /// Build a 4096 tile
    Club4096,
    /// 1500 points in time attack
    SpeedDemon,
    /// Combo of 5
    ComboMaster,
    /// 10000 points
    HighScorer,
    /// 2048 points in at most 80 moves
    Precision,
    /// 300 moves on a 4×4 board
    Survivor,
    /// Win on a 5×5 board
    Master5x5,
}

impl Achievement {
    pub const ALL: [Achievement; 8] = [
        Achievement::FirstWin,
        Achievement::Club4096,
        Achievement::SpeedDemon,
        Achievement::ComboMaster,
        Achievement::HighScorer,
        Achievement::Precision,
        Achievement::Survivor,
        Achievement::Master5x5,
    ];

    /// Stable id used in storage and the DOM
    pub fn id(&self) -> &'static str {
        match self {
            Achievement::FirstWin => "first-win",
            Achievement::Club4096 => "4096-club",
            Achievement::SpeedDemon => "speed-demon",
            Achievement::ComboMaster => "combo-master",
            Achievement::HighScorer => "high-scorer",
            Achievement::Precision => "precision",
            Achievement::Survivor => "survivor",
            Achievement::Master5x5 => "5x5-master",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.id() == id)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Achievement::FirstWin => "First Victory",
            Achievement::Club4096 => "4096 Club",
            Achievement::SpeedDemon => "Speed Demon",
            Achievement::ComboMaster => "Combo Master",
            Achievement::HighScorer => "High Scorer",
            Achievement::Precision => "Precision",
            Achievement::Survivor => "Survivor",
            Achievement::Master5x5 => "5×5 Master",
        }
    }
}

/// What the evaluator looks at
#[derive(Debug, Clone, Copy)]
pub struct AchievementContext<'a> {
    pub score: &'a ScoreState,
    pub mode: GameMode,
    pub board_size: usize,
    pub status: GameStatus,
    /// Whether this game has reached the win tile
    pub has_won: bool,
    pub max_tile: u32,
}

/// Every achievement the context satisfies, unlocked or not
pub fn qualifying(ctx: &AchievementContext) -> Vec<Achievement> {
    let s = ctx.score;
    let won = ctx.has_won || ctx.status == GameStatus::Won;

    Achievement::ALL
        .into_iter()
        .filter(|a| match a {
            Achievement::FirstWin => won,
            Achievement::Club4096 => ctx.max_tile >= 4096,
            Achievement::SpeedDemon => {
                matches!(ctx.mode, GameMode::TimeAttack { .. }) && s.score >= 1500
            }
            Achievement::ComboMaster => s.best_combo >= 5,
            Achievement::HighScorer => s.score >= 10_000,
            Achievement::Precision => s.moves <= 80 && s.score >= 2048,
            Achievement::Survivor => ctx.board_size == 4 && s.moves >= 300,
            Achievement::Master5x5 => ctx.board_size == 5 && won,
        })
        .collect()
}

/// Unlocked achievements
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Achievements {
    unlocked: BTreeMap<String, bool>,
}

impl Achievements {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_unlocked(&self, achievement: Achievement) -> bool {
        self.unlocked.get(achievement.id()).copied().unwrap_or(false)
    }

    /// Returns true if this call unlocked it
    pub fn unlock(&mut self, achievement: Achievement) -> bool {
        if self.is_unlocked(achievement) {
            return false;
        }
        self.unlocked.insert(achievement.id().to_string(), true);
        true
    }

    /// Unlock everything the context satisfies; returns only new unlocks
    pub fn evaluate(&mut self, ctx: &AchievementContext) -> Vec<Achievement> {
        qualifying(ctx)
            .into_iter()
            .filter(|&a| self.unlock(a))
            .collect()
    }

    pub fn unlocked(&self) -> impl Iterator<Item = Achievement> + '_ {
        Achievement::ALL.into_iter().filter(|&a| self.is_unlocked(a))
    }

    pub fn load(storage: &dyn Storage) -> Self {
        persistence::load_json(storage, ACHIEVEMENTS_KEY).unwrap_or_default()
    }

    pub fn save(&self, storage: &mut dyn Storage) {
        persistence::save_json(storage, ACHIEVEMENTS_KEY, self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStorage;

    fn ctx(score: &ScoreState) -> AchievementContext<'_> {
        AchievementContext {
            score,
            mode: GameMode::Classic,
            board_size: 4,
            status: GameStatus::Active,
            has_won: false,
            max_tile: 0,
        }
    }

    #[test]
    fn test_fresh_game_unlocks_nothing() {
        let score = ScoreState::default();
        assert!(qualifying(&ctx(&score)).is_empty());
    }

    #[test]
    fn test_thresholds() {
        let score = ScoreState {
            score: 2048,
            moves: 80,
            best_combo: 5,
            highest_tile: 1024,
        };
        let found = qualifying(&ctx(&score));
        assert_eq!(found, vec![Achievement::ComboMaster, Achievement::Precision]);

        let slow = ScoreState { moves: 81, ..score };
        assert!(!qualifying(&ctx(&slow)).contains(&Achievement::Precision));
    }

    #[test]
    fn test_mode_and_size_specific() {
        let score = ScoreState {
            score: 1500,
            moves: 300,
            ..Default::default()
        };
        let mut c = ctx(&score);
        assert_eq!(qualifying(&c), vec![Achievement::Survivor]);

        c.mode = GameMode::TimeAttack { duration_secs: 180 };
        assert!(qualifying(&c).contains(&Achievement::SpeedDemon));

        c.board_size = 5;
        c.status = GameStatus::Won;
        c.has_won = true;
        let found = qualifying(&c);
        assert!(found.contains(&Achievement::FirstWin));
        assert!(found.contains(&Achievement::Master5x5));
        assert!(!found.contains(&Achievement::Survivor));
    }

    #[test]
    fn test_unlocks_once() {
        let score = ScoreState {
            score: 12_000,
            ..Default::default()
        };
        let mut achievements = Achievements::new();
        assert_eq!(achievements.evaluate(&ctx(&score)), vec![Achievement::HighScorer]);
        assert!(achievements.evaluate(&ctx(&score)).is_empty());
    }

    #[test]
    fn test_persisted_as_id_map() {
        let mut storage = MemoryStorage::new();
        let mut achievements = Achievements::new();
        achievements.unlock(Achievement::Club4096);
        achievements.save(&mut storage);

        assert_eq!(
            storage.get_item(ACHIEVEMENTS_KEY).unwrap(),
            r#"{"4096-club":true}"#
        );
        let loaded = Achievements::load(&storage);
        assert!(loaded.is_unlocked(Achievement::Club4096));
        assert_eq!(loaded.unlocked().count(), 1);
    }

    #[test]
    fn test_id_round_trip() {
        for a in Achievement::ALL {
            assert_eq!(Achievement::from_id(a.id()), Some(a));
        }
    }
}
