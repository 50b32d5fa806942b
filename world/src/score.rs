//! Score and cumulative statistics.

use life_defence_core::{GameStats, COLLISION_REWARD, ESCAPE_LIMIT, ESCAPE_PENALTY};

/// Applies scoring deltas and keeps the running statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct ScoreTracker {
    score: i64,
    stats: GameStats,
}

impl ScoreTracker {
    /// Current score. Escapes may push it below zero.
    #[must_use]
    pub(crate) const fn score(&self) -> i64 {
        self.score
    }

    /// Cumulative counters.
    #[must_use]
    pub(crate) const fn stats(&self) -> GameStats {
        self.stats
    }

    /// Reports whether enough enemies escaped to end the game.
    #[must_use]
    pub(crate) const fn escape_limit_reached(&self) -> bool {
        self.stats.enemies_escaped >= ESCAPE_LIMIT
    }

    pub(crate) fn record_collision(&mut self) {
        self.score = self.score.saturating_add(COLLISION_REWARD);
        self.stats.patterns_destroyed = self.stats.patterns_destroyed.saturating_add(1);
    }

    pub(crate) fn record_escape(&mut self) {
        self.score = self.score.saturating_sub(ESCAPE_PENALTY);
        self.stats.enemies_escaped = self.stats.enemies_escaped.saturating_add(1);
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }
}
