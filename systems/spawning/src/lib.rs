#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system responsible for emitting enemy spawn and wave commands.

use life_defence_core::{
    CellCoord, Command, Difficulty, PatternKind, GRID_ROWS, PLAYER_ZONE_START_COLUMN,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Deserialize;

const EARLY_MIX: [PatternKind; 3] = [
    PatternKind::EnemyGliderSe,
    PatternKind::EnemyGliderNe,
    PatternKind::LightweightSpaceship,
];
const LATE_MIX: [PatternKind; 4] = [
    PatternKind::EnemyGliderSe,
    PatternKind::EnemyGliderNe,
    PatternKind::LightweightSpaceship,
    PatternKind::MiddleweightSpaceship,
];
const LATE_MIX_WAVE: u32 = 3;

/// Tuning knobs controlling the spawn cadence and placement band.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SpawnTuning {
    /// Generations per wave; zero keeps the game in its first wave.
    pub wave_length: u64,
    /// Spawn interval in generations during the first wave, per difficulty.
    pub base_interval: BaseIntervals,
    /// Generations removed from the interval for every wave after the first.
    pub interval_step: u64,
    /// Lower clamp for the spawn interval.
    pub min_interval: u64,
    /// Waves required to add one extra spawn per burst; zero disables growth.
    pub waves_per_extra_spawn: u32,
    /// Upper clamp for the number of spawns per burst.
    pub max_burst: u32,
    /// Right-most column an enemy anchor may use.
    pub spawn_column_max: u32,
}

impl Default for SpawnTuning {
    fn default() -> Self {
        Self {
            wave_length: 120,
            base_interval: BaseIntervals::default(),
            interval_step: 3,
            min_interval: 8,
            waves_per_extra_spawn: 2,
            max_burst: 4,
            spawn_column_max: 40,
        }
    }
}

/// First-wave spawn interval for each difficulty.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BaseIntervals {
    /// Interval used by [`Difficulty::Easy`].
    pub easy: u64,
    /// Interval used by [`Difficulty::Normal`].
    pub normal: u64,
    /// Interval used by [`Difficulty::Hard`].
    pub hard: u64,
}

impl BaseIntervals {
    const fn for_difficulty(self, difficulty: Difficulty) -> u64 {
        match difficulty {
            Difficulty::Easy => self.easy,
            Difficulty::Normal => self.normal,
            Difficulty::Hard => self.hard,
        }
    }
}

impl Default for BaseIntervals {
    fn default() -> Self {
        Self {
            easy: 45,
            normal: 30,
            hard: 20,
        }
    }
}

/// World facts the scheduler needs at the start of a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpawnContext {
    /// Generation about to be computed.
    pub generation: u64,
    /// Wave currently in effect.
    pub wave: u32,
    /// Difficulty of the session.
    pub difficulty: Difficulty,
    /// Whether the game-over latch is set.
    pub game_over: bool,
}

/// Pure system that decides when and where enemies enter the battlefield.
#[derive(Debug)]
pub struct SpawnScheduler {
    tuning: SpawnTuning,
    rng: ChaCha8Rng,
}

impl SpawnScheduler {
    /// Creates a scheduler whose choices are fully determined by `seed`.
    #[must_use]
    pub fn new(tuning: SpawnTuning, seed: u64) -> Self {
        Self {
            tuning,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Tuning the scheduler was created with.
    #[must_use]
    pub fn tuning(&self) -> &SpawnTuning {
        &self.tuning
    }

    /// Emits `AdvanceWave` and `SpawnEnemy` commands for the upcoming tick.
    pub fn handle(&mut self, context: SpawnContext, out: &mut Vec<Command>) {
        if context.game_over {
            return;
        }

        let wave = self.wave_for(context.generation).max(context.wave);
        if wave > context.wave {
            out.push(Command::AdvanceWave { wave });
        }

        let interval = self.interval(context.difficulty, wave);
        if context.generation % interval != 0 {
            return;
        }

        for _ in 0..self.burst(wave) {
            let pattern = self.select_pattern(wave);
            let anchor = self.select_anchor(pattern);
            out.push(Command::SpawnEnemy { pattern, anchor });
        }
    }

    /// Wave implied by the generation counter alone.
    #[must_use]
    pub fn wave_for(&self, generation: u64) -> u32 {
        if self.tuning.wave_length == 0 {
            return 1;
        }
        let completed = generation / self.tuning.wave_length;
        u32::try_from(completed)
            .unwrap_or(u32::MAX)
            .saturating_add(1)
    }

    /// Spawn interval in generations; never zero.
    #[must_use]
    pub fn interval(&self, difficulty: Difficulty, wave: u32) -> u64 {
        let base = self.tuning.base_interval.for_difficulty(difficulty);
        let reduction = u64::from(wave.saturating_sub(1)).saturating_mul(self.tuning.interval_step);
        base.saturating_sub(reduction)
            .max(self.tuning.min_interval)
            .max(1)
    }

    /// Number of spawns emitted per burst in the given wave.
    #[must_use]
    pub fn burst(&self, wave: u32) -> u32 {
        let extra = match self.tuning.waves_per_extra_spawn {
            0 => 0,
            step => wave.saturating_sub(1) / step,
        };
        extra.saturating_add(1).min(self.tuning.max_burst.max(1))
    }

    fn select_pattern(&mut self, wave: u32) -> PatternKind {
        let mix: &[PatternKind] = if wave >= LATE_MIX_WAVE {
            &LATE_MIX
        } else {
            &EARLY_MIX
        };
        mix[self.rng.gen_range(0..mix.len())]
    }

    /// Anchors keep the footprint inside the enemy zone with a one-row margin
    /// above and below for the spaceships' sparks.
    fn select_anchor(&mut self, pattern: PatternKind) -> CellCoord {
        let size = pattern.pattern().size();
        let max_row = GRID_ROWS.saturating_sub(size.height() + 1).max(1);
        let max_column = PLAYER_ZONE_START_COLUMN
            .saturating_sub(size.width())
            .min(self.tuning.spawn_column_max);
        let row = self.rng.gen_range(1..=max_row);
        let column = self.rng.gen_range(0..=max_column);
        CellCoord::new(row, column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scheduler() -> SpawnScheduler {
        SpawnScheduler::new(SpawnTuning::default(), 7)
    }

    #[test]
    fn interval_shrinks_per_wave_until_clamped() {
        let scheduler = scheduler();
        assert_eq!(scheduler.interval(Difficulty::Normal, 1), 30);
        assert_eq!(scheduler.interval(Difficulty::Normal, 3), 24);
        assert_eq!(scheduler.interval(Difficulty::Normal, 50), 8);
        assert_eq!(scheduler.interval(Difficulty::Easy, 1), 45);
        assert_eq!(scheduler.interval(Difficulty::Hard, 1), 20);
    }

    #[test]
    fn zero_intervals_are_clamped_to_one() {
        let tuning = SpawnTuning {
            min_interval: 0,
            base_interval: BaseIntervals {
                easy: 0,
                normal: 0,
                hard: 0,
            },
            ..SpawnTuning::default()
        };
        let scheduler = SpawnScheduler::new(tuning, 1);
        assert_eq!(scheduler.interval(Difficulty::Normal, 1), 1);
    }

    #[test]
    fn burst_grows_every_other_wave_up_to_cap() {
        let scheduler = scheduler();
        assert_eq!(scheduler.burst(1), 1);
        assert_eq!(scheduler.burst(2), 1);
        assert_eq!(scheduler.burst(3), 2);
        assert_eq!(scheduler.burst(5), 3);
        assert_eq!(scheduler.burst(40), 4);
    }

    #[test]
    fn wave_follows_generation_count() {
        let scheduler = scheduler();
        assert_eq!(scheduler.wave_for(0), 1);
        assert_eq!(scheduler.wave_for(119), 1);
        assert_eq!(scheduler.wave_for(120), 2);
        assert_eq!(scheduler.wave_for(365), 4);
    }
}
