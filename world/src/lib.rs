#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Life Defence.
//!
//! The [`World`] owns the battlefield grid, the index of live pattern
//! instances and the score. It can only be mutated through [`apply`], which
//! validates each [`Command`] and reports the outcome as [`Event`] values.

mod grid;
mod instances;
mod score;

use std::collections::BTreeSet;

use life_defence_core::{
    CellCoord, CellRect, CollisionPair, Command, Difficulty, Event, InstanceId, Owner,
    PatternKind, PlacementError, Speed, Zone, ESCAPE_COLUMN,
};

pub use grid::Grid;

use instances::{InstanceIndex, PatternInstance};
use score::ScoreTracker;

const FIRST_WAVE: u32 = 1;

/// Represents the authoritative state of a single game.
#[derive(Clone, Debug)]
pub struct World {
    grid: Grid,
    instances: InstanceIndex,
    score: ScoreTracker,
    generation: u64,
    wave: u32,
    difficulty: Difficulty,
    speed: Speed,
    paused: bool,
    game_over: bool,
}

impl World {
    /// Creates an empty, running world for the provided difficulty.
    #[must_use]
    pub fn new(difficulty: Difficulty) -> Self {
        Self {
            grid: Grid::new(),
            instances: InstanceIndex::default(),
            score: ScoreTracker::default(),
            generation: 0,
            wave: FIRST_WAVE,
            difficulty,
            speed: Speed::default(),
            paused: false,
            game_over: false,
        }
    }

    fn introduce(
        &mut self,
        pattern: PatternKind,
        owner: Owner,
        footprint: CellRect,
    ) -> InstanceId {
        let anchor = footprint.origin();
        let cells: BTreeSet<CellCoord> = pattern.pattern().cells_at(anchor).collect();
        for cell in &cells {
            self.grid.set(*cell, true);
        }
        self.instances.insert(PatternInstance {
            pattern,
            owner,
            cells,
        })
    }

    fn validate_placement(
        &self,
        name: &str,
        row: i64,
        col: i64,
    ) -> Result<(PatternKind, CellRect), PlacementError> {
        if self.game_over {
            return Err(PlacementError::GameOver);
        }
        let kind = PatternKind::from_player_name(name).ok_or(PlacementError::UnknownPattern)?;
        let footprint = CellRect::within_grid(row, col, kind.pattern().size())
            .ok_or(PlacementError::OutOfBounds)?;
        if !Zone::Player.contains(footprint) {
            return Err(PlacementError::WrongZone);
        }
        if self.grid.any_alive(footprint) {
            return Err(PlacementError::Overlap);
        }
        Ok((kind, footprint))
    }

    fn spawn_footprint(&self, pattern: PatternKind, anchor: CellCoord) -> Option<CellRect> {
        if pattern.owner() != Owner::Enemy {
            return None;
        }
        let footprint = CellRect::within_grid(
            i64::from(anchor.row()),
            i64::from(anchor.column()),
            pattern.pattern().size(),
        )?;
        (Zone::Enemy.contains(footprint) && !self.grid.any_alive(footprint)).then_some(footprint)
    }

    fn is_colliding(&self, pair: CollisionPair) -> bool {
        let (Some(enemy), Some(player)) =
            (self.instances.get(pair.enemy), self.instances.get(pair.player))
        else {
            return false;
        };
        enemy.owner == Owner::Enemy
            && player.owner == Owner::Player
            && !enemy.cells.is_disjoint(&player.cells)
    }

    fn is_escaping(&self, id: InstanceId) -> bool {
        self.instances.get(id).is_some_and(|instance| {
            instance.owner == Owner::Enemy
                && instance.cells.iter().any(|cell| cell.column() == ESCAPE_COLUMN)
        })
    }

    fn remove_instances(&mut self, ids: &BTreeSet<InstanceId>, out_events: &mut Vec<Event>) {
        if ids.is_empty() {
            return;
        }
        let cleared = self.instances.remove_all(ids);
        for cell in &cleared {
            self.grid.set(*cell, false);
        }
        for (instance, owner) in self.instances.forget_cells(&cleared) {
            out_events.push(Event::InstanceDissipated { instance, owner });
        }
    }

    fn reset(&mut self, paused: bool, speed: Option<Speed>) {
        self.grid.clear();
        self.instances.clear();
        self.score.reset();
        self.generation = 0;
        self.wave = FIRST_WAVE;
        self.game_over = false;
        self.paused = paused;
        if let Some(speed) = speed {
            self.speed = speed;
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(Difficulty::default())
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Once the game-over latch is set, every tick command is ignored and
/// placements are rejected until a [`Command::Reset`] arrives.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::SpawnEnemy { pattern, anchor } => {
            if world.game_over {
                return;
            }
            match world.spawn_footprint(pattern, anchor) {
                Some(footprint) => {
                    let instance = world.introduce(pattern, Owner::Enemy, footprint);
                    out_events.push(Event::EnemySpawned {
                        instance,
                        pattern,
                        anchor,
                    });
                }
                None => out_events.push(Event::SpawnSkipped { pattern, anchor }),
            }
        }
        Command::AdvanceWave { wave } => {
            if world.game_over || wave <= world.wave {
                return;
            }
            world.wave = wave;
            out_events.push(Event::WaveAdvanced { wave });
        }
        Command::PlacePattern { pattern, row, col } => {
            match world.validate_placement(&pattern, row, col) {
                Ok((kind, footprint)) => {
                    let instance = world.introduce(kind, Owner::Player, footprint);
                    out_events.push(Event::PatternPlaced {
                        instance,
                        pattern: kind,
                        anchor: footprint.origin(),
                    });
                }
                Err(reason) => out_events.push(Event::PlacementRejected {
                    pattern,
                    row,
                    col,
                    reason,
                }),
            }
        }
        Command::Evolve => {
            if world.game_over {
                return;
            }
            let next = world.grid.step();
            let dissipated = world.instances.propagate(&next);
            world.grid = next;
            out_events.push(Event::GridEvolved {
                population: world.grid.population(),
            });
            for (instance, owner) in dissipated {
                out_events.push(Event::InstanceDissipated { instance, owner });
            }
        }
        Command::ResolveCollisions { mut pairs } => {
            if world.game_over {
                return;
            }
            pairs.sort_unstable();
            pairs.dedup();
            let mut destroyed = BTreeSet::new();
            for pair in pairs {
                if !world.is_colliding(pair) {
                    continue;
                }
                world.score.record_collision();
                let _ = destroyed.insert(pair.enemy);
                let _ = destroyed.insert(pair.player);
                out_events.push(Event::CollisionResolved {
                    enemy: pair.enemy,
                    player: pair.player,
                });
            }
            world.remove_instances(&destroyed, out_events);
        }
        Command::ResolveEscapes { mut enemies } => {
            if world.game_over {
                return;
            }
            enemies.sort_unstable();
            enemies.dedup();
            let mut escaped = BTreeSet::new();
            for enemy in enemies {
                if !world.is_escaping(enemy) {
                    continue;
                }
                world.score.record_escape();
                let _ = escaped.insert(enemy);
                out_events.push(Event::EnemyEscaped { enemy });
            }
            world.remove_instances(&escaped, out_events);
        }
        Command::CompleteTick => {
            if world.game_over {
                return;
            }
            let generation = world.generation + 1;
            if world.score.escape_limit_reached() {
                world.game_over = true;
                out_events.push(Event::GameOver { generation });
            }
            world.generation = generation;
            out_events.push(Event::TickCompleted { generation });
        }
        Command::SetPaused { paused } => {
            world.paused = paused;
            out_events.push(Event::PausedChanged { paused });
        }
        Command::SetSpeed { speed } => {
            world.speed = speed;
            out_events.push(Event::SpeedChanged { speed });
        }
        Command::Reset { paused, speed } => {
            world.reset(paused, speed);
            out_events.push(Event::WorldReset);
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::{Grid, World};
    use life_defence_core::{Difficulty, GameStats, InstanceView, Speed};

    /// Provides read-only access to the battlefield grid.
    #[must_use]
    pub fn grid(world: &World) -> &Grid {
        &world.grid
    }

    /// Number of completed ticks since creation or the last reset.
    #[must_use]
    pub fn generation(world: &World) -> u64 {
        world.generation
    }

    /// Wave currently in effect.
    #[must_use]
    pub fn wave(world: &World) -> u32 {
        world.wave
    }

    /// Difficulty the world was created with.
    #[must_use]
    pub fn difficulty(world: &World) -> Difficulty {
        world.difficulty
    }

    /// Advisory polling speed.
    #[must_use]
    pub fn speed(world: &World) -> Speed {
        world.speed
    }

    /// Reports whether the world is paused.
    #[must_use]
    pub fn is_paused(world: &World) -> bool {
        world.paused
    }

    /// Reports whether the game-over latch is set.
    #[must_use]
    pub fn is_game_over(world: &World) -> bool {
        world.game_over
    }

    /// Current score.
    #[must_use]
    pub fn score(world: &World) -> i64 {
        world.score.score()
    }

    /// Cumulative statistics.
    #[must_use]
    pub fn stats(world: &World) -> GameStats {
        world.score.stats()
    }

    /// Captures a read-only view of every live instance.
    #[must_use]
    pub fn instance_view(world: &World) -> InstanceView {
        InstanceView::from_snapshots(world.instances.snapshots())
    }
}
