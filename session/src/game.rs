use life_defence_core::{
    CollisionPair, Command, Difficulty, Event, InstanceId, PlacementError, Speed, StepRejection,
};
use life_defence_system_collision::CollisionDetector;
use life_defence_system_escape::EscapeDetector;
use life_defence_system_spawning::{SpawnContext, SpawnScheduler, SpawnTuning};
use life_defence_world::{self as world, query, World};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{seed::spawn_seed, GameId};

/// Outcome of a step request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// The tick ran; the report lists what happened.
    Accepted(TickReport),
    /// The tick was refused and the world is unchanged.
    Rejected(StepRejection),
}

impl StepOutcome {
    /// Reports whether the step advanced the world.
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }
}

/// Everything the world reported while processing one tick, in order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TickReport {
    generation: u64,
    events: Vec<Event>,
}

impl TickReport {
    /// Generation counter after the tick.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Raw event stream of the tick.
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Enemy instances that entered the battlefield.
    pub fn spawned(&self) -> impl Iterator<Item = InstanceId> + '_ {
        self.events.iter().filter_map(|event| match event {
            Event::EnemySpawned { instance, .. } => Some(*instance),
            _ => None,
        })
    }

    /// Enemy/player pairs that destroyed each other.
    pub fn collisions(&self) -> impl Iterator<Item = CollisionPair> + '_ {
        self.events.iter().filter_map(|event| match event {
            Event::CollisionResolved { enemy, player } => Some(CollisionPair {
                enemy: *enemy,
                player: *player,
            }),
            _ => None,
        })
    }

    /// Enemy instances that escaped through the last column.
    pub fn escaped(&self) -> impl Iterator<Item = InstanceId> + '_ {
        self.events.iter().filter_map(|event| match event {
            Event::EnemyEscaped { enemy } => Some(*enemy),
            _ => None,
        })
    }

    /// Reports whether this tick set the game-over latch.
    #[must_use]
    pub fn game_over(&self) -> bool {
        self.events
            .iter()
            .any(|event| matches!(event, Event::GameOver { .. }))
    }
}

/// Options accepted by [`GameSession::restart`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RestartOptions {
    /// Paused flag of the fresh game.
    pub paused: bool,
    /// Replacement speed, or `None` to keep the current one.
    pub speed: Option<Speed>,
}

/// Wire snapshot of a session returned to clients.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    /// Identifier of the session.
    pub game_id: GameId,
    /// Row-major grid; `1` marks a live cell.
    pub grid: Vec<Vec<u8>>,
    /// Current score.
    pub score: i64,
    /// Completed ticks since creation or the last restart.
    pub generation: u64,
    /// Whether step requests are currently refused.
    pub paused: bool,
    /// Advisory polling speed.
    pub speed: Speed,
    /// Whether the escape limit was reached.
    pub game_over: bool,
    /// Cumulative counters.
    pub stats: StateStats,
}

/// Statistics block of a [`GameState`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateStats {
    /// Enemy/player collisions resolved.
    pub patterns_destroyed: u32,
    /// Enemies that reached the last column.
    pub enemies_escaped: u32,
    /// Wave currently in effect.
    pub wave: u32,
}

/// One game: the world plus the systems that drive it tick by tick.
#[derive(Debug)]
pub struct GameSession {
    id: GameId,
    world: World,
    spawning: SpawnScheduler,
    collisions: CollisionDetector,
    escapes: EscapeDetector,
    seed: u64,
    restarts: u64,
}

impl GameSession {
    /// Creates a running session whose spawn stream is derived from `seed`.
    #[must_use]
    pub fn new(id: GameId, difficulty: Difficulty, tuning: SpawnTuning, seed: u64) -> Self {
        Self {
            id,
            world: World::new(difficulty),
            spawning: SpawnScheduler::new(tuning, spawn_seed(seed, 0)),
            collisions: CollisionDetector::new(),
            escapes: EscapeDetector::new(),
            seed,
            restarts: 0,
        }
    }

    /// Identifier of the session.
    #[must_use]
    pub fn id(&self) -> GameId {
        self.id
    }

    /// Read-only access to the world for queries.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Advances the game by exactly one generation unless paused or over.
    pub fn step(&mut self) -> StepOutcome {
        if query::is_game_over(&self.world) {
            debug!(game_id = %self.id, "step rejected: game over");
            return StepOutcome::Rejected(StepRejection::GameOver);
        }
        if query::is_paused(&self.world) {
            debug!(game_id = %self.id, "step rejected: paused");
            return StepOutcome::Rejected(StepRejection::Paused);
        }

        let mut events = Vec::new();
        let mut commands = Vec::new();
        self.spawning.handle(
            SpawnContext {
                generation: query::generation(&self.world),
                wave: query::wave(&self.world),
                difficulty: query::difficulty(&self.world),
                game_over: query::is_game_over(&self.world),
            },
            &mut commands,
        );
        self.apply_all(&mut commands, &mut events);

        world::apply(&mut self.world, Command::Evolve, &mut events);

        self.collisions
            .handle(&query::instance_view(&self.world), &mut commands);
        self.apply_all(&mut commands, &mut events);

        self.escapes
            .handle(&query::instance_view(&self.world), &mut commands);
        self.apply_all(&mut commands, &mut events);

        world::apply(&mut self.world, Command::CompleteTick, &mut events);

        let report = TickReport {
            generation: query::generation(&self.world),
            events,
        };
        debug!(
            game_id = %self.id,
            generation = report.generation,
            wave = query::wave(&self.world),
            spawned = report.spawned().count(),
            collisions = report.collisions().count(),
            escaped = report.escaped().count(),
            "tick completed"
        );
        if report.game_over() {
            info!(
                game_id = %self.id,
                generation = report.generation,
                score = query::score(&self.world),
                "game over"
            );
        }
        StepOutcome::Accepted(report)
    }

    /// Places a player pattern with its top-left corner at (`row`, `col`).
    pub fn place(
        &mut self,
        pattern: &str,
        row: i64,
        col: i64,
    ) -> Result<InstanceId, PlacementError> {
        let mut events = Vec::new();
        world::apply(
            &mut self.world,
            Command::PlacePattern {
                pattern: pattern.to_owned(),
                row,
                col,
            },
            &mut events,
        );

        match events.pop() {
            Some(Event::PatternPlaced { instance, .. }) => {
                debug!(game_id = %self.id, %instance, pattern, row, col, "pattern placed");
                Ok(instance)
            }
            Some(Event::PlacementRejected { reason, .. }) => {
                debug!(game_id = %self.id, pattern, row, col, %reason, "placement rejected");
                Err(reason)
            }
            other => unreachable!("placement reported {other:?}"),
        }
    }

    /// Sets the paused flag; accepted in every state.
    pub fn set_paused(&mut self, paused: bool) {
        let mut events = Vec::new();
        world::apply(&mut self.world, Command::SetPaused { paused }, &mut events);
        debug!(game_id = %self.id, paused, "pause toggled");
    }

    /// Sets the advisory speed; accepted in every state.
    pub fn set_speed(&mut self, speed: Speed) {
        let mut events = Vec::new();
        world::apply(&mut self.world, Command::SetSpeed { speed }, &mut events);
        debug!(game_id = %self.id, ?speed, "speed changed");
    }

    /// Reinitialises the game and reseeds the spawn stream.
    pub fn restart(&mut self, options: RestartOptions) {
        self.restarts += 1;
        let tuning = self.spawning.tuning().clone();
        self.spawning = SpawnScheduler::new(tuning, spawn_seed(self.seed, self.restarts));

        let mut events = Vec::new();
        world::apply(
            &mut self.world,
            Command::Reset {
                paused: options.paused,
                speed: options.speed,
            },
            &mut events,
        );
        info!(game_id = %self.id, restarts = self.restarts, "session restarted");
    }

    /// Captures the wire snapshot of the session.
    #[must_use]
    pub fn state(&self) -> GameState {
        let stats = query::stats(&self.world);
        GameState {
            game_id: self.id,
            grid: query::grid(&self.world).to_rows(),
            score: query::score(&self.world),
            generation: query::generation(&self.world),
            paused: query::is_paused(&self.world),
            speed: query::speed(&self.world),
            game_over: query::is_game_over(&self.world),
            stats: StateStats {
                patterns_destroyed: stats.patterns_destroyed,
                enemies_escaped: stats.enemies_escaped,
                wave: query::wave(&self.world),
            },
        }
    }

    fn apply_all(&mut self, commands: &mut Vec<Command>, events: &mut Vec<Event>) {
        for command in commands.drain(..) {
            world::apply(&mut self.world, command, events);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use life_defence_core::{CellCoord, PatternKind};
    use life_defence_system_spawning::BaseIntervals;

    fn session() -> GameSession {
        GameSession::new(GameId::new(), Difficulty::Normal, SpawnTuning::default(), 11)
    }

    #[test]
    fn accepted_steps_advance_one_generation() {
        let mut session = session();
        for expected in 1..=3 {
            match session.step() {
                StepOutcome::Accepted(report) => assert_eq!(report.generation(), expected),
                StepOutcome::Rejected(reason) => panic!("step rejected: {reason}"),
            }
        }
        assert_eq!(session.state().generation, 3);
    }

    #[test]
    fn paused_steps_leave_the_world_untouched() {
        let mut session = session();
        session.set_paused(true);
        let before = session.state();

        assert_eq!(session.step(), StepOutcome::Rejected(StepRejection::Paused));
        assert_eq!(session.state(), before);
    }

    #[test]
    fn first_tick_spawns_an_enemy() {
        let mut session = session();
        let StepOutcome::Accepted(report) = session.step() else {
            panic!("fresh session must accept a step");
        };
        assert_eq!(report.spawned().count(), 1);
        assert!(session.state().grid.iter().flatten().any(|cell| *cell == 1));
    }

    #[test]
    fn placement_errors_are_surfaced() {
        let mut session = session();
        assert_eq!(
            session.place("glider", 10, 10),
            Err(PlacementError::WrongZone)
        );
        assert_eq!(
            session.place("lightweight-spaceship", 10, 150),
            Err(PlacementError::UnknownPattern)
        );
        assert_eq!(session.place("glider", 10, 150), Ok(InstanceId::new(0)));
    }

    #[test]
    fn state_serialises_in_camel_case() {
        let value = serde_json::to_value(session().state()).expect("state serialises");
        let object = value.as_object().expect("state is an object");
        for key in [
            "gameId",
            "grid",
            "score",
            "generation",
            "paused",
            "speed",
            "gameOver",
            "stats",
        ] {
            assert!(object.contains_key(key), "missing {key}");
        }
        assert_eq!(value["speed"], "normal");
        assert_eq!(value["stats"]["patternsDestroyed"], 0);
        assert_eq!(value["stats"]["enemiesEscaped"], 0);
        assert_eq!(value["stats"]["wave"], 1);
        assert_eq!(value["grid"].as_array().map(Vec::len), Some(200));
    }

    /// Spawns once at generation zero, hugging the left edge.
    fn quiet_tuning() -> SpawnTuning {
        SpawnTuning {
            wave_length: 0,
            spawn_column_max: 0,
            base_interval: BaseIntervals {
                easy: 1_000_000,
                normal: 1_000_000,
                hard: 1_000_000,
            },
            ..SpawnTuning::default()
        }
    }

    #[test]
    fn game_over_latches_until_restart() {
        let mut session = GameSession::new(GameId::new(), Difficulty::Normal, quiet_tuning(), 5);
        let mut events = Vec::new();
        for row in [20, 50, 80, 110, 140] {
            world::apply(
                &mut session.world,
                Command::SpawnEnemy {
                    pattern: PatternKind::LightweightSpaceship,
                    anchor: CellCoord::new(row, 95),
                },
                &mut events,
            );
        }

        let mut last = None;
        for _ in 0..400 {
            match session.step() {
                StepOutcome::Accepted(report) if report.game_over() => {
                    last = Some(report);
                    break;
                }
                StepOutcome::Accepted(_) => {}
                StepOutcome::Rejected(reason) => panic!("step rejected early: {reason}"),
            }
        }
        let report = last.expect("five spaceships end the game");
        assert_eq!(report.generation(), 199);
        assert_eq!(report.escaped().count(), 5);

        let state = session.state();
        assert!(state.game_over);
        assert_eq!(state.score, -25);
        assert_eq!(state.stats.enemies_escaped, 5);

        assert_eq!(session.step(), StepOutcome::Rejected(StepRejection::GameOver));
        assert_eq!(session.place("glider", 10, 150), Err(PlacementError::GameOver));
        session.set_speed(Speed::Fast);
        assert_eq!(session.state().generation, 199, "latched state is frozen");
        assert_eq!(session.state().speed, Speed::Fast);

        session.restart(RestartOptions::default());
        let state = session.state();
        assert!(!state.game_over);
        assert_eq!(state.generation, 0);
        assert_eq!(state.score, 0);
        assert_eq!(state.stats.enemies_escaped, 0);
        assert!(session.step().is_accepted());
    }
}
