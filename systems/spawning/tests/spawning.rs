use life_defence_core::{
    CellCoord, Command, Difficulty, Event, PatternKind, Zone, PLAYER_ZONE_START_COLUMN,
};
use life_defence_system_spawning::{SpawnContext, SpawnScheduler, SpawnTuning};
use life_defence_world::{self as world, query, World};

fn context(generation: u64, wave: u32) -> SpawnContext {
    SpawnContext {
        generation,
        wave,
        difficulty: Difficulty::Normal,
        game_over: false,
    }
}

fn spawns(commands: &[Command]) -> Vec<(PatternKind, CellCoord)> {
    commands
        .iter()
        .filter_map(|command| match command {
            Command::SpawnEnemy { pattern, anchor } => Some((*pattern, *anchor)),
            _ => None,
        })
        .collect()
}

#[test]
fn first_generation_spawns_immediately() {
    let mut scheduler = SpawnScheduler::new(SpawnTuning::default(), 0x5eed);
    let mut commands = Vec::new();
    scheduler.handle(context(0, 1), &mut commands);

    assert_eq!(spawns(&commands).len(), 1);
    assert!(
        !commands
            .iter()
            .any(|command| matches!(command, Command::AdvanceWave { .. })),
        "the first wave is already in effect"
    );
}

#[test]
fn spawns_only_on_interval_boundaries() {
    let mut scheduler = SpawnScheduler::new(SpawnTuning::default(), 0x5eed);
    for generation in 1..30 {
        let mut commands = Vec::new();
        scheduler.handle(context(generation, 1), &mut commands);
        assert!(commands.is_empty(), "unexpected spawn at {generation}");
    }

    let mut commands = Vec::new();
    scheduler.handle(context(30, 1), &mut commands);
    assert_eq!(spawns(&commands).len(), 1);
}

#[test]
fn footprints_always_lie_inside_the_enemy_zone() {
    let tuning = SpawnTuning {
        spawn_column_max: PLAYER_ZONE_START_COLUMN,
        min_interval: 1,
        ..SpawnTuning::default()
    };
    let mut scheduler = SpawnScheduler::new(tuning, 99);
    let mut seen = Vec::new();

    for wave in 1..12 {
        let mut commands = Vec::new();
        scheduler.handle(
            SpawnContext {
                generation: 0,
                wave,
                difficulty: Difficulty::Hard,
                game_over: false,
            },
            &mut commands,
        );
        seen.extend(spawns(&commands));
    }

    assert!(!seen.is_empty());
    for (pattern, anchor) in seen {
        let footprint = pattern.pattern().footprint(anchor);
        assert!(
            Zone::Enemy.contains(footprint),
            "{pattern:?} at {anchor:?} leaves the enemy zone"
        );
        assert_eq!(pattern.owner(), life_defence_core::Owner::Enemy);
        let last_row = anchor.row() + pattern.pattern().size().height();
        assert!(anchor.row() >= 1 && last_row < life_defence_core::GRID_ROWS);
    }
}

#[test]
fn wave_advances_with_generation_and_never_regresses() {
    let mut scheduler = SpawnScheduler::new(SpawnTuning::default(), 3);

    let mut commands = Vec::new();
    scheduler.handle(context(120, 1), &mut commands);
    assert_eq!(commands.first(), Some(&Command::AdvanceWave { wave: 2 }));

    let mut commands = Vec::new();
    scheduler.handle(context(130, 5), &mut commands);
    assert!(
        !commands
            .iter()
            .any(|command| matches!(command, Command::AdvanceWave { .. })),
        "a wave ahead of the schedule is kept"
    );
}

#[test]
fn game_over_is_silent() {
    let mut scheduler = SpawnScheduler::new(SpawnTuning::default(), 3);
    let mut commands = Vec::new();
    scheduler.handle(
        SpawnContext {
            game_over: true,
            ..context(240, 1)
        },
        &mut commands,
    );
    assert!(commands.is_empty());
}

#[test]
fn middleweight_spaceships_join_the_mix_from_wave_three() {
    let mut scheduler = SpawnScheduler::new(SpawnTuning::default(), 0x3a7e);
    let mut mix = |wave| {
        let mut seen = Vec::new();
        for _ in 0..200 {
            let mut commands = Vec::new();
            scheduler.handle(context(0, wave), &mut commands);
            seen.extend(spawns(&commands).into_iter().map(|(pattern, _)| pattern));
        }
        seen
    };

    for wave in [1, 2] {
        let seen = mix(wave);
        assert!(!seen.is_empty());
        assert!(
            !seen.contains(&PatternKind::MiddleweightSpaceship),
            "middleweight spaceship spawned in wave {wave}"
        );
        for early in [
            PatternKind::EnemyGliderSe,
            PatternKind::EnemyGliderNe,
            PatternKind::LightweightSpaceship,
        ] {
            assert!(seen.contains(&early), "{early:?} missing from wave {wave}");
        }
    }

    for wave in [3, 6] {
        assert!(
            mix(wave).contains(&PatternKind::MiddleweightSpaceship),
            "no middleweight spaceship in wave {wave}"
        );
    }
}

#[test]
fn same_seed_replays_identical_commands() {
    let first = replay(0x4d59_5df4_d0f3_3173);
    let second = replay(0x4d59_5df4_d0f3_3173);

    assert_eq!(first, second, "replay diverged between runs");
    assert!(first
        .iter()
        .any(|event| matches!(event, Event::EnemySpawned { .. })));
}

#[test]
fn tuning_deserializes_partial_toml() {
    let tuning: SpawnTuning = toml::from_str(
        r#"
            wave_length = 60
            [base_interval]
            hard = 10
        "#,
    )
    .expect("valid toml");

    assert_eq!(tuning.wave_length, 60);
    assert_eq!(tuning.base_interval.hard, 10);
    assert_eq!(tuning.base_interval.normal, 30);
    assert_eq!(tuning.max_burst, SpawnTuning::default().max_burst);
}

fn replay(seed: u64) -> Vec<Event> {
    let mut world = World::new(Difficulty::Hard);
    let mut scheduler = SpawnScheduler::new(SpawnTuning::default(), seed);
    let mut log = Vec::new();

    for _ in 0..90 {
        let mut commands = Vec::new();
        scheduler.handle(
            SpawnContext {
                generation: query::generation(&world),
                wave: query::wave(&world),
                difficulty: query::difficulty(&world),
                game_over: query::is_game_over(&world),
            },
            &mut commands,
        );
        commands.push(Command::Evolve);
        commands.push(Command::CompleteTick);

        for command in commands {
            world::apply(&mut world, command, &mut log);
        }
    }

    log
}
