use life_defence_core::{CellCoord, Command, Difficulty, Event, InstanceId, PatternKind};
use life_defence_system_escape::EscapeDetector;
use life_defence_world::{self as world, query, World};

#[test]
fn spaceship_is_reported_once_it_reaches_the_last_column() {
    let mut world = World::new(Difficulty::Normal);
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::SpawnEnemy {
            pattern: PatternKind::LightweightSpaceship,
            anchor: CellCoord::new(100, 95),
        },
        &mut events,
    );
    world::apply(
        &mut world,
        Command::PlacePattern {
            pattern: "blinker".to_owned(),
            row: 10,
            col: 197,
        },
        &mut events,
    );

    let mut detector = EscapeDetector::new();
    let mut reported_at = None;
    for _ in 0..250 {
        world::apply(&mut world, Command::Evolve, &mut events);

        let mut commands = Vec::new();
        detector.handle(&query::instance_view(&world), &mut commands);
        if !commands.is_empty() {
            reported_at = Some(query::generation(&world));
            assert_eq!(
                commands,
                vec![Command::ResolveEscapes {
                    enemies: vec![InstanceId::new(0)],
                }],
                "player blinkers on the last column never escape"
            );
            for command in commands {
                world::apply(&mut world, command, &mut events);
            }
            break;
        }

        world::apply(&mut world, Command::CompleteTick, &mut events);
    }

    assert_eq!(reported_at, Some(198), "escape is seen during the 199th tick");
    assert!(events.contains(&Event::EnemyEscaped {
        enemy: InstanceId::new(0),
    }));
    assert_eq!(query::stats(&world).enemies_escaped, 1);
    assert_eq!(query::score(&world), -5);
    assert_eq!(query::instance_view(&world).len(), 1, "the blinker remains");
}
