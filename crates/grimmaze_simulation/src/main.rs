//! Headless прогон GRIMMAZE
//!
//! Запускает симуляцию без рендера: player + 3 enemy-профиля в
//! лабиринте, 1000 fixed-тиков, FSM-переходы в лог.

use std::time::Duration;

use bevy::prelude::*;
use grimmaze_simulation::*;

const DEMO_MAZE: &str = "
    ##########
    #........#
    #.##.###.#
    #.#....#.#
    #.#.##.#.#
    #....#...#
    #.##.#.#.#
    #........#
    ##########
";

const TICK: Duration = Duration::from_millis(16);

fn main() {
    let seed = 42;
    println!("Starting GRIMMAZE headless simulation (seed: {})", seed);

    let grid = match TileGrid::from_layout(DEMO_MAZE) {
        Ok(grid) => grid,
        Err(err) => {
            eprintln!("invalid demo layout: {}", err);
            return;
        }
    };

    let mut app = create_headless_app(seed);
    app.add_plugins(SimulationPlugin);
    app.insert_resource(grid.clone());

    // Player статичен: управление им вне симуляционного core
    let Some(player_tile) = grid.tile_at(IVec2::new(1, 1)) else {
        eprintln!("player tile out of bounds");
        return;
    };
    app.world_mut().spawn((
        Player,
        PlayerStatus::new(player_tile),
        Transform::from_translation(grid.tile(player_tile).position),
    ));

    let mut spawn_failed = false;
    {
        let world = app.world_mut();
        world.resource_scope(|world, mut rng: Mut<DeterministicRng>| {
            let mut commands = world.commands();
            for behavior in [
                EnemyBehavior::Wander,
                EnemyBehavior::VisionChase,
                EnemyBehavior::InterceptChase,
            ] {
                if let Err(err) = spawn_enemy(
                    &mut commands,
                    &grid,
                    &mut rng.rng,
                    behavior,
                    EnemyConfig::default(),
                ) {
                    eprintln!("failed to spawn {:?} enemy: {}", behavior, err);
                    spawn_failed = true;
                }
            }
        });
        world.flush();
    }
    if spawn_failed {
        return;
    }

    // Owned simulation loop: явные fixed-тики вместо wall-clock
    for tick in 0..1000 {
        app.world_mut()
            .resource_mut::<Time<Fixed>>()
            .advance_by(TICK);
        app.world_mut().run_schedule(FixedUpdate);

        // FSM-переходы этого тика — в лог (подписка презентации)
        {
            let mut events = app.world_mut().resource_mut::<Events<EnemyStateChanged>>();
            for event in events.drain() {
                log(&format!(
                    "tick {}: {:?} {:?} -> {:?}",
                    tick, event.enemy, event.from, event.to
                ));
            }
        }

        if tick % 100 == 0 {
            let entity_count = app.world().entities().len();
            println!("Tick {}: {} entities", tick, entity_count);
        }
    }

    let mut query = app
        .world_mut()
        .query::<(&EnemyBehavior, &EnemyState, &Transform)>();
    for (behavior, state, transform) in query.iter(app.world()) {
        println!(
            "{:?}: state={:?} position={:.2?}",
            behavior, state, transform.translation
        );
    }
    println!("Simulation complete!");
}
