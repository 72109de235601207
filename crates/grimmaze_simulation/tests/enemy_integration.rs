//! Enemy integration test
//!
//! Headless App: player + 3 enemy-профиля в лабиринте. Fixed-тики
//! прогоняются явно (advance Time<Fixed> + run_schedule), чтобы прогон
//! не зависел от wall-clock.
//!
//! Проверяем:
//! - инварианты агентов на длинном прогоне (walkable тайлы, живые состояния)
//! - frozen-инварианты (goal reached / dead / map destroyed)
//! - reset postconditions
//! - преследование статичного player'а до его тайла

use std::time::Duration;

use bevy::ecs::system::RunSystemOnce;
use bevy::prelude::*;
use grimmaze_simulation::enemy::apply_enemy_resets;
use grimmaze_simulation::*;

const MAZE: &str = "
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

fn create_maze_app(seed: u64) -> (App, TileGrid) {
    let mut app = create_headless_app(seed);
    app.add_plugins(SimulationPlugin);
    let grid = TileGrid::from_layout(MAZE).expect("maze layout is valid");
    app.insert_resource(grid.clone());
    (app, grid)
}

fn spawn_player_at(app: &mut App, grid: &TileGrid, x: i32, y: i32) -> Entity {
    let tile = grid
        .tile_at(IVec2::new(x, y))
        .expect("player tile in bounds");
    app.world_mut()
        .spawn((
            Player,
            PlayerStatus::new(tile),
            Transform::from_translation(grid.tile(tile).position),
        ))
        .id()
}

fn spawn_all_profiles(app: &mut App, grid: &TileGrid) -> Vec<Entity> {
    let mut spawned = Vec::new();
    let world = app.world_mut();
    world.resource_scope(|world, mut rng: Mut<DeterministicRng>| {
        let mut commands = world.commands();
        for behavior in [
            EnemyBehavior::Wander,
            EnemyBehavior::VisionChase,
            EnemyBehavior::InterceptChase,
        ] {
            let entity = spawn_enemy(
                &mut commands,
                grid,
                &mut rng.rng,
                behavior,
                EnemyConfig::default(),
            )
            .expect("maze has walkable tiles");
            spawned.push(entity);
        }
    });
    world.flush();
    spawned
}

/// Явный fixed-тик симуляции
fn step(app: &mut App, dt: Duration) {
    app.world_mut().resource_mut::<Time<Fixed>>().advance_by(dt);
    app.world_mut().run_schedule(FixedUpdate);
}

/// Снимок всего наблюдаемого состояния агентов
fn agents_snapshot(app: &mut App) -> Vec<u8> {
    let world = app.world_mut();
    let mut snapshot = world_snapshot::<Enemy>(world);
    snapshot.extend(world_snapshot::<EnemyState>(world));
    snapshot.extend(world_snapshot::<Velocity>(world));
    snapshot.extend(world_snapshot::<Transform>(world));
    snapshot
}

#[test]
fn test_agents_hold_invariants_over_long_run() {
    let (mut app, grid) = create_maze_app(42);
    spawn_player_at(&mut app, &grid, 1, 1);
    spawn_all_profiles(&mut app, &grid);

    for tick in 0..600 {
        step(&mut app, TICK);

        if tick % 100 == 0 {
            let mut query = app
                .world_mut()
                .query::<(&Enemy, &EnemyState, &Transform)>();
            for (enemy, state, transform) in query.iter(app.world()) {
                assert!(
                    grid.tile(enemy.current_tile).walkable,
                    "current_tile всегда walkable"
                );
                assert!(
                    transform.translation.is_finite(),
                    "позиция без NaN/inf"
                );
                assert!(
                    !matches!(state, EnemyState::Rest | EnemyState::Static),
                    "reserved-состояния недостижимы"
                );
            }
        }
    }
}

#[test]
fn test_frozen_after_goal_reached() {
    let (mut app, grid) = create_maze_app(42);
    let player = spawn_player_at(&mut app, &grid, 1, 1);
    spawn_all_profiles(&mut app, &grid);

    // Немного обычной симуляции, потом terminal-флаг
    for _ in 0..60 {
        step(&mut app, TICK);
    }
    app.world_mut()
        .get_mut::<PlayerStatus>(player)
        .expect("player status")
        .goal_reached = true;

    let before = agents_snapshot(&mut app);
    for _ in 0..200 {
        step(&mut app, TICK);
    }
    let after = agents_snapshot(&mut app);

    assert_eq!(before, after, "агенты заморожены до reset");
}

#[test]
fn test_frozen_after_player_death() {
    let (mut app, grid) = create_maze_app(7);
    let player = spawn_player_at(&mut app, &grid, 1, 1);
    spawn_all_profiles(&mut app, &grid);

    for _ in 0..60 {
        step(&mut app, TICK);
    }
    app.world_mut()
        .get_mut::<PlayerStatus>(player)
        .expect("player status")
        .dead = true;

    let before = agents_snapshot(&mut app);
    for _ in 0..200 {
        step(&mut app, TICK);
    }
    let after = agents_snapshot(&mut app);

    assert_eq!(before, after);
}

#[test]
fn test_frozen_after_map_destroyed() {
    let (mut app, grid) = create_maze_app(9);
    spawn_player_at(&mut app, &grid, 1, 1);
    spawn_all_profiles(&mut app, &grid);

    for _ in 0..60 {
        step(&mut app, TICK);
    }
    app.world_mut().resource_mut::<TileGrid>().destroy();

    let before = agents_snapshot(&mut app);
    for _ in 0..200 {
        step(&mut app, TICK);
    }
    let after = agents_snapshot(&mut app);

    assert_eq!(before, after);
}

#[test]
fn test_reset_event_restores_agents() {
    let (mut app, grid) = create_maze_app(42);
    spawn_player_at(&mut app, &grid, 1, 1);
    let enemies = spawn_all_profiles(&mut app, &grid);

    // Дёргаем симуляцию, чтобы агенты ушли из начального состояния
    for _ in 0..120 {
        step(&mut app, TICK);
    }

    app.world_mut().send_event(ResetEnemies);
    app.world_mut()
        .run_system_once(apply_enemy_resets)
        .expect("reset system runs");

    for entity in enemies {
        let enemy = app.world().get::<Enemy>(entity).expect("enemy");
        let state = app.world().get::<EnemyState>(entity).expect("state");
        let velocity = app.world().get::<Velocity>(entity).expect("velocity");
        let transform = app.world().get::<Transform>(entity).expect("transform");

        assert_eq!(*state, EnemyState::Default);
        assert!(enemy.path.is_empty());
        assert_eq!(enemy.target_tile, None);
        assert!(grid.tile(enemy.current_tile).walkable);
        assert_eq!(
            transform.translation,
            grid.tile(enemy.current_tile).position,
            "телепорт на новый тайл"
        );
        assert_eq!(velocity.0, Vec3::ZERO);
    }
}

#[test]
fn test_vision_chase_reaches_static_player() {
    let mut app = create_headless_app(42);
    app.add_plugins(SimulationPlugin);
    let grid = TileGrid::from_layout(
        "
        .....
        .....
        .....
        .....
        .....
    ",
    )
    .expect("open grid");
    app.insert_resource(grid.clone());

    let player_tile = grid.tile_at(IVec2::new(2, 2)).expect("in bounds");
    let enemy_tile = grid.tile_at(IVec2::new(0, 0)).expect("in bounds");
    app.world_mut().spawn((
        Player,
        PlayerStatus::new(player_tile),
        Transform::from_translation(grid.tile(player_tile).position),
    ));
    // Spawn в vision_range: дистанция sqrt(8) < 5
    let enemy = app
        .world_mut()
        .spawn((
            Enemy::at(enemy_tile),
            EnemyState::default(),
            EnemyBehavior::VisionChase,
            EnemyConfig::default(),
            Velocity::default(),
            Transform::from_translation(grid.tile(enemy_tile).position),
        ))
        .id();

    for _ in 0..600 {
        step(&mut app, TICK);
    }

    let reached = app.world().get::<Enemy>(enemy).expect("enemy");
    assert_eq!(
        reached.current_tile, player_tile,
        "преследование доводит до тайла player'а"
    );
    let position = app.world().get::<Transform>(enemy).expect("transform");
    assert!(
        position
            .translation
            .distance(grid.tile(player_tile).position)
            < 0.1
    );
}

#[test]
fn test_plain_update_loop_smoke() {
    // Классический app.update() прогон: без точных утверждений по тикам,
    // только отсутствие паник и валидность состояний
    let (mut app, grid) = create_maze_app(42);
    spawn_player_at(&mut app, &grid, 1, 1);
    spawn_all_profiles(&mut app, &grid);

    for _ in 0..100 {
        app.update();
    }

    let mut query = app.world_mut().query::<(&Enemy, &EnemyState)>();
    for (enemy, state) in query.iter(app.world()) {
        assert!(grid.tile(enemy.current_tile).walkable);
        assert!(!matches!(state, EnemyState::Rest | EnemyState::Static));
    }
}
