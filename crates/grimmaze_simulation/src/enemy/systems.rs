//! Enemy decision systems: guard-гейты, dispatch по профилю, движение,
//! reset
//!
//! Порядок внутри тика (FixedUpdate, .chain()):
//! 1. apply_enemy_resets — внешние reset-запросы
//! 2. enemy_decision_system — guard'ы → handler профиля → интеграция
//!
//! Handler'ы мутируют FSM state и дёргают планировщики; интеграция
//! двигает позицию, только пока агент в Moving и у него есть target.

use bevy::prelude::*;
use rand_chacha::ChaCha8Rng;

use super::components::{Enemy, EnemyBehavior, EnemyConfig, EnemyState, Velocity};
use super::events::{EnemyStateChanged, ResetEnemies};
use crate::map::{GridError, TileGrid, TileId};
use crate::pathfinding::{random_path, shortest_path};
use crate::player::{Player, PlayerStatus};
use crate::DeterministicRng;

/// Порог arrival: дистанция до waypoint ≤ порога — тайл достигнут
pub const ARRIVAL_EPSILON: f32 = 0.05;

/// Длина случайного маршрута, запрашиваемого в Default
pub const WANDER_PATH_LEN: usize = 20;

/// Снимок наблюдаемого состояния player'а на один тик
#[derive(Debug, Clone, Copy)]
pub struct PlayerObservation {
    pub position: Vec3,
    pub current_tile: TileId,
}

/// Система: основной tick всех enemy-агентов
///
/// Guard'ы на весь тик: карта destroyed либо terminal-флаг player'а —
/// полный no-op, агенты заморожены до внешнего reset.
pub fn enemy_decision_system(
    grid: Res<TileGrid>,
    time: Res<Time<Fixed>>,
    mut rng: ResMut<DeterministicRng>,
    player: Query<(&Transform, &PlayerStatus), With<Player>>,
    mut enemies: Query<
        (
            Entity,
            &EnemyBehavior,
            &EnemyConfig,
            &mut Enemy,
            &mut EnemyState,
            &mut Velocity,
            &mut Transform,
        ),
        Without<Player>,
    >,
    mut transitions: EventWriter<EnemyStateChanged>,
) {
    if grid.is_destroyed() {
        return;
    }
    let Ok((player_transform, status)) = player.single() else {
        return;
    };
    if status.goal_reached || status.dead {
        return;
    }

    let observed = PlayerObservation {
        position: player_transform.translation,
        current_tile: status.current_tile,
    };
    let dt = time.delta_secs();

    for (entity, behavior, config, mut enemy, mut state, mut velocity, mut transform) in
        enemies.iter_mut()
    {
        let mut position = transform.translation;
        let transition = tick_enemy(
            &grid,
            &mut rng.rng,
            &observed,
            *behavior,
            config,
            &mut enemy,
            &mut state,
            &mut velocity.0,
            &mut position,
            dt,
        );
        transform.translation = position;

        if let Some((from, to)) = transition {
            transitions.write(EnemyStateChanged {
                enemy: entity,
                from,
                to,
            });
        }
    }
}

/// Один tick решения и движения для одного агента
///
/// Guard-условия проверяет caller. Сначала handler профиля (FSM,
/// планировщики), затем интеграция движения, если агент в Moving.
/// Возвращает FSM transition тика — их бывает максимум один.
#[allow(clippy::too_many_arguments)]
pub fn tick_enemy(
    grid: &TileGrid,
    rng: &mut ChaCha8Rng,
    player: &PlayerObservation,
    behavior: EnemyBehavior,
    config: &EnemyConfig,
    enemy: &mut Enemy,
    state: &mut EnemyState,
    velocity: &mut Vec3,
    position: &mut Vec3,
    dt: f32,
) -> Option<(EnemyState, EnemyState)> {
    let transition = match behavior {
        EnemyBehavior::Wander => handle_wander(grid, rng, enemy, state, *position),
        EnemyBehavior::VisionChase => {
            handle_vision_chase(grid, rng, player, config, enemy, state, *position)
        }
        EnemyBehavior::InterceptChase => {
            handle_intercept_chase(grid, rng, player, config, enemy, state, *position)
        }
    };

    if *state == EnemyState::Moving {
        if let Some(target) = enemy.target_tile {
            integrate_towards(grid.tile(target).position, config.speed, dt, velocity, position);
        }
    } else {
        *velocity = Vec3::ZERO;
    }

    transition
}

/// Wander: блуждание Default ⇄ Moving, player игнорируется
fn handle_wander(
    grid: &TileGrid,
    rng: &mut ChaCha8Rng,
    enemy: &mut Enemy,
    state: &mut EnemyState,
    position: Vec3,
) -> Option<(EnemyState, EnemyState)> {
    match *state {
        EnemyState::Default => plan_next_waypoint(grid, rng, enemy, state),
        EnemyState::Moving => check_arrival(grid, enemy, state, position),
        // Rest/Static/Chase здесь недостижимы — self-heal в Default
        _ => transition(state, EnemyState::Default),
    }
}

/// VisionChase: блуждание + преследование тайла player'а в vision_range
fn handle_vision_chase(
    grid: &TileGrid,
    rng: &mut ChaCha8Rng,
    player: &PlayerObservation,
    config: &EnemyConfig,
    enemy: &mut Enemy,
    state: &mut EnemyState,
    position: Vec3,
) -> Option<(EnemyState, EnemyState)> {
    match *state {
        EnemyState::Default => {
            if position.distance(player.position) <= config.vision_range {
                // Тайл в этом тике не расходуется: path/target нетронуты
                transition(state, EnemyState::Chase)
            } else {
                plan_next_waypoint(grid, rng, enemy, state)
            }
        }
        EnemyState::Moving => check_arrival(grid, enemy, state, position),
        EnemyState::Chase => {
            if enemy.path.is_empty() {
                enemy.path = shortest_path(grid, enemy.current_tile, player.current_tile);
            }
            // Выхода Chase → Default по потере vision нет: после первого
            // срабатывания преследование перманентно
            advance_to_next_waypoint(enemy, state)
        }
        _ => transition(state, EnemyState::Default),
    }
}

/// InterceptChase: как VisionChase, но маршрут строится к flank-тайлу,
/// смежному с тайлом player'а, а не к самому player'у
fn handle_intercept_chase(
    grid: &TileGrid,
    rng: &mut ChaCha8Rng,
    player: &PlayerObservation,
    config: &EnemyConfig,
    enemy: &mut Enemy,
    state: &mut EnemyState,
    position: Vec3,
) -> Option<(EnemyState, EnemyState)> {
    match *state {
        EnemyState::Default => {
            if position.distance(player.position) <= config.vision_range {
                transition(state, EnemyState::Chase)
            } else {
                plan_next_waypoint(grid, rng, enemy, state)
            }
        }
        EnemyState::Moving => check_arrival(grid, enemy, state, position),
        EnemyState::Chase => {
            if enemy.path.is_empty() {
                match select_flank_tile(grid, player.current_tile) {
                    Some(flank) => {
                        enemy.path = shortest_path(grid, enemy.current_tile, flank);
                    }
                    None => {
                        // У тайла player'а нет passable-соседа: запрос
                        // маршрута пропускаем, retry следующим тиком
                        crate::log(&format!(
                            "no passable flank tile around player tile {:?}",
                            player.current_tile
                        ));
                    }
                }
            }
            advance_to_next_waypoint(enemy, state)
        }
        _ => transition(state, EnemyState::Default),
    }
}

/// Default-ветка блуждания: пополнить пустой path случайным маршрутом и
/// забрать следующий waypoint
fn plan_next_waypoint(
    grid: &TileGrid,
    rng: &mut ChaCha8Rng,
    enemy: &mut Enemy,
    state: &mut EnemyState,
) -> Option<(EnemyState, EnemyState)> {
    if enemy.path.is_empty() {
        enemy.path = random_path(grid, enemy.current_tile, WANDER_PATH_LEN, rng);
    }
    advance_to_next_waypoint(enemy, state)
}

/// Следующий waypoint из path → Moving
///
/// Пустой path — планировщик не дал маршрута: остаёмся в текущем
/// состоянии и ретраим следующим тиком (retry-by-polling).
fn advance_to_next_waypoint(
    enemy: &mut Enemy,
    state: &mut EnemyState,
) -> Option<(EnemyState, EnemyState)> {
    match enemy.path.pop_front() {
        Some(next) => {
            enemy.target_tile = Some(next);
            transition(state, EnemyState::Moving)
        }
        None => None,
    }
}

/// Moving: проверка достижения waypoint (порог inclusive)
///
/// На arrival current_tile снапится на target, состояние возвращается в
/// Default; интеграция в этом тике уже не выполняется.
fn check_arrival(
    grid: &TileGrid,
    enemy: &mut Enemy,
    state: &mut EnemyState,
    position: Vec3,
) -> Option<(EnemyState, EnemyState)> {
    let Some(target) = enemy.target_tile else {
        // Moving без target — нарушенный инвариант, восстанавливаемся
        crate::log_warning("enemy in Moving state without target tile, resetting to Default");
        return transition(state, EnemyState::Default);
    };

    if position.distance(grid.tile(target).position) <= ARRIVAL_EPSILON {
        enemy.current_tile = target;
        transition(state, EnemyState::Default)
    } else {
        None
    }
}

/// Первый passable тайл, смежный с тайлом player'а
///
/// Порядок adjacents фиксирован гридом, выбор детерминирован.
fn select_flank_tile(grid: &TileGrid, player_tile: TileId) -> Option<TileId> {
    grid.tile(player_tile)
        .adjacents
        .iter()
        .copied()
        .find(|id| grid.tile(*id).passable)
}

/// Кинематическая интеграция к waypoint
///
/// velocity = normalize(target − position) * speed; шаг ограничен
/// оставшейся дистанцией, агент приземляется на waypoint без
/// overshoot-осцилляции при больших speed * dt.
fn integrate_towards(
    target: Vec3,
    speed: f32,
    dt: f32,
    velocity: &mut Vec3,
    position: &mut Vec3,
) {
    let to_target = target - *position;
    let direction = to_target.normalize_or_zero();
    *velocity = direction * speed;
    let step = (speed * dt).min(to_target.length());
    *position += direction * step;
}

/// Смена состояния с фиксацией перехода
fn transition(
    state: &mut EnemyState,
    to: EnemyState,
) -> Option<(EnemyState, EnemyState)> {
    let from = *state;
    if from == to {
        return None;
    }
    *state = to;
    Some((from, to))
}

/// Reset одного агента
///
/// path и target очищаются, состояние — Default, current_tile — новый
/// равномерно-случайный walkable тайл, позиция телепортируется на него.
/// На полностью заблокированном гриде агент не мутируется, ошибка
/// уходит caller'у.
pub fn reset_enemy(
    grid: &TileGrid,
    rng: &mut ChaCha8Rng,
    enemy: &mut Enemy,
    state: &mut EnemyState,
    velocity: &mut Vec3,
    position: &mut Vec3,
) -> Result<Option<(EnemyState, EnemyState)>, GridError> {
    let spawn = grid.sample_walkable(rng)?;

    enemy.path.clear();
    enemy.target_tile = None;
    enemy.current_tile = spawn;
    *position = grid.tile(spawn).position;
    *velocity = Vec3::ZERO;

    Ok(transition(state, EnemyState::Default))
}

/// Система: применить внешние ResetEnemies-запросы ко всем агентам
///
/// Работает независимо от guard-гейтов decision tick'а: reset — часть
/// рестарта раунда и должен срабатывать и на замороженных агентах.
pub fn apply_enemy_resets(
    mut requests: EventReader<ResetEnemies>,
    grid: Res<TileGrid>,
    mut rng: ResMut<DeterministicRng>,
    mut enemies: Query<
        (Entity, &mut Enemy, &mut EnemyState, &mut Velocity, &mut Transform),
        Without<Player>,
    >,
    mut transitions: EventWriter<EnemyStateChanged>,
) {
    if requests.is_empty() {
        return;
    }
    requests.clear();

    for (entity, mut enemy, mut state, mut velocity, mut transform) in enemies.iter_mut() {
        let mut position = transform.translation;
        match reset_enemy(
            &grid,
            &mut rng.rng,
            &mut enemy,
            &mut state,
            &mut velocity.0,
            &mut position,
        ) {
            Ok(Some((from, to))) => {
                transform.translation = position;
                transitions.write(EnemyStateChanged {
                    enemy: entity,
                    from,
                    to,
                });
            }
            Ok(None) => {
                transform.translation = position;
            }
            Err(err) => {
                crate::log_error(&format!("enemy reset failed for {:?}: {}", entity, err));
            }
        }
    }
    crate::log("enemy reset");
}

/// Spawn нового агента на равномерно-случайном walkable тайле
pub fn spawn_enemy(
    commands: &mut Commands,
    grid: &TileGrid,
    rng: &mut ChaCha8Rng,
    behavior: EnemyBehavior,
    config: EnemyConfig,
) -> Result<Entity, GridError> {
    let spawn = grid.sample_walkable(rng)?;
    let position = grid.tile(spawn).position;

    let entity = commands
        .spawn((
            Enemy::at(spawn),
            EnemyState::default(),
            behavior,
            config,
            Velocity::default(),
            Transform::from_translation(position),
        ))
        .id();

    Ok(entity)
}
