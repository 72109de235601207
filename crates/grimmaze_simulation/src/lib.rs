//! GRIMMAZE Simulation Core
//!
//! Headless ECS-симуляция на Bevy 0.16: enemies на тайловой сетке,
//! per-agent FSM (wander / chase), tick-driven движение по waypoint'ам.
//!
//! Архитектура:
//! - ECS = strategic layer (grid, FSM, path planning, движение)
//! - Презентация подписывается на EnemyStateChanged events, core её не знает

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod enemy;
pub mod logger;
pub mod map;
pub mod pathfinding;
pub mod player;

// Re-export базовых типов для удобства
pub use enemy::{
    spawn_enemy, Enemy, EnemyBehavior, EnemyConfig, EnemyPlugin, EnemyState, EnemyStateChanged,
    ResetEnemies, Velocity,
};
pub use logger::{init_logger, log, log_error, log_info, log_warning};
pub use map::{GridError, MapState, Tile, TileGrid, TileId};
pub use pathfinding::TilePath;
pub use player::{Player, PlayerStatus};

/// Главный plugin симуляции (объединяет все подсистемы)
///
/// RNG resource НЕ вставляет: seed выбирает владелец App
/// (см. [`create_headless_app`]), plugin его не перетирает.
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app
            // Fixed timestep 60Hz для simulation tick (легче считать интервалы)
            .insert_resource(Time::<Fixed>::from_hz(60.0))
            .add_plugins(EnemyPlugin);
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создаёт minimal Bevy App для headless симуляции
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    logger::init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed))
        .insert_resource(Time::<Fixed>::from_hz(60.0)); // 60Hz FixedUpdate

    app
}

/// Snapshot мира для сравнения детерминизма
///
/// Собирает компоненты типа T в байтовый буфер, отсортированный по
/// Entity ID. Debug-формат: простейший способ, стабильный для сравнения
/// двух прогонов с одним seed.
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    entities.sort_by_key(|(entity, _)| entity.index());

    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
