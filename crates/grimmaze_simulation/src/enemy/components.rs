//! Enemy FSM компоненты: состояние, профиль поведения, конфигурация

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::map::TileId;
use crate::pathfinding::TilePath;

/// FSM состояния enemy
///
/// Активный цикл: Default ⇄ Moving, плюс Default → Chase → Moving для
/// vision-aware профилей. Rest и Static — reserved: ни один transition
/// их не производит, handler'ы лечат их fallback-веткой в Default.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub enum EnemyState {
    /// Планирование: выбор следующего waypoint
    Default,
    /// Движение к target_tile
    Moving,
    /// Преследование player'а (vision-aware профили)
    Chase,
    /// Reserved
    Rest,
    /// Reserved
    Static,
}

impl Default for EnemyState {
    fn default() -> Self {
        Self::Default
    }
}

/// Поведенческий профиль агента
///
/// Фиксируется при spawn и не мутируется core'ом до конца жизни агента.
#[derive(
    Component, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Reflect,
)]
#[reflect(Component)]
pub enum EnemyBehavior {
    /// Случайное блуждание, player игнорируется
    Wander,
    /// Блуждание + преследование тайла player'а в vision_range
    VisionChase,
    /// Как VisionChase, но цель — flank: первый passable тайл,
    /// смежный с тайлом player'а
    InterceptChase,
}

/// Конфигурация агента (construction-time, далее immutable)
#[derive(Component, Debug, Clone, Serialize, Deserialize, Reflect)]
#[reflect(Component)]
pub struct EnemyConfig {
    /// Скорость движения (units/sec)
    pub speed: f32,
    /// Радиус обнаружения player'а (units, порог inclusive)
    pub vision_range: f32,
    /// Reserved: объявлен, но не участвует ни в одном transition
    pub max_proximity_counter: u32,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            speed: 1.0,
            vision_range: 5.0,
            max_proximity_counter: 5,
        }
    }
}

/// Навигационное состояние агента
///
/// Инварианты:
/// - current_tile обновляется только на arrival
/// - path/target_tile пополняются только при входе в Moving
/// - агент не двигается без target_tile
#[derive(Component, Debug, Clone)]
pub struct Enemy {
    /// Последний занятый тайл; авторитетная позиция на сетке
    pub current_tile: TileId,
    /// Активный waypoint
    pub target_tile: Option<TileId>,
    /// Остаток маршрута после target_tile
    pub path: TilePath,
}

impl Enemy {
    pub fn at(tile: TileId) -> Self {
        Self {
            current_tile: tile,
            target_tile: None,
            path: TilePath::new(),
        }
    }
}

/// Transient скорость: пересчитывается каждый Moving-тик, иначе ноль
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Velocity(pub Vec3);
