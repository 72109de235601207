//! Enemy domain — per-agent decision core
//!
//! FSM c тремя профилями поведения (Wander / VisionChase /
//! InterceptChase) поверх общего цикла Default ⇄ Moving.

use bevy::prelude::*;

pub mod components;
pub mod events;
pub mod systems;

// Tests (separate files with _tests suffix)
#[cfg(test)]
mod components_tests;

// Re-export основных типов
pub use components::*;
pub use events::*;
pub use systems::{
    apply_enemy_resets, enemy_decision_system, reset_enemy, spawn_enemy, tick_enemy,
    PlayerObservation, ARRIVAL_EPSILON, WANDER_PATH_LEN,
};

/// Enemy Plugin
///
/// Регистрирует системы в FixedUpdate для детерминизма. Порядок:
/// 1. apply_enemy_resets — внешние reset-запросы
/// 2. enemy_decision_system — guard'ы, dispatch, движение
pub struct EnemyPlugin;

impl Plugin for EnemyPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<EnemyStateChanged>()
            .add_event::<ResetEnemies>()
            .add_systems(
                FixedUpdate,
                (systems::apply_enemy_resets, systems::enemy_decision_system).chain(),
            );
    }
}
