//! Enemy события — наблюдаемый поток FSM-переходов
//!
//! Презентационный слой (цвет/материал/звук) подписывается на
//! EnemyStateChanged вместо того, чтобы core мутировал визуалы сам.

use bevy::prelude::*;

use super::components::EnemyState;

/// FSM transition одного агента (from → to)
///
/// Эмитится на каждый фактический переход; за тик у агента их максимум
/// один.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnemyStateChanged {
    pub enemy: Entity,
    pub from: EnemyState,
    pub to: EnemyState,
}

/// Внешний запрос на reset всех enemy-агентов
///
/// Обрабатывается до decision tick'а и независимо от его guard-гейтов:
/// reset — часть рестарта раунда, действует и на замороженных агентов.
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct ResetEnemies;
