//! Player observation surface
//!
//! Enemy core читает player read-only: позицию (Transform), текущий тайл
//! и два terminal-флага. Управление player'ом — вне этого crate.

use bevy::prelude::*;

use crate::map::TileId;

/// Marker component для tracked actor
///
/// Enemy-системы используют `Without<Player>` filter: агент никогда не
/// трактует player-entity как enemy.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Player;

/// Наблюдаемое состояние player'а
///
/// goal_reached / dead — terminal-флаги: пока любой из них установлен,
/// все enemy-агенты заморожены (до внешнего reset).
#[derive(Component, Debug, Clone)]
pub struct PlayerStatus {
    pub current_tile: TileId,
    pub goal_reached: bool,
    pub dead: bool,
}

impl PlayerStatus {
    pub fn new(current_tile: TileId) -> Self {
        Self {
            current_tile,
            goal_reached: false,
            dead: false,
        }
    }
}
