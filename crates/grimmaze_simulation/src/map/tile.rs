//! Tile — атомарная ячейка навигационной сетки

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Stable индекс тайла внутри его TileGrid
///
/// Все перекрёстные ссылки (agent state, paths, adjacency) ходят через
/// TileId, owning-ссылок между тайлами нет. Id валиден только для грида,
/// который его выдал.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Reflect)]
pub struct TileId(pub usize);

/// Ячейка сетки
///
/// Immutable после построения грида.
///
/// - `walkable` — тайл пригоден как waypoint маршрута и spawn-точка
/// - `passable` — тайл проходим как цель flank-манёвра
/// - `adjacents` — соседи в фиксированном порядке сканирования
///   (+x, -x, +y, -y); порядок наблюдаем извне: выбор flank-тайла берёт
///   первый passable в этом порядке
#[derive(Debug, Clone)]
pub struct Tile {
    pub coord: IVec2,
    pub position: Vec3,
    pub walkable: bool,
    pub passable: bool,
    pub adjacents: Vec<TileId>,
}
