//! TileGrid — Resource с тайлами, lifecycle-гейтом и uniform sampling

use bevy::prelude::*;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

use super::tile::{Tile, TileId};

/// Порядок сканирования соседей: +x, -x, +y, -y
const ADJACENT_OFFSETS: [IVec2; 4] = [
    IVec2::new(1, 0),
    IVec2::new(-1, 0),
    IVec2::new(0, 1),
    IVec2::new(0, -1),
];

/// Lifecycle состояние карты
///
/// Destroyed — гейт в начале каждого tick: все enemy-системы no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapState {
    Active,
    Destroyed,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridError {
    #[error("grid has no walkable tiles")]
    NoWalkableTile,
    #[error("layout has no rows")]
    EmptyLayout,
    #[error("layout row {row} has width {found}, expected {expected}")]
    RaggedLayout {
        row: usize,
        found: usize,
        expected: usize,
    },
    #[error("unknown layout character {0:?}")]
    UnknownTile(char),
}

/// Навигационная сетка
///
/// Тайлы и их adjacency фиксируются при построении; мутабелен только
/// lifecycle state. Список walkable-тайлов прекомпьютится один раз,
/// sampling при reset/spawn за O(1) вместо retry-цикла по всему гриду.
#[derive(Resource, Debug, Clone)]
pub struct TileGrid {
    width: usize,
    height: usize,
    tiles: Vec<Tile>,
    walkable: Vec<TileId>,
    state: MapState,
}

impl TileGrid {
    /// Построить грид из текстового layout'а
    ///
    /// - `#` — стена (walkable=false, passable=false)
    /// - `.` — пол (walkable=true, passable=true)
    /// - `-` — завал: маршрут через него строится, но flank-целью он
    ///   не выбирается (walkable=true, passable=false)
    ///
    /// Пустые строки по краям игнорируются, остальные должны быть
    /// одинаковой ширины. Координата тайла (x, y) мапится в мировую
    /// позицию (x, 0, y), шаг сетки 1.0.
    pub fn from_layout(layout: &str) -> Result<Self, GridError> {
        let rows: Vec<&str> = layout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        if rows.is_empty() {
            return Err(GridError::EmptyLayout);
        }

        let width = rows[0].chars().count();
        let height = rows.len();
        for (row, line) in rows.iter().enumerate() {
            let found = line.chars().count();
            if found != width {
                return Err(GridError::RaggedLayout {
                    row,
                    found,
                    expected: width,
                });
            }
        }

        let mut tiles = Vec::with_capacity(width * height);
        for (y, line) in rows.iter().enumerate() {
            for (x, ch) in line.chars().enumerate() {
                let (walkable, passable) = match ch {
                    '#' => (false, false),
                    '.' => (true, true),
                    '-' => (true, false),
                    other => return Err(GridError::UnknownTile(other)),
                };
                let coord = IVec2::new(x as i32, y as i32);
                tiles.push(Tile {
                    coord,
                    position: Vec3::new(x as f32, 0.0, y as f32),
                    walkable,
                    passable,
                    adjacents: Vec::new(),
                });
            }
        }

        // Геометрическая adjacency; walkable/passable фильтруются на
        // стороне потребителей (planner, flank selection)
        for index in 0..tiles.len() {
            let coord = tiles[index].coord;
            let mut adjacents = Vec::with_capacity(4);
            for offset in ADJACENT_OFFSETS {
                let neighbor = coord + offset;
                if neighbor.x < 0
                    || neighbor.y < 0
                    || neighbor.x >= width as i32
                    || neighbor.y >= height as i32
                {
                    continue;
                }
                adjacents.push(TileId(neighbor.y as usize * width + neighbor.x as usize));
            }
            tiles[index].adjacents = adjacents;
        }

        let walkable = tiles
            .iter()
            .enumerate()
            .filter(|(_, tile)| tile.walkable)
            .map(|(index, _)| TileId(index))
            .collect();

        Ok(Self {
            width,
            height,
            tiles,
            walkable,
            state: MapState::Active,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Тайл по id. Id должен происходить из этого же грида.
    pub fn tile(&self, id: TileId) -> &Tile {
        &self.tiles[id.0]
    }

    pub fn tile_at(&self, coord: IVec2) -> Option<TileId> {
        if coord.x < 0
            || coord.y < 0
            || coord.x >= self.width as i32
            || coord.y >= self.height as i32
        {
            return None;
        }
        Some(TileId(coord.y as usize * self.width + coord.x as usize))
    }

    pub fn walkable_count(&self) -> usize {
        self.walkable.len()
    }

    /// Равномерный выбор walkable-тайла
    ///
    /// O(1) по прекомпьюченному списку. На полностью заблокированном
    /// гриде возвращает NoWalkableTile вместо бесконечного retry.
    pub fn sample_walkable(&self, rng: &mut ChaCha8Rng) -> Result<TileId, GridError> {
        if self.walkable.is_empty() {
            return Err(GridError::NoWalkableTile);
        }
        let index = rng.gen_range(0..self.walkable.len());
        Ok(self.walkable[index])
    }

    pub fn is_destroyed(&self) -> bool {
        self.state == MapState::Destroyed
    }

    pub fn destroy(&mut self) {
        self.state = MapState::Destroyed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    const LAYOUT: &str = "
        #.#
        .--
        #.#
    ";

    #[test]
    fn test_from_layout_flags() {
        let grid = TileGrid::from_layout(LAYOUT).unwrap();
        assert_eq!(grid.width(), 3);
        assert_eq!(grid.height(), 3);
        assert_eq!(grid.len(), 9);

        let wall = grid.tile(grid.tile_at(IVec2::new(0, 0)).unwrap());
        assert!(!wall.walkable);
        assert!(!wall.passable);

        let floor = grid.tile(grid.tile_at(IVec2::new(1, 0)).unwrap());
        assert!(floor.walkable);
        assert!(floor.passable);

        let rubble = grid.tile(grid.tile_at(IVec2::new(1, 1)).unwrap());
        assert!(rubble.walkable);
        assert!(!rubble.passable);
    }

    #[test]
    fn test_adjacency_scan_order() {
        let grid = TileGrid::from_layout(LAYOUT).unwrap();
        let center = grid.tile_at(IVec2::new(1, 1)).unwrap();
        let adjacents: Vec<IVec2> = grid
            .tile(center)
            .adjacents
            .iter()
            .map(|id| grid.tile(*id).coord)
            .collect();
        // +x, -x, +y, -y
        assert_eq!(
            adjacents,
            vec![
                IVec2::new(2, 1),
                IVec2::new(0, 1),
                IVec2::new(1, 2),
                IVec2::new(1, 0),
            ]
        );
    }

    #[test]
    fn test_adjacency_clipped_at_border() {
        let grid = TileGrid::from_layout(LAYOUT).unwrap();
        let corner = grid.tile_at(IVec2::new(0, 0)).unwrap();
        // У угла только 2 соседа в пределах грида
        assert_eq!(grid.tile(corner).adjacents.len(), 2);
    }

    #[test]
    fn test_sample_walkable_returns_walkable() {
        let grid = TileGrid::from_layout(LAYOUT).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..50 {
            let id = grid.sample_walkable(&mut rng).unwrap();
            assert!(grid.tile(id).walkable);
        }
    }

    #[test]
    fn test_sample_walkable_all_blocked() {
        let grid = TileGrid::from_layout("###\n###").unwrap();
        assert_eq!(grid.walkable_count(), 0);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        assert_eq!(
            grid.sample_walkable(&mut rng),
            Err(GridError::NoWalkableTile)
        );
    }

    #[test]
    fn test_layout_errors() {
        assert_eq!(
            TileGrid::from_layout("  \n  ").unwrap_err(),
            GridError::EmptyLayout
        );
        assert_eq!(
            TileGrid::from_layout("##\n###").unwrap_err(),
            GridError::RaggedLayout {
                row: 1,
                found: 3,
                expected: 2,
            }
        );
        assert_eq!(
            TileGrid::from_layout("#?").unwrap_err(),
            GridError::UnknownTile('?')
        );
    }

    #[test]
    fn test_tile_at_bounds() {
        let grid = TileGrid::from_layout(LAYOUT).unwrap();
        assert!(grid.tile_at(IVec2::new(-1, 0)).is_none());
        assert!(grid.tile_at(IVec2::new(3, 0)).is_none());
        assert!(grid.tile_at(IVec2::new(2, 2)).is_some());
    }

    #[test]
    fn test_destroy_lifecycle() {
        let mut grid = TileGrid::from_layout(LAYOUT).unwrap();
        assert!(!grid.is_destroyed());
        grid.destroy();
        assert!(grid.is_destroyed());
    }
}
