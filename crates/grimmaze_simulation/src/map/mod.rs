//! Map domain — навигационная сетка
//!
//! Содержит:
//! - Tile, TileId (ячейки и их stable-индексы)
//! - TileGrid (Resource: хранение тайлов, lifecycle, uniform sampling)
//! - MapState, GridError

pub mod grid;
pub mod tile;

// Re-export all map types
pub use grid::*;
pub use tile::*;
