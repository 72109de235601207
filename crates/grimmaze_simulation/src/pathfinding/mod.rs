//! Path planners: случайный маршрут и A* shortest path
//!
//! Контракт для enemy core:
//! - планировщики синхронные, полный маршрут за один вызов
//! - пустой TilePath = "маршрута нет в этом тике", caller ретраит
//!   следующим тиком; это не ошибка
//! - start-тайл в маршрут не входит, goal входит

use std::cmp::Reverse;
use std::collections::{BinaryHeap, VecDeque};

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::map::{TileGrid, TileId};

/// Очередь waypoint'ов от планировщика
///
/// Потребляется строго front-to-back, один тайл на arrival. Владелец —
/// один enemy; при инвалидации заменяется целиком, не сплайсится.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TilePath {
    queue: VecDeque<TileId>,
}

impl TilePath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_back(&mut self, id: TileId) {
        self.queue.push_back(id);
    }

    pub fn pop_front(&mut self) -> Option<TileId> {
        self.queue.pop_front()
    }

    pub fn front(&self) -> Option<TileId> {
        self.queue.front().copied()
    }

    pub fn back(&self) -> Option<TileId> {
        self.queue.back().copied()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = TileId> + '_ {
        self.queue.iter().copied()
    }
}

impl FromIterator<TileId> for TilePath {
    fn from_iter<I: IntoIterator<Item = TileId>>(iter: I) -> Self {
        Self {
            queue: iter.into_iter().collect(),
        }
    }
}

/// Случайный walkable-маршрут длиной до max_len от start (start не входит)
///
/// Блуждание по walkable-соседям; разворот на предыдущий тайл только
/// когда другого walkable-соседа нет (тупик). Пустой маршрут — у start
/// нет walkable-соседей.
pub fn random_path(
    grid: &TileGrid,
    start: TileId,
    max_len: usize,
    rng: &mut ChaCha8Rng,
) -> TilePath {
    let mut path = TilePath::new();
    let mut prev: Option<TileId> = None;
    let mut current = start;

    for _ in 0..max_len {
        let candidates: Vec<TileId> = grid
            .tile(current)
            .adjacents
            .iter()
            .copied()
            .filter(|id| grid.tile(*id).walkable)
            .collect();
        if candidates.is_empty() {
            break;
        }

        let forward: Vec<TileId> = candidates
            .iter()
            .copied()
            .filter(|id| Some(*id) != prev)
            .collect();
        let pool = if forward.is_empty() { &candidates } else { &forward };
        let next = pool[rng.gen_range(0..pool.len())];

        path.push_back(next);
        prev = Some(current);
        current = next;
    }

    path
}

/// A* кратчайший маршрут start → goal (start не входит, goal входит)
///
/// Равномерная цена шага, Manhattan-эвристика. Tie-break по порядку
/// вставки в frontier — одинаковый вход даёт одинаковый маршрут.
/// Пустой маршрут: goal недостижим, не walkable, либо start == goal.
pub fn shortest_path(grid: &TileGrid, start: TileId, goal: TileId) -> TilePath {
    if start == goal || !grid.tile(goal).walkable {
        return TilePath::new();
    }

    let mut best: Vec<u32> = vec![u32::MAX; grid.len()];
    let mut parent: Vec<Option<TileId>> = vec![None; grid.len()];
    // (f = g + h, порядковый номер вставки, tile index)
    let mut frontier: BinaryHeap<Reverse<(u32, u32, usize)>> = BinaryHeap::new();
    let mut sequence: u32 = 0;

    best[start.0] = 0;
    frontier.push(Reverse((heuristic(grid, start, goal), sequence, start.0)));

    while let Some(Reverse((_, _, index))) = frontier.pop() {
        let current = TileId(index);
        if current == goal {
            break;
        }
        let cost = best[index];

        for &next in &grid.tile(current).adjacents {
            if !grid.tile(next).walkable {
                continue;
            }
            let next_cost = cost + 1;
            if next_cost < best[next.0] {
                best[next.0] = next_cost;
                parent[next.0] = Some(current);
                sequence += 1;
                frontier.push(Reverse((
                    next_cost + heuristic(grid, next, goal),
                    sequence,
                    next.0,
                )));
            }
        }
    }

    if parent[goal.0].is_none() {
        return TilePath::new();
    }

    // Восстановление по parent-ссылкам, от goal к start
    let mut reversed = vec![goal];
    let mut cursor = goal;
    while let Some(step) = parent[cursor.0] {
        if step == start {
            break;
        }
        reversed.push(step);
        cursor = step;
    }
    reversed.into_iter().rev().collect()
}

fn heuristic(grid: &TileGrid, from: TileId, to: TileId) -> u32 {
    let a = grid.tile(from).coord;
    let b = grid.tile(to).coord;
    ((a.x - b.x).abs() + (a.y - b.y).abs()) as u32
}
