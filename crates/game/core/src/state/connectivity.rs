//! Post-generation connectivity repair (spec §4.1 "Connectivity").
//!
//! `make_connected` guarantees every buildable cell is 8-neighbour reachable
//! from every other, respecting terrain traversal rules. Isolated regions are
//! joined by digging through diggable obstacles (trees, bushes, walls,
//! resource nodes, and open water) along the cheapest path to the largest
//! component; buildings and the map border are never touched.

use std::collections::VecDeque;

use crate::state::store::EntityStore;
use crate::state::world::World;
use crate::types::{Position, TerrainKind};

#[derive(Clone, Copy, PartialEq, Eq)]
enum CellRole {
    /// Freely walkable; always part of some connectivity component.
    Passable,
    /// Blocked by a diggable obstacle (resource node, Wall, or open water) —
    /// carvable at unit cost.
    Diggable,
    /// A building, Door, or the map border; never carved through.
    Blocked,
}

fn classify(grid: &crate::state::grid::Grid, entities: &EntityStore, pos: Position) -> CellRole {
    if let Some(id) = grid.foreground_at(pos) {
        if let Some(thing) = entities.thing(id) {
            if thing.kind.is_diggable() {
                return CellRole::Diggable;
            }
            if thing.kind.is_building() || thing.kind.is_wall_or_door() {
                return CellRole::Blocked;
            }
        }
    }
    if grid.terrain_at(pos).map(TerrainKind::is_water).unwrap_or(false) {
        return CellRole::Diggable;
    }
    CellRole::Passable
}

fn cell_index(pos: Position, width: i32) -> usize {
    (pos.y * width + pos.x) as usize
}

fn cell_at(index: usize, width: i32) -> Position {
    Position::new((index as i32) % width, (index as i32) / width)
}

/// Labels every maximal connected region of `Passable` cells (8-neighbour).
fn label_components(grid: &crate::state::grid::Grid, entities: &EntityStore) -> Vec<Vec<Position>> {
    let (width, height) = (grid.width(), grid.height());
    let mut visited = vec![false; (width * height) as usize];
    let mut components = Vec::new();

    for y in 0..height {
        for x in 0..width {
            let start = Position::new(x, y);
            let start_idx = cell_index(start, width);
            if visited[start_idx] || classify(grid, entities, start) != CellRole::Passable {
                continue;
            }
            let mut stack = vec![start];
            visited[start_idx] = true;
            let mut component = Vec::new();
            while let Some(pos) = stack.pop() {
                component.push(pos);
                for neighbor in pos.neighbors8() {
                    if !neighbor.in_bounds(width, height) {
                        continue;
                    }
                    let idx = cell_index(neighbor, width);
                    if visited[idx] || classify(grid, entities, neighbor) != CellRole::Passable {
                        continue;
                    }
                    visited[idx] = true;
                    stack.push(neighbor);
                }
            }
            components.push(component);
        }
    }
    components
}

/// Cheapest-path (0 for Passable, 1 for Diggable, impassable for Blocked)
/// 0-1 BFS from every cell in `sources` to the nearest cell in `targets`.
/// Returns the full path (inclusive of both ends) on success.
fn cheapest_path(
    grid: &crate::state::grid::Grid,
    entities: &EntityStore,
    sources: &[Position],
    targets: &[Position],
) -> Option<Vec<Position>> {
    let (width, height) = (grid.width(), grid.height());
    let size = (width * height) as usize;
    let mut dist = vec![i32::MAX; size];
    let mut prev: Vec<Option<usize>> = vec![None; size];
    let mut finalized = vec![false; size];
    let target_set: std::collections::HashSet<Position> = targets.iter().copied().collect();

    let mut deque: VecDeque<usize> = VecDeque::new();
    for &s in sources {
        let idx = cell_index(s, width);
        dist[idx] = 0;
        deque.push_back(idx);
    }

    while let Some(u) = deque.pop_front() {
        if finalized[u] {
            continue;
        }
        finalized[u] = true;
        let pos = cell_at(u, width);
        if target_set.contains(&pos) {
            let mut path = vec![pos];
            let mut cur = u;
            while let Some(p) = prev[cur] {
                path.push(cell_at(p, width));
                cur = p;
            }
            path.reverse();
            return Some(path);
        }
        for neighbor in pos.neighbors8() {
            if !neighbor.in_bounds(width, height) {
                continue;
            }
            let role = classify(grid, entities, neighbor);
            if role == CellRole::Blocked {
                continue;
            }
            let cost = if role == CellRole::Diggable { 1 } else { 0 };
            let v = cell_index(neighbor, width);
            let next_dist = dist[u].saturating_add(cost);
            if next_dist < dist[v] {
                dist[v] = next_dist;
                prev[v] = Some(u);
                if cost == 0 {
                    deque.push_front(v);
                } else {
                    deque.push_back(v);
                }
            }
        }
    }
    None
}

/// Runs connectivity repair to a fixed point: while more than one passable
/// component remains, carves the cheapest path from the smallest component
/// to the largest, clearing any diggable obstacle along the way. Diggable
/// obstacles struck by the carve are despawned; water cells become `Empty`
/// (spec §4.1 "Terrain converted from water becomes Empty").
///
/// A bound on repair rounds guards against degenerate inputs (e.g. a
/// component fully sealed by map border) that would otherwise loop forever.
pub fn make_connected(world: &mut World) {
    let max_rounds = (world.grid.width() * world.grid.height()) as usize;
    for _ in 0..max_rounds {
        let mut components = label_components(&world.grid, &world.entities);
        if components.len() <= 1 {
            return;
        }
        components.sort_by_key(|c| c.len());
        let smallest = components.first().cloned().unwrap_or_default();
        let largest = components.last().cloned().unwrap_or_default();
        if smallest.is_empty() || largest.is_empty() {
            return;
        }

        let Some(path) = cheapest_path(&world.grid, &world.entities, &smallest, &largest) else {
            // No reachable path at all (e.g. every route blocked by a
            // building ring) — nothing more this pass can do.
            return;
        };

        for pos in path {
            if let Some(id) = world.grid.foreground_at(pos) {
                if world
                    .entities
                    .thing(id)
                    .map(|t| t.kind.is_diggable())
                    .unwrap_or(false)
                {
                    world.despawn(id);
                }
            }
            if world.grid.terrain_at(pos).map(TerrainKind::is_water).unwrap_or(false) {
                world.grid.set_terrain(pos, TerrainKind::Empty);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::thing::Thing;
    use crate::types::{TeamId, ThingKind};

    #[test]
    fn carves_through_a_tree_wall_separating_two_regions() {
        let mut world = World::new(1000, crate::victory::VictoryCondition::Regicide);
        // A vertical line of trees at x=5 splits the map into west/east halves.
        for y in 0..world.grid.height() {
            let pos = Position::new(5, y);
            let id = world.entities.allocate_id();
            let mut tree = Thing::new_static(id, ThingKind::Tree, pos, 1);
            tree.inventory.set(crate::types::ItemKind::Wood, 10);
            world.spawn(tree);
        }

        make_connected(&mut world);

        let components = label_components(&world.grid, &world.entities);
        assert_eq!(components.len(), 1);
    }

    #[test]
    fn never_carves_through_a_building() {
        let mut world = World::new(1000, crate::victory::VictoryCondition::Regicide);
        for y in 0..world.grid.height() {
            let pos = Position::new(5, y);
            let id = world.entities.allocate_id();
            let wall = Thing::new_building(id, ThingKind::TownCenter, TeamId::NEUTRAL, pos, 600);
            world.spawn(wall);
        }

        make_connected(&mut world);

        // A solid line of buildings is never touched; the two halves stay
        // disconnected rather than carving through them.
        let components = label_components(&world.grid, &world.entities);
        assert!(components.len() >= 2);
    }

    #[test]
    fn already_connected_map_is_left_untouched() {
        let mut world = World::new(1000, crate::victory::VictoryCondition::Regicide);
        make_connected(&mut world);
        let components = label_components(&world.grid, &world.entities);
        assert_eq!(components.len(), 1);
    }
}
