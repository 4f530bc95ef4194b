use crate::grid::{Cell, Grid};
use crate::heading::validate_transition;
use crate::DestinationId;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

/// The extra cost of entering a blocked cell.
/// Large enough to route around the cell, while still allowing it as a last resort.
pub const BLOCKED_PENALTY: f64 = 1000.0;

/// The cost of a diagonal step on top of a straight one.
const DIAGONAL_EXTRA: f64 = std::f64::consts::SQRT_2 - 1.0;

/// Gets the cells a car may consider moving to from `cell`.
///
/// On a road, only the cells agreeing with the road's heading are offered;
/// elsewhere the whole Moore neighbourhood is.
pub fn successors(grid: &Grid, cell: Cell) -> impl Iterator<Item = Cell> {
    let heading = grid.road(cell);
    grid.neighborhood(cell, true, false, 1)
        .into_iter()
        .filter(move |next| heading.map_or(true, |h| h.allows(cell, *next)))
}

/// Finds the cheapest path from `start` to `goal` using A*.
///
/// # Parameters
/// * `is_legal` - Whether a car may move between two adjacent cells; illegal moves are never expanded
/// * `blocked` - Cells which incur [`BLOCKED_PENALTY`] when entered
///
/// Returns the cells after `start` up to and including `goal`, along with the total cost,
/// or `None` if the goal can't be reached.
pub fn find_path(
    grid: &Grid,
    start: Cell,
    goal: Cell,
    is_legal: impl Fn(Cell, Cell) -> bool,
    blocked: &[Cell],
) -> Option<(Vec<Cell>, f64)> {
    let mut frontier = BinaryHeap::new();
    let mut came_from = HashMap::new();
    let mut cost_so_far = HashMap::new();
    let mut seq = 0;

    frontier.push(FrontierEntry {
        priority: 0.0,
        seq,
        cell: start,
    });
    cost_so_far.insert(start, 0.0);

    let mut current = start;
    while let Some(entry) = frontier.pop() {
        current = entry.cell;
        if current == goal {
            break;
        }

        let cost = cost_so_far[&current];
        for next in successors(grid, current) {
            if !is_legal(current, next) {
                continue;
            }

            let mut new_cost = cost + 1.0;
            if current.is_diagonal_to(next) {
                new_cost += DIAGONAL_EXTRA;
            }
            if blocked.contains(&next) {
                new_cost += BLOCKED_PENALTY;
            }

            if cost_so_far.get(&next).map_or(true, |c| new_cost < *c) {
                cost_so_far.insert(next, new_cost);
                came_from.insert(next, current);
                seq += 1;
                frontier.push(FrontierEntry {
                    priority: new_cost + next.distance(goal),
                    seq,
                    cell: next,
                });
            }
        }
    }

    if current != goal {
        log::debug!("no path from {:?} to {:?}, search ended at {:?}", start, goal, current);
        return None;
    }

    let total = cost_so_far[&goal];
    let mut path = vec![];
    while current != start {
        path.push(current);
        current = came_from[&current];
    }
    path.reverse();
    Some((path, total))
}

/// Checks whether a car bound for `destination` may move between two adjacent cells.
///
/// Obstacles and other cars' destinations can't be entered, and the move must
/// agree with the roads it leaves and enters.
pub(crate) fn route_legal(grid: &Grid, destination: DestinationId, from: Cell, to: Cell) -> bool {
    if grid.has_obstacle(to) {
        return false;
    }
    if grid.destination(to).map_or(false, |id| id != destination) {
        return false;
    }
    match grid.road(from) {
        Some(road) => validate_transition(Some(road), grid.road(to), from, to),
        None => true,
    }
}

/// An entry in the A* frontier.
/// The heap pops the lowest priority first, and the earliest inserted among equals.
struct FrontierEntry {
    priority: f64,
    seq: usize,
    cell: Cell,
}

impl PartialEq for FrontierEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FrontierEntry {}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .priority
            .total_cmp(&self.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}
