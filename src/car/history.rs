use crate::grid::Cell;
use arrayvec::ArrayVec;
use itertools::Itertools;

/// The longest history any car keeps.
const MAX_LENGTH: usize = 7;

/// The shortest history any car keeps.
const MIN_LENGTH: usize = 4;

/// The most recent cells a car has occupied, used to tell when it is stuck.
#[derive(Clone, Debug)]
pub(crate) struct PositionHistory {
    /// The number of entries kept.
    capacity: usize,
    /// The recorded cells, oldest first.
    cells: ArrayVec<Cell, MAX_LENGTH>,
    /// Whether every entry of a full history is the same cell.
    stuck: bool,
}

impl PositionHistory {
    /// Creates an empty history sized for a car with the given greediness.
    /// Greedier cars keep a shorter history, and so give up on waiting sooner.
    pub fn new(greediness: f64) -> Self {
        Self {
            capacity: history_length(greediness),
            cells: ArrayVec::new(),
            stuck: false,
        }
    }

    /// The number of entries kept.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Records the car's current cell and re-evaluates whether it is stuck.
    pub fn record(&mut self, cell: Cell) {
        if self.cells.len() == self.capacity {
            self.cells.remove(0);
        }
        self.cells.push(cell);
        self.stuck = self.cells.len() == self.capacity && self.cells.iter().all_equal();
    }

    /// Whether the car hasn't moved for a whole history.
    pub fn is_stuck(&self) -> bool {
        self.stuck
    }
}

/// Computes `round(7 - 4 * greediness)`, rounding ties to even and staying within 4 to 7.
fn history_length(greediness: f64) -> usize {
    let len = (MAX_LENGTH as f64 - 4.0 * greediness).round_ties_even();
    (len.max(0.0) as usize).clamp(MIN_LENGTH, MAX_LENGTH)
}
