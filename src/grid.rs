use crate::heading::Heading;
use crate::{CarId, DestinationId, LightId};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// A cell on the simulation grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    /// Creates a new cell.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Whether moving from this cell to `other` changes both coordinates.
    pub fn is_diagonal_to(&self, other: Cell) -> bool {
        (self.x - other.x).abs() == 1 && (self.y - other.y).abs() == 1
    }

    /// The Euclidean distance between two cells.
    pub fn distance(&self, other: Cell) -> f64 {
        let dx = f64::from(self.x - other.x);
        let dy = f64::from(self.y - other.y);
        dx.hypot(dy)
    }
}

impl From<(i32, i32)> for Cell {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// Something that occupies a grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Occupant {
    /// A road, and the direction traffic may leave it in.
    Road(Heading),
    Light(LightId),
    Obstacle,
    Destination(DestinationId),
    Car(CarId),
}

/// The contents of a single cell. Most cells hold a road and at most one car or light.
type Contents = SmallVec<[Occupant; 3]>;

/// A bounded, non-wrapping grid where any number of occupants may share a cell.
#[derive(Clone, Debug)]
pub struct Grid {
    width: i32,
    height: i32,
    cells: Vec<Contents>,
}

impl Grid {
    /// Creates an empty grid.
    pub fn new(width: i32, height: i32) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        Self {
            width,
            height,
            cells: vec![Contents::new(); (width * height) as usize],
        }
    }

    /// The number of columns.
    pub fn width(&self) -> i32 {
        self.width
    }

    /// The number of rows.
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Whether the cell lies within the grid.
    pub fn contains(&self, cell: Cell) -> bool {
        (0..self.width).contains(&cell.x) && (0..self.height).contains(&cell.y)
    }

    /// Iterates over every cell, row by row from `y = 0`.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        itertools::iproduct!(0..self.height, 0..self.width).map(|(y, x)| Cell::new(x, y))
    }

    fn index(&self, cell: Cell) -> Option<usize> {
        self.contains(cell)
            .then(|| (cell.y * self.width + cell.x) as usize)
    }

    /// Gets everything in a cell, in the order it was placed.
    /// Cells outside the grid are empty.
    pub fn contents(&self, cell: Cell) -> &[Occupant] {
        match self.index(cell) {
            Some(idx) => &self.cells[idx],
            None => &[],
        }
    }

    /// The heading of the road in a cell, if there is one.
    pub fn road(&self, cell: Cell) -> Option<Heading> {
        self.contents(cell).iter().find_map(|occ| match occ {
            Occupant::Road(heading) => Some(*heading),
            _ => None,
        })
    }

    /// The traffic light in a cell, if there is one.
    pub fn light(&self, cell: Cell) -> Option<LightId> {
        self.contents(cell).iter().find_map(|occ| match occ {
            Occupant::Light(id) => Some(*id),
            _ => None,
        })
    }

    /// The destination in a cell, if there is one.
    pub fn destination(&self, cell: Cell) -> Option<DestinationId> {
        self.contents(cell).iter().find_map(|occ| match occ {
            Occupant::Destination(id) => Some(*id),
            _ => None,
        })
    }

    /// Whether the cell holds an obstacle.
    pub fn has_obstacle(&self, cell: Cell) -> bool {
        self.contents(cell).contains(&Occupant::Obstacle)
    }

    /// Iterates over the cars in a cell.
    pub fn cars(&self, cell: Cell) -> impl Iterator<Item = CarId> + '_ {
        self.contents(cell).iter().filter_map(|occ| match occ {
            Occupant::Car(id) => Some(*id),
            _ => None,
        })
    }

    /// Whether any car occupies the cell.
    pub fn has_car(&self, cell: Cell) -> bool {
        self.cars(cell).next().is_some()
    }

    /// Whether a car other than `car` occupies the cell.
    pub fn has_other_car(&self, cell: Cell, car: CarId) -> bool {
        self.cars(cell).any(|id| id != car)
    }

    /// Gets the cells around `cell`.
    ///
    /// # Parameters
    /// * `moore` - Use the Moore (Chebyshev) neighbourhood rather than Von Neumann (Manhattan)
    /// * `include_center` - Whether `cell` itself is included
    /// * `radius` - How far the neighbourhood extends
    ///
    /// Cells are yielded row by row, starting from the lowest `y`, and never wrap around the edges.
    pub fn neighborhood(
        &self,
        cell: Cell,
        moore: bool,
        include_center: bool,
        radius: i32,
    ) -> Vec<Cell> {
        itertools::iproduct!(-radius..=radius, -radius..=radius)
            .filter(|&(dy, dx)| include_center || (dx, dy) != (0, 0))
            .filter(|&(dy, dx)| moore || dx.abs() + dy.abs() <= radius)
            .map(|(dy, dx)| Cell::new(cell.x + dx, cell.y + dy))
            .filter(|cell| self.contains(*cell))
            .collect()
    }

    /// Adds an occupant to a cell. Returns `false` if the cell is off the grid.
    pub fn place(&mut self, occupant: Occupant, cell: Cell) -> bool {
        match self.index(cell) {
            Some(idx) => {
                self.cells[idx].push(occupant);
                true
            }
            None => false,
        }
    }

    /// Removes an occupant from a cell. Returns `false` if it wasn't there.
    pub fn remove(&mut self, occupant: Occupant, cell: Cell) -> bool {
        let Some(idx) = self.index(cell) else {
            return false;
        };
        let contents = &mut self.cells[idx];
        match contents.iter().position(|occ| *occ == occupant) {
            Some(pos) => {
                contents.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Moves a car between cells.
    pub fn move_car(&mut self, car: CarId, from: Cell, to: Cell) -> bool {
        if !self.contains(to) || !self.remove(Occupant::Car(car), from) {
            return false;
        }
        self.place(Occupant::Car(car), to)
    }

    /// Overwrites the heading of the road in a cell.
    pub fn set_road_heading(&mut self, cell: Cell, heading: Heading) {
        if let Some(idx) = self.index(cell) {
            for occ in self.cells[idx].iter_mut() {
                if let Occupant::Road(h) = occ {
                    *h = heading;
                }
            }
        }
    }
}
