use crate::grid::{Cell, Grid};
use crate::heading::Heading;
use crate::LightId;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// The number of steps a light stays green once triggered.
pub const GREEN_DURATION: u32 = 4;

/// The number of nearby cars which turns a light green.
const TRIGGER_CARS: usize = 2;

/// How far, in cells, a light looks for approaching cars.
const SCAN_RADIUS: i32 = 4;

/// The state of a traffic light.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LightState {
    Red,
    Green,
}

/// The axis a traffic light controls, used when the adjacent roads disagree on a heading.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    /// Left and right.
    X,
    /// Up and down.
    Y,
}

/// A demand-actuated traffic light, sitting on top of a road.
///
/// The light turns green when enough cars are queued on the roads around it,
/// then turns red again after [`GREEN_DURATION`] steps.
#[derive(Clone, Debug)]
pub struct TrafficLight {
    /// The light's ID.
    pub(crate) id: LightId,
    /// The cell the light is in.
    cell: Cell,
    /// The current state.
    state: LightState,
    /// The axis the light controls.
    axis: Axis,
    /// The heading of the traffic the light controls, once known.
    heading: Option<Heading>,
    /// The number of steps left before a green light turns red.
    green_duration: u32,
}

impl TrafficLight {
    /// Creates a new traffic light.
    /// Lights which start green control the X axis, and red ones the Y axis.
    pub(crate) fn new(id: LightId, cell: Cell, green: bool) -> Self {
        let (state, axis, green_duration) = if green {
            (LightState::Green, Axis::X, GREEN_DURATION)
        } else {
            (LightState::Red, Axis::Y, 0)
        };
        Self {
            id,
            cell,
            state,
            axis,
            heading: None,
            green_duration,
        }
    }

    /// Gets the light's ID.
    pub fn id(&self) -> LightId {
        self.id
    }

    /// The cell the light is in.
    pub fn cell(&self) -> Cell {
        self.cell
    }

    /// The current state.
    pub fn state(&self) -> LightState {
        self.state
    }

    /// The axis the light controls.
    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// The heading of the traffic the light controls, if it has been worked out yet.
    pub fn heading(&self) -> Option<Heading> {
        self.heading
    }

    /// The number of steps left before a green light turns red.
    pub fn green_duration(&self) -> u32 {
        self.green_duration
    }

    /// Advances the light by one step.
    pub(crate) fn step(&mut self, grid: &mut Grid) {
        if self.heading.is_none() {
            self.infer_heading(grid);
        }

        if self.count_cars(grid) >= TRIGGER_CARS {
            self.state = LightState::Green;
            self.green_duration = GREEN_DURATION;
        }

        if self.state == LightState::Green && self.green_duration > 0 {
            self.green_duration -= 1;
            if self.green_duration == 0 {
                self.state = LightState::Red;
            }
        }
    }

    /// Works out the light's heading from the roads next to it, and turns
    /// the road underneath to match.
    fn infer_heading(&mut self, grid: &mut Grid) {
        if grid.road(self.cell).is_none() {
            return;
        }

        let adjacent = grid
            .neighborhood(self.cell, false, false, 1)
            .into_iter()
            .filter(|cell| grid.light(*cell).is_none())
            .filter_map(|cell| grid.road(cell))
            .collect::<Vec<_>>();
        if adjacent.is_empty() {
            log::debug!("traffic light at {:?} has no adjacent roads", self.cell);
            return;
        }

        let heading = if adjacent.iter().all_equal() {
            Some(adjacent[0])
        } else {
            adjacent.iter().copied().find(|h| match self.axis {
                Axis::X => matches!(h, Heading::Left | Heading::Right),
                Axis::Y => matches!(h, Heading::Up | Heading::Down),
            })
        };

        if let Some(heading) = heading {
            self.heading = Some(heading);
            grid.set_road_heading(self.cell, heading);
        }
    }

    /// Whether traffic on a road with the given heading is watched by the light.
    pub fn is_compatible(&self, road: Heading) -> bool {
        use Heading::*;
        match self.heading {
            Some(Left | Right) => matches!(road, Left | Right | Horizontal),
            Some(Up | Down) => matches!(road, Up | Down | Vertical),
            Some(Horizontal) => matches!(road, Left | Right),
            Some(Vertical) => matches!(road, Up | Down),
            Some(Any) | None => true,
        }
    }

    /// Counts the cars on compatible roads around the light.
    fn count_cars(&self, grid: &Grid) -> usize {
        grid.neighborhood(self.cell, false, false, SCAN_RADIUS)
            .into_iter()
            .filter(|cell| grid.road(*cell).map_or(false, |road| self.is_compatible(road)))
            .map(|cell| grid.cars(cell).count())
            .sum()
    }
}
