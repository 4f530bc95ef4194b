use self::history::PositionHistory;
use self::pathfinding::{find_path, route_legal};
use crate::grid::{Cell, Grid};
use crate::heading::validate_transition;
use crate::light::LightState;
use crate::simulation::Stats;
use crate::{CarId, DestinationId, DestinationSet, LightSet};
use std::collections::VecDeque;

mod history;
pub mod pathfinding;

/// A simulated car, travelling cell by cell towards its destination.
#[derive(Clone, Debug)]
pub struct Car {
    /// The car's ID.
    pub(crate) id: CarId,
    /// The cell the car is in.
    cell: Cell,
    /// The destination the car is heading for.
    destination: DestinationId,
    /// The cells still to be travelled, not including the current one.
    /// Empty when the car needs a new plan.
    path: VecDeque<Cell>,
    /// How eager the car is to reroute rather than wait, in `[0, 1)`.
    greediness: f64,
    /// The cells the car has recently been in.
    history: PositionHistory,
}

/// The attributes of a simulated car.
#[derive(Clone, Copy, Debug)]
pub struct CarAttributes {
    /// The destination the car should travel to.
    pub destination: DestinationId,
    /// How eager the car is to reroute rather than wait, in `[0, 1)`.
    pub greediness: f64,
}

/// What a car did during a simulation step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CarStep {
    /// The car is on its own destination and should be removed.
    Arrived,
    /// The car found itself on someone else's destination and replanned.
    Misrouted,
    /// The car had no path and tried to plan one.
    Planned,
    /// The next cell is behind a red light.
    RedLight,
    /// The car was stuck, and the new route it found couldn't be taken this step.
    Stuck,
    /// The car was stuck and moved onto a new route.
    Unstuck,
    /// Another car is in the next cell.
    Waiting,
    /// The next move went against the road, so the car replanned.
    Rerouted,
    /// The car moved to the next cell on its path.
    Moved,
}

/// Inputs into the [`Car::step`] method.
pub(crate) struct StepContext<'a> {
    /// The grid the car is on.
    pub grid: &'a mut Grid,
    /// The traffic lights on the grid.
    pub lights: &'a LightSet,
    /// The cells of every destination.
    pub destinations: &'a DestinationSet,
    /// Counters updated as the car acts.
    pub stats: &'a mut Stats,
}

impl Car {
    /// Creates a new car.
    pub(crate) fn new(id: CarId, cell: Cell, attributes: &CarAttributes) -> Self {
        Self {
            id,
            cell,
            destination: attributes.destination,
            path: VecDeque::new(),
            greediness: attributes.greediness,
            history: PositionHistory::new(attributes.greediness),
        }
    }

    /// Gets the car's ID.
    pub fn id(&self) -> CarId {
        self.id
    }

    /// The cell the car is in.
    pub fn cell(&self) -> Cell {
        self.cell
    }

    /// The destination the car is heading for.
    pub fn destination(&self) -> DestinationId {
        self.destination
    }

    /// The cells the car plans to travel through, starting with the next one.
    pub fn path(&self) -> impl Iterator<Item = Cell> + '_ {
        self.path.iter().copied()
    }

    /// How eager the car is to reroute rather than wait.
    pub fn greediness(&self) -> f64 {
        self.greediness
    }

    /// The number of consecutive steps in one place after which the car considers itself stuck.
    pub fn patience(&self) -> usize {
        self.history.capacity()
    }

    /// Whether the car hasn't moved for a whole history window.
    pub fn is_stuck(&self) -> bool {
        self.history.is_stuck()
    }

    /// Decides what the car does this step, and does it.
    ///
    /// The rules are checked in priority order, and the first which applies ends the step:
    /// arriving, red lights, getting unstuck, waiting for traffic, and following the road.
    pub(crate) fn step(&mut self, ctx: &mut StepContext) -> CarStep {
        self.history.record(self.cell);

        if let Some(dst) = ctx.grid.destination(self.cell) {
            if dst == self.destination {
                return CarStep::Arrived;
            }
            log::debug!("car {:?} is on a destination that isn't its own", self.id);
            let cell = self.cell;
            self.path.clear();
            self.plan(ctx, &[cell]);
            return CarStep::Misrouted;
        }

        let Some(next) = self.path.front().copied() else {
            self.plan(ctx, &[]);
            return CarStep::Planned;
        };

        let red_light = ctx
            .grid
            .light(next)
            .and_then(|id| ctx.lights.get(id))
            .map_or(false, |light| light.state() == LightState::Red);
        if red_light {
            return CarStep::RedLight;
        }

        if self.history.is_stuck() {
            log::debug!("car {:?} is stuck at {:?}, avoiding {:?}", self.id, self.cell, next);
            self.path.clear();
            self.plan(ctx, &[next]);
            let Some(next) = self.path.front().copied() else {
                return CarStep::Stuck;
            };
            if !road_permits(ctx.grid, self.cell, next) {
                self.path.clear();
                self.plan(ctx, &[next]);
                return CarStep::Stuck;
            }
            self.advance(ctx);
            return CarStep::Unstuck;
        }

        if ctx.grid.has_other_car(next, self.id) {
            return CarStep::Waiting;
        }

        // Lights may have turned the road since the path was planned
        if !road_permits(ctx.grid, self.cell, next) {
            self.path.clear();
            self.plan(ctx, &[next]);
            return CarStep::Rerouted;
        }

        self.advance(ctx);
        CarStep::Moved
    }

    /// Finds a new path to the car's destination, penalising the `blocked` cells.
    /// If none is found the current path is kept. Returns `true` iff a path was found.
    fn plan(&mut self, ctx: &mut StepContext, blocked: &[Cell]) -> bool {
        ctx.stats.replans += 1;

        let destination = self.destination;
        let Some(goal) = ctx.destinations.get(destination).copied() else {
            log::debug!("car {:?} has no destination to head for", self.id);
            ctx.stats.failed_paths += 1;
            return false;
        };

        let grid = &*ctx.grid;
        let legal = |from, to| route_legal(grid, destination, from, to);
        match find_path(grid, self.cell, goal, legal, blocked) {
            Some((path, _)) if !path.is_empty() => {
                self.path = path.into();
                true
            }
            _ => {
                log::debug!(
                    "car {:?} could not find a path to {:?}, keeping current path",
                    self.id,
                    goal
                );
                ctx.stats.failed_paths += 1;
                false
            }
        }
    }

    /// Moves the car onto the first cell of its path.
    fn advance(&mut self, ctx: &mut StepContext) {
        if let Some(next) = self.path.pop_front() {
            if ctx.grid.move_car(self.id, self.cell, next) {
                self.cell = next;
            }
        }
    }
}

/// Checks a move against the heading of the road being entered, if any.
fn road_permits(grid: &Grid, from: Cell, to: Cell) -> bool {
    grid.road(to)
        .map_or(true, |road| validate_transition(Some(road), Some(road), from, to))
}
