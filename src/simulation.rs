use crate::car::pathfinding::{route_legal, successors};
use crate::car::{Car, CarAttributes, CarStep, StepContext};
use crate::config::SimConfig;
use crate::grid::{Cell, Grid, Occupant};
use crate::heading::Heading;
use crate::light::TrafficLight;
use crate::{CarId, CarSet, DestinationId, DestinationSet, LightId, LightSet};
use itertools::Itertools;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;

/// Counters describing what has happened over a simulation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    /// Cars added by the spawner.
    pub spawned: usize,
    /// Cars which reached their destination.
    pub completed_trips: usize,
    /// Path searches which found no path.
    pub failed_paths: usize,
    /// Path searches of any outcome.
    pub replans: usize,
    /// Times a car gave up waiting and rerouted.
    pub stuck_events: usize,
    /// Single-cell moves made by cars.
    pub moves: usize,
    /// Times a car waited for another car to move out of the way.
    pub waits: usize,
    /// Times a car stopped at a red light.
    pub red_lights: usize,
    /// Times a car abandoned its path because a road turned against it,
    /// or because it found itself on someone else's destination.
    pub reroutes: usize,
}

impl Stats {
    /// Counts what a car did during a step.
    fn record(&mut self, step: CarStep) {
        match step {
            CarStep::Arrived => self.completed_trips += 1,
            CarStep::Misrouted | CarStep::Rerouted => self.reroutes += 1,
            CarStep::Planned => {}
            CarStep::RedLight => self.red_lights += 1,
            CarStep::Stuck => self.stuck_events += 1,
            CarStep::Unstuck => {
                self.stuck_events += 1;
                self.moves += 1;
            }
            CarStep::Waiting => self.waits += 1,
            CarStep::Moved => self.moves += 1,
        }
    }
}

/// A traffic simulation on a grid.
pub struct Simulation {
    /// The grid everything is placed on.
    grid: Grid,
    /// The cars being simulated.
    cars: CarSet,
    /// The traffic lights.
    lights: LightSet,
    /// The cell of each destination.
    destinations: DestinationSet,
    /// The cells new cars are spawned at.
    spawn_points: Vec<Cell>,
    /// New cars are spawned every `cycle` steps.
    cycle: usize,
    /// The number of steps simulated so far.
    frame: usize,
    /// Counters for the simulation so far.
    stats: Stats,
    /// Chooses destinations, greediness and the order cars move in.
    rng: StdRng,
}

impl Simulation {
    /// Creates an empty simulation on a grid of the given size, with no spawn points.
    pub fn new(width: i32, height: i32, config: &SimConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            grid: Grid::new(width, height),
            cars: CarSet::with_key(),
            lights: LightSet::with_key(),
            destinations: DestinationSet::with_key(),
            spawn_points: vec![],
            cycle: config.cycle.max(1),
            frame: 0,
            stats: Stats::default(),
            rng,
        }
    }

    /// Adds a road. Returns `false` if the cell is off the grid.
    pub fn add_road(&mut self, cell: Cell, heading: Heading) -> bool {
        self.grid.place(Occupant::Road(heading), cell)
    }

    /// Adds an obstacle. Returns `false` if the cell is off the grid.
    pub fn add_obstacle(&mut self, cell: Cell) -> bool {
        self.grid.place(Occupant::Obstacle, cell)
    }

    /// Adds a destination cars can be sent to.
    pub fn add_destination(&mut self, cell: Cell) -> Option<DestinationId> {
        if !self.grid.contains(cell) {
            return None;
        }
        let id = self.destinations.insert(cell);
        self.grid.place(Occupant::Destination(id), cell);
        Some(id)
    }

    /// Adds a traffic light. It should share its cell with a road, whose heading
    /// the light will overwrite once it has worked out which way traffic flows.
    pub fn add_light(&mut self, cell: Cell, green: bool) -> Option<LightId> {
        if !self.grid.contains(cell) {
            return None;
        }
        let id = self
            .lights
            .insert_with_key(|id| TrafficLight::new(id, cell, green));
        self.grid.place(Occupant::Light(id), cell);
        Some(id)
    }

    /// Adds a car to the simulation.
    pub fn add_car(&mut self, attributes: &CarAttributes, cell: Cell) -> Option<CarId> {
        if !self.grid.contains(cell) {
            return None;
        }
        let id = self
            .cars
            .insert_with_key(|id| Car::new(id, cell, attributes));
        self.grid.place(Occupant::Car(id), cell);
        Some(id)
    }

    /// Removes a car from the simulation.
    pub fn remove_car(&mut self, id: CarId) {
        if let Some(car) = self.cars.remove(id) {
            self.grid.remove(Occupant::Car(id), car.cell());
        }
    }

    /// Sets the cells new cars are spawned at.
    pub fn set_spawn_points(&mut self, cells: Vec<Cell>) {
        self.spawn_points = cells;
    }

    /// The cells new cars are spawned at.
    pub fn spawn_points(&self) -> &[Cell] {
        &self.spawn_points
    }

    /// Sets how many steps pass between car spawns.
    pub fn set_cycle(&mut self, cycle: usize) {
        self.cycle = cycle.max(1);
    }

    /// How many steps pass between car spawns.
    pub fn cycle(&self) -> usize {
        self.cycle
    }

    /// Advances the simulation by one step, moving the cars in a random order.
    pub fn step(&mut self) {
        self.begin_step();
        let mut order = self.cars.keys().collect::<Vec<_>>();
        order.shuffle(&mut self.rng);
        self.step_cars(order);
        self.frame += 1;
    }

    /// Advances the simulation by one step, moving the given cars in the given order.
    ///
    /// Cars missing from `order`, including any spawned this step, stay put.
    /// Each car moves at most once.
    pub fn step_ordered(&mut self, order: &[CarId]) {
        self.begin_step();
        self.step_cars(order.iter().copied());
        self.frame += 1;
    }

    /// Gets the current simulation frame index.
    pub fn frame(&self) -> usize {
        self.frame
    }

    /// Counters for the simulation so far.
    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    /// The number of cars which have reached their destination.
    pub fn completed_trips(&self) -> usize {
        self.stats.completed_trips
    }

    /// The number of cars still travelling.
    pub fn active_cars(&self) -> usize {
        self.cars.len()
    }

    /// Gets a reference to the grid.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Returns an iterator over all the cars in the simulation.
    pub fn iter_cars(&self) -> impl Iterator<Item = &Car> {
        self.cars.values()
    }

    /// Returns an iterator over all the traffic lights in the simulation.
    pub fn iter_lights(&self) -> impl Iterator<Item = &TrafficLight> {
        self.lights.values()
    }

    /// Returns an iterator over all the destinations and their cells.
    pub fn iter_destinations(&self) -> impl Iterator<Item = (DestinationId, Cell)> + '_ {
        self.destinations.iter().map(|(id, cell)| (id, *cell))
    }

    /// Gets the car with the given ID, if it is still travelling.
    pub fn get_car(&self, id: CarId) -> Option<&Car> {
        self.cars.get(id)
    }

    /// Gets the traffic light with the given ID.
    pub fn get_light(&self, id: LightId) -> Option<&TrafficLight> {
        self.lights.get(id)
    }

    /// Lists the destinations which can't be reached from any spawn point.
    pub fn unreachable_destinations(&self) -> Vec<DestinationId> {
        self.destinations
            .iter()
            .filter(|(id, goal)| {
                !self.spawn_points.iter().any(|start| {
                    let legal_moves = |cell: &Cell| {
                        let cell = *cell;
                        successors(&self.grid, cell)
                            .filter(move |next| route_legal(&self.grid, *id, cell, *next))
                    };
                    pathfinding::directed::bfs::bfs(start, legal_moves, |cell| cell == *goal)
                        .is_some()
                })
            })
            .map(|(id, _)| id)
            .collect()
    }

    /// Spawns new cars and updates the traffic lights.
    fn begin_step(&mut self) {
        self.spawn_cars();
        for light in self.lights.values_mut() {
            light.step(&mut self.grid);
        }
    }

    /// Puts a car bound for a random destination on each free spawn point,
    /// once every `cycle` steps.
    fn spawn_cars(&mut self) {
        if self.frame % self.cycle != 0 {
            return;
        }

        let destinations = self.destinations.keys().collect::<Vec<_>>();
        for cell in self.spawn_points.clone() {
            let Some(&destination) = destinations.choose(&mut self.rng) else {
                continue;
            };
            if self.grid.has_car(cell) {
                log::trace!("spawn point {:?} is already occupied", cell);
                continue;
            }
            let attributes = CarAttributes {
                destination,
                greediness: self.rng.gen(),
            };
            if self.add_car(&attributes, cell).is_some() {
                self.stats.spawned += 1;
            }
        }
    }

    /// Moves each car once, in the given order.
    fn step_cars(&mut self, order: impl IntoIterator<Item = CarId>) {
        for car_id in order.into_iter().unique() {
            let Some(car) = self.cars.get_mut(car_id) else {
                continue;
            };
            let mut ctx = StepContext {
                grid: &mut self.grid,
                lights: &self.lights,
                destinations: &self.destinations,
                stats: &mut self.stats,
            };
            let step = car.step(&mut ctx);
            log::trace!("car {:?}: {:?}", car_id, step);
            self.stats.record(step);
            if step == CarStep::Arrived {
                log::info!("car {:?} arrived at its destination", car_id);
                self.remove_car(car_id);
            }
        }
    }
}
