//! A serializable view of every agent in a simulation, for clients drawing the city.

use crate::grid::{Cell, Occupant};
use crate::heading::Heading;
use crate::light::{Axis, LightState};
use crate::simulation::Simulation;
use crate::Key;
use serde::Serialize;

/// The positions and states of everything in a simulation at one frame.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Snapshot {
    pub frame: usize,
    pub cars: Vec<AgentPos>,
    pub obstacles: Vec<Cell>,
    pub lights: Vec<LightPos>,
    pub roads: Vec<RoadPos>,
    pub destinations: Vec<AgentPos>,
}

/// An agent and the cell it is in.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct AgentPos {
    pub id: u64,
    #[serde(flatten)]
    pub cell: Cell,
}

/// A traffic light and its current state.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct LightPos {
    pub id: u64,
    #[serde(flatten)]
    pub cell: Cell,
    pub state: LightState,
    pub axis: Axis,
    pub heading: Option<Heading>,
}

/// A road and its heading.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct RoadPos {
    #[serde(flatten)]
    pub cell: Cell,
    pub heading: Heading,
}

impl Simulation {
    /// Takes a snapshot of every agent, in grid order.
    pub fn snapshot(&self) -> Snapshot {
        let mut snapshot = Snapshot {
            frame: self.frame(),
            ..Default::default()
        };
        let grid = self.grid();
        for cell in grid.cells() {
            for occupant in grid.contents(cell) {
                match *occupant {
                    Occupant::Road(heading) => snapshot.roads.push(RoadPos { cell, heading }),
                    Occupant::Obstacle => snapshot.obstacles.push(cell),
                    Occupant::Car(id) => snapshot.cars.push(AgentPos {
                        id: id.data().as_ffi(),
                        cell,
                    }),
                    Occupant::Destination(id) => snapshot.destinations.push(AgentPos {
                        id: id.data().as_ffi(),
                        cell,
                    }),
                    Occupant::Light(id) => {
                        if let Some(light) = self.get_light(id) {
                            snapshot.lights.push(LightPos {
                                id: id.data().as_ffi(),
                                cell,
                                state: light.state(),
                                axis: light.axis(),
                                heading: light.heading(),
                            });
                        }
                    }
                }
            }
        }
        snapshot
    }
}
