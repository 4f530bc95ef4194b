pub use car::pathfinding::{find_path, successors};
pub use car::{Car, CarAttributes, CarStep};
pub use config::SimConfig;
pub use debug::render_ascii;
pub use error::{Error, Result};
pub use grid::{Cell, Grid, Occupant};
pub use heading::{validate_transition, Heading};
pub use light::{Axis, LightState, TrafficLight};
pub use map::{CityMap, MapDictionary, Tile};
pub use simulation::{Simulation, Stats};
pub use slotmap::{Key, KeyData};
pub use snapshot::{AgentPos, LightPos, RoadPos, Snapshot};
use slotmap::{new_key_type, SlotMap};

mod car;
mod config;
mod debug;
mod error;
mod grid;
mod heading;
mod light;
mod map;
mod simulation;
mod snapshot;

new_key_type! {
    /// Unique ID of a [Car].
    pub struct CarId;
    /// Unique ID of a [TrafficLight].
    pub struct LightId;
    /// Unique ID of a destination.
    pub struct DestinationId;
}

type CarSet = SlotMap<CarId, Car>;
type LightSet = SlotMap<LightId, TrafficLight>;
type DestinationSet = SlotMap<DestinationId, Cell>;
