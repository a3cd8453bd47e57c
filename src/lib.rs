pub mod animal;
pub mod cell;
pub mod engine;
pub mod error;
pub mod island;
pub mod landscape;
pub mod params;
pub mod rng;
pub mod scenario;
pub mod snapshot;

pub use animal::{Animal, Species};
pub use engine::{Engine, EngineBuilder, EngineSettings};
pub use error::{Result, SimError};
pub use island::{Coord, Island, Placement};
pub use landscape::Landscape;
pub use params::{LandscapeOverrides, Parameters, SpeciesOverrides, SpeciesParams};
pub use scenario::{Scenario, ScenarioLoader};
pub use snapshot::{CellSnapshot, IslandSnapshot, SpeciesCounts};
