//! Simulation engine and population management.
//!
//! - `Population`: one deme and its per-generation update rule.
//! - `DemographicEventScheduler`: size changes and migration flows applied
//!   at scheduled generations.
//! - `OneLocusTwoAlleleSimulation`: builds everything from a
//!   `SimulationConfig`, runs the generation loop and collects the results.
//! - `SimulationBuilder`: fluent builder producing the same configuration.

pub mod builder;
pub mod configs;
pub mod engine;
pub mod events;
pub mod population;

pub use builder::SimulationBuilder;
pub use configs::{InitialGenotypicFreqs, PopulationConfig, SimulationConfig, DEFAULT_FREQ_A};
pub use engine::{
    run_replicates, simulate_forward_in_time, OneLocusTwoAlleleSimulation, SimulationState,
};
pub use events::{DemographicEvent, DemographicEventScheduler};
pub use population::Population;
