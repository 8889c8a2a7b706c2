//! Commonly used imports for convenience.
//!
//! # Example
//!
//! ```
//! use poplab_sim::prelude::*;
//!
//! let freqs = GenotypicFreqs::hardy_weinberg(0.3).unwrap();
//! assert!((freqs.freq_het() - 0.42).abs() < 1e-12);
//! ```

pub use crate::base::{AllelicFreqs, GenotypicFreqs, PopSize};
pub use crate::errors::{ConfigurationError, NumericalError, SimulationError, ValidationError};
pub use crate::evolution::{Fitness, MutRates, SelfingRate};
pub use crate::recording::{GenerationTable, LoggerKind, SimulationResults};
pub use crate::simulation::{
    run_replicates, DemographicEvent, OneLocusTwoAlleleSimulation, Population, PopulationConfig,
    SimulationBuilder, SimulationConfig,
};
