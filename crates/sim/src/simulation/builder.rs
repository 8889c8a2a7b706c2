//! Builder pattern for creating simulations.
//!
//! Provides a fluent API for assembling a `SimulationConfig` in code, with
//! the same defaults and validation as a configuration loaded from JSON.

use crate::base::PopSize;
use crate::errors::{ConfigurationError, SimulationError};
use crate::recording::LoggerKind;
use crate::simulation::{
    DemographicEvent, OneLocusTwoAlleleSimulation, PopulationConfig, SimulationConfig,
};
use indexmap::IndexMap;

/// Builder for constructing `OneLocusTwoAlleleSimulation` instances with a
/// fluent API.
///
/// # Examples
///
/// ```
/// use poplab_sim::simulation::{PopulationConfig, SimulationBuilder};
///
/// let mut sim = SimulationBuilder::new()
///     .population("pop1", PopulationConfig::from_genotypic_freqs(0.5, 0.0, 0.5))
///     .population("pop2", PopulationConfig::from_genotypic_freqs(0.3, 0.0, 0.7))
///     .generations(2)
///     .migration_start("mig", "pop2", "pop1", 0.1, 2)
///     .seed(42)
///     .build()
///     .unwrap();
///
/// let results = sim.run().unwrap();
/// let freqs = results.allelic_freqs().unwrap().column("pop1").unwrap();
/// assert!((freqs[1] - 0.48).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SimulationBuilder {
    pops: Vec<(String, PopulationConfig)>,
    generations: Option<usize>,
    events: Vec<(String, DemographicEvent)>,
    /// Default: allelic, genotypic and expected heterozygosity loggers
    loggers: Option<Vec<LoggerKind>>,
    seed: Option<u64>,
}

impl SimulationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a population.
    pub fn population(mut self, name: impl Into<String>, config: PopulationConfig) -> Self {
        self.pops.push((name.into(), config));
        self
    }

    /// Set the number of logged generations, including the founding one
    /// (required).
    pub fn generations(mut self, generations: usize) -> Self {
        self.generations = Some(generations);
        self
    }

    /// Add a demographic event.
    pub fn event(mut self, id: impl Into<String>, event: DemographicEvent) -> Self {
        self.events.push((id.into(), event));
        self
    }

    /// Start migration from `from_pop` into `to_pop` at `generation`.
    pub fn migration_start(
        self,
        id: impl Into<String>,
        from_pop: impl Into<String>,
        to_pop: impl Into<String>,
        rate: f64,
        generation: usize,
    ) -> Self {
        self.event(
            id,
            DemographicEvent::MigrationStart {
                from_pop: from_pop.into(),
                to_pop: to_pop.into(),
                rate,
                generation,
            },
        )
    }

    /// Stop the migration started by event `migration_id` at `generation`.
    pub fn migration_stop(
        self,
        id: impl Into<String>,
        migration_id: impl Into<String>,
        generation: usize,
    ) -> Self {
        self.event(
            id,
            DemographicEvent::MigrationStop {
                migration_id: migration_id.into(),
                generation,
            },
        )
    }

    /// Change the size of `pop` at `generation`.
    pub fn size_change(
        self,
        id: impl Into<String>,
        pop: impl Into<String>,
        new_size: PopSize,
        generation: usize,
    ) -> Self {
        self.event(
            id,
            DemographicEvent::SizeChange {
                pop: pop.into(),
                new_size,
                generation,
            },
        )
    }

    /// Activate a logger. The first call replaces the default set.
    pub fn logger(mut self, kind: LoggerKind) -> Self {
        self.loggers.get_or_insert_with(Vec::new).push(kind);
        self
    }

    /// Set the random seed for reproducibility.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Assemble the configuration.
    ///
    /// # Errors
    /// Fails if the number of generations was not set, or if a population
    /// name or event id is used twice.
    pub fn config(self) -> Result<SimulationConfig, ConfigurationError> {
        let num_generations = self
            .generations
            .ok_or(ConfigurationError::MissingParameter("generations"))?;

        let mut pops = IndexMap::with_capacity(self.pops.len());
        for (name, config) in self.pops {
            if pops.contains_key(&name) {
                return Err(ConfigurationError::DuplicatePopulation(name));
            }
            pops.insert(name, config);
        }

        let mut demographic_events = IndexMap::with_capacity(self.events.len());
        for (id, event) in self.events {
            if demographic_events.contains_key(&id) {
                return Err(ConfigurationError::DuplicateEvent(id));
            }
            demographic_events.insert(id, event);
        }

        Ok(SimulationConfig {
            pops,
            num_generations,
            demographic_events,
            loggers: self.loggers.unwrap_or_else(LoggerKind::default_set),
            seed: self.seed,
        })
    }

    /// Build the simulation.
    pub fn build(self) -> Result<OneLocusTwoAlleleSimulation, SimulationError> {
        OneLocusTwoAlleleSimulation::new(self.config()?)
    }
}
