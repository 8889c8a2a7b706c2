//! Simulation engine.
//!
//! This module provides the generation loop that advances every population
//! under selection, reproduction, mutation, migration and drift while
//! applying scheduled demographic events and feeding the loggers.

use crate::base::GenotypicFreqs;
use crate::errors::{ConfigurationError, SimulationError};
use crate::recording::{LoggerKind, PopulationLogger, SimulationResults};
use crate::simulation::{DemographicEventScheduler, Population, SimulationConfig};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

/// Advance `pops` through `num_generations` logged generations.
///
/// Generation 0 is the founding state and is logged before any transition.
/// Before producing generation `g` the scheduler applies every event due at
/// or before event generation `g + 1`. Every population then computes its
/// next state from a snapshot of all populations taken at the start of the
/// generation, and the new states are committed together.
///
/// # Errors
/// Stops at the first numerical error or firing-time scheduling error. The
/// populations then hold the last committed generation.
pub fn simulate_forward_in_time<R: Rng + ?Sized>(
    pops: &mut [Population],
    num_generations: usize,
    scheduler: &mut DemographicEventScheduler,
    loggers: &mut [Box<dyn PopulationLogger>],
    rng: &mut R,
) -> Result<(), SimulationError> {
    for logger in loggers.iter_mut() {
        logger.log(0, pops);
    }

    let mut fixed: Vec<bool> = pops.iter().map(|p| p.allelic_freqs().is_fixed()).collect();
    let mut next: Vec<GenotypicFreqs> = Vec::with_capacity(pops.len());

    for generation in 1..num_generations {
        scheduler.apply_due(generation + 1, pops)?;

        let snapshot: Vec<GenotypicFreqs> = pops.iter().map(|p| *p.genotypic_freqs()).collect();
        next.clear();
        for pop in pops.iter() {
            next.push(pop.next_generation(&snapshot, rng)?);
        }

        for ((pop, freqs), was_fixed) in pops.iter_mut().zip(&next).zip(fixed.iter_mut()) {
            pop.set_genotypic_freqs(*freqs);
            let allelic = pop.allelic_freqs();
            tracing::trace!(generation, pop = pop.name(), freq_a_allele = allelic.A());
            if allelic.is_fixed() && !*was_fixed {
                tracing::debug!(
                    generation,
                    pop = pop.name(),
                    freq_a_allele = allelic.A(),
                    "allele fixed"
                );
            }
            *was_fixed = allelic.is_fixed();
        }

        for logger in loggers.iter_mut() {
            logger.log(generation, pops);
        }
    }
    Ok(())
}

/// Lifecycle of a simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationState {
    /// Built and validated, not run yet
    Initialized,
    Running,
    /// Finished, results available
    Complete,
    /// Stopped by an error
    Failed,
}

/// A one-locus, two-allele simulation built from a `SimulationConfig`.
///
/// Each instance runs once. To run the same configuration again build a new
/// simulation; [`run_replicates`] does that for a batch.
#[derive(Debug)]
pub struct OneLocusTwoAlleleSimulation {
    pops: Vec<Population>,
    num_generations: usize,
    scheduler: DemographicEventScheduler,
    loggers: Vec<Box<dyn PopulationLogger>>,
    /// Random number generator (Xoshiro256++)
    rng: Xoshiro256PlusPlus,
    seed: Option<u64>,
    state: SimulationState,
    results: Option<SimulationResults>,
}

impl OneLocusTwoAlleleSimulation {
    /// Validate `config` and build the populations, event schedule and
    /// loggers.
    ///
    /// # Errors
    /// Returns a validation or configuration error if the populations or
    /// events are invalid.
    pub fn new(config: SimulationConfig) -> Result<Self, SimulationError> {
        let pops = config.build_populations()?;
        let scheduler = DemographicEventScheduler::new(config.events(), &pops)?;

        let mut kinds: Vec<LoggerKind> = Vec::with_capacity(config.loggers.len());
        for kind in &config.loggers {
            if kinds.contains(kind) {
                tracing::warn!(logger = %kind, "duplicate logger ignored");
                continue;
            }
            kinds.push(*kind);
        }
        let loggers = kinds.into_iter().map(LoggerKind::build).collect();

        let rng = match config.seed {
            Some(seed) => Xoshiro256PlusPlus::seed_from_u64(seed),
            None => Xoshiro256PlusPlus::from_seed(rand::rng().random()),
        };

        Ok(Self {
            pops,
            num_generations: config.num_generations,
            scheduler,
            loggers,
            rng,
            seed: config.seed,
            state: SimulationState::Initialized,
            results: None,
        })
    }

    /// Run every generation and assemble the results.
    ///
    /// # Errors
    /// Returns [`ConfigurationError::AlreadyRun`] if called more than once,
    /// or the error that stopped the generation loop.
    pub fn run(&mut self) -> Result<&SimulationResults, SimulationError> {
        if self.state != SimulationState::Initialized {
            return Err(ConfigurationError::AlreadyRun.into());
        }
        self.state = SimulationState::Running;
        tracing::info!(
            populations = self.pops.len(),
            num_generations = self.num_generations,
            events = self.scheduler.pending(),
            seed = ?self.seed,
            "starting simulation"
        );

        if let Err(e) = simulate_forward_in_time(
            &mut self.pops,
            self.num_generations,
            &mut self.scheduler,
            &mut self.loggers,
            &mut self.rng,
        ) {
            self.state = SimulationState::Failed;
            tracing::warn!(error = %e, "simulation failed");
            return Err(e);
        }

        let mut results = SimulationResults::default();
        for logger in &self.loggers {
            logger.export(&mut results);
        }
        self.state = SimulationState::Complete;
        tracing::info!(
            num_generations = self.num_generations,
            unfired_events = self.scheduler.pending(),
            "simulation complete"
        );
        Ok(&*self.results.insert(results))
    }

    pub fn state(&self) -> SimulationState {
        self.state
    }

    /// Results of a completed run.
    pub fn results(&self) -> Option<&SimulationResults> {
        self.results.as_ref()
    }

    pub fn into_results(self) -> Option<SimulationResults> {
        self.results
    }

    /// Populations in declaration order, in their current state.
    pub fn populations(&self) -> &[Population] {
        &self.pops
    }

    pub fn num_generations(&self) -> usize {
        self.num_generations
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }
}

/// Run `num_simulations` independent replicates of `config`.
///
/// Each replicate is a freshly built simulation seeded from a master
/// generator, itself seeded from `config.seed` when present, so a seeded
/// batch is reproducible.
pub fn run_replicates(
    config: &SimulationConfig,
    num_simulations: usize,
) -> Result<Vec<SimulationResults>, SimulationError> {
    let mut master = match config.seed {
        Some(seed) => Xoshiro256PlusPlus::seed_from_u64(seed),
        None => Xoshiro256PlusPlus::from_seed(rand::rng().random()),
    };

    let mut replicates = Vec::with_capacity(num_simulations);
    for replicate in 0..num_simulations {
        let seed: u64 = master.random();
        tracing::debug!(replicate, seed, "starting replicate");
        let mut sim = OneLocusTwoAlleleSimulation::new(SimulationConfig {
            seed: Some(seed),
            ..config.clone()
        })?;
        sim.run()?;
        replicates.extend(sim.into_results());
    }
    Ok(replicates)
}
