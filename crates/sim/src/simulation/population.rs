//! A single deme and its one-generation transition.
//!
//! A `Population` owns its current genotypic frequencies together with the
//! parameters that shape the next generation. The update rule is split into
//! a pure `next_generation`, which reads a snapshot of every population, and
//! a commit step, so that several populations exchanging migrants can be
//! advanced from the same starting state.

use crate::base::{AllelicFreqs, GenotypicFreqs, PopSize};
use crate::errors::{ConfigurationError, SimulationError};
use crate::evolution::{drift, migration, Fitness, Immigration, MutRates, SelfingRate};
use rand::Rng;
use std::sync::Arc;

/// One population at a biallelic locus.
#[derive(Debug, Clone, PartialEq)]
pub struct Population {
    /// Population name, unique within a simulation
    name: Arc<str>,
    /// Current genotypic frequencies
    genotypic_freqs: GenotypicFreqs,
    /// Census size, infinite for no drift
    size: PopSize,
    fitness: Fitness,
    mut_rates: MutRates,
    selfing_rate: SelfingRate,
    /// Active immigration flows into this population
    immigrations: Vec<Immigration>,
}

impl Population {
    /// Create an infinite, neutral, randomly mating population without
    /// mutation or immigration.
    pub fn new(name: impl Into<Arc<str>>, genotypic_freqs: GenotypicFreqs) -> Self {
        Self {
            name: name.into(),
            genotypic_freqs,
            size: PopSize::Infinite,
            fitness: Fitness::NEUTRAL,
            mut_rates: MutRates::NONE,
            selfing_rate: SelfingRate::OUTCROSSING,
            immigrations: Vec::new(),
        }
    }

    pub fn with_size(mut self, size: PopSize) -> Self {
        self.size = size;
        self
    }

    pub fn with_fitness(mut self, fitness: Fitness) -> Self {
        self.fitness = fitness;
        self
    }

    pub fn with_mut_rates(mut self, mut_rates: MutRates) -> Self {
        self.mut_rates = mut_rates;
        self
    }

    pub fn with_selfing_rate(mut self, selfing_rate: SelfingRate) -> Self {
        self.selfing_rate = selfing_rate;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn genotypic_freqs(&self) -> &GenotypicFreqs {
        &self.genotypic_freqs
    }

    pub fn allelic_freqs(&self) -> AllelicFreqs {
        self.genotypic_freqs.allelic_freqs()
    }

    /// Heterozygosity expected under Hardy-Weinberg for the current allelic
    /// frequency.
    pub fn expected_heterozygosity(&self) -> f64 {
        self.allelic_freqs().expected_heterozygosity()
    }

    pub fn size(&self) -> PopSize {
        self.size
    }

    /// Change the census size used by later drift steps.
    pub fn set_size(&mut self, size: PopSize) {
        self.size = size;
    }

    pub fn fitness(&self) -> &Fitness {
        &self.fitness
    }

    pub fn mut_rates(&self) -> &MutRates {
        &self.mut_rates
    }

    pub fn selfing_rate(&self) -> SelfingRate {
        self.selfing_rate
    }

    pub fn immigrations(&self) -> &[Immigration] {
        &self.immigrations
    }

    /// Sum of the rates of all active immigration flows.
    pub fn total_immigration_rate(&self) -> f64 {
        self.immigrations.iter().map(|m| m.rate).sum()
    }

    /// Register a new immigration flow.
    ///
    /// # Errors
    /// Fails if the rate is outside [0, 1] or if the combined immigration
    /// rate would exceed 1.
    pub fn start_immigration(&mut self, immigration: Immigration) -> Result<(), ConfigurationError> {
        migration::check_immigration_rate(immigration.rate)?;
        let total = self.total_immigration_rate() + immigration.rate;
        if total > 1.0 + f64::EPSILON {
            return Err(ConfigurationError::ExcessImmigration {
                pop: self.name.to_string(),
                total,
            });
        }
        self.immigrations.push(immigration);
        Ok(())
    }

    /// Remove the immigration flow started by `migration_id`. Returns whether
    /// such a flow was active.
    pub fn stop_immigration(&mut self, migration_id: &str) -> bool {
        let before = self.immigrations.len();
        self.immigrations.retain(|m| m.migration_id != migration_id);
        self.immigrations.len() != before
    }

    /// Compute the genotypic frequencies of the next generation without
    /// modifying this population.
    ///
    /// Steps, in order: selection, reproduction (random mating and selfing),
    /// mutation, immigration from `snapshot`, drift when the size is finite.
    ///
    /// # Errors
    /// Returns `SimulationError::Numerical` if mean fitness is zero and a
    /// configuration error if an immigration source is missing from
    /// `snapshot`.
    pub fn next_generation<R: Rng + ?Sized>(
        &self,
        snapshot: &[GenotypicFreqs],
        rng: &mut R,
    ) -> Result<GenotypicFreqs, SimulationError> {
        let selected =
            self.fitness
                .select(&self.genotypic_freqs)
                .map_err(|source| SimulationError::Numerical {
                    pop: self.name.to_string(),
                    source,
                })?;

        let offspring = self.selfing_rate.offspring(&selected);
        let mutated = self.mut_rates.mutate(&offspring);

        let mixed = migration::mix(&mutated, &self.immigrations, snapshot).ok_or_else(|| {
            let missing = self
                .immigrations
                .iter()
                .find(|m| m.source >= snapshot.len())
                .map(|m| (m.migration_id.clone(), m.source_name.clone()))
                .unwrap_or_default();
            ConfigurationError::UnknownPopulation {
                event: missing.0,
                pop: missing.1,
            }
        })?;

        let next = match self.size.get() {
            Some(n) => drift::sample_genotypes(&mixed, n, rng).map_err(|source| {
                SimulationError::Numerical {
                    pop: self.name.to_string(),
                    source,
                }
            })?,
            None => mixed,
        };
        Ok(next)
    }

    /// Replace the current genotypic frequencies.
    pub fn set_genotypic_freqs(&mut self, genotypic_freqs: GenotypicFreqs) {
        self.genotypic_freqs = genotypic_freqs;
    }

    /// Advance this population on its own by one generation.
    ///
    /// Only populations without active immigration can evolve in isolation;
    /// use `simulate_forward_in_time` for connected populations.
    pub fn evolve_to_next_generation<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
    ) -> Result<(), SimulationError> {
        let next = self.next_generation(&[], rng)?;
        self.genotypic_freqs = next;
        Ok(())
    }
}
