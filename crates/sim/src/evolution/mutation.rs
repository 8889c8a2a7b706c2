//! Recurrent mutation between the two alleles.
//!
//! Every generation each A allele turns into a with probability `A2a` and
//! each a allele turns into A with probability `a2A`. The allelic frequency
//! therefore moves as
//!
//! ```text
//! p' = p (1 - A2a) + (1 - p) a2A
//! ```
//!
//! and, absent other forces, settles at the mutation equilibrium
//! `p* = a2A / (A2a + a2A)`.
//!
//! Mutation acts on the allelic frequency; the genotypes are then rebuilt in
//! Hardy-Weinberg proportions for `p'`. Without mutation the genotypes pass
//! through untouched.

use crate::base::GenotypicFreqs;
use crate::errors::ConfigurationError;
use serde::{Deserialize, Serialize};

/// Largest accepted per-generation mutation rate.
///
/// Higher rates make mutation swamp every other force within a handful of
/// generations.
pub const MAX_MUT_RATE: f64 = 0.1;

/// Forward (A→a) and backward (a→A) mutation rates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "[f64; 2]", into = "[f64; 2]")]
pub struct MutRates {
    forward: f64,
    backward: f64,
}

impl MutRates {
    /// No mutation.
    pub const NONE: MutRates = MutRates {
        forward: 0.0,
        backward: 0.0,
    };

    /// Create mutation rates.
    ///
    /// # Arguments
    /// * `forward_rate` - probability that an A allele mutates to a
    /// * `backward_rate` - probability that an a allele mutates to A
    ///
    /// # Errors
    /// Returns an error unless both rates lie in `[0, MAX_MUT_RATE]`.
    pub fn new(forward_rate: f64, backward_rate: f64) -> Result<Self, ConfigurationError> {
        Ok(Self {
            forward: check_rate("A2a", forward_rate)?,
            backward: check_rate("a2A", backward_rate)?,
        })
    }

    /// Rate of A → a.
    #[allow(non_snake_case)]
    pub fn A2a(&self) -> f64 {
        self.forward
    }

    /// Rate of a → A.
    #[allow(non_snake_case)]
    pub fn a2A(&self) -> f64 {
        self.backward
    }

    pub fn is_none(&self) -> bool {
        self.forward == 0.0 && self.backward == 0.0
    }

    /// Allelic frequency of A after one round of mutation.
    pub fn mutate_freq_a(&self, freq_a_allele: f64) -> f64 {
        freq_a_allele * (1.0 - self.forward) + (1.0 - freq_a_allele) * self.backward
    }

    /// Genotypic frequencies after one round of mutation.
    ///
    /// Any non-zero rate resets the genotypes to Hardy-Weinberg proportions
    /// of the mutated allelic frequency.
    pub fn mutate(&self, freqs: &GenotypicFreqs) -> GenotypicFreqs {
        if self.is_none() {
            return *freqs;
        }
        GenotypicFreqs::hardy_weinberg_unchecked(self.mutate_freq_a(freqs.allelic_freqs().A()))
    }
}

impl TryFrom<[f64; 2]> for MutRates {
    type Error = ConfigurationError;

    fn try_from(rates: [f64; 2]) -> Result<Self, Self::Error> {
        Self::new(rates[0], rates[1])
    }
}

impl From<MutRates> for [f64; 2] {
    fn from(rates: MutRates) -> Self {
        [rates.forward, rates.backward]
    }
}

fn check_rate(name: &'static str, rate: f64) -> Result<f64, ConfigurationError> {
    if !(0.0..=MAX_MUT_RATE).contains(&rate) {
        return Err(ConfigurationError::InvalidParameter {
            name,
            value: rate,
            expected: "a mutation rate within [0, 0.1]",
        });
    }
    Ok(rate)
}
