//! Mating system: random mating mixed with self-fertilisation.
//!
//! Under random mating the offspring genotypes follow Hardy-Weinberg
//! proportions of the parents' allelic frequency. A selfing individual
//! breeds true if homozygous, while a selfed heterozygote produces
//! 1/4 AA, 1/2 Aa and 1/4 aa. A fraction `s` of the offspring comes from
//! selfing, the rest from random mating; selfing therefore halves the
//! heterozygote share it contributes and pushes the population towards
//! homozygosity without changing allelic frequencies.

use crate::base::GenotypicFreqs;
use crate::errors::ConfigurationError;
use serde::{Deserialize, Serialize};

/// Fraction of offspring produced by self-fertilisation, in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct SelfingRate(f64);

impl SelfingRate {
    /// Pure random mating.
    pub const OUTCROSSING: SelfingRate = SelfingRate(0.0);

    pub fn new(rate: f64) -> Result<Self, ConfigurationError> {
        if !(0.0..=1.0).contains(&rate) {
            return Err(ConfigurationError::InvalidParameter {
                name: "selfing_rate",
                value: rate,
                expected: "a rate within [0, 1]",
            });
        }
        Ok(Self(rate))
    }

    pub fn get(self) -> f64 {
        self.0
    }

    /// Offspring genotypic frequencies produced by parents with `parents`
    /// genotypic frequencies.
    pub fn offspring(self, parents: &GenotypicFreqs) -> GenotypicFreqs {
        let random_mating = GenotypicFreqs::hardy_weinberg_unchecked(parents.allelic_freqs().A());
        if self.0 == 0.0 {
            return random_mating;
        }
        let random_mating = random_mating.freqs();

        let [f_aa_hom, f_het, f_aa] = parents.freqs();
        let selfed = [f_aa_hom + 0.25 * f_het, 0.5 * f_het, f_aa + 0.25 * f_het];
        let s = self.0;
        let mixed = [0, 1, 2].map(|i| (1.0 - s) * random_mating[i] + s * selfed[i]);
        GenotypicFreqs::from_weights(mixed).unwrap_or(*parents)
    }
}

impl TryFrom<f64> for SelfingRate {
    type Error = ConfigurationError;

    fn try_from(rate: f64) -> Result<Self, Self::Error> {
        Self::new(rate)
    }
}

impl From<SelfingRate> for f64 {
    fn from(rate: SelfingRate) -> Self {
        rate.0
    }
}
