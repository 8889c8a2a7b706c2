//! Viability selection on the three genotypes.
//!
//! Each genotype carries a relative fitness: the expected reproductive
//! contribution of an individual with that genotype relative to the others.
//! Only ratios between the three values matter, so they need not sum to one
//! and none of them needs to equal one.
//!
//! ## Common regimes
//! - **Neutral**: `(1, 1, 1)`, selection leaves frequencies untouched.
//! - **Directional**: e.g. `(1, 0.8, 0.8)` favours A with a dominant a.
//! - **Overdominance**: heterozygote fittest, e.g. `(0.9, 1, 0.9)`, maintains
//!   both alleles at a stable polymorphism.
//! - **Underdominance**: heterozygote least fit, unstable internal equilibrium.
//! - **Lethal homozygote**: e.g. `(1, 1, 0)` removes aa every generation.

use crate::base::GenotypicFreqs;
use crate::errors::{ConfigurationError, NumericalError};
use serde::{Deserialize, Serialize};

/// Relative fitness of the AA, Aa and aa genotypes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f64; 3]", into = "[f64; 3]")]
pub struct Fitness {
    w_aa_hom: f64,
    w_het: f64,
    w_aa: f64,
}

impl Fitness {
    /// No selection.
    pub const NEUTRAL: Fitness = Fitness {
        w_aa_hom: 1.0,
        w_het: 1.0,
        w_aa: 1.0,
    };

    /// Create a fitness triple.
    ///
    /// # Errors
    /// Returns an error if any value is negative or not finite.
    pub fn new(w_aa_hom: f64, w_het: f64, w_aa: f64) -> Result<Self, ConfigurationError> {
        Ok(Self {
            w_aa_hom: check_fitness("wAA", w_aa_hom)?,
            w_het: check_fitness("wAa", w_het)?,
            w_aa: check_fitness("waa", w_aa)?,
        })
    }

    pub fn w_aa_hom(&self) -> f64 {
        self.w_aa_hom
    }

    pub fn w_het(&self) -> f64 {
        self.w_het
    }

    pub fn w_aa(&self) -> f64 {
        self.w_aa
    }

    pub fn is_neutral(&self) -> bool {
        self.w_aa_hom == self.w_het && self.w_het == self.w_aa
    }

    /// Mean fitness of a population with the given genotypic frequencies.
    pub fn mean_fitness(&self, freqs: &GenotypicFreqs) -> f64 {
        let [f_aa_hom, f_het, f_aa] = freqs.freqs();
        f_aa_hom * self.w_aa_hom + f_het * self.w_het + f_aa * self.w_aa
    }

    /// Genotypic frequencies among the survivors of selection.
    ///
    /// Each frequency is weighted by its genotype's fitness and the result is
    /// renormalised by the mean fitness.
    ///
    /// # Errors
    /// Returns `NumericalError::ZeroMeanFitness` when every genotype present
    /// has zero fitness.
    pub fn select(&self, freqs: &GenotypicFreqs) -> Result<GenotypicFreqs, NumericalError> {
        let mean = self.mean_fitness(freqs);
        if mean <= 0.0 {
            return Err(NumericalError::ZeroMeanFitness);
        }
        let [f_aa_hom, f_het, f_aa] = freqs.freqs();
        GenotypicFreqs::from_weights([
            f_aa_hom * self.w_aa_hom / mean,
            f_het * self.w_het / mean,
            f_aa * self.w_aa / mean,
        ])
        .ok_or(NumericalError::ZeroMeanFitness)
    }
}

impl Default for Fitness {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

impl TryFrom<[f64; 3]> for Fitness {
    type Error = ConfigurationError;

    fn try_from(w: [f64; 3]) -> Result<Self, Self::Error> {
        Self::new(w[0], w[1], w[2])
    }
}

impl From<Fitness> for [f64; 3] {
    fn from(fitness: Fitness) -> Self {
        [fitness.w_aa_hom, fitness.w_het, fitness.w_aa]
    }
}

fn check_fitness(name: &'static str, value: f64) -> Result<f64, ConfigurationError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigurationError::InvalidParameter {
            name,
            value,
            expected: "a finite non-negative number",
        });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    fn freq_a_after(freqs: (f64, f64, f64), w: (f64, f64, f64)) -> f64 {
        let freqs = GenotypicFreqs::new(freqs.0, freqs.1, freqs.2).unwrap();
        let fitness = Fitness::new(w.0, w.1, w.2).unwrap();
        fitness.select(&freqs).unwrap().allelic_freqs().A()
    }

    #[test]
    fn test_neutral_selection_is_identity() {
        let freqs = GenotypicFreqs::new(0.2, 0.3, 0.5).unwrap();
        let selected = Fitness::NEUTRAL.select(&freqs).unwrap();
        assert!(approx_eq(selected.freq_aa_hom(), 0.2));
        assert!(approx_eq(selected.freq_het(), 0.3));
        assert!(approx_eq(selected.freq_aa(), 0.5));
        assert!(Fitness::default().is_neutral());
    }

    #[test]
    fn test_selection_against_a_allele() {
        assert!(approx_eq(
            freq_a_after((0.5, 0.0, 0.5), (0.01, 0.01, 1.0)),
            0.009900990099009901
        ));
        assert!(approx_eq(
            freq_a_after((0.5, 0.0, 0.5), (0.99, 0.99, 1.0)),
            0.4974874371859296
        ));
        assert!(approx_eq(
            freq_a_after((0.99, 0.0, 0.01), (0.99, 0.99, 1.0)),
            0.9899000100999898
        ));
    }

    #[test]
    fn test_no_aa_means_no_response() {
        assert!(approx_eq(freq_a_after((0.99, 0.01, 0.0), (0.01, 0.01, 1.0)), 0.995));
    }

    #[test]
    fn test_zero_mean_fitness_is_an_error() {
        let freqs = GenotypicFreqs::new(1.0, 0.0, 0.0).unwrap();
        let fitness = Fitness::new(0.0, 1.0, 1.0).unwrap();
        assert_eq!(fitness.select(&freqs), Err(NumericalError::ZeroMeanFitness));
        assert_eq!(fitness.mean_fitness(&freqs), 0.0);
    }

    #[test]
    fn test_rejects_negative_fitness() {
        assert!(Fitness::new(1.0, -0.1, 1.0).is_err());
        assert!(Fitness::new(f64::INFINITY, 1.0, 1.0).is_err());
        assert!(serde_json::from_str::<Fitness>("[1, 1, -1]").is_err());
    }
}
