//! Genotypic and allelic frequencies at a single biallelic locus.
//!
//! Genotypes are always ordered `AA`, `Aa`, `aa`. A `GenotypicFreqs` value is
//! validated on construction and never mutated afterwards: every generation
//! produces a fresh instance that replaces the previous one.

use crate::errors::ValidationError;
use serde::{Deserialize, Serialize};

/// Tolerance used when checking that frequencies sum to one.
pub const FREQ_TOLERANCE: f64 = 1e-6;

/// Frequencies of the AA, Aa and aa genotypes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f64; 3]", into = "[f64; 3]")]
pub struct GenotypicFreqs {
    freqs: [f64; 3],
}

impl GenotypicFreqs {
    /// Create genotypic frequencies from explicit AA, Aa and aa values.
    ///
    /// # Errors
    /// Returns a `ValidationError` if any value is not finite, lies outside
    /// [0, 1], or if the three values do not sum to 1 within `FREQ_TOLERANCE`.
    pub fn new(freq_aa_hom: f64, freq_het: f64, freq_aa: f64) -> Result<Self, ValidationError> {
        let aa_hom = check_freq("AA", freq_aa_hom)?;
        let het = check_freq("Aa", freq_het)?;
        let aa = check_freq("aa", freq_aa)?;

        let sum = aa_hom + het + aa;
        if (sum - 1.0).abs() > FREQ_TOLERANCE {
            return Err(ValidationError::FreqsDontSumToOne {
                aa_hom: freq_aa_hom,
                het: freq_het,
                aa: freq_aa,
                sum,
            });
        }

        Ok(Self {
            freqs: [aa_hom, het, aa],
        })
    }

    /// Create genotypic frequencies from AA and Aa, inferring `aa = 1 - AA - Aa`.
    pub fn from_aa_hom_and_het(freq_aa_hom: f64, freq_het: f64) -> Result<Self, ValidationError> {
        Self::new(freq_aa_hom, freq_het, 1.0 - freq_aa_hom - freq_het)
    }

    /// Hardy-Weinberg genotypic frequencies for an allelic frequency of A.
    ///
    /// `AA = p²`, `Aa = 2p(1-p)`, `aa = (1-p)²`.
    pub fn hardy_weinberg(freq_a_allele: f64) -> Result<Self, ValidationError> {
        let p = check_freq("A", freq_a_allele)?;
        Ok(Self::hardy_weinberg_unchecked(p))
    }

    pub(crate) fn hardy_weinberg_unchecked(p: f64) -> Self {
        let q = 1.0 - p;
        Self {
            freqs: [p * p, 2.0 * p * q, q * q],
        }
    }

    /// Build frequencies from non-negative genotype weights, normalising by
    /// their total. Returns `None` when the total weight is not positive.
    pub(crate) fn from_weights(weights: [f64; 3]) -> Option<Self> {
        let total: f64 = weights.iter().sum();
        if !total.is_finite() || total <= 0.0 {
            return None;
        }
        Some(Self {
            freqs: weights.map(|w| (w / total).clamp(0.0, 1.0)),
        })
    }

    /// Frequencies from `[AA, Aa, aa]` genotype counts.
    pub(crate) fn from_counts(counts: [u64; 3]) -> Option<Self> {
        Self::from_weights(counts.map(|c| c as f64))
    }

    /// Frequency of the AA homozygote.
    pub fn freq_aa_hom(&self) -> f64 {
        self.freqs[0]
    }

    /// Frequency of the Aa heterozygote.
    pub fn freq_het(&self) -> f64 {
        self.freqs[1]
    }

    /// Frequency of the aa homozygote.
    pub fn freq_aa(&self) -> f64 {
        self.freqs[2]
    }

    /// All three frequencies as `[AA, Aa, aa]`.
    pub fn freqs(&self) -> [f64; 3] {
        self.freqs
    }

    /// Allelic frequencies implied by these genotypes.
    pub fn allelic_freqs(&self) -> AllelicFreqs {
        AllelicFreqs::from_freq_a_unchecked(self.freqs[0] + 0.5 * self.freqs[1])
    }
}

impl TryFrom<[f64; 3]> for GenotypicFreqs {
    type Error = ValidationError;

    fn try_from(freqs: [f64; 3]) -> Result<Self, Self::Error> {
        Self::new(freqs[0], freqs[1], freqs[2])
    }
}

impl From<GenotypicFreqs> for [f64; 3] {
    fn from(freqs: GenotypicFreqs) -> Self {
        freqs.freqs
    }
}

/// Frequencies of the A and a alleles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AllelicFreqs {
    #[serde(rename = "A")]
    freq_a_allele: f64,
}

impl AllelicFreqs {
    /// Create allelic frequencies from the frequency of A.
    pub fn new(freq_a_allele: f64) -> Result<Self, ValidationError> {
        Ok(Self {
            freq_a_allele: check_freq("A", freq_a_allele)?,
        })
    }

    fn from_freq_a_unchecked(freq_a_allele: f64) -> Self {
        Self {
            freq_a_allele: freq_a_allele.clamp(0.0, 1.0),
        }
    }

    /// Frequency of allele A.
    #[allow(non_snake_case)]
    pub fn A(&self) -> f64 {
        self.freq_a_allele
    }

    /// Frequency of allele a.
    pub fn a(&self) -> f64 {
        1.0 - self.freq_a_allele
    }

    /// Heterozygosity expected under Hardy-Weinberg, `2·A·(1-A)`.
    pub fn expected_heterozygosity(&self) -> f64 {
        2.0 * self.A() * self.a()
    }

    /// True when one of the two alleles has been lost.
    pub fn is_fixed(&self) -> bool {
        self.freq_a_allele <= 0.0 || self.freq_a_allele >= 1.0
    }
}

/// Check that a frequency is finite and inside [0, 1] (within tolerance) and
/// clamp away rounding residue.
fn check_freq(name: &'static str, value: f64) -> Result<f64, ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteFreq { name });
    }
    if value < -FREQ_TOLERANCE || value > 1.0 + FREQ_TOLERANCE {
        return Err(ValidationError::FreqOutOfRange { name, value });
    }
    Ok(value.clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn test_from_aa_hom_and_het_infers_aa() {
        let freqs = GenotypicFreqs::from_aa_hom_and_het(1.0, 0.0).unwrap();
        assert_eq!(freqs.freqs(), [1.0, 0.0, 0.0]);

        let freqs = GenotypicFreqs::from_aa_hom_and_het(0.2, 0.3).unwrap();
        assert!(approx_eq(freqs.freq_aa(), 0.5));
    }

    #[test]
    fn test_explicit_freqs() {
        let freqs = GenotypicFreqs::new(0.5, 0.0, 0.5).unwrap();
        assert_eq!(freqs.freqs(), [0.5, 0.0, 0.5]);
        assert!(approx_eq(freqs.allelic_freqs().A(), 0.5));
    }

    #[test]
    fn test_rejects_sum_above_one() {
        assert!(matches!(
            GenotypicFreqs::from_aa_hom_and_het(1.0, 0.5),
            Err(ValidationError::FreqOutOfRange { name: "aa", .. })
        ));
        assert!(matches!(
            GenotypicFreqs::new(1.0, 0.0, 0.1),
            Err(ValidationError::FreqsDontSumToOne { .. })
        ));
    }

    #[test]
    fn test_rejects_out_of_range_and_nan() {
        assert!(GenotypicFreqs::new(-0.5, 1.0, 0.5).is_err());
        assert!(GenotypicFreqs::new(f64::NAN, 0.5, 0.5).is_err());
        assert!(AllelicFreqs::new(1.2).is_err());
    }

    #[test]
    fn test_tolerates_rounding() {
        let freqs = GenotypicFreqs::new(0.3333333, 0.3333333, 0.3333333).unwrap();
        let sum: f64 = freqs.freqs().iter().sum();
        assert!((sum - 1.0).abs() < FREQ_TOLERANCE);
    }

    #[test]
    fn test_hardy_weinberg() {
        let freqs = GenotypicFreqs::hardy_weinberg(0.3).unwrap();
        assert!(approx_eq(freqs.freq_aa_hom(), 0.09));
        assert!(approx_eq(freqs.freq_het(), 0.42));
        assert!(approx_eq(freqs.freq_aa(), 0.49));
        assert!(approx_eq(freqs.allelic_freqs().A(), 0.3));
    }

    #[test]
    fn test_expected_heterozygosity() {
        let allelic = AllelicFreqs::new(0.5).unwrap();
        assert!(approx_eq(allelic.expected_heterozygosity(), 0.5));
        assert!(approx_eq(allelic.a(), 0.5));
        assert!(!allelic.is_fixed());
        assert!(AllelicFreqs::new(1.0).unwrap().is_fixed());
    }

    #[test]
    fn test_from_weights_normalises() {
        let freqs = GenotypicFreqs::from_weights([1.0, 2.0, 1.0]).unwrap();
        assert!(approx_eq(freqs.freq_het(), 0.5));
        assert!(GenotypicFreqs::from_weights([0.0, 0.0, 0.0]).is_none());
    }

    #[test]
    fn test_serde_as_triple() {
        let freqs: GenotypicFreqs = serde_json::from_str("[0.25, 0.5, 0.25]").unwrap();
        assert!(approx_eq(freqs.freq_het(), 0.5));
        assert!(serde_json::from_str::<GenotypicFreqs>("[0.5, 0.5, 0.5]").is_err());
    }
}
