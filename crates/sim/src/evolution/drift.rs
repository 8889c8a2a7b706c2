//! Genetic drift through finite sampling.
//!
//! A population of `N` diploid individuals is formed by drawing `N`
//! genotypes from the expected genotypic frequencies. The genotype counts
//! are multinomial, which is sampled here as a chain of binomials:
//!
//! ```text
//! n_AA ~ Bin(N, f_AA)
//! n_Aa ~ Bin(N - n_AA, f_Aa / (1 - f_AA))
//! n_aa = N - n_AA - n_Aa
//! ```
//!
//! With very small `N` the draw quickly fixes one allele; that is a valid
//! terminal state, not an error.

use crate::base::GenotypicFreqs;
use crate::errors::NumericalError;
use rand::Rng;
use rand_distr::{Binomial, Distribution};

/// Sample the genotypic frequencies of `size` individuals drawn from
/// `expected`.
///
/// # Errors
/// Returns `NumericalError::InvalidProbability` if a conditional genotype
/// probability is not a number in `[0, 1]`.
pub fn sample_genotypes<R: Rng + ?Sized>(
    expected: &GenotypicFreqs,
    size: u64,
    rng: &mut R,
) -> Result<GenotypicFreqs, NumericalError> {
    if size == 0 {
        return Ok(*expected);
    }
    let [f_aa_hom, f_het, _] = expected.freqs();

    let n_aa_hom = binomial(size, f_aa_hom, rng)?;
    let remaining = size - n_aa_hom;
    let rest = 1.0 - f_aa_hom;
    let n_het = if rest > 0.0 {
        binomial(remaining, (f_het / rest).min(1.0), rng)?
    } else {
        0
    };
    let n_aa = remaining - n_het;

    Ok(GenotypicFreqs::from_counts([n_aa_hom, n_het, n_aa]).unwrap_or(*expected))
}

fn binomial<R: Rng + ?Sized>(trials: u64, p: f64, rng: &mut R) -> Result<u64, NumericalError> {
    if trials == 0 || p == 0.0 {
        return Ok(0);
    }
    if p == 1.0 {
        return Ok(trials);
    }
    let dist = Binomial::new(trials, p).map_err(|_| NumericalError::InvalidProbability(p))?;
    Ok(dist.sample(rng))
}
