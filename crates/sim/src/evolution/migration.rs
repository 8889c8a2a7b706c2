//! Gene flow from other populations.
//!
//! An immigration rate `m` is the fraction of the next generation made of
//! immigrants. Immigrants carry the genotypic frequencies their source
//! population had at the start of the generation, before it evolved itself,
//! so every destination reads the same snapshot regardless of update order.

use crate::base::GenotypicFreqs;
use crate::errors::ConfigurationError;

/// An active flow of immigrants into a population.
#[derive(Debug, Clone, PartialEq)]
pub struct Immigration {
    /// Identifier of the demographic event that started this flow.
    pub migration_id: String,
    /// Index of the source population in the simulation.
    pub source: usize,
    /// Name of the source population.
    pub source_name: String,
    /// Fraction of the next generation contributed by immigrants.
    pub rate: f64,
}

/// Validate an immigration rate.
pub fn check_immigration_rate(rate: f64) -> Result<f64, ConfigurationError> {
    if !(0.0..=1.0).contains(&rate) {
        return Err(ConfigurationError::InvalidParameter {
            name: "inmigrant_rate",
            value: rate,
            expected: "a rate within [0, 1]",
        });
    }
    Ok(rate)
}

/// Mix the residents' frequencies with immigrants from each source.
///
/// `snapshot` holds every population's frequencies at the start of the
/// generation, indexed like the simulation's populations. Returns `None` if
/// an immigration refers to an index outside the snapshot.
pub fn mix(
    residents: &GenotypicFreqs,
    immigrations: &[Immigration],
    snapshot: &[GenotypicFreqs],
) -> Option<GenotypicFreqs> {
    if immigrations.is_empty() {
        return Some(*residents);
    }

    let total_rate: f64 = immigrations.iter().map(|m| m.rate).sum();
    let resident_share = (1.0 - total_rate).max(0.0);

    let mut mixed = residents.freqs().map(|f| f * resident_share);
    for immigration in immigrations {
        let source = snapshot.get(immigration.source)?.freqs();
        for (acc, f) in mixed.iter_mut().zip(source) {
            *acc += immigration.rate * f;
        }
    }
    GenotypicFreqs::from_weights(mixed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    fn immigration(source: usize, rate: f64) -> Immigration {
        Immigration {
            migration_id: format!("from_{source}"),
            source,
            source_name: format!("pop{source}"),
            rate,
        }
    }

    #[test]
    fn test_no_immigration_keeps_residents() {
        let residents = GenotypicFreqs::new(0.25, 0.5, 0.25).unwrap();
        assert_eq!(mix(&residents, &[], &[]), Some(residents));
    }

    #[test]
    fn test_weighted_average() {
        let residents = GenotypicFreqs::new(0.25, 0.5, 0.25).unwrap();
        let snapshot = [residents, GenotypicFreqs::new(0.3, 0.0, 0.7).unwrap()];
        let mixed = mix(&residents, &[immigration(1, 0.1)], &snapshot).unwrap();
        assert!(approx_eq(mixed.freq_aa_hom(), 0.255));
        assert!(approx_eq(mixed.freq_het(), 0.45));
        assert!(approx_eq(mixed.allelic_freqs().A(), 0.48));
    }

    #[test]
    fn test_several_sources() {
        let residents = GenotypicFreqs::new(0.0, 0.0, 1.0).unwrap();
        let snapshot = [
            residents,
            GenotypicFreqs::new(1.0, 0.0, 0.0).unwrap(),
            GenotypicFreqs::new(0.0, 1.0, 0.0).unwrap(),
        ];
        let mixed = mix(
            &residents,
            &[immigration(1, 0.2), immigration(2, 0.4)],
            &snapshot,
        )
        .unwrap();
        assert!(approx_eq(mixed.freq_aa_hom(), 0.2));
        assert!(approx_eq(mixed.freq_het(), 0.4));
        assert!(approx_eq(mixed.freq_aa(), 0.4));
    }

    #[test]
    fn test_missing_source() {
        let residents = GenotypicFreqs::new(0.25, 0.5, 0.25).unwrap();
        assert!(mix(&residents, &[immigration(3, 0.1)], &[residents]).is_none());
    }

    #[test]
    fn test_rate_bounds() {
        assert!(check_immigration_rate(0.0).is_ok());
        assert!(check_immigration_rate(1.0).is_ok());
        assert!(check_immigration_rate(-0.1).is_err());
        assert!(check_immigration_rate(1.1).is_err());
    }
}
