//! Simulation configuration.
//!
//! A `SimulationConfig` can be deserialized from JSON to fully describe a
//! run: the populations, the number of generations, the demographic events
//! and the loggers to activate. It is validated once, when the simulation is
//! built from it.

use crate::base::{GenotypicFreqs, PopSize};
use crate::errors::{ConfigurationError, SimulationError};
use crate::evolution::{Fitness, MutRates, SelfingRate};
use crate::recording::LoggerKind;
use crate::simulation::{DemographicEvent, Population};
use indexmap::IndexMap;
use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::marker::PhantomData;
use std::path::Path;

/// Allelic frequency of A used when a population gives no frequencies.
pub const DEFAULT_FREQ_A: f64 = 0.5;

/// The master configuration of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Populations by name, in declaration order
    #[serde(deserialize_with = "unique_keys")]
    pub pops: IndexMap<String, PopulationConfig>,
    /// Number of logged generations, including the founding one
    pub num_generations: usize,
    /// Demographic events by id
    #[serde(default, deserialize_with = "unique_keys")]
    pub demographic_events: IndexMap<String, DemographicEvent>,
    #[serde(default = "LoggerKind::default_set")]
    pub loggers: Vec<LoggerKind>,
    /// Seed of the random number generator, entropy when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl SimulationConfig {
    /// A configuration without events, using the default loggers.
    pub fn new(pops: IndexMap<String, PopulationConfig>, num_generations: usize) -> Self {
        Self {
            pops,
            num_generations,
            demographic_events: IndexMap::new(),
            loggers: LoggerKind::default_set(),
            seed: None,
        }
    }

    /// Parse a configuration from a JSON string.
    ///
    /// # Errors
    /// Returns [`ConfigurationError::Parse`] if the JSON is malformed or does
    /// not describe a valid configuration.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigurationError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a configuration from a JSON file.
    ///
    /// # Errors
    /// Returns [`ConfigurationError::Io`] if the file cannot be read, or
    /// [`ConfigurationError::Parse`] if its content is not valid.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigurationError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn to_json_string(&self) -> Result<String, ConfigurationError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Build the populations in declaration order.
    pub fn build_populations(&self) -> Result<Vec<Population>, SimulationError> {
        if self.pops.is_empty() {
            return Err(ConfigurationError::NoPopulations.into());
        }
        self.pops
            .iter()
            .map(|(name, pop)| pop.to_population(name))
            .collect()
    }

    /// Demographic events as `(id, event)` pairs in declaration order.
    pub fn events(&self) -> Vec<(String, DemographicEvent)> {
        self.demographic_events
            .iter()
            .map(|(id, event)| (id.clone(), event.clone()))
            .collect()
    }
}

/// Deserialize a JSON object into an `IndexMap`, failing on a repeated key
/// instead of keeping the last value.
fn unique_keys<'de, D, V>(deserializer: D) -> Result<IndexMap<String, V>, D::Error>
where
    D: Deserializer<'de>,
    V: Deserialize<'de>,
{
    struct UniqueKeys<V>(PhantomData<V>);

    impl<'de, V: Deserialize<'de>> Visitor<'de> for UniqueKeys<V> {
        type Value = IndexMap<String, V>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map with unique keys")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
            let mut map = IndexMap::with_capacity(access.size_hint().unwrap_or(0));
            while let Some(key) = access.next_key::<String>()? {
                if map.contains_key(&key) {
                    return Err(de::Error::custom(format_args!("duplicate key '{key}'")));
                }
                let value = access.next_value()?;
                map.insert(key, value);
            }
            Ok(map)
        }
    }

    deserializer.deserialize_map(UniqueKeys(PhantomData))
}

/// Starting genotypic frequencies: `[AA, Aa, aa]`, or `[AA, Aa]` with `aa`
/// inferred.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InitialGenotypicFreqs {
    Explicit([f64; 3]),
    Inferred([f64; 2]),
}

impl InitialGenotypicFreqs {
    fn to_genotypic_freqs(self) -> Result<GenotypicFreqs, SimulationError> {
        let freqs = match self {
            Self::Explicit([aa_hom, het, aa]) => GenotypicFreqs::new(aa_hom, het, aa),
            Self::Inferred([aa_hom, het]) => GenotypicFreqs::from_aa_hom_and_het(aa_hom, het),
        };
        Ok(freqs?)
    }
}

/// Configuration of one population.
///
/// Either `genotypic_freqs` or `freq_A` may be given; with neither the
/// population starts in Hardy-Weinberg proportions at `freq_A = 0.5`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PopulationConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genotypic_freqs: Option<InitialGenotypicFreqs>,
    #[serde(rename = "freq_A", default, skip_serializing_if = "Option::is_none")]
    pub freq_a: Option<f64>,
    #[serde(default)]
    pub size: PopSize,
    #[serde(default)]
    pub fitness: Fitness,
    #[serde(default)]
    pub mut_rates: MutRates,
    #[serde(default)]
    pub selfing_rate: SelfingRate,
}

impl PopulationConfig {
    /// Start from explicit genotypic frequencies.
    pub fn from_genotypic_freqs(freq_aa_hom: f64, freq_het: f64, freq_aa: f64) -> Self {
        Self {
            genotypic_freqs: Some(InitialGenotypicFreqs::Explicit([
                freq_aa_hom,
                freq_het,
                freq_aa,
            ])),
            ..Self::default()
        }
    }

    /// Start in Hardy-Weinberg proportions for the allelic frequency of A.
    pub fn from_freq_a(freq_a_allele: f64) -> Self {
        Self {
            freq_a: Some(freq_a_allele),
            ..Self::default()
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

    /// Founding genotypic frequencies of the population `name`.
    ///
    /// # Errors
    /// Fails if both `freq_A` and `genotypic_freqs` are set, or if the
    /// frequencies are invalid.
    pub fn initial_freqs(&self, name: &str) -> Result<GenotypicFreqs, SimulationError> {
        match (self.genotypic_freqs, self.freq_a) {
            (Some(_), Some(_)) => Err(ConfigurationError::ConflictingFreqs(name.to_string()).into()),
            (Some(freqs), None) => freqs.to_genotypic_freqs(),
            (None, Some(p)) => Ok(GenotypicFreqs::hardy_weinberg(p)?),
            (None, None) => Ok(GenotypicFreqs::hardy_weinberg(DEFAULT_FREQ_A)?),
        }
    }

    /// Build the population `name` from this configuration.
    pub fn to_population(&self, name: &str) -> Result<Population, SimulationError> {
        Ok(Population::new(name, self.initial_freqs(name)?)
            .with_size(self.size)
            .with_fitness(self.fitness)
            .with_mut_rates(self.mut_rates)
            .with_selfing_rate(self.selfing_rate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ValidationError;

    #[test]
    fn test_parse_full_config() {
        let json = r#"{
            "pops": {
                "pop1": {"genotypic_freqs": [0.5, 0.0, 0.5], "size": "inf"},
                "pop2": {"genotypic_freqs": [0.3, 0.0], "size": 100,
                         "fitness": [1, 1, 0.5], "mut_rates": [0.001, 0.002],
                         "selfing_rate": 0.25}
            },
            "num_generations": 2,
            "demographic_events": {
                "mig": {"type": "migration_start", "from_pop": "pop2", "to_pop": "pop1",
                        "inmigrant_rate": 0.1, "num_generation": 2},
                "stop": {"type": "migration_stop", "migration_id": "mig", "num_generation": 20}
            },
            "loggers": ["allelic_freqs_logger", "pop_size_logger"],
            "seed": 7
        }"#;
        let config = SimulationConfig::from_json_str(json).unwrap();
        assert_eq!(config.num_generations, 2);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.loggers, [LoggerKind::AllelicFreqs, LoggerKind::PopSize]);
        let ids: Vec<&String> = config.demographic_events.keys().collect();
        assert_eq!(ids, ["mig", "stop"]);

        let pops = config.build_populations().unwrap();
        assert_eq!(pops[0].name(), "pop1");
        assert!(pops[0].size().is_infinite());
        assert_eq!(pops[1].genotypic_freqs().freqs(), [0.3, 0.0, 0.7]);
        assert_eq!(pops[1].size().get(), Some(100));
        assert_eq!(pops[1].fitness().w_aa(), 0.5);
        assert_eq!(pops[1].mut_rates().a2A(), 0.002);
        assert_eq!(pops[1].selfing_rate().get(), 0.25);
    }

    #[test]
    fn test_defaults() {
        let config =
            SimulationConfig::from_json_str(r#"{"pops": {"pop1": {}}, "num_generations": 5}"#)
                .unwrap();
        assert_eq!(config.loggers, LoggerKind::default_set());
        assert!(config.demographic_events.is_empty());
        assert!(config.seed.is_none());

        let pop = config.build_populations().unwrap().remove(0);
        assert_eq!(pop.genotypic_freqs().freqs(), [0.25, 0.5, 0.25]);
        assert!(pop.size().is_infinite());
        assert!(pop.fitness().is_neutral());
    }

    #[test]
    fn test_freq_a_uses_hardy_weinberg() {
        let pop = PopulationConfig::from_freq_a(0.3)
            .to_population("pop1")
            .unwrap();
        let freqs = pop.genotypic_freqs().freqs();
        assert!((freqs[0] - 0.09).abs() < 1e-12);
        assert!((freqs[1] - 0.42).abs() < 1e-12);
    }

    #[test]
    fn test_conflicting_freqs() {
        let config = PopulationConfig {
            freq_a: Some(0.5),
            ..PopulationConfig::from_genotypic_freqs(0.5, 0.0, 0.5)
        };
        assert_eq!(
            config.initial_freqs("pop1"),
            Err(SimulationError::Configuration(
                ConfigurationError::ConflictingFreqs("pop1".into())
            ))
        );
    }

    #[test]
    fn test_invalid_freqs_are_validation_errors() {
        let config = PopulationConfig::from_genotypic_freqs(0.5, 0.5, 0.5);
        assert!(matches!(
            config.initial_freqs("pop1"),
            Err(SimulationError::Validation(ValidationError::FreqsDontSumToOne { .. }))
        ));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            SimulationConfig::from_json_str(r#"{"pops": {}, "num_generations": -1}"#),
            Err(ConfigurationError::Parse(_))
        ));
        assert!(matches!(
            SimulationConfig::from_json_str(
                r#"{"pops": {"p": {"mut_rates": [0.5, 0.0]}}, "num_generations": 3}"#
            ),
            Err(ConfigurationError::Parse(_))
        ));
        assert!(matches!(
            SimulationConfig::from_path("/definitely/not/here.json"),
            Err(ConfigurationError::Io(_))
        ));
    }

    #[test]
    fn test_duplicate_keys_are_rejected() {
        let err = SimulationConfig::from_json_str(
            r#"{"pops": {"pop1": {"freq_A": 0.1}, "pop1": {"freq_A": 0.9}},
                "num_generations": 3}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigurationError::Parse(ref msg) if msg.contains("'pop1'")));

        let err = SimulationConfig::from_json_str(
            r#"{"pops": {"pop1": {}, "pop2": {}}, "num_generations": 3,
                "demographic_events": {
                    "m": {"type": "migration_start", "from_pop": "pop1", "to_pop": "pop2",
                          "inmigrant_rate": 0.1, "num_generation": 2},
                    "m": {"type": "size_change", "pop": "pop1", "new_size": 10,
                          "num_generation": 3}}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigurationError::Parse(ref msg) if msg.contains("'m'")));
    }

    #[test]
    fn test_no_populations() {
        let config = SimulationConfig::new(IndexMap::new(), 3);
        assert_eq!(
            config.build_populations(),
            Err(SimulationError::Configuration(ConfigurationError::NoPopulations))
        );
    }

    #[test]
    fn test_json_round_trip() {
        let mut pops = IndexMap::new();
        pops.insert(
            "pop1".to_string(),
            PopulationConfig::from_freq_a(0.2).with_size(PopSize::finite(30).unwrap()),
        );
        let config = SimulationConfig::new(pops, 10);
        let json = config.to_json_string().unwrap();
        assert_eq!(SimulationConfig::from_json_str(&json).unwrap(), config);
    }
}
