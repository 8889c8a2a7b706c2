//! Per-generation observers.
//!
//! A logger is invoked once for the founding generation and once after every
//! transition. It reads the populations without changing them and appends a
//! row to its own tables; `export` copies those tables into the run's
//! `SimulationResults`.

use super::results::{GenerationTable, GenotypicFreqsTables, SimulationResults};
use crate::base::PopSize;
use crate::simulation::Population;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The loggers a configuration can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoggerKind {
    #[serde(rename = "allelic_freqs_logger")]
    AllelicFreqs,
    #[serde(rename = "genotypic_freqs_logger")]
    GenotypicFreqs,
    #[serde(rename = "exp_het_logger")]
    ExpectedHet,
    #[serde(rename = "pop_size_logger")]
    PopSize,
}

impl LoggerKind {
    pub const ALL: [LoggerKind; 4] = [
        Self::AllelicFreqs,
        Self::GenotypicFreqs,
        Self::ExpectedHet,
        Self::PopSize,
    ];

    /// Loggers used when a configuration does not name any.
    pub fn default_set() -> Vec<LoggerKind> {
        vec![Self::AllelicFreqs, Self::GenotypicFreqs, Self::ExpectedHet]
    }

    /// Configuration name of this logger.
    pub fn name(self) -> &'static str {
        match self {
            Self::AllelicFreqs => "allelic_freqs_logger",
            Self::GenotypicFreqs => "genotypic_freqs_logger",
            Self::ExpectedHet => "exp_het_logger",
            Self::PopSize => "pop_size_logger",
        }
    }

    /// A fresh logger of this kind.
    pub fn build(self) -> Box<dyn PopulationLogger> {
        match self {
            Self::AllelicFreqs => Box::new(AllelicFreqsLogger::default()),
            Self::GenotypicFreqs => Box::new(GenotypicFreqsLogger::default()),
            Self::ExpectedHet => Box::new(ExpHetLogger::default()),
            Self::PopSize => Box::new(PopSizeLogger::default()),
        }
    }
}

impl fmt::Display for LoggerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Records one metric for every population, generation by generation.
pub trait PopulationLogger: fmt::Debug {
    fn kind(&self) -> LoggerKind;

    /// Record the state of `pops` at `generation`.
    fn log(&mut self, generation: usize, pops: &[Population]);

    /// Copy the recorded tables into `results`.
    fn export(&self, results: &mut SimulationResults);
}

/// Frequency of allele A.
#[derive(Debug, Default)]
pub struct AllelicFreqsLogger {
    table: GenerationTable<f64>,
}

impl PopulationLogger for AllelicFreqsLogger {
    fn kind(&self) -> LoggerKind {
        LoggerKind::AllelicFreqs
    }

    fn log(&mut self, generation: usize, pops: &[Population]) {
        self.table.push_row(
            generation,
            pops.iter().map(|pop| (pop.name(), pop.allelic_freqs().A())),
        );
    }

    fn export(&self, results: &mut SimulationResults) {
        results.set_allelic_freqs(self.table.clone());
    }
}

/// Frequencies of AA, Aa and aa as three parallel tables.
#[derive(Debug, Default)]
pub struct GenotypicFreqsLogger {
    tables: GenotypicFreqsTables,
}

impl PopulationLogger for GenotypicFreqsLogger {
    fn kind(&self) -> LoggerKind {
        LoggerKind::GenotypicFreqs
    }

    fn log(&mut self, generation: usize, pops: &[Population]) {
        let freqs = |i: usize| {
            pops.iter()
                .map(move |pop| (pop.name(), pop.genotypic_freqs().freqs()[i]))
        };
        self.tables.freqs_aa_hom.push_row(generation, freqs(0));
        self.tables.freqs_het.push_row(generation, freqs(1));
        self.tables.freqs_aa.push_row(generation, freqs(2));
    }

    fn export(&self, results: &mut SimulationResults) {
        results.set_genotypic_freqs(self.tables.clone());
    }
}

/// Expected heterozygosity `2·A·(1-A)`, not the observed Aa frequency.
#[derive(Debug, Default)]
pub struct ExpHetLogger {
    table: GenerationTable<f64>,
}

impl PopulationLogger for ExpHetLogger {
    fn kind(&self) -> LoggerKind {
        LoggerKind::ExpectedHet
    }

    fn log(&mut self, generation: usize, pops: &[Population]) {
        self.table.push_row(
            generation,
            pops.iter().map(|pop| (pop.name(), pop.expected_heterozygosity())),
        );
    }

    fn export(&self, results: &mut SimulationResults) {
        results.set_expected_hets(self.table.clone());
    }
}

/// Census size, `PopSize::Infinite` for populations without drift.
#[derive(Debug, Default)]
pub struct PopSizeLogger {
    table: GenerationTable<PopSize>,
}

impl PopulationLogger for PopSizeLogger {
    fn kind(&self) -> LoggerKind {
        LoggerKind::PopSize
    }

    fn log(&mut self, generation: usize, pops: &[Population]) {
        self.table
            .push_row(generation, pops.iter().map(|pop| (pop.name(), pop.size())));
    }

    fn export(&self, results: &mut SimulationResults) {
        results.set_pop_sizes(self.table.clone());
    }
}
