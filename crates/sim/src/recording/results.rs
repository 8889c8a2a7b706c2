//! Logged time series.
//!
//! Every table is indexed by generation (row 0 is the founding state) and
//! holds one column per population, in the order the populations were
//! declared.

use crate::base::PopSize;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A per-generation table with one column per population.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationTable<T> {
    generations: Vec<usize>,
    columns: IndexMap<String, Vec<T>>,
}

impl<T> Default for GenerationTable<T> {
    fn default() -> Self {
        Self {
            generations: Vec::new(),
            columns: IndexMap::new(),
        }
    }
}

impl<T> GenerationTable<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the row for `generation`, one `(population, value)` pair per
    /// column.
    pub(crate) fn push_row<'a>(
        &mut self,
        generation: usize,
        row: impl IntoIterator<Item = (&'a str, T)>,
    ) {
        self.generations.push(generation);
        for (name, value) in row {
            match self.columns.get_mut(name) {
                Some(column) => column.push(value),
                None => {
                    self.columns.insert(name.to_string(), vec![value]);
                }
            }
        }
    }

    /// Logged generations, in row order.
    pub fn index(&self) -> &[usize] {
        &self.generations
    }

    pub fn num_rows(&self) -> usize {
        self.generations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.generations.is_empty()
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// The series logged for population `name`.
    pub fn column(&self, name: &str) -> Option<&[T]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    /// Value logged for population `name` at `generation`.
    pub fn value(&self, name: &str, generation: usize) -> Option<&T> {
        let row = self.generations.iter().position(|&g| g == generation)?;
        self.columns.get(name)?.get(row)
    }

    /// Last value logged for population `name`.
    pub fn last(&self, name: &str) -> Option<&T> {
        self.columns.get(name)?.last()
    }
}

/// The three genotypic frequency tables produced by the genotypic logger.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenotypicFreqsTables {
    #[serde(rename = "freqs_AA")]
    pub freqs_aa_hom: GenerationTable<f64>,
    #[serde(rename = "freqs_Aa")]
    pub freqs_het: GenerationTable<f64>,
    #[serde(rename = "freqs_aa")]
    pub freqs_aa: GenerationTable<f64>,
}

impl GenotypicFreqsTables {
    pub const LABELS: [&'static str; 3] = ["freqs_AA", "freqs_Aa", "freqs_aa"];

    /// Table for one of `freqs_AA`, `freqs_Aa` or `freqs_aa`.
    pub fn get(&self, label: &str) -> Option<&GenerationTable<f64>> {
        match label {
            "freqs_AA" => Some(&self.freqs_aa_hom),
            "freqs_Aa" => Some(&self.freqs_het),
            "freqs_aa" => Some(&self.freqs_aa),
            _ => None,
        }
    }
}

/// Everything recorded by a run, one entry per active logger.
///
/// Tables of loggers that were not requested are `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationResults {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    allelic_freqs: Option<GenerationTable<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    genotypic_freqs: Option<GenotypicFreqsTables>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expected_hets: Option<GenerationTable<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pop_sizes: Option<GenerationTable<PopSize>>,
}

impl SimulationResults {
    /// Frequency of allele A per generation and population.
    pub fn allelic_freqs(&self) -> Option<&GenerationTable<f64>> {
        self.allelic_freqs.as_ref()
    }

    pub fn genotypic_freqs(&self) -> Option<&GenotypicFreqsTables> {
        self.genotypic_freqs.as_ref()
    }

    /// Hardy-Weinberg expected heterozygosity per generation and population.
    pub fn expected_hets(&self) -> Option<&GenerationTable<f64>> {
        self.expected_hets.as_ref()
    }

    pub fn pop_sizes(&self) -> Option<&GenerationTable<PopSize>> {
        self.pop_sizes.as_ref()
    }

    pub(crate) fn set_allelic_freqs(&mut self, table: GenerationTable<f64>) {
        self.allelic_freqs = Some(table);
    }

    pub(crate) fn set_genotypic_freqs(&mut self, tables: GenotypicFreqsTables) {
        self.genotypic_freqs = Some(tables);
    }

    pub(crate) fn set_expected_hets(&mut self, table: GenerationTable<f64>) {
        self.expected_hets = Some(table);
    }

    pub(crate) fn set_pop_sizes(&mut self, table: GenerationTable<PopSize>) {
        self.pop_sizes = Some(table);
    }
}
