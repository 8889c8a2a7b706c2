//! Base value types for the one-locus, two-allele model.
//!
//! This module provides the immutable frequency types and the population
//! size type shared by the evolutionary operators and the simulation engine.

mod freqs;
mod size;

pub use freqs::{AllelicFreqs, GenotypicFreqs, FREQ_TOLERANCE};
pub use size::PopSize;
