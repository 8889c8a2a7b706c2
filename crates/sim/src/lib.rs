//! # Simulation Crate
//!
//! The `sim` crate provides a discrete-generation, forward-in-time simulator
//! for one locus with two alleles (A and a). One or more populations evolve
//! under selection, selfing, mutation, migration and drift, while a scheduler
//! applies demographic events (size changes, migration start and stop) and
//! loggers record allelic frequencies, genotypic frequencies, expected
//! heterozygosity and population sizes generation by generation.

pub mod base;
pub mod errors;
pub mod evolution;
pub mod prelude;
pub mod recording;
pub mod simulation;

pub use base::{AllelicFreqs, GenotypicFreqs, PopSize};
pub use simulation::{OneLocusTwoAlleleSimulation, SimulationConfig};
