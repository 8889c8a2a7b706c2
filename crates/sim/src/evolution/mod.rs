//! Evolutionary forces acting on a single biallelic locus.
//!
//! This module implements the per-generation operators, applied in this
//! order by `Population`:
//! - **Selection**: genotype-specific relative fitness
//! - **Reproduction**: random mating mixed with self-fertilisation
//! - **Mutation**: recurrent A ↔ a conversion
//! - **Migration**: immigrants from other populations
//! - **Drift**: multinomial sampling in finite populations

pub mod drift;
pub mod migration;
pub mod mutation;
pub mod reproduction;
pub mod selection;

pub use drift::sample_genotypes;
pub use migration::Immigration;
pub use mutation::{MutRates, MAX_MUT_RATE};
pub use reproduction::SelfingRate;
pub use selection::Fitness;
