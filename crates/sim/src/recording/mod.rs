//! Loggers and the result tables they produce.

pub mod loggers;
pub mod results;

pub use loggers::{
    AllelicFreqsLogger, ExpHetLogger, GenotypicFreqsLogger, LoggerKind, PopSizeLogger,
    PopulationLogger,
};
pub use results::{GenerationTable, GenotypicFreqsTables, SimulationResults};
