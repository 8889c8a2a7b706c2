use thiserror::Error;

/// Error returned when genotypic or allelic frequencies are malformed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// The three genotypic frequencies do not add up to one.
    #[error("genotypic frequencies must sum to 1, got {sum} (AA={aa_hom}, Aa={het}, aa={aa})")]
    FreqsDontSumToOne {
        aa_hom: f64,
        het: f64,
        aa: f64,
        sum: f64,
    },

    /// A single frequency lies outside [0, 1].
    #[error("frequency {name} must be within [0, 1], got {value}")]
    FreqOutOfRange { name: &'static str, value: f64 },

    /// A frequency is NaN or infinite.
    #[error("frequency {name} is not a finite number")]
    NonFiniteFreq { name: &'static str },
}

/// Errors caused by an invalid simulation setup.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    #[error("no populations defined")]
    NoPopulations,

    #[error("population '{0}' is defined more than once")]
    DuplicatePopulation(String),

    #[error("demographic event '{0}' is defined more than once")]
    DuplicateEvent(String),

    #[error("population '{0}': either freq_A or genotypic_freqs can be set, but not both")]
    ConflictingFreqs(String),

    #[error("demographic event '{event}' references unknown population '{pop}'")]
    UnknownPopulation { event: String, pop: String },

    #[error("demographic event '{event}' references unknown migration '{migration}'")]
    UnknownMigration { event: String, migration: String },

    #[error("demographic event '{event}' stops migration '{migration}' at generation {stop}, before it starts at generation {start}")]
    StopBeforeStart {
        event: String,
        migration: String,
        start: usize,
        stop: usize,
    },

    #[error("migration '{migration}' is not active and cannot be stopped")]
    MigrationNotActive { migration: String },

    #[error("migration '{0}' goes from a population into itself")]
    SelfMigration(String),

    #[error("total immigration rate into population '{pop}' would be {total}, which exceeds 1")]
    ExcessImmigration { pop: String, total: f64 },

    #[error("invalid parameter {name}: {value} (expected {expected})")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        expected: &'static str,
    },

    #[error("missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("invalid population size: {0}")]
    InvalidSize(String),

    #[error("failed to read configuration: {0}")]
    Io(String),

    #[error("failed to parse configuration: {0}")]
    Parse(String),

    #[error("simulation has already been run")]
    AlreadyRun,
}

impl From<std::io::Error> for ConfigurationError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

impl From<serde_json::Error> for ConfigurationError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e.to_string())
    }
}

/// Numerical failures encountered while evolving a population.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NumericalError {
    /// Every genotype present in the population has zero fitness.
    #[error("mean fitness is zero, every genotype present is lethal")]
    ZeroMeanFitness,

    /// A sampling probability fell outside `[0, 1]`.
    #[error("sampling probability {0} is not within [0, 1]")]
    InvalidProbability(f64),
}

/// Crate-level error returned by the simulation driver.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("population '{pop}': {source}")]
    Numerical {
        pop: String,
        #[source]
        source: NumericalError,
    },
}
