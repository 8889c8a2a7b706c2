//! Population census size, finite or infinite.

use crate::errors::ConfigurationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU64;
use std::str::FromStr;

/// Census size of a population.
///
/// An `Infinite` population is an idealised one with no drift: its
/// frequencies follow the deterministic recursion exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "SizeRepr", into = "SizeRepr")]
pub enum PopSize {
    /// A finite number of diploid individuals.
    Finite(NonZeroU64),
    /// No sampling noise.
    #[default]
    Infinite,
}

impl PopSize {
    /// Create a finite population size.
    ///
    /// # Errors
    /// Returns an error if `size` is zero.
    pub fn finite(size: u64) -> Result<Self, ConfigurationError> {
        NonZeroU64::new(size)
            .map(Self::Finite)
            .ok_or_else(|| ConfigurationError::InvalidSize("size must be positive".into()))
    }

    /// Number of individuals, or `None` for an infinite population.
    pub fn get(self) -> Option<u64> {
        match self {
            Self::Finite(n) => Some(n.get()),
            Self::Infinite => None,
        }
    }

    pub fn is_infinite(self) -> bool {
        matches!(self, Self::Infinite)
    }
}

impl fmt::Display for PopSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Finite(n) => write!(f, "{n}"),
            Self::Infinite => write!(f, "inf"),
        }
    }
}

impl FromStr for PopSize {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "inf" | "inf." | "infinite" => Ok(Self::Infinite),
            other => {
                let size = other
                    .parse::<u64>()
                    .map_err(|_| ConfigurationError::InvalidSize(format!("'{other}'")))?;
                Self::finite(size)
            }
        }
    }
}

/// Wire form: an integer, or one of the strings accepted by `FromStr`.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum SizeRepr {
    Count(u64),
    Named(String),
}

impl TryFrom<SizeRepr> for PopSize {
    type Error = ConfigurationError;

    fn try_from(repr: SizeRepr) -> Result<Self, Self::Error> {
        match repr {
            SizeRepr::Count(n) => Self::finite(n),
            SizeRepr::Named(s) => s.parse(),
        }
    }
}

impl From<PopSize> for SizeRepr {
    fn from(size: PopSize) -> Self {
        match size {
            PopSize::Finite(n) => SizeRepr::Count(n.get()),
            PopSize::Infinite => SizeRepr::Named("inf".into()),
        }
    }
}
