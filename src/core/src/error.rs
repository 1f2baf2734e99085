use std::error::Error;
use std::fmt;

use crate::simulator::MAX_SIMULATIONS;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimulationError {
    /// `num_simulations` outside the accepted range.
    InvalidSimulationCount { requested: usize },
    /// The cancel token was observed set; no partial result exists.
    Cancelled,
}

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationError::InvalidSimulationCount { requested } => write!(
                f,
                "num_simulations must be between 1 and {}, got {}",
                MAX_SIMULATIONS, requested
            ),
            SimulationError::Cancelled => write!(f, "simulation cancelled"),
        }
    }
}

impl Error for SimulationError {}
