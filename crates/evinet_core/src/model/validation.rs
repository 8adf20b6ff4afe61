//! Mutation-boundary validation rules.

use crate::model::node::NodeId;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Input rejected before any store mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Node description is blank after trim.
    EmptyDescription,
    /// Prior is outside `[0, 1]` or not a finite number.
    PriorOutOfRange(f64),
    /// Edge weight is NaN or infinite.
    NonFiniteWeight(f64),
    /// Edge endpoint does not reference a stored node.
    UnknownEndpoint(NodeId),
    /// Network name is blank after trim.
    EmptyNetworkName,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyDescription => write!(f, "description must not be blank"),
            Self::PriorOutOfRange(value) => {
                write!(f, "prior_probability must be within [0, 1], got {value}")
            }
            Self::NonFiniteWeight(value) => {
                write!(f, "weight must be a finite number, got {value}")
            }
            Self::UnknownEndpoint(id) => write!(f, "edge endpoint node not found: {id}"),
            Self::EmptyNetworkName => write!(f, "network name must not be blank"),
        }
    }
}

impl Error for ValidationError {}

pub fn validate_description(description: &str) -> Result<(), ValidationError> {
    if description.trim().is_empty() {
        return Err(ValidationError::EmptyDescription);
    }
    Ok(())
}

pub fn validate_prior(prior: f64) -> Result<(), ValidationError> {
    // NaN fails both comparisons, so it is rejected here too.
    if !(0.0..=1.0).contains(&prior) {
        return Err(ValidationError::PriorOutOfRange(prior));
    }
    Ok(())
}

pub fn validate_weight(weight: f64) -> Result<(), ValidationError> {
    if !weight.is_finite() {
        return Err(ValidationError::NonFiniteWeight(weight));
    }
    Ok(())
}

pub fn validate_network_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::EmptyNetworkName);
    }
    Ok(())
}
