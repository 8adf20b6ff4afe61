//! Evidence/hypothesis node record.
//!
//! # Invariants
//! - `id` is immutable once assigned by the store.
//! - Patches merge only the fields they carry; `id` is not patchable.

use crate::model::validation::{validate_description, validate_prior, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable node identifier.
pub type NodeId = Uuid;

/// Canonical node record as held by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub description: String,
    /// Probability in `[0, 1]`; stored, never propagated.
    pub prior_probability: f64,
}

impl Node {
    /// Creates a node with a freshly generated id.
    pub fn new(description: impl Into<String>, prior_probability: f64) -> Self {
        Self::with_id(Uuid::new_v4(), description, prior_probability)
    }

    /// Creates a node with a caller-provided id.
    ///
    /// Used by snapshot/import paths where identity already exists.
    pub fn with_id(id: NodeId, description: impl Into<String>, prior_probability: f64) -> Self {
        Self {
            id,
            description: description.into(),
            prior_probability: unsigned_zero(prior_probability),
        }
    }

    /// Checks field-level invariants for this record.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_description(&self.description)?;
        validate_prior(self.prior_probability)
    }

    /// Merges the supplied patch fields into this record.
    pub fn apply(&mut self, patch: &NodePatch) {
        if let Some(description) = patch.description.as_ref() {
            self.description = description.clone();
        }
        if let Some(prior) = patch.prior_probability {
            self.prior_probability = unsigned_zero(prior);
        }
    }
}

fn unsigned_zero(prior: f64) -> f64 {
    if prior == 0.0 {
        0.0
    } else {
        prior
    }
}

/// Partial node update. Missing fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prior_probability: Option<f64>,
}

impl NodePatch {
    pub fn description(value: impl Into<String>) -> Self {
        Self {
            description: Some(value.into()),
            ..Self::default()
        }
    }

    pub fn prior(value: f64) -> Self {
        Self {
            prior_probability: Some(value),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.description.is_none() && self.prior_probability.is_none()
    }

    /// Validates only the fields present in the patch.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(description) = self.description.as_deref() {
            validate_description(description)?;
        }
        if let Some(prior) = self.prior_probability {
            validate_prior(prior)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Node, NodePatch};

    #[test]
    fn apply_keeps_unpatched_fields() {
        let mut node = Node::new("Rain", 0.456);
        node.apply(&NodePatch::description("Storm"));
        assert_eq!(node.description, "Storm");
        assert_eq!(node.prior_probability.to_bits(), 0.456f64.to_bits());
    }

    #[test]
    fn patch_ignores_id_in_body() {
        let patch: NodePatch =
            serde_json::from_str(r#"{"id":"not-a-uuid","description":"x"}"#).unwrap();
        assert_eq!(patch, NodePatch::description("x"));
    }

    #[test]
    fn negative_zero_prior_is_stored_as_zero() {
        let node = Node::new("Calm", -0.0);
        assert!(node.prior_probability.is_sign_positive());

        let mut patched = Node::new("Calm", 0.4);
        patched.apply(&NodePatch::prior(-0.0));
        assert_eq!(patched.prior_probability.to_bits(), 0.0f64.to_bits());
    }
}
