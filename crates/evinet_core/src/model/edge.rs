//! Weighted inference edge record.

use crate::model::node::NodeId;
use crate::model::validation::{validate_weight, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable edge identifier.
pub type EdgeId = Uuid;

/// Directed, weighted relation between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    pub weight: f64,
}

impl Edge {
    pub fn new(source: NodeId, target: NodeId, weight: f64) -> Self {
        Self::with_id(Uuid::new_v4(), source, target, weight)
    }

    pub fn with_id(id: EdgeId, source: NodeId, target: NodeId, weight: f64) -> Self {
        Self {
            id,
            source,
            target,
            weight,
        }
    }

    /// Returns whether `node_id` is either endpoint of this edge.
    pub fn touches(&self, node_id: NodeId) -> bool {
        self.source == node_id || self.target == node_id
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_weight(self.weight)
    }

    pub fn apply(&mut self, patch: &EdgePatch) {
        if let Some(source) = patch.source {
            self.source = source;
        }
        if let Some(target) = patch.target {
            self.target = target;
        }
        if let Some(weight) = patch.weight {
            self.weight = weight;
        }
    }
}

/// Partial edge update. Missing fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<NodeId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<NodeId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

impl EdgePatch {
    pub fn weight(value: f64) -> Self {
        Self {
            weight: Some(value),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.source.is_none() && self.target.is_none() && self.weight.is_none()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(weight) = self.weight {
            validate_weight(weight)?;
        }
        Ok(())
    }

    /// Endpoints this patch would re-point the edge to.
    pub fn endpoints(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.source.iter().chain(self.target.iter()).copied()
    }
}
