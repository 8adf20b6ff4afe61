//! JSON file interchange for the canvas projection.
//!
//! # Responsibility
//! - Serialize the confirmed projection as one JSON array of tagged elements.
//! - Parse such a document and replace the projection wholesale.
//!
//! # Invariants
//! - A failed import leaves the projection untouched.
//! - Imported labels are regenerated; selection is cleared on success.

use crate::mapper::{Element, ElementKey};
use crate::reconciler::Projection;
use log::{info, warn};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum InterchangeError {
    /// Projection could not be encoded.
    Encode(serde_json::Error),
    /// Input is not a valid element document.
    Malformed(serde_json::Error),
    /// The same `(kind, id)` appears more than once.
    DuplicateElement(ElementKey),
}

impl Display for InterchangeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Encode(err) => write!(f, "cannot encode projection: {err}"),
            Self::Malformed(err) => write!(f, "malformed graph document: {err}"),
            Self::DuplicateElement(key) => write!(f, "duplicate element in document: {key}"),
        }
    }
}

impl Error for InterchangeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Encode(err) | Self::Malformed(err) => Some(err),
            Self::DuplicateElement(_) => None,
        }
    }
}

/// Serializes confirmed elements, nodes and edges intermixed, in order.
pub fn export_projection(projection: &Projection) -> Result<String, InterchangeError> {
    let elements: Vec<&Element> = projection.confirmed_elements().collect();
    serde_json::to_string_pretty(&elements).map_err(InterchangeError::Encode)
}

/// Parses a document into elements without touching any projection.
pub fn parse_document(json: &str) -> Result<Vec<Element>, InterchangeError> {
    let elements: Vec<Element> = serde_json::from_str(json).map_err(InterchangeError::Malformed)?;
    let mut seen = HashSet::with_capacity(elements.len());
    for element in &elements {
        if !seen.insert(element.key()) {
            return Err(InterchangeError::DuplicateElement(element.key()));
        }
    }
    Ok(elements)
}

/// Replaces `projection` with the document's elements.
///
/// Returns the number of imported elements.
pub fn import_projection(projection: &mut Projection, json: &str) -> Result<usize, InterchangeError> {
    let elements = match parse_document(json) {
        Ok(elements) => elements,
        Err(err) => {
            warn!("event=projection_import module=interchange status=error error={err}");
            return Err(err);
        }
    };
    let count = elements.len();
    projection.replace_elements(elements);
    info!("event=projection_import module=interchange status=ok elements={count}");
    Ok(count)
}
