use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::selection::SelectionList;

/// Request body accepted by the segment endpoint.
///
/// Every `schema` entry is a single-key map from the field's wire key to its
/// label, e.g. `{"first_name": "First Name"}`. The receiving service expects
/// the label to travel with the key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentPayload {
    pub segment_name: String,
    pub schema: Vec<BTreeMap<String, String>>,
}

impl SegmentPayload {
    /// Wire keys in payload order.
    pub fn field_keys(&self) -> impl Iterator<Item = &str> {
        self.schema
            .iter()
            .flat_map(|entry| entry.keys().map(String::as_str))
    }
}

/// Validate a draft and derive its payload.
///
/// The name is checked first (blank after trimming is missing), then the
/// selection. The trimmed name is sent.
pub fn build(name: &str, selection: &SelectionList) -> Result<SegmentPayload> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::MissingName);
    }
    if selection.is_empty() {
        return Err(Error::EmptySelection);
    }

    let schema = selection
        .iter()
        .map(|field| BTreeMap::from([(field.key().to_string(), field.label().to_string())]))
        .collect();

    Ok(SegmentPayload {
        segment_name: name.to_string(),
        schema,
    })
}
