// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Table builders - project resolved records into decoded label/value rows

mod identification;
mod property_set;

pub use identification::{build_identification, MATERIAL_LABEL, TYPE_NAME_LABEL};
pub use property_set::{build_property_set, property_set_rows, IDENTIFICATION_TARGET};

use crate::record::AttributeValue;
use crate::text::decode_ifc_string;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Placeholder for values that are missing or have an unexpected shape
pub const UNKNOWN: &str = "Unknown";

/// One decoded table row
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Row {
    pub label: String,
    pub value: String,
}

impl Row {
    /// Row from already decoded text
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }

    /// Build a row from raw attribute text, decoding both sides
    pub fn decoded(label: &str, value: &str) -> Self {
        Self {
            label: decode_ifc_string(label).into_owned(),
            value: decode_ifc_string(value).into_owned(),
        }
    }
}

/// Raw text of an attribute's `{value}` payload, if it has one
fn wrapped_text(value: Option<&AttributeValue>) -> Option<String> {
    value.and_then(|v| v.as_wrapped()).map(|s| s.to_string())
}
