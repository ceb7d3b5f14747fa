// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the inspector binary.

use thiserror::Error;

/// Inspector error types.
#[derive(Debug, Error)]
pub enum InspectorError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid model dump: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid record: {0}")]
    Record(String),

    #[error("Invalid argument: {0}")]
    Usage(String),

    #[error(transparent)]
    Core(#[from] ifc_inspector_core::Error),
}
