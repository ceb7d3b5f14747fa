// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::record::{ExpressId, ModelId};
use thiserror::Error;

/// Result type for resolution and table building
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the model store and the resolution pipeline
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Entity #{express_id} not found in model {model_id}")]
    NotFound {
        model_id: ModelId,
        express_id: ExpressId,
    },

    #[error("Model {0} is not loaded")]
    ModelNotFound(ModelId),

    #[error("Model {0} has no spatial structure")]
    MissingSpatialStructure(ModelId),

    #[error("No element selected")]
    NoSelection,

    #[error("Model store error: {0}")]
    Store(String),
}

impl Error {
    /// Lookup failure for a single element
    pub fn not_found(model_id: ModelId, express_id: ExpressId) -> Self {
        Error::NotFound {
            model_id,
            express_id,
        }
    }

    /// Whether the error is a failed lookup (element or whole model)
    pub fn is_lookup(&self) -> bool {
        matches!(self, Error::NotFound { .. } | Error::ModelNotFound(_))
    }
}
