// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::record::{ExpressId, ModelId};

/// Per-build inputs owned by the caller: which model, which element.
///
/// A newer selection gets a new context; builds started with an older one
/// keep running against the old selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildContext {
    pub model_id: ModelId,
    pub selected: Option<ExpressId>,
}

impl BuildContext {
    pub fn new(model_id: ModelId) -> Self {
        Self {
            model_id,
            selected: None,
        }
    }

    /// Context for a new selection in the same model
    pub fn select(self, express_id: ExpressId) -> Self {
        Self {
            selected: Some(express_id),
            ..self
        }
    }
}
