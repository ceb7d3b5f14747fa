// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Navigation list shown next to an element's tables

use crate::merge::ResolvedElement;
use crate::record::ExpressId;
use crate::table::{IDENTIFICATION_TARGET, UNKNOWN};
use crate::text::decode_ifc_string;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub const IDENTIFICATION_LABEL: &str = "Identification";

/// One entry of the navigation list
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NavItem {
    pub label: String,
    /// Id to pass to `build_property_set`
    pub target: ExpressId,
}

/// `Identification` first, then one entry per property set.
/// Sets without a usable id are left out.
pub fn navigation(element: &ResolvedElement) -> Vec<NavItem> {
    let mut items = Vec::with_capacity(element.psets.len() + 1);
    items.push(NavItem {
        label: IDENTIFICATION_LABEL.to_string(),
        target: IDENTIFICATION_TARGET,
    });

    for pset in &element.psets {
        let Some(target) = pset.express_id() else {
            tracing::debug!("Property set without expressID left out of navigation");
            continue;
        };
        let label = match pset.name() {
            Some(name) => decode_ifc_string(&name.to_string()).into_owned(),
            None => UNKNOWN.to_string(),
        };
        items.push(NavItem { label, target });
    }

    items
}
