// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Property and quantity set tables

use super::{build_identification, wrapped_text, Row, UNKNOWN};
use crate::context::BuildContext;
use crate::error::{Error, Result};
use crate::merge::{fetch_property_set, merge_element};
use crate::record::{attr, ElementRecord, ExpressId};
use crate::store::ModelStore;

/// Table id that stands for "identification of the selected element"
pub const IDENTIFICATION_TARGET: ExpressId = 0;

/// Rows for one navigation target.
///
/// [`IDENTIFICATION_TARGET`] builds the identification table of the
/// context's selected element; any other id is fetched and merged as a
/// property or quantity set.
pub async fn build_property_set<S: ModelStore + ?Sized>(
    store: &S,
    ctx: &BuildContext,
    property_set_id: ExpressId,
) -> Result<Vec<Row>> {
    if property_set_id == IDENTIFICATION_TARGET {
        let element_id = ctx.selected.ok_or(Error::NoSelection)?;
        let element = merge_element(store, ctx.model_id, element_id).await?;
        return Ok(build_identification(&element));
    }

    let merged = fetch_property_set(store, ctx.model_id, property_set_id).await?;
    let rows = property_set_rows(&merged);
    tracing::debug!(
        model_id = ctx.model_id,
        property_set_id,
        rows = rows.len(),
        "Built property set table"
    );
    Ok(rows)
}

/// Rows of an already merged property or quantity set.
///
/// Simple properties come first, then quantities. A quantity with resolved
/// `HasQuantities` yields one `<set>.<leaf>` row per leaf; any other
/// quantity is its own leaf, labelled with its name alone.
pub fn property_set_rows(pset: &ElementRecord) -> Vec<Row> {
    let mut rows = Vec::new();

    if let Some(properties) = pset.get_records(attr::HAS_PROPERTIES) {
        for property in properties {
            let value = wrapped_text(property.get(attr::NOMINAL_VALUE))
                .unwrap_or_else(|| UNKNOWN.to_string());
            rows.push(Row::decoded(&name_of(property), &value));
        }
    }

    if let Some(quantities) = pset.get_records(attr::QUANTITIES) {
        for quantity in quantities {
            let set_name = name_of(quantity);
            match quantity.get_records(attr::HAS_QUANTITIES) {
                Some(leaves) => {
                    for leaf in leaves {
                        let label = format!("{}.{}", set_name, name_of(leaf));
                        rows.push(Row::decoded(&label, &leaf_value(leaf)));
                    }
                }
                None => rows.push(Row::decoded(&set_name, &leaf_value(quantity))),
            }
        }
    }

    rows
}

fn name_of(record: &ElementRecord) -> String {
    wrapped_text(record.get(attr::NAME)).unwrap_or_else(|| UNKNOWN.to_string())
}

/// First present of length, area, volume, weight
fn leaf_value(quantity: &ElementRecord) -> String {
    attr::QUANTITY_VALUES
        .iter()
        .find_map(|field| wrapped_text(quantity.get(field)))
        .unwrap_or_else(|| UNKNOWN.to_string())
}
