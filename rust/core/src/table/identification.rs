// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Identification table: direct attributes plus material and type rows

use super::{Row, UNKNOWN};
use crate::merge::ResolvedElement;
use crate::record::{attr, AttributeValue, ElementRecord};
use crate::text::decode_ifc_string;

pub const MATERIAL_LABEL: &str = "Material";
pub const TYPE_NAME_LABEL: &str = "Type Name";

/// Fields a full property fetch attaches; never shown as attributes
const BOOKKEEPING_FIELDS: [&str; 3] = [attr::PSETS, attr::MATS, attr::TYPE];

/// Labels of the trailing rows; a direct attribute of the same name is dropped
const DERIVED_LABELS: [&str; 2] = [MATERIAL_LABEL, TYPE_NAME_LABEL];

/// Rows for the identification table of a resolved element.
///
/// Direct attributes come first in record order, then exactly one
/// `Material` and one `Type Name` row. Both are emitted even when blank.
pub fn build_identification(element: &ResolvedElement) -> Vec<Row> {
    let mut rows = Vec::with_capacity(element.attributes.len() + 2);

    for (key, value) in element.attributes.iter() {
        if BOOKKEEPING_FIELDS.contains(&key) || DERIVED_LABELS.contains(&key) {
            continue;
        }
        rows.push(Row::decoded(key, &attribute_text(key, value)));
    }

    rows.push(Row::new(MATERIAL_LABEL, material_description(&element.mats)));
    rows.push(Row::new(
        TYPE_NAME_LABEL,
        type_name(&element.types).unwrap_or_default(),
    ));
    rows
}

/// Raw display text of a direct attribute
fn attribute_text(key: &str, value: &AttributeValue) -> String {
    match value {
        AttributeValue::Null => UNKNOWN.to_string(),
        // expressID and other bare literals
        AttributeValue::Scalar(s) => s.to_string(),
        AttributeValue::Wrapped(s) => s.to_string(),
        AttributeValue::Ref(id) => id.to_string(),
        AttributeValue::List(_) | AttributeValue::Records(_) => {
            tracing::debug!(attribute = key, "List attribute shown as unknown");
            UNKNOWN.to_string()
        }
    }
}

/// Decoded material names of every entry, in encounter order, joined by ", "
fn material_description(mats: &[ElementRecord]) -> String {
    let mut names: Vec<String> = Vec::new();

    for entry in mats {
        match entry.get_records(attr::MATERIALS) {
            Some(materials) => names.extend(materials.iter().filter_map(decoded_name)),
            None => names.extend(decoded_name(entry)),
        }
    }

    names.join(", ")
}

/// Decoded name of the first type object that has one
fn type_name(types: &[ElementRecord]) -> Option<String> {
    types.iter().find_map(decoded_name)
}

fn decoded_name(record: &ElementRecord) -> Option<String> {
    let name = record.name()?.to_string();
    Some(decode_ifc_string(&name).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{ElementRecord, Scalar};

    fn named(id: u32, name: &str) -> ElementRecord {
        ElementRecord::new(id).with(attr::NAME, AttributeValue::wrapped(name))
    }

    fn element(attributes: ElementRecord) -> ResolvedElement {
        ResolvedElement {
            attributes,
            psets: Vec::new(),
            mats: Vec::new(),
            types: Vec::new(),
        }
    }

    fn labels(rows: &[Row]) -> Vec<&str> {
        rows.iter().map(|r| r.label.as_str()).collect()
    }

    #[test]
    fn test_rows_in_record_order() {
        let attributes = ElementRecord::new(7)
            .with("GlobalId", AttributeValue::wrapped("2O2Fr$t4X7Zf8NOew3FLOH"))
            .with(attr::NAME, AttributeValue::wrapped("T\\X2\\00FC\\X0\\r"))
            .with("ObjectPlacement", AttributeValue::Ref(55))
            .with("Tag", AttributeValue::Null);

        let rows = build_identification(&element(attributes));
        assert_eq!(
            labels(&rows),
            vec!["expressID", "GlobalId", "Name", "ObjectPlacement", "Tag", "Material", "Type Name"]
        );
        assert_eq!(rows[0].value, "7");
        assert_eq!(rows[2].value, "Tür");
        assert_eq!(rows[3].value, "55");
        assert_eq!(rows[4].value, UNKNOWN);
    }

    #[test]
    fn test_material_and_type_rows_always_last() {
        let rows = build_identification(&element(ElementRecord::new(1)));
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1], Row::new(MATERIAL_LABEL, ""));
        assert_eq!(rows[2], Row::new(TYPE_NAME_LABEL, ""));
    }

    #[test]
    fn test_bookkeeping_fields_dropped() {
        let attributes = ElementRecord::new(1)
            .with(attr::TYPE, AttributeValue::Scalar(Scalar::Integer(2391406946)))
            .with(attr::PSETS, AttributeValue::Records(Vec::new()))
            .with(attr::MATS, AttributeValue::Records(Vec::new()))
            .with("Description", AttributeValue::wrapped("Exterior"));

        let rows = build_identification(&element(attributes));
        assert_eq!(labels(&rows), vec!["expressID", "Description", "Material", "Type Name"]);
    }

    #[test]
    fn test_material_description() {
        let mut resolved = element(ElementRecord::new(1));
        resolved.mats = vec![
            ElementRecord::new(30).with(
                attr::MATERIALS,
                AttributeValue::Records(vec![named(31, "Concrete"), named(32, "D\\X2\\00E4\\X0\\mmung")]),
            ),
            named(33, "Plaster"),
            // neither a list nor a name: contributes nothing
            ElementRecord::new(34),
        ];
        resolved.types = vec![ElementRecord::new(40), named(41, "Basic Wall:200mm"), named(42, "Other")];

        let rows = build_identification(&resolved);
        let n = rows.len();
        assert_eq!(rows[n - 2].value, "Concrete, Dämmung, Plaster");
        assert_eq!(rows[n - 1].value, "Basic Wall:200mm");
    }

    #[test]
    fn test_material_attribute_does_not_duplicate_row() {
        // material layers carry their own `Material` reference
        let attributes = ElementRecord::new(5)
            .with(MATERIAL_LABEL, AttributeValue::Ref(7))
            .with(TYPE_NAME_LABEL, AttributeValue::wrapped("Layer"))
            .with("LayerThickness", AttributeValue::wrapped(0.2));
        let mut resolved = element(attributes);
        resolved.mats = vec![named(7, "Brick")];

        let rows = build_identification(&resolved);
        assert_eq!(labels(&rows), vec!["expressID", "LayerThickness", "Material", "Type Name"]);
        assert_eq!(rows.iter().filter(|r| r.label == MATERIAL_LABEL).count(), 1);
        assert_eq!(rows[rows.len() - 2], Row::new(MATERIAL_LABEL, "Brick"));
        assert_eq!(rows[rows.len() - 1], Row::new(TYPE_NAME_LABEL, ""));
    }

    #[test]
    fn test_list_attribute_is_unknown() {
        let attributes = ElementRecord::new(1).with("Representations", AttributeValue::refs([2, 3]));
        let rows = build_identification(&element(attributes));
        assert_eq!(rows[1], Row::new("Representations", UNKNOWN));
    }
}
