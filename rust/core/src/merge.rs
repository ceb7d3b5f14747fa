// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Property Set Merger
//!
//! Replaces the reference lists of property sets, quantity sets and material
//! lists with the records they point at. Every merge works on a clone; the
//! records a store handed out are never touched.
//!
//! Resolution depth is fixed:
//! - `HasProperties` / `Quantities` of a property set
//! - `HasQuantities` of each resolved quantity (one level, no further)
//! - `Materials` of a material entry

use crate::error::Result;
use crate::record::{attr, AttributeValue, ElementRecord, ExpressId, ModelId};
use crate::resolver::{reference_ids, resolve_references};
use crate::store::ModelStore;
use futures_util::future::{try_join4, try_join_all};

/// An element with its property sets, materials and type objects resolved
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedElement {
    /// Direct attributes as the store reported them
    pub attributes: ElementRecord,
    /// Merged property and quantity sets
    pub psets: Vec<ElementRecord>,
    /// Merged material entries
    pub mats: Vec<ElementRecord>,
    /// Type objects
    pub types: Vec<ElementRecord>,
}

impl ResolvedElement {
    pub fn express_id(&self) -> Option<ExpressId> {
        self.attributes.express_id()
    }
}

/// Fetch an element with everything attached to it and merge the result
pub async fn merge_element<S: ModelStore + ?Sized>(
    store: &S,
    model_id: ModelId,
    express_id: ExpressId,
) -> Result<ResolvedElement> {
    let (attributes, raw_psets, raw_mats, types) = try_join4(
        store.element(model_id, express_id),
        store.property_sets(model_id, express_id),
        store.materials(model_id, express_id),
        store.type_objects(model_id, express_id),
    )
    .await?;

    let psets = try_join_all(
        raw_psets
            .iter()
            .map(|pset| merge_property_set(store, model_id, pset)),
    )
    .await?;
    let mats = try_join_all(
        raw_mats
            .iter()
            .map(|entry| merge_material(store, model_id, entry)),
    )
    .await?;

    tracing::debug!(
        model_id,
        express_id,
        psets = psets.len(),
        mats = mats.len(),
        types = types.len(),
        "Merged element"
    );

    Ok(ResolvedElement {
        attributes,
        psets,
        mats,
        types,
    })
}

/// Fetch one property or quantity set by id and merge it
pub async fn fetch_property_set<S: ModelStore + ?Sized>(
    store: &S,
    model_id: ModelId,
    express_id: ExpressId,
) -> Result<ElementRecord> {
    let raw = store.element(model_id, express_id).await?;
    merge_property_set(store, model_id, &raw).await
}

/// Resolve `HasProperties` and `Quantities` of a property set.
///
/// Each field gets its own resolved list; property records never end up in
/// `Quantities` or the other way around.
pub async fn merge_property_set<S: ModelStore + ?Sized>(
    store: &S,
    model_id: ModelId,
    raw: &ElementRecord,
) -> Result<ElementRecord> {
    let mut merged = raw.clone();

    if let Some(properties) = resolve_field(store, model_id, raw, attr::HAS_PROPERTIES).await? {
        merged.insert(attr::HAS_PROPERTIES, AttributeValue::Records(properties));
    }

    if let Some(quantities) = resolve_field(store, model_id, raw, attr::QUANTITIES).await? {
        let quantities = try_join_all(
            quantities
                .iter()
                .map(|quantity| merge_complex_quantity(store, model_id, quantity)),
        )
        .await?;
        merged.insert(attr::QUANTITIES, AttributeValue::Records(quantities));
    }

    Ok(merged)
}

/// Resolve the `HasQuantities` of a complex quantity; plain quantities are
/// returned as they are
pub async fn merge_complex_quantity<S: ModelStore + ?Sized>(
    store: &S,
    model_id: ModelId,
    raw: &ElementRecord,
) -> Result<ElementRecord> {
    let mut merged = raw.clone();
    if let Some(leaves) = resolve_field(store, model_id, raw, attr::HAS_QUANTITIES).await? {
        merged.insert(attr::HAS_QUANTITIES, AttributeValue::Records(leaves));
    }
    Ok(merged)
}

/// Resolve the `Materials` list of a material entry.
///
/// Entries without one (a single material) carry their own `Name`.
pub async fn merge_material<S: ModelStore + ?Sized>(
    store: &S,
    model_id: ModelId,
    raw: &ElementRecord,
) -> Result<ElementRecord> {
    let mut merged = raw.clone();
    if let Some(materials) = resolve_field(store, model_id, raw, attr::MATERIALS).await? {
        merged.insert(attr::MATERIALS, AttributeValue::Records(materials));
    }
    Ok(merged)
}

/// Resolve `field` when it holds a reference list.
/// `None` when the field is absent or not a list (already resolved, null).
async fn resolve_field<S: ModelStore + ?Sized>(
    store: &S,
    model_id: ModelId,
    record: &ElementRecord,
    field: &str,
) -> Result<Option<Vec<ElementRecord>>> {
    match record.get(field) {
        Some(value @ AttributeValue::List(_)) => {
            let ids = reference_ids(value);
            resolve_references(store, model_id, &ids).await.map(Some)
        }
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::record::Scalar;
    use crate::store::MemoryStore;

    fn named(id: ExpressId, name: &str) -> ElementRecord {
        ElementRecord::new(id).with(attr::NAME, AttributeValue::wrapped(name))
    }

    fn fixture() -> MemoryStore {
        let mut store = MemoryStore::new();
        let records = [
            named(1, "Wall").with("Tag", AttributeValue::wrapped("W-1")),
            // property set with two single values
            named(10, "Pset_WallCommon").with(attr::HAS_PROPERTIES, AttributeValue::refs([11, 12])),
            named(11, "IsExternal").with(attr::NOMINAL_VALUE, AttributeValue::wrapped(true)),
            named(12, "FireRating").with(attr::NOMINAL_VALUE, AttributeValue::wrapped("F90")),
            // quantity set: one plain quantity, one complex quantity
            named(20, "Qto_WallBaseQuantities").with(attr::QUANTITIES, AttributeValue::refs([21, 22])),
            named(21, "Length").with("LengthValue", AttributeValue::wrapped(4.5)),
            named(22, "Layer").with(attr::HAS_QUANTITIES, AttributeValue::refs([23, 24])),
            named(23, "Width").with("LengthValue", AttributeValue::wrapped(0.2)),
            named(24, "Area").with("AreaValue", AttributeValue::wrapped(9.0)),
            // material list and single material
            ElementRecord::new(30).with(attr::MATERIALS, AttributeValue::refs([31, 32])),
            named(31, "Concrete"),
            named(32, "Insulation"),
            named(33, "Plaster"),
            named(40, "Basic Wall"),
        ];
        for record in records {
            store.insert_element(0, record).unwrap();
        }
        store.relate_property_set(0, 1, 10);
        store.relate_property_set(0, 1, 20);
        store.relate_material(0, 1, 30);
        store.relate_material(0, 1, 33);
        store.relate_type(0, 1, 40);
        store
    }

    fn record_ids(records: &[ElementRecord]) -> Vec<Option<ExpressId>> {
        records.iter().map(|r| r.express_id()).collect()
    }

    #[tokio::test]
    async fn test_merge_element() {
        let store = fixture();
        let element = merge_element(&store, 0, 1).await.unwrap();

        assert_eq!(element.express_id(), Some(1));
        assert_eq!(element.psets.len(), 2);
        assert_eq!(element.types.len(), 1);

        let properties = element.psets[0].get_records(attr::HAS_PROPERTIES).unwrap();
        assert_eq!(record_ids(properties), vec![Some(11), Some(12)]);

        let materials = element.mats[0].get_records(attr::MATERIALS).unwrap();
        assert_eq!(record_ids(materials), vec![Some(31), Some(32)]);
        assert_eq!(element.mats[1].name(), Some(&Scalar::Text("Plaster".into())));
    }

    #[tokio::test]
    async fn test_properties_and_quantities_stay_separate() {
        let store = fixture();
        let mut raw = store.element(0, 10).await.unwrap();
        raw.insert(attr::QUANTITIES, AttributeValue::refs([21]));

        let merged = merge_property_set(&store, 0, &raw).await.unwrap();
        assert_eq!(
            record_ids(merged.get_records(attr::HAS_PROPERTIES).unwrap()),
            vec![Some(11), Some(12)]
        );
        assert_eq!(
            record_ids(merged.get_records(attr::QUANTITIES).unwrap()),
            vec![Some(21)]
        );
    }

    #[tokio::test]
    async fn test_nested_quantities_resolved_one_level() {
        let store = fixture();
        let merged = fetch_property_set(&store, 0, 20).await.unwrap();

        let quantities = merged.get_records(attr::QUANTITIES).unwrap();
        assert!(quantities[0].get(attr::HAS_QUANTITIES).is_none());
        let leaves = quantities[1].get_records(attr::HAS_QUANTITIES).unwrap();
        assert_eq!(record_ids(leaves), vec![Some(23), Some(24)]);
    }

    #[tokio::test]
    async fn test_raw_record_untouched() {
        let store = fixture();
        let raw = store.element(0, 10).await.unwrap();
        let before = raw.clone();

        let merged = merge_property_set(&store, 0, &raw).await.unwrap();
        assert_eq!(raw, before);
        assert_ne!(merged, raw);
        assert!(raw.get(attr::HAS_PROPERTIES).unwrap().as_list().is_some());
        // the store still hands out the unresolved record
        assert_eq!(store.element(0, 10).await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_already_resolved_field_kept() {
        let store = fixture();
        let resolved = fetch_property_set(&store, 0, 10).await.unwrap();
        let again = merge_property_set(&store, 0, &resolved).await.unwrap();
        assert_eq!(again, resolved);
    }

    #[tokio::test]
    async fn test_dangling_reference_fails() {
        let mut store = fixture();
        store
            .insert_element(0, named(50, "Broken").with(attr::HAS_PROPERTIES, AttributeValue::refs([99])))
            .unwrap();

        let err = fetch_property_set(&store, 0, 50).await.unwrap_err();
        assert_eq!(err, Error::not_found(0, 99));
    }
}
