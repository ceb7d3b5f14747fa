// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! JSON model dump loading.
//!
//! Attribute records use the web-ifc property shape:
//!
//! ```json
//! { "expressID": 100, "type": 2391406946,
//!   "Name": { "type": 1, "value": "Wall" },
//!   "ObjectPlacement": { "type": 5, "value": 54 },
//!   "HasProperties": [{ "type": 5, "value": 201 }] }
//! ```
//!
//! Objects tagged `"type": 5` are references, any other object is a
//! `{value}`-wrapped literal.

use crate::error::InspectorError;
use ifc_inspector_core::{
    AttributeValue, ElementRecord, ExpressId, MemoryStore, ModelId, Scalar, SpatialNode,
};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;

/// web-ifc value tag for entity references
const REF_TAG: u64 = 5;

/// Model dump as written by the exporter.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelDump {
    #[serde(default)]
    pub model_id: ModelId,
    pub elements: Vec<Map<String, Value>>,
    #[serde(default)]
    pub spatial_structure: Option<DumpNode>,
    /// element -> attached property/quantity sets
    #[serde(default)]
    pub property_sets: BTreeMap<ExpressId, Vec<ExpressId>>,
    /// element -> material entries
    #[serde(default)]
    pub materials: BTreeMap<ExpressId, Vec<ExpressId>>,
    /// element -> type objects
    #[serde(default)]
    pub types: BTreeMap<ExpressId, Vec<ExpressId>>,
}

/// Spatial structure node (`{expressID, type, children}`).
#[derive(Debug, Deserialize)]
pub struct DumpNode {
    #[serde(rename = "expressID", default)]
    pub express_id: Option<i64>,
    #[serde(rename = "type", default)]
    pub ifc_type: String,
    #[serde(default)]
    pub children: Vec<DumpNode>,
}

impl From<DumpNode> for SpatialNode {
    fn from(node: DumpNode) -> Self {
        SpatialNode {
            // grouping nodes carry negative ids
            express_id: node.express_id.and_then(|id| ExpressId::try_from(id).ok()),
            ifc_type: node.ifc_type,
            children: node.children.into_iter().map(SpatialNode::from).collect(),
        }
    }
}

/// A loaded model.
pub struct LoadedModel {
    pub model_id: ModelId,
    pub store: MemoryStore,
}

/// Read and load a dump file.
pub async fn load(path: &Path, model_id: Option<ModelId>) -> Result<LoadedModel, InspectorError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| InspectorError::Io {
            path: path.display().to_string(),
            source,
        })?;
    let dump: ModelDump = serde_json::from_str(&content)?;
    into_store(dump, model_id)
}

/// Load a parsed dump into a fresh store.
pub fn into_store(dump: ModelDump, model_id: Option<ModelId>) -> Result<LoadedModel, InspectorError> {
    let model_id = model_id.unwrap_or(dump.model_id);
    let mut store = MemoryStore::new();

    let element_count = dump.elements.len();
    for (index, fields) in dump.elements.into_iter().enumerate() {
        let record = element_record(fields);
        if record.express_id().is_none() {
            return Err(InspectorError::Record(format!(
                "element at index {} has no expressID",
                index
            )));
        }
        store.insert_element(model_id, record)?;
    }

    for (element, psets) in dump.property_sets {
        for pset in psets {
            store.relate_property_set(model_id, element, pset);
        }
    }
    for (element, materials) in dump.materials {
        for material in materials {
            store.relate_material(model_id, element, material);
        }
    }
    for (element, types) in dump.types {
        for type_object in types {
            store.relate_type(model_id, element, type_object);
        }
    }

    let has_spatial = dump.spatial_structure.is_some();
    if let Some(root) = dump.spatial_structure {
        store.set_spatial_structure(model_id, root.into());
    }

    tracing::info!(
        model_id,
        elements = element_count,
        spatial_structure = has_spatial,
        "Loaded model dump"
    );

    Ok(LoadedModel { model_id, store })
}

/// Convert one JSON object into an element record, keeping key order.
pub fn element_record(fields: Map<String, Value>) -> ElementRecord {
    fields
        .into_iter()
        .map(|(key, value)| {
            let value = attribute_value(&value);
            (key, value)
        })
        .collect()
}

/// Convert a JSON attribute value.
pub fn attribute_value(value: &Value) -> AttributeValue {
    match value {
        Value::Object(map) => {
            let inner = map.get("value");
            if map.get("type").and_then(Value::as_u64) == Some(REF_TAG) {
                if let Some(id) = inner
                    .and_then(Value::as_u64)
                    .and_then(|id| ExpressId::try_from(id).ok())
                {
                    return AttributeValue::Ref(id);
                }
            }
            match inner.and_then(scalar) {
                Some(s) => AttributeValue::Wrapped(s),
                None => AttributeValue::Null,
            }
        }
        Value::Array(items) => AttributeValue::List(items.iter().map(attribute_value).collect()),
        Value::Null => AttributeValue::Null,
        other => scalar(other).map_or(AttributeValue::Null, AttributeValue::Scalar),
    }
}

fn scalar(value: &Value) -> Option<Scalar> {
    match value {
        Value::String(s) => Some(Scalar::Text(s.clone())),
        Value::Bool(b) => Some(Scalar::Bool(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Some(Scalar::Integer(i)),
            None => n.as_f64().map(Scalar::Real),
        },
        _ => None,
    }
}
