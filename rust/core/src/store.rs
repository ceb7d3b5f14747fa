// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Model Store - the lookup service every resolution step goes through
//!
//! The store is treated as authoritative and static while a build runs.
//! [`MemoryStore`] is the in-process implementation used by the CLI and
//! the tests; viewers plug their own loaded model in behind [`ModelStore`].

use crate::error::{Error, Result};
use crate::record::{ElementRecord, ExpressId, ModelId};
use crate::spatial::SpatialNode;
use async_trait::async_trait;
use rustc_hash::FxHashMap;

/// Read access to loaded models
#[async_trait]
pub trait ModelStore: Send + Sync {
    /// Raw attribute record of one element
    async fn element(&self, model_id: ModelId, express_id: ExpressId) -> Result<ElementRecord>;

    /// Spatial containment tree, rooted at the project
    async fn spatial_structure(&self, model_id: ModelId) -> Result<SpatialNode>;

    /// Raw property/quantity sets attached to an element
    async fn property_sets(
        &self,
        model_id: ModelId,
        express_id: ExpressId,
    ) -> Result<Vec<ElementRecord>>;

    /// Raw material entries associated with an element
    async fn materials(&self, model_id: ModelId, express_id: ExpressId)
        -> Result<Vec<ElementRecord>>;

    /// Type objects defining an element
    async fn type_objects(
        &self,
        model_id: ModelId,
        express_id: ExpressId,
    ) -> Result<Vec<ElementRecord>>;
}

/// One loaded model: records plus relationship lists (element -> related ids)
#[derive(Debug, Clone, Default)]
struct ModelData {
    elements: FxHashMap<ExpressId, ElementRecord>,
    spatial: Option<SpatialNode>,
    property_sets: FxHashMap<ExpressId, Vec<ExpressId>>,
    materials: FxHashMap<ExpressId, Vec<ExpressId>>,
    types: FxHashMap<ExpressId, Vec<ExpressId>>,
}

impl ModelData {
    fn element(&self, model_id: ModelId, express_id: ExpressId) -> Result<&ElementRecord> {
        self.elements
            .get(&express_id)
            .ok_or_else(|| Error::not_found(model_id, express_id))
    }

    fn related(
        &self,
        model_id: ModelId,
        relation: &FxHashMap<ExpressId, Vec<ExpressId>>,
        express_id: ExpressId,
    ) -> Result<Vec<ElementRecord>> {
        // The element itself must exist even when nothing is attached to it
        self.element(model_id, express_id)?;

        relation
            .get(&express_id)
            .map(|ids| {
                ids.iter()
                    .map(|&id| self.element(model_id, id).cloned())
                    .collect()
            })
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

/// In-memory model store
///
/// Lookups hand out clones, so callers can never alias the stored records.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    models: FxHashMap<ModelId, ModelData>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn model_mut(&mut self, model_id: ModelId) -> &mut ModelData {
        self.models.entry(model_id).or_default()
    }

    fn model(&self, model_id: ModelId) -> Result<&ModelData> {
        self.models
            .get(&model_id)
            .ok_or(Error::ModelNotFound(model_id))
    }

    /// Add a record, keyed by its `expressID`.
    /// Records without a usable id are rejected.
    pub fn insert_element(&mut self, model_id: ModelId, record: ElementRecord) -> Result<ExpressId> {
        let express_id = record
            .express_id()
            .ok_or_else(|| Error::Store("record has no expressID".to_string()))?;
        self.model_mut(model_id).elements.insert(express_id, record);
        Ok(express_id)
    }

    pub fn set_spatial_structure(&mut self, model_id: ModelId, root: SpatialNode) {
        self.model_mut(model_id).spatial = Some(root);
    }

    /// Attach a property or quantity set to an element
    pub fn relate_property_set(&mut self, model_id: ModelId, element: ExpressId, pset: ExpressId) {
        self.model_mut(model_id)
            .property_sets
            .entry(element)
            .or_default()
            .push(pset);
    }

    /// Associate a material entry with an element
    pub fn relate_material(&mut self, model_id: ModelId, element: ExpressId, material: ExpressId) {
        self.model_mut(model_id)
            .materials
            .entry(element)
            .or_default()
            .push(material);
    }

    /// Attach a type object to an element
    pub fn relate_type(&mut self, model_id: ModelId, element: ExpressId, type_object: ExpressId) {
        self.model_mut(model_id)
            .types
            .entry(element)
            .or_default()
            .push(type_object);
    }

    /// Number of records loaded for a model
    pub fn element_count(&self, model_id: ModelId) -> usize {
        self.models
            .get(&model_id)
            .map(|m| m.elements.len())
            .unwrap_or(0)
    }
}

#[async_trait]
impl ModelStore for MemoryStore {
    async fn element(&self, model_id: ModelId, express_id: ExpressId) -> Result<ElementRecord> {
        self.model(model_id)?
            .element(model_id, express_id)
            .cloned()
    }

    async fn spatial_structure(&self, model_id: ModelId) -> Result<SpatialNode> {
        self.model(model_id)?
            .spatial
            .clone()
            .ok_or(Error::MissingSpatialStructure(model_id))
    }

    async fn property_sets(
        &self,
        model_id: ModelId,
        express_id: ExpressId,
    ) -> Result<Vec<ElementRecord>> {
        let model = self.model(model_id)?;
        model.related(model_id, &model.property_sets, express_id)
    }

    async fn materials(
        &self,
        model_id: ModelId,
        express_id: ExpressId,
    ) -> Result<Vec<ElementRecord>> {
        let model = self.model(model_id)?;
        model.related(model_id, &model.materials, express_id)
    }

    async fn type_objects(
        &self,
        model_id: ModelId,
        express_id: ExpressId,
    ) -> Result<Vec<ElementRecord>> {
        let model = self.model(model_id)?;
        model.related(model_id, &model.types, express_id)
    }
}
