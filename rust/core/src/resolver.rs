// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Reference Resolver - dereference id lists through the model store

use crate::error::Result;
use crate::record::{AttributeValue, ElementRecord, ExpressId, ModelId};
use crate::store::ModelStore;
use futures_util::future::try_join_all;
use smallvec::SmallVec;

/// Reference ids collected from one attribute; most lists are short
pub type RefIds = SmallVec<[ExpressId; 8]>;

/// Fetch every referenced record, in input order.
///
/// Fetches run concurrently; the output keeps the position of each id no
/// matter which lookup finishes first. The first failed lookup is returned
/// as-is.
pub async fn resolve_references<S: ModelStore + ?Sized>(
    store: &S,
    model_id: ModelId,
    ids: &[ExpressId],
) -> Result<Vec<ElementRecord>> {
    tracing::trace!(model_id, count = ids.len(), "Resolving references");
    try_join_all(ids.iter().map(|&id| store.element(model_id, id))).await
}

/// Ids of a reference list attribute.
///
/// Entries that are not references are skipped; a non-list value yields no
/// ids.
pub fn reference_ids(value: &AttributeValue) -> RefIds {
    let Some(items) = value.as_list() else {
        return RefIds::new();
    };

    items
        .iter()
        .filter_map(|item| {
            let id = item.as_ref_id();
            if id.is_none() {
                tracing::debug!(?item, "Skipping non-reference entry in reference list");
            }
            id
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::spatial::SpatialNode;
    use crate::store::MemoryStore;
    use async_trait::async_trait;

    /// Store whose lookups finish in reverse id order
    struct SlowFirstStore {
        inner: MemoryStore,
    }

    #[async_trait]
    impl ModelStore for SlowFirstStore {
        async fn element(&self, model_id: ModelId, express_id: ExpressId) -> Result<ElementRecord> {
            for _ in 0..(10 - express_id.min(10)) {
                tokio::task::yield_now().await;
            }
            self.inner.element(model_id, express_id).await
        }

        async fn spatial_structure(&self, model_id: ModelId) -> Result<SpatialNode> {
            self.inner.spatial_structure(model_id).await
        }

        async fn property_sets(&self, model_id: ModelId, id: ExpressId) -> Result<Vec<ElementRecord>> {
            self.inner.property_sets(model_id, id).await
        }

        async fn materials(&self, model_id: ModelId, id: ExpressId) -> Result<Vec<ElementRecord>> {
            self.inner.materials(model_id, id).await
        }

        async fn type_objects(&self, model_id: ModelId, id: ExpressId) -> Result<Vec<ElementRecord>> {
            self.inner.type_objects(model_id, id).await
        }
    }

    fn named(id: ExpressId, name: &str) -> ElementRecord {
        ElementRecord::new(id).with("Name", AttributeValue::wrapped(name))
    }

    #[tokio::test]
    async fn test_preserves_input_order() {
        let mut inner = MemoryStore::new();
        inner.insert_element(0, named(1, "X")).unwrap();
        inner.insert_element(0, named(2, "Y")).unwrap();
        inner.insert_element(0, named(3, "Z")).unwrap();
        let store = SlowFirstStore { inner };

        let records = resolve_references(&store, 0, &[1, 2, 3]).await.unwrap();
        let names: Vec<String> = records
            .iter()
            .map(|r| r.name().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["X", "Y", "Z"]);

        let records = resolve_references(&store, 0, &[3, 1]).await.unwrap();
        assert_eq!(records[0].express_id(), Some(3));
        assert_eq!(records[1].express_id(), Some(1));
    }

    #[tokio::test]
    async fn test_missing_reference_fails() {
        let mut store = MemoryStore::new();
        store.insert_element(0, named(1, "X")).unwrap();

        let err = resolve_references(&store, 0, &[1, 5]).await.unwrap_err();
        assert_eq!(err, Error::not_found(0, 5));
    }

    #[tokio::test]
    async fn test_empty_list() {
        let store = MemoryStore::new();
        assert!(resolve_references(&store, 0, &[]).await.unwrap().is_empty());
    }

    #[test]
    fn test_reference_ids() {
        let value = AttributeValue::List(vec![
            AttributeValue::Ref(4),
            AttributeValue::wrapped("not a ref"),
            AttributeValue::Ref(9),
        ]);
        assert_eq!(reference_ids(&value).as_slice(), &[4, 9]);
        assert!(reference_ids(&AttributeValue::Null).is_empty());
    }
}
