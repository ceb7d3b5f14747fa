// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Spatial Tree Builder
//!
//! Turns the containment hierarchy (Project -> Site -> Building -> Storey ->
//! elements) into a display tree with resolved names. Only the shape is
//! built here; checkbox state and highlighting belong to the caller.

use crate::error::Result;
use crate::record::{ExpressId, ModelId};
use crate::store::ModelStore;
use crate::table::UNKNOWN;
use crate::text::decode_ifc_string;
use futures_core::future::BoxFuture;
use futures_util::future::{try_join_all, FutureExt};
use rustc_hash::FxHashSet;
use std::borrow::Cow;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Node of the model's spatial structure, as the store reports it
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SpatialNode {
    /// `None` for synthetic nodes (grouping nodes, a synthetic root)
    pub express_id: Option<ExpressId>,
    /// IFC type name (e.g., "IFCBUILDINGSTOREY")
    pub ifc_type: String,
    pub children: Vec<SpatialNode>,
}

impl SpatialNode {
    pub fn new(express_id: ExpressId, ifc_type: &str) -> Self {
        Self {
            express_id: Some(express_id),
            ifc_type: ifc_type.to_string(),
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<SpatialNode>) -> Self {
        self.children = children;
        self
    }
}

/// Display tree node
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(tag = "kind", rename_all = "camelCase")
)]
pub enum TreeNode {
    Leaf {
        express_id: Option<ExpressId>,
        name: String,
    },
    Branch {
        express_id: Option<ExpressId>,
        name: String,
        children: Vec<TreeNode>,
    },
}

impl TreeNode {
    pub fn express_id(&self) -> Option<ExpressId> {
        match self {
            TreeNode::Leaf { express_id, .. } | TreeNode::Branch { express_id, .. } => *express_id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            TreeNode::Leaf { name, .. } | TreeNode::Branch { name, .. } => name,
        }
    }

    pub fn children(&self) -> &[TreeNode] {
        match self {
            TreeNode::Leaf { .. } => &[],
            TreeNode::Branch { children, .. } => children,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, TreeNode::Leaf { .. })
    }

    /// Ids of all leaves, depth-first
    pub fn leaf_ids(&self) -> Vec<ExpressId> {
        let mut ids = Vec::new();
        self.collect_leaf_ids(&mut ids);
        ids
    }

    fn collect_leaf_ids(&self, ids: &mut Vec<ExpressId>) {
        match self {
            TreeNode::Leaf { express_id, .. } => ids.extend(*express_id),
            TreeNode::Branch { children, .. } => {
                for child in children {
                    child.collect_leaf_ids(ids);
                }
            }
        }
    }
}

/// Tree building options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeOptions {
    /// Wrap mixed-type siblings into one synthetic node per type
    pub group_categories: bool,
}

/// Build the display tree for `node` and everything below it
pub fn build_tree<'a, S: ModelStore + ?Sized>(
    store: &'a S,
    model_id: ModelId,
    node: &'a SpatialNode,
) -> BoxFuture<'a, Result<TreeNode>> {
    build_tree_with(store, model_id, node, TreeOptions::default())
}

/// [`build_tree`] with explicit options
pub fn build_tree_with<'a, S: ModelStore + ?Sized>(
    store: &'a S,
    model_id: ModelId,
    node: &'a SpatialNode,
    options: TreeOptions,
) -> BoxFuture<'a, Result<TreeNode>> {
    async move {
        let name = display_name(store, model_id, node).await?;

        if node.children.is_empty() {
            return Ok(TreeNode::Leaf {
                express_id: node.express_id,
                name,
            });
        }

        let children: Cow<'_, [SpatialNode]> = if options.group_categories {
            group_categories(&node.children)
        } else {
            Cow::Borrowed(&node.children)
        };

        let children = try_join_all(
            children
                .iter()
                .map(|child| build_tree_with(store, model_id, child, options)),
        )
        .await?;

        Ok(TreeNode::Branch {
            express_id: node.express_id,
            name,
            children,
        })
    }
    .boxed()
}

/// Name shown for a node: the element's decoded `Name`, or the type name of
/// a synthetic node
async fn display_name<S: ModelStore + ?Sized>(
    store: &S,
    model_id: ModelId,
    node: &SpatialNode,
) -> Result<String> {
    let Some(express_id) = node.express_id else {
        return Ok(node.ifc_type.clone());
    };

    let record = store.element(model_id, express_id).await?;
    Ok(match record.name() {
        Some(name) => decode_ifc_string(&name.to_string()).into_owned(),
        None => {
            tracing::debug!(model_id, express_id, "Spatial node has no Name");
            UNKNOWN.to_string()
        }
    })
}

/// Group siblings by IFC type when more than one type is present.
///
/// Groups follow first-seen type order and are named after the type with a
/// trailing `S` (`IFCWALL` -> `IFCWALLS`). Single-type lists are returned
/// unchanged.
pub fn group_categories(children: &[SpatialNode]) -> Cow<'_, [SpatialNode]> {
    let mut types: Vec<&str> = Vec::new();
    for child in children {
        if !types.contains(&child.ifc_type.as_str()) {
            types.push(&child.ifc_type);
        }
    }

    if types.len() <= 1 {
        return Cow::Borrowed(children);
    }

    Cow::Owned(
        types
            .into_iter()
            .map(|ifc_type| SpatialNode {
                express_id: None,
                ifc_type: format!("{}S", ifc_type),
                children: children
                    .iter()
                    .filter(|child| child.ifc_type == ifc_type)
                    .cloned()
                    .collect(),
            })
            .collect(),
    )
}

/// Ids to highlight for a set of checked leaves.
///
/// Checkbox propagation happens in the UI, so this is the checked set as-is.
pub fn effective_selection(checked: FxHashSet<ExpressId>) -> FxHashSet<ExpressId> {
    checked
}

/// Selection with every leaf checked, the state a freshly built tree starts in
pub fn initial_selection(tree: &TreeNode) -> FxHashSet<ExpressId> {
    tree.leaf_ids().into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::record::{AttributeValue, ElementRecord};
    use crate::store::MemoryStore;

    fn store_with(names: &[(ExpressId, &str)]) -> MemoryStore {
        let mut store = MemoryStore::new();
        for &(id, name) in names {
            store
                .insert_element(0, ElementRecord::new(id).with("Name", AttributeValue::wrapped(name)))
                .unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_leaf_node() {
        let store = store_with(&[(42, "Door")]);
        let node = SpatialNode::new(42, "IFCDOOR");

        let tree = build_tree(&store, 0, &node).await.unwrap();
        assert_eq!(
            tree,
            TreeNode::Leaf {
                express_id: Some(42),
                name: "Door".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_branch_keeps_child_order() {
        let store = store_with(&[(1, "Level 1"), (2, "Wall B"), (3, "Wall A")]);
        let node = SpatialNode::new(1, "IFCBUILDINGSTOREY").with_children(vec![
            SpatialNode::new(2, "IFCWALL"),
            SpatialNode::new(3, "IFCWALL"),
        ]);

        let tree = build_tree(&store, 0, &node).await.unwrap();
        assert!(!tree.is_leaf());
        assert_eq!(tree.name(), "Level 1");
        let ids: Vec<_> = tree.children().iter().map(|c| c.express_id()).collect();
        assert_eq!(ids, vec![Some(2), Some(3)]);
    }

    #[tokio::test]
    async fn test_names_are_decoded() {
        let store = store_with(&[(5, "Geb\\X2\\00E4\\X0\\ude")]);
        let tree = build_tree(&store, 0, &SpatialNode::new(5, "IFCBUILDING"))
            .await
            .unwrap();
        assert_eq!(tree.name(), "Gebäude");
    }

    #[tokio::test]
    async fn test_missing_name_and_synthetic_root() {
        let mut store = MemoryStore::new();
        store.insert_element(0, ElementRecord::new(9)).unwrap();
        let root = SpatialNode {
            express_id: None,
            ifc_type: "IFCPROJECT".to_string(),
            children: vec![SpatialNode::new(9, "IFCSITE")],
        };

        let tree = build_tree(&store, 0, &root).await.unwrap();
        assert_eq!(tree.name(), "IFCPROJECT");
        assert_eq!(tree.children()[0].name(), UNKNOWN);
    }

    #[tokio::test]
    async fn test_unknown_node_fails() {
        let store = store_with(&[(1, "Site")]);
        let node = SpatialNode::new(1, "IFCSITE").with_children(vec![SpatialNode::new(2, "IFCWALL")]);

        let err = build_tree(&store, 0, &node).await.unwrap_err();
        assert_eq!(err, Error::not_found(0, 2));
    }

    #[tokio::test]
    async fn test_grouped_tree() {
        let store = store_with(&[(1, "Level 1"), (2, "W1"), (3, "D1"), (4, "W2")]);
        let node = SpatialNode::new(1, "IFCBUILDINGSTOREY").with_children(vec![
            SpatialNode::new(2, "IFCWALL"),
            SpatialNode::new(3, "IFCDOOR"),
            SpatialNode::new(4, "IFCWALL"),
        ]);
        let options = TreeOptions {
            group_categories: true,
        };

        let tree = build_tree_with(&store, 0, &node, options).await.unwrap();
        let groups = tree.children();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].name(), "IFCWALLS");
        assert_eq!(groups[0].express_id(), None);
        assert_eq!(groups[0].children().len(), 2);
        assert_eq!(groups[1].name(), "IFCDOORS");
        assert_eq!(tree.leaf_ids(), vec![2, 4, 3]);
    }

    #[test]
    fn test_group_categories_single_type() {
        let children = vec![SpatialNode::new(2, "IFCWALL"), SpatialNode::new(3, "IFCWALL")];
        assert!(matches!(group_categories(&children), Cow::Borrowed(_)));
    }

    #[test]
    fn test_selection() {
        let tree = TreeNode::Branch {
            express_id: Some(1),
            name: "Storey".into(),
            children: vec![
                TreeNode::Leaf {
                    express_id: Some(2),
                    name: "A".into(),
                },
                TreeNode::Leaf {
                    express_id: Some(3),
                    name: "B".into(),
                },
            ],
        };

        let all = initial_selection(&tree);
        assert_eq!(all.len(), 2);
        assert!(all.contains(&2) && all.contains(&3));

        let checked: FxHashSet<ExpressId> = [3].into_iter().collect();
        assert_eq!(effective_selection(checked.clone()), checked);
    }
}
