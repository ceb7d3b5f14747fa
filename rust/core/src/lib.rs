// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # IFC-Inspector Core
//!
//! Resolves the cross-referenced attribute records of an IFC model into
//! display-ready shapes: a spatial tree and per-element label/value tables.
//!
//! ## Overview
//!
//! - **String Decoding**: `\X2\...\X0\` escaped unicode to plain text
//! - **Reference Resolution**: order-preserving, concurrent id lookups
//! - **Merging**: property sets, quantity sets and materials with their
//!   references replaced by records (copy-on-write)
//! - **Tables**: identification rows and property/quantity rows
//! - **Spatial Tree**: containment hierarchy with resolved names
//!
//! Records come from a [`ModelStore`]; how a store gets populated is up to
//! the caller. [`MemoryStore`] covers tests and tooling.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ifc_inspector_core::{build_property_set, navigation, merge_element, BuildContext};
//!
//! let ctx = BuildContext::new(model_id).select(wall_id);
//! let element = merge_element(&store, ctx.model_id, wall_id).await?;
//!
//! for item in navigation(&element) {
//!     let rows = build_property_set(&store, &ctx, item.target).await?;
//!     for row in rows {
//!         println!("{}: {}", row.label, row.value);
//!     }
//! }
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialization support for records, rows and trees

pub mod context;
pub mod error;
pub mod merge;
pub mod navigation;
pub mod record;
pub mod resolver;
pub mod spatial;
pub mod store;
pub mod table;
pub mod text;

pub use context::BuildContext;
pub use error::{Error, Result};
pub use merge::{
    fetch_property_set, merge_complex_quantity, merge_element, merge_material, merge_property_set,
    ResolvedElement,
};
pub use navigation::{navigation, NavItem, IDENTIFICATION_LABEL};
pub use record::{attr, AttributeValue, ElementRecord, ExpressId, ModelId, Scalar, EXPRESS_ID};
pub use resolver::{reference_ids, resolve_references};
pub use spatial::{
    build_tree, build_tree_with, effective_selection, group_categories, initial_selection,
    SpatialNode, TreeNode, TreeOptions,
};
pub use store::{MemoryStore, ModelStore};
pub use table::{
    build_identification, build_property_set, property_set_rows, Row, IDENTIFICATION_TARGET,
    MATERIAL_LABEL, TYPE_NAME_LABEL, UNKNOWN,
};
pub use text::{decode_ifc_string, decode_opt, DecodeError};
