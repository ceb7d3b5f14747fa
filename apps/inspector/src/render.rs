// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Text and JSON rendering of trees and tables.

use ifc_inspector_core::{ExpressId, NavItem, Row, TreeNode};
use rustc_hash::FxHashSet;
use serde::Serialize;
use std::fmt::Write;

/// One rendered table: the navigation entry and its rows.
#[derive(Debug, Serialize)]
pub struct Table {
    #[serde(flatten)]
    pub item: NavItem,
    pub rows: Vec<Row>,
}

/// Everything one run prints in JSON mode.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tree: Option<TreeNode>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub selected: Vec<ExpressId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element: Option<ExpressId>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tables: Vec<Table>,
}

/// Indented tree; checked leaves are marked `[x]`.
pub fn tree_text(tree: &TreeNode, checked: &FxHashSet<ExpressId>) -> String {
    let mut out = String::new();
    write_node(&mut out, tree, checked, 0);
    out
}

fn write_node(out: &mut String, node: &TreeNode, checked: &FxHashSet<ExpressId>, depth: usize) {
    let indent = "  ".repeat(depth);
    let id = node
        .express_id()
        .map(|id| format!(" #{}", id))
        .unwrap_or_default();

    match node {
        TreeNode::Leaf { express_id, name } => {
            let mark = match express_id {
                Some(id) if checked.contains(id) => "[x]",
                _ => "[ ]",
            };
            let _ = writeln!(out, "{}{} {}{}", indent, mark, name, id);
        }
        TreeNode::Branch { name, children, .. } => {
            let _ = writeln!(out, "{}+ {}{}", indent, name, id);
            for child in children {
                write_node(out, child, checked, depth + 1);
            }
        }
    }
}

/// Two-column table under a title line.
pub fn table_text(table: &Table) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== {} ==", table.item.label);

    let width = table
        .rows
        .iter()
        .map(|row| row.label.chars().count())
        .max()
        .unwrap_or(0);

    for row in &table.rows {
        let pad = width - row.label.chars().count();
        let _ = writeln!(out, "{}{}  {}", row.label, " ".repeat(pad), row.value);
    }
    out
}
