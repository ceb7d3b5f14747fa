// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! IFC-Inspector - print spatial trees and property tables of a model dump.
//!
//! Usage:
//!   ifc-inspector <dump.json> [--element <id>] [--pset <id>] [--tree] [--group] [--json]
//!
//! Without `--element` the spatial tree is printed. With it, the element's
//! identification table and every property/quantity set table follow;
//! `--pset` narrows that to one table (`0` is identification).
//!
//! # Environment
//!
//! - `INSPECTOR_OUTPUT` - `text` (default) or `json`
//! - `INSPECTOR_GROUP_CATEGORIES` - group mixed-type siblings in the tree
//! - `INSPECTOR_MODEL_ID` - model id to load the dump under
//! - `RUST_LOG` - tracing filter

use anyhow::Context;
use ifc_inspector_core::{
    build_property_set, build_tree_with, initial_selection, merge_element, navigation,
    BuildContext, ExpressId, ModelStore, NavItem, Row, TreeOptions, UNKNOWN,
};
use tracing_subscriber::EnvFilter;

mod config;
mod dump;
mod error;
mod render;

use config::{Args, Config, OutputFormat};
use render::{Report, Table};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env();

    // Initialize logging; stdout is reserved for the report
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let Some(args) = Args::parse(std::env::args().skip(1))? else {
        print_usage();
        return Ok(());
    };

    let format = if args.json {
        OutputFormat::Json
    } else {
        config.output
    };
    let options = TreeOptions {
        group_categories: args.group || config.group_categories,
    };

    tracing::debug!(?args, ?format, ?options, "Starting IFC-Inspector");

    let loaded = dump::load(&args.dump, config.model_id)
        .await
        .with_context(|| format!("loading {}", args.dump.display()))?;
    let store = &loaded.store;
    let model_id = loaded.model_id;

    let mut report = Report::default();

    if args.tree || args.element.is_none() {
        let root = store.spatial_structure(model_id).await?;
        let tree = build_tree_with(store, model_id, &root, options).await?;
        let checked = initial_selection(&tree);

        if format == OutputFormat::Text {
            print!("{}", render::tree_text(&tree, &checked));
        }
        let mut selected: Vec<ExpressId> = checked.into_iter().collect();
        selected.sort_unstable();
        report.selected = selected;
        report.tree = Some(tree);
    }

    if let Some(element_id) = args.element {
        let ctx = BuildContext::new(model_id).select(element_id);
        let element = merge_element(store, model_id, element_id)
            .await
            .with_context(|| format!("resolving element #{}", element_id))?;

        let items = select_tables(navigation(&element), args.pset);
        report.element = Some(element_id);

        for item in items {
            let rows = match build_property_set(store, &ctx, item.target).await {
                Ok(rows) => rows,
                Err(e) => {
                    tracing::warn!(error = %e, target = item.target, "Table build failed");
                    vec![Row::new(item.label.clone(), UNKNOWN)]
                }
            };
            let table = Table { item, rows };

            if format == OutputFormat::Text {
                println!();
                print!("{}", render::table_text(&table));
            }
            report.tables.push(table);
        }
    }

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    Ok(())
}

/// Tables to print: all navigation entries, or the one `--pset` names.
/// An id that is not in the navigation list is still tried as a property set.
fn select_tables(items: Vec<NavItem>, pset: Option<ExpressId>) -> Vec<NavItem> {
    let Some(target) = pset else {
        return items;
    };

    match items.into_iter().find(|item| item.target == target) {
        Some(item) => vec![item],
        None => vec![NavItem {
            label: format!("#{}", target),
            target,
        }],
    }
}

fn print_usage() {
    println!("IFC-Inspector - spatial trees and property tables of IFC model dumps");
    println!();
    println!("Usage:");
    println!("  ifc-inspector <dump.json> [options]");
    println!();
    println!("Options:");
    println!("  --element <id>  Show the tables of one element");
    println!("  --pset <id>     Only show one table (0 = identification)");
    println!("  --tree          Print the spatial tree as well");
    println!("  --group         Group mixed-type siblings in the tree");
    println!("  --json          Print JSON instead of text");
    println!("  -h, --help      Show this help");
}
