// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Inspector configuration loaded from environment variables and arguments.

use crate::error::InspectorError;
use ifc_inspector_core::{ExpressId, ModelId};
use std::path::PathBuf;

/// Tracing filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "warn,ifc_inspector=info";

/// Output format for trees and tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "text" => Some(OutputFormat::Text),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }
}

/// Inspector configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Output format (`INSPECTOR_OUTPUT`).
    pub output: OutputFormat,
    /// Group mixed-type siblings in the tree (`INSPECTOR_GROUP_CATEGORIES`).
    pub group_categories: bool,
    /// Overrides the model id stored in the dump (`INSPECTOR_MODEL_ID`).
    pub model_id: Option<ModelId>,
    /// Tracing filter (`RUST_LOG`).
    pub log_filter: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            output: std::env::var("INSPECTOR_OUTPUT")
                .ok()
                .and_then(|v| OutputFormat::parse(&v))
                .unwrap_or(OutputFormat::Text),
            group_categories: std::env::var("INSPECTOR_GROUP_CATEGORIES")
                .map(|v| parse_bool(&v))
                .unwrap_or(false),
            model_id: std::env::var("INSPECTOR_MODEL_ID")
                .ok()
                .and_then(|v| v.trim().parse().ok()),
            log_filter: std::env::var("RUST_LOG")
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Command-line arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    /// JSON model dump to load.
    pub dump: PathBuf,
    /// Element to show tables for.
    pub element: Option<ExpressId>,
    /// Only show this property set (0 = identification).
    pub pset: Option<ExpressId>,
    /// Print the spatial tree even when an element is given.
    pub tree: bool,
    /// Force JSON output.
    pub json: bool,
    /// Force category grouping.
    pub group: bool,
}

impl Args {
    /// Parse arguments (without the program name).
    /// Returns `Ok(None)` when help was requested.
    pub fn parse<I>(args: I) -> Result<Option<Self>, InspectorError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter();
        let mut dump = None;
        let mut element = None;
        let mut pset = None;
        let mut tree = false;
        let mut json = false;
        let mut group = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "-h" | "--help" => return Ok(None),
                "--element" => element = Some(parse_id("--element", args.next())?),
                "--pset" => pset = Some(parse_id("--pset", args.next())?),
                "--tree" => tree = true,
                "--json" => json = true,
                "--group" => group = true,
                flag if flag.starts_with("--") => {
                    return Err(InspectorError::Usage(format!("unknown option {}", flag)));
                }
                path if dump.is_none() => dump = Some(PathBuf::from(path)),
                extra => {
                    return Err(InspectorError::Usage(format!("unexpected argument {}", extra)));
                }
            }
        }

        let dump = dump.ok_or_else(|| InspectorError::Usage("missing model dump path".into()))?;
        if pset.is_some() && element.is_none() {
            return Err(InspectorError::Usage("--pset needs --element".into()));
        }

        Ok(Some(Self {
            dump,
            element,
            pset,
            tree,
            json,
            group,
        }))
    }
}

fn parse_id(flag: &str, value: Option<String>) -> Result<ExpressId, InspectorError> {
    let value = value.ok_or_else(|| InspectorError::Usage(format!("{} needs a value", flag)))?;
    value
        .trim_start_matches('#')
        .parse()
        .map_err(|_| InspectorError::Usage(format!("{} expects an express id, got {}", flag, value)))
}
