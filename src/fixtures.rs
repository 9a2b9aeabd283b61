//! Fixture loading for external rule corpora.
//!
//! The bundled modules construct their nodes in code, but a module's
//! fixture source can equally be a JSON file carrying one record per rule
//! node. Records deserialize through the rule-model serde representation
//! and feed the same integrity gate as any other loader: missing node IDs
//! or citations, dangling parent/child references, and duplicate nodes
//! all fail loudly at load time, never silently dropped.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::LoadError;
use crate::node::{ModuleId, RuleNode};
use crate::tree::LogicTree;

/// Parses fixture records from a JSON array of rule nodes.
///
/// # Errors
///
/// Returns `LoadError::Parse` when the JSON is malformed or a record is
/// missing a required field such as `node_id` or `citation`.
pub fn nodes_from_json(json: &str) -> Result<Vec<RuleNode>, LoadError> {
    serde_json::from_str(json).map_err(|e| LoadError::Parse {
        message: e.to_string(),
    })
}

/// Reads fixture records from a JSON file.
///
/// # Errors
///
/// Returns `LoadError::Io` when the file cannot be read and
/// `LoadError::Parse` when its contents are not valid fixture records.
pub fn nodes_from_file(path: &Path) -> Result<Vec<RuleNode>, LoadError> {
    let file = File::open(path).map_err(|e| LoadError::Io {
        message: format!("{}: {e}", path.display()),
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| LoadError::Parse {
        message: format!("{}: {e}", path.display()),
    })
}

/// Loads a module's logic tree from a JSON fixture file, running the full
/// load-time integrity gate.
///
/// # Errors
///
/// Returns `LoadError` on unreadable files, malformed records, or fixture
/// integrity violations (see [`LogicTree::from_nodes`]).
pub fn tree_from_file(
    module_id: impl Into<ModuleId>,
    path: &Path,
) -> Result<LogicTree, LoadError> {
    LogicTree::from_nodes(module_id, nodes_from_file(path)?)
}
