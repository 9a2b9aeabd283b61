//! Error types for lexgraph.
//!
//! All errors are strongly typed using thiserror. The taxonomy mirrors the
//! propagation policy: anything raised while loading or validating fixture
//! nodes is fatal and surfaces immediately (a pre-deployment condition),
//! while anything raised by a live query is absorbed into a low-confidence
//! result by the combiner rather than propagated to the caller.

use thiserror::Error;

use crate::node::{ModuleId, NodeId};

/// Validation errors raised while constructing rule nodes.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Required field '{field}' is missing")]
    MissingField {
        field: String,
    },

    #[error("Node ID cannot be empty")]
    EmptyNodeId,

    #[error("Citation cannot be empty")]
    EmptyCitation,

    #[error("Confidence value {value} is out of range [0.0, 1.0]")]
    ConfidenceOutOfRange {
        value: f32,
    },

    #[error("Node '{node_id}' has no populated dimension")]
    EmptyDimensions {
        node_id: NodeId,
    },
}

/// Fixture integrity violations detected at module load time.
///
/// A non-empty validation report for any node is a fatal load-time condition:
/// the registry refuses to register the module and the error names the exact
/// node so the corpus can be fixed before deployment.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Duplicate node ID '{node_id}' in module '{module_id}'")]
    DuplicateNode {
        node_id: NodeId,
        module_id: ModuleId,
    },

    #[error("Node '{node_id}' belongs to module '{actual}', expected '{expected}'")]
    ForeignNode {
        node_id: NodeId,
        expected: ModuleId,
        actual: ModuleId,
    },

    #[error("Node '{node_id}' references missing parent '{parent_id}'")]
    DanglingParent {
        node_id: NodeId,
        parent_id: NodeId,
    },

    #[error("Node '{node_id}' references missing child '{child_id}'")]
    DanglingChild {
        node_id: NodeId,
        child_id: NodeId,
    },

    #[error("Node '{node_id}' failed validation: {}", errors.join("; "))]
    InvalidNode {
        node_id: NodeId,
        errors: Vec<String>,
    },

    #[error("Fixture parse error: {message}")]
    Parse {
        message: String,
    },

    #[error("Fixture I/O error: {message}")]
    Io {
        message: String,
    },

    #[error("Fixture construction error: {0}")]
    Construct(#[from] ValidationError),
}

/// Access errors raised by a module before two-phase construction completes.
///
/// Every module method that touches the node map returns this instead of
/// silently operating on empty state when `initialize` has not run.
#[derive(Debug, Error)]
pub enum ModuleError {
    #[error("Module '{module_id}' is not initialized; call initialize() first")]
    NotInitialized {
        module_id: ModuleId,
    },
}

/// External search collaborator failures.
///
/// The combiner treats every variant identically to "search returned zero
/// hits" and degrades to the clarification path; no variant reaches callers
/// as a raw error.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Ranked search timed out after {duration_ms}ms")]
    Timeout {
        duration_ms: u64,
    },

    #[error("Search backend error: {message}")]
    Backend {
        message: String,
    },

    #[error("Search backend unavailable: {message}")]
    Unavailable {
        message: String,
    },
}

/// Top-level error type for lexgraph.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    #[error("Module error: {0}")]
    Module(#[from] ModuleError),

    #[error("Search error: {0}")]
    Search(#[from] SearchError),

    #[error("Module not found: {module_id}")]
    ModuleNotFound {
        module_id: ModuleId,
    },

    #[error("Internal error: {message}")]
    Internal {
        message: String,
    },
}

impl EngineError {
    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this error originated in fixture loading or validation.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::Load(_))
    }

    /// Returns true if this is a load error.
    #[must_use]
    pub const fn is_load(&self) -> bool {
        matches!(self, Self::Load(_))
    }

    /// Returns true if this is a search collaborator error.
    #[must_use]
    pub const fn is_search(&self) -> bool {
        matches!(self, Self::Search(_))
    }

    /// Returns true if the combiner absorbs this error into a clarification
    /// outcome instead of surfacing it.
    #[must_use]
    pub const fn degrades_to_clarification(&self) -> bool {
        matches!(
            self,
            Self::Search(_) | Self::ModuleNotFound { .. } | Self::Module(_)
        )
    }
}

/// Result type alias for lexgraph operations.
pub type LexResult<T> = Result<T, EngineError>;
