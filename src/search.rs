//! The external ranked-search collaborator interface.
//!
//! The engine does not implement keyword indexing itself; it consumes a
//! ranked-results contract. How the backend scores (BM25, embeddings, …)
//! is its own business, as long as each hit carries the owning node's full
//! serialized form whose `module_id` round-trips through the rule model
//! deserializer.

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use crate::error::SearchError;
use crate::node::{NodeId, RuleNode};

/// One hit from the external ranked search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedHit {
    /// ID of the matched node.
    pub node_id: NodeId,

    /// Raw backend relevance score; magnitude is backend-specific.
    pub score: f32,

    /// The owning node, deserialized from the backend's stored form.
    pub node: RuleNode,
}

impl RankedHit {
    /// Creates a hit from a node and its raw score.
    #[must_use]
    pub fn new(node: RuleNode, score: f32) -> Self {
        Self {
            node_id: node.node_id.clone(),
            score,
            node,
        }
    }
}

/// The ranked-search collaborator consumed by the hybrid combiner.
///
/// The call is the only operation in the engine that may legitimately
/// block; implementations must honour the caller-supplied timeout. The
/// combiner treats a timeout identically to zero hits—degrade, never hang.
/// Retry policy belongs to the integration layer, not here.
pub trait SearchBackend: Send + Sync {
    /// Returns up to `top_k` hits for the raw query, best first.
    ///
    /// # Errors
    ///
    /// Returns `SearchError` on backend failure or timeout; callers degrade
    /// rather than propagate.
    fn ranked_search(
        &self,
        query: &str,
        top_k: usize,
        timeout: Duration,
    ) -> Result<Vec<RankedHit>, SearchError>;
}
