//! Reasoning results: the structured, auditable answer types.
//!
//! Unlike a flat result set, a `ReasoningResult` carries the conclusion
//! together with the full chain of reasoning steps that produced it, each
//! step anchored to a node, a citation, and an authority weight. Results
//! are produced per query and immutable once returned.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::authority::SourceType;
use crate::logic::Dimension;
use crate::node::{ModuleId, NodeId, RuleNode};

/// A node matched by an in-module search, with its relevance score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// The matched node.
    pub node: RuleNode,

    /// Deterministic relevance score; higher is better.
    pub relevance_score: f32,

    /// The highest-priority dimension the query matched in, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_dimension: Option<Dimension>,

    /// The dimension text that matched.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub matched_text: String,
}

/// Optional filters applied to an in-module search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchFilters {
    /// Restrict to one source type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_type: Option<SourceType>,

    /// Restrict to nodes valid at this instant (injected "now").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_at: Option<DateTime<Utc>>,
}

impl SearchFilters {
    /// Returns true if the node passes every set filter.
    #[must_use]
    pub fn accepts(&self, node: &RuleNode) -> bool {
        if let Some(st) = self.source_type {
            if node.source_type != st {
                return false;
            }
        }
        if let Some(at) = self.valid_at {
            if !node.is_valid_at(at) {
                return false;
            }
        }
        true
    }
}

/// A single step in a reasoning chain.
///
/// Steps are emitted in the fixed legal-argument order
/// GIVEN → WHICH → IF-THEN → WHAT → CAN/MUST → WHY.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReasoningStep {
    /// The node this step comes from.
    pub node_id: NodeId,

    /// The node's citation.
    pub citation: String,

    /// Which dimension the step's text comes from.
    pub dimension: Dimension,

    /// The step text, composed only from fixture content.
    pub text: String,

    /// Authority weight of the source node.
    pub authority_weight: f32,

    /// Source line of the underlying proposition, when recorded.
    /// For WHY steps this is the paragraph citation of a case-law quote.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_line: Option<String>,
}

/// Result of reasoning about a legal question within one module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReasoningResult {
    /// Natural-language conclusion built only from node text.
    pub conclusion: String,

    /// Module's self-assessed confidence in [0.0, 1.0].
    pub confidence: f32,

    /// The full chain of steps behind the conclusion.
    #[serde(default)]
    pub reasoning_chain: Vec<ReasoningStep>,

    /// The nodes the chain was assembled from.
    #[serde(default)]
    pub applicable_nodes: Vec<RuleNode>,

    /// Non-fatal caveats, e.g. "not applicable" markers.
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl ReasoningResult {
    /// Creates the "module does not apply" result: zero confidence, empty
    /// chain, and a warning naming the module. Callers must treat this as
    /// "not applicable", never as an error.
    #[must_use]
    pub fn not_applicable(module_id: &ModuleId) -> Self {
        Self {
            conclusion: String::new(),
            confidence: 0.0,
            reasoning_chain: Vec::new(),
            applicable_nodes: Vec::new(),
            warnings: vec![format!("No applicable rule found in module '{module_id}'")],
        }
    }

    /// Returns true if the module identified at least one applicable rule.
    #[must_use]
    pub fn is_applicable(&self) -> bool {
        !self.applicable_nodes.is_empty() && self.confidence > 0.0
    }

    /// Returns the steps for one dimension, in chain order.
    #[must_use]
    pub fn steps_for(&self, dimension: Dimension) -> Vec<&ReasoningStep> {
        self.reasoning_chain
            .iter()
            .filter(|s| s.dimension == dimension)
            .collect()
    }

    /// Returns the deduplicated, order-preserving node citations attached to
    /// WHY-dimension steps that carry a non-empty source line. These anchor
    /// the answer's rationale to its sources.
    #[must_use]
    pub fn why_citations(&self) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        let mut out = Vec::new();
        for step in &self.reasoning_chain {
            if step.dimension != Dimension::Why {
                continue;
            }
            let Some(line) = step.source_line.as_ref() else {
                continue;
            };
            if line.is_empty() {
                continue;
            }
            if seen.insert(step.citation.clone()) {
                out.push(step.citation.clone());
            }
        }
        out
    }
}
