//! # Lexgraph - Six-Dimensional Legal Logic Engine
//!
//! Lexgraph answers natural-language legal questions by combining keyword
//! retrieval over a structured rule corpus with a formal, auditable
//! reasoning trace. Legal knowledge lives in six-dimensional rule nodes
//! (WHAT / WHICH / IF-THEN / CAN-MUST / GIVEN / WHY); per-domain reasoning
//! modules own a tree of those nodes; a registry routes queries to the
//! right modules; and a hybrid combiner merges keyword relevance with
//! rule-based confidence, gating between a direct answer and a request
//! for clarification.
//!
//! ## Core Concepts
//!
//! - **RuleNode**: an atomic legal proposition with authority, tree
//!   position, cross-references, and temporal validity
//! - **ReasoningModule**: a pluggable unit owning one legal domain's tree
//! - **ModuleRegistry / QueryRouter**: topic-indexed discovery and intent
//!   classification
//! - **HybridEngine**: ranked search + module reasoning + the
//!   clarification gate
//!
//! Reasoning here is deterministic selection and assembly of pre-authored,
//! expert-validated logical fragments, never derivation of new conclusions.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use lexgraph::{
//!     DefaultJudgmentModule, EngineConfig, EntityClarifier, HybridEngine,
//!     ModuleRegistry,
//! };
//!
//! let mut registry = ModuleRegistry::new();
//! registry.register(Arc::new(DefaultJudgmentModule::new()))?;
//!
//! let config = EngineConfig::default();
//! let engine = HybridEngine::new(&config, registry, backend, Arc::new(EntityClarifier));
//! let response = engine.answer("Can I get default judgment if defendant didn't respond?");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod authority;
pub mod combiner;
pub mod config;
pub mod error;
pub mod fixtures;
pub mod logic;
pub mod metadata;
pub mod module;
pub mod modules;
pub mod node;
pub mod reasoning;
pub mod registry;
pub mod router;
pub mod search;
pub mod tree;

// Re-export primary types at the crate root for convenience
pub use authority::SourceType;
pub use combiner::{
    Clarifier, EntityClarifier, GateDecision, HybridEngine, HybridResponse, Outcome,
};
pub use config::EngineConfig;
pub use error::{
    EngineError, LexResult, LoadError, ModuleError, SearchError, ValidationError,
};
pub use logic::{Conditional, Dimension, Modality, ModalityType, Proposition};
pub use metadata::{ModuleCoverage, ModuleMetadata};
pub use module::{DispatchRule, ModuleCore, ReasoningModule, MAX_TARGET_NODES};
pub use modules::{
    AmicableResolutionModule, CostsModule, DefaultJudgmentModule, PaymentIntoCourtModule,
};
pub use node::{CrossReferences, ModuleId, NodeId, RuleNode, RuleNodeBuilder};
pub use reasoning::{ReasoningResult, ReasoningStep, SearchFilters, SearchResult};
pub use registry::{ModuleRegistry, RegistryStatistics};
pub use router::{QueryEntities, QueryIntent, QueryRouter, TimePeriod};
pub use search::{RankedHit, SearchBackend};
pub use tree::{LogicTree, TraversalDirection};
