//! Module metadata: the registry's view of a reasoning module.
//!
//! Metadata is used only for indexing and routing. It never participates in
//! reasoning, and requesting it must not trigger a module load.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::node::ModuleId;

/// The legal territory a module covers.
///
/// The router matches query topics against `topics`; the registry indexes
/// `topics` and `keywords` at registration time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleCoverage {
    /// Governing instrument, e.g. `Rules of Court - Order 21`.
    pub statute: String,

    /// Covered sections in human-readable form.
    #[serde(default)]
    pub sections: Vec<String>,

    /// Topic slugs the router maps queries onto.
    #[serde(default)]
    pub topics: Vec<String>,

    /// Free-text keywords for the registry's keyword index.
    #[serde(default)]
    pub keywords: Vec<String>,

    /// Jurisdictions the coverage applies to.
    #[serde(default = "default_jurisdictions")]
    pub jurisdictions: Vec<String>,
}

fn default_jurisdictions() -> Vec<String> {
    vec!["Singapore".to_string()]
}

impl ModuleCoverage {
    /// Creates coverage for a statute with the given topics and keywords.
    #[must_use]
    pub fn new(
        statute: impl Into<String>,
        topics: Vec<String>,
        keywords: Vec<String>,
    ) -> Self {
        Self {
            statute: statute.into(),
            sections: Vec::new(),
            topics,
            keywords,
            jurisdictions: default_jurisdictions(),
        }
    }

    /// Sets the covered sections.
    #[must_use]
    pub fn with_sections(mut self, sections: Vec<String>) -> Self {
        self.sections = sections;
        self
    }
}

/// Static description of a reasoning module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleMetadata {
    /// Unique module identifier.
    pub module_id: ModuleId,

    /// Human-readable name.
    pub name: String,

    /// Semantic version of the fixture corpus.
    pub version: String,

    /// What this module covers.
    pub coverage: ModuleCoverage,

    /// Static authority weight of the module's governing source.
    pub authority_weight: f32,

    /// When the covered instrument came into force.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_date: Option<DateTime<Utc>>,

    /// Other modules this one references.
    #[serde(default)]
    pub dependencies: Vec<ModuleId>,

    /// One-line description.
    #[serde(default)]
    pub description: String,
}

impl ModuleMetadata {
    /// Creates metadata with the required fields.
    #[must_use]
    pub fn new(
        module_id: impl Into<ModuleId>,
        name: impl Into<String>,
        version: impl Into<String>,
        coverage: ModuleCoverage,
        authority_weight: f32,
    ) -> Self {
        Self {
            module_id: module_id.into(),
            name: name.into(),
            version: version.into(),
            coverage,
            authority_weight: authority_weight.clamp(0.0, 1.0),
            effective_date: None,
            dependencies: Vec::new(),
            description: String::new(),
        }
    }

    /// Sets the effective date.
    #[must_use]
    pub fn with_effective_date(mut self, date: DateTime<Utc>) -> Self {
        self.effective_date = Some(date);
        self
    }

    /// Sets the module dependencies.
    #[must_use]
    pub fn with_dependencies(mut self, dependencies: Vec<ModuleId>) -> Self {
        self.dependencies = dependencies;
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}
