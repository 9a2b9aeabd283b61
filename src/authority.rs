//! Legal source types and the authority hierarchy.
//!
//! Every rule node carries a source type, and every source type carries a
//! fixed authority weight used for tie-breaking and confidence scaling.
//! The hierarchy is constitution/statute > rule > appellate case > high
//! court case > lower court case.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Legal source type with a fixed position in the authority hierarchy.
///
/// # Examples
///
/// ```
/// use lexgraph::SourceType;
///
/// assert!(SourceType::Statute.authority_weight() > SourceType::Rule.authority_weight());
/// assert!(SourceType::Rule.authority_weight() > SourceType::LowerCourtCase.authority_weight());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    /// Supreme law.
    Constitution,
    /// Primary legislation.
    Statute,
    /// Subordinate legislation (e.g. Rules of Court).
    Rule,
    /// Binding precedent.
    AppellateCase,
    /// Persuasive precedent.
    HighCourtCase,
    /// Minimal precedent value.
    LowerCourtCase,
}

impl SourceType {
    /// Returns the fixed authority weight in [0.0, 1.0] for this source type.
    #[must_use]
    pub const fn authority_weight(self) -> f32 {
        match self {
            Self::Constitution | Self::Statute => 1.0,
            Self::Rule => 0.8,
            Self::AppellateCase => 0.7,
            Self::HighCourtCase => 0.6,
            Self::LowerCourtCase => 0.4,
        }
    }

    /// Returns true for legislative sources (constitution, statute, rule).
    #[must_use]
    pub const fn is_legislation(self) -> bool {
        matches!(self, Self::Constitution | Self::Statute | Self::Rule)
    }

    /// Returns true for case-law sources.
    #[must_use]
    pub const fn is_case_law(self) -> bool {
        !self.is_legislation()
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constitution => write!(f, "constitution"),
            Self::Statute => write!(f, "statute"),
            Self::Rule => write!(f, "rule"),
            Self::AppellateCase => write!(f, "appellate_case"),
            Self::HighCourtCase => write!(f, "high_court_case"),
            Self::LowerCourtCase => write!(f, "lower_court_case"),
        }
    }
}
