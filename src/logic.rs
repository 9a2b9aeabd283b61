//! The six-dimensional logic vocabulary.
//!
//! Legal knowledge is decomposed into six dimensions mirroring the structure
//! of a legal argument:
//! - **WHAT**: holdings, rules, or facts established
//! - **WHICH**: scope and applicability boundaries
//! - **IF-THEN**: conditional logic and consequences
//! - **CAN/MUST**: deontic obligations and permissions
//! - **GIVEN**: prerequisites and assumptions
//! - **WHY**: rationale and policy considerations
//!
//! The same vocabulary classifies questions: "can I…" is a CAN/MUST
//! question, "why does…" is a WHY question.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the six logic dimensions.
///
/// Downstream consumers get exhaustiveness checking: a reasoning chain step
/// is tagged with a `Dimension`, never a free-form string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    /// Holdings, rules, facts.
    What,
    /// Scope and applicability.
    Which,
    /// Conditional logic.
    IfThen,
    /// Obligations and permissions.
    CanMust,
    /// Prerequisites.
    Given,
    /// Rationale and policy.
    Why,
}

impl Dimension {
    /// The fixed order in which a reasoning chain walks a node's dimensions:
    /// establish facts, scope, conditional logic, the rule itself, the
    /// resulting obligation, then the policy reason.
    pub const CHAIN_ORDER: [Self; 6] = [
        Self::Given,
        Self::Which,
        Self::IfThen,
        Self::What,
        Self::CanMust,
        Self::Why,
    ];
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::What => write!(f, "WHAT"),
            Self::Which => write!(f, "WHICH"),
            Self::IfThen => write!(f, "IF-THEN"),
            Self::CanMust => write!(f, "CAN-MUST"),
            Self::Given => write!(f, "GIVEN"),
            Self::Why => write!(f, "WHY"),
        }
    }
}

/// A single logical proposition.
///
/// Used for the WHAT, WHICH, GIVEN, and WHY dimensions. WHY propositions may
/// embed case-law summaries and verbatim quotes; `source_line` then carries
/// the paragraph citation and the text must be preserved verbatim downstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proposition {
    /// The proposition text.
    pub text: String,

    /// Confidence in [0.0, 1.0]; fixture content defaults to 1.0.
    #[serde(default = "default_confidence")]
    pub confidence: f32,

    /// Where in the source this proposition comes from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_line: Option<String>,
}

fn default_confidence() -> f32 {
    1.0
}

impl Proposition {
    /// Creates a proposition with full confidence and no source line.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            confidence: 1.0,
            source_line: None,
        }
    }

    /// Creates a proposition citing a source line.
    #[must_use]
    pub fn cited(text: impl Into<String>, source_line: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            confidence: 1.0,
            source_line: Some(source_line.into()),
        }
    }

    /// Sets the confidence, clamped to [0.0, 1.0].
    #[must_use]
    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = confidence.clamp(0.0, 1.0);
        self
    }
}

impl fmt::Display for Proposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (confidence: {:.2})", self.text, self.confidence)
    }
}

/// IF-THEN conditional logic: "IF condition met, THEN consequence follows".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conditional {
    /// The IF part.
    pub condition: String,

    /// The THEN part.
    pub consequence: String,

    /// Carve-outs that defeat the conditional.
    #[serde(default)]
    pub exceptions: Vec<String>,

    /// Confidence in [0.0, 1.0].
    #[serde(default = "default_confidence")]
    pub confidence: f32,

    /// Where in the source this conditional comes from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_line: Option<String>,
}

impl Conditional {
    /// Creates a conditional with no exceptions.
    #[must_use]
    pub fn new(condition: impl Into<String>, consequence: impl Into<String>) -> Self {
        Self {
            condition: condition.into(),
            consequence: consequence.into(),
            exceptions: Vec::new(),
            confidence: 1.0,
            source_line: None,
        }
    }

    /// Adds an exception.
    #[must_use]
    pub fn with_exception(mut self, exception: impl Into<String>) -> Self {
        self.exceptions.push(exception.into());
        self
    }

    /// Sets the source line.
    #[must_use]
    pub fn with_source_line(mut self, source_line: impl Into<String>) -> Self {
        self.source_line = Some(source_line.into());
        self
    }
}

impl fmt::Display for Conditional {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IF {} THEN {}", self.condition, self.consequence)?;
        if !self.exceptions.is_empty() {
            write!(f, " (EXCEPT: {})", self.exceptions.join(", "))?;
        }
        Ok(())
    }
}

/// Deontic modality applied to an action.
///
/// Captures the MUST/MAY/SHALL distinctions critical to legal reasoning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModalityType {
    /// Strict obligation, no discretion.
    Must,
    /// Formal legal obligation.
    Shall,
    /// Discretionary permission.
    May,
    /// Capability or possibility.
    Can,
    /// Non-binding recommendation.
    Should,
    /// Prohibition.
    ShallNot,
    /// Strict prohibition.
    MustNot,
    /// No permission.
    MayNot,
}

impl ModalityType {
    /// Returns true for permissive modalities (MAY, CAN).
    #[must_use]
    pub const fn is_permissive(self) -> bool {
        matches!(self, Self::May | Self::Can)
    }

    /// Returns true for obligatory modalities (MUST, SHALL).
    #[must_use]
    pub const fn is_obligatory(self) -> bool {
        matches!(self, Self::Must | Self::Shall)
    }

    /// Returns true for prohibitive modalities.
    #[must_use]
    pub const fn is_prohibitive(self) -> bool {
        matches!(self, Self::ShallNot | Self::MustNot | Self::MayNot)
    }
}

impl fmt::Display for ModalityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Must => write!(f, "MUST"),
            Self::Shall => write!(f, "SHALL"),
            Self::May => write!(f, "MAY"),
            Self::Can => write!(f, "CAN"),
            Self::Should => write!(f, "SHOULD"),
            Self::ShallNot => write!(f, "SHALL NOT"),
            Self::MustNot => write!(f, "MUST NOT"),
            Self::MayNot => write!(f, "MAY NOT"),
        }
    }
}

/// A modal obligation or permission attached to an action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Modality {
    /// The action governed by the modality.
    pub action: String,

    /// Which deontic operator applies.
    pub modality_type: ModalityType,

    /// Conditions under which the modality holds.
    #[serde(default)]
    pub conditions: Vec<String>,

    /// Confidence in [0.0, 1.0].
    #[serde(default = "default_confidence")]
    pub confidence: f32,

    /// Where in the source this modality comes from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_line: Option<String>,
}

impl Modality {
    /// Creates a modality with no conditions.
    #[must_use]
    pub fn new(action: impl Into<String>, modality_type: ModalityType) -> Self {
        Self {
            action: action.into(),
            modality_type,
            conditions: Vec::new(),
            confidence: 1.0,
            source_line: None,
        }
    }

    /// Adds a condition.
    #[must_use]
    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.conditions.push(condition.into());
        self
    }

    /// Sets the source line.
    #[must_use]
    pub fn with_source_line(mut self, source_line: impl Into<String>) -> Self {
        self.source_line = Some(source_line.into());
        self
    }
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.modality_type, self.action)?;
        if !self.conditions.is_empty() {
            write!(f, " (when: {})", self.conditions.join(", "))?;
        }
        Ok(())
    }
}
