//! Rule nodes: the atomic unit of legal knowledge.
//!
//! A `RuleNode` is one legal proposition decomposed into the six logic
//! dimensions, with explicit authority, tree position, cross-references,
//! and temporal validity. Nodes are constructed once at module load time
//! from expert-validated fixtures and are immutable thereafter; they are
//! never created or mutated at query time.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::authority::SourceType;
use crate::error::ValidationError;
use crate::logic::{Conditional, Dimension, Modality, Proposition};

/// Unique identifier of a rule node, e.g. `order21_rule1`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Creates a node ID from a fixture identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the ID is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for NodeId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Unique identifier of a reasoning module, e.g. `order_21`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleId(String);

impl ModuleId {
    /// Creates a module ID.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ModuleId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ModuleId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Non-ownership cross-references between nodes.
///
/// These form a graph, not a tree: they are resolved lazily against the
/// owning module or registry and never create ownership cycles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrossReferences {
    /// Cases interpreting this rule.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interprets: Vec<NodeId>,

    /// Extensions or elaborations.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extends: Vec<NodeId>,

    /// Authorities that overruled this node.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub overruled_by: Vec<NodeId>,

    /// Authorities distinguished from this node.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub distinguishes: Vec<NodeId>,

    /// Contradicting authorities.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conflicts_with: Vec<NodeId>,

    /// Reconciling authorities.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub harmonizes_with: Vec<NodeId>,
}

impl CrossReferences {
    /// Returns true if no cross-reference is recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.interprets.is_empty()
            && self.extends.is_empty()
            && self.overruled_by.is_empty()
            && self.distinguishes.is_empty()
            && self.conflicts_with.is_empty()
            && self.harmonizes_with.is_empty()
    }
}

/// The atomic unit of legal knowledge: a six-dimensional rule node.
///
/// # Examples
///
/// ```
/// use lexgraph::{Proposition, RuleNode, SourceType};
///
/// let node = RuleNode::builder()
///     .node_id("order21_rule1")
///     .citation("Order 21 Rule 1")
///     .source_type(SourceType::Rule)
///     .module_id("order_21")
///     .what(Proposition::cited(
///         "Default judgment may be entered against a defendant who fails to defend",
///         "Order 21 Rule 1(1)",
///     ))
///     .build()
///     .unwrap();
///
/// assert!((node.authority_weight() - 0.8).abs() < f32::EPSILON);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleNode {
    /// Unique identifier.
    pub node_id: NodeId,

    /// Human-readable source reference, e.g. `Order 21 Rule 1(1)`.
    pub citation: String,

    /// Position in the authority hierarchy.
    pub source_type: SourceType,

    /// Holdings, rules, facts.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub what: Vec<Proposition>,

    /// Scope and applicability.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub which: Vec<Proposition>,

    /// Conditional logic.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub if_then: Vec<Conditional>,

    /// Obligations and permissions.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub can_must: Vec<Modality>,

    /// Prerequisites.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub given: Vec<Proposition>,

    /// Rationale and policy; may carry verbatim case-law quotes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub why: Vec<Proposition>,

    /// Single owner in the module's forest; roots have none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<NodeId>,

    /// Ordered children, resolvable within the same module.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children_ids: Vec<NodeId>,

    /// Non-ownership relations to other nodes.
    #[serde(default, skip_serializing_if = "CrossReferences::is_empty")]
    pub cross_refs: CrossReferences,

    /// When this node became effective law; absent serializes as explicit
    /// null, never epoch zero.
    pub effective_date: Option<DateTime<Utc>>,

    /// When this node was overruled, if ever; absent serializes as null.
    pub overruled_date: Option<DateTime<Utc>>,

    /// Flat text consumed by the external keyword index.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub full_text: String,

    /// The module that owns this node.
    pub module_id: ModuleId,
}

impl RuleNode {
    /// Starts building a rule node.
    #[must_use]
    pub fn builder() -> RuleNodeBuilder {
        RuleNodeBuilder::default()
    }

    /// Returns the authority weight of this node's source type.
    #[must_use]
    pub fn authority_weight(&self) -> f32 {
        self.source_type.authority_weight()
    }

    /// Returns true if this node is valid law at the supplied instant:
    /// `effective_date <= now < overruled_date` (open-ended when no
    /// overruled date exists).
    #[must_use]
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        if let Some(effective) = self.effective_date {
            if effective > now {
                return false;
            }
        }
        if let Some(overruled) = self.overruled_date {
            if overruled <= now {
                return false;
            }
        }
        true
    }

    /// Returns true if this node is currently valid law.
    #[must_use]
    pub fn is_currently_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }

    /// Returns true if at least one of the six dimensions is populated.
    #[must_use]
    pub fn has_any_dimension(&self) -> bool {
        !self.what.is_empty()
            || !self.which.is_empty()
            || !self.if_then.is_empty()
            || !self.can_must.is_empty()
            || !self.given.is_empty()
            || !self.why.is_empty()
    }

    /// Returns the rendered texts of one dimension, in fixture order.
    #[must_use]
    pub fn dimension_texts(&self, dimension: Dimension) -> Vec<String> {
        match dimension {
            Dimension::What => self.what.iter().map(|p| p.text.clone()).collect(),
            Dimension::Which => self.which.iter().map(|p| p.text.clone()).collect(),
            Dimension::IfThen => self.if_then.iter().map(ToString::to_string).collect(),
            Dimension::CanMust => self.can_must.iter().map(ToString::to_string).collect(),
            Dimension::Given => self.given.iter().map(|p| p.text.clone()).collect(),
            Dimension::Why => self.why.iter().map(|p| p.text.clone()).collect(),
        }
    }
}

impl fmt::Display for RuleNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RuleNode({})", self.citation)
    }
}

/// Builder for [`RuleNode`].
///
/// Enforces the node invariant at construction time: non-empty `node_id`
/// and `citation`, an owning module, and at least one populated dimension.
#[derive(Debug, Default)]
pub struct RuleNodeBuilder {
    node_id: Option<NodeId>,
    citation: Option<String>,
    source_type: Option<SourceType>,
    what: Vec<Proposition>,
    which: Vec<Proposition>,
    if_then: Vec<Conditional>,
    can_must: Vec<Modality>,
    given: Vec<Proposition>,
    why: Vec<Proposition>,
    parent_id: Option<NodeId>,
    children_ids: Vec<NodeId>,
    cross_refs: CrossReferences,
    effective_date: Option<DateTime<Utc>>,
    overruled_date: Option<DateTime<Utc>>,
    full_text: String,
    module_id: Option<ModuleId>,
}

impl RuleNodeBuilder {
    /// Sets the node ID.
    #[must_use]
    pub fn node_id(mut self, id: impl Into<NodeId>) -> Self {
        self.node_id = Some(id.into());
        self
    }

    /// Sets the citation.
    #[must_use]
    pub fn citation(mut self, citation: impl Into<String>) -> Self {
        self.citation = Some(citation.into());
        self
    }

    /// Sets the source type.
    #[must_use]
    pub fn source_type(mut self, source_type: SourceType) -> Self {
        self.source_type = Some(source_type);
        self
    }

    /// Sets the owning module.
    #[must_use]
    pub fn module_id(mut self, module_id: impl Into<ModuleId>) -> Self {
        self.module_id = Some(module_id.into());
        self
    }

    /// Appends a WHAT proposition.
    #[must_use]
    pub fn what(mut self, proposition: Proposition) -> Self {
        self.what.push(proposition);
        self
    }

    /// Appends a WHICH proposition.
    #[must_use]
    pub fn which(mut self, proposition: Proposition) -> Self {
        self.which.push(proposition);
        self
    }

    /// Appends an IF-THEN conditional.
    #[must_use]
    pub fn if_then(mut self, conditional: Conditional) -> Self {
        self.if_then.push(conditional);
        self
    }

    /// Appends a CAN/MUST modality.
    #[must_use]
    pub fn can_must(mut self, modality: Modality) -> Self {
        self.can_must.push(modality);
        self
    }

    /// Appends a GIVEN proposition.
    #[must_use]
    pub fn given(mut self, proposition: Proposition) -> Self {
        self.given.push(proposition);
        self
    }

    /// Appends a WHY proposition.
    #[must_use]
    pub fn why(mut self, proposition: Proposition) -> Self {
        self.why.push(proposition);
        self
    }

    /// Sets the parent node.
    #[must_use]
    pub fn parent_id(mut self, parent: impl Into<NodeId>) -> Self {
        self.parent_id = Some(parent.into());
        self
    }

    /// Appends a child node.
    #[must_use]
    pub fn child(mut self, child: impl Into<NodeId>) -> Self {
        self.children_ids.push(child.into());
        self
    }

    /// Appends an "interpreted by" cross-reference.
    #[must_use]
    pub fn interprets(mut self, node: impl Into<NodeId>) -> Self {
        self.cross_refs.interprets.push(node.into());
        self
    }

    /// Appends an "extends" cross-reference.
    #[must_use]
    pub fn extends(mut self, node: impl Into<NodeId>) -> Self {
        self.cross_refs.extends.push(node.into());
        self
    }

    /// Appends an "overruled by" cross-reference.
    #[must_use]
    pub fn overruled_by(mut self, node: impl Into<NodeId>) -> Self {
        self.cross_refs.overruled_by.push(node.into());
        self
    }

    /// Sets the effective date.
    #[must_use]
    pub fn effective_date(mut self, date: DateTime<Utc>) -> Self {
        self.effective_date = Some(date);
        self
    }

    /// Sets the overruled date.
    #[must_use]
    pub fn overruled_date(mut self, date: DateTime<Utc>) -> Self {
        self.overruled_date = Some(date);
        self
    }

    /// Sets the flat search text.
    #[must_use]
    pub fn full_text(mut self, text: impl Into<String>) -> Self {
        self.full_text = text.into();
        self
    }

    /// Builds the node.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` when a required field is missing or empty,
    /// or when no dimension is populated.
    pub fn build(self) -> Result<RuleNode, ValidationError> {
        let node_id = self.node_id.ok_or(ValidationError::MissingField {
            field: "node_id".to_string(),
        })?;
        if node_id.is_empty() {
            return Err(ValidationError::EmptyNodeId);
        }

        let citation = self.citation.ok_or(ValidationError::MissingField {
            field: "citation".to_string(),
        })?;
        if citation.is_empty() {
            return Err(ValidationError::EmptyCitation);
        }

        let source_type = self.source_type.ok_or(ValidationError::MissingField {
            field: "source_type".to_string(),
        })?;

        let module_id = self.module_id.ok_or(ValidationError::MissingField {
            field: "module_id".to_string(),
        })?;

        let node = RuleNode {
            node_id,
            citation,
            source_type,
            what: self.what,
            which: self.which,
            if_then: self.if_then,
            can_must: self.can_must,
            given: self.given,
            why: self.why,
            parent_id: self.parent_id,
            children_ids: self.children_ids,
            cross_refs: self.cross_refs,
            effective_date: self.effective_date,
            overruled_date: self.overruled_date,
            full_text: self.full_text,
            module_id,
        };

        if !node.has_any_dimension() {
            return Err(ValidationError::EmptyDimensions {
                node_id: node.node_id,
            });
        }

        Ok(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::ModalityType;
    use chrono::TimeZone;

    fn make_test_node() -> RuleNode {
        RuleNode::builder()
            .node_id("order21_rule1")
            .citation("Order 21 Rule 1")
            .source_type(SourceType::Rule)
            .module_id("order_21")
            .what(Proposition::cited(
                "Default judgment may be entered against a defendant who fails to defend",
                "Order 21 Rule 1(1)",
            ))
            .if_then(
                Conditional::new(
                    "defendant fails to file defence within prescribed time",
                    "claimant may apply for default judgment",
                )
                .with_exception("if leave to file a late defence is granted")
                .with_source_line("Order 21 Rule 1(1)"),
            )
            .can_must(
                Modality::new("apply for default judgment", ModalityType::May)
                    .with_condition("after time for filing defence has expired")
                    .with_source_line("Order 21 Rule 1(1)"),
            )
            .given(Proposition::cited(
                "Service of the originating claim was properly effected",
                "Order 7",
            ))
            .why(Proposition::cited(
                "To prevent defendants from delaying proceedings indefinitely",
                "Practice Directions",
            ))
            .full_text("Where a defendant has failed to file a defence the claimant may apply for default judgment.")
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_success() {
        let node = make_test_node();
        assert_eq!(node.node_id.as_str(), "order21_rule1");
        assert_eq!(node.module_id.as_str(), "order_21");
        assert!(node.has_any_dimension());
        assert!((node.authority_weight() - 0.8).abs() < f32::EPSILON);
    }

    #[test]
    fn test_builder_missing_node_id() {
        let result = RuleNode::builder()
            .citation("Order 21")
            .source_type(SourceType::Rule)
            .module_id("order_21")
            .what(Proposition::new("text"))
            .build();
        assert!(matches!(
            result,
            Err(ValidationError::MissingField { field }) if field == "node_id"
        ));
    }

    #[test]
    fn test_builder_empty_citation() {
        let result = RuleNode::builder()
            .node_id("n1")
            .citation("")
            .source_type(SourceType::Rule)
            .module_id("m")
            .what(Proposition::new("text"))
            .build();
        assert!(matches!(result, Err(ValidationError::EmptyCitation)));
    }

    #[test]
    fn test_builder_rejects_all_empty_dimensions() {
        let result = RuleNode::builder()
            .node_id("n1")
            .citation("Some Act s.1")
            .source_type(SourceType::Statute)
            .module_id("m")
            .build();
        assert!(matches!(
            result,
            Err(ValidationError::EmptyDimensions { node_id }) if node_id.as_str() == "n1"
        ));
    }

    #[test]
    fn test_temporal_validity_with_injected_now() {
        let effective = Utc.with_ymd_and_hms(2022, 4, 1, 0, 0, 0).unwrap();
        let overruled = Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap();

        let node = RuleNode::builder()
            .node_id("n1")
            .citation("Old Rule")
            .source_type(SourceType::Rule)
            .module_id("m")
            .what(Proposition::new("superseded holding"))
            .effective_date(effective)
            .overruled_date(overruled)
            .build()
            .unwrap();

        let before = Utc.with_ymd_and_hms(2022, 3, 31, 0, 0, 0).unwrap();
        let during = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
        let after = Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap();

        assert!(!node.is_valid_at(before));
        assert!(node.is_valid_at(during));
        // Overruled date is exclusive of validity.
        assert!(!node.is_valid_at(after));
        // Effective date itself is valid.
        assert!(node.is_valid_at(effective));
    }

    #[test]
    fn test_no_dates_always_valid() {
        let node = make_test_node();
        assert!(node.is_valid_at(Utc.with_ymd_and_hms(1990, 1, 1, 0, 0, 0).unwrap()));
        assert!(node.is_currently_valid());
    }

    #[test]
    fn test_dimension_texts_render_conditionals_and_modalities() {
        let node = make_test_node();
        let if_then = node.dimension_texts(Dimension::IfThen);
        assert_eq!(if_then.len(), 1);
        assert!(if_then[0].starts_with("IF "));

        let can_must = node.dimension_texts(Dimension::CanMust);
        assert!(can_must[0].starts_with("MAY "));

        assert!(node.dimension_texts(Dimension::Which).is_empty());
    }

    #[test]
    fn test_serde_round_trip_all_fields() {
        let effective = Utc.with_ymd_and_hms(2021, 12, 1, 0, 0, 0).unwrap();
        let mut node = make_test_node();
        node.effective_date = Some(effective);
        node.parent_id = Some(NodeId::new("order21_root"));
        node.children_ids = vec![NodeId::new("order21_rule2")];
        node.cross_refs.interprets = vec![NodeId::new("case_huttons")];

        let json = serde_json::to_string(&node).unwrap();
        let back: RuleNode = serde_json::from_str(&json).unwrap();
        assert_eq!(node, back);
    }

    #[test]
    fn test_serde_absent_dates_are_null_not_epoch() {
        let node = make_test_node();
        let json = serde_json::to_string(&node).unwrap();
        assert!(json.contains("\"effective_date\":null"));
        assert!(json.contains("\"overruled_date\":null"));

        let back: RuleNode = serde_json::from_str(&json).unwrap();
        assert!(back.effective_date.is_none());
        assert!(back.overruled_date.is_none());
        assert_eq!(node, back);
    }

    #[test]
    fn test_serde_dates_are_iso8601() {
        let mut node = make_test_node();
        node.effective_date = Some(Utc.with_ymd_and_hms(2021, 12, 1, 0, 0, 0).unwrap());
        let json = serde_json::to_string(&node).unwrap();
        assert!(json.contains("2021-12-01T00:00:00Z"));
    }

    #[test]
    fn test_node_id_ordering_is_lexicographic() {
        let a = NodeId::new("order21_rule1");
        let b = NodeId::new("order21_rule2");
        assert!(a < b);
    }

    #[test]
    fn test_cross_references_empty_detection() {
        let mut refs = CrossReferences::default();
        assert!(refs.is_empty());
        refs.extends.push(NodeId::new("n2"));
        assert!(!refs.is_empty());
    }
}
