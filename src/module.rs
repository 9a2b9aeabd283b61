//! The reasoning module contract and its shared algorithms.
//!
//! A reasoning module owns the logic tree for one legal domain and exposes
//! the capability set {metadata, initialize, search, reason}. Concrete
//! modules supply data (fixture nodes, coverage metadata, and a keyword
//! dispatch table) while the deterministic search and reasoning algorithms
//! are provided here so every domain behaves identically.
//!
//! Reasoning is deliberately not inference: it is deterministic selection
//! and assembly of pre-authored logical fragments. The corpus is
//! expert-validated for exactly this mapping.

use std::sync::OnceLock;

use crate::error::{LoadError, ModuleError};
use crate::logic::Dimension;
use crate::metadata::ModuleMetadata;
use crate::node::{ModuleId, NodeId, RuleNode};
use crate::reasoning::{ReasoningResult, ReasoningStep, SearchFilters, SearchResult};
use crate::tree::LogicTree;

/// Upper bound on target nodes per question, keeping chains readable.
pub const MAX_TARGET_NODES: usize = 3;

/// Relative weight of each dimension in search scoring.
///
/// Holdings are more salient than rationale: WHAT > WHICH/IF-THEN > WHY.
const fn dimension_weight(dimension: Dimension) -> f32 {
    match dimension {
        Dimension::What => 2.0,
        Dimension::Which | Dimension::IfThen | Dimension::CanMust => 1.5,
        Dimension::Given => 1.0,
        Dimension::Why => 0.5,
    }
}

const CITATION_WEIGHT: f32 = 1.0;
const FULL_TEXT_WEIGHT: f32 = 0.5;

/// Dimension order used to pick the reported match, most salient first.
const MATCH_PRIORITY: [Dimension; 6] = [
    Dimension::What,
    Dimension::Which,
    Dimension::IfThen,
    Dimension::CanMust,
    Dimension::Given,
    Dimension::Why,
];

/// One entry of a module's keyword dispatch table.
///
/// Rules are consulted in declaration order; a rule fires when any of its
/// keywords appears in the lowercased question. A rule with no keywords is
/// a fallback that fires only when no keyword rule matched.
#[derive(Debug, Clone)]
pub struct DispatchRule {
    keywords: Vec<String>,
    target: NodeId,
    confidence: f32,
}

impl DispatchRule {
    /// Creates a keyword rule targeting one node.
    #[must_use]
    pub fn new(keywords: &[&str], target: impl Into<NodeId>, confidence: f32) -> Self {
        Self {
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
            target: target.into(),
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    /// Creates a fallback rule that fires when nothing else matched.
    #[must_use]
    pub fn fallback(target: impl Into<NodeId>, confidence: f32) -> Self {
        Self {
            keywords: Vec::new(),
            target: target.into(),
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    /// The node this rule selects.
    #[must_use]
    pub fn target(&self) -> &NodeId {
        &self.target
    }

    fn is_fallback(&self) -> bool {
        self.keywords.is_empty()
    }

    fn matches(&self, question_lower: &str) -> bool {
        self.keywords.iter().any(|k| question_lower.contains(k))
    }
}

/// Two-phase construction slot shared by all concrete modules.
///
/// Phase one is plain struct construction; phase two builds the immutable
/// `LogicTree` exactly once. Methods that need the tree fail with an
/// explicit `NotInitialized` error until phase two completes.
#[derive(Debug, Default)]
pub struct ModuleCore {
    slot: OnceLock<LogicTree>,
}

impl ModuleCore {
    /// Creates an uninitialized core.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs phase two: builds the tree from fixture nodes.
    ///
    /// Idempotent; subsequent calls are no-ops with identical effect.
    ///
    /// # Errors
    ///
    /// Returns `LoadError` when the fixture violates integrity; the slot
    /// stays empty so the failure repeats on retry rather than masking it.
    pub fn initialize_with<F>(&self, module_id: &ModuleId, loader: F) -> Result<(), LoadError>
    where
        F: FnOnce() -> Result<Vec<RuleNode>, LoadError>,
    {
        if self.slot.get().is_some() {
            return Ok(());
        }
        let tree = LogicTree::from_nodes(module_id.clone(), loader()?)?;
        // A concurrent initializer may have won the race; both built the
        // same fixture, so losing the set is harmless.
        let _ = self.slot.set(tree);
        Ok(())
    }

    /// Returns the tree, or `NotInitialized` before phase two.
    pub fn tree(&self, module_id: &ModuleId) -> Result<&LogicTree, ModuleError> {
        self.slot.get().ok_or_else(|| ModuleError::NotInitialized {
            module_id: module_id.clone(),
        })
    }

    /// Returns true once phase two has completed.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.slot.get().is_some()
    }
}

/// A pluggable reasoning unit owning the logic tree of one legal domain.
///
/// The registry talks to `metadata()` only; reasoning never reads metadata.
pub trait ReasoningModule: Send + Sync {
    /// Static description for registry indexing. Must not trigger loading.
    fn metadata(&self) -> ModuleMetadata;

    /// Loads all fixture nodes into the module's immutable tree.
    ///
    /// Idempotent; safe to call multiple times with identical effect.
    ///
    /// # Errors
    ///
    /// Surfaces `LoadError` on fixture integrity violations instead of
    /// silently dropping nodes.
    fn initialize(&self) -> Result<(), LoadError>;

    /// The module's logic tree.
    ///
    /// # Errors
    ///
    /// Returns `ModuleError::NotInitialized` before `initialize` completes.
    fn tree(&self) -> Result<&LogicTree, ModuleError>;

    /// The module's keyword dispatch table, in consultation order.
    fn dispatch_rules(&self) -> &[DispatchRule];

    /// Deterministic keyword search over the module's dimension text.
    ///
    /// Results are sorted descending by score with ties broken by ascending
    /// node ID. An empty or whitespace query yields an empty vec.
    ///
    /// # Errors
    ///
    /// Returns `ModuleError::NotInitialized` before `initialize` completes.
    fn search(
        &self,
        query: &str,
        filters: Option<&SearchFilters>,
        top_k: usize,
    ) -> Result<Vec<SearchResult>, ModuleError> {
        Ok(rank_nodes(self.tree()?, query, filters, top_k))
    }

    /// Answers a question by keyword dispatch over pre-authored rules.
    ///
    /// When no rule applies the result has confidence 0.0, an empty chain,
    /// and a warning naming the module—"not applicable", not an error.
    ///
    /// # Errors
    ///
    /// Returns `ModuleError::NotInitialized` before `initialize` completes.
    fn reason(&self, question: &str) -> Result<ReasoningResult, ModuleError> {
        let tree = self.tree()?;
        Ok(reason_over(tree, self.dispatch_rules(), question))
    }
}

/// Scores and ranks a tree's nodes against a query.
#[must_use]
pub fn rank_nodes(
    tree: &LogicTree,
    query: &str,
    filters: Option<&SearchFilters>,
    top_k: usize,
) -> Vec<SearchResult> {
    let terms = tokenize(query);
    if terms.is_empty() || top_k == 0 {
        return Vec::new();
    }

    let mut results: Vec<SearchResult> = Vec::new();
    for node in tree.nodes() {
        if let Some(f) = filters {
            if !f.accepts(node) {
                continue;
            }
        }

        let mut score = 0.0_f32;
        let mut matched_dimension = None;
        let mut matched_text = String::new();

        for dimension in MATCH_PRIORITY {
            let mut best_fraction = 0.0_f32;
            let mut best_text: Option<String> = None;
            for text in node.dimension_texts(dimension) {
                let fraction = containment(&terms, &text);
                if fraction > best_fraction {
                    best_fraction = fraction;
                    best_text = Some(text);
                }
            }
            if best_fraction > 0.0 {
                score += dimension_weight(dimension) * best_fraction;
                if matched_dimension.is_none() {
                    matched_dimension = Some(dimension);
                    matched_text = best_text.unwrap_or_default();
                }
            }
        }

        score += CITATION_WEIGHT * containment(&terms, &node.citation);
        if !node.full_text.is_empty() {
            score += FULL_TEXT_WEIGHT * containment(&terms, &node.full_text);
        }

        if score > 0.0 {
            results.push(SearchResult {
                node: node.clone(),
                relevance_score: score,
                matched_dimension,
                matched_text,
            });
        }
    }

    results.sort_by(|a, b| {
        b.relevance_score
            .total_cmp(&a.relevance_score)
            .then_with(|| a.node.node_id.cmp(&b.node.node_id))
    });
    results.truncate(top_k);
    results
}

/// Runs the keyword dispatch table and assembles the reasoning chain.
#[must_use]
pub fn reason_over(
    tree: &LogicTree,
    rules: &[DispatchRule],
    question: &str,
) -> ReasoningResult {
    let question_lower = question.to_lowercase();

    let mut targets: Vec<(&NodeId, f32)> = Vec::new();
    for rule in rules.iter().filter(|r| !r.is_fallback()) {
        if targets.len() >= MAX_TARGET_NODES {
            break;
        }
        if rule.matches(&question_lower) && !targets.iter().any(|(id, _)| *id == &rule.target) {
            targets.push((&rule.target, rule.confidence));
        }
    }
    if targets.is_empty() {
        if let Some(rule) = rules.iter().find(|r| r.is_fallback()) {
            targets.push((&rule.target, rule.confidence));
        }
    }

    let selected: Vec<(&RuleNode, f32)> = targets
        .into_iter()
        .filter_map(|(id, conf)| tree.get(id).map(|n| (n, conf)))
        .collect();

    let Some(&(primary, confidence)) = selected.first() else {
        return ReasoningResult::not_applicable(tree.module_id());
    };

    let mut chain = Vec::new();
    for (node, _) in &selected {
        append_chain_steps(&mut chain, node);
    }

    let conclusion = compose_conclusion(&question_lower, primary);

    ReasoningResult {
        conclusion,
        confidence,
        reasoning_chain: chain,
        applicable_nodes: selected.iter().map(|(n, _)| (*n).clone()).collect(),
        warnings: Vec::new(),
    }
}

/// Walks one node's dimensions in the fixed legal-argument order and appends
/// a step per entry: establish facts, scope, conditional logic, the rule
/// itself, the resulting obligation, then the policy reason.
fn append_chain_steps(chain: &mut Vec<ReasoningStep>, node: &RuleNode) {
    let weight = node.authority_weight();
    let mut push = |dimension: Dimension, text: String, source_line: Option<String>| {
        chain.push(ReasoningStep {
            node_id: node.node_id.clone(),
            citation: node.citation.clone(),
            dimension,
            text,
            authority_weight: weight,
            source_line,
        });
    };

    for p in &node.given {
        push(Dimension::Given, p.text.clone(), p.source_line.clone());
    }
    for p in &node.which {
        push(Dimension::Which, p.text.clone(), p.source_line.clone());
    }
    for c in &node.if_then {
        push(Dimension::IfThen, c.to_string(), c.source_line.clone());
    }
    for p in &node.what {
        push(Dimension::What, p.text.clone(), p.source_line.clone());
    }
    for m in &node.can_must {
        push(Dimension::CanMust, m.to_string(), m.source_line.clone());
    }
    for p in &node.why {
        push(Dimension::Why, p.text.clone(), p.source_line.clone());
    }
}

/// Synthesizes the conclusion from the question's modal form.
///
/// The text is composed only from the node's propositions, conditionals,
/// and modalities; the templates add connective glue, never legal content.
fn compose_conclusion(question_lower: &str, node: &RuleNode) -> String {
    let words = tokenize(question_lower);
    let has_word = |w: &str| words.iter().any(|t| t == w);
    let asks_permission = has_word("can") || has_word("may") || question_lower.contains("am i allowed");
    let asks_obligation = has_word("must")
        || has_word("shall")
        || question_lower.contains("have to")
        || question_lower.contains("need to");

    if asks_permission {
        if let Some(m) = node
            .can_must
            .iter()
            .find(|m| m.modality_type.is_permissive())
            .or_else(|| node.can_must.first())
        {
            return format!("Yes, you {} ({})", m.to_string().to_lowercase(), node.citation);
        }
    }

    if asks_obligation {
        if let Some(m) = node
            .can_must
            .iter()
            .find(|m| m.modality_type.is_obligatory())
            .or_else(|| node.can_must.first())
        {
            return format!("Yes, you {} ({})", m.to_string().to_lowercase(), node.citation);
        }
    }

    // WHAT questions and the default both resolve to the first holding.
    if let Some(p) = node.what.first() {
        return format!("{} ({})", p.text, node.citation);
    }

    format!("Refer to {}", node.citation)
}

fn tokenize(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

/// Fraction of query terms contained in the text, in [0.0, 1.0].
#[allow(clippy::cast_precision_loss)]
fn containment(terms: &[String], text: &str) -> f32 {
    if terms.is_empty() {
        return 0.0;
    }
    let haystack = text.to_lowercase();
    let hits = terms.iter().filter(|t| haystack.contains(t.as_str())).count();
    hits as f32 / terms.len() as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authority::SourceType;
    use crate::logic::{Conditional, Modality, ModalityType, Proposition};
    use crate::metadata::{ModuleCoverage, ModuleMetadata};

    struct TestModule {
        core: ModuleCore,
        rules: Vec<DispatchRule>,
        module_id: ModuleId,
    }

    impl TestModule {
        fn new() -> Self {
            Self {
                core: ModuleCore::new(),
                rules: vec![
                    DispatchRule::new(&["notice"], "test_rule3", 0.9),
                    DispatchRule::new(&["default", "didn't respond"], "test_rule1", 0.9),
                    DispatchRule::fallback("test_root", 0.5),
                ],
                module_id: ModuleId::new("test_module"),
            }
        }

        fn fixture() -> Result<Vec<RuleNode>, LoadError> {
            Ok(vec![
                RuleNode::builder()
                    .node_id("test_root")
                    .citation("Test Order")
                    .source_type(SourceType::Rule)
                    .module_id("test_module")
                    .what(Proposition::new("The test order governs default judgment"))
                    .child("test_rule1")
                    .build()
                    .unwrap(),
                RuleNode::builder()
                    .node_id("test_rule1")
                    .citation("Test Order Rule 1")
                    .source_type(SourceType::Rule)
                    .module_id("test_module")
                    .parent_id("test_root")
                    .child("test_rule3")
                    .given(Proposition::cited("Service was properly effected", "Order 7"))
                    .which(Proposition::new("Applies when no defence is filed"))
                    .if_then(
                        Conditional::new(
                            "defendant fails to file a defence",
                            "claimant may apply for default judgment",
                        )
                        .with_source_line("Rule 1(1)"),
                    )
                    .what(Proposition::cited(
                        "Default judgment may be entered against a defendant who fails to defend",
                        "Rule 1(1)",
                    ))
                    .can_must(
                        Modality::new("apply for default judgment", ModalityType::May)
                            .with_condition("after the time for filing a defence has expired"),
                    )
                    .why(Proposition::cited(
                        "To prevent defendants delaying proceedings",
                        "[Paragraph 12]",
                    ))
                    .build()
                    .unwrap(),
                RuleNode::builder()
                    .node_id("test_rule3")
                    .citation("Test Order Rule 3")
                    .source_type(SourceType::Rule)
                    .module_id("test_module")
                    .parent_id("test_rule1")
                    .what(Proposition::new("Notice of the application must be served"))
                    .can_must(Modality::new(
                        "serve notice of the application",
                        ModalityType::Must,
                    ))
                    .build()
                    .unwrap(),
            ])
        }
    }

    impl ReasoningModule for TestModule {
        fn metadata(&self) -> ModuleMetadata {
            ModuleMetadata::new(
                self.module_id.clone(),
                "Test Module",
                "1.0.0",
                ModuleCoverage::new("Test Order", vec![], vec![]),
                0.8,
            )
        }

        fn initialize(&self) -> Result<(), LoadError> {
            self.core.initialize_with(&self.module_id, Self::fixture)
        }

        fn tree(&self) -> Result<&LogicTree, ModuleError> {
            self.core.tree(&self.module_id)
        }

        fn dispatch_rules(&self) -> &[DispatchRule] {
            &self.rules
        }
    }

    fn ready_module() -> TestModule {
        let m = TestModule::new();
        m.initialize().unwrap();
        m
    }

    #[test]
    fn test_not_initialized_is_explicit() {
        let m = TestModule::new();
        let err = m.search("default", None, 5).unwrap_err();
        assert!(matches!(err, ModuleError::NotInitialized { .. }));
        let err = m.reason("default?").unwrap_err();
        assert!(matches!(err, ModuleError::NotInitialized { .. }));
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let m = TestModule::new();
        m.initialize().unwrap();
        let before = m.tree().unwrap().len();
        m.initialize().unwrap();
        assert_eq!(m.tree().unwrap().len(), before);
    }

    #[test]
    fn test_search_empty_query_returns_empty() {
        let m = ready_module();
        assert!(m.search("", None, 10).unwrap().is_empty());
        assert!(m.search("   \t ", None, 10).unwrap().is_empty());
    }

    #[test]
    fn test_search_is_deterministic() {
        let m = ready_module();
        let a = m.search("default judgment", None, 10).unwrap();
        let b = m.search("default judgment", None, 10).unwrap();
        assert_eq!(a, b);
        assert!(!a.is_empty());
    }

    #[test]
    fn test_search_ranks_what_matches_highest() {
        let m = ready_module();
        let results = m.search("default judgment", None, 10).unwrap();
        // test_rule1 carries the holding; it must outrank the root's summary.
        assert_eq!(results[0].node.node_id.as_str(), "test_rule1");
        assert_eq!(results[0].matched_dimension, Some(Dimension::What));
    }

    #[test]
    fn test_search_tie_break_by_node_id() {
        let tree = LogicTree::from_nodes(
            "m",
            vec![
                RuleNode::builder()
                    .node_id("b_node")
                    .citation("C")
                    .source_type(SourceType::Rule)
                    .module_id("m")
                    .what(Proposition::new("identical text"))
                    .build()
                    .unwrap(),
                RuleNode::builder()
                    .node_id("a_node")
                    .citation("C")
                    .source_type(SourceType::Rule)
                    .module_id("m")
                    .what(Proposition::new("identical text"))
                    .build()
                    .unwrap(),
            ],
        )
        .unwrap();

        let results = rank_nodes(&tree, "identical text", None, 10);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].node.node_id.as_str(), "a_node");
    }

    #[test]
    fn test_search_respects_top_k_and_filters() {
        let m = ready_module();
        let all = m.search("judgment", None, 10).unwrap();
        assert!(all.len() > 1);
        let one = m.search("judgment", None, 1).unwrap();
        assert_eq!(one.len(), 1);

        let filters = SearchFilters {
            source_type: Some(SourceType::Statute),
            valid_at: None,
        };
        assert!(m.search("judgment", Some(&filters), 10).unwrap().is_empty());
    }

    #[test]
    fn test_reason_keyword_dispatch_selects_target() {
        let m = ready_module();
        let result = m.reason("Must I serve notice before applying?").unwrap();
        assert_eq!(result.applicable_nodes[0].node_id.as_str(), "test_rule3");
        assert!((result.confidence - 0.9).abs() < f32::EPSILON);
    }

    #[test]
    fn test_reason_chain_follows_fixed_dimension_order() {
        let m = ready_module();
        let result = m.reason("Can I get default judgment?").unwrap();
        let dims: Vec<Dimension> = result.reasoning_chain.iter().map(|s| s.dimension).collect();
        assert_eq!(
            dims,
            vec![
                Dimension::Given,
                Dimension::Which,
                Dimension::IfThen,
                Dimension::What,
                Dimension::CanMust,
                Dimension::Why,
            ]
        );
    }

    #[test]
    fn test_reason_permission_conclusion() {
        let m = ready_module();
        let result = m.reason("Can I get default judgment if defendant didn't respond?").unwrap();
        assert!(result.conclusion.starts_with("Yes, you may"));
        assert!(result.conclusion.contains("apply for default judgment"));
        assert!(result.conclusion.contains("Test Order Rule 1"));
    }

    #[test]
    fn test_reason_obligation_conclusion() {
        let m = ready_module();
        let result = m.reason("Must I serve notice on the defendant?").unwrap();
        assert!(result.conclusion.starts_with("Yes, you must"));
        assert!(result.conclusion.contains("serve notice"));
    }

    #[test]
    fn test_reason_what_conclusion() {
        let m = ready_module();
        let result = m.reason("What is default judgment?").unwrap();
        assert!(result
            .conclusion
            .starts_with("Default judgment may be entered"));
    }

    #[test]
    fn test_reason_fallback_rule() {
        let m = ready_module();
        let result = m.reason("Tell me about this order generally").unwrap();
        assert_eq!(result.applicable_nodes[0].node_id.as_str(), "test_root");
        assert!((result.confidence - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_reason_no_rule_is_not_applicable() {
        let tree = LogicTree::from_nodes(
            "bare",
            vec![RuleNode::builder()
                .node_id("n1")
                .citation("C")
                .source_type(SourceType::Rule)
                .module_id("bare")
                .what(Proposition::new("h"))
                .build()
                .unwrap()],
        )
        .unwrap();

        let rules = vec![DispatchRule::new(&["unrelated"], "n1", 0.9)];
        let result = reason_over(&tree, &rules, "completely different question");
        assert!(result.confidence.abs() < f32::EPSILON);
        assert!(result.reasoning_chain.is_empty());
        assert_eq!(result.warnings.len(), 1);
        assert!(result.warnings[0].contains("bare"));
    }

    #[test]
    fn test_reason_bounded_target_set() {
        let tree = LogicTree::from_nodes(
            "m",
            (1..=5)
                .map(|i| {
                    RuleNode::builder()
                        .node_id(format!("n{i}").as_str())
                        .citation(format!("C{i}"))
                        .source_type(SourceType::Rule)
                        .module_id("m")
                        .what(Proposition::new("h"))
                        .build()
                        .unwrap()
                })
                .collect(),
        )
        .unwrap();

        let rules: Vec<DispatchRule> = (1..=5)
            .map(|i| DispatchRule::new(&["costs"], format!("n{i}").as_str(), 0.9))
            .collect();
        let result = reason_over(&tree, &rules, "what about costs?");
        assert_eq!(result.applicable_nodes.len(), MAX_TARGET_NODES);
    }

    #[test]
    fn test_reason_is_deterministic() {
        let m = ready_module();
        let a = m.reason("Can I get default judgment?").unwrap();
        let b = m.reason("Can I get default judgment?").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_chain_steps_carry_source_lines() {
        let m = ready_module();
        let result = m.reason("Can I get default judgment?").unwrap();
        let why_steps = result.steps_for(Dimension::Why);
        assert_eq!(why_steps.len(), 1);
        assert_eq!(why_steps[0].source_line.as_deref(), Some("[Paragraph 12]"));
        assert!((why_steps[0].authority_weight - 0.8).abs() < f32::EPSILON);
    }
}
