//! The hybrid combiner and clarification gate.
//!
//! Orchestration: ranked keyword search finds the most relevant node, the
//! owning module's reasoning engine assembles the formal chain, and the
//! two scores merge into one hybrid score. The clarification gate then
//! decides, exactly once and from reasoning confidence alone, whether to answer
//! directly or ask the user for more detail. Live-query failures degrade
//! to the clarification path; a legal-advice system must admit uncertainty,
//! never crash into an unhandled state.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::module::ReasoningModule;
use crate::node::ModuleId;
use crate::reasoning::{ReasoningResult, ReasoningStep};
use crate::registry::ModuleRegistry;
use crate::router::{QueryIntent, QueryRouter};
use crate::search::{RankedHit, SearchBackend};

/// The two states of the clarification gate. There are no intermediate
/// states, and the decision is made once per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateDecision {
    /// Confidence clears the threshold: answer with the full chain.
    DirectAnswer,
    /// Confidence is too low: return clarifying questions instead.
    NeedsClarification,
}

impl GateDecision {
    /// The gate as a pure function of reasoning confidence. Conversation
    /// history never influences this comparison.
    #[must_use]
    pub fn decide(reasoning_confidence: f32, threshold: f32) -> Self {
        if reasoning_confidence < threshold {
            Self::NeedsClarification
        } else {
            Self::DirectAnswer
        }
    }
}

/// The combiner's structured output contract for the presentation layer.
///
/// The presentation layer may only reformat these fields; `citations` and
/// `reasoning_chain` contents are immutable ground truth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    /// A direct answer with its full audit trail.
    Direct {
        /// The conclusion, composed only from node text.
        answer: String,
        /// Reasoning confidence behind the answer.
        confidence: f32,
        /// Deduplicated citations of the nodes whose sourced WHY steps back
        /// the answer.
        citations: Vec<String>,
        /// The module that produced the reasoning.
        source_module: ModuleId,
        /// The full reasoning chain.
        reasoning_chain: Vec<ReasoningStep>,
        /// Combined search/reasoning score.
        hybrid_score: f32,
    },
    /// A request for more detail; no legal content is fabricated here.
    Clarify {
        /// The question as originally asked.
        original_question: String,
        /// Confidence at the time of the decision.
        confidence: f32,
        /// Best-matching module, when one was identified.
        #[serde(skip_serializing_if = "Option::is_none")]
        source_module: Option<ModuleId>,
        /// At most four questions for the user.
        clarifying_questions: Vec<String>,
    },
}

impl Outcome {
    /// Returns true for the clarification branch.
    #[must_use]
    pub const fn needs_clarification(&self) -> bool {
        matches!(self, Self::Clarify { .. })
    }

    /// The gate state this outcome corresponds to.
    #[must_use]
    pub const fn gate(&self) -> GateDecision {
        match self {
            Self::Direct { .. } => GateDecision::DirectAnswer,
            Self::Clarify { .. } => GateDecision::NeedsClarification,
        }
    }
}

/// The full response returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HybridResponse {
    /// The query as received.
    pub query: String,

    /// Raw hits from the search collaborator, best first.
    pub search_hits: Vec<RankedHit>,

    /// The module reasoning, when a module was reached.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<ReasoningResult>,

    /// `search_weight * normalized_score + reasoning_weight * confidence`.
    pub hybrid_score: f32,

    /// The gated outcome.
    pub outcome: Outcome,
}

/// Presentation collaborator that phrases clarifying questions from the
/// low-confidence context. Implementations ask for information; they must
/// not produce legal content.
pub trait Clarifier: Send + Sync {
    /// Questions to put to the user; the engine truncates to its limit.
    fn clarifying_questions(&self, question: &str, intent: &QueryIntent) -> Vec<String>;
}

/// Deterministic template clarifier driven by what the router failed to
/// extract. Serves as the default when no external presentation layer is
/// wired in.
#[derive(Debug, Default)]
pub struct EntityClarifier;

impl Clarifier for EntityClarifier {
    fn clarifying_questions(&self, _question: &str, intent: &QueryIntent) -> Vec<String> {
        let mut questions = Vec::new();

        if intent.topics.is_empty() {
            questions.push(
                "Which area of procedure does your question concern, for example default \
                 judgment, costs, or settlement offers?"
                    .to_string(),
            );
        }
        if intent.relevant_modules.is_empty() && !intent.topics.is_empty() {
            questions.push(
                "Could you name the specific rule or order your question relates to?".to_string(),
            );
        }
        if intent.entities.court.is_none() {
            questions.push("Which court is your matter before?".to_string());
        }
        if intent.entities.time_period.is_none() {
            questions.push(
                "What deadlines or time limits have passed or are approaching?".to_string(),
            );
        }
        questions.push("What outcome are you asking the court for?".to_string());

        questions
    }
}

/// The hybrid search engine exposed to callers.
pub struct HybridEngine {
    config: EngineConfig,
    registry: ModuleRegistry,
    router: QueryRouter,
    backend: Arc<dyn SearchBackend>,
    clarifier: Arc<dyn Clarifier>,
}

impl HybridEngine {
    /// Wires the engine together. The configuration is constructed once at
    /// process start and passed in by reference.
    #[must_use]
    pub fn new(
        config: &EngineConfig,
        registry: ModuleRegistry,
        backend: Arc<dyn SearchBackend>,
        clarifier: Arc<dyn Clarifier>,
    ) -> Self {
        Self {
            config: config.clone(),
            registry,
            router: QueryRouter::new(),
            backend,
            clarifier,
        }
    }

    /// Read access to the registry, e.g. for administrative inspection.
    #[must_use]
    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    /// Answers a query: ranked search, module reasoning, hybrid scoring,
    /// then the clarification gate.
    #[must_use]
    pub fn answer(&self, query: &str) -> HybridResponse {
        let intent = self.router.analyze(query, &self.registry);

        let hits = match self
            .backend
            .ranked_search(query, self.config.top_k, self.config.search_timeout)
        {
            Ok(hits) => hits,
            Err(err) => {
                // A timeout is treated identically to zero hits.
                log::warn!("ranked search degraded to empty: {err}");
                Vec::new()
            }
        };

        let Some(top) = hits.first() else {
            return self.clarify_response(query, &intent, hits, None, None, 0.0);
        };

        let module_id = top.node.module_id.clone();
        let Some(module) = self.registry.module(&module_id) else {
            // Search and routing disagree about module existence; that is a
            // data-integrity warning, not a crash.
            log::warn!("module {module_id} from search hit is not registered");
            return self.clarify_response(query, &intent, hits, None, None, 0.0);
        };

        let reasoning = match module.reason(query) {
            Ok(result) => result,
            Err(err) => {
                log::warn!("module {module_id} reasoning degraded: {err}");
                return self.clarify_response(query, &intent, hits, Some(module_id), None, 0.0);
            }
        };

        let confidence = reasoning.confidence;
        let normalized = (top.score / self.config.search_score_scale).clamp(0.0, 1.0);
        let hybrid_score =
            self.config.search_weight * normalized + self.config.reasoning_weight * confidence;

        match GateDecision::decide(confidence, self.config.clarification_threshold) {
            GateDecision::DirectAnswer => HybridResponse {
                query: query.to_string(),
                outcome: Outcome::Direct {
                    answer: reasoning.conclusion.clone(),
                    confidence,
                    citations: reasoning.why_citations(),
                    source_module: module_id,
                    reasoning_chain: reasoning.reasoning_chain.clone(),
                    hybrid_score,
                },
                search_hits: hits,
                reasoning: Some(reasoning),
                hybrid_score,
            },
            GateDecision::NeedsClarification => self.clarify_response(
                query,
                &intent,
                hits,
                Some(module_id),
                Some(reasoning),
                hybrid_score,
            ),
        }
    }

    fn clarify_response(
        &self,
        query: &str,
        intent: &QueryIntent,
        hits: Vec<RankedHit>,
        source_module: Option<ModuleId>,
        reasoning: Option<ReasoningResult>,
        hybrid_score: f32,
    ) -> HybridResponse {
        let confidence = reasoning.as_ref().map_or(0.0, |r| r.confidence);
        let mut questions = self.clarifier.clarifying_questions(query, intent);
        questions.truncate(self.config.max_clarifying_questions);

        let source_module =
            source_module.or_else(|| intent.relevant_modules.first().cloned());

        HybridResponse {
            query: query.to_string(),
            search_hits: hits,
            reasoning,
            hybrid_score,
            outcome: Outcome::Clarify {
                original_question: query.to_string(),
                confidence,
                source_module,
                clarifying_questions: questions,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SearchError;
    use crate::logic::Proposition;
    use crate::modules::DefaultJudgmentModule;
    use crate::module::ReasoningModule;
    use crate::node::RuleNode;
    use crate::SourceType;
    use std::time::Duration;

    struct StubBackend {
        hits: Vec<RankedHit>,
        fail: Option<SearchError>,
    }

    impl StubBackend {
        fn with_hits(hits: Vec<RankedHit>) -> Self {
            Self { hits, fail: None }
        }

        fn failing(err: SearchError) -> Self {
            Self {
                hits: Vec::new(),
                fail: Some(err),
            }
        }
    }

    impl SearchBackend for StubBackend {
        fn ranked_search(
            &self,
            _query: &str,
            top_k: usize,
            _timeout: Duration,
        ) -> Result<Vec<RankedHit>, SearchError> {
            if let Some(err) = &self.fail {
                return Err(match err {
                    SearchError::Timeout { duration_ms } => SearchError::Timeout {
                        duration_ms: *duration_ms,
                    },
                    SearchError::Backend { message } => SearchError::Backend {
                        message: message.clone(),
                    },
                    SearchError::Unavailable { message } => SearchError::Unavailable {
                        message: message.clone(),
                    },
                });
            }
            Ok(self.hits.iter().take(top_k).cloned().collect())
        }
    }

    fn rule1_hit(score: f32) -> RankedHit {
        let module = DefaultJudgmentModule::new();
        module.initialize().unwrap();
        let node = module
            .tree()
            .unwrap()
            .get(&crate::node::NodeId::new("order21_rule1"))
            .unwrap()
            .clone();
        RankedHit::new(node, score)
    }

    fn orphan_hit() -> RankedHit {
        let node = RuleNode::builder()
            .node_id("ghost_rule")
            .citation("Ghost Order")
            .source_type(SourceType::Rule)
            .module_id("module_nobody_registered")
            .what(Proposition::new("spectral holding"))
            .build()
            .unwrap();
        RankedHit::new(node, 5.0)
    }

    fn engine_with(backend: StubBackend) -> HybridEngine {
        let mut registry = ModuleRegistry::new();
        registry
            .register(Arc::new(DefaultJudgmentModule::new()))
            .unwrap();
        HybridEngine::new(
            &EngineConfig::default(),
            registry,
            Arc::new(backend),
            Arc::new(EntityClarifier),
        )
    }

    #[test]
    fn test_gate_is_pure_and_monotone() {
        let threshold = EngineConfig::DEFAULT_CLARIFICATION_THRESHOLD;
        let mut i = 0;
        while i <= 100 {
            #[allow(clippy::cast_precision_loss)]
            let confidence = i as f32 / 100.0;
            let decision = GateDecision::decide(confidence, threshold);
            if confidence < threshold {
                assert_eq!(decision, GateDecision::NeedsClarification, "{confidence}");
            } else {
                assert_eq!(decision, GateDecision::DirectAnswer, "{confidence}");
            }
            i += 1;
        }
    }

    #[test]
    fn test_gate_boundary_is_inclusive_at_threshold() {
        assert_eq!(
            GateDecision::decide(0.30, 0.30),
            GateDecision::DirectAnswer
        );
        assert_eq!(
            GateDecision::decide(0.299, 0.30),
            GateDecision::NeedsClarification
        );
    }

    #[test]
    fn test_direct_answer_path() {
        let engine = engine_with(StubBackend::with_hits(vec![rule1_hit(8.0)]));
        let response = engine.answer("Can I get default judgment if defendant didn't respond?");

        assert!(!response.outcome.needs_clarification());
        let Outcome::Direct {
            answer,
            confidence,
            source_module,
            reasoning_chain,
            hybrid_score,
            ..
        } = &response.outcome
        else {
            panic!("expected direct answer");
        };

        assert!(answer.contains("apply for default judgment"));
        assert!(*confidence >= 0.8);
        assert_eq!(source_module.as_str(), "order_21");
        assert!(!reasoning_chain.is_empty());

        // 0.4 * (8.0 / 10) + 0.6 * confidence
        let expected = 0.4 * 0.8 + 0.6 * confidence;
        assert!((hybrid_score - expected).abs() < 1e-6);
        assert!((response.hybrid_score - expected).abs() < 1e-6);
    }

    #[test]
    fn test_zero_hits_degrades_to_clarification() {
        let engine = engine_with(StubBackend::with_hits(Vec::new()));
        let response = engine.answer("Can I get default judgment?");

        assert!(response.outcome.needs_clarification());
        assert!(response.search_hits.is_empty());
        assert!(response.reasoning.is_none());
        assert!(response.hybrid_score.abs() < f32::EPSILON);
    }

    #[test]
    fn test_search_timeout_treated_as_zero_hits() {
        let engine = engine_with(StubBackend::failing(SearchError::Timeout {
            duration_ms: 5000,
        }));
        let response = engine.answer("Can I get default judgment?");

        assert!(response.outcome.needs_clarification());
        assert!(response.search_hits.is_empty());
    }

    #[test]
    fn test_unregistered_module_degrades_to_clarification() {
        let engine = engine_with(StubBackend::with_hits(vec![orphan_hit()]));
        let response = engine.answer("Can I get default judgment?");

        assert!(response.outcome.needs_clarification());
        let Outcome::Clarify {
            confidence,
            source_module,
            ..
        } = &response.outcome
        else {
            panic!("expected clarification");
        };
        assert!(confidence.abs() < f32::EPSILON);
        // Routing still identified the best-matching module.
        assert_eq!(
            source_module.as_ref().map(ModuleId::as_str),
            Some("order_21")
        );
    }

    #[test]
    fn test_low_confidence_reasoning_gates_to_clarification() {
        // An off-topic question reaches the fallback rule at 0.5, above the
        // gate; raise the threshold to force the clarification branch.
        let mut registry = ModuleRegistry::new();
        registry
            .register(Arc::new(DefaultJudgmentModule::new()))
            .unwrap();
        let config = EngineConfig {
            clarification_threshold: 0.6,
            ..EngineConfig::default()
        };
        let engine = HybridEngine::new(
            &config,
            registry,
            Arc::new(StubBackend::with_hits(vec![rule1_hit(8.0)])),
            Arc::new(EntityClarifier),
        );

        let response = engine.answer("Tell me about procedure in general");
        assert!(response.outcome.needs_clarification());
        let Outcome::Clarify {
            confidence,
            clarifying_questions,
            original_question,
            ..
        } = &response.outcome
        else {
            panic!("expected clarification");
        };
        assert!((*confidence - 0.5).abs() < f32::EPSILON);
        assert_eq!(original_question, "Tell me about procedure in general");
        assert!(!clarifying_questions.is_empty());
        assert!(clarifying_questions.len() <= 4);
    }

    #[test]
    fn test_clarifying_questions_capped_at_limit() {
        struct VerboseClarifier;
        impl Clarifier for VerboseClarifier {
            fn clarifying_questions(&self, _q: &str, _i: &QueryIntent) -> Vec<String> {
                (0..10).map(|i| format!("question {i}")).collect()
            }
        }

        let mut registry = ModuleRegistry::new();
        registry
            .register(Arc::new(DefaultJudgmentModule::new()))
            .unwrap();
        let engine = HybridEngine::new(
            &EngineConfig::default(),
            registry,
            Arc::new(StubBackend::with_hits(Vec::new())),
            Arc::new(VerboseClarifier),
        );

        let response = engine.answer("xyzzy plugh");
        let Outcome::Clarify {
            clarifying_questions,
            ..
        } = &response.outcome
        else {
            panic!("expected clarification");
        };
        assert_eq!(clarifying_questions.len(), 4);
    }

    #[test]
    fn test_direct_answer_citations_come_from_why_steps() {
        let engine = engine_with(StubBackend::with_hits(vec![rule1_hit(8.0)]));
        let response = engine.answer("Can I get default judgment if defendant didn't respond?");

        let Outcome::Direct { citations, .. } = &response.outcome else {
            panic!("expected direct answer");
        };
        // order21_rule1 carries two sourced WHY propositions; the chain cites
        // the node once.
        assert_eq!(citations, &vec!["Order 21 Rule 1".to_string()]);
    }

    #[test]
    fn test_answer_is_deterministic() {
        let engine = engine_with(StubBackend::with_hits(vec![rule1_hit(8.0)]));
        let a = engine.answer("Can I get default judgment if defendant didn't respond?");
        let b = engine.answer("Can I get default judgment if defendant didn't respond?");
        assert_eq!(a, b);
    }

    #[test]
    fn test_hybrid_score_clamps_oversized_search_scores() {
        let engine = engine_with(StubBackend::with_hits(vec![rule1_hit(250.0)]));
        let response = engine.answer("Can I get default judgment if defendant didn't respond?");
        let Outcome::Direct {
            hybrid_score,
            confidence,
            ..
        } = &response.outcome
        else {
            panic!("expected direct answer");
        };
        let expected = 0.4 * 1.0 + 0.6 * confidence;
        assert!((hybrid_score - expected).abs() < 1e-6);
    }

    #[test]
    fn test_entity_clarifier_asks_for_missing_context_only() {
        let registry = ModuleRegistry::new();
        let router = QueryRouter::new();
        let intent = router.analyze("xyzzy plugh", &registry);
        let questions = EntityClarifier.clarifying_questions("xyzzy plugh", &intent);

        assert!(questions.iter().any(|q| q.contains("area of procedure")));
        // No legal conclusions are fabricated in the clarification path.
        assert!(questions.iter().all(|q| q.ends_with('?')));
    }
}
