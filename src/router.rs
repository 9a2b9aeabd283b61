//! The query router: free text in, routing intent out.
//!
//! The router never raises for malformed input: the worst case is an
//! intent with no topics, no modules, and confidence 0.0, which the
//! combiner reads as "ask for clarification". Topic extraction runs over
//! a hand-curated taxonomy, question classification over a fixed ordered
//! regex table (first match wins, order is stable across releases), and
//! entity extraction is best-effort with absent entities simply omitted.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::logic::Dimension;
use crate::node::ModuleId;
use crate::registry::ModuleRegistry;

/// A time span extracted from a query, e.g. "14 days".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimePeriod {
    /// Number of units.
    pub value: u32,
    /// Unit name, lowercased and singular-agnostic ("days", "week", ...).
    pub unit: String,
}

/// Entities extracted from a query. Absent entities stay `None`; no
/// sentinel values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryEntities {
    /// Court name, e.g. "High Court".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub court: Option<String>,

    /// Leading dollar amount.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,

    /// A "<n> days/weeks/months" span.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_period: Option<TimePeriod>,
}

impl QueryEntities {
    /// Returns true if nothing was extracted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.court.is_none() && self.amount.is_none() && self.time_period.is_none()
    }
}

/// Parsed routing intent, created fresh per request and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryIntent {
    /// The query as received.
    pub raw_query: String,

    /// Extracted topic slugs.
    pub topics: Vec<String>,

    /// Classified question type over the six-dimension vocabulary.
    pub question_type: Dimension,

    /// Best-effort extracted entities.
    pub entities: QueryEntities,

    /// Candidate modules, most relevant first.
    pub relevant_modules: Vec<ModuleId>,

    /// Router's self-assessed certainty in [0.0, 1.0].
    pub routing_confidence: f32,
}

/// Analyzes queries and decides which modules should process them.
#[derive(Debug)]
pub struct QueryRouter {
    taxonomy: Vec<(String, Vec<String>)>,
    question_patterns: Vec<(Dimension, Vec<Regex>)>,
    court_patterns: Vec<(String, Regex)>,
    amount_pattern: Regex,
    time_pattern: Regex,
}

impl QueryRouter {
    /// Builds the router's static taxonomy and pattern tables once.
    ///
    /// # Panics
    ///
    /// Panics if a built-in pattern fails to compile, which is a programming
    /// error caught by the test suite.
    #[must_use]
    pub fn new() -> Self {
        Self {
            taxonomy: build_taxonomy(),
            question_patterns: build_question_patterns(),
            court_patterns: build_court_patterns(),
            amount_pattern: Regex::new(r"\$\s*([\d,]+(?:\.\d+)?)").expect("amount pattern"),
            time_pattern: Regex::new(r"(?i)(\d+)\s+(days?|weeks?|months?)").expect("time pattern"),
        }
    }

    /// Converts free text into a routing intent against the registry.
    #[must_use]
    pub fn analyze(&self, query: &str, registry: &ModuleRegistry) -> QueryIntent {
        let topics = self.extract_topics(query);
        let question_type = self.classify_question(query);
        let entities = self.extract_entities(query);
        let relevant_modules = registry.modules_by_topics(&topics);
        let routing_confidence = routing_confidence(topics.len(), relevant_modules.len());

        QueryIntent {
            raw_query: query.to_string(),
            topics,
            question_type,
            entities,
            relevant_modules,
            routing_confidence,
        }
    }

    /// Case-insensitive keyword containment over the topic taxonomy, in
    /// taxonomy order.
    #[must_use]
    pub fn extract_topics(&self, query: &str) -> Vec<String> {
        let query_lower = query.to_lowercase();
        self.taxonomy
            .iter()
            .filter(|(_, keywords)| keywords.iter().any(|k| query_lower.contains(k)))
            .map(|(topic, _)| topic.clone())
            .collect()
    }

    /// First matching pattern in the fixed table wins; WHAT by default.
    #[must_use]
    pub fn classify_question(&self, query: &str) -> Dimension {
        let query_lower = query.to_lowercase();
        for (dimension, patterns) in &self.question_patterns {
            if patterns.iter().any(|p| p.is_match(&query_lower)) {
                return *dimension;
            }
        }
        Dimension::What
    }

    /// Best-effort entity extraction; failures leave the field unset.
    #[must_use]
    pub fn extract_entities(&self, query: &str) -> QueryEntities {
        let mut entities = QueryEntities::default();

        for (court, pattern) in &self.court_patterns {
            if pattern.is_match(query) {
                entities.court = Some(court.clone());
                break;
            }
        }

        if let Some(caps) = self.amount_pattern.captures(query) {
            let digits = caps[1].replace(',', "");
            entities.amount = digits.parse::<f64>().ok();
        }

        if let Some(caps) = self.time_pattern.captures(query) {
            if let Ok(value) = caps[1].parse::<u32>() {
                entities.time_period = Some(TimePeriod {
                    value,
                    unit: caps[2].to_lowercase(),
                });
            }
        }

        entities
    }
}

impl Default for QueryRouter {
    fn default() -> Self {
        Self::new()
    }
}

/// Mean of the topic and module coverage scores, with the two floor cases:
/// no topics at all means 0.0, and topics without any covering module means
/// 0.2 (a corpus coverage gap, not a query failure).
fn routing_confidence(topic_count: usize, module_count: usize) -> f32 {
    if topic_count == 0 {
        return 0.0;
    }
    if module_count == 0 {
        return 0.2;
    }
    #[allow(clippy::cast_precision_loss)]
    let topic_score = (topic_count as f32 / 3.0).min(1.0);
    #[allow(clippy::cast_precision_loss)]
    let module_score = (module_count as f32 / 2.0).min(1.0);
    (topic_score + module_score) / 2.0
}

/// The hand-curated legal taxonomy: topic slug → trigger keywords.
///
/// Maintainable data, not a learned model. Order is the match order and is
/// kept stable so routing stays deterministic across releases.
fn build_taxonomy() -> Vec<(String, Vec<String>)> {
    let entries: &[(&str, &[&str])] = &[
        (
            "default_judgment",
            &[
                "default",
                "judgment",
                "no defense",
                "no defence",
                "didn't respond",
                "did not respond",
                "failed to file",
                "no response",
            ],
        ),
        (
            "summary_judgment",
            &["summary", "no triable issue", "no real prospect"],
        ),
        (
            "costs",
            &[
                "costs",
                "fees",
                "charges",
                "expenses",
                "legal fees",
                "indemnity",
                "party and party",
            ],
        ),
        ("service", &["service", "serve", "serving documents"]),
        (
            "setting_aside",
            &["set aside", "setting aside", "overturn", "reverse"],
        ),
        ("appeals", &["appeal", "appellate", "challenge decision"]),
        (
            "settlement",
            &["settle", "settlement", "amicable", "resolve the dispute"],
        ),
        (
            "offer_to_settle",
            &["offer", "without prejudice", "reasonable grounds"],
        ),
        (
            "mediation",
            &["mediation", "mediator", "adr", "alternative dispute resolution"],
        ),
        (
            "payment_into_court",
            &["payment into court", "pay into court", "calderbank", "tender"],
        ),
        (
            "directors_duties",
            &["director", "fiduciary duty", "breach of duty", "conflict of interest"],
        ),
        (
            "insolvency",
            &["insolvent", "insolvency", "winding up", "liquidation", "bankruptcy"],
        ),
        (
            "breach_of_contract",
            &["breach", "contract", "non-performance"],
        ),
        ("damages", &["damages", "compensation", "remedy"]),
    ];

    entries
        .iter()
        .map(|(topic, keywords)| {
            (
                (*topic).to_string(),
                keywords.iter().map(|k| (*k).to_string()).collect(),
            )
        })
        .collect()
}

/// The ordered question-type table. First match wins, so the order is part
/// of the routing contract and must stay stable across releases.
fn build_question_patterns() -> Vec<(Dimension, Vec<Regex>)> {
    let entries: &[(Dimension, &[&str])] = &[
        (
            Dimension::What,
            &[
                r"\bwhat\s+(is|are|does)\b",
                r"\bdefine\b",
                r"\bexplain\b",
                r"\btell\s+me\s+about\b",
            ],
        ),
        (
            Dimension::Which,
            &[r"\bwhich\b", r"\bwho\b", r"\bwhen\b", r"\bwhere\b"],
        ),
        (
            Dimension::IfThen,
            &[
                r"\bif\b.*\bthen\b",
                r"\bwhat\s+happens\s+if\b",
                r"\bconsequence\b",
            ],
        ),
        (
            Dimension::CanMust,
            &[
                r"\bcan\s+(i|we)\b",
                r"\bmay\s+(i|we)\b",
                r"\bmust\s+(i|we)\b",
                r"\bshall\s+(i|we)\b",
                r"\bam\s+i\s+(required|allowed|permitted|obliged)\b",
                r"\bdo\s+i\s+have\s+to\b",
            ],
        ),
        (
            Dimension::Given,
            &[r"\bgiven\s+that\b", r"\bassuming\b", r"\bsuppose\b"],
        ),
        (
            Dimension::Why,
            &[r"\bwhy\b", r"\brationale\b", r"\bpurpose\b"],
        ),
    ];

    entries
        .iter()
        .map(|(dimension, patterns)| {
            (
                *dimension,
                patterns
                    .iter()
                    .map(|p| Regex::new(p).expect("question pattern"))
                    .collect(),
            )
        })
        .collect()
}

fn build_court_patterns() -> Vec<(String, Regex)> {
    let entries: &[(&str, &str)] = &[
        ("High Court", r"(?i)high\s+court|\bsghc\b"),
        ("District Court", r"(?i)district\s+court|\bsgdc\b"),
        ("Magistrate Court", r"(?i)magistrate|\bsgmc\b"),
        ("Court of Appeal", r"(?i)court\s+of\s+appeal|\bsgca\b"),
    ];
    entries
        .iter()
        .map(|(court, pattern)| ((*court).to_string(), Regex::new(pattern).expect("court pattern")))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::{AmicableResolutionModule, DefaultJudgmentModule, PaymentIntoCourtModule};
    use std::sync::Arc;

    fn registry_with_defaults() -> ModuleRegistry {
        let mut registry = ModuleRegistry::new();
        registry
            .register(Arc::new(DefaultJudgmentModule::new()))
            .unwrap();
        registry
            .register(Arc::new(AmicableResolutionModule::new()))
            .unwrap();
        registry
            .register(Arc::new(PaymentIntoCourtModule::new()))
            .unwrap();
        registry
    }

    #[test]
    fn test_topic_extraction_is_case_insensitive() {
        let router = QueryRouter::new();
        let topics = router.extract_topics("Can I get DEFAULT Judgment?");
        assert!(topics.contains(&"default_judgment".to_string()));
    }

    #[test]
    fn test_no_topics_for_gibberish() {
        let router = QueryRouter::new();
        assert!(router.extract_topics("xyzzy plugh").is_empty());
    }

    #[test]
    fn test_question_classification_first_match_wins() {
        let router = QueryRouter::new();
        // "what is" appears before the CAN-MUST table entries.
        assert_eq!(
            router.classify_question("What is default judgment?"),
            Dimension::What
        );
        // "what happens if" is not a WHAT pattern; IF-THEN catches it.
        assert_eq!(
            router.classify_question("What happens if no defence is filed?"),
            Dimension::IfThen
        );
        assert_eq!(
            router.classify_question("Can I get default judgment if defendant didn't respond?"),
            Dimension::CanMust
        );
        assert_eq!(
            router.classify_question("Why does the notice rule exist?"),
            Dimension::Why
        );
        assert_eq!(
            router.classify_question("Which court hears this?"),
            Dimension::Which
        );
        assert_eq!(
            router.classify_question("Assuming service was effected, is judgment possible?"),
            Dimension::Given
        );
    }

    #[test]
    fn test_question_classification_defaults_to_what() {
        let router = QueryRouter::new();
        assert_eq!(router.classify_question("default judgment"), Dimension::What);
        assert_eq!(router.classify_question(""), Dimension::What);
    }

    #[test]
    fn test_entity_extraction_court_amount_time() {
        let router = QueryRouter::new();
        let entities = router.extract_entities(
            "Can the High Court award $50,000 if the defence is 14 days late?",
        );
        assert_eq!(entities.court.as_deref(), Some("High Court"));
        assert_eq!(entities.amount, Some(50_000.0));
        assert_eq!(
            entities.time_period,
            Some(TimePeriod {
                value: 14,
                unit: "days".to_string()
            })
        );
    }

    #[test]
    fn test_entity_extraction_absent_entities_are_omitted() {
        let router = QueryRouter::new();
        let entities = router.extract_entities("Can I get default judgment?");
        assert!(entities.is_empty());

        let json = serde_json::to_string(&entities).unwrap();
        assert_eq!(json, "{}");
    }

    #[test]
    fn test_routing_confidence_floors() {
        assert!(routing_confidence(0, 0).abs() < f32::EPSILON);
        assert!((routing_confidence(2, 0) - 0.2).abs() < f32::EPSILON);
    }

    #[test]
    fn test_routing_confidence_mean_of_coverage_scores() {
        // 1 topic, 1 module: (1/3 + 1/2) / 2
        let expected = (1.0_f32 / 3.0 + 0.5) / 2.0;
        assert!((routing_confidence(1, 1) - expected).abs() < 1e-6);
        // Saturates at 3 topics and 2 modules.
        assert!((routing_confidence(3, 2) - 1.0).abs() < f32::EPSILON);
        assert!((routing_confidence(9, 9) - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_analyze_default_judgment_scenario() {
        let registry = registry_with_defaults();
        let router = QueryRouter::new();
        let intent =
            router.analyze("Can I get default judgment if defendant didn't respond?", &registry);

        assert_eq!(intent.question_type, Dimension::CanMust);
        assert_eq!(intent.relevant_modules[0], ModuleId::new("order_21"));
        assert!(intent.routing_confidence > 0.0);
    }

    #[test]
    fn test_analyze_gibberish_yields_zero_confidence() {
        let registry = registry_with_defaults();
        let router = QueryRouter::new();
        let intent = router.analyze("xyzzy plugh", &registry);

        assert!(intent.topics.is_empty());
        assert!(intent.relevant_modules.is_empty());
        assert!(intent.routing_confidence.abs() < f32::EPSILON);
        assert_eq!(intent.question_type, Dimension::What);
    }

    #[test]
    fn test_analyze_settlement_query_matches_both_modules() {
        let registry = registry_with_defaults();
        let router = QueryRouter::new();
        let intent = router.analyze(
            "Should I make a settlement offer or try mediation to resolve this amicably?",
            &registry,
        );

        assert!(intent.relevant_modules.contains(&ModuleId::new("order_5")));
        assert!(intent.relevant_modules.contains(&ModuleId::new("order_14")));
        // Order 5 matches settlement, offer_to_settle and mediation; Order 14
        // matches two of those, so the more specific module ranks first.
        assert_eq!(intent.relevant_modules[0], ModuleId::new("order_5"));
    }

    #[test]
    fn test_analyze_never_errors_on_malformed_input() {
        let registry = ModuleRegistry::new();
        let router = QueryRouter::new();
        for input in ["", "   ", "$$$$", "14 14 14 days days", "???!!!"] {
            let intent = router.analyze(input, &registry);
            assert!(intent.routing_confidence >= 0.0);
        }
    }
}
