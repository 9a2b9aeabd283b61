//! Engine configuration.
//!
//! One explicit struct constructed at process start and passed by reference
//! into the combiner; no global lookup inside core logic.

use std::time::Duration;

/// Tunables for the hybrid combiner and clarification gate.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Reasoning-confidence threshold below which the engine asks for
    /// clarification instead of answering.
    pub clarification_threshold: f32,

    /// Weight of the normalized search score in the hybrid score.
    pub search_weight: f32,

    /// Weight of the reasoning confidence in the hybrid score. Formal-logic
    /// confidence is trusted more than raw keyword score: keyword score
    /// measures topical relevance, reasoning confidence measures rule
    /// applicability.
    pub reasoning_weight: f32,

    /// Fixed divisor normalizing the backend's raw score into [0, 1].
    /// BM25-style backends typically score relevant legal text in the
    /// single digits, so raw scores are divided by 10 and clamped.
    pub search_score_scale: f32,

    /// How many hits to request from the search collaborator.
    pub top_k: usize,

    /// Timeout handed to the search collaborator.
    pub search_timeout: Duration,

    /// Upper bound on clarifying questions returned to the caller.
    pub max_clarifying_questions: usize,
}

impl EngineConfig {
    /// The default clarification threshold (30% confidence).
    pub const DEFAULT_CLARIFICATION_THRESHOLD: f32 = 0.30;
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            clarification_threshold: Self::DEFAULT_CLARIFICATION_THRESHOLD,
            search_weight: 0.4,
            reasoning_weight: 0.6,
            search_score_scale: 10.0,
            top_k: 10,
            search_timeout: Duration::from_secs(5),
            max_clarifying_questions: 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights_sum_to_one() {
        let config = EngineConfig::default();
        assert!((config.search_weight + config.reasoning_weight - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_default_threshold() {
        let config = EngineConfig::default();
        assert!((config.clarification_threshold - 0.30).abs() < f32::EPSILON);
    }

    #[test]
    fn test_defaults_are_sane() {
        let config = EngineConfig::default();
        assert!(config.search_score_scale > 0.0);
        assert!(config.top_k > 0);
        assert!(config.max_clarifying_questions <= 4);
    }
}
