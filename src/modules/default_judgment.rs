//! Order 21 - Default Judgment.
//!
//! Covers entry of default judgment when a defendant fails to file a
//! defence, the interlocutory/final split, and the notice requirement.
//! The tree was decomposed from the Order 21 text at design time and
//! validated by counsel before deployment.

use chrono::TimeZone;
use chrono::Utc;

use crate::authority::SourceType;
use crate::error::{LoadError, ModuleError};
use crate::logic::{Conditional, Modality, ModalityType, Proposition};
use crate::metadata::{ModuleCoverage, ModuleMetadata};
use crate::module::{DispatchRule, ModuleCore, ReasoningModule};
use crate::node::{ModuleId, RuleNode};
use crate::tree::LogicTree;

const MODULE_ID: &str = "order_21";

/// Order 21 default judgment module.
pub struct DefaultJudgmentModule {
    core: ModuleCore,
    rules: Vec<DispatchRule>,
    module_id: ModuleId,
}

impl DefaultJudgmentModule {
    /// Creates the module; fixture nodes load on `initialize`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            core: ModuleCore::new(),
            // Specific rules first: the interlocutory/final split and the
            // notice requirement outrank the general entry rule.
            rules: vec![
                DispatchRule::new(
                    &["interlocutory", "unliquidated"],
                    "order21_rule2_interlocutory",
                    0.9,
                ),
                DispatchRule::new(
                    &["final judgment", "liquidated", "debt"],
                    "order21_rule2_final",
                    0.9,
                ),
                DispatchRule::new(&["notice"], "order21_rule3", 0.9),
                DispatchRule::new(
                    &[
                        "default",
                        "didn't respond",
                        "did not respond",
                        "no defence",
                        "no defense",
                        "failed to file",
                        "no response",
                    ],
                    "order21_rule1",
                    0.9,
                ),
                DispatchRule::fallback("order21_root", 0.5),
            ],
            module_id: ModuleId::new(MODULE_ID),
        }
    }
}

impl Default for DefaultJudgmentModule {
    fn default() -> Self {
        Self::new()
    }
}

impl ReasoningModule for DefaultJudgmentModule {
    fn metadata(&self) -> ModuleMetadata {
        ModuleMetadata::new(
            MODULE_ID,
            "Order 21 - Default Judgment",
            "1.0.0",
            ModuleCoverage::new(
                "Rules of Court - Order 21",
                vec![
                    "default_judgment".to_string(),
                    "judgment_in_default".to_string(),
                    "interlocutory_judgment".to_string(),
                    "final_judgment".to_string(),
                    "setting_aside_judgment".to_string(),
                ],
                vec![
                    "default".to_string(),
                    "judgment".to_string(),
                    "no defence".to_string(),
                    "didn't respond".to_string(),
                    "failed to file".to_string(),
                    "no response".to_string(),
                    "enter judgment".to_string(),
                    "interlocutory".to_string(),
                    "final".to_string(),
                    "set aside".to_string(),
                ],
            )
            .with_sections(vec![
                "Order 21 Rule 1 - Entry of default judgment".to_string(),
                "Order 21 Rule 2 - Types of default judgment".to_string(),
                "Order 21 Rule 3 - Notice requirements".to_string(),
            ]),
            0.8,
        )
        .with_effective_date(Utc.with_ymd_and_hms(2021, 12, 1, 0, 0, 0).unwrap())
        .with_dependencies(vec![ModuleId::new("order_5")])
        .with_description("Default judgment procedures when the defendant fails to defend")
    }

    fn initialize(&self) -> Result<(), LoadError> {
        self.core.initialize_with(&self.module_id, fixture_nodes)
    }

    fn tree(&self) -> Result<&LogicTree, ModuleError> {
        self.core.tree(&self.module_id)
    }

    fn dispatch_rules(&self) -> &[DispatchRule] {
        &self.rules
    }
}

fn fixture_nodes() -> Result<Vec<RuleNode>, LoadError> {
    Ok(vec![
        RuleNode::builder()
            .node_id("order21_root")
            .citation("Order 21")
            .source_type(SourceType::Rule)
            .module_id(MODULE_ID)
            .what(Proposition::cited(
                "Order 21 governs default judgment procedures",
                "Order 21",
            ))
            .which(Proposition::cited(
                "Applies when a defendant fails to file a defence or notice of intention to contest",
                "Order 21",
            ))
            .why(Proposition::cited(
                "To provide a remedy when the defendant shows no intention to defend the claim",
                "Practice Directions",
            ))
            .why(Proposition::cited(
                "To prevent defendants from delaying proceedings indefinitely",
                "Case law",
            ))
            .child("order21_rule1")
            .full_text(
                "Order 21 of the Rules of Court governs procedures for obtaining default \
                 judgment when a defendant fails to defend proceedings.",
            )
            .build()?,
        RuleNode::builder()
            .node_id("order21_rule1")
            .citation("Order 21 Rule 1")
            .source_type(SourceType::Rule)
            .module_id(MODULE_ID)
            .parent_id("order21_root")
            .what(Proposition::cited(
                "Default judgment may be entered against a defendant who fails to defend",
                "Order 21 Rule 1(1)",
            ))
            .which(Proposition::cited(
                "Applies to defendants who fail to file a defence within the prescribed time",
                "Order 21 Rule 1(1)",
            ))
            .which(Proposition::cited(
                "Does not apply if leave to file a late defence is granted",
                "Order 21 Rule 1(1)",
            ))
            .if_then(
                Conditional::new(
                    "defendant fails to file a defence within the prescribed time",
                    "claimant may apply for default judgment",
                )
                .with_exception("if the court grants leave to file a late defence")
                .with_source_line("Order 21 Rule 1(1)"),
            )
            .if_then(
                Conditional::new(
                    "the originating claim was not properly served",
                    "default judgment cannot be entered",
                )
                .with_source_line("Order 7"),
            )
            .can_must(
                Modality::new("apply for default judgment", ModalityType::May)
                    .with_condition("after the time for filing a defence has expired")
                    .with_condition("when no defence has been filed")
                    .with_source_line("Order 21 Rule 1(1)"),
            )
            .can_must(
                Modality::new("serve notice of the application on the defendant", ModalityType::Must)
                    .with_condition("before applying for default judgment")
                    .with_source_line("Order 21 Rule 3"),
            )
            .given(Proposition::cited(
                "Service of the originating claim was properly effected",
                "Order 7",
            ))
            .given(Proposition::cited(
                "Time for filing the defence has expired (typically 14 days)",
                "Order 6 Rule 6",
            ))
            .given(Proposition::cited(
                "No defence has been filed",
                "Order 21 Rule 1",
            ))
            .why(Proposition::cited(
                "To prevent defendants from delaying proceedings without cause",
                "Practice Directions",
            ))
            .why(Proposition::cited(
                "To provide an efficient remedy when the defendant shows no intention to defend",
                "Case law",
            ))
            .child("order21_rule2_interlocutory")
            .child("order21_rule2_final")
            .child("order21_rule3")
            .full_text(
                "Order 21 Rule 1: Where a defendant to an action has failed to file a defence \
                 within the prescribed time, the claimant may apply to the Court for judgment \
                 in default of defence.",
            )
            .build()?,
        RuleNode::builder()
            .node_id("order21_rule2_interlocutory")
            .citation("Order 21 Rule 2(1) - Interlocutory Judgment")
            .source_type(SourceType::Rule)
            .module_id(MODULE_ID)
            .parent_id("order21_rule1")
            .what(Proposition::cited(
                "Interlocutory judgment establishes liability with damages to be assessed",
                "Order 21 Rule 2(1)",
            ))
            .which(Proposition::cited(
                "Applies to claims for unliquidated damages",
                "Order 21 Rule 2(1)",
            ))
            .if_then(
                Conditional::new(
                    "the claim is for unliquidated damages",
                    "claimant may apply for interlocutory judgment with damages to be assessed",
                )
                .with_source_line("Order 21 Rule 2(1)"),
            )
            .if_then(
                Conditional::new(
                    "interlocutory judgment is granted",
                    "the matter proceeds to a damages assessment hearing",
                )
                .with_source_line("Order 21 Rule 2(1)"),
            )
            .can_must(
                Modality::new("apply for interlocutory judgment", ModalityType::May)
                    .with_condition("when the claim is for unliquidated damages")
                    .with_source_line("Order 21 Rule 2(1)"),
            )
            .can_must(
                Modality::new("attend the damages assessment hearing", ModalityType::Must)
                    .with_condition("after interlocutory judgment is granted")
                    .with_source_line("Order 21 Rule 2(1)"),
            )
            .given(Proposition::cited(
                "Default judgment conditions are met (no defence filed)",
                "Order 21 Rule 1",
            ))
            .why(Proposition::cited(
                "To establish liability first while allowing proper assessment of damages",
                "Case law",
            ))
            .full_text(
                "Order 21 Rule 2(1): Where the claimant's claim is for unliquidated damages, \
                 the claimant may apply for interlocutory judgment with damages to be assessed.",
            )
            .build()?,
        RuleNode::builder()
            .node_id("order21_rule2_final")
            .citation("Order 21 Rule 2(2) - Final Judgment")
            .source_type(SourceType::Rule)
            .module_id(MODULE_ID)
            .parent_id("order21_rule1")
            .what(Proposition::cited(
                "Final judgment awards a specific sum with immediate enforcement",
                "Order 21 Rule 2(2)",
            ))
            .which(Proposition::cited(
                "Applies to claims for liquidated (fixed) sums",
                "Order 21 Rule 2(2)",
            ))
            .if_then(
                Conditional::new(
                    "the claim is for a liquidated sum",
                    "claimant may apply for final judgment for that sum plus costs",
                )
                .with_source_line("Order 21 Rule 2(2)"),
            )
            .can_must(
                Modality::new("apply for final judgment", ModalityType::May)
                    .with_condition("when the claim is for a liquidated sum")
                    .with_source_line("Order 21 Rule 2(2)"),
            )
            .can_must(
                Modality::new("specify the exact amount claimed", ModalityType::Must)
                    .with_condition("when applying for final judgment")
                    .with_source_line("Order 21 Rule 2(2)"),
            )
            .given(Proposition::cited(
                "Default judgment conditions are met",
                "Order 21 Rule 1",
            ))
            .why(Proposition::cited(
                "To avoid an unnecessary assessment hearing when the amount is certain",
                "Efficiency principle",
            ))
            .full_text(
                "Order 21 Rule 2(2): Where the claimant's claim is for a liquidated sum, the \
                 claimant may apply for final judgment for that sum plus costs and interest.",
            )
            .build()?,
        RuleNode::builder()
            .node_id("order21_rule3")
            .citation("Order 21 Rule 3")
            .source_type(SourceType::Rule)
            .module_id(MODULE_ID)
            .parent_id("order21_rule1")
            .what(Proposition::cited(
                "Notice of the application for default judgment must be served on the defendant",
                "Order 21 Rule 3",
            ))
            .which(Proposition::cited(
                "Applies to all default judgment applications",
                "Order 21 Rule 3",
            ))
            .which(Proposition::cited(
                "The notice period is typically 3 days",
                "Order 21 Rule 3",
            ))
            .if_then(
                Conditional::new(
                    "notice is not properly served",
                    "the default judgment may be set aside",
                )
                .with_source_line("Order 21 Rule 3"),
            )
            .can_must(
                Modality::new("serve notice on the defendant before applying", ModalityType::Must)
                    .with_condition("for all default judgment applications")
                    .with_source_line("Order 21 Rule 3"),
            )
            .can_must(
                Modality::new("apply without notice", ModalityType::MayNot)
                    .with_condition("except in exceptional circumstances")
                    .with_source_line("Order 21 Rule 3"),
            )
            .given(Proposition::cited(
                "The claimant intends to apply for default judgment",
                "Order 21 Rule 1",
            ))
            .why(Proposition::cited(
                "To give the defendant a last opportunity to respond before judgment is entered",
                "Natural justice principle",
            ))
            .why(Proposition::cited(
                "To prevent judgment by surprise",
                "Procedural fairness",
            ))
            .full_text(
                "Order 21 Rule 3: No default judgment shall be entered unless the claimant has \
                 served on the defendant notice of the application at least 3 days before the \
                 hearing.",
            )
            .build()?,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::Dimension;

    fn ready() -> DefaultJudgmentModule {
        let m = DefaultJudgmentModule::new();
        m.initialize().unwrap();
        m
    }

    #[test]
    fn test_fixture_loads_clean() {
        let m = ready();
        let tree = m.tree().unwrap();
        assert_eq!(tree.len(), 5);
        assert_eq!(tree.roots().len(), 1);
        for node in tree.nodes() {
            assert!(tree.validate_node(node).is_empty(), "{}", node.node_id);
        }
    }

    #[test]
    fn test_metadata_does_not_require_initialize() {
        let m = DefaultJudgmentModule::new();
        let meta = m.metadata();
        assert_eq!(meta.module_id.as_str(), "order_21");
        assert!(meta.coverage.topics.contains(&"default_judgment".to_string()));
        assert!(!m.core.is_initialized());
    }

    #[test]
    fn test_default_judgment_question_reaches_rule1() {
        let m = ready();
        let result = m
            .reason("Can I get default judgment if defendant didn't respond?")
            .unwrap();

        assert!(result.confidence >= 0.8);
        assert_eq!(result.applicable_nodes[0].node_id.as_str(), "order21_rule1");
        assert!(result.conclusion.contains("apply for default judgment"));
        assert!(!result.steps_for(Dimension::Given).is_empty());
    }

    #[test]
    fn test_interlocutory_outranks_general_rule() {
        let m = ready();
        let result = m.reason("What is interlocutory judgment?").unwrap();
        assert_eq!(
            result.applicable_nodes[0].node_id.as_str(),
            "order21_rule2_interlocutory"
        );
    }

    #[test]
    fn test_notice_question_reaches_rule3() {
        let m = ready();
        let result = m
            .reason("Must I serve notice before applying for default judgment?")
            .unwrap();
        assert_eq!(result.applicable_nodes[0].node_id.as_str(), "order21_rule3");
        assert!(result.conclusion.starts_with("Yes, you must"));
    }

    #[test]
    fn test_search_finds_liquidated_claims() {
        let m = ready();
        let results = m.search("liquidated sum", None, 5).unwrap();
        assert!(!results.is_empty());
        assert_eq!(results[0].node.node_id.as_str(), "order21_rule2_final");
    }

    #[test]
    fn test_unrelated_question_falls_back_to_root() {
        let m = ready();
        let result = m.reason("something entirely unrelated").unwrap();
        assert_eq!(result.applicable_nodes[0].node_id.as_str(), "order21_root");
        assert!((result.confidence - 0.5).abs() < f32::EPSILON);
    }
}
