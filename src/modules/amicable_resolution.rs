//! Order 5 - Amicable Resolution.
//!
//! The duty to consider amicable resolution of disputes, the required terms
//! of an offer, and the court's powers to order ADR.

use chrono::TimeZone;
use chrono::Utc;

use crate::authority::SourceType;
use crate::error::{LoadError, ModuleError};
use crate::logic::{Conditional, Modality, ModalityType, Proposition};
use crate::metadata::{ModuleCoverage, ModuleMetadata};
use crate::module::{DispatchRule, ModuleCore, ReasoningModule};
use crate::node::{ModuleId, RuleNode};
use crate::tree::LogicTree;

const MODULE_ID: &str = "order_5";

/// Order 5 amicable resolution module.
pub struct AmicableResolutionModule {
    core: ModuleCore,
    rules: Vec<DispatchRule>,
    module_id: ModuleId,
}

impl AmicableResolutionModule {
    /// Creates the module; fixture nodes load on `initialize`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            core: ModuleCore::new(),
            rules: vec![
                DispatchRule::new(
                    &["duty", "must make", "must offer", "reject", "reasonable grounds"],
                    "order5_rule1",
                    0.9,
                ),
                DispatchRule::new(
                    &["writing", "14 days", "open for", "without prejudice", "confidential"],
                    "order5_rule2",
                    0.9,
                ),
                DispatchRule::new(
                    &["court order", "court may", "sealed document", "court power"],
                    "order5_rule3",
                    0.9,
                ),
                DispatchRule::new(
                    &["settle", "settlement", "offer", "amicable", "mediation", "adr"],
                    "order5_rule1",
                    0.75,
                ),
                DispatchRule::fallback("order5_root", 0.5),
            ],
            module_id: ModuleId::new(MODULE_ID),
        }
    }
}

impl Default for AmicableResolutionModule {
    fn default() -> Self {
        Self::new()
    }
}

impl ReasoningModule for AmicableResolutionModule {
    fn metadata(&self) -> ModuleMetadata {
        ModuleMetadata::new(
            MODULE_ID,
            "Order 5 - Amicable Resolution",
            "1.0.0",
            ModuleCoverage::new(
                "Rules of Court - Order 5",
                vec![
                    "amicable_resolution".to_string(),
                    "adr".to_string(),
                    "settlement".to_string(),
                    "mediation".to_string(),
                    "offer_to_settle".to_string(),
                ],
                vec![
                    "amicable resolution".to_string(),
                    "settle".to_string(),
                    "settlement".to_string(),
                    "adr".to_string(),
                    "alternative dispute resolution".to_string(),
                    "mediation".to_string(),
                    "offer".to_string(),
                    "without prejudice".to_string(),
                    "reasonable grounds".to_string(),
                ],
            )
            .with_sections(vec![
                "Order 5 Rule 1 - Duty to consider amicable resolution".to_string(),
                "Order 5 Rule 2 - Terms of amicable resolution".to_string(),
                "Order 5 Rule 3 - Powers of Court".to_string(),
            ]),
            0.8,
        )
        .with_effective_date(Utc.with_ymd_and_hms(2021, 12, 1, 0, 0, 0).unwrap())
        .with_description("Duty to consider amicable resolution and ADR procedures")
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
            .node_id("order5_root")
            .citation("Order 5 - Amicable Resolution")
            .source_type(SourceType::Rule)
            .module_id(MODULE_ID)
            .what(Proposition::cited(
                "Order 5 governs the duty to consider amicable resolution of disputes",
                "Order 5",
            ))
            .which(Proposition::cited(
                "Applies to all parties to any proceedings, whether actions or appeals",
                "Order 5 Rule 1(1)",
            ))
            .why(Proposition::cited(
                "To resolve disputes without the cost and delay of full litigation",
                "Ideals of the Rules of Court",
            ))
            .child("order5_rule1")
            .child("order5_rule2")
            .child("order5_rule3")
            .full_text(
                "Order 5 of the Rules of Court imposes a duty on parties to consider \
                 amicable resolution of their dispute before and during proceedings.",
            )
            .build()?,
        RuleNode::builder()
            .node_id("order5_rule1")
            .citation("Order 5 Rule 1")
            .source_type(SourceType::Rule)
            .module_id(MODULE_ID)
            .parent_id("order5_root")
            .what(Proposition::cited(
                "A party has a duty to consider amicable resolution before and during proceedings",
                "Order 5 Rule 1(1)",
            ))
            .which(Proposition::cited(
                "Applies before commencement and throughout the action",
                "Order 5 Rule 1(1)",
            ))
            .if_then(
                Conditional::new(
                    "a party rejects an offer of amicable resolution",
                    "the party must have reasonable grounds for the rejection",
                )
                .with_source_line("Order 5 Rule 1(3)"),
            )
            .can_must(
                Modality::new("make an offer of amicable resolution", ModalityType::Must)
                    .with_condition("before commencing the action, unless reasonable grounds exist not to")
                    .with_source_line("Order 5 Rule 1(2)"),
            )
            .can_must(
                Modality::new("reject an offer of amicable resolution without reasonable grounds", ModalityType::MustNot)
                    .with_source_line("Order 5 Rule 1(3)"),
            )
            .given(Proposition::cited(
                "A dispute exists between the parties",
                "Order 5 Rule 1",
            ))
            .why(Proposition::cited(
                "Unreasonable refusal to attempt amicable resolution may attract adverse costs consequences",
                "BNX v BOE [2023] SGHC 123",
            ))
            .full_text(
                "Order 5 Rule 1: A party to any proceedings has the duty to consider \
                 amicable resolution of the dispute before the commencement and during the \
                 course of any action or appeal.",
            )
            .build()?,
        RuleNode::builder()
            .node_id("order5_rule2")
            .citation("Order 5 Rule 2")
            .source_type(SourceType::Rule)
            .module_id(MODULE_ID)
            .parent_id("order5_root")
            .what(Proposition::cited(
                "An offer of amicable resolution must be in writing and open for acceptance for a stated period",
                "Order 5 Rule 2",
            ))
            .which(Proposition::cited(
                "Applies to offers to settle and offers to resolve by ADR",
                "Order 5 Rule 2(1)",
            ))
            .if_then(
                Conditional::new(
                    "an offer of amicable resolution is made",
                    "it must be open for acceptance for at least 14 days",
                )
                .with_exception("unless the parties agree otherwise")
                .with_source_line("Order 5 Rule 2(2)"),
            )
            .can_must(
                Modality::new("make the offer in writing", ModalityType::Must)
                    .with_source_line("Order 5 Rule 2(1)"),
            )
            .can_must(
                Modality::new("disclose a without-prejudice offer to the court before all issues are decided", ModalityType::MustNot)
                    .with_source_line("Order 5 Rule 2(3)"),
            )
            .given(Proposition::cited(
                "A party intends to propose amicable resolution",
                "Order 5 Rule 2",
            ))
            .why(Proposition::cited(
                "Written, time-bound offers give both parties a fair chance to assess settlement",
                "Procedural fairness",
            ))
            .full_text(
                "Order 5 Rule 2: An offer of amicable resolution must be in writing and \
                 must be open for acceptance for at least 14 days, and is made without \
                 prejudice except as to costs.",
            )
            .build()?,
        RuleNode::builder()
            .node_id("order5_rule3")
            .citation("Order 5 Rule 3")
            .source_type(SourceType::Rule)
            .module_id(MODULE_ID)
            .parent_id("order5_root")
            .what(Proposition::cited(
                "The Court may order parties to attempt amicable resolution",
                "Order 5 Rule 3(1)",
            ))
            .which(Proposition::cited(
                "Applies where the Court considers amicable resolution appropriate",
                "Order 5 Rule 3(1)",
            ))
            .if_then(
                Conditional::new(
                    "a party is ordered to attempt amicable resolution and refuses",
                    "the refusal may be taken into account on costs",
                )
                .with_source_line("Order 5 Rule 3(2)"),
            )
            .can_must(
                Modality::new("order the parties to attempt amicable resolution", ModalityType::May)
                    .with_condition("having regard to the Ideals and circumstances of the case")
                    .with_source_line("Order 5 Rule 3(1)"),
            )
            .can_must(
                Modality::new("have regard to a sealed document on the question of costs", ModalityType::May)
                    .with_condition("after all other issues have been determined")
                    .with_source_line("Order 5 Rule 3(3)"),
            )
            .given(Proposition::cited(
                "Proceedings are before the Court",
                "Order 5 Rule 3",
            ))
            .why(Proposition::cited(
                "To encourage settlement while preserving the confidentiality of offers",
                "Ideals of the Rules of Court",
            ))
            .full_text(
                "Order 5 Rule 3: The Court may order the parties to attempt to resolve the \
                 dispute by amicable resolution, and may have regard to a sealed offer on \
                 the question of costs.",
            )
            .build()?,
    ])
}
