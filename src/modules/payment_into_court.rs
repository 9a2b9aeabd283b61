//! Order 14 - Payment into Court.
//!
//! Payment into court as a settlement mechanism: making the payment,
//! accepting it, and the non-disclosure rule.

use chrono::TimeZone;
use chrono::Utc;

use crate::authority::SourceType;
use crate::error::{LoadError, ModuleError};
use crate::logic::{Conditional, Modality, ModalityType, Proposition};
use crate::metadata::{ModuleCoverage, ModuleMetadata};
use crate::module::{DispatchRule, ModuleCore, ReasoningModule};
use crate::node::{ModuleId, RuleNode};
use crate::tree::LogicTree;

const MODULE_ID: &str = "order_14";

/// Order 14 payment into court module.
pub struct PaymentIntoCourtModule {
    core: ModuleCore,
    rules: Vec<DispatchRule>,
    module_id: ModuleId,
}

impl PaymentIntoCourtModule {
    /// Creates the module; fixture nodes load on `initialize`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            core: ModuleCore::new(),
            rules: vec![
                DispatchRule::new(&["accept", "acceptance"], "order14_rule3", 0.9),
                DispatchRule::new(
                    &["disclose", "disclosure", "non-disclosure"],
                    "order14_rule7",
                    0.9,
                ),
                DispatchRule::new(
                    &["payment into court", "pay into court", "calderbank", "tender"],
                    "order14_rule1",
                    0.9,
                ),
                DispatchRule::new(&["offer", "settlement", "satisfaction"], "order14_rule1", 0.7),
                DispatchRule::fallback("order14_root", 0.5),
            ],
            module_id: ModuleId::new(MODULE_ID),
        }
    }
}

impl Default for PaymentIntoCourtModule {
    fn default() -> Self {
        Self::new()
    }
}

impl ReasoningModule for PaymentIntoCourtModule {
    fn metadata(&self) -> ModuleMetadata {
        ModuleMetadata::new(
            MODULE_ID,
            "Order 14 - Payment into Court",
            "1.0.0",
            ModuleCoverage::new(
                "Rules of Court - Order 14",
                vec![
                    "payment_into_court".to_string(),
                    "calderbank".to_string(),
                    "settlement".to_string(),
                    "offer_to_settle".to_string(),
                    "costs_consequences".to_string(),
                ],
                vec![
                    "payment into court".to_string(),
                    "pay into court".to_string(),
                    "calderbank".to_string(),
                    "offer".to_string(),
                    "accept".to_string(),
                    "acceptance".to_string(),
                    "satisfaction".to_string(),
                    "tender".to_string(),
                    "non-disclosure".to_string(),
                ],
            )
            .with_sections(vec![
                "Order 14 Rule 1 - Payment into Court".to_string(),
                "Order 14 Rule 3 - Acceptance".to_string(),
                "Order 14 Rule 7 - Non-disclosure".to_string(),
            ]),
            0.8,
        )
        .with_effective_date(Utc.with_ymd_and_hms(2021, 12, 1, 0, 0, 0).unwrap())
        .with_description("Payment into court procedures and settlement mechanisms")
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
            .node_id("order14_root")
            .citation("Order 14 - Payment into Court")
            .source_type(SourceType::Rule)
            .module_id(MODULE_ID)
            .what(Proposition::cited(
                "Order 14 governs payment into court as a means of settling claims",
                "Order 14",
            ))
            .which(Proposition::cited(
                "Applies to actions for debt or damages",
                "Order 14 Rule 1(1)",
            ))
            .why(Proposition::cited(
                "To give defendants a formal mechanism to settle with costs protection",
                "Practice",
            ))
            .child("order14_rule1")
            .child("order14_rule3")
            .child("order14_rule7")
            .full_text(
                "Order 14 of the Rules of Court governs payment into court in satisfaction \
                 of a claim and its costs consequences.",
            )
            .build()?,
        RuleNode::builder()
            .node_id("order14_rule1")
            .citation("Order 14 Rule 1")
            .source_type(SourceType::Rule)
            .module_id(MODULE_ID)
            .parent_id("order14_root")
            .what(Proposition::cited(
                "A defendant may pay money into court in satisfaction of the claim",
                "Order 14 Rule 1(1)",
            ))
            .which(Proposition::cited(
                "Applies in any action for debt or damages",
                "Order 14 Rule 1(1)",
            ))
            .if_then(
                Conditional::new(
                    "the defendant pays money into court in satisfaction",
                    "the payment operates as an offer to settle the claim for that sum",
                )
                .with_source_line("Order 14 Rule 1(2)"),
            )
            .if_then(
                Conditional::new(
                    "the claimant recovers no more than the amount paid in at trial",
                    "the claimant may be ordered to bear the costs incurred after the payment",
                )
                .with_source_line("Order 14 Rule 1(3)"),
            )
            .can_must(
                Modality::new("pay money into court in satisfaction of the claim", ModalityType::May)
                    .with_condition("at any time after being served with the originating claim")
                    .with_source_line("Order 14 Rule 1(1)"),
            )
            .can_must(
                Modality::new("give notice of the payment to every other party", ModalityType::Must)
                    .with_source_line("Order 14 Rule 1(4)"),
            )
            .given(Proposition::cited(
                "An action for debt or damages is pending",
                "Order 14 Rule 1",
            ))
            .why(Proposition::cited(
                "To pressure realistic settlement by shifting costs risk to the claimant",
                "Practice",
            ))
            .full_text(
                "Order 14 Rule 1: In any action for debt or damages, the defendant may pay \
                 into Court a sum of money in satisfaction of the claim, with notice to \
                 every other party.",
            )
            .build()?,
        RuleNode::builder()
            .node_id("order14_rule3")
            .citation("Order 14 Rule 3")
            .source_type(SourceType::Rule)
            .module_id(MODULE_ID)
            .parent_id("order14_root")
            .what(Proposition::cited(
                "The claimant may accept a payment into court within 14 days of notice",
                "Order 14 Rule 3(1)",
            ))
            .which(Proposition::cited(
                "Applies to payments made before the trial begins",
                "Order 14 Rule 3(1)",
            ))
            .if_then(
                Conditional::new(
                    "the claimant accepts the payment within 14 days",
                    "the action is stayed in respect of the claim to which the payment relates",
                )
                .with_source_line("Order 14 Rule 3(2)"),
            )
            .can_must(
                Modality::new("accept the payment by filing the prescribed notice", ModalityType::May)
                    .with_condition("within 14 days after receiving notice of the payment")
                    .with_source_line("Order 14 Rule 3(1)"),
            )
            .can_must(
                Modality::new("obtain the Court's leave to accept after the period expires", ModalityType::Must)
                    .with_source_line("Order 14 Rule 3(3)"),
            )
            .given(Proposition::cited(
                "A payment into court has been made and notified",
                "Order 14 Rule 1",
            ))
            .why(Proposition::cited(
                "A fixed acceptance window keeps the offer from hanging over the trial",
                "Procedural certainty",
            ))
            .full_text(
                "Order 14 Rule 3: The claimant may, within 14 days after receiving notice \
                 of a payment into Court, accept the payment, whereupon the action is \
                 stayed.",
            )
            .build()?,
        RuleNode::builder()
            .node_id("order14_rule7")
            .citation("Order 14 Rule 7")
            .source_type(SourceType::Rule)
            .module_id(MODULE_ID)
            .parent_id("order14_root")
            .what(Proposition::cited(
                "A payment into court must not be disclosed to the Court until all questions of liability and amount are decided",
                "Order 14 Rule 7(1)",
            ))
            .which(Proposition::cited(
                "Applies to the trial of the action and every interlocutory hearing",
                "Order 14 Rule 7(1)",
            ))
            .if_then(
                Conditional::new(
                    "the payment is disclosed prematurely",
                    "the Court may order a new trial before another judge",
                )
                .with_source_line("Order 14 Rule 7(2)"),
            )
            .can_must(
                Modality::new("disclose the payment to the trial judge before liability is decided", ModalityType::MustNot)
                    .with_source_line("Order 14 Rule 7(1)"),
            )
            .given(Proposition::cited(
                "A payment into court has been made",
                "Order 14 Rule 1",
            ))
            .why(Proposition::cited(
                "To keep the tribunal's assessment of the merits untainted by the offer",
                "Fair trial principle",
            ))
            .full_text(
                "Order 14 Rule 7: A payment into Court must not be disclosed to the Court \
                 at the trial until all questions of liability and of the amount of debt or \
                 damages have been decided.",
            )
            .build()?,
    ])
}
