//! Order 21 - Legal Costs Assessment.
//!
//! Covers the court's discretion as to costs, the costs-follow-the-event
//! rule, and the indemnity basis. Several nodes embed case-law rationale:
//! the WHY propositions carry verbatim quotes with paragraph citations,
//! and that text must reach the caller byte-for-byte, never rephrased.

use chrono::TimeZone;
use chrono::Utc;

use crate::authority::SourceType;
use crate::error::{LoadError, ModuleError};
use crate::logic::{Conditional, Modality, ModalityType, Proposition};
use crate::metadata::{ModuleCoverage, ModuleMetadata};
use crate::module::{DispatchRule, ModuleCore, ReasoningModule};
use crate::node::{ModuleId, RuleNode};
use crate::tree::LogicTree;

const MODULE_ID: &str = "order_21_costs";

// Case-law quotes are fixture data transcribed from the judgments; the
// text is preserved verbatim, including the original spelling.
const TJIANG_QUOTE: &str = "Order 21 r 3(2) provides: 'Subject to paragraph (1) and this \
Order, if the Court decides to make an order for costs, the general rule is that the \
unsuccessful party must pay the costs of the successful party.' This codifies the \
longstanding common law principle that 'costs follow the event'. The successful party is \
prima facie entitled to costs, and it is for the unsuccessful party to show cause why costs \
should not follow the event. The burden is on the party seeking to displace this presumption.";

const QBE_QUOTE: &str = "Indemnity costs are awarded in exceptional circumstances, where \
there is some conduct or circumstances which take the case out of the norm. This may \
include: (a) where the action is brought in bad faith or amounts to an abuse of process; \
(b) where allegations of fraud or dishonesty are made and proved; (c) where there has been \
manifest unreasonableness in the conduct of proceedings; or (d) where the unsuccessful \
party has unreasonably refused a settlement offer. The court retains discretion under \
O 21 r 2(1) to award indemnity costs in appropriate cases, but this remains the exception \
rather than the rule.";

const ARMIRA_QUOTE: &str = "Under O 21 r 22(3), where costs are ordered to be assessed on \
the indemnity basis, 'all costs shall be allowed except insofar as they are of an \
unreasonable amount or have been unreasonably incurred, and any doubts which the Registrar \
may have as to whether the costs were reasonably incurred or were reasonable in amount \
shall be resolved in favour of the receiving party'. This is a more generous basis than \
the standard basis, as it removes the requirement of proportionality and resolves doubts \
in favour of the receiving party.";

const FOUNDER_QUOTE: &str = "Order 21 r 2(1) of the ROC 2021 preserves the court's \
discretion as to costs: 'Subject to these Rules and any other written law, the costs of \
and incidental to all proceedings are in the discretion of the Court, and the Court has \
the full power to determine by whom and to what extent the costs are to be paid.' This \
discretion is to be exercised judicially, having regard to all relevant circumstances.";

/// Order 21 costs assessment module.
pub struct CostsModule {
    core: ModuleCore,
    rules: Vec<DispatchRule>,
    module_id: ModuleId,
}

impl CostsModule {
    /// Creates the module; fixture nodes load on `initialize`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            core: ModuleCore::new(),
            rules: vec![
                DispatchRule::new(&["indemnity"], "order21_costs_rule22_indemnity", 0.9),
                DispatchRule::new(
                    &["follow the event", "costs follow", "successful party"],
                    "order21_costs_rule3_follow_event",
                    0.9,
                ),
                DispatchRule::new(
                    &["discretion", "factors", "proportionality"],
                    "order21_costs_rule2_discretion",
                    0.85,
                ),
                DispatchRule::new(
                    &["costs", "fees", "expenses", "how much"],
                    "order21_costs_rule3_follow_event",
                    0.7,
                ),
                DispatchRule::fallback("order21_costs_root", 0.5),
            ],
            module_id: ModuleId::new(MODULE_ID),
        }
    }
}

impl Default for CostsModule {
    fn default() -> Self {
        Self::new()
    }
}

impl ReasoningModule for CostsModule {
    fn metadata(&self) -> ModuleMetadata {
        ModuleMetadata::new(
            MODULE_ID,
            "Order 21 - Legal Costs Assessment",
            "1.0.0",
            ModuleCoverage::new(
                "Rules of Court - Order 21 (Costs)",
                vec![
                    "costs".to_string(),
                    "costs_assessment".to_string(),
                    "indemnity_costs".to_string(),
                    "costs_follow_event".to_string(),
                    "costs_discretion".to_string(),
                ],
                vec![
                    "costs".to_string(),
                    "fees".to_string(),
                    "expenses".to_string(),
                    "legal fees".to_string(),
                    "indemnity".to_string(),
                    "party and party costs".to_string(),
                    "assessment".to_string(),
                    "proportionality".to_string(),
                ],
            )
            .with_sections(vec![
                "Order 21 Rule 2 - Powers of Court and costs factors".to_string(),
                "Order 21 Rule 3 - Costs follow the event".to_string(),
                "Order 21 Rule 22 - Basis of assessment".to_string(),
            ]),
            0.8,
        )
        .with_effective_date(Utc.with_ymd_and_hms(2021, 12, 1, 0, 0, 0).unwrap())
        .with_dependencies(vec![ModuleId::new("order_21")])
        .with_description("Costs discretion, the follow-the-event rule and indemnity basis")
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
            .node_id("order21_costs_root")
            .citation("Order 21 (Costs)")
            .source_type(SourceType::Rule)
            .module_id(MODULE_ID)
            .what(Proposition::cited(
                "Order 21 governs the award and assessment of legal costs",
                "Order 21",
            ))
            .which(Proposition::cited(
                "Applies to costs of and incidental to all proceedings",
                "Order 21 Rule 2(1)",
            ))
            .why(Proposition::cited(
                "To compensate the successful party and discipline the conduct of litigation",
                "Common law principle",
            ))
            .child("order21_costs_rule2_discretion")
            .child("order21_costs_rule3_follow_event")
            .child("order21_costs_rule22_indemnity")
            .full_text(
                "Order 21 of the Rules of Court governs the award and assessment of legal \
                 costs in all proceedings.",
            )
            .build()?,
        RuleNode::builder()
            .node_id("order21_costs_rule2_discretion")
            .citation("Order 21 Rule 2(1) - Discretion as to Costs")
            .source_type(SourceType::AppellateCase)
            .module_id(MODULE_ID)
            .parent_id("order21_costs_root")
            .what(Proposition::cited(
                "Costs of and incidental to all proceedings are in the discretion of the Court",
                "Order 21 Rule 2(1)",
            ))
            .which(Proposition::cited(
                "The discretion is exercised judicially, having regard to all relevant circumstances",
                "Founder Group [2023] SGCA 40",
            ))
            .which(Proposition::cited(
                "Proportionality of costs to the matters in issue is a mandatory consideration",
                "Order 21 Rule 2(2)(g)",
            ))
            .if_then(
                Conditional::new(
                    "the Court decides to make an order for costs",
                    "the Court determines by whom and to what extent the costs are to be paid",
                )
                .with_source_line("Order 21 Rule 2(1)"),
            )
            .can_must(
                Modality::new("determine by whom and to what extent costs are paid", ModalityType::Can)
                    .with_condition("subject to the Rules and any other written law")
                    .with_source_line("Order 21 Rule 2(1)"),
            )
            .can_must(
                Modality::new(
                    "have regard to the proportionality of costs to the matters in issue",
                    ModalityType::Must,
                )
                .with_condition("in every costs assessment")
                .with_source_line("Order 21 Rule 2(2)(g)"),
            )
            .given(Proposition::cited(
                "Proceedings have generated costs to be allocated",
                "Order 21 Rule 2",
            ))
            .why(Proposition::cited(
                "To keep costs allocation responsive to the circumstances of each case",
                "Case law",
            ))
            .why(Proposition::cited(
                FOUNDER_QUOTE,
                "Founder Group (Hong Kong) Ltd v Singapore JHC Co Pte Ltd [2023] SGCA 40 [Paragraph 78-82]",
            ))
            .full_text(
                "Order 21 Rule 2(1): Subject to these Rules and any other written law, the \
                 costs of and incidental to all proceedings are in the discretion of the Court.",
            )
            .build()?,
        RuleNode::builder()
            .node_id("order21_costs_rule3_follow_event")
            .citation("Order 21 Rule 3(2) - Costs Follow Event")
            .source_type(SourceType::HighCourtCase)
            .module_id(MODULE_ID)
            .parent_id("order21_costs_root")
            .what(Proposition::cited(
                "The general rule is that the unsuccessful party must pay the costs of the successful party",
                "Order 21 Rule 3(2)",
            ))
            .which(Proposition::cited(
                "Applies as the prima facie rule to all costs determinations",
                "Tjiang Giok Moy [2024] SGHC 146",
            ))
            .which(Proposition::cited(
                "The presumption can be displaced by conduct or where justice requires",
                "Tjiang Giok Moy [2024] SGHC 146",
            ))
            .if_then(
                Conditional::new(
                    "a party succeeds in the application or action",
                    "that party is prima facie entitled to costs",
                )
                .with_source_line("Order 21 Rule 3(2)"),
            )
            .if_then(
                Conditional::new(
                    "a party seeks to displace the presumption",
                    "the burden is on that party to show cause why costs should not follow the event",
                )
                .with_source_line("Tjiang Giok Moy [2024] SGHC 146"),
            )
            .can_must(
                Modality::new("order the unsuccessful party to pay costs", ModalityType::Must)
                    .with_condition("unless cause is shown to displace the presumption")
                    .with_source_line("Order 21 Rule 3(2)"),
            )
            .can_must(
                Modality::new("depart from the costs-follow-the-event principle", ModalityType::May)
                    .with_condition("where conduct or justice requires")
                    .with_source_line("Order 21 Rule 3(2)"),
            )
            .given(Proposition::cited(
                "Proceedings have concluded with an identifiable successful party",
                "Order 21 Rule 3",
            ))
            .why(Proposition::cited(
                "To provide certainty that the successful party recovers its costs",
                "Common law principle",
            ))
            .why(Proposition::cited(
                TJIANG_QUOTE,
                "Tjiang Giok Moy v Ang Jimmy [2024] SGHC 146 [Paragraph 45-47]",
            ))
            .full_text(
                "Order 21 Rule 3(2): Subject to paragraph (1) and this Order, if the Court \
                 decides to make an order for costs, the general rule is that the unsuccessful \
                 party must pay the costs of the successful party.",
            )
            .build()?,
        RuleNode::builder()
            .node_id("order21_costs_rule22_indemnity")
            .citation("Order 21 Rule 22(3) - Indemnity Basis")
            .source_type(SourceType::AppellateCase)
            .module_id(MODULE_ID)
            .parent_id("order21_costs_root")
            .what(Proposition::cited(
                "The indemnity basis allows recovery of all costs reasonably incurred, with doubts resolved in favour of the receiving party",
                "Order 21 Rule 22(3)",
            ))
            .which(Proposition::cited(
                "Applies in exceptional circumstances: reprehensible conduct, commercial dishonesty, abuse of process",
                "QBE Insurance [2023] SGCA 45",
            ))
            .which(Proposition::cited(
                "More generous than the standard basis; proportionality carries less weight",
                "Armira Capital [2025] SGHCR 18",
            ))
            .if_then(
                Conditional::new(
                    "reprehensible conduct, dishonesty, or manifest unreasonableness is proven",
                    "indemnity costs may be awarded",
                )
                .with_source_line("QBE Insurance [2023] SGCA 45"),
            )
            .if_then(
                Conditional::new(
                    "costs are assessed on the indemnity basis",
                    "all costs are allowed except those of an unreasonable amount or unreasonably incurred",
                )
                .with_source_line("Order 21 Rule 22(3)"),
            )
            .can_must(
                Modality::new("award indemnity costs", ModalityType::May)
                    .with_condition("where exceptional circumstances exist")
                    .with_source_line("QBE Insurance [2023] SGCA 45"),
            )
            .can_must(
                Modality::new("resolve doubts in favour of the receiving party", ModalityType::Must)
                    .with_condition("on indemnity basis assessment")
                    .with_source_line("Order 21 Rule 22(3)"),
            )
            .given(Proposition::cited(
                "The Court has decided to award costs on the indemnity basis",
                "Order 21 Rule 22",
            ))
            .why(Proposition::cited(
                "To compensate parties who face reprehensible or unreasonable conduct more fully",
                "Case law",
            ))
            .why(Proposition::cited(
                QBE_QUOTE,
                "QBE Insurance (International) Ltd v Relax Beach Resort Sdn Bhd [2023] SGCA 45 [Paragraph 112-118]",
            ))
            .why(Proposition::cited(
                ARMIRA_QUOTE,
                "Armira Capital Pte Ltd v Ji Zenghe and another [2025] SGHCR 18 [Paragraph 61-65]",
            ))
            .full_text(
                "Order 21 Rule 22(3): Where costs are ordered on the indemnity basis, all \
                 costs shall be allowed except insofar as they are of an unreasonable amount \
                 or have been unreasonably incurred, and any doubts shall be resolved in \
                 favour of the receiving party.",
            )
            .build()?,
    ])
}
