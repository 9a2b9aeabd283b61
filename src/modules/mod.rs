//! Concrete reasoning modules, one per legal domain.
//!
//! Each module bundles its expert-validated fixture nodes, coverage
//! metadata, and keyword dispatch table. Fixtures are decomposed at design
//! time from the Rules of Court; the engine never derives new rules.

mod amicable_resolution;
mod costs;
mod default_judgment;
mod payment_into_court;

pub use amicable_resolution::AmicableResolutionModule;
pub use costs::CostsModule;
pub use default_judgment::DefaultJudgmentModule;
pub use payment_into_court::PaymentIntoCourtModule;
