//! Entity structs for CarbonMeter domain objects.
//!
//! Persisted entities map to tables in the libSQL database; `CohortEntry` is
//! computed per request and never stored. All structs derive `Serialize`,
//! `Deserialize`, and `JsonSchema` for JSON roundtrip and schema validation.

mod activity;
mod cohort;
mod credit;
mod organization;

pub use activity::{ActivityObservation, ActivityPayload, FactorRef};
pub use cohort::CohortEntry;
pub use credit::{CREDIT_TOLERANCE, CreditTotals, CreditTransaction, covers};
pub use organization::OrganizationProfile;
