//! Repository modules for CarbonMeter records.
//!
//! Each module adds methods to `CarbonStore` via `impl CarbonStore` blocks.

pub mod activity;
pub mod credit;
pub mod organization;
pub mod rollup;

/// Predicate (over alias `a`) that counts a predicted row only when no real
/// row exists for the same organization and date.
pub(crate) const EFFECTIVE_ROW: &str = "(a.is_prediction = 0 OR NOT EXISTS (
        SELECT 1 FROM activities r
        WHERE r.org_id = a.org_id AND r.activity_date = a.activity_date AND r.is_prediction = 0))";
