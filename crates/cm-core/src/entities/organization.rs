use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A registered organization. The id is supplied by the identity collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct OrganizationProfile {
    pub id: String,
    pub name: String,
    pub sector: Option<String>,
    pub employee_count: Option<i64>,
    pub annual_revenue: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrganizationProfile {
    /// Employee count usable as an intensity denominator.
    #[must_use]
    pub fn employees(&self) -> Option<i64> {
        self.employee_count.filter(|n| *n > 0)
    }
}
