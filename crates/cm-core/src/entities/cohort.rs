use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A member of a comparison cohort, real or synthetic.
///
/// Real peers are shown under a masked label, the requesting organization as
/// `"You"`, synthetic entries under their demo name.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct CohortEntry {
    pub label: String,
    /// Present for real organizations only.
    pub org_id: Option<String>,
    pub employee_count: Option<i64>,
    /// `None` when the organization has no observations in the window.
    pub total_emissions: Option<f64>,
    pub is_self: bool,
    pub is_synthetic: bool,
}

impl CohortEntry {
    /// Emissions per employee, or `None` without data or a positive denominator.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn intensity(&self) -> Option<f64> {
        let total = self.total_emissions?;
        match self.employee_count {
            Some(n) if n > 0 => Some(total / n as f64),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(employees: Option<i64>, total: Option<f64>) -> CohortEntry {
        CohortEntry {
            label: "x".into(),
            org_id: None,
            employee_count: employees,
            total_emissions: total,
            is_self: false,
            is_synthetic: true,
        }
    }

    #[test]
    fn intensity_requires_positive_denominator() {
        assert_eq!(entry(Some(100), Some(250.0)).intensity(), Some(2.5));
        assert_eq!(entry(Some(0), Some(250.0)).intensity(), None);
        assert_eq!(entry(None, Some(250.0)).intensity(), None);
    }

    #[test]
    fn no_data_has_no_intensity() {
        assert_eq!(entry(Some(100), None).intensity(), None);
        assert_eq!(entry(Some(100), Some(0.0)).intensity(), Some(0.0));
    }
}
