//! Organization profiles and real activity logging.

use chrono::NaiveDate;
use cm_core::entities::{ActivityObservation, ActivityPayload, OrganizationProfile};
use cm_core::enums::{Category, Scope};
use cm_core::responses::EmissionCalculation;
use cm_db::error::DatabaseError;
use cm_db::repos::activity::{ActivityFilter, NewActivity};
use cm_db::repos::organization::OrganizationUpdate;
use cm_predictor::Predictor;

use crate::engine::{CarbonEngine, today};
use crate::error::EngineError;

/// Input for [`CarbonEngine::register_organization`].
#[derive(Debug, Clone, Default)]
pub struct NewOrganization {
    pub id: String,
    pub name: String,
    pub sector: Option<String>,
    pub employee_count: Option<i64>,
    pub annual_revenue: Option<f64>,
}

/// One real activity to price and record.
#[derive(Debug, Clone)]
pub struct LogActivity {
    pub activity_date: NaiveDate,
    pub scope: Scope,
    pub category: Category,
    pub payload: ActivityPayload,
}

fn require_non_empty(field: &str, value: &str) -> Result<(), EngineError> {
    if value.trim().is_empty() {
        return Err(EngineError::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}

fn check_profile_numbers(
    employee_count: Option<i64>,
    annual_revenue: Option<f64>,
) -> Result<(), EngineError> {
    if let Some(n) = employee_count {
        if n < 0 {
            return Err(EngineError::Validation(format!(
                "employee count must not be negative, got {n}"
            )));
        }
    }
    if let Some(r) = annual_revenue {
        if !r.is_finite() || r < 0.0 {
            return Err(EngineError::Validation(format!(
                "annual revenue must be a non-negative number, got {r}"
            )));
        }
    }
    Ok(())
}

fn trimmed(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

impl<P: Predictor> CarbonEngine<P> {
    // -----------------------------------------------------------------------
    // Organizations
    // -----------------------------------------------------------------------

    /// Register an organization profile.
    ///
    /// # Errors
    ///
    /// [`EngineError::Validation`] for a blank id or name, negative numbers, or
    /// an id that is already registered.
    pub async fn register_organization(
        &self,
        new: &NewOrganization,
    ) -> Result<OrganizationProfile, EngineError> {
        require_non_empty("organization id", &new.id)?;
        require_non_empty("organization name", &new.name)?;
        check_profile_numbers(new.employee_count, new.annual_revenue)?;

        let id = new.id.trim();
        if self.store().find_organization(id).await?.is_some() {
            return Err(EngineError::Validation(format!(
                "organization {id} is already registered"
            )));
        }

        let profile = self
            .store()
            .register_organization(
                id,
                new.name.trim(),
                trimmed(new.sector.as_deref()),
                new.employee_count,
                new.annual_revenue,
            )
            .await?;
        tracing::info!(org_id = %profile.id, sector = ?profile.sector, "registered organization");
        Ok(profile)
    }

    /// Apply the `Some` fields of `update` to a registered profile.
    ///
    /// # Errors
    ///
    /// [`EngineError::NotFound`] for an unregistered id,
    /// [`EngineError::Validation`] for bad values.
    pub async fn update_organization(
        &self,
        org_id: &str,
        update: &OrganizationUpdate,
    ) -> Result<OrganizationProfile, EngineError> {
        if let Some(name) = update.name.as_deref() {
            require_non_empty("organization name", name)?;
        }
        check_profile_numbers(update.employee_count, update.annual_revenue)?;

        let mut update = update.clone();
        update.name = update.name.map(|n| n.trim().to_string());
        update.sector = update.sector.map(|s| s.trim().to_string());

        match self.store().update_organization(org_id, &update).await {
            Ok(profile) => Ok(profile),
            Err(DatabaseError::NoResult) => Err(EngineError::organization_not_found(org_id)),
            Err(e) => Err(e.into()),
        }
    }

    /// A registered profile.
    ///
    /// # Errors
    ///
    /// [`EngineError::NotFound`] for an unregistered id.
    pub async fn get_organization(
        &self,
        org_id: &str,
    ) -> Result<OrganizationProfile, EngineError> {
        self.store()
            .find_organization(org_id)
            .await?
            .ok_or_else(|| EngineError::organization_not_found(org_id))
    }

    // -----------------------------------------------------------------------
    // Activities
    // -----------------------------------------------------------------------

    /// Price one activity without recording it.
    ///
    /// # Errors
    ///
    /// See [`crate::Calculator::compute`].
    pub fn calculate(&self, payload: &ActivityPayload) -> Result<EmissionCalculation, EngineError> {
        self.calculator().compute(payload)
    }

    /// Price and record one real activity.
    ///
    /// # Errors
    ///
    /// - [`EngineError::NotFound`] for an unregistered organization.
    /// - [`EngineError::Validation`] for a category outside its scope, the
    ///   reserved forecast category, or a future date.
    /// - [`EngineError::UnknownActivityKind`] when the kind cannot be priced.
    pub async fn log_activity(
        &self,
        org_id: &str,
        activity: &LogActivity,
    ) -> Result<ActivityObservation, EngineError> {
        if !activity.category.allows_real(activity.scope) {
            return Err(EngineError::Validation(format!(
                "category '{}' cannot be recorded under {}",
                activity.category.label(),
                activity.scope.label()
            )));
        }
        if activity.activity_date > today() {
            return Err(EngineError::Validation(format!(
                "activity date {} is in the future",
                activity.activity_date
            )));
        }
        self.get_organization(org_id).await?;

        let calc = self.calculator().compute(&activity.payload)?;
        let observation = self
            .store()
            .insert_activity(&NewActivity {
                org_id: org_id.to_string(),
                activity_date: activity.activity_date,
                scope: activity.scope,
                category: activity.category,
                payload: activity.payload.clone(),
                emission_value: calc.emission_value,
                factor: calc.factor,
            })
            .await?;

        tracing::debug!(
            org_id,
            date = %observation.activity_date,
            scope = %observation.scope,
            category = %observation.category,
            emission = observation.emission_value,
            "logged activity"
        );
        Ok(observation)
    }

    /// Observations of an organization, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Database`] on store failure.
    pub async fn list_activities(
        &self,
        org_id: &str,
        filter: &ActivityFilter,
    ) -> Result<Vec<ActivityObservation>, EngineError> {
        let mut filter = filter.clone();
        if filter.limit.is_none() {
            filter.limit = Some(self.config().general.default_limit);
        }
        Ok(self.store().list_activities(org_id, &filter).await?)
    }
}
