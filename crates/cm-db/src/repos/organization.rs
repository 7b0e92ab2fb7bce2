//! Organization profile repository.

use chrono::{NaiveDate, Utc};
use serde::Serialize;

use cm_core::entities::OrganizationProfile;

use crate::error::DatabaseError;
use crate::helpers::{get_opt_f64, get_opt_string, parse_datetime};
use crate::repos::EFFECTIVE_ROW;
use crate::store::CarbonStore;

const SELECT_COLS: &str =
    "o.id, o.name, o.sector, o.employee_count, o.annual_revenue, o.created_at, o.updated_at";

fn row_to_organization(row: &libsql::Row) -> Result<OrganizationProfile, DatabaseError> {
    Ok(OrganizationProfile {
        id: row.get::<String>(0)?,
        name: row.get::<String>(1)?,
        sector: get_opt_string(row, 2)?,
        employee_count: row.get::<Option<i64>>(3)?,
        annual_revenue: get_opt_f64(row, 4)?,
        created_at: parse_datetime(&row.get::<String>(5)?)?,
        updated_at: parse_datetime(&row.get::<String>(6)?)?,
    })
}

/// Changed profile fields. Only `Some` fields produce SET clauses.
#[derive(Debug, Clone, Default, Serialize)]
pub struct OrganizationUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annual_revenue: Option<f64>,
}

impl OrganizationUpdate {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.sector.is_none()
            && self.employee_count.is_none()
            && self.annual_revenue.is_none()
    }
}

/// A sector peer with its emissions summed over a date range.
#[derive(Debug, Clone, PartialEq)]
pub struct PeerTotal {
    pub profile: OrganizationProfile,
    pub total_emissions: f64,
    /// Rows behind `total_emissions`; zero means no data in the range.
    pub observations: u64,
}

impl CarbonStore {
    pub async fn register_organization(
        &self,
        id: &str,
        name: &str,
        sector: Option<&str>,
        employee_count: Option<i64>,
        annual_revenue: Option<f64>,
    ) -> Result<OrganizationProfile, DatabaseError> {
        let now = Utc::now();
        self.db()
            .conn()
            .execute(
                "INSERT INTO organizations (id, name, sector, employee_count, annual_revenue, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                libsql::params![
                    id,
                    name,
                    sector,
                    employee_count,
                    annual_revenue,
                    now.to_rfc3339(),
                    now.to_rfc3339()
                ],
            )
            .await?;

        Ok(OrganizationProfile {
            id: id.to_string(),
            name: name.to_string(),
            sector: sector.map(String::from),
            employee_count,
            annual_revenue,
            created_at: now,
            updated_at: now,
        })
    }

    pub async fn get_organization(&self, id: &str) -> Result<OrganizationProfile, DatabaseError> {
        self.find_organization(id)
            .await?
            .ok_or(DatabaseError::NoResult)
    }

    pub async fn find_organization(
        &self,
        id: &str,
    ) -> Result<Option<OrganizationProfile>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {SELECT_COLS} FROM organizations o WHERE o.id = ?1"),
                [id],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_organization(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn update_organization(
        &self,
        id: &str,
        update: &OrganizationUpdate,
    ) -> Result<OrganizationProfile, DatabaseError> {
        if update.is_empty() {
            return self.get_organization(id).await;
        }

        let mut sets = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();

        if let Some(ref name) = update.name {
            params.push(name.as_str().into());
            sets.push(format!("name = ?{}", params.len()));
        }
        if let Some(ref sector) = update.sector {
            params.push(sector.as_str().into());
            sets.push(format!("sector = ?{}", params.len()));
        }
        if let Some(employees) = update.employee_count {
            params.push(employees.into());
            sets.push(format!("employee_count = ?{}", params.len()));
        }
        if let Some(revenue) = update.annual_revenue {
            params.push(revenue.into());
            sets.push(format!("annual_revenue = ?{}", params.len()));
        }

        params.push(Utc::now().to_rfc3339().into());
        sets.push(format!("updated_at = ?{}", params.len()));
        params.push(id.into());
        let sql = format!(
            "UPDATE organizations SET {} WHERE id = ?{}",
            sets.join(", "),
            params.len()
        );

        let changed = self
            .db()
            .conn()
            .execute(&sql, libsql::params_from_iter(params))
            .await?;
        if changed == 0 {
            return Err(DatabaseError::NoResult);
        }
        self.get_organization(id).await
    }

    /// Organizations whose sector matches case-insensitively, in registration order.
    pub async fn list_organizations_in_sector(
        &self,
        sector: &str,
    ) -> Result<Vec<OrganizationProfile>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM organizations o
                     WHERE lower(trim(o.sector)) = lower(trim(?1))
                     ORDER BY o.created_at, o.rowid"
                ),
                [sector],
            )
            .await?;
        let mut orgs = Vec::new();
        while let Some(row) = rows.next().await? {
            orgs.push(row_to_organization(&row)?);
        }
        Ok(orgs)
    }

    /// Sector peers in registration order, each with its emissions over
    /// `[from, to]`. Predicted rows count unless a real row covers the date.
    pub async fn sector_peer_totals(
        &self,
        sector: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<PeerTotal>, DatabaseError> {
        let sql = format!(
            "SELECT {SELECT_COLS},
                    COALESCE((SELECT SUM(a.emission_value) FROM activities a
                              WHERE a.org_id = o.id
                                AND a.activity_date BETWEEN ?2 AND ?3
                                AND {EFFECTIVE_ROW}), 0.0),
                    (SELECT COUNT(*) FROM activities a
                     WHERE a.org_id = o.id
                       AND a.activity_date BETWEEN ?2 AND ?3
                       AND {EFFECTIVE_ROW})
             FROM organizations o
             WHERE lower(trim(o.sector)) = lower(trim(?1))
             ORDER BY o.created_at, o.rowid"
        );
        let mut rows = self
            .db()
            .conn()
            .query(
                &sql,
                libsql::params![sector, from.to_string(), to.to_string()],
            )
            .await?;
        let mut peers = Vec::new();
        while let Some(row) = rows.next().await? {
            let count = row.get::<i64>(8)?;
            peers.push(PeerTotal {
                profile: row_to_organization(&row)?,
                total_emissions: row.get::<f64>(7)?,
                observations: u64::try_from(count)
                    .map_err(|_| DatabaseError::InvalidState(format!("negative count {count}")))?,
            });
        }
        Ok(peers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    async fn store() -> CarbonStore {
        CarbonStore::new_local(":memory:").await.unwrap()
    }

    #[tokio::test]
    async fn register_and_get_roundtrip() {
        let store = store().await;
        let created = store
            .register_organization("org-a1", "Acme", Some("IT"), Some(120), Some(5.0e7))
            .await
            .unwrap();
        let fetched = store.get_organization("org-a1").await.unwrap();
        assert_eq!(fetched.name, created.name);
        assert_eq!(fetched.sector.as_deref(), Some("IT"));
        assert_eq!(fetched.employee_count, Some(120));
    }

    #[tokio::test]
    async fn missing_organization_is_no_result() {
        let store = store().await;
        assert!(store.find_organization("nope").await.unwrap().is_none());
        assert!(matches!(
            store.get_organization("nope").await,
            Err(DatabaseError::NoResult)
        ));
    }

    #[tokio::test]
    async fn duplicate_id_is_rejected() {
        let store = store().await;
        store
            .register_organization("org-a1", "Acme", None, None, None)
            .await
            .unwrap();
        assert!(
            store
                .register_organization("org-a1", "Other", None, None, None)
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn update_changes_only_given_fields() {
        let store = store().await;
        store
            .register_organization("org-a1", "Acme", Some("IT"), Some(100), None)
            .await
            .unwrap();
        let updated = store
            .update_organization(
                "org-a1",
                &OrganizationUpdate {
                    employee_count: Some(150),
                    ..OrganizationUpdate::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.employee_count, Some(150));
        assert_eq!(updated.sector.as_deref(), Some("IT"));
        assert_eq!(updated.name, "Acme");
    }

    #[tokio::test]
    async fn update_unknown_org_fails() {
        let store = store().await;
        let update = OrganizationUpdate {
            name: Some("Ghost".into()),
            ..OrganizationUpdate::default()
        };
        assert!(matches!(
            store.update_organization("ghost", &update).await,
            Err(DatabaseError::NoResult)
        ));
    }

    #[tokio::test]
    async fn sector_lookup_is_case_insensitive_and_ordered() {
        let store = store().await;
        store
            .register_organization("org-1", "First", Some("IT"), Some(10), None)
            .await
            .unwrap();
        store
            .register_organization("org-2", "Second", Some(" it "), Some(20), None)
            .await
            .unwrap();
        store
            .register_organization("org-3", "Mill", Some("Manufacturing"), Some(30), None)
            .await
            .unwrap();

        let peers = store.list_organizations_in_sector("It").await.unwrap();
        let ids: Vec<_> = peers.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["org-1", "org-2"]);
    }

    #[tokio::test]
    async fn peer_totals_default_to_zero() {
        let store = store().await;
        store
            .register_organization("org-1", "First", Some("Energy"), Some(10), None)
            .await
            .unwrap();
        let day = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let peers = store.sector_peer_totals("energy", day, day).await.unwrap();
        assert_eq!(peers.len(), 1);
        assert!(peers[0].total_emissions.abs() < f64::EPSILON);
        assert_eq!(peers[0].observations, 0);
    }
}
