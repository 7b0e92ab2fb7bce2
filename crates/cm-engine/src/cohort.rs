//! Sector resolution and cohort assembly.
//!
//! A cohort is the organization itself, its registered sector peers with data
//! in the window, and the sector's synthetic demo organizations when real
//! peers are too few or the sector had to be defaulted. Assembly never fails
//! on sector input; only store errors propagate.

use chrono::NaiveDate;
use cm_core::entities::{CohortEntry, OrganizationProfile};
use cm_core::ids::mask_org_id;
use cm_predictor::Predictor;

use crate::engine::{CarbonEngine, trailing_window};
use crate::error::EngineError;
use crate::sectors;

/// Label of the organization's own cohort entry.
pub const SELF_LABEL: &str = "You";

/// The sector an analytical call runs against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSector {
    /// Canonical name for known sectors, trimmed input otherwise.
    pub name: String,
    /// `true` when the requested sector could not be used: the call passed a
    /// blank sector, or neither the call nor the profile named one.
    pub defaulted: bool,
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

/// Pick the sector from the explicit argument, then the profile, then
/// `default_sector`.
///
/// A blank explicit argument still borrows the profile sector name but counts
/// as a failed resolution.
#[must_use]
pub fn resolve_sector(
    explicit: Option<&str>,
    profile: Option<&OrganizationProfile>,
    default_sector: &str,
) -> ResolvedSector {
    let profile_sector = non_blank(profile.and_then(|p| p.sector.as_deref()));
    let (raw, defaulted) = match (explicit, non_blank(explicit)) {
        (_, Some(name)) => (name, false),
        (Some(_), None) => (profile_sector.unwrap_or_else(|| default_sector.trim()), true),
        (None, None) => match profile_sector {
            Some(name) => (name, false),
            None => (default_sector.trim(), true),
        },
    };
    let name = sectors::lookup(raw).map_or_else(|| raw.to_string(), |p| p.name.to_string());
    ResolvedSector { name, defaulted }
}

/// An assembled cohort, self first.
#[derive(Debug, Clone)]
pub struct Cohort {
    pub sector: ResolvedSector,
    pub entries: Vec<CohortEntry>,
    pub real_peers: usize,
    pub used_demo_fallback: bool,
}

impl Cohort {
    #[must_use]
    pub fn own(&self) -> Option<&CohortEntry> {
        self.entries.iter().find(|e| e.is_self)
    }
}

impl<P: Predictor> CarbonEngine<P> {
    /// Assemble the cohort for `org_id` over the window ending on `today`.
    ///
    /// An unregistered organization still gets a self entry, without an
    /// employee count.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Database`] on store failure.
    pub async fn assemble_cohort(
        &self,
        org_id: &str,
        sector: Option<&str>,
        today: NaiveDate,
    ) -> Result<Cohort, EngineError> {
        let cfg = &self.config().cohort;
        let profile = self.store().find_organization(org_id).await?;
        let resolved = resolve_sector(sector, profile.as_ref(), &cfg.default_sector);

        let from = trailing_window(today, cfg.window_days);
        let own_total = self
            .store()
            .total_emissions(org_id, from, today, true)
            .await?
            .observed();

        let mut entries = vec![CohortEntry {
            label: SELF_LABEL.to_string(),
            org_id: Some(org_id.to_string()),
            employee_count: profile.as_ref().and_then(OrganizationProfile::employees),
            total_emissions: own_total,
            is_self: true,
            is_synthetic: false,
        }];

        let peers: Vec<_> = self
            .store()
            .sector_peer_totals(&resolved.name, from, today)
            .await?
            .into_iter()
            .filter(|p| p.profile.id != org_id && p.observations > 0)
            .collect();
        let real_peers = peers.len();
        entries.extend(peers.into_iter().map(|p| CohortEntry {
            label: mask_org_id(&p.profile.id),
            employee_count: p.profile.employees(),
            org_id: Some(p.profile.id),
            total_emissions: Some(p.total_emissions),
            is_self: false,
            is_synthetic: false,
        }));

        let min_peers = usize::try_from(cfg.min_real_peers).unwrap_or(usize::MAX);
        let used_demo_fallback = resolved.defaulted || real_peers < min_peers;
        if used_demo_fallback {
            let reference = sectors::profile_or_default(&resolved.name);
            entries.extend(reference.demo.iter().map(|d| CohortEntry {
                label: d.name.to_string(),
                org_id: None,
                employee_count: Some(d.employees),
                total_emissions: Some(d.total_emissions),
                is_self: false,
                is_synthetic: true,
            }));
        }

        tracing::debug!(
            org_id,
            sector = %resolved.name,
            defaulted = resolved.defaulted,
            real_peers,
            used_demo_fallback,
            size = entries.len(),
            "assembled cohort"
        );

        Ok(Cohort {
            sector: resolved,
            entries,
            real_peers,
            used_demo_fallback,
        })
    }
}
