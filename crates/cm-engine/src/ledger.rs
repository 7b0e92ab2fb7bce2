//! Carbon credit ledger: earn, purchase, use, balance and summary.
//!
//! The balance is always folded from the append-only transaction log.
//! Mutations for one organization are serialized by a per-organization lock,
//! and `use` is additionally guarded by the store's conditional insert so a
//! second process cannot overdraw either.

use cm_core::entities::{CreditTransaction, covers};
use cm_core::enums::{CreditSource, TransactionType};
use cm_core::responses::{CreditBalance, CreditSummary};
use cm_db::repos::credit::NewCredit;
use cm_predictor::Predictor;

use crate::engine::CarbonEngine;
use crate::error::EngineError;

/// Transactions shown by [`CarbonEngine::credit_summary`].
pub const RECENT_TRANSACTIONS: u32 = 20;

/// Input for [`CarbonEngine::earn_credits`].
#[derive(Debug, Clone)]
pub struct EarnCredits {
    pub credits: f64,
    pub source: CreditSource,
    /// Whether the reduction behind the credits has been verified.
    pub verified: bool,
    pub description: Option<String>,
}

fn check_amount(credits: f64) -> Result<(), EngineError> {
    if !credits.is_finite() || credits <= 0.0 {
        return Err(EngineError::Validation(format!(
            "credits must be a positive number, got {credits}"
        )));
    }
    Ok(())
}

impl<P: Predictor> CarbonEngine<P> {
    /// Record credits earned from a verified reduction project.
    ///
    /// # Errors
    ///
    /// - [`EngineError::UnverifiedSource`] when the reduction is not verified.
    /// - [`EngineError::Validation`] for a non-positive amount or a market source.
    /// - [`EngineError::NotFound`] for an unregistered organization.
    pub async fn earn_credits(
        &self,
        org_id: &str,
        earn: &EarnCredits,
    ) -> Result<CreditTransaction, EngineError> {
        check_amount(earn.credits)?;
        if !earn.verified {
            return Err(EngineError::UnverifiedSource);
        }
        if !earn.source.is_reduction_project() {
            return Err(EngineError::Validation(format!(
                "credits from '{}' are purchased, not earned",
                earn.source
            )));
        }
        self.get_organization(org_id).await?;

        let _guard = self.credit_locks().acquire(org_id).await;
        let tx = self
            .store()
            .append_credit(&NewCredit {
                org_id,
                transaction_type: TransactionType::Earned,
                credits: earn.credits,
                source: Some(earn.source),
                description: earn.description.as_deref(),
                price_per_credit: None,
                verified: true,
            })
            .await?;
        tracing::info!(org_id, credits = tx.credits, source = %earn.source, "earned credits");
        Ok(tx)
    }

    /// Buy credits on the market at `price` (or the configured default).
    ///
    /// # Errors
    ///
    /// - [`EngineError::PriceOutOfRange`] outside the configured band.
    /// - [`EngineError::Validation`] for a non-positive amount.
    /// - [`EngineError::NotFound`] for an unregistered organization.
    pub async fn purchase_credits(
        &self,
        org_id: &str,
        credits: f64,
        price: Option<f64>,
    ) -> Result<CreditTransaction, EngineError> {
        check_amount(credits)?;
        let band = &self.config().credits;
        let price = price.unwrap_or(band.default_price);
        if !band.price_in_band(price) {
            return Err(EngineError::PriceOutOfRange {
                price,
                min: band.min_price,
                max: band.max_price,
            });
        }
        self.get_organization(org_id).await?;

        let _guard = self.credit_locks().acquire(org_id).await;
        let tx = self
            .store()
            .append_credit(&NewCredit {
                org_id,
                transaction_type: TransactionType::Purchased,
                credits,
                source: Some(CreditSource::CarbonMarket),
                description: None,
                price_per_credit: Some(price),
                verified: true,
            })
            .await?;
        tracing::info!(org_id, credits, price, "purchased credits");
        Ok(tx)
    }

    /// Retire credits against emissions.
    ///
    /// # Errors
    ///
    /// - [`EngineError::InsufficientBalance`] when the balance does not cover
    ///   `credits`. Nothing is written.
    /// - [`EngineError::Validation`] for a non-positive amount.
    /// - [`EngineError::NotFound`] for an unregistered organization.
    pub async fn use_credits(
        &self,
        org_id: &str,
        credits: f64,
        reason: Option<&str>,
    ) -> Result<CreditTransaction, EngineError> {
        check_amount(credits)?;
        self.get_organization(org_id).await?;

        let _guard = self.credit_locks().acquire(org_id).await;

        let available = self.store().credit_totals(org_id).await?.balance();
        if !covers(available, credits) {
            return Err(EngineError::InsufficientBalance {
                available,
                requested: credits,
            });
        }

        match self
            .store()
            .append_use_if_covered(org_id, credits, reason)
            .await?
        {
            Some(tx) => {
                tracing::info!(org_id, credits, "used credits");
                Ok(tx)
            }
            None => {
                let available = self.store().credit_totals(org_id).await?.balance();
                tracing::warn!(org_id, credits, available, "balance changed before use");
                Err(EngineError::InsufficientBalance {
                    available,
                    requested: credits,
                })
            }
        }
    }

    /// Folded balance. Zero for an organization without transactions.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Database`] on store failure.
    pub async fn credit_balance(&self, org_id: &str) -> Result<CreditBalance, EngineError> {
        let totals = self.store().credit_totals(org_id).await?;
        Ok(CreditBalance {
            org_id: org_id.to_string(),
            balance: totals.balance(),
        })
    }

    /// Per-type totals plus the most recent transactions.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Database`] on store failure.
    pub async fn credit_summary(&self, org_id: &str) -> Result<CreditSummary, EngineError> {
        let totals = self.store().credit_totals(org_id).await?;
        let recent = self
            .store()
            .list_credits(org_id, Some(RECENT_TRANSACTIONS))
            .await?;

        Ok(CreditSummary {
            org_id: org_id.to_string(),
            balance: totals.balance(),
            earned: totals.earned,
            purchased: totals.purchased,
            used: totals.used,
            total_cost: totals.total_cost,
            total_revenue: totals.total_revenue,
            recent,
        })
    }
}
