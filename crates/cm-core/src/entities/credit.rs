use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{CreditSource, TransactionType};

/// Float residue below which a credit amount counts as zero.
///
/// Balances are folded from `f64` sums, so `0.3 - 0.1 - 0.2` is not exactly
/// zero. Coverage checks allow this much slack and balances snap to zero
/// within it.
pub const CREDIT_TOLERANCE: f64 = 1e-9;

/// Whether `balance` covers a withdrawal of `credits`.
#[must_use]
pub fn covers(balance: f64, credits: f64) -> bool {
    balance + CREDIT_TOLERANCE >= credits
}

/// An append-only carbon credit ledger entry.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct CreditTransaction {
    pub id: String,
    pub org_id: String,
    pub transaction_type: TransactionType,
    /// Always positive; the sign comes from `transaction_type`.
    pub credits: f64,
    pub source: Option<CreditSource>,
    pub description: Option<String>,
    pub price_per_credit: Option<f64>,
    pub total_cost: Option<f64>,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
}

/// Per-type sums over a transaction history.
///
/// The balance is never stored; it is always recomputed with [`CreditTotals::fold`].
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct CreditTotals {
    pub earned: f64,
    pub purchased: f64,
    pub used: f64,
    pub transferred: f64,
    pub expired: f64,
    /// Sum of `total_cost` over purchases.
    pub total_cost: f64,
    /// Sum of `total_cost` over transfers.
    pub total_revenue: f64,
}

impl CreditTotals {
    #[must_use]
    pub fn fold<'a>(transactions: impl IntoIterator<Item = &'a CreditTransaction>) -> Self {
        transactions
            .into_iter()
            .fold(Self::default(), |mut acc, tx| {
                let amount = tx.credits;
                let cost = tx.total_cost.unwrap_or(0.0);
                match tx.transaction_type {
                    TransactionType::Earned => acc.earned += amount,
                    TransactionType::Purchased => {
                        acc.purchased += amount;
                        acc.total_cost += cost;
                    }
                    TransactionType::Used => acc.used += amount,
                    TransactionType::Transferred => {
                        acc.transferred += amount;
                        acc.total_revenue += cost;
                    }
                    TransactionType::Expired => acc.expired += amount,
                }
                acc
            })
    }

    /// `earned + purchased - used`, with float residue snapped to zero.
    #[must_use]
    pub fn balance(&self) -> f64 {
        let balance = self.earned + self.purchased - self.used;
        if balance.abs() < CREDIT_TOLERANCE {
            0.0
        } else {
            balance
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(kind: TransactionType, credits: f64, cost: Option<f64>) -> CreditTransaction {
        CreditTransaction {
            id: "crd-00000000".into(),
            org_id: "org-1".into(),
            transaction_type: kind,
            credits,
            source: None,
            description: None,
            price_per_credit: None,
            total_cost: cost,
            verified: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn empty_history_has_zero_balance() {
        let totals = CreditTotals::fold(std::iter::empty());
        assert!(totals.balance().abs() < f64::EPSILON);
    }

    #[test]
    fn transfers_and_expiry_do_not_move_balance() {
        let history = vec![
            tx(TransactionType::Earned, 10.0, None),
            tx(TransactionType::Purchased, 5.0, Some(7500.0)),
            tx(TransactionType::Used, 3.0, None),
            tx(TransactionType::Transferred, 2.0, Some(4000.0)),
            tx(TransactionType::Expired, 1.0, None),
        ];
        let totals = CreditTotals::fold(&history);
        assert!((totals.balance() - 12.0).abs() < 1e-9);
        assert!((totals.total_cost - 7500.0).abs() < 1e-9);
        assert!((totals.total_revenue - 4000.0).abs() < 1e-9);
    }

    #[test]
    fn fractional_history_settles_at_zero() {
        let history = vec![
            tx(TransactionType::Earned, 0.3, None),
            tx(TransactionType::Used, 0.1, None),
        ];
        let totals = CreditTotals::fold(&history);
        assert!(covers(totals.balance(), 0.2));
        assert!(!covers(totals.balance(), 0.2001));

        let mut history = history;
        history.push(tx(TransactionType::Used, 0.2, None));
        let balance = CreditTotals::fold(&history).balance();
        assert!(balance >= 0.0, "balance {balance}");
        assert!(balance.abs() < f64::EPSILON);
    }
}
