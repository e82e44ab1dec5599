use crate::account_map::AccountMap;
use crate::error::{Result, StatementError};
use crate::schema::{AccountType, AuditData, BusinessInfo, CashFlowData, YearMapping};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One line of an exported trial balance, already classified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialBalanceRow {
    pub account_name: String,
    pub account_type: AccountType,
    /// Fiscal-year label, e.g. `"2023"`.
    pub year: String,
    /// Debit amount in cents, zero or positive.
    #[serde(default)]
    pub debit: i64,
    /// Credit amount in cents, zero or positive.
    #[serde(default)]
    pub credit: i64,
}

impl TrialBalanceRow {
    /// Signed balance: debits positive, credits negative.
    pub fn balance(&self) -> i64 {
        self.debit - self.credit
    }
}

/// Aggregates classified rows into one [`AccountMap`] per year label.
/// Rows sharing an account type within a year are summed.
pub fn build_trial_balances(rows: &[TrialBalanceRow]) -> Result<BTreeMap<String, AccountMap>> {
    let mut trial_balances: BTreeMap<String, AccountMap> = BTreeMap::new();

    for row in rows {
        if row.debit < 0 || row.credit < 0 {
            return Err(StatementError::InvalidAuditData(format!(
                "Account '{}' ({}) has a negative debit or credit amount",
                row.account_name, row.year
            )));
        }
        if row.year.trim().is_empty() {
            return Err(StatementError::InvalidAuditData(format!(
                "Account '{}' has no year",
                row.account_name
            )));
        }
        if row.account_type == AccountType::Unknown {
            warn!(
                "Account '{}' ({}) is unclassified and will not appear on any statement",
                row.account_name, row.year
            );
        }

        trial_balances
            .entry(row.year.trim().to_string())
            .or_default()
            .add_to_balance(row.account_type, row.balance());
    }

    for (year, balances) in &trial_balances {
        debug!(
            "Trial balance {}: {} account types, out of balance by {}",
            year,
            balances.len(),
            balances.total()
        );
    }

    Ok(trial_balances)
}

impl AuditData {
    pub fn from_trial_balance_rows(
        business: BusinessInfo,
        years: YearMapping,
        rows: &[TrialBalanceRow],
    ) -> Result<Self> {
        Ok(AuditData {
            business,
            years,
            trial_balances: build_trial_balances(rows)?,
            cash_flow: CashFlowData::default(),
        })
    }
}
