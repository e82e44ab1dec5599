use crate::error::{Result, StatementError};
use crate::schema::{AccountType, AuditData};
use log::debug;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Auditor adjustments layered on top of the client's trial balances.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct AuditAdjustments {
    #[schemars(description = "Ordered list of entries. Each is applied to the result of the previous one.")]
    #[serde(default)]
    pub entries: Vec<AdjustingEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum AdjustingEntry {
    /// A balanced journal entry: debit one account and credit another.
    Adjust {
        #[schemars(description = "Year label of the trial balance to adjust, e.g. \"2023\".")]
        year: String,
        debit_account: AccountType,
        credit_account: AccountType,
        #[schemars(description = "Positive amount in cents.")]
        amount: i64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        memo: Option<String>,
    },

    /// Moves a balance from one classification to another.
    Reclassify {
        year: String,
        from: AccountType,
        to: AccountType,
        #[schemars(
            description = "Signed amount in cents to move. When omitted the entire balance of `from` moves."
        )]
        #[serde(default)]
        amount: Option<i64>,
    },

    /// Overrides one balance outright. This entry alone can unbalance a trial balance.
    SetBalance {
        year: String,
        account: AccountType,
        balance: i64,
    },
}

impl AdjustingEntry {
    pub fn year(&self) -> &str {
        match self {
            AdjustingEntry::Adjust { year, .. }
            | AdjustingEntry::Reclassify { year, .. }
            | AdjustingEntry::SetBalance { year, .. } => year,
        }
    }
}

impl AuditAdjustments {
    pub fn new(entries: Vec<AdjustingEntry>) -> Self {
        Self { entries }
    }

    /// Applies every entry to a copy of `audit`. The input is left untouched so
    /// the unadjusted figures remain available.
    pub fn apply(&self, audit: &AuditData) -> Result<AuditData> {
        let mut adjusted = audit.clone();
        for (index, entry) in self.entries.iter().enumerate() {
            apply_entry(&mut adjusted, entry).map_err(|e| {
                StatementError::InvalidAuditData(format!("Adjusting entry #{}: {}", index + 1, e))
            })?;
        }
        debug!("Applied {} adjusting entries", self.entries.len());
        Ok(adjusted)
    }
}

fn apply_entry(audit: &mut AuditData, entry: &AdjustingEntry) -> Result<()> {
    let year = entry.year();
    let balances = audit.trial_balances.get_mut(year).ok_or_else(|| {
        StatementError::InvalidAuditData(format!("no trial balance for year {}", year))
    })?;

    match entry {
        AdjustingEntry::Adjust {
            debit_account,
            credit_account,
            amount,
            ..
        } => {
            if *amount <= 0 {
                return Err(StatementError::InvalidAuditData(format!(
                    "amount must be positive, got {}",
                    amount
                )));
            }
            balances.add_to_balance(*debit_account, *amount);
            balances.add_to_balance(*credit_account, -*amount);
        }
        AdjustingEntry::Reclassify { from, to, amount, .. } => {
            let moved = amount.unwrap_or_else(|| balances.balance(*from));
            balances.add_to_balance(*from, -moved);
            balances.add_to_balance(*to, moved);
        }
        AdjustingEntry::SetBalance {
            account, balance, ..
        } => {
            balances.set_balance(*account, *balance);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account_map::AccountMap;
    use crate::schema::{BusinessInfo, CashFlowData, YearMapping};
    use std::collections::BTreeMap;

    fn audit() -> AuditData {
        let mut trial_balances = BTreeMap::new();
        trial_balances.insert(
            "2023".to_string(),
            AccountMap::from_entries([
                ("ASSET_CASH_AND_CASH_EQUIVALENTS", 100_000),
                ("ASSET_OTHER", 20_000),
                ("EQUITY_COMMON_STOCK", -120_000),
            ])
            .unwrap(),
        );
        AuditData {
            business: BusinessInfo {
                legal_name: "Adjusted Co".to_string(),
                fiscal_year_end: "December 31".to_string(),
            },
            years: YearMapping::new("2023"),
            trial_balances,
            cash_flow: CashFlowData::default(),
        }
    }

    #[test]
    fn test_entries_apply_in_order_without_touching_input() {
        let original = audit();
        let adjustments = AuditAdjustments::new(vec![
            AdjustingEntry::Adjust {
                year: "2023".to_string(),
                debit_account: AccountType::IncomeStatementGeneralAndAdministrative,
                credit_account: AccountType::LiabilityAccruedLiabilities,
                amount: 5_000,
                memo: Some("Unrecorded audit fee".to_string()),
            },
            AdjustingEntry::Reclassify {
                year: "2023".to_string(),
                from: AccountType::AssetOther,
                to: AccountType::AssetPrepaidExpenses,
                amount: None,
            },
        ]);

        let adjusted = adjustments.apply(&original).unwrap();
        let cy = &adjusted.trial_balances["2023"];
        assert_eq!(cy.balance(AccountType::IncomeStatementGeneralAndAdministrative), 5_000);
        assert_eq!(cy.balance(AccountType::LiabilityAccruedLiabilities), -5_000);
        assert_eq!(cy.balance(AccountType::AssetOther), 0);
        assert_eq!(cy.balance(AccountType::AssetPrepaidExpenses), 20_000);
        assert_eq!(cy.total(), 0);

        assert_eq!(
            original.trial_balances["2023"].balance(AccountType::AssetOther),
            20_000
        );
    }

    #[test]
    fn test_unknown_year_and_bad_amounts_fail() {
        let entries = [
            AdjustingEntry::SetBalance {
                year: "1999".to_string(),
                account: AccountType::AssetOther,
                balance: 1,
            },
            AdjustingEntry::Adjust {
                year: "2023".to_string(),
                debit_account: AccountType::AssetOther,
                credit_account: AccountType::EquityCommonStock,
                amount: 0,
                memo: None,
            },
        ];
        for entry in entries {
            let result = AuditAdjustments::new(vec![entry]).apply(&audit());
            assert!(matches!(result, Err(StatementError::InvalidAuditData(_))));
        }
    }

    #[test]
    fn test_entries_deserialize_by_action_tag() {
        let json = r#"{ "entries": [
            { "action": "set_balance", "year": "2023", "account": "ASSET_INVENTORY", "balance": 700 },
            { "action": "reclassify", "year": "2023", "from": "ASSET_OTHER", "to": "ASSET_INVENTORY", "amount": 300 }
        ] }"#;
        let adjustments: AuditAdjustments = serde_json::from_str(json).unwrap();
        let adjusted = adjustments.apply(&audit()).unwrap();
        let cy = &adjusted.trial_balances["2023"];
        assert_eq!(cy.balance(AccountType::AssetInventory), 1_000);
        assert_eq!(cy.balance(AccountType::AssetOther), 19_700);
    }
}
