use crate::account_map::AccountMap;
use crate::error::{Result, StatementError};
use crate::schema::{AuditData, CashFlowData, YearMapping, YearType};
use crate::table::Table;
use std::collections::BTreeMap;

/// Everything a formula can see beyond its own table.
#[derive(Debug, Clone, Copy)]
pub struct FormulaContext<'a> {
    pub years: &'a YearMapping,
    pub trial_balances: &'a BTreeMap<String, AccountMap>,
    pub cash_flow: &'a CashFlowData,
    /// Source of `IS_NETLOSS`. Absent while the income statement itself is
    /// being evaluated.
    pub income_statement: Option<&'a Table>,
}

impl<'a> FormulaContext<'a> {
    pub fn from_audit(audit: &'a AuditData) -> Self {
        Self {
            years: &audit.years,
            trial_balances: &audit.trial_balances,
            cash_flow: &audit.cash_flow,
            income_statement: None,
        }
    }

    pub fn with_income_statement(mut self, table: &'a Table) -> Self {
        self.income_statement = Some(table);
        self
    }

    pub fn without_income_statement(mut self) -> Self {
        self.income_statement = None;
        self
    }

    pub fn year_label(&self, year: YearType, function: &str) -> Result<&'a str> {
        self.years
            .resolve(year)
            .ok_or_else(|| StatementError::function(function, format!("Year {} is not mapped", year)))
    }

    /// Trial balance for `year`, failing on behalf of `function` when the year
    /// is unmapped or has no balances.
    pub fn trial_balance(&self, year: YearType, function: &str) -> Result<&'a AccountMap> {
        let label = self.year_label(year, function)?;
        self.trial_balances.get(label).ok_or_else(|| {
            StatementError::function(function, format!("No trial balance for year {}", label))
        })
    }
}
