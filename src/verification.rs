use crate::error::{Result, StatementError};
use crate::formula::functions::{NET_LOSS_ROW_ID, TB_NETLOSS};
use crate::formula::{Evaluator, FormulaContext};
use crate::statements::cash_flows::closing_cash_formula;
use crate::statements::{BALANCE_SHEET, CASH_FLOWS, INCOME_STATEMENT};
use crate::table::Table;
use log::debug;

/// Tie-out checks over evaluated statements. Amounts are compared in cents
/// and differences up to `tolerance` are accepted.
pub struct StatementVerifier<'a> {
    context: FormulaContext<'a>,
    tolerance: f64,
}

impl<'a> StatementVerifier<'a> {
    pub fn new(context: FormulaContext<'a>, tolerance: f64) -> Self {
        Self { context, tolerance }
    }

    /// Total assets equal total liabilities and equity in every year column.
    pub fn verify_balance_sheet(&self, balance_sheet: &Table) -> Result<()> {
        let evaluator = Evaluator::new(balance_sheet, self.context);
        for (year, col) in balance_sheet.year_columns() {
            let assets = evaluator.number_by_id("TOTAL-ASSETS", col)?;
            let claims = evaluator.number_by_id("TOTAL-LIABILITIES-AND-EQUITY", col)?;
            self.compare(BALANCE_SHEET, year.as_str(), assets, claims)?;
        }
        Ok(())
    }

    /// The net loss row equals the trial balance's income-statement total.
    pub fn verify_net_loss(&self, income_statement: &Table) -> Result<()> {
        let evaluator = Evaluator::new(income_statement, self.context.without_income_statement());
        for (year, col) in income_statement.year_columns() {
            let presented = evaluator.number_by_id(NET_LOSS_ROW_ID, col)?;
            let expected = evaluator
                .evaluate_formula(&format!("{}('{}')", TB_NETLOSS, year))?
                .as_number()?;
            self.compare(INCOME_STATEMENT, year.as_str(), presented, expected)?;
        }
        Ok(())
    }

    /// Closing cash on the cash-flow statement equals cash and restricted cash
    /// on the trial balance. Needs the income statement in the context.
    pub fn verify_cash_flows(&self, cash_flows: &Table) -> Result<()> {
        let evaluator = Evaluator::new(cash_flows, self.context);
        for (year, col) in cash_flows.year_columns() {
            let presented = evaluator.number_by_id("CASH-END", col)?;
            let expected = evaluator
                .evaluate_formula(&closing_cash_formula(year))?
                .as_number()?;
            self.compare(CASH_FLOWS, year.as_str(), presented, expected)?;
        }
        Ok(())
    }

    fn compare(&self, statement: &str, year: &str, left: f64, right: f64) -> Result<()> {
        let difference = (left - right).abs();
        if difference > self.tolerance {
            return Err(StatementError::StatementImbalance {
                statement: statement.to_string(),
                year: year.to_string(),
                left,
                right,
            });
        }
        debug!("{} ties out for {} ({} vs {})", statement, year, left, right);
        Ok(())
    }
}

pub fn verify_balance_sheet(
    balance_sheet: &Table,
    context: FormulaContext<'_>,
    tolerance: f64,
) -> Result<()> {
    StatementVerifier::new(context, tolerance).verify_balance_sheet(balance_sheet)
}

pub fn verify_net_loss(
    income_statement: &Table,
    context: FormulaContext<'_>,
    tolerance: f64,
) -> Result<()> {
    StatementVerifier::new(context, tolerance).verify_net_loss(income_statement)
}

pub fn verify_cash_flows(
    cash_flows: &Table,
    context: FormulaContext<'_>,
    tolerance: f64,
) -> Result<()> {
    StatementVerifier::new(context, tolerance).verify_cash_flows(cash_flows)
}
