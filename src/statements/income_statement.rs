use super::balance_sheet::balance_sheet_years;
use super::common::{by_id, credit, sum_tag, tb, Line, StatementSheet};
use crate::error::Result;
use crate::formula::functions::NET_LOSS_ROW_ID;
use crate::schema::{AccountType, AuditData};
use crate::table::Table;
use log::debug;

pub const INCOME_STATEMENT: &str = "Income Statement";

pub const OPERATING_EXPENSES: &str = "operating-expenses";
pub const OTHER_EXPENSE: &str = "other-expense";

/// Builds the statement of operations. Expenses are shown positive and
/// revenue is negated, so the bottom line is a net loss when positive and
/// always equals the trial balance's income-statement total.
pub fn build_income_statement(audit: &AuditData) -> Result<Table> {
    use AccountType::*;

    let years = balance_sheet_years(audit);
    debug!("Building income statement for {:?}", years);
    let mut sheet = StatementSheet::new(
        audit,
        INCOME_STATEMENT,
        "Statements of Operations",
        "Years ended ",
        &years,
    )?;

    sheet.line(Line::new("Revenue").id("REVENUE").indent(0).pad_top(), |y, _| {
        credit(&[IncomeStatementRevenue], y)
    })?;
    sheet.line(
        Line::new("Cost of revenue")
            .id("COST-OF-REVENUE")
            .indent(0)
            .hide_if_zero(),
        |y, _| tb(IncomeStatementCostOfRevenue, y),
    )?;
    sheet.line(
        Line::new("Gross profit").id("GROSS-PROFIT").indent(0).total(),
        |_, col| format!("{}-{}", by_id("REVENUE", col), by_id("COST-OF-REVENUE", col)),
    )?;

    sheet.section("Operating expenses:", 0)?;
    for (label, account) in [
        ("Research and development", IncomeStatementResearchAndDevelopment),
        ("Sales and marketing", IncomeStatementSalesAndMarketing),
        ("General and administrative", IncomeStatementGeneralAndAdministrative),
    ] {
        sheet.line(
            Line::new(label).tag(OPERATING_EXPENSES).hide_if_zero(),
            |y, _| tb(account, y),
        )?;
    }
    sheet.line(
        Line::new("Total operating expenses")
            .id("TOTAL-OPERATING-EXPENSES")
            .indent(2)
            .total(),
        |_, col| sum_tag(OPERATING_EXPENSES, col),
    )?;
    sheet.line(
        Line::new("Loss from operations")
            .id("LOSS-FROM-OPERATIONS")
            .indent(0)
            .pad_top(),
        |_, col| {
            format!(
                "{}-{}",
                by_id("TOTAL-OPERATING-EXPENSES", col),
                by_id("GROSS-PROFIT", col)
            )
        },
    )?;

    sheet.section("Other expense (income), net:", 0)?;
    for (label, account) in [
        ("Interest expense", IncomeStatementInterestExpense),
        ("Interest income", IncomeStatementInterestIncome),
        ("Other income", IncomeStatementOtherIncome),
        ("Other expense", IncomeStatementOtherExpense),
    ] {
        sheet.line(
            Line::new(label).tag(OTHER_EXPENSE).hide_if_zero(),
            |y, _| tb(account, y),
        )?;
    }
    sheet.line(
        Line::new("Total other expense (income), net")
            .id("TOTAL-OTHER-EXPENSE")
            .indent(2)
            .total(),
        |_, col| sum_tag(OTHER_EXPENSE, col),
    )?;

    sheet.line(
        Line::new("Loss before income taxes")
            .id("LOSS-BEFORE-INCOME-TAXES")
            .indent(0)
            .pad_top(),
        |_, col| {
            format!(
                "{}+{}",
                by_id("LOSS-FROM-OPERATIONS", col),
                by_id("TOTAL-OTHER-EXPENSE", col)
            )
        },
    )?;
    sheet.line(
        Line::new("Provision for income taxes")
            .id("INCOME-TAXES")
            .indent(0)
            .hide_if_zero(),
        |y, _| tb(IncomeStatementIncomeTaxes, y),
    )?;
    sheet.line(
        Line::new("Net loss").id(NET_LOSS_ROW_ID).grand_total(),
        |_, col| {
            format!(
                "{}+{}",
                by_id("LOSS-BEFORE-INCOME-TAXES", col),
                by_id("INCOME-TAXES", col)
            )
        },
    )?;

    Ok(sheet.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account_map::AccountMap;
    use crate::formula::{Evaluator, FormulaContext};
    use crate::schema::{BusinessInfo, CashFlowData, YearMapping, YearType};
    use std::collections::BTreeMap;

    fn audit() -> AuditData {
        let mut trial_balances = BTreeMap::new();
        trial_balances.insert(
            "2023".to_string(),
            AccountMap::from_entries([
                ("INCOME_STATEMENT_REVENUE", -1_000_000),
                ("INCOME_STATEMENT_COST_OF_REVENUE", 400_000),
                ("INCOME_STATEMENT_RESEARCH_AND_DEVELOPMENT", 700_000),
                ("INCOME_STATEMENT_GENERAL_AND_ADMINISTRATIVE", 300_000),
                ("INCOME_STATEMENT_INTEREST_INCOME", -20_000),
                ("INCOME_STATEMENT_INTEREST_EXPENSE", 50_000),
                ("INCOME_STATEMENT_INCOME_TAXES", 5_000),
                ("ASSET_CASH_AND_CASH_EQUIVALENTS", -435_000),
            ])
            .unwrap(),
        );
        trial_balances.insert(
            "2022".to_string(),
            AccountMap::from_entries([("INCOME_STATEMENT_GENERAL_AND_ADMINISTRATIVE", 10_000)])
                .unwrap(),
        );
        AuditData {
            business: BusinessInfo {
                legal_name: "Loss Making Inc.".to_string(),
                fiscal_year_end: "December 31".to_string(),
            },
            years: YearMapping::new("2023").with_prior("2022"),
            trial_balances,
            cash_flow: CashFlowData::default(),
        }
    }

    #[test]
    fn test_subtotals_cascade_to_net_loss() {
        let audit = audit();
        let table = build_income_statement(&audit).unwrap();
        let evaluator = Evaluator::new(&table, FormulaContext::from_audit(&audit));
        let value = |id: &str| evaluator.number_by_id(id, 1).unwrap();

        assert_eq!(value("REVENUE"), 1_000_000.0);
        assert_eq!(value("GROSS-PROFIT"), 600_000.0);
        assert_eq!(value("TOTAL-OPERATING-EXPENSES"), 1_000_000.0);
        assert_eq!(value("LOSS-FROM-OPERATIONS"), 400_000.0);
        assert_eq!(value("TOTAL-OTHER-EXPENSE"), 30_000.0);
        assert_eq!(value("LOSS-BEFORE-INCOME-TAXES"), 430_000.0);
        assert_eq!(value(NET_LOSS_ROW_ID), 435_000.0);

        assert_eq!(
            evaluator.evaluate_formula("=TB_NETLOSS('CY')").unwrap().as_number().unwrap(),
            value(NET_LOSS_ROW_ID)
        );
        assert_eq!(evaluator.number_by_id(NET_LOSS_ROW_ID, 2).unwrap(), 10_000.0);
    }

    #[test]
    fn test_net_loss_feeds_is_netloss() {
        let audit = audit();
        let table = build_income_statement(&audit).unwrap();
        let context = FormulaContext::from_audit(&audit).with_income_statement(&table);
        let other = Table::new("Scratch");
        let evaluator = Evaluator::new(&other, context);

        assert_eq!(
            evaluator.evaluate_formula("=IS_NETLOSS('PY')").unwrap().as_number().unwrap(),
            10_000.0
        );
        assert_eq!(table.year_column(YearType::Py), Some(2));
    }
}
