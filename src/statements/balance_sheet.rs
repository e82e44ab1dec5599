use super::common::{credit, sum_tag, tb, tb_sum, Line, StatementSheet};
use crate::error::Result;
use crate::formula::functions::TB_NETLOSS;
use crate::schema::{AccountType, AuditData, YearType};
use crate::table::Table;
use log::debug;

pub const BALANCE_SHEET: &str = "Balance Sheet";

pub const CURRENT_ASSETS: &str = "current-assets";
pub const NON_CURRENT_ASSETS: &str = "non-current-assets";
pub const ASSET_SUBTOTALS: &str = "asset-subtotals";
pub const CURRENT_LIABILITIES: &str = "current-liabilities";
pub const NON_CURRENT_LIABILITIES: &str = "non-current-liabilities";
pub const LIABILITY_SUBTOTALS: &str = "liability-subtotals";
pub const EQUITY: &str = "equity";
pub const LIABILITIES_AND_EQUITY: &str = "liabilities-and-equity";

/// Years shown on the balance sheet: the current year, plus the prior year when mapped.
pub fn balance_sheet_years(audit: &AuditData) -> Vec<YearType> {
    [YearType::Cy, YearType::Py]
        .into_iter()
        .filter(|year| audit.years.resolve(*year).is_some())
        .collect()
}

/// Builds the balance sheet.
///
/// Assets are shown at their debit balances; liabilities and equity are
/// negated so that credit balances read as positive amounts. The accumulated
/// deficit line closes the year's income statement into opening retained
/// earnings, so a balanced trial balance yields equal totals on both sides.
pub fn build_balance_sheet(audit: &AuditData) -> Result<Table> {
    use AccountType::*;

    let years = balance_sheet_years(audit);
    debug!("Building balance sheet for {:?}", years);
    let mut sheet = StatementSheet::new(audit, BALANCE_SHEET, "Balance Sheets", "", &years)?;

    sheet.section("Assets", 0)?;
    sheet.section("Current assets:", 0)?;
    sheet.line(
        Line::new("Cash and cash equivalents").tag(CURRENT_ASSETS),
        |y, _| tb(AssetCashAndCashEquivalents, y),
    )?;
    for (label, account) in [
        ("Restricted cash", AssetRestrictedCash),
        ("Accounts receivable", AssetAccountsReceivable),
        ("Inventory", AssetInventory),
        ("Prepaid expenses", AssetPrepaidExpenses),
        ("Other current assets", AssetOther),
    ] {
        sheet.line(
            Line::new(label).tag(CURRENT_ASSETS).hide_if_zero(),
            |y, _| tb(account, y),
        )?;
    }
    sheet.line(
        Line::new("Total current assets")
            .id("TOTAL-CURRENT-ASSETS")
            .tag(ASSET_SUBTOTALS)
            .indent(2)
            .total(),
        |_, col| sum_tag(CURRENT_ASSETS, col),
    )?;

    sheet.line(
        Line::new("Property and equipment, net")
            .tag(NON_CURRENT_ASSETS)
            .hide_if_zero()
            .pad_top(),
        |y, _| tb_sum(&[AssetPropertyAndEquipment, AssetAccumulatedDepreciation], y),
    )?;
    for (label, account) in [
        ("Intangible assets, net", AssetIntangibleAssets),
        ("Operating lease right-of-use assets", AssetOperatingLeaseRightOfUse),
        ("Other non-current assets", AssetOtherNonCurrent),
    ] {
        sheet.line(
            Line::new(label).tag(NON_CURRENT_ASSETS).hide_if_zero(),
            |y, _| tb(account, y),
        )?;
    }
    sheet.line(
        Line::new("Total non-current assets")
            .id("TOTAL-NON-CURRENT-ASSETS")
            .tag(ASSET_SUBTOTALS)
            .hide_if_zero()
            .indent(2)
            .total(),
        |_, col| sum_tag(NON_CURRENT_ASSETS, col),
    )?;
    sheet.line(
        Line::new("Total assets").id("TOTAL-ASSETS").grand_total(),
        |_, col| sum_tag(ASSET_SUBTOTALS, col),
    )?;

    sheet.section("Liabilities and stockholders' equity (deficit)", 0)?;
    sheet.section("Current liabilities:", 0)?;
    for (label, account) in [
        ("Accounts payable", LiabilityAccountsPayable),
        ("Accrued liabilities", LiabilityAccruedLiabilities),
        ("Deferred revenue", LiabilityDeferredRevenue),
        ("Short-term debt", LiabilityShortTermDebt),
        ("Operating lease liabilities, current", LiabilityOperatingLeaseCurrent),
        ("Other current liabilities", LiabilityOther),
    ] {
        sheet.line(
            Line::new(label).tag(CURRENT_LIABILITIES).hide_if_zero(),
            |y, _| credit(&[account], y),
        )?;
    }
    sheet.line(
        Line::new("Total current liabilities")
            .id("TOTAL-CURRENT-LIABILITIES")
            .tag(LIABILITY_SUBTOTALS)
            .indent(2)
            .total(),
        |_, col| sum_tag(CURRENT_LIABILITIES, col),
    )?;

    for (index, (label, account)) in [
        ("Long-term debt", LiabilityLongTermDebt),
        ("Operating lease liabilities, non-current", LiabilityOperatingLeaseNonCurrent),
        ("Convertible notes", LiabilityConvertibleNotes),
        ("Other non-current liabilities", LiabilityOtherNonCurrent),
    ]
    .into_iter()
    .enumerate()
    {
        let mut line = Line::new(label).tag(NON_CURRENT_LIABILITIES).hide_if_zero();
        if index == 0 {
            line = line.pad_top();
        }
        sheet.line(line, |y, _| credit(&[account], y))?;
    }
    sheet.line(
        Line::new("Total non-current liabilities")
            .id("TOTAL-NON-CURRENT-LIABILITIES")
            .tag(LIABILITY_SUBTOTALS)
            .hide_if_zero()
            .indent(2)
            .total(),
        |_, col| sum_tag(NON_CURRENT_LIABILITIES, col),
    )?;
    sheet.line(
        Line::new("Total liabilities")
            .id("TOTAL-LIABILITIES")
            .tag(LIABILITIES_AND_EQUITY)
            .indent(2)
            .total(),
        |_, col| sum_tag(LIABILITY_SUBTOTALS, col),
    )?;

    sheet.section("Stockholders' equity (deficit):", 0)?;
    for (label, account) in [
        ("Preferred stock", EquityPreferredStock),
        ("Common stock", EquityCommonStock),
        ("Additional paid-in capital", EquityAdditionalPaidInCapital),
        ("Treasury stock", EquityTreasuryStock),
    ] {
        let mut line = Line::new(label).tag(EQUITY);
        if account != EquityCommonStock {
            line = line.hide_if_zero();
        }
        sheet.line(line, |y, _| credit(&[account], y))?;
    }
    sheet.line(Line::new("Accumulated deficit").id("ACCUMULATED-DEFICIT").tag(EQUITY), |y, _| {
        format!("-{}-{}('{}')", tb(EquityRetainedEarnings, y), TB_NETLOSS, y)
    })?;
    sheet.line(
        Line::new("Total stockholders' equity (deficit)")
            .id("TOTAL-EQUITY")
            .tag(LIABILITIES_AND_EQUITY)
            .indent(2)
            .total(),
        |_, col| sum_tag(EQUITY, col),
    )?;
    sheet.line(
        Line::new("Total liabilities and stockholders' equity (deficit)")
            .id("TOTAL-LIABILITIES-AND-EQUITY")
            .grand_total(),
        |_, col| sum_tag(LIABILITIES_AND_EQUITY, col),
    )?;

    Ok(sheet.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account_map::AccountMap;
    use crate::formula::{Evaluator, FormulaContext};
    use crate::schema::{BusinessInfo, CashFlowData, YearMapping};
    use std::collections::BTreeMap;

    fn audit(cy: &[(&str, i64)], py: Option<&[(&str, i64)]>) -> AuditData {
        let mut trial_balances = BTreeMap::new();
        trial_balances.insert(
            "2023".to_string(),
            AccountMap::from_entries(cy.iter().copied()).unwrap(),
        );
        let mut years = YearMapping::new("2023");
        if let Some(py) = py {
            trial_balances.insert(
                "2022".to_string(),
                AccountMap::from_entries(py.iter().copied()).unwrap(),
            );
            years = years.with_prior("2022");
        }
        AuditData {
            business: BusinessInfo {
                legal_name: "Balance Co".to_string(),
                fiscal_year_end: "December 31".to_string(),
            },
            years,
            trial_balances,
            cash_flow: CashFlowData::default(),
        }
    }

    #[test]
    fn test_current_assets_total() {
        let audit = audit(
            &[
                ("ASSET_CASH_AND_CASH_EQUIVALENTS", 100_000),
                ("ASSET_OTHER", 50_000),
            ],
            Some(&[][..]),
        );
        let table = build_balance_sheet(&audit).unwrap();
        let evaluator = Evaluator::new(&table, FormulaContext::from_audit(&audit));

        assert_eq!(evaluator.number_by_id("TOTAL-CURRENT-ASSETS", 1).unwrap(), 150_000.0);
        assert_eq!(evaluator.number_by_id("TOTAL-CURRENT-ASSETS", 2).unwrap(), 0.0);
        assert_eq!(evaluator.number_by_id("TOTAL-ASSETS", 1).unwrap(), 150_000.0);
    }

    #[test]
    fn test_balanced_trial_balance_balances() {
        let audit = audit(
            &[
                ("ASSET_CASH_AND_CASH_EQUIVALENTS", 500_000),
                ("ASSET_PROPERTY_AND_EQUIPMENT", 120_000),
                ("ASSET_ACCUMULATED_DEPRECIATION", -20_000),
                ("LIABILITY_ACCOUNTS_PAYABLE", -60_000),
                ("LIABILITY_CONVERTIBLE_NOTES", -300_000),
                ("EQUITY_COMMON_STOCK", -1_000),
                ("EQUITY_ADDITIONAL_PAID_IN_CAPITAL", -499_000),
                ("EQUITY_RETAINED_EARNINGS", 100_000),
                ("INCOME_STATEMENT_REVENUE", -40_000),
                ("INCOME_STATEMENT_GENERAL_AND_ADMINISTRATIVE", 200_000),
            ],
            None,
        );
        let table = build_balance_sheet(&audit).unwrap();
        assert_eq!(table.year_columns(), vec![(YearType::Cy, 1)]);

        let evaluator = Evaluator::new(&table, FormulaContext::from_audit(&audit));
        let assets = evaluator.number_by_id("TOTAL-ASSETS", 1).unwrap();
        assert_eq!(assets, 600_000.0);
        assert_eq!(evaluator.number_by_id("TOTAL-LIABILITIES", 1).unwrap(), 360_000.0);
        assert_eq!(evaluator.number_by_id("TOTAL-EQUITY", 1).unwrap(), 240_000.0);
        assert_eq!(
            evaluator.number_by_id("TOTAL-LIABILITIES-AND-EQUITY", 1).unwrap(),
            assets
        );
    }

    #[test]
    fn test_subtotals_are_formulas() {
        let audit = audit(&[], None);
        let table = build_balance_sheet(&audit).unwrap();
        let total = table.get_cell_by_id_and_col("TOTAL-ASSETS", 1).unwrap();
        assert_eq!(
            total.value.formula(),
            Some("=SUMTAGCOL('asset-subtotals',1)")
        );
        assert_eq!(table.get_rows_by_tag(ASSET_SUBTOTALS).len(), 2);
    }
}
