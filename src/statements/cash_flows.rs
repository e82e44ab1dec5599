use super::common::{by_id, cf, decrease, sum_tag, tb_sum, Line, StatementSheet};
use crate::error::{Result, StatementError};
use crate::formula::functions::IS_NETLOSS;
use crate::schema::{AccountType, AuditData, CashFlowItem, YearType};
use crate::table::Table;
use log::debug;

pub const CASH_FLOWS: &str = "Cash Flows";

pub const OPERATING: &str = "operating";
pub const INVESTING: &str = "investing";
pub const FINANCING: &str = "financing";
pub const CASH_FLOW_SUBTOTALS: &str = "cash-flow-subtotals";

const CASH_ACCOUNTS: [AccountType; 2] = [
    AccountType::AssetCashAndCashEquivalents,
    AccountType::AssetRestrictedCash,
];

/// Years with a mapped predecessor whose trial balance is present; the
/// activity of a year is measured against the year before it.
pub fn cash_flow_years(audit: &AuditData) -> Vec<YearType> {
    [YearType::Cy, YearType::Py]
        .into_iter()
        .filter(|year| {
            let has_balances = |y: YearType| audit.trial_balance(y).is_some();
            has_balances(*year) && year.preceding().is_some_and(has_balances)
        })
        .collect()
}

/// Builds the statement of cash flows using the indirect method.
///
/// Working-capital and balance-sheet movements come from trial-balance
/// differences; the non-cash items and the gross investing and financing
/// flows come from the supplemental cash-flow data. Each "other, net" line
/// carries whatever part of the balance-sheet movement the supplemental
/// figures do not explain, so the net change in cash ties to the trial balance
/// whenever opening retained earnings roll forward from the prior year.
pub fn build_cash_flows(audit: &AuditData) -> Result<Table> {
    use AccountType::*;
    use CashFlowItem::*;

    let years = cash_flow_years(audit);
    if years.is_empty() {
        return Err(StatementError::InvalidAuditData(
            "Cash flows need trial balances for a year and the year before it".to_string(),
        ));
    }
    debug!("Building cash flows for {:?}", years);

    let mut sheet = StatementSheet::new(
        audit,
        CASH_FLOWS,
        "Statements of Cash Flows",
        "Years ended ",
        &years,
    )?;
    // Every presented year has a predecessor by construction.
    let prior = |year: YearType| year.preceding().unwrap_or(year);

    sheet.section("Cash flows from operating activities:", 0)?;
    sheet.line(Line::new("Net loss").tag(OPERATING), |y, _| {
        format!("-{}('{}')", IS_NETLOSS, y)
    })?;
    sheet.caption("Adjustments to reconcile net loss to net cash used in operating activities:", 1)?;
    for item in [DepreciationAndAmortization, StockBasedComp] {
        sheet.line(
            Line::new(item.label()).tag(OPERATING).indent(2).hide_if_zero(),
            |y, _| cf(item, y),
        )?;
    }
    sheet.caption("Changes in operating assets and liabilities:", 1)?;
    let working_capital: [(&str, &[AccountType]); 11] = [
        ("Accounts receivable", &[AssetAccountsReceivable]),
        ("Inventory", &[AssetInventory]),
        ("Prepaid expenses", &[AssetPrepaidExpenses]),
        ("Other current assets", &[AssetOther]),
        (
            "Operating lease right-of-use assets",
            &[AssetOperatingLeaseRightOfUse],
        ),
        ("Other non-current assets", &[AssetOtherNonCurrent]),
        ("Accounts payable", &[LiabilityAccountsPayable]),
        ("Accrued liabilities", &[LiabilityAccruedLiabilities]),
        ("Deferred revenue", &[LiabilityDeferredRevenue]),
        (
            "Operating lease liabilities",
            &[LiabilityOperatingLeaseCurrent, LiabilityOperatingLeaseNonCurrent],
        ),
        (
            "Other liabilities",
            &[LiabilityOther, LiabilityOtherNonCurrent],
        ),
    ];
    for (label, accounts) in working_capital {
        sheet.line(
            Line::new(label).tag(OPERATING).indent(2).hide_if_zero(),
            |y, _| decrease(accounts, y, prior(y)),
        )?;
    }
    sheet.line(
        Line::new("Net cash used in operating activities")
            .id("NET-CASH-OPERATING")
            .tag(CASH_FLOW_SUBTOTALS)
            .indent(2)
            .total(),
        |_, col| sum_tag(OPERATING, col),
    )?;

    sheet.section("Cash flows from investing activities:", 0)?;
    sheet.line(
        Line::new(PurchaseOfPropertyAndEquipment.label())
            .tag(INVESTING)
            .hide_if_zero(),
        |y, _| format!("-{}", cf(PurchaseOfPropertyAndEquipment, y)),
    )?;
    sheet.line(
        Line::new("Other investing activities, net")
            .tag(INVESTING)
            .hide_if_zero(),
        |y, _| {
            format!(
                "{}-{}+{}",
                decrease(
                    &[
                        AssetPropertyAndEquipment,
                        AssetAccumulatedDepreciation,
                        AssetIntangibleAssets
                    ],
                    y,
                    prior(y)
                ),
                cf(DepreciationAndAmortization, y),
                cf(PurchaseOfPropertyAndEquipment, y)
            )
        },
    )?;
    sheet.line(
        Line::new("Net cash used in investing activities")
            .id("NET-CASH-INVESTING")
            .tag(CASH_FLOW_SUBTOTALS)
            .indent(2)
            .total(),
        |_, col| sum_tag(INVESTING, col),
    )?;

    sheet.section("Cash flows from financing activities:", 0)?;
    sheet.line(
        Line::new(ProceedsFromDebt.label()).tag(FINANCING).hide_if_zero(),
        |y, _| cf(ProceedsFromDebt, y),
    )?;
    sheet.line(
        Line::new(RepaymentOfDebt.label()).tag(FINANCING).hide_if_zero(),
        |y, _| format!("-{}", cf(RepaymentOfDebt, y)),
    )?;
    sheet.line(
        Line::new(ProceedsFromStockIssuance.label())
            .tag(FINANCING)
            .hide_if_zero(),
        |y, _| cf(ProceedsFromStockIssuance, y),
    )?;
    sheet.line(
        Line::new("Other financing activities, net")
            .tag(FINANCING)
            .hide_if_zero(),
        |y, _| {
            format!(
                "{}-{}-{}+{}-{}",
                decrease(
                    &[
                        LiabilityShortTermDebt,
                        LiabilityLongTermDebt,
                        LiabilityConvertibleNotes,
                        EquityPreferredStock,
                        EquityCommonStock,
                        EquityAdditionalPaidInCapital,
                        EquityTreasuryStock
                    ],
                    y,
                    prior(y)
                ),
                cf(StockBasedComp, y),
                cf(ProceedsFromDebt, y),
                cf(RepaymentOfDebt, y),
                cf(ProceedsFromStockIssuance, y)
            )
        },
    )?;
    sheet.line(
        Line::new("Net cash provided by financing activities")
            .id("NET-CASH-FINANCING")
            .tag(CASH_FLOW_SUBTOTALS)
            .indent(2)
            .total(),
        |_, col| sum_tag(FINANCING, col),
    )?;

    sheet.line(
        Line::new("Net change in cash, cash equivalents and restricted cash")
            .id("NET-CHANGE-IN-CASH")
            .indent(0)
            .pad_top(),
        |_, col| sum_tag(CASH_FLOW_SUBTOTALS, col),
    )?;
    sheet.line(
        Line::new("Cash, cash equivalents and restricted cash, beginning of year")
            .id("CASH-BEGINNING")
            .indent(0),
        |y, _| tb_sum(&CASH_ACCOUNTS, prior(y)),
    )?;
    sheet.line(
        Line::new("Cash, cash equivalents and restricted cash, end of year")
            .id("CASH-END")
            .grand_total(),
        |_, col| format!("{}+{}", by_id("NET-CHANGE-IN-CASH", col), by_id("CASH-BEGINNING", col)),
    )?;

    sheet.section("Supplemental disclosure of cash flow information:", 0)?;
    for item in [CashPaidForInterest, CashPaidForIncomeTaxes] {
        sheet.line(Line::new(item.label()).hide_if_zero(), |y, _| cf(item, y))?;
    }

    Ok(sheet.finish())
}

/// Closing cash per the trial balance, for tying out `CASH-END`.
pub fn closing_cash_formula(year: YearType) -> String {
    tb_sum(&CASH_ACCOUNTS, year)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account_map::AccountMap;
    use crate::formula::{Evaluator, FormulaContext};
    use crate::schema::{BusinessInfo, CashFlowData, YearMapping};
    use crate::statements::build_income_statement;
    use std::collections::BTreeMap;

    /// 2023 activity: revenue 50k cash, 30k R&D of which 10k is stock-based,
    /// 5k depreciation, 20k equipment bought with cash, 40k borrowed.
    fn audit() -> AuditData {
        let mut trial_balances = BTreeMap::new();
        trial_balances.insert(
            "2022".to_string(),
            AccountMap::from_entries([
                ("ASSET_CASH_AND_CASH_EQUIVALENTS", 100_000),
                ("EQUITY_COMMON_STOCK", -100_000),
            ])
            .unwrap(),
        );
        trial_balances.insert(
            "2023".to_string(),
            AccountMap::from_entries([
                ("ASSET_CASH_AND_CASH_EQUIVALENTS", 150_000),
                ("ASSET_PROPERTY_AND_EQUIPMENT", 20_000),
                ("ASSET_ACCUMULATED_DEPRECIATION", -5_000),
                ("LIABILITY_LONG_TERM_DEBT", -40_000),
                ("EQUITY_COMMON_STOCK", -100_000),
                ("EQUITY_ADDITIONAL_PAID_IN_CAPITAL", -10_000),
                ("INCOME_STATEMENT_REVENUE", -50_000),
                ("INCOME_STATEMENT_RESEARCH_AND_DEVELOPMENT", 30_000),
                ("INCOME_STATEMENT_GENERAL_AND_ADMINISTRATIVE", 5_000),
            ])
            .unwrap(),
        );

        let mut cash_flow = CashFlowData::new();
        cash_flow.set_balance(YearType::Cy, StockBasedComp, 10_000);
        cash_flow.set_balance(YearType::Cy, DepreciationAndAmortization, 5_000);
        cash_flow.set_balance(YearType::Cy, PurchaseOfPropertyAndEquipment, 20_000);
        cash_flow.set_balance(YearType::Cy, ProceedsFromDebt, 40_000);

        AuditData {
            business: BusinessInfo {
                legal_name: "Flow Co".to_string(),
                fiscal_year_end: "December 31".to_string(),
            },
            years: YearMapping::new("2023").with_prior("2022"),
            trial_balances,
            cash_flow,
        }
    }

    use CashFlowItem::*;

    #[test]
    fn test_only_years_with_a_predecessor_are_presented() {
        let mut audit = audit();
        assert_eq!(cash_flow_years(&audit), vec![YearType::Cy]);

        audit.years = YearMapping::new("2023");
        assert!(cash_flow_years(&audit).is_empty());
        assert!(matches!(
            build_cash_flows(&audit),
            Err(StatementError::InvalidAuditData(_))
        ));
    }

    #[test]
    fn test_net_change_ties_to_trial_balance_cash() {
        let audit = audit();
        let income_statement = build_income_statement(&audit).unwrap();
        let table = build_cash_flows(&audit).unwrap();
        let context = FormulaContext::from_audit(&audit).with_income_statement(&income_statement);
        let evaluator = Evaluator::new(&table, context);
        let value = |id: &str| evaluator.number_by_id(id, 1).unwrap();

        // -(-15k net income) + 5k D&A + 10k SBC
        assert_eq!(value("NET-CASH-OPERATING"), 30_000.0);
        assert_eq!(value("NET-CASH-INVESTING"), -20_000.0);
        assert_eq!(value("NET-CASH-FINANCING"), 40_000.0);
        assert_eq!(value("NET-CHANGE-IN-CASH"), 50_000.0);
        assert_eq!(value("CASH-BEGINNING"), 100_000.0);
        assert_eq!(value("CASH-END"), 150_000.0);

        let closing = evaluator
            .evaluate_formula(&closing_cash_formula(YearType::Cy))
            .unwrap()
            .as_number()
            .unwrap();
        assert_eq!(closing, value("CASH-END"));
    }

    #[test]
    fn test_cash_flows_need_the_income_statement() {
        let audit = audit();
        let table = build_cash_flows(&audit).unwrap();
        let evaluator = Evaluator::new(&table, FormulaContext::from_audit(&audit));
        assert!(matches!(
            evaluator.number_by_id("NET-CASH-OPERATING", 1),
            Err(StatementError::FormulaFunction { .. })
        ));
    }
}
