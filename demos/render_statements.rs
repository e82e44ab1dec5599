use financial_statement_engine::render::{html, render_docx};
use financial_statement_engine::{
    f_in, generate_statements_with_verification, AccountType, AuditData, BusinessInfo,
    CashFlowItem, Evaluator, ExcelRenderer, RenderOptions, TrialBalanceRow, YearMapping, YearType,
};
use std::fs;

fn row(name: &str, account_type: AccountType, year: &str, debit: f64, credit: f64) -> TrialBalanceRow {
    TrialBalanceRow {
        account_name: name.to_string(),
        account_type,
        year: year.to_string(),
        debit: f_in(debit),
        credit: f_in(credit),
    }
}

fn main() {
    let rows = vec![
        row("Operating account", AccountType::AssetCashAndCashEquivalents, "2022", 250_000.0, 0.0),
        row("Series seed preferred", AccountType::EquityPreferredStock, "2022", 0.0, 400_000.0),
        row("Accumulated deficit", AccountType::EquityRetainedEarnings, "2022", 150_000.0, 0.0),
        row("Operating account", AccountType::AssetCashAndCashEquivalents, "2023", 182_500.0, 0.0),
        row("Trade receivables", AccountType::AssetAccountsReceivable, "2023", 12_000.0, 0.0),
        row("Laptops", AccountType::AssetPropertyAndEquipment, "2023", 9_000.0, 0.0),
        row("Laptop depreciation", AccountType::AssetAccumulatedDepreciation, "2023", 0.0, 1_500.0),
        row("Credit cards", AccountType::LiabilityAccountsPayable, "2023", 0.0, 6_000.0),
        row("Series seed preferred", AccountType::EquityPreferredStock, "2023", 0.0, 400_000.0),
        row("Accumulated deficit", AccountType::EquityRetainedEarnings, "2023", 150_000.0, 0.0),
        row("Subscriptions", AccountType::IncomeStatementRevenue, "2023", 0.0, 48_000.0),
        row("Hosting", AccountType::IncomeStatementCostOfRevenue, "2023", 14_000.0, 0.0),
        row("Engineering payroll", AccountType::IncomeStatementResearchAndDevelopment, "2023", 65_000.0, 0.0),
        row("Office and admin", AccountType::IncomeStatementGeneralAndAdministrative, "2023", 23_000.0, 0.0),
    ];

    let business = BusinessInfo {
        legal_name: "Lattice Labs, Inc.".to_string(),
        fiscal_year_end: "December 31".to_string(),
    };
    let mut audit = AuditData::from_trial_balance_rows(
        business,
        YearMapping::new("2023").with_prior("2022"),
        &rows,
    )
    .expect("trial balance rows should aggregate");
    audit.cash_flow.set_balance(
        YearType::Cy,
        CashFlowItem::DepreciationAndAmortization,
        f_in(1_500.0),
    );
    audit.cash_flow.set_balance(
        YearType::Cy,
        CashFlowItem::PurchaseOfPropertyAndEquipment,
        f_in(9_000.0),
    );

    let statements = generate_statements_with_verification(&audit, 0.5)
        .expect("statements should tie out");
    let context = statements.context(&audit);

    let income = Evaluator::new(&statements.income_statement, context);
    println!(
        "Net loss for 2023: {:.2}",
        income.number_by_id("NET-LOSS", 1).unwrap_or_default() / 100.0
    );

    let options = RenderOptions::default();
    let out_dir = std::env::temp_dir().join("financial-statements");
    fs::create_dir_all(&out_dir).expect("output directory");

    let page = html::render_document(
        &audit.business.legal_name,
        &statements.tables(),
        context,
        &options,
    )
    .expect("html");
    fs::write(out_dir.join("statements.html"), page).expect("write html");

    let docx = render_docx(&statements.tables(), context, &options).expect("docx");
    fs::write(out_dir.join("statements.docx"), docx).expect("write docx");

    let xlsx = ExcelRenderer::new(&audit, options)
        .render(&statements.tables())
        .expect("xlsx");
    fs::write(out_dir.join("statements.xlsx"), xlsx).expect("write xlsx");

    println!("Wrote statements to {}", out_dir.display());
}
