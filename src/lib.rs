//! # Financial Statement Engine
//!
//! Builds audited financial statements from trial-balance data as
//! spreadsheet-like tables whose figures are formulas, then renders those
//! tables to HTML, Word or Excel.
//!
//! ## Core Concepts
//!
//! - **AuditData**: business details, a year mapping (`CY`, `PY`, `PY2` to
//!   labels such as `"2023"`), one trial balance per year and supplemental
//!   cash-flow figures. All amounts are `i64` cents, debits positive.
//! - **Table**: 1-based rows, 0-based columns, row ids and tags, and a style
//!   cascade from column to row to cell.
//! - **Formulas**: spreadsheet syntax plus `TBLOOKUP`, `GET_BY_ID`,
//!   `SUMTAGCOL`, `IS_NETLOSS`, `TB_NETLOSS` and `CF`. HTML and Word evaluate
//!   them; Excel translates them into native references.
//!
//! ## Example
//!
//! ```rust,ignore
//! use financial_statement_engine::*;
//!
//! let audit = AuditData::from_json(&std::fs::read_to_string("audit.json")?)?;
//! let statements = generate_statements_with_verification(&audit, 0.5)?;
//!
//! let html = render::html::render_document(
//!     &audit.business.legal_name,
//!     &statements.tables(),
//!     statements.context(&audit),
//!     &RenderOptions::default(),
//! )?;
//! let xlsx = ExcelRenderer::new(&audit, RenderOptions::default()).render(&statements.tables())?;
//! ```

pub mod account_map;
pub mod adjustments;
pub mod coord;
pub mod error;
pub mod formula;
pub mod ingestion;
pub mod render;
pub mod schema;
pub mod statements;
pub mod style;
pub mod table;
pub mod utils;
pub mod verification;

pub use account_map::AccountMap;
pub use adjustments::{AdjustingEntry, AuditAdjustments};
pub use error::{Result, StatementError};
pub use formula::{parse, Evaluator, Expression, FormulaContext, Value};
pub use ingestion::*;
pub use render::{ExcelRenderer, RenderOptions, RenderTarget};
pub use schema::*;
pub use statements::{build_balance_sheet, build_cash_flows, build_income_statement};
pub use style::{Align, Border, NumberFormat, Style};
pub use table::{Cell, CellValue, Column, Row, RowOptions, Table};
pub use utils::*;
pub use verification::{verify_balance_sheet, verify_cash_flows, verify_net_loss, StatementVerifier};

use log::{debug, info, warn};

/// The statements generated for one audit.
#[derive(Debug, Clone)]
pub struct FinancialStatements {
    pub balance_sheet: Table,
    pub income_statement: Table,
    /// Absent when no presented year has a preceding trial balance.
    pub cash_flows: Option<Table>,
}

impl FinancialStatements {
    /// Evaluation context with `IS_NETLOSS` wired to the income statement.
    pub fn context<'a>(&'a self, audit: &'a AuditData) -> FormulaContext<'a> {
        FormulaContext::from_audit(audit).with_income_statement(&self.income_statement)
    }

    /// Statements in presentation order.
    pub fn tables(&self) -> Vec<&Table> {
        let mut tables = vec![&self.balance_sheet, &self.income_statement];
        if let Some(cash_flows) = &self.cash_flows {
            tables.push(cash_flows);
        }
        tables
    }
}

pub struct StatementGenerator;

impl StatementGenerator {
    pub fn generate(audit: &AuditData) -> Result<FinancialStatements> {
        validate_audit_data(audit)?;

        info!(
            "Generating financial statements for {}",
            audit.business.legal_name
        );
        debug!(
            "Year mapping: {:?}; {} trial balances supplied",
            audit.years,
            audit.trial_balances.len()
        );

        let balance_sheet = build_balance_sheet(audit)?;
        let income_statement = build_income_statement(audit)?;

        let cash_flows = if statements::cash_flow_years(audit).is_empty() {
            warn!(
                "No prior-year trial balance for {}; omitting the statement of cash flows",
                audit.business.legal_name
            );
            None
        } else {
            Some(build_cash_flows(audit)?)
        };

        debug!(
            "Built {} balance sheet rows, {} income statement rows, {} cash flow rows",
            balance_sheet.rows().len(),
            income_statement.rows().len(),
            cash_flows.as_ref().map_or(0, |table| table.rows().len())
        );

        Ok(FinancialStatements {
            balance_sheet,
            income_statement,
            cash_flows,
        })
    }

    pub fn generate_with_verification(
        audit: &AuditData,
        tolerance: f64,
    ) -> Result<FinancialStatements> {
        let statements = Self::generate(audit)?;

        let verifier = StatementVerifier::new(statements.context(audit), tolerance);
        verifier.verify_balance_sheet(&statements.balance_sheet)?;
        verifier.verify_net_loss(&statements.income_statement)?;
        if let Some(cash_flows) = &statements.cash_flows {
            verifier.verify_cash_flows(cash_flows)?;
        }

        info!("Statements for {} tie out", audit.business.legal_name);
        Ok(statements)
    }
}

pub fn generate_statements(audit: &AuditData) -> Result<FinancialStatements> {
    StatementGenerator::generate(audit)
}

pub fn generate_statements_with_verification(
    audit: &AuditData,
    tolerance: f64,
) -> Result<FinancialStatements> {
    StatementGenerator::generate_with_verification(audit, tolerance)
}

/// Checks that every mapped year is a numeric label with a trial balance and
/// that the fiscal year end names a real month and day.
pub fn validate_audit_data(audit: &AuditData) -> Result<()> {
    for year in audit.years.mapped() {
        let Some(label) = audit.years.resolve(year) else {
            continue;
        };
        parse_year_label(label)?;
        if !audit.trial_balances.contains_key(label) {
            return Err(StatementError::InvalidAuditData(format!(
                "No trial balance supplied for {} ({})",
                year, label
            )));
        }
    }

    let cy = audit
        .years
        .resolve(YearType::Cy)
        .ok_or_else(|| StatementError::InvalidAuditData("No current year mapped".to_string()))?;
    fiscal_year_end_date(&audit.business.fiscal_year_end, parse_year_label(cy)?)?;

    Ok(())
}
