//! Statement builders. Each turns an [`AuditData`](crate::schema::AuditData)
//! bundle into a [`Table`](crate::table::Table) whose figures are formulas over
//! the trial balances, so the same table can be evaluated, rendered to HTML or
//! Word, or exported to Excel with live formulas.

pub mod balance_sheet;
pub mod cash_flows;
pub mod common;
pub mod income_statement;

pub use balance_sheet::{balance_sheet_years, build_balance_sheet, BALANCE_SHEET};
pub use cash_flows::{build_cash_flows, cash_flow_years, CASH_FLOWS};
pub use common::{HEADING_ROW_ID, LABEL_COLUMN};
pub use income_statement::{build_income_statement, INCOME_STATEMENT};
