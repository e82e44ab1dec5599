//! Output targets for statement tables.
//!
//! HTML and Word evaluate every formula and print the result; Excel keeps the
//! formulas live by translating the domain functions into native references.
//! Every target first checks that it can handle each function a table uses.

pub mod excel;
pub mod html;
pub mod word;

pub use excel::ExcelRenderer;
pub use html::{render_rows, render_table, RenderedCell, RenderedRow};
pub use word::{document_xml, render_docx};

use crate::error::{Result, StatementError};
use crate::formula::functions::{is_custom_function, BUILTIN_FUNCTIONS};
use crate::formula::{parse, Evaluator, Value};
use crate::style::NumberFormat;
use crate::table::{Cell, CellValue, Row, Table, HIDE_IF_ZERO};
use crate::utils::{f_out, group_thousands};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderTarget {
    Html,
    Word,
    Excel,
}

impl RenderTarget {
    /// Whether a formula rendered for this target may call `function`. HTML
    /// and Word need the evaluator to know it; Excel needs it to be native
    /// or to have a worksheet translation.
    pub fn supports(&self, function: &str) -> bool {
        let builtin = BUILTIN_FUNCTIONS.contains(&function);
        match self {
            RenderTarget::Html | RenderTarget::Word => builtin || is_custom_function(function),
            RenderTarget::Excel => builtin || excel::TRANSLATED_FUNCTIONS.contains(&function),
        }
    }
}

impl fmt::Display for RenderTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RenderTarget::Html => "HTML",
            RenderTarget::Word => "Word",
            RenderTarget::Excel => "Excel",
        })
    }
}

/// Presentation switches shared by every renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Prefix for `Currency` cells.
    pub currency_symbol: String,
    /// Print cents rather than rounding to whole units.
    pub show_cents: bool,
    /// Suppress `hide-if-zero` rows whose figures are all zero.
    pub hide_zero_rows: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            currency_symbol: "$".to_string(),
            show_cents: false,
            hide_zero_rows: true,
        }
    }
}

/// Fails with [`StatementError::UnsupportedRenderTarget`] naming every
/// function in `table` that `target` cannot handle. Parse errors surface as-is.
pub fn ensure_translatable(table: &Table, target: RenderTarget) -> Result<()> {
    let mut unsupported = BTreeSet::new();
    for row in table.rows() {
        for cell in row.cells() {
            if let Some(formula) = cell.value.formula() {
                let expr = parse(formula)?;
                unsupported.extend(
                    expr.function_names()
                        .into_iter()
                        .filter(|name| !target.supports(name)),
                );
            }
        }
    }

    if unsupported.is_empty() {
        Ok(())
    } else {
        Err(StatementError::UnsupportedRenderTarget {
            target: target.to_string(),
            functions: unsupported.into_iter().collect(),
        })
    }
}

/// A `hide-if-zero` row is hidden when every year figure evaluates to zero.
pub fn row_is_hidden(evaluator: &Evaluator<'_>, row: &Row, options: &RenderOptions) -> Result<bool> {
    if !options.hide_zero_rows || !row.has_tag(HIDE_IF_ZERO) {
        return Ok(false);
    }
    for (_, col) in evaluator.table().year_columns() {
        if let Some(cell) = row.cell(col) {
            if let Value::Number(n) = evaluator.eval_cell(cell)? {
                if n != 0.0 {
                    return Ok(false);
                }
            }
        }
    }
    Ok(true)
}

/// Formats a numeric cell value. Amounts arrive in cents except for
/// `Percent`, which is a ratio.
pub fn format_value(value: f64, format: Option<NumberFormat>, options: &RenderOptions) -> String {
    match format {
        Some(NumberFormat::Percent) => format!("{:.1}%", value * 100.0),
        Some(NumberFormat::Accounting) => accounting(value, "", options),
        Some(NumberFormat::Currency) => accounting(value, &options.currency_symbol, options),
        Some(NumberFormat::Number) => {
            let amount = amount_text(value.abs(), options);
            if value < 0.0 && amount.chars().any(|c| c.is_ascii_digit() && c != '0') {
                format!("-{}", amount)
            } else {
                amount
            }
        }
        None => value.to_string(),
    }
}

fn accounting(value: f64, symbol: &str, options: &RenderOptions) -> String {
    let amount = amount_text(value.abs(), options);
    if !amount.chars().any(|c| c.is_ascii_digit() && c != '0') {
        format!("{}-", symbol)
    } else if value < 0.0 {
        format!("({}{})", symbol, amount)
    } else {
        format!("{}{}", symbol, amount)
    }
}

fn amount_text(cents: f64, options: &RenderOptions) -> String {
    let units = f_out(cents.round() as i64);
    let digits = if options.show_cents {
        format!("{:.2}", units)
    } else {
        format!("{:.0}", units)
    };
    group_thousands(&digits)
}

/// Display text of a cell and whether it is a figure.
pub(crate) fn cell_text(
    evaluator: &Evaluator<'_>,
    cell: &Cell,
    format: Option<NumberFormat>,
    options: &RenderOptions,
) -> Result<(String, bool)> {
    if let CellValue::Text(text) = &cell.value {
        return Ok((text.clone(), false));
    }
    Ok(match evaluator.eval_cell(cell)? {
        Value::Number(n) => (format_value(n, format, options), true),
        Value::Empty => (String::new(), false),
        other => (other.as_text(), false),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::RowOptions;

    #[test]
    fn test_accounting_format() {
        let options = RenderOptions::default();
        assert_eq!(format_value(123_456_789.0, Some(NumberFormat::Accounting), &options), "1,234,568");
        assert_eq!(format_value(-150_000.0, Some(NumberFormat::Accounting), &options), "(1,500)");
        assert_eq!(format_value(0.0, Some(NumberFormat::Accounting), &options), "-");
        assert_eq!(format_value(-20.0, Some(NumberFormat::Accounting), &options), "-");
        assert_eq!(format_value(-150_000.0, Some(NumberFormat::Currency), &options), "($1,500)");
        assert_eq!(format_value(0.125, Some(NumberFormat::Percent), &options), "12.5%");

        let cents = RenderOptions {
            show_cents: true,
            ..RenderOptions::default()
        };
        assert_eq!(format_value(-123_456.0, Some(NumberFormat::Number), &cents), "-1,234.56");
    }

    #[test]
    fn test_unknown_functions_are_listed() {
        let mut table = Table::new("T");
        table
            .add_row(["=SUM(1,2)", "=VLOOKUP(1,A1:A2,1)"], RowOptions::new())
            .unwrap();
        table
            .add_row(["=XNPV(1)+TBLOOKUP('ASSET_OTHER','CY')"], RowOptions::new())
            .unwrap();

        match ensure_translatable(&table, RenderTarget::Excel) {
            Err(StatementError::UnsupportedRenderTarget { target, functions }) => {
                assert_eq!(target, "Excel");
                assert_eq!(functions, vec!["VLOOKUP".to_string(), "XNPV".to_string()]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_supported_functions_pass() {
        let mut table = Table::new("T");
        table
            .add_row(["=IF(GET_BY_ID('X',1)>0,SUMTAGCOL('t',1),0)"], RowOptions::new())
            .unwrap();
        for target in [RenderTarget::Html, RenderTarget::Word, RenderTarget::Excel] {
            assert!(ensure_translatable(&table, target).is_ok());
        }
    }

    #[test]
    fn test_support_depends_on_target() {
        for target in [RenderTarget::Html, RenderTarget::Word] {
            assert!(target.supports("ROUND"));
            assert!(target.supports("CF"));
            assert!(!target.supports("VLOOKUP"));
        }
        assert!(RenderTarget::Excel.supports("SUM"));
        assert!(!RenderTarget::Excel.supports("XNPV"));
        for function in crate::formula::CUSTOM_FUNCTIONS {
            assert!(RenderTarget::Excel.supports(function), "{} is not translated", function);
        }
    }
}
