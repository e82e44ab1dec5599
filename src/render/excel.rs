//! Excel workbook output with live formulas.
//!
//! Statement tables are written one per sheet, followed by a `Trial Balance`
//! sheet (one row per account type, one column per mapped year) and a
//! `Cash Flow Data` sheet laid out the same way for the supplemental items.
//! Domain functions are rewritten into references to those sheets:
//!
//! | formula                     | worksheet formula                                   |
//! |-----------------------------|-----------------------------------------------------|
//! | `TBLOOKUP(account, year)`   | `'Trial Balance'!$B$n`                              |
//! | `TB_NETLOSS(year)`          | `SUM` over the income-statement block of that sheet |
//! | `GET_BY_ID(id, col)`        | same-sheet cell reference                           |
//! | `SUMTAGCOL(tag, col)`       | `SUM` over the tagged rows                          |
//! | `IS_NETLOSS(year)`          | `'Income Statement'!` net loss cell                 |
//! | `CF(item, year)`            | difference of two `'Cash Flow Data'` cells          |
//!
//! The data sheets and figures are in currency units, so amount literals in a
//! formula are divided by 100 on the way out. Each formula is written together
//! with its evaluated result.

use super::{ensure_translatable, row_is_hidden, RenderOptions, RenderTarget};
use crate::coord::index_to_col;
use crate::error::{Result, StatementError};
use crate::formula::functions::{
    CF, GET_BY_ID, IS_NETLOSS, NET_LOSS_ROW_ID, SUMTAGCOL, TBLOOKUP, TB_NETLOSS,
};
use crate::formula::{
    parse, BinaryOperator, CellReference, CustomCall, Evaluator, Expression, FormulaContext,
    FormulaRewriter, Literal, Value,
};
use crate::schema::{AccountGroup, AccountType, AuditData, CashFlowItem, YearMapping, YearType};
use crate::statements::INCOME_STATEMENT;
use crate::style::{Align, Border, NumberFormat, Style};
use crate::table::{Cell, CellValue, DeferredOp, Table};
use crate::utils::f_out;
use log::{debug, info};
use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Formula, Workbook, Worksheet};

pub const TRIAL_BALANCE_SHEET: &str = "Trial Balance";
pub const CASH_FLOW_DATA_SHEET: &str = "Cash Flow Data";

/// Domain functions [`ExcelTranslator`] rewrites into worksheet formulas.
pub const TRANSLATED_FUNCTIONS: [&str; 6] = [TBLOOKUP, TB_NETLOSS, GET_BY_ID, SUMTAGCOL, IS_NETLOSS, CF];

const PAD_TOP_ROW_HEIGHT: f64 = 21.0;
const DATA_LABEL_WIDTH: f64 = 48.0;
const DATA_VALUE_WIDTH: f64 = 16.0;

/// Column of `year` on the data sheets: B for the first mapped year, then C, D.
fn data_column(years: &YearMapping, year: YearType) -> Option<usize> {
    years
        .mapped()
        .iter()
        .position(|mapped| *mapped == year)
        .map(|index| index + 1)
}

fn trial_balance_row(account: AccountType) -> Option<u32> {
    AccountType::ALL
        .iter()
        .position(|candidate| *candidate == account)
        .map(|index| index as u32 + 2)
}

fn cash_flow_row(item: CashFlowItem) -> Option<u32> {
    CashFlowItem::ALL
        .iter()
        .position(|candidate| *candidate == item)
        .map(|index| index as u32 + 2)
}

/// Divides every non-zero number literal that stands for an amount by 100.
///
/// Amounts flow through addition, subtraction, comparison, negation and the
/// value arguments of builtins. A literal operand of `*`, `/` or `^`, the
/// digits of `ROUND` and every domain-function argument are plain numbers.
fn literals_to_units(expr: Expression, is_amount: bool) -> Expression {
    match expr {
        Expression::Literal(Literal::Number(n)) if is_amount && n != 0.0 => {
            Expression::number(n / 100.0)
        }
        Expression::BinaryOp { left, op, right } => {
            let (left_amount, right_amount) = match op {
                BinaryOperator::Concat => (false, false),
                BinaryOperator::Multiply if is_number(&left) && !is_number(&right) => {
                    (false, is_amount)
                }
                BinaryOperator::Multiply | BinaryOperator::Divide | BinaryOperator::Power => {
                    (is_amount, is_amount && !is_number(&right))
                }
                _ => (is_amount, is_amount),
            };
            Expression::BinaryOp {
                left: Box::new(literals_to_units(*left, left_amount)),
                op,
                right: Box::new(literals_to_units(*right, right_amount)),
            }
        }
        Expression::UnaryOp { op, operand } => Expression::UnaryOp {
            op,
            operand: Box::new(literals_to_units(*operand, is_amount)),
        },
        Expression::FunctionCall { name, args } => {
            let custom = TRANSLATED_FUNCTIONS.contains(&name.as_str());
            let args = args
                .into_iter()
                .enumerate()
                .map(|(index, arg)| {
                    let arg_amount = is_amount && !custom && !(name == "ROUND" && index > 0);
                    literals_to_units(arg, arg_amount)
                })
                .collect();
            Expression::FunctionCall { name, args }
        }
        other => other,
    }
}

fn is_number(expr: &Expression) -> bool {
    matches!(expr, Expression::Literal(Literal::Number(_)))
}

fn sheet_cell(sheet: &str, col: usize, row: u32) -> Expression {
    Expression::CellRef(CellReference::new(index_to_col(col), row).absolute().on_sheet(sheet))
}

/// Rewrites domain functions into worksheet references.
pub struct ExcelTranslator<'t> {
    table: &'t Table,
    income_statement: Option<&'t Table>,
    years: &'t YearMapping,
}

impl<'t> ExcelTranslator<'t> {
    pub fn new(table: &'t Table, income_statement: Option<&'t Table>, years: &'t YearMapping) -> Self {
        Self {
            table,
            income_statement,
            years,
        }
    }

    /// Translates one amount formula, returning worksheet text with a leading `=`.
    pub fn translate(&mut self, formula: &str) -> Result<String> {
        self.translate_formatted(formula, None)
    }

    /// Translates a formula for a cell shown with `number_format`. Amount
    /// literals are converted from cents to the units the data sheets hold;
    /// percent cells are ratios and keep their literals.
    pub fn translate_formatted(
        &mut self,
        formula: &str,
        number_format: Option<NumberFormat>,
    ) -> Result<String> {
        let is_amount = number_format != Some(NumberFormat::Percent);
        let expr = literals_to_units(parse(formula)?, is_amount).rewrite(self)?;
        Ok(format!("={}", expr))
    }

    /// `SUM` over column `col` of every row tagged `tag`, or `0` when none are.
    pub fn tag_sum(&self, col: usize, tag: &str) -> Result<Expression> {
        let rows = self.table.get_rows_by_tag(tag);
        if rows.is_empty() {
            return Ok(Expression::number(0.0));
        }
        let range = self.table.get_address_range(col, &rows, 0);
        Ok(parse(&format!("SUM({})", range))?)
    }

    fn data_column(&self, year: YearType, function: &str) -> Result<usize> {
        data_column(self.years, year)
            .ok_or_else(|| StatementError::function(function, format!("Year {} is not mapped", year)))
    }

    fn translate_call(&self, call: CustomCall) -> Result<Expression> {
        let function = call.name();
        Ok(match call {
            CustomCall::TbLookup { account, year } => {
                let col = self.data_column(year, function)?;
                let row = trial_balance_row(account).ok_or_else(|| {
                    StatementError::function(function, format!("No trial balance row for {}", account))
                })?;
                sheet_cell(TRIAL_BALANCE_SHEET, col, row)
            }
            CustomCall::TbNetLoss { year } => {
                let col = index_to_col(self.data_column(year, function)?);
                let rows: Vec<u32> = AccountType::ALL
                    .iter()
                    .filter(|account| account.group() == Some(AccountGroup::IncomeStatement))
                    .filter_map(|account| trial_balance_row(*account))
                    .collect();
                let (Some(first), Some(last)) = (rows.first(), rows.last()) else {
                    return Err(StatementError::function(function, "No income statement accounts"));
                };
                Expression::call(
                    "SUM",
                    vec![Expression::Range {
                        sheet: Some(TRIAL_BALANCE_SHEET.to_string()),
                        start: CellReference::new(col.clone(), *first).absolute(),
                        end: CellReference::new(col, *last).absolute(),
                    }],
                )
            }
            CustomCall::GetById { row_id, col } => {
                let row = self.table.get_row_by_id(&row_id)?;
                Expression::CellRef(CellReference::new(index_to_col(col), row.number()))
            }
            CustomCall::SumTagCol { tag, col } => {
                if self.table.get_rows_by_tag(&tag).is_empty() {
                    return Err(StatementError::function(
                        function,
                        format!("No rows tagged '{}'", tag),
                    ));
                }
                self.tag_sum(col, &tag)?
            }
            CustomCall::IsNetLoss { year } => {
                let income_statement = self.income_statement.ok_or_else(|| {
                    StatementError::function(function, "No income statement sheet in the workbook")
                })?;
                let col = income_statement.year_column(year).ok_or_else(|| {
                    StatementError::function(
                        function,
                        format!("The income statement does not present {}", year),
                    )
                })?;
                let row = income_statement.get_row_by_id(NET_LOSS_ROW_ID)?;
                Expression::CellRef(
                    CellReference::new(index_to_col(col), row.number()).on_sheet(income_statement.name()),
                )
            }
            CustomCall::Cf { item, year } => {
                let preceding = year.preceding().ok_or_else(|| {
                    StatementError::function(
                        function,
                        format!("{} has no preceding year to compare against", year),
                    )
                })?;
                let current = self.data_column(year, function)?;
                let prior = self.data_column(preceding, function)?;
                let row = cash_flow_row(item).ok_or_else(|| {
                    StatementError::function(function, format!("No cash flow row for {}", item))
                })?;
                Expression::binary(
                    sheet_cell(CASH_FLOW_DATA_SHEET, current, row),
                    BinaryOperator::Subtract,
                    sheet_cell(CASH_FLOW_DATA_SHEET, prior, row),
                )
            }
        })
    }
}

impl FormulaRewriter for ExcelTranslator<'_> {
    fn rewrite_call(&mut self, name: &str, args: &[Expression]) -> Result<Option<Expression>> {
        match CustomCall::from_literals(name, args)? {
            Some(call) => Ok(Some(self.translate_call(call)?)),
            None => Ok(None),
        }
    }
}

/// Writes statement tables and their source data to an `.xlsx` workbook.
pub struct ExcelRenderer<'a> {
    audit: &'a AuditData,
    options: RenderOptions,
}

impl<'a> ExcelRenderer<'a> {
    pub fn new(audit: &'a AuditData, options: RenderOptions) -> Self {
        Self { audit, options }
    }

    /// Renders `tables` in order, then the data sheets. A table named
    /// `Income Statement` is the target of `IS_NETLOSS` references.
    pub fn render(&self, tables: &[&Table]) -> Result<Vec<u8>> {
        for table in tables {
            ensure_translatable(table, RenderTarget::Excel)?;
        }

        let income_statement = tables
            .iter()
            .copied()
            .find(|table| table.name() == INCOME_STATEMENT);
        let mut context = FormulaContext::from_audit(self.audit);
        if let Some(income_statement) = income_statement {
            context = context.with_income_statement(income_statement);
        }

        let mut workbook = Workbook::new();
        for table in tables {
            let worksheet = workbook.add_worksheet();
            self.write_statement(worksheet, table, income_statement, context)?;
        }
        self.write_trial_balance(workbook.add_worksheet())?;
        self.write_cash_flow_data(workbook.add_worksheet())?;

        let buffer = workbook.save_to_buffer()?;
        info!(
            "Rendered {} statements for {} into {} bytes of xlsx",
            tables.len(),
            self.audit.business.legal_name,
            buffer.len()
        );
        Ok(buffer)
    }

    fn write_statement(
        &self,
        worksheet: &mut Worksheet,
        table: &Table,
        income_statement: Option<&Table>,
        context: FormulaContext<'_>,
    ) -> Result<()> {
        worksheet.set_name(table.name())?;
        for column in table.columns() {
            if let Some(width) = column.width {
                worksheet.set_column_width(column.index() as u16, width)?;
            }
        }

        let evaluator = Evaluator::new(table, context);
        let mut translator = ExcelTranslator::new(table, income_statement, &self.audit.years);

        for row in table.rows() {
            let sheet_row = row.number() - 1;
            if row_is_hidden(&evaluator, row, &self.options)? {
                worksheet.set_row_hidden(sheet_row)?;
            }
            if row.style.has_pad_top() {
                worksheet.set_row_height(sheet_row, PAD_TOP_ROW_HEIGHT)?;
            }

            for col in 0..table.column_count() {
                let style = table.effective_style(row.number(), col);
                let format = excel_format(&style, &self.options);
                let sheet_col = col as u16;
                let Some(cell) = row.cell(col) else {
                    if has_borders(&style) {
                        worksheet.write_blank(sheet_row, sheet_col, &format)?;
                    }
                    continue;
                };

                match &cell.value {
                    CellValue::Empty => {
                        if has_borders(&style) {
                            worksheet.write_blank(sheet_row, sheet_col, &format)?;
                        }
                    }
                    CellValue::Text(text) => {
                        worksheet.write_string_with_format(sheet_row, sheet_col, text, &format)?;
                    }
                    CellValue::Number(n) => {
                        worksheet.write_number_with_format(
                            sheet_row,
                            sheet_col,
                            to_units(*n, style.number_format),
                            &format,
                        )?;
                    }
                    CellValue::Formula(formula) => {
                        let translated = translator.translate_formatted(formula, style.number_format)?;
                        let formula = self.with_result(&evaluator, cell, &translated, style.number_format)?;
                        worksheet.write_formula_with_format(sheet_row, sheet_col, formula, &format)?;
                    }
                    CellValue::Deferred(DeferredOp::AddColumnCellsByTag { tag }) => {
                        let translated = format!("={}", translator.tag_sum(col, tag)?);
                        let formula = self.with_result(&evaluator, cell, &translated, style.number_format)?;
                        worksheet.write_formula_with_format(sheet_row, sheet_col, formula, &format)?;
                    }
                }
            }
        }

        debug!("Wrote sheet '{}' with {} rows", table.name(), table.rows().len());
        Ok(())
    }

    fn with_result(
        &self,
        evaluator: &Evaluator<'_>,
        cell: &Cell,
        translated: &str,
        number_format: Option<NumberFormat>,
    ) -> Result<Formula> {
        let result = match evaluator.eval_cell(cell)? {
            Value::Number(n) => to_units(n, number_format).to_string(),
            other => other.as_text(),
        };
        Ok(Formula::new(translated).set_result(result))
    }

    fn write_trial_balance(&self, worksheet: &mut Worksheet) -> Result<()> {
        let years = &self.audit.years;
        let bold = Format::new().set_bold().set_border_bottom(FormatBorder::Thin);
        let amount = money_format(&self.options);

        worksheet.set_name(TRIAL_BALANCE_SHEET)?;
        worksheet.set_column_width(0, DATA_LABEL_WIDTH)?;
        worksheet.write_string_with_format(0, 0, "Account type", &bold)?;

        for year in years.mapped() {
            let Some(col) = data_column(years, year) else {
                continue;
            };
            let label = years.resolve(year).unwrap_or_default();
            worksheet.set_column_width(col as u16, DATA_VALUE_WIDTH)?;
            worksheet.write_string_with_format(0, col as u16, label, &bold)?;

            let Some(balances) = self.audit.trial_balance(year) else {
                continue;
            };
            for (index, account) in AccountType::ALL.iter().enumerate() {
                worksheet.write_number_with_format(
                    index as u32 + 1,
                    col as u16,
                    f_out(balances.balance(*account)),
                    &amount,
                )?;
            }
        }

        for (index, account) in AccountType::ALL.iter().enumerate() {
            worksheet.write_string(index as u32 + 1, 0, account.as_str())?;
        }
        Ok(())
    }

    fn write_cash_flow_data(&self, worksheet: &mut Worksheet) -> Result<()> {
        let years = &self.audit.years;
        let bold = Format::new().set_bold().set_border_bottom(FormatBorder::Thin);
        let amount = money_format(&self.options);

        worksheet.set_name(CASH_FLOW_DATA_SHEET)?;
        worksheet.set_column_width(0, DATA_LABEL_WIDTH)?;
        worksheet.write_string_with_format(0, 0, "Item", &bold)?;

        for (index, item) in CashFlowItem::ALL.iter().enumerate() {
            worksheet.write_string(index as u32 + 1, 0, item.as_str())?;
        }

        for year in years.mapped() {
            let Some(col) = data_column(years, year) else {
                continue;
            };
            worksheet.set_column_width(col as u16, DATA_VALUE_WIDTH)?;
            worksheet.write_string_with_format(0, col as u16, year.as_str(), &bold)?;
            for (index, item) in CashFlowItem::ALL.iter().enumerate() {
                worksheet.write_number_with_format(
                    index as u32 + 1,
                    col as u16,
                    f_out(self.audit.cash_flow.balance(year, *item)),
                    &amount,
                )?;
            }
        }
        Ok(())
    }
}

/// Cents to currency units; percentages are already ratios.
fn to_units(value: f64, number_format: Option<NumberFormat>) -> f64 {
    match number_format {
        Some(NumberFormat::Percent) => value,
        _ => value / 100.0,
    }
}

fn has_borders(style: &Style) -> bool {
    style.top_border() != Border::None || style.bottom_border() != Border::None
}

fn money_format(options: &RenderOptions) -> Format {
    Format::new().set_num_format(accounting_pattern("", options))
}

fn accounting_pattern(symbol: &str, options: &RenderOptions) -> String {
    let digits = if options.show_cents { "#,##0.00" } else { "#,##0" };
    let symbol = if symbol.is_empty() {
        String::new()
    } else {
        format!("\"{}\"", symbol)
    };
    format!(
        "{symbol}{digits}_);({symbol}{digits});{symbol}\"-\"_)",
        symbol = symbol,
        digits = digits
    )
}

fn border(border: Border) -> FormatBorder {
    match border {
        Border::None => FormatBorder::None,
        Border::Single => FormatBorder::Thin,
        Border::Double => FormatBorder::Double,
    }
}

/// Worksheet format equivalent to an effective style.
pub fn excel_format(style: &Style, options: &RenderOptions) -> Format {
    let mut format = Format::new();
    if style.is_bold() {
        format = format.set_bold();
    }
    if style.is_italic() {
        format = format.set_italic();
    }
    if style.indent_level() > 0 {
        format = format.set_indent(style.indent_level());
    }
    if let Some(align) = style.align {
        format = format.set_align(match align {
            Align::Left => FormatAlign::Left,
            Align::Center => FormatAlign::Center,
            Align::Right => FormatAlign::Right,
        });
    }
    if style.top_border() != Border::None {
        format = format.set_border_top(border(style.top_border()));
    }
    if style.bottom_border() != Border::None {
        format = format.set_border_bottom(border(style.bottom_border()));
    }
    if let Some(number_format) = style.number_format {
        let pattern = match number_format {
            NumberFormat::Accounting => accounting_pattern("", options),
            NumberFormat::Currency => accounting_pattern(&options.currency_symbol, options),
            NumberFormat::Number if options.show_cents => "#,##0.00".to_string(),
            NumberFormat::Number => "#,##0".to_string(),
            NumberFormat::Percent => "0.0%".to_string(),
        };
        format = format.set_num_format(pattern);
    }
    format
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account_map::AccountMap;
    use crate::schema::{BusinessInfo, CashFlowData};
    use crate::table::{RowOptions, HIDE_IF_ZERO};
    use std::collections::BTreeMap;

    fn years() -> YearMapping {
        YearMapping::new("2023").with_prior("2022")
    }

    fn table() -> Table {
        let mut table = Table::new("Sheet");
        table
            .add_row(["Cash", "=TBLOOKUP('ASSET_CASH_AND_CASH_EQUIVALENTS','CY')"], RowOptions::new().id("CASH").tag("assets"))
            .unwrap();
        table
            .add_row(["Gap", "=1"], RowOptions::new())
            .unwrap();
        table
            .add_row(["Other", "=TBLOOKUP('ASSET_OTHER','PY')"], RowOptions::new().tag("assets"))
            .unwrap();
        table
    }

    #[test]
    fn test_trial_balance_lookups() {
        let years = years();
        let table = table();
        let mut translator = ExcelTranslator::new(&table, None, &years);

        assert_eq!(
            translator.translate("=TBLOOKUP('ASSET_CASH_AND_CASH_EQUIVALENTS','CY')").unwrap(),
            "='Trial Balance'!$B$2"
        );
        assert_eq!(
            translator
                .translate("=-TBLOOKUP('EQUITY_RETAINED_EARNINGS','PY')-TB_NETLOSS('PY')")
                .unwrap(),
            "=-'Trial Balance'!$C$26-SUM('Trial Balance'!$C$28:$C$37)"
        );
    }

    #[test]
    fn test_same_sheet_functions() {
        let years = years();
        let table = table();
        let mut translator = ExcelTranslator::new(&table, None, &years);

        assert_eq!(translator.translate("=SUMTAGCOL('assets',1)").unwrap(), "=SUM(B1,B3)");
        assert_eq!(
            translator.translate("=GET_BY_ID('CASH',1)*2").unwrap(),
            "=B1*2"
        );
        assert!(matches!(
            translator.translate("=SUMTAGCOL('missing',1)"),
            Err(StatementError::FormulaFunction { .. })
        ));
    }

    #[test]
    fn test_amount_literals_become_units() {
        let years = years();
        let table = table();
        let mut translator = ExcelTranslator::new(&table, None, &years);

        assert_eq!(translator.translate("=GET_BY_ID('CASH',1)+150000").unwrap(), "=B1+1500");
        assert_eq!(translator.translate("=(GET_BY_ID('CASH',1)-500)*2").unwrap(), "=(B1-5)*2");
        assert_eq!(translator.translate("=3*GET_BY_ID('CASH',1)").unwrap(), "=3*B1");
        assert_eq!(translator.translate("=ROUND(GET_BY_ID('CASH',1)/3,2)").unwrap(), "=ROUND(B1/3,2)");
        assert_eq!(
            translator.translate("=IF(GET_BY_ID('CASH',1)>2500,-100,0)").unwrap(),
            "=IF(B1>25,-1,0)"
        );
        assert_eq!(
            translator
                .translate_formatted("=1-GET_BY_ID('CASH',1)/SUMTAGCOL('assets',1)", Some(NumberFormat::Percent))
                .unwrap(),
            "=1-B1/SUM(B1,B3)"
        );
    }

    #[test]
    fn test_cross_sheet_functions() {
        let years = years().with_two_prior("2021");
        let table = table();
        let mut income_statement = Table::new(INCOME_STATEMENT);
        income_statement.set_year_column(YearType::Cy, 1);
        for _ in 0..9 {
            income_statement.add_row(["filler"], RowOptions::new()).unwrap();
        }
        income_statement
            .add_row(["Net loss", "=TB_NETLOSS('CY')"], RowOptions::new().id(NET_LOSS_ROW_ID))
            .unwrap();

        let mut translator = ExcelTranslator::new(&table, Some(&income_statement), &years);
        assert_eq!(
            translator.translate("=-IS_NETLOSS('CY')").unwrap(),
            "=-'Income Statement'!B10"
        );
        assert_eq!(
            translator.translate("=10000-CF('stockBasedComp','PY')").unwrap(),
            "=100-('Cash Flow Data'!$C$2-'Cash Flow Data'!$D$2)"
        );
        assert!(matches!(
            translator.translate("=CF('stockBasedComp','PY2')"),
            Err(StatementError::FormulaFunction { .. })
        ));
    }

    #[test]
    fn test_workbook_renders() {
        let mut trial_balances = BTreeMap::new();
        trial_balances.insert(
            "2023".to_string(),
            AccountMap::from_entries([("ASSET_CASH_AND_CASH_EQUIVALENTS", 10_000)]).unwrap(),
        );
        trial_balances.insert("2022".to_string(), AccountMap::new());
        let audit = AuditData {
            business: BusinessInfo {
                legal_name: "Sheets Co".to_string(),
                fiscal_year_end: "December 31".to_string(),
            },
            years: years(),
            trial_balances,
            cash_flow: CashFlowData::default(),
        };

        let mut table = table();
        table.set_year_column(YearType::Cy, 1);
        table
            .add_row(["Hidden", "=0"], RowOptions::new().tag(HIDE_IF_ZERO))
            .unwrap();

        let bytes = ExcelRenderer::new(&audit, RenderOptions::default())
            .render(&[&table])
            .unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn test_accounting_pattern() {
        let options = RenderOptions::default();
        assert_eq!(accounting_pattern("", &options), "#,##0_);(#,##0);\"-\"_)");
        assert_eq!(
            accounting_pattern("$", &options),
            "\"$\"#,##0_);(\"$\"#,##0);\"$\"\"-\"_)"
        );
    }
}
