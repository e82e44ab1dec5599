//! Layout shared by every statement: a label column followed by one figure
//! column per presented year, under a five-row heading block.

use crate::error::{Result, StatementError};
use crate::schema::{AccountType, AuditData, CashFlowItem, YearType};
use crate::style::{Align, Border, NumberFormat, Style};
use crate::table::{CellValue, RowOptions, Table, HIDE_IF_ZERO};
use crate::utils::statement_date_line;

pub const LABEL_COLUMN: usize = 0;
pub const HEADING_ROW_ID: &str = "COLUMN-HEADINGS";

const LABEL_WIDTH: f64 = 56.0;
const FIGURE_WIDTH: f64 = 16.0;

/// One statement line: a label and a formula per presented year.
#[derive(Debug, Clone, Default)]
pub struct Line {
    label: String,
    id: Option<String>,
    tags: Vec<String>,
    indent: u8,
    bold: bool,
    pad_top: bool,
    border_top: Option<Border>,
    border_bottom: Option<Border>,
}

impl Line {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            indent: 1,
            ..Self::default()
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn hide_if_zero(self) -> Self {
        self.tag(HIDE_IF_ZERO)
    }

    pub fn indent(mut self, indent: u8) -> Self {
        self.indent = indent;
        self
    }

    pub fn pad_top(mut self) -> Self {
        self.pad_top = true;
        self
    }

    /// Subtotal: single rule above the figures.
    pub fn total(mut self) -> Self {
        self.border_top = Some(Border::Single);
        self
    }

    /// Bottom line: bold, single rule above and double rule below.
    pub fn grand_total(mut self) -> Self {
        self.bold = true;
        self.indent = 0;
        self.border_top = Some(Border::Single);
        self.border_bottom = Some(Border::Double);
        self
    }
}

/// Appends rows to a statement table while tracking the presented years.
pub struct StatementSheet<'a> {
    table: Table,
    years: Vec<(YearType, &'a str)>,
}

impl<'a> StatementSheet<'a> {
    /// Creates the table, its columns and the heading block.
    pub fn new(
        audit: &'a AuditData,
        name: &str,
        title: &str,
        date_prefix: &str,
        years: &[YearType],
    ) -> Result<Self> {
        let mut presented = Vec::with_capacity(years.len());
        for year in years {
            let label = audit.years.resolve(*year).ok_or_else(|| {
                StatementError::InvalidAuditData(format!("{} is not mapped to a year label", year))
            })?;
            if !audit.trial_balances.contains_key(label) {
                return Err(StatementError::InvalidAuditData(format!(
                    "No trial balance for year {} ({})",
                    label, year
                )));
            }
            presented.push((*year, label));
        }
        if presented.is_empty() {
            return Err(StatementError::InvalidAuditData(format!(
                "{} has no years to present",
                name
            )));
        }

        let mut sheet = Self {
            table: Table::new(name),
            years: presented,
        };
        sheet.layout_columns();
        sheet.add_headings(&audit.business.legal_name, title, date_prefix, &audit.business.fiscal_year_end)?;
        Ok(sheet)
    }

    fn layout_columns(&mut self) {
        let label = self.table.get_column(LABEL_COLUMN);
        label.width = Some(LABEL_WIDTH);
        label.style = Style::new().with_align(Align::Left);

        for (offset, (year, _)) in self.years.clone().into_iter().enumerate() {
            let col = offset + 1;
            let column = self.table.get_column(col);
            column.width = Some(FIGURE_WIDTH);
            column.style = Style::new()
                .with_align(Align::Right)
                .with_number_format(NumberFormat::Accounting);
            self.table.set_year_column(year, col);
        }
    }

    fn add_headings(
        &mut self,
        legal_name: &str,
        title: &str,
        date_prefix: &str,
        fiscal_year_end: &str,
    ) -> Result<()> {
        let labels: Vec<&str> = self.years.iter().map(|(_, label)| *label).collect();
        let date_line = statement_date_line(fiscal_year_end, &labels)?;
        let bold = Style::new().with_bold(true);

        self.table
            .add_row([legal_name], RowOptions::new().style(bold.clone()))?;
        self.table.add_row([title], RowOptions::new().style(bold.clone()))?;
        self.table
            .add_row([format!("{}{}", date_prefix, date_line)], RowOptions::new())?;
        self.table.add_row(Vec::<CellValue>::new(), RowOptions::new())?;

        let mut headings: Vec<CellValue> = vec![CellValue::Empty];
        headings.extend(labels.iter().map(|label| CellValue::Text(label.to_string())));
        let row = self.table.add_row(
            headings,
            RowOptions::new().id(HEADING_ROW_ID).style(bold),
        )?;
        for cell in row.cells_mut().iter_mut().skip(1) {
            cell.style = Style::new().with_border_bottom(Border::Single);
        }
        Ok(())
    }

    /// Bold label-only row opening a section.
    pub fn section(&mut self, label: &str, indent: u8) -> Result<()> {
        self.table.add_row(
            [label],
            RowOptions::new().style(
                Style::new()
                    .with_bold(true)
                    .with_pad_top(true)
                    .with_indent(indent),
            ),
        )?;
        Ok(())
    }

    /// Label-only row without emphasis.
    pub fn caption(&mut self, label: &str, indent: u8) -> Result<()> {
        self.table
            .add_row([label], RowOptions::new().style(Style::new().with_indent(indent)))?;
        Ok(())
    }

    /// Appends `line` with `formula(year, column)` in every year column. The
    /// closure returns the formula text without the leading `=`.
    pub fn line<F>(&mut self, line: Line, formula: F) -> Result<()>
    where
        F: Fn(YearType, usize) -> String,
    {
        let mut values: Vec<CellValue> = vec![CellValue::Text(line.label.clone())];
        for (offset, (year, _)) in self.years.iter().enumerate() {
            values.push(CellValue::Formula(format!("={}", formula(*year, offset + 1))));
        }

        let mut row_style = Style::new();
        if line.bold {
            row_style = row_style.with_bold(true);
        }
        if line.pad_top {
            row_style = row_style.with_pad_top(true);
        }

        let mut options = RowOptions::new().style(row_style);
        if let Some(id) = &line.id {
            options = options.id(id.clone());
        }
        for tag in &line.tags {
            options = options.tag(tag.clone());
        }

        let row = self.table.add_row(values, options)?;
        let cells = row.cells_mut();
        cells[LABEL_COLUMN].style = Style::new().with_indent(line.indent);
        for cell in cells.iter_mut().skip(1) {
            if let Some(border) = line.border_top {
                cell.style = cell.style.clone().with_border_top(border);
            }
            if let Some(border) = line.border_bottom {
                cell.style = cell.style.clone().with_border_bottom(border);
            }
        }
        Ok(())
    }

    pub fn finish(self) -> Table {
        self.table
    }
}

pub fn tb(account: AccountType, year: YearType) -> String {
    format!("TBLOOKUP('{}','{}')", account, year)
}

/// Sum of several trial-balance lookups; `"0"` when `accounts` is empty.
pub fn tb_sum(accounts: &[AccountType], year: YearType) -> String {
    if accounts.is_empty() {
        return "0".to_string();
    }
    accounts
        .iter()
        .map(|account| tb(*account, year))
        .collect::<Vec<_>>()
        .join("+")
}

/// Credit-normal lines are shown with the sign flipped.
pub fn credit(accounts: &[AccountType], year: YearType) -> String {
    match accounts {
        [single] => format!("-{}", tb(*single, year)),
        _ => format!("-({})", tb_sum(accounts, year)),
    }
}

/// Cash effect of the change in `accounts` between `year` and its predecessor:
/// the earlier balance minus the later one.
pub fn decrease(accounts: &[AccountType], year: YearType, prior: YearType) -> String {
    accounts
        .iter()
        .map(|account| format!("{}-{}", tb(*account, prior), tb(*account, year)))
        .collect::<Vec<_>>()
        .join("+")
}

pub fn sum_tag(tag: &str, col: usize) -> String {
    format!("SUMTAGCOL('{}',{})", tag, col)
}

pub fn by_id(id: &str, col: usize) -> String {
    format!("GET_BY_ID('{}',{})", id, col)
}

pub fn cf(item: CashFlowItem, year: YearType) -> String {
    format!("CF('{}','{}')", item, year)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account_map::AccountMap;
    use crate::formula::{parse, Evaluator, FormulaContext};
    use crate::schema::{BusinessInfo, CashFlowData, YearMapping};
    use std::collections::BTreeMap;

    fn audit() -> AuditData {
        let mut trial_balances = BTreeMap::new();
        trial_balances.insert(
            "2023".to_string(),
            AccountMap::from_entries([("ASSET_INVENTORY", 400), ("LIABILITY_ACCOUNTS_PAYABLE", -150)])
                .unwrap(),
        );
        trial_balances.insert(
            "2022".to_string(),
            AccountMap::from_entries([("ASSET_INVENTORY", 100)]).unwrap(),
        );
        AuditData {
            business: BusinessInfo {
                legal_name: "Layout Inc.".to_string(),
                fiscal_year_end: "June 30".to_string(),
            },
            years: YearMapping::new("2023").with_prior("2022"),
            trial_balances,
            cash_flow: CashFlowData::default(),
        }
    }

    #[test]
    fn test_heading_block_and_year_columns() {
        let audit = audit();
        let sheet = StatementSheet::new(
            &audit,
            "Balance Sheet",
            "Balance Sheets",
            "As of ",
            &[YearType::Cy, YearType::Py],
        )
        .unwrap();
        let table = sheet.finish();

        assert_eq!(table.get_cell(1, 0).unwrap().value, CellValue::from("Layout Inc."));
        assert_eq!(
            table.get_cell(3, 0).unwrap().value,
            CellValue::from("As of June 30, 2023 and 2022")
        );
        let headings = table.get_row_by_id(HEADING_ROW_ID).unwrap();
        assert_eq!(headings.number(), 5);
        assert_eq!(headings.cell(2).unwrap().value, CellValue::from("2022"));
        assert_eq!(table.year_columns(), vec![(YearType::Cy, 1), (YearType::Py, 2)]);
        assert_eq!(
            table.effective_style(5, 1).number_format,
            Some(NumberFormat::Accounting)
        );
    }

    #[test]
    fn test_missing_trial_balance_is_rejected() {
        let mut audit = audit();
        audit.trial_balances.remove("2022");
        let result = StatementSheet::new(&audit, "X", "X", "", &[YearType::Cy, YearType::Py]);
        assert!(matches!(result, Err(StatementError::InvalidAuditData(_))));
    }

    #[test]
    fn test_lines_write_one_formula_per_year() {
        let audit = audit();
        let mut sheet =
            StatementSheet::new(&audit, "S", "S", "", &[YearType::Cy, YearType::Py]).unwrap();
        sheet
            .line(Line::new("Inventory").id("INV").tag("wc"), |year, _| {
                tb(AccountType::AssetInventory, year)
            })
            .unwrap();
        sheet
            .line(Line::new("Total").grand_total(), |_, col| sum_tag("wc", col))
            .unwrap();
        let table = sheet.finish();

        let context = FormulaContext::from_audit(&audit);
        let evaluator = Evaluator::new(&table, context);
        assert_eq!(evaluator.number_by_id("INV", 1).unwrap(), 400.0);
        assert_eq!(evaluator.number_by_id("INV", 2).unwrap(), 100.0);

        let total = table.last_row().unwrap().number();
        assert_eq!(evaluator.number_at(total, 2).unwrap(), 100.0);
        let style = table.effective_style(total, 1);
        assert!(style.is_bold());
        assert_eq!(style.bottom_border(), Border::Double);
        assert_eq!(table.effective_style(total, 0).indent_level(), 0);
    }

    #[test]
    fn test_formula_helpers_parse() {
        let formulas = [
            credit(&[AccountType::LiabilityAccountsPayable], YearType::Cy),
            credit(
                &[AccountType::LiabilityShortTermDebt, AccountType::LiabilityLongTermDebt],
                YearType::Py,
            ),
            decrease(&[AccountType::AssetInventory], YearType::Cy, YearType::Py),
            cf(CashFlowItem::StockBasedComp, YearType::Cy),
            by_id("TOTAL-ASSETS", 2),
        ];
        for formula in formulas {
            assert!(parse(&formula).is_ok(), "{}", formula);
        }
        assert_eq!(tb_sum(&[], YearType::Cy), "0");
    }
}
