//! In-memory statement table: rows, columns and addressable cells.
//!
//! Rows are numbered from 1 in append order and may carry a unique string id
//! and a set of tags. Columns are indexed from 0 and only carry default styles.
//! Cell values are literals, formula strings (leading `=`) or deferred
//! operations that are resolved when the cell is read.

use crate::coord::{cell_address, index_to_col};
use crate::error::{Result, StatementError};
use crate::schema::YearType;
use crate::style::{resolve_style, Style};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Rows carrying this tag may be suppressed by renderers when every figure is zero.
pub const HIDE_IF_ZERO: &str = "hide-if-zero";

/// Work attached to a cell and performed on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "camelCase")]
pub enum DeferredOp {
    /// Sum of this cell's column over every row carrying `tag`.
    AddColumnCellsByTag { tag: String },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum CellValue {
    #[default]
    Empty,
    Number(f64),
    Text(String),
    Formula(String),
    Deferred(DeferredOp),
}

impl CellValue {
    pub fn formula(&self) -> Option<&str> {
        match self {
            CellValue::Formula(formula) => Some(formula),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Number(value as f64)
    }
}

impl From<i32> for CellValue {
    fn from(value: i32) -> Self {
        CellValue::Number(value as f64)
    }
}

/// Strings beginning with `=` become formulas; the empty string is an empty cell.
impl From<String> for CellValue {
    fn from(value: String) -> Self {
        if value.starts_with('=') {
            CellValue::Formula(value)
        } else if value.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(value)
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::from(value.to_string())
    }
}

impl From<DeferredOp> for CellValue {
    fn from(op: DeferredOp) -> Self {
        CellValue::Deferred(op)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    row: u32,
    col: usize,
    pub value: CellValue,
    pub style: Style,
}

impl Cell {
    fn new(row: u32, col: usize, value: CellValue, style: Style) -> Self {
        Self {
            row,
            col,
            value,
            style,
        }
    }

    pub fn row_number(&self) -> u32 {
        self.row
    }

    pub fn col(&self) -> usize {
        self.col
    }

    pub fn address(&self) -> String {
        cell_address(self.row, self.col)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    number: u32,
    id: Option<String>,
    pub tags: BTreeSet<String>,
    pub style: Style,
    cells: Vec<Cell>,
}

impl Row {
    fn new(number: u32) -> Self {
        Self {
            number,
            id: None,
            tags: BTreeSet::new(),
            style: Style::default(),
            cells: Vec::new(),
        }
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    pub fn cell(&self, col: usize) -> Option<&Cell> {
        self.cells.get(col)
    }

    pub fn cell_mut(&mut self, col: usize) -> Option<&mut Cell> {
        self.cells.get_mut(col)
    }

    /// Writes `value` at `col`, padding any gap with empty cells.
    pub fn set_cell(&mut self, col: usize, value: impl Into<CellValue>) -> &mut Cell {
        while self.cells.len() <= col {
            let next = self.cells.len();
            self.cells
                .push(Cell::new(self.number, next, CellValue::Empty, Style::default()));
        }
        let cell = &mut self.cells[col];
        cell.value = value.into();
        cell
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    pub fn add_tag(&mut self, tag: impl Into<String>) {
        self.tags.insert(tag.into());
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Column {
    index: usize,
    pub style: Style,
    pub width: Option<f64>,
}

impl Column {
    fn new(index: usize) -> Self {
        Self {
            index,
            style: Style::default(),
            width: None,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn letter(&self) -> String {
        index_to_col(self.index)
    }
}

/// Options for [`Table::add_row`].
#[derive(Debug, Clone, Default)]
pub struct RowOptions {
    pub id: Option<String>,
    pub tags: Vec<String>,
    pub style: Style,
    pub cell_style: Style,
}

impl RowOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn cell_style(mut self, style: Style) -> Self {
        self.cell_style = style;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    name: String,
    rows: Vec<Row>,
    columns: Vec<Column>,
    year_columns: BTreeMap<YearType, usize>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn last_row(&self) -> Option<&Row> {
        self.rows.last()
    }

    /// Appends a row at the next row number.
    ///
    /// Fails with [`StatementError::DuplicateRowId`] before touching the table
    /// when `options.id` is already taken.
    pub fn add_row<I, V>(&mut self, values: I, options: RowOptions) -> Result<&mut Row>
    where
        I: IntoIterator<Item = V>,
        V: Into<CellValue>,
    {
        if let Some(id) = &options.id {
            if self.rows.iter().any(|row| row.id() == Some(id.as_str())) {
                return Err(StatementError::DuplicateRowId(id.clone()));
            }
        }

        let number = self.rows.len() as u32 + 1;
        let mut row = Row::new(number);
        row.id = options.id;
        row.tags = options.tags.into_iter().collect();
        row.style = options.style;
        row.cells = values
            .into_iter()
            .enumerate()
            .map(|(col, value)| Cell::new(number, col, value.into(), options.cell_style.clone()))
            .collect();

        if row.cells.len() > self.columns.len() {
            self.get_column(row.cells.len() - 1);
        }

        let index = self.rows.len();
        self.rows.push(row);
        Ok(&mut self.rows[index])
    }

    pub fn row(&self, number: u32) -> Option<&Row> {
        if number == 0 {
            return None;
        }
        self.rows.get(number as usize - 1)
    }

    /// Returns row `number`, materializing it (and any gap before it) if absent.
    pub fn get_row(&mut self, number: u32) -> Result<&mut Row> {
        if number == 0 {
            return Err(StatementError::InvalidCoordinate(
                "row numbers start at 1".to_string(),
            ));
        }
        while (self.rows.len() as u32) < number {
            let next = self.rows.len() as u32 + 1;
            self.rows.push(Row::new(next));
        }
        Ok(&mut self.rows[number as usize - 1])
    }

    pub fn column(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    /// Returns column `index`, materializing it (and any gap before it) if absent.
    pub fn get_column(&mut self, index: usize) -> &mut Column {
        while self.columns.len() <= index {
            let next = self.columns.len();
            self.columns.push(Column::new(next));
        }
        &mut self.columns[index]
    }

    pub fn get_row_by_id(&self, id: &str) -> Result<&Row> {
        self.rows
            .iter()
            .find(|row| row.id() == Some(id))
            .ok_or_else(|| StatementError::RowNotFound(id.to_string()))
    }

    pub fn get_cell(&self, row: u32, col: usize) -> Option<&Cell> {
        self.row(row).and_then(|row| row.cell(col))
    }

    pub fn get_cell_by_id_and_col(&self, id: &str, col: usize) -> Result<&Cell> {
        let row = self.get_row_by_id(id)?;
        row.cell(col).ok_or_else(|| StatementError::CellNotFound {
            address: cell_address(row.number(), col),
        })
    }

    /// Writes a cell, materializing its row and column as needed.
    pub fn set_cell(
        &mut self,
        row: u32,
        col: usize,
        value: impl Into<CellValue>,
    ) -> Result<&mut Cell> {
        self.get_column(col);
        Ok(self.get_row(row)?.set_cell(col, value))
    }

    pub fn get_rows_by_tag(&self, tag: &str) -> Vec<&Row> {
        self.rows.iter().filter(|row| row.has_tag(tag)).collect()
    }

    /// Spreadsheet reference covering `col` of `rows`: `"A2:A4"` when the row
    /// numbers are contiguous and ascending, otherwise `"A2,A4,A7"` so that a
    /// `SUM` over the result never picks up rows in between.
    pub fn get_address_range(&self, col: usize, rows: &[&Row], row_offset: u32) -> String {
        let numbers: Vec<u32> = rows.iter().map(|row| row.number() + row_offset).collect();

        let contiguous = numbers.windows(2).all(|pair| pair[1] == pair[0] + 1);

        match numbers.as_slice() {
            [] => String::new(),
            [single] => cell_address(*single, col),
            [first, .., last] if contiguous => {
                format!("{}:{}", cell_address(*first, col), cell_address(*last, col))
            }
            _ => numbers
                .iter()
                .map(|number| cell_address(*number, col))
                .collect::<Vec<_>>()
                .join(","),
        }
    }

    /// Copies the style of column `source` and every row's `source` cell into `target`.
    pub fn duplicate_column(&mut self, source: usize, target: usize) {
        let style = self
            .columns
            .get(source)
            .map(|column| column.style.clone())
            .unwrap_or_default();
        self.get_column(target).style = style;

        for row in &mut self.rows {
            if let Some(original) = row.cell(source).cloned() {
                let copy = row.set_cell(target, original.value);
                copy.style = original.style;
            }
        }
    }

    /// Sums column `col` over every row tagged `tag`, reading each cell through
    /// `value_of`. Rows without a cell in that column contribute nothing.
    ///
    /// The evaluator passes a closure that evaluates formulas recursively;
    /// callers holding only literals can pass
    /// `|cell| Ok(cell.value.as_number().unwrap_or(0.0))`.
    pub fn add_column_cells_by_tag<F>(&self, col: usize, tag: &str, mut value_of: F) -> Result<f64>
    where
        F: FnMut(&Cell) -> Result<f64>,
    {
        let mut total = 0.0;
        for row in self.get_rows_by_tag(tag) {
            if let Some(cell) = row.cell(col) {
                total += value_of(cell)?;
            }
        }
        Ok(total)
    }

    /// Column, row and cell styles folded into one, cell winning.
    pub fn effective_style(&self, row: u32, col: usize) -> Style {
        let default = Style::default();
        let column_style = self.column(col).map(|c| &c.style).unwrap_or(&default);
        let Some(row) = self.row(row) else {
            return column_style.clone();
        };
        let cell_style = row.cell(col).map(|c| &c.style).unwrap_or(&default);
        resolve_style(column_style, &row.style, cell_style)
    }

    pub fn set_year_column(&mut self, year: YearType, col: usize) {
        self.year_columns.insert(year, col);
    }

    pub fn year_column(&self, year: YearType) -> Option<usize> {
        self.year_columns.get(&year).copied()
    }

    /// Presented years and their columns, in column order.
    pub fn year_columns(&self) -> Vec<(YearType, usize)> {
        let mut columns: Vec<(YearType, usize)> =
            self.year_columns.iter().map(|(y, c)| (*y, *c)).collect();
        columns.sort_by_key(|(_, col)| *col);
        columns
    }
}
