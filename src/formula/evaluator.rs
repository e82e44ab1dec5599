//! Evaluates formula trees against one [`Table`] and a [`FormulaContext`].
//!
//! Cell references call back into the table; formula and deferred cells are
//! evaluated recursively. Every cell under evaluation is kept on a stack so a
//! cell that is reached again through its own dependencies fails with
//! [`StatementError::CircularReference`] instead of recursing forever.
//!
//! Errors are never folded into values: a division by zero, a type mismatch
//! or an unknown function aborts the evaluation.

use super::ast::{BinaryOperator, CellReference, Expression, Literal, UnaryOperator};
use super::context::FormulaContext;
use super::functions::{CustomCall, NET_LOSS_ROW_ID};
use super::parser::parse;
use crate::error::{Result, StatementError};
use crate::schema::AccountGroup;
use crate::table::{Cell, CellValue, DeferredOp, Table};
use log::trace;
use std::cell::RefCell;
use std::cmp::Ordering;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Empty,
    Number(f64),
    Text(String),
    Boolean(bool),
    /// Cells of a range, row by row.
    Array(Vec<Value>),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Empty => "empty",
            Value::Number(_) => "number",
            Value::Text(_) => "text",
            Value::Boolean(_) => "boolean",
            Value::Array(_) => "range",
        }
    }

    /// Empty reads as zero and booleans as 1/0. Text and ranges are errors.
    pub fn as_number(&self) -> Result<f64> {
        match self {
            Value::Empty => Ok(0.0),
            Value::Number(n) => Ok(*n),
            Value::Boolean(b) => Ok(if *b { 1.0 } else { 0.0 }),
            other => Err(StatementError::Evaluation(format!(
                "Expected a number, got {}",
                other.type_name()
            ))),
        }
    }

    pub fn as_boolean(&self) -> Result<bool> {
        match self {
            Value::Empty => Ok(false),
            Value::Boolean(b) => Ok(*b),
            Value::Number(n) => Ok(*n != 0.0),
            Value::Text(s) if s.eq_ignore_ascii_case("TRUE") => Ok(true),
            Value::Text(s) if s.eq_ignore_ascii_case("FALSE") => Ok(false),
            other => Err(StatementError::Evaluation(format!(
                "Expected a boolean, got {}",
                other.type_name()
            ))),
        }
    }

    pub fn as_text(&self) -> String {
        self.to_string()
    }

    pub fn flatten(self) -> Vec<Value> {
        match self {
            Value::Array(items) => items.into_iter().flat_map(Value::flatten).collect(),
            other => vec![other],
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Empty => Ok(()),
            Value::Number(n) => write!(f, "{}", n),
            Value::Text(s) => f.write_str(s),
            Value::Boolean(b) => f.write_str(if *b { "TRUE" } else { "FALSE" }),
            Value::Array(items) => match items.first() {
                Some(first) => write!(f, "{}", first),
                None => Ok(()),
            },
        }
    }
}

pub struct Evaluator<'a> {
    table: &'a Table,
    context: FormulaContext<'a>,
    stack: RefCell<Vec<(u32, usize)>>,
}

impl<'a> Evaluator<'a> {
    pub fn new(table: &'a Table, context: FormulaContext<'a>) -> Self {
        Self {
            table,
            context,
            stack: RefCell::new(Vec::new()),
        }
    }

    pub fn table(&self) -> &'a Table {
        self.table
    }

    /// Parses and evaluates a formula that does not live in a cell.
    pub fn evaluate_formula(&self, formula: &str) -> Result<Value> {
        let expr = parse(formula)?;
        self.evaluate(&expr)
    }

    /// Value of the cell at (row number, column). Absent cells are empty.
    pub fn evaluate_cell(&self, row: u32, col: usize) -> Result<Value> {
        match self.table.get_cell(row, col) {
            Some(cell) => self.eval_cell(cell),
            None => Ok(Value::Empty),
        }
    }

    /// Numeric value of a cell; empty cells read as zero.
    pub fn number_at(&self, row: u32, col: usize) -> Result<f64> {
        self.evaluate_cell(row, col)?.as_number()
    }

    pub fn number_by_id(&self, row_id: &str, col: usize) -> Result<f64> {
        let cell = self.table.get_cell_by_id_and_col(row_id, col)?;
        self.eval_cell(cell)?.as_number()
    }

    pub fn eval_cell(&self, cell: &Cell) -> Result<Value> {
        match &cell.value {
            CellValue::Empty => Ok(Value::Empty),
            CellValue::Number(n) => Ok(Value::Number(*n)),
            CellValue::Text(s) => Ok(Value::Text(s.clone())),
            CellValue::Formula(formula) => self.on_stack(cell, || {
                trace!("Evaluating {} = {}", cell.address(), formula);
                let expr = parse(formula)?;
                self.evaluate(&expr)
            }),
            CellValue::Deferred(DeferredOp::AddColumnCellsByTag { tag }) => {
                self.on_stack(cell, || {
                    let total = self.table.add_column_cells_by_tag(cell.col(), tag, |c| {
                        self.eval_cell(c)?.as_number()
                    })?;
                    Ok(Value::Number(total))
                })
            }
        }
    }

    fn on_stack<T>(&self, cell: &Cell, eval: impl FnOnce() -> Result<T>) -> Result<T> {
        let key = (cell.row_number(), cell.col());
        if self.stack.borrow().contains(&key) {
            return Err(StatementError::CircularReference {
                address: cell.address(),
            });
        }
        self.stack.borrow_mut().push(key);
        let result = eval();
        self.stack.borrow_mut().pop();
        result
    }

    pub fn evaluate(&self, expr: &Expression) -> Result<Value> {
        match expr {
            Expression::Literal(literal) => Ok(match literal {
                Literal::Number(n) => Value::Number(*n),
                Literal::String(s) => Value::Text(s.clone()),
                Literal::Boolean(b) => Value::Boolean(*b),
            }),
            Expression::CellRef(reference) => {
                self.check_sheet(reference.sheet.as_deref())?;
                self.evaluate_cell(reference.row, reference.col_index()?)
            }
            Expression::Range { sheet, start, end } => {
                self.check_sheet(sheet.as_deref())?;
                self.eval_range(start, end)
            }
            Expression::BinaryOp { left, op, right } => {
                let left = self.evaluate(left)?;
                let right = self.evaluate(right)?;
                self.eval_binary_op(*op, &left, &right)
            }
            Expression::UnaryOp {
                op: UnaryOperator::Negate,
                operand,
            } => Ok(Value::Number(-self.evaluate(operand)?.as_number()?)),
            Expression::FunctionCall { name, args } => self.eval_function(name, args),
        }
    }

    fn check_sheet(&self, sheet: Option<&str>) -> Result<()> {
        match sheet {
            Some(sheet) if !sheet.eq_ignore_ascii_case(self.table.name()) => Err(
                StatementError::Evaluation(format!("Reference to another sheet '{}'", sheet)),
            ),
            _ => Ok(()),
        }
    }

    fn eval_range(&self, start: &CellReference, end: &CellReference) -> Result<Value> {
        let (first_row, last_row) = (start.row.min(end.row), start.row.max(end.row));
        let (start_col, end_col) = (start.col_index()?, end.col_index()?);
        let (first_col, last_col) = (start_col.min(end_col), start_col.max(end_col));

        let mut values = Vec::new();
        for row in first_row..=last_row {
            for col in first_col..=last_col {
                values.push(self.evaluate_cell(row, col)?);
            }
        }
        Ok(Value::Array(values))
    }

    fn eval_binary_op(&self, op: BinaryOperator, left: &Value, right: &Value) -> Result<Value> {
        let arithmetic = |f: fn(f64, f64) -> f64| -> Result<Value> {
            Ok(Value::Number(f(left.as_number()?, right.as_number()?)))
        };

        match op {
            BinaryOperator::Add => arithmetic(|a, b| a + b),
            BinaryOperator::Subtract => arithmetic(|a, b| a - b),
            BinaryOperator::Multiply => arithmetic(|a, b| a * b),
            BinaryOperator::Divide => {
                let divisor = right.as_number()?;
                if divisor == 0.0 {
                    return Err(StatementError::Evaluation("Division by zero".to_string()));
                }
                Ok(Value::Number(left.as_number()? / divisor))
            }
            BinaryOperator::Power => {
                let result = left.as_number()?.powf(right.as_number()?);
                if !result.is_finite() {
                    return Err(StatementError::Evaluation(format!(
                        "{} ^ {} is not a finite number",
                        left, right
                    )));
                }
                Ok(Value::Number(result))
            }
            BinaryOperator::Concat => Ok(Value::Text(format!("{}{}", left, right))),
            BinaryOperator::Equal => Ok(Value::Boolean(compare(left, right)? == Ordering::Equal)),
            BinaryOperator::NotEqual => {
                Ok(Value::Boolean(compare(left, right)? != Ordering::Equal))
            }
            BinaryOperator::LessThan => Ok(Value::Boolean(compare(left, right)? == Ordering::Less)),
            BinaryOperator::GreaterThan => {
                Ok(Value::Boolean(compare(left, right)? == Ordering::Greater))
            }
            BinaryOperator::LessEqual => {
                Ok(Value::Boolean(compare(left, right)? != Ordering::Greater))
            }
            BinaryOperator::GreaterEqual => {
                Ok(Value::Boolean(compare(left, right)? != Ordering::Less))
            }
        }
    }

    fn eval_function(&self, name: &str, args: &[Expression]) -> Result<Value> {
        match name {
            "SUM" => self.fn_sum(args),
            "IF" => self.fn_if(args),
            "ABS" => self.fn_abs(args),
            "ROUND" => self.fn_round(args),
            "MIN" => self.fn_min_max(name, args, f64::min),
            "MAX" => self.fn_min_max(name, args, f64::max),
            "AND" => self.fn_and(args),
            "OR" => self.fn_or(args),
            "NOT" => self.fn_not(args),
            _ => {
                let values = args
                    .iter()
                    .map(|arg| self.evaluate(arg))
                    .collect::<Result<Vec<_>>>()?;
                match CustomCall::from_values(name, &values)? {
                    Some(call) => self.eval_custom(call),
                    None => Err(StatementError::UnknownFunction(name.to_string())),
                }
            }
        }
    }

    fn eval_custom(&self, call: CustomCall) -> Result<Value> {
        let function = call.name();
        let context = &self.context;

        match call {
            CustomCall::TbLookup { account, year } => {
                let balances = context.trial_balance(year, function)?;
                Ok(Value::Number(balances.balance(account) as f64))
            }
            CustomCall::GetById { row_id, col } => {
                let cell = self.table.get_cell_by_id_and_col(&row_id, col)?;
                self.eval_cell(cell)
            }
            CustomCall::SumTagCol { tag, col } => {
                if self.table.get_rows_by_tag(&tag).is_empty() {
                    return Err(StatementError::function(
                        function,
                        format!("No rows tagged '{}'", tag),
                    ));
                }
                let total = self
                    .table
                    .add_column_cells_by_tag(col, &tag, |cell| self.eval_cell(cell)?.as_number())?;
                Ok(Value::Number(total))
            }
            CustomCall::IsNetLoss { year } => {
                let income_statement = context.income_statement.ok_or_else(|| {
                    StatementError::function(function, "No income statement is available")
                })?;
                let col = income_statement.year_column(year).ok_or_else(|| {
                    StatementError::function(
                        function,
                        format!("The income statement does not present {}", year),
                    )
                })?;
                let nested = Evaluator::new(income_statement, context.without_income_statement());
                Ok(Value::Number(nested.number_by_id(NET_LOSS_ROW_ID, col)?))
            }
            CustomCall::TbNetLoss { year } => {
                let balances = context.trial_balance(year, function)?;
                Ok(Value::Number(
                    balances.total_for(AccountGroup::IncomeStatement) as f64,
                ))
            }
            CustomCall::Cf { item, year } => {
                let preceding = year.preceding().ok_or_else(|| {
                    StatementError::function(
                        function,
                        format!("{} has no preceding year to compare against", year),
                    )
                })?;
                context.year_label(year, function)?;
                context.year_label(preceding, function)?;
                let delta = context.cash_flow.balance(year, item)
                    - context.cash_flow.balance(preceding, item);
                Ok(Value::Number(delta as f64))
            }
        }
    }

    /// Values in ranges are summed when numeric and skipped otherwise; direct
    /// arguments must be numeric.
    fn collect_numbers(&self, args: &[Expression]) -> Result<Vec<f64>> {
        let mut numbers = Vec::new();
        for arg in args {
            match self.evaluate(arg)? {
                Value::Array(items) => numbers.extend(
                    items
                        .into_iter()
                        .flat_map(Value::flatten)
                        .filter_map(|item| match item {
                            Value::Number(n) => Some(n),
                            _ => None,
                        }),
                ),
                value => numbers.push(value.as_number()?),
            }
        }
        Ok(numbers)
    }

    fn fn_sum(&self, args: &[Expression]) -> Result<Value> {
        Ok(Value::Number(self.collect_numbers(args)?.iter().sum()))
    }

    fn fn_min_max(&self, name: &str, args: &[Expression], pick: fn(f64, f64) -> f64) -> Result<Value> {
        expect_at_least(name, args, 1)?;
        let numbers = self.collect_numbers(args)?;
        Ok(Value::Number(numbers.into_iter().reduce(pick).unwrap_or(0.0)))
    }

    fn fn_if(&self, args: &[Expression]) -> Result<Value> {
        if args.len() < 2 || args.len() > 3 {
            return Err(arity_error("IF", "2 or 3", args.len()));
        }

        if self.evaluate(&args[0])?.as_boolean()? {
            self.evaluate(&args[1])
        } else if let Some(otherwise) = args.get(2) {
            self.evaluate(otherwise)
        } else {
            Ok(Value::Boolean(false))
        }
    }

    fn fn_and(&self, args: &[Expression]) -> Result<Value> {
        expect_at_least("AND", args, 1)?;
        for arg in args {
            if !self.evaluate(arg)?.as_boolean()? {
                return Ok(Value::Boolean(false));
            }
        }
        Ok(Value::Boolean(true))
    }

    fn fn_or(&self, args: &[Expression]) -> Result<Value> {
        expect_at_least("OR", args, 1)?;
        for arg in args {
            if self.evaluate(arg)?.as_boolean()? {
                return Ok(Value::Boolean(true));
            }
        }
        Ok(Value::Boolean(false))
    }

    fn fn_not(&self, args: &[Expression]) -> Result<Value> {
        if args.len() != 1 {
            return Err(arity_error("NOT", "1", args.len()));
        }
        Ok(Value::Boolean(!self.evaluate(&args[0])?.as_boolean()?))
    }

    fn fn_abs(&self, args: &[Expression]) -> Result<Value> {
        if args.len() != 1 {
            return Err(arity_error("ABS", "1", args.len()));
        }
        Ok(Value::Number(self.evaluate(&args[0])?.as_number()?.abs()))
    }

    fn fn_round(&self, args: &[Expression]) -> Result<Value> {
        if args.is_empty() || args.len() > 2 {
            return Err(arity_error("ROUND", "1 or 2", args.len()));
        }

        let num = self.evaluate(&args[0])?.as_number()?;
        let digits = match args.get(1) {
            Some(arg) => self.evaluate(arg)?.as_number()?.trunc(),
            None => 0.0,
        };
        if !(-MAX_ROUND_DIGITS..=MAX_ROUND_DIGITS).contains(&digits) {
            return Err(StatementError::function(
                "ROUND",
                format!(
                    "digits must be between -{0} and {0}, got {1}",
                    MAX_ROUND_DIGITS, digits
                ),
            ));
        }

        let multiplier = 10_f64.powi(digits as i32);
        let rounded = (num * multiplier).round() / multiplier;
        if !rounded.is_finite() {
            return Err(StatementError::function(
                "ROUND",
                format!("{} cannot be rounded to {} digits", num, digits),
            ));
        }
        Ok(Value::Number(rounded))
    }
}

/// Digits beyond this exceed `f64` precision.
const MAX_ROUND_DIGITS: f64 = 15.0;

fn expect_at_least(name: &str, args: &[Expression], min: usize) -> Result<()> {
    if args.len() < min {
        return Err(arity_error(name, &format!("at least {}", min), args.len()));
    }
    Ok(())
}

fn arity_error(name: &str, expected: &str, got: usize) -> StatementError {
    StatementError::Evaluation(format!(
        "{} expects {} argument(s), got {}",
        name, expected, got
    ))
}

/// Numbers compare numerically and text case-insensitively. An empty value
/// compares as zero against a number and as "" against text.
fn compare(left: &Value, right: &Value) -> Result<Ordering> {
    match (left, right) {
        (Value::Text(a), Value::Text(b)) => Ok(a.to_lowercase().cmp(&b.to_lowercase())),
        (Value::Text(a), Value::Empty) => Ok(a.as_str().cmp("")),
        (Value::Empty, Value::Text(b)) => Ok("".cmp(b.as_str())),
        (Value::Text(_), _) | (_, Value::Text(_)) | (Value::Array(_), _) | (_, Value::Array(_)) => {
            Err(StatementError::Evaluation(format!(
                "Cannot compare {} with {}",
                left.type_name(),
                right.type_name()
            )))
        }
        _ => {
            let (a, b) = (left.as_number()?, right.as_number()?);
            a.partial_cmp(&b).ok_or_else(|| {
                StatementError::Evaluation(format!("Cannot compare {} with {}", a, b))
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account_map::AccountMap;
    use crate::schema::{CashFlowData, CashFlowItem, YearMapping, YearType};
    use crate::table::RowOptions;
    use std::collections::BTreeMap;

    struct Fixture {
        years: YearMapping,
        trial_balances: BTreeMap<String, AccountMap>,
        cash_flow: CashFlowData,
    }

    impl Fixture {
        fn new() -> Self {
            let mut trial_balances = BTreeMap::new();
            trial_balances.insert(
                "2023".to_string(),
                AccountMap::from_entries([
                    ("ASSET_CASH_AND_CASH_EQUIVALENTS", 100_000),
                    ("ASSET_OTHER", 50_000),
                    ("INCOME_STATEMENT_REVENUE", -20_000),
                    ("INCOME_STATEMENT_GENERAL_AND_ADMINISTRATIVE", 45_000),
                ])
                .unwrap(),
            );
            trial_balances.insert("2022".to_string(), AccountMap::new());

            let mut cash_flow = CashFlowData::new();
            cash_flow.set_balance(YearType::Cy, CashFlowItem::StockBasedComp, 7_500);
            cash_flow.set_balance(YearType::Py, CashFlowItem::StockBasedComp, 2_500);

            Self {
                years: YearMapping::new("2023").with_prior("2022"),
                trial_balances,
                cash_flow,
            }
        }

        fn context(&self) -> FormulaContext<'_> {
            FormulaContext {
                years: &self.years,
                trial_balances: &self.trial_balances,
                cash_flow: &self.cash_flow,
                income_statement: None,
            }
        }
    }

    fn number(evaluator: &Evaluator, formula: &str) -> f64 {
        evaluator.evaluate_formula(formula).unwrap().as_number().unwrap()
    }

    #[test]
    fn test_arithmetic_and_builtins() {
        let fixture = Fixture::new();
        let table = Table::new("t");
        let evaluator = Evaluator::new(&table, fixture.context());

        assert_eq!(number(&evaluator, "=1+2*3"), 7.0);
        assert_eq!(number(&evaluator, "=-2^2"), 4.0);
        assert_eq!(number(&evaluator, "=-(2^2)"), -4.0);
        assert_eq!(number(&evaluator, "=2^3^2"), 64.0);
        assert_eq!(number(&evaluator, "=ABS(-5)"), 5.0);
        assert_eq!(number(&evaluator, "=ROUND(2.346,2)"), 2.35);
        assert_eq!(number(&evaluator, "=MAX(1,7,3)-MIN(4,2)"), 5.0);
        assert_eq!(number(&evaluator, "=IF(AND(1<2,NOT(FALSE)),10,20)"), 10.0);
        assert_eq!(
            evaluator.evaluate_formula("='a'&\"b\"").unwrap(),
            Value::Text("ab".to_string())
        );
        assert_eq!(
            evaluator.evaluate_formula("=\"CY\"=\"cy\"").unwrap(),
            Value::Boolean(true)
        );
    }

    #[test]
    fn test_hard_errors() {
        let fixture = Fixture::new();
        let table = Table::new("t");
        let evaluator = Evaluator::new(&table, fixture.context());

        assert!(matches!(
            evaluator.evaluate_formula("=1/0"),
            Err(StatementError::Evaluation(_))
        ));
        assert!(matches!(
            evaluator.evaluate_formula("=1+'x'"),
            Err(StatementError::Evaluation(_))
        ));
        assert!(matches!(
            evaluator.evaluate_formula("=VLOOKUP(1,2,3)"),
            Err(StatementError::UnknownFunction(name)) if name == "VLOOKUP"
        ));
        assert!(matches!(
            evaluator.evaluate_formula("=1+"),
            Err(StatementError::Parse(_))
        ));
        assert!(matches!(
            evaluator.evaluate_formula("=AAAAAAAAAAAAAAAA1"),
            Err(StatementError::Parse(_))
        ));
        assert!(evaluator.evaluate_formula("=SUM(A1:XFE1)").is_err());
    }

    #[test]
    fn test_round_digits_are_bounded() {
        let fixture = Fixture::new();
        let table = Table::new("t");
        let evaluator = Evaluator::new(&table, fixture.context());

        assert_eq!(number(&evaluator, "=ROUND(2.5,15)"), 2.5);
        for formula in ["=ROUND(2.5,400)", "=ROUND(2.5,-400)", "=ROUND(10^300,15)"] {
            assert!(
                matches!(
                    evaluator.evaluate_formula(formula),
                    Err(StatementError::FormulaFunction { ref function, .. }) if function == "ROUND"
                ),
                "{} should fail",
                formula
            );
        }
    }

    #[test]
    fn test_cell_references_and_ranges() {
        let fixture = Fixture::new();
        let mut table = Table::new("t");
        table
            .add_row(vec![CellValue::from("a"), 10.0.into()], RowOptions::new())
            .unwrap();
        table
            .add_row(vec![CellValue::from("b"), "=B1*2".into()], RowOptions::new())
            .unwrap();
        table
            .add_row(vec![CellValue::from("c"), "=SUM(B1:B2)+B9".into()], RowOptions::new())
            .unwrap();

        let evaluator = Evaluator::new(&table, fixture.context());
        assert_eq!(evaluator.number_at(3, 1).unwrap(), 30.0);
        assert_eq!(evaluator.number_at(40, 4).unwrap(), 0.0);
        assert_eq!(number(&evaluator, "='t'!B2"), 20.0);
        assert!(evaluator.evaluate_formula("='Other'!B2").is_err());
    }

    #[test]
    fn test_custom_functions() {
        let fixture = Fixture::new();
        let mut table = Table::new("t");
        table
            .add_row(
                vec![CellValue::from("Cash"), "=TBLOOKUP('ASSET_CASH_AND_CASH_EQUIVALENTS','CY')".into()],
                RowOptions::new().tag("current-assets"),
            )
            .unwrap();
        table
            .add_row(
                vec![CellValue::from("Other"), "=TBLOOKUP('ASSET_OTHER','CY')".into()],
                RowOptions::new().tag("current-assets"),
            )
            .unwrap();
        table
            .add_row(
                vec![CellValue::from("Total"), "=SUMTAGCOL('current-assets',1)".into()],
                RowOptions::new().id("TOTAL-CURRENT-ASSETS"),
            )
            .unwrap();

        let evaluator = Evaluator::new(&table, fixture.context());
        assert_eq!(evaluator.number_by_id("TOTAL-CURRENT-ASSETS", 1).unwrap(), 150_000.0);
        assert_eq!(number(&evaluator, "=GET_BY_ID('TOTAL-CURRENT-ASSETS',1)"), 150_000.0);
        assert_eq!(number(&evaluator, "=TBLOOKUP('ASSET_OTHER','PY')"), 0.0);
        assert_eq!(number(&evaluator, "=TB_NETLOSS('CY')"), 25_000.0);
        assert_eq!(number(&evaluator, "=CF('stockBasedComp','CY')"), 5_000.0);

        assert!(matches!(
            evaluator.evaluate_formula("=SUMTAGCOL('no-such-tag',1)"),
            Err(StatementError::FormulaFunction { function, .. }) if function == "SUMTAGCOL"
        ));
        assert!(matches!(
            evaluator.evaluate_formula("=CF('stockBasedComp','PY2')"),
            Err(StatementError::FormulaFunction { function, .. }) if function == "CF"
        ));
        assert!(matches!(
            evaluator.evaluate_formula("=CF('stockBasedComp','PY')"),
            Err(StatementError::FormulaFunction { function, .. }) if function == "CF"
        ));
        assert!(matches!(
            evaluator.evaluate_formula("=TBLOOKUP('ASSET_OTHER','PY2')"),
            Err(StatementError::FormulaFunction { .. })
        ));
        assert!(matches!(
            evaluator.evaluate_formula("=IS_NETLOSS('CY')"),
            Err(StatementError::FormulaFunction { .. })
        ));
    }

    #[test]
    fn test_is_netloss_reads_income_statement() {
        let fixture = Fixture::new();
        let mut income_statement = Table::new("Income Statement");
        income_statement.set_year_column(YearType::Cy, 1);
        income_statement
            .add_row(
                vec![CellValue::from("Net loss"), "=TB_NETLOSS('CY')".into()],
                RowOptions::new().id(NET_LOSS_ROW_ID),
            )
            .unwrap();

        let table = Table::new("t");
        let context = fixture.context().with_income_statement(&income_statement);
        let evaluator = Evaluator::new(&table, context);
        assert_eq!(number(&evaluator, "=IS_NETLOSS('CY')"), 25_000.0);
        assert!(evaluator.evaluate_formula("=IS_NETLOSS('PY')").is_err());
    }

    #[test]
    fn test_deferred_cells_sum_their_column() {
        let fixture = Fixture::new();
        let mut table = Table::new("t");
        table
            .add_row(vec![CellValue::from("a"), 4.0.into()], RowOptions::new().tag("x"))
            .unwrap();
        table
            .add_row(vec![CellValue::from("b"), "=B1*10".into()], RowOptions::new().tag("x"))
            .unwrap();
        table
            .add_row(
                vec![
                    CellValue::from("total"),
                    DeferredOp::AddColumnCellsByTag { tag: "x".to_string() }.into(),
                ],
                RowOptions::new(),
            )
            .unwrap();

        let evaluator = Evaluator::new(&table, fixture.context());
        assert_eq!(evaluator.number_at(3, 1).unwrap(), 44.0);
    }

    #[test]
    fn test_circular_references_are_detected() {
        let fixture = Fixture::new();
        let mut table = Table::new("t");
        table
            .add_row(vec![CellValue::from("a"), "=GET_BY_ID('B',1)".into()], RowOptions::new().id("A"))
            .unwrap();
        table
            .add_row(vec![CellValue::from("b"), "=GET_BY_ID('A',1)+1".into()], RowOptions::new().id("B"))
            .unwrap();
        table
            .add_row(vec![CellValue::from("c"), "=B3".into()], RowOptions::new())
            .unwrap();
        table
            .add_row(
                vec![CellValue::from("d"), "=SUMTAGCOL('loop',1)".into()],
                RowOptions::new().tag("loop"),
            )
            .unwrap();

        let evaluator = Evaluator::new(&table, fixture.context());
        assert!(matches!(
            evaluator.number_at(1, 1),
            Err(StatementError::CircularReference { address }) if address == "B1"
        ));
        assert!(matches!(
            evaluator.number_at(3, 1),
            Err(StatementError::CircularReference { address }) if address == "B3"
        ));
        assert!(matches!(
            evaluator.number_at(4, 1),
            Err(StatementError::CircularReference { .. })
        ));

        // The stack unwinds after a failure, so unrelated cells still evaluate.
        assert_eq!(number(&evaluator, "=1+1"), 2.0);
    }
}
