//! Domain functions available to statement formulas.
//!
//! | function                 | result                                              |
//! |--------------------------|-----------------------------------------------------|
//! | `TBLOOKUP(account, year)`| trial-balance balance of `account` for `year`       |
//! | `GET_BY_ID(id, col)`     | value of row `id` at 0-based column `col`           |
//! | `SUMTAGCOL(tag, col)`    | sum of column `col` over rows tagged `tag`          |
//! | `IS_NETLOSS(year)`       | `NET-LOSS` row of the income statement for `year`   |
//! | `TB_NETLOSS(year)`       | `INCOME_STATEMENT` group total for `year`           |
//! | `CF(item, year)`         | cash-flow balance of `year` minus its preceding year|
//!
//! Arguments are validated strictly: wrong arity, wrong types, unknown
//! vocabulary and negative or fractional column indexes all fail with
//! [`StatementError::FormulaFunction`].

use super::ast::{Expression, Literal};
use super::evaluator::Value;
use crate::error::{Result, StatementError};
use crate::schema::{AccountType, CashFlowItem, YearType};

pub const TBLOOKUP: &str = "TBLOOKUP";
pub const GET_BY_ID: &str = "GET_BY_ID";
pub const SUMTAGCOL: &str = "SUMTAGCOL";
pub const IS_NETLOSS: &str = "IS_NETLOSS";
pub const TB_NETLOSS: &str = "TB_NETLOSS";
pub const CF: &str = "CF";

pub const CUSTOM_FUNCTIONS: [&str; 6] = [TBLOOKUP, GET_BY_ID, SUMTAGCOL, IS_NETLOSS, TB_NETLOSS, CF];

pub const BUILTIN_FUNCTIONS: [&str; 9] = ["SUM", "IF", "ABS", "ROUND", "MIN", "MAX", "AND", "OR", "NOT"];

/// Row id the income statement gives its bottom line.
pub const NET_LOSS_ROW_ID: &str = "NET-LOSS";

pub fn is_custom_function(name: &str) -> bool {
    CUSTOM_FUNCTIONS.contains(&name)
}

/// A custom-function call with validated arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum CustomCall {
    TbLookup { account: AccountType, year: YearType },
    GetById { row_id: String, col: usize },
    SumTagCol { tag: String, col: usize },
    IsNetLoss { year: YearType },
    TbNetLoss { year: YearType },
    Cf { item: CashFlowItem, year: YearType },
}

impl CustomCall {
    /// Validates evaluated arguments. Returns `None` when `name` is not a
    /// custom function.
    pub fn from_values(name: &str, args: &[Value]) -> Result<Option<CustomCall>> {
        let args = Args { function: name, values: args };
        let call = match name {
            TBLOOKUP => {
                args.arity(2)?;
                let account = args.text(0)?.parse::<AccountType>().map_err(|_| {
                    StatementError::function(name, format!("Unknown account type '{}'", args.raw_text(0)))
                })?;
                CustomCall::TbLookup {
                    account,
                    year: args.year(1)?,
                }
            }
            GET_BY_ID => {
                args.arity(2)?;
                CustomCall::GetById {
                    row_id: args.text(0)?.to_string(),
                    col: args.index(1)?,
                }
            }
            SUMTAGCOL => {
                args.arity(2)?;
                CustomCall::SumTagCol {
                    tag: args.text(0)?.to_string(),
                    col: args.index(1)?,
                }
            }
            IS_NETLOSS => {
                args.arity(1)?;
                CustomCall::IsNetLoss { year: args.year(0)? }
            }
            TB_NETLOSS => {
                args.arity(1)?;
                CustomCall::TbNetLoss { year: args.year(0)? }
            }
            CF => {
                args.arity(2)?;
                let item = args.text(0)?.parse::<CashFlowItem>().map_err(|_| {
                    StatementError::function(name, format!("Unknown cash flow item '{}'", args.raw_text(0)))
                })?;
                CustomCall::Cf {
                    item,
                    year: args.year(1)?,
                }
            }
            _ => return Ok(None),
        };
        Ok(Some(call))
    }

    /// Validates unevaluated arguments, which must all be literals. Used where
    /// a call is translated rather than evaluated.
    pub fn from_literals(name: &str, args: &[Expression]) -> Result<Option<CustomCall>> {
        if !is_custom_function(name) {
            return Ok(None);
        }
        let values = args
            .iter()
            .map(|arg| match arg {
                Expression::Literal(Literal::Number(n)) => Ok(Value::Number(*n)),
                Expression::Literal(Literal::String(s)) => Ok(Value::Text(s.clone())),
                Expression::Literal(Literal::Boolean(b)) => Ok(Value::Boolean(*b)),
                other => Err(StatementError::function(
                    name,
                    format!("Argument {} must be a literal to be translated", other),
                )),
            })
            .collect::<Result<Vec<_>>>()?;
        Self::from_values(name, &values)
    }

    pub fn name(&self) -> &'static str {
        match self {
            CustomCall::TbLookup { .. } => TBLOOKUP,
            CustomCall::GetById { .. } => GET_BY_ID,
            CustomCall::SumTagCol { .. } => SUMTAGCOL,
            CustomCall::IsNetLoss { .. } => IS_NETLOSS,
            CustomCall::TbNetLoss { .. } => TB_NETLOSS,
            CustomCall::Cf { .. } => CF,
        }
    }
}

struct Args<'v> {
    function: &'v str,
    values: &'v [Value],
}

impl<'v> Args<'v> {
    fn arity(&self, expected: usize) -> Result<()> {
        if self.values.len() == expected {
            Ok(())
        } else {
            Err(StatementError::function(
                self.function,
                format!(
                    "Expected {} argument(s), got {}",
                    expected,
                    self.values.len()
                ),
            ))
        }
    }

    fn text(&self, index: usize) -> Result<&'v str> {
        match &self.values[index] {
            Value::Text(s) => Ok(s),
            other => Err(StatementError::function(
                self.function,
                format!("Argument {} must be text, got {}", index + 1, other.type_name()),
            )),
        }
    }

    fn raw_text(&self, index: usize) -> String {
        self.values[index].as_text()
    }

    fn index(&self, index: usize) -> Result<usize> {
        match &self.values[index] {
            Value::Number(n) if *n >= 0.0 && n.fract() == 0.0 && n.is_finite() => Ok(*n as usize),
            Value::Number(n) => Err(StatementError::function(
                self.function,
                format!("Column index must be a non-negative integer, got {}", n),
            )),
            other => Err(StatementError::function(
                self.function,
                format!("Argument {} must be a number, got {}", index + 1, other.type_name()),
            )),
        }
    }

    fn year(&self, index: usize) -> Result<YearType> {
        let text = self.text(index)?;
        text.parse::<YearType>().map_err(|_| {
            StatementError::function(
                self.function,
                format!("Invalid year type '{}': expected CY, PY or PY2", text),
            )
        })
    }
}
