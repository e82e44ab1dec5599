//! Formula syntax tree.
//!
//! `Display` writes spreadsheet-native text: strings double-quoted, sheet names
//! single-quoted, and only the parentheses that precedence requires.

use crate::coord::col_to_index;
use crate::error::Result;
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, PartialEq, Clone)]
pub enum Literal {
    Number(f64),
    String(String),
    Boolean(bool),
}

/// A single-cell reference such as `B7`, `$C$12` or `'Trial Balance'!C3`.
#[derive(Debug, PartialEq, Clone)]
pub struct CellReference {
    pub sheet: Option<String>,
    /// Column letters, upper-case.
    pub col: String,
    /// 1-based row number.
    pub row: u32,
    pub col_absolute: bool,
    pub row_absolute: bool,
}

impl CellReference {
    pub fn new(col: impl Into<String>, row: u32) -> Self {
        Self {
            sheet: None,
            col: col.into(),
            row,
            col_absolute: false,
            row_absolute: false,
        }
    }

    pub fn absolute(mut self) -> Self {
        self.col_absolute = true;
        self.row_absolute = true;
        self
    }

    pub fn on_sheet(mut self, sheet: impl Into<String>) -> Self {
        self.sheet = Some(sheet.into());
        self
    }

    pub fn col_index(&self) -> Result<usize> {
        col_to_index(&self.col)
    }

    fn fmt_local(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.col_absolute {
            f.write_str("$")?;
        }
        f.write_str(&self.col)?;
        if self.row_absolute {
            f.write_str("$")?;
        }
        write!(f, "{}", self.row)
    }
}

impl fmt::Display for CellReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(sheet) = &self.sheet {
            write_sheet_prefix(f, sheet)?;
        }
        self.fmt_local(f)
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum Expression {
    Literal(Literal),
    CellRef(CellReference),
    /// `start:end`; the sheet, when present, applies to both corners.
    Range {
        sheet: Option<String>,
        start: CellReference,
        end: CellReference,
    },
    BinaryOp {
        left: Box<Expression>,
        op: BinaryOperator,
        right: Box<Expression>,
    },
    UnaryOp {
        op: UnaryOperator,
        operand: Box<Expression>,
    },
    FunctionCall {
        name: String,
        args: Vec<Expression>,
    },
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum BinaryOperator {
    Equal,
    NotEqual,
    LessThan,
    GreaterThan,
    LessEqual,
    GreaterEqual,
    Concat,
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
}

impl BinaryOperator {
    fn precedence(&self) -> u8 {
        match self {
            BinaryOperator::Equal
            | BinaryOperator::NotEqual
            | BinaryOperator::LessThan
            | BinaryOperator::GreaterThan
            | BinaryOperator::LessEqual
            | BinaryOperator::GreaterEqual => 1,
            BinaryOperator::Concat => 2,
            BinaryOperator::Add | BinaryOperator::Subtract => 3,
            BinaryOperator::Multiply | BinaryOperator::Divide => 4,
            BinaryOperator::Power => 5,
        }
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BinaryOperator::Equal => "=",
            BinaryOperator::NotEqual => "<>",
            BinaryOperator::LessThan => "<",
            BinaryOperator::GreaterThan => ">",
            BinaryOperator::LessEqual => "<=",
            BinaryOperator::GreaterEqual => ">=",
            BinaryOperator::Concat => "&",
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Power => "^",
        })
    }
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum UnaryOperator {
    Negate,
}

const UNARY_PRECEDENCE: u8 = 6;
const ATOM_PRECEDENCE: u8 = 7;

/// Replaces function calls while an expression is rebuilt bottom-up.
pub trait FormulaRewriter {
    /// Returns the replacement for a call whose arguments have already been
    /// rewritten, or `None` to keep the call as it is.
    fn rewrite_call(&mut self, name: &str, args: &[Expression]) -> Result<Option<Expression>>;
}

impl Expression {
    pub fn number(value: f64) -> Self {
        Expression::Literal(Literal::Number(value))
    }

    pub fn string(value: impl Into<String>) -> Self {
        Expression::Literal(Literal::String(value.into()))
    }

    pub fn call(name: impl Into<String>, args: Vec<Expression>) -> Self {
        Expression::FunctionCall {
            name: name.into(),
            args,
        }
    }

    pub fn binary(left: Expression, op: BinaryOperator, right: Expression) -> Self {
        Expression::BinaryOp {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    /// Names of every function called anywhere in the expression.
    pub fn function_names(&self) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        self.collect_function_names(&mut names);
        names
    }

    fn collect_function_names(&self, names: &mut BTreeSet<String>) {
        match self {
            Expression::FunctionCall { name, args } => {
                names.insert(name.clone());
                for arg in args {
                    arg.collect_function_names(names);
                }
            }
            Expression::BinaryOp { left, right, .. } => {
                left.collect_function_names(names);
                right.collect_function_names(names);
            }
            Expression::UnaryOp { operand, .. } => operand.collect_function_names(names),
            Expression::Literal(_) | Expression::CellRef(_) | Expression::Range { .. } => {}
        }
    }

    pub fn rewrite<R: FormulaRewriter + ?Sized>(self, rewriter: &mut R) -> Result<Expression> {
        Ok(match self {
            Expression::FunctionCall { name, args } => {
                let args = args
                    .into_iter()
                    .map(|arg| arg.rewrite(rewriter))
                    .collect::<Result<Vec<_>>>()?;
                match rewriter.rewrite_call(&name, &args)? {
                    Some(replacement) => replacement,
                    None => Expression::FunctionCall { name, args },
                }
            }
            Expression::BinaryOp { left, op, right } => Expression::BinaryOp {
                left: Box::new(left.rewrite(rewriter)?),
                op,
                right: Box::new(right.rewrite(rewriter)?),
            },
            Expression::UnaryOp { op, operand } => Expression::UnaryOp {
                op,
                operand: Box::new(operand.rewrite(rewriter)?),
            },
            other => other,
        })
    }

    fn precedence(&self) -> u8 {
        match self {
            Expression::BinaryOp { op, .. } => op.precedence(),
            Expression::UnaryOp { .. } => UNARY_PRECEDENCE,
            _ => ATOM_PRECEDENCE,
        }
    }

    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>, parenthesize: bool) -> fmt::Result {
        if parenthesize {
            write!(f, "({})", self)
        } else {
            write!(f, "{}", self)
        }
    }
}

fn write_sheet_prefix(f: &mut fmt::Formatter<'_>, sheet: &str) -> fmt::Result {
    write!(f, "'{}'!", sheet.replace('\'', "''"))
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Literal(Literal::Number(n)) => write!(f, "{}", n),
            Expression::Literal(Literal::String(s)) => write!(f, "\"{}\"", s.replace('"', "\"\"")),
            Expression::Literal(Literal::Boolean(b)) => {
                f.write_str(if *b { "TRUE" } else { "FALSE" })
            }
            Expression::CellRef(reference) => write!(f, "{}", reference),
            Expression::Range { sheet, start, end } => {
                if let Some(sheet) = sheet {
                    write_sheet_prefix(f, sheet)?;
                }
                start.fmt_local(f)?;
                f.write_str(":")?;
                end.fmt_local(f)
            }
            Expression::BinaryOp { left, op, right } => {
                let precedence = op.precedence();
                let (left_paren, right_paren) = (
                    left.precedence() < precedence,
                    right.precedence() <= precedence,
                );
                left.fmt_operand(f, left_paren)?;
                write!(f, "{}", op)?;
                right.fmt_operand(f, right_paren)
            }
            Expression::UnaryOp {
                op: UnaryOperator::Negate,
                operand,
            } => {
                f.write_str("-")?;
                operand.fmt_operand(f, operand.precedence() < UNARY_PRECEDENCE)
            }
            Expression::FunctionCall { name, args } => {
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", arg)?;
                }
                f.write_str(")")
            }
        }
    }
}
