//! Formula language: lexing, parsing, rewriting and evaluation.

pub mod ast;
pub mod context;
pub mod evaluator;
pub mod functions;
pub mod lexer;
pub mod parser;
pub mod token;

pub use ast::{BinaryOperator, CellReference, Expression, FormulaRewriter, Literal, UnaryOperator};
pub use context::FormulaContext;
pub use evaluator::{Evaluator, Value};
pub use functions::{CustomCall, BUILTIN_FUNCTIONS, CUSTOM_FUNCTIONS};
pub use parser::{parse, ParseError, ParseResult};
