//! Structural errors: the ones raised synchronously out of a mutation,
//! distinct from the [`crate::value::EvalError`] channel that flows through
//! formula results instead.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SheetError {
    #[error("position is out of range")]
    InvalidPosition,

    #[error("formula does not parse: {0}")]
    ParsingError(String),

    #[error("invalid cell reference in formula: {0}")]
    FormulaException(String),

    #[error("circular dependency detected")]
    CircularDependency,
}

pub type Result<T> = std::result::Result<T, SheetError>;
