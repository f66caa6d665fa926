use thiserror::Error;

use crate::operators::OpId;

/// Why an expression failed to evaluate. Division by zero is not listed:
/// it follows IEEE-754 through to an infinite or NaN result.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("expression is empty")]
    EmptyExpression,
    #[error("numeric literal {0:?} does not parse")]
    BadNumber(String),
    #[error("operator {} is missing an operand", .0.as_str())]
    MissingOperand(OpId),
    #[error("expression leaves more than one value behind")]
    DanglingValues,
}
