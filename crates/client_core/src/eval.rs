//! Stack-based operator-precedence evaluation of a flat token sequence.
//! No parse tree, no parentheses: a value stack and an operator stack,
//! scanned left to right.

use crate::error::EvalError;
use crate::operators::{OpEval, OpId};
use crate::token::Token;

/// Decimal places the published result is rounded to.
pub const ROUND_PLACES: usize = 15;

/// Evaluates the token sequence and rounds the result to [`ROUND_PLACES`]
/// decimal places. One-shot and stateless: nothing survives across calls.
pub fn calculate(tokens: &[Token]) -> Result<f64, EvalError> {
    Ok(round_to_places(evaluate(tokens)?, ROUND_PLACES))
}

fn evaluate(tokens: &[Token]) -> Result<f64, EvalError> {
    let mut values: Vec<f64> = Vec::new();
    let mut pending: Vec<OpId> = Vec::new();

    for token in tokens {
        match token {
            Token::Number(text) => {
                let value = text
                    .parse::<f64>()
                    .map_err(|_| EvalError::BadNumber(text.clone()))?;
                values.push(value);
            }
            Token::Operator(op) => {
                while let Some(&top) = pending.last() {
                    if !top.has_precedence(*op) {
                        break;
                    }
                    pending.pop();
                    apply(top, &mut values)?;
                }
                pending.push(*op);
            }
        }
    }

    while let Some(op) = pending.pop() {
        apply(op, &mut values)?;
    }

    let result = values.pop().ok_or(EvalError::EmptyExpression)?;
    if !values.is_empty() {
        return Err(EvalError::DanglingValues);
    }
    Ok(result)
}

fn apply(id: OpId, values: &mut Vec<f64>) -> Result<(), EvalError> {
    match id.operator().eval {
        OpEval::Unary(f) => {
            let operand = values.pop().ok_or(EvalError::MissingOperand(id))?;
            values.push(f(operand));
        }
        OpEval::Binary(f) => {
            // First pop is the right-hand operand; the value pushed earlier
            // is semantically first in the left-to-right expression.
            let rhs = values.pop().ok_or(EvalError::MissingOperand(id))?;
            let lhs = values.pop().ok_or(EvalError::MissingOperand(id))?;
            values.push(f(lhs, rhs));
        }
    }
    Ok(())
}

/// Standard rounding at `places` decimal digits. Non-finite values pass
/// through untouched.
pub fn round_to_places(value: f64, places: usize) -> f64 {
    if !value.is_finite() {
        return value;
    }
    format!("{value:.places$}").parse().unwrap_or(value)
}
