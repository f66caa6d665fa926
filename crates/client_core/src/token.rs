use shared::error::ProtocolError;

use crate::operators::OpId;

/// Atomic unit of the expression under construction: a numeric literal kept
/// as entered (digits plus at most one `.`), or a registered operator.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Number(String),
    Operator(OpId),
}

impl Token {
    /// Display form: literal text for numbers, registry symbol for operators.
    pub fn display_fragment(&self) -> &str {
        match self {
            Token::Number(text) => text,
            Token::Operator(id) => id.symbol(),
        }
    }

    /// Wire form: literal text for numbers, operator id for operators.
    pub fn wire_text(&self) -> &str {
        match self {
            Token::Number(text) => text,
            Token::Operator(id) => id.as_str(),
        }
    }

    /// Resolves a wire token back into tagged form. Operator ids win over
    /// numeric parsing; anything else is rejected rather than carried
    /// through to the evaluator.
    pub fn from_wire(text: &str) -> Result<Token, ProtocolError> {
        if let Some(id) = OpId::from_id(text) {
            return Ok(Token::Operator(id));
        }
        if text.parse::<f64>().is_ok() {
            return Ok(Token::Number(text.to_string()));
        }
        Err(ProtocolError::UnknownToken(text.to_string()))
    }
}

pub fn to_wire(tokens: &[Token]) -> Vec<String> {
    tokens.iter().map(|t| t.wire_text().to_string()).collect()
}

pub fn from_wire(texts: &[String]) -> Result<Vec<Token>, ProtocolError> {
    texts.iter().map(|text| Token::from_wire(text)).collect()
}
