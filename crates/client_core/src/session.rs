//! The per-client calculator state machine. Owns the expression editor, the
//! shared-history mirror and the display line; owns no I/O. Everything the
//! UI can do arrives through [`CalcSession::handle_input`], and everything
//! the relay echoes back arrives through [`CalcSession::apply_history_event`].

use shared::error::ProtocolError;
use shared::protocol::HistoryPayload;

use crate::editor::ExpressionEditor;
use crate::error::EvalError;
use crate::eval;
use crate::history::{HistoryEntry, HistoryLog};
use crate::operators::OpId;
use crate::token;

/// One key press or UI action, already resolved to calculator vocabulary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Digit(char),
    Period,
    Op(OpId),
    Equals,
    Delete,
    /// Clears the expression if one is in progress, else the history log.
    Clear,
    /// Restores the tokens of the history entry at this newest-first index.
    Recall(usize),
}

/// What a command did, so the caller knows whether there is anything to
/// publish.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    /// Local state changed (or the command was a no-op); nothing to send.
    Edited,
    /// `Equals` produced a payload for the relay. Local state is untouched
    /// until the echo comes back; there is no direct local echo.
    Publish(HistoryPayload),
}

#[derive(Debug, Default)]
pub struct CalcSession {
    editor: ExpressionEditor,
    history: HistoryLog,
    display: String,
}

impl CalcSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn display(&self) -> &str {
        &self.display
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    pub fn tokens(&self) -> &[token::Token] {
        self.editor.tokens()
    }

    pub fn handle_input(&mut self, command: Command) -> Result<CommandOutcome, EvalError> {
        match command {
            Command::Digit(digit) => {
                self.editor.press_digit(digit);
            }
            Command::Period => {
                self.editor.press_period();
            }
            Command::Op(id) => {
                self.editor.press_operator(id);
            }
            Command::Delete => {
                self.editor.delete_last();
            }
            Command::Clear => {
                if self.editor.is_empty() {
                    self.history.clear();
                } else {
                    self.editor.clear();
                }
            }
            Command::Recall(index) => {
                if let Some(entry) = self.history.entry(index) {
                    let tokens = entry.tokens.clone();
                    self.editor.restore(tokens);
                }
            }
            Command::Equals => {
                let result = eval::calculate(self.editor.tokens())?;
                return Ok(CommandOutcome::Publish(HistoryPayload {
                    result,
                    expression_text: self.editor.render_expression(),
                    tokens: token::to_wire(self.editor.tokens()),
                }));
            }
        }
        self.display = self.editor.render_expression();
        Ok(CommandOutcome::Edited)
    }

    /// Applies a `historyLogged` echo: the display takes the result and the
    /// entry joins the log. The token list is left as typed, matching the
    /// original client's behavior after equals.
    pub fn apply_history_event(&mut self, payload: &HistoryPayload) -> Result<(), ProtocolError> {
        let tokens = token::from_wire(&payload.tokens)?;
        self.display = format_result(payload.result);
        self.history.push(HistoryEntry {
            result: payload.result,
            expression_text: payload.expression_text.clone(),
            tokens,
        });
        Ok(())
    }
}

/// Display form of a result; integral values print without a fraction part.
pub fn format_result(value: f64) -> String {
    value.to_string()
}
