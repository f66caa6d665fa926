use serde::{Deserialize, Serialize};

/// Payload of a computed result. Sent by a client as a `history` event and
/// echoed verbatim by the relay to every connected client, the sender
/// included, as `historyLogged`.
///
/// Tokens travel as plain strings: operator ids (`"multiply"`, `"negate"`,
/// ...) or numeric literals exactly as entered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryPayload {
    pub result: f64,
    pub expression_text: String,
    pub tokens: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum ClientMessage {
    History(HistoryPayload),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum ServerEvent {
    HistoryLogged(HistoryPayload),
}
