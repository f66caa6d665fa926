use thiserror::Error;

/// Errors raised at the wire boundary when a relayed payload cannot be
/// mapped back into calculator terms.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProtocolError {
    /// A token string is neither a registered operator id nor a numeric
    /// literal.
    #[error("unrecognized token {0:?} in relayed payload")]
    UnknownToken(String),
}
