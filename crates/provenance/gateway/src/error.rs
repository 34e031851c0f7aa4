use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Errors returned by the ledger boundary.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("execution reverted: {0}")]
    Reverted(String),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("unknown event: {0}")]
    UnknownEvent(String),

    #[error("unsupported call: {0}")]
    Unsupported(String),

    #[error("subscription closed")]
    Closed,
}

/// A positional response did not have the expected shape.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("failed to decode {field}: {reason}")]
pub struct DecodeError {
    pub field: String,
    pub reason: String,
}

impl DecodeError {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Coarse category of a failed submission, for user-facing messaging.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "reason", rename_all = "snake_case")]
pub enum FailureKind {
    UserRejected,
    InsufficientFunds,
    Reverted(Option<String>),
    Network,
    Gas,
    Other,
}

impl FailureKind {
    pub fn from_error(error: &GatewayError) -> Self {
        match error {
            GatewayError::Reverted(reason) => FailureKind::Reverted(Some(reason.clone())),
            GatewayError::Transport(message) => match Self::classify(message) {
                FailureKind::Other => FailureKind::Network,
                other => other,
            },
            other => Self::classify(&other.to_string()),
        }
    }

    /// Classify a raw failure message from a wallet or node.
    pub fn classify(message: &str) -> Self {
        let lower = message.to_ascii_lowercase();
        if lower.contains("user rejected")
            || lower.contains("user denied")
            || lower.contains("action_rejected")
            || lower.contains("code=4001")
            || lower.contains("code: 4001")
        {
            return FailureKind::UserRejected;
        }
        if lower.contains("insufficient funds") {
            return FailureKind::InsufficientFunds;
        }
        if lower.contains("execution reverted") {
            return FailureKind::Reverted(revert_reason(message));
        }
        if lower.contains("network") {
            return FailureKind::Network;
        }
        if lower.contains("gas") {
            return FailureKind::Gas;
        }
        FailureKind::Other
    }
}

fn revert_reason(message: &str) -> Option<String> {
    const MARKER: &str = "reverted with reason string '";
    let start = message.find(MARKER)? + MARKER.len();
    let rest = &message[start..];
    let end = rest.find('\'')?;
    Some(rest[..end].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_user_rejection() {
        assert_eq!(
            FailureKind::classify("MetaMask Tx Signature: User denied transaction signature."),
            FailureKind::UserRejected
        );
        assert_eq!(FailureKind::classify("code=ACTION_REJECTED"), FailureKind::UserRejected);
    }

    #[test]
    fn extracts_revert_reason() {
        let kind = FailureKind::classify(
            "Error: VM Exception: execution reverted with reason string 'Warranty expired'",
        );
        assert_eq!(kind, FailureKind::Reverted(Some("Warranty expired".into())));
        assert_eq!(
            FailureKind::classify("execution reverted"),
            FailureKind::Reverted(None)
        );
    }

    #[test]
    fn transport_errors_default_to_network() {
        let error = GatewayError::Transport("connection refused".into());
        assert_eq!(FailureKind::from_error(&error), FailureKind::Network);
    }

    #[test]
    fn classifies_funds_and_gas() {
        assert_eq!(
            FailureKind::classify("insufficient funds for intrinsic transaction cost"),
            FailureKind::InsufficientFunds
        );
        assert_eq!(
            FailureKind::classify("cannot estimate gas"),
            FailureKind::Gas
        );
        assert_eq!(FailureKind::classify("boom"), FailureKind::Other);
    }
}
