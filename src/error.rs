//! Error types for the signing core and the HTTP client layer

use std::fmt;

/// Errors produced by the cryptographic core.
///
/// `verify` reports a bad-but-well-formed signature as `Ok(false)`; errors
/// are reserved for inputs the core cannot process at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Private key hex failed to decode or is out of range.
    InvalidKey(String),
    /// Message hash out of the signable range, or r/s outside [1, N).
    InvalidHash(String),
    /// The deterministic nonce generator exhausted its retries. Transient;
    /// retry with a fresh client id.
    SigningFailure,
    /// The Pedersen accumulator collided with a constant point.
    UnhashableInput,
    /// A loaded constant failed validation. Fatal: the core is unusable.
    MalformedConstants(String),
    /// A request body cannot be rendered as a canonical signing string.
    Canonicalization(String),
    /// An instruction field does not fit its packed bit width.
    InvalidInstruction(String),
}

impl fmt::Display for CryptoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CryptoError::InvalidKey(s) => write!(f, "invalid private key: {}", s),
            CryptoError::InvalidHash(s) => write!(f, "invalid message hash: {}", s),
            CryptoError::SigningFailure => write!(f, "signing failed: nonce candidates exhausted"),
            CryptoError::UnhashableInput => write!(f, "unhashable input: constant point collision"),
            CryptoError::MalformedConstants(s) => write!(f, "malformed curve constants: {}", s),
            CryptoError::Canonicalization(s) => write!(f, "cannot canonicalize body: {}", s),
            CryptoError::InvalidInstruction(s) => write!(f, "invalid instruction: {}", s),
        }
    }
}

impl std::error::Error for CryptoError {}

/// Errors surfaced by the HTTP client.
#[derive(Debug)]
pub enum ClientError {
    Network(reqwest::Error),
    Json(serde_json::Error),
    Crypto(CryptoError),
    /// The exchange answered with a non-SUCCESS code.
    Api(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Network(err)
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Json(err)
    }
}

impl From<CryptoError> for ClientError {
    fn from(err: CryptoError) -> Self {
        ClientError::Crypto(err)
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Network(e) => write!(f, "network error: {}", e),
            ClientError::Json(e) => write!(f, "JSON error: {}", e),
            ClientError::Crypto(e) => write!(f, "crypto error: {}", e),
            ClientError::Api(code) => write!(f, "request failed with code: {}", code),
        }
    }
}

impl std::error::Error for ClientError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_forms() {
        let e = CryptoError::InvalidKey("bad hex".into());
        assert_eq!(e.to_string(), "invalid private key: bad hex");
        let c: ClientError = e.into();
        assert!(c.to_string().contains("bad hex"));
    }
}
