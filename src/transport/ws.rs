//! Private-stream handshake signing
//!
//! The streaming endpoint authenticates exactly like an HTTP request: the
//! handshake is a signed GET whose path keeps the account query inline,
//! `/api/v1/private/ws?accountId=<id>`. Everything past the handshake
//! (reconnection, subscriptions, heartbeats) belongs to the enclosing
//! application; the session here only tracks the lifecycle state.

use crate::error::CryptoError;
use crate::transport::signer::{RequestSigner, SignedHeaders};

/// The handshake path for an account's private stream.
pub fn private_stream_path(account_id: i64) -> String {
    format!("/api/v1/private/ws?accountId={}", account_id)
}

/// Lifecycle of a streaming session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connected,
    Closed,
}

/// A streaming session: handshake signing plus lifecycle bookkeeping.
pub struct StreamSession {
    account_id: i64,
    state: SessionState,
}

impl StreamSession {
    pub fn new(account_id: i64) -> Self {
        Self {
            account_id,
            state: SessionState::Disconnected,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Signs the handshake for a dial at the given timestamp. The query
    /// stays inside the path string; there is no body.
    pub fn handshake_headers_at(
        &self,
        signer: &RequestSigner,
        timestamp_ms: u64,
    ) -> Result<SignedHeaders, CryptoError> {
        let path = private_stream_path(self.account_id);
        signer.sign_request_at(timestamp_ms, "GET", &path, None, None)
    }

    /// Signs the handshake at the current time.
    pub fn handshake_headers(&self, signer: &RequestSigner) -> Result<SignedHeaders, CryptoError> {
        let path = private_stream_path(self.account_id);
        signer.sign_request("GET", &path, None, None)
    }

    /// Records a successful dial. Only a disconnected session may connect.
    pub fn mark_connected(&mut self) -> bool {
        if self.state == SessionState::Disconnected {
            self.state = SessionState::Connected;
            true
        } else {
            false
        }
    }

    /// Closes the session; terminal.
    pub fn close(&mut self) {
        self.state = SessionState::Closed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::ecdsa::Keypair;
    use crate::transport::signer::RequestSigner;

    #[test]
    fn path_keeps_query_inline() {
        assert_eq!(
            private_stream_path(551109972447567873),
            "/api/v1/private/ws?accountId=551109972447567873"
        );
    }

    #[test]
    fn handshake_signs_like_a_get() {
        let signer = RequestSigner::new(Keypair::from_hex("1").unwrap());
        let session = StreamSession::new(42);
        let via_session = session.handshake_headers_at(&signer, 1_700_000_000_000).unwrap();
        let direct = signer
            .sign_request_at(
                1_700_000_000_000,
                "GET",
                "/api/v1/private/ws?accountId=42",
                None,
                None,
            )
            .unwrap();
        assert_eq!(via_session, direct);
    }

    #[test]
    fn lifecycle_transitions() {
        let mut session = StreamSession::new(1);
        assert_eq!(session.state(), SessionState::Disconnected);
        assert!(session.mark_connected());
        assert_eq!(session.state(), SessionState::Connected);
        assert!(!session.mark_connected());
        session.close();
        assert_eq!(session.state(), SessionState::Closed);
        assert!(!session.mark_connected());
    }
}
