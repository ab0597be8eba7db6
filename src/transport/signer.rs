//! The request-signing envelope
//!
//! Every outbound request carries two headers: the millisecond timestamp
//! and a curve signature over the canonical string
//! `timestamp + METHOD + path + payload`, where the payload is the
//! canonical body if one exists, else the sorted query, else nothing. The
//! string is Keccak-256 hashed, reduced into the scalar field, and signed
//! deterministically, so a fixed request at a fixed timestamp always
//! produces the same headers.

use std::time::{SystemTime, UNIX_EPOCH};

use sha3::{Digest, Keccak256};
use tracing::debug;

use crate::bigint::BigInt;
use crate::curve::ecdsa::Keypair;
use crate::curve::field::{CurveOrder, FieldConfig, FieldElement};
use crate::error::CryptoError;
use crate::transport::canonical::{canonical_body, canonical_query};

/// Name of the timestamp header.
pub const TIMESTAMP_HEADER: &str = "X-edgeX-Api-Timestamp";

/// Name of the signature header.
pub const SIGNATURE_HEADER: &str = "X-edgeX-Api-Signature";

/// The two headers attached to a signed request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedHeaders {
    /// Decimal Unix milliseconds.
    pub timestamp: String,
    /// 128 lowercase hex chars: r then s.
    pub signature: String,
}

/// Signs outbound requests with an account's private key.
pub struct RequestSigner {
    keypair: Keypair,
}

impl RequestSigner {
    pub fn new(keypair: Keypair) -> Self {
        Self { keypair }
    }

    pub fn keypair(&self) -> &Keypair {
        &self.keypair
    }

    /// Builds the canonical signing string for a request.
    ///
    /// `path` carries no scheme, host or query; a present body takes
    /// precedence over the query string.
    pub fn signing_string(
        timestamp_ms: u64,
        method: &str,
        path: &str,
        query: Option<&str>,
        body: Option<&str>,
    ) -> Result<String, CryptoError> {
        let mut content = format!("{}{}{}", timestamp_ms, method.to_uppercase(), path);
        if let Some(body) = body {
            content.push_str(&canonical_body(body)?);
        } else if let Some(query) = query {
            content.push_str(&canonical_query(query));
        }
        Ok(content)
    }

    /// Signs a request at an explicit timestamp.
    pub fn sign_request_at(
        &self,
        timestamp_ms: u64,
        method: &str,
        path: &str,
        query: Option<&str>,
        body: Option<&str>,
    ) -> Result<SignedHeaders, CryptoError> {
        let content = Self::signing_string(timestamp_ms, method, path, query, body)?;
        debug!(method, path, "signing request");

        let digest = Keccak256::digest(content.as_bytes());
        let hash = BigInt::from_be_bytes(&digest)
            .unwrap_or_else(BigInt::zero)
            .modulo(CurveOrder::modulus());

        let signature = self.keypair.sign(&FieldElement::new(hash))?;
        Ok(SignedHeaders {
            timestamp: timestamp_ms.to_string(),
            signature: signature.to_hex(),
        })
    }

    /// Signs a request at the current wall-clock time.
    pub fn sign_request(
        &self,
        method: &str,
        path: &str,
        query: Option<&str>,
        body: Option<&str>,
    ) -> Result<SignedHeaders, CryptoError> {
        self.sign_request_at(now_millis(), method, path, query, body)
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
