//! Blocking HTTP client that signs every request
//!
//! The client owns the account's keypair and attaches the timestamp and
//! signature headers to each outbound call. Endpoint wrappers live with the
//! application; what belongs here is the envelope and the business-hash
//! signing entry point.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::curve::ecdsa::Keypair;
use crate::curve::field::{CurveOrder, FieldConfig, FieldElement};
use crate::error::ClientError;
use crate::transport::signer::{RequestSigner, SIGNATURE_HEADER, TIMESTAMP_HEADER};
use crate::transport::ws::StreamSession;

/// Configuration for a client.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub base_url: String,
    pub account_id: i64,
    /// Hex private key, with or without a `0x` prefix.
    pub stark_private_key: String,
}

/// The wire form of a curve signature. `v` is carried for compatibility
/// and is always empty.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct L2Signature {
    pub r: String,
    pub s: String,
    pub v: String,
}

/// A signing HTTP client bound to one account.
pub struct Client {
    http: reqwest::blocking::Client,
    base_url: String,
    account_id: i64,
    signer: RequestSigner,
}

impl Client {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let keypair = Keypair::from_hex(&config.stark_private_key)?;
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        debug!(account_id = config.account_id, "client ready");
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            account_id: config.account_id,
            signer: RequestSigner::new(keypair),
        })
    }

    pub fn account_id(&self) -> i64 {
        self.account_id
    }

    pub fn signer(&self) -> &RequestSigner {
        &self.signer
    }

    /// A session for this account's private stream.
    pub fn stream_session(&self) -> StreamSession {
        StreamSession::new(self.account_id)
    }

    /// Signs a business message hash, reducing it into the scalar field
    /// first the way every instruction hash is signed.
    pub fn sign_message_hash(&self, hash: &FieldElement) -> Result<L2Signature, ClientError> {
        let reduced = hash.value().modulo(CurveOrder::modulus());
        let signature = self.signer.keypair().sign(&FieldElement::new(reduced))?;
        Ok(L2Signature {
            r: signature.r.to_hex_padded(),
            s: signature.s.to_hex_padded(),
            v: String::new(),
        })
    }

    /// Signed GET. Query pairs are rendered as given; the signature covers
    /// their sorted form.
    pub fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Value, ClientError> {
        let raw_query = query
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");
        let query_opt = (!raw_query.is_empty()).then_some(raw_query.as_str());

        let headers = self.signer.sign_request("GET", path, query_opt, None)?;
        let mut url = format!("{}{}", self.base_url, path);
        if let Some(q) = query_opt {
            url = format!("{}?{}", url, q);
        }

        let response = self
            .http
            .get(url)
            .header(TIMESTAMP_HEADER, headers.timestamp.as_str())
            .header(SIGNATURE_HEADER, headers.signature.as_str())
            .send()?;
        check_response(response.json()?)
    }

    /// Signed POST of a JSON body. The exact serialized body is both
    /// signed and sent, so the server sees what the signature covers.
    pub fn post(&self, path: &str, body: &Value) -> Result<Value, ClientError> {
        let body_str = serde_json::to_string(body)?;
        let headers = self.signer.sign_request("POST", path, None, Some(&body_str))?;

        let response = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .header(TIMESTAMP_HEADER, headers.timestamp.as_str())
            .header(SIGNATURE_HEADER, headers.signature.as_str())
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body_str)
            .send()?;
        check_response(response.json()?)
    }
}

fn check_response(value: Value) -> Result<Value, ClientError> {
    match value.get("code").and_then(Value::as_str) {
        Some("SUCCESS") | None => Ok(value),
        Some(code) => {
            warn!(code, "exchange rejected the request");
            Err(ClientError::Api(code.to_string()))
        }
    }
}
