//! Signing core and request-signing client for an edgeX-style perpetual
//! exchange.
//!
//! The crate implements the STARK-friendly curve end to end: field
//! arithmetic, point operations, the Pedersen hash over the published
//! constant-point table, a windowed accelerator, and the deterministic
//! ECDSA variant the exchange verifies. On top of that sit the
//! message-packing rules that turn orders and transfers into Pedersen
//! preimages and the transport envelope that signs every HTTP request and
//! stream handshake.
//!
//! Layering is strictly bottom-up: `bigint` under `curve`, `curve` under
//! `message` and `transport`, and the `client` on top. All tables are
//! initialized once and shared read-only; every signing operation is pure
//! given its inputs.

/// Fixed-width big integer arithmetic
pub mod bigint;
/// The signing HTTP client
pub mod client;
/// Curve, hash and signature primitives
pub mod curve;
/// Error types
pub mod error;
/// Instruction packing into Pedersen preimages
pub mod message;
/// Canonical strings, headers and the stream handshake
pub mod transport;

pub use client::{Client, ClientConfig, L2Signature};
pub use curve::{
    hash_elements, hash_elements_fast, init, is_valid_public_key, pedersen_hash, scalar_base_mul,
    sign, verify, CurvePoint, FieldElement, Keypair, ScalarElement, Signature,
};
pub use error::{ClientError, CryptoError};
pub use message::{
    generate_client_id, hours_from_millis, limit_order_hash, nonce_from_client_id, transfer_hash,
    withdrawal_hash, LimitOrderParams, TransferParams, WithdrawalParams,
};
pub use transport::{
    private_stream_path, RequestSigner, SessionState, SignedHeaders, StreamSession,
    SIGNATURE_HEADER, TIMESTAMP_HEADER,
};
