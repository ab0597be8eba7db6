//! Transport-level signing: canonical strings, headers, stream handshake.

pub mod canonical;
pub mod signer;
pub mod ws;

pub use canonical::{canonical_body, canonical_query, canonical_value};
pub use signer::{RequestSigner, SignedHeaders, SIGNATURE_HEADER, TIMESTAMP_HEADER};
pub use ws::{private_stream_path, SessionState, StreamSession};
