//! Scenario tests for the transport envelope and canonicalization rules.

use sha3::{Digest, Keccak256};

use edgex_sdk::bigint::BigInt;
use edgex_sdk::curve::field::{CurveOrder, FieldConfig};
use edgex_sdk::transport::canonical_value;
use edgex_sdk::{
    private_stream_path, verify, FieldElement, Keypair, RequestSigner, SessionState, Signature,
    StreamSession,
};

const TS: u64 = 1_700_000_000_000;

fn signer_with_key(hex: &str) -> RequestSigner {
    RequestSigner::new(Keypair::from_hex(hex).unwrap())
}

/// Scenario D: the exact canonical string, then hash and signature.
#[test]
fn canonical_string_matches_the_documented_form() {
    let s = RequestSigner::signing_string(TS, "POST", "/v1/x", None, Some(r#"{"b":2,"a":[3,1]}"#))
        .unwrap();
    assert_eq!(s, "1700000000000POST/v1/xa=3&1&b=2");
}

#[test]
fn scenario_d_signature_with_unit_key_verifies() {
    let signer = signer_with_key("1");
    let headers = signer
        .sign_request_at(TS, "POST", "/v1/x", None, Some(r#"{"b":2,"a":[3,1]}"#))
        .unwrap();

    assert_eq!(headers.timestamp, "1700000000000");
    assert_eq!(headers.signature.len(), 128);
    assert!(headers.signature.chars().all(|c| c.is_ascii_hexdigit()));
    assert_eq!(headers.signature, headers.signature.to_lowercase());

    // independently recompute the hash and check the signature against it
    let digest = Keccak256::digest("1700000000000POST/v1/xa=3&1&b=2".as_bytes());
    let h = BigInt::from_be_bytes(&digest)
        .unwrap()
        .modulo(CurveOrder::modulus());
    let sig = Signature::from_hex(&headers.signature).unwrap();
    assert!(verify(signer.keypair().public(), &FieldElement::new(h), &sig).unwrap());
}

/// Invariant 8: fixed request, fixed timestamp, fixed key: identical bytes.
#[test]
fn envelope_is_deterministic() {
    let signer = signer_with_key("2d4e6f8a0b1c2d3e4f5a6b7c8d9e0f1a2b3c4d5e");
    let one = signer
        .sign_request_at(TS, "GET", "/api/v1/private/account", Some("accountId=7&coin=usdc"), None)
        .unwrap();
    let two = signer
        .sign_request_at(TS, "GET", "/api/v1/private/account", Some("accountId=7&coin=usdc"), None)
        .unwrap();
    assert_eq!(one, two);
}

/// Invariant 9: body key order does not change the signature.
#[test]
fn body_key_order_is_canonicalized_away() {
    let signer = signer_with_key("99aabbccddeeff");
    let a = signer
        .sign_request_at(TS, "POST", "/v1/order", None, Some(r#"{"price":"100","size":"2"}"#))
        .unwrap();
    let b = signer
        .sign_request_at(TS, "POST", "/v1/order", None, Some(r#"{"size":"2","price":"100"}"#))
        .unwrap();
    assert_eq!(a.signature, b.signature);
}

#[test]
fn query_order_is_canonicalized_away() {
    let signer = signer_with_key("42");
    let a = signer
        .sign_request_at(TS, "GET", "/v1/q", Some("b=2&a=1"), None)
        .unwrap();
    let b = signer
        .sign_request_at(TS, "GET", "/v1/q", Some("a=1&b=2"), None)
        .unwrap();
    assert_eq!(a.signature, b.signature);
}

#[test]
fn different_timestamps_change_the_signature() {
    let signer = signer_with_key("42");
    let a = signer.sign_request_at(TS, "GET", "/v1/q", None, None).unwrap();
    let b = signer.sign_request_at(TS + 1, "GET", "/v1/q", None, None).unwrap();
    assert_ne!(a.signature, b.signature);
}

#[test]
fn nested_canonical_values_follow_the_wire_quirk() {
    // the flat rendering cannot tell a literal "k=v" array entry from an
    // object pair; the server's wire format wants it that way
    let arr = serde_json::json!(["a=1", "b=2"]);
    let obj = serde_json::json!({"a": 1, "b": 2});
    assert_eq!(canonical_value(&arr), canonical_value(&obj));
    assert_eq!(canonical_value(&obj), "a=1&b=2");
}

#[test]
fn stream_handshake_is_a_signed_get_on_the_inline_query_path() {
    let signer = signer_with_key("1");
    let session = StreamSession::new(551_109_972);
    assert_eq!(session.state(), SessionState::Disconnected);

    let headers = session.handshake_headers_at(&signer, TS).unwrap();

    let expected_string = format!("{}GET{}", TS, private_stream_path(551_109_972));
    assert_eq!(
        expected_string,
        "1700000000000GET/api/v1/private/ws?accountId=551109972"
    );
    let digest = Keccak256::digest(expected_string.as_bytes());
    let h = BigInt::from_be_bytes(&digest)
        .unwrap()
        .modulo(CurveOrder::modulus());
    let sig = Signature::from_hex(&headers.signature).unwrap();
    assert!(verify(signer.keypair().public(), &FieldElement::new(h), &sig).unwrap());
}

#[test]
fn session_lifecycle_is_linear() {
    let mut session = StreamSession::new(9);
    assert!(session.mark_connected());
    session.close();
    assert_eq!(session.state(), SessionState::Closed);
    assert!(!session.mark_connected());
}
