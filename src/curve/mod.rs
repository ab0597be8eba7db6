//! The STARK curve: field arithmetic, point operations, constant tables,
//! Pedersen hashing and deterministic ECDSA.

pub mod ecdsa;
pub mod field;
pub mod params;
pub mod pedersen;
pub mod point;
pub mod rfc6979;
pub mod window;

pub use ecdsa::{is_valid_public_key, sign, verify, Keypair, Signature};
pub use field::{FieldElement, ScalarElement};
pub use params::init;
pub use pedersen::{hash_elements, hash_elements_fast, pedersen_hash};
pub use point::CurvePoint;
pub use window::scalar_base_mul;
