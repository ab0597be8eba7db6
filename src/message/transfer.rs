//! Transfer and withdrawal message packing
//!
//! Transfers chain the sender asset and receiver key (plus the condition,
//! when present) through the Pedersen hash and finish with one packed word:
//! type(5) | sender position(31) | receiver position(31) | amount(63) |
//! max fee(63) | nonce(31) | expiration(22).

use crate::bigint::BigInt;
use crate::curve::field::FieldElement;
use crate::curve::pedersen::pedersen_hash;
use crate::error::CryptoError;
use crate::message::{CONDITIONAL_TRANSFER, TRANSFER, WITHDRAWAL, WITHDRAWAL_TO_ADDRESS};

/// Parameters of a (conditional) transfer.
///
/// The fee asset and fee position ride along for API parity with the
/// exchange call signature; the packed layout does not consume them.
#[derive(Clone, Debug)]
pub struct TransferParams {
    pub asset_id: FieldElement,
    pub fee_asset_id: Option<FieldElement>,
    pub receiver_public_key: FieldElement,
    pub sender_position_id: u64,
    pub receiver_position_id: u64,
    pub fee_position_id: u64,
    pub nonce: u32,
    pub amount: u64,
    pub max_fee: u64,
    pub expiration_hours: u32,
    /// Present for conditional transfers; interpreted by the application.
    pub condition: Option<FieldElement>,
}

/// Parameters of a withdrawal.
#[derive(Clone, Debug)]
pub struct WithdrawalParams {
    pub asset_id: FieldElement,
    /// Destination L1 address; selects the to-address instruction type.
    pub eth_address: Option<FieldElement>,
    pub position_id: u64,
    pub amount: u64,
    pub nonce: u32,
    pub expiration_hours: u32,
}

fn check_width(value: u64, bits: usize, what: &str) -> Result<(), CryptoError> {
    if bits < 64 && value >= 1u64 << bits {
        return Err(CryptoError::InvalidInstruction(format!(
            "{} does not fit {} bits",
            what, bits
        )));
    }
    Ok(())
}

/// Computes the Pedersen message hash of a transfer or conditional
/// transfer.
pub fn transfer_hash(params: &TransferParams) -> Result<FieldElement, CryptoError> {
    check_width(params.sender_position_id, 31, "sender position")?;
    check_width(params.receiver_position_id, 31, "receiver position")?;
    check_width(params.fee_position_id, 31, "fee position")?;
    check_width(params.nonce as u64, 31, "nonce")?;
    check_width(params.amount, 63, "amount")?;
    check_width(params.max_fee, 63, "max fee")?;
    check_width(params.expiration_hours as u64, 22, "expiration")?;

    let mut h = pedersen_hash(&params.asset_id, &params.receiver_public_key)?;
    let instruction_type = match params.condition {
        Some(condition) => {
            h = pedersen_hash(&h, &condition)?;
            CONDITIONAL_TRANSFER
        }
        None => TRANSFER,
    };

    let packed = BigInt::from_u64(instruction_type)
        .shl(31)
        .add_u64(params.sender_position_id)
        .shl(31)
        .add_u64(params.receiver_position_id)
        .shl(63)
        .add_u64(params.amount)
        .shl(63)
        .add_u64(params.max_fee)
        .shl(31)
        .add_u64(params.nonce as u64)
        .shl(22)
        .add_u64(params.expiration_hours as u64);

    pedersen_hash(&h, &FieldElement::new(packed))
}

/// Computes the Pedersen message hash of a withdrawal.
///
/// The generic form hashes the packed word against the asset id alone; the
/// to-address form first chains the destination through the hash, the way
/// a conditional transfer chains its condition.
pub fn withdrawal_hash(params: &WithdrawalParams) -> Result<FieldElement, CryptoError> {
    check_width(params.position_id, 31, "position")?;
    check_width(params.nonce as u64, 31, "nonce")?;
    check_width(params.amount, 63, "amount")?;
    check_width(params.expiration_hours as u64, 22, "expiration")?;

    let (instruction_type, first) = match params.eth_address {
        Some(address) => (
            WITHDRAWAL_TO_ADDRESS,
            pedersen_hash(&params.asset_id, &address)?,
        ),
        None => (WITHDRAWAL, params.asset_id),
    };

    let packed = BigInt::from_u64(instruction_type)
        .shl(31)
        .add_u64(params.position_id)
        .shl(63)
        .add_u64(params.amount)
        .shl(31)
        .add_u64(params.nonce as u64)
        .shl(22)
        .add_u64(params.expiration_hours as u64);

    pedersen_hash(&first, &FieldElement::new(packed))
}
