//! Limit-order message packing
//!
//! A limit order with fees hashes as a four-link Pedersen chain: the two
//! asset ids, the fee asset, the amount/nonce word, and the position word.
//! Buying the synthetic swaps which asset is sold and which is bought.

use crate::bigint::BigInt;
use crate::curve::field::FieldElement;
use crate::curve::pedersen::pedersen_hash;
use crate::error::CryptoError;
use crate::message::LIMIT_ORDER_WITH_FEES;

/// Parameters of a limit order with fees.
///
/// Amounts are integer quantities in the asset's own resolution, at most
/// 2^63. Expiration is in hours since the epoch.
#[derive(Clone, Debug)]
pub struct LimitOrderParams {
    pub synthetic_asset_id: FieldElement,
    pub collateral_asset_id: FieldElement,
    pub fee_asset_id: FieldElement,
    pub is_buying_synthetic: bool,
    pub amount_synthetic: u64,
    pub amount_collateral: u64,
    pub amount_fee: u64,
    pub nonce: u32,
    pub position_id: u64,
    pub expiration_hours: u32,
}

const AMOUNT_BOUND: u64 = 1 << 63;

fn check_amount(value: u64, what: &str) -> Result<(), CryptoError> {
    if value > AMOUNT_BOUND {
        return Err(CryptoError::InvalidInstruction(format!(
            "{} exceeds 2^63",
            what
        )));
    }
    Ok(())
}

/// Computes the Pedersen message hash of a limit order.
pub fn limit_order_hash(params: &LimitOrderParams) -> Result<FieldElement, CryptoError> {
    check_amount(params.amount_synthetic, "synthetic amount")?;
    check_amount(params.amount_collateral, "collateral amount")?;
    check_amount(params.amount_fee, "fee amount")?;

    let (sell_id, buy_id, sell_amount, buy_amount) = if params.is_buying_synthetic {
        (
            params.collateral_asset_id,
            params.synthetic_asset_id,
            params.amount_collateral,
            params.amount_synthetic,
        )
    } else {
        (
            params.synthetic_asset_id,
            params.collateral_asset_id,
            params.amount_synthetic,
            params.amount_collateral,
        )
    };

    let h = pedersen_hash(&sell_id, &buy_id)?;
    let h = pedersen_hash(&h, &params.fee_asset_id)?;

    // sell(64) | buy(64) | fee(64) | nonce(32)
    let packed_amounts = BigInt::from_u64(sell_amount)
        .shl(64)
        .add_u64(buy_amount)
        .shl(64)
        .add_u64(params.amount_fee)
        .shl(32)
        .add_u64(params.nonce as u64);
    let h = pedersen_hash(&h, &FieldElement::new(packed_amounts))?;

    // type(4) | position x3 (64 each) | expiration(32) | 17 bits padding.
    // The position triple is (sender, receiver, fee); an order collapses
    // all three to one id, and the repetition is kept.
    let packed_positions = BigInt::from_u64(LIMIT_ORDER_WITH_FEES)
        .shl(64)
        .add_u64(params.position_id)
        .shl(64)
        .add_u64(params.position_id)
        .shl(64)
        .add_u64(params.position_id)
        .shl(32)
        .add_u64(params.expiration_hours as u64)
        .shl(17);

    pedersen_hash(&h, &FieldElement::new(packed_positions))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> LimitOrderParams {
        LimitOrderParams {
            synthetic_asset_id: FieldElement::from_u64(1),
            collateral_asset_id: FieldElement::from_u64(2),
            fee_asset_id: FieldElement::from_u64(2),
            is_buying_synthetic: true,
            amount_synthetic: 1000,
            amount_collateral: 50000,
            amount_fee: 100,
            nonce: 42,
            position_id: 12345,
            expiration_hours: 438_000,
        }
    }

    #[test]
    fn hash_is_stable() {
        let a = limit_order_hash(&sample()).unwrap();
        let b = limit_order_hash(&sample()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn side_changes_the_hash() {
        let mut params = sample();
        params.is_buying_synthetic = false;
        assert_ne!(
            limit_order_hash(&sample()).unwrap(),
            limit_order_hash(&params).unwrap()
        );
    }

    #[test]
    fn every_field_is_load_bearing() {
        let base = limit_order_hash(&sample()).unwrap();

        let mut p = sample();
        p.nonce += 1;
        assert_ne!(limit_order_hash(&p).unwrap(), base);

        let mut p = sample();
        p.position_id += 1;
        assert_ne!(limit_order_hash(&p).unwrap(), base);

        let mut p = sample();
        p.expiration_hours += 1;
        assert_ne!(limit_order_hash(&p).unwrap(), base);

        let mut p = sample();
        p.amount_fee += 1;
        assert_ne!(limit_order_hash(&p).unwrap(), base);
    }

    #[test]
    fn oversized_amount_is_rejected() {
        let mut p = sample();
        p.amount_synthetic = u64::MAX;
        assert!(matches!(
            limit_order_hash(&p),
            Err(CryptoError::InvalidInstruction(_))
        ));
    }
}
