//! Transaction hashes of invoke transactions.
//!
//! V3 hashes are Poseidon based and commit to the fee resource bounds, V1
//! hashes are the older Pedersen chain over a fixed field list.

use starknet_crypto::{pedersen_hash, poseidon_hash_many};

use crate::types::{Felt, ResourceBounds, ResourceBoundsMapping};

// "invoke" as a short string
const PREFIX_INVOKE: u64 = 0x696e766f6b65;

const L1_GAS: &[u8] = b"L1_GAS";
const L2_GAS: &[u8] = b"L2_GAS";
const L1_DATA: &[u8] = b"L1_DATA";

// Both data availability modes are L1 (0)
const DA_MODE_L1: u64 = 0;

/// Pedersen hash chain over `elements`, terminated by their count.
pub fn compute_hash_on_elements(elements: &[Felt]) -> Felt {
    let hash = elements
        .iter()
        .fold(Felt::ZERO, |acc, element| pedersen_hash(&acc, element));

    pedersen_hash(&hash, &Felt::from(elements.len() as u64))
}

/// Packs one resource bound as `name (8 bytes) | max_amount (8) | max_price (16)`.
pub fn encode_resource_bound(name: &[u8], bounds: &ResourceBounds) -> Felt {
    let mut bytes = [0u8; 32];
    bytes[8 - name.len()..8].copy_from_slice(name);
    bytes[8..16].copy_from_slice(&bounds.max_amount.to_be_bytes());
    bytes[16..].copy_from_slice(&bounds.max_price_per_unit.to_be_bytes());

    // The top byte is zero, so the value is always below the field modulus
    Felt::from_bytes_be(&bytes).unwrap_or(Felt::ZERO)
}

fn fee_fields_hash(tip: u64, resource_bounds: &ResourceBoundsMapping) -> Felt {
    poseidon_hash_many(&[
        Felt::from(tip),
        encode_resource_bound(L1_GAS, &resource_bounds.l1_gas),
        encode_resource_bound(L2_GAS, &resource_bounds.l2_gas),
        encode_resource_bound(L1_DATA, &resource_bounds.l1_data_gas),
    ])
}

#[derive(Debug, Clone, Copy)]
pub struct InvokeV3Fields<'a> {
    pub sender_address: Felt,
    pub calldata: &'a [Felt],
    pub chain_id: Felt,
    pub nonce: Felt,
    pub resource_bounds: &'a ResourceBoundsMapping,
    pub tip: u64,
}

pub fn invoke_v3_hash(fields: &InvokeV3Fields<'_>) -> Felt {
    let data_availability_modes = Felt::from((DA_MODE_L1 << 32) + DA_MODE_L1);

    poseidon_hash_many(&[
        Felt::from(PREFIX_INVOKE),
        Felt::THREE,
        fields.sender_address,
        fee_fields_hash(fields.tip, fields.resource_bounds),
        // paymaster data
        poseidon_hash_many(&[]),
        fields.chain_id,
        fields.nonce,
        data_availability_modes,
        // account deployment data
        poseidon_hash_many(&[]),
        poseidon_hash_many(fields.calldata),
    ])
}

pub fn invoke_v1_hash(
    sender_address: Felt,
    calldata: &[Felt],
    max_fee: Felt,
    chain_id: Felt,
    nonce: Felt,
) -> Felt {
    compute_hash_on_elements(&[
        Felt::from(PREFIX_INVOKE),
        Felt::ONE,
        sender_address,
        Felt::ZERO,
        compute_hash_on_elements(calldata),
        max_fee,
        chain_id,
        nonce,
    ])
}
