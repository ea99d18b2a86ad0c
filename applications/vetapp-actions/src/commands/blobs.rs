//! Opaque `vector<u8>` arguments that entry functions unpack on chain.

use primitive_types::U256;
use vetapp_core::{AccountAddress, ArgSerializer, PoolKind};

/// `helper_ve::run_op` opcode that migrates the listed pools.
pub const OP_MIGRATE_POOLS: u64 = 1;

/// CLMM price limit for a token0 to token1 swap.
pub const CLMM_MIN_SQRT_PRICE_LIMIT: u128 = 4_295_048_016;

/// Input amount of the fixed test swap.
pub const TEST_SWAP_AMOUNT: u64 = 1_000_000;

/// `router::claim_fees`: pool then position.
pub fn claim_fees(pool: &AccountAddress, position: &AccountAddress) -> Vec<u8> {
    ArgSerializer::new()
        .address(pool)
        .address(position)
        .into_bytes()
}

/// `helper_ve::run_op`: opcode, then the pools as a length-prefixed list.
pub fn migrate_pools(pools: &[AccountAddress]) -> Vec<u8> {
    ArgSerializer::new()
        .u64(OP_MIGRATE_POOLS)
        .addresses(pools)
        .into_bytes()
}

/// `router::swap`: a token0 to token1 exact-in swap, laid out per pool kind.
pub fn swap(pool: &AccountAddress, kind: PoolKind) -> Vec<u8> {
    let blob = ArgSerializer::new().address(pool);
    match kind {
        PoolKind::Amm => blob
            .bool(true)
            .bool(true)
            .u64(TEST_SWAP_AMOUNT)
            .u64(0),
        PoolKind::Clmm => blob
            .bool(true)
            .bool(true)
            .u64(TEST_SWAP_AMOUNT)
            .u64(0)
            .u128(CLMM_MIN_SQRT_PRICE_LIMIT),
        // token indices, then amounts
        PoolKind::Stable => blob
            .u64(0)
            .u64(1)
            .u256(U256::from(TEST_SWAP_AMOUNT))
            .u256(U256::zero()),
    }
    .into_bytes()
}

#[cfg(test)]
mod tests {
    use vetapp_core::encode_address;

    use super::*;

    #[test]
    fn migration_blob_layout() {
        let pools = [encode_address("0x1").unwrap(), encode_address("0x2").unwrap()];
        let blob = migrate_pools(&pools);
        assert_eq!(blob.len(), 8 + 1 + 64);
        assert_eq!(&blob[..8], &1u64.to_le_bytes());
        assert_eq!(blob[8], 2);
        assert_eq!(blob[8 + 32], 1);
        assert_eq!(blob[8 + 64], 2);
    }

    #[test]
    fn swap_blob_sizes_per_kind() {
        let pool = encode_address("0xabc").unwrap();
        assert_eq!(swap(&pool, PoolKind::Amm).len(), 32 + 2 + 16);
        let clmm = swap(&pool, PoolKind::Clmm);
        assert_eq!(clmm.len(), 32 + 2 + 16 + 16);
        assert_eq!(&clmm[50..], &CLMM_MIN_SQRT_PRICE_LIMIT.to_le_bytes());
        let stable = swap(&pool, PoolKind::Stable);
        assert_eq!(stable.len(), 32 + 16 + 64);
        assert_eq!(&stable[48..56], &TEST_SWAP_AMOUNT.to_le_bytes());
    }
}
