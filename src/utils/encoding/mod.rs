// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use blake2b_simd::Params;

/// Generates blake2b hash of fixed 32 bytes size.
///
/// # Example
/// ```
/// use chain_validation::utils::encoding::blake2b_256;
///
/// let ingest: Vec<u8> = vec![];
/// let hash = blake2b_256(&ingest);
/// assert_eq!(hash.len(), 32);
/// ```
pub fn blake2b_256(ingest: &[u8]) -> [u8; 32] {
    let digest = Params::new()
        .hash_length(32)
        .to_state()
        .update(ingest)
        .finalize();

    let mut ret = [0u8; 32];
    ret.clone_from_slice(digest.as_bytes());
    ret
}

/// Big-endian encoding of a `u64`, as appended to the creator address when
/// deriving robust actor addresses.
pub fn be_u64(value: u64) -> [u8; 8] {
    value.to_be_bytes()
}
