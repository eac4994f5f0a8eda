// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use cid::Cid;
use fvm_ipld_encoding::{DAG_CBOR, Error, IPLD_RAW};
use multihash_codetable::{Code, MultihashDigest};

/// Extension methods for constructing `dag-cbor` [Cid]
pub trait CidCborExt {
    /// Default CID builder for Filecoin
    ///
    /// - The default codec is [`fvm_ipld_encoding::DAG_CBOR`]
    /// - The default hash function is 256 bit BLAKE2b
    ///
    /// This matches [`abi.CidBuilder`](https://github.com/filecoin-project/go-state-types/blob/master/abi/cid.go#L49) in go
    fn from_cbor_blake2b256<S: serde::ser::Serialize>(obj: &S) -> Result<Cid, Error> {
        let bytes = fvm_ipld_encoding::to_vec(obj)?;
        Ok(Cid::new_v1(DAG_CBOR, Code::Blake2b256.digest(&bytes)))
    }

    /// `dag-cbor` [Cid] of bytes that are already CBOR encoded.
    fn from_encoded_cbor(bytes: &[u8]) -> Cid {
        Cid::new_v1(DAG_CBOR, Code::Blake2b256.digest(bytes))
    }

    /// `raw` [Cid] over the given bytes, as used for builtin actor code identifiers.
    fn from_raw_blake2b256(bytes: &[u8]) -> Cid {
        Cid::new_v1(IPLD_RAW, Code::Blake2b256.digest(bytes))
    }
}

impl CidCborExt for Cid {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cbor_cid_is_deterministic() {
        let a = Cid::from_cbor_blake2b256(&(1u64, "one")).unwrap();
        let b = Cid::from_cbor_blake2b256(&(1u64, "one")).unwrap();
        let c = Cid::from_cbor_blake2b256(&(2u64, "two")).unwrap();
        let encoded = fvm_ipld_encoding::to_vec(&(1u64, "one")).unwrap();
        assert_eq!(Cid::from_encoded_cbor(&encoded), a);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.codec(), DAG_CBOR);
    }

    #[test]
    fn raw_cid_codec() {
        let cid = Cid::from_raw_blake2b256(b"fil/1/account");
        assert_eq!(cid.codec(), IPLD_RAW);
        assert_eq!(cid.hash().code(), u64::from(Code::Blake2b256));
    }
}
