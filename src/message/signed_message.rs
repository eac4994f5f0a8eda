// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use crate::shim::{
    crypto::{Signature, SignatureType},
    message::Message,
};
use crate::utils::cid::CidCborExt;
use cid::Cid;
use fvm_ipld_encoding::tuple::*;

/// Represents a wrapped message with signature bytes.
#[derive(PartialEq, Clone, Debug, Serialize_tuple, Deserialize_tuple, Eq)]
pub struct SignedMessage {
    pub message: Message,
    pub signature: Signature,
}

impl SignedMessage {
    /// Generate a new signed message from fields.
    /// The signature is not verified; the harness only orchestrates signing.
    pub fn new_unchecked(message: Message, signature: Signature) -> SignedMessage {
        SignedMessage { message, signature }
    }

    /// Returns reference to the unsigned message.
    pub fn message(&self) -> &Message {
        &self.message
    }

    /// Returns signature of the signed message.
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Checks if the signed message is a BLS message.
    pub fn is_bls(&self) -> bool {
        self.signature.signature_type() == SignatureType::BLS
    }

    /// Checks if the signed message is a SECP message.
    pub fn is_secp256k1(&self) -> bool {
        self.signature.signature_type() == SignatureType::Secp256k1
    }

    // `msg.cid()` is different from `Cid::from_cbor_blake2b256(msg)` for
    // SECP messages. The behavior comes from Lotus.
    pub fn cid(&self) -> Cid {
        if self.is_bls() {
            self.message.cid()
        } else {
            Cid::from_cbor_blake2b256(self).expect("message serialization is infallible")
        }
    }
}
