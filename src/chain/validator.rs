// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::panic::{AssertUnwindSafe, catch_unwind};

use anyhow::{Context as _, anyhow};
use tracing::debug;

use super::{ApplyMessageResult, ApplyTipSetResult, BlockMessagesInfo};
use crate::message::SignedMessage;
use crate::shim::{clock::ChainEpoch, message::Message};
use crate::state::Applier;

/// Pass-through to the implementation's appliers. Errors and panics raised by
/// the implementation both come back as errors; nothing is retried.
pub struct Validator {
    applier: Box<dyn Applier>,
}

impl Validator {
    pub fn new(applier: Box<dyn Applier>) -> Self {
        Self { applier }
    }

    pub fn apply_message(
        &mut self,
        epoch: ChainEpoch,
        msg: &Message,
    ) -> anyhow::Result<ApplyMessageResult> {
        debug!(epoch, from = %msg.from, to = %msg.to, seq = msg.sequence, "applying message");
        let applier = &mut self.applier;
        guarded(|| applier.apply_message(epoch, msg))
            .with_context(|| format!("applying message {}", msg.cid()))
    }

    pub fn apply_signed_message(
        &mut self,
        epoch: ChainEpoch,
        msg: &SignedMessage,
    ) -> anyhow::Result<ApplyMessageResult> {
        debug!(epoch, from = %msg.message.from, seq = msg.message.sequence, "applying signed message");
        let applier = &mut self.applier;
        guarded(|| applier.apply_signed_message(epoch, msg))
            .with_context(|| format!("applying signed message {}", msg.cid()))
    }

    pub fn apply_tipset_messages(
        &mut self,
        epoch: ChainEpoch,
        blocks: &[BlockMessagesInfo],
    ) -> anyhow::Result<ApplyTipSetResult> {
        debug!(epoch, blocks = blocks.len(), "applying tipset");
        let applier = &mut self.applier;
        guarded(|| applier.apply_tipset_messages(epoch, blocks))
            .with_context(|| format!("applying tipset at epoch {epoch}"))
    }
}

/// Runs `f`, turning a panic into an error carrying the panic message.
fn guarded<T>(f: impl FnOnce() -> anyhow::Result<T>) -> anyhow::Result<T> {
    catch_unwind(AssertUnwindSafe(f))
        .map_err(|payload| anyhow!("implementation panicked: {}", panic_message(&*payload)))?
}

/// Best-effort text of a panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::MessageReceipt;
    use crate::shim::{address::Address, econ::TokenAmount, error::ExitCode};
    use cid::Cid;

    struct Panicking;

    impl Applier for Panicking {
        fn apply_message(&mut self, _: ChainEpoch, _: &Message) -> anyhow::Result<ApplyMessageResult> {
            panic!("boom")
        }

        fn apply_signed_message(
            &mut self,
            _: ChainEpoch,
            _: &SignedMessage,
        ) -> anyhow::Result<ApplyMessageResult> {
            Err(anyhow!("no signer"))
        }

        fn apply_tipset_messages(
            &mut self,
            _: ChainEpoch,
            _: &[BlockMessagesInfo],
        ) -> anyhow::Result<ApplyTipSetResult> {
            Ok(ApplyTipSetResult {
                receipts: vec![MessageReceipt {
                    exit_code: ExitCode::OK,
                    return_value: Default::default(),
                    gas_used: 1,
                }],
                root: Cid::default(),
            })
        }
    }

    fn msg() -> Message {
        Message::transfer(Address::new_id(100), Address::new_id(101), TokenAmount::default())
    }

    #[test]
    fn panics_become_errors() {
        let mut v = Validator::new(Box::new(Panicking));
        let err = v.apply_message(1, &msg()).unwrap_err();
        assert!(format!("{err:#}").contains("implementation panicked: boom"));
    }

    #[test]
    fn errors_pass_through() {
        let mut v = Validator::new(Box::new(Panicking));
        let signed = SignedMessage::new_unchecked(
            msg(),
            crate::shim::crypto::Signature::new_secp256k1(vec![0; 65]),
        );
        let err = v.apply_signed_message(1, &signed).unwrap_err();
        assert!(format!("{err:#}").contains("no signer"));
        assert_eq!(v.apply_tipset_messages(1, &[]).unwrap().receipts.len(), 1);
    }
}
