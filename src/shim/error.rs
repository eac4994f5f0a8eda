// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT
use fvm_shared4::error::ExitCode as ExitCode_latest;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// `Newtype` wrapper for the FVM `ExitCode`.
///
/// Displays with the Lotus names so that assertion failures read the same as
/// the conformance vectors they are compared against.
///
/// # Examples
/// ```
/// # use chain_validation::shim::error::ExitCode;
/// assert_eq!(ExitCode::SYS_SENDER_INVALID.to_string(), "SysErrSenderInvalid(1)");
/// assert_eq!(ExitCode::from(0u32), ExitCode::OK);
/// ```
#[derive(
    PartialEq,
    Eq,
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    derive_more::From,
    derive_more::Into,
)]
pub struct ExitCode(ExitCode_latest);

impl PartialOrd for ExitCode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.value().cmp(&other.value()))
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self.0 {
            ExitCode_latest::OK => Some("Ok"),
            ExitCode_latest::SYS_SENDER_INVALID => Some("SysErrSenderInvalid"),
            ExitCode_latest::SYS_SENDER_STATE_INVALID => Some("SysErrSenderStateInvalid"),
            ExitCode_latest::SYS_ILLEGAL_INSTRUCTION => Some("SysErrIllegalInstruction"),
            ExitCode_latest::SYS_INVALID_RECEIVER => Some("SysErrInvalidReceiver"),
            ExitCode_latest::SYS_INSUFFICIENT_FUNDS => Some("SysErrInsufficientFunds"),
            ExitCode_latest::SYS_OUT_OF_GAS => Some("SysErrOutOfGas"),
            ExitCode_latest::SYS_ILLEGAL_EXIT_CODE => Some("SysErrIllegalExitCode"),
            ExitCode_latest::SYS_ASSERTION_FAILED => Some("SysFatal"),
            ExitCode_latest::SYS_MISSING_RETURN => Some("SysErrMissingReturn"),

            ExitCode_latest::USR_ILLEGAL_ARGUMENT => Some("ErrIllegalArgument"),
            ExitCode_latest::USR_NOT_FOUND => Some("ErrNotFound"),
            ExitCode_latest::USR_FORBIDDEN => Some("ErrForbidden"),
            ExitCode_latest::USR_INSUFFICIENT_FUNDS => Some("ErrInsufficientFunds"),
            ExitCode_latest::USR_ILLEGAL_STATE => Some("ErrIllegalState"),
            ExitCode_latest::USR_SERIALIZATION => Some("ErrSerialization"),
            ExitCode_latest::USR_UNHANDLED_MESSAGE => Some("ErrUnhandledMessage"),
            ExitCode_latest::USR_UNSPECIFIED => Some("ErrUnspecified"),
            ExitCode_latest::USR_ASSERTION_FAILED => Some("ErrAssertionFailed"),

            _ => None,
        };
        if let Some(name) = name {
            write!(f, "{}({})", name, self.value())
        } else {
            write!(f, "{}", self.value())
        }
    }
}

impl ExitCode {
    pub const OK: Self = Self::new(ExitCode_latest::OK);

    /// The message sender doesn't exist or is not a valid top-level caller.
    pub const SYS_SENDER_INVALID: Self = Self::new(ExitCode_latest::SYS_SENDER_INVALID);

    /// The message sender was in an invalid state to send this message
    /// (wrong call sequence number or unable to cover the gas).
    pub const SYS_SENDER_STATE_INVALID: Self =
        Self::new(ExitCode_latest::SYS_SENDER_STATE_INVALID);

    /// The message receiver doesn't exist and can't be automatically created.
    pub const SYS_INVALID_RECEIVER: Self = Self::new(ExitCode_latest::SYS_INVALID_RECEIVER);

    /// Message execution (including sub-calls) used more gas than the specified limit.
    pub const SYS_OUT_OF_GAS: Self = Self::new(ExitCode_latest::SYS_OUT_OF_GAS);

    /// The message sender didn't have the requisite funds.
    pub const SYS_INSUFFICIENT_FUNDS: Self = Self::new(ExitCode_latest::SYS_INSUFFICIENT_FUNDS);

    pub const USR_ILLEGAL_ARGUMENT: Self = Self::new(ExitCode_latest::USR_ILLEGAL_ARGUMENT);
    pub const USR_UNHANDLED_MESSAGE: Self = Self::new(ExitCode_latest::USR_UNHANDLED_MESSAGE);
    pub const USR_FORBIDDEN: Self = Self::new(ExitCode_latest::USR_FORBIDDEN);

    pub fn value(&self) -> u32 {
        self.0.value()
    }

    pub fn is_success(&self) -> bool {
        self.0.is_success()
    }

    /// Exit codes with which a message is rejected before execution. The
    /// sender is not charged, the block's miner is penalized instead.
    pub fn is_sender_rejection(&self) -> bool {
        *self == Self::SYS_SENDER_INVALID || *self == Self::SYS_SENDER_STATE_INVALID
    }

    pub const fn new(value: ExitCode_latest) -> Self {
        Self(value)
    }
}

impl From<u32> for ExitCode {
    fn from(value: u32) -> Self {
        Self(ExitCode_latest::new(value))
    }
}
