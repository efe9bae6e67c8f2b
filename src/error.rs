//! Error types for aurora-bridge.

use thiserror::Error;

use crate::abi::{self, RawStatus};

/// Result type alias using the bridge's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while driving the kernel.
///
/// The first four variants mirror the kernel's documented status codes;
/// `Unknown` preserves any code outside that set, and `Inconsistency` is
/// raised by the bridge itself when its local mirror and the kernel
/// disagree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A parameter was rejected, by the kernel or by a local guard
    #[error("invalid parameter")]
    InvalidParameter,

    /// Operation requires an initialized kernel
    #[error("kernel not initialized")]
    NotInitialized,

    /// The kernel was already initialized
    #[error("kernel already initialized")]
    AlreadyInitialized,

    /// The kernel ran out of memory
    #[error("kernel out of memory")]
    OutOfMemory,

    /// Status code outside the documented set, raw value preserved
    #[error("unknown kernel status {code}")]
    Unknown { code: RawStatus },

    /// The registry and the kernel disagree about state
    #[error("internal consistency violation: {detail}")]
    Inconsistency { detail: String },
}

impl Error {
    /// Create an internal-consistency error.
    pub fn inconsistency(detail: impl Into<String>) -> Self {
        Self::Inconsistency {
            detail: detail.into(),
        }
    }
}

/// Translate a raw kernel status into a `Result`.
///
/// Total over the documented code set; any other non-zero code becomes
/// [`Error::Unknown`] carrying the raw value, never a known category.
pub fn check(status: RawStatus) -> Result<()> {
    match status {
        abi::STATUS_OK => Ok(()),
        abi::STATUS_INVALID_PARAM => Err(Error::InvalidParameter),
        abi::STATUS_NOT_INITIALIZED => Err(Error::NotInitialized),
        abi::STATUS_ALREADY_INITIALIZED => Err(Error::AlreadyInitialized),
        abi::STATUS_OUT_OF_MEMORY => Err(Error::OutOfMemory),
        code => Err(Error::Unknown { code }),
    }
}
