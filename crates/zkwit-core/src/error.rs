//! Error taxonomy shared by every zkwit crate.
//!
//! Variants fall into three classes:
//! - **data** errors: the caller's values cannot be encoded or do not satisfy
//!   the circuit ([`Error::is_data_error`]);
//! - **programmer / configuration** errors: wrong backend, disabled backend,
//!   broken circuit artifact;
//! - **runtime** errors: timeouts and failed blocking tasks.
//!
//! A cryptographically invalid proof is *not* an error; verifiers return
//! `Ok(false)` for it.

use std::time::Duration;

use thiserror::Error;

use crate::artifact::BackendKind;

/// Result alias used across zkwit.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Every failure a zkwit library call can surface.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A primitive value cannot be represented in its target scalar range.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// A bounded container was requested with zero capacity.
    #[error("bounded container capacity must be positive")]
    ZeroCapacity,

    /// Appending would overflow a bounded container (nothing was appended).
    #[error(
        "capacity exceeded: cannot append {requested} element(s) to a container holding {len} of {capacity}"
    )]
    CapacityExceeded {
        /// Fixed capacity of the container.
        capacity: usize,
        /// Logical length at the time of the call.
        len: usize,
        /// Number of elements the call tried to append.
        requested: usize,
    },

    /// A value's runtime shape has no witness encoding (or does not match the ABI).
    #[error("unsupported shape at `{path}`: {reason}")]
    UnsupportedShape {
        /// Dotted path of the offending value (`message.storage[3]`).
        path: String,
        /// Human-readable reason.
        reason: String,
    },

    /// The constraint system is not satisfiable for the given inputs.
    #[error("witness error at opcode {opcode}: {reason}")]
    Witness {
        /// Index of the failing opcode in the program.
        opcode: usize,
        /// Human-readable reason.
        reason: String,
    },

    /// A proof was presented to a verifier for a different backend.
    #[error("backend mismatch: proof was produced by `{proof}` but `{expected}` was requested")]
    BackendMismatch {
        /// Tag carried by the proof.
        proof: BackendKind,
        /// Tag requested by the caller.
        expected: BackendKind,
    },

    /// The requested backend is not enabled for this prover session.
    #[error("backend `{0}` is not enabled for this prover")]
    BackendNotEnabled(BackendKind),

    /// The compiled circuit artifact cannot be decoded or is inconsistent.
    #[error("invalid circuit artifact: {0}")]
    InvalidCircuit(String),

    /// Proof bytes cannot be parsed by the selected backend.
    #[error("malformed `{backend}` proof: {reason}")]
    MalformedProof {
        /// Backend that tried to parse the bytes.
        backend: BackendKind,
        /// Parser diagnostic.
        reason: String,
    },

    /// An orchestrated call exceeded its configured deadline.
    #[error("{operation} timed out after {after:?}")]
    Timeout {
        /// Which call timed out (`prove`, `verify`, `derive_keys`).
        operation: &'static str,
        /// Configured deadline.
        after: Duration,
    },

    /// A blocking backend task panicked or was aborted.
    #[error("backend task failed: {0}")]
    Backend(String),
}

impl Error {
    /// Shorthand for [`Error::UnsupportedShape`].
    pub fn shape(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UnsupportedShape {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for [`Error::Witness`].
    pub fn witness(opcode: usize, reason: impl Into<String>) -> Self {
        Self::Witness {
            opcode,
            reason: reason.into(),
        }
    }

    /// Shorthand for [`Error::MalformedProof`].
    pub fn malformed(backend: BackendKind, reason: impl ToString) -> Self {
        Self::MalformedProof {
            backend,
            reason: reason.to_string(),
        }
    }

    /// `true` for errors caused by the application's data rather than by
    /// programming, configuration, or the runtime.
    #[must_use]
    pub const fn is_data_error(&self) -> bool {
        matches!(
            self,
            Self::Encoding(_)
                | Self::ZeroCapacity
                | Self::CapacityExceeded { .. }
                | Self::UnsupportedShape { .. }
                | Self::Witness { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_errors() {
        assert!(Error::witness(3, "x").is_data_error());
        assert!(Error::CapacityExceeded {
            capacity: 1,
            len: 1,
            requested: 1
        }
        .is_data_error());
        assert!(!Error::BackendMismatch {
            proof: BackendKind::Honk,
            expected: BackendKind::Plonk
        }
        .is_data_error());
        assert!(!Error::malformed(BackendKind::Plonk, "eof").is_data_error());
    }

    #[test]
    fn messages_name_the_backends() {
        let e = Error::BackendMismatch {
            proof: BackendKind::Honk,
            expected: BackendKind::Plonk,
        };
        assert_eq!(
            e.to_string(),
            "backend mismatch: proof was produced by `honk` but `plonk` was requested"
        );
    }
}
