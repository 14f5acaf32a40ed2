//! Session lifecycle.

use std::fmt;

/// Most recent lifecycle state of a [`Prover`](crate::Prover) session.
///
/// `Uninitialized → Ready → Proving → Proved → Verifying → Verified | Rejected`.
/// A failed call returns the session to `Ready` if it holds keys for that
/// backend and otherwise leaves the state unchanged.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ProverState {
    /// No keys derived yet.
    #[default]
    Uninitialized,
    /// Keys available for at least one backend.
    Ready,
    /// A proof is being generated.
    Proving,
    /// The last proof finished.
    Proved,
    /// A proof is being checked.
    Verifying,
    /// The last verification accepted.
    Verified,
    /// The last verification rejected.
    Rejected,
}

impl ProverState {
    /// Lowercase name used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Ready => "ready",
            Self::Proving => "proving",
            Self::Proved => "proved",
            Self::Verifying => "verifying",
            Self::Verified => "verified",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ProverState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
