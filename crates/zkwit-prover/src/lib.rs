//! zkwit-prover — async prover sessions.
//!
//! A [`Prover`] owns one prepared circuit and a per-backend key cache. Its
//! `full_prove` serializes the application's inputs, ABI-encodes and solves
//! them synchronously, then runs the selected backend on tokio's blocking
//! pool. `verify` checks the backend tag before any backend code runs.
//!
//! ```no_run
//! # async fn demo() -> zkwit_core::Result<()> {
//! use zkwit_core::{hmac_sha256_circuit, BackendKind, BoundedVec, Inputs, Str, U8};
//! use zkwit_prover::{Prover, ProverConfig};
//!
//! let circuit = hmac_sha256_circuit(6, 11)?;
//! let prover = Prover::new(&circuit, ProverConfig::default())?;
//! let inputs = Inputs::new()
//!     .with("key", BoundedVec::from_slice(6, &Str::new("secret").as_bytes(), U8::default)?)
//!     .with("message", BoundedVec::from_slice(11, &Str::new("hello_world").as_bytes(), U8::default)?);
//! let proof = prover.full_prove(&inputs, BackendKind::Honk).await?;
//! assert!(prover.verify(&proof, BackendKind::Honk).await?);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::missing_errors_doc,
    clippy::module_name_repetitions,
    clippy::cast_possible_truncation
)]

/// Backend key union.
pub mod backend;
/// Session configuration.
pub mod config;
mod session;
/// Session lifecycle.
pub mod state;

pub use backend::BackendKeys;
pub use config::{BackendSelection, ProverConfig};
pub use session::Prover;
pub use state::ProverState;
