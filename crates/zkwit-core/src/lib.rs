//! zkwit-core — witness encoding, constraint programs and the backend seam.
//!
//! This crate defines the **stable boundary** used across zkwit crates:
//! - typed primitives and the fixed-capacity [`BoundedVec`],
//! - the witness serializer ([`to_witness`]) and circuit ABI,
//! - the constraint program, its solver and a small circuit builder,
//! - the [`Proof`] artifact and the [`ProvingBackend`] trait,
//! - JSON/TOML/CBOR file helpers.
//!
//! ```
//! use zkwit_core::{to_witness, BoundedVec, Inputs, Str, WitnessEncoding, U8};
//!
//! let key = Str::new("secret").as_bytes();
//! let mut bv = BoundedVec::new(8, U8::default)?;
//! bv.extend_from_slice(&key)?;
//! let doc = to_witness(&Inputs::new().with("key", bv), WitnessEncoding::Decimal)?;
//! assert_eq!(
//!     doc.to_json()?,
//!     r#"{"key":{"len":"6","storage":["115","101","99","114","101","116","0","0"]}}"#
//! );
//! # Ok::<(), zkwit_core::Error>(())
//! ```

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::doc_markdown,
    clippy::cast_possible_truncation
)]

/// Circuit interface types and parameter flattening.
pub mod abi;
/// Proof artifact and backend tags.
pub mod artifact;
/// Backend trait and shared params.
pub mod backend;
/// Hash gadgets evaluated by the solver and the verifiers.
pub mod blackbox;
/// Fixed-capacity container.
pub mod bounded;
/// Circuit builder and demo circuits.
pub mod builder;
/// Compiled circuit and constraint program.
pub mod circuit;
/// Error taxonomy.
pub mod error;
/// JSON/TOML/CBOR helpers with extension auto-detection.
pub mod io;
/// Constraint solver.
pub mod solver;
/// Typed primitives and the input tree.
pub mod value;
/// Witness serializer and document.
pub mod witness;

pub use abi::{Abi, AbiParameter, AbiReturn, AbiType, Sign, Visibility};
pub use artifact::{BackendKind, Proof, UnknownBackend};
pub use backend::{BackendParams, ProvingBackend};
pub use bounded::BoundedVec;
pub use builder::{hmac_sha256_check_circuit, hmac_sha256_circuit, ByteVecWires, CircuitBuilder};
pub use circuit::{BlackBoxOp, CompiledCircuit, Expression, Opcode, PreparedCircuit, Program, Witness};
pub use error::{Error, Result};
pub use solver::{execute, Assignment};
pub use value::{
    Bool, Field, InputMap, InputValue, Inputs, Primitive, Str, WitnessEncoding, U16, U32, U64, U8,
};
pub use witness::{to_witness, WitnessDocument, WitnessValue};

pub use zkwit_field::{Fe, LiteralRadix};

/// Commonly-used items for quick imports.
///
/// ```rust
/// use zkwit_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        to_witness, BackendKind, BoundedVec, CompiledCircuit, Error, Inputs, Primitive, Proof,
        ProvingBackend, Str, WitnessDocument, WitnessEncoding, U8,
    };
}
