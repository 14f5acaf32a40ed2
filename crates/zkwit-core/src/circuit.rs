//! Compiled circuit artifact and the constraint program it carries.
//!
//! `bytecode` is the hex encoding of a CBOR-serialized [`Program`]. A program
//! is a list of opcodes over numbered witnesses; the first
//! `abi.parameter_field_count()` witnesses hold the flattened parameters.

use std::fmt;

use serde::{Deserialize, Serialize};
use zkwit_field::Fe;

use crate::abi::Abi;
use crate::blackbox::{hmac_sha256, read_bytes, sha256};
use crate::error::{Error, Result};

/// Digest domain for [`CompiledCircuit::digest`].
const CIRCUIT_DIGEST_DOMAIN: &[u8] = b"zkwit.circuit.v1";

/// Index of a witness slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Witness(pub u32);

impl Witness {
    /// Slot index as `usize`.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Witness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "w{}", self.0)
    }
}

/// `Σ q_m·a·b + Σ q_l·w + q_c`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expression {
    /// Quadratic terms `(q_m, a, b)`.
    pub mul_terms: Vec<(Fe, Witness, Witness)>,
    /// Linear terms `(q_l, w)`.
    pub linear_combinations: Vec<(Fe, Witness)>,
    /// Constant term.
    pub q_c: Fe,
}

impl Expression {
    /// The constant `c`.
    #[must_use]
    pub fn constant(c: Fe) -> Self {
        Self {
            q_c: c,
            ..Self::default()
        }
    }

    /// Add `coef·w`.
    #[must_use]
    pub fn term(mut self, coef: Fe, w: Witness) -> Self {
        self.linear_combinations.push((coef, w));
        self
    }

    /// Add `coef·a·b`.
    #[must_use]
    pub fn product(mut self, coef: Fe, a: Witness, b: Witness) -> Self {
        self.mul_terms.push((coef, a, b));
        self
    }

    /// Add a constant.
    #[must_use]
    pub fn plus(mut self, c: Fe) -> Self {
        self.q_c += c;
        self
    }

    /// Evaluate; `None` if any referenced witness is unassigned.
    pub fn evaluate(&self, get: &impl Fn(Witness) -> Option<Fe>) -> Option<Fe> {
        let mut acc = self.q_c;
        for &(q, a, b) in &self.mul_terms {
            acc += q * get(a)? * get(b)?;
        }
        for &(q, w) in &self.linear_combinations {
            acc += q * get(w)?;
        }
        Some(acc)
    }

    /// Every witness the expression references (with repeats).
    pub fn witnesses(&self) -> impl Iterator<Item = Witness> + '_ {
        self.mul_terms
            .iter()
            .flat_map(|&(_, a, b)| [a, b])
            .chain(self.linear_combinations.iter().map(|&(_, w)| w))
    }
}

/// Hash gadgets over byte witnesses with a runtime length.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlackBoxOp {
    /// `outputs = sha256(inputs[..len])`.
    Sha256 {
        /// Byte witnesses (capacity).
        inputs: Vec<Witness>,
        /// Live length.
        len: Witness,
        /// 32 output byte witnesses.
        outputs: Vec<Witness>,
    },
    /// `outputs = hmac_sha256(key[..key_len], message[..message_len])`.
    HmacSha256 {
        /// Key byte witnesses.
        key: Vec<Witness>,
        /// Live key length.
        key_len: Witness,
        /// Message byte witnesses.
        message: Vec<Witness>,
        /// Live message length.
        message_len: Witness,
        /// 32 output byte witnesses.
        outputs: Vec<Witness>,
    },
}

impl BlackBoxOp {
    /// Output witnesses.
    #[must_use]
    pub fn outputs(&self) -> &[Witness] {
        match self {
            Self::Sha256 { outputs, .. } | Self::HmacSha256 { outputs, .. } => outputs,
        }
    }

    /// Input witnesses (lengths included).
    #[must_use]
    pub fn inputs(&self) -> Vec<Witness> {
        match self {
            Self::Sha256 { inputs, len, .. } => {
                inputs.iter().copied().chain([*len]).collect()
            }
            Self::HmacSha256 {
                key,
                key_len,
                message,
                message_len,
                ..
            } => key
                .iter()
                .chain(message)
                .copied()
                .chain([*key_len, *message_len])
                .collect(),
        }
    }

    /// Compute the 32-byte digest from assigned inputs.
    ///
    /// # Errors
    /// A diagnostic when inputs are unassigned or out of range.
    pub fn compute(&self, get: &impl Fn(Witness) -> Option<Fe>) -> Result<[u8; 32], String> {
        match self {
            Self::Sha256 { inputs, len, .. } => Ok(sha256(&read_bytes(inputs, *len, get)?)),
            Self::HmacSha256 {
                key,
                key_len,
                message,
                message_len,
                ..
            } => {
                let k = read_bytes(key, *key_len, get)?;
                let m = read_bytes(message, *message_len, get)?;
                Ok(hmac_sha256(&k, &m))
            }
        }
    }

    const fn name(&self) -> &'static str {
        match self {
            Self::Sha256 { .. } => "sha256",
            Self::HmacSha256 { .. } => "hmac_sha256",
        }
    }
}

/// One constraint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Opcode {
    /// `expr == 0`.
    AssertZero(Expression),
    /// `input < 2^num_bits`.
    Range {
        /// Constrained witness.
        input: Witness,
        /// Bit bound.
        num_bits: u32,
    },
    /// Hash gadget.
    BlackBox(BlackBoxOp),
}

impl Opcode {
    /// Sorted, deduplicated witnesses this gate touches.
    #[must_use]
    pub fn wires(&self) -> Vec<Witness> {
        let mut ws: Vec<Witness> = match self {
            Self::AssertZero(e) => e.witnesses().collect(),
            Self::Range { input, .. } => vec![*input],
            Self::BlackBox(bb) => {
                let mut v = bb.inputs();
                v.extend_from_slice(bb.outputs());
                v
            }
        };
        ws.sort_unstable();
        ws.dedup();
        ws
    }

    /// Whether the gate holds under a complete assignment of its wires.
    ///
    /// # Errors
    /// A diagnostic naming the violated relation.
    pub fn check(&self, get: &impl Fn(Witness) -> Option<Fe>) -> Result<(), String> {
        match self {
            Self::AssertZero(e) => match e.evaluate(get) {
                None => Err("expression references an unassigned witness".to_owned()),
                Some(v) if v.is_zero() => Ok(()),
                Some(v) => Err(format!("expression evaluates to {v}, expected 0")),
            },
            Self::Range { input, num_bits } => {
                let v = get(*input).ok_or_else(|| format!("{input} is unassigned"))?;
                if v.num_bits() > *num_bits {
                    return Err(format!("{input} = {v} does not fit in {num_bits} bits"));
                }
                Ok(())
            }
            Self::BlackBox(bb) => {
                let digest = bb.compute(get)?;
                for (w, byte) in bb.outputs().iter().zip(digest) {
                    let v = get(*w).ok_or_else(|| format!("{w} is unassigned"))?;
                    if v != Fe::from(byte) {
                        return Err(format!("{} output {w} = {v}, expected {byte}", bb.name()));
                    }
                }
                Ok(())
            }
        }
    }

    /// Field residual of the gate: the expression value for `AssertZero`,
    /// and `0`/`1` (holds / violated) for the other opcodes.
    pub fn residual(&self, get: &impl Fn(Witness) -> Option<Fe>) -> Option<Fe> {
        match self {
            Self::AssertZero(e) => e.evaluate(get),
            _ => {
                if self.wires().into_iter().any(|w| get(w).is_none()) {
                    return None;
                }
                Some(Fe::from(self.check(get).is_err()))
            }
        }
    }
}

/// A constraint program over `num_witnesses` slots.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    /// Number of witness slots.
    pub num_witnesses: u32,
    /// Constraints in execution order.
    pub opcodes: Vec<Opcode>,
    /// Witnesses of public parameters.
    pub public_parameters: Vec<Witness>,
    /// Witnesses of the return value.
    pub return_values: Vec<Witness>,
}

impl Program {
    /// Public parameters then return values.
    #[must_use]
    pub fn public_witnesses(&self) -> Vec<Witness> {
        self.public_parameters
            .iter()
            .chain(&self.return_values)
            .copied()
            .collect()
    }

    /// Structural checks: in-range witnesses, 32-byte hash outputs, sane bit bounds.
    ///
    /// # Errors
    /// [`Error::InvalidCircuit`] on the first violation.
    pub fn validate(&self) -> Result<()> {
        let bad = |w: Witness| w.0 >= self.num_witnesses;
        for (i, op) in self.opcodes.iter().enumerate() {
            if let Some(w) = op.wires().into_iter().find(|&w| bad(w)) {
                return Err(Error::InvalidCircuit(format!(
                    "opcode {i} references {w} but the program has {} witnesses",
                    self.num_witnesses
                )));
            }
            match op {
                Opcode::Range { num_bits, .. } if *num_bits > 64 => {
                    return Err(Error::InvalidCircuit(format!(
                        "opcode {i}: range of {num_bits} bits exceeds the field"
                    )));
                }
                Opcode::BlackBox(bb) if bb.outputs().len() != 32 => {
                    return Err(Error::InvalidCircuit(format!(
                        "opcode {i}: {} must have 32 outputs",
                        bb.name()
                    )));
                }
                _ => {}
            }
        }
        if let Some(w) = self.public_witnesses().into_iter().find(|&w| bad(w)) {
            return Err(Error::InvalidCircuit(format!("public witness {w} out of range")));
        }
        Ok(())
    }

    /// Hex of the CBOR encoding.
    ///
    /// # Errors
    /// [`Error::InvalidCircuit`] if CBOR encoding fails.
    pub fn to_bytecode(&self) -> Result<String> {
        let mut buf = Vec::new();
        ciborium::ser::into_writer(self, &mut buf)
            .map_err(|e| Error::InvalidCircuit(format!("encode program: {e}")))?;
        Ok(hex::encode(buf))
    }

    /// Decode from [`Program::to_bytecode`] output.
    ///
    /// # Errors
    /// [`Error::InvalidCircuit`] for bad hex or CBOR.
    pub fn from_bytecode(bytecode: &str) -> Result<Self> {
        let bytes = hex::decode(bytecode.trim())
            .map_err(|e| Error::InvalidCircuit(format!("bytecode is not hex: {e}")))?;
        ciborium::de::from_reader(bytes.as_slice())
            .map_err(|e| Error::InvalidCircuit(format!("decode program: {e}")))
    }
}

/// The compiled artifact as it sits on disk.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledCircuit {
    /// Producer version.
    pub version: String,
    /// Interface.
    pub abi: Abi,
    /// Hex CBOR program.
    pub bytecode: String,
}

impl CompiledCircuit {
    /// Package a program with its ABI.
    ///
    /// # Errors
    /// [`Error::InvalidCircuit`] if the program cannot be encoded.
    pub fn new(abi: Abi, program: &Program) -> Result<Self> {
        Ok(Self {
            version: env!("CARGO_PKG_VERSION").to_owned(),
            abi,
            bytecode: program.to_bytecode()?,
        })
    }

    /// Decode the program.
    ///
    /// # Errors
    /// [`Error::InvalidCircuit`] for undecodable bytecode.
    pub fn program(&self) -> Result<Program> {
        Program::from_bytecode(&self.bytecode)
    }

    /// Blake3 digest binding ABI and bytecode.
    ///
    /// # Errors
    /// [`Error::InvalidCircuit`] if the ABI cannot be serialized.
    pub fn digest(&self) -> Result<[u8; 32]> {
        let abi = serde_json::to_vec(&self.abi)
            .map_err(|e| Error::InvalidCircuit(format!("serialize abi: {e}")))?;
        let mut h = blake3::Hasher::new();
        h.update(CIRCUIT_DIGEST_DOMAIN);
        h.update(&(abi.len() as u64).to_le_bytes());
        h.update(&abi);
        h.update(self.bytecode.trim().to_ascii_lowercase().as_bytes());
        Ok(*h.finalize().as_bytes())
    }

    /// Decode, validate and digest.
    ///
    /// # Errors
    /// [`Error::InvalidCircuit`] if the program is malformed or disagrees with the ABI.
    pub fn prepare(&self) -> Result<PreparedCircuit> {
        let program = self.program()?;
        program.validate()?;
        let (params, returns) = self.abi.validate()?;
        if params > program.num_witnesses as usize {
            return Err(Error::InvalidCircuit(format!(
                "ABI flattens to {params} fields but the program has {} witnesses",
                program.num_witnesses
            )));
        }
        if returns != program.return_values.len() {
            return Err(Error::InvalidCircuit(format!(
                "ABI returns {returns} fields but the program returns {}",
                program.return_values.len()
            )));
        }
        Ok(PreparedCircuit {
            digest: self.digest()?,
            abi: self.abi.clone(),
            program,
        })
    }
}

/// Decoded program, ABI and digest, ready for solving and proving.
#[derive(Clone, Debug)]
pub struct PreparedCircuit {
    abi: Abi,
    program: Program,
    digest: [u8; 32],
}

impl PreparedCircuit {
    /// Interface.
    #[must_use]
    pub const fn abi(&self) -> &Abi {
        &self.abi
    }

    /// Program.
    #[must_use]
    pub const fn program(&self) -> &Program {
        &self.program
    }

    /// Circuit digest.
    #[must_use]
    pub const fn digest(&self) -> [u8; 32] {
        self.digest
    }

    /// Number of opcodes.
    #[must_use]
    pub fn gate_count(&self) -> usize {
        self.program.opcodes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny() -> Program {
        // w2 = w0 * w1, w0 < 2^8
        Program {
            num_witnesses: 3,
            opcodes: vec![
                Opcode::AssertZero(
                    Expression::default()
                        .product(Fe::one(), Witness(0), Witness(1))
                        .term(-Fe::one(), Witness(2)),
                ),
                Opcode::Range {
                    input: Witness(0),
                    num_bits: 8,
                },
            ],
            public_parameters: vec![Witness(1)],
            return_values: vec![Witness(2)],
        }
    }

    #[test]
    fn bytecode_roundtrip() {
        let p = tiny();
        let back = Program::from_bytecode(&p.to_bytecode().unwrap()).unwrap();
        assert_eq!(back, p);
        assert!(matches!(
            Program::from_bytecode("zz"),
            Err(Error::InvalidCircuit(_))
        ));
    }

    #[test]
    fn gate_checks() {
        let p = tiny();
        let vals = [Fe::from_u64(3), Fe::from_u64(5), Fe::from_u64(15)];
        let get = |w: Witness| vals.get(w.index()).copied();
        assert!(p.opcodes.iter().all(|op| op.check(&get).is_ok()));
        let bad = [Fe::from_u64(300), Fe::from_u64(5), Fe::from_u64(1500)];
        let get_bad = |w: Witness| bad.get(w.index()).copied();
        assert!(p.opcodes[0].check(&get_bad).is_ok());
        assert!(p.opcodes[1].check(&get_bad).is_err());
        assert_eq!(p.opcodes[1].residual(&get_bad), Some(Fe::one()));
    }

    #[test]
    fn validate_catches_out_of_range_witness() {
        let mut p = tiny();
        p.num_witnesses = 2;
        assert!(matches!(p.validate(), Err(Error::InvalidCircuit(_))));
    }

    #[test]
    fn digest_tracks_bytecode() {
        let a = CompiledCircuit::new(Abi::default(), &tiny()).unwrap();
        let mut p = tiny();
        p.opcodes.pop();
        let b = CompiledCircuit::new(Abi::default(), &p).unwrap();
        assert_ne!(a.digest().unwrap(), b.digest().unwrap());
        assert_eq!(a.digest().unwrap(), a.clone().digest().unwrap());
    }

    #[test]
    fn prepare_rejects_unusable_abi_types() {
        use crate::abi::{AbiParameter, AbiReturn, AbiType, Sign, Visibility};

        let abi = |typ: AbiType| Abi {
            parameters: vec![
                AbiParameter {
                    name: "x".into(),
                    typ,
                    visibility: Visibility::Private,
                },
            ],
            return_type: Some(AbiReturn {
                abi_type: AbiType::Field,
                visibility: Visibility::Public,
            }),
        };
        let prepare = |typ| CompiledCircuit::new(abi(typ), &tiny()).unwrap().prepare();

        assert!(prepare(AbiType::Field).is_ok());
        let zero = AbiType::Integer {
            sign: Sign::Signed,
            width: 0,
        };
        assert!(matches!(prepare(zero), Err(Error::InvalidCircuit(_))));
        assert!(matches!(prepare(AbiType::unsigned(65)), Err(Error::InvalidCircuit(_))));
        let huge = AbiType::array(usize::MAX, AbiType::String { length: 2 });
        assert!(matches!(prepare(huge), Err(Error::InvalidCircuit(_))));
    }
}
