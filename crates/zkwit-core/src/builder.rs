//! Programmatic circuit construction and the HMAC-SHA256 demo circuits.
//!
//! Parameters must be declared before any intermediate witness is allocated,
//! so that the flattened ABI occupies the witness prefix the solver fills.

use tracing::debug;
use zkwit_field::Fe;

use crate::abi::{Abi, AbiParameter, AbiReturn, AbiType, Visibility};
use crate::circuit::{BlackBoxOp, CompiledCircuit, Expression, Opcode, Program, Witness};
use crate::error::{Error, Result};

/// Wires of a `BoundedVec<u8, N>` parameter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ByteVecWires {
    /// One witness per storage slot.
    pub storage: Vec<Witness>,
    /// Logical length.
    pub len: Witness,
}

/// Incremental builder for a [`CompiledCircuit`].
#[derive(Debug, Default)]
pub struct CircuitBuilder {
    abi: Abi,
    next: u32,
    sealed: bool,
    opcodes: Vec<Opcode>,
    public_parameters: Vec<Witness>,
    return_values: Vec<Witness>,
}

impl CircuitBuilder {
    /// Empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn alloc(&mut self, n: usize) -> Vec<Witness> {
        let start = self.next;
        self.next += n as u32;
        (start..self.next).map(Witness).collect()
    }

    /// Declare a parameter and return its flattened wires.
    ///
    /// # Errors
    /// [`Error::InvalidCircuit`] after an intermediate witness was allocated,
    /// or for a duplicate name.
    pub fn parameter(&mut self, name: &str, typ: AbiType, visibility: Visibility) -> Result<Vec<Witness>> {
        if self.sealed {
            return Err(Error::InvalidCircuit(format!(
                "parameter `{name}` declared after intermediate witnesses"
            )));
        }
        if self.abi.parameters.iter().any(|p| p.name == name) {
            return Err(Error::InvalidCircuit(format!("duplicate parameter `{name}`")));
        }
        let wires = self.alloc(typ.validate(name)?);
        if visibility == Visibility::Public {
            self.public_parameters.extend_from_slice(&wires);
        }
        self.abi.parameters.push(AbiParameter {
            name: name.to_owned(),
            typ,
            visibility,
        });
        Ok(wires)
    }

    /// Declare a `BoundedVec<u8, capacity>` parameter.
    ///
    /// # Errors
    /// [`Error::ZeroCapacity`] for `capacity == 0`; otherwise as [`Self::parameter`].
    pub fn byte_vec_parameter(
        &mut self,
        name: &str,
        capacity: usize,
        visibility: Visibility,
    ) -> Result<ByteVecWires> {
        if capacity == 0 {
            return Err(Error::ZeroCapacity);
        }
        let mut wires = self.parameter(
            name,
            AbiType::bounded_vec(capacity, AbiType::unsigned(8)),
            visibility,
        )?;
        let len = wires.pop().ok_or(Error::ZeroCapacity)?;
        Ok(ByteVecWires { storage: wires, len })
    }

    /// Fresh intermediate witness.
    pub fn witness(&mut self) -> Witness {
        self.sealed = true;
        self.next += 1;
        Witness(self.next - 1)
    }

    /// Emit `e == 0`.
    pub fn assert_zero(&mut self, e: Expression) {
        self.opcodes.push(Opcode::AssertZero(e));
    }

    /// Emit `a == b`.
    pub fn assert_equal(&mut self, a: Witness, b: Witness) {
        self.assert_zero(Expression::default().term(Fe::one(), a).term(-Fe::one(), b));
    }

    /// Emit `w < 2^num_bits`.
    pub fn range(&mut self, w: Witness, num_bits: u32) {
        self.opcodes.push(Opcode::Range { input: w, num_bits });
    }

    /// Emit `w <= bound` for a 32-bit `w` through a range-checked slack witness.
    pub fn assert_le(&mut self, w: Witness, bound: u32) {
        let slack = self.witness();
        self.assert_zero(
            Expression::constant(-Fe::from(bound))
                .term(Fe::one(), slack)
                .term(Fe::one(), w),
        );
        self.range(slack, 32);
    }

    /// Range-check every storage byte and bound `len` by the capacity.
    pub fn constrain_bytes(&mut self, v: &ByteVecWires) {
        for &w in &v.storage {
            self.range(w, 8);
        }
        self.range(v.len, 32);
        self.assert_le(v.len, v.storage.len() as u32);
    }

    /// `sha256(inputs[..len])` as 32 byte witnesses.
    pub fn sha256(&mut self, inputs: &ByteVecWires) -> Vec<Witness> {
        let outputs: Vec<Witness> = (0..32).map(|_| self.witness()).collect();
        self.opcodes.push(Opcode::BlackBox(BlackBoxOp::Sha256 {
            inputs: inputs.storage.clone(),
            len: inputs.len,
            outputs: outputs.clone(),
        }));
        outputs
    }

    /// `hmac_sha256(key[..key.len], message[..message.len])` as 32 byte witnesses.
    pub fn hmac_sha256(&mut self, key: &ByteVecWires, message: &ByteVecWires) -> Vec<Witness> {
        let outputs: Vec<Witness> = (0..32).map(|_| self.witness()).collect();
        self.opcodes.push(Opcode::BlackBox(BlackBoxOp::HmacSha256 {
            key: key.storage.clone(),
            key_len: key.len,
            message: message.storage.clone(),
            message_len: message.len,
            outputs: outputs.clone(),
        }));
        outputs
    }

    /// Set the (public) return value.
    ///
    /// # Errors
    /// [`Error::InvalidCircuit`] if `wires` does not match `typ`.
    pub fn return_value(&mut self, wires: Vec<Witness>, typ: AbiType) -> Result<()> {
        if wires.len() != typ.field_count() {
            return Err(Error::InvalidCircuit(format!(
                "return type flattens to {} fields, got {} wires",
                typ.field_count(),
                wires.len()
            )));
        }
        self.return_values = wires;
        self.abi.return_type = Some(AbiReturn {
            abi_type: typ,
            visibility: Visibility::Public,
        });
        Ok(())
    }

    /// Finish the circuit.
    ///
    /// # Errors
    /// [`Error::InvalidCircuit`] if the program fails validation.
    pub fn build(self) -> Result<CompiledCircuit> {
        let program = Program {
            num_witnesses: self.next,
            opcodes: self.opcodes,
            public_parameters: self.public_parameters,
            return_values: self.return_values,
        };
        program.validate()?;
        debug!(
            witnesses = program.num_witnesses,
            opcodes = program.opcodes.len(),
            params = self.abi.parameters.len(),
            "circuit built"
        );
        CompiledCircuit::new(self.abi, &program)
    }
}

fn byte_array(n: usize) -> AbiType {
    AbiType::array(n, AbiType::unsigned(8))
}

/// `fn main(key: BoundedVec<u8, K>, message: BoundedVec<u8, M>) -> pub [u8; 32]`
/// returning `HMAC-SHA256(key, message)`.
///
/// # Errors
/// [`Error::ZeroCapacity`] if either capacity is zero.
pub fn hmac_sha256_circuit(key_capacity: usize, message_capacity: usize) -> Result<CompiledCircuit> {
    let mut b = CircuitBuilder::new();
    let key = b.byte_vec_parameter("key", key_capacity, Visibility::Private)?;
    let message = b.byte_vec_parameter("message", message_capacity, Visibility::Private)?;
    b.constrain_bytes(&key);
    b.constrain_bytes(&message);
    let mac = b.hmac_sha256(&key, &message);
    b.return_value(mac, byte_array(32))?;
    b.build()
}

/// `fn main(key, message, expected: pub [u8; 32])` asserting
/// `HMAC-SHA256(key, message) == expected`.
///
/// # Errors
/// [`Error::ZeroCapacity`] if either capacity is zero.
pub fn hmac_sha256_check_circuit(
    key_capacity: usize,
    message_capacity: usize,
) -> Result<CompiledCircuit> {
    let mut b = CircuitBuilder::new();
    let key = b.byte_vec_parameter("key", key_capacity, Visibility::Private)?;
    let message = b.byte_vec_parameter("message", message_capacity, Visibility::Private)?;
    let expected = b.parameter("expected", byte_array(32), Visibility::Public)?;
    b.constrain_bytes(&key);
    b.constrain_bytes(&message);
    for &w in &expected {
        b.range(w, 8);
    }
    let mac = b.hmac_sha256(&key, &message);
    for (m, e) in mac.into_iter().zip(expected) {
        b.assert_equal(m, e);
    }
    b.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blackbox::hmac_sha256;
    use crate::solver::execute;
    use crate::witness::WitnessDocument;

    fn doc(key: &str, cap_k: usize, msg: &str, cap_m: usize) -> WitnessDocument {
        let pad = |s: &str, cap: usize| {
            let mut v: Vec<String> = s.bytes().map(|b| b.to_string()).collect();
            v.resize(cap, "0".to_owned());
            serde_json::json!({ "storage": v, "len": s.len().to_string() })
        };
        let j = serde_json::json!({ "key": pad(key, cap_k), "message": pad(msg, cap_m) });
        WitnessDocument::from_json(&j.to_string()).unwrap()
    }

    #[test]
    fn hmac_circuit_computes_the_mac() {
        let c = hmac_sha256_circuit(8, 16).unwrap();
        let prepared = c.prepare().unwrap();
        let initial = prepared.abi().encode(&doc("secret", 8, "hello_world", 16)).unwrap();
        let a = execute(prepared.program(), &initial).unwrap();
        let mac: Vec<u8> = a.return_values.iter().map(|v| v.as_u64() as u8).collect();
        assert_eq!(mac, hmac_sha256(b"secret", b"hello_world").to_vec());
        assert_eq!(a.public_inputs, a.return_values);
    }

    #[test]
    fn len_beyond_capacity_is_a_witness_error() {
        let c = hmac_sha256_circuit(2, 2).unwrap();
        let prepared = c.prepare().unwrap();
        let j = r#"{"key":{"storage":["1","2"],"len":"3"},"message":{"storage":["0","0"],"len":"0"}}"#;
        let initial = prepared
            .abi()
            .encode(&WitnessDocument::from_json(j).unwrap())
            .unwrap();
        assert!(matches!(
            execute(prepared.program(), &initial),
            Err(Error::Witness { .. })
        ));
    }

    #[test]
    fn parameters_after_witnesses_are_rejected() {
        let mut b = CircuitBuilder::new();
        let _ = b.witness();
        assert!(b.parameter("x", AbiType::Field, Visibility::Private).is_err());
        assert!(matches!(hmac_sha256_circuit(0, 4), Err(Error::ZeroCapacity)));
    }

    #[test]
    fn check_circuit_marks_expected_public() {
        let c = hmac_sha256_check_circuit(4, 4).unwrap();
        let p = c.program().unwrap();
        assert_eq!(p.public_parameters.len(), 32);
        assert!(p.return_values.is_empty());
        assert!(c.abi.return_type.is_none());
    }
}
