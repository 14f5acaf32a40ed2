//! Invariants for the fixed-capacity container and the witness serializer.
//!
//! These tests treat:
//! - [`BoundedVec`] as the only way variable-length data enters a circuit, so
//!   its padding and atomic-overflow behaviour must hold for every input, and
//! - [`to_witness`] as a pure function of the input tree.

use proptest::prelude::*;
use zkwit_core::{
    to_witness, BoundedVec, Error, InputValue, Inputs, Str, WitnessEncoding, WitnessValue, U8,
};

const FILL: u8 = 0xEE;

fn bytes_and_capacity() -> impl Strategy<Value = (Vec<u8>, usize)> {
    (1usize..64).prop_flat_map(|cap| (prop::collection::vec(any::<u8>(), 0..=cap), Just(cap)))
}

proptest! {
    /// Appending `b` (|b| <= capacity) yields len |b| and storage `b ++ filler`.
    #[test]
    fn padded_storage_is_data_then_filler((b, cap) in bytes_and_capacity()) {
        let mut bv = BoundedVec::new(cap, || FILL).unwrap();
        bv.extend_from_slice(&b).unwrap();
        prop_assert_eq!(bv.len(), b.len());
        prop_assert_eq!(bv.capacity(), cap);
        prop_assert_eq!(&bv.storage()[..b.len()], b.as_slice());
        prop_assert!(bv.storage()[b.len()..].iter().all(|&x| x == FILL));
    }

    /// An overflowing append fails and leaves length and contents untouched.
    #[test]
    fn overflow_is_atomic(
        (b, cap) in bytes_and_capacity(),
        extra in prop::collection::vec(any::<u8>(), 1..32),
    ) {
        let mut bv = BoundedVec::new(cap, || FILL).unwrap();
        bv.extend_from_slice(&b).unwrap();
        let before = bv.clone();
        let room = cap - b.len();
        let mut over = extra.clone();
        over.resize(room + extra.len(), 1);
        let err = bv.extend_from_slice(&over).unwrap_err();
        let is_capacity = matches!(err, Error::CapacityExceeded { capacity, len, requested }
                if capacity == cap && len == b.len() && requested == over.len());
        prop_assert!(is_capacity);
        prop_assert_eq!(bv, before);
    }

    /// Serializing the same inputs twice gives byte-identical documents.
    #[test]
    fn serialization_is_deterministic(
        (b, cap) in bytes_and_capacity(),
        text in "[a-z_]{1,16}",
        hex in any::<bool>(),
    ) {
        let enc = if hex { WitnessEncoding::Hex } else { WitnessEncoding::Decimal };
        let build = || {
            let bytes: Vec<U8> = b.iter().copied().map(U8::new).collect();
            let bv = BoundedVec::from_slice(cap, &bytes, U8::default).unwrap();
            Inputs::new()
                .with("data", bv)
                .with("label", Str::new(text.clone()))
                .with("bytes", Str::new(text.clone()).as_bytes())
        };
        let a = to_witness(&build(), enc).unwrap().to_json().unwrap();
        let z = to_witness(&build(), enc).unwrap().to_json().unwrap();
        prop_assert_eq!(a, z);
    }

    /// The serialized `len` always matches and storage always has `capacity` entries.
    #[test]
    fn serialized_container_carries_len((b, cap) in bytes_and_capacity()) {
        let bytes: Vec<U8> = b.iter().copied().map(U8::new).collect();
        let bv = BoundedVec::from_slice(cap, &bytes, U8::default).unwrap();
        let doc = to_witness(&Inputs::new().with("v", bv), WitnessEncoding::Decimal).unwrap();
        let Some(WitnessValue::Table(t)) = doc.get("v") else {
            return Err(TestCaseError::fail("expected a table"));
        };
        prop_assert_eq!(t.get("len"), Some(&WitnessValue::Scalar(b.len().to_string())));
        let Some(WitnessValue::Array(storage)) = t.get("storage") else {
            return Err(TestCaseError::fail("expected storage array"));
        };
        prop_assert_eq!(storage.len(), cap);
    }
}

#[test]
fn sequential_appends_stop_at_the_overflowing_call() {
    let mut bv = BoundedVec::new(6, U8::default).unwrap();
    bv.extend_from_slice(&Str::new("sec").as_bytes()).unwrap();
    bv.extend_from_slice(&Str::new("ret").as_bytes()).unwrap();
    assert!(matches!(
        bv.extend_from_slice(&Str::new("!").as_bytes()),
        Err(Error::CapacityExceeded { capacity: 6, len: 6, requested: 1 })
    ));
    assert_eq!(bv.as_slice(), Str::new("secret").as_bytes().as_slice());
}

#[test]
fn container_of_containers_must_share_capacity() {
    let a = BoundedVec::from_slice(2, &[U8::new(1)], U8::default).unwrap();
    let b = BoundedVec::from_slice(2, &[U8::new(2), U8::new(3)], U8::default).unwrap();
    let rows = InputValue::Array(vec![a.into(), b.into()]);
    let doc = to_witness(&Inputs::new().with("rows", rows), WitnessEncoding::Decimal).unwrap();
    assert_eq!(
        doc.to_json().unwrap(),
        r#"{"rows":[{"len":"1","storage":["1","0"]},{"len":"2","storage":["2","3"]}]}"#
    );
}
