#![no_main]
use libfuzzer_sys::fuzz_target;
use zkwit_core::{hmac_sha256_circuit, WitnessDocument};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(doc) = WitnessDocument::from_json(text) else {
        return;
    };
    if let Ok(prepared) = hmac_sha256_circuit(4, 4).and_then(|c| c.prepare()) {
        let _ = prepared.abi().encode(&doc);
    }
});
