#![no_main]
use libfuzzer_sys::fuzz_target;
use zkwit_core::Program;

fuzz_target!(|data: &[u8]| {
    if let Ok(p) = Program::from_bytecode(&hex_of(data)) {
        let _ = p.validate();
    }
});

fn hex_of(data: &[u8]) -> String {
    data.iter().map(|b| format!("{b:02x}")).collect()
}
