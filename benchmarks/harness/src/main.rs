//! zkwit-bench-harness
//!
//! Run small end-to-end benchmarks (witness -> execute -> keys -> prove -> verify)
//! on the HMAC demo circuit and append CSV rows into
//! `benchmarks/reports/bench-<unix>.csv`.
//!
//! Usage examples:
//!   cargo run -p zkwit-bench-harness -- --profile configs/profiles/small.toml --backend honk
//!   cargo run -p zkwit-bench-harness -- --profile configs/profiles/medium.toml --backend plonk

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use zkwit_core::{
    hmac_sha256_circuit, to_witness, BackendKind, BoundedVec, Inputs, WitnessEncoding, U8,
};
use zkwit_prover::{Prover, ProverConfig};

#[derive(Debug, Deserialize)]
struct Profile {
    /// Key capacity in bytes
    key_capacity: usize,
    /// Message capacity in bytes
    message_capacity: usize,
    /// Gates spot-checked per proof; every gate when absent
    #[serde(default)]
    queries: Option<usize>,
    /// Repetitions of the whole pipeline
    repeats: u32,
}

fn parse_flag(name: &str, default: &str) -> String {
    let mut it = std::env::args().skip(1);
    while let Some(k) = it.next() {
        if k == format!("--{name}") {
            return it.next().unwrap_or_else(|| default.to_string());
        }
    }
    default.to_string()
}

const fn dur_ms(d: Duration) -> u128 {
    d.as_millis()
}

/// Deterministic filler bytes filling `cap`.
fn filled(cap: usize, seed: u8) -> Result<BoundedVec<U8>> {
    let data: Vec<U8> = (0..cap)
        .map(|i| U8::new((i as u8).wrapping_mul(31).wrapping_add(seed)))
        .collect();
    Ok(BoundedVec::from_slice(cap, &data, U8::default)?)
}

fn main() -> Result<()> {
    let profile_path = PathBuf::from(parse_flag("profile", "configs/profiles/small.toml"));
    let backend_str = parse_flag("backend", "honk");
    let backend: BackendKind = match backend_str.parse() {
        Ok(kind) => kind,
        Err(e) => bail!("{e} (use honk|plonk)"),
    };

    let profile_src = fs::read_to_string(&profile_path)
        .with_context(|| format!("read profile {}", profile_path.display()))?;
    let profile: Profile = toml::from_str(&profile_src).context("parse profile toml")?;
    let queries = profile
        .queries
        .map_or_else(|| "all".to_string(), |q| q.to_string());
    println!(
        "Profile: key={}, message={}, queries={queries}, repeats={}, backend={backend_str}",
        profile.key_capacity, profile.message_capacity, profile.repeats
    );

    let rt = tokio::runtime::Runtime::new().context("start tokio runtime")?;
    let circuit = hmac_sha256_circuit(profile.key_capacity, profile.message_capacity)?;

    fs::create_dir_all("benchmarks/reports").ok();
    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .context("system clock before 1970")?
        .as_secs();
    let csv_path = PathBuf::from(format!("benchmarks/reports/bench-{ts}.csv"));
    let mut csv = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&csv_path)?;
    writeln!(csv, "timestamp,backend,key_cap,msg_cap,queries,repeat,stage,ms,extra")?;

    for rep in 0..profile.repeats {
        let row = |stage: &str, d: Duration, extra: String| {
            format!(
                "{ts},{backend_str},{},{},{queries},{rep},{stage},{},{extra}",
                profile.key_capacity,
                profile.message_capacity,
                dur_ms(d)
            )
        };

        // Fresh session per repeat so key derivation is measured every time.
        let config = ProverConfig {
            plonk_queries: profile.queries,
            honk_queries: profile.queries,
            ..ProverConfig::default()
        };
        let prover = Prover::new(&circuit, config)?;

        // 1) witness serialization
        let t0 = Instant::now();
        let inputs = Inputs::new()
            .with("key", filled(profile.key_capacity, rep as u8)?)
            .with("message", filled(profile.message_capacity, 7)?);
        let doc = to_witness(&inputs, WitnessEncoding::Decimal)?;
        writeln!(csv, "{}", row("witness", t0.elapsed(), format!("inputs={}", doc.len())))?;

        // 2) ABI encode + solve
        let t0 = Instant::now();
        let assignment = prover.execute_document(&doc)?;
        writeln!(
            csv,
            "{}",
            row("execute", t0.elapsed(), format!("witnesses={}", assignment.values.len()))
        )?;

        // 3) keys
        let t0 = Instant::now();
        rt.block_on(prover.prepare(backend))?;
        writeln!(
            csv,
            "{}",
            row("keys", t0.elapsed(), format!("gates={}", prover.circuit().gate_count()))
        )?;

        // 4) prove
        let t0 = Instant::now();
        let proof = rt.block_on(prover.full_prove_document(&doc, backend))?;
        writeln!(
            csv,
            "{}",
            row("prove", t0.elapsed(), format!("proof_bytes={}", proof.len()))
        )?;

        // 5) verify
        let t0 = Instant::now();
        let ok = rt.block_on(prover.verify(&proof, backend))?;
        if !ok {
            bail!("repeat {rep}: proof did not verify");
        }
        writeln!(
            csv,
            "{}",
            row("verify", t0.elapsed(), format!("circuit={}", hex::encode(&proof.circuit_digest[..8])))
        )?;
    }

    println!("Wrote report → {}", csv_path.display());
    Ok(())
}
