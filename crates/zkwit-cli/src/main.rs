// crates/zkwit-cli/src/main.rs

#![forbid(unsafe_code)]
#![deny(
    rust_2018_idioms,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo
)]

use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use zkwit_core::{
    hmac_sha256_check_circuit, hmac_sha256_circuit, io, to_witness, BackendKind, BoundedVec,
    InputValue, Inputs, Str, WitnessEncoding, U8,
};
use zkwit_prover::{Prover, ProverConfig};

#[derive(Parser, Debug)]
#[command(
    name = "zkwit",
    about = "zkwit reference CLI",
    long_about = "zkwit reference CLI.\n\nBuild witness documents from text inputs, execute compiled circuits, and produce/verify honk or plonk proofs.",
    version = env!("CARGO_PKG_VERSION"),
    disable_help_subcommand = true
)]
struct Cli {
    /// Prover config (TOML). `ZKWIT_*` environment overrides apply either way.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Write the HMAC-SHA256 demo circuit.
    DemoCircuit {
        /// Key capacity in bytes (>0)
        #[arg(long, default_value_t = 32, value_parser = clap::value_parser!(u32).range(1..))]
        key_capacity: u32,

        /// Message capacity in bytes (>0)
        #[arg(long, default_value_t = 64, value_parser = clap::value_parser!(u32).range(1..))]
        message_capacity: u32,

        /// Take a public `expected` MAC and assert equality instead of returning it
        #[arg(long, default_value_t = false)]
        check: bool,

        /// Output path (JSON)
        #[arg(long, default_value = "circuit.json")]
        out: PathBuf,
    },

    /// Build a witness document from text inputs.
    Witness {
        /// `name=text[:capacity]`, stored as a bounded byte vector
        #[arg(long = "input", value_name = "NAME=TEXT[:CAP]")]
        inputs: Vec<String>,

        /// `name=hexbytes`, stored as a fixed byte array
        #[arg(long = "bytes", value_name = "NAME=HEX")]
        byte_arrays: Vec<String>,

        /// Render scalars as 0x-prefixed hex
        #[arg(long, default_value_t = false)]
        hex: bool,

        /// Output path (JSON/TOML)
        #[arg(long, default_value = "witness.json")]
        out: PathBuf,
    },

    /// Solve a circuit for a witness and print its return value.
    Execute {
        /// Compiled circuit (JSON)
        #[arg(long)]
        circuit: PathBuf,

        /// Witness document (JSON/TOML)
        #[arg(long)]
        witness: PathBuf,
    },

    /// Produce a proof with the chosen backend.
    Prove {
        /// Proof backend
        #[arg(value_enum, long)]
        backend: BackendOpt,

        /// Compiled circuit (JSON)
        #[arg(long)]
        circuit: PathBuf,

        /// Witness document (JSON/TOML)
        #[arg(long)]
        witness: PathBuf,

        /// Output path for the proof (CBOR/JSON)
        #[arg(long, default_value = "proof.cbor")]
        out: PathBuf,
    },

    /// Verify a proof with the chosen backend; exits non-zero on rejection.
    Verify {
        /// Proof backend
        #[arg(value_enum, long)]
        backend: BackendOpt,

        /// Compiled circuit (JSON)
        #[arg(long)]
        circuit: PathBuf,

        /// Proof artifact (CBOR/JSON)
        #[arg(long)]
        proof: PathBuf,
    },
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, ValueEnum)]
enum BackendOpt {
    /// Transparent backend with batched residuals
    Honk,
    /// Universal-setup backend
    Plonk,
}

impl From<BackendOpt> for BackendKind {
    fn from(b: BackendOpt) -> Self {
        match b {
            BackendOpt::Honk => Self::Honk,
            BackendOpt::Plonk => Self::Plonk,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => ProverConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ProverConfig::from_env(),
    };

    match cli.cmd {
        Cmd::DemoCircuit {
            key_capacity,
            message_capacity,
            check,
            out,
        } => demo_circuit(key_capacity as usize, message_capacity as usize, check, out),

        Cmd::Witness {
            inputs,
            byte_arrays,
            hex,
            out,
        } => witness(&inputs, &byte_arrays, hex, out),

        Cmd::Execute { circuit, witness } => execute(config, circuit, witness),

        Cmd::Prove {
            backend,
            circuit,
            witness,
            out,
        } => prove(config, backend.into(), circuit, witness, out).await,

        Cmd::Verify {
            backend,
            circuit,
            proof,
        } => verify(config, backend.into(), circuit, proof).await,
    }
}

/// Initialize tracing with an env-driven filter (default INFO).
fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = fmt::layer().with_target(false).with_level(true).compact();

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

fn demo_circuit(key_cap: usize, msg_cap: usize, check: bool, out: PathBuf) -> Result<()> {
    info!(key_cap, msg_cap, check, "building demo circuit");
    let circuit = if check {
        hmac_sha256_check_circuit(key_cap, msg_cap)?
    } else {
        hmac_sha256_circuit(key_cap, msg_cap)?
    };
    io::write_circuit(&out, &circuit)?;
    println!(
        "Wrote {} ({} parameters)",
        out.display(),
        circuit.abi.parameters.len()
    );
    Ok(())
}

/// Parse `name=text[:capacity]`. A trailing `:N` is a capacity only if `N`
/// is an integer; otherwise it is part of the text.
fn parse_text_input(spec: &str) -> Result<(String, BoundedVec<U8>)> {
    let (name, rest) = spec
        .split_once('=')
        .ok_or_else(|| anyhow!("expected NAME=TEXT[:CAP], got `{spec}`"))?;
    let (text, cap) = match rest.rsplit_once(':') {
        Some((text, cap)) if cap.parse::<usize>().is_ok() => (text, cap.parse::<usize>()?),
        _ => (rest, rest.len()),
    };
    let bytes = Str::new(text).as_bytes();
    let bv = BoundedVec::from_slice(cap, &bytes, U8::default)
        .with_context(|| format!("input `{name}`"))?;
    Ok((name.to_owned(), bv))
}

fn parse_byte_array(spec: &str) -> Result<(String, Vec<U8>)> {
    let (name, hex_text) = spec
        .split_once('=')
        .ok_or_else(|| anyhow!("expected NAME=HEX, got `{spec}`"))?;
    let bytes = hex::decode(hex_text.trim_start_matches("0x"))
        .with_context(|| format!("bytes `{name}`"))?;
    Ok((name.to_owned(), bytes.into_iter().map(U8::new).collect()))
}

fn witness(inputs: &[String], byte_arrays: &[String], hex: bool, out: PathBuf) -> Result<()> {
    if inputs.is_empty() && byte_arrays.is_empty() {
        bail!("no inputs given (use --input NAME=TEXT[:CAP] or --bytes NAME=HEX)");
    }
    let mut map = Inputs::new();
    for spec in inputs {
        let (name, bv) = parse_text_input(spec)?;
        map.insert(name, bv);
    }
    for spec in byte_arrays {
        let (name, bytes) = parse_byte_array(spec)?;
        map.insert(name, InputValue::from(bytes));
    }
    let encoding = if hex {
        WitnessEncoding::Hex
    } else {
        WitnessEncoding::Decimal
    };
    let doc = to_witness(&map, encoding)?;
    io::write_witness_auto(&out, &doc)?;
    println!("Wrote {} ({} inputs)", out.display(), doc.len());
    Ok(())
}

fn session(config: ProverConfig, circuit: &Path) -> Result<Prover> {
    let compiled = io::read_circuit(circuit)?;
    Prover::new(&compiled, config).with_context(|| format!("preparing {}", circuit.display()))
}

fn execute(config: ProverConfig, circuit: PathBuf, witness: PathBuf) -> Result<()> {
    let prover = session(config, &circuit)?;
    let doc = io::read_witness_auto(&witness)?;
    let assignment = prover.execute_document(&doc)?;
    let encoding = prover.config().witness_encoding;
    match prover.circuit().abi().decode_return(&assignment.return_values, encoding) {
        Some(v) => println!("{}", serde_json::to_string_pretty(&v)?),
        None => println!("OK: constraints satisfied (no return value)"),
    }
    Ok(())
}

async fn prove(
    config: ProverConfig,
    backend: BackendKind,
    circuit: PathBuf,
    witness: PathBuf,
    out: PathBuf,
) -> Result<()> {
    info!(%backend, circuit=%circuit.display(), witness=%witness.display(), out=%out.display(), "proving");
    let prover = session(config, &circuit)?;
    let doc = io::read_witness_auto(&witness)?;
    let proof = prover
        .full_prove_document(&doc, backend)
        .await
        .with_context(|| format!("{backend} backend proof failed"))?;
    io::write_proof_auto(&out, &proof)
        .with_context(|| format!("writing proof to {}", out.display()))?;

    println!(
        "Proved with {}, wrote {} ({} bytes)",
        proof.backend,
        out.display(),
        proof.len()
    );
    Ok(())
}

async fn verify(
    config: ProverConfig,
    backend: BackendKind,
    circuit: PathBuf,
    proof: PathBuf,
) -> Result<()> {
    info!(%backend, circuit=%circuit.display(), proof=%proof.display(), "verifying proof");
    let prover = session(config, &circuit)?;
    let artifact = io::read_proof_auto(&proof)
        .with_context(|| format!("reading proof artifact from {}", proof.display()))?;
    let ok = prover
        .verify(&artifact, backend)
        .await
        .with_context(|| format!("{backend} backend verification failed"))?;
    if !ok {
        bail!("proof rejected");
    }
    println!("OK: proof verified");
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn text_input_with_and_without_capacity() {
        let (name, bv) = parse_text_input("key=secret").unwrap();
        assert_eq!(name, "key");
        assert_eq!((bv.len(), bv.capacity()), (6, 6));

        let (_, bv) = parse_text_input("message=hello:16").unwrap();
        assert_eq!((bv.len(), bv.capacity()), (5, 16));

        let (_, bv) = parse_text_input("url=a:b").unwrap();
        assert_eq!(bv.len(), 3);
    }

    #[test]
    fn text_input_errors() {
        assert!(parse_text_input("no-equals").is_err());
        assert!(parse_text_input("m=toolong:2").is_err());
    }

    #[test]
    fn byte_arrays_accept_prefix() {
        let (name, bytes) = parse_byte_array("expected=0x0aff").unwrap();
        assert_eq!(name, "expected");
        assert_eq!(bytes, vec![U8::new(10), U8::new(255)]);
        assert!(parse_byte_array("x=zz").is_err());
    }

    #[test]
    fn cli_parses_global_config_after_subcommand() {
        let cli = Cli::try_parse_from([
            "zkwit", "verify", "--backend", "plonk", "--circuit", "c.json", "--proof", "p.cbor",
            "--config", "zkwit.toml",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("zkwit.toml")));
        assert!(matches!(cli.cmd, Cmd::Verify { backend: BackendOpt::Plonk, .. }));
    }
}
