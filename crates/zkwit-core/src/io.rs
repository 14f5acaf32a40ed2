//! File helpers for circuits, witness documents and proofs.
//!
//! Format is picked by extension: circuits are JSON, witness documents are
//! `.json` or `.toml`, proofs are `.json` or `.cbor`. Unknown extensions are
//! rejected for reads and fall back to JSON for writes. Parent directories are
//! created on write.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Cursor};
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::artifact::Proof;
use crate::circuit::CompiledCircuit;
use crate::witness::WitnessDocument;

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating parent directory {}", display(path)))?;
        }
    }
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let f = File::open(path).with_context(|| format!("open {}", display(path)))?;
    serde_json::from_reader(BufReader::new(f)).with_context(|| format!("deserialize JSON {what}"))
}

fn write_json<T: Serialize>(path: &Path, v: &T, what: &str) -> Result<()> {
    ensure_parent_dir(path)?;
    let f = File::create(path).with_context(|| format!("create {}", display(path)))?;
    serde_json::to_writer_pretty(BufWriter::new(f), v)
        .with_context(|| format!("serialize JSON {what}"))
}

/* ------------------------------ circuits ------------------------------ */

/// Read a compiled circuit (JSON).
pub fn read_circuit<P: AsRef<Path>>(path: P) -> Result<CompiledCircuit> {
    read_json(path.as_ref(), "compiled circuit")
}

/// Write a compiled circuit (pretty JSON).
pub fn write_circuit<P: AsRef<Path>>(path: P, c: &CompiledCircuit) -> Result<()> {
    write_json(path.as_ref(), c, "compiled circuit")
}

/* ------------------------------ witnesses ----------------------------- */

/// Read a witness document by extension (`.json` / `.toml`).
pub fn read_witness_auto<P: AsRef<Path>>(path: P) -> Result<WitnessDocument> {
    let path = path.as_ref();
    match ext_lower(path).as_deref() {
        Some("json") => read_json(path, "witness document"),
        Some("toml") => {
            let text = fs::read_to_string(path).with_context(|| format!("read {}", display(path)))?;
            WitnessDocument::from_toml(&text).with_context(|| "deserialize TOML witness document")
        }
        Some(other) => Err(anyhow!(
            "unsupported witness extension: {other} (supported: .json, .toml)"
        )),
        None => Err(anyhow!("path has no extension (expected .json or .toml)")),
    }
}

/// Write a witness document by extension (defaults to JSON).
pub fn write_witness_auto<P: AsRef<Path>>(path: P, doc: &WitnessDocument) -> Result<()> {
    let path = path.as_ref();
    if ext_lower(path).as_deref() == Some("toml") {
        ensure_parent_dir(path)?;
        let text = doc.to_toml().with_context(|| "serialize TOML witness document")?;
        fs::write(path, text).with_context(|| format!("write {}", display(path)))
    } else {
        write_json(path, doc, "witness document")
    }
}

/* -------------------------------- proofs ------------------------------ */

/// Read a proof from JSON.
pub fn read_proof_json<P: AsRef<Path>>(path: P) -> Result<Proof> {
    read_json(path.as_ref(), "proof")
}

/// Write a proof as pretty JSON.
pub fn write_proof_json<P: AsRef<Path>>(path: P, v: &Proof) -> Result<()> {
    write_json(path.as_ref(), v, "proof")
}

/// Read a proof from CBOR.
pub fn read_proof_cbor<P: AsRef<Path>>(path: P) -> Result<Proof> {
    let path_ref = path.as_ref();
    let f = File::open(path_ref).with_context(|| format!("open {}", display(path_ref)))?;
    let mut rdr = BufReader::new(f);
    ciborium::de::from_reader(&mut rdr).with_context(|| "deserialize CBOR proof")
}

/// Write a proof as CBOR.
pub fn write_proof_cbor<P: AsRef<Path>>(path: P, v: &Proof) -> Result<()> {
    let path_ref = path.as_ref();
    ensure_parent_dir(path_ref)?;
    let f = File::create(path_ref).with_context(|| format!("create {}", display(path_ref)))?;
    let mut w = BufWriter::new(f);
    ciborium::ser::into_writer(v, &mut w).with_context(|| "serialize CBOR proof")
}

/// Read a proof by extension (`.json` / `.cbor`).
pub fn read_proof_auto<P: AsRef<Path>>(path: P) -> Result<Proof> {
    match ext_lower(path.as_ref()).as_deref() {
        Some("json") => read_proof_json(path),
        Some("cbor") => read_proof_cbor(path),
        Some(other) => Err(anyhow!(
            "unsupported proof extension: {other} (supported: .json, .cbor)"
        )),
        None => Err(anyhow!("path has no extension (expected .json or .cbor)")),
    }
}

/// Write a proof by extension (defaults to JSON).
pub fn write_proof_auto<P: AsRef<Path>>(path: P, v: &Proof) -> Result<()> {
    match ext_lower(path.as_ref()).as_deref() {
        Some("cbor") => write_proof_cbor(path, v),
        _ => write_proof_json(path, v),
    }
}

/* --------------------------- in-memory CBOR --------------------------- */

/// Serialize any `T: Serialize` to CBOR bytes.
pub fn to_cbor<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    ciborium::ser::into_writer(value, &mut buf).with_context(|| "serialize CBOR (to_cbor)")?;
    Ok(buf)
}

/// Deserialize any `T: DeserializeOwned` from CBOR bytes.
pub fn from_cbor<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let mut cur = Cursor::new(bytes);
    let v = ciborium::de::from_reader(&mut cur).with_context(|| "deserialize CBOR (from_cbor)")?;
    Ok(v)
}

fn ext_lower(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
}

fn display(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
