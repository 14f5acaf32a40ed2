//! Session configuration: TOML file plus `ZKWIT_*` environment overrides.
//!
//! ```toml
//! backends = "all"        # all | honk | plonk
//! timeout_secs = 30       # 0 disables the deadline
//! # plonk_queries = 64  # unset checks every gate; a number spot-checks
//! # honk_queries = 64
//! witness_encoding = "decimal"
//! ```
//!
//! Recognized variables:
//! - `ZKWIT_BACKENDS` = `all` | `honk` | `plonk`
//! - `ZKWIT_TIMEOUT_SECS` = `<u64>`
//! - `ZKWIT_PLONK_QUERIES` = `<usize>` | `all`
//! - `ZKWIT_HONK_QUERIES` = `<usize>` | `all`
//!
//! Unparsable overrides are logged and ignored. Spot-checking is unsound
//! against a prover that grinds its commitment salts; leave the query
//! counts unset outside of benchmarks.

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;
use zkwit_core::{BackendKind, BackendParams, WitnessEncoding};

/// Which backends a session may use.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendSelection {
    /// Both reference backends.
    #[default]
    All,
    /// Honk only.
    Honk,
    /// Plonk only.
    Plonk,
}

impl BackendSelection {
    /// Whether `kind` is enabled.
    #[must_use]
    pub const fn enables(self, kind: BackendKind) -> bool {
        matches!(
            (self, kind),
            (Self::All, BackendKind::Honk | BackendKind::Plonk)
                | (Self::Honk, BackendKind::Honk)
                | (Self::Plonk, BackendKind::Plonk)
        )
    }
}

impl fmt::Display for BackendSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::All => "all",
            Self::Honk => "honk",
            Self::Plonk => "plonk",
        })
    }
}

impl FromStr for BackendSelection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "honk" => Ok(Self::Honk),
            "plonk" => Ok(Self::Plonk),
            other => Err(format!("unknown backend selection `{other}`")),
        }
    }
}

/// Prover session settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProverConfig {
    /// Enabled backends.
    pub backends: BackendSelection,
    /// Deadline for each orchestrated call, in seconds; `0` means none.
    pub timeout_secs: u64,
    /// Gates spot-checked by the PLONK backend; `None` checks all of them.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plonk_queries: Option<usize>,
    /// Gates spot-checked by the Honk backend; `None` checks all of them.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub honk_queries: Option<usize>,
    /// Radix used when serializing application inputs.
    pub witness_encoding: WitnessEncoding,
}

impl Default for ProverConfig {
    fn default() -> Self {
        let queries = BackendParams::default().queries;
        Self {
            backends: BackendSelection::All,
            timeout_secs: 0,
            plonk_queries: queries,
            honk_queries: queries,
            witness_encoding: WitnessEncoding::Decimal,
        }
    }
}

impl ProverConfig {
    /// Parse a TOML document (missing keys take defaults).
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).context("parse prover config TOML")
    }

    /// Read a TOML file and apply environment overrides.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read {}", path.display()))?;
        Ok(Self::from_toml_str(&text)?.with_env_overrides())
    }

    /// Defaults plus environment overrides.
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Apply `ZKWIT_*` variables from the process environment.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|k| std::env::var(k).ok())
    }

    /// Apply overrides from an arbitrary lookup.
    #[must_use]
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(v) = lookup("ZKWIT_BACKENDS") {
            match v.parse() {
                Ok(sel) => self.backends = sel,
                Err(e) => warn!(%e, "ignoring ZKWIT_BACKENDS"),
            }
        }
        override_num(&lookup, "ZKWIT_TIMEOUT_SECS", &mut self.timeout_secs);
        override_queries(&lookup, "ZKWIT_PLONK_QUERIES", &mut self.plonk_queries);
        override_queries(&lookup, "ZKWIT_HONK_QUERIES", &mut self.honk_queries);
        self
    }

    /// Deadline per call, if any.
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        if self.timeout_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.timeout_secs))
        }
    }

    /// Backend parameters for `kind`.
    #[must_use]
    pub fn params(&self, kind: BackendKind) -> BackendParams {
        let queries = match kind {
            BackendKind::Plonk => self.plonk_queries,
            _ => self.honk_queries,
        };
        BackendParams { queries }
    }
}

fn override_queries(lookup: &impl Fn(&str) -> Option<String>, key: &str, slot: &mut Option<usize>) {
    if let Some(raw) = lookup(key) {
        match raw.trim() {
            "all" => *slot = None,
            n => match n.parse() {
                Ok(v) => *slot = Some(v),
                Err(_) => warn!(key, value = %raw, "ignoring unparsable override"),
            },
        }
    }
}

fn override_num<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, slot: &mut T) {
    if let Some(raw) = lookup(key) {
        match raw.trim().parse::<T>() {
            Ok(v) => *slot = v,
            Err(_) => warn!(key, value = %raw, "ignoring unparsable override"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_with_partial_keys() {
        let c = ProverConfig::from_toml_str("backends = \"plonk\"\ntimeout_secs = 5\n").unwrap();
        assert_eq!(c.backends, BackendSelection::Plonk);
        assert_eq!(c.timeout(), Some(Duration::from_secs(5)));
        assert_eq!(c.honk_queries, None);
        assert_eq!(c.params(BackendKind::Honk), BackendParams::full());
        let c = ProverConfig::from_toml_str("plonk_queries = 16").unwrap();
        assert_eq!(c.params(BackendKind::Plonk), BackendParams::spot_check(16));
        assert!(ProverConfig::from_toml_str("bogus = 1").is_err());
    }

    #[test]
    fn overrides_apply_and_bad_values_are_ignored() {
        let c = ProverConfig::default().with_overrides(|k| match k {
            "ZKWIT_BACKENDS" => Some("honk".into()),
            "ZKWIT_HONK_QUERIES" => Some("8".into()),
            "ZKWIT_PLONK_QUERIES" => Some("lots".into()),
            _ => None,
        });
        assert_eq!(c.backends, BackendSelection::Honk);
        assert_eq!(c.params(BackendKind::Honk).queries, Some(8));
        assert_eq!(c.params(BackendKind::Plonk).queries, None);
        assert_eq!(c.timeout(), None);

        let c = c.with_overrides(|k| (k == "ZKWIT_HONK_QUERIES").then(|| "all".to_owned()));
        assert_eq!(c.params(BackendKind::Honk), BackendParams::full());
    }

    #[test]
    fn selection_gates_kinds() {
        assert!(BackendSelection::All.enables(BackendKind::Plonk));
        assert!(!BackendSelection::Honk.enables(BackendKind::Plonk));
        assert!(!BackendSelection::All.enables(BackendKind::Unknown));
        assert_eq!("PLONK".parse::<BackendSelection>(), Ok(BackendSelection::Plonk));
    }
}
