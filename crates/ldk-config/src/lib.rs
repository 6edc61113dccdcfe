//! ldk-config
//!
//! Desk configuration: the instrument alias table, the suppression set, and
//! display preferences.  The engine crates take these as explicit parameters
//! and never read config themselves; this crate exists so hosts materialize
//! them from files in one audited way.
//!
//! Layering: YAML documents merge in order, later documents override earlier
//! ones key-by-key (deep merge on mappings, replace on everything else).
//! The merged document is canonicalized to JSON and hashed with SHA-256 so a
//! host can log exactly which configuration produced a report.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

/// Typed desk configuration.
///
/// `aliases` maps a raw instrument identifier to its canonical identifier —
/// e.g. a ticker that changed name, or two listings of the same underlying
/// security coalesced into one.  `suppressed` lists canonical identifiers to
/// hide from reports while fully exited (the normalizer re-evaluates the
/// condition on every run; suppression is not a blacklist).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeskConfig {
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
    #[serde(default)]
    pub suppressed: BTreeSet<String>,
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
}

fn default_currency_symbol() -> String {
    "₹".to_string()
}

impl Default for DeskConfig {
    fn default() -> Self {
        Self {
            aliases: BTreeMap::new(),
            suppressed: BTreeSet::new(),
            currency_symbol: default_currency_symbol(),
        }
    }
}

impl DeskConfig {
    /// Structural validation beyond what serde enforces.
    ///
    /// - alias keys and values must be non-blank
    /// - an alias target must itself be canonical (no chains: if `A → B`
    ///   then `B` must not appear as an alias key)
    /// - suppressed entries must be canonical identifiers, not alias keys
    pub fn validate(&self) -> Result<()> {
        for (from, to) in &self.aliases {
            if from.trim().is_empty() || to.trim().is_empty() {
                bail!("alias entries must be non-blank (got '{from}' -> '{to}')");
            }
            if self.aliases.contains_key(to) {
                bail!("alias chain detected: '{from}' -> '{to}' but '{to}' is itself aliased");
            }
        }
        for s in &self.suppressed {
            if s.trim().is_empty() {
                bail!("suppressed entries must be non-blank");
            }
            if self.aliases.contains_key(s) {
                bail!("suppressed instrument '{s}' is an alias key; suppress its canonical name");
            }
        }
        Ok(())
    }
}

/// A config plus the provenance a host logs alongside every report.
#[derive(Clone, Debug)]
pub struct LoadedConfig {
    pub config: DeskConfig,
    /// SHA-256 of the canonical JSON, hex encoded.
    pub config_hash: String,
    pub canonical_json: String,
}

/// Load and merge YAML config files in order (base first, overrides later).
///
/// An empty path list yields the defaults (still hashed, so "no config" is
/// itself a loggable configuration).
pub fn load_layered_yaml<P: AsRef<Path>>(paths: &[P]) -> Result<LoadedConfig> {
    let mut docs: Vec<String> = Vec::new();
    for p in paths {
        let p = p.as_ref();
        let raw = fs::read_to_string(p)
            .with_context(|| format!("failed to read config file: {}", p.display()))?;
        docs.push(raw);
    }
    let doc_refs: Vec<&str> = docs.iter().map(|s| s.as_str()).collect();
    load_layered_yaml_from_strings(&doc_refs)
}

/// Same as [`load_layered_yaml`], over in-memory documents.
pub fn load_layered_yaml_from_strings(yaml_docs: &[&str]) -> Result<LoadedConfig> {
    let mut merged = serde_json::to_value(DeskConfig::default())?;
    for raw in yaml_docs {
        let v_yaml: serde_yaml::Value = serde_yaml::from_str(raw).context("invalid yaml")?;
        if v_yaml.is_null() {
            continue; // empty document layers as a no-op
        }
        let v_json = serde_json::to_value(v_yaml).context("yaml->json conversion failed")?;
        merged = deep_merge(merged, v_json);
    }

    let config: DeskConfig =
        serde_json::from_value(merged.clone()).context("config does not match schema")?;
    config.validate()?;

    let canonical_json = canonicalize_json(&merged)?;
    let config_hash = sha256_hex(canonical_json.as_bytes());
    Ok(LoadedConfig {
        config,
        config_hash,
        canonical_json,
    })
}

fn deep_merge(a: Value, b: Value) -> Value {
    match (a, b) {
        (Value::Object(mut a_map), Value::Object(b_map)) => {
            for (k, b_val) in b_map {
                let a_val = a_map.remove(&k).unwrap_or(Value::Null);
                a_map.insert(k, deep_merge(a_val, b_val));
            }
            Value::Object(a_map)
        }
        (_, b_other) => b_other,
    }
}

fn canonicalize_json(v: &Value) -> Result<String> {
    // Key order is deterministic: DeskConfig serializes through BTree maps and
    // the merge inserts overrides in document order over that base.
    serde_json::to_string(v).context("canonical json serialize failed")
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}
