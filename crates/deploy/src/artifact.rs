//! Contract artifact resolution.
//!
//! The build toolchain (Hardhat or Foundry) compiles contracts into a
//! directory of JSON artifacts. This module walks that directory to turn a
//! contract name into its ABI and creation bytecode.

use std::fs;
use std::path::{Path, PathBuf};

use alloy_core::primitives::Bytes;
use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;

/// A compiled contract: its ABI plus creation bytecode.
#[derive(Debug, Clone)]
pub struct ContractArtifact {
    /// Name of the contract.
    pub contract_name: String,
    /// The contract's ABI, as emitted by the compiler.
    pub abi: Value,
    /// Creation bytecode.
    pub bytecode: Bytes,
}

/// On-disk artifact shape.
///
/// Hardhat carries the name in `contractName`; Foundry omits it, in which
/// case the file name is authoritative.
#[derive(Deserialize)]
struct RawArtifact {
    #[serde(rename = "contractName")]
    contract_name: Option<String>,
    abi: Value,
    bytecode: RawBytecode,
}

/// The two bytecode encodings found in the wild.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawBytecode {
    /// Hardhat: `"bytecode": "0x..."`.
    Hex(String),
    /// Foundry: `"bytecode": { "object": "0x..." }`.
    Object { object: String },
}

impl RawBytecode {
    fn into_hex(self) -> String {
        match self {
            RawBytecode::Hex(hex) => hex,
            RawBytecode::Object { object } => object,
        }
    }
}

impl ContractArtifact {
    /// Resolve `name` to an artifact by searching `artifacts_dir` for a
    /// `<name>.json` build output.
    pub fn resolve(artifacts_dir: &Path, name: &str) -> Result<Self> {
        if name.is_empty() {
            anyhow::bail!("Contract name must not be empty");
        }

        let file_name = format!("{}.json", name);
        let path = find_artifact_file(artifacts_dir, &file_name)?.with_context(|| {
            format!(
                "No artifact '{}' under {} - has the contract been compiled?",
                file_name,
                artifacts_dir.display()
            )
        })?;

        tracing::debug!(path = %path.display(), contract = %name, "Artifact resolved");
        Self::from_file(&path)
    }

    /// Load an artifact from a specific JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read artifact {}", path.display()))?;

        let raw: RawArtifact = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse artifact {}", path.display()))?;

        let contract_name = raw
            .contract_name
            .or_else(|| {
                path.file_stem()
                    .map(|stem| stem.to_string_lossy().into_owned())
            })
            .context("Artifact carries no contract name")?;

        let hex_code = raw.bytecode.into_hex();
        let bytecode = hex::decode(hex_code.trim_start_matches("0x"))
            .with_context(|| format!("Artifact {} has malformed bytecode", contract_name))?;

        if bytecode.is_empty() {
            anyhow::bail!(
                "Artifact {} has empty bytecode - is it an interface or abstract contract?",
                contract_name
            );
        }

        Ok(Self {
            contract_name,
            abi: raw.abi,
            bytecode: bytecode.into(),
        })
    }

    /// Number of arguments the contract's constructor takes.
    pub fn constructor_inputs(&self) -> usize {
        self.abi_entries()
            .find(|entry| entry["type"] == "constructor")
            .and_then(|constructor| constructor["inputs"].as_array().map(Vec::len))
            .unwrap_or(0)
    }

    /// Whether the ABI declares a zero-argument `initialize` function.
    pub fn has_default_initializer(&self) -> bool {
        self.abi_entries().any(|entry| {
            entry["type"] == "function"
                && entry["name"] == "initialize"
                && entry["inputs"].as_array().is_some_and(Vec::is_empty)
        })
    }

    fn abi_entries(&self) -> impl Iterator<Item = &Value> {
        self.abi.as_array().into_iter().flatten()
    }
}

/// Depth-first search of `dir` for a file named exactly `file_name`.
///
/// An exact match keeps Hardhat's `<name>.dbg.json` companions out of the
/// way without special-casing them.
fn find_artifact_file(dir: &Path, file_name: &str) -> Result<Option<PathBuf>> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("Failed to read artifacts directory {}", dir.display()))?;

    for entry in entries {
        let path = entry
            .with_context(|| format!("Failed to list artifacts directory {}", dir.display()))?
            .path();

        if path.is_dir() {
            if let Some(found) = find_artifact_file(&path, file_name)? {
                return Ok(Some(found));
            }
        } else if path.file_name().is_some_and(|name| name == file_name) {
            return Ok(Some(path));
        }
    }

    Ok(None)
}
