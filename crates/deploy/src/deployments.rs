//! Record of deployed addresses.
//!
//! Each successful run can merge its result into a `deployments.json` file,
//! one entry per contract name. The file is this tool's own record of what
//! it deployed; nothing reads it back during a deploy, so every run remains
//! an independent attempt.

use std::path::Path;

use alloy_core::primitives::Address;
use anyhow::{Context, Result};
use chrono::Utc;
use serde_json::{Value, json};

use crate::Deployment;

/// Top-level key of the deployments file.
const DEPLOYMENTS_KEY: &str = "deployments";

/// Reader/writer for the deployments record.
pub struct DeploymentsFile;

impl DeploymentsFile {
    /// Merge `deployment` into the record at `path`, creating the file if
    /// it does not exist yet. An existing entry for the same contract name
    /// is replaced; other entries are preserved.
    pub fn record(path: &Path, deployment: &Deployment) -> Result<()> {
        let mut root = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read deployments file {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse deployments file {}", path.display()))?
        } else {
            json!({})
        };

        if !root.is_object() {
            anyhow::bail!(
                "Deployments file {} is not a JSON object",
                path.display()
            );
        }

        if !root.get(DEPLOYMENTS_KEY).is_some_and(Value::is_object) {
            root[DEPLOYMENTS_KEY] = json!({});
        }

        let mut entry = json!({
            "address": format!("{}", deployment.address),
            "transactionHash": format!("{}", deployment.transaction_hash),
            "blockNumber": deployment.block_number,
            "mode": deployment.mode.to_string(),
            "deployedAt": Utc::now().to_rfc3339(),
        });
        if let Some(implementation) = deployment.implementation {
            entry["implementation"] = json!(format!("{implementation}"));
        }

        root[DEPLOYMENTS_KEY][deployment.contract_name.as_str()] = entry;

        std::fs::write(path, serde_json::to_string_pretty(&root)?)
            .with_context(|| format!("Failed to write deployments file {}", path.display()))?;

        tracing::info!(
            path = %path.display(),
            contract = %deployment.contract_name,
            "Deployment recorded"
        );
        Ok(())
    }

    /// The recorded address for `contract_name`, if any.
    pub fn address_of(path: &Path, contract_name: &str) -> Result<Option<Address>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read deployments file {}", path.display()))?;
        let root: Value = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse deployments file {}", path.display()))?;

        root[DEPLOYMENTS_KEY][contract_name]["address"]
            .as_str()
            .map(|addr| {
                addr.parse()
                    .with_context(|| format!("Malformed address recorded for {}", contract_name))
            })
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use alloy_core::primitives::B256;
    use tempdir::TempDir;

    use super::*;
    use crate::DeployMode;

    fn sample(contract_name: &str, fill: u8, mode: DeployMode) -> Deployment {
        Deployment {
            contract_name: contract_name.to_string(),
            address: Address::repeat_byte(fill),
            implementation: match mode {
                DeployMode::Direct => None,
                DeployMode::UpgradeableProxy => Some(Address::repeat_byte(fill ^ 0xff)),
            },
            transaction_hash: B256::repeat_byte(fill),
            block_number: 7,
            gas_used: 321_000,
            mode,
        }
    }

    #[test]
    fn test_record_creates_file() {
        let tmp = TempDir::new("marketup-deployments").unwrap();
        let path = tmp.path().join("deployments.json");

        let deployment = sample("ImageMarketplace", 0x42, DeployMode::Direct);
        DeploymentsFile::record(&path, &deployment).unwrap();

        let recorded = DeploymentsFile::address_of(&path, "ImageMarketplace")
            .unwrap()
            .unwrap();
        assert_eq!(recorded, deployment.address);
    }

    #[test]
    fn test_record_preserves_other_entries() {
        let tmp = TempDir::new("marketup-deployments").unwrap();
        let path = tmp.path().join("deployments.json");

        DeploymentsFile::record(&path, &sample("ImageMarketplace", 0x11, DeployMode::Direct))
            .unwrap();
        DeploymentsFile::record(&path, &sample("Escrow", 0x22, DeployMode::Direct)).unwrap();

        assert!(
            DeploymentsFile::address_of(&path, "ImageMarketplace")
                .unwrap()
                .is_some()
        );
        assert!(DeploymentsFile::address_of(&path, "Escrow").unwrap().is_some());
    }

    #[test]
    fn test_record_includes_implementation_for_proxies() {
        let tmp = TempDir::new("marketup-deployments").unwrap();
        let path = tmp.path().join("deployments.json");

        let deployment = sample("ImageMarketplace", 0x33, DeployMode::UpgradeableProxy);
        DeploymentsFile::record(&path, &deployment).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let root: Value = serde_json::from_str(&content).unwrap();
        let entry = &root[DEPLOYMENTS_KEY]["ImageMarketplace"];

        assert_eq!(entry["mode"], "upgradeable-proxy");
        assert_eq!(
            entry["implementation"].as_str().unwrap(),
            format!("{}", deployment.implementation.unwrap())
        );
        // The recorded address is the proxy's, not the implementation's.
        assert_ne!(entry["address"], entry["implementation"]);
    }

    #[test]
    fn test_address_of_missing_entry() {
        let tmp = TempDir::new("marketup-deployments").unwrap();
        let path = tmp.path().join("deployments.json");

        assert!(DeploymentsFile::address_of(&path, "Unknown").unwrap().is_none());

        DeploymentsFile::record(&path, &sample("ImageMarketplace", 0x11, DeployMode::Direct))
            .unwrap();
        assert!(DeploymentsFile::address_of(&path, "Unknown").unwrap().is_none());
    }
}
