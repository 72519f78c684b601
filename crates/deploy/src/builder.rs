//! Builder module for creating a [`Deployer`] configuration.
//!
//! This module provides the [`DeployerBuilder`] struct which fills in the
//! defaults a one-shot deployment usually wants: the Hardhat artifacts
//! directory, the standard proxy artifact name, and a mining timeout.

use std::path::PathBuf;

use alloy_core::primitives::Address;
use anyhow::Result;
use url::Url;

use crate::{Deployer, proxy};

/// Default directory Hardhat compiles artifacts into.
const DEFAULT_ARTIFACTS_DIR: &str = "artifacts";

/// Default number of seconds to wait for a transaction to be mined.
const DEFAULT_CONFIRMATION_TIMEOUT_SECS: u64 = 120;

/// Builder for creating a [`Deployer`] configuration.
///
/// # Example
///
/// ```no_run
/// use marketup_deploy::DeployerBuilder;
/// use url::Url;
///
/// # fn example() -> anyhow::Result<()> {
/// let deployer = DeployerBuilder::new(Url::parse("http://127.0.0.1:8545")?)
///     .artifacts_dir("artifacts")
///     .deployments_path("deployments.json")
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct DeployerBuilder {
    /// JSON-RPC endpoint of the target network (required).
    rpc_url: Url,
    /// Artifacts directory (optional, Hardhat's default if not provided).
    artifacts_dir: Option<PathBuf>,
    /// Sender address (optional, node's first account if not provided).
    sender: Option<Address>,
    /// Gas limit override (optional, estimated if not provided).
    gas_limit: Option<u64>,
    /// Mining timeout in seconds (optional).
    confirmation_timeout_secs: Option<u64>,
    /// Proxy artifact name (optional).
    proxy_contract: Option<String>,
    /// Deployments record path (optional, no record if not provided).
    deployments_path: Option<PathBuf>,
}

impl DeployerBuilder {
    /// Create a new [`DeployerBuilder`] targeting `rpc_url`.
    pub fn new(rpc_url: Url) -> Self {
        Self {
            rpc_url,
            artifacts_dir: None,
            sender: None,
            gas_limit: None,
            confirmation_timeout_secs: None,
            proxy_contract: None,
            deployments_path: None,
        }
    }

    /// Set the artifacts directory.
    pub fn artifacts_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.artifacts_dir = Some(dir.into());
        self
    }

    /// Set the sender address.
    pub fn sender(mut self, sender: Address) -> Self {
        self.sender = Some(sender);
        self
    }

    /// Set a fixed gas limit instead of asking the node for an estimate.
    pub fn gas_limit(mut self, gas_limit: u64) -> Self {
        self.gas_limit = Some(gas_limit);
        self
    }

    /// Set how long to wait for a submitted transaction to be mined.
    pub fn confirmation_timeout_secs(mut self, secs: u64) -> Self {
        self.confirmation_timeout_secs = Some(secs);
        self
    }

    /// Set the name of the proxy artifact used in upgradeable-proxy mode.
    pub fn proxy_contract(mut self, name: impl Into<String>) -> Self {
        self.proxy_contract = Some(name.into());
        self
    }

    /// Record successful deployments in the file at `path`.
    pub fn deployments_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.deployments_path = Some(path.into());
        self
    }

    /// Build the [`Deployer`] configuration.
    pub fn build(self) -> Result<Deployer> {
        if !matches!(self.rpc_url.scheme(), "http" | "https") {
            anyhow::bail!(
                "Unsupported RPC URL scheme '{}', expected http or https",
                self.rpc_url.scheme()
            );
        }

        Ok(Deployer {
            rpc_url: self.rpc_url,
            artifacts_dir: self
                .artifacts_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_ARTIFACTS_DIR)),
            sender: self.sender,
            gas_limit: self.gas_limit,
            confirmation_timeout_secs: self
                .confirmation_timeout_secs
                .unwrap_or(DEFAULT_CONFIRMATION_TIMEOUT_SECS),
            proxy_contract: self
                .proxy_contract
                .unwrap_or_else(|| proxy::DEFAULT_PROXY_CONTRACT.to_string()),
            deployments_path: self.deployments_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let deployer = DeployerBuilder::new(Url::parse("http://127.0.0.1:8545").unwrap())
            .build()
            .unwrap();

        assert_eq!(deployer.artifacts_dir, PathBuf::from("artifacts"));
        assert_eq!(deployer.proxy_contract, "ERC1967Proxy");
        assert_eq!(deployer.confirmation_timeout_secs, 120);
        assert!(deployer.sender.is_none());
        assert!(deployer.gas_limit.is_none());
        assert!(deployer.deployments_path.is_none());
    }

    #[test]
    fn test_builder_rejects_non_http_schemes() {
        let result = DeployerBuilder::new(Url::parse("ws://127.0.0.1:8546").unwrap()).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_builder_overrides() {
        let deployer = DeployerBuilder::new(Url::parse("https://rpc.example.com").unwrap())
            .artifacts_dir("out")
            .gas_limit(3_000_000)
            .confirmation_timeout_secs(10)
            .proxy_contract("TransparentUpgradeableProxy")
            .deployments_path("deployments.json")
            .build()
            .unwrap();

        assert_eq!(deployer.artifacts_dir, PathBuf::from("out"));
        assert_eq!(deployer.gas_limit, Some(3_000_000));
        assert_eq!(deployer.confirmation_timeout_secs, 10);
        assert_eq!(deployer.proxy_contract, "TransparentUpgradeableProxy");
        assert_eq!(
            deployer.deployments_path,
            Some(PathBuf::from("deployments.json"))
        );
    }
}
