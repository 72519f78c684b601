//! marketup-deploy - Deployment library for the ImageMarketplace contract.
//!
//! This crate provides the deployment functionality: resolving a compiled
//! contract artifact, submitting the creation transaction over JSON-RPC,
//! waiting for on-chain confirmation, and reporting the deployed address.

use serde::{Deserialize, Serialize};

mod artifact;
pub use artifact::ContractArtifact;

mod builder;
pub use builder::DeployerBuilder;

mod deployer;
pub use deployer::{Deployer, Deployment, MARKETCONF_FILENAME};

mod deployments;
pub use deployments::DeploymentsFile;

pub mod proxy;
pub mod rpc;

/// Deployment strategy for a contract.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum DeployMode {
    /// Create the contract at a permanent address; its code never changes.
    Direct,
    /// Create an ERC-1967 proxy in front of a freshly deployed
    /// implementation contract. The proxy address stays stable across
    /// future logic upgrades.
    UpgradeableProxy,
}
