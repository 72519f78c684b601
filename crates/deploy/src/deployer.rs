use std::path::{Path, PathBuf};

use alloy_core::primitives::{Address, B256, Bytes};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{ContractArtifact, DeployMode, DeploymentsFile, proxy, rpc};

/// The default name for the marketup configuration file.
pub const MARKETCONF_FILENAME: &str = "Marketup.toml";

/// A confirmed deployment.
#[derive(Debug, Clone)]
pub struct Deployment {
    /// Name of the deployed contract.
    pub contract_name: String,
    /// The user-facing address: the contract itself, or the proxy in
    /// upgradeable-proxy mode.
    pub address: Address,
    /// Address of the implementation contract, when deployed behind a proxy.
    pub implementation: Option<Address>,
    /// Hash of the creation transaction that produced `address`.
    pub transaction_hash: B256,
    /// Block in which the creation transaction was mined.
    pub block_number: u64,
    /// Gas used by the creation transaction.
    pub gas_used: u64,
    /// The strategy that was used.
    pub mode: DeployMode,
}

/// Main deployer: the environment needed to put a contract on chain.
///
/// This struct contains all the configuration needed to deploy a contract
/// and can be serialized to/from TOML format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deployer {
    /// JSON-RPC endpoint of the target network.
    pub rpc_url: Url,
    /// Directory holding the build toolchain's compiled artifacts.
    pub artifacts_dir: PathBuf,
    /// Sender address. Its key must be held by the node; when unset, the
    /// node's first account is used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender: Option<Address>,
    /// Gas limit for each creation transaction. When unset, the node's
    /// estimate is used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_limit: Option<u64>,
    /// Seconds to wait for a submitted transaction to be mined.
    pub confirmation_timeout_secs: u64,
    /// Name of the proxy artifact used in upgradeable-proxy mode.
    pub proxy_contract: String,
    /// Path of the deployments record, if one should be written.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deployments_path: Option<PathBuf>,
}

impl Deployer {
    /// Save the configuration to a TOML file.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content =
            toml::to_string_pretty(self).context("Failed to serialize deployer config to TOML")?;
        std::fs::write(path, content)
            .context(format!("Failed to write config to {}", path.display()))?;
        tracing::info!(path = %path.display(), "Configuration saved");
        Ok(())
    }

    /// Load the configuration from a TOML file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(anyhow::anyhow!(
                "Configuration file or directory not found: {}",
                path.display()
            ));
        }

        let config_path = if path.is_dir() {
            path.join(MARKETCONF_FILENAME)
        } else {
            path.to_path_buf()
        };

        let content = std::fs::read_to_string(config_path)
            .context(format!("Failed to read config from {}", path.display()))?;
        let config: Self =
            toml::from_str(&content).context("Failed to parse config file as TOML")?;
        tracing::info!(path = %path.display(), "Configuration loaded");
        Ok(config)
    }

    /// Save the deployer's configuration to Marketup.toml in the current directory.
    pub fn save_config(&self) -> Result<PathBuf> {
        let config_path = PathBuf::from(MARKETCONF_FILENAME);
        self.save_to_file(&config_path)?;
        Ok(config_path)
    }
}

/// The result of one confirmed creation transaction.
struct ConfirmedCreation {
    address: Address,
    receipt: rpc::TransactionReceipt,
}

impl Deployer {
    /// Perform exactly one deployment attempt.
    ///
    /// Resolves the artifact for `contract_name`, submits the creation
    /// transaction(s) according to `mode`, waits for mining, and returns the
    /// confirmed [`Deployment`]. Any failure along the way - artifact
    /// resolution, submission, revert, timeout - surfaces as a single
    /// terminal error; there is no retry and no rollback of a partially
    /// completed proxy deployment.
    pub async fn deploy(
        &self,
        contract_name: &str,
        mode: DeployMode,
        constructor_args: Option<Bytes>,
        init_data: Option<Bytes>,
    ) -> Result<Deployment> {
        tracing::info!(
            contract = %contract_name,
            mode = %mode,
            rpc_url = %self.rpc_url,
            "Starting deployment..."
        );

        let artifact = ContractArtifact::resolve(&self.artifacts_dir, contract_name)?;

        if artifact.constructor_inputs() > 0 && constructor_args.is_none() {
            anyhow::bail!(
                "Constructor of {} takes {} argument(s), pass them ABI-encoded in hex",
                artifact.contract_name,
                artifact.constructor_inputs()
            );
        }

        let client = rpc::create_client()?;
        let chain_id = rpc::chain_id(&client, self.rpc_url.as_str())
            .await
            .context("Failed to reach the target network")?;
        let sender = self.resolve_sender(&client).await?;
        tracing::info!(chain_id, sender = %sender, "Connected to network");

        let deployment = match mode {
            DeployMode::Direct => {
                let confirmed = self
                    .create_contract(&client, sender, &artifact, constructor_args.unwrap_or_default())
                    .await?;

                Deployment {
                    contract_name: artifact.contract_name.clone(),
                    address: confirmed.address,
                    implementation: None,
                    transaction_hash: confirmed.receipt.transaction_hash,
                    block_number: confirmed.receipt.block_number,
                    gas_used: confirmed.receipt.gas_used,
                    mode,
                }
            }
            DeployMode::UpgradeableProxy => {
                self.deploy_behind_proxy(&client, sender, &artifact, constructor_args, init_data)
                    .await?
            }
        };

        if let Some(path) = &self.deployments_path {
            DeploymentsFile::record(path, &deployment)?;
        }

        tracing::info!(
            address = %deployment.address,
            block = deployment.block_number,
            "Deployment confirmed"
        );

        Ok(deployment)
    }

    /// Deploy the implementation, then an ERC-1967 proxy pointing at it.
    ///
    /// The reported address is the proxy's; the implementation address is
    /// kept alongside it. After mining, the proxy's implementation slot must
    /// hold the implementation we just deployed.
    async fn deploy_behind_proxy(
        &self,
        client: &reqwest::Client,
        sender: Address,
        artifact: &ContractArtifact,
        constructor_args: Option<Bytes>,
        init_data: Option<Bytes>,
    ) -> Result<Deployment> {
        let implementation = self
            .create_contract(client, sender, artifact, constructor_args.unwrap_or_default())
            .await?;
        tracing::info!(implementation = %implementation.address, "Implementation deployed");

        let init_data = match init_data {
            Some(data) => data,
            None if artifact.has_default_initializer() => proxy::default_initializer_calldata(),
            None => Bytes::new(),
        };

        let proxy_artifact = ContractArtifact::resolve(&self.artifacts_dir, &self.proxy_contract)?;
        let args = proxy::encode_constructor_args(implementation.address, &init_data);
        let confirmed = self
            .create_contract(client, sender, &proxy_artifact, args.into())
            .await?;

        // The proxy must point at the implementation we just deployed.
        let slot = rpc::storage_at(
            client,
            self.rpc_url.as_str(),
            confirmed.address,
            proxy::IMPLEMENTATION_SLOT,
        )
        .await?;
        let wired = proxy::address_from_slot(slot);
        if wired != implementation.address {
            anyhow::bail!(
                "Proxy at {} points at {}, expected implementation {}",
                confirmed.address,
                wired,
                implementation.address
            );
        }

        Ok(Deployment {
            contract_name: artifact.contract_name.clone(),
            address: confirmed.address,
            implementation: Some(implementation.address),
            transaction_hash: confirmed.receipt.transaction_hash,
            block_number: confirmed.receipt.block_number,
            gas_used: confirmed.receipt.gas_used,
            mode: DeployMode::UpgradeableProxy,
        })
    }

    /// Submit one contract-creation transaction and wait for it to mine.
    async fn create_contract(
        &self,
        client: &reqwest::Client,
        sender: Address,
        artifact: &ContractArtifact,
        extra_data: Bytes,
    ) -> Result<ConfirmedCreation> {
        let url = self.rpc_url.as_str();

        let mut data = artifact.bytecode.to_vec();
        data.extend_from_slice(&extra_data);

        let mut tx = serde_json::json!({
            "from": format!("{sender}"),
            "data": format!("0x{}", hex::encode(data)),
        });

        let gas = match self.gas_limit {
            Some(gas) => gas,
            None => rpc::estimate_gas(client, url, &tx)
                .await
                .with_context(|| format!("Failed to estimate gas for {}", artifact.contract_name))?,
        };
        tx["gas"] = serde_json::json!(format!("0x{gas:x}"));

        tracing::info!(contract = %artifact.contract_name, gas, "Submitting creation transaction...");
        let tx_hash = rpc::send_transaction(client, url, &tx)
            .await
            .with_context(|| format!("Failed to submit creation transaction for {}", artifact.contract_name))?;
        tracing::info!(tx_hash = %tx_hash, "Transaction submitted, waiting for confirmation...");

        let receipt =
            rpc::wait_for_receipt(client, url, tx_hash, self.confirmation_timeout_secs).await?;

        if receipt.status != 1 {
            anyhow::bail!(
                "Creation transaction {} for {} reverted",
                tx_hash,
                artifact.contract_name
            );
        }

        let address = receipt
            .contract_address
            .context("Receipt of the creation transaction carries no contract address")?;

        let code = rpc::code_at(client, url, address).await?;
        if code.is_empty() {
            anyhow::bail!("No code at {} after deployment", address);
        }

        Ok(ConfirmedCreation { address, receipt })
    }

    /// The configured sender, or the node's first account.
    async fn resolve_sender(&self, client: &reqwest::Client) -> Result<Address> {
        if let Some(sender) = self.sender {
            return Ok(sender);
        }

        let accounts = rpc::accounts(client, self.rpc_url.as_str())
            .await
            .context("Failed to list the node's accounts")?;

        accounts
            .first()
            .copied()
            .context("Node holds no accounts - configure an explicit sender")
    }
}
