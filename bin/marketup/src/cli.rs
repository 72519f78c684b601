use std::path::PathBuf;

use alloy_core::primitives::{Address, Bytes};
use clap::Parser;
use marketup_deploy::DeployMode;
use tracing::level_filters::LevelFilter;
use url::Url;

/// The default deployment target (a local Hardhat or Anvil dev node).
const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8545";

#[derive(Parser)]
#[command(name = "marketup")]
#[command(
    author,
    version,
    about = "Deploy the ImageMarketplace contract in a few clicks"
)]
pub struct Cli {
    /// The verbosity level.
    #[arg(short, long, env = "MARKETUP_VERBOSITY", default_value_t = LevelFilter::INFO)]
    pub verbosity: LevelFilter,

    /// Name of the contract to deploy, as known to the build toolchain.
    #[arg(short, long, env = "MARKETUP_CONTRACT", default_value = "ImageMarketplace")]
    pub contract: String,

    /// Deployment strategy: create the contract directly at a permanent
    /// address, or put it behind an ERC-1967 upgradeable proxy.
    #[arg(short, long, env = "MARKETUP_MODE", default_value_t = DeployMode::Direct)]
    pub mode: DeployMode,

    /// The URL of the target network's JSON-RPC endpoint.
    ///
    /// The node signs the creation transaction, so the sender account must
    /// be unlocked there.
    #[arg(long, alias = "rpc", env = "MARKETUP_RPC_URL", default_value = DEFAULT_RPC_URL)]
    pub rpc_url: Url,

    /// Directory holding the build toolchain's compiled artifacts.
    #[arg(long, alias = "artifacts", env = "MARKETUP_ARTIFACTS_DIR", default_value = "artifacts")]
    pub artifacts_dir: PathBuf,

    /// Sender address. If not provided, the node's first account is used.
    #[arg(long, env = "MARKETUP_SENDER")]
    pub sender: Option<Address>,

    /// ABI-encoded constructor arguments, in hex.
    #[arg(long, env = "MARKETUP_CONSTRUCTOR_ARGS")]
    pub constructor_args: Option<Bytes>,

    /// Initializer calldata for the proxy, in hex.
    ///
    /// If not provided, a zero-argument `initialize()` call is used when the
    /// implementation declares one.
    #[arg(long, env = "MARKETUP_INIT_DATA")]
    pub init_data: Option<Bytes>,

    /// Gas limit for each creation transaction.
    /// If not provided, the node's estimate is used.
    #[arg(long, env = "MARKETUP_GAS_LIMIT")]
    pub gas_limit: Option<u64>,

    /// Seconds to wait for a submitted transaction to be mined.
    #[arg(long, env = "MARKETUP_CONFIRMATION_TIMEOUT", default_value_t = 120)]
    pub confirmation_timeout: u64,

    /// Name of the proxy artifact used in upgradeable-proxy mode.
    #[arg(long, env = "MARKETUP_PROXY_CONTRACT", default_value = "ERC1967Proxy")]
    pub proxy_contract: String,

    /// Path of the deployments record to update after a successful run.
    #[arg(long, env = "MARKETUP_DEPLOYMENTS")]
    pub deployments: Option<PathBuf>,

    /// Path to an existing Marketup.toml configuration file to load.
    ///
    /// When provided, the deployment environment comes from this file
    /// instead of the individual CLI arguments.
    #[arg(long, alias = "conf", env = "MARKETUP_CONFIG")]
    pub config: Option<String>,
}
