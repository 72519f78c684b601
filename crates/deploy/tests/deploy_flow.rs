//! Integration tests for marketup-deploy.
//!
//! These tests exercise artifact resolution, configuration round-trips, and
//! the deployer's failure paths without a live network. The network-facing
//! paths are driven against endpoints that refuse connections, which must
//! surface as the same uniform deployment error as any other failure.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use anyhow::Result;
use marketup_deploy::{ContractArtifact, DeployMode, Deployer, DeployerBuilder};
use tempdir::TempDir;
use url::Url;

/// A minimal Hardhat-style artifact for the marketplace contract.
const MARKETPLACE_ARTIFACT: &str = r#"{
    "contractName": "ImageMarketplace",
    "abi": [
        { "type": "constructor", "inputs": [] },
        { "type": "function", "name": "initialize", "inputs": [], "outputs": [] },
        { "type": "function", "name": "listImage", "inputs": [
            { "name": "uri", "type": "string" },
            { "name": "price", "type": "uint256" }
        ]}
    ],
    "bytecode": "0x6080604052348015600e575f5ffd5b50"
}"#;

/// An artifact whose constructor requires arguments.
const PRICED_ARTIFACT: &str = r#"{
    "contractName": "PricedMarketplace",
    "abi": [
        { "type": "constructor", "inputs": [
            { "name": "listingFee", "type": "uint256" }
        ]}
    ],
    "bytecode": "0x60806040"
}"#;

/// An RPC endpoint that refuses connections (port 9, discard).
const UNREACHABLE_RPC: &str = "http://127.0.0.1:9";

/// Initialize tracing for tests (idempotent).
fn init_test_tracing() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_test_writer()
        .try_init()
        .ok();
}

/// Write `content` into the nested layout Hardhat uses:
/// `<dir>/contracts/<name>.sol/<name>.json`.
fn write_artifact(dir: &Path, name: &str, content: &str) -> Result<()> {
    let sol_dir = dir.join(format!("contracts/{name}.sol"));
    fs::create_dir_all(&sol_dir)?;
    fs::write(sol_dir.join(format!("{name}.json")), content)?;
    Ok(())
}

#[test]
fn test_artifact_resolution_from_nested_layout() -> Result<()> {
    let tmp = TempDir::new("marketup-artifacts")?;
    write_artifact(tmp.path(), "ImageMarketplace", MARKETPLACE_ARTIFACT)?;

    let artifact = ContractArtifact::resolve(tmp.path(), "ImageMarketplace")?;

    assert_eq!(artifact.contract_name, "ImageMarketplace");
    assert!(!artifact.bytecode.is_empty());
    assert_eq!(artifact.constructor_inputs(), 0);
    assert!(artifact.has_default_initializer());
    Ok(())
}

#[test]
fn test_debug_companion_files_are_ignored() -> Result<()> {
    let tmp = TempDir::new("marketup-artifacts")?;
    let sol_dir = tmp.path().join("contracts/ImageMarketplace.sol");
    fs::create_dir_all(&sol_dir)?;
    // Hardhat writes a .dbg.json next to each artifact.
    fs::write(
        sol_dir.join("ImageMarketplace.dbg.json"),
        r#"{"buildInfo": "../../build-info/abc.json"}"#,
    )?;
    fs::write(sol_dir.join("ImageMarketplace.json"), MARKETPLACE_ARTIFACT)?;

    let artifact = ContractArtifact::resolve(tmp.path(), "ImageMarketplace")?;
    assert_eq!(artifact.contract_name, "ImageMarketplace");
    Ok(())
}

#[test]
fn test_unknown_contract_is_a_resolution_error() -> Result<()> {
    let tmp = TempDir::new("marketup-artifacts")?;
    write_artifact(tmp.path(), "ImageMarketplace", MARKETPLACE_ARTIFACT)?;

    let err = ContractArtifact::resolve(tmp.path(), "Nonexistent").unwrap_err();
    assert!(format!("{err:#}").contains("Nonexistent"));
    Ok(())
}

#[test]
fn test_empty_contract_name_is_rejected() -> Result<()> {
    let tmp = TempDir::new("marketup-artifacts")?;
    assert!(ContractArtifact::resolve(tmp.path(), "").is_err());
    Ok(())
}

#[test]
fn test_config_round_trip() -> Result<()> {
    let tmp = TempDir::new("marketup-conf")?;

    let deployer = DeployerBuilder::new(Url::parse("http://127.0.0.1:8545")?)
        .artifacts_dir(tmp.path().join("artifacts"))
        .confirmation_timeout_secs(30)
        .deployments_path(tmp.path().join("deployments.json"))
        .build()?;

    let config_path = tmp.path().join("Marketup.toml");
    deployer.save_to_file(&config_path)?;

    let loaded = Deployer::load_from_file(&config_path)?;
    assert_eq!(deployer, loaded);
    Ok(())
}

#[test]
fn test_loading_missing_config_fails() {
    let err = Deployer::load_from_file(Path::new("/nonexistent/Marketup.toml")).unwrap_err();
    assert!(format!("{err:#}").contains("not found"));
}

#[test]
fn test_mode_strings_round_trip() {
    assert_eq!(DeployMode::Direct.to_string(), "direct");
    assert_eq!(DeployMode::UpgradeableProxy.to_string(), "upgradeable-proxy");
    assert_eq!(
        DeployMode::from_str("upgradeable-proxy").unwrap(),
        DeployMode::UpgradeableProxy
    );
    assert!(DeployMode::from_str("transparent").is_err());
}

#[tokio::test]
async fn test_artifact_failure_precedes_any_network_use() -> Result<()> {
    init_test_tracing();

    // The endpoint is unreachable, but resolution fails first and its error
    // names the missing contract, not the network.
    let tmp = TempDir::new("marketup-empty")?;
    let deployer = DeployerBuilder::new(Url::parse(UNREACHABLE_RPC)?)
        .artifacts_dir(tmp.path().to_path_buf())
        .build()?;

    let err = deployer
        .deploy("ImageMarketplace", DeployMode::Direct, None, None)
        .await
        .unwrap_err();

    assert!(format!("{err:#}").contains("ImageMarketplace"));
    Ok(())
}

#[tokio::test]
async fn test_missing_constructor_args_is_an_error() -> Result<()> {
    init_test_tracing();

    let tmp = TempDir::new("marketup-ctor")?;
    write_artifact(tmp.path(), "PricedMarketplace", PRICED_ARTIFACT)?;

    let deployer = DeployerBuilder::new(Url::parse(UNREACHABLE_RPC)?)
        .artifacts_dir(tmp.path().to_path_buf())
        .build()?;

    let err = deployer
        .deploy("PricedMarketplace", DeployMode::Direct, None, None)
        .await
        .unwrap_err();

    assert!(format!("{err:#}").contains("argument"));
    Ok(())
}

#[tokio::test]
async fn test_unreachable_node_fails_uniformly() -> Result<()> {
    init_test_tracing();

    let tmp = TempDir::new("marketup-rpc")?;
    write_artifact(tmp.path(), "ImageMarketplace", MARKETPLACE_ARTIFACT)?;

    let deployer = DeployerBuilder::new(Url::parse(UNREACHABLE_RPC)?)
        .artifacts_dir(tmp.path().to_path_buf())
        .confirmation_timeout_secs(1)
        .build()?;

    // Both modes fail through the same terminal error path.
    for mode in [DeployMode::Direct, DeployMode::UpgradeableProxy] {
        let result = deployer.deploy("ImageMarketplace", mode, None, None).await;
        assert!(result.is_err(), "{mode} should fail against a dead node");
    }
    Ok(())
}
