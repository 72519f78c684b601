//! marketup is a CLI tool to deploy the ImageMarketplace contract in a few clicks.

mod cli;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use comfy_table::Table;

use cli::Cli;
use marketup_deploy::{Deployer, DeployerBuilder, Deployment};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize the logger.
    tracing_subscriber::fmt()
        .with_max_level(cli.verbosity)
        .init();

    // If a config file is provided, load the environment from it and deploy
    if let Some(config_path) = &cli.config {
        let config_path = PathBuf::from(config_path);
        let deployer = Deployer::load_from_file(&config_path)?;

        tracing::info!(
            config_path = %config_path.display(),
            rpc_url = %deployer.rpc_url,
            artifacts_dir = %deployer.artifacts_dir.display(),
            "Loading deployment environment from config file..."
        );

        let deployment = deployer
            .deploy(&cli.contract, cli.mode, cli.constructor_args, cli.init_data)
            .await?;

        report(&deployment);
        return Ok(());
    }

    // Otherwise, build the environment from CLI arguments
    let mut builder = DeployerBuilder::new(cli.rpc_url)
        .artifacts_dir(cli.artifacts_dir)
        .confirmation_timeout_secs(cli.confirmation_timeout)
        .proxy_contract(cli.proxy_contract);

    // Set the sender if provided
    if let Some(sender) = cli.sender {
        builder = builder.sender(sender);
    }

    // Set a fixed gas limit if provided
    if let Some(gas_limit) = cli.gas_limit {
        builder = builder.gas_limit(gas_limit);
    }

    // Set the deployments record path if provided
    if let Some(deployments) = cli.deployments {
        builder = builder.deployments_path(deployments);
    }

    // Build the deployer configuration
    let deployer = builder.build()?;

    // Save the configuration to Marketup.toml before deploying
    deployer.save_config()?;

    let deployment = deployer
        .deploy(&cli.contract, cli.mode, cli.constructor_args, cli.init_data)
        .await?;

    report(&deployment);

    Ok(())
}

/// Print the confirmed address on stdout, plus a summary table.
fn report(deployment: &Deployment) {
    println!(
        "{} deployed to: {}",
        deployment.contract_name, deployment.address
    );

    let mut table = Table::new();
    table.set_header(["contract", "address", "mode", "block", "gas used"]);
    table.add_row([
        deployment.contract_name.clone(),
        deployment.address.to_string(),
        deployment.mode.to_string(),
        deployment.block_number.to_string(),
        deployment.gas_used.to_string(),
    ]);
    if let Some(implementation) = deployment.implementation {
        table.add_row([
            format!("{} (implementation)", deployment.contract_name),
            implementation.to_string(),
            "-".to_string(),
            "-".to_string(),
            "-".to_string(),
        ]);
    }
    println!("{table}");
}
