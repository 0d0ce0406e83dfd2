// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use sui_sdk::{SuiClient, SuiClientBuilder, SUI_COIN_TYPE};
use sui_swap::coin::get_coins;
use sui_swap::config::parse_object_id;
use sui_swap::monitor::{VersionChange, VersionMonitor};
use sui_swap::object_ref::resolve_owned;
use sui_swap::swap::{build_merge_coins_transaction, build_swap_transaction, resolve_inputs};
use sui_swap::{
    load_signer, NodeClient, PreparedTransaction, SigningIdentity, SubmitOutcome, SwapConfig,
    TransactionSubmitter,
};
use sui_types::base_types::ObjectID;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// How long to wait for the gas coin to change version after execution.
const GAS_COIN_WATCH_TIMEOUT: Duration = Duration::from_secs(30);
const GAS_COIN_WATCH_INTERVAL: Duration = Duration::from_millis(200);

#[derive(Parser)]
#[clap(rename_all = "kebab-case")]
#[clap(name = env!("CARGO_BIN_NAME"), about = "Swap through a Move pool on Sui")]
struct Args {
    #[clap(long)]
    config: PathBuf,

    /// Overrides `rpc-url` from the config file.
    #[clap(long)]
    rpc_url: Option<String>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
#[clap(rename_all = "kebab-case")]
enum Command {
    /// Build, sign and execute the configured swap.
    Swap {
        /// Sign and print the transaction without sending it.
        #[clap(long)]
        dry_run: bool,
        /// Report the gas coin's next version change after execution.
        #[clap(long)]
        watch_gas_coin: bool,
    },
    /// Merge coins into a primary coin.
    MergeCoins {
        #[clap(long)]
        primary: String,
        #[clap(long = "coin", required = true)]
        coins: Vec<String>,
        #[clap(long)]
        dry_run: bool,
    },
    /// List the signer's coins of one type.
    Coins {
        #[clap(long, default_value = SUI_COIN_TYPE)]
        coin_type: String,
    },
    /// Report every version change of an object until interrupted.
    Watch {
        #[clap(long)]
        object_id: String,
        #[clap(long, default_value_t = 500)]
        interval_ms: u64,
    },
    /// Print the signer address.
    Address,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let (_guard, _filter_handle) = telemetry_subscribers::TelemetryConfig::new()
        .with_env()
        .init();

    if let Ok(path) = dotenvy::dotenv() {
        info!("Loaded environment from {}", path.display());
    }

    let mut config = SwapConfig::load(&args.config)?;
    if let Some(rpc_url) = args.rpc_url {
        config.rpc_url = rpc_url;
    }

    if let Command::Address = args.command {
        println!("{}", load_identity(&config)?.address());
        return Ok(());
    }

    let client = SuiClientBuilder::default()
        .request_timeout(config.request_timeout())
        .build(&config.rpc_url)
        .await
        .with_context(|| format!("Unable to connect to {}", config.rpc_url))?;

    match args.command {
        Command::Swap {
            dry_run,
            watch_gas_coin,
        } => {
            let signer = load_identity(&config)?;
            swap(&config, client, &signer, dry_run, watch_gas_coin).await
        }
        Command::MergeCoins {
            primary,
            coins,
            dry_run,
        } => {
            let signer = load_identity(&config)?;
            merge_coins(&config, &client, &signer, &primary, &coins, dry_run).await
        }
        Command::Coins { coin_type } => {
            let owner = load_identity(&config)?.address();
            for coin in get_coins(&client, owner, &coin_type).await? {
                let (object_id, version, digest) = coin.object_ref;
                println!(
                    "{object_id} version={} digest={digest} balance={}",
                    version.value(),
                    coin.balance
                );
            }
            Ok(())
        }
        Command::Watch {
            object_id,
            interval_ms,
        } => watch(client, parse_object_id(&object_id)?, interval_ms).await,
        Command::Address => Ok(()),
    }
}

fn load_identity(config: &SwapConfig) -> anyhow::Result<SigningIdentity> {
    let signer = load_signer(&config.private_key()?).context("Unable to load signer")?;
    info!(address = %signer.address(), "Loaded signer");
    Ok(signer)
}

async fn swap(
    config: &SwapConfig,
    client: SuiClient,
    signer: &SigningIdentity,
    dry_run: bool,
    watch_gas_coin: bool,
) -> anyhow::Result<()> {
    let settings = config.run_settings()?;
    let plan = config.swap_plan()?;
    let recipient = plan.recipient.unwrap_or_else(|| signer.address());

    let inputs = resolve_inputs(&client, &plan).await?;
    let pt = build_swap_transaction(&plan, &inputs, recipient)?;

    let submitter = TransactionSubmitter::new(&client, signer, &settings);
    let watcher = if watch_gas_coin && !dry_run {
        let gas_coin = submitter.gas_coin().await?;
        let cancel = CancellationToken::new();
        let (handle, rx) = VersionMonitor::spawn(
            Arc::new(client.clone()),
            gas_coin.object_id,
            gas_coin.version,
            GAS_COIN_WATCH_INTERVAL,
            cancel.clone(),
        );
        Some((handle, rx, cancel))
    } else {
        None
    };

    let outcome = submitter.run(pt, dry_run).await;
    if let Some((handle, mut rx, cancel)) = watcher {
        if outcome.is_ok() {
            match tokio::time::timeout(GAS_COIN_WATCH_TIMEOUT, rx.recv()).await {
                Ok(Some(change)) => print_change(&change),
                Ok(None) => warn!("Gas coin monitor stopped"),
                Err(_) => {
                    warn!("Gas coin version did not change within {GAS_COIN_WATCH_TIMEOUT:?}")
                }
            }
        }
        cancel.cancel();
        handle.await?;
    }
    print_outcome(&outcome?)
}

async fn merge_coins(
    config: &SwapConfig,
    client: &SuiClient,
    signer: &SigningIdentity,
    primary: &str,
    coins: &[String],
    dry_run: bool,
) -> anyhow::Result<()> {
    let settings = config.run_settings()?;
    let primary = resolve_owned(client, parse_object_id(primary)?).await?;
    let mut sources = Vec::with_capacity(coins.len());
    for coin in coins {
        sources.push(resolve_owned(client, parse_object_id(coin)?).await?);
    }
    let pt = build_merge_coins_transaction(primary, &sources)?;
    let outcome = TransactionSubmitter::new(client, signer, &settings)
        .run(pt, dry_run)
        .await?;
    print_outcome(&outcome)
}

async fn watch(client: SuiClient, object_id: ObjectID, interval_ms: u64) -> anyhow::Result<()> {
    let initial = client.get_object(object_id).await?;
    println!("{object_id} at version {}", initial.version.value());

    let cancel = CancellationToken::new();
    let (handle, mut rx) = VersionMonitor::spawn(
        Arc::new(client),
        object_id,
        initial.version,
        Duration::from_millis(interval_ms),
        cancel.clone(),
    );
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, stopping");
                break;
            }
            change = rx.recv() => match change {
                Some(change) => print_change(&change),
                None => break,
            },
        }
    }
    cancel.cancel();
    handle.await?;
    Ok(())
}

fn print_prepared(prepared: &PreparedTransaction) -> anyhow::Result<()> {
    println!("Transaction digest: {}", prepared.digest());
    println!("Transaction bytes: {}", prepared.tx_bytes_base64()?);
    println!("Signature: {}", prepared.signature_base64());
    println!(
        "Gas: coin {} price {} budget {}",
        prepared.gas_coin.object_id, prepared.gas_price, prepared.gas_budget
    );
    Ok(())
}

fn print_outcome(outcome: &SubmitOutcome) -> anyhow::Result<()> {
    match outcome {
        SubmitOutcome::DryRun(prepared) => {
            print_prepared(prepared)?;
            println!("Dry run: transaction was not sent");
        }
        SubmitOutcome::Executed { prepared, report } => {
            print_prepared(prepared)?;
            match &report.gas_used {
                Some(gas) => println!(
                    "Executed: computation {} storage {} rebate {}",
                    gas.computation_cost, gas.storage_cost, gas.storage_rebate
                ),
                None => println!("Executed"),
            }
        }
    }
    Ok(())
}

fn print_change(change: &VersionChange) {
    println!(
        "{} version {} -> {} after {:?}{}",
        change.object_id,
        change.from.value(),
        change.to.value(),
        change.elapsed,
        change
            .checkpoint
            .map(|c| format!(" (checkpoint {c})"))
            .unwrap_or_default()
    );
}
