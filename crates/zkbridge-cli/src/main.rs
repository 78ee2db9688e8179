//! zkbridge CLI Application

mod cli;

use std::io::Write as _;

use clap::Parser as _;
use cli::{
    ClaimCommands, Cli, Commands, ConfigCommands, DepositCommands, LockerCommands,
    VerifyCommands,
};
use serde::Serialize;
use zkbridge_sdk::commands::{
    claim_prepare, claim_prove, config_schema, deposit_inspect, deposit_new, locker_hash,
    verify_proof,
};

fn init_tracing() -> eyre::Result<()> {
    #[cfg(feature = "tokio-console")]
    {
        // tokio-console: layers the console subscriber with fmt
        use tracing_subscriber::prelude::*;
        tracing_subscriber::registry()
            .with(console_subscriber::spawn())
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_filter(
                        tracing_subscriber::EnvFilter::try_from_default_env()
                            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
                    ),
            )
            .try_init()
            .map_err(|e| eyre::eyre!("Failed to initialize tracing: {:?}", e))?;
    }

    #[cfg(not(feature = "tokio-console"))]
    {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .with_timer(tracing_subscriber::fmt::time::uptime())
            .with_target(false)
            .with_writer(std::io::stderr)
            .try_init()
            .map_err(|e| eyre::eyre!("Failed to initialize tracing: {:?}", e))?;
    }

    Ok(())
}

/// Command results go to stdout as JSON; logs go to stderr.
fn emit<T: Serialize>(value: &T) -> eyre::Result<()> {
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}

async fn run(command: Commands) -> eyre::Result<()> {
    match command {
        Commands::Deposit { command } => match command {
            DepositCommands::New {
                amount,
                chain_id,
                recipient,
                note_out,
            } => emit(&deposit_new(amount, chain_id, recipient, note_out).await?),
            DepositCommands::Inspect {
                tx,
                locker_script,
                txid,
            } => emit(&deposit_inspect(tx, &locker_script, txid.as_deref()).await?),
        },
        Commands::Locker { command } => match command {
            LockerCommands::Hash { script } => emit(&locker_hash(&script)?),
        },
        Commands::Claim { command } => match command {
            ClaimCommands::Prepare {
                config,
                note,
                txid,
                root_slot,
                witness_out,
            } => claim_prepare(config, note, &txid, root_slot, witness_out).await,
            ClaimCommands::Prove {
                witness,
                proof_key,
                proof_out,
            } => emit(&claim_prove(witness, proof_key, proof_out).await?.public_signals),
        },
        Commands::Verify { command } => match command {
            VerifyCommands::Proof {
                proof,
                proof_key,
                config,
            } => emit(
                &verify_proof(proof, proof_key, config.as_deref())
                    .await?
                    .public_signals,
            ),
        },
        Commands::Config { command } => match command {
            ConfigCommands::Schema => {
                let mut stdout = std::io::stdout().lock();
                writeln!(stdout, "{}", config_schema()?)?;
                Ok(())
            }
        },
    }
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> eyre::Result<()> {
    // Initialize rustls crypto provider (required for TLS connections)
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|e| eyre::eyre!("Failed to install rustls crypto provider: {e:?}"))?;

    // Load .env file (fails silently if not found)
    let _ = dotenvy::dotenv();

    init_tracing()?;

    let cli = Cli::parse();

    if let Err(e) = run(cli.command).await {
        tracing::error!("Error: {:?}", e);
        std::process::exit(1);
    }

    Ok(())
}
