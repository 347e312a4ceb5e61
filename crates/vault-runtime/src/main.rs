//! # Cold Vault
//!
//! Line-oriented console host for the vault. Each stdin line is one of:
//!
//! - `frame <hex>` - a raw frame as read by the camera
//! - `seed <name> <phrase>` - make a seed available for derivation
//! - `<action> [details]` - a user action by its snake_case name;
//!   `approve_sign` reads the seed phrase from the following line
//!
//! Every action result is printed to stdout as one JSON line.

use anyhow::{Context, Result};
use cv_05_navigation::Action;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{info, warn};
use vault_runtime::{init_tracing, VaultConfig, VaultContext, VaultRuntime};
use zeroize::Zeroizing;

#[tokio::main]
async fn main() -> Result<()> {
    let config = VaultConfig::from_env().context("Failed to load configuration")?;
    init_tracing(&config.telemetry)?;

    let context = VaultContext::new(config).context("Invalid configuration")?;
    let runtime = VaultRuntime::start(context)?;
    info!("Vault is running. Close stdin or press Ctrl+C to stop.");

    tokio::select! {
        result = console(&runtime) => result?,
        _ = tokio::signal::ctrl_c() => info!("Interrupted"),
    }

    runtime.shutdown().await;
    Ok(())
}

async fn console(runtime: &VaultRuntime) -> Result<()> {
    let context = runtime.context();
    let navigator = runtime.navigator();
    let frames = runtime.frame_sender();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await? {
        let line = Zeroizing::new(line);
        let (command, rest) = line.trim().split_once(' ').unwrap_or((line.trim(), ""));
        match command {
            "" => continue,
            "frame" => match hex::decode(rest.trim()) {
                Ok(raw) => frames.send(raw).await.context("capture loop stopped")?,
                Err(e) => warn!(error = %e, "Frame is not hex"),
            },
            "seed" => match rest.split_once(' ') {
                Some((name, phrase)) => {
                    context.seeds.add_seed(name, phrase.trim());
                    info!(seed = name, "Seed added");
                }
                None => warn!("Usage: seed <name> <phrase>"),
            },
            name => {
                let Some(action) = Action::parse(name) else {
                    warn!(command = name, "Unknown command");
                    continue;
                };
                let secret = if action == Action::ApproveSign {
                    lines.next_line().await?.map(Zeroizing::new)
                } else {
                    None
                };
                let secret = secret.map(|phrase| phrase.trim().to_string());
                match navigator.perform(action, rest, secret).await {
                    Ok(result) => {
                        let mut json = serde_json::to_vec(&result)?;
                        json.push(b'\n');
                        stdout.write_all(&json).await?;
                        stdout.flush().await?;
                    }
                    Err(e) => warn!(action = %action, error = %e, "Action rejected"),
                }
            }
        }
    }
    info!("Console closed");
    Ok(())
}
