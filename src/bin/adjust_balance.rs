//! Command-line front end of the balance update client
//!
//! Usage:
//!   cargo run --bin adjust_balance -- --user <user_id> --mode delta --reason "bonus" \
//!       [--cash 50] [--invested 0] [--free-margin 0] \
//!       [--url http://localhost:8090] [--token <jwt>]
//!
//! The token defaults to `BALANCE_ADMIN_TOKEN`.

use anyhow::{Context, Result, bail};
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use balance_admin::balance::BalanceUpdates;
use balance_admin::client::{BalanceUpdateClient, HttpTransport, TracingNotifier};

const TOKEN_ENV: &str = "BALANCE_ADMIN_TOKEN";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

fn arg(args: &[String], name: &str) -> Option<String> {
    args.iter()
        .position(|a| a == name)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn amount(args: &[String], name: &str) -> Result<Option<Decimal>> {
    arg(args, name)
        .map(|v| {
            Decimal::from_str(&v)
                .or_else(|_| Decimal::from_scientific(&v))
                .with_context(|| format!("Invalid {}: {}", name, v))
        })
        .transpose()
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let args: Vec<String> = std::env::args().collect();

    let url = arg(&args, "--url").unwrap_or_else(|| "http://localhost:8090".to_string());
    let token = match arg(&args, "--token").or_else(|| std::env::var(TOKEN_ENV).ok()) {
        Some(token) => token,
        None => bail!("No token: pass --token or set {}", TOKEN_ENV),
    };

    let updates = BalanceUpdates {
        cash_balance: amount(&args, "--cash")?,
        invested_amount: amount(&args, "--invested")?,
        free_margin: amount(&args, "--free-margin")?,
    };
    let user_id = arg(&args, "--user").unwrap_or_default();
    let mode = arg(&args, "--mode").unwrap_or_default();
    let reason = arg(&args, "--reason").unwrap_or_default();

    let transport = HttpTransport::new(&url, token, REQUEST_TIMEOUT)
        .context("Failed to build HTTP client")?;
    let client = BalanceUpdateClient::new(Arc::new(transport), Arc::new(TracingNotifier));

    let balance = client.update_balance(&user_id, updates, &mode, &reason).await?;
    println!("{}", serde_json::to_string_pretty(&balance)?);
    Ok(())
}
