//! Issue a session token for local runs
//!
//! Usage:
//!   cargo run --bin issue_token -- --user admin-1 [--email ops@example.com] [--hours 8] [--env dev]
//!
//! Signs with `auth.jwt_secret` from the selected config (or
//! `BALANCE_ADMIN_JWT_SECRET`). Production tokens come from the identity
//! provider, not from this tool.

use anyhow::{Context, Result, bail};
use balance_admin::config::AppConfig;
use balance_admin::user_auth::JwtIdentityResolver;

fn arg(args: &[String], names: &[&str]) -> Option<String> {
    args.iter()
        .position(|a| names.contains(&a.as_str()))
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();

    let Some(user_id) = arg(&args, &["--user", "-u"]) else {
        bail!("usage: issue_token --user <user_id> [--email <email>] [--hours <n>] [--env <env>]");
    };
    let email = arg(&args, &["--email"]);
    let hours: i64 = match arg(&args, &["--hours"]) {
        Some(h) => h.parse().with_context(|| format!("Invalid --hours: {}", h))?,
        None => 8,
    };
    let env = arg(&args, &["--env", "-e"]).unwrap_or_else(|| "dev".to_string());

    let config = AppConfig::load(&env)?;
    let resolver = JwtIdentityResolver::new(config.auth.jwt_secret);
    let token = resolver.issue_token(&user_id, email.as_deref(), chrono::Duration::hours(hours))?;

    println!("{}", token);
    Ok(())
}
