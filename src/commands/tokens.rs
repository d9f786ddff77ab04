use alloy::primitives::U256;
use anyhow::{Context, Result};

use vault_discovery::config::Services;
use vault_discovery::model::TokenSource;
use vault_discovery::model::address::short_addr;
use vault_discovery::model::amount::to_display;

use super::{address_arg, truncate};

pub async fn run(services: &Services, vault: &str, json: bool) -> Result<()> {
    let vault = address_arg("vault", vault)?;
    let view = services.resolver.resolve(vault).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&view).context("serializing tokens")?);
        return Ok(());
    }

    println!("{:<10} {:<14} {:>20} {:<9} {}", "TOKEN", "ADDRESS", "BALANCE", "SOURCE", "STRATEGY");
    println!("{}", "-".repeat(72));
    for t in &view.tokens {
        let unit = U256::from(10u64).pow(U256::from(t.decimals));
        println!(
            "{:<10} {:<14} {:>20.4} {:<9} {}",
            truncate(t.symbol.as_deref().unwrap_or("?"), 9),
            short_addr(&t.token_address),
            to_display(t.balance_raw, unit),
            match t.source {
                TokenSource::Vault => "vault",
                TokenSource::Strategy => "strategy",
            },
            t.strategy_name.as_deref().unwrap_or(""),
        );
    }

    if !view.strategies.is_empty() {
        println!("\nStrategies:");
        for s in &view.strategies {
            println!(
                "  {} {} deployed {}",
                short_addr(&s.address),
                s.name.as_deref().unwrap_or("(unnamed)"),
                s.deployed_raw,
            );
        }
    }
    Ok(())
}
