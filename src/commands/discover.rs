use anyhow::{Context, Result};

use vault_discovery::config::Services;
use vault_discovery::model::address::short_addr;
use vault_discovery::reconcile::{MembershipSnapshot, PassStatus};

use super::{address_arg, truncate};

pub async fn run(services: &Services, user: &str, json: bool) -> Result<()> {
    let user = address_arg("user", user)?;
    let snapshot = services
        .controller
        .refresh(user)
        .await
        .context("reconciliation failed")?;

    if json {
        let out = serde_json::to_string_pretty(snapshot.as_ref()).context("serializing snapshot")?;
        println!("{out}");
        return Ok(());
    }

    print_snapshot(&snapshot);
    Ok(())
}

pub fn print_snapshot(snapshot: &MembershipSnapshot) {
    println!("Memberships for {}", snapshot.user);
    for source in &snapshot.sources {
        match &source.error {
            None => println!("  {:<18} ok ({} records)", source.source.name(), source.records),
            Some(err) => println!("  {:<18} unavailable: {}", source.source.name(), err),
        }
    }
    if snapshot.status == PassStatus::Partial {
        println!("  (partial result: some sources were unavailable)");
    }
    println!();

    if snapshot.memberships.is_empty() {
        println!("No vaults found for this address.");
        return;
    }

    println!(
        "{:<14} {:<24} {:<8} {:>20} {:<10} {}",
        "VAULT", "NAME", "ROLE", "BALANCE", "ALLOWLIST", "SOURCES"
    );
    println!("{}", "-".repeat(100));
    for m in &snapshot.memberships {
        let sources: Vec<&str> = m.source_origins.iter().map(|s| s.name()).collect();
        println!(
            "{:<14} {:<24} {:<8} {:>20} {:<10} {}",
            short_addr(&m.vault.address),
            truncate(m.vault.label(), 23),
            m.role,
            m.user_balance.to_string(),
            if m.is_on_allowlist { "yes" } else { "no" },
            sources.join(","),
        );
    }

    let s = &snapshot.summary;
    println!(
        "\n{} vaults ({} admin, {} member)  TVL: ${:.2}  Position: ${:.2}",
        s.total_vaults, s.admin_vault_count, s.member_vault_count, s.total_value_locked, s.user_position_value,
    );
}
