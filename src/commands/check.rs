use anyhow::{Context, Result};

use vault_discovery::config::Services;

use super::address_arg;

pub async fn run(services: &Services, vault: &str, user: &str) -> Result<()> {
    let vault = address_arg("vault", vault)?;
    let user = address_arg("user", user)?;

    let membership = services
        .controller
        .lookup_vault(vault, user)
        .await
        .context("membership lookup failed")?;

    match membership {
        Some(m) => {
            println!("{} is {} of {} {}", user, m.role, vault, m.vault.label());
            println!("  Balance:   {}", m.user_balance);
            println!("  Allowlist: {}", if m.is_on_allowlist { "yes" } else { "no" });
            if m.vault.fields.is_paused == Some(true) {
                println!("  (vault is paused)");
            }
        }
        None => println!("{user} holds no role in {vault}"),
    }
    Ok(())
}
