use std::time::Duration;

use anyhow::Result;

use vault_discovery::config::Services;
use vault_discovery::reconcile::MembershipWatcher;

use super::address_arg;

pub async fn run(services: &Services, user: &str, interval: Duration) -> Result<()> {
    let user = address_arg("user", user)?;
    let watcher = MembershipWatcher::spawn(services.controller.clone(), user, interval);
    let mut updates = watcher.subscribe();

    println!("── Watching {user} every {}s (Ctrl-C to stop) ──", interval.as_secs());

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let now = chrono::Utc::now();
                let latest = updates.borrow_and_update().clone();
                match latest {
                    Some(Ok(snapshot)) => {
                        let s = &snapshot.summary;
                        println!(
                            "[{}] {:?}: {} vaults ({} admin, {} member)  TVL: ${:.2}",
                            now.format("%H:%M:%S"),
                            snapshot.status,
                            s.total_vaults,
                            s.admin_vault_count,
                            s.member_vault_count,
                            s.total_value_locked,
                        );
                    }
                    Some(Err(e)) => eprintln!("[{}] ERROR: {e}", now.format("%H:%M:%S")),
                    None => {}
                }
            }
            _ = tokio::signal::ctrl_c() => {
                println!("\nStopping.");
                break;
            }
        }
    }

    watcher.stop();
    Ok(())
}
