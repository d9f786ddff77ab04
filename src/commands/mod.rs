pub mod check;
pub mod discover;
pub mod tokens;
pub mod watch;

use alloy::primitives::Address;
use anyhow::{Context, Result};

use vault_discovery::model::parse_address;

pub(crate) fn address_arg(name: &str, value: &str) -> Result<Address> {
    parse_address(value).with_context(|| format!("invalid {name} address"))
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let head: String = s.chars().take(max - 1).collect();
        format!("{head}…")
    } else {
        s.to_string()
    }
}
