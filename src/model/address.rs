use alloy::primitives::Address;
use thiserror::Error;

/// Why a caller-supplied address was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("address `{0}` is not 0x-prefixed")]
    MissingPrefix(String),

    #[error("address `{input}` has {len} hex digits, expected 40")]
    BadLength { input: String, len: usize },

    #[error("address `{0}` contains non-hex characters")]
    NotHex(String),

    #[error("the zero address is not a valid account")]
    Zero,
}

/// Validate and normalize a user- or vault-address string.
///
/// Accepts any letter case (no checksum enforcement) so that the same
/// account typed in different cases maps to one key.
pub fn parse_address(input: &str) -> Result<Address, AddressError> {
    let trimmed = input.trim();
    let hex = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .ok_or_else(|| AddressError::MissingPrefix(trimmed.to_string()))?;

    if hex.len() != 40 {
        return Err(AddressError::BadLength {
            input: trimmed.to_string(),
            len: hex.len(),
        });
    }
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(AddressError::NotHex(trimmed.to_string()));
    }

    let addr: Address = hex
        .parse()
        .map_err(|_| AddressError::NotHex(trimmed.to_string()))?;
    if addr.is_zero() {
        return Err(AddressError::Zero);
    }
    Ok(addr)
}

/// Lowercase 0x form, used as a stable key in logs and query strings.
pub fn lower_hex(addr: &Address) -> String {
    format!("{addr:#x}")
}

pub fn short_addr(addr: &Address) -> String {
    let s = format!("{addr}");
    if s.len() > 10 {
        format!("{}...{}", &s[..6], &s[s.len() - 4..])
    } else {
        s
    }
}
