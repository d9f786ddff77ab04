use alloy::primitives::{Address, address};

use crate::model::KnownToken;

// ── Base token registry ──────────────────────────────────────────────

/// (chain_id, symbol, address, decimals)
const BASE_TOKENS: &[(u64, &str, Address, u8)] = &[
    // ── Ethereum ──
    (1, "USDC", address!("0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48"), 6),
    (1, "USDT", address!("0xdAC17F958D2ee523a2206206994597C13D831ec7"), 6),
    (1, "WETH", address!("0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2"), 18),
    (1, "DAI", address!("0x6B175474E89094C44Da98b954EedeAC495271d0F"), 18),
    (1, "WBTC", address!("0x2260FAC5E5542a773Aa44fBCfeDf7C193bc2C599"), 8),
    // ── Base ──
    (8453, "USDC", address!("0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913"), 6),
    (8453, "WETH", address!("0x4200000000000000000000000000000000000006"), 18),
    (8453, "CBBTC", address!("0xcbB7C0000aB88B473b1f5aFd9ef808440eed33Bf"), 8),
    (8453, "DAI", address!("0x50c5725949A6F0c72E6C4a641F24049A917DB0Cb"), 18),
    // ── Arbitrum ──
    (42161, "USDC", address!("0xaf88d065e77c8cC2239327C5EDb3A432268e5831"), 6),
    (42161, "USDT", address!("0xFd086bC7CD5C481DCC9C85ebE478A1C0b69FCbb9"), 6),
    (42161, "WETH", address!("0x82aF49447D8a07e3bd95BD0d56f35241523fBab1"), 18),
    (42161, "WBTC", address!("0x2f2a2543B76A4166549F7aaB2e75Bef0aefC5B0f"), 8),
    // ── Optimism ──
    (10, "USDC", address!("0x0b2C639c533813f4Aa9D7837CAf62653d097Ff85"), 6),
    (10, "WETH", address!("0x4200000000000000000000000000000000000006"), 18),
    // ── Mantle ──
    (5000, "USDC", address!("0x09Bc4E0D864854c6aFB6eB9A9cdF58aC190D0dF9"), 6),
    (5000, "USDT", address!("0x201EBa5CC46D216Ce6DC03F6a759e8E766e956aE"), 6),
    (5000, "WETH", address!("0xdEAddEaDdeadDEadDEADDEAddEADDEAddead1111"), 18),
    (5000, "USDE", address!("0x5d3a1Ff2b6BAb83b63cd9AD0787074081a52ef34"), 18),
    // ── HyperEVM ──
    (999, "USDC", address!("0xEB62eee3685fC5Eb20D2bDCd08B25014B8407492"), 6),
    (999, "USDE", address!("0x5d3a1Ff2b6BAb83b63cd9AD0787074081a52ef34"), 18),
    (999, "WHYPE", address!("0x2Fc2C4E7a3BD6C9EE0C7a9f2C90ac109f93D7e3D"), 18),
];

/// Tokens every vault view on `chain_id` lists, even at zero balance.
pub fn base_tokens(chain_id: u64) -> Vec<KnownToken> {
    BASE_TOKENS
        .iter()
        .filter(|(cid, ..)| *cid == chain_id)
        .map(|(_, symbol, address, decimals)| KnownToken {
            symbol: symbol.to_string(),
            address: *address,
            decimals: *decimals,
        })
        .collect()
}
