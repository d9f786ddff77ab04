use clap::{Parser, Subcommand};

/// Vault membership discovery: find every vault an address administers or
/// belongs to, across the factory, allowlist events and the indexing API.
#[derive(Parser)]
#[command(name = "vault-discovery", version, about)]
pub struct Cli {
    /// JSON-RPC endpoint (overrides VAULT_RPC_URL and the chain preset)
    #[arg(long, global = true)]
    pub rpc_url: Option<String>,

    /// Membership indexing API base URL (overrides VAULT_INDEXER_URL)
    #[arg(long, global = true)]
    pub indexer_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run one reconciliation pass for a user and print the result
    Discover {
        /// User address (0x-prefixed)
        user: String,

        /// Print the snapshot as JSON
        #[arg(long)]
        json: bool,
    },

    /// Keep reconciling a user on an interval until Ctrl-C
    Watch {
        /// User address (0x-prefixed)
        user: String,

        /// Seconds between passes (default: POLL_INTERVAL_SECS or 30)
        #[arg(long)]
        interval: Option<u64>,
    },

    /// Check a user's standing in one vault
    Check {
        /// Vault address
        vault: String,

        /// User address
        user: String,
    },

    /// Show the tokens and strategies of one vault
    Tokens {
        /// Vault address
        vault: String,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Start the HTTP API server
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        /// Port to listen on
        #[arg(long, default_value = "8080")]
        port: u16,
    },
}
