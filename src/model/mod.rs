pub mod address;
pub mod amount;
pub mod chain;
pub mod membership;
pub mod token;
pub mod vault;

pub use address::{AddressError, parse_address};
pub use chain::Chain;
pub use membership::{Allowlist, Membership, Role, SourceId};
pub use token::{KnownToken, StrategyInfo, TokenBalance, TokenSource, VaultTokens};
pub use vault::{VaultFields, VaultRecord};
