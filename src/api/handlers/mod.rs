pub mod health;
pub mod memberships;
pub mod vaults;
