pub mod api;
pub mod config;
pub mod evm;
pub mod merge;
pub mod model;
pub mod portfolio;
pub mod reconcile;
pub mod sources;
pub mod tokens;
