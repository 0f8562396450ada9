pub mod canonical;
pub mod config;

#[cfg(feature = "logging")]
pub mod logging;

#[cfg(feature = "ledger")]
pub mod ledger;
