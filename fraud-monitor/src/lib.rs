//! Fraud Monitor
//!
//! Caller side of the risk engine: applies the flag and alert policy to scored
//! transactions and keeps in-memory rule, transaction, alert and case records.

pub mod config;
pub mod errors;
pub mod models;
pub mod monitor;
pub mod policy;
pub mod rules;
pub mod simulator;

pub use crate::config::Config;
pub use errors::{MonitorError, MonitorResult};
pub use monitor::TransactionMonitor;
pub use policy::FlagPolicy;
pub use rules::RuleBook;
pub use simulator::TransactionGenerator;
