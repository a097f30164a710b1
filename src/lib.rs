#![warn(missing_docs)]
//! Сводка пополнений и текущей стоимости портфеля по счетам Т-Инвестиций.

mod accounts;
mod client;
mod config;
mod error;
mod operations;
mod portfolio;
mod report;
mod types;
mod utils;

pub use crate::accounts::resolve_accounts;
pub use crate::client::{BrokerClient, PAGE_LIMIT, RestClient};
pub use crate::config::{Config, DEFAULT_ACCOUNTS, DEFAULT_API_URL};
pub use crate::error::AnalysisError;
pub use crate::operations::{fetch_operations, sum_by_type, total_units};
pub use crate::portfolio::current_value;
pub use crate::report::{AnalysisReport, Analyzer};
pub use crate::types::*;
