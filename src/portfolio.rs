//! Текущая стоимость портфеля счёта.

use crate::client::BrokerClient;
use crate::error::AnalysisError;
use crate::types::{AccountId, Units};

/// Стоимость портфеля в целых рублях; каждый вызов заново опрашивает брокера.
pub fn current_value<C>(client: &C, account: &AccountId) -> Result<Units, AnalysisError>
where
    C: BrokerClient + ?Sized,
{
    Ok(client.portfolio(account)?.total.units())
}
