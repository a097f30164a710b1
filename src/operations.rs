//! Выборка операций по курсору и суммирование.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::client::BrokerClient;
use crate::error::AnalysisError;
use crate::types::{AccountId, DateRange, Operation, OperationFilter, OperationQuery, Units};

/// Загружает все страницы операций по запросу, следуя курсору.
pub fn fetch_operations<C>(
    client: &C,
    query: &OperationQuery,
) -> Result<Vec<Operation>, AnalysisError>
where
    C: BrokerClient + ?Sized,
{
    let mut operations = Vec::new();
    let mut seen = HashSet::new();
    let mut cursor: Option<String> = None;
    loop {
        let page = client.operations_page(query, cursor.as_deref())?;
        debug!(account = %query.account, items = page.items.len(), "operations page received");
        operations.extend(page.items);
        match page.next_cursor {
            // Уже запрошенный курсор означает цикл на стороне сервиса.
            Some(next) if seen.insert(next.clone()) => cursor = Some(next),
            Some(next) => {
                warn!(account = %query.account, cursor = %next, "cursor repeated, paging stopped");
                break;
            }
            None => break,
        }
    }
    Ok(operations)
}

/// Сумма целых частей платежей по операциям: дробь отбрасывается.
pub fn total_units<'a, I>(operations: I) -> Units
where
    I: IntoIterator<Item = &'a Operation>,
{
    operations.into_iter().map(|op| op.payment.units()).sum()
}

/// Сумма операций указанного типа по счёту за период.
pub fn sum_by_type<C>(
    client: &C,
    account: &AccountId,
    filter: OperationFilter,
    range: DateRange,
) -> Result<Units, AnalysisError>
where
    C: BrokerClient + ?Sized,
{
    let query = OperationQuery {
        account: account.clone(),
        filter,
        range,
    };
    let operations = fetch_operations(client, &query)?;
    Ok(total_units(&operations))
}
