//! Отбор отслеживаемых счетов по имени.

use tracing::info;

use crate::client::BrokerClient;
use crate::error::AnalysisError;
use crate::types::AccountId;

/// Возвращает идентификаторы счетов, чьё имя входит в `names`.
///
/// Порядок совпадает с порядком выдачи брокера. Ошибка клиента пробрасывается
/// без повторов.
pub fn resolve_accounts<C, S>(client: &C, names: &[S]) -> Result<Vec<AccountId>, AnalysisError>
where
    C: BrokerClient + ?Sized,
    S: AsRef<str>,
{
    let resolved: Vec<AccountId> = client
        .accounts()?
        .into_iter()
        .filter(|acc| names.iter().any(|n| n.as_ref() == acc.name))
        .map(|acc| acc.id)
        .collect();
    info!(count = resolved.len(), accounts = ?resolved, "tracked accounts resolved");
    Ok(resolved)
}
