//! Сводка пополнений и стоимости портфеля по отслеживаемым счетам.

use std::fmt;

use tracing::info;

use crate::accounts::resolve_accounts;
use crate::client::BrokerClient;
use crate::error::AnalysisError;
use crate::operations::{fetch_operations, sum_by_type};
use crate::portfolio::current_value;
use crate::types::{
    AccountId, DateRange, Operation, OperationFilter, OperationKind, OperationQuery, Units,
};

/// Итог анализа за период.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisReport {
    /// Период выборки пополнений.
    pub range: DateRange,
    /// Сумма пополнений по всем счетам, целые рубли.
    pub deposits: Units,
    /// Текущая стоимость портфелей по всем счетам, целые рубли.
    pub portfolio_value: Units,
}

impl fmt::Display for AnalysisReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "За период {}:", self.range)?;
        writeln!(f, "-------------------------")?;
        writeln!(f, "Пополнения: {} руб", self.deposits)?;
        writeln!(
            f,
            "Текущая  рублёвая стоимость портфеля: {} руб",
            self.portfolio_value
        )
    }
}

/// Анализатор поверх клиента брокера.
///
/// Список счетов определяется один раз при создании и не обновляется до конца
/// жизни объекта.
pub struct Analyzer<C> {
    client: C,
    accounts: Vec<AccountId>,
}

impl<C: BrokerClient> Analyzer<C> {
    /// Создаёт анализатор, отбирая счета по именам из `names`.
    pub fn new<S: AsRef<str>>(client: C, names: &[S]) -> Result<Self, AnalysisError> {
        let accounts = resolve_accounts(&client, names)?;
        Ok(Self { client, accounts })
    }

    /// Создаёт анализатор с заранее известным списком счетов.
    pub const fn with_accounts(client: C, accounts: Vec<AccountId>) -> Self {
        Self { client, accounts }
    }

    /// Отслеживаемые счета.
    #[inline]
    pub fn accounts(&self) -> &[AccountId] {
        &self.accounts
    }

    /// Сумма пополнений по всем счетам за период.
    pub fn sum_deposits(&self, range: DateRange) -> Result<Units, AnalysisError> {
        let mut total = 0;
        for account in &self.accounts {
            total += sum_by_type(
                &self.client,
                account,
                OperationFilter::Only(OperationKind::Input),
                range,
            )?;
        }
        Ok(total)
    }

    /// Текущая стоимость портфелей по всем счетам.
    pub fn portfolio_total(&self) -> Result<Units, AnalysisError> {
        let mut total = 0;
        for account in &self.accounts {
            total += current_value(&self.client, account)?;
        }
        Ok(total)
    }

    /// Все операции счёта за период, без фильтра по типу.
    pub fn operations(
        &self,
        account: &AccountId,
        range: DateRange,
    ) -> Result<Vec<Operation>, AnalysisError> {
        let query = OperationQuery {
            account: account.clone(),
            filter: OperationFilter::All,
            range,
        };
        let operations = fetch_operations(&self.client, &query)?;
        for op in &operations {
            info!(kind = %op.kind, description = %op.description, date = %op.date, "operation");
        }
        Ok(operations)
    }

    /// Строит сводку за период `start`..`end` (даты в формате `YYYY-MM-DD`).
    ///
    /// Любая ошибка прерывает построение целиком.
    pub fn analyze(&self, start: &str, end: &str) -> Result<AnalysisReport, AnalysisError> {
        let range = DateRange::parse(start, end)?;
        let portfolio_value = self.portfolio_total()?;
        let deposits = self.sum_deposits(range)?;
        info!(%range, deposits, portfolio_value, "analysis complete");
        Ok(AnalysisReport {
            range,
            deposits,
            portfolio_value,
        })
    }
}
