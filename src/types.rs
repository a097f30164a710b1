//! Доменные типы: счета, операции, денежные значения и период выборки.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

use crate::error::AnalysisError;
use crate::utils::parse_date;

/// Сумма в целых рублях (дробная часть отброшена).
pub type Units = i64;

/// Идентификатор брокерского счёта.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AccountId(pub String);

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AccountId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Счёт в том виде, в каком его отдаёт брокер.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    /// Идентификатор.
    pub id: AccountId,
    /// Отображаемое имя счёта.
    pub name: String,
}

/// Тип операции по счёту.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OperationKind {
    /// Пополнение брокерского счёта.
    Input,
    /// Вывод денежных средств.
    Output,
    /// Любой другой тип, хранится исходное имя.
    Other(String),
}

impl OperationKind {
    /// Имя типа в API брокера.
    pub fn as_wire(&self) -> &str {
        match self {
            Self::Input => "OPERATION_TYPE_INPUT",
            Self::Output => "OPERATION_TYPE_OUTPUT",
            Self::Other(name) => name.as_str(),
        }
    }

    /// Разбирает имя типа из ответа API.
    pub fn from_wire(name: &str) -> Self {
        match name {
            "OPERATION_TYPE_INPUT" => Self::Input,
            "OPERATION_TYPE_OUTPUT" => Self::Output,
            other => Self::Other(other.to_string()),
        }
    }

    /// Числовой код типа в протоколе брокера, если он известен.
    pub const fn code(&self) -> Option<i32> {
        match self {
            Self::Input => Some(1),
            Self::Output => Some(9),
            Self::Other(_) => None,
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

/// Фильтр по типу операций.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationFilter {
    /// Только операции указанного типа.
    Only(OperationKind),
    /// Операции всех типов.
    All,
}

/// Денежное значение в формате брокера: целая часть и миллиардные доли.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoneyValue {
    /// Валюта (ISO-код в нижнем регистре, как отдаёт API).
    pub currency: String,
    /// Целая часть.
    pub units: i64,
    /// Дробная часть в нано-единицах, знак совпадает с `units`.
    pub nano: i32,
}

impl MoneyValue {
    /// Создаёт значение из целой и дробной части.
    pub fn new(currency: &str, units: i64, nano: i32) -> Self {
        Self {
            currency: currency.to_string(),
            units,
            nano,
        }
    }

    /// Целая часть суммы: дробь отбрасывается, без округления.
    #[inline]
    pub const fn units(&self) -> Units {
        self.units
    }

    /// Точное значение с учётом дробной части.
    pub fn to_decimal(&self) -> Decimal {
        Decimal::from(self.units) + Decimal::new(i64::from(self.nano), 9)
    }
}

/// Операция по счёту.
#[derive(Debug, Clone)]
pub struct Operation {
    /// Идентификатор операции.
    pub id: String,
    /// Тип операции.
    pub kind: OperationKind,
    /// Описание от брокера.
    pub description: String,
    /// Момент совершения.
    pub date: DateTime<Utc>,
    /// Сумма операции.
    pub payment: MoneyValue,
}

/// Одна страница ответа на запрос операций.
#[derive(Debug, Clone, Default)]
pub struct OperationsPage {
    /// Операции страницы.
    pub items: Vec<Operation>,
    /// Курсор следующей страницы, `None` если страница последняя.
    pub next_cursor: Option<String>,
}

/// Оценка портфеля счёта на текущий момент.
#[derive(Debug, Clone)]
pub struct PortfolioSnapshot {
    /// Общая стоимость портфеля в рублях.
    pub total: MoneyValue,
}

/// Период выборки операций.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    /// Начало периода.
    pub start: NaiveDate,
    /// Конец периода.
    pub end: NaiveDate,
}

impl DateRange {
    /// Разбирает период из строк вида `YYYY-MM-DD`.
    pub fn parse(start: &str, end: &str) -> Result<Self, AnalysisError> {
        Ok(Self {
            start: parse_date(start)?,
            end: parse_date(end)?,
        })
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.start, self.end)
    }
}

/// Параметры запроса операций по одному счёту.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationQuery {
    /// Счёт.
    pub account: AccountId,
    /// Фильтр по типу.
    pub filter: OperationFilter,
    /// Период.
    pub range: DateRange,
}
