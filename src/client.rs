//! Клиент Invest API: трейт для подмены в тестах и реализация поверх REST-шлюза.

use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Config;
use crate::error::AnalysisError;
use crate::types::{
    Account, AccountId, MoneyValue, Operation, OperationFilter, OperationKind, OperationQuery,
    OperationsPage, PortfolioSnapshot,
};
use crate::utils::{day_start, parse_int64};

const SERVICE_PREFIX: &str = "tinkoff.public.invest.api.contract.v1";

/// Максимальный размер страницы операций, который принимает API.
pub const PAGE_LIMIT: u32 = 1000;

/// Операции брокера, на которых строится сводка.
pub trait BrokerClient {
    /// Все счета пользователя в порядке, в котором их отдаёт брокер.
    fn accounts(&self) -> Result<Vec<Account>, AnalysisError>;

    /// Одна страница операций; `cursor = None` запрашивает первую.
    fn operations_page(
        &self,
        query: &OperationQuery,
        cursor: Option<&str>,
    ) -> Result<OperationsPage, AnalysisError>;

    /// Текущая оценка портфеля счёта.
    fn portfolio(&self, account: &AccountId) -> Result<PortfolioSnapshot, AnalysisError>;
}

impl<T: BrokerClient + ?Sized> BrokerClient for &T {
    fn accounts(&self) -> Result<Vec<Account>, AnalysisError> {
        (**self).accounts()
    }

    fn operations_page(
        &self,
        query: &OperationQuery,
        cursor: Option<&str>,
    ) -> Result<OperationsPage, AnalysisError> {
        (**self).operations_page(query, cursor)
    }

    fn portfolio(&self, account: &AccountId) -> Result<PortfolioSnapshot, AnalysisError> {
        (**self).portfolio(account)
    }
}

/// Блокирующий клиент REST-шлюза Invest API.
#[derive(Debug, Clone)]
pub struct RestClient {
    http: reqwest::blocking::Client,
    base_url: String,
    token: String,
}

impl RestClient {
    /// Создаёт клиента; HTTP-соединения переиспользуются между вызовами.
    pub fn new(config: &Config) -> Result<Self, AnalysisError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("tin-analysis/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url: config.api_url.clone(),
            token: config.token.clone(),
        })
    }

    fn call<Req, Resp>(&self, method: &str, body: &Req) -> Result<Resp, AnalysisError>
    where
        Req: Serialize,
        Resp: DeserializeOwned,
    {
        let url = format!("{}/{SERVICE_PREFIX}.{method}", self.base_url);
        debug!(%url, "POST");
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .json(body)
            .send()?;
        let status = response.status();
        let text = response.text()?;
        if !status.is_success() {
            return Err(api_error(status, text));
        }
        Ok(serde_json::from_str(&text)?)
    }
}

/// Ошибка неуспешного ответа: `message` шлюза, а без него тело как есть.
fn api_error(status: StatusCode, text: String) -> AnalysisError {
    let message = serde_json::from_str::<ApiErrorBody>(&text)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.is_empty())
        .unwrap_or(text);
    AnalysisError::Api {
        status: status.as_u16(),
        message,
    }
}

impl BrokerClient for RestClient {
    fn accounts(&self) -> Result<Vec<Account>, AnalysisError> {
        let response: AccountsResponse = self.call("UsersService/GetAccounts", &Empty {})?;
        Ok(response.into_accounts())
    }

    fn operations_page(
        &self,
        query: &OperationQuery,
        cursor: Option<&str>,
    ) -> Result<OperationsPage, AnalysisError> {
        let request = OperationsRequest::new(query, cursor);
        debug!(account = %query.account, ?cursor, "operations page");
        let response: OperationsResponse =
            self.call("OperationsService/GetOperationsByCursor", &request)?;
        response.into_page()
    }

    fn portfolio(&self, account: &AccountId) -> Result<PortfolioSnapshot, AnalysisError> {
        let request = PortfolioRequest {
            account_id: &account.0,
            currency: "RUB",
        };
        let response: PortfolioResponse = self.call("OperationsService/GetPortfolio", &request)?;
        response.into_snapshot()
    }
}

#[derive(Serialize)]
struct Empty {}

#[derive(Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
}

#[derive(Deserialize)]
struct AccountsResponse {
    #[serde(default)]
    accounts: Vec<WireAccount>,
}

impl AccountsResponse {
    fn into_accounts(self) -> Vec<Account> {
        self.accounts
            .into_iter()
            .map(|a| Account {
                id: AccountId(a.id),
                name: a.name,
            })
            .collect()
    }
}

#[derive(Deserialize)]
struct WireAccount {
    id: String,
    #[serde(default)]
    name: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OperationsRequest<'a> {
    account_id: &'a str,
    from: String,
    to: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    cursor: Option<&'a str>,
    limit: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    operation_types: Vec<&'a str>,
}

impl<'a> OperationsRequest<'a> {
    fn new(query: &'a OperationQuery, cursor: Option<&'a str>) -> Self {
        let operation_types = match &query.filter {
            OperationFilter::Only(kind) => vec![kind.as_wire()],
            OperationFilter::All => Vec::new(),
        };
        Self {
            account_id: &query.account.0,
            from: day_start(query.range.start),
            to: day_start(query.range.end),
            cursor,
            limit: PAGE_LIMIT,
            operation_types,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct OperationsResponse {
    #[serde(default)]
    has_next: bool,
    #[serde(default)]
    next_cursor: String,
    #[serde(default)]
    items: Vec<WireOperation>,
}

impl OperationsResponse {
    fn into_page(self) -> Result<OperationsPage, AnalysisError> {
        let items = self
            .items
            .into_iter()
            .map(WireOperation::into_operation)
            .collect::<Result<Vec<_>, _>>()?;
        let next_cursor = (self.has_next && !self.next_cursor.is_empty()).then_some(self.next_cursor);
        Ok(OperationsPage { items, next_cursor })
    }
}

#[derive(Deserialize)]
struct WireOperation {
    #[serde(default)]
    id: String,
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    description: String,
    date: DateTime<Utc>,
    #[serde(default)]
    payment: Option<WireMoney>,
}

impl WireOperation {
    fn into_operation(self) -> Result<Operation, AnalysisError> {
        Ok(Operation {
            id: self.id,
            kind: OperationKind::from_wire(&self.kind),
            description: self.description,
            date: self.date,
            payment: WireMoney::into_money(self.payment)?,
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PortfolioRequest<'a> {
    account_id: &'a str,
    currency: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PortfolioResponse {
    #[serde(default)]
    total_amount_portfolio: Option<WireMoney>,
}

impl PortfolioResponse {
    fn into_snapshot(self) -> Result<PortfolioSnapshot, AnalysisError> {
        Ok(PortfolioSnapshot {
            total: WireMoney::into_money(self.total_amount_portfolio)?,
        })
    }
}

/// int64 в JSON-отображении protobuf приходит строкой, но принимаем и число.
#[derive(Deserialize)]
#[serde(untagged)]
enum Int64 {
    Text(String),
    Number(i64),
}

impl Int64 {
    fn value(self, field: &'static str) -> Result<i64, AnalysisError> {
        match self {
            Self::Text(s) => parse_int64(&s, field),
            Self::Number(n) => Ok(n),
        }
    }
}

#[derive(Deserialize)]
struct WireMoney {
    #[serde(default)]
    currency: String,
    #[serde(default)]
    units: Option<Int64>,
    #[serde(default)]
    nano: i32,
}

impl WireMoney {
    fn into_money(money: Option<Self>) -> Result<MoneyValue, AnalysisError> {
        let Some(money) = money else {
            return Ok(MoneyValue::new("rub", 0, 0));
        };
        let units = match money.units {
            Some(units) => units.value("units")?,
            None => 0,
        };
        Ok(MoneyValue {
            currency: money.currency,
            units,
            nano: money.nano,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DateRange;

    #[test]
    fn api_error_prefers_gateway_message() {
        let body = r#"{"code": 16, "message": "authentication token is missing or invalid", "description": "40003"}"#;
        let err = api_error(StatusCode::UNAUTHORIZED, body.to_string());
        assert!(matches!(
            err,
            AnalysisError::Api { status: 401, ref message }
                if message == "authentication token is missing or invalid"
        ));
    }

    #[test]
    fn api_error_keeps_body_when_message_empty() {
        let body = r#"{"code": 3, "message": ""}"#;
        let err = api_error(StatusCode::BAD_REQUEST, body.to_string());
        assert!(matches!(
            err,
            AnalysisError::Api { status: 400, ref message } if message == body
        ));
    }

    #[test]
    fn api_error_keeps_non_json_body() {
        let err = api_error(StatusCode::BAD_GATEWAY, "upstream timeout".to_string());
        assert!(matches!(
            err,
            AnalysisError::Api { status: 502, ref message } if message == "upstream timeout"
        ));
    }

    #[test]
    fn decodes_accounts_in_listing_order() {
        let body = r#"{"accounts":[
            {"id":"2000","type":"ACCOUNT_TYPE_TINKOFF","name":"ETF","status":"ACCOUNT_STATUS_OPEN"},
            {"id":"2001","name":"Bonds"}
        ]}"#;
        let response: AccountsResponse = serde_json::from_str(body).unwrap();
        let accounts = response.into_accounts();
        assert_eq!(accounts.len(), 2);
        assert_eq!(accounts[0].id, AccountId::from("2000"));
        assert_eq!(accounts[1].name, "Bonds");
    }

    #[test]
    fn decodes_operations_page_with_string_units() {
        let body = r#"{
            "hasNext": true,
            "nextCursor": "abc",
            "items": [{
                "id": "op-1",
                "type": "OPERATION_TYPE_INPUT",
                "description": "Пополнение брокерского счёта",
                "date": "2024-05-03T10:15:00.123Z",
                "payment": {"currency": "rub", "units": "500", "nano": 250000000}
            }, {
                "id": "op-2",
                "type": "OPERATION_TYPE_BROKER_FEE",
                "description": "Удержание комиссии",
                "date": "2024-05-04T00:00:00Z",
                "payment": {"currency": "rub", "units": "-3", "nano": -500000000}
            }]
        }"#;
        let response: OperationsResponse = serde_json::from_str(body).unwrap();
        let page = response.into_page().unwrap();
        assert_eq!(page.next_cursor.as_deref(), Some("abc"));
        assert_eq!(page.items[0].kind, OperationKind::Input);
        assert_eq!(page.items[0].payment.units(), 500);
        assert_eq!(
            page.items[1].kind,
            OperationKind::Other("OPERATION_TYPE_BROKER_FEE".to_string())
        );
        assert_eq!(page.items[1].payment.units(), -3);
    }

    #[test]
    fn last_page_has_no_cursor() {
        let body = r#"{"hasNext": false, "nextCursor": "", "items": []}"#;
        let response: OperationsResponse = serde_json::from_str(body).unwrap();
        let page = response.into_page().unwrap();
        assert!(page.items.is_empty());
        assert!(page.next_cursor.is_none());
    }

    #[test]
    fn bad_units_is_number_error() {
        let body = r#"{"totalAmountPortfolio": {"currency": "rub", "units": "12x", "nano": 0}}"#;
        let response: PortfolioResponse = serde_json::from_str(body).unwrap();
        assert!(matches!(
            response.into_snapshot(),
            Err(AnalysisError::Number { field: "units", .. })
        ));
    }

    #[test]
    fn decodes_portfolio_total() {
        let body = r#"{"totalAmountPortfolio": {"currency": "rub", "units": 10000, "nano": 0}}"#;
        let response: PortfolioResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.into_snapshot().unwrap().total.units(), 10000);
    }

    #[test]
    fn request_carries_type_filter_and_range() {
        let query = OperationQuery {
            account: AccountId::from("2000"),
            filter: OperationFilter::Only(OperationKind::Input),
            range: DateRange::parse("2024-05-01", "2024-05-31").unwrap(),
        };
        let json = serde_json::to_value(OperationsRequest::new(&query, None)).unwrap();
        assert_eq!(json["accountId"], "2000");
        assert_eq!(json["from"], "2024-05-01T00:00:00Z");
        assert_eq!(json["to"], "2024-05-31T00:00:00Z");
        assert_eq!(json["operationTypes"][0], "OPERATION_TYPE_INPUT");
        assert!(json.get("cursor").is_none());

        let all = OperationQuery {
            filter: OperationFilter::All,
            ..query
        };
        let json = serde_json::to_value(OperationsRequest::new(&all, Some("c1"))).unwrap();
        assert!(json.get("operationTypes").is_none());
        assert_eq!(json["cursor"], "c1");
    }
}
