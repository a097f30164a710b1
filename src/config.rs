//! Настройки подключения к API и список отслеживаемых счетов.

use std::env;
use std::time::Duration;

use crate::error::AnalysisError;

/// Боевой REST-шлюз Invest API.
pub const DEFAULT_API_URL: &str = "https://invest-public-api.tinkoff.ru/rest";

/// Счета, которые попадают в сводку по умолчанию.
pub const DEFAULT_ACCOUNTS: [&str; 4] = [
    "ETF",
    "Долгосрочный инвестор - Россия",
    "Bonds",
    "Копилка",
];

const TOKEN_VAR: &str = "TINKOFF_TOKEN";
const API_URL_VAR: &str = "TINKOFF_API_URL";
const ACCOUNTS_VAR: &str = "TINKOFF_ACCOUNTS";
const TIMEOUT_VAR: &str = "TINKOFF_TIMEOUT_SECS";

/// Настройки клиента и сводки.
#[derive(Debug, Clone)]
pub struct Config {
    /// Токен доступа к API.
    pub token: String,
    /// Базовый адрес REST-шлюза.
    pub api_url: String,
    /// Имена счетов, которые учитываются в сводке.
    pub account_names: Vec<String>,
    /// Таймаут одного запроса.
    pub timeout: Duration,
}

impl Config {
    /// Настройки по умолчанию с указанным токеном.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            api_url: DEFAULT_API_URL.to_string(),
            account_names: DEFAULT_ACCOUNTS.iter().map(ToString::to_string).collect(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Читает настройки из окружения, предварительно подгружая `.env`.
    pub fn from_env() -> Result<Self, AnalysisError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Собирает настройки из произвольного источника переменных.
    pub fn from_lookup<F>(get: F) -> Result<Self, AnalysisError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = get(TOKEN_VAR)
            .filter(|t| !t.trim().is_empty())
            .ok_or(AnalysisError::Config { var: TOKEN_VAR })?;

        let mut config = Self::new(token.trim());
        if let Some(url) = get(API_URL_VAR) {
            config = config.with_api_url(url);
        }
        if let Some(names) = get(ACCOUNTS_VAR) {
            let names = split_names(&names);
            if !names.is_empty() {
                config = config.with_accounts(names);
            }
        }
        if let Some(secs) = get(TIMEOUT_VAR) {
            let secs: u64 = secs
                .trim()
                .parse()
                .map_err(|_| AnalysisError::Config { var: TIMEOUT_VAR })?;
            config.timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }

    /// Заменяет список отслеживаемых счетов.
    #[must_use]
    pub fn with_accounts<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.account_names = names.into_iter().map(Into::into).collect();
        self
    }

    /// Заменяет адрес REST-шлюза (например, на песочницу).
    #[must_use]
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into().trim_end_matches('/').to_string();
        self
    }
}

fn split_names(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}
