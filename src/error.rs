//! Ошибки конфигурации, обращения к API брокера и разбора входных данных.

/// Ошибка получения данных или построения сводки.
#[derive(thiserror::Error, Debug)]
pub enum AnalysisError {
    /// Переменная окружения не задана или имеет некорректное значение.
    #[error("Configuration error: environment variable '{var}' is missing or invalid")]
    Config {
        /// Имя переменной.
        var: &'static str,
    },
    /// Сетевая ошибка при обращении к API.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    /// API вернул неуспешный статус (в том числе ошибку авторизации).
    #[error("API error {status}: {message}")]
    Api {
        /// HTTP-статус ответа.
        status: u16,
        /// Сообщение сервиса.
        message: String,
    },
    /// Тело ответа не соответствует ожидаемому формату.
    #[error("Unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
    /// Ошибка разбора даты.
    #[error("Invalid date '{value}', expected YYYY-MM-DD")]
    Date {
        /// Некорректная дата.
        value: String,
    },
    /// Некорректное целое число в ответе API.
    #[error("Invalid number '{value}' in field '{field}'")]
    Number {
        /// Исходное значение.
        value: String,
        /// Имя поля.
        field: &'static str,
    },
}
