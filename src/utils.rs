//! Вспомогательные парсеры дат и чисел из ответов API.

use crate::error::AnalysisError;
use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;

static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid date regex"));

/// Разбирает дату строго в формате `YYYY-MM-DD`, без окружающих пробелов.
///
/// `chrono` допускает незначащие нули (`2024-5-1`) и пробелы, поэтому форма
/// строки проверяется отдельно.
pub fn parse_date(value: &str) -> Result<NaiveDate, AnalysisError> {
    let err = || AnalysisError::Date {
        value: value.to_string(),
    };
    if !DATE_RE.is_match(value) {
        return Err(err());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| err())
}

/// Полночь указанной даты по UTC в формате RFC 3339.
pub fn day_start(date: NaiveDate) -> String {
    format!("{date}T00:00:00Z")
}

/// Разбирает int64, который REST-шлюз передаёт строкой.
pub fn parse_int64(value: &str, field: &'static str) -> Result<i64, AnalysisError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }
    trimmed.parse().map_err(|_| AnalysisError::Number {
        value: trimmed.to_string(),
        field,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_iso_date() {
        let date = parse_date("2024-05-01").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert_eq!(day_start(date), "2024-05-01T00:00:00Z");
    }

    #[test]
    fn rejects_other_date_forms() {
        for bad in [
            "2024/05/01",
            "01.05.2024",
            "2024-5-1",
            "2024-02-30",
            " 2024-05-01",
            "2024-05-01\n",
            "",
        ] {
            assert!(
                matches!(parse_date(bad), Err(AnalysisError::Date { .. })),
                "accepted {bad:?}"
            );
        }
    }

    #[test]
    fn parses_string_int64() {
        assert_eq!(parse_int64("500", "units").unwrap(), 500);
        assert_eq!(parse_int64("-12", "units").unwrap(), -12);
        assert_eq!(parse_int64("", "units").unwrap(), 0);
        assert!(matches!(
            parse_int64("1.5", "units"),
            Err(AnalysisError::Number { field: "units", .. })
        ));
    }
}
