use thiserror::Error;

/// Everything that can go wrong while turning a city name into a report.
///
/// `Display` carries the internal diagnostic and is meant for logs;
/// [`LookupError::user_message`] is what the chat user gets to see.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("city name is blank")]
    InvalidInput,

    #[error("no geocoding match for '{0}'")]
    NotFound(String),

    #[error("forecast response is missing required current fields")]
    IncompleteData,

    #[error("network error: {0}")]
    Network(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("lookup cancelled")]
    Cancelled,
}

impl LookupError {
    /// Short, unescaped message shown to the user.
    pub fn user_message(&self) -> String {
        match self {
            LookupError::InvalidInput => "Неверное название города".to_string(),
            LookupError::NotFound(name) => format!("Город '{name}' не найден"),
            LookupError::IncompleteData => "Неполные данные о погоде".to_string(),
            LookupError::Network(_) => "Сервис погоды недоступен".to_string(),
            LookupError::Parse(_) => "Некорректный ответ сервиса погоды".to_string(),
            LookupError::Cancelled => "Запрос отменён".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_mentions_city() {
        let err = LookupError::NotFound("атлантида".into());
        assert_eq!(err.user_message(), "Город 'атлантида' не найден");
        assert!(err.to_string().contains("атлантида"));
    }

    #[test]
    fn user_message_hides_internal_detail() {
        let err = LookupError::Network("HTTP 503 Service Unavailable".into());
        assert!(!err.user_message().contains("503"));
        assert!(err.to_string().contains("503"));
    }
}
