//! Модуль обработки ошибок библиотеки playback-sync
//!
//! Этот модуль содержит типы ошибок, которые могут возникнуть при работе библиотеки.
//! Ни одна из них не фатальна для хоста: загрузка событий деградирует до
//! видимого предупреждения, отказ воспроизведения — до записи в лог.

use thiserror::Error;

/// Ошибки библиотеки playback-sync
#[derive(Debug, Error)]
pub enum PlaybackSyncError {
    /// Ошибка HTTP запроса
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Ошибка сериализации/десериализации JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Бэкенд событий вернул статус, отличный от успешного
    #[error("Event API error: {0}")]
    Api(String),

    /// Среда выполнения отклонила запуск воспроизведения
    #[error("Playback rejected: {0}")]
    Playback(String),

    /// Другая ошибка
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<&str> for PlaybackSyncError {
    fn from(s: &str) -> Self {
        PlaybackSyncError::Other(anyhow::anyhow!(s.to_string()))
    }
}

impl From<String> for PlaybackSyncError {
    fn from(s: String) -> Self {
        PlaybackSyncError::Other(anyhow::anyhow!(s))
    }
}

/// Тип Result для библиотеки playback-sync
pub type Result<T> = std::result::Result<T, PlaybackSyncError>;
