//! Модуль конфигурации библиотеки playback-sync
//!
//! Этот модуль содержит настройки плеера: адрес источника событий и
//! параметры синхронизации дорожек.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Конфигурация плеера
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Базовый URL бэкенда с событиями
    pub events_base_url: String,
    /// Допустимое расхождение дорожек в секундах
    pub drift_threshold: f64,
    /// Период периодической проверки расхождения
    pub drift_check_interval: Duration,
    /// Окно подсветки текущих событий в секундах
    pub highlight_tolerance: f64,
    /// Время на установление паузы перед перемоткой
    pub pause_settle: Duration,
    /// Время на установление позиции перед возобновлением
    pub seek_settle: Duration,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            events_base_url: String::new(),
            drift_threshold: 0.1,
            drift_check_interval: Duration::from_secs(1),
            highlight_tolerance: 2.0,
            pause_settle: Duration::from_millis(50),
            seek_settle: Duration::from_millis(100),
        }
    }
}
