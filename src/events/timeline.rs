//! Проекция событий на горизонтальную шкалу
//!
//! Каждое событие превращается в маркер со смещением, пропорциональным его
//! метке времени относительно длительности видео. Маркеры — данные для
//! хоста: позиция в процентах, визуальная категория, текст подсказки.

use serde::Serialize;

use crate::utils::time::format_time;

use super::Event;

/// Визуальная категория маркера
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    /// Граница (четыре или шесть очков)
    Boundary,
    /// Падение калитки
    Wicket,
    /// Сыгранный удар
    Shot,
    /// Все остальные типы
    Other,
}

impl MarkerKind {
    /// Выбирает категорию по типу события; неизвестные типы попадают в Other
    pub fn from_type(kind: &str) -> Self {
        match kind {
            "boundary" => Self::Boundary,
            "wicket" => Self::Wicket,
            "shot_played" => Self::Shot,
            _ => Self::Other,
        }
    }

    /// CSS-класс маркера для хоста
    pub fn css_class(&self) -> &'static str {
        match self {
            Self::Boundary => "boundary-event",
            Self::Wicket => "wicket-event",
            Self::Shot => "shot-event",
            Self::Other => "other-event",
        }
    }
}

/// Маркер одного события на шкале
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TimelineMarker {
    /// Смещение слева в процентах ширины шкалы; может превышать 100,
    /// если событие размечено за концом видео
    pub position_pct: f64,
    /// Визуальная категория
    pub kind: MarkerKind,
    /// Подсказка, показываемая при наведении
    pub tooltip: String,
    /// Секунда, на которую переходит клик по маркеру
    pub timestamp: f64,
}

/// Строит полный набор маркеров заново
///
/// Возвращает `None`, пока длительность не является конечным положительным
/// числом; вызывающая сторона повторяет вызов после загрузки метаданных.
/// Каждый вызов возвращает свежий набор, целиком замещающий предыдущий, —
/// повторная загрузка метаданных не плодит дубликаты.
pub fn build_markers(events: &[Event], duration: Option<f64>) -> Option<Vec<TimelineMarker>> {
    let duration = duration?;
    if !duration.is_finite() || duration <= 0.0 {
        return None;
    }
    Some(
        events
            .iter()
            .map(|event| TimelineMarker {
                position_pct: event.timestamp / duration * 100.0,
                kind: MarkerKind::from_type(&event.kind),
                tooltip: format!(
                    "{}: {} at {}",
                    event.kind,
                    event.subtype.as_deref().unwrap_or(""),
                    format_time(event.timestamp)
                ),
                timestamp: event.timestamp,
            })
            .collect(),
    )
}
