//! Модель размеченных событий и их группировка
//!
//! События поступают с бэкенда уже привязанными к временной шкале видео и
//! после получения не меняются. Здесь описана их форма на проводе и
//! разбивка по типам для отображения.

pub mod list;
pub mod store;
pub mod timeline;

use serde::{Deserialize, Serialize};

use crate::error::{PlaybackSyncError, Result};

/// Одно размеченное событие на временной шкале видео
///
/// `timestamp` — секунда видеодорожки, а не аудио: обе дорожки считаются
/// представлениями одной шкалы и сопоставляются по прошедшим секундам.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Event {
    /// Категория события, открытое множество значений
    #[serde(rename = "type")]
    pub kind: String,
    /// Необязательная уточняющая подпись
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,
    /// Секунда видеодорожки, к которой привязано событие
    pub timestamp: f64,
}

/// Ответ бэкенда со списком событий
#[derive(Debug, Clone, Deserialize)]
pub struct EventsResponse {
    /// "success" либо "error"
    pub status: String,
    /// События; при ошибке поле может отсутствовать
    #[serde(default)]
    pub events: Vec<Event>,
    /// Сообщение об ошибке от бэкенда
    #[serde(default)]
    pub message: Option<String>,
}

impl EventsResponse {
    /// Преобразует ответ бэкенда в список событий
    pub fn into_events(self) -> Result<Vec<Event>> {
        if self.status == "success" {
            Ok(self.events)
        } else {
            Err(PlaybackSyncError::Api(self.message.unwrap_or_else(|| {
                "event source reported failure".to_string()
            })))
        }
    }
}

/// События одного типа в исходном порядке
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EventGroup {
    /// Имя типа
    pub kind: String,
    /// События группы
    pub events: Vec<Event>,
}

/// Разбивает события по типу
///
/// Порядок групп — порядок первого появления типа, внутри группы
/// сохраняется исходный порядок. Сортировка по времени не применяется:
/// временной порядок — ответственность бэкенда.
pub fn group_by_type(events: &[Event]) -> Vec<EventGroup> {
    let mut groups: Vec<EventGroup> = Vec::new();
    for event in events {
        match groups.iter_mut().find(|group| group.kind == event.kind) {
            Some(group) => group.events.push(event.clone()),
            None => groups.push(EventGroup {
                kind: event.kind.clone(),
                events: vec![event.clone()],
            }),
        }
    }
    groups
}
