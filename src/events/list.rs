//! Список событий и подсветка текущих
//!
//! Те же события, что и на шкале, но в виде сгруппированного списка с
//! заголовками и строками для перехода. Состояние панели событий явно
//! различает загрузку, сбой, пустой список и готовые данные, чтобы хост
//! никогда не оставался с зависшим индикатором загрузки.

use serde::Serialize;

use crate::utils::time::format_time;

use super::timeline::TimelineMarker;
use super::{group_by_type, Event};

/// Сообщение, показываемое вместо пустого списка
pub const NO_EVENTS_MESSAGE: &str = "No events detected in this video.";

/// Одна строка списка событий
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EventRow {
    /// Подпись события; пустая строка, если подписи нет
    pub subtype: String,
    /// Отформатированное время вида "1:05"
    pub display_time: String,
    /// Секунда для перехода
    pub timestamp: f64,
}

/// Группа строк с заголовком
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EventListGroup {
    /// Заголовок группы: тип с заглавной буквы
    pub title: String,
    /// Количество событий в группе
    pub count: usize,
    /// Строки группы
    pub rows: Vec<EventRow>,
}

/// Представление списка событий для хоста
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EventListView {
    /// Группы в порядке первого появления типа
    pub groups: Vec<EventListGroup>,
}

impl EventListView {
    /// Строит представление списка, группируя события по типу
    pub fn build(events: &[Event]) -> Self {
        let groups = group_by_type(events)
            .into_iter()
            .map(|group| EventListGroup {
                title: format!("{} Events", capitalize(&group.kind)),
                count: group.events.len(),
                rows: group
                    .events
                    .iter()
                    .map(|event| EventRow {
                        subtype: event.subtype.clone().unwrap_or_default(),
                        display_time: format_time(event.timestamp),
                        timestamp: event.timestamp,
                    })
                    .collect(),
            })
            .collect();
        Self { groups }
    }

    /// Координаты строк, попадающих в окно подсветки вокруг текущей позиции
    ///
    /// Полный проход по всем строкам на каждом обновлении позиции, а не
    /// инкрементальный индекс: так подсветка остаётся корректной и при
    /// перемотке, а не только при естественном воспроизведении.
    pub fn scan_active(&self, current_time: f64, tolerance: f64) -> Vec<(usize, usize)> {
        let mut active = Vec::new();
        for (group_index, group) in self.groups.iter().enumerate() {
            for (row_index, row) in group.rows.iter().enumerate() {
                if (current_time - row.timestamp).abs() <= tolerance {
                    active.push((group_index, row_index));
                }
            }
        }
        active
    }
}

/// Состояние панели событий
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum EventPanelState {
    /// Данные ещё загружаются
    Loading,
    /// Загрузка не удалась; текст предупреждения для пользователя
    Unavailable {
        /// Текст предупреждения
        message: String,
    },
    /// Бэкенд вернул пустой список
    Empty {
        /// Явное сообщение об отсутствии событий
        message: String,
    },
    /// Список и шкала готовы к отображению
    Ready {
        /// Сгруппированный список
        list: EventListView,
        /// Маркеры шкалы
        timeline: Vec<TimelineMarker>,
    },
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
