//! Загрузка событий с бэкенда

use log::{debug, info};

use crate::error::Result;

use super::{Event, EventsResponse};

/// Источник размеченных событий
pub struct EventStore {
    client: reqwest::Client,
    endpoint: String,
}

impl EventStore {
    /// Создать источник для указанного базового URL
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: format!("{}/api/events", base_url.trim_end_matches('/')),
        }
    }

    /// Запросить и нормализовать список событий
    ///
    /// Транспортный сбой, некорректный JSON и ответ со статусом ошибки
    /// различаются в типе ошибки; повторных попыток нет — решение об
    /// отображении предупреждения принимает вызывающая сторона.
    pub async fn fetch_events(&self) -> Result<Vec<Event>> {
        debug!("Fetching events from {}", self.endpoint);
        let response = self.client.get(&self.endpoint).send().await?;
        let body = response.text().await?;
        let payload: EventsResponse = serde_json::from_str(&body)?;
        let events = payload.into_events()?;
        info!("Fetched {} annotated events", events.len());
        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_construction() {
        let store = EventStore::new("http://localhost:5000");
        assert_eq!(store.endpoint, "http://localhost:5000/api/events");

        // Завершающий слэш не удваивается
        let store = EventStore::new("http://localhost:5000/");
        assert_eq!(store.endpoint, "http://localhost:5000/api/events");
    }

    #[tokio::test]
    async fn test_fetch_from_unresolvable_endpoint_fails() {
        // Пустой базовый URL даёт относительный адрес, который клиент
        // отклоняет без обращения к сети
        let store = EventStore::new("");
        assert!(store.fetch_events().await.is_err());
    }
}
