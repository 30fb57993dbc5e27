//! Библиотека playback-sync
//!
//! Держит беззвучную видеодорожку и отдельно загружаемую аудиодорожку
//! комментария в фазе, проецирует размеченные события на шкалу поверх
//! длительности видео и поддерживает переходы между видео, аудио и
//! маркерами событий. Видеодорожка авторитетна; аудио — ведомая.
//!
//! Настоящие дорожки принадлежат хосту и передаются через
//! [`media::PlayerContext`] как реализации [`media::MediaTrack`];
//! состояние интерфейса публикуется обратно через watch-каналы.

pub mod config;
pub mod error;
pub mod events;
pub mod media;
pub mod sync;
pub mod transport;
pub mod utils;

use std::sync::Arc;

use log::info;
use tokio::sync::watch;

use crate::config::PlayerConfig;
use crate::events::list::EventPanelState;
use crate::events::store::EventStore;
use crate::media::{MediaTrack, PlayerContext};
use crate::sync::{SyncStats, Synchronizer};
use crate::transport::{ControlsState, TransportController};

pub use crate::error::{PlaybackSyncError, Result};
pub use crate::events::{Event, EventGroup};

/// Каналы наблюдения за состоянием плеера
pub struct PlayerHandles {
    /// Состояние элементов управления
    pub controls: watch::Receiver<ControlsState>,
    /// Состояние панели событий
    pub panel: watch::Receiver<EventPanelState>,
    /// Координаты подсвеченных строк списка событий
    pub active_rows: watch::Receiver<Vec<(usize, usize)>>,
    /// Телеметрия коррекции расхождения
    pub stats: watch::Receiver<SyncStats>,
}

/// Основная структура для работы с библиотекой
pub struct PlaybackSync {
    /// Конфигурация плеера
    config: PlayerConfig,
    /// Транспортное управление дорожками
    transport: Arc<TransportController>,
    /// Источник размеченных событий
    store: Arc<EventStore>,
    /// Запущенный синхронизатор
    synchronizer: Option<Synchronizer>,
}

impl PlaybackSync {
    /// Создать плеер с указанной конфигурацией и контекстом дорожек
    pub fn new(config: PlayerConfig, context: PlayerContext) -> Self {
        let transport = Arc::new(TransportController::new(context, config.clone()));
        let store = Arc::new(EventStore::new(&config.events_base_url));
        Self {
            config,
            transport,
            store,
            synchronizer: None,
        }
    }

    /// Доступ к транспортному управлению
    pub fn transport(&self) -> Arc<TransportController> {
        self.transport.clone()
    }

    /// Запустить синхронизацию и получить каналы наблюдения
    ///
    /// Вызывается внутри рантайма tokio. Повторный вызов не перезапускает
    /// задачи, а возвращает свежие каналы. При отсутствии видеодорожки
    /// плеер остаётся отключённым — это задокументированный no-op, а не
    /// ошибка.
    pub fn start(&mut self) -> PlayerHandles {
        let synchronizer = self.synchronizer.get_or_insert_with({
            let transport = self.transport.clone();
            let store = self.store.clone();
            let config = self.config.clone();
            move || {
                info!("Starting playback synchronizer");
                Synchronizer::spawn(transport, store, config)
            }
        });
        PlayerHandles {
            controls: self.transport.controls(),
            panel: synchronizer.panel(),
            active_rows: synchronizer.active_rows(),
            stats: synchronizer.stats(),
        }
    }

    /// Остановить фоновые задачи синхронизации
    pub fn stop(&mut self) {
        self.synchronizer = None;
    }
}

/// Публичный API для быстрого запуска плеера с обеими дорожками
pub fn start_player(
    video: Arc<dyn MediaTrack>,
    audio: Arc<dyn MediaTrack>,
    events_base_url: &str,
) -> (PlaybackSync, PlayerHandles) {
    let config = PlayerConfig {
        events_base_url: events_base_url.to_string(),
        ..PlayerConfig::default()
    };
    let mut player = PlaybackSync::new(config, PlayerContext::with_tracks(video, audio));
    let handles = player.start();
    (player, handles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::SimulatedTrack;

    #[tokio::test]
    async fn test_start_player_wires_the_whole_stack() {
        let video = Arc::new(SimulatedTrack::new("video"));
        let audio = Arc::new(SimulatedTrack::new("audio"));
        let (_player, handles) =
            start_player(video.clone(), audio.clone(), "http://127.0.0.1:9");

        assert!(!handles.controls.borrow().enabled);
        assert_eq!(*handles.panel.borrow(), EventPanelState::Loading);

        video.load_metadata(120.0);
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert!(handles.controls.borrow().enabled);
    }

    #[tokio::test]
    async fn test_player_without_tracks_stays_disabled() {
        let mut player = PlaybackSync::new(PlayerConfig::default(), PlayerContext::empty());
        let handles = player.start();

        player.transport().play().await;
        player.transport().pause();
        assert!(!handles.controls.borrow().enabled);
        assert_eq!(*handles.panel.borrow(), EventPanelState::Loading);
        assert_eq!(handles.stats.borrow().corrections, 0);
    }

    #[tokio::test]
    async fn test_stop_aborts_background_tasks() {
        let video = Arc::new(SimulatedTrack::new("video"));
        let audio = Arc::new(SimulatedTrack::new("audio"));
        let (mut player, _handles) = start_player(video, audio, "");

        player.stop();
        assert!(player.synchronizer.is_none());
    }
}
