//! Зеркалирование состояния и коррекция расхождения дорожек
//!
//! Аудиодорожка — ведомая: каждое изменение транспортного состояния видео
//! отражается на ней, обратной связи нет. Событийное зеркалирование
//! покрывает обычный путь дёшево; периодическая проверка расхождения —
//! страховочный слой с независимым режимом отказа (пропущенные события и
//! постепенный уход часов ломаются по-разному), поэтому слои не
//! объединены в один механизм.

pub(crate) mod jump;

use std::sync::Arc;

use log::{debug, warn};
use serde::Serialize;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::config::PlayerConfig;
use crate::events::list::{EventListView, EventPanelState, NO_EVENTS_MESSAGE};
use crate::events::store::EventStore;
use crate::events::timeline::build_markers;
use crate::events::Event;
use crate::media::{MediaTrack, TrackEvent};
use crate::transport::TransportController;

/// Телеметрия коррекции расхождения
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq)]
pub struct SyncStats {
    /// Последнее измеренное расхождение в секундах
    pub last_drift: f64,
    /// Сколько раз аудио принудительно возвращалось к позиции видео
    pub corrections: u64,
}

/// Фоновые задачи синхронизации и каналы наблюдения за их состоянием
pub struct Synchronizer {
    tasks: Vec<JoinHandle<()>>,
    stats_rx: watch::Receiver<SyncStats>,
    panel_rx: watch::Receiver<EventPanelState>,
    active_rx: watch::Receiver<Vec<(usize, usize)>>,
}

impl Synchronizer {
    /// Запустить задачи зеркалирования, наблюдения за аудио и проверки
    /// расхождения
    ///
    /// Вызывается внутри рантайма tokio. При отсутствии видеодорожки не
    /// запускается ничего: каналы остаются в исходных состояниях, плеер
    /// работает как отключённый.
    pub fn spawn(
        transport: Arc<TransportController>,
        store: Arc<EventStore>,
        config: PlayerConfig,
    ) -> Self {
        let (stats_tx, stats_rx) = watch::channel(SyncStats::default());
        let (panel_tx, panel_rx) = watch::channel(EventPanelState::Loading);
        let (active_tx, active_rx) = watch::channel(Vec::new());

        let context = transport.context().clone();
        let mut tasks = Vec::new();

        match context.video {
            Some(video) => {
                tasks.push(spawn_mirror_task(
                    video.clone(),
                    context.audio.clone(),
                    transport.clone(),
                    store,
                    config.clone(),
                    panel_tx,
                    active_tx,
                ));
                if let Some(audio) = context.audio {
                    tasks.push(spawn_audio_watch_task(video.clone(), audio.clone()));
                    tasks.push(spawn_drift_task(video, audio, config, stats_tx));
                }
            }
            None => {
                warn!("Video track is absent, synchronization disabled");
            }
        }

        Self {
            tasks,
            stats_rx,
            panel_rx,
            active_rx,
        }
    }

    /// Телеметрия коррекции расхождения
    pub fn stats(&self) -> watch::Receiver<SyncStats> {
        self.stats_rx.clone()
    }

    /// Состояние панели событий
    pub fn panel(&self) -> watch::Receiver<EventPanelState> {
        self.panel_rx.clone()
    }

    /// Координаты подсвеченных строк списка событий
    pub fn active_rows(&self) -> watch::Receiver<Vec<(usize, usize)>> {
        self.active_rx.clone()
    }

    /// Остановить фоновые задачи
    pub fn shutdown(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
        self.tasks.clear();
    }
}

impl Drop for Synchronizer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Одна проверка расхождения
///
/// Возвращает измеренное расхождение и признак того, что аудио было
/// принудительно возвращено к позиции видео.
pub(crate) fn correct_drift(
    video: &dyn MediaTrack,
    audio: &dyn MediaTrack,
    threshold: f64,
) -> (f64, bool) {
    let drift = (video.position() - audio.position()).abs();
    if drift > threshold {
        debug!(
            "Drift {:.3}s over threshold {:.3}s, snapping commentary track",
            drift, threshold
        );
        audio.set_position(video.position());
        (drift, true)
    } else {
        (drift, false)
    }
}

/// Строит состояние панели по загруженным событиям
fn panel_state_for(events: Vec<Event>, duration: f64) -> EventPanelState {
    if events.is_empty() {
        return EventPanelState::Empty {
            message: NO_EVENTS_MESSAGE.to_string(),
        };
    }
    let list = EventListView::build(&events);
    let timeline = build_markers(&events, Some(duration)).unwrap_or_default();
    EventPanelState::Ready { list, timeline }
}

fn spawn_mirror_task(
    video: Arc<dyn MediaTrack>,
    audio: Option<Arc<dyn MediaTrack>>,
    transport: Arc<TransportController>,
    store: Arc<EventStore>,
    config: PlayerConfig,
    panel_tx: watch::Sender<EventPanelState>,
    active_tx: watch::Sender<Vec<(usize, usize)>>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut events = video.subscribe();
        // Последний построенный список нужен для подсветки текущих строк
        let mut view: Option<EventListView> = None;
        loop {
            let event = match events.recv().await {
                Ok(event) => event,
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Mirror loop lagged behind by {} track events", skipped);
                    continue;
                }
                Err(RecvError::Closed) => break,
            };
            match event {
                TrackEvent::Play => {
                    if let Some(audio) = &audio {
                        if let Err(e) = audio.play().await {
                            warn!("Commentary track refused to follow playback: {}", e);
                        }
                    }
                }
                TrackEvent::Pause => {
                    if let Some(audio) = &audio {
                        audio.pause();
                    }
                }
                TrackEvent::Seeking(position) => {
                    if let Some(audio) = &audio {
                        audio.set_position(position);
                    }
                }
                TrackEvent::Seeked(position) | TrackEvent::TimeUpdate(position) => {
                    transport.refresh_progress();
                    let active = view
                        .as_ref()
                        .map(|list| list.scan_active(position, config.highlight_tolerance))
                        .unwrap_or_default();
                    active_tx.send_replace(active);
                }
                TrackEvent::RateChange(rate) => {
                    if let Some(audio) = &audio {
                        audio.set_playback_rate(rate);
                    }
                }
                TrackEvent::VolumeChange(volume) => {
                    // Звук видеодорожки не должен включаться ни при каких
                    // условиях
                    if !video.is_muted() {
                        video.set_muted(true);
                    }
                    if let Some(audio) = &audio {
                        audio.set_volume(volume);
                    }
                }
                TrackEvent::LoadedMetadata { duration } => {
                    if let Some(audio) = &audio {
                        audio.set_position(video.position());
                    }
                    video.set_muted(true);
                    transport.enable_controls();
                    match store.fetch_events().await {
                        Ok(fetched) => {
                            let state = panel_state_for(fetched, duration);
                            view = match &state {
                                EventPanelState::Ready { list, .. } => Some(list.clone()),
                                _ => None,
                            };
                            panel_tx.send_replace(state);
                        }
                        Err(e) => {
                            warn!("Failed to fetch events: {}", e);
                            view = None;
                            panel_tx.send_replace(EventPanelState::Unavailable {
                                message: format!("Could not load events: {}", e),
                            });
                        }
                    }
                }
                TrackEvent::Ended => {
                    if let Some(audio) = &audio {
                        audio.pause();
                        audio.set_position(0.0);
                    }
                    transport.reset_to_paused();
                }
                TrackEvent::Error(message) => {
                    warn!("Video track error: {}", message);
                }
            }
        }
    })
}

fn spawn_audio_watch_task(
    video: Arc<dyn MediaTrack>,
    audio: Arc<dyn MediaTrack>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut events = audio.subscribe();
        loop {
            match events.recv().await {
                Ok(TrackEvent::Error(message)) => {
                    warn!("Commentary track error: {}, reloading source", message);
                    // Полный сброс источника вместо частичного восстановления
                    audio.reload();
                    audio.set_position(video.position());
                }
                Ok(_) => {}
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            }
        }
    })
}

fn spawn_drift_task(
    video: Arc<dyn MediaTrack>,
    audio: Arc<dyn MediaTrack>,
    config: PlayerConfig,
    stats_tx: watch::Sender<SyncStats>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(config.drift_check_interval);
        loop {
            ticker.tick().await;
            let (drift, corrected) =
                correct_drift(video.as_ref(), audio.as_ref(), config.drift_threshold);
            stats_tx.send_modify(|stats| {
                stats.last_drift = drift;
                if corrected {
                    stats.corrections += 1;
                }
            });
        }
    })
}
