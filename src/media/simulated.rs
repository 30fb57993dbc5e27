//! Медиа-дорожка в памяти
//!
//! Повторяет транспортное поведение настоящего медиа-элемента: позиция
//! продвигается только явным вызовом [`SimulatedTrack::advance`], изменения
//! состояния рассылаются событиями. Используется тестами и хостами без
//! реального плеера.

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::broadcast;

use crate::error::{PlaybackSyncError, Result};

use super::track::{MediaTrack, TrackEvent};

/// Внутреннее состояние дорожки
#[derive(Debug)]
struct TrackState {
    position: f64,
    duration: Option<f64>,
    paused: bool,
    volume: f64,
    muted: bool,
    rate: f64,
    reject_play: bool,
    reload_count: u32,
}

impl Default for TrackState {
    fn default() -> Self {
        Self {
            position: 0.0,
            duration: None,
            paused: true,
            volume: 1.0,
            muted: false,
            rate: 1.0,
            reject_play: false,
            reload_count: 0,
        }
    }
}

/// Имитируемая медиа-дорожка
pub struct SimulatedTrack {
    label: &'static str,
    state: Mutex<TrackState>,
    events: broadcast::Sender<TrackEvent>,
}

impl SimulatedTrack {
    /// Создать дорожку с меткой для логов
    pub fn new(label: &'static str) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            label,
            state: Mutex::new(TrackState::default()),
            events,
        }
    }

    /// Метка дорожки
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Объявить метаданные загруженными
    pub fn load_metadata(&self, duration: f64) {
        self.state.lock().duration = Some(duration);
        self.emit(TrackEvent::LoadedMetadata { duration });
    }

    /// Продвинуть позицию на `dt` секунд стенного времени
    ///
    /// Остановленная дорожка не двигается. Достижение конца останавливает
    /// дорожку и рассылает [`TrackEvent::Ended`].
    pub fn advance(&self, dt: f64) {
        let mut state = self.state.lock();
        if state.paused {
            return;
        }
        let duration = match state.duration {
            Some(duration) => duration,
            None => return,
        };
        let next = state.position + dt * state.rate;
        if next >= duration {
            state.position = duration;
            state.paused = true;
            drop(state);
            self.emit(TrackEvent::TimeUpdate(duration));
            self.emit(TrackEvent::Ended);
        } else {
            state.position = next;
            drop(state);
            self.emit(TrackEvent::TimeUpdate(next));
        }
    }

    /// Имитировать ошибку загрузки или декодирования
    pub fn inject_error(&self, message: &str) {
        self.emit(TrackEvent::Error(message.to_string()));
    }

    /// Отклонять ли последующие запуски воспроизведения
    pub fn set_reject_play(&self, reject: bool) {
        self.state.lock().reject_play = reject;
    }

    /// Сколько раз источник перезагружался
    pub fn reload_count(&self) -> u32 {
        self.state.lock().reload_count
    }

    fn emit(&self, event: TrackEvent) {
        // Отсутствие подписчиков не является ошибкой
        let _ = self.events.send(event);
    }
}

#[async_trait]
impl MediaTrack for SimulatedTrack {
    async fn play(&self) -> Result<()> {
        let mut state = self.state.lock();
        if state.reject_play {
            return Err(PlaybackSyncError::Playback(format!(
                "{} track: playback rejected by host policy",
                self.label
            )));
        }
        if state.paused {
            state.paused = false;
            drop(state);
            self.emit(TrackEvent::Play);
        }
        Ok(())
    }

    fn pause(&self) {
        let mut state = self.state.lock();
        if !state.paused {
            state.paused = true;
            drop(state);
            self.emit(TrackEvent::Pause);
        }
    }

    fn position(&self) -> f64 {
        self.state.lock().position
    }

    fn set_position(&self, seconds: f64) {
        let mut state = self.state.lock();
        let clamped = match state.duration {
            Some(duration) => seconds.clamp(0.0, duration),
            None => seconds.max(0.0),
        };
        state.position = clamped;
        drop(state);
        self.emit(TrackEvent::Seeking(clamped));
        self.emit(TrackEvent::Seeked(clamped));
    }

    fn duration(&self) -> Option<f64> {
        self.state.lock().duration
    }

    fn is_paused(&self) -> bool {
        self.state.lock().paused
    }

    fn volume(&self) -> f64 {
        self.state.lock().volume
    }

    fn set_volume(&self, volume: f64) {
        let volume = volume.clamp(0.0, 1.0);
        self.state.lock().volume = volume;
        self.emit(TrackEvent::VolumeChange(volume));
    }

    fn is_muted(&self) -> bool {
        self.state.lock().muted
    }

    fn set_muted(&self, muted: bool) {
        let volume = {
            let mut state = self.state.lock();
            state.muted = muted;
            state.volume
        };
        // Медиа-элемент сообщает о смене флага заглушения тем же событием,
        // что и о смене громкости
        self.emit(TrackEvent::VolumeChange(volume));
    }

    fn playback_rate(&self) -> f64 {
        self.state.lock().rate
    }

    fn set_playback_rate(&self, rate: f64) {
        self.state.lock().rate = rate;
        self.emit(TrackEvent::RateChange(rate));
    }

    fn reload(&self) {
        let mut state = self.state.lock();
        state.reload_count += 1;
        state.paused = true;
        state.position = 0.0;
    }

    fn subscribe(&self) -> broadcast::Receiver<TrackEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::assert_ok;

    #[tokio::test]
    async fn test_playback_advances_position() {
        let track = SimulatedTrack::new("video");
        track.load_metadata(10.0);
        assert_ok!(track.play().await);

        track.advance(1.5);
        assert_eq!(track.position(), 1.5);
        assert!(!track.is_paused());

        // Скорость воспроизведения масштабирует продвижение
        track.set_playback_rate(2.0);
        track.advance(1.0);
        assert_eq!(track.position(), 3.5);
    }

    #[tokio::test]
    async fn test_reaching_end_stops_track() {
        let track = SimulatedTrack::new("video");
        track.load_metadata(2.0);
        let mut events = track.subscribe();
        assert_ok!(track.play().await);

        track.advance(5.0);
        assert_eq!(track.position(), 2.0);
        assert!(track.is_paused());

        // Последними приходят TimeUpdate и Ended
        let mut seen = Vec::new();
        while let Ok(event) = events.try_recv() {
            seen.push(event);
        }
        assert_eq!(
            seen.last(),
            Some(&TrackEvent::Ended),
            "expected Ended to be the final event, got {:?}",
            seen
        );
    }

    #[tokio::test]
    async fn test_rejected_play_leaves_track_paused() {
        let track = SimulatedTrack::new("video");
        track.load_metadata(10.0);
        track.set_reject_play(true);

        assert!(track.play().await.is_err());
        assert!(track.is_paused());
    }

    #[tokio::test]
    async fn test_reload_resets_transport_state() {
        let track = SimulatedTrack::new("audio");
        track.load_metadata(10.0);
        assert_ok!(track.play().await);
        track.advance(4.0);

        track.reload();
        assert_eq!(track.reload_count(), 1);
        assert!(track.is_paused());
        assert_eq!(track.position(), 0.0);
    }

    #[test]
    fn test_set_position_is_clamped_to_duration() {
        let track = SimulatedTrack::new("video");
        track.load_metadata(10.0);
        track.set_position(25.0);
        assert_eq!(track.position(), 10.0);
        track.set_position(-5.0);
        assert_eq!(track.position(), 0.0);
    }
}
