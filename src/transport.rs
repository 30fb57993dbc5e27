//! Транспортное управление обеими дорожками как единым целым
//!
//! Пользовательские действия — запуск, пауза, заглушение, громкость,
//! перемотка, переход к событию — применяются к видеодорожке; аудио
//! подтягивается либо сразу, либо зеркалированием в синхронизаторе.
//! Видимое состояние элементов управления публикуется через watch-канал
//! и обновляется до выдачи транспортной команды, чтобы наблюдатель не
//! увидел устаревшую подсказку о ещё не запрошенном действии.

use std::sync::atomic::AtomicBool;

use log::warn;
use serde::Serialize;
use tokio::sync::watch;

use crate::config::PlayerConfig;
use crate::media::PlayerContext;
use crate::sync::jump;
use crate::utils::time::format_time;

/// Видимое состояние элементов управления
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ControlsState {
    /// Элементы управления доступны (метаданные видео загружены)
    pub enabled: bool,
    /// Показана кнопка запуска; иначе показана кнопка паузы
    pub show_play: bool,
    /// Аудиодорожка заглушена
    pub audio_muted: bool,
    /// Текущая громкость (0.0 - 1.0)
    pub volume: f64,
    /// Заполнение полосы прогресса в процентах
    pub progress_pct: f64,
    /// Отформатированная текущая позиция
    pub current_time: String,
    /// Отформатированная длительность
    pub total_time: String,
}

impl Default for ControlsState {
    fn default() -> Self {
        Self {
            enabled: false,
            show_play: true,
            audio_muted: false,
            volume: 1.0,
            progress_pct: 0.0,
            current_time: "0:00".to_string(),
            total_time: "0:00".to_string(),
        }
    }
}

/// Управление воспроизведением обеих дорожек
///
/// Каждая операция превращается в no-op, если нужная дорожка отсутствует
/// в контексте.
pub struct TransportController {
    context: PlayerContext,
    config: PlayerConfig,
    controls_tx: watch::Sender<ControlsState>,
    jump_in_flight: AtomicBool,
}

impl TransportController {
    /// Создать контроллер для контекста дорожек
    pub fn new(context: PlayerContext, config: PlayerConfig) -> Self {
        let (controls_tx, _) = watch::channel(ControlsState::default());
        Self {
            context,
            config,
            controls_tx,
            jump_in_flight: AtomicBool::new(false),
        }
    }

    /// Подписаться на состояние элементов управления
    pub fn controls(&self) -> watch::Receiver<ControlsState> {
        self.controls_tx.subscribe()
    }

    pub(crate) fn context(&self) -> &PlayerContext {
        &self.context
    }

    pub(crate) fn config(&self) -> &PlayerConfig {
        &self.config
    }

    pub(crate) fn jump_in_flight(&self) -> &AtomicBool {
        &self.jump_in_flight
    }

    fn update_controls(&self, update: impl FnOnce(&mut ControlsState)) {
        self.controls_tx.send_modify(update);
    }

    /// Запустить воспроизведение видео
    ///
    /// Запуск может быть отклонён средой выполнения; отказ пишется в лог,
    /// состояние элементов управления при этом не меняется — интерфейс не
    /// сообщает о воспроизведении, которое не началось. Аудио следует за
    /// видео через зеркалирование.
    pub async fn play(&self) {
        let video = match &self.context.video {
            Some(video) => video,
            None => return,
        };
        match video.play().await {
            Ok(()) => {
                self.update_controls(|controls| controls.show_play = false);
            }
            Err(e) => {
                warn!("Video refused to start playback: {}", e);
            }
        }
    }

    /// Поставить обе дорожки на паузу
    pub fn pause(&self) {
        let video = match &self.context.video {
            Some(video) => video,
            None => return,
        };
        // Сначала интерфейс: быстрые повторные нажатия не должны застать
        // его в противоречивом состоянии
        self.update_controls(|controls| controls.show_play = true);
        if !video.is_paused() {
            video.pause();
        }
        // Дорожки останавливаются независимо: рассогласование одной не
        // мешает остановить другую
        if let Some(audio) = &self.context.audio {
            if !audio.is_paused() {
                audio.pause();
            }
        }
    }

    /// Переключить заглушение аудиодорожки
    ///
    /// Видеодорожка безусловно возвращается в заглушенное состояние: её
    /// звук не должен быть слышен никогда, она существует только как
    /// картинка под аудиокомментарий.
    pub fn toggle_mute(&self) {
        if let Some(audio) = &self.context.audio {
            let muted = !audio.is_muted();
            audio.set_muted(muted);
            self.update_controls(|controls| controls.audio_muted = muted);
        }
        if let Some(video) = &self.context.video {
            video.set_muted(true);
        }
    }

    /// Установить громкость обеих дорожек
    ///
    /// Видео заглушено, но его громкость держится в том же значении, что
    /// и у аудио.
    pub fn set_volume(&self, volume: f64) {
        let volume = volume.clamp(0.0, 1.0);
        if let Some(video) = &self.context.video {
            video.set_volume(volume);
        }
        if let Some(audio) = &self.context.audio {
            audio.set_volume(volume);
        }
        self.update_controls(|controls| controls.volume = volume);
    }

    /// Установить скорость воспроизведения видео
    ///
    /// Аудиодорожка получает ту же скорость через зеркалирование.
    pub fn set_playback_rate(&self, rate: f64) {
        if let Some(video) = &self.context.video {
            video.set_playback_rate(rate);
        }
    }

    /// Перемотать видео; позиция аудио подтягивается сразу же
    pub fn seek(&self, seconds: f64) {
        let video = match &self.context.video {
            Some(video) => video,
            None => return,
        };
        video.set_position(seconds);
        if let Some(audio) = &self.context.audio {
            audio.set_position(seconds);
        }
    }

    /// Перемотка по доле полосы прогресса (0.0 - 1.0)
    pub fn seek_to_fraction(&self, fraction: f64) {
        let video = match &self.context.video {
            Some(video) => video,
            None => return,
        };
        if let Some(duration) = video.duration() {
            self.seek(fraction.clamp(0.0, 1.0) * duration);
        }
    }

    /// Перейти к событию: пауза, перемотка, возобновление
    pub async fn jump_to_event(&self, timestamp: f64) {
        jump::run(self, timestamp).await;
    }

    /// Пересчитать прогресс и отображение времени по позиции видео
    pub(crate) fn refresh_progress(&self) {
        let video = match &self.context.video {
            Some(video) => video,
            None => return,
        };
        let position = video.position();
        let duration = video.duration();
        self.update_controls(|controls| {
            if let Some(duration) = duration {
                if duration > 0.0 {
                    controls.progress_pct = position / duration * 100.0;
                }
                controls.total_time = format_time(duration);
            }
            controls.current_time = format_time(position);
        });
    }

    /// Включить элементы управления после загрузки метаданных
    pub(crate) fn enable_controls(&self) {
        self.update_controls(|controls| controls.enabled = true);
        self.refresh_progress();
    }

    /// Вернуть элементы управления в состояние «на паузе»
    pub(crate) fn reset_to_paused(&self) {
        self.update_controls(|controls| controls.show_play = true);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::media::{MediaTrack, SimulatedTrack};
    use tokio_test::assert_ok;

    fn controller() -> (Arc<SimulatedTrack>, Arc<SimulatedTrack>, TransportController) {
        let video = Arc::new(SimulatedTrack::new("video"));
        let audio = Arc::new(SimulatedTrack::new("audio"));
        video.load_metadata(120.0);
        audio.load_metadata(120.0);
        let context = PlayerContext::with_tracks(video.clone(), audio.clone());
        let transport = TransportController::new(context, PlayerConfig::default());
        (video, audio, transport)
    }

    #[tokio::test]
    async fn test_play_updates_affordance() {
        let (video, _audio, transport) = controller();
        let controls = transport.controls();
        assert!(controls.borrow().show_play);

        transport.play().await;
        assert!(!video.is_paused());
        assert!(!controls.borrow().show_play);
    }

    #[tokio::test]
    async fn test_rejected_play_leaves_affordance_unchanged() {
        let (video, _audio, transport) = controller();
        video.set_reject_play(true);

        transport.play().await;
        assert!(video.is_paused());
        // Интерфейс не сообщает о воспроизведении, которое не началось
        assert!(transport.controls().borrow().show_play);
    }

    #[tokio::test]
    async fn test_pause_stops_both_tracks_independently() {
        let (video, audio, transport) = controller();
        transport.play().await;
        assert_ok!(audio.play().await);

        transport.pause();
        assert!(video.is_paused());
        assert!(audio.is_paused());
        assert!(transport.controls().borrow().show_play);

        // Рассогласованное состояние: видео уже стоит, аудио играет
        assert_ok!(audio.play().await);
        transport.pause();
        assert!(audio.is_paused());
    }

    #[tokio::test]
    async fn test_toggle_mute_is_idempotent_over_two_calls() {
        let (video, audio, transport) = controller();
        assert!(!audio.is_muted());

        transport.toggle_mute();
        assert!(audio.is_muted());
        assert!(video.is_muted());
        assert!(transport.controls().borrow().audio_muted);

        transport.toggle_mute();
        assert!(!audio.is_muted());
        // Видео заглушено после каждого вызова независимо от исходного состояния
        assert!(video.is_muted());
        assert!(!transport.controls().borrow().audio_muted);
    }

    #[tokio::test]
    async fn test_set_volume_applies_to_both_tracks() {
        let (video, audio, transport) = controller();
        transport.set_volume(0.3);
        assert_eq!(video.volume(), 0.3);
        assert_eq!(audio.volume(), 0.3);

        transport.set_volume(7.0);
        assert_eq!(video.volume(), 1.0);
        assert_eq!(audio.volume(), 1.0);
    }

    #[tokio::test]
    async fn test_seek_mirrors_audio_position() {
        let (video, audio, transport) = controller();
        transport.seek(42.0);
        assert_eq!(video.position(), 42.0);
        assert_eq!(audio.position(), 42.0);
    }

    #[tokio::test]
    async fn test_seek_to_fraction_uses_video_duration() {
        let (video, audio, transport) = controller();
        transport.seek_to_fraction(0.5);
        assert_eq!(video.position(), 60.0);
        assert_eq!(audio.position(), 60.0);
    }

    #[tokio::test]
    async fn test_operations_without_tracks_are_noops() {
        let transport = TransportController::new(PlayerContext::empty(), PlayerConfig::default());
        transport.play().await;
        transport.pause();
        transport.toggle_mute();
        transport.set_volume(0.5);
        transport.seek(10.0);
        transport.seek_to_fraction(0.5);
        transport.jump_to_event(10.0).await;
        assert!(transport.controls().borrow().show_play);
    }

    #[tokio::test]
    async fn test_progress_refresh() {
        let (video, _audio, transport) = controller();
        video.set_position(30.0);
        transport.enable_controls();

        let controls = transport.controls();
        let state = controls.borrow().clone();
        assert!(state.enabled);
        assert_eq!(state.progress_pct, 25.0);
        assert_eq!(state.current_time, "0:30");
        assert_eq!(state.total_time, "2:00");
    }
}
