//! Транспортная поверхность одной медиа-дорожки
//!
//! Трейт повторяет поведение медиа-элемента среды выполнения: позиция и
//! транспортное состояние живут в самой дорожке, библиотека их читает и
//! пишет, но не хранит теневой копии. Изменения состояния дорожка
//! рассылает как события через broadcast-канал.

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::error::Result;

/// Событие жизненного цикла медиа-дорожки
#[derive(Debug, Clone, PartialEq)]
pub enum TrackEvent {
    /// Воспроизведение началось
    Play,
    /// Воспроизведение остановлено
    Pause,
    /// Начата перемотка на новую позицию
    Seeking(f64),
    /// Перемотка завершена
    Seeked(f64),
    /// Позиция обновилась в ходе воспроизведения
    TimeUpdate(f64),
    /// Изменилась скорость воспроизведения
    RateChange(f64),
    /// Изменилась громкость или флаг заглушения
    VolumeChange(f64),
    /// Метаданные загружены, длительность известна
    LoadedMetadata {
        /// Длительность дорожки в секундах
        duration: f64,
    },
    /// Дорожка доиграла до конца
    Ended,
    /// Ошибка загрузки или декодирования
    Error(String),
}

/// Транспортный интерфейс медиа-дорожки
#[async_trait]
pub trait MediaTrack: Send + Sync {
    /// Запустить воспроизведение
    ///
    /// Запуск может быть отклонён средой выполнения, например политикой
    /// автозапуска. Отклонение — ожидаемое переходное состояние, а не
    /// повод для падения.
    async fn play(&self) -> Result<()>;

    /// Остановить воспроизведение
    fn pause(&self);

    /// Текущая позиция в секундах
    fn position(&self) -> f64;

    /// Установить позицию в секундах
    fn set_position(&self, seconds: f64);

    /// Длительность дорожки, если метаданные уже загружены
    fn duration(&self) -> Option<f64>;

    /// Остановлена ли дорожка
    fn is_paused(&self) -> bool;

    /// Текущая громкость (0.0 - 1.0)
    fn volume(&self) -> f64;

    /// Установить громкость (0.0 - 1.0)
    fn set_volume(&self, volume: f64);

    /// Заглушена ли дорожка
    fn is_muted(&self) -> bool;

    /// Установить флаг заглушения
    fn set_muted(&self, muted: bool);

    /// Текущая скорость воспроизведения
    fn playback_rate(&self) -> f64;

    /// Установить скорость воспроизведения
    fn set_playback_rate(&self, rate: f64);

    /// Перезагрузить источник дорожки с нуля
    fn reload(&self);

    /// Подписаться на события дорожки
    fn subscribe(&self) -> broadcast::Receiver<TrackEvent>;
}
