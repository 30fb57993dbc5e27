//! Контекст плеера
//!
//! Ссылки на дорожки разрешаются один раз при инициализации и передаются
//! компонентам явно, а не запрашиваются заново при каждом обращении.
//! Отсутствие дорожки не является ошибкой: зависящая от неё
//! функциональность просто отключается.

use std::sync::Arc;

use super::track::MediaTrack;

/// Ссылки на дорожки плеера, каждая может отсутствовать
#[derive(Clone)]
pub struct PlayerContext {
    /// Видеодорожка (авторитетная)
    pub video: Option<Arc<dyn MediaTrack>>,
    /// Аудиодорожка комментария (ведомая)
    pub audio: Option<Arc<dyn MediaTrack>>,
}

impl PlayerContext {
    /// Создать контекст из опциональных дорожек
    pub fn new(video: Option<Arc<dyn MediaTrack>>, audio: Option<Arc<dyn MediaTrack>>) -> Self {
        Self { video, audio }
    }

    /// Контекст с обеими дорожками
    pub fn with_tracks(video: Arc<dyn MediaTrack>, audio: Arc<dyn MediaTrack>) -> Self {
        Self {
            video: Some(video),
            audio: Some(audio),
        }
    }

    /// Пустой контекст: весь плеер отключён
    pub fn empty() -> Self {
        Self {
            video: None,
            audio: None,
        }
    }
}
