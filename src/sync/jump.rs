//! Машина состояний перехода к событию
//!
//! Переход выполняется фазами Idle → Pausing → Seeking → Resuming → Idle.
//! Перемотка играющей дорожки на некоторых средах выполнения даёт
//! противоречивые промежуточные состояния, поэтому перед перемоткой обе
//! дорожки останавливаются. Смена фазы управляется подтверждающими
//! событиями дорожки; если подтверждение не приходит, фаза завершается по
//! фиксированному тайм-ауту.

use std::sync::atomic::Ordering;
use std::time::Duration;

use log::debug;
use tokio::sync::broadcast;
use tokio::time::timeout;

use crate::media::TrackEvent;
use crate::transport::TransportController;

/// Фаза перехода
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JumpPhase {
    Pausing,
    Seeking,
    Resuming,
}

/// Выполняет переход к метке времени
///
/// Повторный вызов во время активного перехода игнорируется: переход не
/// отменяем, две последовательности пауза-перемотка-запуск не должны
/// накладываться.
pub(crate) async fn run(transport: &TransportController, timestamp: f64) {
    let video = match transport.context().video.as_ref() {
        Some(video) => video.clone(),
        None => return,
    };

    if transport.jump_in_flight().swap(true, Ordering::SeqCst) {
        debug!("Jump to {:.2}s ignored: another jump is in flight", timestamp);
        return;
    }

    let mut events = video.subscribe();

    let mut phase = JumpPhase::Pausing;
    debug!("Jump to {:.2}s: {:?}", timestamp, phase);
    let was_playing = !video.is_paused();
    transport.pause();
    if was_playing {
        await_confirmation(&mut events, transport.config().pause_settle, |event| {
            matches!(event, TrackEvent::Pause)
        })
        .await;
    }

    phase = JumpPhase::Seeking;
    debug!("Jump to {:.2}s: {:?}", timestamp, phase);
    transport.seek(timestamp);
    await_confirmation(&mut events, transport.config().seek_settle, |event| {
        matches!(event, TrackEvent::Seeked(_))
    })
    .await;

    phase = JumpPhase::Resuming;
    debug!("Jump to {:.2}s: {:?}", timestamp, phase);
    transport.play().await;

    transport.jump_in_flight().store(false, Ordering::SeqCst);
}

/// Ждёт подтверждающее событие, но не дольше запасного тайм-аута
async fn await_confirmation(
    events: &mut broadcast::Receiver<TrackEvent>,
    fallback: Duration,
    confirmed: impl Fn(&TrackEvent) -> bool,
) {
    let wait = async {
        loop {
            match events.recv().await {
                Ok(event) if confirmed(&event) => break,
                Ok(_) => continue,
                Err(_) => break,
            }
        }
    };
    if timeout(fallback, wait).await.is_err() {
        debug!("No confirmation within {:?}, proceeding on timeout", fallback);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::PlayerConfig;
    use tokio_test::assert_ok;
    use crate::media::{MediaTrack, PlayerContext, SimulatedTrack};

    fn transport() -> (Arc<SimulatedTrack>, Arc<SimulatedTrack>, TransportController) {
        let video = Arc::new(SimulatedTrack::new("video"));
        let audio = Arc::new(SimulatedTrack::new("audio"));
        video.load_metadata(120.0);
        audio.load_metadata(120.0);
        let context = PlayerContext::with_tracks(video.clone(), audio.clone());
        let transport = TransportController::new(context, PlayerConfig::default());
        (video, audio, transport)
    }

    #[tokio::test]
    async fn test_jump_while_paused_seeks_and_resumes() {
        let (video, audio, transport) = transport();

        transport.jump_to_event(42.5).await;
        assert_eq!(video.position(), 42.5);
        assert_eq!(audio.position(), 42.5);
        assert!(!video.is_paused());
        assert!(!transport.controls().borrow().show_play);
    }

    #[tokio::test]
    async fn test_jump_while_playing_pauses_first() {
        let (video, audio, transport) = transport();
        assert_ok!(video.play().await);
        assert_ok!(audio.play().await);

        transport.jump_to_event(30.0).await;
        assert_eq!(video.position(), 30.0);
        assert_eq!(audio.position(), 30.0);
        assert!(!video.is_paused());
    }

    #[tokio::test]
    async fn test_jump_with_rejected_resume_stays_paused() {
        let (video, _audio, transport) = transport();
        video.set_reject_play(true);

        transport.jump_to_event(15.0).await;
        // Позиция установлена, но воспроизведение не возобновилось
        assert_eq!(video.position(), 15.0);
        assert!(video.is_paused());
        assert!(transport.controls().borrow().show_play);
    }

    #[tokio::test]
    async fn test_jump_clears_in_flight_flag() {
        let (_video, _audio, transport) = transport();

        transport.jump_to_event(10.0).await;
        transport.jump_to_event(20.0).await;
        // Второй переход после завершения первого не игнорируется
        assert_eq!(
            transport.context().video.as_ref().map(|v| v.position()),
            Some(20.0)
        );
    }
}
