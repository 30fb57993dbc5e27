//! Абстракция медиа-дорожек
//!
//! Этот модуль описывает транспортную поверхность одной медиа-дорожки и
//! контекст плеера с заранее разрешёнными ссылками на дорожки. Настоящие
//! дорожки принадлежат хосту; библиотека хранит только невладеющие ссылки.

pub mod context;
pub mod simulated;
pub mod track;

pub use context::PlayerContext;
pub use simulated::SimulatedTrack;
pub use track::{MediaTrack, TrackEvent};
