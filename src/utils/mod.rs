//! Вспомогательные утилиты

pub mod time;
