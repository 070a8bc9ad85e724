//! Typed domain events and their listener traits
//!
//! Each resource kind has one event enum, one listener trait with a no-op
//! default for every method, and one translator that turns a borrowed
//! native record into an owned event on the engine's callback thread.

mod list;
mod media;
mod player;

use std::time::Duration;

pub use list::{MediaListEvent, MediaListEventListener};
pub use media::{MediaEvent, MediaEventListener, Thumbnail};
pub use player::{MediaPlayerEvent, MediaPlayerEventListener};

pub(crate) use list::ListTranslator;
pub(crate) use media::MediaTranslator;
pub(crate) use player::PlayerTranslator;

/// Engine durations are milliseconds with `-1` for "unknown"
pub(crate) fn duration_from_ms(ms: i64) -> Option<Duration> {
    u64::try_from(ms).ok().map(Duration::from_millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_from_ms() {
        assert_eq!(duration_from_ms(1500), Some(Duration::from_millis(1500)));
        assert_eq!(duration_from_ms(0), Some(Duration::ZERO));
        assert_eq!(duration_from_ms(-1), None);
    }
}
