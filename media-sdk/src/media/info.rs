use std::sync::Arc;
use std::time::Duration;

use media_native::{MediaState, MediaType, TrackInfo};

use crate::events::duration_from_ms;

use super::MediaContext;

/// Read-only facts about a media item
///
/// Values are read from the engine on every call. On a released media every
/// accessor returns its empty value.
pub struct MediaInfo {
    context: Arc<MediaContext>,
}

impl MediaInfo {
    pub(crate) fn new(context: Arc<MediaContext>) -> Self {
        Self { context }
    }

    pub fn mrl(&self) -> Option<String> {
        let media = self.context.live()?;
        self.context.engine().media_mrl(media)
    }

    pub fn media_type(&self) -> MediaType {
        match self.context.live() {
            Some(media) => self.context.engine().media_type(media),
            None => MediaType::Unknown,
        }
    }

    /// `None` until the engine knows the length, usually after parsing
    pub fn duration(&self) -> Option<Duration> {
        let media = self.context.live()?;
        duration_from_ms(self.context.engine().media_duration(media))
    }

    pub fn state(&self) -> MediaState {
        match self.context.live() {
            Some(media) => self.context.engine().media_state(media),
            None => MediaState::NothingSpecial,
        }
    }

    /// Elementary streams, available once the media has been parsed
    pub fn tracks(&self) -> Vec<TrackInfo> {
        match self.context.live() {
            Some(media) => self.context.engine().media_tracks(media),
            None => Vec::new(),
        }
    }
}
