use std::sync::Arc;

use media_native::{ResourceKind, TrackInfo};

use crate::error::{Result, SdkError};
use crate::handle::OwnedHandle;
use crate::media::sealed::Sealed;
use crate::media::{MediaItem, MediaRef};

use super::{controls, PlayerContext};

/// What a media player plays
pub struct PlayerMedia {
    context: Arc<PlayerContext>,
}

impl PlayerMedia {
    pub(crate) fn new(context: Arc<PlayerContext>) -> Self {
        Self { context }
    }

    /// Hand `media` to the player, adding `options` to it first
    ///
    /// Any sub-item progress from a previous media is forgotten.
    pub fn set(&self, media: &impl MediaItem, options: &[&str]) -> bool {
        let (Some(player), Some(media)) = (self.context.live(), media.live_media()) else {
            return false;
        };
        self.context.sequencer.lock().reset();
        self.context.set_native_media(player, media, options);
        true
    }

    /// Create a media from a locator and hand it to the player
    ///
    /// The configured default media options are applied before `options`.
    pub fn set_mrl(&self, mrl: &str, options: &[&str]) -> bool {
        let Some(player) = self.context.live() else {
            return false;
        };
        let engine = self.context.engine();
        let Some(handle) = engine.media_new_location(mrl) else {
            tracing::debug!("Engine could not create media for {}", mrl);
            return false;
        };
        // the player takes its own reference; ours goes when `created` drops
        let created = OwnedHandle::adopt(Arc::clone(engine), handle, ResourceKind::Media);

        let defaults = &self.context.config().default_media_options;
        for option in defaults {
            engine.media_add_option(created.handle(), option);
        }
        self.context.sequencer.lock().reset();
        self.context.set_native_media(player, created.handle(), options);
        true
    }

    /// Create, set and play a media
    pub fn play(&self, mrl: &str, options: &[&str]) -> bool {
        self.set_mrl(mrl, options) && self.context.play()
    }

    /// Create, set and play a media, waiting for it to start
    ///
    /// See [`PlayerControls::start`](super::PlayerControls::start).
    pub fn start(&self, mrl: &str, options: &[&str]) -> bool {
        self.set_mrl(mrl, options) && controls::start(&self.context, self.context.config().start_timeout)
    }

    /// The media the player currently has
    pub fn current(&self) -> Option<MediaRef> {
        self.context.current_media()
    }

    /// Elementary streams of the current media
    pub fn tracks(&self) -> Result<Vec<TrackInfo>> {
        self.context.require()?;
        let current = self
            .current()
            .ok_or(SdkError::InvalidState("no media is set"))?;
        let media = current
            .live_media()
            .ok_or(SdkError::InvalidState("no media is set"))?;
        Ok(self.context.engine().media_tracks(media))
    }
}
