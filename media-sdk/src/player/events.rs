use std::sync::Arc;

use crate::error::Result;
use crate::events::{MediaEventListener, MediaPlayerEventListener};

use super::PlayerContext;

/// Listener registration for a media player
///
/// Media listeners registered here follow the player: they are attached to
/// whatever media the player has and moved over on every `media_changed`.
pub struct PlayerEvents {
    context: Arc<PlayerContext>,
}

impl PlayerEvents {
    pub(crate) fn new(context: Arc<PlayerContext>) -> Self {
        Self { context }
    }

    pub fn add_listener(&self, listener: Arc<dyn MediaPlayerEventListener>) -> Result<()> {
        self.context.require()?;
        self.context.events().add_listener(listener);
        Ok(())
    }

    pub fn remove_listener(&self, listener: &Arc<dyn MediaPlayerEventListener>) -> bool {
        self.context.events().remove_listener(listener)
    }

    pub fn add_media_listener(&self, listener: Arc<dyn MediaEventListener>) -> Result<()> {
        self.context.require()?;
        self.context.with_bridged(|media| {
            self.context.media_listeners().add(Arc::clone(&listener));
            match media {
                Some(media) => media.events.add_listener(listener),
                None => Ok(()),
            }
        })
    }

    pub fn remove_media_listener(&self, listener: &Arc<dyn MediaEventListener>) -> bool {
        self.context.with_bridged(|media| {
            if let Some(media) = media {
                media.events.remove_listener(listener);
            }
            self.context.media_listeners().remove(listener)
        })
    }
}
