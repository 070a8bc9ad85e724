//! Media players
//!
//! A [`MediaPlayer`] owns one native player and is split into facets:
//!
//! - `controls`: play, pause, stop and "play and wait"
//! - `media`: what the player plays
//! - `sub_items`: sequencing through the children of a container media
//! - `events`: player listeners, and media listeners that follow whatever
//!   media the player currently has
//!
//! ```rust,ignore
//! let player = factory.new_media_player().expect("player");
//!
//! player.sub_items.set_auto_play(true);
//! player.media.play("http://example.com/list.m3u", &[]);
//! ```

mod controls;
mod events;
mod media;
mod sequencer;

use std::fmt;
use std::sync::{Arc, Weak};

use media_event_manager::{EventManager, Listeners};
use media_native::{NativeEngine, NativeHandle, ResourceKind};
use parking_lot::Mutex;

use crate::config::SdkConfig;
use crate::error::{Result, SdkError};
use crate::events::{MediaEventListener, MediaPlayerEvent, MediaPlayerEventListener, PlayerTranslator};
use crate::handle::OwnedHandle;
use crate::media::{Media, MediaRef};

pub use controls::PlayerControls;
pub use events::PlayerEvents;
pub use media::PlayerMedia;
pub use sequencer::SubItemSequencer;

use sequencer::SequencerState;

const RELEASED: &str = "media player has been released";

/// State shared by every facet of one [`MediaPlayer`]
pub(crate) struct PlayerContext {
    owner: OwnedHandle,
    config: Arc<SdkConfig>,
    events: EventManager<MediaPlayerEvent>,
    /// The player's current media, carrying the bridged media listeners
    bridged: Mutex<Option<Media>>,
    media_listeners: Listeners<dyn MediaEventListener>,
    sequencer: Mutex<SequencerState>,
}

impl PlayerContext {
    fn new(owner: OwnedHandle, config: Arc<SdkConfig>) -> Result<Arc<Self>> {
        let engine = Arc::clone(owner.engine());
        let translator = PlayerTranslator::new(Arc::clone(&engine), Arc::clone(&config));
        let events = EventManager::new(
            engine,
            owner.handle(),
            ResourceKind::MediaPlayer,
            &config.event_manager_config(),
            move |raw| translator.translate(raw),
        )?;

        let context = Arc::new(Self {
            sequencer: Mutex::new(SequencerState::new(&config)),
            owner,
            config,
            events,
            bridged: Mutex::new(None),
            media_listeners: Listeners::new(),
        });

        let weak = Arc::downgrade(&context);
        context
            .events
            .add_listener(Arc::new(MediaBridge(Weak::clone(&weak))));
        context.events.add_listener(Arc::new(FinishedWatcher(weak)));
        Ok(context)
    }

    pub(crate) fn engine(&self) -> &Arc<dyn NativeEngine> {
        self.owner.engine()
    }

    pub(crate) fn config(&self) -> &Arc<SdkConfig> {
        &self.config
    }

    pub(crate) fn live(&self) -> Option<NativeHandle> {
        self.owner.live()
    }

    pub(crate) fn require(&self) -> Result<NativeHandle> {
        self.live().ok_or(SdkError::InvalidState(RELEASED))
    }

    pub(crate) fn events(&self) -> &EventManager<MediaPlayerEvent> {
        &self.events
    }

    /// Raise a synthetic event in order with the native ones
    pub(crate) fn raise(&self, event: MediaPlayerEvent) {
        if let Err(e) = self.events.raise(event) {
            tracing::debug!("Dropped synthetic player event: {}", e);
        }
    }

    /// The player's current media, retained for the caller
    pub(crate) fn current_media(&self) -> Option<MediaRef> {
        let player = self.live()?;
        let media = self.engine().player_media(player)?;
        Some(MediaRef::from_owner(
            OwnedHandle::adopt(Arc::clone(self.engine()), media, ResourceKind::Media),
            Arc::clone(&self.config),
        ))
    }

    /// Apply options, then hand `media` to the native player
    pub(crate) fn set_native_media(&self, player: NativeHandle, media: NativeHandle, options: &[&str]) {
        let engine = self.engine();
        for option in options {
            engine.media_add_option(media, option);
        }
        engine.player_set_media(player, Some(media));
    }

    pub(crate) fn play(&self) -> bool {
        let Some(player) = self.live() else {
            return false;
        };
        match self.engine().player_play(player) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Play on {} failed: {}", player, e);
                false
            }
        }
    }

    pub(crate) fn media_listeners(&self) -> &Listeners<dyn MediaEventListener> {
        &self.media_listeners
    }

    /// Run `f` with the bridged media slot locked
    pub(crate) fn with_bridged<R>(&self, f: impl FnOnce(Option<&Media>) -> R) -> R {
        f(self.bridged.lock().as_ref())
    }

    /// Move the media listeners over to the player's new media
    fn bridge(&self, media: &MediaRef) {
        if self.owner.is_released() {
            return;
        }
        let media = match media.to_media() {
            Ok(media) => media,
            Err(e) => {
                tracing::debug!("Not bridging released media: {}", e);
                return;
            }
        };
        let mut slot = self.bridged.lock();
        for listener in self.media_listeners.snapshot().iter() {
            if let Err(e) = media.events.add_listener(Arc::clone(listener)) {
                tracing::warn!("Could not bridge media listener to {:?}: {}", media, e);
                break;
            }
        }
        let previous = slot.replace(media);
        drop(slot);
        drop(previous);
    }

    fn release(&self) -> bool {
        self.owner.release_with(|| {
            self.events.release();
            let bridged = self.bridged.lock().take();
            drop(bridged);
            self.sequencer.lock().reset();
            self.media_listeners.clear();
        })
    }
}

impl Drop for PlayerContext {
    fn drop(&mut self) {
        self.release();
    }
}

/// Re-attaches media listeners whenever the player's media changes
struct MediaBridge(Weak<PlayerContext>);

impl MediaPlayerEventListener for MediaBridge {
    fn media_changed(&self, media: &MediaRef) {
        if let Some(context) = self.0.upgrade() {
            context.bridge(media);
        }
    }
}

/// Drives the sub-item sequencer from the native `finished` event
struct FinishedWatcher(Weak<PlayerContext>);

impl MediaPlayerEventListener for FinishedWatcher {
    fn finished(&self) {
        if let Some(context) = self.0.upgrade() {
            sequencer::on_finished(&context);
        }
    }
}

/// One owner of a native media player
pub struct MediaPlayer {
    /// Transport commands and state
    pub controls: PlayerControls,
    /// The media being played
    pub media: PlayerMedia,
    /// Playback through the children of a container media
    pub sub_items: SubItemSequencer,
    /// Player and bridged media listeners
    pub events: PlayerEvents,

    context: Arc<PlayerContext>,
}

impl MediaPlayer {
    pub(crate) fn from_owner(owner: OwnedHandle, config: Arc<SdkConfig>) -> Result<Self> {
        let context = PlayerContext::new(owner, config)?;
        Ok(Self {
            controls: PlayerControls::new(Arc::clone(&context)),
            media: PlayerMedia::new(Arc::clone(&context)),
            sub_items: SubItemSequencer::new(Arc::clone(&context)),
            events: PlayerEvents::new(Arc::clone(&context)),
            context,
        })
    }

    /// Detach listeners, drop the bridged media and release the player
    ///
    /// Safe to call more than once, including from a listener.
    pub fn release(&self) {
        self.context.release();
    }

    pub fn is_released(&self) -> bool {
        self.context.owner.is_released()
    }

    pub fn native_handle(&self) -> NativeHandle {
        self.context.owner.handle()
    }
}

impl fmt::Debug for MediaPlayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaPlayer")
            .field("handle", &self.context.owner.handle())
            .field("released", &self.is_released())
            .finish()
    }
}
