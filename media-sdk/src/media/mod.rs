//! Media items and media references
//!
//! A [`Media`] owns one native media identity and exposes it through facets
//! (`media.info`, `media.meta`, `media.parsing`, ...). A [`MediaRef`] owns the
//! same kind of identity without facets or an event manager, which makes it
//! cheap to hand out in events and to keep in collections.
//!
//! ```rust,ignore
//! let media = factory.new_media("http://example.com/stream.mp3", &[])?;
//!
//! media.options.add(&[":network-caching=300"]);
//! media.parsing.parse();
//!
//! let same = media.share()?;            // same identity, options visible
//! let copy = media.duplicate();         // independent identity
//! ```

mod events;
mod info;
mod meta;
mod options;
mod parsing;
mod slaves;
mod subitems;

use std::fmt;
use std::sync::Arc;

use media_event_manager::EventManager;
use media_native::{NativeEngine, NativeHandle, ResourceKind};
use parking_lot::Mutex;

use crate::config::SdkConfig;
use crate::error::{Result, SdkError};
use crate::events::{MediaEvent, MediaEventListener, MediaTranslator};
use crate::handle::OwnedHandle;
use crate::list::MediaList;

pub use events::MediaEvents;
pub use info::MediaInfo;
pub use meta::{MediaMeta, MetaData};
pub use options::MediaOptions;
pub use parsing::MediaParsing;
pub use slaves::MediaSlaves;
pub use subitems::MediaSubItems;

use parsing::{ParseState, ParseTracker};

const RELEASED: &str = "media has been released";

pub(crate) mod sealed {
    use media_native::NativeHandle;

    pub trait Sealed {
        /// The media handle, unless the owner has been released
        fn live_media(&self) -> Option<NativeHandle>;
    }
}

/// Anything that can be handed to a player or list as "a media"
///
/// Implemented by [`Media`] and [`MediaRef`].
pub trait MediaItem: sealed::Sealed {}

/// State shared by every facet of one [`Media`]
pub(crate) struct MediaContext {
    owner: OwnedHandle,
    config: Arc<SdkConfig>,
    /// Created on first use
    events: Mutex<Option<Arc<EventManager<MediaEvent>>>>,
    parse: Arc<ParseState>,
    parse_tracker: Arc<dyn MediaEventListener>,
}

impl MediaContext {
    fn new(owner: OwnedHandle, config: Arc<SdkConfig>) -> Arc<Self> {
        let parse = Arc::new(ParseState::default());
        Arc::new(Self {
            owner,
            config,
            events: Mutex::new(None),
            parse_tracker: Arc::new(ParseTracker::new(Arc::clone(&parse))),
            parse,
        })
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

    /// The media's event manager, attaching it on first use
    pub(crate) fn event_manager(&self) -> Result<Arc<EventManager<MediaEvent>>> {
        let mut slot = self.events.lock();
        if let Some(manager) = slot.as_ref() {
            return Ok(Arc::clone(manager));
        }

        let media = self.require()?;
        let translator = MediaTranslator::new(Arc::clone(self.engine()), Arc::clone(&self.config));
        let manager = Arc::new(EventManager::new(
            Arc::clone(self.engine()),
            media,
            ResourceKind::Media,
            &self.config.event_manager_config(),
            move |raw| translator.translate(raw),
        )?);
        *slot = Some(Arc::clone(&manager));
        Ok(manager)
    }

    /// The event manager if one was ever attached
    pub(crate) fn existing_event_manager(&self) -> Option<Arc<EventManager<MediaEvent>>> {
        self.events.lock().clone()
    }

    fn release(&self) -> bool {
        self.owner.release_with(|| {
            // unlock before joining the worker
            let manager = self.events.lock().take();
            if let Some(manager) = manager {
                manager.release();
            }
        })
    }
}

impl Drop for MediaContext {
    fn drop(&mut self) {
        self.release();
    }
}

/// One owner of a native media item, with facets
pub struct Media {
    /// Locator, type, duration, state and tracks
    pub info: MediaInfo,
    /// Metadata read/write
    pub meta: MediaMeta,
    /// Playback options applied to this identity
    pub options: MediaOptions,
    /// Asynchronous parse requests and status
    pub parsing: MediaParsing,
    /// Subtitle and audio slaves
    pub slaves: MediaSlaves,
    /// Children of container media such as playlists
    pub subitems: MediaSubItems,
    /// Listener registration
    pub events: MediaEvents,

    context: Arc<MediaContext>,
}

impl Media {
    pub(crate) fn from_owner(owner: OwnedHandle, config: Arc<SdkConfig>) -> Self {
        let context = MediaContext::new(owner, config);
        Self {
            info: MediaInfo::new(Arc::clone(&context)),
            meta: MediaMeta::new(Arc::clone(&context)),
            options: MediaOptions::new(Arc::clone(&context)),
            parsing: MediaParsing::new(Arc::clone(&context)),
            slaves: MediaSlaves::new(Arc::clone(&context)),
            subitems: MediaSubItems::new(Arc::clone(&context)),
            events: MediaEvents::new(Arc::clone(&context)),
            context,
        }
    }

    /// Another owner of the same native identity
    ///
    /// Options and metadata changed through either wrapper are visible
    /// through both. Each wrapper must be released (or dropped).
    pub fn share(&self) -> Result<Media> {
        let owner = self.context.owner.retain().ok_or(SdkError::InvalidState(RELEASED))?;
        Ok(Media::from_owner(owner, Arc::clone(&self.context.config)))
    }

    /// A lightweight owner of the same identity
    pub fn new_ref(&self) -> Result<MediaRef> {
        let owner = self.context.owner.retain().ok_or(SdkError::InvalidState(RELEASED))?;
        Ok(MediaRef::from_owner(owner, Arc::clone(&self.context.config)))
    }

    /// An independent copy; `None` when the engine cannot clone this media
    pub fn duplicate(&self) -> Option<Media> {
        let owner = self.context.owner.duplicate()?;
        Some(Media::from_owner(owner, Arc::clone(&self.context.config)))
    }

    /// Detach the event manager, then release this owner's native reference
    ///
    /// Safe to call more than once; dropping the media has the same effect.
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

impl sealed::Sealed for Media {
    fn live_media(&self) -> Option<NativeHandle> {
        self.context.live()
    }
}

impl MediaItem for Media {}

impl fmt::Debug for Media {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Media")
            .field("handle", &self.context.owner.handle())
            .field("released", &self.is_released())
            .finish()
    }
}

/// One owner of a native media item, without facets
///
/// Handed to listeners in events; convert with [`to_media`](Self::to_media)
/// for the full API.
pub struct MediaRef {
    owner: OwnedHandle,
    config: Arc<SdkConfig>,
}

impl MediaRef {
    pub(crate) fn from_owner(owner: OwnedHandle, config: Arc<SdkConfig>) -> Self {
        Self { owner, config }
    }

    /// Retain a handle the engine lent out, e.g. in an event payload
    pub(crate) fn from_borrowed(
        engine: &Arc<dyn NativeEngine>,
        media: NativeHandle,
        config: &Arc<SdkConfig>,
    ) -> Self {
        Self::from_owner(
            OwnedHandle::retain_borrowed(Arc::clone(engine), media, ResourceKind::Media),
            Arc::clone(config),
        )
    }

    pub fn share(&self) -> Result<MediaRef> {
        let owner = self.owner.retain().ok_or(SdkError::InvalidState(RELEASED))?;
        Ok(MediaRef::from_owner(owner, Arc::clone(&self.config)))
    }

    /// A full [`Media`] owning the same identity
    pub fn to_media(&self) -> Result<Media> {
        let owner = self.owner.retain().ok_or(SdkError::InvalidState(RELEASED))?;
        Ok(Media::from_owner(owner, Arc::clone(&self.config)))
    }

    pub fn mrl(&self) -> Option<String> {
        let media = self.owner.live()?;
        self.owner.engine().media_mrl(media)
    }

    /// The engine's child list of this media
    pub(crate) fn subitems(&self) -> Option<MediaList> {
        let media = self.owner.live()?;
        let list = self.owner.engine().media_subitems(media)?;
        Some(MediaList::from_owner(
            OwnedHandle::adopt(Arc::clone(self.owner.engine()), list, ResourceKind::MediaList),
            Arc::clone(&self.config),
        ))
    }

    pub fn release(&self) {
        self.owner.release();
    }

    pub fn is_released(&self) -> bool {
        self.owner.is_released()
    }

    pub fn native_handle(&self) -> NativeHandle {
        self.owner.handle()
    }

}

impl sealed::Sealed for MediaRef {
    fn live_media(&self) -> Option<NativeHandle> {
        self.owner.live()
    }
}

impl MediaItem for MediaRef {}

impl fmt::Debug for MediaRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaRef")
            .field("handle", &self.owner.handle())
            .field("released", &self.is_released())
            .finish()
    }
}
