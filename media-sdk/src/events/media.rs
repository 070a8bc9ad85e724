use std::sync::Arc;
use std::time::Duration;

use media_event_manager::DomainEvent;
use media_native::{
    EventType, MediaState, Meta, NativeEngine, NativeHandle, ParsedStatus, RawEvent, RawPayload,
    RawPicture,
};

use crate::config::SdkConfig;
use crate::media::MediaRef;

use super::duration_from_ms;

/// A decoded thumbnail, copied out of native memory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thumbnail {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl Thumbnail {
    fn copy_from(picture: RawPicture<'_>) -> Self {
        Self {
            width: picture.width,
            height: picture.height,
            data: picture.data.to_vec(),
        }
    }
}

/// Events raised by a media item
#[derive(Debug)]
pub enum MediaEvent {
    MetaChanged(Meta),
    SubItemAdded(MediaRef),
    DurationChanged(Option<Duration>),
    ParsedChanged(ParsedStatus),
    Freed,
    StateChanged(MediaState),
    SubItemTreeAdded(MediaRef),
    /// `None` when thumbnail generation failed
    ThumbnailGenerated(Option<Thumbnail>),
}

/// Receives [`MediaEvent`]s; every method defaults to doing nothing
///
/// Methods run on the media's dispatch worker, one event at a time.
pub trait MediaEventListener: Send + Sync {
    fn meta_changed(&self, _meta: Meta) {}
    /// `item` is only borrowed; call `share()` on it to keep it
    fn sub_item_added(&self, _item: &MediaRef) {}
    fn duration_changed(&self, _duration: Option<Duration>) {}
    fn parsed_changed(&self, _status: ParsedStatus) {}
    fn freed(&self) {}
    fn state_changed(&self, _state: MediaState) {}
    fn sub_item_tree_added(&self, _item: &MediaRef) {}
    fn thumbnail_generated(&self, _thumbnail: Option<&Thumbnail>) {}
}

impl DomainEvent for MediaEvent {
    type Listener = dyn MediaEventListener;

    fn notify(&self, listener: &dyn MediaEventListener) {
        match self {
            MediaEvent::MetaChanged(meta) => listener.meta_changed(*meta),
            MediaEvent::SubItemAdded(item) => listener.sub_item_added(item),
            MediaEvent::DurationChanged(duration) => listener.duration_changed(*duration),
            MediaEvent::ParsedChanged(status) => listener.parsed_changed(*status),
            MediaEvent::Freed => listener.freed(),
            MediaEvent::StateChanged(state) => listener.state_changed(*state),
            MediaEvent::SubItemTreeAdded(item) => listener.sub_item_tree_added(item),
            MediaEvent::ThumbnailGenerated(thumbnail) => {
                listener.thumbnail_generated(thumbnail.as_ref())
            }
        }
    }

    fn name(&self) -> &'static str {
        match self {
            MediaEvent::MetaChanged(_) => "meta_changed",
            MediaEvent::SubItemAdded(_) => "sub_item_added",
            MediaEvent::DurationChanged(_) => "duration_changed",
            MediaEvent::ParsedChanged(_) => "parsed_changed",
            MediaEvent::Freed => "freed",
            MediaEvent::StateChanged(_) => "state_changed",
            MediaEvent::SubItemTreeAdded(_) => "sub_item_tree_added",
            MediaEvent::ThumbnailGenerated(_) => "thumbnail_generated",
        }
    }
}

/// Builds [`MediaEvent`]s on the engine's callback thread
pub(crate) struct MediaTranslator {
    engine: Arc<dyn NativeEngine>,
    config: Arc<SdkConfig>,
}

impl MediaTranslator {
    pub(crate) fn new(engine: Arc<dyn NativeEngine>, config: Arc<SdkConfig>) -> Self {
        Self { engine, config }
    }

    pub(crate) fn translate(&self, raw: &RawEvent<'_>) -> Option<MediaEvent> {
        let event = match (raw.event_type, raw.payload) {
            (EventType::MediaMetaChanged, RawPayload::Meta { meta }) => {
                MediaEvent::MetaChanged(Meta::from_code(meta)?)
            }
            (EventType::MediaSubItemAdded, RawPayload::Media { item }) => {
                MediaEvent::SubItemAdded(self.media_ref(item))
            }
            (EventType::MediaDurationChanged, RawPayload::Duration { duration_ms }) => {
                MediaEvent::DurationChanged(duration_from_ms(duration_ms))
            }
            (EventType::MediaParsedChanged, RawPayload::ParsedStatus { status }) => {
                MediaEvent::ParsedChanged(ParsedStatus::from_code(status)?)
            }
            (EventType::MediaFreed, _) => MediaEvent::Freed,
            (EventType::MediaStateChanged, RawPayload::State { state }) => {
                MediaEvent::StateChanged(MediaState::from_code(state))
            }
            (EventType::MediaSubItemTreeAdded, RawPayload::Media { item }) => {
                MediaEvent::SubItemTreeAdded(self.media_ref(item))
            }
            (EventType::MediaThumbnailGenerated, RawPayload::Thumbnail { picture }) => {
                MediaEvent::ThumbnailGenerated(picture.map(Thumbnail::copy_from))
            }
            (event_type, payload) => {
                tracing::trace!("No media event for {:?} with {:?}", event_type, payload);
                return None;
            }
        };
        Some(event)
    }

    fn media_ref(&self, item: NativeHandle) -> MediaRef {
        MediaRef::from_borrowed(&self.engine, item, &self.config)
    }
}
