use std::sync::Arc;

use media_event_manager::DomainEvent;
use media_native::{EventType, NativeEngine, NativeHandle, RawEvent, RawPayload};

use crate::config::SdkConfig;
use crate::media::MediaRef;

/// Events raised by a media list
#[derive(Debug)]
pub enum MediaListEvent {
    WillAddItem { item: MediaRef, index: usize },
    ItemAdded { item: MediaRef, index: usize },
    WillDeleteItem { item: MediaRef, index: usize },
    ItemDeleted { item: MediaRef, index: usize },
    EndReached,
}

/// Receives [`MediaListEvent`]s; every method defaults to doing nothing
pub trait MediaListEventListener: Send + Sync {
    fn will_add_item(&self, _item: &MediaRef, _index: usize) {}
    fn item_added(&self, _item: &MediaRef, _index: usize) {}
    fn will_delete_item(&self, _item: &MediaRef, _index: usize) {}
    fn item_deleted(&self, _item: &MediaRef, _index: usize) {}
    fn end_reached(&self) {}
}

impl DomainEvent for MediaListEvent {
    type Listener = dyn MediaListEventListener;

    fn notify(&self, listener: &dyn MediaListEventListener) {
        match self {
            MediaListEvent::WillAddItem { item, index } => listener.will_add_item(item, *index),
            MediaListEvent::ItemAdded { item, index } => listener.item_added(item, *index),
            MediaListEvent::WillDeleteItem { item, index } => {
                listener.will_delete_item(item, *index)
            }
            MediaListEvent::ItemDeleted { item, index } => listener.item_deleted(item, *index),
            MediaListEvent::EndReached => listener.end_reached(),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            MediaListEvent::WillAddItem { .. } => "will_add_item",
            MediaListEvent::ItemAdded { .. } => "item_added",
            MediaListEvent::WillDeleteItem { .. } => "will_delete_item",
            MediaListEvent::ItemDeleted { .. } => "item_deleted",
            MediaListEvent::EndReached => "end_reached",
        }
    }
}

/// Builds [`MediaListEvent`]s on the engine's callback thread
pub(crate) struct ListTranslator {
    engine: Arc<dyn NativeEngine>,
    config: Arc<SdkConfig>,
}

impl ListTranslator {
    pub(crate) fn new(engine: Arc<dyn NativeEngine>, config: Arc<SdkConfig>) -> Self {
        Self { engine, config }
    }

    pub(crate) fn translate(&self, raw: &RawEvent<'_>) -> Option<MediaListEvent> {
        if raw.event_type == EventType::ListEndReached {
            return Some(MediaListEvent::EndReached);
        }

        let RawPayload::ListItem { item, index } = raw.payload else {
            tracing::trace!("No list event for {:?} with {:?}", raw.event_type, raw.payload);
            return None;
        };
        let index = usize::try_from(index).ok()?;

        let event = match raw.event_type {
            EventType::ListWillAddItem => MediaListEvent::WillAddItem {
                item: self.media_ref(item),
                index,
            },
            EventType::ListItemAdded => MediaListEvent::ItemAdded {
                item: self.media_ref(item),
                index,
            },
            EventType::ListWillDeleteItem => MediaListEvent::WillDeleteItem {
                item: self.media_ref(item),
                index,
            },
            EventType::ListItemDeleted => MediaListEvent::ItemDeleted {
                item: self.media_ref(item),
                index,
            },
            _ => return None,
        };
        Some(event)
    }

    fn media_ref(&self, item: NativeHandle) -> MediaRef {
        MediaRef::from_borrowed(&self.engine, item, &self.config)
    }
}
