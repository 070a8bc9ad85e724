//! Media lists
//!
//! A [`MediaList`] is one owner of a native list of media. Every operation
//! takes the native list lock for its own duration; use [`MediaList::lock`]
//! to keep the list stable across several reads.

use std::fmt;
use std::sync::Arc;

use media_event_manager::EventManager;
use media_native::{NativeEngine, NativeHandle, ResourceKind};
use parking_lot::Mutex;

use crate::config::SdkConfig;
use crate::error::{Result, SdkError};
use crate::events::{ListTranslator, MediaListEvent, MediaListEventListener};
use crate::handle::OwnedHandle;
use crate::media::sealed::Sealed;
use crate::media::{MediaItem, MediaRef};

const RELEASED: &str = "media list has been released";

struct ListContext {
    owner: OwnedHandle,
    config: Arc<SdkConfig>,
    events: Mutex<Option<Arc<EventManager<MediaListEvent>>>>,
}

impl ListContext {
    fn engine(&self) -> &Arc<dyn NativeEngine> {
        self.owner.engine()
    }

    fn require(&self) -> Result<NativeHandle> {
        self.owner.live().ok_or(SdkError::InvalidState(RELEASED))
    }

    fn event_manager(&self) -> Result<Arc<EventManager<MediaListEvent>>> {
        let mut slot = self.events.lock();
        if let Some(manager) = slot.as_ref() {
            return Ok(Arc::clone(manager));
        }

        let list = self.require()?;
        let translator = ListTranslator::new(Arc::clone(self.engine()), Arc::clone(&self.config));
        let manager = Arc::new(EventManager::new(
            Arc::clone(self.engine()),
            list,
            ResourceKind::MediaList,
            &self.config.event_manager_config(),
            move |raw| translator.translate(raw),
        )?);
        *slot = Some(Arc::clone(&manager));
        Ok(manager)
    }

    /// Run `f` with the native list lock held
    fn locked<R>(&self, f: impl FnOnce(NativeHandle) -> R) -> Option<R> {
        let list = self.owner.live()?;
        let engine = self.engine();
        engine.list_lock(list);
        let result = f(list);
        engine.list_unlock(list);
        Some(result)
    }

    // the *_unlocked helpers expect the caller to hold the native lock

    fn count_unlocked(&self, list: NativeHandle) -> usize {
        usize::try_from(self.engine().list_count(list)).unwrap_or(0)
    }

    fn get_unlocked(&self, list: NativeHandle, index: usize) -> Option<MediaRef> {
        let index = i32::try_from(index).ok()?;
        let media = self.engine().list_item_at(list, index)?;
        Some(MediaRef::from_owner(
            OwnedHandle::adopt(Arc::clone(self.engine()), media, ResourceKind::Media),
            Arc::clone(&self.config),
        ))
    }

    fn items_unlocked(&self, list: NativeHandle) -> Vec<MediaRef> {
        (0..self.count_unlocked(list))
            .filter_map(|index| self.get_unlocked(list, index))
            .collect()
    }

    fn release(&self) -> bool {
        self.owner.release_with(|| {
            let manager = self.events.lock().take();
            if let Some(manager) = manager {
                manager.release();
            }
        })
    }
}

impl Drop for ListContext {
    fn drop(&mut self) {
        self.release();
    }
}

/// Listener registration for one media list
pub struct ListEvents {
    context: Arc<ListContext>,
}

impl ListEvents {
    pub fn add_listener(&self, listener: Arc<dyn MediaListEventListener>) -> Result<()> {
        self.context.event_manager()?.add_listener(listener);
        Ok(())
    }

    pub fn remove_listener(&self, listener: &Arc<dyn MediaListEventListener>) -> bool {
        self.context
            .events
            .lock()
            .as_ref()
            .is_some_and(|manager| manager.remove_listener(listener))
    }
}

/// One owner of a native media list
pub struct MediaList {
    pub events: ListEvents,
    context: Arc<ListContext>,
}

impl MediaList {
    pub(crate) fn from_owner(owner: OwnedHandle, config: Arc<SdkConfig>) -> Self {
        let context = Arc::new(ListContext {
            owner,
            config,
            events: Mutex::new(None),
        });
        Self {
            events: ListEvents {
                context: Arc::clone(&context),
            },
            context,
        }
    }

    /// Append a media; the list takes its own reference
    pub fn add(&self, item: &impl MediaItem) -> bool {
        let Some(media) = item.live_media() else {
            return false;
        };
        let engine = self.context.engine();
        self.report(
            "add",
            self.context.locked(|list| engine.list_add(list, media)),
        )
    }

    pub fn insert(&self, item: &impl MediaItem, index: usize) -> bool {
        let (Some(media), Ok(index)) = (item.live_media(), i32::try_from(index)) else {
            return false;
        };
        let engine = self.context.engine();
        self.report(
            "insert",
            self.context
                .locked(|list| engine.list_insert(list, media, index)),
        )
    }

    pub fn remove(&self, index: usize) -> bool {
        let Ok(index) = i32::try_from(index) else {
            return false;
        };
        let engine = self.context.engine();
        self.report(
            "remove",
            self.context.locked(|list| engine.list_remove(list, index)),
        )
    }

    pub fn count(&self) -> usize {
        self.context
            .locked(|list| self.context.count_unlocked(list))
            .unwrap_or(0)
    }

    pub fn get(&self, index: usize) -> Option<MediaRef> {
        self.context
            .locked(|list| self.context.get_unlocked(list, index))
            .flatten()
    }

    pub fn items(&self) -> Vec<MediaRef> {
        self.context
            .locked(|list| self.context.items_unlocked(list))
            .unwrap_or_default()
    }

    pub fn index_of(&self, item: &impl MediaItem) -> Option<usize> {
        let media = item.live_media()?;
        let engine = self.context.engine();
        let index = self
            .context
            .locked(|list| engine.list_index_of(list, media))?;
        usize::try_from(index).ok()
    }

    /// Lists built by the engine (sub-items of a parsed media) are read-only
    pub fn is_read_only(&self) -> bool {
        match self.context.owner.live() {
            Some(list) => self.context.engine().list_is_read_only(list),
            None => true,
        }
    }

    /// Hold the native list lock until the guard is dropped
    pub fn lock(&self) -> Result<MediaListGuard<'_>> {
        let list = self.context.require()?;
        self.context.engine().list_lock(list);
        Ok(MediaListGuard { owner: self, list })
    }

    pub fn share(&self) -> Result<MediaList> {
        let owner = self
            .context
            .owner
            .retain()
            .ok_or(SdkError::InvalidState(RELEASED))?;
        Ok(MediaList::from_owner(owner, Arc::clone(&self.context.config)))
    }

    pub fn release(&self) {
        self.context.release();
    }

    pub fn is_released(&self) -> bool {
        self.context.owner.is_released()
    }

    pub fn native_handle(&self) -> NativeHandle {
        self.context.owner.handle()
    }

    fn report(&self, call: &str, outcome: Option<media_native::Result<()>>) -> bool {
        match outcome {
            Some(Ok(())) => true,
            Some(Err(e)) => {
                tracing::debug!("List {} on {} failed: {}", call, self.native_handle(), e);
                false
            }
            None => false,
        }
    }
}

impl fmt::Debug for MediaList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaList")
            .field("handle", &self.context.owner.handle())
            .field("released", &self.is_released())
            .finish()
    }
}

/// Native list lock held for the guard's lifetime
///
/// Reads through the guard see one consistent list.
pub struct MediaListGuard<'a> {
    owner: &'a MediaList,
    list: NativeHandle,
}

impl MediaListGuard<'_> {
    pub fn count(&self) -> usize {
        self.owner.context.count_unlocked(self.list)
    }

    pub fn get(&self, index: usize) -> Option<MediaRef> {
        self.owner.context.get_unlocked(self.list, index)
    }

    pub fn items(&self) -> Vec<MediaRef> {
        self.owner.context.items_unlocked(self.list)
    }
}

impl Drop for MediaListGuard<'_> {
    fn drop(&mut self) {
        self.owner.context.engine().list_unlock(self.list);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::Media;
    use crossbeam::channel::{unbounded, Sender};
    use media_native::fake::FakeEngine;
    use std::time::Duration;

    struct Recorder(Sender<(String, usize)>);

    impl MediaListEventListener for Recorder {
        fn will_add_item(&self, _item: &MediaRef, index: usize) {
            let _ = self.0.send(("will_add".to_string(), index));
        }

        fn item_added(&self, item: &MediaRef, index: usize) {
            let _ = self.0.send((item.mrl().unwrap_or_default(), index));
        }

        fn item_deleted(&self, _item: &MediaRef, index: usize) {
            let _ = self.0.send(("deleted".to_string(), index));
        }
    }

    fn setup() -> (FakeEngine, Arc<dyn NativeEngine>, MediaList) {
        let fake = FakeEngine::new();
        let engine: Arc<dyn NativeEngine> = Arc::new(fake.clone());
        let handle = engine.list_new().unwrap();
        let list = MediaList::from_owner(
            OwnedHandle::adopt(Arc::clone(&engine), handle, ResourceKind::MediaList),
            Arc::new(SdkConfig::default()),
        );
        (fake, engine, list)
    }

    fn media(engine: &Arc<dyn NativeEngine>, mrl: &str) -> Media {
        let handle = engine.media_new_location(mrl).unwrap();
        Media::from_owner(
            OwnedHandle::adopt(Arc::clone(engine), handle, ResourceKind::Media),
            Arc::new(SdkConfig::default()),
        )
    }

    #[test]
    fn test_add_insert_remove() {
        let (fake, engine, list) = setup();
        let a = media(&engine, "http://example.com/a.mp3");
        let b = media(&engine, "http://example.com/b.mp3");

        assert!(list.add(&a));
        assert!(list.insert(&b, 0));
        assert_eq!(list.count(), 2);
        assert_eq!(list.index_of(&a), Some(1));
        assert_eq!(
            list.get(0).and_then(|m| m.mrl()).as_deref(),
            Some("http://example.com/b.mp3")
        );
        assert!(!list.insert(&b, 7));

        assert!(list.remove(0));
        assert_eq!(list.index_of(&b), None);
        assert!(!list.remove(5));
        assert!(!fake.is_list_locked(list.native_handle()));
    }

    #[test]
    fn test_read_only_list_refuses_changes() {
        let (fake, engine, list) = setup();
        fake.set_list_read_only(list.native_handle(), true);
        let a = media(&engine, "http://example.com/a.mp3");

        assert!(list.is_read_only());
        assert!(!list.add(&a));
        assert_eq!(list.count(), 0);
    }

    #[test]
    fn test_guard_holds_lock_until_dropped() {
        let (fake, engine, list) = setup();
        let a = media(&engine, "http://example.com/a.mp3");
        list.add(&a);

        {
            let guard = list.lock().unwrap();
            assert!(fake.is_list_locked(list.native_handle()));
            assert_eq!(guard.count(), 1);
            assert_eq!(guard.items().len(), 1);
        }
        assert!(!fake.is_list_locked(list.native_handle()));
    }

    #[test]
    fn test_events_reach_listener() {
        let (_fake, engine, list) = setup();
        let (tx, rx) = unbounded();
        list.events
            .add_listener(Arc::new(Recorder(tx)))
            .unwrap();

        let a = media(&engine, "http://example.com/a.mp3");
        list.add(&a);
        list.remove(0);

        let timeout = Duration::from_secs(2);
        let seen: Vec<_> = (0..3).map(|_| rx.recv_timeout(timeout).unwrap()).collect();
        assert_eq!(
            seen,
            vec![
                ("will_add".to_string(), 0),
                ("http://example.com/a.mp3".to_string(), 0),
                ("deleted".to_string(), 0),
            ]
        );
    }

    #[test]
    fn test_release_accounting() {
        let (fake, engine, list) = setup();
        let a = media(&engine, "http://example.com/a.mp3");
        list.add(&a);
        let shared = list.share().unwrap();
        let item = list.get(0).unwrap();

        list.release();
        assert_eq!(shared.count(), 1);
        assert!(list.lock().is_err());
        drop(shared);
        drop(item);
        drop(a);

        assert_eq!(fake.live_handles(), 0);
        assert_eq!(fake.stats().violations, 0);
    }
}
