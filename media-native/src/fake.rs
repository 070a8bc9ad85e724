//! Instrumented in-memory engine for tests
//!
//! [`FakeEngine`] implements [`NativeEngine`] with real reference counting so
//! tests can assert that every owning wrapper released its handle exactly
//! once. Misuse (release of a dead handle, use after release) is recorded as a
//! violation instead of corrupting anything.
//!
//! Asynchronous operations (parse, play) complete on threads spawned by the
//! fake, which stand in for the engine's own event threads.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use dashmap::DashMap;
use parking_lot::Mutex;

use crate::engine::NativeEngine;
use crate::error::{NativeError, Result};
use crate::event::{EventType, NativeCallback, RawEvent, RawPayload};
use crate::handle::{NativeHandle, ResourceKind};
use crate::types::{
    MediaState, MediaType, Meta, ParseFlags, ParsedStatus, Slave, SlaveType, TrackInfo,
};
use crate::version::EngineVersion;

/// Locator prefix whose playback fails with an error event
pub const ERROR_SCHEME: &str = "error://";

/// Counters observed by tests
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FakeStats {
    pub created: u64,
    pub retained: u64,
    pub released: u64,
    /// Releases or calls against a handle that is not live
    pub violations: u64,
    pub attached: u64,
    pub detached: u64,
    /// Attach attempts for codes the configured version does not define
    pub undefined_attaches: u64,
}

#[derive(Debug, Clone, Default)]
struct MediaData {
    mrl: String,
    node: bool,
    options: Vec<String>,
    meta: HashMap<Meta, String>,
    duration_ms: i64,
    media_type: MediaType,
    state: MediaState,
    parsed: ParsedStatus,
    tracks: Vec<TrackInfo>,
    slaves: Vec<Slave>,
    subitems: Option<NativeHandle>,
}

#[derive(Debug, Default)]
struct ListData {
    items: Vec<NativeHandle>,
    read_only: bool,
    locks: u32,
}

#[derive(Debug, Default)]
struct PlayerData {
    media: Option<NativeHandle>,
    state: MediaState,
}

#[derive(Debug)]
enum Data {
    Media(MediaData),
    List(ListData),
    Player(PlayerData),
}

#[derive(Debug)]
struct Resource {
    refcount: u32,
    data: Data,
}

impl Resource {
    fn kind(&self) -> ResourceKind {
        match self.data {
            Data::Media(_) => ResourceKind::Media,
            Data::List(_) => ResourceKind::MediaList,
            Data::Player(_) => ResourceKind::MediaPlayer,
        }
    }
}

struct Inner {
    version: EngineVersion,
    next_id: AtomicU64,
    resources: DashMap<NativeHandle, Resource>,
    callbacks: DashMap<(NativeHandle, EventType), Vec<NativeCallback>>,
    stats: Mutex<FakeStats>,
    attach_log: Mutex<Vec<(NativeHandle, EventType)>>,
    rejected: Mutex<HashSet<EventType>>,
    parse_delay: Mutex<Duration>,
    parse_outcome: Mutex<ParsedStatus>,
    save_meta_fails: AtomicBool,
}

/// Reference-counting in-memory engine
#[derive(Clone)]
pub struct FakeEngine {
    inner: Arc<Inner>,
}

impl Default for FakeEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeEngine {
    /// A fake reporting engine version 3.0.18
    pub fn new() -> Self {
        Self::with_version(EngineVersion::new(3, 0, 18))
    }

    pub fn with_version(version: EngineVersion) -> Self {
        Self {
            inner: Arc::new(Inner {
                version,
                next_id: AtomicU64::new(0x1000),
                resources: DashMap::new(),
                callbacks: DashMap::new(),
                stats: Mutex::new(FakeStats::default()),
                attach_log: Mutex::new(Vec::new()),
                rejected: Mutex::new(HashSet::new()),
                parse_delay: Mutex::new(Duration::from_millis(20)),
                parse_outcome: Mutex::new(ParsedStatus::Done),
                save_meta_fails: AtomicBool::new(false),
            }),
        }
    }

    // ---- configuration ---------------------------------------------------

    pub fn set_parse_delay(&self, delay: Duration) {
        *self.inner.parse_delay.lock() = delay;
    }

    /// Terminal status reported when a simulated parse completes
    pub fn set_parse_outcome(&self, status: ParsedStatus) {
        *self.inner.parse_outcome.lock() = status;
    }

    /// Make attach fail for one event type, as a broken engine would
    pub fn reject_attach(&self, event: EventType) {
        self.inner.rejected.lock().insert(event);
    }

    pub fn set_save_meta_fails(&self, fails: bool) {
        self.inner.save_meta_fails.store(fails, Ordering::SeqCst);
    }

    pub fn set_duration(&self, media: NativeHandle, duration_ms: i64) {
        self.inner.with_media(media, |m| m.duration_ms = duration_ms);
    }

    pub fn set_media_type(&self, media: NativeHandle, media_type: MediaType) {
        self.inner.with_media(media, |m| m.media_type = media_type);
    }

    pub fn set_tracks(&self, media: NativeHandle, tracks: Vec<TrackInfo>) {
        self.inner.with_media(media, |m| m.tracks = tracks);
    }

    pub fn set_list_read_only(&self, list: NativeHandle, read_only: bool) {
        self.inner.with_list(list, |l| l.read_only = read_only);
    }

    // ---- inspection ------------------------------------------------------

    pub fn stats(&self) -> FakeStats {
        *self.inner.stats.lock()
    }

    /// Number of resources that are still alive
    pub fn live_handles(&self) -> usize {
        self.inner.resources.len()
    }

    pub fn live_handles_of(&self, kind: ResourceKind) -> usize {
        self.inner
            .resources
            .iter()
            .filter(|r| r.value().kind() == kind)
            .count()
    }

    pub fn refcount(&self, handle: NativeHandle) -> Option<u32> {
        self.inner.resources.get(&handle).map(|r| r.refcount)
    }

    pub fn attach_log(&self) -> Vec<(NativeHandle, EventType)> {
        self.inner.attach_log.lock().clone()
    }

    /// Callbacks currently attached for one code, for simulating an event
    /// that was already in flight when the manager detached
    pub fn callbacks_for(&self, resource: NativeHandle, event: EventType) -> Vec<NativeCallback> {
        self.inner
            .callbacks
            .get(&(resource, event))
            .map(|c| c.clone())
            .unwrap_or_default()
    }

    pub fn is_list_locked(&self, list: NativeHandle) -> bool {
        self.inner.with_list(list, |l| l.locks > 0).unwrap_or(false)
    }

    pub fn player_media_handle(&self, player: NativeHandle) -> Option<NativeHandle> {
        self.inner.with_player(player, |p| p.media).flatten()
    }

    // ---- event simulation ------------------------------------------------

    /// Raise an event on the calling thread
    pub fn emit(&self, source: NativeHandle, event_type: EventType, payload: RawPayload<'_>) {
        self.inner.emit(source, event_type, payload);
    }

    /// Add a child to `parent`'s sub-item list and raise the matching events
    ///
    /// The child is owned by the list; the returned handle is borrowed.
    pub fn add_subitem(&self, parent: NativeHandle, mrl: &str) -> Option<NativeHandle> {
        let list = self.inner.subitems_list(parent)?;
        let child = self.inner.create(Data::Media(MediaData {
            mrl: mrl.to_string(),
            duration_ms: -1,
            ..Default::default()
        }));

        let index = self.inner.with_list(list, |l| {
            l.items.push(child);
            l.items.len() as i32 - 1
        })?;
        self.inner.with_media(parent, |m| m.media_type = MediaType::Playlist);

        self.inner.emit(
            list,
            EventType::ListItemAdded,
            RawPayload::ListItem { item: child, index },
        );
        self.inner.emit(
            parent,
            EventType::MediaSubItemAdded,
            RawPayload::Media { item: child },
        );
        Some(child)
    }

    /// Simulate the player reaching the end of its media
    pub fn finish(&self, player: NativeHandle) {
        let media = self
            .inner
            .with_player(player, |p| {
                p.state = MediaState::Ended;
                p.media
            })
            .flatten();
        if let Some(media) = media {
            self.inner.with_media(media, |m| m.state = MediaState::Ended);
        }
        self.inner
            .emit(player, EventType::PlayerEndReached, RawPayload::None);
    }
}

impl Inner {
    fn allocate(&self) -> NativeHandle {
        let raw = self.next_id.fetch_add(1, Ordering::SeqCst);
        NativeHandle::from_raw(raw).unwrap_or_else(|| unreachable!("ids start above zero"))
    }

    fn create(&self, data: Data) -> NativeHandle {
        let handle = self.allocate();
        self.resources.insert(handle, Resource { refcount: 1, data });
        self.stats.lock().created += 1;
        handle
    }

    fn violation(&self, what: &str, handle: NativeHandle) {
        tracing::warn!("fake engine: {} on dead handle {}", what, handle);
        self.stats.lock().violations += 1;
    }

    fn retain(&self, handle: NativeHandle, kind: ResourceKind) {
        match self.resources.get_mut(&handle) {
            Some(mut r) if r.kind() == kind => {
                r.refcount += 1;
                drop(r);
                self.stats.lock().retained += 1;
            }
            _ => self.violation("retain", handle),
        }
    }

    fn release(&self, handle: NativeHandle, kind: ResourceKind) {
        let freed = match self.resources.get_mut(&handle) {
            Some(mut r) if r.kind() == kind => {
                r.refcount -= 1;
                r.refcount == 0
            }
            _ => {
                self.violation("release", handle);
                return;
            }
        };
        self.stats.lock().released += 1;

        if !freed {
            return;
        }
        let Some((_, resource)) = self.resources.remove(&handle) else {
            return;
        };
        self.callbacks.retain(|(h, _), _| *h != handle);

        // owned children are released after the map entry is gone
        match resource.data {
            Data::Media(m) => {
                if let Some(list) = m.subitems {
                    self.release(list, ResourceKind::MediaList);
                }
            }
            Data::List(l) => {
                for item in l.items {
                    self.release(item, ResourceKind::Media);
                }
            }
            Data::Player(p) => {
                if let Some(media) = p.media {
                    self.release(media, ResourceKind::Media);
                }
            }
        }
    }

    fn with_media<R>(&self, handle: NativeHandle, f: impl FnOnce(&mut MediaData) -> R) -> Option<R> {
        let result = match self.resources.get_mut(&handle) {
            Some(mut r) => match &mut r.data {
                Data::Media(m) => Some(f(m)),
                _ => None,
            },
            None => None,
        };
        if result.is_none() {
            self.violation("media call", handle);
        }
        result
    }

    fn with_list<R>(&self, handle: NativeHandle, f: impl FnOnce(&mut ListData) -> R) -> Option<R> {
        let result = match self.resources.get_mut(&handle) {
            Some(mut r) => match &mut r.data {
                Data::List(l) => Some(f(l)),
                _ => None,
            },
            None => None,
        };
        if result.is_none() {
            self.violation("list call", handle);
        }
        result
    }

    fn with_player<R>(
        &self,
        handle: NativeHandle,
        f: impl FnOnce(&mut PlayerData) -> R,
    ) -> Option<R> {
        let result = match self.resources.get_mut(&handle) {
            Some(mut r) => match &mut r.data {
                Data::Player(p) => Some(f(p)),
                _ => None,
            },
            None => None,
        };
        if result.is_none() {
            self.violation("player call", handle);
        }
        result
    }

    /// The media's own child list, created on first use (not retained)
    fn subitems_list(&self, media: NativeHandle) -> Option<NativeHandle> {
        if let Some(existing) = self.with_media(media, |m| m.subitems)? {
            return Some(existing);
        }
        let list = self.create(Data::List(ListData::default()));
        self.with_media(media, |m| m.subitems = Some(list));
        Some(list)
    }

    fn emit(&self, source: NativeHandle, event_type: EventType, payload: RawPayload<'_>) {
        // snapshot first so callbacks may call back into the engine
        let callbacks = self
            .callbacks
            .get(&(source, event_type))
            .map(|c| c.clone())
            .unwrap_or_default();

        let event = RawEvent {
            event_type,
            source,
            payload,
        };
        for callback in callbacks {
            callback(&event);
        }
    }

    fn complete_parse(&self, media: NativeHandle) {
        let outcome = *self.parse_outcome.lock();
        let completed = self
            .resources
            .get_mut(&media)
            .and_then(|mut r| match &mut r.data {
                Data::Media(m) if m.parsed == ParsedStatus::Pending => {
                    m.parsed = outcome;
                    Some(m.duration_ms)
                }
                _ => None,
            });

        if let Some(duration_ms) = completed {
            if outcome == ParsedStatus::Done && duration_ms >= 0 {
                self.emit(
                    media,
                    EventType::MediaDurationChanged,
                    RawPayload::Duration { duration_ms },
                );
            }
            self.emit(
                media,
                EventType::MediaParsedChanged,
                RawPayload::ParsedStatus {
                    status: outcome.code(),
                },
            );
        }
    }

    fn cancel_parse(&self, media: NativeHandle) {
        let cancelled = self
            .resources
            .get_mut(&media)
            .map(|mut r| match &mut r.data {
                Data::Media(m) if m.parsed == ParsedStatus::Pending => {
                    m.parsed = ParsedStatus::Cancelled;
                    true
                }
                _ => false,
            })
            .unwrap_or(false);

        if cancelled {
            self.emit(
                media,
                EventType::MediaParsedChanged,
                RawPayload::ParsedStatus {
                    status: ParsedStatus::Cancelled.code(),
                },
            );
        }
    }

    fn run_playback(&self, player: NativeHandle, media: NativeHandle) {
        let mrl = self.with_media(media, |m| m.mrl.clone()).unwrap_or_default();

        self.emit(player, EventType::PlayerOpening, RawPayload::None);

        if mrl.starts_with(ERROR_SCHEME) {
            self.with_player(player, |p| p.state = MediaState::Error);
            self.with_media(media, |m| m.state = MediaState::Error);
            self.emit(player, EventType::PlayerEncounteredError, RawPayload::None);
        } else {
            self.with_player(player, |p| p.state = MediaState::Playing);
            self.with_media(media, |m| m.state = MediaState::Playing);
            self.emit(player, EventType::PlayerPlaying, RawPayload::None);
        }
    }
}

impl NativeEngine for FakeEngine {
    fn version(&self) -> EngineVersion {
        self.inner.version
    }

    fn media_new_location(&self, mrl: &str) -> Option<NativeHandle> {
        if mrl.is_empty() || !mrl.contains("://") {
            return None;
        }
        Some(self.inner.create(Data::Media(MediaData {
            mrl: mrl.to_string(),
            duration_ms: -1,
            ..Default::default()
        })))
    }

    fn media_new_path(&self, path: &str) -> Option<NativeHandle> {
        if path.is_empty() {
            return None;
        }
        Some(self.inner.create(Data::Media(MediaData {
            mrl: format!("file://{}", path),
            duration_ms: -1,
            media_type: MediaType::File,
            ..Default::default()
        })))
    }

    fn media_new_as_node(&self, name: &str) -> Option<NativeHandle> {
        Some(self.inner.create(Data::Media(MediaData {
            mrl: format!("vlc://nop/{}", name),
            node: true,
            duration_ms: -1,
            media_type: MediaType::Playlist,
            ..Default::default()
        })))
    }

    fn media_retain(&self, media: NativeHandle) {
        self.inner.retain(media, ResourceKind::Media);
    }

    fn media_release(&self, media: NativeHandle) {
        self.inner.release(media, ResourceKind::Media);
    }

    fn media_duplicate(&self, media: NativeHandle) -> Option<NativeHandle> {
        let copy = self.inner.with_media(media, |m| {
            if m.node {
                None
            } else {
                Some(MediaData {
                    mrl: m.mrl.clone(),
                    options: m.options.clone(),
                    meta: m.meta.clone(),
                    duration_ms: m.duration_ms,
                    media_type: m.media_type,
                    ..Default::default()
                })
            }
        })??;
        Some(self.inner.create(Data::Media(copy)))
    }

    fn media_mrl(&self, media: NativeHandle) -> Option<String> {
        self.inner.with_media(media, |m| m.mrl.clone())
    }

    fn media_add_option(&self, media: NativeHandle, option: &str) {
        self.inner
            .with_media(media, |m| m.options.push(option.to_string()));
    }

    fn media_options(&self, media: NativeHandle) -> Vec<String> {
        self.inner
            .with_media(media, |m| m.options.clone())
            .unwrap_or_default()
    }

    fn media_meta(&self, media: NativeHandle, meta: Meta) -> Option<String> {
        self.inner
            .with_media(media, |m| m.meta.get(&meta).cloned())
            .flatten()
    }

    fn media_set_meta(&self, media: NativeHandle, meta: Meta, value: &str) {
        let set = self
            .inner
            .with_media(media, |m| m.meta.insert(meta, value.to_string()))
            .is_some();
        if set {
            self.inner.emit(
                media,
                EventType::MediaMetaChanged,
                RawPayload::Meta { meta: meta.code() },
            );
        }
    }

    fn media_save_meta(&self, media: NativeHandle) -> Result<()> {
        self.inner
            .with_media(media, |_| ())
            .ok_or(NativeError::Status {
                call: "media_save_meta",
                status: -1,
            })?;
        if self.inner.save_meta_fails.load(Ordering::SeqCst) {
            return Err(NativeError::Status {
                call: "media_save_meta",
                status: -1,
            });
        }
        Ok(())
    }

    fn media_duration(&self, media: NativeHandle) -> i64 {
        self.inner.with_media(media, |m| m.duration_ms).unwrap_or(-1)
    }

    fn media_type(&self, media: NativeHandle) -> MediaType {
        self.inner
            .with_media(media, |m| m.media_type)
            .unwrap_or_default()
    }

    fn media_state(&self, media: NativeHandle) -> MediaState {
        self.inner.with_media(media, |m| m.state).unwrap_or_default()
    }

    fn media_tracks(&self, media: NativeHandle) -> Vec<TrackInfo> {
        self.inner
            .with_media(media, |m| m.tracks.clone())
            .unwrap_or_default()
    }

    fn media_parse(&self, media: NativeHandle, _flags: ParseFlags, _timeout_ms: i32) -> Result<()> {
        let started = self
            .inner
            .with_media(media, |m| match m.parsed {
                // already parsed or in progress: accepted, nothing happens
                ParsedStatus::None => {
                    m.parsed = ParsedStatus::Pending;
                    true
                }
                _ => false,
            })
            .ok_or(NativeError::Status {
                call: "media_parse",
                status: -1,
            })?;

        if started {
            let inner = Arc::clone(&self.inner);
            let delay = *self.inner.parse_delay.lock();
            thread::spawn(move || {
                thread::sleep(delay);
                inner.complete_parse(media);
            });
        }
        Ok(())
    }

    fn media_parse_stop(&self, media: NativeHandle) {
        let inner = Arc::clone(&self.inner);
        thread::spawn(move || inner.cancel_parse(media));
    }

    fn media_parsed_status(&self, media: NativeHandle) -> ParsedStatus {
        self.inner
            .with_media(media, |m| m.parsed)
            .unwrap_or_default()
    }

    fn media_subitems(&self, media: NativeHandle) -> Option<NativeHandle> {
        let list = self.inner.subitems_list(media)?;
        self.inner.retain(list, ResourceKind::MediaList);
        Some(list)
    }

    fn media_add_slave(
        &self,
        media: NativeHandle,
        kind: SlaveType,
        priority: u32,
        uri: &str,
    ) -> Result<()> {
        if uri.is_empty() || priority > 4 {
            return Err(NativeError::Status {
                call: "media_add_slave",
                status: -1,
            });
        }
        self.inner
            .with_media(media, |m| {
                m.slaves.push(Slave {
                    kind,
                    priority,
                    uri: uri.to_string(),
                })
            })
            .ok_or(NativeError::Status {
                call: "media_add_slave",
                status: -1,
            })
    }

    fn media_clear_slaves(&self, media: NativeHandle) {
        self.inner.with_media(media, |m| m.slaves.clear());
    }

    fn media_slaves(&self, media: NativeHandle) -> Vec<Slave> {
        self.inner
            .with_media(media, |m| m.slaves.clone())
            .unwrap_or_default()
    }

    fn list_new(&self) -> Option<NativeHandle> {
        Some(self.inner.create(Data::List(ListData::default())))
    }

    fn list_retain(&self, list: NativeHandle) {
        self.inner.retain(list, ResourceKind::MediaList);
    }

    fn list_release(&self, list: NativeHandle) {
        self.inner.release(list, ResourceKind::MediaList);
    }

    fn list_lock(&self, list: NativeHandle) {
        self.inner.with_list(list, |l| l.locks += 1);
    }

    fn list_unlock(&self, list: NativeHandle) {
        self.inner
            .with_list(list, |l| l.locks = l.locks.saturating_sub(1));
    }

    fn list_count(&self, list: NativeHandle) -> i32 {
        self.inner
            .with_list(list, |l| l.items.len() as i32)
            .unwrap_or(-1)
    }

    fn list_item_at(&self, list: NativeHandle, index: i32) -> Option<NativeHandle> {
        let item = self
            .inner
            .with_list(list, |l| usize::try_from(index).ok().and_then(|i| l.items.get(i).copied()))
            .flatten()?;
        self.inner.retain(item, ResourceKind::Media);
        Some(item)
    }

    fn list_add(&self, list: NativeHandle, media: NativeHandle) -> Result<()> {
        let count = self.list_count(list);
        self.list_insert(list, media, count.max(0))
    }

    fn list_insert(&self, list: NativeHandle, media: NativeHandle, index: i32) -> Result<()> {
        let failure = NativeError::Status {
            call: "list_insert",
            status: -1,
        };
        let insertable = self
            .inner
            .with_list(list, |l| {
                !l.read_only && index >= 0 && (index as usize) <= l.items.len()
            })
            .unwrap_or(false);
        if !insertable {
            return Err(failure);
        }

        self.inner
            .emit(list, EventType::ListWillAddItem, RawPayload::ListItem { item: media, index });
        self.inner.retain(media, ResourceKind::Media);
        self.inner
            .with_list(list, |l| l.items.insert(index as usize, media))
            .ok_or(failure)?;
        self.inner
            .emit(list, EventType::ListItemAdded, RawPayload::ListItem { item: media, index });
        Ok(())
    }

    fn list_remove(&self, list: NativeHandle, index: i32) -> Result<()> {
        let failure = NativeError::Status {
            call: "list_remove",
            status: -1,
        };
        let item = self
            .inner
            .with_list(list, |l| {
                if l.read_only {
                    None
                } else {
                    usize::try_from(index).ok().and_then(|i| l.items.get(i).copied())
                }
            })
            .flatten()
            .ok_or(failure.clone())?;

        self.inner.emit(
            list,
            EventType::ListWillDeleteItem,
            RawPayload::ListItem { item, index },
        );
        self.inner
            .with_list(list, |l| l.items.remove(index as usize))
            .ok_or(failure)?;
        self.inner
            .emit(list, EventType::ListItemDeleted, RawPayload::ListItem { item, index });
        self.inner.release(item, ResourceKind::Media);
        Ok(())
    }

    fn list_index_of(&self, list: NativeHandle, media: NativeHandle) -> i32 {
        self.inner
            .with_list(list, |l| {
                l.items
                    .iter()
                    .position(|h| *h == media)
                    .map_or(-1, |i| i as i32)
            })
            .unwrap_or(-1)
    }

    fn list_is_read_only(&self, list: NativeHandle) -> bool {
        self.inner.with_list(list, |l| l.read_only).unwrap_or(true)
    }

    fn player_new(&self) -> Option<NativeHandle> {
        Some(self.inner.create(Data::Player(PlayerData::default())))
    }

    fn player_retain(&self, player: NativeHandle) {
        self.inner.retain(player, ResourceKind::MediaPlayer);
    }

    fn player_release(&self, player: NativeHandle) {
        self.inner.release(player, ResourceKind::MediaPlayer);
    }

    fn player_set_media(&self, player: NativeHandle, media: Option<NativeHandle>) {
        if let Some(media) = media {
            self.inner.retain(media, ResourceKind::Media);
        }
        let previous = self.inner.with_player(player, |p| {
            p.state = MediaState::NothingSpecial;
            std::mem::replace(&mut p.media, media)
        });
        let Some(previous) = previous else {
            // dead player: undo the retain taken for it
            if let Some(media) = media {
                self.inner.release(media, ResourceKind::Media);
            }
            return;
        };
        if let Some(old) = previous {
            self.inner.release(old, ResourceKind::Media);
        }
        if let Some(media) = media {
            self.inner.emit(
                player,
                EventType::PlayerMediaChanged,
                RawPayload::Media { item: media },
            );
        }
    }

    fn player_media(&self, player: NativeHandle) -> Option<NativeHandle> {
        let media = self.inner.with_player(player, |p| p.media).flatten()?;
        self.inner.retain(media, ResourceKind::Media);
        Some(media)
    }

    fn player_play(&self, player: NativeHandle) -> Result<()> {
        let media = self
            .inner
            .with_player(player, |p| {
                p.state = MediaState::Opening;
                p.media
            })
            .flatten()
            .ok_or(NativeError::Status {
                call: "player_play",
                status: -1,
            })?;

        let inner = Arc::clone(&self.inner);
        thread::spawn(move || inner.run_playback(player, media));
        Ok(())
    }

    fn player_pause(&self, player: NativeHandle, pause: bool) {
        let changed = self
            .inner
            .with_player(player, |p| match (p.state, pause) {
                (MediaState::Playing, true) => {
                    p.state = MediaState::Paused;
                    Some(EventType::PlayerPaused)
                }
                (MediaState::Paused, false) => {
                    p.state = MediaState::Playing;
                    Some(EventType::PlayerPlaying)
                }
                _ => None,
            })
            .flatten();
        if let Some(event) = changed {
            self.inner.emit(player, event, RawPayload::None);
        }
    }

    fn player_stop(&self, player: NativeHandle) {
        let stopped = self
            .inner
            .with_player(player, |p| {
                let was_active = !matches!(p.state, MediaState::NothingSpecial | MediaState::Stopped);
                p.state = MediaState::Stopped;
                was_active
            })
            .unwrap_or(false);
        if stopped {
            self.inner
                .emit(player, EventType::PlayerStopped, RawPayload::None);
        }
    }

    fn player_is_playing(&self, player: NativeHandle) -> bool {
        self.inner
            .with_player(player, |p| p.state == MediaState::Playing)
            .unwrap_or(false)
    }

    fn player_state(&self, player: NativeHandle) -> MediaState {
        self.inner.with_player(player, |p| p.state).unwrap_or_default()
    }

    fn event_attach(
        &self,
        resource: NativeHandle,
        event: EventType,
        callback: NativeCallback,
    ) -> Result<()> {
        self.inner.attach_log.lock().push((resource, event));

        if event.since() > self.inner.version {
            self.inner.stats.lock().undefined_attaches += 1;
            return Err(NativeError::AttachRejected(event));
        }
        if self.inner.rejected.lock().contains(&event) {
            return Err(NativeError::AttachRejected(event));
        }
        if !self.inner.resources.contains_key(&resource) {
            self.inner.violation("attach", resource);
            return Err(NativeError::AttachRejected(event));
        }

        self.inner
            .callbacks
            .entry((resource, event))
            .or_default()
            .push(callback);
        self.inner.stats.lock().attached += 1;
        Ok(())
    }

    fn event_detach(&self, resource: NativeHandle, event: EventType, callback: &NativeCallback) {
        let removed = self
            .inner
            .callbacks
            .get_mut(&(resource, event))
            .map(|mut callbacks| {
                let before = callbacks.len();
                callbacks.retain(|c| !Arc::ptr_eq(c, callback));
                before != callbacks.len()
            })
            .unwrap_or(false);
        if removed {
            self.inner.stats.lock().detached += 1;
        }
    }
}
