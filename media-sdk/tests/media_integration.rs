//! Media, media list and configuration behaviour against the fake engine

use std::sync::Arc;
use std::time::Duration;

use crossbeam::channel::{bounded, unbounded, Receiver, Sender};
use media_native::fake::FakeEngine;
use media_native::{EventType, RawPayload};
use media_sdk::{
    MediaEventListener, MediaPlayerFactory, MediaRef, MediaType, Meta, ParsedStatus, SdkConfig,
    SdkError, SlaveType,
};

const TIMEOUT: Duration = Duration::from_secs(2);

fn setup() -> (FakeEngine, MediaPlayerFactory) {
    let fake = FakeEngine::new();
    let factory = MediaPlayerFactory::new(Arc::new(fake.clone()));
    (fake, factory)
}

#[derive(Debug, PartialEq)]
enum Seen {
    Parsed(ParsedStatus),
    Duration(Option<Duration>),
    SubItem(Option<String>),
    Meta(Meta),
}

struct Recorder(Sender<Seen>);

impl MediaEventListener for Recorder {
    fn parsed_changed(&self, status: ParsedStatus) {
        let _ = self.0.send(Seen::Parsed(status));
    }

    fn duration_changed(&self, duration: Option<Duration>) {
        let _ = self.0.send(Seen::Duration(duration));
    }

    fn sub_item_added(&self, item: &MediaRef) {
        let _ = self.0.send(Seen::SubItem(item.mrl()));
    }

    fn meta_changed(&self, meta: Meta) {
        let _ = self.0.send(Seen::Meta(meta));
    }
}

fn recorder() -> (Arc<dyn MediaEventListener>, Receiver<Seen>) {
    let (tx, rx) = unbounded();
    (Arc::new(Recorder(tx)), rx)
}

fn next_parsed(rx: &Receiver<Seen>) -> ParsedStatus {
    loop {
        match rx.recv_timeout(TIMEOUT).expect("parsed_changed") {
            Seen::Parsed(status) => return status,
            _ => continue,
        }
    }
}

#[test]
fn test_parse_goes_pending_then_done() {
    let (fake, factory) = setup();
    let media = factory.new_media("http://example.com/a.mp3", &[]).unwrap();
    fake.set_duration(media.native_handle(), 90_000);
    let (listener, rx) = recorder();
    media.events.add_listener(listener).unwrap();

    assert_eq!(media.parsing.status(), ParsedStatus::None);
    assert!(media.parsing.parse());
    assert_eq!(media.parsing.status(), ParsedStatus::Pending);

    assert_eq!(
        rx.recv_timeout(TIMEOUT).unwrap(),
        Seen::Duration(Some(Duration::from_secs(90)))
    );
    assert_eq!(next_parsed(&rx), ParsedStatus::Done);
    assert!(media.parsing.is_parsed());
    assert_eq!(media.info.duration(), Some(Duration::from_secs(90)));

    // accepted again, nothing changes
    assert!(media.parsing.parse());
    assert_eq!(media.parsing.status(), ParsedStatus::Done);
}

#[test]
fn test_terminal_parse_status_is_final() {
    let (fake, factory) = setup();
    fake.set_parse_outcome(ParsedStatus::Timeout);
    let media = factory.new_media("http://example.com/slow.mp3", &[]).unwrap();
    let (listener, rx) = recorder();
    media.events.add_listener(listener).unwrap();

    assert!(media.parsing.parse_with(
        media_sdk::ParseFlags::NETWORK,
        Some(Duration::from_millis(100))
    ));
    assert_eq!(next_parsed(&rx), ParsedStatus::Timeout);

    // a late report still reaches listeners but not the status
    fake.emit(
        media.native_handle(),
        EventType::MediaParsedChanged,
        RawPayload::ParsedStatus {
            status: ParsedStatus::Done.code(),
        },
    );
    assert_eq!(next_parsed(&rx), ParsedStatus::Done);
    assert_eq!(media.parsing.status(), ParsedStatus::Timeout);
}

#[test]
fn test_parse_stop_cancels() {
    let (fake, factory) = setup();
    fake.set_parse_delay(Duration::from_millis(500));
    let media = factory.new_media("http://example.com/a.mp3", &[]).unwrap();
    let (listener, rx) = recorder();
    media.events.add_listener(listener).unwrap();

    assert!(media.parsing.parse());
    media.parsing.stop();
    assert_eq!(next_parsed(&rx), ParsedStatus::Cancelled);
    assert_eq!(media.parsing.status(), ParsedStatus::Cancelled);
}

#[test]
fn test_sub_items_are_listed_and_announced() {
    let (fake, factory) = setup();
    let playlist = factory.new_media("http://example.com/list.m3u", &[]).unwrap();
    let (listener, rx) = recorder();
    playlist.events.add_listener(listener).unwrap();

    fake.add_subitem(playlist.native_handle(), "http://example.com/1.mp3");
    fake.add_subitem(playlist.native_handle(), "http://example.com/2.mp3");

    assert_eq!(
        rx.recv_timeout(TIMEOUT).unwrap(),
        Seen::SubItem(Some("http://example.com/1.mp3".to_string()))
    );
    assert_eq!(
        rx.recv_timeout(TIMEOUT).unwrap(),
        Seen::SubItem(Some("http://example.com/2.mp3".to_string()))
    );

    assert_eq!(playlist.info.media_type(), MediaType::Playlist);
    assert_eq!(playlist.subitems.count(), 2);
    let mrls: Vec<_> = playlist
        .subitems
        .refs()
        .iter()
        .filter_map(MediaRef::mrl)
        .collect();
    assert_eq!(mrls, vec!["http://example.com/1.mp3", "http://example.com/2.mp3"]);

    drop(playlist);
    assert_eq!(fake.live_handles(), 0);
    assert_eq!(fake.stats().violations, 0);
}

/// Holds the dispatch thread on the first `meta_changed` until the gate opens
struct MetaGate {
    started: Sender<()>,
    open: Receiver<()>,
    seen: Sender<Seen>,
}

impl MediaEventListener for MetaGate {
    fn meta_changed(&self, meta: Meta) {
        if meta == Meta::Title {
            let _ = self.started.send(());
            let _ = self.open.recv_timeout(TIMEOUT);
        }
        let _ = self.seen.send(Seen::Meta(meta));
    }

    fn sub_item_added(&self, item: &MediaRef) {
        let _ = self.seen.send(Seen::SubItem(item.mrl()));
    }
}

#[test]
fn test_full_queue_takes_no_reference() {
    let fake = FakeEngine::new();
    let mut config = SdkConfig::default();
    config.event_manager.queue_capacity = Some(1);
    let factory = MediaPlayerFactory::with_config(Arc::new(fake.clone()), config).unwrap();
    let playlist = factory.new_media("http://example.com/list.m3u", &[]).unwrap();

    let (started_tx, started) = unbounded();
    let (open_tx, open) = bounded(1);
    let (seen_tx, seen) = unbounded();
    playlist
        .events
        .add_listener(Arc::new(MetaGate {
            started: started_tx,
            open,
            seen: seen_tx,
        }))
        .unwrap();

    playlist.meta.set(Meta::Title, "list");
    started.recv_timeout(TIMEOUT).unwrap();
    playlist.meta.set(Meta::Artist, "queued");

    // dropped at the full queue, owned by the child list only
    let child = fake
        .add_subitem(playlist.native_handle(), "http://example.com/1.mp3")
        .unwrap();
    assert_eq!(fake.refcount(child), Some(1));

    open_tx.send(()).unwrap();
    assert_eq!(seen.recv_timeout(TIMEOUT).unwrap(), Seen::Meta(Meta::Title));
    assert_eq!(seen.recv_timeout(TIMEOUT).unwrap(), Seen::Meta(Meta::Artist));
    assert!(seen.recv_timeout(Duration::from_millis(100)).is_err());
    assert_eq!(fake.refcount(child), Some(1));

    drop(playlist);
    assert_eq!(fake.live_handles(), 0);
    assert_eq!(fake.stats().violations, 0);
}

#[test]
fn test_meta_read_write() {
    let (fake, factory) = setup();
    let media = factory.new_media("file:///music/song.flac", &[]).unwrap();
    let (listener, rx) = recorder();
    media.events.add_listener(listener).unwrap();

    media.meta.set(Meta::Title, "Song");
    media.meta.set(Meta::Artist, "Band");
    assert_eq!(rx.recv_timeout(TIMEOUT).unwrap(), Seen::Meta(Meta::Title));
    assert_eq!(rx.recv_timeout(TIMEOUT).unwrap(), Seen::Meta(Meta::Artist));

    assert_eq!(media.meta.get(Meta::Title).as_deref(), Some("Song"));
    let all = media.meta.all();
    assert_eq!(all.len(), 2);
    assert_eq!(all.get(Meta::Artist), Some("Band"));
    assert!(media.meta.save());

    fake.set_save_meta_fails(true);
    assert!(!media.meta.save());
}

#[test]
fn test_slaves() {
    let (_fake, factory) = setup();
    let media = factory.new_media("file:///movies/a.mkv", &[]).unwrap();

    assert!(media.slaves.add(SlaveType::Subtitle, 4, "file:///movies/a.srt"));
    assert!(!media.slaves.add(SlaveType::Audio, 9, "file:///movies/a.ac3"));
    assert_eq!(media.slaves.list().len(), 1);
    media.slaves.clear();
    assert!(media.slaves.list().is_empty());
}

#[test]
fn test_released_media_is_inert() {
    let (fake, factory) = setup();
    let media = factory.new_media("http://example.com/a.mp3", &[]).unwrap();
    media.release();

    assert!(media.info.mrl().is_none());
    assert!(media.options.list().is_empty());
    assert!(!media.parsing.parse());
    assert!(!media.meta.save());
    assert!(media.subitems.list().is_none());
    let (listener, _rx) = recorder();
    assert!(matches!(media.events.add_listener(listener), Err(SdkError::InvalidState(_))));

    media.release();
    assert_eq!(fake.stats().released, 1);
    assert_eq!(fake.stats().violations, 0);
}

#[test]
fn test_list_holds_its_own_reference() {
    let (fake, factory) = setup();
    let list = factory.new_media_list().unwrap();
    let media = factory.new_media("http://example.com/a.mp3", &[]).unwrap();
    let handle = media.native_handle();

    assert!(list.add(&media));
    media.release();
    assert_eq!(fake.refcount(handle), Some(1));

    let item = list.get(0).unwrap();
    assert_eq!(item.mrl().as_deref(), Some("http://example.com/a.mp3"));
    drop(item);
    drop(list);
    assert_eq!(fake.live_handles(), 0);
}

#[test]
fn test_config_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");

    let config = SdkConfig::strict_start()
        .with_default_options([":network-caching=300"])
        .with_sub_items(false, true);
    std::fs::write(&path, config.to_json().unwrap()).unwrap();
    assert_eq!(SdkConfig::from_file(&path).unwrap(), config);

    std::fs::write(&path, "{ \"start_timeout\": 0 }").unwrap();
    assert!(SdkConfig::from_file(&path).is_err());
    assert!(SdkConfig::from_file(dir.path().join("missing.json")).is_err());
}
