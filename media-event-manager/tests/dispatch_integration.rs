//! Integration tests for the media-event-manager crate.
//!
//! These tests drive an EventManager from the instrumented fake engine:
//! - Total ordering and last-added-first-notified delivery
//! - Listener registration changes from inside a listener
//! - Listener fault containment
//! - Attach range capping and attach failures
//! - Teardown while native events are still in flight

use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

use crossbeam::channel::{self, Receiver, Sender};
use media_event_manager::{DomainEvent, EventManager, EventManagerConfig, EventManagerError};
use media_native::fake::FakeEngine;
use media_native::{
    EngineVersion, EventType, NativeEngine, NativeHandle, RawEvent, RawPayload, ResourceKind,
};

const WAIT: Duration = Duration::from_secs(2);
const QUIET: Duration = Duration::from_millis(150);

#[derive(Debug, Clone, PartialEq)]
enum TestEvent {
    Meta(u32),
    Parsed(u32),
    Synthetic(&'static str),
}

trait TestListener: Send + Sync {
    fn on_event(&self, event: &TestEvent);
}

impl DomainEvent for TestEvent {
    type Listener = dyn TestListener;

    fn notify(&self, listener: &dyn TestListener) {
        listener.on_event(self);
    }

    fn name(&self) -> &'static str {
        "test"
    }
}

fn translate(raw: &RawEvent<'_>) -> Option<TestEvent> {
    match raw.payload {
        RawPayload::Meta { meta } => Some(TestEvent::Meta(meta)),
        RawPayload::ParsedStatus { status } => Some(TestEvent::Parsed(status)),
        _ => None,
    }
}

/// Forwards every notification, tagged with its id, to a channel
struct Recorder {
    id: &'static str,
    tx: Sender<(&'static str, TestEvent)>,
}

impl TestListener for Recorder {
    fn on_event(&self, event: &TestEvent) {
        let _ = self.tx.send((self.id, event.clone()));
    }
}

fn recorder(id: &'static str, tx: &Sender<(&'static str, TestEvent)>) -> Arc<dyn TestListener> {
    Arc::new(Recorder { id, tx: tx.clone() })
}

fn setup(engine: &FakeEngine) -> (NativeHandle, EventManager<TestEvent>) {
    let media = engine
        .media_new_location("http://example.com/a.mp3")
        .expect("fake engine creates media");
    let native: Arc<dyn NativeEngine> = Arc::new(engine.clone());
    let manager = EventManager::new(
        native,
        media,
        ResourceKind::Media,
        &EventManagerConfig::default(),
        translate,
    )
    .expect("Failed to create event manager");
    (media, manager)
}

fn collect(rx: &Receiver<(&'static str, TestEvent)>, n: usize) -> Vec<(&'static str, TestEvent)> {
    (0..n)
        .map(|_| rx.recv_timeout(WAIT).expect("Timeout waiting for event"))
        .collect()
}

/// Both listeners observe E1 before either observes E2, and the later
/// listener is notified first
#[test]
fn test_total_order_and_reverse_registration() {
    let engine = FakeEngine::new();
    let (media, manager) = setup(&engine);
    let (tx, rx) = channel::unbounded();

    manager.add_listener(recorder("l1", &tx));
    manager.add_listener(recorder("l2", &tx));

    engine.emit(media, EventType::MediaMetaChanged, RawPayload::Meta { meta: 1 });
    engine.emit(media, EventType::MediaMetaChanged, RawPayload::Meta { meta: 2 });

    assert_eq!(
        collect(&rx, 4),
        vec![
            ("l2", TestEvent::Meta(1)),
            ("l1", TestEvent::Meta(1)),
            ("l2", TestEvent::Meta(2)),
            ("l1", TestEvent::Meta(2)),
        ]
    );
    manager.release();
}

/// Events raised from several engine threads are each delivered exactly once
#[test]
fn test_concurrent_native_threads() {
    let engine = FakeEngine::new();
    let (media, manager) = setup(&engine);
    let (tx, rx) = channel::unbounded();
    manager.add_listener(recorder("l", &tx));

    let threads: Vec<_> = (0..4u32)
        .map(|t| {
            let engine = engine.clone();
            std::thread::spawn(move || {
                for i in 0..25u32 {
                    engine.emit(
                        media,
                        EventType::MediaMetaChanged,
                        RawPayload::Meta { meta: t * 100 + i },
                    );
                }
            })
        })
        .collect();
    for thread in threads {
        thread.join().expect("emitter thread panicked");
    }

    let mut seen: Vec<u32> = collect(&rx, 100)
        .into_iter()
        .map(|(_, e)| match e {
            TestEvent::Meta(m) => m,
            other => panic!("unexpected {:?}", other),
        })
        .collect();
    seen.sort_unstable();
    seen.dedup();
    assert_eq!(seen.len(), 100);
    assert!(rx.recv_timeout(QUIET).is_err());
}

/// Removes itself on its first notification
struct SelfRemoving {
    manager: OnceLock<Arc<EventManager<TestEvent>>>,
    me: Mutex<Option<Arc<dyn TestListener>>>,
    tx: Sender<(&'static str, TestEvent)>,
}

impl TestListener for SelfRemoving {
    fn on_event(&self, event: &TestEvent) {
        let me = self.me.lock().expect("poisoned").take();
        if let (Some(me), Some(manager)) = (me, self.manager.get()) {
            assert!(manager.remove_listener(&me));
        }
        let _ = self.tx.send(("self", event.clone()));
    }
}

#[test]
fn test_self_removal_during_notification() {
    let engine = FakeEngine::new();
    let (media, manager) = setup(&engine);
    let manager = Arc::new(manager);
    let (tx, rx) = channel::unbounded();

    manager.add_listener(recorder("other", &tx));
    let remover = Arc::new(SelfRemoving {
        manager: OnceLock::new(),
        me: Mutex::new(None),
        tx: tx.clone(),
    });
    let remover_dyn: Arc<dyn TestListener> = remover.clone();
    let _ = remover.manager.set(Arc::clone(&manager));
    *remover.me.lock().expect("poisoned") = Some(remover_dyn.clone());
    manager.add_listener(remover_dyn);

    engine.emit(media, EventType::MediaMetaChanged, RawPayload::Meta { meta: 1 });
    engine.emit(media, EventType::MediaMetaChanged, RawPayload::Meta { meta: 2 });

    assert_eq!(
        collect(&rx, 3),
        vec![
            ("self", TestEvent::Meta(1)),
            ("other", TestEvent::Meta(1)),
            ("other", TestEvent::Meta(2)),
        ]
    );
    assert!(rx.recv_timeout(QUIET).is_err());
    assert_eq!(manager.listener_count(), 1);
    manager.release();
}

/// Adds another listener from inside a notification
struct Adder {
    manager: OnceLock<Arc<EventManager<TestEvent>>>,
    pending: Mutex<Option<Arc<dyn TestListener>>>,
}

impl TestListener for Adder {
    fn on_event(&self, _event: &TestEvent) {
        let pending = self.pending.lock().expect("poisoned").take();
        if let (Some(listener), Some(manager)) = (pending, self.manager.get()) {
            manager.add_listener(listener);
        }
    }
}

#[test]
fn test_listener_added_during_dispatch_sees_next_event_only() {
    let engine = FakeEngine::new();
    let (media, manager) = setup(&engine);
    let manager = Arc::new(manager);
    let (tx, rx) = channel::unbounded();

    let adder = Arc::new(Adder {
        manager: OnceLock::new(),
        pending: Mutex::new(Some(recorder("late", &tx))),
    });
    let _ = adder.manager.set(Arc::clone(&manager));
    manager.add_listener(adder);

    engine.emit(media, EventType::MediaMetaChanged, RawPayload::Meta { meta: 1 });
    engine.emit(media, EventType::MediaMetaChanged, RawPayload::Meta { meta: 2 });

    assert_eq!(collect(&rx, 1), vec![("late", TestEvent::Meta(2))]);
    assert!(rx.recv_timeout(QUIET).is_err());
    manager.release();
}

struct Panicker;

impl TestListener for Panicker {
    fn on_event(&self, _event: &TestEvent) {
        panic!("listener failure");
    }
}

#[test]
fn test_panicking_listener_is_contained() {
    let engine = FakeEngine::new();
    let (media, manager) = setup(&engine);
    let (tx, rx) = channel::unbounded();

    manager.add_listener(recorder("survivor", &tx));
    manager.add_listener(Arc::new(Panicker));

    engine.emit(media, EventType::MediaMetaChanged, RawPayload::Meta { meta: 1 });
    engine.emit(media, EventType::MediaParsedChanged, RawPayload::ParsedStatus { status: 4 });

    assert_eq!(
        collect(&rx, 2),
        vec![("survivor", TestEvent::Meta(1)), ("survivor", TestEvent::Parsed(4))]
    );
    manager.release();
}

#[test]
fn test_raise_shares_order_with_native_events() {
    let engine = FakeEngine::new();
    let (media, manager) = setup(&engine);
    let (tx, rx) = channel::unbounded();
    manager.add_listener(recorder("l", &tx));

    engine.emit(media, EventType::MediaMetaChanged, RawPayload::Meta { meta: 1 });
    manager
        .raise(TestEvent::Synthetic("between"))
        .expect("raise on live manager");
    engine.emit(media, EventType::MediaMetaChanged, RawPayload::Meta { meta: 2 });

    assert_eq!(
        collect(&rx, 3),
        vec![
            ("l", TestEvent::Meta(1)),
            ("l", TestEvent::Synthetic("between")),
            ("l", TestEvent::Meta(2)),
        ]
    );
    manager.release();
}

/// An old engine is never asked to attach codes it does not define
#[test]
fn test_attach_range_capped_by_engine_version() {
    let engine = FakeEngine::with_version(EngineVersion::new(2, 2, 8));
    let (media, manager) = setup(&engine);

    let attached = manager.attached_events().to_vec();
    assert_eq!(
        attached,
        EventType::supported_range(ResourceKind::Media, EngineVersion::new(2, 2, 8))
    );
    assert!(!attached.contains(&EventType::MediaSubItemTreeAdded));
    assert!(!attached.contains(&EventType::MediaThumbnailGenerated));
    assert_eq!(engine.stats().undefined_attaches, 0);
    assert!(engine
        .attach_log()
        .iter()
        .all(|(handle, event)| *handle == media && event.since() <= EngineVersion::new(2, 2, 8)));
    manager.release();
}

#[test]
fn test_current_engine_skips_future_codes() {
    let engine = FakeEngine::new();
    let (_media, manager) = setup(&engine);

    assert!(manager
        .attached_events()
        .contains(&EventType::MediaSubItemTreeAdded));
    assert!(!manager
        .attached_events()
        .contains(&EventType::MediaThumbnailGenerated));
    assert_eq!(engine.stats().undefined_attaches, 0);
    manager.release();
}

/// A code the engine refuses is skipped; the others still deliver
#[test]
fn test_attach_failure_is_not_fatal() {
    let engine = FakeEngine::new();
    engine.reject_attach(EventType::MediaMetaChanged);
    let (media, manager) = setup(&engine);
    let (tx, rx) = channel::unbounded();
    manager.add_listener(recorder("l", &tx));

    assert!(!manager
        .attached_events()
        .contains(&EventType::MediaMetaChanged));

    engine.emit(media, EventType::MediaMetaChanged, RawPayload::Meta { meta: 1 });
    engine.emit(media, EventType::MediaParsedChanged, RawPayload::ParsedStatus { status: 4 });

    assert_eq!(collect(&rx, 1), vec![("l", TestEvent::Parsed(4))]);
    assert!(rx.recv_timeout(QUIET).is_err());
    manager.release();
}

/// A callback that was already running when the manager detached is a no-op
#[test]
fn test_in_flight_callback_after_release_is_ignored() {
    let engine = FakeEngine::new();
    let (media, manager) = setup(&engine);
    let (tx, rx) = channel::unbounded();
    manager.add_listener(recorder("l", &tx));

    let in_flight = engine.callbacks_for(media, EventType::MediaMetaChanged);
    assert_eq!(in_flight.len(), 1);

    manager.release();
    assert_eq!(engine.stats().detached, engine.stats().attached);
    assert!(engine
        .callbacks_for(media, EventType::MediaMetaChanged)
        .is_empty());

    let raw = RawEvent {
        event_type: EventType::MediaMetaChanged,
        source: media,
        payload: RawPayload::Meta { meta: 9 },
    };
    for callback in in_flight {
        callback(&raw);
    }
    assert!(rx.recv_timeout(QUIET).is_err());
}

#[test]
fn test_release_is_idempotent() {
    let engine = FakeEngine::new();
    let (media, manager) = setup(&engine);

    manager.release();
    let detached = engine.stats().detached;
    manager.release();
    drop(manager);

    assert_eq!(engine.stats().detached, detached);
    assert_eq!(engine.stats().violations, 0);
    engine.media_release(media);
    assert_eq!(engine.live_handles(), 0);
}

#[test]
fn test_raise_after_release_fails() {
    let engine = FakeEngine::new();
    let (_media, manager) = setup(&engine);
    manager.release();

    assert!(manager.is_released());
    let result = manager.raise(TestEvent::Synthetic("late"));
    assert!(matches!(result, Err(EventManagerError::Released { .. })));
}

/// Releases its manager from the dispatch worker
struct Releaser {
    manager: OnceLock<Arc<EventManager<TestEvent>>>,
    done: Sender<bool>,
}

impl TestListener for Releaser {
    fn on_event(&self, _event: &TestEvent) {
        if let Some(manager) = self.manager.get() {
            assert!(manager.is_dispatch_thread());
            manager.release();
            let _ = self.done.send(manager.is_released());
        }
    }
}

#[test]
fn test_release_from_listener_does_not_deadlock() {
    let engine = FakeEngine::new();
    let (media, manager) = setup(&engine);
    let manager = Arc::new(manager);
    let (done_tx, done_rx) = channel::unbounded();

    let releaser = Arc::new(Releaser {
        manager: OnceLock::new(),
        done: done_tx,
    });
    let _ = releaser.manager.set(Arc::clone(&manager));
    manager.add_listener(releaser);
    assert!(!manager.is_dispatch_thread());

    engine.emit(media, EventType::MediaMetaChanged, RawPayload::Meta { meta: 1 });

    assert_eq!(done_rx.recv_timeout(WAIT), Ok(true));
    assert_eq!(manager.listener_count(), 0);
}

/// Blocks the worker until the gate opens
struct Gate {
    started: Sender<()>,
    open: Receiver<()>,
    tx: Sender<(&'static str, TestEvent)>,
}

impl TestListener for Gate {
    fn on_event(&self, event: &TestEvent) {
        let _ = self.started.send(());
        let _ = self.open.recv_timeout(WAIT);
        let _ = self.tx.send(("gate", event.clone()));
    }
}

/// With a bounded queue a slow listener costs events, never native threads
#[test]
fn test_bounded_queue_drops_when_full() {
    let engine = FakeEngine::new();
    let media = engine
        .media_new_location("http://example.com/a.mp3")
        .expect("fake engine creates media");
    let native: Arc<dyn NativeEngine> = Arc::new(engine.clone());
    let manager = EventManager::new(
        native,
        media,
        ResourceKind::Media,
        &EventManagerConfig::bounded(1),
        translate,
    )
    .expect("Failed to create event manager");

    let (started_tx, started_rx) = channel::unbounded();
    let (open_tx, open_rx) = channel::unbounded();
    let (tx, rx) = channel::unbounded();
    manager.add_listener(Arc::new(Gate {
        started: started_tx,
        open: open_rx,
        tx,
    }));

    engine.emit(media, EventType::MediaMetaChanged, RawPayload::Meta { meta: 1 });
    started_rx.recv_timeout(WAIT).expect("worker picked up first event");

    // one slot: the second event queues, the third is dropped
    engine.emit(media, EventType::MediaMetaChanged, RawPayload::Meta { meta: 2 });
    engine.emit(media, EventType::MediaMetaChanged, RawPayload::Meta { meta: 3 });

    open_tx.send(()).expect("gate open");
    open_tx.send(()).expect("gate open");

    assert_eq!(
        collect(&rx, 2),
        vec![("gate", TestEvent::Meta(1)), ("gate", TestEvent::Meta(2))]
    );
    assert!(rx.recv_timeout(QUIET).is_err());
    manager.release();
}

/// Raises a synthetic event from the worker once the gate opens
struct GatedRaiser {
    manager: OnceLock<Arc<EventManager<TestEvent>>>,
    started: Sender<()>,
    open: Receiver<()>,
}

impl TestListener for GatedRaiser {
    fn on_event(&self, event: &TestEvent) {
        if *event != TestEvent::Meta(1) {
            return;
        }
        let _ = self.started.send(());
        let _ = self.open.recv_timeout(WAIT);
        if let Some(manager) = self.manager.get() {
            let _ = manager.raise(TestEvent::Synthetic("from listener"));
        }
    }
}

/// Raising from a listener never waits on the worker's own full queue
#[test]
fn test_raise_from_listener_on_full_queue() {
    let engine = FakeEngine::new();
    let media = engine
        .media_new_location("http://example.com/a.mp3")
        .expect("fake engine creates media");
    let native: Arc<dyn NativeEngine> = Arc::new(engine.clone());
    let manager = Arc::new(
        EventManager::new(
            native,
            media,
            ResourceKind::Media,
            &EventManagerConfig::bounded(1),
            translate,
        )
        .expect("Failed to create event manager"),
    );

    let (tx, rx) = channel::unbounded();
    manager.add_listener(recorder("l", &tx));
    let (started_tx, started_rx) = channel::unbounded();
    let (open_tx, open_rx) = channel::unbounded();
    let raiser = Arc::new(GatedRaiser {
        manager: OnceLock::new(),
        started: started_tx,
        open: open_rx,
    });
    let _ = raiser.manager.set(Arc::clone(&manager));
    manager.add_listener(raiser);

    engine.emit(media, EventType::MediaMetaChanged, RawPayload::Meta { meta: 1 });
    started_rx.recv_timeout(WAIT).expect("worker picked up first event");
    engine.emit(media, EventType::MediaMetaChanged, RawPayload::Meta { meta: 2 });
    open_tx.send(()).expect("gate open");

    // the raised event goes ahead of what was already queued
    assert_eq!(
        collect(&rx, 3),
        vec![
            ("l", TestEvent::Meta(1)),
            ("l", TestEvent::Synthetic("from listener")),
            ("l", TestEvent::Meta(2)),
        ]
    );

    let (released_tx, released_rx) = channel::bounded(1);
    std::thread::spawn(move || {
        manager.release();
        let _ = released_tx.send(());
    });
    released_rx.recv_timeout(WAIT).expect("release joins the worker");
}
