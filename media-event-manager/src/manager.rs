//! Per-resource native event bridge
//!
//! Attaches to the native event source of one resource, translates raw
//! records into owned domain events on the native thread and fans them out to
//! listeners on a private dispatch worker.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle, ThreadId};

use crossbeam::channel::{self, Sender, TrySendError};
use media_native::{EventType, NativeCallback, NativeEngine, NativeHandle, RawEvent, ResourceKind};
use parking_lot::Mutex;

use crate::config::EventManagerConfig;
use crate::error::{EventManagerError, Result};
use crate::listeners::Listeners;
use crate::worker::{spawn_dispatch_worker, Backlog, Command};
use crate::DomainEvent;

/// Event manager bound to one native resource
///
/// Attaches exactly once, at construction, and detaches exactly once, at
/// [`release`](Self::release) (or drop). Listener code only ever runs on the
/// manager's dispatch worker.
///
/// # Example
///
/// ```rust,ignore
/// let manager = EventManager::new(engine, handle, ResourceKind::MediaPlayer, &config, translate)?;
///
/// let listener: Arc<dyn MediaPlayerEventListener> = Arc::new(MyListener);
/// manager.add_listener(listener.clone());
///
/// // later, possibly from inside the listener itself
/// manager.remove_listener(&listener);
/// ```
pub struct EventManager<E: DomainEvent> {
    engine: Arc<dyn NativeEngine>,
    resource: NativeHandle,
    kind: ResourceKind,

    /// The single callback registered for every attached code
    callback: NativeCallback,
    attached: Vec<EventType>,

    listeners: Arc<Listeners<E::Listener>>,
    command_tx: Sender<Command<E>>,
    backlog: Arc<Backlog<E>>,

    /// Set before detaching so in-flight callbacks become no-ops
    released: Arc<AtomicBool>,
    worker: Mutex<Option<JoinHandle<()>>>,
    worker_thread: ThreadId,
}

impl<E: DomainEvent> EventManager<E> {
    /// Create a manager and attach it to the resource's native event source
    ///
    /// `translate` runs on the engine's callback thread. It must copy every
    /// field it needs out of the borrowed record and must not call back into
    /// the engine other than to retain a handle it keeps.
    ///
    /// Codes newer than the running engine are never attempted. A code the
    /// engine still rejects is logged and simply never delivered.
    pub fn new<F>(
        engine: Arc<dyn NativeEngine>,
        resource: NativeHandle,
        kind: ResourceKind,
        config: &EventManagerConfig,
        translate: F,
    ) -> Result<Self>
    where
        F: for<'a> Fn(&RawEvent<'a>) -> Option<E> + Send + Sync + 'static,
    {
        config.validate()?;

        let (command_tx, command_rx) = match config.queue_capacity {
            Some(capacity) => channel::bounded(capacity),
            None => channel::unbounded(),
        };
        let listeners = Arc::new(Listeners::new());
        let backlog = Arc::new(Backlog::new());
        let released = Arc::new(AtomicBool::new(false));

        let worker = spawn_dispatch_worker::<E>(
            format!("{}-{}-{}", config.thread_name, kind, resource),
            command_rx,
            Arc::clone(&listeners),
            Arc::clone(&backlog),
            Arc::clone(&released),
        )
        .map_err(EventManagerError::WorkerSpawn)?;
        let worker_thread = worker.thread().id();

        let callback: NativeCallback = {
            let command_tx = command_tx.clone();
            let backlog = Arc::clone(&backlog);
            let released = Arc::clone(&released);
            Arc::new(move |raw: &RawEvent<'_>| {
                if released.load(Ordering::Acquire) {
                    tracing::trace!("Ignoring {:?} for released manager", raw.event_type);
                    return;
                }
                // raised synchronously by a call a listener made
                let on_worker = thread::current().id() == worker_thread;
                // nothing gets retained for an event that cannot be queued
                if !on_worker && command_tx.is_full() {
                    tracing::warn!(
                        "Dispatch queue full, dropping {:?} from {}",
                        raw.event_type,
                        raw.source
                    );
                    return;
                }
                let Some(event) = translate(raw) else {
                    return;
                };
                if on_worker {
                    backlog.push_local(event);
                    return;
                }
                match command_tx.try_send(Command::Dispatch(event)) {
                    Ok(()) => {}
                    Err(TrySendError::Full(command)) => {
                        tracing::warn!(
                            "Dispatch queue full, dropping {:?} from {}",
                            raw.event_type,
                            raw.source
                        );
                        backlog.reject(command);
                    }
                    Err(TrySendError::Disconnected(command)) => {
                        tracing::debug!("Dispatch worker gone, dropping {:?}", raw.event_type);
                        backlog.reject(command);
                    }
                }
            })
        };

        let version = engine.version();
        let range = EventType::supported_range(kind, version);
        let mut attached = Vec::with_capacity(range.len());
        for &event_type in range {
            match engine.event_attach(resource, event_type, Arc::clone(&callback)) {
                Ok(()) => attached.push(event_type),
                Err(e) => {
                    tracing::warn!(
                        "Failed to attach {:?} on {} {}: {}",
                        event_type,
                        kind,
                        resource,
                        e
                    );
                }
            }
        }

        tracing::debug!(
            "Event manager attached {} of {} {} event codes on {} (engine {})",
            attached.len(),
            EventType::range(kind).len(),
            kind,
            resource,
            version
        );

        Ok(Self {
            engine,
            resource,
            kind,
            callback,
            attached,
            listeners,
            command_tx,
            backlog,
            released,
            worker: Mutex::new(Some(worker)),
            worker_thread,
        })
    }

    /// Register a listener; the most recently added is notified first
    ///
    /// Safe to call from inside a listener. The change applies from the next
    /// event.
    pub fn add_listener(&self, listener: Arc<E::Listener>) {
        self.listeners.add(listener);
    }

    /// Unregister a listener previously added with the same `Arc`
    ///
    /// Safe to call from inside a listener; a notification round already in
    /// progress still sees its snapshot.
    pub fn remove_listener(&self, listener: &Arc<E::Listener>) -> bool {
        self.listeners.remove(listener)
    }

    pub fn has_listener(&self, listener: &Arc<E::Listener>) -> bool {
        self.listeners.contains(listener)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Enqueue a synthetic event behind everything already queued
    ///
    /// From a listener the event is delivered right after the current one,
    /// ahead of the queue, and the call never blocks.
    pub fn raise(&self, event: E) -> Result<()> {
        if self.is_released() {
            return Err(self.released_error());
        }
        if self.is_dispatch_thread() {
            self.backlog.push_local(event);
            return Ok(());
        }
        self.command_tx
            .send(Command::Dispatch(event))
            .map_err(|_| self.released_error())
    }

    /// Event codes this manager successfully attached to
    pub fn attached_events(&self) -> &[EventType] {
        &self.attached
    }

    pub fn resource(&self) -> NativeHandle {
        self.resource
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::Acquire)
    }

    /// Whether the caller is running on this manager's dispatch worker
    pub fn is_dispatch_thread(&self) -> bool {
        thread::current().id() == self.worker_thread
    }

    /// Detach from the native event source and stop the dispatch worker
    ///
    /// Idempotent. Events still queued are discarded. When called from a
    /// listener (i.e. on the worker itself) the worker is signalled but not
    /// joined.
    pub fn release(&self) {
        if self.released.swap(true, Ordering::AcqRel) {
            return;
        }

        for &event_type in &self.attached {
            self.engine
                .event_detach(self.resource, event_type, &self.callback);
        }

        // the worker may be the caller, so never block on a full queue there
        let on_worker = self.is_dispatch_thread();
        if on_worker {
            let _ = self.command_tx.try_send(Command::Shutdown);
        } else {
            let _ = self.command_tx.send(Command::Shutdown);
        }
        self.listeners.clear();

        let worker = self.worker.lock().take();
        if let Some(worker) = worker {
            if on_worker {
                tracing::debug!("Releasing {} {} from its own dispatch worker", self.kind, self.resource);
            } else if worker.join().is_err() {
                tracing::warn!("Dispatch worker for {} {} panicked", self.kind, self.resource);
            }
        }
        if !on_worker {
            self.backlog.clear();
        }

        tracing::debug!("Event manager for {} {} released", self.kind, self.resource);
    }

    fn released_error(&self) -> EventManagerError {
        EventManagerError::Released {
            kind: self.kind,
            resource: self.resource,
        }
    }
}

impl<E: DomainEvent> Drop for EventManager<E> {
    fn drop(&mut self) {
        self.release();
    }
}
