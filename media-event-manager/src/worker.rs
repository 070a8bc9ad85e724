//! Background dispatch worker
//!
//! One thread per event manager. It is the only thread on which listener code
//! runs, which gives each resource a total order of events and rules out a
//! listener being re-entered concurrently with itself.

use std::any::Any;
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam::channel::Receiver;
use parking_lot::Mutex;

use crate::listeners::Listeners;
use crate::DomainEvent;

/// Commands sent from callbacks and the owning manager to the worker
pub enum Command<E> {
    /// Deliver one event to the current listener snapshot
    Dispatch(E),
    /// Stop the worker; queued events behind it are discarded
    Shutdown,
}

/// Events that bypass the command channel
///
/// The worker must never block on its own queue, so events produced on the
/// worker go to `local` instead. Events a full queue turned away are parked in
/// `rejected` so that releasing their handles happens on the worker rather
/// than on the engine's callback thread.
pub struct Backlog<E> {
    local: Mutex<VecDeque<E>>,
    rejected: Mutex<Vec<E>>,
}

impl<E> Backlog<E> {
    pub fn new() -> Self {
        Self {
            local: Mutex::new(VecDeque::new()),
            rejected: Mutex::new(Vec::new()),
        }
    }

    /// Queue an event produced on the worker; delivered after the current one
    pub fn push_local(&self, event: E) {
        self.local.lock().push_back(event);
    }

    /// Park a command the channel refused
    pub fn reject(&self, command: Command<E>) {
        if let Command::Dispatch(event) = command {
            self.rejected.lock().push(event);
        }
    }

    fn pop_local(&self) -> Option<E> {
        self.local.lock().pop_front()
    }

    fn take_rejected(&self) -> Vec<E> {
        std::mem::take(&mut *self.rejected.lock())
    }

    /// Drop everything held; returns how many events were undelivered
    pub fn clear(&self) -> usize {
        let local = std::mem::take(&mut *self.local.lock());
        let rejected = self.take_rejected();
        local.len() + rejected.len()
    }
}

impl<E> Default for Backlog<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Spawns the dispatch worker thread
///
/// The worker pops commands in FIFO order until it receives
/// [`Command::Shutdown`], observes `released`, or every sender is gone.
/// Before each receive it delivers the local backlog and drops rejected
/// events. Events still queued at exit are discarded rather than delivered.
pub fn spawn_dispatch_worker<E: DomainEvent>(
    name: String,
    command_rx: Receiver<Command<E>>,
    listeners: Arc<Listeners<E::Listener>>,
    backlog: Arc<Backlog<E>>,
    released: Arc<AtomicBool>,
) -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new().name(name).spawn(move || {
        tracing::debug!("Dispatch worker started");

        let mut discarded = 0usize;
        'run: loop {
            drop(backlog.take_rejected());
            while let Some(event) = backlog.pop_local() {
                if released.load(Ordering::Acquire) {
                    discarded += 1;
                    break 'run;
                }
                dispatch(&event, &listeners);
            }
            if released.load(Ordering::Acquire) {
                break;
            }

            let Ok(command) = command_rx.recv() else {
                break;
            };
            match command {
                Command::Dispatch(event) => {
                    if released.load(Ordering::Acquire) {
                        discarded += 1;
                        break;
                    }
                    dispatch(&event, &listeners);
                    // a listener may have released the manager
                    if released.load(Ordering::Acquire) {
                        break;
                    }
                }
                Command::Shutdown => {
                    tracing::debug!("Dispatch worker received shutdown command");
                    break;
                }
            }
        }

        discarded += command_rx.try_iter().count() + backlog.clear();
        if discarded > 0 {
            tracing::debug!("Discarded {} undelivered events after release", discarded);
        }
        tracing::debug!("Dispatch worker shut down");
    })
}

/// Deliver one event to a snapshot of the listeners, last-added first
///
/// A panicking listener is logged and does not stop delivery to the rest.
pub fn dispatch<E: DomainEvent>(event: &E, listeners: &Listeners<E::Listener>) {
    let snapshot = listeners.snapshot();

    for listener in snapshot.iter().rev() {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| event.notify(&**listener)));

        if let Err(payload) = outcome {
            tracing::error!(
                "Listener panicked while handling {}: {}",
                event.name(),
                panic_message(payload.as_ref())
            );
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}
