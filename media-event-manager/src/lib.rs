//! # Media Event Manager
//!
//! Bridges one native event source to any number of typed listeners, with
//! strict ordering and no re-entrancy into the native engine.
//!
//! ## Overview
//!
//! The native engine raises events on its own threads, which this crate does
//! not control. Each [`EventManager`] attaches a single native callback for
//! the contiguous range of event codes its resource kind defines (capped at
//! what the running engine version knows). The callback copies everything it
//! needs out of the borrowed native record, builds an owned domain event and
//! hands it to the manager's dedicated dispatch worker. Listener code runs only
//! on that worker.
//!
//! ## Key Features
//!
//! - **Total order**: one FIFO queue and one thread per resource
//! - **Last-added, first-notified**: listeners are iterated in reverse
//!   registration order
//! - **Copy-on-write listeners**: add/remove from inside a listener is safe;
//!   structural changes apply from the next event
//! - **Contained faults**: a panicking listener is logged and skipped
//! - **Version-capped attach**: codes newer than the engine are never attempted
//!
//! ## Usage
//!
//! ```rust,ignore
//! use media_event_manager::{DomainEvent, EventManager, EventManagerConfig};
//!
//! let manager = EventManager::new(
//!     engine,
//!     media_handle,
//!     ResourceKind::Media,
//!     &EventManagerConfig::default(),
//!     |raw| MyEvent::from_raw(raw),
//! )?;
//!
//! manager.add_listener(Arc::new(MyListener));
//! // ...
//! manager.release();
//! ```
//!
//! ## Architecture
//!
//! ```text
//! engine thread(s) ── NativeCallback ──(copy + translate)──► crossbeam channel
//!                                                                │
//!                                                  dispatch worker thread
//!                                                                │
//!                                          Listeners snapshot, reverse order
//! ```

pub mod config;
pub mod error;
pub mod listeners;
pub mod manager;
pub mod worker;

// Re-export main types for convenience
pub use config::EventManagerConfig;
pub use error::{EventManagerError, Result};
pub use listeners::Listeners;
pub use manager::EventManager;

/// A typed, owned event safe to use after the native callback returned
///
/// Each event kind names the listener trait it is delivered to and knows how
/// to invoke the matching listener method.
pub trait DomainEvent: Send + 'static {
    /// Listener trait object this event is delivered to
    type Listener: ?Sized + Send + Sync + 'static;

    /// Invoke the listener method corresponding to this event
    fn notify(&self, listener: &Self::Listener);

    /// Short name for logging
    fn name(&self) -> &'static str;
}

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        DomainEvent, EventManager, EventManagerConfig, EventManagerError, Listeners, Result,
    };
}
