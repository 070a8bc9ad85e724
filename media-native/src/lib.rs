//! Native engine boundary for media-sdk
//!
//! This crate describes the contract between media-sdk and a reference-counted
//! native multimedia engine that exposes one event manager per resource. It
//! owns no resources itself: a [`NativeHandle`] is an opaque identity whose
//! reference count lives inside the engine.
//!
//! The engine is consumed through the [`NativeEngine`] trait. Events raised by
//! the engine arrive as borrowed [`RawEvent`] records whose lifetime ends when
//! the callback returns, so anything a domain event needs must be copied out
//! before returning.
//!
//! With the `test-support` feature, [`fake::FakeEngine`] provides an
//! instrumented in-memory engine that counts retains and releases.

mod engine;
mod error;
mod event;
mod handle;
mod types;
mod version;

#[cfg(any(test, feature = "test-support"))]
pub mod fake;

pub use engine::NativeEngine;
pub use error::{NativeError, Result};
pub use event::{EventType, NativeCallback, RawEvent, RawPayload, RawPicture};
pub use handle::{NativeHandle, ResourceKind};
pub use types::{
    MediaState, MediaType, Meta, ParseFlags, ParsedStatus, Slave, SlaveType, TrackInfo,
    TrackKind,
};
pub use version::EngineVersion;
