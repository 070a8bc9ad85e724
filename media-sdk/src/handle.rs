//! Ownership-tagged native handles
//!
//! An [`OwnedHandle`] is one owner of one native identity. There are exactly
//! four ways to obtain or give up ownership: [`adopt`](OwnedHandle::adopt) a
//! handle a native "new" returned, [`retain`](OwnedHandle::retain) another
//! owner of the same identity, [`duplicate`](OwnedHandle::duplicate) into a
//! new identity, and [`release`](OwnedHandle::release). None of them are
//! public; wrappers expose `share()`, `duplicate()` and `release()` instead.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use media_native::{NativeEngine, NativeHandle, ResourceKind};

pub(crate) struct OwnedHandle {
    engine: Arc<dyn NativeEngine>,
    handle: NativeHandle,
    kind: ResourceKind,
    released: AtomicBool,
}

impl OwnedHandle {
    /// Take ownership of a handle fresh from a native "new"
    pub(crate) fn adopt(engine: Arc<dyn NativeEngine>, handle: NativeHandle, kind: ResourceKind) -> Self {
        tracing::trace!("Adopted {} {}", kind, handle);
        Self {
            engine,
            handle,
            kind,
            released: AtomicBool::new(false),
        }
    }

    /// Become an owner of a handle borrowed from the engine, e.g. an event
    /// payload that is only valid while its callback runs
    pub(crate) fn retain_borrowed(
        engine: Arc<dyn NativeEngine>,
        handle: NativeHandle,
        kind: ResourceKind,
    ) -> Self {
        native_retain(engine.as_ref(), handle, kind);
        Self::adopt(engine, handle, kind)
    }

    /// Another owner of the same identity; `None` once released
    pub(crate) fn retain(&self) -> Option<Self> {
        let handle = self.live()?;
        Some(Self::retain_borrowed(Arc::clone(&self.engine), handle, self.kind))
    }

    /// A new, independent identity cloned from this one
    ///
    /// Only media can be cloned; the engine may still refuse.
    pub(crate) fn duplicate(&self) -> Option<Self> {
        let handle = self.live()?;
        if self.kind != ResourceKind::Media {
            return None;
        }
        match self.engine.media_duplicate(handle) {
            Some(copy) => Some(Self::adopt(Arc::clone(&self.engine), copy, self.kind)),
            None => {
                tracing::debug!("Engine could not duplicate {} {}", self.kind, handle);
                None
            }
        }
    }

    /// Give up this owner's reference; returns whether this call did it
    pub(crate) fn release(&self) -> bool {
        self.release_with(|| {})
    }

    /// Run `teardown` and then release, exactly once
    ///
    /// `teardown` releases whatever secondary native resources the wrapper
    /// holds (an attached event manager, a bridged media) while the handle
    /// is still alive in the engine.
    pub(crate) fn release_with(&self, teardown: impl FnOnce()) -> bool {
        if self.released.swap(true, Ordering::AcqRel) {
            tracing::debug!("{} {} already released", self.kind, self.handle);
            return false;
        }
        teardown();
        native_release(self.engine.as_ref(), self.handle, self.kind);
        tracing::trace!("Released {} {}", self.kind, self.handle);
        true
    }

    /// The handle, unless this owner has released it
    pub(crate) fn live(&self) -> Option<NativeHandle> {
        (!self.is_released()).then_some(self.handle)
    }

    pub(crate) fn handle(&self) -> NativeHandle {
        self.handle
    }

    pub(crate) fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub(crate) fn engine(&self) -> &Arc<dyn NativeEngine> {
        &self.engine
    }

    pub(crate) fn is_released(&self) -> bool {
        self.released.load(Ordering::Acquire)
    }
}

impl Drop for OwnedHandle {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for OwnedHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OwnedHandle")
            .field("kind", &self.kind)
            .field("handle", &self.handle)
            .field("released", &self.is_released())
            .finish()
    }
}

fn native_retain(engine: &dyn NativeEngine, handle: NativeHandle, kind: ResourceKind) {
    match kind {
        ResourceKind::Media => engine.media_retain(handle),
        ResourceKind::MediaList => engine.list_retain(handle),
        ResourceKind::MediaPlayer => engine.player_retain(handle),
    }
}

fn native_release(engine: &dyn NativeEngine, handle: NativeHandle, kind: ResourceKind) {
    match kind {
        ResourceKind::Media => engine.media_release(handle),
        ResourceKind::MediaList => engine.list_release(handle),
        ResourceKind::MediaPlayer => engine.player_release(handle),
    }
}
