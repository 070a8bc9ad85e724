use std::sync::Arc;

use crate::error::Result;
use crate::events::MediaEventListener;

use super::MediaContext;

/// Listener registration for one media wrapper
///
/// The media's event manager is attached by the first registration.
pub struct MediaEvents {
    context: Arc<MediaContext>,
}

impl MediaEvents {
    pub(crate) fn new(context: Arc<MediaContext>) -> Self {
        Self { context }
    }

    pub fn add_listener(&self, listener: Arc<dyn MediaEventListener>) -> Result<()> {
        self.context.event_manager()?.add_listener(listener);
        Ok(())
    }

    /// Returns whether the listener was registered
    pub fn remove_listener(&self, listener: &Arc<dyn MediaEventListener>) -> bool {
        self.context
            .existing_event_manager()
            .is_some_and(|manager| manager.remove_listener(listener))
    }
}
