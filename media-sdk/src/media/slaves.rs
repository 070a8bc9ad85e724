use std::sync::Arc;

use media_native::{Slave, SlaveType};

use super::MediaContext;

/// External subtitle and audio inputs
pub struct MediaSlaves {
    context: Arc<MediaContext>,
}

impl MediaSlaves {
    pub(crate) fn new(context: Arc<MediaContext>) -> Self {
        Self { context }
    }

    /// Attach a slave; `priority` runs from 0 (lowest) to 4
    pub fn add(&self, kind: SlaveType, priority: u32, uri: &str) -> bool {
        let Some(media) = self.context.live() else {
            return false;
        };
        match self.context.engine().media_add_slave(media, kind, priority, uri) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Adding {:?} slave {} failed: {}", kind, uri, e);
                false
            }
        }
    }

    pub fn clear(&self) {
        if let Some(media) = self.context.live() {
            self.context.engine().media_clear_slaves(media);
        }
    }

    pub fn list(&self) -> Vec<Slave> {
        match self.context.live() {
            Some(media) => self.context.engine().media_slaves(media),
            None => Vec::new(),
        }
    }
}
