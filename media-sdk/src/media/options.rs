use std::sync::Arc;

use super::MediaContext;

/// Playback options applied to a media identity
///
/// Options belong to the identity, so they are visible through every shared
/// wrapper and copied (not linked) by `duplicate()`.
pub struct MediaOptions {
    context: Arc<MediaContext>,
}

impl MediaOptions {
    pub(crate) fn new(context: Arc<MediaContext>) -> Self {
        Self { context }
    }

    /// Add options in order, e.g. `":start-time=30"`
    pub fn add(&self, options: &[&str]) {
        let Some(media) = self.context.live() else {
            tracing::debug!("Ignoring {} options for a released media", options.len());
            return;
        };
        for option in options {
            self.context.engine().media_add_option(media, option);
        }
    }

    pub fn list(&self) -> Vec<String> {
        match self.context.live() {
            Some(media) => self.context.engine().media_options(media),
            None => Vec::new(),
        }
    }
}
