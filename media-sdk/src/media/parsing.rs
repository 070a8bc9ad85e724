use std::sync::Arc;
use std::time::Duration;

use media_native::{ParseFlags, ParsedStatus};
use parking_lot::Mutex;

use crate::config::timeout_ms;
use crate::events::MediaEventListener;

use super::MediaContext;

/// Last known parse status of one media wrapper
///
/// Moves `None -> Pending` when a request is accepted and to the first
/// terminal status reported after that. A terminal status is final.
#[derive(Debug, Default)]
pub(crate) struct ParseState {
    status: Mutex<Option<ParsedStatus>>,
}

impl ParseState {
    /// Current status, seeding from the engine on first use
    pub(crate) fn snapshot(&self, seed: impl FnOnce() -> ParsedStatus) -> ParsedStatus {
        *self.status.lock().get_or_insert_with(seed)
    }

    pub(crate) fn mark_pending(&self) {
        let mut status = self.status.lock();
        if matches!(*status, None | Some(ParsedStatus::None)) {
            *status = Some(ParsedStatus::Pending);
        }
    }

    pub(crate) fn complete(&self, reported: ParsedStatus) {
        if reported == ParsedStatus::None {
            return;
        }
        let mut status = self.status.lock();
        match *status {
            Some(current) if current.is_terminal() => {
                if current != reported {
                    tracing::debug!("Parse already ended as {:?}, ignoring {:?}", current, reported);
                }
            }
            _ => *status = Some(reported),
        }
    }
}

/// Internal listener feeding `parsed_changed` events into a [`ParseState`]
pub(crate) struct ParseTracker {
    state: Arc<ParseState>,
}

impl ParseTracker {
    pub(crate) fn new(state: Arc<ParseState>) -> Self {
        Self { state }
    }
}

impl MediaEventListener for ParseTracker {
    fn parsed_changed(&self, status: ParsedStatus) {
        self.state.complete(status);
    }
}

/// Asynchronous parse requests
///
/// ```rust,ignore
/// media.events.add_listener(Arc::new(MyListener))?;
/// if media.parsing.parse() {
///     assert_eq!(media.parsing.status(), ParsedStatus::Pending);
/// }
/// // MyListener::parsed_changed receives the outcome
/// ```
pub struct MediaParsing {
    context: Arc<MediaContext>,
}

impl MediaParsing {
    pub(crate) fn new(context: Arc<MediaContext>) -> Self {
        Self { context }
    }

    /// Parse with the configured flags and timeout
    pub fn parse(&self) -> bool {
        let config = self.context.config();
        self.parse_with(config.parse_flags, config.parse_timeout)
    }

    /// Request an asynchronous parse; returns whether the engine accepted it
    ///
    /// `timeout` of `None` leaves the engine's default in place.
    pub fn parse_with(&self, flags: ParseFlags, timeout: Option<Duration>) -> bool {
        let Some(media) = self.context.live() else {
            return false;
        };
        let manager = match self.context.event_manager() {
            Ok(manager) => manager,
            Err(e) => {
                tracing::warn!("Cannot track parse of {}: {}", media, e);
                return false;
            }
        };

        let engine = self.context.engine();
        self.context
            .parse
            .snapshot(|| engine.media_parsed_status(media));

        // most recently added listener is notified first
        manager.remove_listener(&self.context.parse_tracker);
        manager.add_listener(Arc::clone(&self.context.parse_tracker));

        match engine.media_parse(media, flags, timeout_ms(timeout)) {
            Ok(()) => {
                self.context.parse.mark_pending();
                tracing::debug!("Parse of {} requested with flags {:#x}", media, flags.bits());
                true
            }
            Err(e) => {
                tracing::warn!("Parse of {} rejected: {}", media, e);
                false
            }
        }
    }

    /// Ask the engine to stop a running parse; best effort
    pub fn stop(&self) {
        if let Some(media) = self.context.live() {
            self.context.engine().media_parse_stop(media);
        }
    }

    /// Last known status; listeners should prefer `parsed_changed`
    pub fn status(&self) -> ParsedStatus {
        let Some(media) = self.context.live() else {
            return self.context.parse.snapshot(|| ParsedStatus::None);
        };
        let engine = self.context.engine();
        self.context
            .parse
            .snapshot(|| engine.media_parsed_status(media))
    }

    pub fn is_parsed(&self) -> bool {
        self.status() == ParsedStatus::Done
    }
}
