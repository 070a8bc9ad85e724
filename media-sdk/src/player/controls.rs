use std::sync::Arc;
use std::time::Duration;

use crossbeam::channel::{bounded, Sender};
use media_native::MediaState;

use crate::events::MediaPlayerEventListener;

use super::PlayerContext;

/// Transport controls of a media player
///
/// Commands return as soon as the engine accepted them; the outcome arrives
/// as player events. [`start`](Self::start) waits for it instead.
pub struct PlayerControls {
    context: Arc<PlayerContext>,
}

impl PlayerControls {
    pub(crate) fn new(context: Arc<PlayerContext>) -> Self {
        Self { context }
    }

    /// Begin playing the current media
    pub fn play(&self) -> bool {
        self.context.play()
    }

    /// Play and wait up to the configured start timeout for the outcome
    ///
    /// Returns `true` once the player reports `playing`, `false` on `error`,
    /// on timeout, or when the engine refused to play.
    pub fn start(&self) -> bool {
        start(&self.context, self.context.config().start_timeout)
    }

    /// [`start`](Self::start) with an explicit timeout
    pub fn start_within(&self, timeout: Duration) -> bool {
        start(&self.context, timeout)
    }

    pub fn pause(&self) {
        self.set_pause(true);
    }

    pub fn resume(&self) {
        self.set_pause(false);
    }

    pub fn set_pause(&self, pause: bool) {
        if let Some(player) = self.context.live() {
            self.context.engine().player_pause(player, pause);
        }
    }

    pub fn stop(&self) {
        if let Some(player) = self.context.live() {
            self.context.engine().player_stop(player);
        }
    }

    pub fn is_playing(&self) -> bool {
        self.context
            .live()
            .is_some_and(|player| self.context.engine().player_is_playing(player))
    }

    pub fn state(&self) -> MediaState {
        match self.context.live() {
            Some(player) => self.context.engine().player_state(player),
            None => MediaState::NothingSpecial,
        }
    }
}

/// Temporary listener releasing a waiting `start` on the first outcome
struct StartLatch(Sender<bool>);

impl MediaPlayerEventListener for StartLatch {
    fn playing(&self) {
        let _ = self.0.try_send(true);
    }

    fn error(&self) {
        let _ = self.0.try_send(false);
    }
}

pub(super) fn start(context: &PlayerContext, timeout: Duration) -> bool {
    let events = context.events();
    if events.is_dispatch_thread() {
        // the outcome could never be delivered while this listener runs
        tracing::warn!("start() called from a player listener; not waiting");
        return context.play();
    }

    let (tx, rx) = bounded(1);
    let latch: Arc<dyn MediaPlayerEventListener> = Arc::new(StartLatch(tx));
    events.add_listener(Arc::clone(&latch));

    let started = context.play()
        && match rx.recv_timeout(timeout) {
            Ok(started) => started,
            Err(_) => {
                tracing::debug!("Player did not start within {:?}", timeout);
                false
            }
        };

    events.remove_listener(&latch);
    started
}
