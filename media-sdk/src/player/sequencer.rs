use std::sync::Arc;

use crate::config::SdkConfig;
use crate::error::Result;
use crate::events::MediaPlayerEvent;
use crate::media::sealed::Sealed;
use crate::media::MediaRef;

use super::PlayerContext;

/// Progress through the children of the player's container media
#[derive(Debug)]
pub(crate) struct SequencerState {
    /// Container whose children are being played
    parent: Option<MediaRef>,
    /// `None` when no child has been played yet
    index: Option<usize>,
    repeat: bool,
    auto_play: bool,
    default_options: Vec<String>,
    /// Child count seen by the last request
    count: usize,
}

impl SequencerState {
    pub(crate) fn new(config: &SdkConfig) -> Self {
        Self {
            parent: None,
            index: None,
            repeat: config.repeat_sub_items,
            auto_play: config.auto_play_sub_items,
            default_options: config.default_media_options.clone(),
            count: 0,
        }
    }

    /// Forget the container and position; settings are kept
    pub(crate) fn reset(&mut self) {
        self.parent = None;
        self.index = None;
        self.count = 0;
    }
}

/// Plays the children of a container media one after another
///
/// A playlist or directory media produces children instead of playing
/// itself. With auto-play enabled (the default), the player's `finished`
/// event moves on to the next child; the synthetic `sub_item_played`,
/// `sub_item_finished` and `end_of_sub_items` events report progress.
///
/// ```rust,ignore
/// player.sub_items.set_repeat(true);
/// player.sub_items.play(0, &[])?;
/// ```
pub struct SubItemSequencer {
    context: Arc<PlayerContext>,
}

impl SubItemSequencer {
    pub(crate) fn new(context: Arc<PlayerContext>) -> Self {
        Self { context }
    }

    /// Play the child at `index`; returns whether a child started
    ///
    /// Past the last child this either wraps to the first (with repeat) or
    /// raises `end_of_sub_items` and clears the position.
    pub fn play(&self, index: usize, options: &[&str]) -> Result<bool> {
        play_sub_item(&self.context, index, options)
    }

    /// Play the child after the current one, or the first child
    pub fn play_next(&self, options: &[&str]) -> Result<bool> {
        play_next_sub_item(&self.context, options)
    }

    pub fn set_repeat(&self, repeat: bool) {
        self.context.sequencer.lock().repeat = repeat;
    }

    pub fn repeat(&self) -> bool {
        self.context.sequencer.lock().repeat
    }

    pub fn set_auto_play(&self, auto_play: bool) {
        self.context.sequencer.lock().auto_play = auto_play;
    }

    pub fn auto_play(&self) -> bool {
        self.context.sequencer.lock().auto_play
    }

    /// Options added to every child before it is played
    pub fn set_default_options<I, S>(&self, options: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.context.sequencer.lock().default_options = options.into_iter().map(Into::into).collect();
    }

    /// Index of the child being played
    pub fn index(&self) -> Option<usize> {
        self.context.sequencer.lock().index
    }

    /// Child count seen by the last play request
    pub fn count(&self) -> usize {
        self.context.sequencer.lock().count
    }

    pub fn reset(&self) {
        self.context.sequencer.lock().reset();
    }
}

pub(super) fn play_next_sub_item(context: &PlayerContext, options: &[&str]) -> Result<bool> {
    let next = context.sequencer.lock().index.map_or(0, |index| index + 1);
    play_sub_item(context, next, options)
}

pub(super) fn play_sub_item(context: &PlayerContext, index: usize, options: &[&str]) -> Result<bool> {
    let (played, event) = advance(context, index, options)?;
    if let Some(event) = event {
        context.raise(event);
    }
    Ok(played)
}

/// Move to the child at `index` under the sequencer lock
///
/// The progress event is handed back so it is raised after unlocking.
fn advance(
    context: &PlayerContext,
    index: usize,
    options: &[&str],
) -> Result<(bool, Option<MediaPlayerEvent>)> {
    let player = context.require()?;
    let mut state = context.sequencer.lock();

    if state.parent.is_none() {
        state.parent = context.current_media();
    }
    let Some(parent) = state.parent.as_ref() else {
        tracing::debug!("No media to take sub-items from on {}", player);
        return Ok((false, None));
    };
    let Some(children) = parent.subitems() else {
        return Ok((false, None));
    };
    let Ok(guard) = children.lock() else {
        return Ok((false, None));
    };

    let count = guard.count();
    state.count = count;
    if count == 0 {
        return Ok((false, None));
    }

    let index = if index < count {
        index
    } else if state.repeat {
        0
    } else {
        state.index = None;
        tracing::debug!("End of {} sub-items on {}", count, player);
        return Ok((false, Some(MediaPlayerEvent::EndOfSubItems)));
    };

    let Some(child) = guard.get(index) else {
        return Ok((false, None));
    };
    let Some(media) = child.live_media() else {
        return Ok((false, None));
    };

    let mut all_options: Vec<&str> = state.default_options.iter().map(String::as_str).collect();
    all_options.extend_from_slice(options);
    context.set_native_media(player, media, &all_options);
    state.index = Some(index);

    if !context.play() {
        return Ok((false, None));
    }
    tracing::debug!("Playing sub-item {} of {} on {}", index, count, player);
    Ok((true, Some(MediaPlayerEvent::SubItemPlayed(index))))
}

/// Called on the player's dispatch thread for every native `finished`
pub(super) fn on_finished(context: &PlayerContext) {
    let (finished, auto_play) = {
        let state = context.sequencer.lock();
        (state.index, state.auto_play)
    };

    if let Some(index) = finished {
        context.raise(MediaPlayerEvent::SubItemFinished(index));
    }
    if auto_play {
        if let Err(e) = play_next_sub_item(context, &[]) {
            tracing::debug!("Sub-item advance skipped: {}", e);
        }
    }
}
