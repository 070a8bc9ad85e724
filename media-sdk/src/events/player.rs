use std::sync::Arc;

use media_event_manager::DomainEvent;
use media_native::{EventType, NativeEngine, RawEvent, RawPayload, TrackKind};

use crate::config::SdkConfig;
use crate::media::MediaRef;

/// Events raised by a media player
///
/// The last three variants are synthetic: the sub-item sequencer raises them
/// on the player's own queue, so they are ordered with the native events
/// that caused them.
#[derive(Debug)]
pub enum MediaPlayerEvent {
    MediaChanged(MediaRef),
    NothingSpecial,
    Opening,
    /// Cache fill, 0-100
    Buffering(f32),
    Playing,
    Paused,
    Stopped,
    Forward,
    Backward,
    Finished,
    Error,
    /// Milliseconds
    TimeChanged(i64),
    /// 0.0-1.0
    PositionChanged(f32),
    SeekableChanged(bool),
    PausableChanged(bool),
    TitleChanged(i32),
    SnapshotTaken(String),
    /// Milliseconds
    LengthChanged(i64),
    /// Number of video outputs
    VideoOutput(i32),
    ScrambledChanged(bool),
    ElementaryStreamAdded { kind: TrackKind, id: i32 },
    ElementaryStreamDeleted { kind: TrackKind, id: i32 },
    ElementaryStreamSelected { kind: TrackKind, id: i32 },
    Corked,
    Uncorked,
    Muted,
    Unmuted,
    VolumeChanged(f32),
    AudioDeviceChanged(String),
    ChapterChanged(i32),

    SubItemPlayed(usize),
    SubItemFinished(usize),
    EndOfSubItems,
}

/// Receives [`MediaPlayerEvent`]s; every method defaults to doing nothing
pub trait MediaPlayerEventListener: Send + Sync {
    fn media_changed(&self, _media: &MediaRef) {}
    fn nothing_special(&self) {}
    fn opening(&self) {}
    fn buffering(&self, _cache: f32) {}
    fn playing(&self) {}
    fn paused(&self) {}
    fn stopped(&self) {}
    fn forward(&self) {}
    fn backward(&self) {}
    fn finished(&self) {}
    fn error(&self) {}
    fn time_changed(&self, _time_ms: i64) {}
    fn position_changed(&self, _position: f32) {}
    fn seekable_changed(&self, _seekable: bool) {}
    fn pausable_changed(&self, _pausable: bool) {}
    fn title_changed(&self, _title: i32) {}
    fn snapshot_taken(&self, _path: &str) {}
    fn length_changed(&self, _length_ms: i64) {}
    fn video_output(&self, _count: i32) {}
    fn scrambled_changed(&self, _scrambled: bool) {}
    fn elementary_stream_added(&self, _kind: TrackKind, _id: i32) {}
    fn elementary_stream_deleted(&self, _kind: TrackKind, _id: i32) {}
    fn elementary_stream_selected(&self, _kind: TrackKind, _id: i32) {}
    fn corked(&self) {}
    fn uncorked(&self) {}
    fn muted(&self) {}
    fn unmuted(&self) {}
    fn volume_changed(&self, _volume: f32) {}
    fn audio_device_changed(&self, _device: &str) {}
    fn chapter_changed(&self, _chapter: i32) {}

    /// The sequencer started the sub-item at `index`
    fn sub_item_played(&self, _index: usize) {}
    /// The sub-item at `index` reached its end
    fn sub_item_finished(&self, _index: usize) {}
    /// The sequencer ran past the last sub-item without repeat
    fn end_of_sub_items(&self) {}
}

impl DomainEvent for MediaPlayerEvent {
    type Listener = dyn MediaPlayerEventListener;

    fn notify(&self, listener: &dyn MediaPlayerEventListener) {
        use MediaPlayerEvent::*;
        match self {
            MediaChanged(media) => listener.media_changed(media),
            NothingSpecial => listener.nothing_special(),
            Opening => listener.opening(),
            Buffering(cache) => listener.buffering(*cache),
            Playing => listener.playing(),
            Paused => listener.paused(),
            Stopped => listener.stopped(),
            Forward => listener.forward(),
            Backward => listener.backward(),
            Finished => listener.finished(),
            Error => listener.error(),
            TimeChanged(time) => listener.time_changed(*time),
            PositionChanged(position) => listener.position_changed(*position),
            SeekableChanged(seekable) => listener.seekable_changed(*seekable),
            PausableChanged(pausable) => listener.pausable_changed(*pausable),
            TitleChanged(title) => listener.title_changed(*title),
            SnapshotTaken(path) => listener.snapshot_taken(path),
            LengthChanged(length) => listener.length_changed(*length),
            VideoOutput(count) => listener.video_output(*count),
            ScrambledChanged(scrambled) => listener.scrambled_changed(*scrambled),
            ElementaryStreamAdded { kind, id } => listener.elementary_stream_added(*kind, *id),
            ElementaryStreamDeleted { kind, id } => listener.elementary_stream_deleted(*kind, *id),
            ElementaryStreamSelected { kind, id } => {
                listener.elementary_stream_selected(*kind, *id)
            }
            Corked => listener.corked(),
            Uncorked => listener.uncorked(),
            Muted => listener.muted(),
            Unmuted => listener.unmuted(),
            VolumeChanged(volume) => listener.volume_changed(*volume),
            AudioDeviceChanged(device) => listener.audio_device_changed(device),
            ChapterChanged(chapter) => listener.chapter_changed(*chapter),
            SubItemPlayed(index) => listener.sub_item_played(*index),
            SubItemFinished(index) => listener.sub_item_finished(*index),
            EndOfSubItems => listener.end_of_sub_items(),
        }
    }

    fn name(&self) -> &'static str {
        use MediaPlayerEvent::*;
        match self {
            MediaChanged(_) => "media_changed",
            NothingSpecial => "nothing_special",
            Opening => "opening",
            Buffering(_) => "buffering",
            Playing => "playing",
            Paused => "paused",
            Stopped => "stopped",
            Forward => "forward",
            Backward => "backward",
            Finished => "finished",
            Error => "error",
            TimeChanged(_) => "time_changed",
            PositionChanged(_) => "position_changed",
            SeekableChanged(_) => "seekable_changed",
            PausableChanged(_) => "pausable_changed",
            TitleChanged(_) => "title_changed",
            SnapshotTaken(_) => "snapshot_taken",
            LengthChanged(_) => "length_changed",
            VideoOutput(_) => "video_output",
            ScrambledChanged(_) => "scrambled_changed",
            ElementaryStreamAdded { .. } => "elementary_stream_added",
            ElementaryStreamDeleted { .. } => "elementary_stream_deleted",
            ElementaryStreamSelected { .. } => "elementary_stream_selected",
            Corked => "corked",
            Uncorked => "uncorked",
            Muted => "muted",
            Unmuted => "unmuted",
            VolumeChanged(_) => "volume_changed",
            AudioDeviceChanged(_) => "audio_device_changed",
            ChapterChanged(_) => "chapter_changed",
            SubItemPlayed(_) => "sub_item_played",
            SubItemFinished(_) => "sub_item_finished",
            EndOfSubItems => "end_of_sub_items",
        }
    }
}

/// Builds [`MediaPlayerEvent`]s on the engine's callback thread
pub(crate) struct PlayerTranslator {
    engine: Arc<dyn NativeEngine>,
    config: Arc<SdkConfig>,
}

impl PlayerTranslator {
    pub(crate) fn new(engine: Arc<dyn NativeEngine>, config: Arc<SdkConfig>) -> Self {
        Self { engine, config }
    }

    pub(crate) fn translate(&self, raw: &RawEvent<'_>) -> Option<MediaPlayerEvent> {
        use MediaPlayerEvent as E;

        let event = match (raw.event_type, raw.payload) {
            (EventType::PlayerMediaChanged, RawPayload::Media { item }) => {
                E::MediaChanged(MediaRef::from_borrowed(&self.engine, item, &self.config))
            }
            (EventType::PlayerNothingSpecial, _) => E::NothingSpecial,
            (EventType::PlayerOpening, _) => E::Opening,
            (EventType::PlayerBuffering, RawPayload::Buffering { cache }) => E::Buffering(cache),
            (EventType::PlayerPlaying, _) => E::Playing,
            (EventType::PlayerPaused, _) => E::Paused,
            (EventType::PlayerStopped, _) => E::Stopped,
            (EventType::PlayerForward, _) => E::Forward,
            (EventType::PlayerBackward, _) => E::Backward,
            (EventType::PlayerEndReached, _) => E::Finished,
            (EventType::PlayerEncounteredError, _) => E::Error,
            (EventType::PlayerTimeChanged, RawPayload::Time { time_ms }) => E::TimeChanged(time_ms),
            (EventType::PlayerPositionChanged, RawPayload::Position { position }) => {
                E::PositionChanged(position)
            }
            (EventType::PlayerSeekableChanged, RawPayload::Flag { value }) => E::SeekableChanged(value),
            (EventType::PlayerPausableChanged, RawPayload::Flag { value }) => E::PausableChanged(value),
            (EventType::PlayerTitleChanged, RawPayload::Number { value }) => E::TitleChanged(value),
            (EventType::PlayerSnapshotTaken, RawPayload::Text { value }) => {
                E::SnapshotTaken(value.to_string())
            }
            (EventType::PlayerLengthChanged, RawPayload::Time { time_ms }) => E::LengthChanged(time_ms),
            (EventType::PlayerVout, RawPayload::Number { value }) => E::VideoOutput(value),
            (EventType::PlayerScrambledChanged, RawPayload::Flag { value }) => {
                E::ScrambledChanged(value)
            }
            (EventType::PlayerEsAdded, RawPayload::Es { kind, id }) => E::ElementaryStreamAdded {
                kind: TrackKind::from_code(kind),
                id,
            },
            (EventType::PlayerEsDeleted, RawPayload::Es { kind, id }) => {
                E::ElementaryStreamDeleted {
                    kind: TrackKind::from_code(kind),
                    id,
                }
            }
            (EventType::PlayerEsSelected, RawPayload::Es { kind, id }) => {
                E::ElementaryStreamSelected {
                    kind: TrackKind::from_code(kind),
                    id,
                }
            }
            (EventType::PlayerCorked, _) => E::Corked,
            (EventType::PlayerUncorked, _) => E::Uncorked,
            (EventType::PlayerMuted, _) => E::Muted,
            (EventType::PlayerUnmuted, _) => E::Unmuted,
            (EventType::PlayerAudioVolume, RawPayload::Volume { volume }) => E::VolumeChanged(volume),
            (EventType::PlayerAudioDevice, RawPayload::Text { value }) => {
                E::AudioDeviceChanged(value.to_string())
            }
            (EventType::PlayerChapterChanged, RawPayload::Number { value }) => {
                E::ChapterChanged(value)
            }
            (event_type, payload) => {
                tracing::trace!("No player event for {:?} with {:?}", event_type, payload);
                return None;
            }
        };
        Some(event)
    }
}
