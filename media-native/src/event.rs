//! Native event codes and raw event records

use std::sync::Arc;

use crate::handle::{NativeHandle, ResourceKind};
use crate::version::EngineVersion;

const V2_2: EngineVersion = EngineVersion::new(2, 2, 0);
const V3_0: EngineVersion = EngineVersion::new(3, 0, 0);
const V4_0: EngineVersion = EngineVersion::new(4, 0, 0);

/// Native event codes, grouped per resource kind in contiguous ranges
///
/// Within a kind, codes are ordered so that the engine version introducing
/// them never decreases. Capping a range at the first unsupported code is
/// therefore equivalent to filtering it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u32)]
pub enum EventType {
    MediaMetaChanged = 0x000,
    MediaSubItemAdded = 0x001,
    MediaDurationChanged = 0x002,
    MediaParsedChanged = 0x003,
    MediaFreed = 0x004,
    MediaStateChanged = 0x005,
    MediaSubItemTreeAdded = 0x006,
    MediaThumbnailGenerated = 0x007,
    MediaAttachedThumbnailsFound = 0x008,

    PlayerMediaChanged = 0x100,
    PlayerNothingSpecial = 0x101,
    PlayerOpening = 0x102,
    PlayerBuffering = 0x103,
    PlayerPlaying = 0x104,
    PlayerPaused = 0x105,
    PlayerStopped = 0x106,
    PlayerForward = 0x107,
    PlayerBackward = 0x108,
    PlayerEndReached = 0x109,
    PlayerEncounteredError = 0x10a,
    PlayerTimeChanged = 0x10b,
    PlayerPositionChanged = 0x10c,
    PlayerSeekableChanged = 0x10d,
    PlayerPausableChanged = 0x10e,
    PlayerTitleChanged = 0x10f,
    PlayerSnapshotTaken = 0x110,
    PlayerLengthChanged = 0x111,
    PlayerVout = 0x112,
    PlayerScrambledChanged = 0x113,
    PlayerEsAdded = 0x114,
    PlayerEsDeleted = 0x115,
    PlayerEsSelected = 0x116,
    PlayerCorked = 0x117,
    PlayerUncorked = 0x118,
    PlayerMuted = 0x119,
    PlayerUnmuted = 0x11a,
    PlayerAudioVolume = 0x11b,
    PlayerAudioDevice = 0x11c,
    PlayerChapterChanged = 0x11d,

    ListItemAdded = 0x200,
    ListWillAddItem = 0x201,
    ListItemDeleted = 0x202,
    ListWillDeleteItem = 0x203,
    ListEndReached = 0x204,
}

const MEDIA_EVENTS: &[EventType] = &[
    EventType::MediaMetaChanged,
    EventType::MediaSubItemAdded,
    EventType::MediaDurationChanged,
    EventType::MediaParsedChanged,
    EventType::MediaFreed,
    EventType::MediaStateChanged,
    EventType::MediaSubItemTreeAdded,
    EventType::MediaThumbnailGenerated,
    EventType::MediaAttachedThumbnailsFound,
];

const PLAYER_EVENTS: &[EventType] = &[
    EventType::PlayerMediaChanged,
    EventType::PlayerNothingSpecial,
    EventType::PlayerOpening,
    EventType::PlayerBuffering,
    EventType::PlayerPlaying,
    EventType::PlayerPaused,
    EventType::PlayerStopped,
    EventType::PlayerForward,
    EventType::PlayerBackward,
    EventType::PlayerEndReached,
    EventType::PlayerEncounteredError,
    EventType::PlayerTimeChanged,
    EventType::PlayerPositionChanged,
    EventType::PlayerSeekableChanged,
    EventType::PlayerPausableChanged,
    EventType::PlayerTitleChanged,
    EventType::PlayerSnapshotTaken,
    EventType::PlayerLengthChanged,
    EventType::PlayerVout,
    EventType::PlayerScrambledChanged,
    EventType::PlayerEsAdded,
    EventType::PlayerEsDeleted,
    EventType::PlayerEsSelected,
    EventType::PlayerCorked,
    EventType::PlayerUncorked,
    EventType::PlayerMuted,
    EventType::PlayerUnmuted,
    EventType::PlayerAudioVolume,
    EventType::PlayerAudioDevice,
    EventType::PlayerChapterChanged,
];

const LIST_EVENTS: &[EventType] = &[
    EventType::ListItemAdded,
    EventType::ListWillAddItem,
    EventType::ListItemDeleted,
    EventType::ListWillDeleteItem,
    EventType::ListEndReached,
];

impl EventType {
    pub fn code(self) -> u32 {
        self as u32
    }

    pub fn from_code(code: u32) -> Option<Self> {
        MEDIA_EVENTS
            .iter()
            .chain(PLAYER_EVENTS)
            .chain(LIST_EVENTS)
            .copied()
            .find(|e| e.code() == code)
    }

    pub fn kind(self) -> ResourceKind {
        match self.code() >> 8 {
            0 => ResourceKind::Media,
            1 => ResourceKind::MediaPlayer,
            _ => ResourceKind::MediaList,
        }
    }

    /// First engine version that defines this event code
    pub fn since(self) -> EngineVersion {
        use EventType::*;
        match self {
            MediaSubItemTreeAdded => V3_0,
            MediaThumbnailGenerated | MediaAttachedThumbnailsFound => V4_0,
            PlayerEsAdded | PlayerEsDeleted | PlayerEsSelected | PlayerCorked
            | PlayerUncorked | PlayerMuted | PlayerUnmuted | PlayerAudioVolume
            | PlayerAudioDevice | PlayerChapterChanged => V3_0,
            ListEndReached => V3_0,
            _ => V2_2,
        }
    }

    /// Full contiguous code range for a resource kind
    pub fn range(kind: ResourceKind) -> &'static [EventType] {
        match kind {
            ResourceKind::Media => MEDIA_EVENTS,
            ResourceKind::MediaPlayer => PLAYER_EVENTS,
            ResourceKind::MediaList => LIST_EVENTS,
        }
    }

    /// Code range for a resource kind, capped at what `version` defines
    ///
    /// The range stops at the first code the running engine does not know,
    /// so attaching never touches an undefined code.
    pub fn supported_range(kind: ResourceKind, version: EngineVersion) -> &'static [EventType] {
        let all = Self::range(kind);
        let end = all
            .iter()
            .position(|e| e.since() > version)
            .unwrap_or(all.len());
        &all[..end]
    }
}

/// Decoded picture carried by a thumbnail event, borrowed from native memory
#[derive(Debug, Clone, Copy)]
pub struct RawPicture<'a> {
    pub width: u32,
    pub height: u32,
    pub data: &'a [u8],
}

/// Event-specific payload of a raw native event
///
/// Every borrowed field, including handles, is only valid until the callback
/// that received it returns.
#[derive(Debug, Clone, Copy)]
pub enum RawPayload<'a> {
    None,
    Meta { meta: u32 },
    Media { item: NativeHandle },
    Duration { duration_ms: i64 },
    ParsedStatus { status: u32 },
    State { state: u32 },
    Thumbnail { picture: Option<RawPicture<'a>> },
    Buffering { cache: f32 },
    Time { time_ms: i64 },
    Position { position: f32 },
    Flag { value: bool },
    Number { value: i32 },
    Text { value: &'a str },
    Es { kind: i32, id: i32 },
    Volume { volume: f32 },
    ListItem { item: NativeHandle, index: i32 },
}

/// A raw event record as delivered by the engine's callback
#[derive(Debug, Clone, Copy)]
pub struct RawEvent<'a> {
    pub event_type: EventType,
    /// The resource whose event manager raised the event
    pub source: NativeHandle,
    pub payload: RawPayload<'a>,
}

/// Callback registered with a native event manager
///
/// Runs on an engine-owned thread. Identity (`Arc::ptr_eq`) is what detach
/// matches on.
pub type NativeCallback = Arc<dyn for<'a> Fn(&RawEvent<'a>) + Send + Sync>;
