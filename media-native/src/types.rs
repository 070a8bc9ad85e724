//! Value types exchanged with the native engine

use std::ops::{BitOr, BitOrAssign};

use serde::{Deserialize, Serialize};

/// Metadata keys understood by the engine, in native code order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Meta {
    Title,
    Artist,
    Genre,
    Copyright,
    Album,
    TrackNumber,
    Description,
    Rating,
    Date,
    Setting,
    Url,
    Language,
    NowPlaying,
    Publisher,
    EncodedBy,
    ArtworkUrl,
    TrackId,
    TrackTotal,
    Director,
    Season,
    Episode,
    ShowName,
    Actors,
    AlbumArtist,
    DiscNumber,
    DiscTotal,
}

impl Meta {
    pub const ALL: [Meta; 26] = [
        Meta::Title,
        Meta::Artist,
        Meta::Genre,
        Meta::Copyright,
        Meta::Album,
        Meta::TrackNumber,
        Meta::Description,
        Meta::Rating,
        Meta::Date,
        Meta::Setting,
        Meta::Url,
        Meta::Language,
        Meta::NowPlaying,
        Meta::Publisher,
        Meta::EncodedBy,
        Meta::ArtworkUrl,
        Meta::TrackId,
        Meta::TrackTotal,
        Meta::Director,
        Meta::Season,
        Meta::Episode,
        Meta::ShowName,
        Meta::Actors,
        Meta::AlbumArtist,
        Meta::DiscNumber,
        Meta::DiscTotal,
    ];

    pub fn from_code(code: u32) -> Option<Self> {
        Self::ALL.get(code as usize).copied()
    }

    pub fn code(self) -> u32 {
        self as u32
    }
}

/// Outcome of an asynchronous parse request
///
/// `None` is the initial state and `Pending` is entered by a successful
/// request. Every other state is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ParsedStatus {
    #[default]
    None,
    Pending,
    Skipped,
    Failed,
    Timeout,
    Cancelled,
    Done,
}

impl ParsedStatus {
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(ParsedStatus::None),
            1 => Some(ParsedStatus::Skipped),
            2 => Some(ParsedStatus::Failed),
            3 => Some(ParsedStatus::Timeout),
            4 => Some(ParsedStatus::Done),
            5 => Some(ParsedStatus::Cancelled),
            6 => Some(ParsedStatus::Pending),
            _ => None,
        }
    }

    pub fn code(self) -> u32 {
        match self {
            ParsedStatus::None => 0,
            ParsedStatus::Skipped => 1,
            ParsedStatus::Failed => 2,
            ParsedStatus::Timeout => 3,
            ParsedStatus::Done => 4,
            ParsedStatus::Cancelled => 5,
            ParsedStatus::Pending => 6,
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, ParsedStatus::None | ParsedStatus::Pending)
    }
}

/// What kind of source a media item is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MediaType {
    #[default]
    Unknown,
    File,
    Directory,
    Disc,
    Stream,
    Playlist,
}

impl MediaType {
    pub fn from_code(code: u32) -> Self {
        match code {
            1 => MediaType::File,
            2 => MediaType::Directory,
            3 => MediaType::Disc,
            4 => MediaType::Stream,
            5 => MediaType::Playlist,
            _ => MediaType::Unknown,
        }
    }
}

/// Playback state of a media item or player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MediaState {
    #[default]
    NothingSpecial,
    Opening,
    Buffering,
    Playing,
    Paused,
    Stopped,
    Ended,
    Error,
}

impl MediaState {
    pub fn from_code(code: u32) -> Self {
        match code {
            1 => MediaState::Opening,
            2 => MediaState::Buffering,
            3 => MediaState::Playing,
            4 => MediaState::Paused,
            5 => MediaState::Stopped,
            6 => MediaState::Ended,
            7 => MediaState::Error,
            _ => MediaState::NothingSpecial,
        }
    }

    pub fn code(self) -> u32 {
        self as u32
    }
}

/// Flags for a parse request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ParseFlags(u32);

impl ParseFlags {
    pub const LOCAL: ParseFlags = ParseFlags(0x00);
    pub const NETWORK: ParseFlags = ParseFlags(0x01);
    pub const FETCH_LOCAL: ParseFlags = ParseFlags(0x02);
    pub const FETCH_NETWORK: ParseFlags = ParseFlags(0x04);
    pub const DO_INTERACT: ParseFlags = ParseFlags(0x08);

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn contains(self, other: ParseFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for ParseFlags {
    type Output = ParseFlags;

    fn bitor(self, rhs: Self) -> Self::Output {
        ParseFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for ParseFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Kind of a slave input attached to a media item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SlaveType {
    Subtitle,
    Audio,
}

/// A slave input (external subtitle or audio track)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slave {
    pub kind: SlaveType,
    /// 0 (lowest) to 4 (highest)
    pub priority: u32,
    pub uri: String,
}

/// Elementary stream category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrackKind {
    Unknown,
    Audio,
    Video,
    Text,
}

impl TrackKind {
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => TrackKind::Audio,
            1 => TrackKind::Video,
            2 => TrackKind::Text,
            _ => TrackKind::Unknown,
        }
    }
}

/// Description of one elementary stream, copied out of native memory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackInfo {
    pub id: i32,
    pub kind: TrackKind,
    pub codec: String,
    pub language: Option<String>,
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meta_code_round_trip_boundaries() {
        assert_eq!(Meta::from_code(0), Some(Meta::Title));
        assert_eq!(Meta::from_code(25), Some(Meta::DiscTotal));
        assert_eq!(Meta::from_code(26), None);
        assert_eq!(Meta::AlbumArtist.code(), 23);
    }

    #[test]
    fn test_parsed_status_terminal() {
        assert!(!ParsedStatus::None.is_terminal());
        assert!(!ParsedStatus::Pending.is_terminal());
        for status in [
            ParsedStatus::Skipped,
            ParsedStatus::Failed,
            ParsedStatus::Timeout,
            ParsedStatus::Cancelled,
            ParsedStatus::Done,
        ] {
            assert!(status.is_terminal(), "{:?} should be terminal", status);
            assert_eq!(ParsedStatus::from_code(status.code()), Some(status));
        }
        assert_eq!(ParsedStatus::from_code(42), None);
    }

    #[test]
    fn test_parse_flags() {
        let flags = ParseFlags::NETWORK | ParseFlags::FETCH_LOCAL;
        assert_eq!(flags.bits(), 0x03);
        assert!(flags.contains(ParseFlags::NETWORK));
        assert!(!flags.contains(ParseFlags::DO_INTERACT));
    }
}
