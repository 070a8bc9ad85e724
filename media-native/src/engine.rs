use crate::error::Result;
use crate::event::{EventType, NativeCallback};
use crate::handle::NativeHandle;
use crate::types::{MediaState, MediaType, Meta, ParseFlags, ParsedStatus, Slave, SlaveType, TrackInfo};
use crate::version::EngineVersion;

/// Operations consumed from a reference-counted native multimedia engine
///
/// Every `*_new*`, `*_duplicate`, `media_subitems`, `list_item_at` and
/// `player_media` call returns a handle the caller owns and must release
/// exactly once. `*_retain` adds one owner to an existing identity.
///
/// Implementations are called from application threads and from the
/// dispatch threads of media-sdk event managers, never from inside a native
/// callback (apart from the retain used to copy a handle payload out).
pub trait NativeEngine: Send + Sync {
    /// Version of the running engine, queried once per event manager
    fn version(&self) -> EngineVersion;

    // ---- media -----------------------------------------------------------

    fn media_new_location(&self, mrl: &str) -> Option<NativeHandle>;
    fn media_new_path(&self, path: &str) -> Option<NativeHandle>;
    /// A node is an empty container media, used to build playlists
    fn media_new_as_node(&self, name: &str) -> Option<NativeHandle>;
    fn media_retain(&self, media: NativeHandle);
    fn media_release(&self, media: NativeHandle);
    /// Clone into a new identity; `None` when the media cannot be cloned
    fn media_duplicate(&self, media: NativeHandle) -> Option<NativeHandle>;

    fn media_mrl(&self, media: NativeHandle) -> Option<String>;
    fn media_add_option(&self, media: NativeHandle, option: &str);
    /// Options currently applied to this media identity
    fn media_options(&self, media: NativeHandle) -> Vec<String>;
    fn media_meta(&self, media: NativeHandle, meta: Meta) -> Option<String>;
    fn media_set_meta(&self, media: NativeHandle, meta: Meta, value: &str);
    fn media_save_meta(&self, media: NativeHandle) -> Result<()>;
    /// Duration in milliseconds, `-1` when unknown
    fn media_duration(&self, media: NativeHandle) -> i64;
    fn media_type(&self, media: NativeHandle) -> MediaType;
    fn media_state(&self, media: NativeHandle) -> MediaState;
    fn media_tracks(&self, media: NativeHandle) -> Vec<TrackInfo>;

    /// Start an asynchronous parse; completion arrives as a parsed-changed event
    fn media_parse(&self, media: NativeHandle, flags: ParseFlags, timeout_ms: i32) -> Result<()>;
    fn media_parse_stop(&self, media: NativeHandle);
    fn media_parsed_status(&self, media: NativeHandle) -> ParsedStatus;

    /// Child list of this media, retained for the caller
    fn media_subitems(&self, media: NativeHandle) -> Option<NativeHandle>;

    fn media_add_slave(&self, media: NativeHandle, kind: SlaveType, priority: u32, uri: &str)
        -> Result<()>;
    fn media_clear_slaves(&self, media: NativeHandle);
    fn media_slaves(&self, media: NativeHandle) -> Vec<Slave>;

    // ---- media list ------------------------------------------------------

    fn list_new(&self) -> Option<NativeHandle>;
    fn list_retain(&self, list: NativeHandle);
    fn list_release(&self, list: NativeHandle);
    fn list_lock(&self, list: NativeHandle);
    fn list_unlock(&self, list: NativeHandle);
    fn list_count(&self, list: NativeHandle) -> i32;
    /// Item at `index`, retained for the caller
    fn list_item_at(&self, list: NativeHandle, index: i32) -> Option<NativeHandle>;
    fn list_add(&self, list: NativeHandle, media: NativeHandle) -> Result<()>;
    fn list_insert(&self, list: NativeHandle, media: NativeHandle, index: i32) -> Result<()>;
    fn list_remove(&self, list: NativeHandle, index: i32) -> Result<()>;
    fn list_index_of(&self, list: NativeHandle, media: NativeHandle) -> i32;
    fn list_is_read_only(&self, list: NativeHandle) -> bool;

    // ---- media player ----------------------------------------------------

    fn player_new(&self) -> Option<NativeHandle>;
    fn player_retain(&self, player: NativeHandle);
    fn player_release(&self, player: NativeHandle);
    /// Replace the player's media; the player takes its own reference
    fn player_set_media(&self, player: NativeHandle, media: Option<NativeHandle>);
    /// Current media, retained for the caller
    fn player_media(&self, player: NativeHandle) -> Option<NativeHandle>;
    fn player_play(&self, player: NativeHandle) -> Result<()>;
    fn player_pause(&self, player: NativeHandle, pause: bool);
    fn player_stop(&self, player: NativeHandle);
    fn player_is_playing(&self, player: NativeHandle) -> bool;
    fn player_state(&self, player: NativeHandle) -> MediaState;

    // ---- events ----------------------------------------------------------

    /// Register `callback` on the event manager of `resource` for one code
    fn event_attach(
        &self,
        resource: NativeHandle,
        event: EventType,
        callback: NativeCallback,
    ) -> Result<()>;

    /// Remove a callback previously attached with the same identity
    fn event_detach(&self, resource: NativeHandle, event: EventType, callback: &NativeCallback);
}
