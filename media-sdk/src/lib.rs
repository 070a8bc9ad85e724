//! # Media SDK - typed wrappers over a reference-counted media engine
//!
//! Provides media items, media lists and media players as Rust objects while
//! decoding and playback stay inside a native engine:
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use media_sdk::{MediaPlayerEventListener, MediaPlayerFactory, SdkConfig};
//!
//! struct Progress;
//!
//! impl MediaPlayerEventListener for Progress {
//!     fn sub_item_played(&self, index: usize) {
//!         println!("playing child {}", index);
//!     }
//!     fn end_of_sub_items(&self) {
//!         println!("done");
//!     }
//! }
//!
//! fn main() -> Result<(), media_sdk::SdkError> {
//!     let factory = MediaPlayerFactory::with_config(engine(), SdkConfig::load()?)?;
//!
//!     let media = factory.new_media("http://example.com/list.m3u", &[]).expect("media");
//!     media.parsing.parse();                              // async, see parsed_changed
//!
//!     let player = factory.new_media_player().expect("player");
//!     player.events.add_listener(Arc::new(Progress))?;
//!     player.media.set(&media, &[]);
//!     player.controls.start();                            // play and wait
//!
//!     player.release();
//!     media.release();
//!     Ok(())
//! }
//! ```
//!
//! ## Key Features
//!
//! - **Ownership you can count**: every wrapper owns exactly one native
//!   reference and gives it back exactly once, on `release()` or drop
//! - **Share or duplicate**: `share()` is the same identity, `duplicate()` an
//!   independent copy
//! - **Facets**: `media.info`, `media.meta`, `media.parsing`, `player.controls`,
//!   `player.sub_items`, ...
//! - **Ordered events**: one dispatch thread per resource, last-registered
//!   listener notified first, listener code never runs on engine threads
//! - **Sub-item sequencing**: playlists play child after child, with repeat
//!
//! ## Architecture
//!
//! ```text
//! media-sdk (wrappers, facets, state machines)
//!     ↓
//! media-event-manager (native callback -> dispatch thread -> listeners)
//!     ↓
//! media-native (handles, event codes, NativeEngine trait)
//! ```

// Main exports
pub use config::{EventSettings, SdkConfig};
pub use error::{ConfigError, Result, SdkError};
pub use factory::MediaPlayerFactory;
pub use list::{ListEvents, MediaList, MediaListGuard};
pub use media::{
    Media, MediaEvents, MediaInfo, MediaItem, MediaMeta, MediaOptions, MediaParsing, MediaRef,
    MediaSlaves, MediaSubItems, MetaData,
};
pub use player::{MediaPlayer, PlayerControls, PlayerEvents, PlayerMedia, SubItemSequencer};

pub use events::{
    MediaEvent, MediaEventListener, MediaListEvent, MediaListEventListener, MediaPlayerEvent,
    MediaPlayerEventListener, Thumbnail,
};

// Re-export commonly used types from media-native
pub use media_native::{
    EngineVersion, MediaState, MediaType, Meta, NativeEngine, NativeHandle, ParseFlags,
    ParsedStatus, Slave, SlaveType, TrackInfo, TrackKind,
};

pub mod events;
pub mod logging;

// Internal modules
mod config;
mod error;
mod factory;
mod handle;
mod list;
mod media;
mod player;
