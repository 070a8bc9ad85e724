//! Entry point creating every wrapper
//!
//! Factory operations return `None` when the engine produced no resource,
//! e.g. for a malformed locator.

use std::path::Path;
use std::sync::Arc;

use media_native::{EngineVersion, NativeEngine, NativeHandle, ResourceKind};

use crate::config::SdkConfig;
use crate::error::Result;
use crate::handle::OwnedHandle;
use crate::list::MediaList;
use crate::media::{Media, MediaRef};
use crate::player::MediaPlayer;

/// Creates media, lists and players on one engine
///
/// # Example
///
/// ```rust,ignore
/// use media_sdk::{MediaPlayerFactory, SdkConfig};
///
/// let factory = MediaPlayerFactory::with_config(engine, SdkConfig::load()?)?;
/// let player = factory.new_media_player().expect("player");
///
/// if player.media.start("http://example.com/stream.mp3", &[]) {
///     println!("playing");
/// }
/// ```
#[derive(Clone)]
pub struct MediaPlayerFactory {
    engine: Arc<dyn NativeEngine>,
    config: Arc<SdkConfig>,
}

impl MediaPlayerFactory {
    /// A factory with the default configuration
    pub fn new(engine: Arc<dyn NativeEngine>) -> Self {
        Self {
            engine,
            config: Arc::new(SdkConfig::default()),
        }
    }

    /// A factory with a validated configuration
    pub fn with_config(engine: Arc<dyn NativeEngine>, config: SdkConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            engine,
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &SdkConfig {
        &self.config
    }

    pub fn version(&self) -> EngineVersion {
        self.engine.version()
    }

    /// A media for a locator such as `http://...` or `file:///...`
    pub fn new_media(&self, mrl: &str, options: &[&str]) -> Option<Media> {
        let handle = self.created("media", mrl, self.engine.media_new_location(mrl))?;
        Some(self.media(handle, options))
    }

    pub fn new_media_from_path(&self, path: impl AsRef<Path>, options: &[&str]) -> Option<Media> {
        let path = path.as_ref().to_string_lossy();
        let handle = self.created("media", &path, self.engine.media_new_path(&path))?;
        Some(self.media(handle, options))
    }

    /// An empty container media, for building playlists by hand
    pub fn new_media_node(&self, name: &str) -> Option<Media> {
        let handle = self.created("media node", name, self.engine.media_new_as_node(name))?;
        Some(self.media(handle, &[]))
    }

    /// A lightweight reference for a locator
    pub fn new_media_ref(&self, mrl: &str, options: &[&str]) -> Option<MediaRef> {
        let handle = self.created("media", mrl, self.engine.media_new_location(mrl))?;
        self.apply_options(handle, options);
        Some(MediaRef::from_owner(self.adopt(handle, ResourceKind::Media), Arc::clone(&self.config)))
    }

    pub fn new_media_list(&self) -> Option<MediaList> {
        let handle = self.created("media list", "", self.engine.list_new())?;
        Some(MediaList::from_owner(
            self.adopt(handle, ResourceKind::MediaList),
            Arc::clone(&self.config),
        ))
    }

    pub fn new_media_player(&self) -> Option<MediaPlayer> {
        let handle = self.created("media player", "", self.engine.player_new())?;
        match MediaPlayer::from_owner(
            self.adopt(handle, ResourceKind::MediaPlayer),
            Arc::clone(&self.config),
        ) {
            Ok(player) => Some(player),
            Err(e) => {
                tracing::warn!("Media player {} could not start its events: {}", handle, e);
                None
            }
        }
    }

    fn created(&self, what: &str, source: &str, handle: Option<NativeHandle>) -> Option<NativeHandle> {
        match handle {
            Some(handle) => {
                tracing::debug!("Created {} {} {}", what, handle, source);
                Some(handle)
            }
            None => {
                tracing::debug!("Engine could not create {} from {:?}", what, source);
                None
            }
        }
    }

    fn adopt(&self, handle: NativeHandle, kind: ResourceKind) -> OwnedHandle {
        OwnedHandle::adopt(Arc::clone(&self.engine), handle, kind)
    }

    fn media(&self, handle: NativeHandle, options: &[&str]) -> Media {
        self.apply_options(handle, options);
        Media::from_owner(self.adopt(handle, ResourceKind::Media), Arc::clone(&self.config))
    }

    /// Configured defaults first, then the caller's options
    fn apply_options(&self, handle: NativeHandle, options: &[&str]) {
        let defaults = self.config.default_media_options.iter().map(String::as_str);
        for option in defaults.chain(options.iter().copied()) {
            self.engine.media_add_option(handle, option);
        }
    }
}
