//! Playlist playback against the in-memory engine
//!
//! Builds a playlist media with three children, parses it, then lets the
//! sub-item sequencer play through the children while a listener prints
//! progress.
//!
//! Run with: cargo run -p media-sdk --features test-support --example playlist_playback

use std::sync::Arc;
use std::time::Duration;

use crossbeam::channel::{unbounded, Sender};
use media_native::fake::FakeEngine;
use media_sdk::{
    MediaEventListener, MediaPlayerEventListener, MediaPlayerFactory, ParsedStatus, SdkConfig,
    SdkError,
};

struct Progress(Sender<bool>);

impl MediaPlayerEventListener for Progress {
    fn playing(&self) {
        println!("   playing");
    }

    fn sub_item_played(&self, index: usize) {
        println!("-> child {} started", index);
    }

    fn sub_item_finished(&self, index: usize) {
        println!("<- child {} finished", index);
    }

    fn end_of_sub_items(&self) {
        println!("== end of playlist");
        let _ = self.0.send(true);
    }
}

struct ParseReport;

impl MediaEventListener for ParseReport {
    fn parsed_changed(&self, status: ParsedStatus) {
        println!("parse finished: {:?}", status);
    }
}

fn main() -> Result<(), SdkError> {
    media_sdk::logging::init_logging_from_env().ok();

    println!("Media SDK - Playlist Example");
    println!("============================");

    let fake = FakeEngine::new();
    let config = SdkConfig::default().with_default_options([":network-caching=300"]);
    let factory = MediaPlayerFactory::with_config(Arc::new(fake.clone()), config)?;
    println!("Engine version: {}", factory.version());

    let playlist = factory
        .new_media("http://example.com/list.m3u", &[])
        .ok_or(SdkError::InvalidState("engine refused the playlist"))?;
    playlist.events.add_listener(Arc::new(ParseReport))?;
    for i in 0..3 {
        fake.add_subitem(playlist.native_handle(), &format!("http://example.com/{}.mp3", i));
    }
    playlist.parsing.parse();
    std::thread::sleep(Duration::from_millis(100));
    println!("{} children, status {:?}", playlist.subitems.count(), playlist.parsing.status());

    let player = factory
        .new_media_player()
        .ok_or(SdkError::InvalidState("engine refused the player"))?;
    let (done_tx, done) = unbounded();
    player.events.add_listener(Arc::new(Progress(done_tx)))?;
    player.media.set(&playlist, &[]);

    // every `finished` moves the sequencer on; simulate tracks ending
    for _ in 0..4 {
        fake.finish(player.native_handle());
        std::thread::sleep(Duration::from_millis(50));
    }

    match done.recv_timeout(Duration::from_secs(2)) {
        Ok(_) => println!("Done"),
        Err(_) => println!("Playlist did not finish in time"),
    }

    player.release();
    playlist.release();
    println!("Live native handles: {}", fake.live_handles());
    Ok(())
}
