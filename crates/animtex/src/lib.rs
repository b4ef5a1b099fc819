//! Decode gif and still-image sources off the ui thread and cycle their
//! frames onto egui textures.
//!
//! An [`AnimationFrameService`] owns the decoded-frame cache and the decode
//! worker. Each consumer keeps a [`Playback`], which loads its url through
//! the service and, on every tick, paints the next frame and publishes it to
//! a single long-lived [`AnimationTexture`].
//!
//! ```no_run
//! use std::time::Instant;
//! use animtex::{AnimationFrameService, Playback, PlaybackConfig};
//!
//! # fn frame(ctx: &egui::Context) -> animtex::Result<()> {
//! let mut service = AnimationFrameService::http(ctx.clone())?;
//! let mut playback = Playback::new(PlaybackConfig::new("https://example.com/cat.gif"));
//! playback.activate(&mut service, Instant::now());
//!
//! // once per ui frame
//! service.process_results();
//! if let Some(next) = playback.poll(&mut service, Instant::now()) {
//!     ctx.request_repaint_after(next.saturating_duration_since(Instant::now()));
//! }
//! # Ok(())
//! # }
//! ```

mod error;
mod framecache;
mod service;

pub mod animation;
pub mod media;

#[cfg(test)]
mod test_util;

pub use animation::{
    AnimationTexture, FrameTimer, Playback, PlaybackConfig, PlaybackPhase, TickOutcome,
    MAX_TEXTURE_SIZE,
};
pub use error::{Error, FrameError, Result};
pub use framecache::{CacheEntry, FrameBuffer, FrameCache};
pub use media::{decode_source, HttpFetcher, SourceFetcher};
pub use service::AnimationFrameService;
