use std::time::Instant;

use crate::animation::config::PlaybackConfig;
use crate::animation::texture::AnimationTexture;
use crate::animation::timer::FrameTimer;
use crate::framecache::{CacheEntry, FrameCache};
use crate::{AnimationFrameService, Error, FrameError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackPhase {
    Uninitialized,
    WaitingForFrames,
    Playing,
    StoppedAtLast,
}

/// What a single tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// No frames cached for the url yet
    Waiting,
    /// Non-looping playback sitting on its last frame
    Stopped,
    /// Single-frame source that has already been published
    Static,
    /// The texture was created from frame `index`
    Published { index: usize },
    /// The existing texture now shows frame `index`, which may belong to a
    /// source the texture wasn't showing before
    Advanced { index: usize },
}

/// Playback state for one consumer of one source url.
///
/// Drive it with [`Playback::poll`] from whatever loop the host has, or call
/// [`Playback::tick`] directly to step it.
pub struct Playback {
    config: PlaybackConfig,
    index: usize,
    texture: Option<AnimationTexture>,
    /// Whether the texture holds a frame of the current url. Cleared when
    /// the url changes; the texture itself is kept.
    shown: bool,
    timer: Option<FrameTimer>,
    active: bool,
}

impl Playback {
    pub fn new(config: PlaybackConfig) -> Self {
        Self {
            config,
            index: 0,
            texture: None,
            shown: false,
            timer: None,
            active: false,
        }
    }

    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// The published texture, `None` until the first frame is shown
    pub fn texture(&self) -> Option<&AnimationTexture> {
        self.texture.as_ref()
    }

    pub fn texture_mut(&mut self) -> Option<&mut AnimationTexture> {
        self.texture.as_mut()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Request the source and arm the timer (unless auto-advance is off)
    pub fn activate(&mut self, service: &mut AnimationFrameService, now: Instant) {
        service.load(&self.config.url);
        self.timer = self
            .config
            .enabled_interval
            .then(|| FrameTimer::new(self.config.interval, now));
        self.active = true;
        tracing::debug!(
            "activated playback for {} (interval {:?}, loop {})",
            self.config.url,
            self.timer.as_ref().map(FrameTimer::interval),
            self.config.enabled_loop
        );
    }

    /// Clear the timer. An in-flight decode for the url keeps going and
    /// simply ends up in the cache.
    pub fn deactivate(&mut self) {
        if self.active {
            tracing::debug!("deactivated playback for {}", self.config.url);
        }
        self.timer = None;
        self.active = false;
    }

    /// Swap in a new config. Any change restarts the clock; a new url also
    /// rewinds to frame 0. The texture is kept either way. Returns whether
    /// anything changed.
    pub fn reconfigure(
        &mut self,
        config: PlaybackConfig,
        service: &mut AnimationFrameService,
        now: Instant,
    ) -> bool {
        if config == self.config {
            return false;
        }

        let was_active = self.active;
        self.deactivate();
        if config.url != self.config.url {
            self.index = 0;
            self.shown = false;
        }
        self.config = config;

        if was_active {
            self.activate(service, now);
        }

        true
    }

    /// Run a tick if the timer is due. Returns when the next tick is due so
    /// the host can schedule a repaint, or `None` if nothing is scheduled.
    pub fn poll(&mut self, service: &mut AnimationFrameService, now: Instant) -> Option<Instant> {
        let due = match &mut self.timer {
            None => return None,
            Some(timer) if timer.is_due(now) => {
                timer.fire(now);
                true
            }
            Some(_) => false,
        };

        if due {
            let (cache, ctx) = service.cache_and_ctx();
            self.tick(cache, ctx);
        }

        self.timer.as_ref().map(FrameTimer::next_tick)
    }

    /// Advance one frame and publish it
    pub fn tick(&mut self, cache: &mut FrameCache, ctx: &egui::Context) -> TickOutcome {
        let Some(entry) = cache.get_mut(&self.config.url) else {
            return TickOutcome::Waiting;
        };

        let num_frames = entry.num_frames();
        if num_frames == 0 {
            return TickOutcome::Waiting;
        }

        let last = num_frames - 1;
        let frozen = num_frames == 1 || (!self.config.enabled_loop && self.index >= last);
        if frozen && self.shown {
            return if num_frames == 1 {
                TickOutcome::Static
            } else {
                TickOutcome::Stopped
            };
        }

        // a frozen source nobody has seen yet is shown where it is
        let index = if frozen {
            self.index.min(last)
        } else {
            (self.index + 1) % num_frames
        };

        let created = match self.publish(entry, index, ctx) {
            Ok(created) => created,
            Err(e) => {
                tracing::error!("could not publish {} frame {index}: {e}", self.config.url);
                return TickOutcome::Waiting;
            }
        };
        self.index = index;
        tracing::trace!("{} -> frame {index}/{num_frames}", self.config.url);

        if created {
            TickOutcome::Published { index }
        } else {
            TickOutcome::Advanced { index }
        }
    }

    pub fn phase(&self, cache: &FrameCache) -> PlaybackPhase {
        if !self.active {
            return PlaybackPhase::Uninitialized;
        }

        let num_frames = cache
            .get(&self.config.url)
            .map(CacheEntry::num_frames)
            .unwrap_or(0);

        if num_frames == 0 {
            PlaybackPhase::WaitingForFrames
        } else if !self.config.enabled_loop && self.index >= num_frames - 1 && self.shown {
            PlaybackPhase::StoppedAtLast
        } else {
            PlaybackPhase::Playing
        }
    }

    /// Paint `index` into the entry's surface and push it to the texture.
    /// Returns true when the texture had to be created.
    fn publish(
        &mut self,
        entry: &mut CacheEntry,
        index: usize,
        ctx: &egui::Context,
    ) -> Result<bool> {
        let surface = entry
            .paint(index)
            .ok_or(Error::InvalidFrame(FrameError::Missing(index)))?;

        let created = match &mut self.texture {
            Some(texture) => {
                texture.update(surface)?;
                false
            }
            None => {
                let name = format!("{}#animation", self.config.url);
                self.texture = Some(AnimationTexture::create(ctx, name, surface)?);
                true
            }
        };

        self.shown = true;
        Ok(created)
    }
}
