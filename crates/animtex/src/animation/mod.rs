pub mod clock;
pub mod config;
pub mod texture;
pub mod timer;

pub use clock::{Playback, PlaybackPhase, TickOutcome};
pub use config::PlaybackConfig;
pub use texture::{AnimationTexture, MAX_TEXTURE_SIZE};
pub use timer::FrameTimer;
