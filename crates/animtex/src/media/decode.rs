use std::io::Cursor;
use std::time::Duration;

use image::codecs::gif::GifDecoder;
use image::{AnimationDecoder, ImageDecoder, ImageFormat};

use crate::Result;

/// Declared geometry of one decoded frame. `left`/`top` place the patch on
/// the canvas. [`decode_source`] always produces full-canvas frames at zero
/// offset; hand-built [`DecodedImage`]s may carry partial patches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameDims {
    pub width: u32,
    pub height: u32,
    pub left: u32,
    pub top: u32,
}

impl FrameDims {
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            left: 0,
            top: 0,
        }
    }

    /// Number of rgba8 bytes a patch with these dimensions must have
    pub fn rgba_len(&self) -> usize {
        self.width as usize * self.height as usize * 4
    }
}

/// A frame as it leaves the decoder: unmultiplied rgba8 bytes plus its
/// dimensions. Gif frames come out of `image` already composited over the
/// previous ones according to their disposal, so each patch covers the whole
/// logical screen.
pub struct DecodedFrame {
    pub patch: Vec<u8>,
    pub dims: FrameDims,
    pub delay: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Gif,
    Still,
}

pub struct DecodedImage {
    pub kind: SourceKind,
    /// Natural size of the container (gif logical screen, or image size)
    pub width: u32,
    pub height: u32,
    pub frames: Vec<DecodedFrame>,
}

impl DecodedImage {
    /// The size every materialized frame is drawn at. Gifs use the first
    /// frame's declared size, stills use the natural size.
    pub fn canvas_size(&self) -> (u32, u32) {
        match self.kind {
            SourceKind::Gif => self
                .frames
                .first()
                .map(|f| (f.dims.width, f.dims.height))
                .unwrap_or((self.width, self.height)),
            SourceKind::Still => (self.width, self.height),
        }
    }
}

impl std::fmt::Debug for DecodedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecodedImage")
            .field("kind", &self.kind)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("frames", &self.frames.len())
            .finish()
    }
}

/// Sniff the bytes first; fall back to the url suffix when the format
/// can't be guessed.
pub fn is_gif(key: &str, bytes: &[u8]) -> bool {
    match image::guess_format(bytes) {
        Ok(format) => format == ImageFormat::Gif,
        Err(_) => {
            let path = key.split(['?', '#']).next().unwrap_or(key);
            path.to_ascii_lowercase().ends_with(".gif")
        }
    }
}

#[profiling::function]
pub fn decode_source(key: &str, bytes: &[u8]) -> Result<DecodedImage> {
    if is_gif(key, bytes) {
        decode_gif(bytes)
    } else {
        decode_still(bytes)
    }
}

fn decode_gif(bytes: &[u8]) -> Result<DecodedImage> {
    let decoder = GifDecoder::new(Cursor::new(bytes))?;
    let (width, height) = decoder.dimensions();

    let frames = decoder
        .into_frames()
        .collect_frames()?
        .into_iter()
        .map(|frame| {
            let left = frame.left();
            let top = frame.top();
            let delay = Duration::from(frame.delay());
            let buffer = frame.into_buffer();
            DecodedFrame {
                dims: FrameDims {
                    width: buffer.width(),
                    height: buffer.height(),
                    left,
                    top,
                },
                patch: buffer.into_raw(),
                delay,
            }
        })
        .collect();

    Ok(DecodedImage {
        kind: SourceKind::Gif,
        width,
        height,
        frames,
    })
}

fn decode_still(bytes: &[u8]) -> Result<DecodedImage> {
    let image = image::load_from_memory(bytes)?.into_rgba8();
    let (width, height) = image.dimensions();

    Ok(DecodedImage {
        kind: SourceKind::Still,
        width,
        height,
        frames: vec![DecodedFrame {
            patch: image.into_raw(),
            dims: FrameDims::full(width, height),
            delay: Duration::ZERO,
        }],
    })
}
