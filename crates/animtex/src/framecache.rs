use std::collections::HashMap;
use std::time::Duration;

use egui::{Color32, ColorImage};

use crate::animation::texture::check_texture_size;
use crate::media::decode::{DecodedFrame, DecodedImage, FrameDims, SourceKind};
use crate::{Error, Result};

/// One realized frame, always the size of its entry's canvas
pub struct FrameBuffer {
    pub image: ColorImage,
    pub delay: Duration,
}

impl FrameBuffer {
    pub fn width(&self) -> usize {
        self.image.width()
    }

    pub fn height(&self) -> usize {
        self.image.height()
    }
}

/// Decoded frames for one source plus the drawing surface they get painted
/// into. The frame list never changes after the entry is built.
pub struct CacheEntry {
    surface: ColorImage,
    frames: Vec<FrameBuffer>,
}

impl CacheEntry {
    pub fn frames(&self) -> &[FrameBuffer] {
        &self.frames
    }

    pub fn num_frames(&self) -> usize {
        self.frames.len()
    }

    pub fn get_frame(&self, index: usize) -> Option<&FrameBuffer> {
        self.frames.get(index)
    }

    pub fn surface(&self) -> &ColorImage {
        &self.surface
    }

    /// Paint frame `index` into the drawing surface and return the surface
    pub fn paint(&mut self, index: usize) -> Option<&ColorImage> {
        let frame = self.frames.get(index)?;

        if self.surface.size == frame.image.size {
            self.surface.pixels.copy_from_slice(&frame.image.pixels);
        } else {
            self.surface = frame.image.clone();
        }

        Some(&self.surface)
    }
}

impl std::fmt::Debug for CacheEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheEntry")
            .field("surface", &self.surface.size)
            .field("frames", &self.frames.len())
            .finish()
    }
}

/// Decoded frame sequences keyed by source url. Only written by delivered
/// decode results; there is no removal.
#[derive(Default)]
pub struct FrameCache {
    entries: HashMap<String, CacheEntry>,
}

impl FrameCache {
    pub fn get(&self, url: &str) -> Option<&CacheEntry> {
        self.entries.get(url)
    }

    pub fn get_mut(&mut self, url: &str) -> Option<&mut CacheEntry> {
        self.entries.get_mut(url)
    }

    pub fn contains(&self, url: &str) -> bool {
        self.entries.contains_key(url)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Materialize a decode result and store it under `url`, replacing any
    /// previous entry. On error the cache is left as it was.
    #[profiling::function]
    pub fn insert_decoded(&mut self, url: String, decoded: DecodedImage) -> Result<()> {
        let (width, height) = decoded.canvas_size();
        let size = [width as usize, height as usize];
        let frames = materialize(decoded)?;

        let surface = match self.entries.remove(&url) {
            Some(prev) if prev.surface.size == size => prev.surface,
            _ => ColorImage::new(size, Color32::TRANSPARENT),
        };

        tracing::trace!(
            "caching {} frames for {url} at {width}x{height}",
            frames.len()
        );
        self.entries.insert(url, CacheEntry { surface, frames });
        Ok(())
    }
}

fn materialize(decoded: DecodedImage) -> Result<Vec<FrameBuffer>> {
    let (width, height) = decoded.canvas_size();
    if !decoded.frames.is_empty() && (width == 0 || height == 0) {
        return Err(Error::zero_sized());
    }
    check_texture_size([width as usize, height as usize])?;

    match decoded.kind {
        SourceKind::Gif => {
            let size = [width as usize, height as usize];
            decoded
                .frames
                .into_iter()
                .map(|frame| {
                    let patch = patch_to_color_image(frame.dims, &frame.patch)?;
                    let mut canvas = ColorImage::new(size, Color32::TRANSPARENT);
                    blit(
                        &mut canvas,
                        &patch,
                        frame.dims.left as usize,
                        frame.dims.top as usize,
                    );
                    Ok(FrameBuffer {
                        image: canvas,
                        delay: frame.delay,
                    })
                })
                .collect()
        }
        SourceKind::Still => decoded
            .frames
            .into_iter()
            .map(|DecodedFrame { patch, delay, .. }| {
                let image = patch_to_color_image(FrameDims::full(width, height), &patch)?;
                Ok(FrameBuffer { image, delay })
            })
            .collect(),
    }
}

fn patch_to_color_image(dims: FrameDims, patch: &[u8]) -> Result<ColorImage> {
    let expected = dims.rgba_len();
    if patch.len() != expected {
        return Err(Error::patch_length(expected, patch.len()));
    }

    Ok(ColorImage::from_rgba_unmultiplied(
        [dims.width as usize, dims.height as usize],
        patch,
    ))
}

/// Copy `patch` onto `canvas` at (`left`, `top`), clipped to the canvas
fn blit(canvas: &mut ColorImage, patch: &ColorImage, left: usize, top: usize) {
    let [canvas_w, canvas_h] = canvas.size;
    let [patch_w, patch_h] = patch.size;
    if left >= canvas_w || top >= canvas_h {
        return;
    }

    let copy_w = patch_w.min(canvas_w - left);
    for y in 0..patch_h.min(canvas_h - top) {
        let src = &patch.pixels[y * patch_w..y * patch_w + copy_w];
        let dst = (top + y) * canvas_w + left;
        canvas.pixels[dst..dst + copy_w].copy_from_slice(src);
    }
}
