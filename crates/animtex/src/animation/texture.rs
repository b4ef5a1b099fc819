use egui::{ColorImage, TextureHandle, TextureId, TextureOptions};

use crate::{Error, Result};

/// wgpu's default max texture dimension
pub const MAX_TEXTURE_SIZE: usize = 8192;

pub fn check_texture_size(size: [usize; 2]) -> Result<()> {
    let [width, height] = size;
    if width > MAX_TEXTURE_SIZE || height > MAX_TEXTURE_SIZE {
        return Err(Error::too_large(width, height, MAX_TEXTURE_SIZE));
    }
    Ok(())
}

/// `ctx.load_texture`, refusing images the gpu can't take
pub fn load_texture_checked(
    ctx: &egui::Context,
    name: impl Into<String>,
    image: ColorImage,
    options: TextureOptions,
) -> Result<TextureHandle> {
    check_texture_size(image.size)?;
    Ok(ctx.load_texture(name, image, options))
}

/// A texture with a stable identity and a swappable backing image.
///
/// Renderers hold on to [`AnimationTexture::id`] (or a clone of the handle)
/// for as long as the animation lives, so the texture is created once and
/// every later frame goes through [`AnimationTexture::update`], which swaps
/// the image behind the same id. `ColorImage` pixels are premultiplied, so
/// uploads composite with premultiplied alpha; sampling is linear.
pub struct AnimationTexture {
    handle: TextureHandle,
    needs_update: bool,
    generation: u64,
}

impl AnimationTexture {
    pub const OPTIONS: TextureOptions = TextureOptions::LINEAR;

    pub fn create(
        ctx: &egui::Context,
        name: impl Into<String>,
        surface: &ColorImage,
    ) -> Result<Self> {
        let handle = load_texture_checked(ctx, name, surface.clone(), Self::OPTIONS)?;
        Ok(Self {
            handle,
            needs_update: true,
            generation: 0,
        })
    }

    /// Point the texture at a newly painted surface and flag it for upload.
    /// An oversized surface leaves the texture as it was.
    pub fn update(&mut self, surface: &ColorImage) -> Result<()> {
        check_texture_size(surface.size)?;
        self.handle.set(surface.clone(), Self::OPTIONS);
        self.needs_update = true;
        self.generation += 1;
        Ok(())
    }

    pub fn handle(&self) -> &TextureHandle {
        &self.handle
    }

    pub fn id(&self) -> TextureId {
        self.handle.id()
    }

    pub fn size(&self) -> [usize; 2] {
        self.handle.size()
    }

    pub fn needs_update(&self) -> bool {
        self.needs_update
    }

    /// Read and clear the dirty flag
    pub fn take_needs_update(&mut self) -> bool {
        std::mem::take(&mut self.needs_update)
    }

    /// How many times the backing image has been swapped since creation
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl std::fmt::Debug for AnimationTexture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimationTexture")
            .field("id", &self.id())
            .field("needs_update", &self.needs_update)
            .field("generation", &self.generation)
            .finish()
    }
}
