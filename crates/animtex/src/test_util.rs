//! In-memory fixtures and a stub fetcher shared by the unit tests

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::{Arc, Mutex};

use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, DynamicImage, Frame, ImageFormat, Rgba, RgbaImage};

use crate::media::network::{FetchCallback, SourceFetcher};
use crate::Error;

/// Encode a gif with `frames` solid-colored frames, each a different color
pub fn gif_bytes(frames: u8, width: u32, height: u32) -> Vec<u8> {
    let mut bytes = Vec::new();
    {
        let mut encoder = GifEncoder::new(&mut bytes);
        encoder.set_repeat(Repeat::Infinite).unwrap();
        for i in 0..frames {
            let color = Rgba([i.wrapping_mul(60), 255 - i.wrapping_mul(60), 40, 255]);
            let buffer = RgbaImage::from_pixel(width, height, color);
            let frame = Frame::from_parts(buffer, 0, 0, Delay::from_numer_denom_ms(100, 1));
            encoder.encode_frame(frame).unwrap();
        }
    }
    bytes
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba([10, 20, 30, 255]));
    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

/// A fetcher that answers from a fixed table. Requests are recorded and,
/// when `hold` is set, parked until [`StubFetcher::release`] is called.
#[derive(Clone, Default)]
pub struct StubFetcher {
    inner: Arc<Mutex<StubState>>,
}

#[derive(Default)]
struct StubState {
    sources: HashMap<String, Vec<u8>>,
    requests: Vec<String>,
    parked: Vec<(String, FetchCallback)>,
    hold: bool,
}

impl StubFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(self, url: &str, bytes: Vec<u8>) -> Self {
        self.inner
            .lock()
            .unwrap()
            .sources
            .insert(url.to_owned(), bytes);
        self
    }

    pub fn holding(self) -> Self {
        self.inner.lock().unwrap().hold = true;
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.inner.lock().unwrap().requests.clone()
    }

    /// Complete every parked request
    pub fn release(&self) {
        let parked = {
            let mut state = self.inner.lock().unwrap();
            state.hold = false;
            std::mem::take(&mut state.parked)
        };

        for (url, on_done) in parked {
            let res = self.lookup(&url);
            on_done(res);
        }
    }

    fn lookup(&self, url: &str) -> crate::Result<Vec<u8>> {
        self.inner
            .lock()
            .unwrap()
            .sources
            .get(url)
            .cloned()
            .ok_or_else(|| Error::Http(format!("404 Not Found: {url}")))
    }
}

impl SourceFetcher for StubFetcher {
    fn fetch(&self, url: &str, on_done: FetchCallback) {
        {
            let mut state = self.inner.lock().unwrap();
            state.requests.push(url.to_owned());
            if state.hold {
                state.parked.push((url.to_owned(), on_done));
                return;
            }
        }

        let res = self.lookup(url);
        on_done(res);
    }
}
