use std::collections::HashSet;
use std::sync::Arc;

use crate::framecache::{CacheEntry, FrameCache};
use crate::media::network::{HttpFetcher, SourceFetcher};
use crate::media::worker::DecoderWorker;
use crate::Result;

/// Owns the frame cache, the decode worker and the fetcher.
///
/// Construct one before any [`crate::Playback`] is activated and pass it by
/// reference to every clock. All mutation happens on the thread that owns
/// the service; the worker and fetch callbacks only talk to it through
/// channels, drained by [`AnimationFrameService::process_results`].
pub struct AnimationFrameService {
    ctx: egui::Context,
    cache: FrameCache,
    in_flight: HashSet<String>,
    fetcher: Arc<dyn SourceFetcher>,
    worker: DecoderWorker,
}

impl AnimationFrameService {
    pub fn new(ctx: egui::Context, fetcher: impl SourceFetcher + 'static) -> Result<Self> {
        let worker = DecoderWorker::spawn(Some(ctx.clone()))?;
        Ok(Self {
            ctx,
            cache: FrameCache::default(),
            in_flight: Default::default(),
            fetcher: Arc::new(fetcher),
            worker,
        })
    }

    /// A service that fetches sources over http
    pub fn http(ctx: egui::Context) -> Result<Self> {
        Self::new(ctx, HttpFetcher)
    }

    /// Make sure `url` is cached or on its way. Returns true only when this
    /// call started a fetch; repeated calls for the same url are no-ops.
    pub fn load(&mut self, url: &str) -> bool {
        if self.cache.contains(url) || self.in_flight.contains(url) {
            return false;
        }

        if !self.worker.is_running() {
            tracing::warn!("not loading {url}: decoder worker is shut down");
            return false;
        }

        self.in_flight.insert(url.to_owned());

        let sender = self.worker.sender();
        let key = url.to_owned();
        tracing::debug!("loading animation frames for {url}");
        self.fetcher.fetch(
            url,
            Box::new(move |res: Result<Vec<u8>>| {
                let posted = match res {
                    Ok(bytes) => sender.decode(key.clone(), bytes),
                    Err(e) => {
                        tracing::error!("failed to fetch {key}: {e}");
                        sender.fail(key.clone(), e)
                    }
                };

                if let Err(e) = posted {
                    tracing::debug!("dropping fetch result for {key}: {e}");
                }
            }),
        );

        true
    }

    /// Fire-and-forget cache warm-up
    pub fn pre_load(&mut self, url: &str) {
        self.load(url);
    }

    pub fn get_frames(&self, url: &str) -> Option<&CacheEntry> {
        self.cache.get(url)
    }

    pub fn is_loading(&self, url: &str) -> bool {
        self.in_flight.contains(url)
    }

    pub fn cache(&self) -> &FrameCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut FrameCache {
        &mut self.cache
    }

    pub fn ctx(&self) -> &egui::Context {
        &self.ctx
    }

    pub(crate) fn cache_and_ctx(&mut self) -> (&mut FrameCache, &egui::Context) {
        (&mut self.cache, &self.ctx)
    }

    /// Apply every decode result that has arrived, in arrival order.
    /// Returns how many cache entries were written.
    #[profiling::function]
    pub fn process_results(&mut self) -> usize {
        let mut applied = 0;

        while let Ok(res) = self.worker.results().try_recv() {
            self.in_flight.remove(&res.key);

            let image = match res.image {
                Ok(image) => image,
                Err(e) => {
                    tracing::debug!("no frames for {}: {e}", res.key);
                    continue;
                }
            };

            let key = res.key;
            match self.cache.insert_decoded(key.clone(), image) {
                Ok(()) => {
                    tracing::trace!("delivered frames for {key}");
                    applied += 1;
                }
                Err(e) => tracing::error!("could not cache frames for {key}: {e}"),
            }
        }

        applied
    }

    /// Stop the decode worker. Loads after this are ignored.
    pub fn shutdown(&mut self) {
        self.worker.shutdown();
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::time::{Duration, Instant};

    use super::*;
    use crate::test_util::{gif_bytes, png_bytes, StubFetcher};

    const GIF_URL: &str = "https://example.com/cat.gif";
    const PNG_URL: &str = "https://example.com/dog.png";

    /// Drain results until `url` settles (cached or failed)
    pub(crate) fn settle(service: &mut AnimationFrameService, url: &str) {
        let deadline = Instant::now() + Duration::from_secs(10);
        while service.is_loading(url) {
            service.process_results();
            assert!(Instant::now() < deadline, "timed out waiting for {url}");
            std::thread::sleep(Duration::from_millis(2));
        }
    }

    fn service(fetcher: &StubFetcher) -> AnimationFrameService {
        AnimationFrameService::new(egui::Context::default(), fetcher.clone()).unwrap()
    }

    #[test]
    fn rapid_loads_fetch_once() {
        let fetcher = StubFetcher::new()
            .with_source(GIF_URL, gif_bytes(4, 8, 8))
            .holding();
        let mut service = service(&fetcher);

        assert!(service.load(GIF_URL));
        assert!(!service.load(GIF_URL));
        service.pre_load(GIF_URL);
        assert_eq!(fetcher.requests().len(), 1);
        assert!(service.get_frames(GIF_URL).is_none());

        fetcher.release();
        settle(&mut service, GIF_URL);

        assert_eq!(service.cache().len(), 1);
        assert_eq!(service.get_frames(GIF_URL).unwrap().num_frames(), 4);
        assert_eq!(fetcher.requests(), vec![GIF_URL.to_owned()]);
    }

    #[test]
    fn cached_keys_are_not_refetched() {
        let fetcher = StubFetcher::new().with_source(PNG_URL, png_bytes(3, 3));
        let mut service = service(&fetcher);

        service.load(PNG_URL);
        settle(&mut service, PNG_URL);
        assert!(service.get_frames(PNG_URL).is_some());

        for _ in 0..5 {
            assert!(!service.load(PNG_URL));
        }
        assert_eq!(fetcher.requests().len(), 1);
    }

    #[test]
    fn failed_fetch_leaves_no_entry() {
        let fetcher = StubFetcher::new();
        let mut service = service(&fetcher);

        assert!(service.load(GIF_URL));
        settle(&mut service, GIF_URL);

        assert!(service.get_frames(GIF_URL).is_none());
        assert!(service.cache().is_empty());

        // nothing retries on its own, but an explicit load goes out again
        assert!(service.load(GIF_URL));
        assert_eq!(fetcher.requests().len(), 2);
    }

    #[test]
    fn undecodable_source_leaves_no_entry() {
        let fetcher = StubFetcher::new().with_source(PNG_URL, b"not a png".to_vec());
        let mut service = service(&fetcher);

        service.load(PNG_URL);
        settle(&mut service, PNG_URL);
        assert!(service.get_frames(PNG_URL).is_none());
    }

    #[test]
    fn get_frames_is_repeatable() {
        let fetcher = StubFetcher::new().with_source(GIF_URL, gif_bytes(3, 5, 5));
        let mut service = service(&fetcher);
        service.load(GIF_URL);
        settle(&mut service, GIF_URL);

        let first = service.get_frames(GIF_URL).unwrap();
        let first = (first.num_frames(), first.surface().size);
        let second = service.get_frames(GIF_URL).unwrap();
        assert_eq!(first, (second.num_frames(), second.surface().size));
    }

    #[test]
    fn keys_load_independently() {
        let fetcher = StubFetcher::new()
            .with_source(GIF_URL, gif_bytes(2, 4, 4))
            .with_source(PNG_URL, png_bytes(4, 4));
        let mut service = service(&fetcher);

        service.load(GIF_URL);
        service.load(PNG_URL);
        settle(&mut service, GIF_URL);
        settle(&mut service, PNG_URL);

        assert_eq!(service.cache().len(), 2);
        assert_eq!(service.get_frames(GIF_URL).unwrap().num_frames(), 2);
        assert_eq!(service.get_frames(PNG_URL).unwrap().num_frames(), 1);
    }

    #[test]
    fn loads_after_shutdown_are_ignored() {
        let fetcher = StubFetcher::new().with_source(GIF_URL, gif_bytes(2, 4, 4));
        let mut service = service(&fetcher);

        service.shutdown();
        service.shutdown();
        assert!(!service.load(GIF_URL));
        assert!(fetcher.requests().is_empty());
    }
}
