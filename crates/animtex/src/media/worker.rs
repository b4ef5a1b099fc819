use std::thread::{self, JoinHandle};

use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::media::decode::{decode_source, DecodedImage};
use crate::{Error, Result};

pub struct DecodeRequest {
    pub key: String,
    pub bytes: Vec<u8>,
}

/// Exactly one of these is posted back for every accepted request
pub struct DecodeResult {
    pub key: String,
    pub image: Result<DecodedImage>,
}

enum WorkerMsg {
    Decode(DecodeRequest),
    Shutdown,
}

/// Cloneable handle for feeding the worker from fetch callbacks, which run
/// on foreign threads.
#[derive(Clone)]
pub struct WorkerSender {
    requests: Sender<WorkerMsg>,
    results: Sender<DecodeResult>,
}

impl WorkerSender {
    pub fn decode(&self, key: String, bytes: Vec<u8>) -> Result<()> {
        self.requests
            .send(WorkerMsg::Decode(DecodeRequest { key, bytes }))
            .map_err(|_| Error::WorkerGone)
    }

    /// Post a failed result without going through the decoder, so the main
    /// context still hears back about the key.
    pub fn fail(&self, key: String, err: Error) -> Result<()> {
        self.results
            .send(DecodeResult {
                key,
                image: Err(err),
            })
            .map_err(|_| Error::WorkerGone)
    }
}

/// Dedicated decode thread. Holds no state between requests; everything
/// flows through the request and result channels.
pub struct DecoderWorker {
    sender: WorkerSender,
    results: Receiver<DecodeResult>,
    handle: Option<JoinHandle<()>>,
}

impl DecoderWorker {
    pub fn spawn(repaint: Option<egui::Context>) -> Result<Self> {
        let (req_tx, req_rx) = unbounded::<WorkerMsg>();
        let (res_tx, res_rx) = unbounded::<DecodeResult>();

        let worker_tx = res_tx.clone();
        let handle = thread::Builder::new()
            .name("animtex-decoder".to_owned())
            .spawn(move || run(req_rx, worker_tx, repaint))?;

        tracing::debug!("decoder worker started");

        Ok(Self {
            sender: WorkerSender {
                requests: req_tx,
                results: res_tx,
            },
            results: res_rx,
            handle: Some(handle),
        })
    }

    pub fn sender(&self) -> WorkerSender {
        self.sender.clone()
    }

    pub fn results(&self) -> &Receiver<DecodeResult> {
        &self.results
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Stop the decode thread and wait for it. Safe to call more than once;
    /// only the first call does anything.
    pub fn shutdown(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };

        // the thread may already be gone if a result send failed
        let _ = self.sender.requests.send(WorkerMsg::Shutdown);
        if handle.join().is_err() {
            tracing::error!("decoder worker panicked");
        }
        tracing::debug!("decoder worker terminated");
    }
}

impl Drop for DecoderWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run(
    requests: Receiver<WorkerMsg>,
    results: Sender<DecodeResult>,
    repaint: Option<egui::Context>,
) {
    while let Ok(msg) = requests.recv() {
        let req = match msg {
            WorkerMsg::Decode(req) => req,
            WorkerMsg::Shutdown => break,
        };

        tracing::trace!("decoding {} ({} bytes)", req.key, req.bytes.len());
        let image = decode_source(&req.key, &req.bytes);
        if let Err(e) = &image {
            tracing::error!("could not decode {}: {e}", req.key);
        }

        if results
            .send(DecodeResult {
                key: req.key,
                image,
            })
            .is_err()
        {
            break;
        }

        if let Some(ctx) = &repaint {
            ctx.request_repaint();
        }
    }
}
