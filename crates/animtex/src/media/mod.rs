pub mod decode;
pub mod network;
pub mod worker;

pub use decode::{decode_source, DecodedFrame, DecodedImage, FrameDims, SourceKind};
pub use network::{FetchCallback, HttpFetcher, SourceFetcher};
pub use worker::{DecodeRequest, DecodeResult, DecoderWorker, WorkerSender};
