// Merger module - fetch adaptive streams and mux them into one file

pub mod command;
pub mod errors;
pub mod extractors;
pub mod models;
pub mod muxer;
pub mod orchestrator;
pub mod stream_selector;
pub mod tools;
pub mod traits;
pub mod transfer;
pub mod utils;

pub use command::MuxCommand;
pub use errors::{MergeError, MuxError, ResolveError, TransferError};
pub use extractors::YtDlpResolver;
pub use models::{
    MergeOptions, MergeReport, NetworkConfig, Resource, Selection, StreamDescriptor, StreamKind,
    TrimWindow,
};
pub use muxer::FfmpegMuxer;
pub use orchestrator::Merger;
pub use stream_selector::StreamSelector;
pub use traits::{Muxer, ResourceResolver, StreamCatalog, StreamTransfer};
pub use transfer::HttpTransfer;
