mod client;
mod queue;

pub use client::{ArtifactFetcher, Downloader};
pub use queue::{DownloadJob, DownloadQueue, LibraryDescriptor};
