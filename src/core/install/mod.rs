mod orchestrator;

pub use orchestrator::{DownloadOrchestrator, InstallReport, InstallRequest};
