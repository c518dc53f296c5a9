mod app_state;
mod paths;
mod settings;

pub use app_state::AppState;
pub use paths::{safe_join, validate_path_segment, LauncherPaths};
pub use settings::InstallSettings;
