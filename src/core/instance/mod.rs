mod config_store;
mod lock;
mod model;

pub use config_store::InstanceConfigStore;
pub use lock::InstanceLock;
pub use model::{
    ContentSource, InstanceConfig, LoaderSpec, LoaderType, ModManifestEntry, RUNTIME_ONLY_KEYS,
};
