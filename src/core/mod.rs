// ─── Instance installer core ───
//
// Architecture:
//   core/
//     state/     : data directory layout, settings, service wiring
//     api/       : package registry, Fabric meta, Forge meta.json
//     downloader/: library descriptors, download queue, artifact fetcher
//     archive/   : 7-Zip process or in-process zip
//     maven/     : coordinates and library entry mapping
//     version/   : version coercion and Forge eras
//     instance/  : instance config store and install lock
//     loaders/   : Fabric and Forge installers
//     manifest/  : pack manifest resolution
//     install/   : the end-to-end install sequence

pub mod api;
pub mod archive;
pub mod downloader;
pub mod error;
pub mod fsutil;
pub mod http;
pub mod install;
pub mod instance;
pub mod loaders;
pub mod manifest;
pub mod maven;
pub mod state;
pub mod version;

#[cfg(test)]
pub(crate) mod testing;
