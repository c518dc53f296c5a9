mod artifact;
mod library;

pub use artifact::MavenArtifact;
pub use library::{map_libraries, LibraryArtifact, LibraryDownloads, LibraryEntry};

/// Default repository for libraries that do not name their own.
pub const MOJANG_LIBRARIES: &str = "https://libraries.minecraft.net";
