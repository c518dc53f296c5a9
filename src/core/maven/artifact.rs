use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::core::error::{LauncherError, LauncherResult};

/// A parsed Maven coordinate.
///
/// Supported formats:
///   `groupId:artifactId:version`
///   `groupId:artifactId:version:classifier`
///   `groupId:artifactId:version[:classifier]@extension`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct MavenArtifact {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    pub classifier: Option<String>,
    /// File extension. Defaults to `"jar"`.
    pub extension: String,
}

impl MavenArtifact {
    pub fn parse(coord: &str) -> LauncherResult<Self> {
        let invalid = || LauncherError::InvalidMavenCoordinate(coord.to_string());

        let (body, extension) = match coord.rsplit_once('@') {
            Some((body, ext)) if !ext.is_empty() => (body, ext),
            Some(_) => return Err(invalid()),
            None => (coord, "jar"),
        };

        let mut parts = body.split(':');
        let group_id = parts.next().filter(|s| !s.is_empty()).ok_or_else(invalid)?;
        let artifact_id = parts.next().filter(|s| !s.is_empty()).ok_or_else(invalid)?;
        let version = parts.next().filter(|s| !s.is_empty()).ok_or_else(invalid)?;
        let classifier = parts.next().map(str::to_string);
        if parts.next().is_some() {
            return Err(invalid());
        }

        // Every part ends up as a path segment under the libraries directory.
        let segments = group_id
            .split('.')
            .chain([artifact_id, version, extension])
            .chain(classifier.as_deref());
        for segment in segments {
            if !is_plain_segment(segment) {
                return Err(invalid());
            }
        }

        Ok(Self {
            group_id: group_id.to_string(),
            artifact_id: artifact_id.to_string(),
            version: version.to_string(),
            classifier,
            extension: extension.to_string(),
        })
    }

    /// `artifactId-version[-classifier].extension`
    pub fn filename(&self) -> String {
        match &self.classifier {
            Some(c) => format!(
                "{}-{}-{}.{}",
                self.artifact_id, self.version, c, self.extension
            ),
            None => format!("{}-{}.{}", self.artifact_id, self.version, self.extension),
        }
    }

    /// Path segments of the artifact inside a maven repository:
    /// `[group..., artifactId, version, filename]`.
    pub fn path_segments(&self) -> Vec<String> {
        let mut segments: Vec<String> = self.group_id.split('.').map(str::to_string).collect();
        segments.push(self.artifact_id.clone());
        segments.push(self.version.clone());
        segments.push(self.filename());
        segments
    }

    /// `<repo>/<group_path>/<artifact_id>/<version>/<filename>`
    pub fn url(&self, repo_base: &str) -> String {
        format!(
            "{}/{}",
            repo_base.trim_end_matches('/'),
            self.path_segments().join("/")
        )
    }

    /// Path relative to a libraries directory.
    pub fn local_path(&self) -> PathBuf {
        self.path_segments().iter().collect()
    }

    /// Forge's own binary, which the installer stages itself rather than
    /// queueing as a library.
    pub fn is_forge_binary(&self) -> bool {
        self.group_id == "net.minecraftforge"
            && (self.artifact_id == "forge" || self.artifact_id == "minecraftforge")
    }
}

fn is_plain_segment(s: &str) -> bool {
    !s.is_empty() && s != "." && s != ".." && !s.contains(['/', '\\'])
}

impl fmt::Display for MavenArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.version)?;
        if let Some(c) = &self.classifier {
            write!(f, ":{c}")?;
        }
        if self.extension != "jar" {
            write!(f, "@{}", self.extension)?;
        }
        Ok(())
    }
}
