// ─── Version ranges ───
// Minecraft versions are loose ("1.19", "1.7.10", "1.5.2"); they are coerced
// to semver before any comparison.

use semver::Version;

use crate::core::error::{LauncherError, LauncherResult};

/// Coerces a loose version string into a full semver triple.
///
/// Missing components become zero and anything after the first run of
/// digits/dots is ignored, so `"1.19"` → `1.19.0` and `"1.7.10-pre4"` → `1.7.10`.
pub fn coerce(raw: &str) -> LauncherResult<Version> {
    let start = raw
        .find(|c: char| c.is_ascii_digit())
        .ok_or_else(|| LauncherError::UnsupportedVersion(raw.to_string()))?;
    let numeric: String = raw[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    let mut parts = numeric
        .split('.')
        .filter(|p| !p.is_empty())
        .map(|p| p.parse::<u64>());
    let mut next = || -> LauncherResult<u64> {
        match parts.next() {
            Some(Ok(n)) => Ok(n),
            Some(Err(_)) => Err(LauncherError::UnsupportedVersion(raw.to_string())),
            None => Ok(0),
        }
    };

    Ok(Version::new(next()?, next()?, next()?))
}

/// Forge installation strategy, selected by the Minecraft version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForgeEra {
    /// mc <= 1.3.2: Forge ships as a client zip merged into the game jar.
    ClientZip,
    /// mc <= 1.5.2: Forge ships as a universal zip merged into the game jar.
    UniversalZip,
    /// Everything newer: installer jar carrying an install profile.
    Installer,
}

const LAST_CLIENT_ZIP: Version = Version::new(1, 3, 2);
const LAST_UNIVERSAL_ZIP: Version = Version::new(1, 5, 2);

impl ForgeEra {
    pub fn for_minecraft(mc_version: &str) -> LauncherResult<Self> {
        let version = coerce(mc_version)?;
        Ok(if version <= LAST_CLIENT_ZIP {
            ForgeEra::ClientZip
        } else if version <= LAST_UNIVERSAL_ZIP {
            ForgeEra::UniversalZip
        } else {
            ForgeEra::Installer
        })
    }

    /// Suffix of the artifact on the Forge maven (`forge-<v>-<suffix>`).
    pub fn artifact_suffix(self) -> &'static str {
        match self {
            ForgeEra::ClientZip => "client.zip",
            ForgeEra::UniversalZip => "universal.zip",
            ForgeEra::Installer => "installer.jar",
        }
    }

    /// `(classifier, extension)` whose MD5 `meta.json` publishes for this era.
    pub fn hash_classifier(self) -> (&'static str, &'static str) {
        match self {
            ForgeEra::ClientZip => ("client", "zip"),
            ForgeEra::UniversalZip => ("universal", "zip"),
            ForgeEra::Installer => ("installer", "jar"),
        }
    }

    /// Pre-installer eras patch the vanilla jar instead of reading an install profile.
    pub fn is_legacy(self) -> bool {
        !matches!(self, ForgeEra::Installer)
    }
}
