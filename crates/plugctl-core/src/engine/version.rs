use std::fmt;
use std::str::FromStr;

use semver::Version;

/// Error type for engine version parsing
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VersionError {
    #[error("Invalid engine version format: '{0}'")]
    InvalidFormat(String),
    #[error("Engine version parse error: {0}")]
    ParseError(String),
}

/// A dotted engine version such as `5.3` or `4.27.2`.
///
/// Short forms are padded so they compare as full semantic versions; the
/// original spelling is kept for display and for lookups keyed by string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineVersion {
    raw: String,
    version: Version,
}

impl EngineVersion {
    pub fn parse(raw: &str) -> Result<Self, VersionError> {
        let trimmed = raw.trim();
        let parts: Vec<&str> = trimmed.split('.').collect();
        if parts.is_empty() || parts.len() > 3 {
            return Err(VersionError::InvalidFormat(raw.to_string()));
        }
        if parts
            .iter()
            .any(|p| p.is_empty() || !p.bytes().all(|b| b.is_ascii_digit()))
        {
            return Err(VersionError::InvalidFormat(raw.to_string()));
        }

        let mut padded: Vec<&str> = parts.clone();
        while padded.len() < 3 {
            padded.push("0");
        }
        let version = Version::parse(&padded.join("."))
            .map_err(|e| VersionError::ParseError(format!("'{}': {}", raw, e)))?;

        Ok(Self {
            raw: trimmed.to_string(),
            version,
        })
    }

    pub fn major(&self) -> u64 {
        self.version.major
    }

    pub fn minor(&self) -> u64 {
        self.version.minor
    }

    pub fn semver(&self) -> &Version {
        &self.version
    }

    /// The version as written in the project descriptor
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// `major.minor`, the form used in launcher install folder names
    pub fn short(&self) -> String {
        format!("{}.{}", self.version.major, self.version.minor)
    }
}

impl FromStr for EngineVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EngineVersion::parse(s)
    }
}

impl fmt::Display for EngineVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl PartialOrd for EngineVersion {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for EngineVersion {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.version.cmp(&other.version)
    }
}
