//! Target platforms a manifest is specialized for.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

pub const OS_WINDOWS: &str = "windows";
pub const OS_DARWIN: &str = "darwin";
pub const OS_LINUX: &str = "linux";

pub const ARCH_386: &str = "386";
pub const ARCH_AMD64: &str = "amd64";

/// Operating systems checked when no platform set is configured
pub const DEFAULT_OPERATING_SYSTEMS: [&str; 3] = [OS_WINDOWS, OS_DARWIN, OS_LINUX];

/// Architectures checked when no platform set is configured
pub const DEFAULT_ARCHITECTURES: [&str; 2] = [ARCH_386, ARCH_AMD64];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    #[error("Invalid platform '{0}': expected <os>-<arch>, e.g. linux-amd64")]
    Malformed(String),

    #[error("Invalid platform '{value}': '{part}' may only contain lowercase letters and digits")]
    InvalidCharacters { value: String, part: String },
}

/// An (operating system, architecture) pair such as `windows-amd64`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Platform {
    os: String,
    arch: String,
}

impl Platform {
    pub fn new(os: impl Into<String>, arch: impl Into<String>) -> Self {
        Self {
            os: os.into(),
            arch: arch.into(),
        }
    }

    pub fn os(&self) -> &str {
        &self.os
    }

    pub fn arch(&self) -> &str {
        &self.arch
    }

    /// Windows binaries get an `.exe` suffix when resolved to a URL
    pub fn is_windows(&self) -> bool {
        self.os == OS_WINDOWS
    }

    /// Check whether a manifest `TargetPlatforms` element selects this platform.
    ///
    /// An element selects a platform when it names the operating system alone
    /// (`linux`) or the full pair (`linux-amd64`).
    pub fn matches(&self, target: &str) -> bool {
        match target.split_once('-') {
            Some((os, arch)) => os == self.os && arch == self.arch,
            None => target == self.os,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.os, self.arch)
    }
}

impl FromStr for Platform {
    type Err = PlatformError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (os, arch) = value
            .trim()
            .split_once('-')
            .ok_or_else(|| PlatformError::Malformed(value.to_string()))?;

        for part in [os, arch] {
            if part.is_empty() {
                return Err(PlatformError::Malformed(value.to_string()));
            }
            if !is_platform_token(part) {
                return Err(PlatformError::InvalidCharacters {
                    value: value.to_string(),
                    part: part.to_string(),
                });
            }
        }

        Ok(Self::new(os, arch))
    }
}

impl Serialize for Platform {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Platform {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}

/// Lowercase ASCII letters and digits only
pub fn is_platform_token(part: &str) -> bool {
    !part.is_empty()
        && part
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
}

/// The full cross product of the default operating systems and architectures
pub fn default_platforms() -> Vec<Platform> {
    DEFAULT_OPERATING_SYSTEMS
        .iter()
        .flat_map(|os| {
            DEFAULT_ARCHITECTURES
                .iter()
                .map(move |arch| Platform::new(*os, *arch))
        })
        .collect()
}
