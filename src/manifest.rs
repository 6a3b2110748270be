//! Deployment manifest model
//!
//! A [`ManifestDocument`] is the parsed JSON manifest as published. Entries may
//! be restricted to target platforms, so the URL collector works on a
//! [`Manifest`] specialized for one platform at a time.

use serde::{Deserialize, Serialize};

use crate::platform::Platform;

/// The deployment manifest as published, before platform specialization
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ManifestDocument {
    /// Publication time, `%Y-%m-%d %H:%M:%S`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub launcher_update: Vec<LauncherUpdate>,
    #[serde(default)]
    pub bundles: Vec<Bundle>,
    #[serde(default)]
    pub execution: Execution,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LauncherUpdate {
    #[serde(rename = "BundleInfoURL")]
    pub bundle_info_url: String,
    #[serde(default)]
    pub target_platforms: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Bundle {
    #[serde(rename = "BundleInfoURL")]
    pub bundle_info_url: String,
    #[serde(rename = "BaseURL")]
    pub base_url: String,
    pub local_directory: String,
    #[serde(default)]
    pub target_platforms: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Execution {
    #[serde(default)]
    pub commands: Vec<Command>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Command {
    pub name: String,
    #[serde(default)]
    pub arguments: Vec<String>,
    #[serde(default)]
    pub target_platforms: Vec<String>,
}

/// Entries carrying an optional `TargetPlatforms` restriction
pub trait Targeted {
    fn target_platforms(&self) -> &[String];

    /// No restriction means every platform
    fn applies_to(&self, platform: &Platform) -> bool {
        let targets = self.target_platforms();
        targets.is_empty() || targets.iter().any(|t| platform.matches(t))
    }
}

impl Targeted for LauncherUpdate {
    fn target_platforms(&self) -> &[String] {
        &self.target_platforms
    }
}

impl Targeted for Bundle {
    fn target_platforms(&self) -> &[String] {
        &self.target_platforms
    }
}

impl Targeted for Command {
    fn target_platforms(&self) -> &[String] {
        &self.target_platforms
    }
}

impl ManifestDocument {
    /// Parse manifest JSON without semantic checks
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Keep only the entries that apply to `platform`
    pub fn for_platform(&self, platform: &Platform) -> Manifest {
        fn select<T: Targeted + Clone>(entries: &[T], platform: &Platform) -> Vec<T> {
            entries
                .iter()
                .filter(|e| e.applies_to(platform))
                .cloned()
                .collect()
        }

        Manifest {
            platform: platform.clone(),
            launcher_updates: select(&self.launcher_update, platform),
            bundles: select(&self.bundles, platform),
            commands: select(&self.execution.commands, platform),
        }
    }
}

/// A manifest specialized for a single platform
#[derive(Debug, Clone, PartialEq)]
pub struct Manifest {
    pub platform: Platform,
    pub launcher_updates: Vec<LauncherUpdate>,
    pub bundles: Vec<Bundle>,
    pub commands: Vec<Command>,
}

impl Manifest {
    /// Base URL of the bundle installed into `local_directory`
    pub fn bundle_base_url(&self, local_directory: &str) -> Option<&str> {
        self.bundles
            .iter()
            .find(|b| b.local_directory == local_directory)
            .map(|b| b.base_url.as_str())
    }
}
