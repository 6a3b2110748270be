//! URL collection
//!
//! Walks the manifest once per configured platform and derives every URL the
//! deployment needs, annotated with the reason it is needed. A URL derived
//! several times is stored once: the first derivation is kept as the canonical
//! explanation and the later ones are recorded as duplicates.
//!
//! Collection is best-effort. A command that cannot be resolved yields a
//! [`StructuralError`] and collection continues with the next command.

use std::collections::BTreeMap;
use std::collections::btree_map::{Entry, Iter};
use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::error::StructuralError;
use crate::manifest::{Command, Manifest, ManifestDocument};
use crate::platform::Platform;
use crate::resolver::{apply_platform_suffix, canonical_url, join_url, split_bundle_path};

/// Final path components that identify a Java runtime launcher
pub const JAVA_LAUNCHERS: [&str; 3] = ["java", "java.exe", "javaw.exe"];

pub const JAR_FLAG: &str = "-jar";

/// Why a URL has to be reachable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Reason {
    LauncherUpdate,
    Bundle,
    Command,
    Jar,
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Reason::LauncherUpdate => "launcher update",
            Reason::Bundle => "bundle",
            Reason::Command => "command",
            Reason::Jar => "JAR",
        };
        f.write_str(name)
    }
}

/// One (reason, platform) pair that produced a URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Derivation {
    pub reason: Reason,
    pub platform: Platform,
}

impl fmt::Display for Derivation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} for {}", self.reason, self.platform)
    }
}

/// Why a URL is checked: the first derivation plus every later one
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckDetails {
    pub reason: Reason,
    pub platform: Platform,
    pub duplicates: Vec<Derivation>,
}

impl CheckDetails {
    pub fn new(reason: Reason, platform: Platform) -> Self {
        Self {
            reason,
            platform,
            duplicates: Vec::new(),
        }
    }

    /// Number of additional derivations that produced the same URL
    pub fn duplicate_count(&self) -> usize {
        self.duplicates.len()
    }
}

impl fmt::Display for CheckDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} for {}", self.reason, self.platform)?;
        if !self.duplicates.is_empty() {
            write!(f, ", required by {} other check(s)", self.duplicates.len())?;
        }
        Ok(())
    }
}

/// Unique URLs mapped to the reason they are checked.
///
/// Only the collector adds entries; the prober receives it read-only.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UrlSet {
    entries: BTreeMap<String, CheckDetails>,
}

impl UrlSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add(&mut self, url: String, reason: Reason, platform: &Platform) {
        match self.entries.entry(url) {
            Entry::Occupied(mut present) => {
                present.get_mut().duplicates.push(Derivation {
                    reason,
                    platform: platform.clone(),
                });
            }
            Entry::Vacant(slot) => {
                slot.insert(CheckDetails::new(reason, platform.clone()));
            }
        }
    }

    pub fn get(&self, url: &str) -> Option<&CheckDetails> {
        self.entries.get(url)
    }

    pub fn contains(&self, url: &str) -> bool {
        self.entries.contains_key(url)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> Iter<'_, String, CheckDetails> {
        self.entries.iter()
    }

    pub fn urls(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl<'a> IntoIterator for &'a UrlSet {
    type Item = (&'a String, &'a CheckDetails);
    type IntoIter = Iter<'a, String, CheckDetails>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Derives the URL set of a manifest across a set of platforms
#[derive(Debug, Clone)]
pub struct UrlCollector {
    platforms: Vec<Platform>,
    skip_jar_check: bool,
}

impl UrlCollector {
    pub fn new(platforms: Vec<Platform>, skip_jar_check: bool) -> Self {
        Self {
            platforms,
            skip_jar_check,
        }
    }

    /// Collect every URL the manifest implies together with the structural
    /// errors found along the way
    pub fn collect(&self, document: &ManifestDocument) -> (UrlSet, Vec<StructuralError>) {
        let mut urls = UrlSet::new();
        let mut errors = Vec::new();

        for platform in &self.platforms {
            let manifest = document.for_platform(platform);

            for update in &manifest.launcher_updates {
                urls.add(
                    canonical_url(&update.bundle_info_url),
                    Reason::LauncherUpdate,
                    platform,
                );
            }
            for bundle in &manifest.bundles {
                urls.add(canonical_url(&bundle.bundle_info_url), Reason::Bundle, platform);
            }
            for command in &manifest.commands {
                if let Err(error) = self.collect_command(&mut urls, &manifest, command) {
                    debug!(
                        %platform,
                        command = %command.name,
                        %error,
                        "Command could not be resolved"
                    );
                    errors.push(error);
                }
            }
        }

        debug!(
            urls = urls.len(),
            errors = errors.len(),
            platforms = self.platforms.len(),
            "URL collection finished"
        );
        (urls, errors)
    }

    fn collect_command(
        &self,
        urls: &mut UrlSet,
        manifest: &Manifest,
        command: &Command,
    ) -> Result<(), StructuralError> {
        let platform = &manifest.platform;
        let invalid_path = |source| StructuralError::InvalidCommandPath {
            command: command.name.clone(),
            platform: platform.clone(),
            source,
        };

        let (bundle, rest) = split_bundle_path(&command.name).map_err(invalid_path)?;
        let base_url =
            manifest
                .bundle_base_url(&bundle)
                .ok_or_else(|| StructuralError::UnknownBundle {
                    bundle: bundle.clone(),
                    platform: platform.clone(),
                    command: command.name.clone(),
                })?;

        let binary_url =
            apply_platform_suffix(join_url(base_url, &rest).map_err(invalid_path)?, platform);
        let needs_jar = !self.skip_jar_check && is_java_launcher(&binary_url);
        urls.add(binary_url, Reason::Command, platform);

        if needs_jar && let Some(jar_path) = jar_argument(&command.arguments) {
            let jar_url = resolve_jar_url(manifest, jar_path).map_err(|details| {
                StructuralError::JarPath {
                    command: command.name.clone(),
                    platform: platform.clone(),
                    details,
                }
            })?;
            urls.add(jar_url, Reason::Jar, platform);
        }

        Ok(())
    }
}

fn resolve_jar_url(manifest: &Manifest, jar_path: &str) -> Result<String, String> {
    let (bundle, rest) = split_bundle_path(jar_path).map_err(|e| e.to_string())?;
    let base_url = manifest.bundle_base_url(&bundle).ok_or_else(|| {
        format!(
            "JAR path '{}' does not descend into a bundle directory",
            jar_path
        )
    })?;
    join_url(base_url, &rest).map_err(|e| e.to_string())
}

/// Whether the final path component of `url` is a Java launcher
pub fn is_java_launcher(url: &str) -> bool {
    url.rsplit('/')
        .next()
        .is_some_and(|name| JAVA_LAUNCHERS.contains(&name))
}

/// The argument following `-jar`, if any
pub fn jar_argument(arguments: &[String]) -> Option<&str> {
    arguments
        .iter()
        .position(|arg| arg == JAR_FLAG)
        .and_then(|i| arguments.get(i + 1))
        .map(String::as_str)
}
