//! Whole-manifest semantic checks, run once before any URL is collected.

use std::collections::BTreeSet;

use chrono::NaiveDateTime;
use reqwest::Url;

use crate::error::SchemaError;
use crate::manifest::{ManifestDocument, Targeted};
use crate::platform::{Platform, is_platform_token};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parse `text` and check it for every problem that would make URL
/// collection meaningless. All problems are reported together.
pub fn validate_manifest(
    text: &str,
    platforms: &[Platform],
) -> Result<ManifestDocument, SchemaError> {
    let document = ManifestDocument::parse(text)?;
    let problems = check_document(&document, platforms);
    if problems.is_empty() {
        Ok(document)
    } else {
        Err(SchemaError::Invalid { problems })
    }
}

/// List the semantic problems of an already parsed manifest
pub fn check_document(document: &ManifestDocument, platforms: &[Platform]) -> Vec<String> {
    let mut problems = Vec::new();

    if let Some(timestamp) = &document.timestamp
        && NaiveDateTime::parse_from_str(timestamp, TIMESTAMP_FORMAT).is_err()
    {
        problems.push(format!(
            "Timestamp '{}' does not match the format {}",
            timestamp, TIMESTAMP_FORMAT
        ));
    }

    for (i, update) in document.launcher_update.iter().enumerate() {
        let context = format!("LauncherUpdate[{}]", i);
        check_http_url(&mut problems, &context, "BundleInfoURL", &update.bundle_info_url);
        check_targets(&mut problems, &context, update);
    }

    for (i, bundle) in document.bundles.iter().enumerate() {
        let context = format!("Bundles[{}]", i);
        check_http_url(&mut problems, &context, "BundleInfoURL", &bundle.bundle_info_url);
        check_http_url(&mut problems, &context, "BaseURL", &bundle.base_url);
        if bundle.local_directory.trim().is_empty() {
            problems.push(format!("{}: LocalDirectory must not be empty", context));
        } else if bundle.local_directory.contains(['/', '\\']) {
            problems.push(format!(
                "{}: LocalDirectory '{}' must be a single directory name",
                context, bundle.local_directory
            ));
        }
        check_targets(&mut problems, &context, bundle);
    }

    for (i, command) in document.execution.commands.iter().enumerate() {
        let context = format!("Execution.Commands[{}]", i);
        if command.name.trim().is_empty() {
            problems.push(format!("{}: Name must not be empty", context));
        }
        check_targets(&mut problems, &context, command);
    }

    // One problem per colliding (directory, platform) pair
    let mut duplicates = BTreeSet::new();
    for platform in platforms {
        let manifest = document.for_platform(platform);
        let mut seen = BTreeSet::new();
        for bundle in &manifest.bundles {
            if !seen.insert(bundle.local_directory.as_str()) {
                duplicates.insert((bundle.local_directory.clone(), platform.to_string()));
            }
        }
    }
    for (directory, platform) in duplicates {
        problems.push(format!(
            "LocalDirectory '{}' is used by more than one bundle for platform {}",
            directory, platform
        ));
    }

    problems
}

fn check_http_url(problems: &mut Vec<String>, context: &str, field: &str, value: &str) {
    match Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => {}
        Ok(_) => problems.push(format!(
            "{}: {} '{}' must be an http(s) URL",
            context, field, value
        )),
        Err(e) => problems.push(format!(
            "{}: {} '{}' is not a valid URL: {}",
            context, field, value, e
        )),
    }
}

fn check_targets(problems: &mut Vec<String>, context: &str, entry: &impl Targeted) {
    for target in entry.target_platforms() {
        let well_formed = match target.split_once('-') {
            Some((os, arch)) => is_platform_token(os) && is_platform_token(arch),
            None => is_platform_token(target),
        };
        if !well_formed {
            problems.push(format!(
                "{}: TargetPlatforms entry '{}' must be <os> or <os>-<arch>",
                context, target
            ));
        }
    }
}
