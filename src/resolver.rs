//! Path resolution
//!
//! Maps a manifest path such as `app/bin/tool` onto the download URL of the
//! bundle it descends into. The leading segment names the bundle directory,
//! the remainder is appended to the bundle's base URL.

use reqwest::Url;

use crate::error::PathError;
use crate::platform::Platform;

pub const EXE_SUFFIX: &str = ".exe";

/// Replace native backslash separators with forward slashes
pub fn normalize_separators(path: &str) -> String {
    path.replace('\\', "/")
}

/// Absolute in the POSIX sense, or carrying a drive letter such as `C:/`
pub fn is_absolute(path: &str) -> bool {
    if path.starts_with('/') {
        return true;
    }
    let mut chars = path.chars();
    matches!(
        (chars.next(), chars.next()),
        (Some(drive), Some(':')) if drive.is_ascii_alphabetic()
    )
}

/// Lexically clean a slash-separated relative path.
///
/// Empty and `.` segments are dropped and `..` removes the preceding segment.
/// A `..` that cannot be folded is kept.
pub fn clean_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(&last) if last != ".." => {
                    segments.pop();
                }
                _ => segments.push(".."),
            },
            other => segments.push(other),
        }
    }
    if segments.is_empty() {
        ".".to_string()
    } else {
        segments.join("/")
    }
}

/// Split a manifest path into its bundle directory and the path below it
pub fn split_bundle_path(path: &str) -> Result<(String, String), PathError> {
    let normalized = normalize_separators(path);
    let not_relative = || PathError::NotRelative {
        path: normalized.clone(),
    };

    if is_absolute(&normalized) || !normalized.contains('/') {
        return Err(not_relative());
    }

    let cleaned = clean_path(&normalized);
    let (bundle, rest) = cleaned.split_once('/').ok_or_else(not_relative)?;
    Ok((bundle.to_string(), rest.to_string()))
}

/// Append a slash-separated path below a base URL
pub fn join_url(base_url: &str, relative: &str) -> Result<String, PathError> {
    let invalid = |details: String| PathError::InvalidBaseUrl {
        url: base_url.to_string(),
        details,
    };

    let mut url = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|_| invalid("URL cannot be a base".to_string()))?;
        segments
            .pop_if_empty()
            .extend(relative.split('/').filter(|s| !s.is_empty()));
    }
    Ok(url.to_string())
}

/// Serialize a URL the way joined URLs are serialized so both forms share a key
pub fn canonical_url(url: &str) -> String {
    Url::parse(url)
        .map(|parsed| parsed.to_string())
        .unwrap_or_else(|_| url.to_string())
}

/// Resolve a manifest path against the base URL of the bundle it descends into
pub fn resolve_url(bundle_base_url: &str, relative_path: &str) -> Result<String, PathError> {
    let (_, rest) = split_bundle_path(relative_path)?;
    join_url(bundle_base_url, &rest)
}

/// Windows command binaries are published with an `.exe` suffix
pub fn apply_platform_suffix(url: String, platform: &Platform) -> String {
    if platform.is_windows() && !url.ends_with(EXE_SUFFIX) {
        url + EXE_SUFFIX
    } else {
        url
    }
}
