//! Manifest retrieval from a URL or the local filesystem.

use std::fmt;
use std::path::PathBuf;

use tracing::info;

use crate::error::FetchError;
use crate::http_client::HttpProbeClient;

/// Where the manifest comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestLocation {
    Remote(String),
    Local(PathBuf),
}

impl ManifestLocation {
    /// `http(s)://` is fetched remotely, `file://` and anything else is a path
    pub fn parse(value: &str) -> Self {
        let lower = value.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            ManifestLocation::Remote(value.to_string())
        } else if lower.starts_with("file://") {
            ManifestLocation::Local(PathBuf::from(&value["file://".len()..]))
        } else {
            ManifestLocation::Local(PathBuf::from(value))
        }
    }
}

impl fmt::Display for ManifestLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ManifestLocation::Remote(url) => f.write_str(url),
            ManifestLocation::Local(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Read the manifest text
pub async fn fetch_manifest(
    location: &ManifestLocation,
    client: &HttpProbeClient,
) -> Result<String, FetchError> {
    let text = match location {
        ManifestLocation::Remote(url) => client.fetch_text(url).await?,
        ManifestLocation::Local(path) => {
            tokio::fs::read_to_string(path)
                .await
                .map_err(|source| FetchError::Io {
                    path: path.clone(),
                    source,
                })?
        }
    };
    info!(%location, bytes = text.len(), "Manifest retrieved");
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_client::HttpClientConfig;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_location() {
        assert_eq!(
            ManifestLocation::parse("https://cdn.example/deployment-config.json"),
            ManifestLocation::Remote("https://cdn.example/deployment-config.json".to_string())
        );
        assert_eq!(
            ManifestLocation::parse("HTTP://cdn.example/x.json"),
            ManifestLocation::Remote("HTTP://cdn.example/x.json".to_string())
        );
        assert_eq!(
            ManifestLocation::parse("file:///etc/manifest.json"),
            ManifestLocation::Local(PathBuf::from("/etc/manifest.json"))
        );
        assert_eq!(
            ManifestLocation::parse("manifest.json"),
            ManifestLocation::Local(PathBuf::from("manifest.json"))
        );
    }

    #[tokio::test]
    async fn test_fetch_local_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{}}").unwrap();
        file.flush().unwrap();

        let client = HttpProbeClient::new(HttpClientConfig::default()).unwrap();
        let location = ManifestLocation::Local(file.path().to_path_buf());
        let text = fetch_manifest(&location, &client).await.unwrap();
        assert_eq!(text, "{}");
    }

    #[tokio::test]
    async fn test_fetch_missing_file() {
        let client = HttpProbeClient::new(HttpClientConfig::default()).unwrap();
        let location = ManifestLocation::Local(PathBuf::from("/nonexistent/manifest.json"));
        let result = fetch_manifest(&location, &client).await;
        assert!(matches!(result, Err(FetchError::Io { .. })));
    }
}
