#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use manifest_validator::{HeadProbe, ProbeError};

/// Probe answering from a fixed table; unknown URLs yield 404
#[derive(Default)]
pub struct StubProbe {
    statuses: HashMap<String, u16>,
    request_log: Mutex<Vec<String>>,
}

impl StubProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status(mut self, url: &str, status: u16) -> Self {
        self.statuses.insert(url.to_string(), status);
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.request_log.lock().unwrap().clone()
    }
}

#[async_trait]
impl HeadProbe for StubProbe {
    async fn head(&self, url: &str) -> Result<u16, ProbeError> {
        self.request_log.lock().unwrap().push(url.to_string());
        Ok(self.statuses.get(url).copied().unwrap_or(404))
    }
}

/// Minimal HTTP/1.1 responder on a loopback port
pub struct TestServer {
    addr: SocketAddr,
    hits: Arc<Mutex<HashMap<String, usize>>>,
}

impl TestServer {
    /// Serve `routes` (path -> (status, body)); anything else is a 404
    pub async fn start(routes: Vec<(&str, u16, &str)>) -> Self {
        let routes: Arc<HashMap<String, (u16, String)>> = Arc::new(
            routes
                .into_iter()
                .map(|(path, status, body)| (path.to_string(), (status, body.to_string())))
                .collect(),
        );
        let hits = Arc::new(Mutex::new(HashMap::new()));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server_hits = hits.clone();
        tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    break;
                };
                let routes = routes.clone();
                let hits = server_hits.clone();
                tokio::spawn(async move {
                    let _ = serve_connection(stream, &routes, &hits).await;
                });
            }
        });

        Self { addr, hits }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn hits(&self, path: &str) -> usize {
        self.hits.lock().unwrap().get(path).copied().unwrap_or(0)
    }
}

async fn serve_connection(
    mut stream: TcpStream,
    routes: &HashMap<String, (u16, String)>,
    hits: &Mutex<HashMap<String, usize>>,
) -> std::io::Result<()> {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buffer.windows(4).any(|w| w == b"\r\n\r\n") {
        let read = stream.read(&mut chunk).await?;
        if read == 0 {
            return Ok(());
        }
        buffer.extend_from_slice(&chunk[..read]);
    }

    let request = String::from_utf8_lossy(&buffer);
    let mut request_line = request.lines().next().unwrap_or_default().split_whitespace();
    let method = request_line.next().unwrap_or_default().to_string();
    let path = request_line.next().unwrap_or_default().to_string();

    *hits.lock().unwrap().entry(path.clone()).or_insert(0) += 1;

    let (status, body) = routes
        .get(&path)
        .cloned()
        .unwrap_or((404, "not found".to_string()));

    let mut response = format!(
        "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status,
        reason_phrase(status),
        body.len()
    );
    if method != "HEAD" {
        response.push_str(&body);
    }
    stream.write_all(response.as_bytes()).await?;
    stream.shutdown().await
}

fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        204 => "No Content",
        403 => "Forbidden",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}

/// Manifest pointing every URL at `base`, with one launcher update, one
/// bundle `app` and a Java command running `app/lib/tool.jar`
pub fn sample_manifest(base: &str) -> String {
    format!(
        r#"{{
  "Timestamp": "2024-03-01 12:00:00",
  "LauncherUpdate": [
    {{ "BundleInfoURL": "{base}/launcher/bundleinfo.json" }}
  ],
  "Bundles": [
    {{ "BundleInfoURL": "{base}/app/bundleinfo.json", "BaseURL": "{base}/app", "LocalDirectory": "app" }},
    {{ "BundleInfoURL": "{base}/jre/bundleinfo.json", "BaseURL": "{base}/jre", "LocalDirectory": "jre" }}
  ],
  "Execution": {{
    "Commands": [
      {{ "Name": "jre/bin/java", "Arguments": ["-Xmx512m", "-jar", "app/lib/tool.jar"] }}
    ]
  }}
}}"#
    )
}

/// Write a manifest into a fresh temporary directory
pub fn write_manifest(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("deployment-config.json");
    std::fs::write(&path, contents).unwrap();
    (temp_dir, path)
}
