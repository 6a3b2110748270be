mod common;

use std::sync::Arc;

use common::{StubProbe, TestServer, sample_manifest, write_manifest};
use manifest_validator::{
    HttpClientConfig, HttpProbeClient, ManifestLocation, ManifestValidator, Platform, ProbeConfig,
    ValidationOptions,
};

const ARTIFACT_PATHS: [&str; 6] = [
    "/launcher/bundleinfo.json",
    "/app/bundleinfo.json",
    "/jre/bundleinfo.json",
    "/jre/bin/java",
    "/jre/bin/java.exe",
    "/app/lib/tool.jar",
];

async fn start_artifact_server(missing: &[&str]) -> TestServer {
    let routes = ARTIFACT_PATHS
        .iter()
        .filter(|path| !missing.contains(*path))
        .map(|path| (*path, 200, ""))
        .collect();
    TestServer::start(routes).await
}

fn create_validator(options: ValidationOptions) -> ManifestValidator {
    let client = HttpProbeClient::new(HttpClientConfig::default()).unwrap();
    ManifestValidator::new(client, options).unwrap()
}

#[tokio::test]
async fn test_local_manifest_all_artifacts_reachable() {
    let server = start_artifact_server(&[]).await;
    let (_dir, path) = write_manifest(&sample_manifest(&server.url("")));

    let validator = create_validator(ValidationOptions::default());
    let reports = validator.validate(&ManifestLocation::Local(path)).await;

    assert!(!reports.has_error(), "unexpected errors: {:?}", reports);
    assert_eq!(reports.len(), ARTIFACT_PATHS.len());

    // Each unique URL is probed exactly once even though six platforms derive it
    for path in ARTIFACT_PATHS {
        assert_eq!(server.hits(path), 1, "{} probed more than once", path);
    }
}

#[tokio::test]
async fn test_remote_manifest_with_missing_artifact() {
    let server = start_artifact_server(&["/jre/bin/java.exe"]).await;
    let manifest = sample_manifest(&server.url(""));
    let manifest_server =
        TestServer::start(vec![("/deployment-config.json", 200, manifest.as_str())]).await;

    let validator = create_validator(ValidationOptions::default());
    let location = ManifestLocation::parse(&manifest_server.url("/deployment-config.json"));
    let reports = validator.validate(&location).await;

    assert!(reports.has_error());
    assert_eq!(reports.error_count(), 1);
    assert_eq!(reports.status_count(), ARTIFACT_PATHS.len() - 1);

    let error = reports.errors().next().unwrap();
    assert!(error.message().contains("/jre/bin/java.exe"));
    assert!(error.message().contains("bad response code 404"));
    assert!(error.message().contains("command for windows-386"));
}

#[tokio::test]
async fn test_manifest_download_failure_is_fatal() {
    let manifest_server = TestServer::start(vec![]).await;

    let validator = create_validator(ValidationOptions::default());
    let location = ManifestLocation::parse(&manifest_server.url("/deployment-config.json"));
    let reports = validator.validate(&location).await;

    assert_eq!(reports.len(), 1);
    assert!(reports.has_error());
    let message = reports.iter().next().unwrap().message().to_string();
    assert!(message.starts_with("Could not retrieve manifest"));
    assert!(message.contains("404"));
}

#[tokio::test]
async fn test_skip_jar_check_drops_jar_url() {
    let server = start_artifact_server(&["/app/lib/tool.jar"]).await;
    let (_dir, path) = write_manifest(&sample_manifest(&server.url("")));

    let options = ValidationOptions {
        skip_jar_check: true,
        ..Default::default()
    };
    let validator = create_validator(options);
    let reports = validator.validate(&ManifestLocation::Local(path)).await;

    assert!(!reports.has_error());
    assert_eq!(reports.len(), ARTIFACT_PATHS.len() - 1);
    assert_eq!(server.hits("/app/lib/tool.jar"), 0);
}

#[tokio::test]
async fn test_single_platform_with_concurrency_cap() {
    let server = start_artifact_server(&[]).await;
    let (_dir, path) = write_manifest(&sample_manifest(&server.url("")));

    let options = ValidationOptions {
        platforms: vec![Platform::new("linux", "amd64")],
        probe: ProbeConfig {
            max_concurrent: Some(2),
            ..Default::default()
        },
        ..Default::default()
    };
    let validator = create_validator(options);
    let reports = validator.validate(&ManifestLocation::Local(path)).await;

    assert!(!reports.has_error());
    assert_eq!(reports.len(), ARTIFACT_PATHS.len() - 1);
    assert_eq!(server.hits("/jre/bin/java.exe"), 0);
}

#[tokio::test]
async fn test_structural_and_probe_errors_reported_together() {
    let manifest = r#"{
  "Bundles": [
    { "BundleInfoURL": "https://cdn.example/app/bundleinfo.json", "BaseURL": "https://cdn.example/app", "LocalDirectory": "app" }
  ],
  "Execution": {
    "Commands": [
      { "Name": "/usr/bin/tool" },
      { "Name": "other/bin/tool" }
    ]
  }
}"#;
    let (_dir, path) = write_manifest(manifest);

    let probe = Arc::new(StubProbe::new());
    let client = Arc::new(HttpProbeClient::new(HttpClientConfig::default()).unwrap());
    let options = ValidationOptions {
        platforms: vec![Platform::new("linux", "amd64")],
        ..Default::default()
    };
    let validator = ManifestValidator::with_probe(client, probe.clone(), options).unwrap();
    let reports = validator.validate(&ManifestLocation::Local(path)).await;

    // Two structural errors plus one failed probe for the bundle info URL
    assert_eq!(reports.error_count(), 3);
    assert_eq!(probe.requests(), vec!["https://cdn.example/app/bundleinfo.json"]);
    let messages: Vec<&str> = reports.errors().map(|r| r.message()).collect();
    assert!(messages.iter().any(|m| m.contains("/usr/bin/tool")));
    assert!(messages.iter().any(|m| m.contains("other")));
}

#[tokio::test]
async fn test_schema_errors_stop_before_probing() {
    let manifest = r#"{
  "Timestamp": "yesterday",
  "Bundles": [
    { "BundleInfoURL": "ftp://cdn.example/app/bundleinfo.json", "BaseURL": "https://cdn.example/app", "LocalDirectory": "app" }
  ]
}"#;
    let (_dir, path) = write_manifest(manifest);

    let probe = Arc::new(StubProbe::new());
    let client = Arc::new(HttpProbeClient::new(HttpClientConfig::default()).unwrap());
    let validator =
        ManifestValidator::with_probe(client, probe.clone(), ValidationOptions::default()).unwrap();
    let reports = validator.validate(&ManifestLocation::Local(path)).await;

    assert_eq!(reports.len(), 1);
    assert!(reports.has_error());
    assert!(probe.requests().is_empty());
    let message = reports.iter().next().unwrap().message();
    assert!(message.contains("2 problem(s) found"), "{}", message);
}
