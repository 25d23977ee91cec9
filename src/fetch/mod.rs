//! Fetching datasets and boundary topologies.
//!
//! Resources are addressed by a locator string: an `http(s)` URL, a
//! `file://` URL, or a filesystem path. Relative paths are resolved against
//! the configured data root.

pub mod dsv;
pub mod topology;

use std::path::{Path, PathBuf};
use std::time::Duration;

use geojson::FeatureCollection;
use log::{debug, info};
use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize};

use crate::datasets::DatasetUrls;
use dsv::DsvTable;
use topology::{Topology, TopologyError};

const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("could not read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{url} returned {status}")]
    Status { url: String, status: StatusCode },
    #[error("invalid locator '{0}'")]
    InvalidLocator(String),
    #[error("invalid CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Topology(#[from] TopologyError),
}

/// Transport settings for fetching resources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Base directory of relative paths.
    pub data_root: PathBuf,
    /// Per-request timeout for remote resources, `0` for none.
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            data_root: PathBuf::from("."),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Where a resource lives.
#[derive(Debug, Clone, PartialEq)]
pub enum Locator {
    Remote(Url),
    Local(PathBuf),
}

impl Locator {
    pub fn parse(input: &str, root: &Path) -> Result<Self, FetchError> {
        let invalid = || FetchError::InvalidLocator(input.to_string());
        if input.trim().is_empty() {
            return Err(invalid());
        }

        match Url::parse(input) {
            Ok(url) => match url.scheme() {
                "http" | "https" => Ok(Locator::Remote(url)),
                "file" => url.to_file_path().map(Locator::Local).map_err(|_| invalid()),
                // a Windows drive letter reads as a one-letter scheme
                scheme if scheme.len() == 1 => Ok(Locator::Local(PathBuf::from(input))),
                _ => Err(invalid()),
            },
            Err(_) if input.contains("://") => Err(invalid()),
            Err(_) => Ok(Locator::Local(root.join(input))),
        }
    }
}

/// Both tabular datasets, loaded together.
#[derive(Debug, Clone)]
pub struct LoadedDatasets {
    pub lad: DsvTable,
    pub lsoa: DsvTable,
}

/// Fetches resources over HTTP or from disk.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: reqwest::Client,
    data_root: PathBuf,
}

impl Fetcher {
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
        if config.timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(config.timeout_secs));
        }
        Ok(Self {
            client: builder.build()?,
            data_root: config.data_root.clone(),
        })
    }

    /// The resource's content as text.
    pub async fn text(&self, locator: &str) -> Result<String, FetchError> {
        match Locator::parse(locator, &self.data_root)? {
            Locator::Remote(url) => {
                debug!("GET {url}");
                let response = self.client.get(url.clone()).send().await?;
                let status = response.status();
                if !status.is_success() {
                    return Err(FetchError::Status {
                        url: url.to_string(),
                        status,
                    });
                }
                Ok(response.text().await?)
            }
            Locator::Local(path) => {
                debug!("Reading {}", path.display());
                tokio::fs::read_to_string(&path)
                    .await
                    .map_err(|source| FetchError::Io { path, source })
            }
        }
    }

    /// Fetches a CSV resource and types its fields.
    pub async fn get_data(&self, locator: &str) -> Result<DsvTable, FetchError> {
        let text = self.text(locator).await?;
        let table = dsv::parse_csv(&text)?;
        info!("Loaded {} rows from {locator}", table.len());
        Ok(table)
    }

    /// Fetches a TopoJSON resource and converts the object `layer` to GeoJSON features.
    pub async fn get_topo(&self, locator: &str, layer: &str) -> Result<FeatureCollection, FetchError> {
        let text = self.text(locator).await?;
        let topology: Topology = serde_json::from_str(&text)?;
        let features = topology::feature_collection(&topology, layer)?;
        info!(
            "Loaded {} features of layer '{layer}' from {locator}",
            features.features.len()
        );
        Ok(features)
    }

    /// Fetches the LAD and LSOA tables concurrently.
    pub async fn load_datasets(&self, urls: &DatasetUrls) -> Result<LoadedDatasets, FetchError> {
        let (lad, lsoa) = tokio::try_join!(self.get_data(&urls.lad), self.get_data(&urls.lsoa))?;
        Ok(LoadedDatasets { lad, lsoa })
    }
}

/// Fetches and parses a CSV resource with default settings.
pub async fn get_data(url: &str) -> Result<DsvTable, FetchError> {
    Fetcher::new(&FetchConfig::default())?.get_data(url).await
}

/// Fetches a topology with default settings and converts one of its layers.
pub async fn get_topo(url: &str, layer: &str) -> Result<FeatureCollection, FetchError> {
    Fetcher::new(&FetchConfig::default())?
        .get_topo(url, layer)
        .await
}

#[cfg(test)]
mod tests {
    use super::dsv::Value;
    use super::*;
    use std::fs;
    use std::thread;

    const TOPOLOGY: &str = r#"{
        "type": "Topology",
        "arcs": [[[0, 0], [1, 0], [1, 1], [0, 0]], [[5, 5], [6, 5], [6, 6], [5, 5]]],
        "objects": {
            "la2019EW": {
                "type": "GeometryCollection",
                "geometries": [
                    {"type": "Polygon", "properties": {"AREACD": "E06000001"}, "arcs": [[0]]},
                    {"type": "Polygon", "properties": {"AREACD": "E06000002"}, "arcs": [[1]]}
                ]
            }
        }
    }"#;

    /// Serves a single request with the given status and body.
    fn serve_once(status: u16, body: &'static str) -> (String, thread::JoinHandle<()>) {
        let server = tiny_http::Server::http("127.0.0.1:0").expect("Failed to start test server");
        let port = server.server_addr().to_ip().unwrap().port();
        let handle = thread::spawn(move || {
            if let Ok(request) = server.recv() {
                let response = tiny_http::Response::from_string(body).with_status_code(status);
                let _ = request.respond(response);
            }
        });
        (format!("http://127.0.0.1:{port}/resource"), handle)
    }

    fn fetcher_in(root: &Path) -> Fetcher {
        Fetcher::new(&FetchConfig {
            data_root: root.to_path_buf(),
            ..FetchConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_locator_parsing() {
        let root = Path::new("/srv/imd");
        assert_eq!(
            Locator::parse("./data/imd-lad19.csv", root).unwrap(),
            Locator::Local(root.join("./data/imd-lad19.csv"))
        );
        assert!(matches!(
            Locator::parse("https://cdn.ons.gov.uk/x.csv", root).unwrap(),
            Locator::Remote(_)
        ));
        assert!(matches!(
            Locator::parse("ftp://example.org/x.csv", root),
            Err(FetchError::InvalidLocator(_))
        ));
        assert!(matches!(
            Locator::parse("http://[::1", root),
            Err(FetchError::InvalidLocator(_))
        ));
        assert!(matches!(
            Locator::parse("  ", root),
            Err(FetchError::InvalidLocator(_))
        ));
    }

    #[tokio::test]
    async fn test_get_data_from_http() {
        let (url, server) = serve_once(200, "a,b\n1,2\n3,4\n");

        let table = get_data(&url).await.unwrap();
        server.join().unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0].get("a"), Some(&Value::Number(1.0)));
        assert_eq!(table.rows[0].get("b"), Some(&Value::Number(2.0)));
        assert_eq!(table.rows[1].get("a"), Some(&Value::Number(3.0)));
        assert_eq!(table.rows[1].get("b"), Some(&Value::Number(4.0)));
    }

    #[tokio::test]
    async fn test_http_error_status_propagates() {
        let (url, server) = serve_once(404, "not here");

        let err = get_data(&url).await.unwrap_err();
        server.join().unwrap();

        assert!(matches!(
            err,
            FetchError::Status { status, .. } if status == StatusCode::NOT_FOUND
        ));
    }

    #[tokio::test]
    async fn test_get_data_from_relative_path() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("data")).unwrap();
        fs::write(dir.path().join("data/imd.csv"), "code,rank\nE01,3\n").unwrap();

        let table = fetcher_in(dir.path())
            .get_data("./data/imd.csv")
            .await
            .unwrap();

        assert_eq!(table.rows[0].get("code"), Some(&Value::String("E01".into())));
        assert_eq!(table.rows[0].get("rank"), Some(&Value::Number(3.0)));
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = fetcher_in(dir.path())
            .get_data("missing.csv")
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Io { .. }));
    }

    #[tokio::test]
    async fn test_get_topo_from_file_url() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bounds.json");
        fs::write(&path, TOPOLOGY).unwrap();
        let url = Url::from_file_path(&path).unwrap();

        let features = get_topo(url.as_str(), "la2019EW").await.unwrap();

        assert_eq!(features.features.len(), 2);
        let code = features.features[1]
            .properties
            .as_ref()
            .and_then(|p| p.get("AREACD"));
        assert_eq!(code, Some(&serde_json::json!("E06000002")));
    }

    #[tokio::test]
    async fn test_get_topo_errors() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("bounds.json"), TOPOLOGY).unwrap();
        fs::write(dir.path().join("broken.json"), "{\"objects\": ").unwrap();
        let fetcher = fetcher_in(dir.path());

        let missing = fetcher.get_topo("bounds.json", "lsoa11").await.unwrap_err();
        assert!(matches!(
            missing,
            FetchError::Topology(TopologyError::MissingObject(ref name)) if name == "lsoa11"
        ));

        let broken = fetcher.get_topo("broken.json", "la2019EW").await.unwrap_err();
        assert!(matches!(broken, FetchError::Json(_)));
    }

    #[tokio::test]
    async fn test_load_datasets() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("lad.csv"), "code\nE06000001\nE06000002\n").unwrap();
        fs::write(dir.path().join("lsoa.csv"), "code\nE01000001\n").unwrap();
        let urls = DatasetUrls {
            lad: "lad.csv".to_string(),
            lsoa: "lsoa.csv".to_string(),
        };

        let loaded = fetcher_in(dir.path()).load_datasets(&urls).await.unwrap();

        assert_eq!(loaded.lad.len(), 2);
        assert_eq!(loaded.lsoa.len(), 1);
    }

    #[tokio::test]
    async fn test_load_datasets_fails_if_either_fails() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("lad.csv"), "code\nE06000001\n").unwrap();
        let urls = DatasetUrls {
            lad: "lad.csv".to_string(),
            lsoa: "absent.csv".to_string(),
        };

        assert!(fetcher_in(dir.path()).load_datasets(&urls).await.is_err());
    }

    #[tokio::test]
    async fn test_configured_user_agent_is_sent() {
        let server = tiny_http::Server::http("127.0.0.1:0").expect("Failed to start test server");
        let port = server.server_addr().to_ip().unwrap().port();
        let (tx, rx) = std::sync::mpsc::channel();
        let handle = thread::spawn(move || {
            if let Ok(request) = server.recv() {
                let agent = request
                    .headers()
                    .iter()
                    .find(|h| h.field.equiv("User-Agent"))
                    .map(|h| h.value.as_str().to_string());
                let _ = tx.send(agent);
                let _ = request.respond(tiny_http::Response::from_string("a\n1\n"));
            }
        });

        let fetcher = Fetcher::new(&FetchConfig {
            user_agent: "imd-test/9.9".to_string(),
            ..FetchConfig::default()
        })
        .unwrap();
        let table = fetcher
            .get_data(&format!("http://127.0.0.1:{port}/lad.csv"))
            .await
            .unwrap();
        handle.join().unwrap();

        assert_eq!(table.len(), 1);
        assert_eq!(rx.recv().unwrap().as_deref(), Some("imd-test/9.9"));
    }

    #[tokio::test]
    async fn test_slow_server_times_out() {
        let server = tiny_http::Server::http("127.0.0.1:0").expect("Failed to start test server");
        let port = server.server_addr().to_ip().unwrap().port();
        let handle = thread::spawn(move || {
            if let Ok(request) = server.recv() {
                thread::sleep(Duration::from_secs(3));
                let _ = request.respond(tiny_http::Response::from_string("a\n1\n"));
            }
        });

        let fetcher = Fetcher::new(&FetchConfig {
            timeout_secs: 1,
            ..FetchConfig::default()
        })
        .unwrap();
        let err = fetcher
            .get_data(&format!("http://127.0.0.1:{port}/slow.csv"))
            .await
            .unwrap_err();
        handle.join().unwrap();

        assert!(matches!(&err, FetchError::Http(e) if e.is_timeout()), "{err:?}");
    }
}
