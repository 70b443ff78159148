use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result, anyhow};
use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::{ETAG, HeaderName, IF_MODIFIED_SINCE, IF_NONE_MATCH, LAST_MODIFIED};
use serde::{Deserialize, Serialize};

use crate::config::app_cache_dir;
use crate::http_client::http_client;
use crate::match_dataset::{decode_text, parse_match_csv};

pub const BASE_URL: &str = "https://www.football-data.co.uk/mmz4281";
const MANIFEST_VERSION: u32 = 1;
const MANIFEST_FILE: &str = "fetch_manifest.json";

pub fn season_url(base: &str, season: &str, division: &str) -> String {
    format!("{}/{}/{}.csv", base.trim_end_matches('/'), season, division)
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct Manifest {
    version: u32,
    entries: HashMap<String, ManifestEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ManifestEntry {
    etag: Option<String>,
    last_modified: Option<String>,
    fetched_at: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchStatus {
    Downloaded { bytes: usize, matches: usize },
    NotModified,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FetchSummary {
    pub fetched: Vec<(String, FetchStatus)>,
    pub failed: Vec<(String, String)>,
}

impl FetchSummary {
    pub fn is_ok(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Downloads season files into a data directory, one CSV per division.
pub struct SeasonFetcher {
    base_url: String,
    data_dir: PathBuf,
    manifest_path: Option<PathBuf>,
    manifest: Manifest,
}

impl SeasonFetcher {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        let manifest_path = app_cache_dir().map(|dir| dir.join(MANIFEST_FILE));
        Self::with_manifest(data_dir, manifest_path)
    }

    pub fn with_manifest(data_dir: impl Into<PathBuf>, manifest_path: Option<PathBuf>) -> Self {
        let manifest = manifest_path
            .as_deref()
            .map(load_manifest)
            .unwrap_or_default();
        Self {
            base_url: BASE_URL.to_string(),
            data_dir: data_dir.into(),
            manifest_path,
            manifest,
        }
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn target_path(&self, division: &str) -> PathBuf {
        self.data_dir.join(format!("{division}.csv"))
    }

    /// Fetches every division. A failing division is recorded and the rest continue.
    pub fn fetch_all(&mut self, season: &str, divisions: &[String]) -> Result<FetchSummary> {
        let client = http_client()?;
        fs::create_dir_all(&self.data_dir)
            .with_context(|| format!("create data dir {}", self.data_dir.display()))?;

        let mut summary = FetchSummary::default();
        for division in divisions {
            match self.fetch_one(client, season, division) {
                Ok(status) => {
                    log::info!("{season}/{division}: {status:?}");
                    summary.fetched.push((division.clone(), status));
                }
                Err(err) => {
                    log::warn!("{season}/{division}: {err:#}");
                    summary.failed.push((division.clone(), format!("{err:#}")));
                }
            }
        }
        if let Err(err) = self.save() {
            log::warn!("could not save fetch manifest: {err:#}");
        }
        Ok(summary)
    }

    fn fetch_one(&mut self, client: &Client, season: &str, division: &str) -> Result<FetchStatus> {
        let url = season_url(&self.base_url, season, division);
        let target = self.target_path(division);

        let mut req = client.get(&url);
        // Validators only make sense while the local copy still exists.
        if target.exists()
            && let Some(entry) = self.manifest.entries.get(&url)
        {
            if let Some(etag) = entry.etag.as_ref() {
                req = req.header(IF_NONE_MATCH, etag);
            }
            if let Some(last_modified) = entry.last_modified.as_ref() {
                req = req.header(IF_MODIFIED_SINCE, last_modified);
            }
        }

        let resp = req.send().with_context(|| format!("request {url}"))?;
        let status = resp.status();
        if status == StatusCode::NOT_MODIFIED {
            return Ok(FetchStatus::NotModified);
        }
        if !status.is_success() {
            return Err(anyhow!("http {status} for {url}"));
        }

        let headers = resp.headers().clone();
        let body = resp.bytes().context("failed reading body")?;
        let (matches, _) = parse_match_csv(&decode_text(&body), &url, division)
            .with_context(|| format!("{url} is not a fixture file"))?;

        write_atomic(&target, &body)?;
        let header = |name: HeaderName| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(|v| v.to_string())
        };
        self.manifest.entries.insert(
            url,
            ManifestEntry {
                etag: header(ETAG),
                last_modified: header(LAST_MODIFIED),
                fetched_at: now_secs(),
            },
        );
        Ok(FetchStatus::Downloaded {
            bytes: body.len(),
            matches: matches.len(),
        })
    }

    fn save(&mut self) -> Result<()> {
        let Some(path) = self.manifest_path.as_deref() else {
            return Ok(());
        };
        self.manifest.version = MANIFEST_VERSION;
        let json = serde_json::to_vec(&self.manifest).context("serialize fetch manifest")?;
        write_atomic(path, &json)
    }
}

fn load_manifest(path: &Path) -> Manifest {
    let Ok(raw) = fs::read_to_string(path) else {
        return Manifest::default();
    };
    let manifest = serde_json::from_str::<Manifest>(&raw).unwrap_or_default();
    if manifest.version != MANIFEST_VERSION {
        return Manifest::default();
    }
    manifest
}

/// Writes through a sibling temp file so readers never see a partial file.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, bytes).with_context(|| format!("write {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("swap {}", path.display()))?;
    Ok(())
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_provider_urls() {
        assert_eq!(
            season_url(BASE_URL, "2526", "SP1"),
            "https://www.football-data.co.uk/mmz4281/2526/SP1.csv"
        );
        assert_eq!(season_url("http://host/", "2425", "SP2"), "http://host/2425/SP2.csv");
    }

    #[test]
    fn targets_one_file_per_division() {
        let fetcher = SeasonFetcher::with_manifest("/data", None).base_url("http://mirror/");
        assert_eq!(fetcher.target_path("SP2"), PathBuf::from("/data/SP2.csv"));
        assert_eq!(
            season_url(&fetcher.base_url, "2526", "SP2"),
            "http://mirror/2526/SP2.csv"
        );
    }

    #[test]
    fn manifest_survives_reload() {
        let dir = tempfile::tempdir().expect("tempdir");
        let manifest = dir.path().join("cache").join(MANIFEST_FILE);
        let mut fetcher = SeasonFetcher::with_manifest(dir.path(), Some(manifest.clone()));
        fetcher.manifest.entries.insert(
            "u".to_string(),
            ManifestEntry {
                etag: Some("\"abc\"".to_string()),
                last_modified: None,
                fetched_at: 1,
            },
        );
        fetcher.save().expect("save");

        let reloaded = SeasonFetcher::with_manifest(dir.path(), Some(manifest));
        let entry = reloaded.manifest.entries.get("u").expect("entry");
        assert_eq!(entry.etag.as_deref(), Some("\"abc\""));
    }

    #[test]
    fn stale_manifest_version_is_dropped() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(MANIFEST_FILE);
        fs::write(&path, r#"{"version":0,"entries":{"u":{"etag":null,"last_modified":null,"fetched_at":0}}}"#)
            .expect("write");
        assert!(load_manifest(&path).entries.is_empty());
    }
}
