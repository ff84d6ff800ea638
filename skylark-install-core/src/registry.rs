use crate::version::{ReleaseTag, VersionSpec};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// GitHub repository the release assets are published under
pub const GITHUB_REPO: &str = "skylarkhq/skylark-cli";

/// Last-known-good release, used when the latest-version query fails.
/// Installs that land here are degraded, not broken, and log a warning.
pub const FALLBACK_VERSION: &str = "v0.4.0";

const QUERY_TIMEOUT: Duration = Duration::from_secs(10);
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(300);

/// Subset of the GitHub release payload the installer needs
#[derive(Debug, Deserialize)]
struct ReleaseResponse {
    tag_name: String,
}

/// Client for the remote release registry.
///
/// Three operations: resolve "latest" to a tag, check that a requested tag
/// exists (so a bad version fails before any download starts), and fetch a
/// named asset. Queries are bounded at 10 seconds and downloads at 300; no
/// operation is retried automatically.
pub struct ReleaseRegistry {
    client: reqwest::blocking::Client,
    api_base: String,
    download_base: String,
    repo: String,
}

impl ReleaseRegistry {
    pub fn new() -> Result<ReleaseRegistry> {
        ReleaseRegistry::with_base_urls("https://api.github.com", "https://github.com")
    }

    /// Builds a registry against explicit base URLs. Tests point this at a
    /// local listener instead of GitHub.
    pub fn with_base_urls(api_base: &str, download_base: &str) -> Result<ReleaseRegistry> {
        let user_agent = format!(
            "skylark-install/{} (https://github.com/skylarkhq/skylark-install)",
            env!("CARGO_PKG_VERSION")
        );

        let client = reqwest::blocking::Client::builder()
            .user_agent(user_agent)
            .timeout(QUERY_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(ReleaseRegistry {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            download_base: download_base.trim_end_matches('/').to_string(),
            repo: GITHUB_REPO.to_string(),
        })
    }

    /// Resolves a version spec to a concrete tag.
    ///
    /// "latest" asks the registry; if that query fails the installer keeps
    /// going on the hard-coded fallback so automated installs degrade loudly
    /// instead of breaking.
    pub fn resolve(&self, spec: &VersionSpec) -> Result<ReleaseTag> {
        match spec {
            VersionSpec::Exact(tag) => Ok(tag.clone()),
            VersionSpec::Latest => match self.latest_tag() {
                Ok(tag) => {
                    log::info!("Latest published release is {}", tag);
                    Ok(tag)
                }
                Err(e) => {
                    log::warn!(
                        "Could not determine the latest release ({:#}); falling back to last-known-good {}. \
                         The installed version may be stale - re-run with -v <VERSION> to pin one.",
                        e,
                        FALLBACK_VERSION
                    );
                    ReleaseTag::parse(FALLBACK_VERSION)
                        .context("built-in fallback version is malformed")
                }
            },
        }
    }

    /// Queries the most recently published stable tag.
    pub fn latest_tag(&self) -> Result<ReleaseTag> {
        let url = format!("{}/repos/{}/releases/latest", self.api_base, self.repo);
        log::debug!("Querying latest release: {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .context("Failed to query the release registry")?;

        if !response.status().is_success() {
            anyhow::bail!("release registry returned status {}", response.status());
        }

        let body = response
            .text()
            .context("Failed to read release registry response")?;
        let release: ReleaseResponse = serde_json::from_str(&body)
            .context("Failed to parse release registry response")?;

        ReleaseTag::parse(&release.tag_name)
            .with_context(|| format!("registry returned unparseable tag '{}'", release.tag_name))
    }

    /// Checks whether a tag has been published. A missing tag is not an
    /// error here; the caller decides that a download against it is.
    pub fn tag_exists(&self, tag: &ReleaseTag) -> Result<bool> {
        let url = format!(
            "{}/repos/{}/releases/tags/{}",
            self.api_base, self.repo, tag
        );
        log::debug!("Checking release tag: {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .context("Failed to query the release registry")?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(false);
        }
        if !response.status().is_success() {
            anyhow::bail!("release registry returned status {}", response.status());
        }
        Ok(true)
    }

    /// Downloads a release asset to `dest`. Fatal on any failure; transient
    /// network errors are indistinguishable from permanent ones at this
    /// layer, so the user re-runs the installer rather than us retrying.
    pub fn download_asset(&self, tag: &ReleaseTag, asset_name: &str, dest: &Path) -> Result<()> {
        let url = format!(
            "{}/{}/releases/download/{}/{}",
            self.download_base, self.repo, tag, asset_name
        );
        log::info!("Downloading {}", url);

        let mut response = self
            .client
            .get(&url)
            .timeout(DOWNLOAD_TIMEOUT)
            .send()
            .with_context(|| format!("Failed to download {}", asset_name))?;

        if !response.status().is_success() {
            anyhow::bail!(
                "download of {} failed with status {}: check that the asset exists for release {}",
                asset_name,
                response.status(),
                tag
            );
        }

        let mut file = fs::File::create(dest)
            .with_context(|| format!("Failed to create {}", dest.display()))?;
        let bytes = std::io::copy(&mut response, &mut file)
            .with_context(|| format!("Failed to write {}", dest.display()))?;

        log::debug!("Downloaded {} bytes to {}", bytes, dest.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;

    /// One-shot HTTP responder on a random local port. Accepts a single
    /// connection, ignores the request, and writes the canned response.
    fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut buf = [0u8; 4096];
            let _ = stream.read(&mut buf);
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            let _ = stream.write_all(response.as_bytes());
        });
        format!("http://{}", addr)
    }

    /// A base URL nothing is listening on; connections are refused fast.
    fn dead_base() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{}", addr)
    }

    #[test]
    fn test_latest_tag_parses_registry_response() {
        let base = serve_once("200 OK", r#"{"tag_name": "v1.4.2"}"#);
        let registry = ReleaseRegistry::with_base_urls(&base, &base).unwrap();
        let tag = registry.latest_tag().unwrap();
        assert_eq!(tag.to_string(), "v1.4.2");
    }

    #[test]
    fn test_latest_tag_rejects_malformed_tag() {
        let base = serve_once("200 OK", r#"{"tag_name": "1.4.2"}"#);
        let registry = ReleaseRegistry::with_base_urls(&base, &base).unwrap();
        assert!(registry.latest_tag().is_err());
    }

    #[test]
    fn test_tag_exists_true_on_success() {
        let base = serve_once("200 OK", r#"{"tag_name": "v1.0.0"}"#);
        let registry = ReleaseRegistry::with_base_urls(&base, &base).unwrap();
        let tag = ReleaseTag::parse("v1.0.0").unwrap();
        assert!(registry.tag_exists(&tag).unwrap());
    }

    #[test]
    fn test_tag_exists_false_on_404() {
        let base = serve_once("404 Not Found", r#"{"message": "Not Found"}"#);
        let registry = ReleaseRegistry::with_base_urls(&base, &base).unwrap();
        let tag = ReleaseTag::parse("v9.9.9").unwrap();
        assert!(!registry.tag_exists(&tag).unwrap());
    }

    #[test]
    fn test_resolve_latest_degrades_to_fallback_when_registry_unreachable() {
        let base = dead_base();
        let registry = ReleaseRegistry::with_base_urls(&base, &base).unwrap();
        let tag = registry.resolve(&VersionSpec::Latest).unwrap();
        assert_eq!(tag.to_string(), FALLBACK_VERSION);
    }

    #[test]
    fn test_resolve_exact_needs_no_network() {
        let base = dead_base();
        let registry = ReleaseRegistry::with_base_urls(&base, &base).unwrap();
        let requested = ReleaseTag::parse("v2.0.0").unwrap();
        let tag = registry
            .resolve(&VersionSpec::Exact(requested.clone()))
            .unwrap();
        assert_eq!(tag, requested);
    }

    #[test]
    fn test_download_asset_writes_file() {
        let base = serve_once("200 OK", "binary payload");
        let registry = ReleaseRegistry::with_base_urls(&base, &base).unwrap();
        let tag = ReleaseTag::parse("v1.0.0").unwrap();

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("skylark-linux.zip");
        registry
            .download_asset(&tag, "skylark-linux.zip", &dest)
            .unwrap();
        assert_eq!(fs::read_to_string(&dest).unwrap(), "binary payload");
    }

    #[test]
    fn test_download_asset_fails_on_missing_asset() {
        let base = serve_once("404 Not Found", "");
        let registry = ReleaseRegistry::with_base_urls(&base, &base).unwrap();
        let tag = ReleaseTag::parse("v1.0.0").unwrap();

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("skylark-linux.zip");
        let err = registry
            .download_asset(&tag, "skylark-linux.zip", &dest)
            .unwrap_err();
        assert!(err.to_string().contains("skylark-linux.zip"));
    }

    #[test]
    fn test_release_response_shape() {
        // The registry payload carries more fields than we model; extra
        // fields must not break deserialization.
        let payload = r#"{"tag_name": "v0.9.1", "prerelease": false, "assets": []}"#;
        let release: ReleaseResponse = serde_json::from_str(payload).unwrap();
        assert_eq!(release.tag_name, "v0.9.1");
    }
}
