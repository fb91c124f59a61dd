//! Study-plan source downloads.
//!
//! Each configured source URL points directly at a PDF; `fetch_source`
//! downloads it into the corpus directory and reports a [`DownloadRecord`].
//! The contract is deliberately thin — `fetch(url) -> path | failure` — so
//! the corpus loader never depends on how a source was obtained.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Utc;
use reqwest::Client;
use tracing::{info, instrument, warn};
use url::Url;

use planbot_shared::{DownloadRecord, PlanbotError, Result, SourceEntry};

/// Maximum number of redirects to follow when fetching a source.
const MAX_REDIRECTS: usize = 5;

/// Default timeout in seconds for a source download.
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// User-Agent string for download requests.
const USER_AGENT: &str = concat!("planbot/", env!("CARGO_PKG_VERSION"));

/// Build a reqwest client with appropriate settings for downloads.
pub fn build_client() -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
        .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
        .build()
        .map_err(|e| PlanbotError::Network(format!("failed to build HTTP client: {e}")))
}

/// Download one source PDF into `out_dir`.
///
/// The file name is derived from the URL path (falling back to the source
/// name). `out_dir` is created if missing. A non-2xx status or transport
/// failure is an error; callers iterate sources and continue past
/// individual failures.
#[instrument(skip_all, fields(name = %source.name, url = %source.url))]
pub async fn fetch_source(
    client: &Client,
    source: &SourceEntry,
    out_dir: &Path,
) -> Result<DownloadRecord> {
    let url = Url::parse(&source.url)
        .map_err(|e| PlanbotError::validation(format!("invalid source URL {}: {e}", source.url)))?;

    let response = client
        .get(url.as_str())
        .send()
        .await
        .map_err(|e| PlanbotError::Network(format!("{url}: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(PlanbotError::Network(format!("{url}: HTTP {status}")));
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| PlanbotError::Network(format!("{url}: body read failed: {e}")))?;

    std::fs::create_dir_all(out_dir).map_err(|e| PlanbotError::io(out_dir, e))?;

    let file_name = file_name_for(&url, &source.name);
    let path = out_dir.join(&file_name);
    std::fs::write(&path, &body).map_err(|e| PlanbotError::io(&path, e))?;

    info!(path = %path.display(), bytes = body.len(), "source downloaded");

    Ok(DownloadRecord {
        url: url.to_string(),
        path,
        bytes: body.len(),
        downloaded_at: Utc::now(),
    })
}

/// Download every configured source, skipping failures.
///
/// One unreachable source never aborts the batch; failures are logged and
/// the successful records returned.
pub async fn fetch_all(
    client: &Client,
    sources: &[SourceEntry],
    out_dir: &Path,
) -> Vec<DownloadRecord> {
    let mut records = Vec::with_capacity(sources.len());

    for source in sources {
        match fetch_source(client, source, out_dir).await {
            Ok(record) => records.push(record),
            Err(e) => {
                warn!(name = %source.name, error = %e, "source download failed, skipping");
            }
        }
    }

    records
}

/// Derive a local file name from the URL's last path segment.
///
/// Falls back to `<name>.pdf` when the URL path has no usable segment, and
/// appends `.pdf` when the segment lacks the extension.
fn file_name_for(url: &Url, name: &str) -> String {
    let segment = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    let base = segment.unwrap_or_else(|| format!("{name}.pdf"));
    if base.to_lowercase().ends_with(".pdf") {
        base
    } else {
        format!("{base}.pdf")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("planbot-fetch-{tag}-{}", uuid::Uuid::now_v7()))
    }

    fn source(url: &str) -> SourceEntry {
        SourceEntry {
            name: "ai-masters".into(),
            url: url.into(),
        }
    }

    #[test]
    fn file_name_from_url_path() {
        let url = Url::parse("https://example.edu/programs/ai/plan.pdf").unwrap();
        assert_eq!(file_name_for(&url, "ai-masters"), "plan.pdf");
    }

    #[test]
    fn file_name_appends_extension() {
        let url = Url::parse("https://example.edu/download/10234").unwrap();
        assert_eq!(file_name_for(&url, "ai-masters"), "10234.pdf");
    }

    #[test]
    fn file_name_falls_back_to_source_name() {
        let url = Url::parse("https://example.edu/").unwrap();
        assert_eq!(file_name_for(&url, "ai-masters"), "ai-masters.pdf");
    }

    #[tokio::test]
    async fn fetch_source_writes_the_body_to_disk() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/plans/ai.pdf"))
            .respond_with(
                wiremock::ResponseTemplate::new(200).set_body_bytes(b"%PDF-1.4 fake".to_vec()),
            )
            .mount(&server)
            .await;

        let dir = temp_dir("ok");
        let client = build_client().unwrap();
        let record = fetch_source(&client, &source(&format!("{}/plans/ai.pdf", server.uri())), &dir)
            .await
            .unwrap();

        assert_eq!(record.bytes, 13);
        assert_eq!(record.path, dir.join("ai.pdf"));
        let written = std::fs::read(&record.path).unwrap();
        assert_eq!(written, b"%PDF-1.4 fake");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn fetch_source_propagates_http_errors() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .respond_with(wiremock::ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let dir = temp_dir("missing");
        let client = build_client().unwrap();
        let err = fetch_source(&client, &source(&format!("{}/gone.pdf", server.uri())), &dir)
            .await
            .unwrap_err();
        assert!(matches!(err, PlanbotError::Network(_)));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn fetch_all_continues_past_failures() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/good.pdf"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_bytes(b"%PDF".to_vec()))
            .mount(&server)
            .await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/bad.pdf"))
            .respond_with(wiremock::ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let sources = vec![
            SourceEntry {
                name: "bad".into(),
                url: format!("{}/bad.pdf", server.uri()),
            },
            SourceEntry {
                name: "good".into(),
                url: format!("{}/good.pdf", server.uri()),
            },
        ];

        let dir = temp_dir("batch");
        let client = build_client().unwrap();
        let records = fetch_all(&client, &sources, &dir).await;

        assert_eq!(records.len(), 1);
        assert!(records[0].path.ends_with("good.pdf"));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
