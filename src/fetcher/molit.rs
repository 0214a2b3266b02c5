//! MOLIT real-transaction portal fetcher
//!
//! Posts the portal's spreadsheet-export form directly and classifies what
//! comes back. The portal has no download API: the same endpoint serves the
//! `.xlsx` payload on success, an HTML notice when the daily download cap is
//! hit, and assorted error pages under load.

use super::{FetchClient, FetchError, FetchResult};
use crate::{Category, Period};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};

/// Spreadsheet export endpoint
const PORTAL_URL: &str = "https://rt.molit.go.kr/pt/xls/xls.do";

/// Per-request timeout. The export is generated server-side and large months
/// take tens of seconds; beyond this the portal has effectively dropped us.
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Substring of the notice page served once the daily cap is reached.
const QUOTA_MARKER: &str = "일일 다운로드 허용 횟수";

/// `.xlsx` files are zip archives; the payload must start with the zip magic.
const XLSX_MAGIC: &[u8] = b"PK\x03\x04";

/// Fetches export spreadsheets from the MOLIT portal over HTTP.
pub struct MolitFetchClient {
    http: reqwest::Client,
    base_url: String,
}

impl MolitFetchClient {
    /// Create a client against the production portal.
    pub fn new() -> FetchResult<Self> {
        Self::with_base_url(PORTAL_URL)
    }

    /// Create a client against a custom endpoint (test servers).
    pub fn with_base_url(base_url: impl Into<String>) -> FetchResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(DOWNLOAD_TIMEOUT)
            .build()
            .map_err(|e| FetchError::NetworkError(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl FetchClient for MolitFetchClient {
    async fn fetch(&self, category: &Category, period: Period) -> FetchResult<Vec<u8>> {
        debug!(
            category = category.id(),
            period = %period,
            "Requesting spreadsheet export"
        );

        let year = period.year().to_string();
        let month = format!("{:02}", period.month());
        let response = self
            .http
            .post(&self.base_url)
            .form(&[
                ("srhThingSecd", category.label()),
                ("srhDelngYear", year.as_str()),
                ("srhDelngMonth", month.as_str()),
            ])
            .send()
            .await
            .map_err(classify_request_error)?;

        let status = response.status();
        if status.is_server_error() || status.as_u16() == 429 {
            return Err(FetchError::PortalError(format!(
                "portal returned {status}"
            )));
        }
        if !status.is_success() {
            return Err(FetchError::UnrecognizedResponse(format!(
                "unexpected status {status}"
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(classify_request_error)?
            .to_vec();

        match classify_body(&body) {
            Ok(()) => Ok(body),
            Err(e) => {
                warn!(
                    category = category.id(),
                    period = %period,
                    error = %e,
                    "Export request did not produce a spreadsheet"
                );
                Err(e)
            }
        }
    }
}

/// Map reqwest's failure modes onto the retry taxonomy.
fn classify_request_error(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout(e.to_string())
    } else {
        FetchError::NetworkError(e.to_string())
    }
}

/// Decide what the portal actually sent back.
fn classify_body(body: &[u8]) -> Result<(), FetchError> {
    if body.starts_with(XLSX_MAGIC) {
        return Ok(());
    }

    // Not a spreadsheet. The quota notice is an HTML page; sniff a bounded
    // prefix so a multi-megabyte error page cannot balloon the check.
    let prefix = String::from_utf8_lossy(&body[..body.len().min(4096)]);
    if prefix.contains(QUOTA_MARKER) {
        return Err(FetchError::QuotaExhausted);
    }

    let snippet: String = prefix.chars().take(120).collect();
    Err(FetchError::UnrecognizedResponse(format!(
        "expected xlsx payload, got {} bytes starting {snippet:?}",
        body.len()
    )))
}
