//! Remote protein record fetcher
//!
//! Retrieves UniProtKB flat-text records over HTTP with bounded retry.
//! Transient failures (transport errors, server errors) are retried
//! immediately, with no backoff: the retry bound, not a delay schedule, is
//! the deliberate policy here. A definitive client-error response means the
//! identifier has no record and stops retrying at once.

use crate::error::{CoreError, Result};
use crate::record::ProteinRecord;
use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default record service base URL.
/// Can be overridden via the CYSANNO_UNIPROT_URL environment variable.
pub const DEFAULT_BASE_URL: &str = "https://rest.uniprot.org";

/// Bounded retry count for transient fetch failures
pub const DEFAULT_RETRIES: usize = 10;

/// Per-request timeout in seconds
const REQUEST_TIMEOUT_SECS: u64 = 120;

/// HTTP client for the protein knowledge database
pub struct UniprotClient {
    client: reqwest::Client,
    base_url: String,
    retries: usize,
}

impl UniprotClient {
    /// Create a new client against the given base URL
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            retries: DEFAULT_RETRIES,
        })
    }

    /// Create from environment variables, falling back to the public service
    pub fn from_env() -> Result<Self> {
        let base_url =
            std::env::var("CYSANNO_UNIPROT_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::new(base_url)
    }

    /// Override the retry bound
    pub fn with_retries(mut self, retries: usize) -> Self {
        self.retries = retries;
        self
    }

    /// Fetch one record. `None` means the identifier has no resolvable
    /// record: a definitive not-found response, an unparseable record, or
    /// exhausted retries all collapse to the same outcome.
    pub async fn fetch(&self, id: &str) -> Option<ProteinRecord> {
        let url = format!("{}/uniprotkb/{}.txt", self.base_url, id);
        let attempts = self.retries.max(1);

        for attempt in 1..=attempts {
            let response = match self.client.get(&url).send().await {
                Ok(response) => response,
                Err(e) => {
                    warn!(id = %id, attempt, attempts, error = %e, "Retrying record fetch");
                    continue;
                },
            };

            let status = response.status();
            if status.is_client_error() {
                // Definitive: the remote service has no record for this id
                warn!(id = %id, %status, "No record found");
                return None;
            }
            if !status.is_success() {
                warn!(id = %id, attempt, attempts, %status, "Retrying record fetch");
                continue;
            }

            let text = match response.text().await {
                Ok(text) => text,
                Err(e) => {
                    warn!(id = %id, attempt, attempts, error = %e, "Retrying record fetch");
                    continue;
                },
            };

            match ProteinRecord::parse(&text) {
                Ok(record) => {
                    debug!(id = %id, "Fetched record");
                    return Some(record);
                },
                Err(e) => {
                    warn!(id = %id, error = %e, "Record did not parse");
                    return None;
                },
            }
        }

        warn!(id = %id, attempts, "Retries exhausted for record fetch");
        None
    }

    /// Fetch a batch of records on a bounded worker pool.
    ///
    /// Returns exactly one entry per input id; per-id failures are `None`
    /// values, never missing keys. A result-count mismatch is a fatal
    /// consistency error.
    pub async fn fetch_all(
        &self,
        ids: &[String],
        threads: Option<usize>,
        show_progress: bool,
    ) -> Result<HashMap<String, Option<ProteinRecord>>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let workers = worker_count(threads, ids.len());
        info!(records = ids.len(), workers, "Fetching protein records");

        let bar = if show_progress {
            fetch_progress_bar(ids.len() as u64)
        } else {
            ProgressBar::hidden()
        };

        let results: HashMap<String, Option<ProteinRecord>> = futures::stream::iter(ids)
            .map(|id| {
                let bar = &bar;
                async move {
                    let record = self.fetch(id).await;
                    bar.inc(1);
                    (id.clone(), record)
                }
            })
            .buffer_unordered(workers)
            .collect()
            .await;

        bar.finish_and_clear();

        if results.len() != ids.len() {
            return Err(CoreError::Consistency {
                expected: ids.len(),
                actual: results.len(),
            });
        }

        Ok(results)
    }
}

/// Pool size: the configured thread count capped by the task count,
/// defaulting to the number of logical cores
pub(crate) fn worker_count(threads: Option<usize>, tasks: usize) -> usize {
    let configured = threads.unwrap_or_else(|| {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    });
    configured.min(tasks).max(1)
}

fn fetch_progress_bar(total: u64) -> ProgressBar {
    let bar = ProgressBar::new(total);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{msg}\n{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({eta})")
            .expect("Invalid progress bar template")
            .progress_chars("#>-"),
    );
    bar.set_message("Retrieving protein records");
    bar
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const RECORD: &str = "\
ID   TEST_HUMAN              Reviewed;          20 AA.
AC   P26641;
OS   Homo sapiens (Human).
FT   DISULFID        5..12
SQ   SEQUENCE   20 AA;  2000 MW;  0000000000000000 CRC64;
     MAAAFPEELT QTFMSCNLIT
//
";

    async fn client_for(server: &MockServer) -> UniprotClient {
        UniprotClient::new(server.uri()).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/uniprotkb/P26641.txt"))
            .respond_with(ResponseTemplate::new(200).set_body_string(RECORD))
            .mount(&server)
            .await;

        let record = client_for(&server).await.fetch("P26641").await.unwrap();
        assert_eq!(record.accession, "P26641");
        assert_eq!(record.sequence, "MAAAFPEELTQTFMSCNLIT");
    }

    #[tokio::test]
    async fn test_fetch_retries_transient_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/uniprotkb/P26641.txt"))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/uniprotkb/P26641.txt"))
            .respond_with(ResponseTemplate::new(200).set_body_string(RECORD))
            .mount(&server)
            .await;

        let record = client_for(&server).await.fetch("P26641").await;
        assert!(record.is_some());
    }

    #[tokio::test]
    async fn test_fetch_not_found_is_definitive() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/uniprotkb/BOGUS.txt"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1) // no retries on a definitive not-found
            .mount(&server)
            .await;

        assert!(client_for(&server).await.fetch("BOGUS").await.is_none());
    }

    #[tokio::test]
    async fn test_fetch_exhausted_retries_yield_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/uniprotkb/P26641.txt"))
            .respond_with(ResponseTemplate::new(503))
            .expect(3)
            .mount(&server)
            .await;

        let client = client_for(&server).await.with_retries(3);
        assert!(client.fetch("P26641").await.is_none());
    }

    #[tokio::test]
    async fn test_fetch_unparseable_record_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/uniprotkb/P26641.txt"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .mount(&server)
            .await;

        assert!(client_for(&server).await.fetch("P26641").await.is_none());
    }

    #[tokio::test]
    async fn test_fetch_all_one_result_per_id() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/uniprotkb/P26641.txt"))
            .respond_with(ResponseTemplate::new(200).set_body_string(RECORD))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/uniprotkb/BOGUS.txt"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let ids = vec!["P26641".to_string(), "BOGUS".to_string()];
        let records = client_for(&server)
            .await
            .fetch_all(&ids, Some(2), false)
            .await
            .unwrap();

        assert_eq!(records.len(), ids.len());
        assert!(records["P26641"].is_some());
        assert!(records["BOGUS"].is_none());
    }

    #[test]
    fn test_worker_count_bounds() {
        assert_eq!(worker_count(Some(8), 3), 3);
        assert_eq!(worker_count(Some(2), 10), 2);
        assert_eq!(worker_count(Some(0), 10), 1);
        assert!(worker_count(None, 10) >= 1);
    }
}
