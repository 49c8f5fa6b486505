//! # Bank Directory
//!
//! The list of `{name, code}` pairs offered when picking a recipient bank.
//!
//! The directory is fetched from a remote endpoint. Any failure (no
//! connection, timeout, non-2xx status, a body that is not the expected JSON
//! array) is logged and replaced by a fixed list of nine Nigerian banks.
//! The ledger never reads the directory; it only feeds the transfer form.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::config::{BANKS_FETCH_TIMEOUT, DEFAULT_BANKS_URL};

/// A recipient bank.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bank {
    pub name: String,
    pub code: String,
}

impl Bank {
    pub fn new(name: &str, code: &str) -> Self {
        Self {
            name: name.to_string(),
            code: code.to_string(),
        }
    }
}

/// The list used whenever the remote directory is unavailable.
pub fn fallback_banks() -> Vec<Bank> {
    [
        ("Access Bank", "044"),
        ("Guaranty Trust Bank", "058"),
        ("Zenith Bank Plc", "057"),
        ("First Bank of Nigeria", "011"),
        ("United Bank for Africa", "033"),
        ("Kuda Microfinance Bank", "090267"),
        ("Opay", "999992"),
        ("PalmPay", "999991"),
        ("Moniepoint", "50515"),
    ]
    .into_iter()
    .map(|(name, code)| Bank::new(name, code))
    .collect()
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why the remote directory could not be used.
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("bank directory request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("bank directory returned HTTP {0}")]
    Status(u16),
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

/// Somewhere a bank list can be fetched from.
#[async_trait]
pub trait BankSource: Send + Sync {
    async fn fetch(&self) -> Result<Vec<Bank>, DirectoryError>;
}

/// Connection settings for [`HttpBankSource`].
#[derive(Debug, Clone)]
pub struct DirectoryConfig {
    pub url: String,
    pub timeout: Duration,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_BANKS_URL.to_string(),
            timeout: BANKS_FETCH_TIMEOUT,
        }
    }
}

/// Fetches the directory with `GET <url>`.
#[derive(Debug, Clone)]
pub struct HttpBankSource {
    client: reqwest::Client,
    url: String,
}

impl HttpBankSource {
    pub fn new(config: DirectoryConfig) -> Result<Self, DirectoryError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            url: config.url,
        })
    }
}

#[async_trait]
impl BankSource for HttpBankSource {
    async fn fetch(&self) -> Result<Vec<Bank>, DirectoryError> {
        tracing::debug!(url = %self.url, "fetching bank directory");
        let response = self.client.get(&self.url).send().await?;
        if !response.status().is_success() {
            return Err(DirectoryError::Status(response.status().as_u16()));
        }
        Ok(response.json::<Vec<Bank>>().await?)
    }
}

/// A fixed in-memory list. Serves the fallback by default.
#[derive(Debug, Clone)]
pub struct StaticBankSource(pub Vec<Bank>);

impl Default for StaticBankSource {
    fn default() -> Self {
        Self(fallback_banks())
    }
}

#[async_trait]
impl BankSource for StaticBankSource {
    async fn fetch(&self) -> Result<Vec<Bank>, DirectoryError> {
        Ok(self.0.clone())
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// The directory as loaded, and whether it came from the fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BankList {
    pub banks: Vec<Bank>,
    pub from_fallback: bool,
}

/// Fetches the directory from `source`, substituting [`fallback_banks`] on
/// any error. Never fails.
pub async fn load_banks(source: &dyn BankSource) -> BankList {
    match source.fetch().await {
        Ok(banks) => {
            tracing::debug!(count = banks.len(), "bank directory loaded");
            BankList {
                banks,
                from_fallback: false,
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "bank directory unavailable, using fallback list");
            BankList {
                banks: fallback_banks(),
                from_fallback: true,
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serves one HTTP response on a local port and returns its URL.
    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            let response = format!(
                "{}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });
        format!("http://{}/api/banks", addr)
    }

    fn http_source(url: String) -> HttpBankSource {
        HttpBankSource::new(DirectoryConfig {
            url,
            timeout: Duration::from_secs(2),
        })
        .unwrap()
    }

    struct Broken;

    #[async_trait]
    impl BankSource for Broken {
        async fn fetch(&self) -> Result<Vec<Bank>, DirectoryError> {
            Err(DirectoryError::Status(503))
        }
    }

    #[test]
    fn fallback_has_nine_banks() {
        let banks = fallback_banks();
        assert_eq!(banks.len(), 9);
        assert_eq!(banks[0], Bank::new("Access Bank", "044"));
        assert_eq!(banks[8], Bank::new("Moniepoint", "50515"));
    }

    #[tokio::test]
    async fn failing_source_falls_back() {
        let list = load_banks(&Broken).await;
        assert!(list.from_fallback);
        assert_eq!(list.banks, fallback_banks());
    }

    #[tokio::test]
    async fn static_source_is_used_verbatim() {
        let source = StaticBankSource(vec![Bank::new("Test Bank", "001")]);
        let list = load_banks(&source).await;
        assert!(!list.from_fallback);
        assert_eq!(list.banks, vec![Bank::new("Test Bank", "001")]);
    }

    #[tokio::test]
    async fn http_source_parses_directory() {
        let url = serve_once("HTTP/1.1 200 OK", r#"[{"name":"Wema Bank","code":"035"}]"#).await;
        let list = load_banks(&http_source(url)).await;
        assert!(!list.from_fallback);
        assert_eq!(list.banks, vec![Bank::new("Wema Bank", "035")]);
    }

    #[tokio::test]
    async fn malformed_json_falls_back() {
        let url = serve_once("HTTP/1.1 200 OK", "<html>oops</html>").await;
        let list = load_banks(&http_source(url)).await;
        assert!(list.from_fallback);
    }

    #[tokio::test]
    async fn error_status_falls_back() {
        let url = serve_once("HTTP/1.1 500 Internal Server Error", "[]").await;
        let source = http_source(url);
        assert!(matches!(source.fetch().await, Err(DirectoryError::Status(500))));
    }

    #[tokio::test]
    async fn unreachable_host_falls_back() {
        // Bind then drop to get a port nothing is listening on.
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap().port()
        };
        let source = http_source(format!("http://127.0.0.1:{}/api/banks", port));
        let list = load_banks(&source).await;
        assert!(list.from_fallback);
        assert_eq!(list.banks.len(), 9);
    }
}
