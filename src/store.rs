//! The remote log store: an append-only list of reading records kept in a
//! spreadsheet behind a web endpoint.

use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::TrackerConfig;
use crate::error::{Result, TrackerError};

/// One line of the remote log, as POSTed and as returned by GET.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    #[serde(with = "crate::util::day_string")]
    pub date: NaiveDate,
    pub book: String,
    #[serde(deserialize_with = "pages_cell")]
    pub pages: u32,
    #[serde(deserialize_with = "crate::util::lenient_number::deserialize")]
    pub xp: f64,
    #[serde(default, deserialize_with = "count_cell")]
    pub streak: u32,
}

fn pages_cell<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = crate::util::lenient_number::deserialize(deserializer)?;
    if raw >= 0.0 {
        Ok(raw.round().min(u32::MAX as f64) as u32)
    } else {
        Err(serde::de::Error::custom(format!("invalid page count {raw}")))
    }
}

fn count_cell<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = crate::util::lenient_number::deserialize(deserializer)?;
    Ok(if raw > 0.0 {
        raw.round().min(u32::MAX as f64) as u32
    } else {
        0
    })
}

/// Somewhere reading records can be appended to and read back from.
pub trait LogStore: Send + Sync + 'static {
    fn append(&self, record: &LogRecord) -> impl Future<Output = Result<()>> + Send;

    fn list_all(&self) -> impl Future<Output = Result<Vec<LogRecord>>> + Send;
}

/// Decodes a GET body, skipping rows that are not reading records (blank
/// spreadsheet rows, header rows, hand edits).
pub fn decode_records(body: &str) -> Result<Vec<LogRecord>> {
    let rows: Vec<serde_json::Value> = serde_json::from_str(body)?;
    let total = rows.len();
    let records: Vec<LogRecord> = rows
        .into_iter()
        .filter_map(|row| match serde_json::from_value::<LogRecord>(row.clone()) {
            Ok(record) => Some(record),
            Err(e) => {
                log::warn!("Skipping unreadable log row {row}: {e}");
                None
            }
        })
        .collect();
    log::debug!("Decoded {} of {} log rows", records.len(), total);
    Ok(records)
}

/// Log store reached over HTTP. GET lists every record, POST appends one.
pub struct HttpLogStore {
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

impl HttpLogStore {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("ReadQuest/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            timeout,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn classify(&self, e: reqwest::Error) -> TrackerError {
        if e.is_timeout() {
            TrackerError::Timeout(self.timeout)
        } else {
            TrackerError::Network(e)
        }
    }

    async fn read_body(&self, response: reqwest::Response) -> Result<String> {
        let status = response.status();
        let body = response.text().await.map_err(|e| self.classify(e))?;
        if !status.is_success() {
            return Err(TrackerError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }
}

impl LogStore for HttpLogStore {
    async fn append(&self, record: &LogRecord) -> Result<()> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(record)
            .send()
            .await
            .map_err(|e| self.classify(e))?;
        // The collector answers with free text; only the status matters.
        let body = self.read_body(response).await?;
        log::debug!("Log store accepted {} / {}: {}", record.book, record.date, body.trim());
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<LogRecord>> {
        let response = self
            .client
            .get(&self.endpoint)
            .send()
            .await
            .map_err(|e| self.classify(e))?;
        let body = self.read_body(response).await?;
        decode_records(&body)
    }
}

/// Process-local log store, used when no endpoint is configured.
#[derive(Default)]
pub struct MemoryLogStore {
    records: Mutex<Vec<LogRecord>>,
}

impl MemoryLogStore {
    pub fn with_records(records: Vec<LogRecord>) -> Self {
        Self {
            records: Mutex::new(records),
        }
    }

    pub fn snapshot(&self) -> Vec<LogRecord> {
        self.records.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

impl LogStore for MemoryLogStore {
    async fn append(&self, record: &LogRecord) -> Result<()> {
        self.records
            .lock()
            .map_err(|_| TrackerError::Custom("log store lock poisoned".into()))?
            .push(record.clone());
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<LogRecord>> {
        Ok(self.snapshot())
    }
}

/// The store picked from configuration.
pub enum LogBackend {
    Remote(HttpLogStore),
    Local(MemoryLogStore),
}

impl LogBackend {
    pub fn from_config(config: &TrackerConfig) -> Result<Self> {
        match config.endpoint.as_deref().map(str::trim) {
            Some(endpoint) if !endpoint.is_empty() => {
                let store = HttpLogStore::new(endpoint, config.request_timeout())?;
                log::info!("Using log store at {}", store.endpoint());
                Ok(LogBackend::Remote(store))
            }
            _ => {
                log::info!("No log store endpoint configured; keeping records in memory");
                Ok(LogBackend::Local(MemoryLogStore::default()))
            }
        }
    }
}

impl LogStore for LogBackend {
    async fn append(&self, record: &LogRecord) -> Result<()> {
        match self {
            LogBackend::Remote(store) => store.append(record).await,
            LogBackend::Local(store) => store.append(record).await,
        }
    }

    async fn list_all(&self) -> Result<Vec<LogRecord>> {
        match self {
            LogBackend::Remote(store) => store.list_all().await,
            LogBackend::Local(store) => store.list_all().await,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serves one canned HTTP response per connection and returns the raw
    /// requests it saw.
    pub(crate) async fn serve_canned(
        responses: Vec<&'static str>,
    ) -> (String, tokio::task::JoinHandle<Vec<String>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/exec", listener.local_addr().unwrap());
        let handle = tokio::spawn(async move {
            let mut seen = Vec::new();
            for response in responses {
                let (mut stream, _) = listener.accept().await.unwrap();
                seen.push(read_request(&mut stream).await);
                stream.write_all(response.as_bytes()).await.unwrap();
                let _ = stream.shutdown().await;
            }
            seen
        });
        (url, handle)
    }

    async fn read_request(stream: &mut tokio::net::TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = stream.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&buf);
            if let Some(head_end) = text.find("\r\n\r\n") {
                let content_length = text[..head_end]
                    .lines()
                    .find_map(|l| {
                        let (name, value) = l.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if buf.len() >= head_end + 4 + content_length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).to_string()
    }

    pub(crate) fn ok_response(body: &'static str) -> String {
        format!(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            body.len(),
            body
        )
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
    }

    #[test]
    fn test_record_wire_shape() {
        let record = LogRecord {
            date: day(19),
            book: "Dune".into(),
            pages: 50,
            xp: 105.0,
            streak: 1,
        };
        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            serde_json::json!({
                "date": "Mon Oct 19 2026",
                "book": "Dune",
                "pages": 50,
                "xp": 105.0,
                "streak": 1
            })
        );
    }

    #[test]
    fn test_decode_spreadsheet_cells() {
        let body = r#"[
            {"date": "Sun Oct 18 2026", "book": "Dune", "pages": "30", "xp": "65.0", "streak": "1"},
            {"date": "2026-10-19T07:00:00.000Z", "book": "Dune", "pages": 20, "xp": 45, "streak": 2},
            {"date": "", "book": "", "pages": "", "xp": "", "streak": ""},
            {"date": "Mon Oct 19 2026", "book": "Emma", "pages": -4, "xp": 1, "streak": 1},
            {"date": "Mon Oct 19 2026", "book": "Emma", "pages": 3, "xp": "NaN", "streak": 1},
            {"date": "Mon Oct 19 2026", "book": "Emma", "pages": 3, "xp": "Infinity", "streak": 1},
            {"date": "Mon Oct 19 2026", "book": "Emma", "pages": 3, "xp": 7, "streak": "1e12"}
        ]"#;
        let records = decode_records(body).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[2].book, "Emma");
        assert_eq!(records[2].streak, u32::MAX);
        assert_eq!(records[0].pages, 30);
        assert_eq!(records[0].xp, 65.0);
        assert_eq!(records[1].date, day(19));
        assert_eq!(records[1].streak, 2);
    }

    #[test]
    fn test_decode_rejects_non_array() {
        assert!(matches!(
            decode_records(r#"{"error": "quota"}"#),
            Err(TrackerError::Json(_))
        ));
    }

    #[tokio::test]
    async fn test_http_list_all() {
        let body = r#"[{"date": "Mon Oct 19 2026", "book": "Dune", "pages": 50, "xp": 105, "streak": 1}]"#;
        let response: &'static str = Box::leak(ok_response(body).into_boxed_str());
        let (url, server) = serve_canned(vec![response]).await;

        let store = HttpLogStore::new(url, Duration::from_secs(5)).unwrap();
        let records = store.list_all().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].book, "Dune");

        let requests = server.await.unwrap();
        assert!(requests[0].starts_with("GET /exec"));
    }

    #[tokio::test]
    async fn test_http_append_posts_json() {
        let response: &'static str = Box::leak(ok_response("Success").into_boxed_str());
        let (url, server) = serve_canned(vec![response]).await;

        let store = HttpLogStore::new(url, Duration::from_secs(5)).unwrap();
        let record = LogRecord {
            date: day(19),
            book: "Dune".into(),
            pages: 12,
            xp: 29.0,
            streak: 3,
        };
        store.append(&record).await.unwrap();

        let requests = server.await.unwrap();
        assert!(requests[0].starts_with("POST /exec"));
        assert!(requests[0].contains("\"book\":\"Dune\""));
        assert!(requests[0].contains("\"date\":\"Mon Oct 19 2026\""));
    }

    #[tokio::test]
    async fn test_http_error_status() {
        let response = "HTTP/1.1 500 Internal Server Error\r\nContent-Length: 4\r\nConnection: close\r\n\r\noops";
        let (url, server) = serve_canned(vec![response]).await;

        let store = HttpLogStore::new(url, Duration::from_secs(5)).unwrap();
        match store.list_all().await {
            Err(TrackerError::Status { status, body }) => {
                assert_eq!(status, 500);
                assert_eq!(body, "oops");
            }
            other => panic!("expected status error, got {other:?}"),
        }
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = MemoryLogStore::default();
        let record = LogRecord {
            date: day(19),
            book: "Emma".into(),
            pages: 5,
            xp: 15.0,
            streak: 1,
        };
        store.append(&record).await.unwrap();
        assert_eq!(store.list_all().await.unwrap(), vec![record]);
    }

    #[test]
    fn test_backend_defaults_to_memory() {
        let config = TrackerConfig::default();
        assert!(matches!(
            LogBackend::from_config(&config).unwrap(),
            LogBackend::Local(_)
        ));
    }
}
