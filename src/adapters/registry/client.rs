//! Registry HTTP transport and full-fetch orchestration

use super::parser::parse_page;
use crate::config::{RegistryConfig, SecretString};
use crate::domain::errors::{PurgoError, RegistryError};
use crate::domain::hospital::HospitalRecord;
use crate::domain::ids::HospitalId;
use crate::domain::Result;
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use secrecy::ExposeSecret;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Source of raw registry pages
///
/// Implemented over HTTP by [`HttpRegistrySource`]; tests substitute canned
/// XML.
#[async_trait]
pub trait RegistrySource: Send + Sync {
    /// Fetches the body of page `page_no` (1-based)
    async fn fetch_page(&self, page_no: u32) -> std::result::Result<String, RegistryError>;
}

/// Registry reached over HTTP GET
pub struct HttpRegistrySource {
    client: Client,
    base_url: String,
    api_key: SecretString,
    page_size: u32,
    timeout_seconds: u64,
}

impl HttpRegistrySource {
    /// Builds the HTTP client with the configured per-request timeout
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the service key is missing or the
    /// HTTP client cannot be built.
    pub fn new(config: &RegistryConfig) -> Result<Self> {
        let api_key = config.api_key.clone().ok_or_else(|| {
            PurgoError::Configuration("registry.api_key is required".to_string())
        })?;
        if api_key.expose_secret().has_unencoded_query_chars() {
            tracing::warn!(
                key = %api_key.expose_secret().masked(),
                "registry.api_key looks decoded; the registry expects the encoded form"
            );
        }

        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(config.timeout_seconds.min(30)))
            .build()
            .map_err(|e| {
                PurgoError::Configuration(format!("Failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            api_key,
            page_size: config.page_size,
            timeout_seconds: config.timeout_seconds,
        })
    }
}

#[async_trait]
impl RegistrySource for HttpRegistrySource {
    async fn fetch_page(&self, page_no: u32) -> std::result::Result<String, RegistryError> {
        tracing::debug!(page = page_no, "Requesting registry page");

        let response = self
            .client
            .get(self.page_url(page_no)?)
            .send()
            .await
            .map_err(|e| self.transport_error(page_no, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RegistryError::ServerStatus {
                page: page_no,
                status: status.as_u16(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| self.transport_error(page_no, e))
    }
}

impl HttpRegistrySource {
    /// Request URL for one page
    ///
    /// The service key is issued already percent-encoded and is appended
    /// as given; only `numOfRows` and `pageNo` go through the encoder.
    fn page_url(&self, page_no: u32) -> std::result::Result<Url, RegistryError> {
        let mut url = Url::parse(&self.base_url).map_err(|e| RegistryError::Network {
            page: page_no,
            message: format!("invalid registry base URL: {e}"),
        })?;
        url.query_pairs_mut()
            .append_pair("numOfRows", &self.page_size.to_string())
            .append_pair("pageNo", &page_no.to_string());

        let key: &str = self.api_key.expose_secret().as_ref();
        let query = format!("{}&ServiceKey={}", url.query().unwrap_or_default(), key);
        url.set_query(Some(&query));
        Ok(url)
    }

    fn transport_error(&self, page: u32, err: reqwest::Error) -> RegistryError {
        if err.is_timeout() {
            RegistryError::Timeout {
                page,
                seconds: self.timeout_seconds,
            }
        } else {
            // without_url keeps the service key out of the message
            RegistryError::Network {
                page,
                message: err.without_url().to_string(),
            }
        }
    }
}

/// Fetched records keyed by hospital id, in first-seen order
///
/// Re-inserting an id replaces its record in place.
#[derive(Debug, Default, Clone)]
pub struct RecordSet {
    order: Vec<HospitalId>,
    records: HashMap<HospitalId, HospitalRecord>,
}

impl RecordSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces; returns true if the id was already present
    pub fn insert(&mut self, record: HospitalRecord) -> bool {
        let id = record.hospital_id.clone();
        match self.records.insert(id.clone(), record) {
            Some(_) => true,
            None => {
                self.order.push(id);
                false
            }
        }
    }

    pub fn get(&self, id: &HospitalId) -> Option<&HospitalRecord> {
        self.records.get(id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Records in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &HospitalRecord> {
        self.order.iter().filter_map(|id| self.records.get(id))
    }
}

impl FromIterator<HospitalRecord> for RecordSet {
    fn from_iter<I: IntoIterator<Item = HospitalRecord>>(iter: I) -> Self {
        let mut set = RecordSet::new();
        for record in iter {
            set.insert(record);
        }
        set
    }
}

/// Pulls every configured page from a [`RegistrySource`] and parses it
pub struct RegistryClient {
    source: Arc<dyn RegistrySource>,
    max_pages: u32,
    allowed_class_codes: Vec<String>,
}

impl RegistryClient {
    pub fn new(
        source: Arc<dyn RegistrySource>,
        max_pages: u32,
        allowed_class_codes: Vec<String>,
    ) -> Self {
        Self {
            source,
            max_pages,
            allowed_class_codes,
        }
    }

    /// HTTP-backed client built from configuration
    pub fn from_config(config: &RegistryConfig) -> Result<Self> {
        let source = HttpRegistrySource::new(config)?;
        Ok(Self::new(
            Arc::new(source),
            config.max_pages,
            config.allowed_class_codes.clone(),
        ))
    }

    /// Fetches pages `1..=max_pages` in order and merges their records
    ///
    /// Later pages win for duplicate ids. Any page failure aborts the
    /// whole fetch; nothing partial is returned.
    ///
    /// # Errors
    ///
    /// Returns the first [`RegistryError`] encountered.
    pub async fn fetch_all_records(&self) -> std::result::Result<RecordSet, RegistryError> {
        let mut set = RecordSet::new();

        for page in 1..=self.max_pages {
            let body = self.source.fetch_page(page).await.map_err(|e| {
                tracing::error!(page, error = %e, "Registry request failed");
                e
            })?;

            let records = parse_page(&body, page, &self.allowed_class_codes).map_err(|e| {
                tracing::error!(page, error = %e, "Registry response could not be parsed");
                e
            })?;

            let kept = records.len();
            let mut replaced = 0usize;
            for record in records {
                if set.insert(record) {
                    replaced += 1;
                }
            }

            tracing::debug!(page, kept, replaced, total = set.len(), "Registry page parsed");
        }

        tracing::info!(records = set.len(), pages = self.max_pages, "Registry fetch complete");
        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct CannedSource {
        pages: Vec<std::result::Result<String, RegistryError>>,
        requested: Mutex<Vec<u32>>,
    }

    #[async_trait]
    impl RegistrySource for CannedSource {
        async fn fetch_page(&self, page_no: u32) -> std::result::Result<String, RegistryError> {
            self.requested.lock().unwrap().push(page_no);
            match &self.pages[(page_no - 1) as usize] {
                Ok(body) => Ok(body.clone()),
                Err(RegistryError::Timeout { seconds, .. }) => Err(RegistryError::Timeout {
                    page: page_no,
                    seconds: *seconds,
                }),
                Err(_) => Err(RegistryError::Network {
                    page: page_no,
                    message: "refused".to_string(),
                }),
            }
        }
    }

    fn page(items: &[(&str, &str, &str)]) -> String {
        let body: String = items
            .iter()
            .map(|(id, cl, name)| {
                format!("<item><ykiho>{id}</ykiho><clCd>{cl}</clCd><yadmNm>{name}</yadmNm></item>")
            })
            .collect();
        format!("<response><header/><body><items>{body}</items></body></response>")
    }

    fn client(pages: Vec<std::result::Result<String, RegistryError>>) -> (RegistryClient, Arc<CannedSource>) {
        let max_pages = pages.len() as u32;
        let source = Arc::new(CannedSource {
            pages,
            requested: Mutex::new(Vec::new()),
        });
        let allowed = ["01", "11", "41", "51"].iter().map(|c| c.to_string()).collect();
        (RegistryClient::new(source.clone(), max_pages, allowed), source)
    }

    #[test]
    fn test_page_url_sends_issued_key_verbatim() {
        let config = RegistryConfig {
            base_url: "http://registry.test/getHospBasisList".to_string(),
            api_key: Some(crate::config::secret_string("abc%2Bdef%3D%3D".to_string())),
            ..RegistryConfig::default()
        };
        let source = HttpRegistrySource::new(&config).unwrap();

        let url = source.page_url(3).unwrap();
        assert_eq!(
            url.query(),
            Some("numOfRows=10000&pageNo=3&ServiceKey=abc%2Bdef%3D%3D")
        );
    }

    #[tokio::test]
    async fn test_last_page_wins_for_duplicates() {
        let (client, _) = client(vec![
            Ok(page(&[("H1", "11", "First"), ("H2", "01", "Other")])),
            Ok(page(&[("H1", "11", "Second")])),
        ]);

        let set = client.fetch_all_records().await.unwrap();
        assert_eq!(set.len(), 2);
        let h1 = set.get(&HospitalId::new("H1").unwrap()).unwrap();
        assert_eq!(h1.hospital_name.as_deref(), Some("Second"));

        let order: Vec<_> = set.iter().map(|r| r.hospital_id.as_str().to_string()).collect();
        assert_eq!(order, vec!["H1", "H2"]);
    }

    #[tokio::test]
    async fn test_pages_fetched_in_order() {
        let (client, source) = client(vec![Ok(page(&[])), Ok(page(&[])), Ok(page(&[]))]);
        client.fetch_all_records().await.unwrap();
        assert_eq!(*source.requested.lock().unwrap(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_network_failure_aborts() {
        let (client, source) = client(vec![
            Ok(page(&[("H1", "11", "A")])),
            Err(RegistryError::Network {
                page: 0,
                message: String::new(),
            }),
            Ok(page(&[("H2", "11", "B")])),
        ]);

        let err = client.fetch_all_records().await.unwrap_err();
        assert!(err.is_network());
        assert_eq!(err.page(), 2);
        assert_eq!(*source.requested.lock().unwrap(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_timeout_is_network_class() {
        let (client, _) = client(vec![Err(RegistryError::Timeout { page: 0, seconds: 30 })]);
        let err = client.fetch_all_records().await.unwrap_err();
        assert!(matches!(err, RegistryError::Timeout { page: 1, seconds: 30 }));
        assert!(err.is_network());
    }

    #[tokio::test]
    async fn test_parse_failure_aborts() {
        let (client, _) = client(vec![Ok("<not-xml".to_string())]);
        let err = client.fetch_all_records().await.unwrap_err();
        assert!(!err.is_network());
    }

    #[test]
    fn test_record_set_collect() {
        let set: RecordSet = ["B", "A", "B"]
            .iter()
            .map(|id| HospitalRecord::new(HospitalId::new(*id).unwrap()))
            .collect();
        assert_eq!(set.len(), 2);
        assert_eq!(set.iter().next().unwrap().hospital_id.as_str(), "B");
    }
}
