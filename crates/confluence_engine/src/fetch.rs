use std::io::Read;
use std::thread;
use std::time::Duration;

use engine_logging::engine_warn;
use reqwest::header::CONTENT_TYPE;
use url::Url;

use crate::{FailureKind, FetchError, FetchedImage};

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub redirect_limit: usize,
    pub max_bytes: u64,
    /// Extra attempts after the first one, for transient failures only.
    pub max_retries: u32,
    /// Linear backoff unit: attempt `n` waits `n * retry_backoff`.
    pub retry_backoff: Duration,
    pub user_agent: String,
    /// Accepted `Content-Type` prefixes. A response without the header is accepted.
    pub allowed_content_types: Vec<String>,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            redirect_limit: 5,
            max_bytes: 20 * 1024 * 1024,
            max_retries: 3,
            retry_backoff: Duration::from_millis(500),
            user_agent: concat!("confluence-export/", env!("CARGO_PKG_VERSION")).to_string(),
            allowed_content_types: vec![
                "image/".to_string(),
                "application/octet-stream".to_string(),
            ],
        }
    }
}

/// Blocking image retrieval. The cleaner runs one document at a time, so
/// fetches happen inline on the calling thread.
pub trait ImageFetcher: Send + Sync {
    fn fetch(&self, url: &Url) -> Result<FetchedImage, FetchError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestImageFetcher {
    client: reqwest::blocking::Client,
    settings: FetchSettings,
}

impl ReqwestImageFetcher {
    /// Must not be called from inside an async runtime; wrap in
    /// `spawn_blocking` there.
    pub fn new(settings: FetchSettings) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .redirect(reqwest::redirect::Policy::limited(settings.redirect_limit))
            .user_agent(settings.user_agent.clone())
            .build()
            .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { client, settings })
    }

    fn fetch_once(&self, url: &Url) -> Result<FetchedImage, FetchError> {
        let response = self
            .client
            .get(url.as_str())
            .send()
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let max_bytes = self.settings.max_bytes;
        if let Some(content_len) = response.content_length() {
            if content_len > max_bytes {
                return Err(too_large(max_bytes, Some(content_len)));
            }
        }

        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());

        if let Some(ct) = content_type.as_deref() {
            if !self.is_content_type_allowed(ct) {
                return Err(FetchError::new(
                    FailureKind::UnsupportedContentType {
                        content_type: ct.to_string(),
                    },
                    "unsupported content type",
                ));
            }
        }

        let mut bytes = Vec::new();
        response
            .take(max_bytes + 1)
            .read_to_end(&mut bytes)
            .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))?;
        if bytes.len() as u64 > max_bytes {
            return Err(too_large(max_bytes, None));
        }

        Ok(FetchedImage {
            bytes,
            final_url,
            content_type,
        })
    }

    fn is_content_type_allowed(&self, content_type: &str) -> bool {
        let ct = content_type
            .split(';')
            .next()
            .unwrap_or(content_type)
            .trim()
            .to_ascii_lowercase();
        self.settings
            .allowed_content_types
            .iter()
            .any(|allowed| ct.starts_with(&allowed.to_ascii_lowercase()))
    }
}

impl ImageFetcher for ReqwestImageFetcher {
    fn fetch(&self, url: &Url) -> Result<FetchedImage, FetchError> {
        if !matches!(url.scheme(), "http" | "https") {
            return Err(FetchError::new(
                FailureKind::InvalidUrl,
                format!("unsupported scheme {}", url.scheme()),
            ));
        }
        let mut attempt: u32 = 0;
        loop {
            match self.fetch_once(url) {
                Ok(image) => return Ok(image),
                Err(err) if err.kind.is_retryable() && attempt < self.settings.max_retries => {
                    attempt += 1;
                    engine_warn!(
                        "Fetching {url} failed ({err}); retry {attempt}/{}",
                        self.settings.max_retries
                    );
                    thread::sleep(self.settings.retry_backoff * attempt);
                }
                Err(err) => return Err(err),
            }
        }
    }
}

fn too_large(max_bytes: u64, actual: Option<u64>) -> FetchError {
    FetchError::new(
        FailureKind::TooLarge { max_bytes, actual },
        "response too large",
    )
}

fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_redirect() {
        return FetchError::new(FailureKind::RedirectLimitExceeded, err.to_string());
    }
    FetchError::new(FailureKind::Network, err.to_string())
}
