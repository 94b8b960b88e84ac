pub mod headers;
pub mod title;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderValue, CONNECTION, USER_AGENT};
use reqwest::redirect;
use thiserror::Error;

pub use headers::HeaderDirective;
pub use title::extract_title;

const MAX_REDIRECTS: usize = 10;

/// Shared, read-only settings for every probe in a run.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub timeout: Duration,
    pub insecure: bool,
    pub follow_redirects: bool,
    pub user_agent: String,
    pub headers: Vec<HeaderDirective>,
}

impl ClientConfig {
    pub fn build_client(&self) -> Result<reqwest::Client, reqwest::Error> {
        let redirect_policy = if self.follow_redirects {
            redirect::Policy::limited(MAX_REDIRECTS)
        } else {
            redirect::Policy::none()
        };

        // no idle pooling: every probe gets its own short-lived connection
        reqwest::Client::builder()
            .redirect(redirect_policy)
            .timeout(self.timeout)
            .pool_max_idle_per_host(0)
            .danger_accept_invalid_hostnames(self.insecure)
            .danger_accept_invalid_certs(self.insecure)
            .build()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProbeResult {
    pub url: String,
    pub status: u16,
    pub size: usize,
    pub title: String,
}

impl fmt::Display for ProbeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.url, self.status, self.size, self.title)
    }
}

/// Why a single candidate produced no result. Callers skip the candidate;
/// none of these ever reach the result output.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("failed to build request for {url}: {message}")]
    InvalidRequest { url: String, message: String },

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to read body from {url}: {source}")]
    Read {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl ProbeError {
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Request { source, .. } | Self::Read { source, .. } => source.is_timeout(),
            Self::InvalidRequest { .. } => false,
        }
    }
}

/// Issues one GET against `url` and reports status, body size and title.
///
/// Directives are applied in order, then the user agent is set so it always
/// wins over a directive naming the same header. The response is consumed
/// (and its connection released) before returning on every path.
pub async fn probe(
    client: &reqwest::Client,
    url: &str,
    directives: &[HeaderDirective],
    user_agent: &str,
) -> Result<ProbeResult, ProbeError> {
    let invalid = |message: String| ProbeError::InvalidRequest {
        url: url.to_string(),
        message,
    };

    let mut req = client
        .get(url)
        .build()
        .map_err(|e| invalid(e.to_string()))?;

    let req_headers = req.headers_mut();
    headers::apply_directives(req_headers, directives).map_err(invalid)?;
    let agent = HeaderValue::from_str(user_agent)
        .map_err(|_| invalid(format!("invalid user agent '{user_agent}'")))?;
    req_headers.insert(USER_AGENT, agent);
    req_headers.insert(CONNECTION, HeaderValue::from_static("close"));

    let resp = client
        .execute(req)
        .await
        .map_err(|e| ProbeError::Request {
            url: url.to_string(),
            source: e,
        })?;
    let status = resp.status().as_u16();
    let body = resp.bytes().await.map_err(|e| ProbeError::Read {
        url: url.to_string(),
        source: e,
    })?;

    Ok(ProbeResult {
        url: url.to_string(),
        status,
        size: body.len(),
        title: extract_title(&body),
    })
}

/// A client plus the configuration it was built from, cheap to clone into
/// every worker.
#[derive(Clone, Debug)]
pub struct Prober {
    client: reqwest::Client,
    config: Arc<ClientConfig>,
}

impl Prober {
    pub fn new(config: ClientConfig) -> Result<Self, reqwest::Error> {
        let client = config.build_client()?;
        Ok(Self {
            client,
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub async fn probe(&self, url: &str) -> Result<ProbeResult, ProbeError> {
        probe(
            &self.client,
            url,
            &self.config.headers,
            &self.config.user_agent,
        )
        .await
    }
}
