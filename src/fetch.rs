use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use tracing::info;

use crate::error::ScrapeError;
use crate::model::SourceKind;

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const ACCEPT_LANG: &str = "en-US,en;q=0.9";

/// Anything that can hand back the HTML of a results page.
#[allow(async_fn_in_trait)]
pub trait PageSource {
    async fn fetch(&self, kind: SourceKind, url: &str) -> Result<String, ScrapeError>;
}

pub struct HttpSource {
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(user_agent: &str) -> reqwest::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(ACCEPT_LANG));

        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .default_headers(headers)
            .build()?;
        Ok(HttpSource { client })
    }
}

impl PageSource for HttpSource {
    async fn fetch(&self, kind: SourceKind, url: &str) -> Result<String, ScrapeError> {
        let fetch_err = |cause: reqwest::Error| ScrapeError::Fetch {
            source_kind: kind,
            url: url.to_string(),
            cause,
        };

        let response = self.client.get(url).send().await.map_err(fetch_err)?;
        info!(source = %kind, status = %response.status(), url, "fetched page");

        response
            .error_for_status()
            .map_err(fetch_err)?
            .text()
            .await
            .map_err(fetch_err)
    }
}
