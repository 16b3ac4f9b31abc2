//! HTTP pagination: the live counterpart of the load-more control.

use std::time::Duration;

use async_trait::async_trait;
use scraper::{Html, Selector};
use sift_logging::sift_info;
use url::Url;

use crate::driver::MoreSource;
use crate::error::{map_reqwest_error, SiftError};

const NEXT_PAGE_SELECTOR: &str = ".js-button-more.button-more:not(.hdn)";

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36"
                .to_string(),
        }
    }
}

fn build_client(settings: &FetchSettings) -> Result<reqwest::Client, SiftError> {
    reqwest::Client::builder()
        .user_agent(&settings.user_agent)
        .connect_timeout(settings.connect_timeout)
        .timeout(settings.request_timeout)
        .build()
        .map_err(|err| SiftError::Network(err.to_string()))
}

/// Fetch the initial listing document.
pub async fn fetch_listing(settings: &FetchSettings, url: &str) -> Result<String, SiftError> {
    let parsed = Url::parse(url).map_err(|err| SiftError::InvalidUrl(err.to_string()))?;
    let client = build_client(settings)?;

    let response = client
        .get(parsed)
        .send()
        .await
        .map_err(map_reqwest_error)?;
    let status = response.status();
    if !status.is_success() {
        return Err(SiftError::HttpStatus(status.as_u16()));
    }
    response.text().await.map_err(map_reqwest_error)
}

/// [`MoreSource`] that follows the load-more control's `href` across pages.
pub struct HttpMoreSource {
    client: reqwest::Client,
    next_url: Option<Url>,
}

impl HttpMoreSource {
    /// Wire up pagination for a listing that was already fetched: the first
    /// chunk will come from the load-more link in `listing_html`.
    pub fn for_listing(
        settings: &FetchSettings,
        listing_html: &str,
        listing_url: &str,
    ) -> Result<Self, SiftError> {
        let base = Url::parse(listing_url).map_err(|err| SiftError::InvalidUrl(err.to_string()))?;
        Ok(Self {
            client: build_client(settings)?,
            next_url: extract_next_page_url(listing_html, &base),
        })
    }
}

#[async_trait]
impl MoreSource for HttpMoreSource {
    async fn next_chunk(&mut self) -> Result<Option<String>, SiftError> {
        let Some(url) = self.next_url.take() else {
            return Ok(None);
        };

        sift_info!("fetching next listing page: {}", url);
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(SiftError::HttpStatus(status.as_u16()));
        }

        let body = response.text().await.map_err(map_reqwest_error)?;
        self.next_url = extract_next_page_url(&body, &url).filter(|next| next != &url);
        Ok(Some(body))
    }
}

/// The absolute URL behind the next load-more control, if the chunk renders
/// one with an `href`.
fn extract_next_page_url(html: &str, base: &Url) -> Option<Url> {
    let selector = Selector::parse(NEXT_PAGE_SELECTOR).expect("static selector");
    let doc = Html::parse_document(html);
    let href = doc.select(&selector).next()?.value().attr("href")?;
    base.join(href).ok()
}
