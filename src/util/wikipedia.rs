use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::{config::SearchConfig, util::html::strip_html};

#[derive(Debug, thiserror::Error)]
pub enum WikipediaError {
    #[error("invalid wikipedia language {0:?}")]
    InvalidLanguage(String),
    #[error("wikipedia api error: {0}")]
    Api(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// One search hit, before its article body has been fetched.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub title: String,
    pub page_id: u64,
    pub snippet: String,
    pub url: String,
}

/// Thin client for the MediaWiki action API. Requests go to the configured
/// default language edition unless the caller overrides it.
#[derive(Debug)]
pub struct WikipediaClient {
    client: Client,
    default_language: String,
    max_results: usize,
}

impl WikipediaClient {
    pub fn new(config: &SearchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent("PlagcheckFetcher/0.1")
            .timeout(Duration::from_secs(config.request_timeout_secs.max(1)))
            .build()
            .context("failed to build wikipedia http client")?;

        let default_language = config.language.trim().to_string();
        endpoints_for(&default_language).context("invalid configured search language")?;

        Ok(Self {
            client,
            default_language,
            max_results: config.max_results.max(1),
        })
    }

    /// Full-text search; returns at most `max_results` hits.
    pub async fn search(
        &self,
        query: &str,
        language: Option<&str>,
    ) -> Result<Vec<SearchHit>, WikipediaError> {
        let (api_endpoint, page_base) = self.endpoints(language)?;
        let response = self
            .client
            .get(api_endpoint)
            .query(&[
                ("action", "query"),
                ("list", "search"),
                ("srsearch", query),
                ("format", "json"),
                ("utf8", ""),
            ])
            .send()
            .await
            .context("wikipedia search request failed")?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("failed to read wikipedia search response")?;
        if !status.is_success() {
            return Err(WikipediaError::Api(format!(
                "search returned http status {status}"
            )));
        }

        let payload: SearchResponse = serde_json::from_str(&body)
            .context("failed to parse wikipedia search response")?;
        if let Some(err) = payload.error {
            return Err(WikipediaError::Api(format!(
                "{}: {}",
                err.code, err.info
            )));
        }

        let results = payload.query.map(|q| q.search).unwrap_or_default();
        Ok(results
            .into_iter()
            .take(self.max_results)
            .map(|hit| SearchHit {
                url: format!("{}?curid={}", page_base, hit.pageid),
                title: hit.title,
                page_id: hit.pageid,
                snippet: strip_html(&hit.snippet),
            })
            .collect())
    }

    /// Fetch one article through the parse API and strip it to plain text.
    pub async fn page_text(
        &self,
        page_id: u64,
        language: Option<&str>,
    ) -> Result<String, WikipediaError> {
        let (api_endpoint, _) = self.endpoints(language)?;
        let page_id_param = page_id.to_string();
        let response = self
            .client
            .get(api_endpoint)
            .query(&[
                ("action", "parse"),
                ("pageid", page_id_param.as_str()),
                ("prop", "text"),
                ("format", "json"),
            ])
            .send()
            .await
            .context("wikipedia parse request failed")?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("failed to read wikipedia parse response")?;
        if !status.is_success() {
            return Err(WikipediaError::Api(format!(
                "parse returned http status {status} for page {page_id}"
            )));
        }

        let payload: ParseResponse = serde_json::from_str(&body)
            .context("failed to parse wikipedia parse response")?;
        if let Some(err) = payload.error {
            return Err(WikipediaError::Api(format!(
                "{}: {}",
                err.code, err.info
            )));
        }

        let html = payload
            .parse
            .map(|p| p.text.html)
            .unwrap_or_default();
        Ok(strip_html(&html))
    }

    fn endpoints(&self, language: Option<&str>) -> Result<(Url, Url), WikipediaError> {
        let language = language
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .unwrap_or(self.default_language.as_str());
        endpoints_for(language)
    }
}

/// Build `(api endpoint, page base)` for one language edition. The language
/// must be a plain subdomain label; anything else could redirect the request
/// to an arbitrary host.
fn endpoints_for(language: &str) -> Result<(Url, Url), WikipediaError> {
    let valid = !language.is_empty()
        && language
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '-');
    if !valid {
        return Err(WikipediaError::InvalidLanguage(language.to_string()));
    }

    let page_base = Url::parse(&format!("https://{language}.wikipedia.org"))
        .with_context(|| format!("failed to build wikipedia host for {language:?}"))?;
    let api_endpoint = page_base
        .join("/w/api.php")
        .context("failed to build wikipedia api endpoint")?;
    Ok((api_endpoint, page_base))
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    query: Option<SearchQueryPayload>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct SearchQueryPayload {
    search: Vec<RawSearchHit>,
}

#[derive(Debug, Deserialize)]
struct RawSearchHit {
    title: String,
    pageid: u64,
    #[serde(default)]
    snippet: String,
}

#[derive(Debug, Deserialize)]
struct ParseResponse {
    parse: Option<ParsePayload>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ParsePayload {
    text: ParseText,
}

#[derive(Debug, Deserialize)]
struct ParseText {
    #[serde(rename = "*", default)]
    html: String,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: String,
    info: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_cover_language_editions() {
        let (api, base) = endpoints_for("en").unwrap();
        assert_eq!(api.as_str(), "https://en.wikipedia.org/w/api.php");
        assert_eq!(base.as_str(), "https://en.wikipedia.org/");

        let (api, _) = endpoints_for("zh-yue").unwrap();
        assert_eq!(api.as_str(), "https://zh-yue.wikipedia.org/w/api.php");
    }

    #[test]
    fn bogus_languages_are_rejected() {
        for lang in ["", " ", "evil.example.org/", "a b", "vi/../..", "en:8080"] {
            assert!(matches!(
                endpoints_for(lang),
                Err(WikipediaError::InvalidLanguage(_))
            ));
        }
    }

    #[test]
    fn request_language_falls_back_to_the_default() {
        let client = WikipediaClient::new(&SearchConfig::default()).unwrap();

        let (api, _) = client.endpoints(None).unwrap();
        assert_eq!(api.as_str(), "https://en.wikipedia.org/w/api.php");
        let (api, _) = client.endpoints(Some("  ")).unwrap();
        assert_eq!(api.as_str(), "https://en.wikipedia.org/w/api.php");
        let (api, _) = client.endpoints(Some("vi")).unwrap();
        assert_eq!(api.as_str(), "https://vi.wikipedia.org/w/api.php");
        assert!(client.endpoints(Some("nope/nope")).is_err());
    }
}
