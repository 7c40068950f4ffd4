//! Input resolution: pasted text, or readable text fetched from a URL.

use std::time::Duration;

use reqwest::Url;
use tracing::{debug, info};

use crate::{errors::SourceError, text::sanitize_html_text};

/// Whole-request timeout for fetching a source page.
const FETCH_TIMEOUT_SECS: u64 = 12;
/// Bytes read from a source page; the rest is ignored.
const MAX_FETCH_BYTES: usize = 2 << 20;

/// Text to analyse plus the URL it came from (may be empty).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSource {
    pub text: String,
    pub source_url: String,
}

/// Resolves request input into plain text, fetching pages when needed.
#[derive(Debug, Clone)]
pub struct SourceResolver {
    http: reqwest::Client,
}

impl SourceResolver {
    /// # Errors
    /// Returns [`SourceError::Fetch`] if the HTTP client cannot be built.
    pub fn new() -> Result<Self, SourceError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
            .build()?;
        Ok(Self { http })
    }

    /// Non-blank `text` wins and `url` is only recorded. Otherwise `url` must be
    /// an absolute http(s) URL whose page yields readable text.
    pub async fn resolve(&self, text: &str, url: &str) -> Result<ResolvedSource, SourceError> {
        let text = text.trim();
        let url = url.trim();

        if !text.is_empty() {
            return Ok(ResolvedSource {
                text: text.to_string(),
                source_url: url.to_string(),
            });
        }
        if url.is_empty() {
            return Err(SourceError::MissingInput);
        }

        let parsed = parse_http_url(url)?;
        let fetched = self.fetch_text(parsed.clone()).await?;
        if fetched.is_empty() {
            return Err(SourceError::NoReadableText);
        }

        info!(url = %parsed, chars = fetched.chars().count(), "source text fetched");
        Ok(ResolvedSource {
            text: fetched,
            source_url: parsed.to_string(),
        })
    }

    async fn fetch_text(&self, url: Url) -> Result<String, SourceError> {
        let mut resp = self.http.get(url.clone()).send().await?;
        let status = resp.status();
        if status.as_u16() >= 400 {
            return Err(SourceError::HttpStatus(status.as_u16()));
        }

        let mut body: Vec<u8> = Vec::new();
        while let Some(chunk) = resp.chunk().await? {
            let room = MAX_FETCH_BYTES - body.len();
            if chunk.len() >= room {
                body.extend_from_slice(&chunk[..room]);
                debug!(url = %url, limit = MAX_FETCH_BYTES, "source page truncated");
                break;
            }
            body.extend_from_slice(&chunk);
        }

        Ok(sanitize_html_text(&String::from_utf8_lossy(&body)))
    }
}

fn parse_http_url(raw: &str) -> Result<Url, SourceError> {
    let url = Url::parse(raw).map_err(|_| SourceError::InvalidUrl)?;
    let http_like = matches!(url.scheme(), "http" | "https");
    if !http_like || url.host_str().is_none() {
        return Err(SourceError::InvalidUrl);
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_only_absolute_http_urls() {
        assert!(parse_http_url("https://example.com/news/1").is_ok());
        assert!(parse_http_url("http://localhost:8080").is_ok());
        assert!(matches!(parse_http_url("example.com"), Err(SourceError::InvalidUrl)));
        assert!(matches!(parse_http_url("ftp://example.com"), Err(SourceError::InvalidUrl)));
        assert!(matches!(parse_http_url("/relative"), Err(SourceError::InvalidUrl)));
    }

    #[tokio::test]
    async fn text_wins_over_url() {
        let resolver = SourceResolver::new().unwrap();
        let out = resolver
            .resolve("  Pasted story.  ", " https://example.com/a ")
            .await
            .unwrap();
        assert_eq!(out.text, "Pasted story.");
        assert_eq!(out.source_url, "https://example.com/a");
    }

    #[tokio::test]
    async fn requires_text_or_url() {
        let resolver = SourceResolver::new().unwrap();
        let err = resolver.resolve("   ", "").await.unwrap_err();
        assert_eq!(err.to_string(), "provide either text or url");

        let err = resolver.resolve("", "not a url").await.unwrap_err();
        assert_eq!(err.to_string(), "url is invalid");
    }

    #[tokio::test]
    async fn large_pages_are_cut_at_the_byte_limit() {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        let mut page = "word ".repeat(MAX_FETCH_BYTES / 5 + 1000);
        page.push_str("TAILMARKER");
        Mock::given(method("GET"))
            .and(path("/big"))
            .respond_with(ResponseTemplate::new(200).set_body_string(page))
            .mount(&server)
            .await;

        let resolver = SourceResolver::new().unwrap();
        let out = resolver
            .resolve("", &format!("{}/big", server.uri()))
            .await
            .unwrap();
        assert!(out.text.starts_with("word word"));
        assert!(!out.text.contains("TAILMARKER"));
        assert!(out.text.len() <= MAX_FETCH_BYTES);
    }
}
