//! Document acquisition: fetch a URL and extract its title and paragraph text

use crate::corpus::Document;
use crate::error::{RagError, Result};
use crate::splitter::normalize_whitespace;
use lol_html::{element, text, HtmlRewriter, Settings};
use reqwest::blocking::Client;
use reqwest::header::USER_AGENT;
use std::cell::RefCell;
use std::time::Duration;

/// Paragraphs at or below this many characters are treated as page chrome
pub const MIN_PARAGRAPH_CHARS: usize = 30;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; FinancialRAG/1.0)";

/// Source of documents for ingestion
pub trait DocumentFetcher: Send + Sync {
    fn fetch(&self, url: &str) -> Result<Document>;
}

/// Fetch every URL in order, failing the whole batch on the first error
pub fn fetch_all(fetcher: &dyn DocumentFetcher, urls: &[String]) -> Result<Vec<Document>> {
    urls.iter()
        .map(|url| {
            tracing::info!("Fetching {}", url);
            fetcher.fetch(url)
        })
        .collect()
}

/// Blocking HTTP fetcher with HTML paragraph extraction
pub struct HttpFetcher {
    client: Client,
    user_agent: String,
    min_paragraph_chars: usize,
}

impl HttpFetcher {
    pub fn new(timeout: Duration, user_agent: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RagError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            user_agent: user_agent.into(),
            min_paragraph_chars: MIN_PARAGRAPH_CHARS,
        })
    }

    pub fn with_min_paragraph_chars(mut self, min_paragraph_chars: usize) -> Self {
        self.min_paragraph_chars = min_paragraph_chars;
        self
    }
}

impl DocumentFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Document> {
        let acquisition_error = |message: String| RagError::Acquisition {
            url: url.to_string(),
            message,
        };

        let resp = self
            .client
            .get(url)
            .header(USER_AGENT, &self.user_agent)
            .send()
            .map_err(|e| acquisition_error(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(acquisition_error(format!("HTTP {}", status)));
        }

        let body = resp.text().map_err(|e| acquisition_error(e.to_string()))?;
        let document = extract_document(url, &body, self.min_paragraph_chars)?;

        tracing::debug!(
            "Extracted {} chars from {} ({})",
            document.text.len(),
            url,
            document.title
        );

        Ok(document)
    }
}

/// Pull the title and qualifying `<p>` text out of an HTML page
///
/// Paragraphs are joined with a blank line. When none qualify, the page's
/// meta description (or `og:description`) is used instead.
pub fn extract_document(url: &str, html: &str, min_paragraph_chars: usize) -> Result<Document> {
    let title = RefCell::new(String::new());
    let paragraphs: RefCell<Vec<String>> = RefCell::new(Vec::new());
    let description: RefCell<Option<String>> = RefCell::new(None);
    let og_description: RefCell<Option<String>> = RefCell::new(None);

    {
        let mut rewriter = HtmlRewriter::new(
            Settings {
                element_content_handlers: vec![
                    text!("title", |t| {
                        title.borrow_mut().push_str(t.as_str());
                        Ok(())
                    }),
                    element!("p", |_el| {
                        paragraphs.borrow_mut().push(String::new());
                        Ok(())
                    }),
                    text!("p", |t| {
                        if let Some(current) = paragraphs.borrow_mut().last_mut() {
                            current.push_str(t.as_str());
                        }
                        Ok(())
                    }),
                    element!(r#"meta[name="description"]"#, |el| {
                        if let Some(content) = el.get_attribute("content") {
                            description.borrow_mut().get_or_insert(content);
                        }
                        Ok(())
                    }),
                    element!(r#"meta[property="og:description"]"#, |el| {
                        if let Some(content) = el.get_attribute("content") {
                            og_description.borrow_mut().get_or_insert(content);
                        }
                        Ok(())
                    }),
                ],
                ..Settings::default()
            },
            |_: &[u8]| {},
        );

        let parse_error = |e: lol_html::errors::RewritingError| RagError::Acquisition {
            url: url.to_string(),
            message: format!("HTML parse failed: {}", e),
        };
        rewriter.write(html.as_bytes()).map_err(parse_error)?;
        rewriter.end().map_err(parse_error)?;
    }

    let title = normalize_whitespace(&decode_entities(&title.into_inner()));
    let title = if title.is_empty() {
        url.to_string()
    } else {
        title
    };

    let mut kept: Vec<String> = paragraphs
        .into_inner()
        .iter()
        .map(|p| normalize_whitespace(&decode_entities(p)))
        .filter(|p| p.chars().count() > min_paragraph_chars)
        .collect();

    if kept.is_empty() {
        let meta = description.into_inner().or(og_description.into_inner());
        if let Some(content) = meta {
            let content = decode_entities(content.trim());
            if !content.is_empty() {
                kept.push(content);
            }
        }
    }

    Ok(Document::new(url, title, kept.join("\n\n")))
}

/// Decode the handful of entities common in article text
fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&rsquo;", "\u{2019}")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><head>
        <title> Fed Holds Rates </title>
        <meta name="description" content="Summary of the rate decision.">
        </head><body>
        <p>Short nav text</p>
        <p>The Federal Reserve   held its benchmark rate steady on Wednesday.</p>
        <p>Officials signaled two cuts later this year, citing cooling inflation &amp; jobs.</p>
        </body></html>"#;

    #[test]
    fn test_extract_title_and_paragraphs() {
        let doc = extract_document("https://news.test/fed", PAGE, MIN_PARAGRAPH_CHARS).unwrap();

        assert_eq!(doc.url, "https://news.test/fed");
        assert_eq!(doc.title, "Fed Holds Rates");
        assert_eq!(
            doc.text,
            "The Federal Reserve held its benchmark rate steady on Wednesday.\n\n\
             Officials signaled two cuts later this year, citing cooling inflation & jobs."
        );
    }

    #[test]
    fn test_missing_title_uses_url() {
        let html = "<p>This paragraph is certainly longer than thirty characters.</p>";
        let doc = extract_document("https://x.test", html, MIN_PARAGRAPH_CHARS).unwrap();
        assert_eq!(doc.title, "https://x.test");
    }

    #[test]
    fn test_meta_description_fallback() {
        let html = r#"<head><meta property="og:description" content="Open graph summary."></head><p>tiny</p>"#;
        let doc = extract_document("https://x.test", html, MIN_PARAGRAPH_CHARS).unwrap();
        assert_eq!(doc.text, "Open graph summary.");
    }

    #[test]
    fn test_empty_page() {
        let doc = extract_document("https://x.test", "<html></html>", MIN_PARAGRAPH_CHARS).unwrap();
        assert!(doc.text.is_empty());
    }

    struct FailingFetcher;

    impl DocumentFetcher for FailingFetcher {
        fn fetch(&self, url: &str) -> Result<Document> {
            if url.ends_with("bad") {
                Err(RagError::Acquisition {
                    url: url.to_string(),
                    message: "HTTP 404 Not Found".to_string(),
                })
            } else {
                Ok(Document::new(url, "t", "text"))
            }
        }
    }

    #[test]
    fn test_fetch_all_is_all_or_nothing() {
        let urls = vec![
            "https://a.test".to_string(),
            "https://b.test/bad".to_string(),
            "https://c.test".to_string(),
        ];
        let result = fetch_all(&FailingFetcher, &urls);
        assert!(matches!(result, Err(RagError::Acquisition { url, .. }) if url == "https://b.test/bad"));
    }

    #[test]
    fn test_unreachable_host_is_acquisition_error() {
        let fetcher = HttpFetcher::new(Duration::from_millis(200), DEFAULT_USER_AGENT).unwrap();
        let result = fetcher.fetch("http://127.0.0.1:9/");
        assert!(matches!(result, Err(RagError::Acquisition { .. })));
    }
}
