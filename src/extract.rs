use std::io::Cursor;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::USER_AGENT;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};

use crate::config::FetchConfig;
use crate::errors::ApiError;

/// Page-content capability used by the retrieval stage. Fetch failures are
/// `Err`; pages with no readable main content come back as `Ok(None)` so the
/// caller can fall back to the search snippet.
#[async_trait]
pub trait ContentExtractor: Send + Sync {
    async fn extract(&self, url: &str) -> Result<Option<String>, ApiError>;
}

/// Fetches a URL over HTTP and extracts readable article text.
pub struct HttpExtractor {
    client: Client,
    timeout: Duration,
    user_agent: String,
}

impl HttpExtractor {
    pub fn new(config: &FetchConfig) -> Self {
        Self {
            client: Client::new(),
            timeout: Duration::from_secs(config.timeout_secs),
            user_agent: config.user_agent.clone(),
        }
    }
}

#[async_trait]
impl ContentExtractor for HttpExtractor {
    async fn extract(&self, url: &str) -> Result<Option<String>, ApiError> {
        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .header(USER_AGENT, &self.user_agent)
            .send()
            .await
            .map_err(ApiError::provider)?;

        if !response.status().is_success() {
            return Err(ApiError::Provider(format!(
                "fetch failed for {}: {}",
                url,
                response.status()
            )));
        }

        let html = response.text().await.map_err(ApiError::provider)?;
        Ok(readable_text(&html))
    }
}

/// Best-effort readable text from an HTML document: prefer the densest
/// article-like container, fall back to whole-page conversion, and report
/// absence rather than returning markup soup.
pub fn readable_text(html: &str) -> Option<String> {
    let no_script = strip_tag_blocks(html, "script");
    let no_style = strip_tag_blocks(&no_script, "style");
    let stripped = strip_tag_blocks(&no_style, "noscript");

    let text = match pick_main_text(&stripped) {
        Some(main) => main,
        None => norm_ws(&html_to_text(&stripped, 100)),
    };

    has_any_text(&text).then_some(text)
}

/// Whole-page HTML to plain text conversion.
fn html_to_text(html: &str, width: usize) -> String {
    html2text::from_read(Cursor::new(html.as_bytes()), width).unwrap_or_default()
}

/// Pick the highest-scoring content container. Score favors dense non-link
/// text; link text is usually navigation or tag clouds.
fn pick_main_text(html: &str) -> Option<String> {
    let doc = Html::parse_document(html);
    let candidates = Selector::parse("article, main, section, div").ok()?;

    let mut best_score: i64 = 0;
    let mut best_text: Option<String> = None;

    for el in doc.select(&candidates) {
        if is_boilerplate_container(&el) {
            continue;
        }

        let text_chars = element_text_chars(&el);
        if text_chars < 80 {
            continue;
        }

        let link_chars = element_link_text_chars(&el);
        let mut score = text_chars as i64 - 2 * (link_chars as i64);
        match el.value().name() {
            "article" => score += 500,
            "main" => score += 300,
            _ => {}
        }
        if link_chars > text_chars / 2 {
            score -= 500;
        }

        if score > best_score {
            best_score = score;
            let joined = el.text().collect::<Vec<_>>().join(" ");
            best_text = Some(norm_ws(&joined));
        }
    }

    best_text
}

fn is_boilerplate_container(el: &ElementRef) -> bool {
    let mut marker = String::new();
    if let Some(class) = el.value().attr("class") {
        marker.push_str(class);
        marker.push(' ');
    }
    if let Some(id) = el.value().attr("id") {
        marker.push_str(id);
    }
    if marker.is_empty() {
        return false;
    }

    let marker = marker.to_ascii_lowercase();
    [
        "nav", "navbar", "menu", "sidebar", "footer", "header", "banner", "cookie", "consent",
        "ads", "advert", "promo", "subscribe", "newsletter", "comment",
    ]
    .iter()
    .any(|token| marker.contains(token))
}

fn element_text_chars(el: &ElementRef) -> usize {
    el.text().map(|t| t.chars().count()).sum()
}

fn element_link_text_chars(el: &ElementRef) -> usize {
    let Ok(sel) = Selector::parse("a") else {
        return 0;
    };
    el.select(&sel)
        .map(|a| a.text().map(|t| t.chars().count()).sum::<usize>())
        .sum()
}

/// Strip `<tag ...>...</tag>` blocks so scripts and styles never count as
/// content. Conservative: only removes when a close tag is found.
fn strip_tag_blocks(html: &str, tag: &str) -> String {
    let open_pat = format!("<{}", tag);
    let close_pat = format!("</{}>", tag);

    let lower = html.to_ascii_lowercase();
    let mut out = String::new();
    let mut i = 0usize;

    while let Some(rel_start) = lower[i..].find(&open_pat) {
        let start = i + rel_start;
        let after_open = start + open_pat.len();
        if let Some(rel_end) = lower[after_open..].find(&close_pat) {
            let end = after_open + rel_end + close_pat.len();
            out.push_str(&html[i..start]);
            i = end;
        } else {
            break;
        }
    }
    out.push_str(&html[i..]);
    out
}

fn norm_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn has_any_text(s: &str) -> bool {
    s.chars().any(|c| !c.is_whitespace())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_article_over_navigation() {
        let html = r#"
        <html><body>
          <nav class="nav"><a href="/a">Home</a><a href="/b">About</a><a href="/c">Contact</a></nav>
          <article>
            <h1>Quarterly results</h1>
            <p>Revenue grew for the third consecutive quarter, driven by strong demand
            in the services segment and continued expansion into new markets.</p>
            <p>Operating costs stayed flat year over year.</p>
          </article>
          <footer class="footer"><a href="/privacy">Privacy policy</a></footer>
        </body></html>
        "#;

        let text = readable_text(html).unwrap();
        assert!(text.contains("Revenue grew"));
        assert!(text.contains("Operating costs"));
        assert!(!text.contains("Privacy policy"));
    }

    #[test]
    fn strips_script_and_style_content() {
        let html = r#"
        <html><head><style>.x { color: red; }</style></head><body>
          <script>var tracking = "beacon";</script>
          <main><p>Visible paragraph with enough prose to clear the length gate
          and count as genuine readable page content for extraction.</p></main>
        </body></html>
        "#;

        let text = readable_text(html).unwrap();
        assert!(text.contains("Visible paragraph"));
        assert!(!text.contains("beacon"));
        assert!(!text.contains("color: red"));
    }

    #[test]
    fn falls_back_to_whole_page_conversion() {
        // No container clears the main-content gate; html2text still yields text.
        let html = "<html><body><p>short note</p></body></html>";
        let text = readable_text(html).unwrap();
        assert!(text.contains("short note"));
    }

    #[test]
    fn empty_and_markup_only_pages_yield_none() {
        assert_eq!(readable_text(""), None);
        assert_eq!(readable_text("<html><body></body></html>"), None);
        assert_eq!(
            readable_text("<html><body><script>let x = 1;</script></body></html>"),
            None
        );
    }

    #[test]
    fn strip_tag_blocks_is_case_insensitive_and_safe() {
        let html = "a<SCRIPT>x</SCRIPT>b<script>unclosed";
        let out = strip_tag_blocks(html, "script");
        assert_eq!(out, "ab<script>unclosed");
    }
}
