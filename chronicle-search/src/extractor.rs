//! HTML content and metadata extraction

use chronicle_core::{ChronicleError, ChronicleResult, ContentExtractor, PageMetadata};
use ::scraper::{ElementRef, Html, Selector};

/// Elements that never carry article content
const NOISE_SELECTOR: &str = "script, style, noscript, nav, footer, header, aside, form";

/// Containers tried in order when looking for the main content
const CONTENT_SELECTORS: [&str; 4] = ["article", "main", "div.content", "[role=\"main\"]"];

const AUTHOR_KEYS: [&str; 3] = ["author", "article:author", "og:author"];
const DATE_KEYS: [&str; 3] = ["article:published_time", "pubdate", "date"];
const PUBLISHER_KEYS: [&str; 2] = ["og:site_name", "publisher"];

/// Readable-text extractor built on scraper and html2text
#[derive(Debug, Clone)]
pub struct HtmlContentExtractor {
    /// Wrap width passed to html2text
    pub width: usize,
}

impl Default for HtmlContentExtractor {
    fn default() -> Self {
        Self { width: 100 }
    }
}

impl HtmlContentExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Main content fragment as HTML, with noise elements removed
    fn main_fragment(&self, doc: &Html) -> Option<String> {
        let noise = Selector::parse(NOISE_SELECTOR).ok()?;

        for selector in CONTENT_SELECTORS {
            let Ok(sel) = Selector::parse(selector) else {
                continue;
            };
            if let Some(el) = doc.select(&sel).next() {
                let fragment = strip_noise(el, &noise);
                if has_text(&fragment) {
                    return Some(fragment);
                }
            }
        }

        let paragraphs = Selector::parse("p").ok()?;
        let joined: String = doc
            .select(&paragraphs)
            .map(|p| strip_noise(p, &noise))
            .collect::<Vec<_>>()
            .join("\n");
        has_text(&joined).then_some(joined)
    }
}

fn strip_noise(el: ElementRef<'_>, noise: &Selector) -> String {
    let mut fragment = el.html();
    for child in el.select(noise) {
        fragment = fragment.replacen(&child.html(), "", 1);
    }
    fragment
}

fn has_text(fragment: &str) -> bool {
    let doc = Html::parse_fragment(fragment);
    doc.root_element()
        .text()
        .any(|t| t.chars().any(|c| !c.is_whitespace()))
}

/// Trim trailing spaces and collapse runs of blank lines
fn tidy(text: &str) -> String {
    let mut out = Vec::new();
    let mut blank = false;
    for line in text.lines().map(str::trim_end) {
        if line.trim().is_empty() {
            if !blank && !out.is_empty() {
                out.push(String::new());
            }
            blank = true;
        } else {
            out.push(line.to_string());
            blank = false;
        }
    }
    out.join("\n").trim().to_string()
}

fn meta_content(doc: &Html, keys: &[&str]) -> Option<String> {
    let sel = Selector::parse("meta").ok()?;
    for key in keys {
        for el in doc.select(&sel) {
            let attrs = el.value();
            let name = attrs.attr("name").or_else(|| attrs.attr("property"));
            if name.map(|n| n.eq_ignore_ascii_case(key)).unwrap_or(false) {
                if let Some(content) = attrs.attr("content").map(str::trim).filter(|c| !c.is_empty()) {
                    return Some(content.to_string());
                }
            }
        }
    }
    None
}

impl ContentExtractor for HtmlContentExtractor {
    fn extract(&self, html: &str) -> ChronicleResult<String> {
        let fragment = {
            let doc = Html::parse_document(html);
            self.main_fragment(&doc)
        }
        .ok_or_else(|| ChronicleError::content_extraction("document", "no readable content found"))?;

        let text = html2text::from_read(fragment.as_bytes(), self.width)
            .map_err(|e| ChronicleError::content_extraction("document", e.to_string()))?;

        let text = tidy(&text);
        if text.is_empty() {
            return Err(ChronicleError::content_extraction(
                "document",
                "content was empty after conversion",
            ));
        }
        Ok(text)
    }

    fn metadata(&self, html: &str) -> PageMetadata {
        let doc = Html::parse_document(html);

        let title = Selector::parse("title")
            .ok()
            .and_then(|sel| doc.select(&sel).next())
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|t| !t.is_empty())
            .or_else(|| meta_content(&doc, &["og:title"]));

        PageMetadata {
            title,
            author: meta_content(&doc, &AUTHOR_KEYS),
            date: meta_content(&doc, &DATE_KEYS),
            publisher: meta_content(&doc, &PUBLISHER_KEYS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARTICLE: &str = r#"
    <html>
      <head>
        <title> The Fall of Rome </title>
        <meta name="author" content="Edward Gibbon">
        <meta property="article:published_time" content="2021-05-04">
        <meta property="og:site_name" content="History Today">
      </head>
      <body>
        <header>Site header</header>
        <nav>Home | About</nav>
        <article>
          <h1>The Fall of Rome</h1>
          <p>The Western Roman Empire fell in 476 CE.</p>
          <script>var tracking = true;</script>
          <aside>Related links</aside>
          <p>Odoacer deposed Romulus Augustulus.</p>
        </article>
        <footer>Copyright</footer>
      </body>
    </html>
    "#;

    #[test]
    fn extracts_article_without_noise() {
        let text = HtmlContentExtractor::new().extract(ARTICLE).unwrap();
        assert!(text.contains("476 CE"));
        assert!(text.contains("Odoacer"));
        assert!(!text.contains("tracking"));
        assert!(!text.contains("Related links"));
        assert!(!text.contains("Copyright"));
        assert!(!text.contains("Home | About"));
    }

    #[test]
    fn falls_back_to_paragraphs() {
        let html = "<html><body><div><p>First paragraph.</p><p>Second one.</p></div></body></html>";
        let text = HtmlContentExtractor::new().extract(html).unwrap();
        assert!(text.contains("First paragraph."));
        assert!(text.contains("Second one."));
    }

    #[test]
    fn empty_document_is_an_error() {
        let err = HtmlContentExtractor::new()
            .extract("<html><body><nav>only nav</nav></body></html>")
            .unwrap_err();
        assert_eq!(err.error_type(), "content_extraction_failure");
    }

    #[test]
    fn reads_metadata_tags() {
        let meta = HtmlContentExtractor::new().metadata(ARTICLE);
        assert_eq!(meta.title.as_deref(), Some("The Fall of Rome"));
        assert_eq!(meta.author.as_deref(), Some("Edward Gibbon"));
        assert_eq!(meta.date.as_deref(), Some("2021-05-04"));
        assert_eq!(meta.publisher.as_deref(), Some("History Today"));
    }

    #[test]
    fn metadata_falls_back_to_open_graph_title() {
        let html = r#"<html><head><meta property="og:title" content="OG Title"></head></html>"#;
        let meta = HtmlContentExtractor::new().metadata(html);
        assert_eq!(meta.title.as_deref(), Some("OG Title"));
        assert!(meta.author.is_none());
    }

    #[test]
    fn tidy_collapses_blank_lines() {
        assert_eq!(tidy("a  \n\n\n\nb\n"), "a\n\nb");
    }
}
