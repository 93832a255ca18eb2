//! MLA and APA citation formatting

use chrono::NaiveDate;
use chronicle_core::{ChronicleError, ChronicleResult, CitationStyle, Settings, Source};
use tracing::warn;

/// Per-request citation choices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CitationOptions {
    pub style: CitationStyle,
    pub include_access_date: bool,
}

impl Default for CitationOptions {
    fn default() -> Self {
        Self {
            style: CitationStyle::Mla,
            include_access_date: true,
        }
    }
}

impl CitationOptions {
    pub fn new(style: CitationStyle, include_access_date: bool) -> Self {
        Self {
            style,
            include_access_date,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            style: settings.citation_format,
            include_access_date: settings.include_access_dates,
        }
    }

    pub fn with_style(mut self, style: CitationStyle) -> Self {
        self.style = style;
        self
    }
}

/// Formats sources into citation strings
#[derive(Debug, Clone, Default)]
pub struct CitationFormatter {
    options: CitationOptions,
}

impl CitationFormatter {
    pub fn new(options: CitationOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> CitationOptions {
        self.options
    }

    /// Format every source, one citation per source in the same order
    ///
    /// Sources that cannot be formatted strictly produce a partial citation.
    pub fn format(&self, sources: &[Source]) -> Vec<String> {
        sources
            .iter()
            .map(|source| match self.format_source(source) {
                Ok(citation) => citation,
                Err(e) => {
                    warn!(title = %source.title, error = %e, "Emitting partial citation");
                    self.partial(source)
                }
            })
            .collect()
    }

    /// Strictly format one source; a blank URL is rejected
    pub fn format_source(&self, source: &Source) -> ChronicleResult<String> {
        if source.url.trim().is_empty() {
            return Err(ChronicleError::citation_formatting(
                self.options.style.to_string(),
                format!("source '{}' has no URL", source.title),
            ));
        }
        Ok(match self.options.style {
            CitationStyle::Mla => self.format_mla(source),
            CitationStyle::Apa => format_apa(source),
        })
    }

    /// `[Author.] "Title." [Publisher,] URL. [Accessed DD Mon. YYYY.]`
    pub fn format_mla(&self, source: &Source) -> String {
        let mut parts = Vec::new();
        if let Some(author) = non_blank(&source.author) {
            parts.push(format!("{}.", author));
        }
        parts.push(format!("\"{}.\"", source.title));
        if let Some(publisher) = non_blank(&source.publisher) {
            parts.push(format!("{},", publisher));
        }
        parts.push(format!("{}.", source.url));
        if self.options.include_access_date && !source.date_accessed.trim().is_empty() {
            parts.push(format!("Accessed {}.", format_mla_date(&source.date_accessed)));
        }
        parts.join(" ")
    }

    fn partial(&self, source: &Source) -> String {
        let mut parts = Vec::new();
        if let Some(author) = non_blank(&source.author) {
            parts.push(format!("{}.", author));
        }
        if !source.title.trim().is_empty() {
            parts.push(match self.options.style {
                CitationStyle::Mla => format!("\"{}.\"", source.title),
                CitationStyle::Apa => format!("{}.", source.title),
            });
        }
        if let Some(publisher) = non_blank(&source.publisher) {
            parts.push(format!("{}.", publisher));
        }
        parts.join(" ")
    }
}

/// `[Author.] [(date_published).] Title. [Publisher.] URL`
pub fn format_apa(source: &Source) -> String {
    let mut parts = Vec::new();
    if let Some(author) = non_blank(&source.author) {
        parts.push(format!("{}.", author));
    }
    if let Some(date) = non_blank(&source.date_published) {
        parts.push(format!("({}).", date));
    }
    parts.push(format!("{}.", source.title));
    if let Some(publisher) = non_blank(&source.publisher) {
        parts.push(format!("{}.", publisher));
    }
    parts.push(source.url.clone());
    parts.join(" ")
}

/// `2024-03-15` becomes `15 Mar. 2024`; anything unparsable is returned as is
pub fn format_mla_date(date: &str) -> String {
    match NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d") {
        Ok(parsed) => parsed.format("%d %b. %Y").to_string(),
        Err(_) => date.to_string(),
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_source() -> Source {
        Source::new("https://www.britannica.com/event/Battle-of-Hastings", "Battle of Hastings")
            .with_author("J. Smith")
            .with_publisher("Britannica")
            .with_date_published("2020")
            .with_date_accessed("2024-03-15")
    }

    #[test]
    fn mla_with_every_field() {
        let formatter = CitationFormatter::new(CitationOptions::new(CitationStyle::Mla, true));
        assert_eq!(
            formatter.format(&[full_source()]),
            vec![
                "J. Smith. \"Battle of Hastings.\" Britannica, \
                 https://www.britannica.com/event/Battle-of-Hastings. Accessed 15 Mar. 2024."
                    .to_string()
            ]
        );
    }

    #[test]
    fn mla_without_access_date() {
        let formatter = CitationFormatter::new(CitationOptions::new(CitationStyle::Mla, false));
        let source = Source::new("https://x.example", "Rome");
        assert_eq!(formatter.format_mla(&source), "\"Rome.\" https://x.example.");
    }

    #[test]
    fn mla_keeps_unparsable_dates() {
        let formatter = CitationFormatter::default();
        let source = Source::new("https://x.example", "Rome").with_date_accessed("March 2024");
        assert_eq!(
            formatter.format_mla(&source),
            "\"Rome.\" https://x.example. Accessed March 2024."
        );
    }

    #[test]
    fn apa_layout() {
        let formatter = CitationFormatter::new(CitationOptions::new(CitationStyle::Apa, true));
        assert_eq!(
            formatter.format(&[full_source()])[0],
            "J. Smith. (2020). Battle of Hastings. Britannica. \
             https://www.britannica.com/event/Battle-of-Hastings"
        );
        let bare = Source::new("https://x.example", "Rome");
        assert_eq!(format_apa(&bare), "Rome. https://x.example");
    }

    #[test]
    fn output_matches_input_length_and_order() {
        let formatter = CitationFormatter::default();
        let sources = vec![
            Source::new("https://a.example", "A"),
            Source::new("https://b.example", "B"),
            Source::new("https://c.example", "C"),
        ];
        let citations = formatter.format(&sources);
        assert_eq!(citations.len(), 3);
        assert!(citations[0].contains("\"A.\""));
        assert!(citations[2].contains("\"C.\""));
        assert!(formatter.format(&[]).is_empty());
    }

    #[test]
    fn blank_url_yields_partial_citation() {
        let formatter = CitationFormatter::default();
        let source = Source::new("  ", "Lost Manuscript").with_author("Anon");

        let err = formatter.format_source(&source).unwrap_err();
        assert_eq!(err.error_type(), "citation_formatting_failure");

        let citations = formatter.format(&[source]);
        assert_eq!(citations, vec!["Anon. \"Lost Manuscript.\"".to_string()]);
    }

    #[test]
    fn options_follow_settings() {
        let settings = Settings {
            citation_format: CitationStyle::Apa,
            include_access_dates: false,
            ..Settings::default()
        };
        let options = CitationOptions::from_settings(&settings);
        assert_eq!(options.style, CitationStyle::Apa);
        assert!(!options.include_access_date);
    }
}
