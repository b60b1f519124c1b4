//! Tolerant HTML extraction.
//!
//! A document is parsed once and flattened into owned values ([`Anchor`],
//! [`Row`]) so nothing from the parser crosses an `.await`. Cell lookups never
//! fail: a missing cell reads as an empty string and a malformed number or
//! date reads as `None`, leaving the caller to pick the zero value.

use super::errors::ScrapeError;
use chrono::NaiveDate;
use scraper::{ElementRef, Html, Selector};

/// A link found on a page.
#[derive(Debug, Clone, PartialEq)]
pub struct Anchor {
    pub href: String,
    pub text: String,
}

/// The text of every `<td>` directly under one table row, plus the text of
/// every `<strong>` inside those cells in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    cells: Vec<String>,
    emphasis: Vec<String>,
}

impl Row {
    pub fn new(cells: Vec<String>) -> Self {
        Self {
            cells,
            emphasis: Vec::new(),
        }
    }

    pub fn with_emphasis(mut self, emphasis: Vec<String>) -> Self {
        self.emphasis = emphasis;
        self
    }

    pub fn first_emphasis(&self) -> &str {
        self.emphasis.first().map(String::as_str).unwrap_or("")
    }

    pub fn last_emphasis(&self) -> &str {
        self.emphasis.last().map(String::as_str).unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn text(&self, index: usize) -> &str {
        self.cells.get(index).map(String::as_str).unwrap_or("")
    }

    pub fn number(&self, index: usize) -> Option<f64> {
        parse_number(self.text(index))
    }

    pub fn date(&self, index: usize, format: &str) -> Option<i64> {
        parse_date(self.text(index), format)
    }
}

/// Every element matching `css` that carries an `href`.
pub fn extract_anchors(body: &[u8], css: &str) -> Result<Vec<Anchor>, ScrapeError> {
    let document = parse_document(body)?;
    let selector = selector(css)?;

    let anchors = document
        .select(&selector)
        .filter_map(|element| {
            let href = element.value().attr("href")?;
            Some(Anchor {
                href: href.trim().to_string(),
                text: element_text(element),
            })
        })
        .collect();

    Ok(anchors)
}

/// Every element matching `row_css`, flattened to its cell texts.
pub fn extract_rows(body: &[u8], row_css: &str) -> Result<Vec<Row>, ScrapeError> {
    let document = parse_document(body)?;
    let strong = selector("strong")?;
    let selector = selector(row_css)?;

    let rows = document
        .select(&selector)
        .map(|row| {
            let tds: Vec<ElementRef> = row
                .children()
                .filter_map(ElementRef::wrap)
                .filter(|child| child.value().name() == "td")
                .collect();
            let emphasis = tds
                .iter()
                .flat_map(|td| td.select(&strong))
                .map(element_text)
                .collect();
            let cells = tds.into_iter().map(element_text).collect();
            Row::new(cells).with_emphasis(emphasis)
        })
        .collect();

    Ok(rows)
}

/// For every element matching `block_css`, the text of the first descendant
/// matching each of `field_css`, in the same order. A missing field reads as
/// an empty string.
pub fn extract_blocks(
    body: &[u8],
    block_css: &str,
    field_css: &[&str],
) -> Result<Vec<Vec<String>>, ScrapeError> {
    let document = parse_document(body)?;
    let block = selector(block_css)?;
    let fields = field_css
        .iter()
        .map(|css| selector(css))
        .collect::<Result<Vec<_>, _>>()?;

    let blocks = document
        .select(&block)
        .map(|element| {
            fields
                .iter()
                .map(|field| element.select(field).next().map(element_text).unwrap_or_default())
                .collect()
        })
        .collect();

    Ok(blocks)
}

fn parse_document(body: &[u8]) -> Result<Html, ScrapeError> {
    let text = String::from_utf8_lossy(body);
    if text.trim().is_empty() {
        return Err(ScrapeError::DocumentParse("empty document".to_string()));
    }
    if !text.contains('<') {
        return Err(ScrapeError::DocumentParse(
            "body contains no markup".to_string(),
        ));
    }

    Ok(Html::parse_document(&text))
}

fn selector(css: &str) -> Result<Selector, ScrapeError> {
    Selector::parse(css)
        .map_err(|err| ScrapeError::DocumentParse(format!("invalid selector {}: {:?}", css, err)))
}

/// Text content with runs of whitespace collapsed.
fn element_text(element: ElementRef) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parses `1,234.50`, `25%` and friends; `None` for anything else, including
/// `NaN` and infinities.
pub fn parse_number(text: &str) -> Option<f64> {
    let cleaned: String = text
        .trim()
        .chars()
        .filter(|c| *c != ',' && *c != '%' && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Unix seconds of midnight UTC on the given calendar date.
pub fn parse_date(text: &str, format: &str) -> Option<i64> {
    let date = NaiveDate::parse_from_str(text.trim(), format).ok()?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc().timestamp())
}
