//! Page extractors: raw markup in, ids or single-language fragments out.
//!
//! Every lookup is an ordered list of selectors tried until one matches, so a
//! missing block degrades to an absent field instead of an error. The only
//! hard failure is markup that is not HTML at all.

pub mod bills;
pub mod committees;

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::config::{Language, RecordKind};
use crate::error::ExtractionError;
use crate::model::{BillFragment, CommitteeFragment};

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<\s*[A-Za-z!/]").unwrap());

/// Single-language extraction result for one entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    Bill(BillFragment),
    Committee(CommitteeFragment),
}

impl Fragment {
    pub fn is_empty(&self) -> bool {
        match self {
            Fragment::Bill(f) => f.is_empty(),
            Fragment::Committee(f) => f.is_empty(),
        }
    }
}

/// One entry of a listing page. Committee listings carry the name shown
/// next to the link; bill listings do not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    pub id: String,
    pub name: Option<String>,
}

/// Entries of one listing page, in document order, duplicate ids collapsed.
/// An empty list means the listing structure was absent.
pub fn extract_list(markup: &str, kind: RecordKind) -> Result<Vec<ListEntry>, ExtractionError> {
    let doc = parse_document(markup)?;
    Ok(match kind {
        RecordKind::Bills => bills::list_ids(&doc)
            .into_iter()
            .map(|id| ListEntry { id, name: None })
            .collect(),
        RecordKind::Committees => committees::list_entries(&doc),
    })
}

pub fn extract_detail(
    markup: &str,
    kind: RecordKind,
    language: Language,
    base_url: &Url,
) -> Result<Fragment, ExtractionError> {
    let doc = parse_document(markup)?;
    Ok(match kind {
        RecordKind::Bills => Fragment::Bill(bills::detail(&doc, language, base_url)),
        RecordKind::Committees => Fragment::Committee(committees::detail(&doc, language)),
    })
}

#[cfg(test)]
pub(crate) fn listed_ids(markup: &str, kind: RecordKind) -> Result<Vec<String>, ExtractionError> {
    Ok(extract_list(markup, kind)?.into_iter().map(|e| e.id).collect())
}

fn parse_document(markup: &str) -> Result<Html, ExtractionError> {
    if !TAG_RE.is_match(markup) {
        return Err(ExtractionError::NotHtml(markup.len()));
    }
    Ok(Html::parse_document(markup))
}

fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid selector {css:?}: {e}"))
}

/// Visible text of an element with whitespace collapsed.
fn text_of(el: ElementRef<'_>) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// First element matched by the first selector that matches anything.
fn first_of<'a>(doc: &'a Html, selectors: &[&Selector]) -> Option<ElementRef<'a>> {
    selectors.iter().find_map(|s| doc.select(s).next())
}

/// First non-empty text found through the selector chain.
fn first_text(doc: &Html, selectors: &[&Selector]) -> Option<String> {
    selectors
        .iter()
        .flat_map(|s| doc.select(s))
        .map(text_of)
        .find(|t| !t.is_empty())
}

/// Resolve a possibly relative href against the source site.
fn absolute_url(base: &Url, href: &str) -> Option<String> {
    base.join(href.trim()).ok().map(String::from)
}

/// `(label, value)` pairs from the rows of `table.table-info` blocks that
/// have exactly two cells.
fn info_pairs(doc: &Html) -> Vec<(String, String)> {
    static ROWS: LazyLock<Selector> = LazyLock::new(|| selector("table.table-info tr"));
    static CELLS: LazyLock<Selector> = LazyLock::new(|| selector("td"));

    doc.select(&ROWS)
        .filter_map(|row| {
            let cells: Vec<_> = row.select(&CELLS).collect();
            match cells.as_slice() {
                [label, value] => Some((text_of(*label), text_of(*value))),
                _ => None,
            }
        })
        .filter(|(_, value)| !value.is_empty())
        .collect()
}
