use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use super::{first_of, first_text, info_pairs, selector, text_of, ListEntry};
use crate::config::Language;
use crate::model::{CommitteeField, CommitteeFragment};
use crate::normalize::label_key;

static COMMITTEE_HREF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/committees/([^/?#]+)/?(?:[?#].*)?$").unwrap());

static LISTING: LazyLock<Selector> = LazyLock::new(|| selector("div.committee-listing-posts"));
static CLASSIC_LISTING: LazyLock<Selector> = LazyLock::new(|| selector("div.classic-posts"));
static HEADINGS: LazyLock<Selector> = LazyLock::new(|| selector("h4"));
static LINKS: LazyLock<Selector> = LazyLock::new(|| selector("a[href]"));

static TITLE: LazyLock<Selector> = LazyLock::new(|| selector("h1"));
static DESCRIPTION: LazyLock<Selector> = LazyLock::new(|| selector("div.committee-description"));
static MAIN_COLUMN: LazyLock<Selector> = LazyLock::new(|| selector("div.col-md-9"));
static DESCRIPTION_PARTS: LazyLock<Selector> = LazyLock::new(|| selector("p, div, li"));
static COLUMN_PARTS: LazyLock<Selector> = LazyLock::new(|| selector("p, div"));

/// Shorter text blocks are labels or stray punctuation, not introduction.
const MIN_PART_CHARS: usize = 10;

const NP_LABELS: &[(&str, CommitteeField)] = &[
    ("गठन मिति", CommitteeField::StartDate),
    ("विघटन मिति", CommitteeField::EndDate),
];

const EN_LABELS: &[(&str, CommitteeField)] = &[
    ("Formation Date", CommitteeField::StartDate),
    ("Dissolution Date", CommitteeField::EndDate),
];

pub(super) fn list_entries(doc: &Html) -> Vec<ListEntry> {
    let Some(container) = first_of(doc, &[&*LISTING, &*CLASSIC_LISTING]) else {
        debug!("no committee listing container on page");
        return Vec::new();
    };

    let mut entries: Vec<ListEntry> = Vec::new();
    for heading in container.select(&HEADINGS) {
        let Some(href) = heading_link(heading) else {
            continue;
        };
        let Some(id) = committee_id_from_href(href) else {
            continue;
        };
        if entries.iter().any(|e| e.id == id) {
            continue;
        }
        let name = text_of(heading);
        entries.push(ListEntry {
            id,
            name: (!name.is_empty()).then_some(name),
        });
    }
    entries
}

/// The link sits inside the `h4`, or the `h4` sits inside the link.
fn heading_link(heading: ElementRef<'_>) -> Option<&str> {
    let inner = heading.select(&LINKS).next();
    let outer = || {
        heading
            .parent()
            .and_then(ElementRef::wrap)
            .filter(|p| p.value().name() == "a")
    };
    inner.or_else(outer)?.value().attr("href")
}

fn committee_id_from_href(href: &str) -> Option<String> {
    COMMITTEE_HREF_RE.captures(href.trim()).map(|c| c[1].to_string())
}

pub(super) fn detail(doc: &Html, language: Language) -> CommitteeFragment {
    let mut fragment = CommitteeFragment {
        title: first_text(doc, &[&*TITLE]),
        introduction: introduction(doc),
        ..Default::default()
    };

    for (label, value) in info_pairs(doc) {
        if let Some(field) = lookup_label(&label, language) {
            fragment.set(field, value);
        }
    }
    fragment
}

fn lookup_label(label: &str, language: Language) -> Option<CommitteeField> {
    let key = label_key(label);
    let find = |table: &[(&str, CommitteeField)]| {
        table
            .iter()
            .find(|(known, _)| label_key(known) == key)
            .map(|(_, field)| *field)
    };
    match language {
        Language::Nepali => find(NP_LABELS),
        Language::English => find(NP_LABELS).or_else(|| find(EN_LABELS)),
    }
}

/// Leaf text blocks of the description, falling back to the main column.
fn introduction(doc: &Html) -> Option<String> {
    let attempts: [(&Selector, &Selector, &[&str]); 2] = [
        (&*DESCRIPTION, &*DESCRIPTION_PARTS, &["p", "div", "li"][..]),
        (&*MAIN_COLUMN, &*COLUMN_PARTS, &["p", "div"][..]),
    ];

    attempts.iter().find_map(|(container, parts, block_tags)| {
        let container = doc.select(container).next()?;
        let texts: Vec<String> = container
            .select(parts)
            .filter(|el| !has_block_child(*el, block_tags))
            .map(text_of)
            .filter(|t| t.chars().count() > MIN_PART_CHARS)
            .collect();
        (!texts.is_empty()).then(|| texts.join("\n\n"))
    })
}

fn has_block_child(el: ElementRef<'_>, block_tags: &[&str]) -> bool {
    el.descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .any(|child| block_tags.contains(&child.value().name()))
}
