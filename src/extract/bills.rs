use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

use super::{absolute_url, first_of, first_text, info_pairs, selector, text_of};
use crate::config::Language;
use crate::model::{BillField, BillFragment, StatusEntry};
use crate::normalize::label_key;

static BILL_HREF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/bills/([A-Za-z0-9]+)/?(?:[?#].*)?$").unwrap());

static BORDERED_TABLE: LazyLock<Selector> = LazyLock::new(|| selector("table.table-bordered"));
static PLAIN_TABLE: LazyLock<Selector> = LazyLock::new(|| selector("table.table"));
static BODY_ROWS: LazyLock<Selector> = LazyLock::new(|| selector("tbody tr"));
static LINKS: LazyLock<Selector> = LazyLock::new(|| selector("a[href]"));

static VIEW_TITLE: LazyLock<Selector> = LazyLock::new(|| selector(".single-bill-view h1"));
static ANY_TITLE: LazyLock<Selector> = LazyLock::new(|| selector("h1"));

static STATUS_TABLE: LazyLock<Selector> = LazyLock::new(|| selector("div.fpn-auth-table-container table"));
static LEGACY_STATUS_TABLE: LazyLock<Selector> =
    LazyLock::new(|| selector("table.fpn-auth-table-container table"));
static HEAD_CELLS: LazyLock<Selector> = LazyLock::new(|| selector("thead th"));
static CELLS: LazyLock<Selector> = LazyLock::new(|| selector("td"));

static PDF_BUTTON: LazyLock<Selector> = LazyLock::new(|| selector(r#"a.btn-small[href$=".pdf"]"#));
static DOWNLOAD_LINK: LazyLock<Selector> = LazyLock::new(|| selector("a.bg-blue[href]"));

/// Labels as printed on the Nepali template. The English template keeps
/// some of them untranslated, so they are checked on both.
const NP_LABELS: &[(&str, BillField)] = &[
    ("दर्ता नं.", BillField::RegistrationNumber),
    ("वर्ष", BillField::Year),
    ("संवत्", BillField::Sambat),
    ("प्रस्तुतकर्ता", BillField::Presenter),
    ("मन्त्रालय", BillField::Ministry),
    ("अधिवेशन", BillField::Session),
    ("सरकारी/गैर-सरकारी", BillField::GovernmentType),
    ("मूल/संशोधन", BillField::BillType),
    ("वर्ग", BillField::Category),
];

const EN_LABELS: &[(&str, BillField)] = &[
    ("Registration No.", BillField::RegistrationNumber),
    ("Registration Number", BillField::RegistrationNumber),
    ("Year", BillField::Year),
    ("Samvat", BillField::Sambat),
    ("Session", BillField::Session),
    ("Presenter", BillField::PresenterEn),
    ("Ministry", BillField::MinistryEn),
    ("Governmental/Non Governmental", BillField::GovernmentTypeEn),
    ("Original/Amendment", BillField::BillTypeEn),
    ("Category", BillField::CategoryEn),
];

pub(super) fn list_ids(doc: &Html) -> Vec<String> {
    let Some(table) = first_of(doc, &[&*BORDERED_TABLE, &*PLAIN_TABLE]) else {
        debug!("no bill listing table on page");
        return Vec::new();
    };

    let mut ids: Vec<String> = Vec::new();
    for row in table.select(&BODY_ROWS) {
        let id = row
            .select(&LINKS)
            .filter_map(|a| a.value().attr("href"))
            .find_map(bill_id_from_href);
        if let Some(id) = id {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
    }
    ids
}

fn bill_id_from_href(href: &str) -> Option<String> {
    BILL_HREF_RE.captures(href.trim()).map(|c| c[1].to_string())
}

pub(super) fn detail(doc: &Html, language: Language, base_url: &Url) -> BillFragment {
    let mut fragment = BillFragment {
        title: first_text(doc, &[&*VIEW_TITLE, &*ANY_TITLE]),
        ..Default::default()
    };

    for (label, value) in info_pairs(doc) {
        if let Some(field) = lookup_label(&label, language) {
            fragment.set(field, value);
        }
    }

    // Only the English template carries the status table.
    if language == Language::English {
        fragment.status_timeline = status_timeline(doc);
    }

    fragment.resource_link = resource_link(doc, base_url);
    fragment
}

fn lookup_label(label: &str, language: Language) -> Option<BillField> {
    let key = label_key(label);
    let find = |table: &[(&str, BillField)]| {
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

/// Header cells paired with the single data row; stages without a date
/// have not been reached and are skipped.
fn status_timeline(doc: &Html) -> Vec<StatusEntry> {
    let Some(table) = first_of(doc, &[&*STATUS_TABLE, &*LEGACY_STATUS_TABLE]) else {
        return Vec::new();
    };
    let Some(row) = table.select(&BODY_ROWS).next() else {
        return Vec::new();
    };

    table
        .select(&HEAD_CELLS)
        .zip(row.select(&CELLS))
        .map(|(th, td)| (text_of(th), text_of(td)))
        .filter(|(_, date)| !date.is_empty())
        .map(|(label, date)| StatusEntry { label, date: Some(date) })
        .collect()
}

fn resource_link(doc: &Html, base_url: &Url) -> Option<String> {
    let pdf = doc
        .select(&PDF_BUTTON)
        .filter_map(|a| a.value().attr("href"))
        .find(|href| !href.trim().is_empty());
    let href = pdf.or_else(|| {
        doc.select(&DOWNLOAD_LINK)
            .filter(|a| text_of(*a).contains("Download"))
            .filter_map(|a| a.value().attr("href"))
            .find(|href| !href.trim().is_empty())
    })?;
    absolute_url(base_url, href)
}
