use chrono::Utc;
use tracing::{debug, warn};

use crate::config::{Chamber, Language, RecordKind, Source};
use crate::context::RunContext;
use crate::error::AcquisitionError;
use crate::extract::{extract_detail, Fragment};
use crate::model::{
    BillFragment, CanonicalBill, CanonicalCommittee, CanonicalRecord, CommitteeFragment,
};

/// Fetch both language variants of one entity and merge them.
///
/// Either page may fail on its own; only when neither produced a single
/// field is the entity given up. The category's entity pause runs after
/// every call, successful or not.
pub async fn resolve(
    ctx: &RunContext<'_>,
    source: &Source,
    kind: RecordKind,
    id: &str,
) -> Result<CanonicalRecord, AcquisitionError> {
    let np = fetch_fragment(ctx, source, kind, Language::Nepali, id).await;
    let en = fetch_fragment(ctx, source, kind, Language::English, id).await;
    tokio::time::sleep(ctx.pacing(kind).entity_interval).await;

    let (np, en) = match (np, en) {
        (Err(np), Err(en)) => {
            return Err(AcquisitionError::Empty {
                id: id.to_string(),
                np,
                en,
            })
        }
        (np, en) => (np.ok(), en.ok()),
    };

    let record = match kind {
        RecordKind::Bills => {
            let mut bill = merge_bill(id, source.chamber, np.and_then(into_bill), en.and_then(into_bill));
            bill.scraped_at = Some(Utc::now());
            CanonicalRecord::Bill(bill)
        }
        RecordKind::Committees => CanonicalRecord::Committee(merge_committee(
            id,
            source.chamber,
            np.and_then(into_committee),
            en.and_then(into_committee),
        )),
    };
    Ok(record)
}

/// A committee whose detail pages carry no title takes the name its
/// listing showed. Listings are the Nepali pages.
pub fn fill_listing_name(record: &mut CanonicalRecord, listing_name: &str) {
    if let CanonicalRecord::Committee(c) = record {
        if c.name_np.is_none() && c.name_en.is_none() {
            c.name_np = Some(listing_name.to_string());
        }
    }
}

/// One language's fragment, or why there is none. Empty fragments count as
/// failures here so the caller can tell "nothing at all" apart.
async fn fetch_fragment(
    ctx: &RunContext<'_>,
    source: &Source,
    kind: RecordKind,
    language: Language,
    id: &str,
) -> Result<Fragment, String> {
    let url = source.detail_url(kind, language, id);
    let markup = ctx.fetcher.fetch(&url).await.map_err(|e| {
        warn!(id, lang = language.code(), error = %e, "detail fetch failed");
        e.to_string()
    })?;
    let fragment = extract_detail(&markup, kind, language, &source.base_url).map_err(|e| {
        warn!(id, lang = language.code(), error = %e, "detail page unusable");
        e.to_string()
    })?;
    if fragment.is_empty() {
        debug!(id, lang = language.code(), "detail page had no fields");
        return Err("no fields extracted".to_string());
    }
    Ok(fragment)
}

fn into_bill(fragment: Fragment) -> Option<BillFragment> {
    match fragment {
        Fragment::Bill(b) => Some(b),
        Fragment::Committee(_) => None,
    }
}

fn into_committee(fragment: Fragment) -> Option<CommitteeFragment> {
    match fragment {
        Fragment::Committee(c) => Some(c),
        Fragment::Bill(_) => None,
    }
}

/// Nepali wins for shared fields, titles and `_en` fields are kept per
/// language, and the status timeline is taken from the English page only.
pub fn merge_bill(
    id: &str,
    chamber: Chamber,
    np: Option<BillFragment>,
    en: Option<BillFragment>,
) -> CanonicalBill {
    let np = np.unwrap_or_default();
    let en = en.unwrap_or_default();

    let status_timeline = en.status_timeline;
    let (current_status, current_status_date) = match status_timeline.last() {
        Some(last) => (Some(last.label.clone()), last.date.clone()),
        None => (None, None),
    };

    CanonicalBill {
        bill_id: id.to_string(),
        chamber,
        title_np: np.title,
        title_en: en.title,
        registration_number: np.registration_number.or(en.registration_number),
        year: np.year.or(en.year),
        sambat: np.sambat.or(en.sambat),
        presenter: np.presenter.or(en.presenter),
        ministry: np.ministry.or(en.ministry),
        session: np.session.or(en.session),
        government_type: np.government_type.or(en.government_type),
        bill_type: np.bill_type.or(en.bill_type),
        category: np.category.or(en.category),
        presenter_en: en.presenter_en,
        ministry_en: en.ministry_en,
        government_type_en: en.government_type_en,
        bill_type_en: en.bill_type_en,
        category_en: en.category_en,
        status_timeline,
        current_status,
        current_status_date,
        resource_link: np.resource_link.or(en.resource_link),
        scraped_at: None,
    }
}

pub fn merge_committee(
    id: &str,
    chamber: Chamber,
    np: Option<CommitteeFragment>,
    en: Option<CommitteeFragment>,
) -> CanonicalCommittee {
    let np = np.unwrap_or_default();
    let en = en.unwrap_or_default();

    CanonicalCommittee {
        committee_id: id.to_string(),
        chamber,
        name_np: np.title,
        name_en: en.title,
        introduction_np: np.introduction,
        introduction_en: en.introduction,
        start_date: np.start_date.or(en.start_date),
        end_date: np.end_date.or(en.end_date),
    }
}
