use std::collections::HashSet;

use tracing::debug;

use crate::config::RecordKind;
use crate::error::ValidationError;
use crate::model::{
    CanonicalBill, CanonicalCommittee, CanonicalRecord, CleanBill, CleanCommittee, CleanRecord,
    CleanStatus, StatusEntry,
};
use crate::normalize::{
    clean_introduction_opt, clean_opt, clean_text, format_date, normalize_name_opt, parse_date_opt,
};

/// Clean every text field, type the dates, check required fields and derive
/// the dedup key. Applying it to [`to_canonical`] of its own output gives the
/// same record back.
pub fn normalize_and_validate(record: CanonicalRecord) -> Result<CleanRecord, ValidationError> {
    match record {
        CanonicalRecord::Bill(b) => clean_bill(b).map(CleanRecord::Bill),
        CanonicalRecord::Committee(c) => clean_committee(c).map(CleanRecord::Committee),
    }
}

fn clean_bill(b: CanonicalBill) -> Result<CleanBill, ValidationError> {
    let registration_number =
        clean_opt(b.registration_number.as_deref()).ok_or_else(|| ValidationError::MissingField {
            kind: "bill",
            id: b.bill_id.clone(),
            field: "registration_number",
        })?;

    let year = clean_opt(b.year.as_deref());
    let sambat = clean_opt(b.sambat.as_deref());
    let dedup_key = format!(
        "{}_{}",
        registration_number,
        sambat.as_deref().or(year.as_deref()).unwrap_or("")
    );

    let status_timeline = b
        .status_timeline
        .iter()
        .map(|s| CleanStatus {
            label: clean_text(&s.label),
            date: parse_date_opt(s.date.as_deref()),
        })
        .filter(|s| !s.label.is_empty())
        .collect();

    Ok(CleanBill {
        bill_id: b.bill_id,
        chamber: b.chamber,
        registration_number,
        title_np: normalize_name_opt(b.title_np.as_deref()),
        title_en: normalize_name_opt(b.title_en.as_deref()),
        year,
        sambat,
        presenter: clean_opt(b.presenter.as_deref()),
        ministry: clean_opt(b.ministry.as_deref()),
        session: clean_opt(b.session.as_deref()),
        government_type: clean_opt(b.government_type.as_deref()),
        bill_type: clean_opt(b.bill_type.as_deref()),
        category: clean_opt(b.category.as_deref()),
        presenter_en: clean_opt(b.presenter_en.as_deref()),
        ministry_en: clean_opt(b.ministry_en.as_deref()),
        government_type_en: clean_opt(b.government_type_en.as_deref()),
        bill_type_en: clean_opt(b.bill_type_en.as_deref()),
        category_en: clean_opt(b.category_en.as_deref()),
        status_timeline,
        current_status: clean_opt(b.current_status.as_deref()),
        current_status_date: parse_date_opt(b.current_status_date.as_deref()),
        resource_link: b.resource_link.map(|l| l.trim().to_string()).filter(|l| !l.is_empty()),
        scraped_at: b.scraped_at,
        dedup_key,
    })
}

fn clean_committee(c: CanonicalCommittee) -> Result<CleanCommittee, ValidationError> {
    let missing = |field| ValidationError::MissingField {
        kind: "committee",
        id: c.committee_id.clone(),
        field,
    };

    let name_en = normalize_name_opt(c.name_en.as_deref());
    let name = normalize_name_opt(c.name_np.as_deref())
        .or_else(|| name_en.clone())
        .ok_or_else(|| missing("name"))?;

    let introduction = clean_introduction_opt(c.introduction_np.as_deref());
    let introduction_en = clean_introduction_opt(c.introduction_en.as_deref());
    if introduction.is_none() && introduction_en.is_none() {
        return Err(missing("introduction"));
    }

    Ok(CleanCommittee {
        dedup_key: name.clone(),
        committee_id: c.committee_id,
        chamber: c.chamber,
        name,
        name_en,
        introduction,
        introduction_en,
        start_date: parse_date_opt(c.start_date.as_deref()),
        end_date: parse_date_opt(c.end_date.as_deref()),
    })
}

/// Back to the unnormalized shape, dates spelled `YYYY-MM-DD`.
pub fn to_canonical(record: &CleanRecord) -> CanonicalRecord {
    match record {
        CleanRecord::Bill(b) => CanonicalRecord::Bill(CanonicalBill {
            bill_id: b.bill_id.clone(),
            chamber: b.chamber,
            title_np: b.title_np.clone(),
            title_en: b.title_en.clone(),
            registration_number: Some(b.registration_number.clone()),
            year: b.year.clone(),
            sambat: b.sambat.clone(),
            presenter: b.presenter.clone(),
            ministry: b.ministry.clone(),
            session: b.session.clone(),
            government_type: b.government_type.clone(),
            bill_type: b.bill_type.clone(),
            category: b.category.clone(),
            presenter_en: b.presenter_en.clone(),
            ministry_en: b.ministry_en.clone(),
            government_type_en: b.government_type_en.clone(),
            bill_type_en: b.bill_type_en.clone(),
            category_en: b.category_en.clone(),
            status_timeline: b
                .status_timeline
                .iter()
                .map(|s| StatusEntry {
                    label: s.label.clone(),
                    date: s.date.map(format_date),
                })
                .collect(),
            current_status: b.current_status.clone(),
            current_status_date: b.current_status_date.map(format_date),
            resource_link: b.resource_link.clone(),
            scraped_at: b.scraped_at,
        }),
        CleanRecord::Committee(c) => CanonicalRecord::Committee(CanonicalCommittee {
            committee_id: c.committee_id.clone(),
            chamber: c.chamber,
            name_np: Some(c.name.clone()),
            name_en: c.name_en.clone(),
            introduction_np: c.introduction.clone(),
            introduction_en: c.introduction_en.clone(),
            start_date: c.start_date.map(format_date),
            end_date: c.end_date.map(format_date),
        }),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deduped {
    pub records: Vec<CleanRecord>,
    pub discarded: usize,
}

/// Keep the first record per `(kind, dedup_key)`, in input order.
pub fn dedup(records: Vec<CleanRecord>) -> Deduped {
    let mut seen: HashSet<(RecordKind, String)> = HashSet::new();
    let mut kept = Vec::with_capacity(records.len());
    let mut discarded = 0;

    for record in records {
        if seen.insert((record.kind(), record.dedup_key().to_string())) {
            kept.push(record);
        } else {
            debug!(
                kind = %record.kind(),
                id = record.entity_id(),
                key = record.dedup_key(),
                "duplicate dropped"
            );
            discarded += 1;
        }
    }
    Deduped { records: kept, discarded }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Chamber;
    use crate::resolve::merge_bill;
    use crate::model::BillFragment;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn raw_bill(id: &str, reg: &str, sambat: &str) -> CanonicalBill {
        let mut b = merge_bill(id, Chamber::HoR, None, None);
        b.registration_number = Some(reg.into());
        b.sambat = Some(sambat.into());
        b
    }

    fn raw_committee(id: &str, name: &str) -> CanonicalCommittee {
        CanonicalCommittee {
            committee_id: id.into(),
            chamber: Chamber::NA,
            name_np: Some(name.into()),
            name_en: Some(" Finance  Committee ".into()),
            introduction_np: Some("परिचय:  यो समिति\u{200b} अर्थ सम्बन्धी हो।".into()),
            introduction_en: None,
            start_date: Some("२०७९/११/०५".into()),
            end_date: Some("null".into()),
        }
    }

    fn clean(record: CanonicalRecord) -> CleanRecord {
        normalize_and_validate(record).unwrap()
    }

    #[test]
    fn bilingual_bill_scenario() {
        let np = BillFragment {
            registration_number: Some("12".into()),
            title: Some("एक".into()),
            ..Default::default()
        };
        let en = BillFragment {
            title: Some("One".into()),
            status_timeline: vec![StatusEntry { label: "Passed".into(), date: Some("2024/03/01".into()) }],
            ..Default::default()
        };
        let merged = merge_bill("A", Chamber::HoR, Some(np), Some(en));
        let CleanRecord::Bill(b) = clean(CanonicalRecord::Bill(merged)) else {
            panic!("expected bill");
        };
        assert_eq!(b.registration_number, "12");
        assert_eq!(b.title_np.as_deref(), Some("एक"));
        assert_eq!(b.title_en.as_deref(), Some("One"));
        assert_eq!(b.current_status.as_deref(), Some("Passed"));
        assert_eq!(b.current_status_date, NaiveDate::from_ymd_opt(2024, 3, 1));
        assert_eq!(b.dedup_key, "12_");
    }

    #[test]
    fn bill_fields_are_cleaned() {
        let mut raw = raw_bill("A", " 12 ", "2081");
        raw.title_np = Some("सहकारी( पहिलो संशोधन )विधेयक,".into());
        raw.presenter = Some("  माननीय\n मन्त्री ".into());
        raw.status_timeline = vec![
            StatusEntry { label: " Registered ".into(), date: Some("05-01-2024".into()) },
            StatusEntry { label: "Sent".into(), date: Some("soon".into()) },
            StatusEntry { label: "\u{200b}".into(), date: Some("2024/01/09".into()) },
        ];
        let CleanRecord::Bill(b) = clean(CanonicalRecord::Bill(raw)) else {
            panic!("expected bill");
        };
        assert_eq!(b.registration_number, "12");
        assert_eq!(b.title_np.as_deref(), Some("सहकारी (पहिलो संशोधन) विधेयक"));
        assert_eq!(b.presenter.as_deref(), Some("माननीय मन्त्री"));
        assert_eq!(b.dedup_key, "12_2081");
        assert_eq!(
            b.status_timeline,
            vec![
                CleanStatus { label: "Registered".into(), date: NaiveDate::from_ymd_opt(2024, 1, 5) },
                CleanStatus { label: "Sent".into(), date: None },
            ]
        );
    }

    #[test]
    fn dedup_key_falls_back_to_year() {
        let mut raw = raw_bill("A", "7", "");
        raw.year = Some("2024".into());
        assert_eq!(clean(CanonicalRecord::Bill(raw)).dedup_key(), "7_2024");
    }

    #[test]
    fn scrape_time_is_carried_through() {
        let mut b = raw_bill("A", "12", "2081");
        let at = chrono::Utc::now();
        b.scraped_at = Some(at);
        let CleanRecord::Bill(c) = clean(CanonicalRecord::Bill(b)) else {
            panic!("expected bill");
        };
        assert_eq!(c.scraped_at, Some(at));
        let CanonicalRecord::Bill(back) = to_canonical(&CleanRecord::Bill(c)) else {
            panic!("expected bill");
        };
        assert_eq!(back.scraped_at, Some(at));
    }

    #[test]
    fn bill_without_registration_is_invalid() {
        let raw = raw_bill("A", " \u{200d} ", "2081");
        assert_eq!(
            normalize_and_validate(CanonicalRecord::Bill(raw)),
            Err(ValidationError::MissingField { kind: "bill", id: "A".into(), field: "registration_number" })
        );
    }

    #[test]
    fn committee_cleaning() {
        let CleanRecord::Committee(c) = clean(CanonicalRecord::Committee(raw_committee("finance", "अर्थ समिति( संघीय )"))) else {
            panic!("expected committee");
        };
        assert_eq!(c.name, "अर्थ समिति (संघीय)");
        assert_eq!(c.dedup_key, c.name);
        assert_eq!(c.name_en.as_deref(), Some("Finance Committee"));
        assert_eq!(c.introduction.as_deref(), Some("यो समिति अर्थ सम्बन्धी हो।"));
        assert_eq!(c.start_date, NaiveDate::from_ymd_opt(2079, 11, 5));
        assert_eq!(c.end_date, None);
    }

    #[test]
    fn committee_requires_name_and_introduction() {
        let mut no_name = raw_committee("x", " ");
        no_name.name_en = None;
        assert!(matches!(
            normalize_and_validate(CanonicalRecord::Committee(no_name)),
            Err(ValidationError::MissingField { field: "name", .. })
        ));

        let mut no_intro = raw_committee("x", "अर्थ समिति");
        no_intro.introduction_np = Some("परिचय:".into());
        assert!(matches!(
            normalize_and_validate(CanonicalRecord::Committee(no_intro)),
            Err(ValidationError::MissingField { field: "introduction", .. })
        ));

        let mut english_only = raw_committee("x", "");
        english_only.introduction_np = None;
        english_only.introduction_en = Some("Oversees finance.".into());
        let CleanRecord::Committee(c) = clean(CanonicalRecord::Committee(english_only)) else {
            panic!("expected committee");
        };
        assert_eq!(c.name, "Finance Committee");
    }

    #[test]
    fn normalization_is_a_fixed_point() {
        let mut bill = raw_bill("A", "12", "२०८१");
        bill.title_en = Some("Cooperatives ( First Amendment )Bill, 2081.".into());
        bill.status_timeline = vec![StatusEntry { label: "Passed".into(), date: Some("01.03.2024".into()) }];
        bill.current_status = Some("Passed".into());
        bill.current_status_date = Some("01.03.2024".into());
        bill.resource_link = Some(" https://hr.parliament.gov.np/uploads/a.pdf ".into());

        let records = [
            CanonicalRecord::Bill(bill),
            CanonicalRecord::Committee(raw_committee("finance", "अर्थ  समिति")),
        ];
        for raw in records {
            let once = clean(raw);
            let twice = clean(to_canonical(&once));
            assert_eq!(twice, once);
        }
    }

    #[test]
    fn duplicate_key_keeps_first() {
        let first = clean(CanonicalRecord::Bill(raw_bill("A", "12", "2081")));
        let second = clean(CanonicalRecord::Bill(raw_bill("B", "12", "2081")));
        let out = dedup(vec![first.clone(), second]);
        assert_eq!(out.records, vec![first]);
        assert_eq!(out.discarded, 1);
    }

    #[test]
    fn dedup_is_per_kind() {
        let bill = clean(CanonicalRecord::Bill(raw_bill("A", "12", "2081")));
        let mut committee = clean(CanonicalRecord::Committee(raw_committee("c", "x")));
        if let CleanRecord::Committee(c) = &mut committee {
            c.dedup_key = "12_2081".into();
        }
        assert_eq!(dedup(vec![bill, committee]).discarded, 0);
    }

    proptest! {
        #[test]
        fn dedup_is_idempotent_and_ordered(keys in proptest::collection::vec(0u8..6, 0..40)) {
            let records: Vec<CleanRecord> = keys
                .iter()
                .enumerate()
                .map(|(i, k)| clean(CanonicalRecord::Bill(raw_bill(&format!("id{}", i), &k.to_string(), "2081"))))
                .collect();

            let once = dedup(records.clone());
            let twice = dedup(once.records.clone());
            prop_assert_eq!(&twice.records, &once.records);
            prop_assert_eq!(twice.discarded, 0);
            prop_assert_eq!(once.records.len() + once.discarded, records.len());

            // survivors are the first occurrences, in input order
            let mut seen = HashSet::new();
            let expected: Vec<_> = records.into_iter().filter(|r| seen.insert(r.dedup_key().to_string())).collect();
            prop_assert_eq!(once.records, expected);
        }
    }
}
