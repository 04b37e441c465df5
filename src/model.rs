use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{Chamber, RecordKind};

// ── Fragments: one language, one entity ──

/// Keys a bill detail page can expose in its info tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BillField {
    RegistrationNumber,
    Year,
    Sambat,
    Presenter,
    Ministry,
    Session,
    GovernmentType,
    BillType,
    Category,
    PresenterEn,
    MinistryEn,
    GovernmentTypeEn,
    BillTypeEn,
    CategoryEn,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BillFragment {
    pub title: Option<String>,
    pub registration_number: Option<String>,
    pub year: Option<String>,
    pub sambat: Option<String>,
    pub presenter: Option<String>,
    pub ministry: Option<String>,
    pub session: Option<String>,
    pub government_type: Option<String>,
    pub bill_type: Option<String>,
    pub category: Option<String>,
    pub presenter_en: Option<String>,
    pub ministry_en: Option<String>,
    pub government_type_en: Option<String>,
    pub bill_type_en: Option<String>,
    pub category_en: Option<String>,
    pub status_timeline: Vec<StatusEntry>,
    pub resource_link: Option<String>,
}

impl BillFragment {
    /// Later values for the same key overwrite earlier ones, like a dict.
    pub fn set(&mut self, field: BillField, value: String) {
        let slot = match field {
            BillField::RegistrationNumber => &mut self.registration_number,
            BillField::Year => &mut self.year,
            BillField::Sambat => &mut self.sambat,
            BillField::Presenter => &mut self.presenter,
            BillField::Ministry => &mut self.ministry,
            BillField::Session => &mut self.session,
            BillField::GovernmentType => &mut self.government_type,
            BillField::BillType => &mut self.bill_type,
            BillField::Category => &mut self.category,
            BillField::PresenterEn => &mut self.presenter_en,
            BillField::MinistryEn => &mut self.ministry_en,
            BillField::GovernmentTypeEn => &mut self.government_type_en,
            BillField::BillTypeEn => &mut self.bill_type_en,
            BillField::CategoryEn => &mut self.category_en,
        };
        *slot = Some(value);
    }

    pub fn is_empty(&self) -> bool {
        *self == BillFragment::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitteeField {
    StartDate,
    EndDate,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitteeFragment {
    pub title: Option<String>,
    pub introduction: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl CommitteeFragment {
    pub fn set(&mut self, field: CommitteeField, value: String) {
        match field {
            CommitteeField::StartDate => self.start_date = Some(value),
            CommitteeField::EndDate => self.end_date = Some(value),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == CommitteeFragment::default()
    }
}

/// One column of the status table: stage label and the date it was reached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEntry {
    pub label: String,
    pub date: Option<String>,
}

// ── Canonical: both languages merged, not yet normalized ──

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalBill {
    pub bill_id: String,
    pub chamber: Chamber,
    pub title_np: Option<String>,
    pub title_en: Option<String>,
    pub registration_number: Option<String>,
    pub year: Option<String>,
    pub sambat: Option<String>,
    pub presenter: Option<String>,
    pub ministry: Option<String>,
    pub session: Option<String>,
    pub government_type: Option<String>,
    pub bill_type: Option<String>,
    pub category: Option<String>,
    pub presenter_en: Option<String>,
    pub ministry_en: Option<String>,
    pub government_type_en: Option<String>,
    pub bill_type_en: Option<String>,
    pub category_en: Option<String>,
    pub status_timeline: Vec<StatusEntry>,
    pub current_status: Option<String>,
    pub current_status_date: Option<String>,
    pub resource_link: Option<String>,
    #[serde(default)]
    pub scraped_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalCommittee {
    pub committee_id: String,
    pub chamber: Chamber,
    pub name_np: Option<String>,
    pub name_en: Option<String>,
    pub introduction_np: Option<String>,
    pub introduction_en: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CanonicalRecord {
    Bill(CanonicalBill),
    Committee(CanonicalCommittee),
}

// ── Clean: normalized, validated, keyed ──

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanStatus {
    pub label: String,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanBill {
    pub bill_id: String,
    pub chamber: Chamber,
    pub registration_number: String,
    pub title_np: Option<String>,
    pub title_en: Option<String>,
    pub year: Option<String>,
    pub sambat: Option<String>,
    pub presenter: Option<String>,
    pub ministry: Option<String>,
    pub session: Option<String>,
    pub government_type: Option<String>,
    pub bill_type: Option<String>,
    pub category: Option<String>,
    pub presenter_en: Option<String>,
    pub ministry_en: Option<String>,
    pub government_type_en: Option<String>,
    pub bill_type_en: Option<String>,
    pub category_en: Option<String>,
    pub status_timeline: Vec<CleanStatus>,
    pub current_status: Option<String>,
    pub current_status_date: Option<NaiveDate>,
    pub resource_link: Option<String>,
    #[serde(default)]
    pub scraped_at: Option<DateTime<Utc>>,
    pub dedup_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanCommittee {
    pub committee_id: String,
    pub chamber: Chamber,
    pub name: String,
    pub name_en: Option<String>,
    pub introduction: Option<String>,
    pub introduction_en: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub dedup_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CleanRecord {
    Bill(CleanBill),
    Committee(CleanCommittee),
}

impl CleanRecord {
    pub fn kind(&self) -> RecordKind {
        match self {
            CleanRecord::Bill(_) => RecordKind::Bills,
            CleanRecord::Committee(_) => RecordKind::Committees,
        }
    }

    pub fn chamber(&self) -> Chamber {
        match self {
            CleanRecord::Bill(b) => b.chamber,
            CleanRecord::Committee(c) => c.chamber,
        }
    }

    pub fn entity_id(&self) -> &str {
        match self {
            CleanRecord::Bill(b) => &b.bill_id,
            CleanRecord::Committee(c) => &c.committee_id,
        }
    }

    pub fn dedup_key(&self) -> &str {
        match self {
            CleanRecord::Bill(b) => &b.dedup_key,
            CleanRecord::Committee(c) => &c.dedup_key,
        }
    }
}
