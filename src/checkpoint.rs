use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;

use crate::model::CleanRecord;

/// `records_YYYYMMDD_HHMMSS.json` inside `dir`.
pub fn default_path(dir: &Path) -> PathBuf {
    dir.join(format!("records_{}.json", Local::now().format("%Y%m%d_%H%M%S")))
}

/// Whole batch as one pretty-printed JSON array.
pub fn write(path: &Path, records: &[CleanRecord]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(records)?;
    fs::write(path, json).with_context(|| format!("writing checkpoint {}", path.display()))?;
    Ok(())
}

pub fn read(path: &Path) -> Result<Vec<CleanRecord>> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading checkpoint {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing checkpoint {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clean::normalize_and_validate;
    use crate::config::Chamber;
    use crate::model::{CanonicalCommittee, CanonicalRecord, StatusEntry};
    use crate::resolve::merge_bill;

    fn batch() -> Vec<CleanRecord> {
        let mut bill = merge_bill("PfzGSahf", Chamber::HoR, None, None);
        bill.registration_number = Some("12".into());
        bill.title_np = Some("सहकारी (पहिलो संशोधन) विधेयक".into());
        bill.status_timeline = vec![StatusEntry { label: "Passed".into(), date: Some("2024/03/01".into()) }];
        bill.current_status_date = Some("2024/03/01".into());

        let committee = CanonicalCommittee {
            committee_id: "finance".into(),
            chamber: Chamber::NA,
            name_np: Some("अर्थ समिति".into()),
            name_en: None,
            introduction_np: Some("अर्थ सम्बन्धी विषय हेर्ने समिति".into()),
            introduction_en: None,
            start_date: None,
            end_date: Some("2080-01-01".into()),
        };

        [CanonicalRecord::Bill(bill), CanonicalRecord::Committee(committee)]
            .into_iter()
            .map(|r| normalize_and_validate(r).unwrap())
            .collect()
    }

    #[test]
    fn write_then_read_is_lossless() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out.json");
        let records = batch();

        write(&path, &records).unwrap();
        assert_eq!(read(&path).unwrap(), records);
    }

    #[test]
    fn json_shape() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        write(&path, &batch()).unwrap();

        let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        let items = value.as_array().unwrap();
        assert_eq!(items[0]["kind"], "bill");
        assert_eq!(items[0]["chamber"], "HoR");
        assert_eq!(items[0]["current_status_date"], "2024-03-01");
        assert_eq!(items[1]["kind"], "committee");
        assert_eq!(items[1]["start_date"], serde_json::Value::Null);
    }

    #[test]
    fn default_name_is_timestamped() {
        let path = default_path(Path::new("data/output"));
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("records_") && name.ends_with(".json"), "{}", name);
        assert_eq!(name.len(), "records_20240301_120000.json".len());
    }

    #[test]
    fn missing_file_is_error() {
        assert!(read(Path::new("/nonexistent/records.json")).is_err());
    }
}
