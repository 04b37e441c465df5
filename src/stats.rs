use std::collections::BTreeMap;

use crate::config::Chamber;
use crate::model::CleanRecord;

/// Counts over one cleaned batch.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchStats {
    pub bills: BTreeMap<Chamber, usize>,
    pub committees: BTreeMap<Chamber, usize>,
    pub government_types: BTreeMap<String, usize>,
    pub bill_types: BTreeMap<String, usize>,
    pub bills_with_status_date: usize,
    pub committees_with_start_date: usize,
    pub committees_dissolved: usize,
}

impl BatchStats {
    pub fn collect(records: &[CleanRecord]) -> Self {
        let mut s = BatchStats::default();
        for record in records {
            match record {
                CleanRecord::Bill(b) => {
                    *s.bills.entry(b.chamber).or_default() += 1;
                    let gov = b.government_type_en.as_ref().or(b.government_type.as_ref());
                    *s.government_types.entry(label(gov)).or_default() += 1;
                    let kind = b.bill_type_en.as_ref().or(b.bill_type.as_ref());
                    *s.bill_types.entry(label(kind)).or_default() += 1;
                    if b.current_status_date.is_some() {
                        s.bills_with_status_date += 1;
                    }
                }
                CleanRecord::Committee(c) => {
                    *s.committees.entry(c.chamber).or_default() += 1;
                    if c.start_date.is_some() {
                        s.committees_with_start_date += 1;
                    }
                    if c.end_date.is_some() {
                        s.committees_dissolved += 1;
                    }
                }
            }
        }
        s
    }

    pub fn print(&self) {
        let total_bills: usize = self.bills.values().sum();
        let total_committees: usize = self.committees.values().sum();

        println!("Bills:      {}", total_bills);
        for (chamber, n) in &self.bills {
            println!("  {:<4} {}", chamber.as_str(), n);
        }
        if total_bills > 0 {
            println!("  with status date: {}", coverage(self.bills_with_status_date, total_bills));
            println!("\n--- Government type ---");
            for (k, n) in &self.government_types {
                println!("  {:<24} {}", k, n);
            }
            println!("\n--- Original/Amendment ---");
            for (k, n) in &self.bill_types {
                println!("  {:<24} {}", k, n);
            }
        }

        println!("\nCommittees: {}", total_committees);
        for (chamber, n) in &self.committees {
            println!("  {:<4} {}", chamber.as_str(), n);
        }
        if total_committees > 0 {
            println!("  with start date:  {}", coverage(self.committees_with_start_date, total_committees));
            println!("  dissolved:        {}", self.committees_dissolved);
        }
    }
}

fn label(value: Option<&String>) -> String {
    value.cloned().unwrap_or_else(|| "(unknown)".to_string())
}

fn coverage(n: usize, total: usize) -> String {
    format!("{} ({:.1}%)", n, n as f64 * 100.0 / total as f64)
}
