use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{params, Connection};

use crate::model::CleanRecord;
use crate::normalize::format_date;

/// SQLite sink for cleaned batches.
pub struct Store {
    conn: Connection,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StoreCounts {
    pub bills: usize,
    pub committees: usize,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
        }
        let conn = Connection::open(path).with_context(|| format!("opening {}", path.display()))?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        let store = Store { conn };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS bills (
                bill_id             TEXT PRIMARY KEY,
                chamber             TEXT NOT NULL CHECK(chamber IN ('HoR','NA')),
                registration_number TEXT NOT NULL,
                title_np            TEXT,
                title_en            TEXT,
                year                TEXT,
                sambat              TEXT,
                presenter           TEXT,
                ministry            TEXT,
                session             TEXT,
                government_type     TEXT,
                bill_type           TEXT,
                category            TEXT,
                presenter_en        TEXT,
                ministry_en         TEXT,
                government_type_en  TEXT,
                bill_type_en        TEXT,
                category_en         TEXT,
                status_timeline     TEXT NOT NULL DEFAULT '[]',
                current_status      TEXT,
                current_status_date TEXT,
                resource_link       TEXT,
                dedup_key           TEXT NOT NULL,
                scraped_at          TEXT,
                updated_at          TEXT NOT NULL DEFAULT (datetime('now'))
            );
            CREATE INDEX IF NOT EXISTS idx_bills_dedup ON bills(dedup_key);

            CREATE TABLE IF NOT EXISTS committees (
                id              INTEGER PRIMARY KEY,
                committee_id    TEXT NOT NULL,
                chamber         TEXT NOT NULL CHECK(chamber IN ('HoR','NA')),
                name            TEXT UNIQUE NOT NULL,
                name_en         TEXT,
                introduction    TEXT,
                introduction_en TEXT,
                start_date      TEXT,
                end_date        TEXT,
                created_at      TEXT NOT NULL DEFAULT (datetime('now')),
                updated_at      TEXT NOT NULL DEFAULT (datetime('now'))
            );
            ",
        )?;
        Ok(())
    }

    /// One transaction for the whole batch. Bills are replaced by `bill_id`,
    /// committees updated in place by `name`.
    pub fn save(&self, records: &[CleanRecord]) -> Result<StoreCounts> {
        let tx = self.conn.unchecked_transaction()?;
        let mut counts = StoreCounts::default();
        {
            let mut b_stmt = tx.prepare(
                "INSERT OR REPLACE INTO bills
                 (bill_id, chamber, registration_number, title_np, title_en, year, sambat,
                  presenter, ministry, session, government_type, bill_type, category,
                  presenter_en, ministry_en, government_type_en, bill_type_en, category_en,
                  status_timeline, current_status, current_status_date, resource_link, dedup_key,
                  scraped_at)
                 VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9,?10,?11,?12,?13,?14,?15,?16,?17,?18,?19,?20,?21,?22,?23,?24)",
            )?;
            let mut c_stmt = tx.prepare(
                "INSERT INTO committees
                 (committee_id, chamber, name, name_en, introduction, introduction_en, start_date, end_date)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                 ON CONFLICT(name) DO UPDATE SET
                    committee_id = excluded.committee_id,
                    chamber = excluded.chamber,
                    name_en = excluded.name_en,
                    introduction = excluded.introduction,
                    introduction_en = excluded.introduction_en,
                    start_date = excluded.start_date,
                    end_date = excluded.end_date,
                    updated_at = datetime('now')",
            )?;

            for record in records {
                match record {
                    CleanRecord::Bill(b) => {
                        let timeline = serde_json::to_string(&b.status_timeline)?;
                        b_stmt.execute(params![
                            b.bill_id, b.chamber.as_str(), b.registration_number, b.title_np, b.title_en,
                            b.year, b.sambat, b.presenter, b.ministry, b.session, b.government_type,
                            b.bill_type, b.category, b.presenter_en, b.ministry_en, b.government_type_en,
                            b.bill_type_en, b.category_en, timeline, b.current_status,
                            b.current_status_date.map(format_date), b.resource_link, b.dedup_key,
                            b.scraped_at.map(|t| t.to_rfc3339()),
                        ])?;
                        counts.bills += 1;
                    }
                    CleanRecord::Committee(c) => {
                        c_stmt.execute(params![
                            c.committee_id, c.chamber.as_str(), c.name, c.name_en, c.introduction,
                            c.introduction_en, c.start_date.map(format_date), c.end_date.map(format_date),
                        ])?;
                        counts.committees += 1;
                    }
                }
            }
        }
        tx.commit()?;
        Ok(counts)
    }

    pub fn counts(&self) -> Result<StoreCounts> {
        let count = |table: &str| -> Result<usize> {
            let n: i64 = self
                .conn
                .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))?;
            Ok(n as usize)
        };
        Ok(StoreCounts {
            bills: count("bills")?,
            committees: count("committees")?,
        })
    }
}
