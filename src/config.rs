use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use clap::ValueEnum;
use config::Config;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ConfigError;

pub const HOR_BASE_URL: &str = "https://hr.parliament.gov.np";
pub const NA_BASE_URL: &str = "https://na.parliament.gov.np";

/// Parliamentary chamber publishing a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ValueEnum)]
pub enum Chamber {
    #[serde(rename = "HoR")]
    #[value(name = "hor")]
    HoR,
    #[serde(rename = "NA")]
    #[value(name = "na")]
    NA,
}

impl Chamber {
    pub const ALL: [Chamber; 2] = [Chamber::HoR, Chamber::NA];

    pub fn as_str(self) -> &'static str {
        match self {
            Chamber::HoR => "HoR",
            Chamber::NA => "NA",
        }
    }
}

impl fmt::Display for Chamber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Bills,
    Committees,
}

impl RecordKind {
    pub const ALL: [RecordKind; 2] = [RecordKind::Bills, RecordKind::Committees];

    pub fn as_str(self) -> &'static str {
        match self {
            RecordKind::Bills => "bills",
            RecordKind::Committees => "committees",
        }
    }

    /// Request pacing for this kind of listing. Fixed: the sources start
    /// refusing connections when crawled faster than this.
    pub fn pacing(self) -> Pacing {
        match self {
            RecordKind::Bills => Pacing {
                list_interval: Duration::from_millis(500),
                entity_interval: Duration::from_millis(500),
            },
            RecordKind::Committees => Pacing {
                list_interval: Duration::from_millis(1500),
                entity_interval: Duration::from_millis(1500),
            },
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Page language. Nepali pages are the primary source, English the secondary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Nepali,
    English,
}

impl Language {
    pub fn code(self) -> &'static str {
        match self {
            Language::Nepali => "np",
            Language::English => "en",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    pub list_interval: Duration,
    pub entity_interval: Duration,
}

/// One chamber's website.
#[derive(Debug, Clone)]
pub struct Source {
    pub chamber: Chamber,
    pub base_url: Url,
}

impl Source {
    pub fn new(chamber: Chamber, base_url: &str) -> Result<Self, ConfigError> {
        let base_url = Url::parse(base_url)
            .ok()
            .filter(|u| u.scheme() == "http" || u.scheme() == "https")
            .ok_or_else(|| ConfigError::BaseUrl {
                chamber: chamber.as_str(),
                url: base_url.to_string(),
            })?;
        Ok(Source { chamber, base_url })
    }

    fn root(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    pub fn list_url(&self, kind: RecordKind, page: u32) -> String {
        match kind {
            RecordKind::Bills => format!("{}/np/bills?type=reg&ref=BILL&page={}", self.root(), page),
            RecordKind::Committees => format!("{}/np/committees?page={}", self.root(), page),
        }
    }

    pub fn detail_url(&self, kind: RecordKind, language: Language, id: &str) -> String {
        format!("{}/{}/{}/{}", self.root(), language.code(), kind.as_str(), id)
    }
}

/// Run settings: defaults, then `parliament.toml`, then `PARLIAMENT_*` env vars.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub output_dir: PathBuf,
    pub db_path: Option<PathBuf>,
    pub hor_base_url: String,
    pub na_base_url: String,
    pub timeout_secs: u64,
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .set_default("output_dir", "data/output")?
            .set_default("hor_base_url", HOR_BASE_URL)?
            .set_default("na_base_url", NA_BASE_URL)?
            .set_default("timeout_secs", 30)?
            .add_source(config::File::with_name("parliament").required(false))
            .add_source(config::Environment::with_prefix("PARLIAMENT"))
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    pub fn source(&self, chamber: Chamber) -> Result<Source, ConfigError> {
        match chamber {
            Chamber::HoR => Source::new(chamber, &self.hor_base_url),
            Chamber::NA => Source::new(chamber, &self.na_base_url),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Creates the output directory up front so a bad location fails the run
    /// before any page is fetched.
    pub fn ensure_output_dir(&self) -> Result<(), ConfigError> {
        std::fs::create_dir_all(&self.output_dir).map_err(|source| ConfigError::OutputDir {
            path: self.output_dir.display().to_string(),
            source,
        })
    }

    pub fn require_db_path(&self) -> Result<PathBuf, ConfigError> {
        self.db_path.clone().ok_or(ConfigError::MissingDatabase)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_urls() {
        let hor = Source::new(Chamber::HoR, HOR_BASE_URL).unwrap();
        assert_eq!(
            hor.list_url(RecordKind::Bills, 3),
            "https://hr.parliament.gov.np/np/bills?type=reg&ref=BILL&page=3"
        );
        let na = Source::new(Chamber::NA, "https://na.parliament.gov.np/").unwrap();
        assert_eq!(
            na.list_url(RecordKind::Committees, 1),
            "https://na.parliament.gov.np/np/committees?page=1"
        );
    }

    #[test]
    fn detail_urls() {
        let hor = Source::new(Chamber::HoR, HOR_BASE_URL).unwrap();
        assert_eq!(
            hor.detail_url(RecordKind::Bills, Language::English, "PfzGSahf"),
            "https://hr.parliament.gov.np/en/bills/PfzGSahf"
        );
        assert_eq!(
            hor.detail_url(RecordKind::Committees, Language::Nepali, "finance"),
            "https://hr.parliament.gov.np/np/committees/finance"
        );
    }

    #[test]
    fn rejects_bad_base_url() {
        assert!(matches!(
            Source::new(Chamber::NA, "not a url"),
            Err(ConfigError::BaseUrl { chamber: "NA", .. })
        ));
        assert!(Source::new(Chamber::NA, "ftp://na.parliament.gov.np").is_err());
    }

    #[test]
    fn missing_db_path_is_config_error() {
        let settings = Settings {
            output_dir: PathBuf::from("data/output"),
            db_path: None,
            hor_base_url: HOR_BASE_URL.into(),
            na_base_url: NA_BASE_URL.into(),
            timeout_secs: 30,
        };
        assert!(matches!(settings.require_db_path(), Err(ConfigError::MissingDatabase)));
    }
}
