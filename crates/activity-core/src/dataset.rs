//! CSV ingestion and read-only record views.
//!
//! The activity log is read once per session. After loading, records are
//! shared behind an `Arc` and only ever borrowed, so independent report passes
//! can run side by side.

use crate::error::{ActivityError, Result};
use crate::types::{ActivityRecord, Category, HeaderConvention, Mood, TimeOfDay};
use chrono::NaiveDate;
use std::collections::HashSet;
use std::io::Read;
use std::ops::Deref;
use std::path::Path;
use std::sync::Arc;

const PERSON: &str = "Person";
const DATE: &str = "Date";
const TIME: &str = "Time";
const ACTIVITY: &str = "Activity";
const MOOD: &str = "How they felt";
const VALUE: &str = "Value to the person";
const DURATION: &str = "Duration in minutes";

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];

/// The loaded activity log.
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Arc<[ActivityRecord]>,
    convention: HeaderConvention,
}

impl Dataset {
    /// Load and validate a CSV file.
    pub fn load(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let dataset = Self::from_reader(file)?;
        tracing::info!(
            "Loaded {} activity records for {} persons from {} ({:?} headers)",
            dataset.len(),
            dataset.persons().len(),
            path.display(),
            dataset.convention
        );
        Ok(dataset)
    }

    /// Parse CSV from any reader. The header row decides the convention.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let columns = Columns::resolve(&headers)?;

        let mut records = Vec::new();
        for row in csv_reader.records() {
            let row = row?;
            let line = row.position().map(|p| p.line()).unwrap_or_default();
            records.push(columns.parse_row(&row, line)?);
        }

        Ok(Self {
            records: records.into(),
            convention: columns.convention,
        })
    }

    /// Wrap records that were built in memory.
    pub fn from_records(records: Vec<ActivityRecord>) -> Self {
        Self {
            records: records.into(),
            convention: HeaderConvention::Current,
        }
    }

    pub fn records(&self) -> &[ActivityRecord] {
        &self.records
    }

    pub fn convention(&self) -> HeaderConvention {
        self.convention
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Borrow every record.
    pub fn view(&self) -> RecordSet<'_> {
        self.records.iter().collect()
    }

    /// Distinct persons in first-appearance order.
    pub fn persons(&self) -> Vec<&str> {
        self.view().persons()
    }
}

/// Column positions for one header row.
struct Columns {
    convention: HeaderConvention,
    person: usize,
    date: usize,
    time: usize,
    activity: usize,
    category: usize,
    mood: usize,
    value: usize,
    duration: usize,
}

impl Columns {
    fn resolve(headers: &csv::StringRecord) -> Result<Self> {
        let find = |name: &str| headers.iter().position(|h| h == name);

        let current = find(HeaderConvention::Current.category_column());
        let legacy = find(HeaderConvention::Legacy.category_column());
        let (convention, category) = match (current, legacy) {
            (Some(idx), None) => (HeaderConvention::Current, idx),
            (None, Some(idx)) => (HeaderConvention::Legacy, idx),
            (Some(_), Some(_)) => {
                return Err(ActivityError::Schema(
                    "both \"Category\" and \"Activity Category\" columns present".into(),
                ))
            }
            (None, None) => {
                return Err(ActivityError::Schema(
                    "missing column \"Category\" (or legacy \"Activity Category\")".into(),
                ))
            }
        };

        let require = |name: &str| {
            find(name).ok_or_else(|| ActivityError::Schema(format!("missing column {name:?}")))
        };

        Ok(Self {
            convention,
            person: require(PERSON)?,
            date: require(DATE)?,
            time: require(TIME)?,
            activity: require(ACTIVITY)?,
            category,
            mood: require(MOOD)?,
            value: require(VALUE)?,
            duration: require(DURATION)?,
        })
    }

    fn parse_row(&self, row: &csv::StringRecord, line: u64) -> Result<ActivityRecord> {
        let field = |idx: usize| row.get(idx).unwrap_or_default();

        let person = field(self.person);
        if person.is_empty() {
            return Err(ActivityError::InvalidRow {
                line,
                message: "empty Person".into(),
            });
        }

        let date = parse_date(field(self.date)).ok_or_else(|| ActivityError::InvalidRow {
            line,
            message: format!("unrecognised date {:?}", field(self.date)),
        })?;

        let duration_minutes =
            field(self.duration)
                .parse::<u32>()
                .map_err(|_| ActivityError::InvalidRow {
                    line,
                    message: format!(
                        "duration {:?} is not a non-negative whole number of minutes",
                        field(self.duration)
                    ),
                })?;

        Ok(ActivityRecord {
            person: person.to_string(),
            date,
            time: TimeOfDay::from_label(field(self.time))?,
            activity: field(self.activity).to_string(),
            category: self.convention.parse_category(field(self.category))?,
            mood: Mood::from_label(field(self.mood))?,
            value: field(self.value).to_string(),
            duration_minutes,
        })
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

/// A borrowed, read-only selection of records.
#[derive(Debug, Clone, Default)]
pub struct RecordSet<'a> {
    rows: Vec<&'a ActivityRecord>,
}

impl<'a> RecordSet<'a> {
    pub fn filter(&self, mut predicate: impl FnMut(&ActivityRecord) -> bool) -> Self {
        self.rows.iter().copied().filter(|r| predicate(r)).collect()
    }

    pub fn for_person(&self, person: &str) -> Self {
        self.filter(|r| r.person == person)
    }

    pub fn in_category(&self, category: Category) -> Self {
        self.filter(|r| r.category == category)
    }

    pub fn excluding(&self, categories: &[Category]) -> Self {
        self.filter(|r| !categories.contains(&r.category))
    }

    /// Distinct persons in first-appearance order.
    pub fn persons(&self) -> Vec<&'a str> {
        let mut seen = HashSet::new();
        self.rows
            .iter()
            .map(|r| r.person.as_str())
            .filter(|p| seen.insert(*p))
            .collect()
    }

    pub fn person_count(&self) -> usize {
        self.rows.iter().map(|r| r.person.as_str()).collect::<HashSet<_>>().len()
    }

    /// Number of distinct calendar dates.
    pub fn day_count(&self) -> usize {
        self.rows.iter().map(|r| r.date).collect::<HashSet<_>>().len()
    }
}

impl<'a> Deref for RecordSet<'a> {
    type Target = [&'a ActivityRecord];

    fn deref(&self) -> &Self::Target {
        &self.rows
    }
}

impl<'a> FromIterator<&'a ActivityRecord> for RecordSet<'a> {
    fn from_iter<I: IntoIterator<Item = &'a ActivityRecord>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}
