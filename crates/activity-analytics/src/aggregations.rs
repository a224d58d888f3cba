//! Grouped reductions over activity records.
//!
//! Every function here is a pure function of its inputs: no caching, no
//! retained state, and no mutation of the records. Ordinal mapping of the
//! value field happens through [`Field::ValueToPerson`] at projection time.

use activity_core::{
    ActivityError, ActivityRecord, Category, Mood, OrdinalScale, RecordSet, Result, TieBreak,
    TimeOfDay,
};
use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::OnceLock;

/// Numeric projection of a record.
#[derive(Debug, Clone, Copy)]
pub enum Field<'s> {
    DurationMinutes,
    /// "Value to the person" mapped through an ordinal scale.
    ValueToPerson(&'s OrdinalScale),
}

impl Field<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            Field::DurationMinutes => "Duration in minutes",
            Field::ValueToPerson(_) => "Value to the person",
        }
    }

    pub fn project(&self, record: &ActivityRecord) -> Result<f64> {
        match self {
            Field::DurationMinutes => Ok(f64::from(record.duration_minutes)),
            Field::ValueToPerson(scale) => scale.ordinal(&record.value).map(f64::from),
        }
    }
}

/// A column records can be grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Dimension {
    Person,
    Date,
    TimeOfDay,
    Category,
    Mood,
}

impl std::str::FromStr for Dimension {
    type Err = ActivityError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "person" => Ok(Dimension::Person),
            "date" => Ok(Dimension::Date),
            "time" | "time-of-day" => Ok(Dimension::TimeOfDay),
            "category" => Ok(Dimension::Category),
            "mood" | "feeling" => Ok(Dimension::Mood),
            other => Err(ActivityError::Config(format!(
                "unknown dimension {other:?} (expected person, date, time, category, mood)"
            ))),
        }
    }
}

/// One component of a grouping key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(untagged)]
pub enum KeyPart {
    Person(String),
    Date(NaiveDate),
    Time(TimeOfDay),
    Category(Category),
    Mood(Mood),
}

impl KeyPart {
    fn of(dimension: Dimension, record: &ActivityRecord) -> Self {
        match dimension {
            Dimension::Person => KeyPart::Person(record.person.clone()),
            Dimension::Date => KeyPart::Date(record.date),
            Dimension::TimeOfDay => KeyPart::Time(record.time),
            Dimension::Category => KeyPart::Category(record.category),
            Dimension::Mood => KeyPart::Mood(record.mood),
        }
    }
}

impl fmt::Display for KeyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyPart::Person(p) => f.write_str(p),
            KeyPart::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            KeyPart::Time(t) => t.fmt(f),
            KeyPart::Category(c) => c.fmt(f),
            KeyPart::Mood(m) => m.fmt(f),
        }
    }
}

/// Grouping-key tuple, ordered part by part.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct GroupKey(pub Vec<KeyPart>);

impl GroupKey {
    pub fn of(dimensions: &[Dimension], record: &ActivityRecord) -> Self {
        Self(dimensions.iter().map(|d| KeyPart::of(*d, record)).collect())
    }

    /// The category component, if the key has one.
    pub fn category(&self) -> Option<Category> {
        self.0.iter().find_map(|p| match p {
            KeyPart::Category(c) => Some(*c),
            _ => None,
        })
    }

    pub fn time(&self) -> Option<TimeOfDay> {
        self.0.iter().find_map(|p| match p {
            KeyPart::Time(t) => Some(*t),
            _ => None,
        })
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, part) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" / ")?;
            }
            part.fmt(f)?;
        }
        Ok(())
    }
}

/// Reduced values for one group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    pub count: usize,
    pub sum: f64,
    pub mean: f64,
    /// Most frequent mood in the group.
    pub mode: Mood,
    pub mode_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateRow {
    pub key: GroupKey,
    #[serde(flatten)]
    pub summary: GroupSummary,
}

/// Derived, read-only aggregate keyed by grouping-key tuple.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateTable {
    pub dimensions: Vec<Dimension>,
    pub field: &'static str,
    /// Rows in key order.
    pub rows: Vec<AggregateRow>,
}

impl AggregateTable {
    pub fn get(&self, key: &GroupKey) -> Option<&GroupSummary> {
        self.rows
            .binary_search_by(|row| row.key.cmp(key))
            .ok()
            .map(|idx| &self.rows[idx].summary)
    }
}

/// Winning mood of a group and how many records had it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MoodTally {
    pub mood: Mood,
    pub count: usize,
}

/// Records of each group, tagged with their input position.
type Groups<'r> = BTreeMap<GroupKey, Vec<(usize, &'r ActivityRecord)>>;

fn group<'r>(records: &[&'r ActivityRecord], dimensions: &[Dimension]) -> Groups<'r> {
    let mut groups: Groups<'r> = BTreeMap::new();
    for (idx, record) in records.iter().enumerate() {
        groups
            .entry(GroupKey::of(dimensions, record))
            .or_default()
            .push((idx, *record));
    }
    groups
}

fn mood_mode(rows: &[(usize, &ActivityRecord)], tie_break: TieBreak) -> Option<MoodTally> {
    let mut tallies: Vec<(Mood, usize, usize)> = Vec::new();
    for (idx, record) in rows {
        match tallies.iter_mut().find(|(m, _, _)| *m == record.mood) {
            Some(entry) => entry.1 += 1,
            None => tallies.push((record.mood, 1, *idx)),
        }
    }
    tie_break
        .pick(&tallies)
        .map(|(mood, count)| MoodTally { mood, count })
}

fn require_records(records: &[&ActivityRecord], group: &str) -> Result<()> {
    if records.is_empty() {
        Err(ActivityError::EmptyGroup {
            group: group.to_string(),
        })
    } else {
        Ok(())
    }
}

/// Full count/sum/mean/mode table over the given key tuple.
pub fn summarize(
    records: &[&ActivityRecord],
    dimensions: &[Dimension],
    field: Field<'_>,
    tie_break: TieBreak,
) -> Result<AggregateTable> {
    require_records(records, "summary")?;

    let mut rows = Vec::new();
    for (key, members) in group(records, dimensions) {
        let mut sum = 0.0;
        for (_, record) in &members {
            sum += field.project(record)?;
        }
        let count = members.len();
        // Groups are never empty, so the mode always exists.
        let Some(mode) = mood_mode(&members, tie_break) else {
            continue;
        };
        rows.push(AggregateRow {
            key,
            summary: GroupSummary {
                count,
                sum,
                mean: sum / count as f64,
                mode: mode.mood,
                mode_count: mode.count,
            },
        });
    }

    tracing::debug!(
        "Summarized {} records into {} groups by {:?} ({})",
        records.len(),
        rows.len(),
        dimensions,
        field.name()
    );

    Ok(AggregateTable {
        dimensions: dimensions.to_vec(),
        field: field.name(),
        rows,
    })
}

/// Sum of `field` per group. Groups without records are absent.
pub fn sum_by(
    records: &[&ActivityRecord],
    dimensions: &[Dimension],
    field: Field<'_>,
) -> Result<BTreeMap<GroupKey, f64>> {
    let mut sums = BTreeMap::new();
    for record in records {
        *sums.entry(GroupKey::of(dimensions, record)).or_insert(0.0) += field.project(record)?;
    }
    Ok(sums)
}

/// Arithmetic mean of `field` per group.
pub fn mean_by(
    records: &[&ActivityRecord],
    dimensions: &[Dimension],
    field: Field<'_>,
) -> Result<BTreeMap<GroupKey, f64>> {
    require_records(records, "mean")?;

    let mut acc: BTreeMap<GroupKey, (f64, usize)> = BTreeMap::new();
    for record in records {
        let entry = acc.entry(GroupKey::of(dimensions, record)).or_insert((0.0, 0));
        entry.0 += field.project(record)?;
        entry.1 += 1;
    }
    Ok(acc
        .into_iter()
        .map(|(key, (sum, count))| (key, sum / count as f64))
        .collect())
}

/// Number of records per group.
pub fn count_by(
    records: &[&ActivityRecord],
    dimensions: &[Dimension],
) -> BTreeMap<GroupKey, usize> {
    let mut counts = BTreeMap::new();
    for record in records {
        *counts.entry(GroupKey::of(dimensions, record)).or_insert(0) += 1;
    }
    counts
}

/// Sum of `field` per category. Categories with no records are absent and
/// should be read as zero.
pub fn category_totals(
    records: &[&ActivityRecord],
    field: Field<'_>,
) -> Result<BTreeMap<Category, f64>> {
    let mut totals = BTreeMap::new();
    for record in records {
        *totals.entry(record.category).or_insert(0.0) += field.project(record)?;
    }
    Ok(totals)
}

/// Mean of `field` per category. Fails with `EmptyGroup` on an empty input.
pub fn category_mean(
    records: &[&ActivityRecord],
    field: Field<'_>,
) -> Result<BTreeMap<Category, f64>> {
    require_records(records, "category mean")?;

    let mut acc: BTreeMap<Category, (f64, usize)> = BTreeMap::new();
    for record in records {
        let entry = acc.entry(record.category).or_insert((0.0, 0));
        entry.0 += field.project(record)?;
        entry.1 += 1;
    }
    Ok(acc
        .into_iter()
        .map(|(category, (sum, count))| (category, sum / count as f64))
        .collect())
}

/// Mean of `field` over one category's records.
pub fn mean_for_category(
    records: &[&ActivityRecord],
    category: Category,
    field: Field<'_>,
) -> Result<f64> {
    let mut sum = 0.0;
    let mut count = 0usize;
    for record in records.iter().filter(|r| r.category == category) {
        sum += field.project(record)?;
        count += 1;
    }
    if count == 0 {
        return Err(ActivityError::EmptyGroup {
            group: category.label().to_string(),
        });
    }
    Ok(sum / count as f64)
}

/// Number of records per category.
pub fn category_counts(records: &[&ActivityRecord]) -> BTreeMap<Category, usize> {
    let mut counts = BTreeMap::new();
    for record in records {
        *counts.entry(record.category).or_insert(0) += 1;
    }
    counts
}

/// The dominant mood of each group.
pub fn most_frequent_feeling(
    records: &[&ActivityRecord],
    group_by: &[Dimension],
    tie_break: TieBreak,
) -> BTreeMap<GroupKey, MoodTally> {
    group(records, group_by)
        .into_iter()
        .filter_map(|(key, members)| mood_mode(&members, tie_break).map(|tally| (key, tally)))
        .collect()
}

/// Record count for every (group, mood) pair that occurs.
pub fn mood_counts(
    records: &[&ActivityRecord],
    group_by: &[Dimension],
) -> BTreeMap<(GroupKey, Mood), usize> {
    let mut counts = BTreeMap::new();
    for record in records {
        *counts
            .entry((GroupKey::of(group_by, record), record.mood))
            .or_insert(0) += 1;
    }
    counts
}

/// Minutes per person per day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DailyShare {
    pub minutes_per_day: f64,
}

impl DailyShare {
    pub fn hours(&self) -> u64 {
        (self.minutes_per_day / 60.0).floor() as u64
    }

    pub fn minutes(&self) -> u64 {
        (self.minutes_per_day % 60.0).floor() as u64
    }
}

impl fmt::Display for DailyShare {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_minutes(self.minutes_per_day))
    }
}

/// `total_minutes / person_count / day_count`.
pub fn normalized_per_day(
    total_minutes: f64,
    person_count: usize,
    day_count: usize,
) -> Result<DailyShare> {
    if person_count == 0 {
        return Err(ActivityError::InvalidDivisor {
            divisor: "person count",
        });
    }
    if day_count == 0 {
        return Err(ActivityError::InvalidDivisor {
            divisor: "day count",
        });
    }
    Ok(DailyShare {
        minutes_per_day: total_minutes / person_count as f64 / day_count as f64,
    })
}

/// Average daily time per person for the `n` categories with the most
/// total minutes.
pub fn daily_time_by_category(
    records: &RecordSet<'_>,
    n: usize,
) -> Result<Vec<(Category, DailyShare)>> {
    let persons = records.person_count();
    let days = records.day_count();

    let totals = category_totals(records, Field::DurationMinutes)?;
    top_n(&totals, n, SortOrder::Descending)
        .into_iter()
        .map(|(category, total)| Ok((category, normalized_per_day(total, persons, days)?)))
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Descending,
    Ascending,
}

/// The `n` largest (or smallest) entries. Ties keep key order; `n` beyond the
/// mapping size returns every entry.
pub fn top_n<K, V>(mapping: &BTreeMap<K, V>, n: usize, order: SortOrder) -> Vec<(K, V)>
where
    K: Clone + Ord,
    V: Copy + PartialOrd,
{
    let mut entries: Vec<(K, V)> = mapping.iter().map(|(k, v)| (k.clone(), *v)).collect();
    // Stable sort: equal values stay in key order.
    entries.sort_by(|a, b| {
        let ord = a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal);
        match order {
            SortOrder::Descending => ord.reverse(),
            SortOrder::Ascending => ord,
        }
    });
    entries.truncate(n);
    entries
}

/// Each value as a percentage of the mapping's total.
pub fn share_percentages<K>(mapping: &BTreeMap<K, f64>) -> Result<BTreeMap<K, f64>>
where
    K: Clone + Ord,
{
    let total: f64 = mapping.values().sum();
    if total == 0.0 {
        return Err(ActivityError::InvalidDivisor { divisor: "total" });
    }
    Ok(mapping
        .iter()
        .map(|(k, v)| (k.clone(), v / total * 100.0))
        .collect())
}

/// Largest and smallest entries of a mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct Extremes<K, V> {
    pub max: (K, V),
    pub min: (K, V),
}

/// Argmax and argmin. On ties the first entry in key order wins.
pub fn extremes<K, V>(mapping: &BTreeMap<K, V>) -> Option<Extremes<K, V>>
where
    K: Clone + Ord,
    V: Copy + PartialOrd,
{
    let mut iter = mapping.iter();
    let (first_key, first_value) = iter.next()?;
    let mut max = (first_key, *first_value);
    let mut min = (first_key, *first_value);
    for (key, value) in iter {
        if *value > max.1 {
            max = (key, *value);
        }
        if *value < min.1 {
            min = (key, *value);
        }
    }
    Some(Extremes {
        max: (max.0.clone(), max.1),
        min: (min.0.clone(), min.1),
    })
}

const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "at", "for", "from", "in", "of", "on", "the", "to", "with",
];

fn word_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\w[\w'-]+").expect("valid word regex"))
}

/// Word frequencies of one category's activity labels, most frequent first.
/// Ties are ordered alphabetically.
pub fn activity_terms(
    records: &RecordSet<'_>,
    category: Category,
    limit: usize,
) -> Vec<(String, usize)> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for record in records.in_category(category).iter() {
        for word in word_pattern().find_iter(&record.activity) {
            let word = word.as_str().to_lowercase();
            if STOP_WORDS.contains(&word.as_str()) {
                continue;
            }
            *counts.entry(word).or_insert(0) += 1;
        }
    }

    let mut terms: Vec<(String, usize)> = counts.into_iter().collect();
    terms.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    terms.truncate(limit);
    terms
}

/// Format minutes as "H hr M min" / "H hrs M min", both parts floored.
pub fn format_minutes(minutes: f64) -> String {
    let hours = (minutes / 60.0).floor() as u64;
    let rem = (minutes % 60.0).floor() as u64;
    let unit = if hours == 1 { "hr" } else { "hrs" };
    format!("{} {} {} min", hours, unit, rem)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 10, d).unwrap()
    }

    fn rec(person: &str, d: u32, category: Category, minutes: u32) -> ActivityRecord {
        ActivityRecord::new(person, day(d), category, minutes)
    }

    fn sample() -> Vec<ActivityRecord> {
        vec![
            rec("Mark", 10, Category::Sleeping, 420)
                .with_mood(Mood::Medium)
                .with_value("High"),
            rec("Mark", 10, Category::Leisure, 90)
                .with_mood(Mood::High)
                .with_value("Medium")
                .with_activity("Watch Netflix")
                .with_time(TimeOfDay::Evening),
            rec("Mark", 11, Category::Leisure, 30)
                .with_mood(Mood::High)
                .with_value("Low")
                .with_activity("Watch TikTok videos")
                .with_time(TimeOfDay::Night),
            rec("Hannah", 10, Category::Work, 120)
                .with_mood(Mood::Low)
                .with_value("High")
                .with_activity("Do assignments")
                .with_time(TimeOfDay::Afternoon),
            rec("Hannah", 11, Category::Sleeping, 480)
                .with_mood(Mood::MediumHigh)
                .with_value("High"),
            rec("Hannah", 11, Category::Leisure, 60)
                .with_mood(Mood::Medium)
                .with_value("Medium")
                .with_activity("Read a book")
                .with_time(TimeOfDay::Night),
        ]
    }

    fn refs(records: &[ActivityRecord]) -> Vec<&ActivityRecord> {
        records.iter().collect()
    }

    #[test]
    fn test_category_totals_conserve_sum() {
        let records = sample();
        let refs = refs(&records);
        let totals = category_totals(&refs, Field::DurationMinutes).unwrap();

        let grand: f64 = records.iter().map(|r| f64::from(r.duration_minutes)).sum();
        assert_eq!(totals.values().sum::<f64>(), grand);
        assert_eq!(totals[&Category::Sleeping], 900.0);
        assert_eq!(totals[&Category::Leisure], 180.0);
    }

    #[test]
    fn test_category_totals_absent_categories() {
        let records = sample();
        let totals = category_totals(&refs(&records), Field::DurationMinutes).unwrap();
        assert!(!totals.contains_key(&Category::Commuting));
        assert!(category_totals(&[], Field::DurationMinutes).unwrap().is_empty());
    }

    #[test]
    fn test_category_mean_single_record_is_exact() {
        let records = [rec("Mark", 10, Category::Eating, 37)];
        let means = category_mean(&refs(&records), Field::DurationMinutes).unwrap();
        assert_eq!(means[&Category::Eating], 37.0);
    }

    #[test]
    fn test_category_mean_empty_is_error() {
        let err = category_mean(&[], Field::DurationMinutes).unwrap_err();
        assert!(matches!(err, ActivityError::EmptyGroup { .. }));

        let records = sample();
        let err = mean_for_category(&refs(&records), Category::Class, Field::DurationMinutes)
            .unwrap_err();
        assert!(matches!(err, ActivityError::EmptyGroup { ref group } if group == "Class"));
    }

    #[test]
    fn test_category_mean_of_ordinal_values() {
        let records = sample();
        let scale = OrdinalScale::three_level();
        let means = category_mean(&refs(&records), Field::ValueToPerson(&scale)).unwrap();
        // Leisure: Medium(2), Low(1), Medium(2)
        assert!((means[&Category::Leisure] - 5.0 / 3.0).abs() < 1e-12);
        assert_eq!(means[&Category::Work], 3.0);
    }

    #[test]
    fn test_unknown_value_propagates() {
        let records = [rec("Mark", 10, Category::Class, 60).with_value("VeryHigh")];
        let scale = OrdinalScale::three_level();
        let err = category_totals(&refs(&records), Field::ValueToPerson(&scale)).unwrap_err();
        assert!(matches!(err, ActivityError::UnknownVocabulary { .. }));
    }

    #[test]
    fn test_most_frequent_feeling_dominant_mood_any_order() {
        let mut records = vec![
            rec("Mark", 10, Category::Class, 60).with_mood(Mood::Low),
            rec("Mark", 10, Category::Class, 60).with_mood(Mood::High),
            rec("Mark", 11, Category::Class, 60).with_mood(Mood::High),
            rec("Mark", 12, Category::Class, 60).with_mood(Mood::Medium),
            rec("Mark", 12, Category::Class, 60).with_mood(Mood::High),
        ];
        let key = GroupKey(vec![KeyPart::Category(Category::Class)]);

        for _ in 0..records.len() {
            let result = most_frequent_feeling(
                &refs(&records),
                &[Dimension::Category],
                TieBreak::FirstOccurrence,
            );
            assert_eq!(result[&key], MoodTally { mood: Mood::High, count: 3 });
            records.rotate_left(1);
        }
    }

    #[test]
    fn test_most_frequent_feeling_tie_break() {
        let records = vec![
            rec("Mark", 10, Category::Eating, 30).with_mood(Mood::Medium),
            rec("Mark", 10, Category::Eating, 30).with_mood(Mood::High),
        ];
        let key = GroupKey(vec![KeyPart::Category(Category::Eating)]);

        let lex = most_frequent_feeling(
            &refs(&records),
            &[Dimension::Category],
            TieBreak::Lexicographic,
        );
        assert_eq!(lex[&key].mood, Mood::High);

        let first = most_frequent_feeling(
            &refs(&records),
            &[Dimension::Category],
            TieBreak::FirstOccurrence,
        );
        assert_eq!(first[&key].mood, Mood::Medium);
    }

    #[test]
    fn test_normalized_per_day_display() {
        let share = normalized_per_day(1400.0, 2, 7).unwrap();
        assert_eq!(share.minutes_per_day, 100.0);
        assert_eq!(share.hours(), 1);
        assert_eq!(share.minutes(), 40);
        assert_eq!(share.to_string(), "1 hr 40 min");
    }

    #[test]
    fn test_normalized_per_day_zero_divisor() {
        assert!(matches!(
            normalized_per_day(100.0, 0, 7),
            Err(ActivityError::InvalidDivisor { divisor: "person count" })
        ));
        assert!(matches!(
            normalized_per_day(100.0, 2, 0),
            Err(ActivityError::InvalidDivisor { divisor: "day count" })
        ));
    }

    #[test]
    fn test_format_minutes() {
        assert_eq!(format_minutes(0.0), "0 hrs 0 min");
        assert_eq!(format_minutes(59.9), "0 hrs 59 min");
        assert_eq!(format_minutes(60.0), "1 hr 0 min");
        assert_eq!(format_minutes(450.5), "7 hrs 30 min");
    }

    #[test]
    fn test_top_n_oversized_returns_all_descending() {
        let mapping: BTreeMap<Category, f64> = [
            (Category::Eating, 10.0),
            (Category::Class, 30.0),
            (Category::Leisure, 20.0),
        ]
        .into_iter()
        .collect();
        let top = top_n(&mapping, 10, SortOrder::Descending);
        assert_eq!(
            top,
            vec![
                (Category::Class, 30.0),
                (Category::Leisure, 20.0),
                (Category::Eating, 10.0)
            ]
        );
    }

    #[test]
    fn test_top_n_ties_keep_key_order() {
        let mapping: BTreeMap<Category, usize> = [
            (Category::Others, 5),
            (Category::Sleeping, 5),
            (Category::Eating, 9),
        ]
        .into_iter()
        .collect();
        let top = top_n(&mapping, 2, SortOrder::Descending);
        assert_eq!(top, vec![(Category::Eating, 9), (Category::Sleeping, 5)]);

        let bottom = top_n(&mapping, 1, SortOrder::Ascending);
        assert_eq!(bottom, vec![(Category::Sleeping, 5)]);
    }

    #[test]
    fn test_share_percentages() {
        let mapping: BTreeMap<Category, f64> =
            [(Category::Eating, 1.0), (Category::Class, 3.0)].into_iter().collect();
        let shares = share_percentages(&mapping).unwrap();
        assert_eq!(shares[&Category::Class], 75.0);
        assert_eq!(shares[&Category::Eating], 25.0);

        let zeros: BTreeMap<Category, f64> = [(Category::Eating, 0.0)].into_iter().collect();
        assert!(share_percentages(&zeros).is_err());
    }

    #[test]
    fn test_extremes_first_key_wins_ties() {
        let records = sample();
        let counts = category_counts(&refs(&records));
        let ex = extremes(&counts).unwrap();
        assert_eq!(ex.max, (Category::Leisure, 3));
        assert_eq!(ex.min, (Category::Work, 1));

        let empty: BTreeMap<Category, usize> = BTreeMap::new();
        assert!(extremes(&empty).is_none());
    }

    #[test]
    fn test_mean_by_time_and_category() {
        let records = sample();
        let scale = OrdinalScale::three_level();
        let means = mean_by(
            &refs(&records),
            &[Dimension::TimeOfDay, Dimension::Category],
            Field::ValueToPerson(&scale),
        )
        .unwrap();
        let night_leisure = GroupKey(vec![
            KeyPart::Time(TimeOfDay::Night),
            KeyPart::Category(Category::Leisure),
        ]);
        assert_eq!(means[&night_leisure], 1.5);
        assert_eq!(night_leisure.to_string(), "Night / Leisure");
        assert_eq!(night_leisure.time(), Some(TimeOfDay::Night));
    }

    #[test]
    fn test_summarize_table() {
        let records = sample();
        let table = summarize(
            &refs(&records),
            &[Dimension::Person],
            Field::DurationMinutes,
            TieBreak::Lexicographic,
        )
        .unwrap();
        assert_eq!(table.rows.len(), 2);

        let hannah = table
            .get(&GroupKey(vec![KeyPart::Person("Hannah".into())]))
            .unwrap();
        assert_eq!(hannah.count, 3);
        assert_eq!(hannah.sum, 660.0);
        assert_eq!(hannah.mean, 220.0);
        // Low, MediumHigh, Medium all once: lexicographic picks "Low".
        assert_eq!(hannah.mode, Mood::Low);
        assert_eq!(hannah.mode_count, 1);

        let empty = summarize(
            &[],
            &[Dimension::Person],
            Field::DurationMinutes,
            TieBreak::default(),
        );
        assert!(empty.is_err());
    }

    #[test]
    fn test_summarize_serializes_keys_as_labels() {
        let records = sample();
        let table = summarize(
            &refs(&records),
            &[Dimension::Category],
            Field::DurationMinutes,
            TieBreak::Lexicographic,
        )
        .unwrap();
        let json = serde_json::to_value(&table).unwrap();
        assert_eq!(json["rows"][0]["key"], serde_json::json!(["Sleeping"]));
        assert_eq!(json["rows"][0]["count"], 2);
    }

    #[test]
    fn test_mood_counts_and_count_by() {
        let records = sample();
        let counts = mood_counts(&refs(&records), &[Dimension::Category]);
        let leisure = GroupKey(vec![KeyPart::Category(Category::Leisure)]);
        assert_eq!(counts[&(leisure.clone(), Mood::High)], 2);
        assert_eq!(counts[&(leisure.clone(), Mood::Medium)], 1);

        let by_person = count_by(&refs(&records), &[Dimension::Person]);
        assert_eq!(by_person.values().sum::<usize>(), records.len());
    }

    #[test]
    fn test_sum_by_date() {
        let records = sample();
        let sums = sum_by(&refs(&records), &[Dimension::Date], Field::DurationMinutes).unwrap();
        assert_eq!(sums[&GroupKey(vec![KeyPart::Date(day(10))])], 630.0);
    }

    #[test]
    fn test_daily_time_by_category() {
        let records = sample();
        let daily = daily_time_by_category(&records.iter().collect(), 2).unwrap();
        // Sleeping: 900 / 2 persons / 2 days = 225 min
        assert_eq!(daily[0].0, Category::Sleeping);
        assert_eq!(daily[0].1.to_string(), "3 hrs 45 min");
        assert_eq!(daily[1].0, Category::Leisure);
        assert_eq!(daily.len(), 2);

        assert!(daily_time_by_category(&RecordSet::default(), 5)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_activity_terms() {
        let records = sample();
        let set: RecordSet = records.iter().collect();
        let terms = activity_terms(&set, Category::Leisure, 3);
        assert_eq!(terms[0], ("watch".to_string(), 2));
        assert_eq!(terms.len(), 3);
        assert!(activity_terms(&set, Category::Class, 5).is_empty());
    }

    #[test]
    fn test_activity_terms_keep_accents_and_hyphens() {
        let records = vec![
            rec("Mark", 10, Category::Leisure, 60).with_activity("Café hopping"),
            rec("Mark", 10, Category::Leisure, 90).with_activity("Watch K-drama"),
            rec("Mark", 11, Category::Leisure, 30).with_activity("Read a book"),
        ];
        let set: RecordSet = records.iter().collect();
        let terms = activity_terms(&set, Category::Leisure, 10);
        let words: Vec<&str> = terms.iter().map(|(w, _)| w.as_str()).collect();
        assert_eq!(
            words,
            vec!["book", "café", "hopping", "k-drama", "read", "watch"]
        );
    }

    #[test]
    fn test_dimension_from_str() {
        assert_eq!("Category".parse::<Dimension>().unwrap(), Dimension::Category);
        assert_eq!("time".parse::<Dimension>().unwrap(), Dimension::TimeOfDay);
        assert!("weather".parse::<Dimension>().is_err());
    }

    #[test]
    fn test_aggregations_are_idempotent() {
        let records = sample();
        let refs = refs(&records);
        let scale = OrdinalScale::five_level();

        let dims = [Dimension::Category, Dimension::TimeOfDay];

        let a = summarize(&refs, &dims, Field::ValueToPerson(&scale), TieBreak::Lexicographic)
            .unwrap();
        let b = summarize(&refs, &dims, Field::ValueToPerson(&scale), TieBreak::Lexicographic)
            .unwrap();
        assert_eq!(a, b);

        let m1 = category_mean(&refs, Field::DurationMinutes).unwrap();
        let m2 = category_mean(&refs, Field::DurationMinutes).unwrap();
        for (k, v) in &m1 {
            assert_eq!(v.to_bits(), m2[k].to_bits());
        }
    }
}
