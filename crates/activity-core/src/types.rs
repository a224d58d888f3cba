use crate::error::{ActivityError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One row of the activity log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub person: String,
    pub date: NaiveDate,
    pub time: TimeOfDay,
    /// Free-text activity label (e.g. "Watch Netflix").
    pub activity: String,
    pub category: Category,
    pub mood: Mood,
    /// Raw "Value to the person" label. Mapped through an
    /// [`OrdinalScale`](crate::vocabulary::OrdinalScale) before any reduction.
    pub value: String,
    pub duration_minutes: u32,
}

impl ActivityRecord {
    pub fn new(
        person: impl Into<String>,
        date: NaiveDate,
        category: Category,
        duration_minutes: u32,
    ) -> Self {
        Self {
            person: person.into(),
            date,
            time: TimeOfDay::Morning,
            activity: category.label().to_string(),
            category,
            mood: Mood::Medium,
            value: "Medium".into(),
            duration_minutes,
        }
    }

    pub fn with_time(mut self, time: TimeOfDay) -> Self {
        self.time = time;
        self
    }

    pub fn with_activity(mut self, activity: impl Into<String>) -> Self {
        self.activity = activity.into();
        self
    }

    pub fn with_mood(mut self, mood: Mood) -> Self {
        self.mood = mood;
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }
}

/// Time-of-day bucket an activity was logged in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TimeOfDay {
    Morning,
    Noon,
    Afternoon,
    Evening,
    Night,
}

impl TimeOfDay {
    pub const ALL: [TimeOfDay; 5] = [
        TimeOfDay::Morning,
        TimeOfDay::Noon,
        TimeOfDay::Afternoon,
        TimeOfDay::Evening,
        TimeOfDay::Night,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TimeOfDay::Morning => "Morning",
            TimeOfDay::Noon => "Noon",
            TimeOfDay::Afternoon => "Afternoon",
            TimeOfDay::Evening => "Evening",
            TimeOfDay::Night => "Night",
        }
    }

    /// Parse a time bucket label, ignoring case and surrounding whitespace.
    pub fn from_label(label: &str) -> Result<Self> {
        let trimmed = label.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.label().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ActivityError::UnknownVocabulary {
                field: "Time",
                value: label.to_string(),
            })
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Closed activity category vocabulary.
///
/// Canonical labels follow the `Category` header convention. Labels from the
/// older `Activity Category` convention go through [`Category::from_legacy_label`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    Sleeping,
    #[serde(rename = "Waking Up")]
    WakingUp,
    #[serde(rename = "Personal Hygiene")]
    PersonalHygiene,
    Eating,
    Commuting,
    Class,
    Leisure,
    #[serde(rename = "Work/Acads")]
    Work,
    Others,
}

impl Category {
    pub const ALL: [Category; 9] = [
        Category::Sleeping,
        Category::WakingUp,
        Category::PersonalHygiene,
        Category::Eating,
        Category::Commuting,
        Category::Class,
        Category::Leisure,
        Category::Work,
        Category::Others,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::Sleeping => "Sleeping",
            Category::WakingUp => "Waking Up",
            Category::PersonalHygiene => "Personal Hygiene",
            Category::Eating => "Eating",
            Category::Commuting => "Commuting",
            Category::Class => "Class",
            Category::Leisure => "Leisure",
            Category::Work => "Work/Acads",
            Category::Others => "Others",
        }
    }

    /// Parse a canonical category label. Matching is exact after trimming.
    pub fn from_label(label: &str) -> Result<Self> {
        let trimmed = label.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.label() == trimmed)
            .ok_or_else(|| ActivityError::UnknownVocabulary {
                field: "Category",
                value: label.to_string(),
            })
    }

    /// Migrate a label written under the legacy `Activity Category` header.
    ///
    /// Legacy files spell labels with inconsistent case and use `Work` for
    /// `Work/Acads`; anything outside the migration table is still rejected.
    pub fn from_legacy_label(label: &str) -> Result<Self> {
        let normalized = label.trim().to_ascii_lowercase();
        let category = match normalized.as_str() {
            "work" | "work/acads" => Category::Work,
            "waking up" | "wakeup" | "waking-up" => Category::WakingUp,
            "personal hygiene" | "hygiene" => Category::PersonalHygiene,
            "other" | "others" => Category::Others,
            _ => {
                return Self::ALL
                    .into_iter()
                    .find(|c| c.label().eq_ignore_ascii_case(&normalized))
                    .ok_or_else(|| ActivityError::UnknownVocabulary {
                        field: "Activity Category",
                        value: label.to_string(),
                    })
            }
        };
        Ok(category)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// "How they felt" vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Mood {
    Low,
    Medium,
    MediumHigh,
    High,
    HighLowHigh,
}

impl Mood {
    pub const ALL: [Mood; 5] = [
        Mood::Low,
        Mood::Medium,
        Mood::MediumHigh,
        Mood::High,
        Mood::HighLowHigh,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Mood::Low => "Low",
            Mood::Medium => "Medium",
            Mood::MediumHigh => "MediumHigh",
            Mood::High => "High",
            Mood::HighLowHigh => "HighLowHigh",
        }
    }

    /// Parse a mood label, ignoring case and surrounding whitespace.
    pub fn from_label(label: &str) -> Result<Self> {
        let trimmed = label.trim();
        Self::ALL
            .into_iter()
            .find(|m| m.label().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ActivityError::UnknownVocabulary {
                field: "How they felt",
                value: label.to_string(),
            })
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which of the two observed CSV header sets a file uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderConvention {
    /// `Category` column, canonical category labels.
    Current,
    /// `Activity Category` column, labels migrated through
    /// [`Category::from_legacy_label`].
    Legacy,
}

impl HeaderConvention {
    pub fn category_column(self) -> &'static str {
        match self {
            HeaderConvention::Current => "Category",
            HeaderConvention::Legacy => "Activity Category",
        }
    }

    pub fn parse_category(self, label: &str) -> Result<Category> {
        match self {
            HeaderConvention::Current => Category::from_label(label),
            HeaderConvention::Legacy => Category::from_legacy_label(label),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_labels_roundtrip() {
        for category in Category::ALL {
            assert_eq!(Category::from_label(category.label()).unwrap(), category);
        }
    }

    #[test]
    fn test_canonical_category_is_exact() {
        assert!(Category::from_label("work/acads").is_err());
        assert!(Category::from_label("Work").is_err());
        assert_eq!(Category::from_label(" Leisure ").unwrap(), Category::Leisure);
    }

    #[test]
    fn test_legacy_category_migration() {
        assert_eq!(Category::from_legacy_label("Work").unwrap(), Category::Work);
        assert_eq!(
            Category::from_legacy_label("Waking up").unwrap(),
            Category::WakingUp
        );
        assert_eq!(
            Category::from_legacy_label("personal hygiene").unwrap(),
            Category::PersonalHygiene
        );
        assert_eq!(Category::from_legacy_label("CLASS").unwrap(), Category::Class);

        let err = Category::from_legacy_label("Gaming").unwrap_err();
        assert!(matches!(err, ActivityError::UnknownVocabulary { .. }));
    }

    #[test]
    fn test_mood_rejects_unknown() {
        assert_eq!(Mood::from_label("HighLowHigh").unwrap(), Mood::HighLowHigh);
        let err = Mood::from_label("Ecstatic").unwrap_err();
        assert!(err.to_string().contains("Ecstatic"));
    }

    #[test]
    fn test_time_of_day_case_insensitive() {
        assert_eq!(TimeOfDay::from_label("evening").unwrap(), TimeOfDay::Evening);
        assert!(TimeOfDay::from_label("Dusk").is_err());
    }

    #[test]
    fn test_category_serializes_as_label() {
        let json = serde_json::to_string(&Category::Work).unwrap();
        assert_eq!(json, "\"Work/Acads\"");
        let parsed: Category = serde_json::from_str("\"Waking Up\"").unwrap();
        assert_eq!(parsed, Category::WakingUp);
    }

    #[test]
    fn test_record_builder() {
        let date = NaiveDate::from_ymd_opt(2023, 10, 10).unwrap();
        let record = ActivityRecord::new("Mark", date, Category::Leisure, 45)
            .with_activity("Watch Netflix")
            .with_mood(Mood::High)
            .with_value("High")
            .with_time(TimeOfDay::Night);
        assert_eq!(record.activity, "Watch Netflix");
        assert_eq!(record.mood, Mood::High);
        assert_eq!(record.time, TimeOfDay::Night);
        assert_eq!(record.duration_minutes, 45);
    }
}
