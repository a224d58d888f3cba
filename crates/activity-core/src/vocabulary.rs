//! Ordinal scales for the "Value to the person" field and the tie-break
//! policies used when picking the most frequent categorical value.

use crate::config::{ScalePreset, VocabularyConfig};
use crate::error::{ActivityError, Result};
use crate::types::{ActivityRecord, Mood};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Explicit mapping from closed-vocabulary labels to ordinal integers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrdinalScale {
    name: String,
    levels: BTreeMap<String, u32>,
}

impl OrdinalScale {
    pub fn new<L, I>(name: impl Into<String>, levels: I) -> Self
    where
        L: Into<String>,
        I: IntoIterator<Item = (L, u32)>,
    {
        Self {
            name: name.into(),
            levels: levels.into_iter().map(|(l, v)| (l.into(), v)).collect(),
        }
    }

    /// Canonical scale: Low=1, Medium=2, High=3.
    pub fn three_level() -> Self {
        Self::new("three-level", [("Low", 1), ("Medium", 2), ("High", 3)])
    }

    /// Legacy 5-level scale used by the per-person analysis dashboard.
    pub fn five_level() -> Self {
        Self::new(
            "five-level",
            [
                ("Low", 1),
                ("Medium", 2),
                ("MediumHigh", 3),
                ("HighLowHigh", 4),
                ("High", 5),
            ],
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn max_level(&self) -> u32 {
        self.levels.values().copied().max().unwrap_or(0)
    }

    /// Map one label to its ordinal. Labels outside the scale are an error,
    /// never a default.
    pub fn ordinal(&self, label: &str) -> Result<u32> {
        self.levels
            .get(label.trim())
            .copied()
            .ok_or_else(|| ActivityError::UnknownVocabulary {
                field: "Value to the person",
                value: label.to_string(),
            })
    }

    /// Derive the ordinal value column for a record set, leaving the records
    /// untouched. Output is aligned with the input order.
    pub fn derive_column(&self, records: &[&ActivityRecord]) -> Result<Vec<u32>> {
        records.iter().map(|r| self.ordinal(&r.value)).collect()
    }
}

/// Build the configured "Value to the person" scale.
pub fn ordinal_value_map(vocabulary: &VocabularyConfig) -> Result<OrdinalScale> {
    match vocabulary.value_scale {
        ScalePreset::ThreeLevel => Ok(OrdinalScale::three_level()),
        ScalePreset::FiveLevel => Ok(OrdinalScale::five_level()),
        ScalePreset::Custom => {
            if vocabulary.custom_levels.is_empty() {
                return Err(ActivityError::Config(
                    "value_scale = \"custom\" requires [vocabulary.custom_levels]".into(),
                ));
            }
            if let Some((label, _)) = vocabulary.custom_levels.iter().find(|(_, v)| **v == 0) {
                return Err(ActivityError::Config(format!(
                    "custom level {label:?} must be at least 1"
                )));
            }
            Ok(OrdinalScale::new(
                "custom",
                vocabulary
                    .custom_levels
                    .iter()
                    .map(|(l, v)| (l.clone(), *v)),
            ))
        }
    }
}

/// How to choose between moods with equal counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TieBreak {
    /// Smallest mood label in byte order wins.
    #[default]
    Lexicographic,
    /// The tied mood whose first record comes earliest in the input wins.
    FirstOccurrence,
}

impl TieBreak {
    /// Pick the winning mood from `(mood, count, first_index)` tallies.
    pub fn pick(self, tallies: &[(Mood, usize, usize)]) -> Option<(Mood, usize)> {
        let best = tallies.iter().map(|(_, c, _)| *c).max()?;
        let tied = tallies.iter().filter(|(_, c, _)| *c == best);
        let winner = match self {
            TieBreak::Lexicographic => tied.min_by(|a, b| a.0.label().cmp(b.0.label())),
            TieBreak::FirstOccurrence => tied.min_by_key(|(_, _, first)| *first),
        };
        winner.map(|(m, c, _)| (*m, *c))
    }
}
