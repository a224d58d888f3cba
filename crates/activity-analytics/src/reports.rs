//! Report assembly: panels of chart data plus narrative sentences.
//!
//! A report variant is only a panel selection; every number comes from
//! [`crate::aggregations`]. Panels whose aggregation fails are kept in the
//! report as "insufficient data" placeholders so one bad view never blanks the
//! whole page.

use crate::aggregations::{
    activity_terms, category_counts, category_mean, category_totals, daily_time_by_category,
    extremes, mean_by, mood_counts, most_frequent_feeling, share_percentages, sum_by, top_n,
    Dimension, Field, GroupKey, SortOrder,
};
use activity_core::config::{Panel, ReportConfig, ReportVariant, ThemeConfig};
use activity_core::{
    ordinal_value_map, ActivityError, AppConfig, Category, Dataset, Mood, OrdinalScale, RecordSet,
    Result, TieBreak,
};
use serde::Serialize;
use std::collections::BTreeMap;

pub const INSUFFICIENT_DATA: &str = "Insufficient data for this view";

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub title: String,
    pub variant: ReportVariant,
    pub theme: ThemeConfig,
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Section {
    pub heading: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub person: Option<String>,
    pub panels: Vec<PanelView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PanelView {
    pub panel: Panel,
    pub title: String,
    #[serde(flatten)]
    pub body: PanelBody,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PanelBody {
    Ready {
        chart: ChartData,
        #[serde(skip_serializing_if = "Option::is_none")]
        narrative: Option<String>,
    },
    Unavailable {
        message: String,
        reason: String,
    },
}

/// Data handed to the chart layer, already aggregated.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartData {
    /// Metric cards.
    Metrics { items: Vec<Metric> },
    /// One value per label (bar, donut).
    Series { unit: String, points: Vec<SeriesPoint> },
    /// Label × series values (stacked or colored bars).
    Stacked { unit: String, points: Vec<StackedPoint> },
    /// Word frequencies per category.
    Terms { groups: Vec<TermGroup> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metric {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StackedPoint {
    pub label: String,
    pub series: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TermGroup {
    pub category: Category,
    pub terms: Vec<(String, usize)>,
}

/// Who a section is about, for narrative wording.
#[derive(Debug, Clone, Copy)]
enum Subject<'a> {
    Everyone,
    Person(&'a str),
}

impl Subject<'_> {
    fn name(&self) -> &str {
        match self {
            Subject::Everyone => "we",
            Subject::Person(p) => p,
        }
    }
}

type Built = (ChartData, Option<String>);

/// Builds reports from a loaded dataset.
#[derive(Debug, Clone)]
pub struct ReportGenerator {
    config: ReportConfig,
    scale: OrdinalScale,
    tie_break: TieBreak,
}

impl ReportGenerator {
    pub fn new(config: &AppConfig) -> Result<Self> {
        Ok(Self {
            config: config.report.clone(),
            scale: ordinal_value_map(&config.vocabulary)?,
            tie_break: config.vocabulary.tie_break,
        })
    }

    /// Same settings, different panel selection.
    pub fn with_variant(&self, variant: ReportVariant) -> Self {
        let mut generator = self.clone();
        generator.config.variant = variant;
        generator.config.shared_panels = None;
        generator.config.person_panels = None;
        generator
    }

    pub fn scale(&self) -> &OrdinalScale {
        &self.scale
    }

    /// Full report: the shared section, then one section per person.
    /// Failing panels become placeholders.
    pub fn report(&self, dataset: &Dataset) -> Report {
        let records = dataset.view();
        let mut sections = Vec::new();

        let shared = self.config.shared_panels();
        if !shared.is_empty() {
            sections.push(self.section(
                "Shared Activity Exploration".into(),
                None,
                &shared,
                &records,
            ));
        }

        let person_panels = self.config.person_panels();
        if !person_panels.is_empty() {
            for person in records.persons() {
                let person_records = records.for_person(person);
                sections.push(self.section(
                    format!("Activity Analysis for {}", person),
                    Some(person),
                    &person_panels,
                    &person_records,
                ));
            }
        }

        tracing::debug!(
            "Built {:?} report with {} sections from {} records",
            self.config.variant,
            sections.len(),
            records.len()
        );
        self.wrap(sections)
    }

    /// Like [`report`](Self::report), but the first failing panel aborts.
    pub fn try_report(&self, dataset: &Dataset) -> Result<Report> {
        let records = dataset.view();
        let mut sections = Vec::new();

        let shared = self.config.shared_panels();
        if !shared.is_empty() {
            let mut panels = Vec::new();
            for panel in &shared {
                panels.push(self.ready(*panel, &records, Subject::Everyone)?);
            }
            sections.push(Section {
                heading: "Shared Activity Exploration".into(),
                person: None,
                panels,
            });
        }

        let person_panels = self.config.person_panels();
        if !person_panels.is_empty() {
            for person in records.persons() {
                let person_records = records.for_person(person);
                let mut panels = Vec::new();
                for panel in &person_panels {
                    panels.push(self.ready(*panel, &person_records, Subject::Person(person))?);
                }
                sections.push(Section {
                    heading: format!("Activity Analysis for {}", person),
                    person: Some(person.to_string()),
                    panels,
                });
            }
        }

        Ok(self.wrap(sections))
    }

    /// One person's section, or `None` if the person has no records.
    pub fn person_report(&self, dataset: &Dataset, person: &str) -> Option<Report> {
        let records = dataset.view().for_person(person);
        if records.is_empty() {
            return None;
        }
        let section = self.section(
            format!("Activity Analysis for {}", person),
            Some(person),
            &self.config.person_panels(),
            &records,
        );
        Some(self.wrap(vec![section]))
    }

    fn wrap(&self, sections: Vec<Section>) -> Report {
        Report {
            title: self.config.title.clone(),
            variant: self.config.variant,
            theme: self.config.theme.clone(),
            sections,
        }
    }

    fn section(
        &self,
        heading: String,
        person: Option<&str>,
        panels: &[Panel],
        records: &RecordSet<'_>,
    ) -> Section {
        let subject = person.map_or(Subject::Everyone, Subject::Person);
        Section {
            heading,
            person: person.map(str::to_string),
            panels: panels
                .iter()
                .map(|panel| self.render(*panel, records, subject))
                .collect(),
        }
    }

    fn render(&self, panel: Panel, records: &RecordSet<'_>, subject: Subject<'_>) -> PanelView {
        match self.ready(panel, records, subject) {
            Ok(view) => view,
            Err(e) => {
                tracing::warn!(
                    "Panel {:?} for {} unavailable: {}",
                    panel,
                    subject.name(),
                    e
                );
                PanelView {
                    panel,
                    title: panel_title(panel).into(),
                    body: PanelBody::Unavailable {
                        message: INSUFFICIENT_DATA.into(),
                        reason: e.to_string(),
                    },
                }
            }
        }
    }

    fn ready(
        &self,
        panel: Panel,
        records: &RecordSet<'_>,
        subject: Subject<'_>,
    ) -> Result<PanelView> {
        let (chart, narrative) = self.build(panel, records, subject)?;
        Ok(PanelView {
            panel,
            title: panel_title(panel).into(),
            body: PanelBody::Ready { chart, narrative },
        })
    }

    fn build(&self, panel: Panel, records: &RecordSet<'_>, subject: Subject<'_>) -> Result<Built> {
        if records.is_empty() {
            return Err(ActivityError::EmptyGroup {
                group: subject.name().to_string(),
            });
        }
        match panel {
            Panel::DailyTime => self.daily_time(records),
            Panel::CategoryValue => self.category_value(records),
            Panel::DominantMoods => self.dominant_moods(records),
            Panel::PopularActivities => self.popular_activities(records),
            Panel::TimeSpent => self.time_spent(records, subject),
            Panel::Value => self.value(records, subject),
            Panel::PersonMoods => self.person_moods(records),
            Panel::CategoryDistribution => self.category_distribution(records, subject),
            Panel::MoodByCategory => self.mood_by_category(records, subject),
            Panel::ValueByTimeAndCategory => self.value_by_time_and_category(records, subject),
            Panel::DurationByTime => self.duration_by_time(records, subject),
            Panel::MoodByTime => self.mood_by_time(records, subject),
        }
    }

    fn value_field(&self) -> Field<'_> {
        Field::ValueToPerson(&self.scale)
    }

    fn daily_time(&self, records: &RecordSet<'_>) -> Result<Built> {
        let daily = daily_time_by_category(records, self.config.top_categories)?;
        let narrative = daily.first().map(|(category, share)| {
            format!(
                "On average, each of us spends the most time on **{}** ({} per day).",
                category, share
            )
        });
        let items = daily
            .into_iter()
            .map(|(category, share)| Metric {
                label: category.to_string(),
                value: share.to_string(),
            })
            .collect();
        Ok((ChartData::Metrics { items }, narrative))
    }

    fn category_value(&self, records: &RecordSet<'_>) -> Result<Built> {
        let means = category_mean(records, self.value_field())?;
        let shares = share_percentages(&means)?;
        let narrative = extremes(&means).map(|ex| {
            format!(
                "**{}** matters most to us, with an average value of {:.2} out of {}.",
                ex.max.0,
                ex.max.1,
                self.scale.max_level()
            )
        });
        Ok((
            ChartData::Series {
                unit: "%".into(),
                points: series(shares),
            },
            narrative,
        ))
    }

    fn dominant_moods(&self, records: &RecordSet<'_>) -> Result<Built> {
        let filtered = records.excluding(&self.config.mood_excluded_categories);
        if filtered.is_empty() {
            return Err(ActivityError::EmptyGroup {
                group: "categories with mood data".into(),
            });
        }
        let dominant = most_frequent_feeling(&filtered, &[Dimension::Category], self.tie_break);

        let mut rows: Vec<(GroupKey, _)> = dominant.into_iter().collect();
        rows.sort_by(|a, b| b.1.count.cmp(&a.1.count));

        let narrative = rows.first().map(|(key, tally)| {
            format!(
                "**{}** activities are most often felt as **{}** ({} records).",
                key, tally.mood, tally.count
            )
        });
        let points = rows
            .into_iter()
            .map(|(key, tally)| StackedPoint {
                label: key.to_string(),
                series: tally.mood.to_string(),
                value: tally.count as f64,
            })
            .collect();
        Ok((
            ChartData::Stacked {
                unit: "records".into(),
                points,
            },
            narrative,
        ))
    }

    fn popular_activities(&self, records: &RecordSet<'_>) -> Result<Built> {
        let groups: Vec<TermGroup> = self
            .config
            .word_cloud_categories
            .iter()
            .map(|category| TermGroup {
                category: *category,
                terms: activity_terms(records, *category, self.config.terms_per_category),
            })
            .collect();
        if groups.iter().all(|g| g.terms.is_empty()) {
            return Err(ActivityError::EmptyGroup {
                group: "activity labels".into(),
            });
        }
        Ok((ChartData::Terms { groups }, None))
    }

    fn time_spent(&self, records: &RecordSet<'_>, subject: Subject<'_>) -> Result<Built> {
        let totals = category_totals(records, Field::DurationMinutes)?;
        let top = top_n(&totals, self.config.person_top_categories, SortOrder::Descending);
        let narrative = top.first().map(|(category, minutes)| {
            format!(
                "{} spends the most time on **{}** ({:.1} hours in total).",
                subject.name(),
                category,
                minutes / 60.0
            )
        });
        let points = top
            .into_iter()
            .map(|(category, minutes)| SeriesPoint {
                label: category.to_string(),
                value: minutes / 60.0,
            })
            .collect();
        Ok((
            ChartData::Series {
                unit: "hours".into(),
                points,
            },
            narrative,
        ))
    }

    fn value(&self, records: &RecordSet<'_>, subject: Subject<'_>) -> Result<Built> {
        let means = category_mean(records, self.value_field())?;
        let top = top_n(&means, self.config.person_top_categories, SortOrder::Descending);
        let narrative = top.first().map(|(category, mean)| {
            format!(
                "{} values **{}** the most (average {:.2} out of {}).",
                subject.name(),
                category,
                mean,
                self.scale.max_level()
            )
        });
        Ok((
            ChartData::Series {
                unit: "value".into(),
                points: top
                    .into_iter()
                    .map(|(category, mean)| SeriesPoint {
                        label: category.to_string(),
                        value: mean,
                    })
                    .collect(),
            },
            narrative,
        ))
    }

    fn person_moods(&self, records: &RecordSet<'_>) -> Result<Built> {
        let dominant = most_frequent_feeling(records, &[Dimension::Category], self.tie_break);
        let counts = category_counts(records);
        let order = top_n(&counts, counts.len(), SortOrder::Descending);

        let points = order
            .into_iter()
            .filter_map(|(category, _)| {
                dominant
                    .iter()
                    .find(|(key, _)| key.category() == Some(category))
                    .map(|(_, tally)| StackedPoint {
                        label: category.to_string(),
                        series: tally.mood.to_string(),
                        value: tally.count as f64,
                    })
            })
            .collect();
        Ok((
            ChartData::Stacked {
                unit: "records".into(),
                points,
            },
            None,
        ))
    }

    fn category_distribution(
        &self,
        records: &RecordSet<'_>,
        subject: Subject<'_>,
    ) -> Result<Built> {
        let counts = category_counts(records);
        let narrative = extremes(&counts).map(|ex| {
            format!(
                "{} spent the most time on **{}** and the least time on **{}**.",
                subject.name(),
                ex.max.0,
                ex.min.0
            )
        });
        let points = counts
            .into_iter()
            .map(|(category, count)| SeriesPoint {
                label: category.to_string(),
                value: count as f64,
            })
            .collect();
        Ok((
            ChartData::Series {
                unit: "records".into(),
                points,
            },
            narrative,
        ))
    }

    fn mood_by_category(&self, records: &RecordSet<'_>, subject: Subject<'_>) -> Result<Built> {
        let counts = mood_counts(records, &[Dimension::Category]);
        let narrative = extremes(&counts).map(|ex| {
            let ((max_key, max_mood), _) = &ex.max;
            let ((min_key, min_mood), _) = &ex.min;
            format!(
                "{} most often felt **{}** during **{}** activities, and least often felt **{}** during **{}** activities.",
                subject.name(),
                max_mood,
                max_key,
                min_mood,
                min_key
            )
        });
        Ok((stacked_moods(counts), narrative))
    }

    fn value_by_time_and_category(
        &self,
        records: &RecordSet<'_>,
        subject: Subject<'_>,
    ) -> Result<Built> {
        let means = mean_by(
            records,
            &[Dimension::TimeOfDay, Dimension::Category],
            self.value_field(),
        )?;
        let narrative = extremes(&means).map(|ex| {
            format!(
                "{} valued their time the highest when they did **{}** activities in the **{}** and the lowest when they did **{}** activities in the **{}**.",
                subject.name(),
                category_label(&ex.max.0),
                time_label(&ex.max.0),
                category_label(&ex.min.0),
                time_label(&ex.min.0)
            )
        });
        let points = means
            .into_iter()
            .map(|(key, mean)| StackedPoint {
                label: category_label(&key),
                series: time_label(&key),
                value: mean,
            })
            .collect();
        Ok((
            ChartData::Stacked {
                unit: "value".into(),
                points,
            },
            narrative,
        ))
    }

    fn duration_by_time(&self, records: &RecordSet<'_>, subject: Subject<'_>) -> Result<Built> {
        let by_time = mean_by(records, &[Dimension::TimeOfDay], Field::DurationMinutes)?;
        let by_category = category_mean(records, Field::DurationMinutes)?;
        let totals = sum_by(
            records,
            &[Dimension::TimeOfDay, Dimension::Category],
            Field::DurationMinutes,
        )?;

        let narrative = match (extremes(&by_time), extremes(&by_category)) {
            (Some(time), Some(category)) => Some(format!(
                "{} tended to do longer activities in the **{}** and shorter activities in the **{}**, and the longest activity category was **{}** while the shortest was **{}**.",
                subject.name(),
                time.max.0,
                time.min.0,
                category.max.0,
                category.min.0
            )),
            _ => None,
        };
        let points = totals
            .into_iter()
            .map(|(key, minutes)| StackedPoint {
                label: time_label(&key),
                series: category_label(&key),
                value: minutes,
            })
            .collect();
        Ok((
            ChartData::Stacked {
                unit: "minutes".into(),
                points,
            },
            narrative,
        ))
    }

    fn mood_by_time(&self, records: &RecordSet<'_>, subject: Subject<'_>) -> Result<Built> {
        let by_time = mood_counts(records, &[Dimension::TimeOfDay]);
        let by_category = mood_counts(records, &[Dimension::Category]);

        let narrative = match (extremes(&by_time), extremes(&by_category)) {
            (Some(time), Some(category)) => {
                let ((max_time, max_mood), _) = &time.max;
                let ((min_time, min_mood), _) = &time.min;
                let ((max_cat, max_cat_mood), _) = &category.max;
                Some(format!(
                    "{} felt more **{}** in the **{}** and more **{}** in the **{}**, and **{}** was the category that most often made them feel **{}**.",
                    subject.name(),
                    max_mood,
                    max_time,
                    min_mood,
                    min_time,
                    max_cat,
                    max_cat_mood
                ))
            }
            _ => None,
        };
        Ok((stacked_moods(by_time), narrative))
    }
}

fn series<K: ToString>(mapping: BTreeMap<K, f64>) -> Vec<SeriesPoint> {
    mapping
        .into_iter()
        .map(|(key, value)| SeriesPoint {
            label: key.to_string(),
            value,
        })
        .collect()
}

fn stacked_moods(counts: BTreeMap<(GroupKey, Mood), usize>) -> ChartData {
    ChartData::Stacked {
        unit: "records".into(),
        points: counts
            .into_iter()
            .map(|((key, mood), count)| StackedPoint {
                label: key.to_string(),
                series: mood.to_string(),
                value: count as f64,
            })
            .collect(),
    }
}

fn category_label(key: &GroupKey) -> String {
    key.category().map(|c| c.to_string()).unwrap_or_default()
}

fn time_label(key: &GroupKey) -> String {
    key.time().map(|t| t.to_string()).unwrap_or_default()
}

pub fn panel_title(panel: Panel) -> &'static str {
    match panel {
        Panel::DailyTime => "How Much Time Do We Spend on Different Activities Every Day?",
        Panel::CategoryValue => "What Activities Matter Most to Us?",
        Panel::DominantMoods => {
            "What Dominant Emotions Do We Experience During Different Activities?"
        }
        Panel::PopularActivities => "What Are the Most Popular Activities in Each Category?",
        Panel::TimeSpent => "How Do They Spend Most of Their Time?",
        Panel::Value => "What Activities Matter Most to Them?",
        Panel::PersonMoods => {
            "What Dominant Emotions Do They Experience During Different Activities?"
        }
        Panel::CategoryDistribution => "Activity Category Distribution",
        Panel::MoodByCategory => "Mood by Activity Category",
        Panel::ValueByTimeAndCategory => "Value Perception by Activity Category and Time",
        Panel::DurationByTime => "Duration of the Activity by Time and Category",
        Panel::MoodByTime => "Relationship between the Time of the Day and the Mood",
    }
}

impl Report {
    /// Render as markdown.
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("# {}\n\n", self.title));

        for section in &self.sections {
            out.push_str(&format!("## {}\n\n", section.heading));
            for view in &section.panels {
                out.push_str(&format!("### {}\n\n", view.title));
                match &view.body {
                    PanelBody::Ready { chart, narrative } => {
                        push_chart(&mut out, chart);
                        if let Some(text) = narrative {
                            out.push_str(text);
                            out.push_str("\n\n");
                        }
                    }
                    PanelBody::Unavailable { message, reason } => {
                        out.push_str(&format!("> {} ({})\n\n", message, reason));
                    }
                }
            }
        }

        out
    }
}

fn push_chart(out: &mut String, chart: &ChartData) {
    match chart {
        ChartData::Metrics { items } => {
            out.push_str("| Category | Per person per day |\n");
            out.push_str("|----------|--------------------|\n");
            for item in items {
                out.push_str(&format!("| {} | {} |\n", item.label, item.value));
            }
        }
        ChartData::Series { unit, points } => {
            out.push_str(&format!("| Label | {} |\n", unit));
            out.push_str("|-------|------|\n");
            for point in points {
                out.push_str(&format!("| {} | {:.2} |\n", point.label, point.value));
            }
        }
        ChartData::Stacked { unit, points } => {
            out.push_str(&format!("| Label | Series | {} |\n", unit));
            out.push_str("|-------|--------|------|\n");
            for point in points {
                out.push_str(&format!(
                    "| {} | {} | {:.2} |\n",
                    point.label, point.series, point.value
                ));
            }
        }
        ChartData::Terms { groups } => {
            for group in groups {
                let words: Vec<String> = group
                    .terms
                    .iter()
                    .map(|(word, count)| format!("{} ({})", word, count))
                    .collect();
                let listed = if words.is_empty() {
                    "-".to_string()
                } else {
                    words.join(", ")
                };
                out.push_str(&format!("- **{}**: {}\n", group.category, listed));
            }
        }
    }
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use activity_core::config::ScalePreset;
    use std::io::Write;

    const LOG: &str = "\
Person,Date,Time,Activity,Category,How they felt,Value to the person,Duration in minutes
Mark,2023-10-10,Night,Sleep,Sleeping,Medium,High,420
Mark,2023-10-10,Morning,Wake up,Waking Up,Low,Low,15
Mark,2023-10-10,Evening,Watch Netflix,Leisure,High,Medium,90
Mark,2023-10-11,Afternoon,Do assignments,Work/Acads,Low,High,120
Mark,2023-10-11,Night,Watch movies,Leisure,High,Low,100
Hannah,2023-10-10,Night,Sleep,Sleeping,MediumHigh,High,480
Hannah,2023-10-10,Noon,Eat lunch,Eating,High,Medium,40
Hannah,2023-10-11,Afternoon,Karaoke,Others,High,Medium,60
Hannah,2023-10-11,Evening,Project reporting,Work/Acads,Medium,High,150
";

    fn dataset() -> Dataset {
        Dataset::from_reader(LOG.as_bytes()).unwrap()
    }

    fn generator(variant: ReportVariant) -> ReportGenerator {
        let mut config = AppConfig::default();
        config.report.variant = variant;
        ReportGenerator::new(&config).unwrap()
    }

    fn panel<'r>(report: &'r Report, section: usize, panel: Panel) -> &'r PanelView {
        report.sections[section]
            .panels
            .iter()
            .find(|p| p.panel == panel)
            .unwrap()
    }

    fn narrative(view: &PanelView) -> &str {
        match &view.body {
            PanelBody::Ready {
                narrative: Some(text),
                ..
            } => text.as_str(),
            other => panic!("expected narrative, got {:?}", other),
        }
    }

    #[test]
    fn test_overview_structure() {
        let report = generator(ReportVariant::Overview).report(&dataset());
        assert_eq!(report.sections.len(), 3);
        assert_eq!(report.sections[0].heading, "Shared Activity Exploration");
        assert_eq!(report.sections[1].person.as_deref(), Some("Mark"));
        assert_eq!(report.sections[2].person.as_deref(), Some("Hannah"));
        assert_eq!(report.sections[0].panels.len(), 4);
        assert_eq!(report.sections[1].panels.len(), 3);
    }

    #[test]
    fn test_daily_time_metrics() {
        let report = generator(ReportVariant::Overview).report(&dataset());
        let view = panel(&report, 0, Panel::DailyTime);
        match &view.body {
            PanelBody::Ready {
                chart: ChartData::Metrics { items },
                ..
            } => {
                // Sleeping: 900 min / 2 persons / 2 days = 225 min.
                assert_eq!(items[0].label, "Sleeping");
                assert_eq!(items[0].value, "3 hrs 45 min");
                assert!(items.len() <= 7);
            }
            other => panic!("unexpected body {:?}", other),
        }
        assert!(narrative(view).contains("**Sleeping** (3 hrs 45 min per day)"));
    }

    #[test]
    fn test_dominant_moods_excludes_waking_up() {
        let report = generator(ReportVariant::Overview).report(&dataset());
        let view = panel(&report, 0, Panel::DominantMoods);
        match &view.body {
            PanelBody::Ready {
                chart: ChartData::Stacked { points, .. },
                ..
            } => {
                assert!(points.iter().all(|p| p.label != "Waking Up"));
                // Leisure has two High records, the highest dominant count.
                assert_eq!(points[0].label, "Leisure");
                assert_eq!(points[0].series, "High");
                assert_eq!(points[0].value, 2.0);
            }
            other => panic!("unexpected body {:?}", other),
        }
    }

    #[test]
    fn test_person_focus_narratives() {
        let report = generator(ReportVariant::PersonFocus).report(&dataset());
        assert_eq!(report.sections.len(), 2);

        let distribution = panel(&report, 0, Panel::CategoryDistribution);
        assert_eq!(
            narrative(distribution),
            "Mark spent the most time on **Leisure** and the least time on **Sleeping**."
        );

        let duration = panel(&report, 0, Panel::DurationByTime);
        assert!(narrative(duration).contains("longer activities in the **Night**"));
        assert!(narrative(duration).contains("the longest activity category was **Sleeping**"));
    }

    #[test]
    fn test_unknown_value_becomes_placeholder() {
        let log = "\
Person,Date,Time,Activity,Category,How they felt,Value to the person,Duration in minutes
Mark,2023-10-10,Night,Sleep,Sleeping,Medium,VeryHigh,420
";
        let dataset = Dataset::from_reader(log.as_bytes()).unwrap();
        let gen = generator(ReportVariant::Overview);
        let report = gen.report(&dataset);

        let value = panel(&report, 0, Panel::CategoryValue);
        match &value.body {
            PanelBody::Unavailable { message, reason } => {
                assert_eq!(message, INSUFFICIENT_DATA);
                assert!(reason.contains("VeryHigh"));
            }
            other => panic!("expected placeholder, got {:?}", other),
        }
        // Duration panels are unaffected.
        assert!(matches!(
            panel(&report, 0, Panel::DailyTime).body,
            PanelBody::Ready { .. }
        ));

        assert!(gen.try_report(&dataset).is_err());
    }

    #[test]
    fn test_five_level_scale_accepts_legacy_values() {
        let log = "\
Person,Date,Time,Activity,Category,How they felt,Value to the person,Duration in minutes
Mark,2023-10-10,Night,Watch movies,Leisure,Medium,HighLowHigh,120
";
        let dataset = Dataset::from_reader(log.as_bytes()).unwrap();
        let mut config = AppConfig::default();
        config.vocabulary.value_scale = ScalePreset::FiveLevel;
        let report = ReportGenerator::new(&config).unwrap().try_report(&dataset).unwrap();
        let value = panel(&report, 1, Panel::Value);
        assert!(narrative(value).contains("average 4.00 out of 5"));
    }

    #[test]
    fn test_person_report() {
        let gen = generator(ReportVariant::Full);
        let report = gen.person_report(&dataset(), "Hannah").unwrap();
        assert_eq!(report.sections.len(), 1);
        assert_eq!(report.sections[0].panels.len(), Panel::PERSON.len());
        assert!(gen.person_report(&dataset(), "Nobody").is_none());
    }

    #[test]
    fn test_empty_dataset_placeholders() {
        let empty = Dataset::from_records(Vec::new());
        let report = generator(ReportVariant::Overview).report(&empty);
        assert_eq!(report.sections.len(), 1);
        assert!(report.sections[0]
            .panels
            .iter()
            .all(|p| matches!(p.body, PanelBody::Unavailable { .. })));
        assert!(report.to_markdown().contains(INSUFFICIENT_DATA));
    }

    #[test]
    fn test_markdown_rendering() {
        let report = generator(ReportVariant::Overview).report(&dataset());
        let md = report.to_markdown();
        assert!(md.starts_with("# Activity Analysis Dashboard"));
        assert!(md.contains("## Shared Activity Exploration"));
        assert!(md.contains("## Activity Analysis for Hannah"));
        assert!(md.contains("| Sleeping | 3 hrs 45 min |"));
        assert!(md.contains("- **Leisure**: watch (2)"));
    }

    #[test]
    fn test_json_shape() {
        let report = generator(ReportVariant::Compact).report(&dataset());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["variant"], "compact");
        assert_eq!(json["theme"]["accent_color"], "#19A7CE");
        let first = &json["sections"][0]["panels"][0];
        assert_eq!(first["panel"], "daily-time");
        assert_eq!(first["status"], "ready");
        assert_eq!(first["chart"]["kind"], "metrics");
    }

    #[test]
    fn test_with_variant_resets_overrides() {
        let mut config = AppConfig::default();
        config.report.person_panels = Some(vec![Panel::MoodByTime]);
        let gen = ReportGenerator::new(&config).unwrap();
        let report = gen.report(&dataset());
        assert_eq!(report.sections[1].panels.len(), 1);

        let full = gen.with_variant(ReportVariant::Full).report(&dataset());
        assert_eq!(full.sections[1].panels.len(), Panel::PERSON.len());
    }

    #[test]
    fn test_report_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(LOG.as_bytes()).unwrap();
        let dataset = Dataset::load(file.path()).unwrap();
        let report = generator(ReportVariant::Full).try_report(&dataset).unwrap();
        assert_eq!(report.sections.len(), 3);
    }
}
