//! Grouped aggregations over activity records and the report views built
//! on top of them.

pub mod aggregations;
pub mod reports;

pub use aggregations::{
    activity_terms, category_counts, category_mean, category_totals, count_by,
    daily_time_by_category, extremes, format_minutes, mean_by, mean_for_category, mood_counts,
    most_frequent_feeling, normalized_per_day, share_percentages, sum_by, summarize, top_n,
    AggregateRow, AggregateTable, DailyShare, Dimension, Extremes, Field, GroupKey,
    GroupSummary, KeyPart, MoodTally, SortOrder,
};
pub use reports::{ChartData, PanelBody, PanelView, Report, ReportGenerator, Section};
