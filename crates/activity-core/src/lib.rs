//! Records, closed vocabularies, configuration, and CSV loading for the
//! activity log.

pub mod config;
pub mod dataset;
pub mod error;
pub mod types;
pub mod vocabulary;

pub use config::AppConfig;
pub use dataset::{Dataset, RecordSet};
pub use error::{ActivityError, Result};
pub use types::{ActivityRecord, Category, HeaderConvention, Mood, TimeOfDay};
pub use vocabulary::{ordinal_value_map, OrdinalScale, TieBreak};
