use crate::types::Category;
use crate::vocabulary::TieBreak;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Top-level application configuration, loaded from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub data: DataConfig,
    pub vocabulary: VocabularyConfig,
    pub report: ReportConfig,
    pub server: ServerConfig,
}

impl AppConfig {
    /// Load configuration from default path (~/.config/activity-report/config.toml),
    /// falling back to defaults if the file doesn't exist.
    pub fn load() -> anyhow::Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }

    /// Write current configuration to the default path.
    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to(&Self::default_path())
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Default config file path.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("activity-report")
            .join("config.toml")
    }
}

/// Where the activity log lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Path to the activity CSV.
    pub path: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("dataset.csv"),
        }
    }
}

/// Closed vocabularies and how they reduce.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VocabularyConfig {
    /// Ordinal scale applied to "Value to the person".
    pub value_scale: ScalePreset,
    /// Label → level table, used when `value_scale = "custom"`.
    pub custom_levels: BTreeMap<String, u32>,
    /// Tie-break for most-frequent mood selection.
    pub tie_break: TieBreak,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScalePreset {
    #[default]
    ThreeLevel,
    FiveLevel,
    Custom,
}

/// Report layout and presentation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub title: String,
    pub variant: ReportVariant,
    /// Overrides the variant's shared-section panels.
    pub shared_panels: Option<Vec<Panel>>,
    /// Overrides the variant's per-person panels.
    pub person_panels: Option<Vec<Panel>>,
    /// Categories shown in the shared daily-time metrics.
    pub top_categories: usize,
    /// Categories shown in per-person duration/value charts.
    pub person_top_categories: usize,
    /// Categories left out of the shared dominant-mood chart.
    pub mood_excluded_categories: Vec<Category>,
    /// Categories that get an activity word list.
    pub word_cloud_categories: Vec<Category>,
    pub terms_per_category: usize,
    pub theme: ThemeConfig,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            title: "Activity Analysis Dashboard".into(),
            variant: ReportVariant::Overview,
            shared_panels: None,
            person_panels: None,
            top_categories: 7,
            person_top_categories: 5,
            mood_excluded_categories: vec![Category::WakingUp],
            word_cloud_categories: vec![Category::Leisure, Category::Work, Category::Others],
            terms_per_category: 20,
            theme: ThemeConfig::default(),
        }
    }
}

impl ReportConfig {
    pub fn shared_panels(&self) -> Vec<Panel> {
        self.shared_panels
            .clone()
            .unwrap_or_else(|| self.variant.shared_panels())
    }

    pub fn person_panels(&self) -> Vec<Panel> {
        self.person_panels
            .clone()
            .unwrap_or_else(|| self.variant.person_panels())
    }
}

/// Colors handed through to the chart layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub accent_color: String,
    pub duration_color: String,
    pub value_color: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            accent_color: "#19A7CE".into(),
            duration_color: "#0068c9".into(),
            value_color: "#83c9ff".into(),
        }
    }
}

/// Named panel selections, one per dashboard layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportVariant {
    /// Shared dashboard followed by a per-person brochure.
    #[default]
    Overview,
    /// Narrative analysis for each person.
    PersonFocus,
    /// Headline metrics and top charts only.
    Compact,
    /// Every panel.
    Full,
}

impl ReportVariant {
    pub fn shared_panels(self) -> Vec<Panel> {
        match self {
            ReportVariant::Overview => vec![
                Panel::DailyTime,
                Panel::CategoryValue,
                Panel::DominantMoods,
                Panel::PopularActivities,
            ],
            ReportVariant::PersonFocus => Vec::new(),
            ReportVariant::Compact => vec![Panel::DailyTime, Panel::DominantMoods],
            ReportVariant::Full => Panel::SHARED.to_vec(),
        }
    }

    pub fn person_panels(self) -> Vec<Panel> {
        match self {
            ReportVariant::Overview => vec![Panel::TimeSpent, Panel::Value, Panel::PersonMoods],
            ReportVariant::PersonFocus => vec![
                Panel::CategoryDistribution,
                Panel::MoodByCategory,
                Panel::ValueByTimeAndCategory,
                Panel::DurationByTime,
                Panel::MoodByTime,
            ],
            ReportVariant::Compact => vec![Panel::TimeSpent],
            ReportVariant::Full => Panel::PERSON.to_vec(),
        }
    }
}

impl std::str::FromStr for ReportVariant {
    type Err = crate::error::ActivityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "overview" => Ok(ReportVariant::Overview),
            "person-focus" => Ok(ReportVariant::PersonFocus),
            "compact" => Ok(ReportVariant::Compact),
            "full" => Ok(ReportVariant::Full),
            other => Err(crate::error::ActivityError::Config(format!(
                "unknown report variant {other:?} (expected overview, person-focus, compact, full)"
            ))),
        }
    }
}

/// One chart (plus optional narrative) in a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Panel {
    DailyTime,
    CategoryValue,
    DominantMoods,
    PopularActivities,
    TimeSpent,
    Value,
    PersonMoods,
    CategoryDistribution,
    MoodByCategory,
    ValueByTimeAndCategory,
    DurationByTime,
    MoodByTime,
}

impl Panel {
    /// Panels computed over the whole dataset.
    pub const SHARED: [Panel; 4] = [
        Panel::DailyTime,
        Panel::CategoryValue,
        Panel::DominantMoods,
        Panel::PopularActivities,
    ];

    /// Panels computed over one person's records.
    pub const PERSON: [Panel; 8] = [
        Panel::TimeSpent,
        Panel::Value,
        Panel::PersonMoods,
        Panel::CategoryDistribution,
        Panel::MoodByCategory,
        Panel::ValueByTimeAndCategory,
        Panel::DurationByTime,
        Panel::MoodByTime,
    ];
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address.
    pub host: String,
    /// Port.
    pub port: u16,
    /// Bearer token for authentication (None = no auth).
    pub auth_token: Option<String>,
    /// Enable CORS.
    pub cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8080,
            auth_token: None,
            cors: true,
        }
    }
}
