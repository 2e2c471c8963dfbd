use crate::aggregation::{clamp_day_window, DEFAULT_DAY_WINDOW};
use crate::catalog::BranchDirectory;
use crate::comparison::ComparisonSelection;
use crate::error::{Result, SalesInsightsError};
use crate::schema::{Locale, ViewMode};
use log::debug;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_REFRESH_INTERVAL_MS: u64 = 60_000;

fn default_refresh_interval_ms() -> u64 {
    DEFAULT_REFRESH_INTERVAL_MS
}

fn default_day_window() -> usize {
    DEFAULT_DAY_WINDOW
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DashboardConfig {
    #[schemars(description = "Published CSV feed polled by the live refresh task")]
    #[serde(default)]
    pub source_url: Option<String>,

    #[schemars(description = "Milliseconds between feed refreshes. Must be greater than zero.")]
    #[serde(default = "default_refresh_interval_ms")]
    pub refresh_interval_ms: u64,

    #[schemars(description = "Trailing number of daily rows shown in the totals view. Values below 7 are raised to 7.")]
    #[serde(default = "default_day_window")]
    pub day_window: usize,

    #[schemars(description = "Which series the main chart shows")]
    #[serde(default)]
    pub view_mode: ViewMode,

    #[schemars(description = "Index into the monthly sequence for the share and leaderboard views. Defaults to the latest month.")]
    #[serde(default)]
    pub selected_month_index: Option<usize>,

    #[schemars(description = "Month and branches for the side-by-side comparison")]
    #[serde(default)]
    pub comparison: ComparisonSelection,

    #[schemars(description = "Language of the generated commentary and comparison sentences")]
    #[serde(default)]
    pub locale: Locale,

    #[schemars(description = "Display name and color per branch id")]
    #[serde(default)]
    pub branches: BranchDirectory,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            source_url: None,
            refresh_interval_ms: DEFAULT_REFRESH_INTERVAL_MS,
            day_window: DEFAULT_DAY_WINDOW,
            view_mode: ViewMode::default(),
            selected_month_index: None,
            comparison: ComparisonSelection::default(),
            locale: Locale::default(),
            branches: BranchDirectory::default(),
        }
    }
}

impl DashboardConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn validate(&self) -> Result<()> {
        if self.refresh_interval_ms == 0 {
            return Err(SalesInsightsError::InvalidConfig {
                field: "refresh_interval_ms".to_string(),
                details: "must be greater than zero".to_string(),
            });
        }

        for (id, meta) in self.branches.iter() {
            if !is_hex_color(&meta.color) {
                return Err(SalesInsightsError::InvalidConfig {
                    field: format!("branches.{}.color", id),
                    details: format!("'{}' is not a #RRGGBB color", meta.color),
                });
            }
        }

        if self.day_window < clamp_day_window(self.day_window) {
            debug!(
                "day_window {} is below the minimum and will be raised to {}",
                self.day_window,
                clamp_day_window(self.day_window)
            );
        }

        Ok(())
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }

    pub fn view_params(&self) -> ViewParams {
        ViewParams {
            day_window: clamp_day_window(self.day_window),
            view_mode: self.view_mode,
            selected_month_index: self.selected_month_index,
            comparison: self.comparison.clone(),
            locale: self.locale,
        }
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(DashboardConfig)
    }

    pub fn schema_as_json() -> std::result::Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }
}

fn is_hex_color(value: &str) -> bool {
    value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|c| c.is_ascii_hexdigit())
}

/// The caller-selected knobs a dashboard run depends on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewParams {
    pub day_window: usize,
    pub view_mode: ViewMode,
    pub selected_month_index: Option<usize>,
    pub comparison: ComparisonSelection,
    pub locale: Locale,
}

impl Default for ViewParams {
    fn default() -> Self {
        DashboardConfig::default().view_params()
    }
}
