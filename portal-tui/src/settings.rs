//! Console settings, read from `settings.json` in the config directory.
//!
//! Every field is optional in the file; missing fields take their defaults.

use std::fs;
use std::path::Path;
use std::time::Duration;

use portal_grid::{GridConfig, PageSizeOptions, RetryConfig, SelectionScope};
use serde::{Deserialize, Serialize};
use simplelog::LevelFilter;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionPolicy {
    #[default]
    Page,
    AcrossPages,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub page_size: usize,
    pub page_size_options: Vec<usize>,
    pub search_debounce_ms: u64,
    pub skeleton_rows: usize,
    pub selection: SelectionPolicy,
    /// Simulated backend round-trip time.
    pub latency_ms: u64,
    pub max_retries: u32,
    pub log_level: String,
    pub partner_name: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            page_size: 20,
            page_size_options: vec![10, 20, 50, 100],
            search_debounce_ms: 500,
            skeleton_rows: 5,
            selection: SelectionPolicy::Page,
            latency_ms: 350,
            max_retries: 3,
            log_level: "debug".to_string(),
            partner_name: "Demo Partner".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from `path`, or defaults if the file does not exist.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        if !path.exists() {
            log::info!("No settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path)?;
        let settings = serde_json::from_str(&raw)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Base grid configuration shared by every tab.
    pub fn grid_config(&self) -> Result<GridConfig, AppError> {
        let options = PageSizeOptions::new(self.page_size_options.iter().copied())?;
        let scope = match self.selection {
            SelectionPolicy::Page => SelectionScope::VisiblePage,
            SelectionPolicy::AcrossPages => SelectionScope::AcrossPages,
        };
        Ok(GridConfig::default()
            .page_size(self.page_size)
            .page_size_options(options)
            .debounce(Duration::from_millis(self.search_debounce_ms))
            .skeleton_rows(self.skeleton_rows)
            .selection_scope(scope))
    }

    pub fn retry(&self) -> RetryConfig {
        RetryConfig::default().max_retries(self.max_retries)
    }

    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }

    pub fn level_filter(&self) -> LevelFilter {
        self.log_level.parse().unwrap_or(LevelFilter::Info)
    }
}
