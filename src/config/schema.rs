//! Config schema and deserialization

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Service address used when nothing else is configured
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000/api";

/// User-facing status texts
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Messages {
    /// Shown while the upload and fetch are in flight
    pub progress: String,
    /// Shown after rendering when the upload response carries no message
    pub success: String,
    /// Shown for every failed cycle, whatever the stage
    pub failure: String,
    /// Blocking warning when no dataset is selected
    pub no_file: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            progress: "Uploading and analyzing data...".to_string(),
            success: "Processing complete!".to_string(),
            failure: "Error while processing data!".to_string(),
            no_file: "Please choose a financial statement CSV file!".to_string(),
        }
    }
}

/// Substring tokens that decide the recommendation tier
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RecommendationTokens {
    pub positive: Vec<String>,
    pub caution: Vec<String>,
}

impl Default for RecommendationTokens {
    fn default() -> Self {
        Self {
            positive: vec!["Nên".into(), "Approve".into(), "Should lend".into()],
            caution: vec!["xem xét".into(), "Consider".into(), "review".into()],
        }
    }
}

/// Root config structure for .riskboardrc.json
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Scoring service base address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Write an HTML dashboard to this path (relative to the config file)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<PathBuf>,

    /// Terminal colors. Default: true
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<bool>,

    #[serde(default)]
    pub messages: Messages,

    #[serde(default)]
    pub recommendation_tokens: RecommendationTokens,
}

/// Command-line values that take precedence over the file
#[derive(Debug, Clone, Default)]
pub struct CliOverrides<'a> {
    /// `--base-url` or `RISKBOARD_BASE_URL`
    pub base_url: Option<&'a str>,
    pub html: Option<&'a Path>,
    pub no_color: bool,
}

/// Settings after merging CLI values, config file, and defaults
#[derive(Debug, Clone)]
pub struct EffectiveConfig {
    pub base_url: String,
    pub html: Option<PathBuf>,
    pub use_colors: bool,
    pub messages: Messages,
    pub recommendation_tokens: RecommendationTokens,
}

impl Config {
    /// Resolve relative paths against the directory holding the config file
    pub(crate) fn rebase_paths(&mut self, config_dir: &Path) {
        if let Some(html) = self.html.as_mut() {
            if html.is_relative() {
                *html = config_dir.join(&*html);
            }
        }
    }

    /// Merge with command-line overrides
    pub fn effective(&self, overrides: &CliOverrides<'_>) -> EffectiveConfig {
        let base_url = overrides
            .base_url
            .map(str::to_string)
            .or_else(|| self.base_url.clone())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let html = overrides
            .html
            .map(Path::to_path_buf)
            .or_else(|| self.html.clone());

        EffectiveConfig {
            base_url,
            html,
            use_colors: !overrides.no_color && self.color.unwrap_or(true),
            messages: self.messages.clone(),
            recommendation_tokens: self.recommendation_tokens.clone(),
        }
    }
}
