//! Check configuration types, in the frontend's field naming

use diligent_core::{CheckEntry, ConfigSummary, Configuration, Priority};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One selected check
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CheckSelection {
    #[schema(example = "config-2")]
    pub check: String,
}

impl From<CheckSelection> for CheckEntry {
    fn from(selection: CheckSelection) -> Self {
        CheckEntry::new(selection.check)
    }
}

/// New configuration as submitted by the configuration UI
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewConfigRequest {
    #[schema(example = "Lab 3: inheritance")]
    pub title: String,
    #[serde(default)]
    pub high: Vec<CheckSelection>,
    #[serde(default)]
    pub medium: Vec<CheckSelection>,
    #[serde(default)]
    pub low: Vec<CheckSelection>,
    #[serde(default)]
    #[schema(example = "40008")]
    pub course_code: Option<String>,
    #[serde(default)]
    #[schema(example = "3")]
    pub exercise_num: Option<String>,
}

impl NewConfigRequest {
    pub fn checks(&self, priority: Priority) -> &[CheckSelection] {
        match priority {
            Priority::High => &self.high,
            Priority::Medium => &self.medium,
            Priority::Low => &self.low,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct NewConfigResponse {
    pub success: bool,
    pub id: String,
}

/// Entry of the caller's configuration list
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfigListItem {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub course_code: Option<String>,
    pub exercise_num: Option<String>,
}

impl From<ConfigSummary> for ConfigListItem {
    fn from(summary: ConfigSummary) -> Self {
        Self {
            id: summary.id,
            title: summary.title,
            course_code: summary.course_code,
            exercise_num: summary.exercise_num,
        }
    }
}

/// Stored configuration with check ids per priority
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfigChecksResponse {
    pub high: Vec<String>,
    pub medium: Vec<String>,
    pub low: Vec<String>,
    pub title: String,
    pub course_code: Option<String>,
    pub exercise_num: Option<String>,
}

impl From<Configuration> for ConfigChecksResponse {
    fn from(config: Configuration) -> Self {
        let ids = |entries: Vec<CheckEntry>| -> Vec<String> {
            entries.into_iter().map(|entry| entry.check).collect()
        };
        Self {
            high: ids(config.high),
            medium: ids(config.medium),
            low: ids(config.low),
            title: config.title,
            course_code: config.course_code,
            exercise_num: config.exercise_num,
        }
    }
}

/// Inspection names per priority, as read by the IDE plugin
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PluginChecksResponse {
    #[schema(example = json!(["inheritance"]))]
    pub high: Vec<String>,
    pub medium: Vec<String>,
    pub low: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteConfigResponse {
    pub deleted: bool,
}
