use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Clone, Debug)]
pub struct CLIConfig {
    pub base_url: String,
    pub debug: bool,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskInfo {
    pub title: String,
    pub description: String,
    pub acceptance_criteria: String,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordInfo {
    pub source_text: String,
    pub generated_task: TaskInfo,
    pub created_at: String,
}

#[derive(Debug, Serialize)]
pub struct ConvertRequest {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct ConvertResponse {
    pub success: bool,
    pub task: Option<TaskInfo>,
    pub message: String,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FillRequest {
    pub tab_url: String,
    pub page: Value,
}

#[derive(Debug, Deserialize)]
pub struct FillResponse {
    pub success: bool,
    pub message: String,
    pub page: Value,
}
