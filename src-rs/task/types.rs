use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::injector::FillRequest;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedTask {
    pub title: String,
    pub description: String,
    pub acceptance_criteria: String,
}

impl GeneratedTask {
    /// The three-section layout the prompt asks for.
    pub fn to_template(&self) -> String {
        format!(
            "Title: {}\nDescription: {}\nAcceptance Criteria:\n{}",
            self.title, self.description, self.acceptance_criteria
        )
    }

    pub fn section(&self, name: &str) -> Option<&str> {
        match name {
            "title" => Some(&self.title),
            "description" => Some(&self.description),
            "acceptance" | "acceptanceCriteria" => Some(&self.acceptance_criteria),
            _ => None,
        }
    }

    pub fn to_fill_request(&self) -> FillRequest {
        FillRequest {
            title: self.title.clone(),
            description: self.description.clone(),
            acceptance_criteria: self.acceptance_criteria.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionRecord {
    pub source_text: String,
    pub generated_task: GeneratedTask,
    pub created_at: DateTime<Utc>,
}

impl ConversionRecord {
    pub fn new(source_text: &str, generated_task: GeneratedTask) -> Self {
        Self {
            source_text: source_text.to_string(),
            generated_task,
            created_at: Utc::now(),
        }
    }
}
