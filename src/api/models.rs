//! api::models
//!
//! JSON payloads exchanged by the request handlers.

use serde::{Deserialize, Serialize};

/// Error body. Present on every non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub code: u16,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPayload {
    pub project_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StagePayload {
    pub stage_name: String,
}

/// One page of stages. The store never pages, so a single page holds all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stages {
    pub stages: Vec<StagePayload>,
    pub page_size: usize,
    pub total_count: usize,
    pub next_page_key: String,
}

impl Stages {
    pub fn single_page(stages: Vec<StagePayload>) -> Self {
        Self {
            page_size: stages.len(),
            total_count: stages.len(),
            next_page_key: String::new(),
            stages,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionPayload {
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourcePayload {
    #[serde(rename = "resourceURI")]
    pub resource_uri: String,
    #[serde(rename = "resourceContent", default)]
    pub resource_content: String,
}

/// Request body of the bulk resource writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resources {
    pub resources: Vec<ResourcePayload>,
}
