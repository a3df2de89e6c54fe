use crate::core::RunSummary;
use crate::utils::error::ErrorKind;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// Request models
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessRequest {
    pub file_path: Option<String>,
    pub window_days: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestDateRequest {
    pub date_string: String,
    pub window_days: Option<u32>,
}

// Response models
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ProcessResponse {
    pub success: bool,
    #[serde(flatten)]
    pub summary: RunSummary,
}

impl ProcessResponse {
    pub fn success(summary: RunSummary) -> Self {
        Self {
            success: true,
            summary,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestDateResponse {
    pub date_string: String,
    pub window_days: u32,
    pub reference_date: NaiveDate,
    pub matches: bool,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub kind: ErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}
