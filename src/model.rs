use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentRole {
    Entrada,
    Saida,
}

impl DocumentRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Entrada => "entrada",
            Self::Saida => "saida",
        }
    }
}

impl fmt::Display for DocumentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request body for the analysis service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisPayload {
    pub entrada: String,
    pub saida: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentSummary {
    pub role: DocumentRole,
    pub path: String,
    pub sha256: String,
    pub page_count: usize,
    pub raw_char_count: usize,
    pub clean_char_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComparisonManifest {
    pub manifest_version: u32,
    pub run_id: String,
    pub status: String,
    pub started_at: String,
    pub updated_at: String,
    pub failure_reason: Option<String>,
    pub dry_run: bool,
    pub endpoint: Option<String>,
    pub documents: Vec<DocumentSummary>,
    pub report_char_count: Option<usize>,
    pub warnings: Vec<String>,
}
