use serde::{Deserialize, Serialize};

/// One ranked candidate in a check response.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreResultOut {
    /// Where the candidate text came from (article URL).
    pub source: String,
    pub title: Option<String>,
    /// Search keywords that surfaced this candidate, if any were used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<String>,
    /// Coverage ratio in [0.0, 1.0].
    pub score: f64,
}

#[derive(Debug, Serialize)]
pub struct CheckResp {
    pub results: Vec<ScoreResultOut>,
}

#[derive(Debug, Deserialize)]
pub struct CheckTextPayload {
    pub text: String,
    #[serde(default)]
    pub keywords: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub query: String,
    /// Wikipedia language edition override; the configured default applies
    /// when absent.
    #[serde(default)]
    pub language: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SearchHitOut {
    pub title: String,
    pub page_id: u64,
    pub snippet: String,
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct SearchResp {
    pub results: Vec<SearchHitOut>,
}
