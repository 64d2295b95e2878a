//! Archive backend wire types.

use serde::{Deserialize, Serialize};

/// JSON body POSTed to `{backend}/archive`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveCall {
    pub url: String,
    pub tags: Vec<String>,
    pub note: String,
    /// Identifies which gate forwarded the request.
    pub source: String,
}

/// JSON body returned by the backend, on success and on failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackendResponse {
    pub success: bool,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub markdown_path: Option<String>,
    #[serde(default)]
    pub notebook_url: Option<String>,
    #[serde(default)]
    pub source_id: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub duration_ms: Option<u64>,
}

/// What a successful archive produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveOutcome {
    pub title: Option<String>,
    pub markdown_path: Option<String>,
    pub notebook_url: Option<String>,
    pub source_id: Option<String>,
}

impl From<BackendResponse> for ArchiveOutcome {
    fn from(r: BackendResponse) -> Self {
        Self {
            title: r.title,
            markdown_path: r.markdown_path,
            notebook_url: r.notebook_url,
            source_id: r.source_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_tolerates_missing_fields() {
        let r: BackendResponse = serde_json::from_str(r#"{"success":false,"error":"quota"}"#).unwrap();
        assert!(!r.success);
        assert_eq!(r.error.as_deref(), Some("quota"));
        assert!(r.markdown_path.is_none());
    }

    #[test]
    fn test_outcome_keeps_identifiers() {
        let r: BackendResponse = serde_json::from_str(
            r#"{"success":true,"title":"T","markdown_path":"notes/t.md","source_id":"s1","duration_ms":812}"#,
        )
        .unwrap();
        let outcome = ArchiveOutcome::from(r);
        assert_eq!(outcome.markdown_path.as_deref(), Some("notes/t.md"));
        assert_eq!(outcome.source_id.as_deref(), Some("s1"));
        assert!(outcome.notebook_url.is_none());
    }
}
