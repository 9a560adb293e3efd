//! Request and response types for the Gist REST API.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Gist metadata as returned by the API.
#[derive(Debug, Clone, Deserialize)]
pub struct Gist {
    /// Gist ID.
    pub id: String,
    /// HTML URL.
    pub html_url: String,
    /// Whether public.
    pub public: bool,
    /// Description.
    pub description: Option<String>,
    /// Created at (ISO 8601).
    pub created_at: String,
    /// Updated at (ISO 8601).
    pub updated_at: String,
    /// Files keyed by filename.
    pub files: HashMap<String, GistFile>,
    /// Whether the file list itself was truncated.
    pub truncated: Option<bool>,
}

/// A file within a gist.
///
/// The `content` returned by the metadata endpoint is a preview and may be
/// truncated for large files; full content must be fetched from `raw_url`.
#[derive(Debug, Clone, Deserialize)]
pub struct GistFile {
    /// Filename.
    pub filename: Option<String>,
    /// Declared content type.
    #[serde(rename = "type")]
    pub content_type: Option<String>,
    /// Detected language.
    pub language: Option<String>,
    /// Raw-content URL.
    pub raw_url: Option<String>,
    /// Size in bytes.
    pub size: Option<u64>,
    /// Whether the preview content is truncated.
    pub truncated: Option<bool>,
    /// Preview content.
    pub content: Option<String>,
}

/// Summary entry returned when listing gists.
#[derive(Debug, Clone, Deserialize)]
pub struct GistSummary {
    /// Gist ID.
    pub id: String,
    /// HTML URL.
    pub html_url: String,
    /// Whether public.
    pub public: bool,
    /// Description.
    pub description: Option<String>,
    /// Updated at (ISO 8601).
    pub updated_at: String,
    /// Files keyed by filename.
    pub files: HashMap<String, GistFile>,
}

/// Request to create a gist.
#[derive(Debug, Clone, Serialize)]
pub struct CreateGistRequest {
    /// Gist description.
    pub description: String,
    /// Whether the gist is public.
    pub public: bool,
    /// Files to include (filename -> content).
    pub files: HashMap<String, GistFileContent>,
}

/// Content for a gist file in create requests.
#[derive(Debug, Clone, Serialize)]
pub struct GistFileContent {
    /// File content.
    pub content: String,
}

/// Request to partially update a gist.
///
/// Only the named files are touched; the server merges the patch into the
/// existing file set. A `None` map value serializes as JSON `null`, which
/// the API interprets as "delete this file".
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateGistRequest {
    /// New gist description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Files to update or delete.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub files: Option<HashMap<String, Option<GistFileContent>>>,
}

impl UpdateGistRequest {
    /// Builds a patch that writes one file.
    pub fn write_file(filename: impl Into<String>, content: impl Into<String>) -> Self {
        let mut files = HashMap::new();
        files.insert(
            filename.into(),
            Some(GistFileContent {
                content: content.into(),
            }),
        );
        Self {
            description: None,
            files: Some(files),
        }
    }

    /// Builds a patch that deletes one file.
    pub fn delete_file(filename: impl Into<String>) -> Self {
        let mut files = HashMap::new();
        files.insert(filename.into(), None);
        Self {
            description: None,
            files: Some(files),
        }
    }

    /// Builds a patch that only changes the description.
    pub fn describe(description: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
            files: None,
        }
    }
}

/// Parameters for listing gists.
#[derive(Debug, Clone, Serialize)]
pub struct ListGistsParams {
    /// Page number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    /// Items per page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
    /// Filter by update time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub since: Option<String>,
}

impl Default for ListGistsParams {
    fn default() -> Self {
        Self {
            page: Some(1),
            per_page: Some(10),
            since: None,
        }
    }
}
