//! Document summary and content types.

use quire_storage::DocumentId;
use serde::Serialize;

use crate::metadata::DocumentMetadata;

/// Index entry for one document.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentSummary {
    pub id: DocumentId,
    /// Header title, or the decoded identifier when the header has none.
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<f64>,
}

impl DocumentSummary {
    /// Build a summary from parsed metadata.
    #[must_use]
    pub fn new(id: DocumentId, metadata: DocumentMetadata) -> Self {
        let title = metadata.title.unwrap_or_else(|| id.display_name());
        Self {
            id,
            title,
            description: metadata.description,
            order: metadata.order,
        }
    }
}

/// A fully rendered document.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentContent {
    pub id: DocumentId,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<f64>,
    /// Body converted to HTML.
    pub rendered_body: String,
}

impl DocumentContent {
    #[must_use]
    pub fn new(id: DocumentId, metadata: DocumentMetadata, rendered_body: String) -> Self {
        let DocumentSummary {
            id,
            title,
            description,
            order,
        } = DocumentSummary::new(id, metadata);
        Self {
            id,
            title,
            description,
            order,
            rendered_body,
        }
    }
}
