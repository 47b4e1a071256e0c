use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::access::Actor;
use crate::store::{Direction, Query, Record, RecordId, Store};
use crate::workflows::error::{
    degrade, optional_text, require_id, required_text, StoreResultExt, WorkflowError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentCategory {
    Syllabus,
    Curriculum,
    Handbook,
    Guide,
    Template,
    Other,
}

impl DocumentCategory {
    pub const fn label(self) -> &'static str {
        match self {
            DocumentCategory::Syllabus => "syllabus",
            DocumentCategory::Curriculum => "curriculum",
            DocumentCategory::Handbook => "handbook",
            DocumentCategory::Guide => "guide",
            DocumentCategory::Template => "template",
            DocumentCategory::Other => "other",
        }
    }
}

/// Metadata for a file held in object storage. The bytes never pass through the portal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurriculumDocument {
    pub id: RecordId,
    pub title: String,
    pub description: Option<String>,
    pub file_path: String,
    pub file_url: String,
    pub file_type: String,
    pub file_size: u64,
    pub program_id: Option<RecordId>,
    pub course_id: Option<RecordId>,
    pub category: DocumentCategory,
    pub uploaded_by: String,
    pub created_at: chrono::DateTime<Utc>,
}

impl Record for CurriculumDocument {
    const TABLE: &'static str = "curriculum_documents";

    fn id(&self) -> &RecordId {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentUpload {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub file_path: String,
    pub file_url: String,
    #[serde(default)]
    pub file_type: Option<String>,
    pub file_size: u64,
    #[serde(default)]
    pub program_id: Option<String>,
    #[serde(default)]
    pub course_id: Option<String>,
    pub category: DocumentCategory,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DocumentFilter {
    #[serde(default)]
    pub program_id: Option<String>,
    #[serde(default)]
    pub course_id: Option<String>,
    #[serde(default)]
    pub category: Option<DocumentCategory>,
}

/// MIME type for `path`, falling back to `application/octet-stream`.
pub fn infer_file_type(path: &str) -> String {
    mime_guess::from_path(Path::new(path))
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

/// Human readable size: `0 Bytes`, `512 Bytes`, `1.5 KB`, up to `GB` with at most two decimals.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = (value * 100.0).round() / 100.0;
    let text = format!("{rounded:.2}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    format!("{text} {}", UNITS[unit])
}

pub struct CurriculumLibrary<S> {
    store: Arc<S>,
}

impl<S: Store + 'static> CurriculumLibrary<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Records document metadata on behalf of `actor`, who becomes `uploaded_by`.
    pub fn upload(
        &self,
        upload: DocumentUpload,
        actor: Option<&Actor>,
    ) -> Result<CurriculumDocument, WorkflowError> {
        let actor = actor.ok_or(WorkflowError::Unauthorized("upload documents"))?;

        let file_path = required_text("file_path", &upload.file_path)?;
        let file_type = optional_text(upload.file_type)
            .unwrap_or_else(|| infer_file_type(&file_path));
        let program_id = sanitize_reference("program_id", upload.program_id.as_deref());
        let course_id = sanitize_reference("course_id", upload.course_id.as_deref());

        let document = self.store.insert(CurriculumDocument {
            id: RecordId::generate(),
            title: required_text("title", &upload.title)?,
            description: optional_text(upload.description),
            file_url: required_text("file_url", &upload.file_url)?,
            file_path,
            file_type,
            file_size: upload.file_size,
            program_id,
            course_id,
            category: upload.category,
            uploaded_by: actor.user_id().to_string(),
            created_at: Utc::now(),
        })?;
        info!(
            document_id = %document.id,
            category = document.category.label(),
            size = %format_file_size(document.file_size),
            "curriculum document recorded"
        );
        Ok(document)
    }

    /// Newest first. Malformed id filters match nothing.
    pub fn list(&self, filter: &DocumentFilter) -> Vec<CurriculumDocument> {
        let mut query = Query::new();
        for (column, raw) in [
            ("program_id", filter.program_id.as_deref()),
            ("course_id", filter.course_id.as_deref()),
        ] {
            if let Some(raw) = raw {
                let Some(id) = RecordId::parse(raw) else {
                    return Vec::new();
                };
                query = query.eq(column, id.as_str());
            }
        }
        let query = query
            .eq_opt("category", filter.category.map(DocumentCategory::label))
            .order_by("created_at", Direction::Descending);

        degrade(self.store.select(&query), "list curriculum documents")
    }

    pub fn delete(&self, document_id: &str) -> Result<(), WorkflowError> {
        let id = require_id("document", document_id)?;
        self.store
            .delete::<CurriculumDocument>(&id)
            .or_missing("document", &id)?;
        info!(document_id = %id, "curriculum document deleted");
        Ok(())
    }
}

fn sanitize_reference(field: &'static str, raw: Option<&str>) -> Option<RecordId> {
    let parsed = RecordId::parse_optional(raw);
    if parsed.is_none() {
        if let Some(raw) = raw.filter(|raw| !raw.trim().is_empty()) {
            debug!(field, value = raw, "dropping malformed document reference");
        }
    }
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;

    fn library() -> CurriculumLibrary<InMemoryStore> {
        CurriculumLibrary::new(Arc::new(InMemoryStore::new()))
    }

    fn upload(title: &str, path: &str, category: DocumentCategory) -> DocumentUpload {
        DocumentUpload {
            title: title.to_string(),
            description: None,
            file_path: path.to_string(),
            file_url: format!("https://files.example.org/{path}"),
            file_type: None,
            file_size: 1536,
            program_id: None,
            course_id: None,
            category,
        }
    }

    fn faculty() -> Actor {
        Actor::new("faculty-3").expect("actor")
    }

    #[test]
    fn file_sizes_are_humanized() {
        assert_eq!(format_file_size(0), "0 Bytes");
        assert_eq!(format_file_size(512), "512 Bytes");
        assert_eq!(format_file_size(1024), "1 KB");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(5 * 1024 * 1024 + 300 * 1024), "5.29 MB");
        assert_eq!(format_file_size(3 * 1024 * 1024 * 1024), "3 GB");
        assert_eq!(format_file_size(2048 * 1024 * 1024 * 1024), "2048 GB");
    }

    #[test]
    fn upload_requires_an_actor() {
        let library = library();
        assert!(matches!(
            library.upload(upload("Syllabus", "ot101.pdf", DocumentCategory::Syllabus), None),
            Err(WorkflowError::Unauthorized(_))
        ));
        assert!(library.list(&DocumentFilter::default()).is_empty());
    }

    #[test]
    fn upload_infers_type_and_drops_malformed_references() {
        let library = library();
        let mut request = upload("Student handbook", "handbook.pdf", DocumentCategory::Handbook);
        request.program_id = Some("program-1".to_string());

        let document = library
            .upload(request, Some(&faculty()))
            .expect("upload");

        assert_eq!(document.file_type, "application/pdf");
        assert!(document.program_id.is_none());
        assert_eq!(document.uploaded_by, "faculty-3");

        let mut explicit = upload("Template", "notes.unknownext", DocumentCategory::Template);
        explicit.file_type = Some("text/markdown".to_string());
        let document = library.upload(explicit, Some(&faculty())).expect("upload");
        assert_eq!(document.file_type, "text/markdown");
        assert_eq!(infer_file_type("archive.unknownext"), "application/octet-stream");
    }

    #[test]
    fn list_filters_by_program_and_category() {
        let library = library();
        let program = RecordId::generate();
        let mut scoped = upload("OT syllabus", "ot.pdf", DocumentCategory::Syllabus);
        scoped.program_id = Some(program.to_string());
        library.upload(scoped, Some(&faculty())).expect("upload");
        library
            .upload(upload("Guide", "guide.docx", DocumentCategory::Guide), Some(&faculty()))
            .expect("upload");

        let by_program = library.list(&DocumentFilter {
            program_id: Some(program.to_string()),
            ..DocumentFilter::default()
        });
        assert_eq!(by_program.len(), 1);
        assert_eq!(by_program[0].title, "OT syllabus");

        let guides = library.list(&DocumentFilter {
            category: Some(DocumentCategory::Guide),
            ..DocumentFilter::default()
        });
        assert_eq!(guides.len(), 1);

        let malformed = library.list(&DocumentFilter {
            course_id: Some("nope".to_string()),
            ..DocumentFilter::default()
        });
        assert!(malformed.is_empty());

        library
            .delete(guides[0].id.as_str())
            .expect("delete");
        assert_eq!(library.list(&DocumentFilter::default()).len(), 1);
    }
}
