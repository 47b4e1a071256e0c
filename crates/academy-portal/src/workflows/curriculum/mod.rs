//! Curriculum document bookkeeping. Files live in object storage; only metadata is kept here.

pub mod documents;
pub mod router;

pub use documents::{
    format_file_size, infer_file_type, CurriculumDocument, CurriculumLibrary, DocumentCategory,
    DocumentFilter, DocumentUpload,
};
pub use router::curriculum_router;
