// Report errors

use thiserror::Error;

use crate::{sequence::SequenceError, store::StoreError};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("the user is not allowed to modify reports")]
    Forbidden,

    #[error("report not found: {0}")]
    NotFound(String),

    #[error("project not found: {0}")]
    ProjectNotFound(String),

    #[error("could not allocate a free report number after {0} attempts")]
    IdentifierCollision(u32),

    #[error("attachment not found: {0}")]
    AttachmentNotFound(String),

    /// Path outside the upload directory, or not a plain relative path
    #[error("invalid attachment path: {0}")]
    InvalidAttachmentPath(String),

    #[error("attachment file not found on disk: {0}")]
    AttachmentFileMissing(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Sequence(#[from] SequenceError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("at least one report must be selected")]
    NoReportsSelected,

    #[error("at most {max} reports can be exported, {requested} were selected")]
    TooManyReports { requested: usize, max: usize },

    #[error("none of the selected reports were found")]
    ReportsNotFound,

    #[error("archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}
