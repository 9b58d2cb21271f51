// Report attachments
//
// Attachment files live under the upload directory. They are written
// there by other tools; this service registers, lists, serves and
// removes them.

use std::path::{Component, Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::{
    log::Logger,
    log_debug, log_info, log_warning,
    models::{Attachment, User},
    store::Store,
};

use super::{get_report, service::require_editor, ReportError};

/// Attachment with the contents of its file
pub struct AttachmentFile {
    pub attachment: Attachment,
    pub content_type: &'static str,
    pub data: Vec<u8>,
}

/// Content type served for a file name
pub fn content_type_for(file_name: &str) -> &'static str {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "pdf" => "application/pdf",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

/// Resolves a path relative to the upload directory
///
/// Absolute paths and paths with parent components are rejected
pub fn resolve_upload_path(upload_dir: &Path, relative: &str) -> Result<PathBuf, ReportError> {
    let path = Path::new(relative);

    let plain = !relative.trim().is_empty()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));

    if !plain {
        return Err(ReportError::InvalidAttachmentPath(relative.to_string()));
    }

    Ok(upload_dir.join(path))
}

/// Removes the file of an attachment, a missing file is not an error
pub async fn remove_attachment_file(logger: &Logger, attachment: &Attachment) {
    match tokio::fs::remove_file(&attachment.path).await {
        Ok(()) => {
            log_debug!(logger, format!("Removed attachment file: {}", attachment.path));
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            log_warning!(
                logger,
                format!("Could not remove attachment file {}: {}", attachment.path, e)
            );
        }
    }
}

/// Registers a file of the upload directory as an attachment of a report
///
/// # Arguments
///
/// * `store` - The store
/// * `logger` - The logger
/// * `upload_dir` - Root of the attachment files
/// * `editor` - User registering the file
/// * `report_id` - ID of the report
/// * `file_name` - Name shown for the file, defaults to the name on disk
/// * `relative_path` - Location of the file, relative to the upload directory
/// * `now` - Current time
#[allow(clippy::too_many_arguments)]
pub async fn register_attachment(
    store: &dyn Store,
    logger: &Logger,
    upload_dir: &Path,
    editor: &User,
    report_id: &str,
    file_name: Option<&str>,
    relative_path: &str,
    now: DateTime<Utc>,
) -> Result<Attachment, ReportError> {
    require_editor(editor)?;

    if store.find_report(report_id).await?.is_none() {
        return Err(ReportError::NotFound(report_id.to_string()));
    }

    let path = resolve_upload_path(upload_dir, relative_path)?;

    let is_file = match tokio::fs::metadata(&path).await {
        Ok(m) => m.is_file(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
        Err(e) => return Err(e.into()),
    };

    if !is_file {
        return Err(ReportError::AttachmentFileMissing(relative_path.to_string()));
    }

    let name = match file_name.map(str::trim).filter(|n| !n.is_empty()) {
        Some(n) => n.to_string(),
        None => path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default(),
    };

    let mut attachment = Attachment::new(report_id, &name, &path.to_string_lossy());
    attachment.uploaded_at = now;

    store.add_attachment(&attachment).await?;

    log_info!(
        logger,
        format!(
            "Attachment {} registered for report {} by {}",
            attachment.file_name, report_id, editor.username
        )
    );

    Ok(attachment)
}

/// Lists the attachments of a report the user can see
pub async fn list_report_attachments(
    store: &dyn Store,
    user: &User,
    report_id: &str,
) -> Result<Vec<Attachment>, ReportError> {
    get_report(store, user, report_id).await?;

    Ok(store.list_attachments(report_id).await?)
}

/// Finds an attachment whose report the user can see
async fn find_visible_attachment(
    store: &dyn Store,
    user: &User,
    id: &str,
) -> Result<Attachment, ReportError> {
    let attachment = store
        .find_attachment(id)
        .await?
        .ok_or_else(|| ReportError::AttachmentNotFound(id.to_string()))?;

    match get_report(store, user, &attachment.report_id).await {
        Ok(_) => Ok(attachment),
        Err(ReportError::NotFound(_)) => Err(ReportError::AttachmentNotFound(id.to_string())),
        Err(e) => Err(e),
    }
}

/// Reads the file of an attachment
pub async fn read_attachment(
    store: &dyn Store,
    user: &User,
    id: &str,
) -> Result<AttachmentFile, ReportError> {
    let attachment = find_visible_attachment(store, user, id).await?;

    let data = match tokio::fs::read(&attachment.path).await {
        Ok(d) => d,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ReportError::AttachmentFileMissing(attachment.file_name));
        }
        Err(e) => return Err(e.into()),
    };

    Ok(AttachmentFile {
        content_type: content_type_for(&attachment.file_name),
        attachment,
        data,
    })
}

/// Deletes an attachment and its file
pub async fn delete_attachment(
    store: &dyn Store,
    logger: &Logger,
    editor: &User,
    id: &str,
) -> Result<(), ReportError> {
    require_editor(editor)?;

    let attachment = store
        .find_attachment(id)
        .await?
        .ok_or_else(|| ReportError::AttachmentNotFound(id.to_string()))?;

    remove_attachment_file(logger, &attachment).await;

    if !store.delete_attachment(id).await? {
        return Err(ReportError::AttachmentNotFound(id.to_string()));
    }

    log_info!(
        logger,
        format!("Attachment {} deleted by {}", attachment.file_name, editor.username)
    );

    Ok(())
}

// Tests
