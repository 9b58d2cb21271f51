// Report operations

use chrono::{DateTime, Utc};

use crate::{
    log::Logger,
    log_info, log_trace, log_warning,
    models::{new_entity_id, NewReport, Report, ReportUpdate, User},
    sequence::{city_code, next_report_number},
    store::{Store, StoreError},
};

use super::{is_report_visible, remove_attachment_file, ReportError, ReportQuery};

/// Max number of report number allocations per creation
pub const MAX_CREATE_ATTEMPTS: u32 = 3;

pub(super) fn require_editor(user: &User) -> Result<(), ReportError> {
    if user.role.can_edit_reports() {
        Ok(())
    } else {
        Err(ReportError::Forbidden)
    }
}

/// Creates a report, allocating its number
///
/// If the allocated number is already taken, a new one
/// is allocated, up to MAX_CREATE_ATTEMPTS times.
///
/// # Arguments
///
/// * `store` - The store
/// * `logger` - The logger
/// * `creator` - The user creating the report
/// * `fields` - Fields of the report
/// * `now` - Current time
pub async fn create_report(
    store: &dyn Store,
    logger: &Logger,
    creator: &User,
    fields: NewReport,
    now: DateTime<Utc>,
) -> Result<Report, ReportError> {
    require_editor(creator)?;

    let project = store
        .find_project(&fields.project_id)
        .await?
        .ok_or_else(|| ReportError::ProjectNotFound(fields.project_id.clone()))?;

    let code = city_code(&fields.city)?;

    let mut report = Report {
        id: new_entity_id(),
        report_number: String::new(),
        project_id: project.id,
        project_name: project.name,
        city: fields.city.trim().to_string(),
        city_code: code.to_string(),
        equipment_name: fields.equipment_name,
        category: fields.category,
        subcategory: fields.subcategory,
        firm: fields.firm,
        location: fields.location,
        brand_model: fields.brand_model,
        serial_number: fields.serial_number,
        period: fields.period,
        valid_until: fields.valid_until,
        description: fields.description,
        compliance: fields.compliance,
        status: Default::default(),
        created_by: creator.id.clone(),
        created_by_username: creator.username.clone(),
        created_at: now,
        updated_at: now,
    };

    for attempt in 1..=MAX_CREATE_ATTEMPTS {
        report.report_number = next_report_number(store, &report.city, now).await?;

        log_trace!(
            logger,
            format!("Allocated report number {}", report.report_number)
        );

        match store.insert_report(&report).await {
            Ok(()) => {
                log_info!(
                    logger,
                    format!(
                        "Report created: {} by {}",
                        report.report_number, creator.username
                    )
                );
                return Ok(report);
            }
            Err(StoreError::DuplicateIdentifier(number)) => {
                log_warning!(
                    logger,
                    format!(
                        "Report number {} already taken (attempt {}/{})",
                        number, attempt, MAX_CREATE_ATTEMPTS
                    )
                );
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(ReportError::IdentifierCollision(MAX_CREATE_ATTEMPTS))
}

/// Lists the reports visible to a user, newest first
pub async fn list_reports(
    store: &dyn Store,
    user: &User,
    query: &ReportQuery,
) -> Result<Vec<Report>, ReportError> {
    let reports = store.list_reports().await?;
    Ok(query.apply(user, reports))
}

/// Gets a report, as long as the user can see it
pub async fn get_report(store: &dyn Store, user: &User, id: &str) -> Result<Report, ReportError> {
    match store.find_report(id).await? {
        Some(report) if is_report_visible(user, &report) => Ok(report),
        _ => Err(ReportError::NotFound(id.to_string())),
    }
}

async fn find_for_edit(store: &dyn Store, user: &User, id: &str) -> Result<Report, ReportError> {
    require_editor(user)?;

    store
        .find_report(id)
        .await?
        .ok_or_else(|| ReportError::NotFound(id.to_string()))
}

/// Applies a partial update to a report
///
/// Project and city changes refresh the derived project name
/// and city code. The report number never changes.
pub async fn update_report(
    store: &dyn Store,
    editor: &User,
    id: &str,
    mut update: ReportUpdate,
    now: DateTime<Utc>,
) -> Result<Report, ReportError> {
    let mut report = find_for_edit(store, editor, id).await?;

    let project_name = match &update.project_id {
        Some(project_id) if project_id != &report.project_id => Some(
            store
                .find_project(project_id)
                .await?
                .ok_or_else(|| ReportError::ProjectNotFound(project_id.clone()))?
                .name,
        ),
        _ => None,
    };

    let code = match &update.city {
        Some(city) => {
            let code = city_code(city)?;
            update.city = Some(city.trim().to_string());
            Some(code)
        }
        None => None,
    };

    report.apply_update(update, now);

    if let Some(name) = project_name {
        report.project_name = name;
    }

    if let Some(code) = code {
        report.city_code = code.to_string();
    }

    store.update_report(&report).await?;

    Ok(report)
}

/// Switches a report between active and passive
pub async fn toggle_report_status(
    store: &dyn Store,
    editor: &User,
    id: &str,
    now: DateTime<Utc>,
) -> Result<Report, ReportError> {
    let mut report = find_for_edit(store, editor, id).await?;

    report.status = report.status.toggled();
    report.updated_at = now;

    store.update_report(&report).await?;

    Ok(report)
}

async fn remove_report(
    store: &dyn Store,
    logger: &Logger,
    id: &str,
) -> Result<bool, ReportError> {
    for attachment in store.list_attachments(id).await? {
        remove_attachment_file(logger, &attachment).await;
    }

    Ok(store.delete_report(id).await?)
}

/// Deletes a report along with its attachments
pub async fn delete_report(
    store: &dyn Store,
    logger: &Logger,
    editor: &User,
    id: &str,
) -> Result<(), ReportError> {
    require_editor(editor)?;

    if !remove_report(store, logger, id).await? {
        return Err(ReportError::NotFound(id.to_string()));
    }

    log_info!(logger, format!("Report deleted: {} by {}", id, editor.username));

    Ok(())
}

/// Deletes several reports, ignoring the ones that do not exist
///
/// Returns the number of deleted reports
pub async fn bulk_delete_reports(
    store: &dyn Store,
    logger: &Logger,
    editor: &User,
    ids: &[String],
) -> Result<usize, ReportError> {
    require_editor(editor)?;

    let mut deleted = 0;

    for id in ids {
        if remove_report(store, logger, id).await? {
            deleted += 1;
        }
    }

    log_info!(
        logger,
        format!("Bulk deleted {} reports by {}", deleted, editor.username)
    );

    Ok(deleted)
}

// Tests
