// Report archive export
//
// Archive layout:
//
//   {category}/REPORT_{number}/info.txt
//   {category}/REPORT_{number}/{attachments...}

use std::{
    collections::HashSet,
    io::{Cursor, Write},
};

use chrono::{DateTime, Utc};
use zip::{write::SimpleFileOptions, CompressionMethod, ZipWriter};

use crate::{
    log::Logger,
    log_debug, log_info, log_warning,
    models::{Report, User},
    store::Store,
    utils::{sanitize_file_name, split_extension},
};

use super::{is_report_visible, ExportError};

/// Max number of reports in a single archive
pub const MAX_EXPORT_REPORTS: usize = 100;

/// Folder for reports without a category
pub const UNCATEGORIZED_FOLDER: &str = "Uncategorized";

const NOT_SPECIFIED: &str = "Not specified";

/// Generated archive
pub struct ReportArchive {
    /// Suggested file name for the download
    pub file_name: String,

    /// Number of category folders
    pub category_count: usize,

    /// Number of report folders
    pub report_count: usize,

    /// ZIP contents
    pub data: Vec<u8>,
}

fn check_selection_size(count: usize) -> Result<(), ExportError> {
    if count == 0 {
        return Err(ExportError::NoReportsSelected);
    }

    if count > MAX_EXPORT_REPORTS {
        return Err(ExportError::TooManyReports {
            requested: count,
            max: MAX_EXPORT_REPORTS,
        });
    }

    Ok(())
}

/// Name of the folder of a category
pub fn category_folder_name(category: &str) -> String {
    if category.trim().is_empty() {
        UNCATEGORIZED_FOLDER.to_string()
    } else {
        sanitize_file_name(category, "-_ ()")
    }
}

/// Name of the folder of a report
pub fn report_folder_name(report_number: &str) -> String {
    format!("REPORT_{}", sanitize_file_name(report_number, "-_"))
}

/// Picks a name not used yet in a folder, adding _1, _2... before the extension
fn unique_file_name(used: &mut HashSet<String>, name: &str) -> String {
    if used.insert(name.to_string()) {
        return name.to_string();
    }

    let (base, ext) = split_extension(name);
    let mut n = 1;

    loop {
        let candidate = format!("{}_{}{}", base, n, ext);

        if used.insert(candidate.clone()) {
            return candidate;
        }

        n += 1;
    }
}

fn or_not_specified(value: &Option<String>) -> &str {
    match value.as_deref() {
        Some(v) if !v.is_empty() => v,
        _ => NOT_SPECIFIED,
    }
}

fn or_not_specified_str(value: &str) -> &str {
    if value.is_empty() {
        NOT_SPECIFIED
    } else {
        value
    }
}

/// Renders the info.txt of a report
pub fn render_report_info(report: &Report, now: DateTime<Utc>) -> String {
    let mut info = String::new();

    info.push_str("REPORT INFORMATION\n");
    info.push_str("==================\n\n");

    let created = report.created_at.format("%Y-%m-%d").to_string();

    let fields: [(&str, &str); 16] = [
        ("Report number", or_not_specified_str(&report.report_number)),
        ("Created", &created),
        ("Firm", or_not_specified_str(&report.firm)),
        ("Equipment", or_not_specified_str(&report.equipment_name)),
        ("Category", or_not_specified_str(&report.category)),
        ("Subcategory", or_not_specified(&report.subcategory)),
        ("Location", or_not_specified(&report.location)),
        ("Brand / model", or_not_specified(&report.brand_model)),
        ("Serial number", or_not_specified(&report.serial_number)),
        ("Period", or_not_specified(&report.period)),
        ("Valid until", or_not_specified(&report.valid_until)),
        ("Compliance", or_not_specified(&report.compliance)),
        ("City", or_not_specified_str(&report.city)),
        ("Project", or_not_specified_str(&report.project_name)),
        ("Created by", or_not_specified_str(&report.created_by_username)),
        ("Status", report.status.as_str()),
    ];

    for (label, value) in fields.iter() {
        info.push_str(&format!("{:<16}: {}\n", label, value));
    }

    info.push_str("\nDESCRIPTION\n");
    info.push_str("-----------\n");

    match report.description.as_deref() {
        Some(d) if !d.is_empty() => info.push_str(d),
        _ => info.push_str("No description."),
    }

    info.push_str(&format!(
        "\n\nGenerated: {} UTC\n",
        now.format("%d.%m.%Y %H:%M:%S")
    ));

    info
}

/// Contents of a report folder
struct ReportFolder {
    path: String,
    info: String,
    files: Vec<(String, Vec<u8>)>,
}

/// Reads the attachments of a report that still exist on disk
async fn collect_attachments(
    store: &dyn Store,
    logger: &Logger,
    report: &Report,
) -> Result<Vec<(String, Vec<u8>)>, ExportError> {
    let mut used_names: HashSet<String> = HashSet::new();
    used_names.insert("info.txt".to_string());

    let mut files = Vec::new();

    for (i, attachment) in store.list_attachments(&report.id).await?.iter().enumerate() {
        let content = match tokio::fs::read(&attachment.path).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log_debug!(
                    logger,
                    format!("Skipping missing attachment file: {}", attachment.path)
                );
                continue;
            }
            Err(e) => {
                log_warning!(
                    logger,
                    format!("Could not read attachment file {}: {}", attachment.path, e)
                );
                continue;
            }
        };

        let base_name = if attachment.file_name.is_empty() {
            format!("file_{}", i)
        } else {
            sanitize_file_name(&attachment.file_name, ".-_")
        };

        files.push((unique_file_name(&mut used_names, &base_name), content));
    }

    Ok(files)
}

fn write_archive(
    category_folders: &[String],
    report_folders: &[ReportFolder],
) -> Result<Vec<u8>, ExportError> {
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

    for folder in category_folders {
        zip.add_directory(format!("{}/", folder), options)?;
    }

    for folder in report_folders {
        zip.add_directory(format!("{}/", folder.path), options)?;

        zip.start_file(format!("{}/info.txt", folder.path), options)?;
        zip.write_all(folder.info.as_bytes())?;

        for (name, content) in folder.files.iter() {
            zip.start_file(format!("{}/{}", folder.path, name), options)?;
            zip.write_all(content)?;
        }
    }

    Ok(zip.finish()?.into_inner())
}

/// Builds the archive of a set of reports
///
/// Attachments whose file no longer exists are skipped.
///
/// # Arguments
///
/// * `store` - The store, to find the attachments
/// * `logger` - The logger
/// * `reports` - Reports to include
/// * `now` - Generation time
pub async fn build_report_archive(
    store: &dyn Store,
    logger: &Logger,
    reports: &[Report],
    now: DateTime<Utc>,
) -> Result<ReportArchive, ExportError> {
    check_selection_size(reports.len())?;

    // Group by category, keeping the order of first appearance
    let mut groups: Vec<(String, Vec<&Report>)> = Vec::new();

    for report in reports {
        let folder = category_folder_name(&report.category);

        match groups.iter_mut().find(|(f, _)| f == &folder) {
            Some((_, list)) => list.push(report),
            None => groups.push((folder, vec![report])),
        }
    }

    let mut report_folders = Vec::with_capacity(reports.len());

    for (category_folder, group) in groups.iter() {
        for report in group {
            report_folders.push(ReportFolder {
                path: format!(
                    "{}/{}",
                    category_folder,
                    report_folder_name(&report.report_number)
                ),
                info: render_report_info(report, now),
                files: collect_attachments(store, logger, report).await?,
            });
        }
    }

    let category_folders: Vec<String> = groups.iter().map(|(f, _)| f.clone()).collect();
    let data = write_archive(&category_folders, &report_folders)?;

    let archive = ReportArchive {
        file_name: format!(
            "Reports_{}Categories_{}Reports_{}.zip",
            category_folders.len(),
            reports.len(),
            now.format("%Y%m%d_%H%M")
        ),
        category_count: category_folders.len(),
        report_count: reports.len(),
        data,
    };

    log_info!(
        logger,
        format!(
            "Built archive {} ({} bytes)",
            archive.file_name,
            archive.data.len()
        )
    );

    Ok(archive)
}

/// Exports the selected reports visible to a user
///
/// Unknown or hidden report IDs are ignored, as long as
/// at least one selected report can be exported.
pub async fn export_reports(
    store: &dyn Store,
    logger: &Logger,
    user: &User,
    report_ids: &[String],
    now: DateTime<Utc>,
) -> Result<ReportArchive, ExportError> {
    check_selection_size(report_ids.len())?;

    let mut reports = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();

    for id in report_ids {
        if !seen.insert(id.as_str()) {
            continue;
        }

        if let Some(report) = store.find_report(id).await? {
            if is_report_visible(user, &report) {
                reports.push(report);
            }
        }
    }

    if reports.is_empty() {
        return Err(ExportError::ReportsNotFound);
    }

    build_report_archive(store, logger, &reports, now).await
}

// Tests
