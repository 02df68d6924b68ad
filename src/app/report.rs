use std::fmt::Write as _;

use tokio::io::{AsyncWrite, AsyncWriteExt};

use super::error::AppError;
use crate::domain::{RunStatus, Summary};
use crate::streaming::Statistics;

/// Errors and warnings listed in the text report; the rest are counted
pub const MAX_LISTED: usize = 5;

/// Human-readable run report
pub fn render_summary(summary: &Summary) -> String {
    let mut out = String::new();
    let title = if summary.dry_run {
        "Processing Summary (dry run)"
    } else {
        "Processing Summary"
    };
    let _ = writeln!(out, "{}", title);
    let _ = writeln!(out, "{}", "=".repeat(title.len()));
    let _ = writeln!(out, "Status:              {}", status_label(summary.status));
    let _ = writeln!(out, "Total files:         {}", summary.total_files);
    let _ = writeln!(out, "Successful:          {}", summary.successful_files);
    let _ = writeln!(out, "Failed:              {}", summary.failed_files);
    let _ = writeln!(out, "Skipped:             {}", summary.skipped_files);
    let _ = writeln!(out, "Records merged:      {}", summary.records_merged);
    let _ = writeln!(out, "Records not matched: {}", summary.records_not_matched);
    if let Some(duration) = summary.duration() {
        let _ = writeln!(
            out,
            "Duration:            {:.2}s",
            duration.num_milliseconds() as f64 / 1000.0
        );
    }
    if let Some(path) = &summary.backup_path {
        let _ = writeln!(out, "Backup:              {}", path.display());
    }
    if let Some(path) = &summary.output_path {
        let _ = writeln!(out, "Output:              {}", path.display());
    }

    list_section(&mut out, "Errors", &summary.errors);
    list_section(&mut out, "Warnings", &summary.warnings);
    out
}

pub fn render_statistics(stats: &Statistics) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Student files found:  {}", stats.total_discovered);
    let _ = writeln!(
        out,
        "Student files folder: {}",
        stats.student_files_folder.display()
    );
    let _ = writeln!(out, "Master sheet:         {}", stats.master_sheet_path.display());
    let _ = writeln!(out, "Max concurrent files: {}", stats.max_concurrent_files);
    let _ = writeln!(
        out,
        "Backup enabled:       {}",
        if stats.backup_enabled { "yes" } else { "no" }
    );
    out
}

/// Write the summary as text, or as pretty JSON when `json` is set
pub async fn write_summary<W>(summary: &Summary, json: bool, mut writer: W) -> Result<(), AppError>
where
    W: AsyncWrite + Unpin + Send,
{
    let body = if json {
        serde_json::to_string_pretty(summary)? + "\n"
    } else {
        render_summary(summary)
    };
    writer.write_all(body.as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}

pub async fn write_statistics<W>(stats: &Statistics, json: bool, mut writer: W) -> Result<(), AppError>
where
    W: AsyncWrite + Unpin + Send,
{
    let body = if json {
        serde_json::to_string_pretty(stats)? + "\n"
    } else {
        render_statistics(stats)
    };
    writer.write_all(body.as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}

fn status_label(status: RunStatus) -> &'static str {
    match status {
        RunStatus::Running => "running",
        RunStatus::Completed => "completed",
        RunStatus::CompletedWithFailures => "completed with failures",
        RunStatus::Cancelled => "cancelled",
        RunStatus::TimedOut => "timed out",
    }
}

fn list_section(out: &mut String, heading: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    let _ = writeln!(out, "\n{} ({}):", heading, items.len());
    for item in items.iter().take(MAX_LISTED) {
        let _ = writeln!(out, "  - {}", item);
    }
    if items.len() > MAX_LISTED {
        let _ = writeln!(out, "  ... and {} more", items.len() - MAX_LISTED);
    }
}
