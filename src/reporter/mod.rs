mod json;
mod markdown;
mod text;

pub use json::{generate_json_report, generate_json_summary};
pub use markdown::generate_markdown_report;
pub use text::{generate_text_report, print_summary};

use crate::error::Result;
use crate::types::{CourseId, SlotGrid, SolutionReport, TeacherId};
use std::fs;
use std::path::Path;

/// Output format for a generated report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Markdown,
    Text,
}

/// Writes every requested report format to `output_dir`.
pub fn generate_reports(
    report: &SolutionReport,
    grid: &SlotGrid,
    output_dir: &Path,
    formats: &[OutputFormat],
) -> Result<()> {
    fs::create_dir_all(output_dir)?;

    for format in formats {
        match format {
            OutputFormat::Json => {
                let json = generate_json_report(report)?;
                fs::write(output_dir.join("report.json"), json)?;
            }
            OutputFormat::Markdown => {
                let md = generate_markdown_report(report, grid);
                fs::write(output_dir.join("report.md"), md)?;
            }
            OutputFormat::Text => {
                let txt = generate_text_report(report, grid);
                fs::write(output_dir.join("report.txt"), txt)?;
            }
        }
    }

    Ok(())
}

/// The weekly grid for a single course, or `None` if it has no assignments.
pub fn generate_course_schedule(
    report: &SolutionReport,
    grid: &SlotGrid,
    course_id: &CourseId,
) -> Option<String> {
    let mut rows: Vec<_> = report
        .assignments
        .iter()
        .filter(|a| &a.course == course_id)
        .collect();
    if rows.is_empty() {
        return None;
    }
    rows.sort_by_key(|a| (a.day.0, a.block.0));

    let mut lines = vec![format!("# Schedule for {course_id}"), String::new()];
    for a in rows {
        let day_name = grid.day_name(a.day);
        let room = a
            .room
            .as_ref()
            .map(|r| format!(" in {r}"))
            .unwrap_or_default();
        lines.push(format!(
            "{day_name} block {}: {} with {}{room}",
            a.block.0, a.subject, a.teacher
        ));
    }
    Some(lines.join("\n"))
}

/// The weekly grid for a single teacher, or `None` if they teach nothing.
pub fn generate_teacher_schedule(
    report: &SolutionReport,
    grid: &SlotGrid,
    teacher_id: &TeacherId,
) -> Option<String> {
    let mut rows: Vec<_> = report
        .assignments
        .iter()
        .filter(|a| &a.teacher == teacher_id)
        .collect();
    if rows.is_empty() {
        return None;
    }
    rows.sort_by_key(|a| (a.day.0, a.block.0));

    let mut lines = vec![format!("# Schedule for {teacher_id}"), String::new()];
    for a in rows {
        let day_name = grid.day_name(a.day);
        lines.push(format!(
            "{day_name} block {}: {} for {}",
            a.block.0, a.subject, a.course
        ));
    }
    Some(lines.join("\n"))
}
