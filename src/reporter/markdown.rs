use crate::types::{SlotGrid, SolutionReport};
use std::collections::HashMap;

/// Generates a markdown report: headline table, validation status, a
/// per-course weekly grid, and the supply-vs-demand bottleneck table.
pub fn generate_markdown_report(report: &SolutionReport, grid: &SlotGrid) -> String {
    let mut lines = vec!["# Timetable Report".to_string(), String::new()];

    lines.push("## Summary\n".to_string());
    lines.push("| Metric | Value |".to_string());
    lines.push("|--------|-------|".to_string());
    lines.push(format!("| Status | {:?} |", report.status));
    lines.push(format!("| Assignments | {} |", report.assignments.len()));
    lines.push(format!(
        "| Generations | {} |",
        report.metrics.generations_completed
    ));
    lines.push(format!(
        "| Best fitness | {:.2} |",
        report.metrics.best_fitness
    ));
    lines.push(format!(
        "| Wall clock | {:.2}s |",
        report.metrics.wall_clock_seconds
    ));
    lines.push(format!("| Seed | {} |", report.seed_used));
    lines.push(String::new());

    if report.validation.is_empty() {
        lines.push("## Validation: PASSED\n".to_string());
    } else {
        lines.push("## Validation: FAILED\n".to_string());
        for v in &report.validation {
            lines.push(format!("- **{:?}**: {}", v.kind, v.message));
        }
        lines.push(String::new());
    }

    if !report.supply_vs_demand.is_empty() {
        lines.push("## Supply vs Demand\n".to_string());
        lines.push("| Subject | Demand | Supply | Bottleneck |".to_string());
        lines.push("|---------|--------|--------|------------|".to_string());
        for row in &report.supply_vs_demand {
            lines.push(format!(
                "| {} | {} | {} | {} |",
                row.subject,
                row.demand,
                row.supply,
                if row.is_bottleneck { "yes" } else { "" }
            ));
        }
        lines.push(String::new());
    }

    lines.push("## Weekly Grid by Course\n".to_string());
    let mut by_course: HashMap<&str, Vec<&crate::types::Assignment>> = HashMap::new();
    for a in &report.assignments {
        by_course.entry(a.course.0.as_str()).or_default().push(a);
    }
    let mut course_ids: Vec<&&str> = by_course.keys().collect();
    course_ids.sort();

    for course_id in course_ids {
        let mut rows = by_course[course_id].clone();
        rows.sort_by_key(|a| (a.day.0, a.block.0));

        lines.push(format!("### {course_id}\n"));
        lines.push("| Day | Block | Subject | Teacher | Room |".to_string());
        lines.push("|-----|-------|---------|---------|------|".to_string());
        for a in rows {
            let day_name = grid.day_name(a.day);
            lines.push(format!(
                "| {} | {} | {} | {} | {} |",
                day_name,
                a.block.0,
                a.subject,
                a.teacher,
                a.room.as_ref().map(|r| r.0.as_str()).unwrap_or("-")
            ));
        }
        lines.push(String::new());
    }

    lines.join("\n")
}
