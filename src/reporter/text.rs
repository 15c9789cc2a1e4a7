use crate::types::{SlotGrid, SolutionReport, Status};
use colored::Colorize;
use std::collections::HashMap;

/// Generates a plain-text report with terminal colors.
pub fn generate_text_report(report: &SolutionReport, grid: &SlotGrid) -> String {
    let mut lines = Vec::new();

    lines.push("=".repeat(60));
    lines.push("               TIMETABLE REPORT".to_string());
    lines.push("=".repeat(60));
    lines.push(String::new());

    lines.push("-".repeat(40));
    lines.push("STATISTICS".to_string());
    lines.push("-".repeat(40));
    lines.push(format!("  Assignments:   {}", report.assignments.len()));
    lines.push(format!(
        "  Generations:   {}",
        report.metrics.generations_completed
    ));
    lines.push(format!(
        "  Best fitness:  {:.2}",
        report.metrics.best_fitness
    ));
    lines.push(format!(
        "  Wall clock:    {:.2}s",
        report.metrics.wall_clock_seconds
    ));
    lines.push(String::new());

    lines.push("-".repeat(40));
    if report.validation.is_empty() {
        lines.push("VALIDATION: PASSED".green().to_string());
    } else {
        lines.push("VALIDATION: FAILED".red().to_string());
        for v in &report.validation {
            lines.push(format!("  ! {:?}: {}", v.kind, v.message));
        }
    }
    lines.push("-".repeat(40));
    lines.push(String::new());

    lines.push("WEEKLY GRID BY COURSE".to_string());
    lines.push("-".repeat(40));

    let mut by_course: HashMap<&str, Vec<&crate::types::Assignment>> = HashMap::new();
    for a in &report.assignments {
        by_course.entry(a.course.0.as_str()).or_default().push(a);
    }
    let mut course_ids: Vec<&&str> = by_course.keys().collect();
    course_ids.sort();

    for course_id in course_ids {
        let mut rows = by_course[course_id].clone();
        rows.sort_by_key(|a| (a.day.0, a.block.0));

        lines.push(format!("\n{}", course_id.bold()));
        for a in rows {
            let day_name = grid.day_name(a.day);
            lines.push(format!(
                "  {} B{} | {} | {}",
                day_name, a.block.0, a.subject, a.teacher
            ));
        }
    }

    lines.push(String::new());
    lines.push("=".repeat(60));

    lines.join("\n")
}

/// Prints a short colored summary to stdout, used by the CLI after a run.
pub fn print_summary(report: &SolutionReport) {
    println!();
    match report.status {
        Status::Success => println!("{}", "Schedule generated successfully".green().bold()),
        Status::Timeout => println!("{}", "Schedule generated (time budget exhausted)".yellow().bold()),
        Status::Infeasible => println!("{}", "Instance is infeasible".red().bold()),
        Status::InternalError => println!("{}", "Schedule failed final validation".red().bold()),
    }
    println!();
    println!("  Assignments: {}", report.assignments.len());
    println!("  Violations:  {}", report.validation.len());
    println!("  Fitness:     {:.2}", report.metrics.best_fitness);
    println!("  Time:        {:.2}s", report.metrics.wall_clock_seconds);
    println!();
}
