use crate::error::Result;
use crate::types::SolutionReport;

/// Full JSON dump of a solution report.
pub fn generate_json_report(report: &SolutionReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Compact headline numbers as JSON, for dashboards that don't want the
/// full assignment list.
#[derive(serde::Serialize)]
pub struct JsonSummary {
    pub status: String,
    pub assignment_count: usize,
    pub violation_count: usize,
    pub best_fitness: f64,
    pub generations_completed: usize,
    pub wall_clock_seconds: f64,
    pub seed_used: u64,
}

pub fn generate_json_summary(report: &SolutionReport) -> Result<String> {
    let summary = JsonSummary {
        status: format!("{:?}", report.status),
        assignment_count: report.assignments.len(),
        violation_count: report.validation.len(),
        best_fitness: report.metrics.best_fitness,
        generations_completed: report.metrics.generations_completed,
        wall_clock_seconds: report.metrics.wall_clock_seconds,
        seed_used: report.seed_used,
    };

    Ok(serde_json::to_string_pretty(&summary)?)
}
