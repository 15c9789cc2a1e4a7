use super::{Assignment, CourseId, SubjectId, TeacherId};
use serde::{Deserialize, Serialize};

/// Terminal status of an engine run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Success,
    Infeasible,
    Timeout,
    InternalError,
}

/// The specific hard invariant a `Violation` refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    CourseOverlap,
    TeacherOverlap,
    Availability,
    Qualification,
    Curriculum,
    DemandMismatch,
    FixedRoom,
    FullWeek,
}

/// One broken invariant on a candidate or returned solution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Violation {
    pub kind: ViolationKind,
    pub message: String,
    pub course: Option<CourseId>,
    pub teacher: Option<TeacherId>,
    pub subject: Option<SubjectId>,
}

/// Why the Feasibility Analyzer rejected an instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum InfeasibilityReason {
    SupplyShortfall { subject: SubjectId },
    CourseOverCapacity { course: CourseId },
    NoQualifiedTeacher { subject: SubjectId },
    TeacherWithoutAvailability { teacher: TeacherId },
}

/// One row of the supply-vs-demand bottleneck table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplyDemandRow {
    pub subject: SubjectId,
    pub demand: u32,
    pub supply: u32,
    pub is_bottleneck: bool,
}

/// Snapshot of progress at a generation boundary.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub generation: usize,
    pub best_fitness: f64,
    pub mean_fitness: f64,
    pub occupancy_pct: f64,
    pub conflicts: usize,
    pub elapsed_seconds: f64,
}

/// One row of the optional per-generation history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRecord {
    pub generation: usize,
    pub best_fitness: f64,
    pub mean_fitness: f64,
    pub occupancy_pct: f64,
    pub conflicts: usize,
}

/// Run-level metrics returned alongside the solution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolutionMetrics {
    pub best_fitness: f64,
    pub generations_completed: usize,
    pub wall_clock_seconds: f64,
    pub history: Vec<GenerationRecord>,
}

/// The engine's complete output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolutionReport {
    pub status: Status,
    pub assignments: Vec<Assignment>,
    pub validation: Vec<Violation>,
    pub metrics: SolutionMetrics,
    pub supply_vs_demand: Vec<SupplyDemandRow>,
    pub seed_used: u64,
    pub diagnostic: Option<String>,
}
