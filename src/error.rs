use thiserror::Error;

/// Domain-specific errors for the scheduling engine.
///
/// Expected failure modes (infeasibility, construction shortfall, repair
/// exhaustion, budget exhaustion) are never represented here — they are
/// `SolutionReport::status` values. This enum is reserved for input errors
/// the parser/loader can't recover from and for true internal invariant
/// breaks.
#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error("Failed to read file '{path}': {source}")]
    FileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse JSON in '{file}': {message}")]
    JsonParse { file: String, message: String },

    #[error("Course '{course_id}' references unknown subject '{subject_id}'")]
    UnknownSubject {
        course_id: String,
        subject_id: String,
    },

    #[error("Duplicate ID found: {id_type} '{id}'")]
    DuplicateId { id_type: String, id: String },

    #[error("No class-type blocks or no days configured")]
    NoSchedulableSlots,

    #[error("Internal invariant broken: {0}")]
    Internal(String),
}

/// Use anyhow::Result at application boundaries.
pub type Result<T> = anyhow::Result<T>;
