use super::SubjectId;
use serde::{Deserialize, Serialize};

/// Classification of a subject as an explicit-case enum rather than a
/// string tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubjectType {
    Mandatory,
    Filler,
    Elective,
    Project,
}

/// A subject taught across the week, with the flags that drive placement
/// and validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
    pub id: SubjectId,
    pub name: String,
    /// Default weekly blocks when a course has no explicit demand entry.
    pub default_weekly_blocks: u16,
    #[serde(default)]
    pub requires_special_room: bool,
    #[serde(default)]
    pub requires_consecutive_blocks: bool,
    #[serde(default)]
    pub is_filler: bool,
    #[serde(default)]
    pub priority: u8,
    #[serde(default)]
    pub max_per_day: Option<u8>,
    #[serde(default = "default_subject_type")]
    pub subject_type: SubjectType,
    /// Room type required when `requires_special_room` is set (e.g. "lab").
    #[serde(default)]
    pub required_room_type: Option<String>,
}

fn default_subject_type() -> SubjectType {
    SubjectType::Mandatory
}

impl Subject {
    pub fn is_filler(&self) -> bool {
        self.is_filler || matches!(self.subject_type, SubjectType::Filler)
    }
}
