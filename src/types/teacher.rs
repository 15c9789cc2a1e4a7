use super::{SubjectId, TeacherId};
use crate::types::period::Slot;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A teacher, qualified for a set of subjects and available for a set of
/// weekly slots.
///
/// `available` is already flattened from the catalog's
/// `{day, start-block, end-block}` ranges by the parser; the engine only
/// ever reasons about individual slots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Teacher {
    pub id: TeacherId,
    pub name: String,
    /// Subjects this teacher is qualified to teach.
    pub subjects: Vec<SubjectId>,
    /// Optional cap on blocks taught per week.
    #[serde(default)]
    pub max_blocks_per_week: Option<u16>,
    /// Whether this teacher may be assigned filler subjects.
    #[serde(default)]
    pub may_teach_filler: bool,
    /// Slots in which this teacher may teach.
    #[serde(default)]
    pub available: HashSet<Slot>,
}

impl Teacher {
    pub fn can_teach(&self, subject: &SubjectId) -> bool {
        self.subjects.contains(subject)
    }

    pub fn is_available(&self, slot: Slot) -> bool {
        self.available.contains(&slot)
    }

    pub fn available_count(&self) -> usize {
        self.available.len()
    }
}
