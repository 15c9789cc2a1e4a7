use super::{CourseId, RoomId};
use serde::{Deserialize, Serialize};

/// A course offering — one class group that meets for a block of the week
/// across several subjects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub name: String,
    pub grade: String,
    /// Room used for every assignment of this course unless the subject
    /// requires a special room.
    #[serde(default)]
    pub fixed_room: Option<RoomId>,
}
