use super::RoomId;
use serde::{Deserialize, Serialize};

/// A physical room.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub name: String,
    pub room_type: String,
    pub capacity: u32,
}

impl Room {
    pub fn matches_type(&self, required: &str) -> bool {
        self.room_type == required
    }
}
