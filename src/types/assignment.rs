use super::period::{Block, DayIdx};
use super::{CourseId, RoomId, SubjectId, TeacherId};
use serde::{Deserialize, Serialize};

/// One (course, day, block) cell resolved to (subject, teacher, room) —
/// the atomic unit of a returned solution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    pub course: CourseId,
    pub day: DayIdx,
    pub block: Block,
    pub subject: SubjectId,
    pub teacher: TeacherId,
    pub room: Option<RoomId>,
}

/// A candidate schedule under construction/refinement.
///
/// Stored as dense parallel arrays indexed by `(course, slot)` rather than
/// a `HashMap` for cache-friendly hot-path access. `-1` marks an empty
/// cell. A third parallel array tracks the room; this engine keeps room
/// occupancy dense even though room conflicts aren't a tracked hard
/// invariant (see DESIGN.md) — doing so lets repair and the constructor
/// avoid pointlessly double-booking special rooms.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub id: u64,
    n_courses: usize,
    n_slots: usize,
    subject: Vec<i32>,
    teacher: Vec<i32>,
    room: Vec<i32>,
}

impl Candidate {
    pub const EMPTY: i32 = -1;

    pub fn new(id: u64, n_courses: usize, n_slots: usize) -> Self {
        Self {
            id,
            n_courses,
            n_slots,
            subject: vec![Self::EMPTY; n_courses * n_slots],
            teacher: vec![Self::EMPTY; n_courses * n_slots],
            room: vec![Self::EMPTY; n_courses * n_slots],
        }
    }

    #[inline]
    fn cell(&self, course: usize, slot: usize) -> usize {
        course * self.n_slots + slot
    }

    pub fn n_courses(&self) -> usize {
        self.n_courses
    }

    pub fn n_slots(&self) -> usize {
        self.n_slots
    }

    pub fn is_empty_cell(&self, course: usize, slot: usize) -> bool {
        self.subject[self.cell(course, slot)] == Self::EMPTY
    }

    pub fn subject_at(&self, course: usize, slot: usize) -> Option<usize> {
        let v = self.subject[self.cell(course, slot)];
        (v >= 0).then_some(v as usize)
    }

    pub fn teacher_at(&self, course: usize, slot: usize) -> Option<usize> {
        let v = self.teacher[self.cell(course, slot)];
        (v >= 0).then_some(v as usize)
    }

    pub fn room_at(&self, course: usize, slot: usize) -> Option<usize> {
        let v = self.room[self.cell(course, slot)];
        (v >= 0).then_some(v as usize)
    }

    pub fn set(
        &mut self,
        course: usize,
        slot: usize,
        subject: usize,
        teacher: usize,
        room: Option<usize>,
    ) {
        let idx = self.cell(course, slot);
        self.subject[idx] = subject as i32;
        self.teacher[idx] = teacher as i32;
        self.room[idx] = room.map(|r| r as i32).unwrap_or(Self::EMPTY);
    }

    pub fn clear(&mut self, course: usize, slot: usize) {
        let idx = self.cell(course, slot);
        self.subject[idx] = Self::EMPTY;
        self.teacher[idx] = Self::EMPTY;
        self.room[idx] = Self::EMPTY;
    }

    pub fn clear_course(&mut self, course: usize) {
        for slot in 0..self.n_slots {
            self.clear(course, slot);
        }
    }

    pub fn clear_day(&mut self, day_slots: &[usize]) {
        for &slot in day_slots {
            for course in 0..self.n_courses {
                self.clear(course, slot);
            }
        }
    }

    /// Iterates every filled cell as (course, slot, subject, teacher, room).
    pub fn iter_filled(&self) -> impl Iterator<Item = (usize, usize, usize, usize, Option<usize>)> + '_ {
        (0..self.n_courses).flat_map(move |c| {
            (0..self.n_slots).filter_map(move |s| {
                self.subject_at(c, s)
                    .map(|subj| (c, s, subj, self.teacher_at(c, s).unwrap(), self.room_at(c, s)))
            })
        })
    }
}
