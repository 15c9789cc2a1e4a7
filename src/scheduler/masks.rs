//! Mask Precomputer.
//!
//! Flattens the snapshot's relations — teacher availability, teacher
//! qualification, course-subject demand, course-fixed-room — into dense
//! boolean arrays indexed by contiguous internal indices, plus a bitset
//! form of the availability relation for the fitness evaluator and
//! repair's hot loops.

use crate::error::SchedulerError;
use crate::types::{CourseIdx, RoomIdx, Snapshot, SubjectIdx, TeacherIdx};

/// A fixed-width bitset over slot indices, used wherever a hot loop needs
/// "is this slot occupied" in O(1) without hashing a `(day, block)` pair.
#[derive(Debug, Clone)]
pub struct SlotBitset {
    words: Vec<u64>,
}

impl SlotBitset {
    pub fn new(n_slots: usize) -> Self {
        Self {
            words: vec![0u64; n_slots.div_ceil(64)],
        }
    }

    #[inline]
    pub fn get(&self, slot: usize) -> bool {
        (self.words[slot / 64] >> (slot % 64)) & 1 == 1
    }

    #[inline]
    pub fn set(&mut self, slot: usize) {
        self.words[slot / 64] |= 1u64 << (slot % 64);
    }

    #[inline]
    pub fn clear(&mut self, slot: usize) {
        self.words[slot / 64] &= !(1u64 << (slot % 64));
    }

    pub fn clear_all(&mut self) {
        self.words.iter_mut().for_each(|w| *w = 0);
    }

    pub fn count_ones(&self) -> u32 {
        self.words.iter().map(|w| w.count_ones()).sum()
    }
}

/// Precomputed boolean relations, every row O(1)-indexable.
pub struct MaskSet {
    n_teachers: usize,
    n_subjects: usize,
    n_courses: usize,
    n_rooms: usize,
    n_slots: usize,

    teacher_available: Vec<bool>,
    teacher_subject: Vec<bool>,
    course_subject: Vec<bool>,
    course_fixed_room: Vec<Option<RoomIdx>>,

    /// Same data as `teacher_available`, in bitset form for fast "residual
    /// availability" scans during construction and repair.
    teacher_available_bits: Vec<SlotBitset>,
}

impl MaskSet {
    pub fn build(snapshot: &Snapshot) -> Result<Self, SchedulerError> {
        if snapshot.grid.total_slots() == 0 {
            return Err(SchedulerError::NoSchedulableSlots);
        }

        let n_teachers = snapshot.n_teachers();
        let n_subjects = snapshot.n_subjects();
        let n_courses = snapshot.n_courses();
        let n_rooms = snapshot.n_rooms();
        let n_slots = snapshot.grid.total_slots();

        let mut teacher_available = vec![false; n_teachers * n_slots];
        let mut teacher_available_bits: Vec<SlotBitset> =
            (0..n_teachers).map(|_| SlotBitset::new(n_slots)).collect();

        for (t, teacher) in snapshot.teachers.iter().enumerate() {
            for (slot_idx, &slot) in snapshot.grid.slots().iter().enumerate() {
                if teacher.is_available(slot) {
                    teacher_available[t * n_slots + slot_idx] = true;
                    teacher_available_bits[t].set(slot_idx);
                }
            }
        }

        let mut teacher_subject = vec![false; n_teachers * n_subjects];
        for (t, teacher) in snapshot.teachers.iter().enumerate() {
            for (s, subject) in snapshot.subjects.iter().enumerate() {
                if teacher.can_teach(&subject.id) {
                    teacher_subject[t * n_subjects + s] = true;
                }
            }
        }

        let mut course_subject = vec![false; n_courses * n_subjects];
        for c in 0..n_courses {
            for s in 0..n_subjects {
                if snapshot.required_blocks(CourseIdx(c as u32), SubjectIdx(s as u32)) > 0 {
                    course_subject[c * n_subjects + s] = true;
                }
            }
        }

        let mut course_fixed_room = vec![None; n_courses];
        for (c, course) in snapshot.courses.iter().enumerate() {
            if let Some(room_id) = &course.fixed_room {
                course_fixed_room[c] = snapshot.room_index.get(room_id).copied();
            }
        }

        Ok(Self {
            n_teachers,
            n_subjects,
            n_courses,
            n_rooms,
            n_slots,
            teacher_available,
            teacher_subject,
            course_subject,
            course_fixed_room,
            teacher_available_bits,
        })
    }

    #[inline]
    pub fn teacher_available(&self, teacher: TeacherIdx, slot: usize) -> bool {
        self.teacher_available[teacher.index() * self.n_slots + slot]
    }

    #[inline]
    pub fn teacher_qualified(&self, teacher: TeacherIdx, subject: SubjectIdx) -> bool {
        self.teacher_subject[teacher.index() * self.n_subjects + subject.index()]
    }

    #[inline]
    pub fn course_requires(&self, course: CourseIdx, subject: SubjectIdx) -> bool {
        self.course_subject[course.index() * self.n_subjects + subject.index()]
    }

    pub fn fixed_room(&self, course: CourseIdx) -> Option<RoomIdx> {
        self.course_fixed_room[course.index()]
    }

    pub fn teacher_availability_bits(&self, teacher: TeacherIdx) -> &SlotBitset {
        &self.teacher_available_bits[teacher.index()]
    }

    /// Residual future availability: how many slots a teacher remains free
    /// for, used by the constructor to prefer the teacher who keeps the
    /// most flexibility.
    pub fn residual_availability(&self, teacher: TeacherIdx, occupied: &SlotBitset) -> u32 {
        let bits = &self.teacher_available_bits[teacher.index()];
        bits.words
            .iter()
            .zip(occupied.words.iter())
            .map(|(avail, busy)| (avail & !busy).count_ones())
            .sum()
    }

    /// Qualified teachers for a subject, in ascending teacher-index order.
    pub fn qualified_teachers(&self, subject: SubjectIdx) -> Vec<TeacherIdx> {
        (0..self.n_teachers)
            .filter(|&t| self.teacher_subject[t * self.n_subjects + subject.index()])
            .map(|t| TeacherIdx(t as u32))
            .collect()
    }

    pub fn n_slots(&self) -> usize {
        self.n_slots
    }
    pub fn n_rooms(&self) -> usize {
        self.n_rooms
    }
    pub fn n_courses(&self) -> usize {
        self.n_courses
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bitset_set_clear_roundtrip() {
        let mut bs = SlotBitset::new(130);
        bs.set(0);
        bs.set(64);
        bs.set(129);
        assert!(bs.get(0) && bs.get(64) && bs.get(129));
        assert!(!bs.get(1));
        assert_eq!(bs.count_ones(), 3);
        bs.clear(64);
        assert!(!bs.get(64));
        assert_eq!(bs.count_ones(), 2);
    }
}
