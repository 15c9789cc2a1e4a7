//! Repair & Local Search.
//!
//! Runs a fixed sequence of targeted passes over a candidate that
//! crossover or mutation may have broken: clear teacher double-bookings,
//! clear assignments outside a teacher's availability, rebalance
//! over/under-supplied demand, then fill whatever empty cells remain.
//! Each pass rebuilds its own occupancy view from the candidate, so the
//! sequence can be re-run to a fixed point without accumulating stale
//! state.

use crate::scheduler::masks::{MaskSet, SlotBitset};
use crate::scheduler::constructor::{pick_room, pick_teacher};
use crate::types::{Candidate, CourseIdx, Snapshot, SubjectIdx};
use rand::seq::SliceRandom;
use rand::Rng;

struct Occupancy {
    teacher_busy: Vec<SlotBitset>,
    room_busy: Vec<SlotBitset>,
    course_busy: Vec<SlotBitset>,
}

impl Occupancy {
    fn rebuild(snapshot: &Snapshot, masks: &MaskSet, candidate: &Candidate) -> Self {
        let n_slots = masks.n_slots();
        let mut teacher_busy: Vec<SlotBitset> = (0..snapshot.n_teachers())
            .map(|_| SlotBitset::new(n_slots))
            .collect();
        let mut room_busy: Vec<SlotBitset> = (0..masks.n_rooms().max(1))
            .map(|_| SlotBitset::new(n_slots))
            .collect();
        let mut course_busy: Vec<SlotBitset> = (0..snapshot.n_courses())
            .map(|_| SlotBitset::new(n_slots))
            .collect();
        for (course, slot, _, teacher, room) in candidate.iter_filled() {
            course_busy[course].set(slot);
            teacher_busy[teacher].set(slot);
            if let Some(r) = room {
                room_busy[r].set(slot);
            }
        }
        Self {
            teacher_busy,
            room_busy,
            course_busy,
        }
    }

    /// Repopulates this occupancy view from `candidate`, reusing the
    /// existing bitset buffers instead of reallocating — cheaper than
    /// `rebuild` when the same view is refreshed across several passes.
    fn refresh(&mut self, candidate: &Candidate) {
        for bs in &mut self.teacher_busy {
            bs.clear_all();
        }
        for bs in &mut self.room_busy {
            bs.clear_all();
        }
        for bs in &mut self.course_busy {
            bs.clear_all();
        }
        for (course, slot, _, teacher, room) in candidate.iter_filled() {
            self.course_busy[course].set(slot);
            self.teacher_busy[teacher].set(slot);
            if let Some(r) = room {
                self.room_busy[r].set(slot);
            }
        }
    }
}

/// Runs every repair pass once. The refiner calls this after crossover
/// and after mutation.
pub fn repair<R: Rng + ?Sized>(
    snapshot: &Snapshot,
    masks: &MaskSet,
    candidate: &mut Candidate,
    rng: &mut R,
) {
    fix_teacher_overlaps(snapshot, masks, candidate);
    fix_availability_violations(masks, candidate);
    let mut occ = Occupancy::rebuild(snapshot, masks, candidate);
    rebalance_demand(snapshot, masks, candidate, &mut occ, rng);
    fill_empty_cells(snapshot, masks, candidate, &mut occ, rng);
}

/// Clears every assignment after the first for a teacher double-booked in
/// the same slot, in ascending course order so the result is deterministic
/// given the candidate's array layout.
fn fix_teacher_overlaps(snapshot: &Snapshot, masks: &MaskSet, candidate: &mut Candidate) {
    let n_slots = masks.n_slots();
    for slot in 0..n_slots {
        let mut claimed = vec![false; snapshot.n_teachers()];
        for course in 0..candidate.n_courses() {
            let Some(teacher) = candidate.teacher_at(course, slot) else {
                continue;
            };
            if claimed[teacher] {
                candidate.clear(course, slot);
            } else {
                claimed[teacher] = true;
            }
        }
    }
}

/// Clears assignments placed outside the teacher's declared availability.
fn fix_availability_violations(masks: &MaskSet, candidate: &mut Candidate) {
    for course in 0..candidate.n_courses() {
        for slot in 0..masks.n_slots() {
            if let Some(teacher) = candidate.teacher_at(course, slot) {
                if !masks.teacher_available(crate::types::TeacherIdx(teacher as u32), slot) {
                    candidate.clear(course, slot);
                }
            }
        }
    }
}

/// Removes surplus assignments above required demand, then places
/// deficits into empty cells where a qualified, free teacher exists.
fn rebalance_demand<R: Rng + ?Sized>(
    snapshot: &Snapshot,
    masks: &MaskSet,
    candidate: &mut Candidate,
    occ: &mut Occupancy,
    rng: &mut R,
) {
    let n_slots = masks.n_slots();

    for (course, subject, required) in snapshot.demand_pairs() {
        let mut placed_slots: Vec<usize> = (0..n_slots)
            .filter(|&slot| candidate.subject_at(course.index(), slot) == Some(subject.index()))
            .collect();
        while placed_slots.len() as u16 > required {
            if let Some(slot) = placed_slots.pop() {
                candidate.clear(course.index(), slot);
            }
        }
    }

    occ.refresh(candidate);
    let mut order: Vec<(CourseIdx, SubjectIdx, u16)> = snapshot.demand_pairs();
    order.shuffle(rng);

    for (course, subject, required) in order {
        let placed = (0..n_slots)
            .filter(|&slot| candidate.subject_at(course.index(), slot) == Some(subject.index()))
            .count() as u16;
        let mut deficit = required.saturating_sub(placed);
        if deficit == 0 {
            continue;
        }
        let mut slots: Vec<usize> = (0..n_slots)
            .filter(|&s| !occ.course_busy[course.index()].get(s))
            .collect();
        slots.shuffle(rng);
        for slot in slots {
            if deficit == 0 {
                break;
            }
            let Some(teacher) = pick_teacher(masks, &occ.teacher_busy, subject, slot) else {
                continue;
            };
            let room = pick_room(snapshot, masks, &occ.room_busy, course, subject, slot);
            candidate.set(course.index(), slot, subject.index(), teacher.index(), room);
            occ.course_busy[course.index()].set(slot);
            occ.teacher_busy[teacher.index()].set(slot);
            if let Some(r) = room {
                occ.room_busy[r].set(slot);
            }
            deficit -= 1;
        }
    }
}

/// Tops up remaining empty cells with a filler subject when the instance
/// requires every slot occupied.
fn fill_empty_cells<R: Rng + ?Sized>(
    snapshot: &Snapshot,
    masks: &MaskSet,
    candidate: &mut Candidate,
    occ: &mut Occupancy,
    rng: &mut R,
) {
    if !snapshot.config.full_week_required {
        return;
    }
    occ.refresh(candidate);
    let filler_subjects: Vec<SubjectIdx> = snapshot
        .subjects
        .iter()
        .enumerate()
        .filter(|(_, s)| s.is_filler())
        .map(|(i, _)| SubjectIdx(i as u32))
        .collect();
    if filler_subjects.is_empty() {
        return;
    }

    for course in 0..candidate.n_courses() {
        for slot in 0..masks.n_slots() {
            if occ.course_busy[course].get(slot) {
                continue;
            }
            let mut order = filler_subjects.clone();
            order.shuffle(rng);
            for subject in order {
                if let Some(teacher) = pick_teacher(masks, &occ.teacher_busy, subject, slot) {
                    let room = pick_room(
                        snapshot,
                        masks,
                        &occ.room_busy,
                        CourseIdx(course as u32),
                        subject,
                        slot,
                    );
                    candidate.set(course, slot, subject.index(), teacher.index(), room);
                    occ.course_busy[course].set(slot);
                    occ.teacher_busy[teacher.index()].set(slot);
                    if let Some(r) = room {
                        occ.room_busy[r].set(slot);
                    }
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::HashSet;

    fn snapshot_with_two_teachers() -> Snapshot {
        let mut available = HashSet::new();
        for block in 1..=2u16 {
            available.insert(Slot::new(DayIdx(0), Block(block)));
        }
        let t1 = Teacher {
            id: TeacherId("t1".into()),
            name: "T1".into(),
            subjects: vec![SubjectId("math".into())],
            max_blocks_per_week: None,
            may_teach_filler: false,
            available: available.clone(),
        };
        let t2 = Teacher {
            id: TeacherId("t2".into()),
            name: "T2".into(),
            subjects: vec![SubjectId("math".into())],
            max_blocks_per_week: None,
            may_teach_filler: false,
            available,
        };
        let instance = ProblemInstance {
            courses: vec![
                Course { id: CourseId("c1".into()), name: "1A".into(), grade: "1".into(), fixed_room: None },
                Course { id: CourseId("c2".into()), name: "1B".into(), grade: "1".into(), fixed_room: None },
            ],
            teachers: vec![t1, t2],
            subjects: vec![Subject {
                id: SubjectId("math".into()),
                name: "Math".into(),
                default_weekly_blocks: 2,
                requires_special_room: false,
                requires_consecutive_blocks: false,
                is_filler: false,
                priority: 1,
                max_per_day: None,
                subject_type: SubjectType::Mandatory,
                required_room_type: None,
            }],
            rooms: vec![],
            day_labels: vec!["Mon".into()],
            class_blocks: (1..=2).map(Block).collect(),
            curricula: vec![GradeCurriculum { grade: "1".into(), subjects: vec![SubjectId("math".into())] }],
            demand_overrides: vec![],
            config: EngineConfig { full_week_required: false, ..EngineConfig::default() },
        };
        Snapshot::build(instance).unwrap()
    }

    #[test]
    fn overlap_pass_removes_double_booking() {
        let snapshot = snapshot_with_two_teachers();
        let masks = MaskSet::build(&snapshot).unwrap();
        let mut candidate = Candidate::new(0, snapshot.n_courses(), masks.n_slots());
        candidate.set(0, 0, 0, 0, None);
        candidate.set(1, 0, 0, 0, None);
        fix_teacher_overlaps(&snapshot, &masks, &mut candidate);
        let both_filled = !candidate.is_empty_cell(0, 0) && !candidate.is_empty_cell(1, 0);
        assert!(!both_filled);
    }

    #[test]
    fn rebalance_respects_required_blocks() {
        let snapshot = snapshot_with_two_teachers();
        let masks = MaskSet::build(&snapshot).unwrap();
        let mut candidate = Candidate::new(0, snapshot.n_courses(), masks.n_slots());
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut occ = Occupancy::rebuild(&snapshot, &masks, &candidate);
        rebalance_demand(&snapshot, &masks, &mut candidate, &mut occ, &mut rng);
        let placed = (0..masks.n_slots())
            .filter(|&s| candidate.subject_at(0, s) == Some(0))
            .count();
        assert!(placed <= 2);
    }
}
