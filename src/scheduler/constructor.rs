//! Constructive Builder.
//!
//! Produces one feasible-leaning seed candidate per call: subjects are
//! placed in scarcity order (scarcest teacher supply relative to demand
//! first) so the builder spends its freest slots on the constraints that
//! are hardest to satisfy later, then an optional filler pass tops up any
//! course left with empty slots when `full_week_required` is set.

use crate::scheduler::masks::{MaskSet, SlotBitset};
use crate::types::{Candidate, CourseIdx, Snapshot, SubjectIdx, TeacherIdx};
use rand::seq::SliceRandom;
use rand::Rng;

struct BuildState {
    teacher_busy: Vec<SlotBitset>,
    room_busy: Vec<SlotBitset>,
    course_busy: Vec<SlotBitset>,
}

impl BuildState {
    fn new(n_teachers: usize, n_rooms: usize, n_courses: usize, n_slots: usize) -> Self {
        Self {
            teacher_busy: (0..n_teachers).map(|_| SlotBitset::new(n_slots)).collect(),
            room_busy: (0..n_rooms.max(1)).map(|_| SlotBitset::new(n_slots)).collect(),
            course_busy: (0..n_courses).map(|_| SlotBitset::new(n_slots)).collect(),
        }
    }
}

/// Orders (course, subject, required_blocks) triples by descending
/// scarcity: subjects whose qualified-teacher supply is tightest relative
/// to total demand are placed first.
fn scarcity_order(snapshot: &Snapshot, masks: &MaskSet) -> Vec<(CourseIdx, SubjectIdx, u16)> {
    let mut pairs = snapshot.demand_pairs();

    let mut subject_supply = vec![0u64; snapshot.n_subjects()];
    for s in 0..snapshot.n_subjects() {
        let subject = SubjectIdx(s as u32);
        subject_supply[s] = masks
            .qualified_teachers(subject)
            .iter()
            .map(|&t| masks.teacher_availability_bits(t).count_ones() as u64)
            .sum();
    }

    pairs.sort_by_key(|(course, subject, required)| {
        let supply = subject_supply[subject.index()].max(1);
        let scarcity = (*required as u64 * 10_000) / supply;
        (std::cmp::Reverse(scarcity), course.index(), subject.index())
    });

    pairs
}

/// Picks the qualified, available, free teacher with the most remaining
/// flexibility for the given slot, so the greedy pass doesn't spend a
/// lightly-loaded teacher on a slot a heavily-booked one could also cover.
/// Shared with the repair passes, which track their own occupancy outside
/// a `BuildState`.
pub(crate) fn pick_teacher(
    masks: &MaskSet,
    teacher_busy: &[SlotBitset],
    subject: SubjectIdx,
    slot: usize,
) -> Option<TeacherIdx> {
    masks
        .qualified_teachers(subject)
        .into_iter()
        .filter(|&t| masks.teacher_available(t, slot) && !teacher_busy[t.index()].get(slot))
        .max_by_key(|&t| masks.residual_availability(t, &teacher_busy[t.index()]))
}

pub(crate) fn pick_room(
    snapshot: &Snapshot,
    masks: &MaskSet,
    room_busy: &[SlotBitset],
    course: CourseIdx,
    subject: SubjectIdx,
    slot: usize,
) -> Option<usize> {
    if let Some(fixed) = masks.fixed_room(course) {
        return (!room_busy[fixed.index()].get(slot)).then_some(fixed.index());
    }
    let required_type = snapshot.subjects[subject.index()]
        .required_room_type
        .as_deref();
    (0..masks.n_rooms()).find(|&r| {
        !room_busy[r].get(slot)
            && required_type
                .map(|t| snapshot.rooms[r].matches_type(t))
                .unwrap_or(true)
    })
}

fn place(candidate: &mut Candidate, state: &mut BuildState, course: usize, slot: usize, subject: usize, teacher: usize, room: Option<usize>) {
    candidate.set(course, slot, subject, teacher, room);
    state.course_busy[course].set(slot);
    state.teacher_busy[teacher].set(slot);
    if let Some(r) = room {
        state.room_busy[r].set(slot);
    }
}

/// Builds one seed candidate using the given RNG stream. Each candidate
/// gets its own seeded stream, never shared with another.
pub fn build_initial<R: Rng + ?Sized>(snapshot: &Snapshot, masks: &MaskSet, id: u64, rng: &mut R) -> Candidate {
    let n_slots = masks.n_slots();
    let mut candidate = Candidate::new(id, snapshot.n_courses(), n_slots);
    let mut state = BuildState::new(
        snapshot.n_teachers(),
        snapshot.n_rooms(),
        snapshot.n_courses(),
        n_slots,
    );

    let mut slot_order: Vec<usize> = (0..n_slots).collect();

    for (course, subject, required) in scarcity_order(snapshot, masks) {
        let mut remaining = required;
        slot_order.shuffle(rng);
        for &slot in &slot_order {
            if remaining == 0 {
                break;
            }
            if state.course_busy[course.index()].get(slot) {
                continue;
            }
            let Some(teacher) = pick_teacher(masks, &state.teacher_busy, subject, slot) else {
                continue;
            };
            let room = pick_room(snapshot, masks, &state.room_busy, course, subject, slot);
            place(
                &mut candidate,
                &mut state,
                course.index(),
                slot,
                subject.index(),
                teacher.index(),
                room,
            );
            remaining -= 1;
        }
        // Any undischarged `remaining` surfaces later as a DemandMismatch
        // violation; the refiner's repair pass tries to close the gap.
    }

    if snapshot.config.full_week_required {
        fill_with_filler(snapshot, masks, &mut candidate, &mut state, rng);
    }

    candidate
}

/// Tops up empty (course, slot) cells with a filler subject a qualified,
/// free teacher can cover, when the instance requires every slot occupied.
fn fill_with_filler<R: Rng + ?Sized>(
    snapshot: &Snapshot,
    masks: &MaskSet,
    candidate: &mut Candidate,
    state: &mut BuildState,
    rng: &mut R,
) {
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

    for course in 0..snapshot.n_courses() {
        for slot in 0..masks.n_slots() {
            if state.course_busy[course].get(slot) {
                continue;
            }
            let mut order = filler_subjects.clone();
            order.shuffle(rng);
            for subject in order {
                if let Some(teacher) = pick_teacher(masks, &state.teacher_busy, subject, slot) {
                    let room = pick_room(
                        snapshot,
                        masks,
                        &state.room_busy,
                        CourseIdx(course as u32),
                        subject,
                        slot,
                    );
                    place(
                        candidate,
                        state,
                        course,
                        slot,
                        subject.index(),
                        teacher.index(),
                        room,
                    );
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

    fn snapshot_two_subjects() -> Snapshot {
        let mut available = HashSet::new();
        for block in 1..=4u16 {
            available.insert(Slot::new(DayIdx(0), Block(block)));
        }
        let teacher = Teacher {
            id: TeacherId("t1".into()),
            name: "T1".into(),
            subjects: vec![SubjectId("math".into()), SubjectId("art".into())],
            max_blocks_per_week: None,
            may_teach_filler: true,
            available,
        };
        let instance = ProblemInstance {
            courses: vec![Course {
                id: CourseId("c1".into()),
                name: "1A".into(),
                grade: "1".into(),
                fixed_room: None,
            }],
            teachers: vec![teacher],
            subjects: vec![
                Subject {
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
                },
                Subject {
                    id: SubjectId("art".into()),
                    name: "Art".into(),
                    default_weekly_blocks: 0,
                    requires_special_room: false,
                    requires_consecutive_blocks: false,
                    is_filler: true,
                    priority: 1,
                    max_per_day: None,
                    subject_type: SubjectType::Filler,
                    required_room_type: None,
                },
            ],
            rooms: vec![],
            day_labels: vec!["Mon".into()],
            class_blocks: (1..=4).map(Block).collect(),
            curricula: vec![GradeCurriculum {
                grade: "1".into(),
                subjects: vec![SubjectId("math".into())],
            }],
            demand_overrides: vec![],
            config: EngineConfig {
                full_week_required: true,
                ..EngineConfig::default()
            },
        };
        Snapshot::build(instance).unwrap()
    }

    #[test]
    fn full_week_required_fills_every_slot() {
        let snapshot = snapshot_two_subjects();
        let masks = MaskSet::build(&snapshot).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let candidate = build_initial(&snapshot, &masks, 0, &mut rng);
        for slot in 0..masks.n_slots() {
            assert!(!candidate.is_empty_cell(0, slot), "slot {slot} left empty");
        }
    }

    #[test]
    fn never_double_books_the_single_teacher() {
        let snapshot = snapshot_two_subjects();
        let masks = MaskSet::build(&snapshot).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let candidate = build_initial(&snapshot, &masks, 1, &mut rng);
        let mut seen = HashSet::new();
        for (_, slot, _, teacher, _) in candidate.iter_filled() {
            assert!(seen.insert((teacher, slot)), "teacher double-booked at slot {slot}");
        }
    }
}
