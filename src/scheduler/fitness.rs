//! Fitness Evaluator.
//!
//! Scores a candidate as a single `cost` value the refiner minimizes: hard
//! invariant breaks dominate via a fixed penalty so the search never
//! prefers a cheaper-but-infeasible candidate over an expensive-but-feasible
//! one, and a weighted soft cost (gaps, fringe placement, load balance),
//! each normalized to [0,1] before weighting, ranks among otherwise-feasible
//! candidates. Runs over the dense `Candidate` arrays and `SlotBitset`s
//! rather than per-cell lookups.

use crate::scheduler::masks::{MaskSet, SlotBitset};
use crate::types::{Candidate, CourseIdx, Snapshot, SubjectIdx, TeacherIdx, Violation, ViolationKind};

/// Penalty applied per hard invariant break, large enough that no
/// combination of soft-cost savings can outweigh a single violation.
pub const HARD_PENALTY: f64 = 1_000.0;

#[derive(Debug, Clone, Copy, Default)]
pub struct FitnessBreakdown {
    pub hard_violations: u32,
    pub soft_cost: f64,
    pub cost: f64,
}

/// Computes the cost of a candidate. Lower is better; zero hard
/// violations and zero soft cost is a perfect schedule.
pub fn evaluate(snapshot: &Snapshot, masks: &MaskSet, candidate: &Candidate) -> FitnessBreakdown {
    let n_slots = masks.n_slots();
    let mut teacher_occ: Vec<SlotBitset> = (0..snapshot.n_teachers())
        .map(|_| SlotBitset::new(n_slots))
        .collect();
    let mut room_occ: Vec<SlotBitset> = (0..masks.n_rooms().max(1))
        .map(|_| SlotBitset::new(n_slots))
        .collect();

    let mut hard = 0u32;

    for (course, slot, subject, teacher, room) in candidate.iter_filled() {
        let teacher_idx = TeacherIdx(teacher as u32);
        let subject_idx = SubjectIdx(subject as u32);
        let course_idx = CourseIdx(course as u32);

        if teacher_occ[teacher].get(slot) {
            hard += 1;
        } else {
            teacher_occ[teacher].set(slot);
        }

        if !masks.teacher_available(teacher_idx, slot) {
            hard += 1;
        }
        if !masks.teacher_qualified(teacher_idx, subject_idx) {
            hard += 1;
        }
        if !snapshot.subjects[subject].is_filler() && !masks.course_requires(course_idx, subject_idx) {
            hard += 1;
        }
        if let Some(fixed) = masks.fixed_room(course_idx) {
            if room != Some(fixed.index()) {
                hard += 1;
            }
        }
        if let Some(r) = room {
            if room_occ[r].get(slot) {
                hard += 1;
            } else {
                room_occ[r].set(slot);
            }
        }
    }

    for (course, subject, required) in snapshot.demand_pairs() {
        let placed = (0..n_slots)
            .filter(|&slot| {
                candidate.subject_at(course.index(), slot) == Some(subject.index())
            })
            .count() as u16;
        if placed != required {
            hard += placed.abs_diff(required) as u32;
        }
    }

    if snapshot.config.full_week_required {
        for c in 0..candidate.n_courses() {
            for s in 0..n_slots {
                if candidate.is_empty_cell(c, s) {
                    hard += 1;
                }
            }
        }
    }

    let soft_cost = soft_cost(snapshot, masks, candidate);

    FitnessBreakdown {
        hard_violations: hard,
        soft_cost,
        cost: hard as f64 * HARD_PENALTY + soft_cost,
    }
}

/// Each component is normalized to roughly [0,1] per course before the
/// configured weights are applied, so the weights trade off comparable
/// quantities rather than raw counts of differing scale: gaps against the
/// most gaps a day's span could hold, fringe placements against the most
/// fringe cells a day offers, and day-balance against the standard
/// deviation a maximally lopsided week would produce.
fn soft_cost(snapshot: &Snapshot, masks: &MaskSet, candidate: &Candidate) -> f64 {
    let cfg = &snapshot.config;
    let days = snapshot.grid.days().max(1);
    let blocks_per_day = masks.n_slots() / days;
    let n_courses = candidate.n_courses();
    if blocks_per_day == 0 || n_courses == 0 {
        return 0.0;
    }

    let window = (cfg.fringe_window as usize).min(blocks_per_day);
    let max_gaps_per_course = (days * blocks_per_day.saturating_sub(2)) as f64;
    let max_fringe_per_course = (days * (window * 2).min(blocks_per_day)) as f64;

    let mut gaps_raw = 0.0;
    let mut fringe_raw = 0.0;
    let mut balance_norm_sum = 0.0;

    for course in 0..n_courses {
        let mut per_day_counts = vec![0u32; days];
        for day in 0..days {
            let base = day * blocks_per_day;
            let filled: Vec<bool> = (0..blocks_per_day)
                .map(|b| !candidate.is_empty_cell(course, base + b))
                .collect();
            per_day_counts[day] = filled.iter().filter(|&&f| f).count() as u32;

            if let (Some(first), Some(last)) = (
                filled.iter().position(|&f| f),
                filled.iter().rposition(|&f| f),
            ) {
                gaps_raw += filled[first..=last].iter().filter(|&&f| !f).count() as f64;
            }

            for b in 0..window {
                if filled[b] {
                    fringe_raw += 1.0;
                }
            }
            for b in blocks_per_day.saturating_sub(window)..blocks_per_day {
                if filled[b] {
                    fringe_raw += 1.0;
                }
            }
        }

        let total: u32 = per_day_counts.iter().sum();
        let mean = total as f64 / days as f64;
        let std_dev = (per_day_counts.iter().map(|&c| (c as f64 - mean).powi(2)).sum::<f64>() / days as f64).sqrt();
        let worst_case = worst_case_std_dev(total, days);
        if worst_case > 0.0 {
            balance_norm_sum += std_dev / worst_case;
        }
    }

    let gaps_norm = if max_gaps_per_course > 0.0 {
        gaps_raw / (max_gaps_per_course * n_courses as f64)
    } else {
        0.0
    };
    let fringe_norm = if max_fringe_per_course > 0.0 {
        fringe_raw / (max_fringe_per_course * n_courses as f64)
    } else {
        0.0
    };
    let balance_norm = balance_norm_sum / n_courses as f64;

    cfg.w_gaps * gaps_norm + cfg.w_fringe * fringe_norm + cfg.w_balance * balance_norm
}

/// Standard deviation of `total` placements spread over `days` days when
/// maximally lopsided (all on one day, the rest empty) — the denominator
/// that normalizes a course's day-balance contribution to [0,1].
fn worst_case_std_dev(total: u32, days: usize) -> f64 {
    if days == 0 || total == 0 {
        return 0.0;
    }
    let mean = total as f64 / days as f64;
    let variance = ((total as f64 - mean).powi(2) + (days as f64 - 1.0) * mean.powi(2)) / days as f64;
    variance.sqrt()
}

/// Re-derives the explicit `Violation` list for a candidate, used by the
/// Final Validator and by reports. Independent pass from `evaluate` so the
/// validator never trusts the GA's running tally.
pub fn violations(snapshot: &Snapshot, masks: &MaskSet, candidate: &Candidate) -> Vec<Violation> {
    let n_slots = masks.n_slots();
    let mut teacher_occ: Vec<SlotBitset> = (0..snapshot.n_teachers())
        .map(|_| SlotBitset::new(n_slots))
        .collect();
    let mut room_occ: Vec<SlotBitset> = (0..masks.n_rooms().max(1))
        .map(|_| SlotBitset::new(n_slots))
        .collect();
    let mut out = Vec::new();

    for (course, slot, subject, teacher, room) in candidate.iter_filled() {
        let teacher_id = snapshot.teachers[teacher].id.clone();
        let subject_id = snapshot.subjects[subject].id.clone();
        let course_id = snapshot.courses[course].id.clone();
        let teacher_idx = TeacherIdx(teacher as u32);
        let subject_idx = SubjectIdx(subject as u32);
        let course_idx = CourseIdx(course as u32);

        if teacher_occ[teacher].get(slot) {
            out.push(Violation {
                kind: ViolationKind::TeacherOverlap,
                message: format!("teacher {teacher_id} double-booked at slot {slot}"),
                course: Some(course_id.clone()),
                teacher: Some(teacher_id.clone()),
                subject: Some(subject_id.clone()),
            });
        } else {
            teacher_occ[teacher].set(slot);
        }

        if !masks.teacher_available(teacher_idx, slot) {
            out.push(Violation {
                kind: ViolationKind::Availability,
                message: format!("teacher {teacher_id} not available at slot {slot}"),
                course: Some(course_id.clone()),
                teacher: Some(teacher_id.clone()),
                subject: Some(subject_id.clone()),
            });
        }
        if !masks.teacher_qualified(teacher_idx, subject_idx) {
            out.push(Violation {
                kind: ViolationKind::Qualification,
                message: format!("teacher {teacher_id} unqualified for {subject_id}"),
                course: Some(course_id.clone()),
                teacher: Some(teacher_id.clone()),
                subject: Some(subject_id.clone()),
            });
        }
        if !snapshot.subjects[subject].is_filler() && !masks.course_requires(course_idx, subject_idx) {
            out.push(Violation {
                kind: ViolationKind::Curriculum,
                message: format!("course {course_id} has {subject_id} outside its required subject set"),
                course: Some(course_id.clone()),
                teacher: Some(teacher_id.clone()),
                subject: Some(subject_id.clone()),
            });
        }
        if let Some(fixed) = masks.fixed_room(course_idx) {
            if room != Some(fixed.index()) {
                out.push(Violation {
                    kind: ViolationKind::FixedRoom,
                    message: format!("course {course_id} not placed in its fixed room at slot {slot}"),
                    course: Some(course_id.clone()),
                    teacher: Some(teacher_id.clone()),
                    subject: Some(subject_id.clone()),
                });
            }
        }
        if let Some(r) = room {
            if room_occ[r].get(slot) {
                out.push(Violation {
                    kind: ViolationKind::CourseOverlap,
                    message: format!("room double-booked at slot {slot}"),
                    course: Some(course_id.clone()),
                    teacher: Some(teacher_id.clone()),
                    subject: Some(subject_id.clone()),
                });
            } else {
                room_occ[r].set(slot);
            }
        }
    }

    for (course, subject, required) in snapshot.demand_pairs() {
        let placed = (0..n_slots)
            .filter(|&slot| candidate.subject_at(course.index(), slot) == Some(subject.index()))
            .count() as u16;
        if placed != required {
            out.push(Violation {
                kind: ViolationKind::DemandMismatch,
                message: format!(
                    "course {} requires {required} blocks of {} but has {placed}",
                    snapshot.courses[course.index()].id,
                    snapshot.subjects[subject.index()].id
                ),
                course: Some(snapshot.courses[course.index()].id.clone()),
                teacher: None,
                subject: Some(snapshot.subjects[subject.index()].id.clone()),
            });
        }
    }

    if snapshot.config.full_week_required {
        for c in 0..candidate.n_courses() {
            for s in 0..n_slots {
                if candidate.is_empty_cell(c, s) {
                    out.push(Violation {
                        kind: ViolationKind::FullWeek,
                        message: format!("course {} has an empty slot {s}", snapshot.courses[c].id),
                        course: Some(snapshot.courses[c].id.clone()),
                        teacher: None,
                        subject: None,
                    });
                }
            }
        }
    }

    out
}
