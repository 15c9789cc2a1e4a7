//! Feasibility Analyzer.
//!
//! Checks supply against demand *before* the constructor spends time on an
//! instance that cannot possibly be completed: total qualified-teacher
//! capacity per subject versus total required blocks, and each course's
//! total demand against the number of slots in the week.

use crate::scheduler::masks::MaskSet;
use crate::types::{InfeasibilityReason, Snapshot, SubjectIdx, SupplyDemandRow};

/// Outcome of the pre-construction feasibility check.
#[derive(Debug, Clone)]
pub enum FeasibilityVerdict {
    Feasible {
        supply_vs_demand: Vec<SupplyDemandRow>,
    },
    Infeasible {
        reasons: Vec<InfeasibilityReason>,
        supply_vs_demand: Vec<SupplyDemandRow>,
    },
}

impl FeasibilityVerdict {
    pub fn is_feasible(&self) -> bool {
        matches!(self, FeasibilityVerdict::Feasible { .. })
    }

    pub fn supply_vs_demand(&self) -> &[SupplyDemandRow] {
        match self {
            FeasibilityVerdict::Feasible { supply_vs_demand }
            | FeasibilityVerdict::Infeasible {
                supply_vs_demand, ..
            } => supply_vs_demand,
        }
    }
}

/// Runs the supply-vs-demand analysis for every subject and every course
/// against the week's total slot count.
pub fn analyze(snapshot: &Snapshot, masks: &MaskSet) -> FeasibilityVerdict {
    let n_slots = masks.n_slots() as u32;
    let mut reasons = Vec::new();
    let mut rows = Vec::with_capacity(snapshot.n_subjects());

    for s in 0..snapshot.n_subjects() {
        let subject_idx = SubjectIdx(s as u32);
        let subject = &snapshot.subjects[s];

        let demand: u32 = snapshot
            .demand_pairs()
            .iter()
            .filter(|(_, si, _)| si.index() == s)
            .map(|(_, _, req)| *req as u32)
            .sum();

        let qualified = masks.qualified_teachers(subject_idx);
        if qualified.is_empty() && demand > 0 {
            reasons.push(InfeasibilityReason::NoQualifiedTeacher {
                subject: subject.id.clone(),
            });
        }

        let supply: u32 = qualified
            .iter()
            .map(|&t| {
                let teacher = &snapshot.teachers[t.index()];
                let capacity = teacher
                    .max_blocks_per_week
                    .map(|m| m as u32)
                    .unwrap_or(n_slots);
                capacity.min(teacher.available_count() as u32)
            })
            .sum();

        let is_bottleneck = demand > supply;
        if is_bottleneck {
            reasons.push(InfeasibilityReason::SupplyShortfall {
                subject: subject.id.clone(),
            });
        }

        rows.push(SupplyDemandRow {
            subject: subject.id.clone(),
            demand,
            supply,
            is_bottleneck,
        });
    }

    for course in &snapshot.courses {
        let cidx = snapshot.course_index[&course.id];
        let total: u32 = snapshot
            .demand_pairs()
            .iter()
            .filter(|(ci, _, _)| *ci == cidx)
            .map(|(_, _, req)| *req as u32)
            .sum();
        if total > n_slots {
            reasons.push(InfeasibilityReason::CourseOverCapacity {
                course: course.id.clone(),
            });
        }
    }

    for teacher in &snapshot.teachers {
        if teacher.available_count() == 0 && !teacher.subjects.is_empty() {
            reasons.push(InfeasibilityReason::TeacherWithoutAvailability {
                teacher: teacher.id.clone(),
            });
        }
    }

    if reasons.is_empty() {
        FeasibilityVerdict::Feasible {
            supply_vs_demand: rows,
        }
    } else {
        FeasibilityVerdict::Infeasible {
            reasons,
            supply_vs_demand: rows,
        }
    }
}
