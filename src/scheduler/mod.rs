pub mod constructor;
pub mod feasibility;
pub mod fitness;
pub mod masks;
pub mod refiner;
pub mod repair;

use crate::error::Result;
use crate::types::{
    Assignment, ProblemInstance, ProgressUpdate, Snapshot, SolutionMetrics, SolutionReport,
    Status,
};
use crate::validator;
use masks::MaskSet;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::sync::mpsc::Sender;
use std::time::Instant;
use tracing::{info, warn};

/// Channel the caller can use to observe generation-by-generation progress.
/// Optional — `run_engine` works fine with `None`.
pub type ProgressSender = Sender<ProgressUpdate>;

/// Runs the full pipeline: Mask Precompute, Feasibility Analysis,
/// Constructive Build, Evolutionary Refinement, Final Validation.
pub fn run_engine(instance: ProblemInstance, progress: Option<ProgressSender>) -> Result<SolutionReport> {
    let start = Instant::now();
    let seed = instance.config.seed.unwrap_or_else(default_seed);

    let snapshot = Snapshot::build(instance)?;
    info!(
        courses = snapshot.n_courses(),
        teachers = snapshot.n_teachers(),
        subjects = snapshot.n_subjects(),
        rooms = snapshot.n_rooms(),
        "snapshot built"
    );

    let masks = MaskSet::build(&snapshot)?;
    info!(slots = masks.n_slots(), "masks precomputed");

    let verdict = feasibility::analyze(&snapshot, &masks);
    let supply_vs_demand = verdict.supply_vs_demand().to_vec();

    if !verdict.is_feasible() {
        warn!("instance judged infeasible before construction");
        return Ok(SolutionReport {
            status: Status::Infeasible,
            assignments: Vec::new(),
            validation: Vec::new(),
            metrics: SolutionMetrics {
                best_fitness: f64::INFINITY,
                generations_completed: 0,
                wall_clock_seconds: start.elapsed().as_secs_f64(),
                history: Vec::new(),
            },
            supply_vs_demand,
            seed_used: seed,
            diagnostic: Some(infeasibility_message(&verdict)),
        });
    }

    let outcome = refiner::refine(&snapshot, &masks, seed);
    for record in &outcome.history {
        if let Some(sender) = &progress {
            let _ = sender.send(ProgressUpdate {
                generation: record.generation,
                best_fitness: record.best_fitness,
                mean_fitness: record.mean_fitness,
                occupancy_pct: record.occupancy_pct,
                conflicts: record.conflicts,
                elapsed_seconds: start.elapsed().as_secs_f64(),
            });
        }
    }

    let mut best = outcome.best;
    let mut best_cost = outcome.best_cost;
    let mut report = validator::validate(&snapshot, &masks, &best);

    if !report.is_empty() {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        repair::repair(&snapshot, &masks, &mut best, &mut rng);
        report = validator::validate(&snapshot, &masks, &best);
        best_cost = fitness::evaluate(&snapshot, &masks, &best);
    }

    let status = if outcome.timed_out {
        Status::Timeout
    } else if !report.is_empty() {
        Status::InternalError
    } else {
        Status::Success
    };

    let assignments = to_assignments(&snapshot, &best);

    info!(
        status = ?status,
        generations = outcome.generations_completed,
        hard_violations = best_cost.hard_violations,
        "engine finished"
    );

    Ok(SolutionReport {
        status,
        assignments,
        validation: report,
        metrics: SolutionMetrics {
            best_fitness: best_cost.cost,
            generations_completed: outcome.generations_completed,
            wall_clock_seconds: start.elapsed().as_secs_f64(),
            history: outcome.history,
        },
        supply_vs_demand,
        seed_used: seed,
        diagnostic: None,
    })
}

fn to_assignments(snapshot: &Snapshot, candidate: &crate::types::Candidate) -> Vec<Assignment> {
    candidate
        .iter_filled()
        .map(|(course, slot, subject, teacher, room)| {
            let slot_idx = crate::types::SlotIdx(slot as u32);
            let resolved = snapshot.grid.slot_at(slot_idx);
            Assignment {
                course: snapshot.courses[course].id.clone(),
                day: resolved.day,
                block: resolved.block,
                subject: snapshot.subjects[subject].id.clone(),
                teacher: snapshot.teachers[teacher].id.clone(),
                room: room.map(|r| snapshot.rooms[r].id.clone()),
            }
        })
        .collect()
}

fn infeasibility_message(verdict: &feasibility::FeasibilityVerdict) -> String {
    match verdict {
        feasibility::FeasibilityVerdict::Infeasible { reasons, .. } => reasons
            .iter()
            .map(|r| format!("{r:?}"))
            .collect::<Vec<_>>()
            .join("; "),
        feasibility::FeasibilityVerdict::Feasible { .. } => String::new(),
    }
}

fn default_seed() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}
