//! Evolutionary Refiner.
//!
//! Runs a generational genetic algorithm seeded by the Constructive
//! Builder's population: tournament selection, day-wise crossover,
//! course-clearing mutation repaired back to validity, elitism, and
//! periodic large-neighborhood-search kicks to escape plateaus. Adaptive
//! mutation raises pressure while the best candidate is stale and resets
//! it on improvement. Population fitness is evaluated with `rayon` when
//! more than one worker is configured.

use crate::scheduler::constructor::build_initial;
use crate::scheduler::fitness::{evaluate, FitnessBreakdown};
use crate::scheduler::masks::MaskSet;
use crate::scheduler::repair::repair;
use crate::types::{Candidate, EngineConfig, GenerationRecord, Snapshot};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::time::Instant;

pub struct RefinerOutcome {
    pub best: Candidate,
    pub best_cost: FitnessBreakdown,
    pub generations_completed: usize,
    pub history: Vec<GenerationRecord>,
    pub timed_out: bool,
}

/// Derives a distinct seed per population slot from the run seed, so every
/// candidate gets its own reproducible stream.
fn slot_rng(seed: u64, slot: usize) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed ^ (slot as u64).wrapping_mul(0x9E3779B97F4A7C15))
}

fn evaluate_population(
    snapshot: &Snapshot,
    masks: &MaskSet,
    population: &[Candidate],
    workers: usize,
) -> Vec<FitnessBreakdown> {
    if workers > 1 {
        use rayon::prelude::*;
        population
            .par_iter()
            .map(|c| evaluate(snapshot, masks, c))
            .collect()
    } else {
        population.iter().map(|c| evaluate(snapshot, masks, c)).collect()
    }
}

fn tournament_select<'a>(
    population: &'a [Candidate],
    costs: &[FitnessBreakdown],
    size: usize,
    rng: &mut impl Rng,
) -> &'a Candidate {
    let mut best = (0..population.len()).collect::<Vec<_>>();
    best.shuffle(rng);
    let pick = &best[..size.min(best.len())];
    let winner = *pick
        .iter()
        .min_by(|&&a, &&b| costs[a].cost.partial_cmp(&costs[b].cost).unwrap())
        .unwrap();
    &population[winner]
}

/// Day-wise crossover: for each day, the child inherits every course's
/// slots for that day from one parent or the other, chosen per day.
fn crossover(
    snapshot: &Snapshot,
    masks: &MaskSet,
    a: &Candidate,
    b: &Candidate,
    rng: &mut impl Rng,
) -> Candidate {
    let n_slots = masks.n_slots();
    let blocks_per_day = n_slots / snapshot.grid.days().max(1);
    let mut child = Candidate::new(0, a.n_courses(), n_slots);

    for day in 0..snapshot.grid.days() {
        let parent = if rng.gen_bool(0.5) { a } else { b };
        let base = day * blocks_per_day;
        for course in 0..child.n_courses() {
            for offset in 0..blocks_per_day {
                let slot = base + offset;
                if let (Some(subject), Some(teacher)) =
                    (parent.subject_at(course, slot), parent.teacher_at(course, slot))
                {
                    child.set(course, slot, subject, teacher, parent.room_at(course, slot));
                }
            }
        }
    }
    child
}

/// Clears a random course's assignments on a random day, letting repair
/// refill it — the genetic algorithm's mutation operator.
fn mutate(snapshot: &Snapshot, masks: &MaskSet, candidate: &mut Candidate, rng: &mut impl Rng) {
    let blocks_per_day = masks.n_slots() / snapshot.grid.days().max(1);
    let day = rng.gen_range(0..snapshot.grid.days());
    let course = rng.gen_range(0..candidate.n_courses());
    let base = day * blocks_per_day;
    for offset in 0..blocks_per_day {
        candidate.clear(course, base + offset);
    }
}

/// A stronger kick than mutation, used to escape plateaus: either clears a
/// random `lns_fraction` of courses entirely, or clears every course's
/// assignments on one random day — a wider neighborhood than the
/// per-course mutation operator reaches.
fn lns_kick(snapshot: &Snapshot, masks: &MaskSet, candidate: &mut Candidate, fraction: f64, rng: &mut impl Rng) {
    if rng.gen_bool(0.5) {
        let blocks_per_day = masks.n_slots() / snapshot.grid.days().max(1);
        let day = rng.gen_range(0..snapshot.grid.days());
        let base = day * blocks_per_day;
        let day_slots: Vec<usize> = (base..base + blocks_per_day).collect();
        candidate.clear_day(&day_slots);
        return;
    }

    let n = candidate.n_courses();
    let count = ((n as f64) * fraction).ceil() as usize;
    let mut courses: Vec<usize> = (0..n).collect();
    courses.shuffle(rng);
    for &course in courses.iter().take(count.min(n)) {
        candidate.clear_course(course);
    }
}

fn occupancy_pct(candidate: &Candidate) -> f64 {
    let total = candidate.n_courses() * candidate.n_slots();
    if total == 0 {
        return 0.0;
    }
    let filled = candidate.iter_filled().count();
    filled as f64 / total as f64 * 100.0
}

pub fn refine(snapshot: &Snapshot, masks: &MaskSet, seed: u64) -> RefinerOutcome {
    let cfg: &EngineConfig = &snapshot.config;
    let start = Instant::now();
    let deadline_secs = cfg.time_budget_seconds as f64;

    let mut rngs: Vec<ChaCha8Rng> = (0..cfg.population_size).map(|i| slot_rng(seed, i)).collect();

    let mut population: Vec<Candidate> = rngs
        .iter_mut()
        .enumerate()
        .map(|(i, rng)| build_initial(snapshot, masks, i as u64, rng))
        .collect();
    let mut costs = evaluate_population(snapshot, masks, &population, cfg.workers);

    let mut history = Vec::new();
    let mut best_idx = argmin(&costs);
    let mut best = population[best_idx].clone();
    let mut best_cost = costs[best_idx];
    let mut stale = 0usize;
    let mut mutation_prob = cfg.mutation_prob;
    let mut generation = 0usize;
    let mut timed_out = false;

    loop {
        let elapsed = start.elapsed().as_secs_f64();
        history.push(GenerationRecord {
            generation,
            best_fitness: best_cost.cost,
            mean_fitness: costs.iter().map(|c| c.cost).sum::<f64>() / costs.len() as f64,
            occupancy_pct: occupancy_pct(&best),
            conflicts: best_cost.hard_violations as usize,
        });

        if elapsed >= deadline_secs {
            timed_out = true;
            break;
        }
        if best_cost.hard_violations == 0 && stale >= cfg.patience {
            break;
        }
        if generation >= cfg.max_generations {
            break;
        }

        let mut ranked: Vec<usize> = (0..population.len()).collect();
        ranked.sort_by(|&a, &b| costs[a].cost.partial_cmp(&costs[b].cost).unwrap());

        let mut next_gen: Vec<Candidate> = Vec::with_capacity(cfg.population_size);
        for &idx in ranked.iter().take(cfg.elite_count) {
            next_gen.push(population[idx].clone());
        }

        while next_gen.len() < cfg.population_size {
            let slot = next_gen.len();
            let rng = &mut rngs[slot];
            let parent_a = tournament_select(&population, &costs, cfg.tournament_size, rng);
            let mut child = if rng.gen_bool(cfg.crossover_prob) {
                let parent_b = tournament_select(&population, &costs, cfg.tournament_size, rng);
                crossover(snapshot, masks, parent_a, parent_b, rng)
            } else {
                parent_a.clone()
            };
            if rng.gen_bool(mutation_prob) {
                mutate(snapshot, masks, &mut child, rng);
            }
            child.id = slot as u64;
            repair(snapshot, masks, &mut child, rng);
            next_gen.push(child);
        }

        if cfg.lns_period_generations > 0 && (generation + 1) % cfg.lns_period_generations == 0 {
            let kicked_count = (next_gen.len() / 4).max(1).min(next_gen.len() - cfg.elite_count.min(next_gen.len()));
            let mut kickable: Vec<usize> = (cfg.elite_count.min(next_gen.len())..next_gen.len()).collect();
            kickable.shuffle(&mut rngs[0]);
            for &idx in kickable.iter().take(kicked_count) {
                let (_, right) = rngs.split_at_mut(idx);
                let rng = &mut right[0];
                lns_kick(snapshot, masks, &mut next_gen[idx], cfg.lns_fraction, rng);
                repair(snapshot, masks, &mut next_gen[idx], rng);
            }
        }

        population = next_gen;
        costs = evaluate_population(snapshot, masks, &population, cfg.workers);
        generation += 1;

        let gen_best_idx = argmin(&costs);
        if costs[gen_best_idx].cost < best_cost.cost {
            best = population[gen_best_idx].clone();
            best_cost = costs[gen_best_idx];
            stale = 0;
            mutation_prob = cfg.mutation_prob;
        } else {
            stale += 1;
            mutation_prob = (mutation_prob * 1.05).min(0.9);
        }
    }

    RefinerOutcome {
        best,
        best_cost,
        generations_completed: generation,
        history,
        timed_out,
    }
}

fn argmin(costs: &[FitnessBreakdown]) -> usize {
    costs
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.cost.partial_cmp(&b.cost).unwrap())
        .map(|(i, _)| i)
        .unwrap()
}
