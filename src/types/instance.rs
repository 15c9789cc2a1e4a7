use super::period::{Block, SlotGrid};
use super::{Course, CourseId, CourseIdx, Room, RoomId, RoomIdx, Subject, SubjectId, SubjectIdx, Teacher, TeacherId, TeacherIdx};
use crate::error::SchedulerError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Explicit (course, subject) -> required-blocks override. Absent pairs
/// derive from the course's grade curriculum.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseDemand {
    pub course: CourseId,
    pub subject: SubjectId,
    pub required_blocks: u16,
}

/// The set of subjects (and their default weekly blocks) a grade's
/// curriculum requires.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeCurriculum {
    pub grade: String,
    pub subjects: Vec<SubjectId>,
}

/// All recognized `EngineConfig` options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_population_size")]
    pub population_size: usize,
    #[serde(default = "default_max_generations")]
    pub max_generations: usize,
    #[serde(default = "default_patience")]
    pub patience: usize,
    #[serde(default = "default_time_budget_seconds")]
    pub time_budget_seconds: u64,
    #[serde(default = "default_crossover_prob")]
    pub crossover_prob: f64,
    #[serde(default = "default_mutation_prob")]
    pub mutation_prob: f64,
    #[serde(default = "default_elite_count")]
    pub elite_count: usize,
    #[serde(default = "default_tournament_size")]
    pub tournament_size: usize,
    #[serde(default = "default_workers")]
    pub workers: usize,
    #[serde(default = "default_lns_period_generations")]
    pub lns_period_generations: usize,
    #[serde(default = "default_lns_fraction")]
    pub lns_fraction: f64,
    #[serde(default = "default_full_week_required")]
    pub full_week_required: bool,
    #[serde(default = "default_w_gaps")]
    pub w_gaps: f64,
    #[serde(default = "default_w_fringe")]
    pub w_fringe: f64,
    #[serde(default = "default_w_balance")]
    pub w_balance: f64,
    #[serde(default = "default_w_demand")]
    pub w_demand: f64,
    #[serde(default = "default_fringe_window")]
    pub fringe_window: u8,
}

fn default_population_size() -> usize {
    100
}
fn default_max_generations() -> usize {
    500
}
fn default_patience() -> usize {
    25
}
fn default_time_budget_seconds() -> u64 {
    180
}
fn default_crossover_prob() -> f64 {
    0.85
}
fn default_mutation_prob() -> f64 {
    0.25
}
fn default_elite_count() -> usize {
    4
}
fn default_tournament_size() -> usize {
    3
}
fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get().min(4))
        .unwrap_or(1)
}
fn default_lns_period_generations() -> usize {
    10
}
fn default_lns_fraction() -> f64 {
    0.25
}
fn default_full_week_required() -> bool {
    true
}
fn default_w_gaps() -> f64 {
    10.0
}
fn default_w_fringe() -> f64 {
    5.0
}
fn default_w_balance() -> f64 {
    3.0
}
fn default_w_demand() -> f64 {
    15.0
}
fn default_fringe_window() -> u8 {
    2
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: None,
            population_size: default_population_size(),
            max_generations: default_max_generations(),
            patience: default_patience(),
            time_budget_seconds: default_time_budget_seconds(),
            crossover_prob: default_crossover_prob(),
            mutation_prob: default_mutation_prob(),
            elite_count: default_elite_count(),
            tournament_size: default_tournament_size(),
            workers: default_workers(),
            lns_period_generations: default_lns_period_generations(),
            lns_fraction: default_lns_fraction(),
            full_week_required: default_full_week_required(),
            w_gaps: default_w_gaps(),
            w_fringe: default_w_fringe(),
            w_balance: default_w_balance(),
            w_demand: default_w_demand(),
            fringe_window: default_fringe_window(),
        }
    }
}

/// The raw, caller-supplied scheduling problem: built once, read-only
/// thereafter.
#[derive(Debug, Clone)]
pub struct ProblemInstance {
    pub courses: Vec<Course>,
    pub teachers: Vec<Teacher>,
    pub subjects: Vec<Subject>,
    pub rooms: Vec<Room>,
    pub day_labels: Vec<String>,
    pub class_blocks: Vec<Block>,
    pub curricula: Vec<GradeCurriculum>,
    pub demand_overrides: Vec<CourseDemand>,
    pub config: EngineConfig,
}

/// The flattened, read-only problem used by every downstream component,
/// with every entity flattened at snapshot time into contiguous arrays
/// of dense indices.
pub struct Snapshot {
    pub courses: Vec<Course>,
    pub teachers: Vec<Teacher>,
    pub subjects: Vec<Subject>,
    pub rooms: Vec<Room>,
    pub grid: SlotGrid,
    pub config: EngineConfig,

    pub course_index: HashMap<CourseId, CourseIdx>,
    pub teacher_index: HashMap<TeacherId, TeacherIdx>,
    pub subject_index: HashMap<SubjectId, SubjectIdx>,
    pub room_index: HashMap<RoomId, RoomIdx>,

    /// [course][subject] -> required blocks this week, 0 if not required.
    demand: Vec<u16>,
}

impl Snapshot {
    pub fn build(instance: ProblemInstance) -> Result<Self, SchedulerError> {
        if instance.class_blocks.is_empty() || instance.day_labels.is_empty() {
            return Err(SchedulerError::NoSchedulableSlots);
        }

        let grid = SlotGrid::new(instance.day_labels.clone(), instance.class_blocks.clone());

        let course_index: HashMap<CourseId, CourseIdx> = instance
            .courses
            .iter()
            .enumerate()
            .map(|(i, c)| (c.id.clone(), CourseIdx(i as u32)))
            .collect();
        let teacher_index: HashMap<TeacherId, TeacherIdx> = instance
            .teachers
            .iter()
            .enumerate()
            .map(|(i, t)| (t.id.clone(), TeacherIdx(i as u32)))
            .collect();
        let subject_index: HashMap<SubjectId, SubjectIdx> = instance
            .subjects
            .iter()
            .enumerate()
            .map(|(i, s)| (s.id.clone(), SubjectIdx(i as u32)))
            .collect();
        let room_index: HashMap<RoomId, RoomIdx> = instance
            .rooms
            .iter()
            .enumerate()
            .map(|(i, r)| (r.id.clone(), RoomIdx(i as u32)))
            .collect();

        let n_courses = instance.courses.len();
        let n_subjects = instance.subjects.len();
        let mut demand = vec![0u16; n_courses * n_subjects];

        let curricula: HashMap<&str, &GradeCurriculum> = instance
            .curricula
            .iter()
            .map(|c| (c.grade.as_str(), c))
            .collect();
        let subject_defaults: HashMap<&SubjectId, u16> = instance
            .subjects
            .iter()
            .map(|s| (&s.id, s.default_weekly_blocks))
            .collect();

        for course in &instance.courses {
            let cidx = course_index[&course.id].index();
            if let Some(curriculum) = curricula.get(course.grade.as_str()) {
                for subject_id in &curriculum.subjects {
                    if let Some(sidx) = subject_index.get(subject_id) {
                        let blocks = subject_defaults.get(subject_id).copied().unwrap_or(0);
                        demand[cidx * n_subjects + sidx.index()] = blocks;
                    }
                }
            }
        }

        for override_entry in &instance.demand_overrides {
            let (Some(&cidx), Some(&sidx)) = (
                course_index.get(&override_entry.course),
                subject_index.get(&override_entry.subject),
            ) else {
                continue;
            };
            demand[cidx.index() * n_subjects + sidx.index()] = override_entry.required_blocks;
        }

        Ok(Self {
            courses: instance.courses,
            teachers: instance.teachers,
            subjects: instance.subjects,
            rooms: instance.rooms,
            grid,
            config: instance.config,
            course_index,
            teacher_index,
            subject_index,
            room_index,
            demand,
        })
    }

    pub fn n_courses(&self) -> usize {
        self.courses.len()
    }
    pub fn n_teachers(&self) -> usize {
        self.teachers.len()
    }
    pub fn n_subjects(&self) -> usize {
        self.subjects.len()
    }
    pub fn n_rooms(&self) -> usize {
        self.rooms.len()
    }

    pub fn required_blocks(&self, course: CourseIdx, subject: SubjectIdx) -> u16 {
        self.demand[course.index() * self.n_subjects() + subject.index()]
    }

    /// All (course, subject) pairs with nonzero demand, in (course asc,
    /// subject asc) order — the deterministic base order the Constructive
    /// Builder re-sorts by scarcity.
    pub fn demand_pairs(&self) -> Vec<(CourseIdx, SubjectIdx, u16)> {
        let mut pairs = Vec::new();
        for c in 0..self.n_courses() {
            for s in 0..self.n_subjects() {
                let req = self.demand[c * self.n_subjects() + s];
                if req > 0 {
                    pairs.push((CourseIdx(c as u32), SubjectIdx(s as u32), req));
                }
            }
        }
        pairs
    }
}
