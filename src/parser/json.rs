use crate::error::{Result, SchedulerError};
use crate::types::{
    Block, Course, CourseDemand, DayIdx, EngineConfig, GradeCurriculum, ProblemInstance, Room,
    Slot, Subject, Teacher, TeacherId,
};
use std::fs;
use std::path::Path;

/// One row of `availability.json`: the block range a teacher is free on a
/// given day.
#[derive(Debug, serde::Deserialize)]
struct AvailabilityEntry {
    teacher: TeacherId,
    day: u8,
    start_block: u16,
    end_block: u16,
}

/// Optional `grid.json`: the week's day labels and class-block numbers.
/// Defaults to a five-day, six-block week when absent.
#[derive(Debug, serde::Deserialize)]
struct WeekGrid {
    day_labels: Vec<String>,
    blocks: Vec<u16>,
}

impl Default for WeekGrid {
    fn default() -> Self {
        Self {
            day_labels: vec!["Mon", "Tue", "Wed", "Thu", "Fri"]
                .into_iter()
                .map(String::from)
                .collect(),
            blocks: (1..=6).collect(),
        }
    }
}

/// Loads the full catalog from a directory: each entity file is loaded
/// independently, optional files fall back to sane defaults instead of
/// failing the whole load.
pub fn load_instance_from_dir(dir: &Path) -> Result<ProblemInstance> {
    let courses: Vec<Course> = load_json_file(&dir.join("courses.json"))?;
    let mut teachers: Vec<Teacher> = load_json_file(&dir.join("teachers.json"))?;
    let subjects: Vec<Subject> = load_json_file(&dir.join("subjects.json"))?;
    let rooms: Vec<Room> = load_optional_json(&dir.join("rooms.json"))?.unwrap_or_default();

    let availability_path = dir.join("availability.json");
    if availability_path.exists() {
        let entries: Vec<AvailabilityEntry> = load_json_file(&availability_path)?;
        apply_availability(&mut teachers, &entries);
    }

    let demand_overrides: Vec<CourseDemand> =
        load_optional_json(&dir.join("demand.json"))?.unwrap_or_default();
    let curricula: Vec<GradeCurriculum> =
        load_optional_json(&dir.join("curricula.json"))?.unwrap_or_default();
    let grid: WeekGrid = load_optional_json(&dir.join("grid.json"))?.unwrap_or_default();
    let config = load_config_or_default(&dir.join("config.toml"));

    Ok(ProblemInstance {
        courses,
        teachers,
        subjects,
        rooms,
        day_labels: grid.day_labels,
        class_blocks: grid.blocks.into_iter().map(Block).collect(),
        curricula,
        demand_overrides,
        config,
    })
}

fn apply_availability(teachers: &mut [Teacher], entries: &[AvailabilityEntry]) {
    for entry in entries {
        let Some(teacher) = teachers.iter_mut().find(|t| t.id == entry.teacher) else {
            continue;
        };
        for block in entry.start_block..=entry.end_block {
            teacher
                .available
                .insert(Slot::new(DayIdx(entry.day), Block(block)));
        }
    }
}

/// Loads config from TOML, falling back to defaults on any read or parse
/// failure.
pub fn load_config_or_default(path: &Path) -> EngineConfig {
    if path.exists() {
        match fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).unwrap_or_default(),
            Err(_) => EngineConfig::default(),
        }
    } else {
        EngineConfig::default()
    }
}

fn load_json_file<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let path_str = path.display().to_string();
    let content = fs::read_to_string(path).map_err(|e| SchedulerError::FileRead {
        path: path_str.clone(),
        source: e,
    })?;

    serde_json::from_str(&content).map_err(|e| {
        SchedulerError::JsonParse {
            file: path_str,
            message: e.to_string(),
        }
        .into()
    })
}

fn load_optional_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if path.exists() {
        Ok(Some(load_json_file(path)?))
    } else {
        Ok(None)
    }
}
