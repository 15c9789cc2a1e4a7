use crate::error::{Result, SchedulerError};
use crate::types::{CourseId, ProblemInstance, RoomId, SubjectId, TeacherId};
use std::collections::HashSet;

/// Validation result with collected errors and warnings. Input validation
/// failures are reported, never panicked on.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    pub fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }
}

/// Validates a loaded instance before it is handed to `Snapshot::build`:
/// duplicate ids, dangling references, and courses with no path to a
/// qualified teacher.
pub fn validate_input(instance: &ProblemInstance) -> Result<ValidationResult> {
    let mut result = ValidationResult::default();

    check_duplicate_ids(
        instance.courses.iter().map(|c| &c.id),
        "course",
        &mut result,
    );
    check_duplicate_ids(
        instance.teachers.iter().map(|t| &t.id),
        "teacher",
        &mut result,
    );
    check_duplicate_ids(
        instance.subjects.iter().map(|s| &s.id),
        "subject",
        &mut result,
    );
    check_duplicate_ids(instance.rooms.iter().map(|r| &r.id), "room", &mut result);

    let subject_ids: HashSet<&SubjectId> = instance.subjects.iter().map(|s| &s.id).collect();
    let room_ids: HashSet<&RoomId> = instance.rooms.iter().map(|r| &r.id).collect();
    let course_ids: HashSet<&CourseId> = instance.courses.iter().map(|c| &c.id).collect();

    for teacher in &instance.teachers {
        for subject_id in &teacher.subjects {
            if !subject_ids.contains(subject_id) {
                result.add_error(format!(
                    "Teacher '{}' is qualified for unknown subject '{}'",
                    teacher.id, subject_id
                ));
            }
        }
    }

    for course in &instance.courses {
        if let Some(room_id) = &course.fixed_room {
            if !room_ids.contains(room_id) {
                result.add_error(format!(
                    "Course '{}' has unknown fixed room '{}'",
                    course.id, room_id
                ));
            }
        }
    }

    for curriculum in &instance.curricula {
        for subject_id in &curriculum.subjects {
            if !subject_ids.contains(subject_id) {
                result.add_error(format!(
                    "Grade '{}' curriculum references unknown subject '{}'",
                    curriculum.grade, subject_id
                ));
            }
        }
    }

    for demand in &instance.demand_overrides {
        if !course_ids.contains(&demand.course) {
            result.add_error(format!(
                "Demand override references unknown course '{}'",
                demand.course
            ));
        }
        if !subject_ids.contains(&demand.subject) {
            result.add_error(
                SchedulerError::UnknownSubject {
                    course_id: demand.course.0.clone(),
                    subject_id: demand.subject.0.clone(),
                }
                .to_string(),
            );
        }
    }

    for subject in &instance.subjects {
        if !instance.teachers.iter().any(|t| t.can_teach(&subject.id)) {
            result.add_warning(format!(
                "Subject '{}' has no qualified teacher",
                subject.id
            ));
        }
    }

    for teacher in &instance.teachers {
        if teacher.available.is_empty() {
            result.add_warning(format!(
                "Teacher '{}' has no declared availability",
                teacher.id
            ));
        }
    }

    if !result.is_valid() {
        return Err(anyhow::anyhow!(
            "Validation failed with {} errors:\n{}",
            result.errors.len(),
            result.errors.join("\n")
        ));
    }

    Ok(result)
}

fn check_duplicate_ids<'a, T: Eq + std::hash::Hash + std::fmt::Display + 'a>(
    ids: impl Iterator<Item = &'a T>,
    id_type: &str,
    result: &mut ValidationResult,
) {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            result.add_error(
                SchedulerError::DuplicateId {
                    id_type: id_type.to_string(),
                    id: id.to_string(),
                }
                .to_string(),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::*;

    #[test]
    fn flags_duplicate_course_ids() {
        let instance = ProblemInstance {
            courses: vec![
                Course { id: CourseId("c1".into()), name: "A".into(), grade: "1".into(), fixed_room: None },
                Course { id: CourseId("c1".into()), name: "B".into(), grade: "1".into(), fixed_room: None },
            ],
            teachers: vec![],
            subjects: vec![],
            rooms: vec![],
            day_labels: vec!["Mon".into()],
            class_blocks: vec![Block(1)],
            curricula: vec![],
            demand_overrides: vec![],
            config: EngineConfig::default(),
        };
        let result = validate_input(&instance);
        assert!(result.is_err());
    }
}
