use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::HashSet;
use timetable_engine::scheduler::masks::MaskSet;
use timetable_engine::scheduler::{constructor, feasibility, repair, run_engine};
use timetable_engine::types::*;

fn teacher(id: &str, subject: &str, available: HashSet<Slot>) -> Teacher {
    Teacher {
        id: TeacherId(id.into()),
        name: id.into(),
        subjects: vec![SubjectId(subject.into())],
        max_blocks_per_week: None,
        may_teach_filler: false,
        available,
    }
}

fn subject(id: &str, weekly_blocks: u16) -> Subject {
    Subject {
        id: SubjectId(id.into()),
        name: id.into(),
        default_weekly_blocks: weekly_blocks,
        requires_special_room: false,
        requires_consecutive_blocks: false,
        is_filler: false,
        priority: 5,
        max_per_day: None,
        subject_type: SubjectType::Mandatory,
        required_room_type: None,
    }
}

fn course(id: &str, grade: &str) -> Course {
    Course {
        id: CourseId(id.into()),
        name: id.into(),
        grade: grade.into(),
        fixed_room: None,
    }
}

fn all_slots(days: u8, blocks: u16) -> HashSet<Slot> {
    let mut set = HashSet::new();
    for d in 0..days {
        for b in 1..=blocks {
            set.insert(Slot::new(DayIdx(d), Block(b)));
        }
    }
    set
}

fn base_config() -> EngineConfig {
    EngineConfig {
        seed: Some(7),
        population_size: 12,
        max_generations: 40,
        patience: 10,
        time_budget_seconds: 30,
        ..EngineConfig::default()
    }
}

#[test]
fn minimal_scenario_places_required_blocks() {
    let mut teacher_t = teacher("T", "S", all_slots(2, 2));
    teacher_t.available = all_slots(2, 2);

    let instance = ProblemInstance {
        courses: vec![course("C1", "G")],
        teachers: vec![teacher_t],
        subjects: vec![subject("S", 2)],
        rooms: vec![],
        day_labels: vec!["Mon".into(), "Tue".into()],
        class_blocks: vec![Block(1), Block(2)],
        curricula: vec![GradeCurriculum {
            grade: "G".into(),
            subjects: vec![SubjectId("S".into())],
        }],
        demand_overrides: vec![],
        config: base_config(),
    };

    let report = run_engine(instance, None).unwrap();
    assert_eq!(report.status, Status::Success);
    let s_assignments: Vec<_> = report
        .assignments
        .iter()
        .filter(|a| a.subject.0 == "S")
        .collect();
    assert_eq!(s_assignments.len(), 2);
    assert_eq!(s_assignments[0].teacher.0, "T");
    let days: HashSet<_> = s_assignments.iter().map(|a| a.day).collect();
    assert_eq!(days.len(), 2, "one S block per day");
}

#[test]
fn forced_uniqueness_places_scarce_subject_first() {
    let mut t2_avail = HashSet::new();
    t2_avail.insert(Slot::new(DayIdx(0), Block(1)));
    t2_avail.insert(Slot::new(DayIdx(0), Block(2)));

    let instance = ProblemInstance {
        courses: vec![course("C1", "G")],
        teachers: vec![teacher("T", "S", all_slots(2, 2)), teacher("T2", "S2", t2_avail)],
        subjects: vec![subject("S", 2), subject("S2", 2)],
        rooms: vec![],
        day_labels: vec!["Mon".into(), "Tue".into()],
        class_blocks: vec![Block(1), Block(2)],
        curricula: vec![GradeCurriculum {
            grade: "G".into(),
            subjects: vec![SubjectId("S".into()), SubjectId("S2".into())],
        }],
        demand_overrides: vec![],
        config: base_config(),
    };

    let report = run_engine(instance, None).unwrap();
    assert_eq!(report.status, Status::Success);

    let s2: Vec<_> = report.assignments.iter().filter(|a| a.subject.0 == "S2").collect();
    assert_eq!(s2.len(), 2);
    assert!(s2.iter().all(|a| a.day == DayIdx(0)));

    let s: Vec<_> = report.assignments.iter().filter(|a| a.subject.0 == "S").collect();
    assert_eq!(s.len(), 2);
    assert!(s.iter().all(|a| a.day == DayIdx(1)));
}

#[test]
fn supply_shortfall_is_reported_infeasible() {
    let mut scarce = HashSet::new();
    scarce.insert(Slot::new(DayIdx(0), Block(1)));

    let instance = ProblemInstance {
        courses: vec![course("C1", "G")],
        teachers: vec![teacher("T", "S", scarce)],
        subjects: vec![subject("S", 2)],
        rooms: vec![],
        day_labels: vec!["Mon".into(), "Tue".into()],
        class_blocks: vec![Block(1), Block(2)],
        curricula: vec![GradeCurriculum {
            grade: "G".into(),
            subjects: vec![SubjectId("S".into())],
        }],
        demand_overrides: vec![],
        config: base_config(),
    };

    let report = run_engine(instance, None).unwrap();
    assert_eq!(report.status, Status::Infeasible);
    let row = report
        .supply_vs_demand
        .iter()
        .find(|r| r.subject.0 == "S")
        .unwrap();
    assert_eq!(row.demand, 2);
    assert_eq!(row.supply, 1);
    assert!(row.is_bottleneck);
}

#[test]
fn conflict_repair_removes_teacher_overlap() {
    let instance = ProblemInstance {
        courses: vec![course("C1", "G"), course("C2", "G")],
        teachers: vec![teacher("T", "S", all_slots(1, 2))],
        subjects: vec![subject("S", 1)],
        rooms: vec![],
        day_labels: vec!["Mon".into()],
        class_blocks: vec![Block(1), Block(2)],
        curricula: vec![GradeCurriculum {
            grade: "G".into(),
            subjects: vec![SubjectId("S".into())],
        }],
        demand_overrides: vec![],
        config: EngineConfig {
            full_week_required: false,
            ..base_config()
        },
    };

    let snapshot = Snapshot::build(instance).unwrap();
    let masks = MaskSet::build(&snapshot).unwrap();

    let mut candidate = Candidate::new(0, snapshot.n_courses(), masks.n_slots());
    let slot0 = snapshot.grid.slot_idx(Slot::new(DayIdx(0), Block(1))).unwrap().index();
    candidate.set(0, slot0, 0, 0, None);
    candidate.set(1, slot0, 0, 0, None);

    let mut rng = ChaCha8Rng::seed_from_u64(1);
    repair::repair(&snapshot, &masks, &mut candidate, &mut rng);

    let breakdown = timetable_engine::scheduler::fitness::evaluate(&snapshot, &masks, &candidate);
    let violations = timetable_engine::scheduler::fitness::violations(&snapshot, &masks, &candidate);
    assert!(
        !violations.iter().any(|v| v.kind == ViolationKind::TeacherOverlap),
        "no teacher overlap should remain after repair"
    );
    assert_eq!(breakdown.hard_violations, 0);
}

#[test]
fn filler_pads_a_full_week() {
    let instance = ProblemInstance {
        courses: vec![course("C", "G")],
        teachers: vec![teacher("T", "S", all_slots(3, 2)), {
            let mut tf = teacher("TF", "F", all_slots(3, 2));
            tf.may_teach_filler = true;
            tf
        }],
        subjects: vec![subject("S", 4), {
            let mut f = subject("F", 0);
            f.is_filler = true;
            f.subject_type = SubjectType::Filler;
            f
        }],
        rooms: vec![],
        day_labels: vec!["Mon".into(), "Tue".into(), "Wed".into()],
        class_blocks: vec![Block(1), Block(2)],
        curricula: vec![GradeCurriculum {
            grade: "G".into(),
            subjects: vec![SubjectId("S".into())],
        }],
        demand_overrides: vec![],
        config: EngineConfig {
            full_week_required: true,
            ..base_config()
        },
    };

    let report = run_engine(instance, None).unwrap();
    assert_eq!(report.status, Status::Success);
    assert_eq!(report.assignments.len(), 6, "every class slot of the week is filled");
    let s_count = report.assignments.iter().filter(|a| a.subject.0 == "S").count();
    let f_count = report.assignments.iter().filter(|a| a.subject.0 == "F").count();
    assert_eq!(s_count, 4);
    assert_eq!(f_count, 2);
}

#[test]
fn zero_time_budget_yields_timeout() {
    let instance = ProblemInstance {
        courses: vec![course("C1", "G")],
        teachers: vec![teacher("T", "S", all_slots(2, 2))],
        subjects: vec![subject("S", 2)],
        rooms: vec![],
        day_labels: vec!["Mon".into(), "Tue".into()],
        class_blocks: vec![Block(1), Block(2)],
        curricula: vec![GradeCurriculum {
            grade: "G".into(),
            subjects: vec![SubjectId("S".into())],
        }],
        demand_overrides: vec![],
        config: EngineConfig {
            time_budget_seconds: 0,
            ..base_config()
        },
    };

    let report = run_engine(instance, None).unwrap();
    assert!(matches!(report.status, Status::Timeout | Status::Success));
    assert!(report.assignments.len() <= 4);
}

#[test]
fn zero_courses_succeeds_with_no_assignments() {
    let instance = ProblemInstance {
        courses: vec![],
        teachers: vec![],
        subjects: vec![],
        rooms: vec![],
        day_labels: vec!["Mon".into()],
        class_blocks: vec![Block(1)],
        curricula: vec![],
        demand_overrides: vec![],
        config: EngineConfig {
            full_week_required: false,
            ..base_config()
        },
    };

    let report = run_engine(instance, None).unwrap();
    assert_eq!(report.status, Status::Success);
    assert!(report.assignments.is_empty());
}

#[test]
fn repair_is_idempotent_on_an_already_valid_candidate() {
    let instance = ProblemInstance {
        courses: vec![course("C1", "G")],
        teachers: vec![teacher("T", "S", all_slots(2, 2))],
        subjects: vec![subject("S", 2)],
        rooms: vec![],
        day_labels: vec!["Mon".into(), "Tue".into()],
        class_blocks: vec![Block(1), Block(2)],
        curricula: vec![GradeCurriculum {
            grade: "G".into(),
            subjects: vec![SubjectId("S".into())],
        }],
        demand_overrides: vec![],
        config: EngineConfig {
            full_week_required: false,
            ..base_config()
        },
    };

    let snapshot = Snapshot::build(instance).unwrap();
    let masks = MaskSet::build(&snapshot).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let mut candidate = constructor::build_initial(&snapshot, &masks, 0, &mut rng);
    repair::repair(&snapshot, &masks, &mut candidate, &mut rng);

    let before = format!("{:?}", candidate);
    repair::repair(&snapshot, &masks, &mut candidate, &mut rng);
    let after = format!("{:?}", candidate);

    assert_eq!(before, after, "repairing an already-valid candidate changes nothing");
}

#[test]
fn determinism_same_seed_same_assignments() {
    fn make_instance() -> ProblemInstance {
        ProblemInstance {
            courses: vec![course("C1", "G"), course("C2", "G")],
            teachers: vec![
                teacher("T1", "S", all_slots(3, 3)),
                teacher("T2", "S2", all_slots(3, 3)),
            ],
            subjects: vec![subject("S", 3), subject("S2", 3)],
            rooms: vec![],
            day_labels: vec!["Mon".into(), "Tue".into(), "Wed".into()],
            class_blocks: vec![Block(1), Block(2), Block(3)],
            curricula: vec![GradeCurriculum {
                grade: "G".into(),
                subjects: vec![SubjectId("S".into()), SubjectId("S2".into())],
            }],
            demand_overrides: vec![],
            config: EngineConfig {
                seed: Some(99),
                full_week_required: false,
                ..base_config()
            },
        }
    }

    let a = run_engine(make_instance(), None).unwrap();
    let b = run_engine(make_instance(), None).unwrap();

    let key = |r: &timetable_engine::types::SolutionReport| {
        let mut rows: Vec<_> = r
            .assignments
            .iter()
            .map(|x| (x.course.0.clone(), x.day.0, x.block.0, x.subject.0.clone(), x.teacher.0.clone()))
            .collect();
        rows.sort();
        rows
    };

    assert_eq!(key(&a), key(&b));
}

#[test]
fn feasibility_infeasible_means_engine_never_reports_success() {
    let mut scarce = HashSet::new();
    scarce.insert(Slot::new(DayIdx(0), Block(1)));

    let instance = ProblemInstance {
        courses: vec![course("C1", "G")],
        teachers: vec![teacher("T", "S", scarce)],
        subjects: vec![subject("S", 2)],
        rooms: vec![],
        day_labels: vec!["Mon".into(), "Tue".into()],
        class_blocks: vec![Block(1), Block(2)],
        curricula: vec![GradeCurriculum {
            grade: "G".into(),
            subjects: vec![SubjectId("S".into())],
        }],
        demand_overrides: vec![],
        config: base_config(),
    };

    let snapshot = Snapshot::build(instance.clone()).unwrap();
    let masks = MaskSet::build(&snapshot).unwrap();
    let verdict = feasibility::analyze(&snapshot, &masks);
    assert!(!verdict.is_feasible());

    let report = run_engine(instance, None).unwrap();
    assert_ne!(report.status, Status::Success);
}
