use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::HashSet;
use timetable_engine::scheduler::masks::MaskSet;
use timetable_engine::scheduler::{constructor, fitness, repair};
use timetable_engine::types::*;

fn bench_instance(n_courses: usize) -> ProblemInstance {
    let mut available = HashSet::new();
    for day in 0..5u8 {
        for block in 1..=6u16 {
            available.insert(Slot::new(DayIdx(day), Block(block)));
        }
    }

    let subjects = vec![
        Subject {
            id: SubjectId("math".into()),
            name: "Math".into(),
            default_weekly_blocks: 5,
            requires_special_room: false,
            requires_consecutive_blocks: false,
            is_filler: false,
            priority: 5,
            max_per_day: Some(1),
            subject_type: SubjectType::Mandatory,
            required_room_type: None,
        },
        Subject {
            id: SubjectId("lang".into()),
            name: "Language Arts".into(),
            default_weekly_blocks: 5,
            requires_special_room: false,
            requires_consecutive_blocks: false,
            is_filler: false,
            priority: 5,
            max_per_day: Some(1),
            subject_type: SubjectType::Mandatory,
            required_room_type: None,
        },
        Subject {
            id: SubjectId("study_hall".into()),
            name: "Study Hall".into(),
            default_weekly_blocks: 0,
            requires_special_room: false,
            requires_consecutive_blocks: false,
            is_filler: true,
            priority: 1,
            max_per_day: None,
            subject_type: SubjectType::Filler,
            required_room_type: None,
        },
    ];

    let teachers = (0..n_courses)
        .flat_map(|i| {
            vec![
                Teacher {
                    id: TeacherId(format!("math-{i}")),
                    name: format!("Math teacher {i}"),
                    subjects: vec![SubjectId("math".into())],
                    max_blocks_per_week: None,
                    may_teach_filler: false,
                    available: available.clone(),
                },
                Teacher {
                    id: TeacherId(format!("lang-{i}")),
                    name: format!("Language teacher {i}"),
                    subjects: vec![SubjectId("lang".into())],
                    max_blocks_per_week: None,
                    may_teach_filler: false,
                    available: available.clone(),
                },
            ]
        })
        .chain(std::iter::once(Teacher {
            id: TeacherId("study-hall".into()),
            name: "Study hall supervisor".into(),
            subjects: vec![SubjectId("study_hall".into())],
            max_blocks_per_week: None,
            may_teach_filler: true,
            available,
        }))
        .collect();

    let courses: Vec<Course> = (0..n_courses)
        .map(|i| Course {
            id: CourseId(format!("c{i}")),
            name: format!("Course {i}"),
            grade: "1".into(),
            fixed_room: None,
        })
        .collect();

    ProblemInstance {
        courses,
        teachers,
        subjects,
        rooms: vec![],
        day_labels: vec!["Mon", "Tue", "Wed", "Thu", "Fri"].into_iter().map(String::from).collect(),
        class_blocks: (1..=6).map(Block).collect(),
        curricula: vec![GradeCurriculum {
            grade: "1".into(),
            subjects: vec![SubjectId("math".into()), SubjectId("lang".into())],
        }],
        demand_overrides: vec![],
        config: EngineConfig {
            population_size: 20,
            max_generations: 5,
            time_budget_seconds: 5,
            ..EngineConfig::default()
        },
    }
}

fn bench_mask_build(c: &mut Criterion) {
    let instance = bench_instance(30);
    let snapshot = Snapshot::build(instance).unwrap();

    c.bench_function("mask_precompute_30_courses", |b| {
        b.iter(|| black_box(MaskSet::build(&snapshot).unwrap()))
    });
}

fn bench_construct_and_evaluate(c: &mut Criterion) {
    let instance = bench_instance(30);
    let snapshot = Snapshot::build(instance).unwrap();
    let masks = MaskSet::build(&snapshot).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(42);

    c.bench_function("construct_and_evaluate_30_courses", |b| {
        b.iter(|| {
            let candidate = constructor::build_initial(&snapshot, &masks, 0, &mut rng);
            black_box(fitness::evaluate(&snapshot, &masks, &candidate))
        })
    });
}

fn bench_repair_pass(c: &mut Criterion) {
    let instance = bench_instance(30);
    let snapshot = Snapshot::build(instance).unwrap();
    let masks = MaskSet::build(&snapshot).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let seed_candidate = constructor::build_initial(&snapshot, &masks, 0, &mut rng);

    c.bench_function("repair_pass_30_courses", |b| {
        b.iter_batched(
            || seed_candidate.clone(),
            |mut candidate| repair::repair(&snapshot, &masks, &mut candidate, &mut rng.clone()),
            criterion::BatchSize::SmallInput,
        )
    });
}

criterion_group!(
    benches,
    bench_mask_build,
    bench_construct_and_evaluate,
    bench_repair_pass
);
criterion_main!(benches);
