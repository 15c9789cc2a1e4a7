use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use timetable_engine::parser::{load_instance_from_dir, validate_input};
use timetable_engine::reporter::{
    generate_course_schedule, generate_json_summary, generate_reports, generate_teacher_schedule,
    print_summary, OutputFormat,
};
use timetable_engine::scheduler::feasibility;
use timetable_engine::scheduler::masks::MaskSet;
use timetable_engine::scheduler::run_engine;
use timetable_engine::types::{Candidate, CourseId, ProblemInstance, SlotGrid, Snapshot, SolutionReport, TeacherId};
use timetable_engine::validator;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "timetable-cli")]
#[command(about = "Constraint-based weekly class timetable generator")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a small in-repo sample instance end to end
    Demo,

    /// Generate a timetable from catalog data
    Generate {
        #[arg(short, long)]
        data: PathBuf,

        #[arg(short, long, default_value = "./output")]
        output: PathBuf,

        /// json, markdown, text, or all
        #[arg(short, long, default_value = "all")]
        format: String,

        /// Suppress progress output, print a JSON summary only
        #[arg(short, long)]
        quiet: bool,
    },

    /// Re-validate a previously generated report against catalog data
    Validate {
        #[arg(short, long)]
        schedule: PathBuf,

        #[arg(short, long)]
        data: PathBuf,
    },

    /// Print a per-course or per-teacher schedule from a generated report
    Report {
        #[arg(short, long)]
        schedule: PathBuf,

        #[arg(short, long)]
        data: PathBuf,

        #[arg(long)]
        course: Option<String>,

        #[arg(long)]
        teacher: Option<String>,
    },

    /// Run only the Feasibility Analyzer and print the bottleneck table
    Feasibility {
        #[arg(short, long)]
        data: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Demo => run_demo(),
        Commands::Generate {
            data,
            output,
            format,
            quiet,
        } => run_generate(&data, &output, &format, quiet),
        Commands::Validate { schedule, data } => run_validate(&schedule, &data),
        Commands::Report {
            schedule,
            data,
            course,
            teacher,
        } => run_report(&schedule, &data, course, teacher),
        Commands::Feasibility { data } => run_feasibility(&data),
    }
}

fn load_and_check(data: &PathBuf) -> Result<ProblemInstance> {
    let instance = load_instance_from_dir(data).context("Failed to load catalog data")?;
    let result = validate_input(&instance)?;
    for warning in &result.warnings {
        println!("{} {}", "Warning:".yellow(), warning);
    }
    Ok(instance)
}

fn run_generate(data: &PathBuf, output: &PathBuf, format: &str, quiet: bool) -> Result<()> {
    let instance = load_and_check(data)?;
    let grid = SlotGrid::new(instance.day_labels.clone(), instance.class_blocks.clone());

    if !quiet {
        println!(
            "Loaded {} courses, {} teachers, {} subjects, {} rooms",
            instance.courses.len(),
            instance.teachers.len(),
            instance.subjects.len(),
            instance.rooms.len()
        );
        println!("\nGenerating timetable...\n");
    }

    let report = run_engine(instance, None)?;

    let formats = parse_formats(format);
    generate_reports(&report, &grid, output, &formats)?;

    if quiet {
        println!("{}", generate_json_summary(&report)?);
    } else {
        print_summary(&report);
        println!("Reports written to: {}", output.display().to_string().green());
    }

    Ok(())
}

fn run_demo() -> Result<()> {
    println!("{}", "Timetable Engine Demo".bold().cyan());
    println!("{}", "─".repeat(40));

    let instance = demo_instance();
    let grid = SlotGrid::new(instance.day_labels.clone(), instance.class_blocks.clone());
    let report = run_engine(instance, None)?;
    print_summary(&report);

    let output = PathBuf::from("output");
    generate_reports(
        &report,
        &grid,
        &output,
        &[OutputFormat::Json, OutputFormat::Markdown, OutputFormat::Text],
    )?;
    println!("Reports written to: {}", output.display().to_string().green());

    Ok(())
}

fn run_validate(schedule_path: &PathBuf, data: &PathBuf) -> Result<()> {
    let instance = load_instance_from_dir(data)?;
    let report: SolutionReport =
        serde_json::from_str(&std::fs::read_to_string(schedule_path)?)?;

    let snapshot = Snapshot::build(instance)?;
    let masks = MaskSet::build(&snapshot)?;
    let candidate = candidate_from_report(&snapshot, &masks, &report);
    let violations = validator::validate(&snapshot, &masks, &candidate);

    if violations.is_empty() {
        println!("{}", "Schedule is valid".green().bold());
    } else {
        println!("{}", "Schedule has violations".red().bold());
        for v in &violations {
            println!("  - {:?}: {}", v.kind, v.message);
        }
    }

    Ok(())
}

fn run_report(
    schedule_path: &PathBuf,
    data: &PathBuf,
    course: Option<String>,
    teacher: Option<String>,
) -> Result<()> {
    let instance = load_instance_from_dir(data)?;
    let report: SolutionReport =
        serde_json::from_str(&std::fs::read_to_string(schedule_path)?)?;
    let grid = SlotGrid::new(instance.day_labels.clone(), instance.class_blocks.clone());

    if let Some(course_id) = course {
        let id = CourseId(course_id);
        match generate_course_schedule(&report, &grid, &id) {
            Some(text) => println!("{text}"),
            None => println!("Course not found in this report"),
        }
    } else if let Some(teacher_id) = teacher {
        let id = TeacherId(teacher_id);
        match generate_teacher_schedule(&report, &grid, &id) {
            Some(text) => println!("{text}"),
            None => println!("Teacher not found in this report"),
        }
    } else {
        print_summary(&report);
    }

    Ok(())
}

fn run_feasibility(data: &PathBuf) -> Result<()> {
    let instance = load_instance_from_dir(data)?;
    let snapshot = Snapshot::build(instance)?;
    let masks = MaskSet::build(&snapshot)?;
    let verdict = feasibility::analyze(&snapshot, &masks);

    println!("{}", "Supply vs Demand".bold());
    println!("{:<16} {:>8} {:>8} {:>10}", "Subject", "Demand", "Supply", "Bottleneck");
    for row in verdict.supply_vs_demand() {
        println!(
            "{:<16} {:>8} {:>8} {:>10}",
            row.subject.0,
            row.demand,
            row.supply,
            if row.is_bottleneck { "yes" } else { "" }
        );
    }

    if verdict.is_feasible() {
        println!("\n{}", "Feasible".green().bold());
    } else {
        println!("\n{}", "Infeasible".red().bold());
    }

    Ok(())
}

fn candidate_from_report(snapshot: &Snapshot, masks: &MaskSet, report: &SolutionReport) -> Candidate {
    let mut candidate = Candidate::new(0, snapshot.n_courses(), masks.n_slots());
    for a in &report.assignments {
        let (Some(&course), Some(&subject), Some(&teacher)) = (
            snapshot.course_index.get(&a.course),
            snapshot.subject_index.get(&a.subject),
            snapshot.teacher_index.get(&a.teacher),
        ) else {
            continue;
        };
        let Some(slot) = snapshot
            .grid
            .slot_idx(timetable_engine::types::Slot::new(a.day, a.block))
        else {
            continue;
        };
        let room = a.room.as_ref().and_then(|r| snapshot.room_index.get(r)).map(|r| r.index());
        candidate.set(course.index(), slot.index(), subject.index(), teacher.index(), room);
    }
    candidate
}

fn parse_formats(format: &str) -> Vec<OutputFormat> {
    if format == "all" {
        return vec![OutputFormat::Json, OutputFormat::Markdown, OutputFormat::Text];
    }

    format
        .split(',')
        .filter_map(|f| match f.trim().to_lowercase().as_str() {
            "json" => Some(OutputFormat::Json),
            "markdown" | "md" => Some(OutputFormat::Markdown),
            "text" | "txt" => Some(OutputFormat::Text),
            _ => None,
        })
        .collect()
}

fn demo_instance() -> ProblemInstance {
    use timetable_engine::types::*;
    use std::collections::HashSet;

    let mut available = HashSet::new();
    for day in 0..5u8 {
        for block in 1..=6u16 {
            available.insert(Slot::new(DayIdx(day), Block(block)));
        }
    }

    let teachers = vec![
        Teacher {
            id: TeacherId("t-math".into()),
            name: "Ms. Anderson".into(),
            subjects: vec![SubjectId("math".into())],
            max_blocks_per_week: None,
            may_teach_filler: false,
            available: available.clone(),
        },
        Teacher {
            id: TeacherId("t-lang".into()),
            name: "Mr. Baker".into(),
            subjects: vec![SubjectId("lang".into())],
            max_blocks_per_week: None,
            may_teach_filler: false,
            available: available.clone(),
        },
        Teacher {
            id: TeacherId("t-sci".into()),
            name: "Dr. Clark".into(),
            subjects: vec![SubjectId("science".into())],
            max_blocks_per_week: None,
            may_teach_filler: false,
            available: available.clone(),
        },
        Teacher {
            id: TeacherId("t-study".into()),
            name: "Mx. Evans".into(),
            subjects: vec![SubjectId("study_hall".into())],
            max_blocks_per_week: None,
            may_teach_filler: true,
            available,
        },
    ];

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
            id: SubjectId("science".into()),
            name: "Science".into(),
            default_weekly_blocks: 4,
            requires_special_room: true,
            requires_consecutive_blocks: false,
            is_filler: false,
            priority: 4,
            max_per_day: Some(1),
            subject_type: SubjectType::Mandatory,
            required_room_type: Some("lab".into()),
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

    let courses = vec![
        Course { id: CourseId("1A".into()), name: "Grade 1A".into(), grade: "1".into(), fixed_room: None },
        Course { id: CourseId("1B".into()), name: "Grade 1B".into(), grade: "1".into(), fixed_room: None },
    ];

    let rooms = vec![
        Room { id: RoomId("r101".into()), name: "Room 101".into(), room_type: "standard".into(), capacity: 30 },
        Room { id: RoomId("lab1".into()), name: "Science Lab".into(), room_type: "lab".into(), capacity: 24 },
    ];

    ProblemInstance {
        courses,
        teachers,
        subjects,
        rooms,
        day_labels: vec!["Mon", "Tue", "Wed", "Thu", "Fri"].into_iter().map(String::from).collect(),
        class_blocks: (1..=6).map(Block).collect(),
        curricula: vec![GradeCurriculum {
            grade: "1".into(),
            subjects: vec![SubjectId("math".into()), SubjectId("lang".into()), SubjectId("science".into())],
        }],
        demand_overrides: vec![],
        config: EngineConfig::default(),
    }
}
