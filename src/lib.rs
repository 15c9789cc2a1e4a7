//! Timetable Engine - weekly class schedule generator
//!
//! Produces a feasible weekly class timetable from a catalog of courses,
//! teachers, subjects, rooms, and per-course subject demand, using an
//! evolutionary refinement loop.
//!
//! # Algorithm Overview
//!
//! The engine runs in stages:
//! 1. **Mask Precompute**: flatten availability, qualification, curriculum
//!    and fixed-room relations into dense boolean arrays.
//! 2. **Feasibility Analysis**: check supply vs demand before attempting
//!    construction.
//! 3. **Constructive Build**: demand-first greedy placement.
//! 4. **Evolutionary Refinement**: population-based search with repair,
//!    crossover, mutation, elitism and LNS kicks.
//! 5. **Final Validation**: re-check every hard invariant before returning.
//!
//! # Example
//!
//! ```no_run
//! use timetable_engine::parser::load_instance_from_dir;
//! use timetable_engine::scheduler::run_engine;
//! use std::path::Path;
//!
//! let instance = load_instance_from_dir(Path::new("./data/demo")).unwrap();
//! let report = run_engine(instance, None).unwrap();
//! println!("status: {:?}", report.status);
//! ```

pub mod error;
pub mod parser;
pub mod reporter;
pub mod scheduler;
pub mod types;
pub mod validator;

pub use error::{Result, SchedulerError};
