//! Final Validator.
//!
//! Independently re-checks every hard invariant on the refiner's chosen
//! candidate before it is ever returned to a caller. Deliberately does not
//! trust `FitnessBreakdown::hard_violations` — it re-derives the explicit
//! `Violation` list from scratch the same way `fitness::violations` does,
//! so a bug in the GA's running tally can never let a broken schedule out
//! the door.

use crate::scheduler::fitness;
use crate::scheduler::masks::MaskSet;
use crate::types::{Candidate, Snapshot, Violation};

/// Returns every broken hard invariant found on `candidate`. An empty
/// vector means the schedule is fully valid.
pub fn validate(snapshot: &Snapshot, masks: &MaskSet, candidate: &Candidate) -> Vec<Violation> {
    fitness::violations(snapshot, masks, candidate)
}
