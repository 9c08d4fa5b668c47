//! Test utilities for Carve development.
//!
//! Provides storage helpers and reusable [`Participant`](carve_problem::Participant)
//! fixtures for exercising problem lifecycles.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::cell::Cell;

use carve_core::Scalar;

pub use fixtures::{FailingParticipant, NotificationLog, Recorder, SliceCache};

/// Cell storage holding `1.0, 2.0, ..., n`.
pub fn sequential(n: usize) -> Vec<Cell<Scalar>> {
    (1..=n).map(|i| Cell::new(i as Scalar)).collect()
}

/// Cell storage holding `n` zeros.
pub fn zeroed(n: usize) -> Vec<Cell<Scalar>> {
    vec![Cell::new(0.0); n]
}

/// Copy cell storage out as plain scalars.
pub fn snapshot(cells: &[Cell<Scalar>]) -> Vec<Scalar> {
    cells.iter().map(Cell::get).collect()
}
