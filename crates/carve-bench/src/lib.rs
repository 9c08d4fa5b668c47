//! Benchmark profiles and utilities for Carve.
//!
//! - [`declare_particles`]: a three-buffer particle problem (positions,
//!   velocities, masses) of any size.
//! - [`REFERENCE_PARTICLES`]: the particle count used by the reference
//!   benchmarks.

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::rc::Rc;

use carve_arena::VirtualBuffer;
use carve_problem::{Problem, ProblemError};

/// Particle count for reference benchmarks (10K particles, 70K scalars).
pub const REFERENCE_PARTICLES: usize = 10_000;

/// Spatial dimension of the particle profile.
pub const SPATIAL_DIM: usize = 3;

/// Buffers declared by [`declare_particles`].
pub struct ParticleBuffers<'s> {
    /// `count` slices of [`SPATIAL_DIM`] scalars.
    pub positions: Rc<VirtualBuffer<'s>>,
    /// `count` slices of [`SPATIAL_DIM`] scalars.
    pub velocities: Rc<VirtualBuffer<'s>>,
    /// `count` slices of one scalar.
    pub masses: Rc<VirtualBuffer<'s>>,
}

/// Declare the particle buffers on `problem`.
pub fn declare_particles<'s>(
    problem: &Problem<'s>,
    count: usize,
) -> Result<ParticleBuffers<'s>, ProblemError> {
    Ok(ParticleBuffers {
        positions: problem.make_buffer("positions", count, SPATIAL_DIM)?,
        velocities: problem.make_buffer("velocities", count, SPATIAL_DIM)?,
        masses: problem.make_buffer("masses", count, 1)?,
    })
}
