//! Carve: named, deferred buffers over one allocation for numerical problems.
//!
//! This is the top-level facade crate that re-exports the public API from all
//! Carve sub-crates. For most users, adding `carve` as a single dependency is
//! sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use carve::prelude::*;
//!
//! // An element that caches the second particle's position once storage exists.
//! struct Tracker<'s> {
//!     position: Option<View<'s, Scalar>>,
//! }
//!
//! impl<'s> Participant<'s> for Tracker<'s> {
//!     fn structure_finalized(&mut self, problem: &Problem<'s>) -> Result<(), ProblemError> {
//!         let positions = problem.get_buffer("positions").ok_or(ProblemError::UnknownBuffer {
//!             name: "positions".into(),
//!         })?;
//!         self.position = Some(positions.resolve(1)?);
//!         Ok(())
//!     }
//! }
//!
//! let mut arena = Arena::new(ArenaConfig::default()).unwrap();
//! let problem = Problem::new("particles");
//! let positions = problem.make_buffer("positions", 3, 2).unwrap();
//! let tracker = Element::with_participant(&problem, "tracker", Tracker { position: None })
//!     .unwrap();
//!
//! arena.allocate(problem.total_dim()).unwrap();
//! problem.finalize_into(arena.cells()).unwrap();
//!
//! positions.view().unwrap().copy_from_slice(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
//! let position = tracker.participant().position.unwrap();
//! assert_eq!(position.to_vec(), vec![3.0, 4.0]);
//! assert_eq!(positions.resolve(4).unwrap(), position);
//! assert_eq!(tracker.fully_qualified_name(), "particles.tracker");
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`view`] | `carve-core` | `View`, n-ary operands, scalar helpers |
//! | [`arena`] | `carve-arena` | `Arena`, `VirtualBuffer`, `Layout`, config and errors |
//! | [`problem`] | `carve-problem` | `Problem`, `Element`, `Participant` |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Views, operands and scalar helpers (`carve-core`).
///
/// [`view::View`] is the non-owning window every buffer slice is handed
/// out as.
pub use carve_core as view;

/// Deferred storage (`carve-arena`).
///
/// [`arena::VirtualBuffer`] declares storage; [`arena::Arena`] provides it.
pub use carve_arena as arena;

/// Problem registry (`carve-problem`).
///
/// The [`problem::Participant`] trait is the extension point for
/// element behaviour.
pub use carve_problem as problem;

/// Common imports for typical Carve usage.
///
/// ```rust
/// use carve::prelude::*;
/// ```
pub mod prelude {
    // Views
    pub use carve_core::{bounded, Scalar, View};

    // Storage
    pub use carve_arena::{Arena, ArenaConfig, Layout, VirtualBuffer};

    // Registry
    pub use carve_problem::{Element, ElementRef, Participant, Problem};

    // Errors
    pub use carve_arena::{ArenaError, BufferError};
    pub use carve_problem::ProblemError;
}
