//! Problem registry for Carve.
//!
//! A [`Problem`] collects named [`Element`]s and named
//! [`VirtualBuffer`](carve_arena::VirtualBuffer)s while its structure is
//! being built, lays the buffers out over one storage allocation, and then
//! finalizes: registration closes and every element's [`Participant`] hook
//! runs once.
//!
//! ```
//! use carve_arena::{Arena, ArenaConfig};
//! use carve_problem::{Element, Problem};
//!
//! let mut arena = Arena::new(ArenaConfig::default())?;
//! let problem = Problem::new("particles");
//! let positions = problem.make_buffer("positions", 3, 2)?;
//! let _tracker = Element::new(&problem, "tracker")?;
//!
//! arena.allocate(problem.total_dim())?;
//! problem.finalize_into(arena.cells())?;
//!
//! positions.resolve(1)?.fill(4.0);
//! assert_eq!(arena.to_vec(), vec![0.0, 0.0, 4.0, 4.0, 0.0, 0.0]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Elements hold their problem weakly and the problem holds elements
//! weakly: either side may be dropped first. All types are
//! single-threaded.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod element;
pub mod error;
pub mod problem;

pub use element::{Element, ElementRef, Idle, Participant};
pub use error::{NameKind, ProblemError};
pub use problem::Problem;
