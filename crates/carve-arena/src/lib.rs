//! Deferred storage for Carve problems.
//!
//! Buffers are declared with a shape long before any memory exists, then
//! bound once to regions of a single aggregate allocation. Nothing here
//! uses `unsafe`: storage is a slice of `Cell<Scalar>`, so views handed out
//! by a bound buffer may alias and be written through shared references.
//!
//! # Architecture
//!
//! ```text
//! Arena (one Vec<Cell<Scalar>>, sized once)
//! ├── Layout (name → Region, packed in declaration order)
//! └── VirtualBuffer × N (count × dim, bound to one Region each)
//!     └── resolve(offset) → View of one dim-wide slice, wrapping on count
//! ```
//!
//! # Lifecycle
//!
//! 1. Declare buffers with [`VirtualBuffer::new`].
//! 2. Pack their sizes into a [`Layout`] and size an [`Arena`] to
//!    [`Layout::total_len`].
//! 3. Bind each buffer to its region with [`VirtualBuffer::bind`].
//! 4. Resolve slices; the arena must outlive every buffer bound to it.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod arena;
pub mod buffer;
pub mod config;
pub mod error;
pub mod layout;

pub use arena::Arena;
pub use buffer::VirtualBuffer;
pub use config::ArenaConfig;
pub use error::{ArenaError, BufferError};
pub use layout::{Layout, Region};
