//! Core types for the carve workspace.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! [`View`] window type that every other crate hands out, the [`Operands`]
//! trait driving the elementwise `apply`/`mutate` family, and the
//! [`Scalar`] type buffers are made of.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod operands;
pub mod scalar;
pub mod view;

pub use operands::{Operands, Zipped};
pub use scalar::{bounded, clamp, Scalar, SCALAR_BOUND};
pub use view::{Values, View};
