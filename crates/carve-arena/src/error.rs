//! Arena and buffer error types.

use std::error::Error;
use std::fmt;

/// Errors from binding or resolving a [`VirtualBuffer`](crate::VirtualBuffer).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BufferError {
    /// The buffer has no backing storage yet.
    Unbound,
    /// The buffer was already bound; binding happens exactly once.
    AlreadyBound,
    /// Slice resolution on a buffer with `count == 0`.
    ZeroCount,
    /// The storage offered for binding is too short.
    StorageTooSmall {
        /// Scalars the buffer needs (`count * dim`).
        required: usize,
        /// Scalars the storage provides.
        available: usize,
    },
}

impl fmt::Display for BufferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unbound => write!(f, "buffer resolved before storage was bound"),
            Self::AlreadyBound => write!(f, "buffer storage is already bound"),
            Self::ZeroCount => write!(f, "cannot resolve a slice of a zero-count buffer"),
            Self::StorageTooSmall {
                required,
                available,
            } => {
                write!(
                    f,
                    "storage too small: buffer needs {required} scalars, {available} available"
                )
            }
        }
    }
}

impl Error for BufferError {}

/// Errors from arena construction.
#[derive(Clone, Debug, PartialEq)]
pub enum ArenaError {
    /// The requested length exceeds [`ArenaConfig::max_len`](crate::ArenaConfig::max_len).
    CapacityExceeded {
        /// Number of scalars requested.
        requested: usize,
        /// Configured capacity in scalars.
        capacity: usize,
    },
    /// The arena configuration is invalid.
    InvalidConfig {
        /// Description of the problem.
        reason: String,
    },
    /// The arena was already sized; allocation happens once.
    AlreadyAllocated {
        /// Length of the existing allocation.
        len: usize,
    },
}

impl fmt::Display for ArenaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityExceeded {
                requested,
                capacity,
            } => {
                write!(
                    f,
                    "arena capacity exceeded: requested {requested} scalars, capacity {capacity} scalars"
                )
            }
            Self::InvalidConfig { reason } => write!(f, "invalid arena config: {reason}"),
            Self::AlreadyAllocated { len } => {
                write!(f, "arena already allocated with {len} scalars")
            }
        }
    }
}

impl Error for ArenaError {}
