//! Error types for problem registration, binding and finalization.

use std::error::Error;
use std::fmt;

use carve_arena::BufferError;

/// Which registry a name belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NameKind {
    /// The element registry.
    Element,
    /// The buffer registry.
    Buffer,
}

impl fmt::Display for NameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Element => write!(f, "element"),
            Self::Buffer => write!(f, "buffer"),
        }
    }
}

/// Errors from [`Problem`](crate::Problem) and [`Element`](crate::Element)
/// operations.
///
/// Registry violations are reported before any state changes, so a failed
/// call leaves the problem exactly as it was.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProblemError {
    /// The element handle refers to an element that has been dropped.
    DetachedElement {
        /// Name of the dropped element.
        name: String,
    },
    /// The element already belongs to a different problem.
    ElementOwned {
        /// Name of the element.
        name: String,
        /// Name of the problem that owns it.
        owner: String,
    },
    /// The element does not belong to this problem.
    ElementNotOwned {
        /// Name of the element.
        name: String,
    },
    /// An element or buffer was given an empty name.
    EmptyName {
        /// Registry the name was meant for.
        kind: NameKind,
    },
    /// The name is already taken in its registry.
    DuplicateName {
        /// Registry the name collides in.
        kind: NameKind,
        /// The colliding name.
        name: String,
    },
    /// Registration attempted after `finalize_structure`.
    StructureFinalized,
    /// A buffer was declared with zero slices.
    DegenerateBuffer {
        /// Name of the buffer.
        name: String,
    },
    /// Declaring the buffer would overflow the problem's total size.
    SizeOverflow {
        /// Name of the buffer.
        name: String,
    },
    /// No buffer with this name is registered.
    UnknownBuffer {
        /// The name looked up.
        name: String,
    },
    /// A buffer could not be bound to its region of storage.
    Binding {
        /// Name of the buffer.
        name: String,
        /// Why binding failed.
        reason: BufferError,
    },
    /// A buffer operation failed inside a participant hook.
    Buffer(BufferError),
    /// A participant rejected the finalized structure.
    Rejected {
        /// Human-readable description of the failure.
        reason: String,
    },
    /// An element's finalization hook returned an error.
    ElementFailed {
        /// Name of the failing element.
        name: String,
        /// The error the hook returned.
        reason: Box<ProblemError>,
    },
}

impl fmt::Display for ProblemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DetachedElement { name } => {
                write!(f, "element '{name}' has been dropped")
            }
            Self::ElementOwned { name, owner } => {
                write!(f, "element '{name}' already belongs to problem '{owner}'")
            }
            Self::ElementNotOwned { name } => {
                write!(f, "element '{name}' does not belong to this problem")
            }
            Self::EmptyName { kind } => write!(f, "{kind} name must not be empty"),
            Self::DuplicateName { kind, name } => {
                write!(f, "{kind} name '{name}' is already registered")
            }
            Self::StructureFinalized => write!(f, "problem structure is already finalized"),
            Self::DegenerateBuffer { name } => {
                write!(f, "buffer '{name}' must have at least one slice")
            }
            Self::SizeOverflow { name } => {
                write!(f, "buffer '{name}' overflows the problem size")
            }
            Self::UnknownBuffer { name } => write!(f, "no buffer named '{name}'"),
            Self::Binding { name, reason } => {
                write!(f, "cannot bind buffer '{name}': {reason}")
            }
            Self::Buffer(reason) => write!(f, "buffer error: {reason}"),
            Self::Rejected { reason } => write!(f, "rejected: {reason}"),
            Self::ElementFailed { name, reason } => {
                write!(f, "element '{name}' failed: {reason}")
            }
        }
    }
}

impl Error for ProblemError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Binding { reason, .. } | Self::Buffer(reason) => Some(reason),
            Self::ElementFailed { reason, .. } => Some(&**reason),
            _ => None,
        }
    }
}

impl From<BufferError> for ProblemError {
    fn from(err: BufferError) -> Self {
        Self::Buffer(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_name_mentions_registry() {
        let err = ProblemError::DuplicateName {
            kind: NameKind::Buffer,
            name: "positions".into(),
        };
        assert_eq!(err.to_string(), "buffer name 'positions' is already registered");
    }

    #[test]
    fn wrapped_errors_expose_source() {
        let err = ProblemError::ElementFailed {
            name: "a".into(),
            reason: Box::new(ProblemError::Buffer(BufferError::Unbound)),
        };
        let source = err.source().map(ToString::to_string);
        assert_eq!(
            source.as_deref(),
            Some("buffer error: buffer resolved before storage was bound")
        );
        assert!(ProblemError::StructureFinalized.source().is_none());
    }

    #[test]
    fn buffer_errors_convert() {
        let err: ProblemError = BufferError::ZeroCount.into();
        assert_eq!(err, ProblemError::Buffer(BufferError::ZeroCount));
    }
}
