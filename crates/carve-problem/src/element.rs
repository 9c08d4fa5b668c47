//! Named participants attached to a [`Problem`].
//!
//! An [`Element`] owns its [`Participant`] and registers itself with a
//! problem on construction. The problem only holds it weakly: dropping the
//! element unregisters it, and dropping the problem leaves the element
//! detached but usable.

use std::cell::{Cell, Ref, RefCell, RefMut};
use std::fmt;
use std::ops::Deref;
use std::rc::{Rc, Weak};

use crate::error::ProblemError;
use crate::problem::{Problem, ProblemState};

/// Behaviour an element contributes to its problem's lifecycle.
pub trait Participant<'s> {
    /// Called once the problem's structure is finalized.
    ///
    /// Buffers are bound by then if the problem was finalized through
    /// [`Problem::finalize_into`], so this is the place to resolve and
    /// cache slice views.
    fn structure_finalized(&mut self, problem: &Problem<'s>) -> Result<(), ProblemError> {
        let _ = problem;
        Ok(())
    }
}

/// Participant that ignores every notification.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Idle;

impl Participant<'_> for Idle {}

pub(crate) struct ElementNode<'s> {
    pub(crate) name: String,
    pub(crate) problem: RefCell<Weak<ProblemState<'s>>>,
    pub(crate) retired: Cell<bool>,
    pub(crate) hook: Rc<RefCell<dyn Participant<'s> + 's>>,
}

impl<'s> ElementNode<'s> {
    pub(crate) fn owner(&self) -> Option<Rc<ProblemState<'s>>> {
        self.problem.borrow().upgrade()
    }
}

/// Non-owning handle to an element.
///
/// Returned by [`Problem::get_element`] and reachable from any [`Element`]
/// through `Deref`. Holding one does not keep the element registered.
#[derive(Clone)]
pub struct ElementRef<'s> {
    pub(crate) node: Rc<ElementNode<'s>>,
}

impl<'s> ElementRef<'s> {
    /// The element's name, unique within its problem.
    pub fn name(&self) -> &str {
        &self.node.name
    }

    /// Whether the element currently belongs to a live problem.
    pub fn is_attached(&self) -> bool {
        self.node.owner().is_some()
    }

    /// Whether the element belongs to `problem`.
    pub fn belongs_to(&self, problem: &Problem<'s>) -> bool {
        problem.state.owns(&self.node)
    }

    /// Whether the owning [`Element`] has been dropped.
    pub fn is_dropped(&self) -> bool {
        self.node.retired.get()
    }

    /// Name of the owning problem, if attached.
    pub fn problem_name(&self) -> Option<String> {
        self.node.owner().map(|state| state.name.clone())
    }

    /// `"<problem>.<element>"`, or the bare element name when detached.
    pub fn fully_qualified_name(&self) -> String {
        match self.problem_name() {
            Some(problem) => format!("{problem}.{}", self.node.name),
            None => self.node.name.clone(),
        }
    }
}

impl PartialEq for ElementRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.node, &other.node)
    }
}

impl Eq for ElementRef<'_> {}

impl fmt::Debug for ElementRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementRef")
            .field("name", &self.node.name)
            .field("problem", &self.problem_name())
            .field("dropped", &self.node.retired.get())
            .finish()
    }
}

/// A named element owning participant state of type `P`.
///
/// Construction registers the element with a problem; drop unregisters it.
pub struct Element<'s, P = Idle> {
    handle: ElementRef<'s>,
    participant: Rc<RefCell<P>>,
}

impl<'s> Element<'s> {
    /// Create an element with no behaviour and add it to `problem`.
    pub fn new(problem: &Problem<'s>, name: impl Into<String>) -> Result<Self, ProblemError> {
        Self::with_participant(problem, name, Idle)
    }
}

impl<'s, P: Participant<'s> + 's> Element<'s, P> {
    /// Create an element driven by `participant` and add it to `problem`.
    ///
    /// Fails with whatever [`Problem::add`] reports; the participant is
    /// dropped in that case.
    pub fn with_participant(
        problem: &Problem<'s>,
        name: impl Into<String>,
        participant: P,
    ) -> Result<Self, ProblemError> {
        let participant = Rc::new(RefCell::new(participant));
        let hook: Rc<RefCell<dyn Participant<'s> + 's>> = participant.clone();
        let handle = ElementRef {
            node: Rc::new(ElementNode {
                name: name.into(),
                problem: RefCell::new(Weak::new()),
                retired: Cell::new(false),
                hook,
            }),
        };
        problem.add(&handle)?;
        Ok(Self {
            handle,
            participant,
        })
    }
}

impl<'s, P> Element<'s, P> {
    /// A handle to this element that can outlive it.
    pub fn handle(&self) -> ElementRef<'s> {
        self.handle.clone()
    }

    /// Borrow the participant state.
    ///
    /// # Panics
    ///
    /// Panics if the participant is mutably borrowed, which includes the
    /// duration of its own finalization hook.
    pub fn participant(&self) -> Ref<'_, P> {
        self.participant.borrow()
    }

    /// Mutably borrow the participant state.
    ///
    /// # Panics
    ///
    /// Panics if the participant is already borrowed.
    pub fn participant_mut(&self) -> RefMut<'_, P> {
        self.participant.borrow_mut()
    }
}

impl<'s, P> Deref for Element<'s, P> {
    type Target = ElementRef<'s>;

    fn deref(&self) -> &ElementRef<'s> {
        &self.handle
    }
}

impl<P> fmt::Debug for Element<'_, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("name", &self.handle.node.name)
            .field("problem", &self.handle.problem_name())
            .finish_non_exhaustive()
    }
}

impl<P> Drop for Element<'_, P> {
    fn drop(&mut self) {
        let node = &self.handle.node;
        node.retired.set(true);
        if let Some(state) = node.owner() {
            if let Err(err) = state.detach(node) {
                log::warn!("element '{}' could not detach on drop: {err}", node.name);
            }
        }
    }
}
