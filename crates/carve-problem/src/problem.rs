//! The problem registry: named elements, named buffers and one-way
//! structure finalization.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::ptr;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;
use smallvec::SmallVec;

use carve_arena::{BufferError, Layout, VirtualBuffer};
use carve_core::Scalar;

use crate::element::{ElementNode, ElementRef};
use crate::error::{NameKind, ProblemError};

pub(crate) struct ProblemState<'s> {
    pub(crate) name: String,
    elements: RefCell<IndexMap<String, Weak<ElementNode<'s>>>>,
    buffers: RefCell<IndexMap<String, Rc<VirtualBuffer<'s>>>>,
    total_dim: Cell<usize>,
    finalized: Cell<bool>,
}

impl<'s> ProblemState<'s> {
    pub(crate) fn owns(&self, node: &ElementNode<'s>) -> bool {
        ptr::eq(node.problem.borrow().as_ptr(), self)
    }

    pub(crate) fn detach(&self, node: &ElementNode<'s>) -> Result<(), ProblemError> {
        if !self.owns(node) {
            return Err(ProblemError::ElementNotOwned {
                name: node.name.clone(),
            });
        }
        self.elements.borrow_mut().shift_remove(&node.name);
        *node.problem.borrow_mut() = Weak::new();
        log::debug!("problem '{}': removed element '{}'", self.name, node.name);
        Ok(())
    }
}

impl Drop for ProblemState<'_> {
    fn drop(&mut self) {
        for node in self.elements.get_mut().values().filter_map(Weak::upgrade) {
            *node.problem.borrow_mut() = Weak::new();
        }
    }
}

/// A registry of elements and buffers whose structure is fixed once
/// finalized.
///
/// While building, elements register themselves and buffers are declared
/// with [`make_buffer`](Problem::make_buffer). Buffers receive storage in
/// one step through [`bind`](Problem::bind), after which
/// [`finalize_structure`](Problem::finalize_structure) notifies every
/// element. No element or buffer can be added after finalization.
///
/// `'s` is the lifetime of the storage buffers are bound to; the storage
/// must be created before the problem and outlive it.
pub struct Problem<'s> {
    pub(crate) state: Rc<ProblemState<'s>>,
}

impl<'s> Problem<'s> {
    /// Create an empty problem in the building state.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            state: Rc::new(ProblemState {
                name: name.into(),
                elements: RefCell::new(IndexMap::new()),
                buffers: RefCell::new(IndexMap::new()),
                total_dim: Cell::new(0),
                finalized: Cell::new(false),
            }),
        }
    }

    /// The problem's name.
    pub fn name(&self) -> &str {
        &self.state.name
    }

    /// Register `element` with this problem.
    ///
    /// Adding an element that already belongs to this problem is a no-op.
    pub fn add(&self, element: &ElementRef<'s>) -> Result<(), ProblemError> {
        let node = &element.node;
        if node.retired.get() {
            return Err(ProblemError::DetachedElement {
                name: node.name.clone(),
            });
        }
        if let Some(owner) = node.owner() {
            if Rc::ptr_eq(&owner, &self.state) {
                return Ok(());
            }
            return Err(ProblemError::ElementOwned {
                name: node.name.clone(),
                owner: owner.name.clone(),
            });
        }
        if node.name.is_empty() {
            return Err(ProblemError::EmptyName {
                kind: NameKind::Element,
            });
        }
        if self.state.finalized.get() {
            return Err(ProblemError::StructureFinalized);
        }

        let mut elements = self.state.elements.borrow_mut();
        let taken = elements
            .get(&node.name)
            .is_some_and(|existing| existing.strong_count() > 0);
        if taken {
            return Err(ProblemError::DuplicateName {
                kind: NameKind::Element,
                name: node.name.clone(),
            });
        }
        elements.insert(node.name.clone(), Rc::downgrade(node));
        *node.problem.borrow_mut() = Rc::downgrade(&self.state);
        log::debug!("problem '{}': added element '{}'", self.state.name, node.name);
        Ok(())
    }

    /// Unregister `element` from this problem.
    ///
    /// Permitted in any state, including after finalization.
    pub fn remove(&self, element: &ElementRef<'s>) -> Result<(), ProblemError> {
        let node = &element.node;
        if node.retired.get() {
            return Err(ProblemError::DetachedElement {
                name: node.name.clone(),
            });
        }
        self.state.detach(node)
    }

    /// Declare a buffer of `count` slices of `dim` scalars.
    ///
    /// The buffer is unbound until [`bind`](Problem::bind) runs. The
    /// returned handle shares the registered buffer.
    pub fn make_buffer(
        &self,
        name: &str,
        count: usize,
        dim: usize,
    ) -> Result<Rc<VirtualBuffer<'s>>, ProblemError> {
        if name.is_empty() {
            return Err(ProblemError::EmptyName {
                kind: NameKind::Buffer,
            });
        }
        if self.state.finalized.get() {
            return Err(ProblemError::StructureFinalized);
        }
        let mut buffers = self.state.buffers.borrow_mut();
        if buffers.contains_key(name) {
            return Err(ProblemError::DuplicateName {
                kind: NameKind::Buffer,
                name: name.to_string(),
            });
        }
        if count == 0 {
            return Err(ProblemError::DegenerateBuffer {
                name: name.to_string(),
            });
        }
        let total = count
            .checked_mul(dim)
            .and_then(|len| len.checked_add(self.state.total_dim.get()))
            .ok_or_else(|| ProblemError::SizeOverflow {
                name: name.to_string(),
            })?;

        let buffer = Rc::new(VirtualBuffer::new(count, dim));
        buffers.insert(name.to_string(), Rc::clone(&buffer));
        self.state.total_dim.set(total);
        log::debug!(
            "problem '{}': buffer '{name}' ({count} x {dim}), total {total}",
            self.state.name
        );
        Ok(buffer)
    }

    /// The buffer registered under `name`.
    pub fn get_buffer(&self, name: &str) -> Option<Rc<VirtualBuffer<'s>>> {
        self.state.buffers.borrow().get(name).cloned()
    }

    /// The element registered under `name`.
    pub fn get_element(&self, name: &str) -> Option<ElementRef<'s>> {
        self.state
            .elements
            .borrow()
            .get(name)
            .and_then(Weak::upgrade)
            .map(|node| ElementRef { node })
    }

    /// Whether a buffer is registered under `name`.
    pub fn has_buffer(&self, name: &str) -> bool {
        self.state.buffers.borrow().contains_key(name)
    }

    /// Whether a live element is registered under `name`.
    pub fn has_element(&self, name: &str) -> bool {
        self.get_element(name).is_some()
    }

    /// Number of registered elements.
    pub fn element_count(&self) -> usize {
        self.state
            .elements
            .borrow()
            .values()
            .filter(|node| node.strong_count() > 0)
            .count()
    }

    /// Number of registered buffers.
    pub fn buffer_count(&self) -> usize {
        self.state.buffers.borrow().len()
    }

    /// Element names in registration order.
    pub fn element_names(&self) -> Vec<String> {
        self.state
            .elements
            .borrow()
            .iter()
            .filter(|(_, node)| node.strong_count() > 0)
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Buffer names in declaration order.
    pub fn buffer_names(&self) -> Vec<String> {
        self.state.buffers.borrow().keys().cloned().collect()
    }

    /// Sum of `count * dim` over every declared buffer.
    pub fn total_dim(&self) -> usize {
        self.state.total_dim.get()
    }

    /// Whether [`finalize_structure`](Problem::finalize_structure) has run.
    pub fn structure_finalized(&self) -> bool {
        self.state.finalized.get()
    }

    /// Partition of [`total_dim`](Problem::total_dim) scalars across the
    /// buffers, packed in declaration order.
    pub fn layout(&self) -> Layout {
        let buffers = self.state.buffers.borrow();
        Layout::pack(
            buffers
                .iter()
                .map(|(name, buffer)| (name.as_str(), buffer.allocated_size())),
        )
    }

    /// Bind every buffer to its region of `storage`.
    ///
    /// Either every buffer is bound or none is: all preconditions are
    /// checked before the first binding.
    pub fn bind(&self, storage: &'s [Cell<Scalar>]) -> Result<(), ProblemError> {
        let layout = self.layout();
        let buffers = self.state.buffers.borrow();

        if let Some(name) = buffers
            .iter()
            .find_map(|(name, buffer)| buffer.is_bound().then_some(name))
        {
            return Err(ProblemError::Binding {
                name: name.clone(),
                reason: BufferError::AlreadyBound,
            });
        }
        if let Some((name, _)) = layout
            .iter()
            .find(|(_, region)| region.end() > storage.len())
        {
            return Err(ProblemError::Binding {
                name: name.to_string(),
                reason: BufferError::StorageTooSmall {
                    required: layout.total_len(),
                    available: storage.len(),
                },
            });
        }

        for (name, buffer) in buffers.iter() {
            let cells = layout
                .carve(name, storage)
                .ok_or_else(|| ProblemError::UnknownBuffer { name: name.clone() })?;
            buffer.bind(cells).map_err(|reason| ProblemError::Binding {
                name: name.clone(),
                reason,
            })?;
        }
        log::debug!(
            "problem '{}': bound {} buffers over {} scalars",
            self.state.name,
            buffers.len(),
            layout.total_len()
        );
        Ok(())
    }

    /// Fix the structure and notify every registered element in
    /// registration order.
    ///
    /// The problem is finalized even if a hook fails; notification stops at
    /// the first failure, which is returned as
    /// [`ProblemError::ElementFailed`]. Finalizing again notifies every
    /// element again.
    pub fn finalize_structure(&self) -> Result<(), ProblemError> {
        if self.state.finalized.replace(true) {
            log::debug!(
                "problem '{}': structure already finalized, notifying again",
                self.state.name
            );
        } else {
            log::debug!("problem '{}': structure finalized", self.state.name);
        }

        let nodes: SmallVec<[Rc<ElementNode<'s>>; 8]> = self
            .state
            .elements
            .borrow()
            .values()
            .filter_map(Weak::upgrade)
            .collect();

        for node in &nodes {
            // An earlier hook may have removed this element.
            if node.retired.get() || !self.state.owns(node) {
                continue;
            }
            log::trace!("problem '{}': notifying '{}'", self.state.name, node.name);
            let result = match node.hook.try_borrow_mut() {
                Ok(mut hook) => hook.structure_finalized(self),
                Err(_) => Err(ProblemError::Rejected {
                    reason: "participant is borrowed during finalization".to_string(),
                }),
            };
            result.map_err(|reason| ProblemError::ElementFailed {
                name: node.name.clone(),
                reason: Box::new(reason),
            })?;
        }
        Ok(())
    }

    /// [`bind`](Problem::bind) to `storage`, then
    /// [`finalize_structure`](Problem::finalize_structure).
    pub fn finalize_into(&self, storage: &'s [Cell<Scalar>]) -> Result<(), ProblemError> {
        self.bind(storage)?;
        self.finalize_structure()
    }
}

impl fmt::Debug for Problem<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Problem")
            .field("name", &self.state.name)
            .field("elements", &self.element_names())
            .field("buffers", &self.buffer_names())
            .field("total_dim", &self.state.total_dim.get())
            .field("finalized", &self.state.finalized.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{Element, Participant};
    use proptest::prelude::*;

    fn storage(values: &mut [Scalar]) -> &[Cell<Scalar>] {
        Cell::from_mut(values).as_slice_of_cells()
    }

    #[test]
    fn make_buffer_accumulates_total_dim() {
        let problem = Problem::new("p");
        let positions = problem.make_buffer("positions", 3, 2).unwrap();
        problem.make_buffer("mass", 3, 1).unwrap();
        assert_eq!(positions.allocated_size(), 6);
        assert_eq!(problem.total_dim(), 9);
        assert_eq!(problem.buffer_names(), vec!["positions", "mass"]);
        assert!(Rc::ptr_eq(&positions, &problem.get_buffer("positions").unwrap()));
    }

    #[test]
    fn make_buffer_rejects_bad_declarations() {
        let problem = Problem::new("p");
        problem.make_buffer("a", 2, 2).unwrap();
        assert_eq!(
            problem.make_buffer("", 1, 1).unwrap_err(),
            ProblemError::EmptyName {
                kind: NameKind::Buffer
            }
        );
        assert_eq!(
            problem.make_buffer("a", 1, 1).unwrap_err(),
            ProblemError::DuplicateName {
                kind: NameKind::Buffer,
                name: "a".into()
            }
        );
        assert_eq!(
            problem.make_buffer("b", 0, 3).unwrap_err(),
            ProblemError::DegenerateBuffer { name: "b".into() }
        );
        assert_eq!(
            problem.make_buffer("c", usize::MAX, 2).unwrap_err(),
            ProblemError::SizeOverflow { name: "c".into() }
        );
        assert_eq!(problem.buffer_count(), 1);
        assert_eq!(problem.total_dim(), 4);
    }

    #[test]
    fn zero_dim_buffer_is_allowed() {
        let problem = Problem::new("p");
        let flags = problem.make_buffer("flags", 4, 0).unwrap();
        assert!(flags.is_empty());
        assert_eq!(problem.total_dim(), 0);
    }

    #[test]
    fn finalize_blocks_registration() {
        let problem = Problem::new("p");
        problem.finalize_structure().unwrap();
        assert!(problem.structure_finalized());
        assert_eq!(
            problem.make_buffer("a", 1, 1).unwrap_err(),
            ProblemError::StructureFinalized
        );
        assert_eq!(
            Element::new(&problem, "a").unwrap_err(),
            ProblemError::StructureFinalized
        );
        assert!(!problem.has_buffer("a"));
    }

    #[test]
    fn add_is_idempotent() {
        let problem = Problem::new("p");
        let a = Element::new(&problem, "a").unwrap();
        problem.add(&a).unwrap();
        assert_eq!(problem.element_count(), 1);
        assert_eq!(problem.element_names(), vec!["a"]);
    }

    #[test]
    fn add_rejects_foreign_element() {
        let p = Problem::new("p");
        let q = Problem::new("q");
        let a = Element::new(&p, "a").unwrap();
        assert_eq!(
            q.add(&a).unwrap_err(),
            ProblemError::ElementOwned {
                name: "a".into(),
                owner: "p".into()
            }
        );
        assert!(!q.has_element("a"));
    }

    #[test]
    fn remove_then_move_to_another_problem() {
        let p = Problem::new("p");
        let q = Problem::new("q");
        let a = Element::new(&p, "a").unwrap();
        assert_eq!(
            q.remove(&a).unwrap_err(),
            ProblemError::ElementNotOwned { name: "a".into() }
        );
        p.remove(&a).unwrap();
        assert!(!a.is_attached());
        assert!(!p.has_element("a"));
        q.add(&a).unwrap();
        assert!(a.belongs_to(&q));
        assert_eq!(a.fully_qualified_name(), "q.a");
    }

    #[test]
    fn remove_is_allowed_after_finalize() {
        let problem = Problem::new("p");
        let a = Element::new(&problem, "a").unwrap();
        problem.finalize_structure().unwrap();
        problem.remove(&a).unwrap();
        assert_eq!(problem.element_count(), 0);
        assert_eq!(
            problem.add(&a).unwrap_err(),
            ProblemError::StructureFinalized
        );
    }

    #[test]
    fn dropped_element_cannot_be_added() {
        let problem = Problem::new("p");
        let handle = Element::new(&problem, "a").unwrap().handle();
        assert_eq!(
            problem.add(&handle).unwrap_err(),
            ProblemError::DetachedElement { name: "a".into() }
        );
        assert_eq!(
            problem.remove(&handle).unwrap_err(),
            ProblemError::DetachedElement { name: "a".into() }
        );
    }

    #[test]
    fn name_freed_by_drop_can_be_reused() {
        let problem = Problem::new("p");
        drop(Element::new(&problem, "a").unwrap());
        let a = Element::new(&problem, "a").unwrap();
        assert!(a.belongs_to(&problem));
    }

    #[test]
    fn layout_follows_declaration_order() {
        let problem = Problem::new("p");
        problem.make_buffer("x", 2, 3).unwrap();
        problem.make_buffer("y", 4, 1).unwrap();
        let layout = problem.layout();
        assert_eq!(layout.region("y").unwrap().offset, 6);
        assert_eq!(layout.total_len(), problem.total_dim());
    }

    #[test]
    fn bind_is_all_or_nothing() {
        let mut data = [0.0; 7];
        let problem = Problem::new("p");
        let x = problem.make_buffer("x", 2, 3).unwrap();
        let y = problem.make_buffer("y", 2, 1).unwrap();
        let err = problem.bind(storage(&mut data)).unwrap_err();
        assert_eq!(
            err,
            ProblemError::Binding {
                name: "y".into(),
                reason: BufferError::StorageTooSmall {
                    required: 8,
                    available: 7
                }
            }
        );
        assert!(!x.is_bound());
        assert!(!y.is_bound());
    }

    #[test]
    fn second_bind_is_rejected() {
        let mut data = [0.0; 4];
        let cells = storage(&mut data);
        let problem = Problem::new("p");
        problem.make_buffer("x", 2, 2).unwrap();
        problem.bind(cells).unwrap();
        assert!(matches!(
            problem.bind(cells),
            Err(ProblemError::Binding {
                reason: BufferError::AlreadyBound,
                ..
            })
        ));
    }

    struct Remover<'s> {
        target: ElementRef<'s>,
    }

    impl<'s> Participant<'s> for Remover<'s> {
        fn structure_finalized(&mut self, problem: &Problem<'s>) -> Result<(), ProblemError> {
            problem.remove(&self.target)
        }
    }

    struct Tally(usize);

    impl<'s> Participant<'s> for Tally {
        fn structure_finalized(&mut self, _problem: &Problem<'s>) -> Result<(), ProblemError> {
            self.0 += 1;
            Ok(())
        }
    }

    #[test]
    fn hook_may_remove_a_later_element() {
        let problem = Problem::new("p");
        let first = Element::with_participant(&problem, "first", Tally(0)).unwrap();
        let b = Element::with_participant(&problem, "b", Tally(0)).unwrap();
        let _remover = Element::with_participant(
            &problem,
            "remover",
            Remover { target: b.handle() },
        )
        .unwrap();
        // Registration order puts "b" before "remover", so re-register it last.
        problem.remove(&b).unwrap();
        problem.add(&b).unwrap();

        problem.finalize_structure().unwrap();
        assert_eq!(first.participant().0, 1);
        assert_eq!(b.participant().0, 0);
        assert!(!b.is_attached());
    }

    #[test]
    fn borrowed_participant_fails_finalization() {
        let problem = Problem::new("p");
        let a = Element::with_participant(&problem, "a", Tally(0)).unwrap();
        let guard = a.participant_mut();
        let err = problem.finalize_structure().unwrap_err();
        drop(guard);
        assert!(matches!(err, ProblemError::ElementFailed { ref name, .. } if name == "a"));
        assert!(problem.structure_finalized());
    }

    proptest! {
        #[test]
        fn total_dim_is_sum_of_sizes(shapes in prop::collection::vec((1usize..20, 0usize..20), 0..12)) {
            let problem = Problem::new("p");
            for (i, (count, dim)) in shapes.iter().enumerate() {
                problem.make_buffer(&format!("b{i}"), *count, *dim).unwrap();
            }
            let expected: usize = shapes.iter().map(|(c, d)| c * d).sum();
            prop_assert_eq!(problem.total_dim(), expected);
            prop_assert_eq!(problem.layout().total_len(), expected);
        }
    }
}
