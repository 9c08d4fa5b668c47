//! Virtual buffers: storage declared now, bound later.
//!
//! A [`VirtualBuffer`] records the shape of a storage requirement (`count`
//! slices of `dim` scalars) before any memory exists. Once the aggregate
//! allocation is made, the buffer is bound to its region exactly once and
//! can hand out per-slice [`View`]s from then on.

use std::cell::{Cell, OnceCell};
use std::mem;

use carve_core::{Scalar, View};

use crate::error::BufferError;

/// A named-elsewhere logical buffer of `count` slices, each `dim` scalars wide.
///
/// The shape is fixed at construction. The backing view is empty until
/// [`bind`](VirtualBuffer::bind) succeeds, and can never be replaced after.
#[derive(Debug)]
pub struct VirtualBuffer<'s> {
    count: usize,
    dim: usize,
    view: OnceCell<View<'s, Scalar>>,
}

impl<'s> VirtualBuffer<'s> {
    /// Declare a buffer of `count` slices of `dim` scalars.
    ///
    /// Either may be zero, giving an [empty](VirtualBuffer::is_empty) buffer.
    pub fn new(count: usize, dim: usize) -> Self {
        Self {
            count,
            dim,
            view: OnceCell::new(),
        }
    }

    /// Bind the buffer to the first `count * dim` scalars of `storage`.
    ///
    /// This is the single resolution point of the buffer: it succeeds at
    /// most once.
    pub fn bind(&self, storage: &'s [Cell<Scalar>]) -> Result<(), BufferError> {
        if self.is_bound() {
            return Err(BufferError::AlreadyBound);
        }
        let required = self.allocated_size();
        if storage.len() < required {
            return Err(BufferError::StorageTooSmall {
                required,
                available: storage.len(),
            });
        }
        self.view
            .set(View::from_first_n(storage, 0, required))
            .map_err(|_| BufferError::AlreadyBound)
    }

    /// Whether backing storage has been bound.
    pub fn is_bound(&self) -> bool {
        self.view.get().is_some()
    }

    /// The whole backing region, once bound.
    pub fn view(&self) -> Option<View<'s, Scalar>> {
        self.view.get().copied()
    }

    /// Zero the backing region. Does nothing while unbound.
    pub fn reset(&self) -> &Self {
        if let Some(view) = self.view.get() {
            view.fill(0.0);
        }
        self
    }

    /// The slice at `offset`, wrapping around modulo `count`.
    ///
    /// Any offset is valid once the buffer is bound; `resolve(count)` is
    /// `resolve(0)`. A zero-count buffer has no slices to wrap onto and
    /// reports [`BufferError::ZeroCount`].
    pub fn resolve(&self, offset: usize) -> Result<View<'s, Scalar>, BufferError> {
        if self.count == 0 {
            return Err(BufferError::ZeroCount);
        }
        let view = self.view.get().ok_or(BufferError::Unbound)?;
        let start = (offset % self.count) * self.dim;
        Ok(View::from_first_n(view.cells(), start, self.dim))
    }

    /// Exchange shape and binding with another buffer.
    pub fn swap(&mut self, other: &mut Self) -> &mut Self {
        mem::swap(self, other);
        self
    }

    /// Whether the buffer holds no scalars at all.
    pub fn is_empty(&self) -> bool {
        self.count == 0 || self.dim == 0
    }

    /// Width of one slice, in scalars.
    pub fn size(&self) -> usize {
        self.dim
    }

    /// Total scalars required: `count * dim`.
    pub fn allocated_size(&self) -> usize {
        self.count.saturating_mul(self.dim)
    }

    /// Number of slices.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Width of one slice, in scalars. Same as [`size`](VirtualBuffer::size).
    pub fn dim(&self) -> usize {
        self.dim
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn cells(values: &mut [Scalar]) -> &[Cell<Scalar>] {
        Cell::from_mut(values).as_slice_of_cells()
    }

    #[test]
    fn unbound_buffer_has_shape_only() {
        let buf = VirtualBuffer::new(3, 2);
        assert!(!buf.is_bound());
        assert!(buf.view().is_none());
        assert_eq!(buf.size(), 2);
        assert_eq!(buf.allocated_size(), 6);
        assert!(!buf.is_empty());
        assert_eq!(buf.resolve(0), Err(BufferError::Unbound));
    }

    #[test]
    fn zero_sized_buffers_are_empty() {
        assert!(VirtualBuffer::new(0, 4).is_empty());
        assert!(VirtualBuffer::new(4, 0).is_empty());
        assert!(VirtualBuffer::new(0, 0).is_empty());
    }

    #[test]
    fn resolve_returns_slice_and_wraps() {
        let mut data = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let storage = cells(&mut data);
        let buf = VirtualBuffer::new(3, 2);
        buf.bind(storage).unwrap();

        assert_eq!(buf.resolve(1).unwrap().to_vec(), vec![3.0, 4.0]);
        assert_eq!(buf.resolve(4).unwrap().to_vec(), vec![3.0, 4.0]);
        assert_eq!(buf.resolve(3).unwrap(), buf.resolve(0).unwrap());
        assert_eq!(buf.resolve(4).unwrap(), buf.resolve(1).unwrap());
    }

    #[test]
    fn bind_takes_exactly_the_required_prefix() {
        let mut data = [0.0; 10];
        let storage = cells(&mut data);
        let buf = VirtualBuffer::new(2, 3);
        buf.bind(storage).unwrap();
        let view = buf.view().unwrap();
        assert_eq!(view.len(), 6);
        assert_eq!(view.as_ptr(), storage.as_ptr() as *const Scalar);
    }

    #[test]
    fn second_bind_is_rejected() {
        let mut a = [0.0; 4];
        let mut b = [0.0; 4];
        let (sa, sb) = (cells(&mut a), cells(&mut b));
        let buf = VirtualBuffer::new(2, 2);
        buf.bind(sa).unwrap();
        assert_eq!(buf.bind(sb), Err(BufferError::AlreadyBound));
        assert_eq!(buf.view().unwrap().as_ptr(), sa.as_ptr() as *const Scalar);
    }

    #[test]
    fn short_storage_is_rejected() {
        let mut data = [0.0; 5];
        let buf = VirtualBuffer::new(3, 2);
        assert_eq!(
            buf.bind(cells(&mut data)),
            Err(BufferError::StorageTooSmall {
                required: 6,
                available: 5
            })
        );
        assert!(!buf.is_bound());
    }

    #[test]
    fn zero_count_resolve_is_an_error() {
        let buf = VirtualBuffer::new(0, 3);
        buf.bind(&[]).unwrap();
        assert_eq!(buf.resolve(0), Err(BufferError::ZeroCount));
    }

    #[test]
    fn reset_zeroes_bound_region_only() {
        let mut data = [1.0, 2.0, 3.0, 4.0, 5.0];
        {
            let storage = cells(&mut data);
            let buf = VirtualBuffer::new(2, 2);
            buf.reset();
            buf.bind(storage).unwrap();
            buf.reset();
        }
        assert_eq!(data, [0.0, 0.0, 0.0, 0.0, 5.0]);
    }

    #[test]
    fn swap_exchanges_shape_and_binding() {
        let mut data = [0.0; 4];
        let storage = cells(&mut data);
        let mut a = VirtualBuffer::new(2, 2);
        let mut b = VirtualBuffer::new(5, 1);
        a.bind(storage).unwrap();
        a.swap(&mut b);
        assert_eq!(a.count(), 5);
        assert!(!a.is_bound());
        assert_eq!(b.dim(), 2);
        assert!(b.is_bound());
    }

    proptest! {
        #[test]
        fn resolve_wraps_modulo_count(count in 1usize..16, dim in 0usize..8, offset in 0usize..1000) {
            let mut data = vec![0.0; count * dim];
            let storage = cells(&mut data);
            let buf = VirtualBuffer::new(count, dim);
            buf.bind(storage).unwrap();
            let slice = buf.resolve(offset).unwrap();
            prop_assert_eq!(slice, buf.resolve(offset % count).unwrap());
            prop_assert_eq!(slice.len(), dim);
            prop_assert_eq!(buf.view().unwrap().overlap(&slice).len(), dim);
        }
    }
}
