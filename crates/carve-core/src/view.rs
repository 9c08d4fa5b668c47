//! Non-owning windows over contiguous memory.
//!
//! A [`View`] describes an address range `[first, last)` over values of `T`
//! without owning them. Views are `Copy`; many views may describe the same
//! or overlapping memory at once, so element access goes through [`Cell`]
//! and every write takes `&self`. The memory itself is owned elsewhere (an
//! arena, a `Vec`, a stack array) and the lifetime `'a` keeps the views from
//! outliving it.
//!
//! Equality, ordering and hashing look at the address range only, never at
//! the values behind it.

use std::cell::Cell;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::FusedIterator;
use std::mem;
use std::ops::{Add, Index};
use std::slice;

use crate::operands::Operands;
use crate::scalar::clamp;

/// A bounds-described, non-owning window over a contiguous run of `T`.
pub struct View<'a, T> {
    cells: &'a [Cell<T>],
}

impl<'a, T> View<'a, T> {
    /// Open-ended upper index for [`View::slice`]; clamps to the view length.
    pub const END: isize = isize::MAX;

    /// The null view: zero length, equal to every other null view.
    pub fn null() -> Self {
        Self { cells: &[] }
    }

    /// View over an exclusively borrowed slice.
    ///
    /// The borrow is converted into shared cells, so further views may be
    /// derived from this one and written through concurrently (on one thread).
    pub fn new(data: &'a mut [T]) -> Self {
        Self {
            cells: Cell::from_mut(data).as_slice_of_cells(),
        }
    }

    /// View over a run of cells already shared elsewhere.
    pub fn from_cells(cells: &'a [Cell<T>]) -> Self {
        Self { cells }
    }

    /// View over `cells[first..last]`.
    ///
    /// An inverted range (`last < first`) gives an empty view positioned at
    /// `first`.
    ///
    /// # Panics
    ///
    /// Panics if `first` or `last` lies beyond `cells.len()`.
    pub fn from_range(cells: &'a [Cell<T>], first: usize, last: usize) -> Self {
        Self {
            cells: &cells[first..last.max(first)],
        }
    }

    /// View over `n` cells starting at `cells[first]`.
    ///
    /// # Panics
    ///
    /// Panics if `first + n` lies beyond `cells.len()`.
    pub fn from_first_n(cells: &'a [Cell<T>], first: usize, n: usize) -> Self {
        Self::from_range(cells, first, first.saturating_add(n))
    }

    /// Point this view at a new run of cells.
    pub fn assign(&mut self, cells: &'a [Cell<T>]) -> &mut Self {
        self.cells = cells;
        self
    }

    /// Point this view at the first `n` cells of `cells`.
    ///
    /// # Panics
    ///
    /// Panics if `n > cells.len()`.
    pub fn assign_n(&mut self, cells: &'a [Cell<T>], n: usize) -> &mut Self {
        self.cells = &cells[..n];
        self
    }

    /// Exchange the ranges of two views.
    pub fn swap(&mut self, other: &mut Self) -> &mut Self {
        mem::swap(&mut self.cells, &mut other.cells);
        self
    }

    /// Whether the view covers no elements.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of elements covered.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Largest element count a view of `T` can describe.
    pub fn max_size() -> usize {
        match mem::size_of::<T>() {
            0 => usize::MAX,
            width => isize::MAX as usize / width,
        }
    }

    /// Address of the first element.
    pub fn as_ptr(&self) -> *const T {
        self.cells.as_ptr() as *const T
    }

    /// Address one past the last element.
    pub fn end_ptr(&self) -> *const T {
        self.cells.as_ptr_range().end as *const T
    }

    /// The underlying cells.
    pub fn cells(&self) -> &'a [Cell<T>] {
        self.cells
    }

    /// The cell at position `n`, if in range.
    pub fn cell(&self, n: usize) -> Option<&'a Cell<T>> {
        self.cells.get(n)
    }

    /// Intersection of the address ranges of `self` and `other`.
    ///
    /// Returns the null view when the ranges are disjoint. Ranges that only
    /// touch give an empty view positioned at the shared boundary, so an
    /// empty view overlaps itself as itself. Only addresses are compared, so
    /// `other` may describe entirely unrelated memory. Views of zero-sized
    /// `T` never overlap.
    pub fn overlap(&self, other: &View<'_, T>) -> View<'a, T> {
        let width = mem::size_of::<T>();
        if width == 0 {
            return Self::null();
        }
        let (first, last) = self.addr_range();
        let (o_first, o_last) = other.addr_range();
        let lo = first.max(o_first);
        let hi = last.min(o_last);
        if lo > hi {
            return Self::null();
        }
        let start = (lo - first) / width;
        let end = start + (hi - lo) / width;
        Self {
            cells: &self.cells[start..end],
        }
    }

    /// Sub-view from index `first` up to (not including) index `last`.
    ///
    /// Indices are relative to this view. A negative index counts from the
    /// end (`index += len`). `first` is then clamped into `[0, len]` and
    /// `last` into `[first, len]`, so any pair of integers yields a valid,
    /// possibly empty, sub-view. `slice(0, View::END)` is the whole view.
    pub fn slice(&self, first: isize, last: isize) -> View<'a, T> {
        let n = isize::try_from(self.len()).unwrap_or(isize::MAX);
        let first = clamp(if first < 0 { first + n } else { first }, 0, n);
        let last = clamp(if last < 0 { last + n } else { last }, first, n);
        Self {
            cells: &self.cells[first as usize..last as usize],
        }
    }

    /// Sub-view from index `first` to the end. See [`View::slice`].
    pub fn slice_from(&self, first: isize) -> View<'a, T> {
        self.slice(first, Self::END)
    }

    fn addr_range(&self) -> (usize, usize) {
        let range = self.cells.as_ptr_range();
        (range.start as usize, range.end as usize)
    }

    fn key(&self) -> (usize, usize) {
        (self.cells.as_ptr() as usize, self.cells.len())
    }
}

impl<'a, T: Copy> View<'a, T> {
    /// Value at position `n`, if in range.
    pub fn get(&self, n: usize) -> Option<T> {
        self.cells.get(n).map(Cell::get)
    }

    /// Overwrite the value at position `n`.
    ///
    /// # Panics
    ///
    /// Panics if `n >= len()`.
    pub fn set(&self, n: usize, value: T) {
        self.cells[n].set(value);
    }

    /// Forward iterator over the values; `.rev()` walks backwards.
    pub fn iter(&self) -> Values<'a, T> {
        Values {
            inner: self.cells.iter(),
        }
    }

    /// Copy the values out into a new `Vec`.
    pub fn to_vec(&self) -> Vec<T> {
        self.iter().collect()
    }

    /// Copy exactly `len()` values into the front of `dst`.
    ///
    /// # Panics
    ///
    /// Panics if `dst` is shorter than the view.
    pub fn copy_to_slice(&self, dst: &mut [T]) {
        for (d, c) in dst[..self.len()].iter_mut().zip(self.cells) {
            *d = c.get();
        }
    }

    /// Overwrite the view with the first `len()` values of `src`.
    ///
    /// # Panics
    ///
    /// Panics if `src` is shorter than the view.
    pub fn copy_from_slice(&self, src: &[T]) {
        for (c, &s) in self.cells.iter().zip(&src[..self.len()]) {
            c.set(s);
        }
    }

    /// Copy into another view, truncating to the shorter of the two.
    ///
    /// Elements are copied front to back, one at a time.
    pub fn copy_to(&self, other: &View<'_, T>) {
        for (d, s) in other.cells.iter().zip(self.cells) {
            d.set(s.get());
        }
    }

    /// Copy from another view, truncating to the shorter of the two.
    pub fn copy_from(&self, other: &View<'_, T>) {
        other.copy_to(self);
    }

    /// Assign `value` to every element.
    pub fn fill(&self, value: T) {
        for c in self.cells {
            c.set(value);
        }
    }

    /// Overwrite every element with `f` applied to the next position of
    /// `operands`.
    ///
    /// Runs exactly `len()` times, front to back. Every source in
    /// `operands` must provide at least `len()` items; a shorter source is a
    /// caller error caught by a debug assertion (release builds stop at the
    /// shortest source).
    ///
    /// ```
    /// use carve_core::View;
    ///
    /// let u = [1.0, 2.0, 3.0];
    /// let v = [10.0, 20.0, 30.0];
    /// let mut out = [0.0_f64; 3];
    /// let view = View::new(&mut out);
    /// view.apply((&u, &v), |(a, b)| a + b);
    /// assert_eq!(view.to_vec(), vec![11.0, 22.0, 33.0]);
    /// ```
    pub fn apply<O, F>(&self, operands: O, mut f: F)
    where
        O: Operands,
        F: FnMut(O::Item) -> T,
    {
        let mut cursor = operands.into_cursor();
        for c in self.cells {
            let args = cursor.next();
            debug_assert!(args.is_some(), "operand exhausted before end of view");
            let Some(args) = args else { return };
            c.set(f(args));
        }
    }

    /// Like [`View::apply`], but adds the result of `f` to each element
    /// instead of overwriting it.
    pub fn mutate<O, F>(&self, operands: O, mut f: F)
    where
        O: Operands,
        F: FnMut(O::Item) -> T,
        T: Add<Output = T>,
    {
        let mut cursor = operands.into_cursor();
        for c in self.cells {
            let args = cursor.next();
            debug_assert!(args.is_some(), "operand exhausted before end of view");
            let Some(args) = args else { return };
            c.set(c.get() + f(args));
        }
    }
}

impl<T> Clone for View<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for View<'_, T> {}

impl<T> Default for View<'_, T> {
    fn default() -> Self {
        Self::null()
    }
}

impl<T> PartialEq for View<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl<T> Eq for View<'_, T> {}

impl<T> PartialOrd for View<'_, T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for View<'_, T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl<T> Hash for View<'_, T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl<T> Index<usize> for View<'_, T> {
    type Output = Cell<T>;

    fn index(&self, index: usize) -> &Cell<T> {
        &self.cells[index]
    }
}

impl<'a, T> From<&'a mut [T]> for View<'a, T> {
    fn from(data: &'a mut [T]) -> Self {
        Self::new(data)
    }
}

impl<'a, T> From<&'a [Cell<T>]> for View<'a, T> {
    fn from(cells: &'a [Cell<T>]) -> Self {
        Self::from_cells(cells)
    }
}

impl<'a, T: Copy> IntoIterator for View<'a, T> {
    type Item = T;
    type IntoIter = Values<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T: Copy> IntoIterator for &View<'a, T> {
    type Item = T;
    type IntoIter = Values<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: Copy + fmt::Display> fmt::Display for View<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, value) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{value}")?;
        }
        Ok(())
    }
}

impl<T: Copy + fmt::Debug> fmt::Debug for View<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("View")
            .field("first", &self.as_ptr())
            .field("len", &self.len())
            .field("values", &self.to_vec())
            .finish()
    }
}

/// Iterator over the values of a [`View`].
#[derive(Clone)]
pub struct Values<'a, T> {
    inner: slice::Iter<'a, Cell<T>>,
}

impl<T: Copy> Iterator for Values<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.inner.next().map(Cell::get)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T: Copy> DoubleEndedIterator for Values<'_, T> {
    fn next_back(&mut self) -> Option<T> {
        self.inner.next_back().map(Cell::get)
    }
}

impl<T: Copy> ExactSizeIterator for Values<'_, T> {}

impl<T: Copy> FusedIterator for Values<'_, T> {}
