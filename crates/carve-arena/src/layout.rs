//! Buffer layout: name → region offset table over one aggregate allocation.
//!
//! Regions are packed back to back in declaration order, so the layout of a
//! given declaration sequence is deterministic and no two regions alias.

use std::cell::Cell;

use indexmap::IndexMap;

use carve_core::Scalar;

/// A contiguous run of scalars assigned to one buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Region {
    /// Index of the first scalar within the aggregate allocation.
    pub offset: usize,
    /// Number of scalars.
    pub len: usize,
}

impl Region {
    /// One past the last scalar of the region.
    pub fn end(&self) -> usize {
        self.offset + self.len
    }
}

/// Offset table partitioning one allocation across named buffers.
#[derive(Clone, Debug, Default)]
pub struct Layout {
    regions: IndexMap<String, Region>,
    total_len: usize,
}

impl Layout {
    /// Pack `(name, len)` pairs back to back in iteration order.
    ///
    /// # Panics
    ///
    /// Panics on a duplicate name or if the total length overflows `usize`.
    pub fn pack<'n, I>(buffers: I) -> Self
    where
        I: IntoIterator<Item = (&'n str, usize)>,
    {
        let mut layout = Self::default();
        for (name, len) in buffers {
            layout.push(name, len);
        }
        layout
    }

    /// Append a region of `len` scalars after the current last region.
    ///
    /// # Panics
    ///
    /// Panics on a duplicate name or if the total length overflows `usize`.
    pub fn push(&mut self, name: &str, len: usize) -> Region {
        assert!(
            !self.regions.contains_key(name),
            "duplicate buffer name '{name}' in layout"
        );
        let region = Region {
            offset: self.total_len,
            len,
        };
        self.total_len = self
            .total_len
            .checked_add(len)
            .unwrap_or_else(|| panic!("layout length overflows usize at buffer '{name}'"));
        self.regions.insert(name.to_string(), region);
        region
    }

    /// Region assigned to `name`.
    pub fn region(&self, name: &str) -> Option<Region> {
        self.regions.get(name).copied()
    }

    /// The cells of `storage` that belong to `name`.
    ///
    /// Returns `None` if `name` is unknown or `storage` is too short to
    /// contain its region.
    pub fn carve<'s>(&self, name: &str, storage: &'s [Cell<Scalar>]) -> Option<&'s [Cell<Scalar>]> {
        let region = self.region(name)?;
        storage.get(region.offset..region.end())
    }

    /// Scalars needed to hold every region.
    pub fn total_len(&self) -> usize {
        self.total_len
    }

    /// Number of regions.
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// Whether the layout has no regions.
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Iterate over regions in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Region)> {
        self.regions.iter().map(|(name, r)| (name.as_str(), *r))
    }
}
