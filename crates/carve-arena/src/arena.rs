//! The aggregate allocation that virtual buffers are carved from.
//!
//! [`Arena`] owns one contiguous `Vec<Cell<Scalar>>`. It is sized exactly
//! once, after every buffer has been declared, and then lent out as a
//! shared cell slice for the buffers to bind against. The borrow checker
//! guarantees the arena is neither resized nor dropped while any buffer
//! or view still refers to it.

use std::cell::Cell;

use carve_core::{Scalar, View};

use crate::config::ArenaConfig;
use crate::error::ArenaError;

/// Single contiguous scalar store shared by every buffer of a problem.
#[derive(Debug)]
pub struct Arena {
    data: Vec<Cell<Scalar>>,
    allocated: bool,
    config: ArenaConfig,
}

impl Arena {
    /// Create an unallocated arena.
    pub fn new(config: ArenaConfig) -> Result<Self, ArenaError> {
        config.validate()?;
        Ok(Self {
            data: Vec::new(),
            allocated: false,
            config,
        })
    }

    /// Create an arena and allocate `len` scalars straight away.
    pub fn with_len(len: usize, config: ArenaConfig) -> Result<Self, ArenaError> {
        let mut arena = Self::new(config)?;
        arena.allocate(len)?;
        Ok(arena)
    }

    /// Allocate `len` scalars, each set to the configured initial value.
    ///
    /// The arena is allocated at most once, even when `len` is zero; a
    /// second call fails with [`ArenaError::AlreadyAllocated`].
    pub fn allocate(&mut self, len: usize) -> Result<(), ArenaError> {
        if self.allocated {
            return Err(ArenaError::AlreadyAllocated { len: self.data.len() });
        }
        if len > self.config.max_len {
            return Err(ArenaError::CapacityExceeded {
                requested: len,
                capacity: self.config.max_len,
            });
        }
        self.data = vec![Cell::new(self.config.initial_value); len];
        self.allocated = true;
        log::debug!("arena allocated {len} scalars ({} bytes)", self.memory_bytes());
        Ok(())
    }

    /// Whether [`allocate`](Arena::allocate) has succeeded, at any length.
    pub fn is_allocated(&self) -> bool {
        self.allocated
    }

    /// The allocation as shared cells, ready for binding.
    pub fn cells(&self) -> &[Cell<Scalar>] {
        &self.data
    }

    /// A view over the whole allocation.
    pub fn view(&self) -> View<'_, Scalar> {
        View::from_cells(&self.data)
    }

    /// Restore every scalar to the configured initial value.
    pub fn clear(&self) {
        self.view().fill(self.config.initial_value);
    }

    /// Copy the current contents out.
    pub fn to_vec(&self) -> Vec<Scalar> {
        self.view().to_vec()
    }

    /// Number of scalars allocated.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether no scalars are allocated.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Memory usage of the allocation in bytes.
    pub fn memory_bytes(&self) -> usize {
        self.data.len() * std::mem::size_of::<Scalar>()
    }

    /// The configuration this arena was built with.
    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            allocated: false,
            config: ArenaConfig::default(),
        }
    }
}
