//! Machine table: backing store plus sorted index
//!
//! The table is the sole arbiter of the `(ip, port)` to machine mapping. It
//! is not internally synchronized; [`crate::ClusterRegistry`] wraps it in the
//! single registry lock.

use crate::error::{ClusterError, Result};
use crate::machine::{Machine, MachineHandle, MachineId};

/// Fixed-capacity, append-only collection of machines with an auxiliary
/// index kept sorted by [`MachineId`].
///
/// Machines are only ever added at the next free slot and never removed or
/// compacted; a machine leaving the cluster is modeled as `dead = true`.
/// Handles are therefore stable for the lifetime of the table.
#[derive(Debug)]
pub struct MachineTable {
    /// Backing store, in insertion order
    machines: Vec<Machine>,

    /// Handles into the backing store, sorted by machine id
    sorted: Vec<MachineHandle>,

    capacity: usize,
}

impl MachineTable {
    /// Create a table for up to `capacity` machines.
    ///
    /// Both the backing store and the index are reserved up front; failing to
    /// reserve either surfaces as [`ClusterError::Allocation`], which callers
    /// treat as fatal at startup.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(ClusterError::configuration(
                "machine capacity must be at least 1",
            ));
        }

        let mut machines: Vec<Machine> = Vec::new();
        machines.try_reserve_exact(capacity)?;
        let mut sorted: Vec<MachineHandle> = Vec::new();
        sorted.try_reserve_exact(capacity)?;

        Ok(Self {
            machines,
            sorted,
            capacity,
        })
    }

    /// Insert a new machine for `id` in its insertion state (dead, zero
    /// connections, hostname from the dotted-decimal address).
    ///
    /// Returns [`ClusterError::MachineAlreadyExists`] carrying the existing
    /// handle when the key is already present, and
    /// [`ClusterError::CapacityExceeded`] when the store is full. Neither
    /// failure mutates the table.
    pub fn insert(&mut self, id: MachineId) -> Result<MachineHandle> {
        let pos = self
            .sorted
            .partition_point(|&h| self.machines[h.index()].id < id);

        if let Some(&existing) = self.sorted.get(pos) {
            if self.machines[existing.index()].id == id {
                return Err(ClusterError::MachineAlreadyExists(existing));
            }
        }

        if self.machines.len() >= self.capacity {
            tracing::error!(
                "machine {} rejected: exceeds max machine count {}",
                id,
                self.capacity
            );
            return Err(ClusterError::capacity_exceeded(self.capacity));
        }

        let handle = MachineHandle::new(self.machines.len());
        self.machines.push(Machine::new(id));
        // Shifts the tail of the index right by one; the backing store is
        // never reordered.
        self.sorted.insert(pos, handle);

        Ok(handle)
    }

    /// Binary-search the sorted index for `id`.
    pub fn lookup(&self, id: MachineId) -> Option<MachineHandle> {
        self.sorted
            .binary_search_by(|&h| self.machines[h.index()].id.cmp(&id))
            .ok()
            .map(|pos| self.sorted[pos])
    }

    pub fn get(&self, handle: MachineHandle) -> Option<&Machine> {
        self.machines.get(handle.index())
    }

    pub fn get_mut(&mut self, handle: MachineHandle) -> Option<&mut Machine> {
        self.machines.get_mut(handle.index())
    }

    /// Number of machines currently stored
    pub fn len(&self) -> usize {
        self.machines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.machines.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.machines.len() >= self.capacity
    }

    /// Handles in ascending key order
    pub fn sorted_handles(&self) -> impl Iterator<Item = MachineHandle> + '_ {
        self.sorted.iter().copied()
    }
}
