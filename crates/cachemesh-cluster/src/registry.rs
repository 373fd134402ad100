//! Cluster membership registry
//!
//! [`ClusterRegistry`] owns the machine table and derives machine liveness
//! from connection accounting. One coarse lock serializes structural mutation
//! (insertions shifting the sorted index) with liveness and connection-count
//! mutation, so a lookup never observes a half-shifted index and a liveness
//! flip never races an insertion.

use std::net::Ipv4Addr;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::config::ClusterConfig;
use crate::error::{ClusterError, Result};
use crate::lifecycle::{ConnectionPoller, LivenessListener, SocketContext};
use crate::machine::{Machine, MachineHandle, MachineId};
use crate::table::MachineTable;

/// The membership registry of one cache-cluster node.
///
/// All operations are synchronous; mutating operations block on the registry
/// lock and run as mutually exclusive critical sections. Liveness transitions
/// are delivered to the [`LivenessListener`] inside the critical section that
/// caused them, exactly once per edge and in order.
pub struct ClusterRegistry {
    config: ClusterConfig,
    table: Mutex<MachineTable>,
    poller: Arc<dyn ConnectionPoller>,
    listener: Arc<dyn LivenessListener>,
}

impl ClusterRegistry {
    /// Create a registry sized for `config.max_machines` peers.
    ///
    /// Fails with [`ClusterError::Allocation`] when the table cannot be
    /// reserved; callers treat that as a fatal startup condition.
    pub fn new(
        config: ClusterConfig,
        poller: Arc<dyn ConnectionPoller>,
        listener: Arc<dyn LivenessListener>,
    ) -> Result<Self> {
        config.validate()?;
        let table = MachineTable::with_capacity(config.max_machines)?;

        tracing::info!(
            "machine registry for cluster {} initialized, capacity {}",
            config.cluster_name,
            config.max_machines
        );

        Ok(Self {
            config,
            table: Mutex::new(table),
            poller,
            listener,
        })
    }

    pub fn config(&self) -> &ClusterConfig {
        &self.config
    }

    /// Register a machine under its `(ip, port)` key.
    ///
    /// A repeated key fails with [`ClusterError::MachineAlreadyExists`]
    /// carrying the original handle; two callers racing to register the same
    /// peer is an expected condition, not a bug.
    pub fn add_machine(&self, ip: Ipv4Addr, port: u16) -> Result<MachineHandle> {
        let id = MachineId::new(ip, port);
        let mut table = self.table();
        let handle = table.insert(id)?;

        tracing::info!("added {} to cluster registry", table_summary(&table, handle));
        Ok(handle)
    }

    /// Resolve a machine by its `(ip, port)` key.
    ///
    /// Runs under the registry lock so it is serialized with insertions.
    pub fn get_machine(&self, ip: Ipv4Addr, port: u16) -> Option<MachineHandle> {
        self.table().lookup(MachineId::new(ip, port))
    }

    /// Explicit up-signal for `handle`.
    ///
    /// Liveness-up is a protocol-level judgment made above this layer;
    /// connection counting alone never revives a machine. Flips the machine
    /// to alive and notifies the listener when it was dead, and is a no-op
    /// otherwise.
    pub fn notify_up(&self, handle: MachineHandle) -> Result<()> {
        let mut table = self.table();
        let machine = table
            .get_mut(handle)
            .ok_or_else(|| ClusterError::machine_not_found(handle.to_string()))?;

        tracing::debug!(
            "up signal for {}: connections {}, dead {}",
            machine.id,
            machine.now_connections,
            machine.dead
        );

        if machine.dead {
            machine.dead = false;
            self.notify_liveness_changed(&table, handle);
        }

        Ok(())
    }

    /// Account a newly established connection for `ctx.machine`.
    ///
    /// The socket is registered with the readiness poller first; a
    /// registration failure is returned unchanged and the count is not
    /// touched. Returns the new connection count. An increment never
    /// triggers a liveness transition.
    pub fn add_connection(&self, ctx: &SocketContext) -> Result<u32> {
        let mut table = self.table();
        table
            .get(ctx.machine)
            .ok_or_else(|| ClusterError::machine_not_found(ctx.machine.to_string()))?;

        self.poller.register_for_readiness(ctx)?;

        let machine = table
            .get_mut(ctx.machine)
            .ok_or_else(|| ClusterError::machine_not_found(ctx.machine.to_string()))?;
        machine.now_connections += 1;
        let count = machine.now_connections;

        tracing::debug!(
            "{} added {} connection, count {}, dead {}",
            machine.hostname,
            ctx.direction,
            count,
            machine.dead
        );

        Ok(count)
    }

    /// Account a torn-down connection for `ctx.machine`.
    ///
    /// The socket is deregistered from the readiness poller first; a
    /// deregistration failure is returned unchanged and the count is not
    /// touched. When the count reaches zero on a machine that was alive, the
    /// machine flips to dead and the listener is notified within the same
    /// critical section as the decrement. Returns the new connection count.
    pub fn remove_connection(&self, ctx: &SocketContext) -> Result<u32> {
        let mut table = self.table();
        let machine = table
            .get(ctx.machine)
            .ok_or_else(|| ClusterError::machine_not_found(ctx.machine.to_string()))?;

        if machine.now_connections == 0 {
            return Err(ClusterError::invalid_state(format!(
                "{} has no connections to remove",
                machine.id
            )));
        }

        self.poller.deregister_from_readiness(ctx)?;

        let machine = table
            .get_mut(ctx.machine)
            .ok_or_else(|| ClusterError::machine_not_found(ctx.machine.to_string()))?;
        machine.now_connections -= 1;
        let count = machine.now_connections;
        let hostname = machine.hostname.clone();
        let was_dead = machine.dead;
        let went_down = count == 0 && !machine.dead;

        if went_down {
            machine.dead = true;
            self.notify_liveness_changed(&table, ctx.machine);
        }

        tracing::debug!(
            "{} removed {} connection, count {}, dead {}",
            hostname,
            ctx.direction,
            count,
            was_dead || went_down
        );

        Ok(count)
    }

    /// Snapshot of one machine record
    pub fn machine(&self, handle: MachineHandle) -> Option<Machine> {
        self.table().get(handle).cloned()
    }

    /// Number of machines currently registered
    pub fn machine_count(&self) -> usize {
        self.table().len()
    }

    /// Configured maximum machine count
    pub fn capacity(&self) -> usize {
        self.table().capacity()
    }

    /// Snapshot of all machines in ascending `(ip, port)` order
    pub fn sorted_machines(&self) -> Vec<Machine> {
        let table = self.table();
        table
            .sorted_handles()
            .filter_map(|h| table.get(h).cloned())
            .collect()
    }

    fn table(&self) -> MutexGuard<'_, MachineTable> {
        // A poisoned lock means another thread panicked mid-operation; every
        // operation mutates the table all-or-nothing, so the structure is
        // still consistent and the lock can be recovered.
        self.table.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn notify_liveness_changed(&self, table: &MachineTable, handle: MachineHandle) {
        if let Some(machine) = table.get(handle) {
            tracing::info!(
                "machine {} is now {}",
                machine.id,
                if machine.dead { "dead" } else { "alive" }
            );
            self.listener.on_machine_liveness_changed(machine);
        }
    }
}

fn table_summary(table: &MachineTable, handle: MachineHandle) -> String {
    table
        .get(handle)
        .map(|m| m.summary())
        .unwrap_or_else(|| handle.to_string())
}
