//! Observability and Metrics
//!
//! Counters for packet dispatch, type registration and table synchronization.
//!
//! Every [`PacketTypeRegistry`](crate::protocol::registry::PacketTypeRegistry) owns one
//! `Metrics` instance; there is no process-wide collector. Counters are atomics so a
//! snapshot can be taken through a shared reference.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::{debug, info};

#[derive(Debug)]
pub struct Metrics {
    /// Packets handed to a registered callback
    pub packets_dispatched: AtomicU64,
    /// Packets dropped because their type was not registered
    pub packets_unknown: AtomicU64,
    /// Payload bytes of dispatched packets
    pub bytes_dispatched: AtomicU64,
    /// Successful type registrations
    pub registrations: AtomicU64,
    /// Rejected type registrations (duplicate names, exhausted probing)
    pub registrations_rejected: AtomicU64,
    /// Identifier collisions resolved by probing
    pub collisions_resolved: AtomicU64,
    /// Successful table synchronizations
    pub syncs_success: AtomicU64,
    /// Failed table synchronizations
    pub syncs_failed: AtomicU64,
    /// Entries moved to a different identifier by synchronization
    pub types_remapped: AtomicU64,
    start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            packets_dispatched: AtomicU64::new(0),
            packets_unknown: AtomicU64::new(0),
            bytes_dispatched: AtomicU64::new(0),
            registrations: AtomicU64::new(0),
            registrations_rejected: AtomicU64::new(0),
            collisions_resolved: AtomicU64::new(0),
            syncs_success: AtomicU64::new(0),
            syncs_failed: AtomicU64::new(0),
            types_remapped: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn packet_dispatched(&self, payload_bytes: u64) {
        self.packets_dispatched.fetch_add(1, Ordering::Relaxed);
        self.bytes_dispatched.fetch_add(payload_bytes, Ordering::Relaxed);
    }

    pub fn packet_unknown(&self) {
        self.packets_unknown.fetch_add(1, Ordering::Relaxed);
    }

    pub fn registration(&self) {
        self.registrations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn registration_rejected(&self) {
        self.registrations_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Record that a registration needed `probes` extra candidates to find a free id
    pub fn collision_resolved(&self, probes: u64) {
        if probes > 0 {
            self.collisions_resolved.fetch_add(1, Ordering::Relaxed);
            debug!(probes, "Packet type identifier collision resolved");
        }
    }

    pub fn sync_success(&self, remapped: u64) {
        self.syncs_success.fetch_add(1, Ordering::Relaxed);
        self.types_remapped.fetch_add(remapped, Ordering::Relaxed);
    }

    pub fn sync_failed(&self) {
        self.syncs_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            packets_dispatched: self.packets_dispatched.load(Ordering::Relaxed),
            packets_unknown: self.packets_unknown.load(Ordering::Relaxed),
            bytes_dispatched: self.bytes_dispatched.load(Ordering::Relaxed),
            registrations: self.registrations.load(Ordering::Relaxed),
            registrations_rejected: self.registrations_rejected.load(Ordering::Relaxed),
            collisions_resolved: self.collisions_resolved.load(Ordering::Relaxed),
            syncs_success: self.syncs_success.load(Ordering::Relaxed),
            syncs_failed: self.syncs_failed.load(Ordering::Relaxed),
            types_remapped: self.types_remapped.load(Ordering::Relaxed),
            uptime_seconds: self.start_time.elapsed().as_secs(),
        }
    }

    pub fn log_metrics(&self) {
        let snapshot = self.snapshot();
        info!(
            packets_dispatched = snapshot.packets_dispatched,
            packets_unknown = snapshot.packets_unknown,
            bytes_dispatched = snapshot.bytes_dispatched,
            registrations = snapshot.registrations,
            registrations_rejected = snapshot.registrations_rejected,
            collisions_resolved = snapshot.collisions_resolved,
            syncs_success = snapshot.syncs_success,
            syncs_failed = snapshot.syncs_failed,
            types_remapped = snapshot.types_remapped,
            uptime_seconds = snapshot.uptime_seconds,
            "Packet registry metrics snapshot"
        );
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of metrics at a point in time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub packets_dispatched: u64,
    pub packets_unknown: u64,
    pub bytes_dispatched: u64,
    pub registrations: u64,
    pub registrations_rejected: u64,
    pub collisions_resolved: u64,
    pub syncs_success: u64,
    pub syncs_failed: u64,
    pub types_remapped: u64,
    pub uptime_seconds: u64,
}
