use std::collections::VecDeque;

use aquarium_core::{ids::UserId, LayoutSnapshot, Millis};
use aquarium_storage::LayoutStore;

use crate::config::RetryPolicy;

struct PendingWrite {
    seq: u64,
    user_id: UserId,
    snapshot: LayoutSnapshot,
    failures: u32,
    next_attempt_at: Millis,
}

/// Result of one flush pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FlushReport {
    pub written: usize,
    /// Attempts that failed in this pass.
    pub failed: usize,
    /// Writes that failed for the first time in this pass.
    pub first_failures: usize,
    /// Failed writes dropped because a newer snapshot was queued behind them.
    pub superseded: usize,
    /// Writes dropped after exhausting their retries.
    pub abandoned: usize,
}

/// Ordered queue of whole-layout writes with retry and backoff.
///
/// Every entry is a full snapshot, so a newer entry for the same user makes
/// any older failed entry redundant. Entries that have never been attempted
/// are always sent, in order.
pub struct WriteBackQueue {
    pending: VecDeque<PendingWrite>,
    next_seq: u64,
    policy: RetryPolicy,
}

impl WriteBackQueue {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            pending: VecDeque::new(),
            next_seq: 0,
            policy,
        }
    }

    pub fn enqueue(&mut self, user_id: UserId, snapshot: LayoutSnapshot, now: Millis) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.push_back(PendingWrite {
            seq,
            user_id,
            snapshot,
            failures: 0,
            next_attempt_at: now,
        });
        seq
    }

    pub fn is_dirty(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn is_dirty_for(&self, user_id: UserId) -> bool {
        self.pending.iter().any(|w| w.user_id == user_id)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// The newest snapshot still waiting to be stored for `user_id`.
    pub fn latest_for(&self, user_id: UserId) -> Option<&LayoutSnapshot> {
        self.pending
            .iter()
            .rev()
            .find(|w| w.user_id == user_id)
            .map(|w| &w.snapshot)
    }

    /// Send every due write, oldest first. Stops at the first write that has
    /// to wait for its backoff.
    pub fn flush(&mut self, store: &mut dyn LayoutStore, now: Millis) -> FlushReport {
        let mut report = FlushReport::default();
        report.superseded += self.drop_superseded();

        while let Some(mut write) = self.pending.pop_front() {
            if write.next_attempt_at > now {
                self.pending.push_front(write);
                break;
            }
            match store.put_layout(write.user_id, &write.snapshot) {
                Ok(()) => {
                    tracing::debug!(user = %write.user_id, seq = write.seq, "layout written");
                    report.written += 1;
                }
                Err(e) => {
                    write.failures += 1;
                    report.failed += 1;
                    if write.failures == 1 {
                        report.first_failures += 1;
                    }
                    tracing::warn!(
                        user = %write.user_id,
                        seq = write.seq,
                        attempt = write.failures,
                        error = %e,
                        "layout write failed"
                    );
                    if self.has_newer_for(write.user_id) {
                        report.superseded += 1;
                    } else if write.failures >= self.policy.max_attempts {
                        tracing::warn!(user = %write.user_id, seq = write.seq, "giving up on layout write");
                        report.abandoned += 1;
                    } else {
                        write.next_attempt_at = now + self.policy.backoff_ms(write.failures);
                        self.pending.push_front(write);
                        break;
                    }
                }
            }
        }
        report
    }

    /// Remove failed writes that have a newer write for the same user queued.
    fn drop_superseded(&mut self) -> usize {
        let before = self.pending.len();
        let mut kept: VecDeque<PendingWrite> = VecDeque::with_capacity(before);
        while let Some(write) = self.pending.pop_front() {
            let newer = self.pending.iter().any(|w| w.user_id == write.user_id);
            if write.failures > 0 && newer {
                tracing::debug!(user = %write.user_id, seq = write.seq, "dropping superseded layout write");
                continue;
            }
            kept.push_back(write);
        }
        self.pending = kept;
        before - self.pending.len()
    }

    fn has_newer_for(&self, user_id: UserId) -> bool {
        self.pending.iter().any(|w| w.user_id == user_id)
    }
}
