//! Book-keeping for UBX requests that expect an ACK-ACK/ACK-NAK.

use log::warn;

use crate::{constants::LEDGER_CAPACITY, error::EngineError};

/// A sent request still waiting for its acknowledgement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PendingRequest {
    pub class: u8,
    pub id: u8,
    /// Tick at which the request was queued
    pub queued_at: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FailureReason {
    /// The receiver answered with ACK-NAK
    Nak,
    /// No answer within the response timeout
    Timeout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Failure {
    pub class: u8,
    pub id: u8,
    pub reason: FailureReason,
}

pub type Failures = heapless::Vec<Failure, LEDGER_CAPACITY>;

/// Two FIFO queues: requests awaiting a response, and requests that failed.
///
/// At most one entry per (class, id) is expected to be outstanding, but
/// this is not enforced; [`Ledger::resolve`] removes every match.
#[derive(Debug, Default, Clone)]
pub struct Ledger {
    pending: heapless::Vec<PendingRequest, LEDGER_CAPACITY>,
    failures: Failures,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a response-awaited entry.
    pub fn register(&mut self, class: u8, id: u8, now: u32) -> Result<(), EngineError> {
        self.pending
            .push(PendingRequest {
                class,
                id,
                queued_at: now,
            })
            .map_err(|_| EngineError::LedgerFull { class, id })
    }

    /// Removes every response-awaited entry for (class, id), returning how
    /// many were removed.
    pub fn resolve(&mut self, class: u8, id: u8) -> usize {
        let before = self.pending.len();
        self.pending.retain(|p| !(p.class == class && p.id == id));
        before - self.pending.len()
    }

    /// Records a failure. When the failure queue is full the oldest entry
    /// is dropped.
    pub fn fail(&mut self, class: u8, id: u8, reason: FailureReason) {
        let failure = Failure { class, id, reason };
        if self.failures.is_full() {
            let dropped = self.failures.remove(0);
            warn!("failure queue full, dropping {dropped:?}");
        }
        let _ = self.failures.push(failure);
    }

    /// Moves every entry older than `timeout` into the failure queue.
    pub fn sweep(&mut self, now: u32, timeout: u32) -> usize {
        let mut expired = heapless::Vec::<PendingRequest, LEDGER_CAPACITY>::new();
        self.pending.retain(|p| {
            if now.wrapping_sub(p.queued_at) > timeout {
                // same capacity as `pending`, cannot overflow
                let _ = expired.push(*p);
                false
            } else {
                true
            }
        });
        for p in &expired {
            warn!(
                "no response to {:#04x}/{:#04x} within {timeout} ms",
                p.class, p.id
            );
            self.fail(p.class, p.id, FailureReason::Timeout);
        }
        expired.len()
    }

    /// Hands over all failures, oldest first, and empties the queue.
    pub fn drain_failures(&mut self) -> Failures {
        core::mem::take(&mut self.failures)
    }

    /// Removes and returns the oldest failure for (class, id).
    pub fn take_failure(&mut self, class: u8, id: u8) -> Option<Failure> {
        let index = self
            .failures
            .iter()
            .position(|f| f.class == class && f.id == id)?;
        Some(self.failures.remove(index))
    }

    pub fn is_pending(&self, class: u8, id: u8) -> bool {
        self.pending.iter().any(|p| p.class == class && p.id == id)
    }

    pub fn has_failure(&self, class: u8, id: u8) -> bool {
        self.failures.iter().any(|f| f.class == class && f.id == id)
    }

    pub fn pending(&self) -> &[PendingRequest] {
        &self.pending
    }

    pub fn failures(&self) -> &[Failure] {
        &self.failures
    }

    pub fn is_full(&self) -> bool {
        self.pending.is_full()
    }
}
