//! Serializes transitions: one in flight, the rest wait in FIFO order.
//!
//! The gate is handed over directly from the finishing transition to the
//! oldest waiter; the pending flag stays set across the hand-over so no
//! newcomer can slip in between.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::oneshot;

#[derive(Debug, Default)]
struct GateState {
    pending: bool,
    waiters: VecDeque<oneshot::Sender<()>>,
}

/// Pending flag plus a queue of wake tokens.
#[derive(Debug, Default)]
pub struct PendingGate {
    state: Mutex<GateState>,
}

/// Proof of holding the gate. Dropping it releases the gate to the next
/// waiter, or clears the pending flag when nobody is waiting.
#[must_use = "the gate is released as soon as the permit is dropped"]
#[derive(Debug)]
pub struct Permit<'a> {
    gate: &'a PendingGate,
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        self.gate.release();
    }
}

/// A place in the queue. If the waiting future is dropped after the gate
/// was already handed to it, the gate is passed on.
struct Ticket<'a> {
    gate: &'a PendingGate,
    rx: Option<oneshot::Receiver<()>>,
}

impl Drop for Ticket<'_> {
    fn drop(&mut self) {
        if let Some(mut rx) = self.rx.take() {
            rx.close();
            if rx.try_recv().is_ok() {
                self.gate.release();
            }
        }
    }
}

impl PendingGate {
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(GateState {
                pending: false,
                waiters: VecDeque::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, GateState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_pending(&self) -> bool {
        self.lock().pending
    }

    /// Number of callers waiting for the gate.
    pub fn queued(&self) -> usize {
        self.lock().waiters.len()
    }

    /// Take the gate if it is free.
    pub fn try_enter(&self) -> Option<Permit<'_>> {
        let mut state = self.lock();
        if state.pending {
            return None;
        }
        state.pending = true;
        Some(Permit { gate: self })
    }

    /// Take the gate, waiting behind earlier callers if it is held.
    pub async fn enter(&self) -> Permit<'_> {
        let mut ticket = {
            let mut state = self.lock();
            if !state.pending {
                state.pending = true;
                return Permit { gate: self };
            }
            let (tx, rx) = oneshot::channel();
            state.waiters.push_back(tx);
            Ticket {
                gate: self,
                rx: Some(rx),
            }
        };

        if let Some(rx) = ticket.rx.as_mut() {
            // Senders are only dropped after a failed send, so an error here
            // cannot happen while the gate is alive.
            let _ = rx.await;
        }
        ticket.rx = None;

        Permit { gate: self }
    }

    fn release(&self) {
        let mut state = self.lock();
        while let Some(waiter) = state.waiters.pop_front() {
            if waiter.send(()).is_ok() {
                return;
            }
        }
        state.pending = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn try_enter_is_exclusive() {
        let gate = PendingGate::new();

        let permit = gate.try_enter();
        assert!(permit.is_some());
        assert!(gate.is_pending());
        assert!(gate.try_enter().is_none());

        drop(permit);
        assert!(!gate.is_pending());
        assert!(gate.try_enter().is_some());
    }

    #[tokio::test]
    async fn enter_is_immediate_when_free() {
        let gate = PendingGate::new();

        let permit = gate.enter().await;
        assert!(gate.is_pending());
        drop(permit);
        assert!(!gate.is_pending());
    }

    #[tokio::test]
    async fn waiters_are_served_in_arrival_order() {
        let gate = Arc::new(PendingGate::new());
        let order = Arc::new(Mutex::new(Vec::new()));

        let held = gate.enter().await;

        let mut tasks = Vec::new();
        for id in 0..3 {
            let waiter_gate = Arc::clone(&gate);
            let order = Arc::clone(&order);
            tasks.push(tokio::spawn(async move {
                let _permit = waiter_gate.enter().await;
                order.lock().unwrap().push(id);
            }));
            // Let each task enqueue before spawning the next.
            while gate.queued() < id + 1 {
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        }

        drop(held);
        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2]);
        assert!(!gate.is_pending());
    }

    #[tokio::test]
    async fn pending_flag_survives_hand_over() {
        let gate = Arc::new(PendingGate::new());
        let held = gate.enter().await;

        let waiter = {
            let gate = Arc::clone(&gate);
            tokio::spawn(async move {
                let _permit = gate.enter().await;
                tokio::time::sleep(Duration::from_millis(20)).await;
            })
        };
        while gate.queued() == 0 {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }

        drop(held);
        assert!(gate.is_pending());
        assert!(gate.try_enter().is_none());

        waiter.await.unwrap();
        assert!(!gate.is_pending());
    }

    #[tokio::test]
    async fn abandoned_waiter_is_skipped() {
        let gate = PendingGate::new();
        let held = gate.enter().await;

        {
            let abandoned = gate.enter();
            tokio::pin!(abandoned);
            // Poll once so the waiter is queued, then drop it.
            assert!(futures::poll!(abandoned.as_mut()).is_pending());
            assert_eq!(gate.queued(), 1);
        }

        drop(held);
        assert!(!gate.is_pending());
        assert!(gate.try_enter().is_some());
    }

    #[tokio::test]
    async fn waiter_dropped_after_wake_passes_gate_on() {
        let gate = PendingGate::new();
        let held = gate.enter().await;

        {
            let woken = gate.enter();
            tokio::pin!(woken);
            assert!(futures::poll!(woken.as_mut()).is_pending());

            // Hand the gate to the queued waiter, then drop it unpolled.
            drop(held);
            assert!(gate.is_pending());
        }

        assert!(!gate.is_pending());
    }
}
