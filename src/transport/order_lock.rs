//! Ticketed gate that linearizes batch handoff in frame arrival order.
//!
//! Every inbound frame draws a ticket synchronously as it comes off the
//! socket. Its decode task then waits for its turn before decoding and
//! handing the batch off, and releases the gate when its guard drops,
//! whether the decode succeeded or not. A wait that exceeds the bound
//! force-advances the gate past the stuck holder: that one batch may then
//! arrive out of order, but the pipeline never deadlocks.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;

/// Position of one frame in arrival order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

/// Shared FIFO gate for decode tasks.
#[derive(Debug, Default)]
pub struct OrderLock {
    next_ticket: AtomicU64,
    serving: AtomicU64,
    forced: AtomicU64,
    released: Notify,
}

impl OrderLock {
    /// A gate with no tickets issued.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Draw the next ticket. Call in arrival order.
    pub fn ticket(&self) -> Ticket {
        Ticket(self.next_ticket.fetch_add(1, Ordering::SeqCst))
    }

    /// Wait until `ticket` is being served, for at most `bound`.
    ///
    /// On timeout the gate is forced to `ticket`, an error is logged, and
    /// the guard is returned anyway.
    pub async fn acquire(self: &Arc<Self>, ticket: Ticket, bound: Duration) -> OrderGuard {
        let deadline = tokio::time::Instant::now() + bound;
        loop {
            let released = self.released.notified();
            if self.serving.load(Ordering::SeqCst) >= ticket.0 {
                break;
            }
            if tokio::time::timeout_at(deadline, released).await.is_err() {
                let stuck = self.serving.fetch_max(ticket.0, Ordering::SeqCst);
                let _ = self.forced.fetch_add(1, Ordering::SeqCst);
                log::error!(
                    "frame {} waited {bound:?} for frame {stuck} to hand off; \
                     forcing the order lock, batches may arrive out of order",
                    ticket.0
                );
                break;
            }
        }
        OrderGuard {
            lock: Arc::clone(self),
            ticket,
        }
    }

    /// How many waits have timed out and forced the gate.
    #[must_use]
    pub fn forced_releases(&self) -> u64 {
        self.forced.load(Ordering::SeqCst)
    }

    fn release(&self, ticket: Ticket) {
        let _ = self.serving.fetch_max(ticket.0 + 1, Ordering::SeqCst);
        self.released.notify_waiters();
    }
}

/// Held while one frame is decoded and handed off. Dropping it lets the
/// next ticket through.
#[derive(Debug)]
pub struct OrderGuard {
    lock: Arc<OrderLock>,
    ticket: Ticket,
}

impl Drop for OrderGuard {
    fn drop(&mut self) {
        self.lock.release(self.ticket);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    const BOUND: Duration = Duration::from_secs(2);

    #[tokio::test]
    async fn tickets_are_served_in_draw_order() {
        let lock = OrderLock::new();
        let order = Arc::new(Mutex::new(Vec::new()));
        let tickets: Vec<Ticket> = (0..4).map(|_| lock.ticket()).collect();

        // Spawn in reverse so the scheduler would favour the wrong order.
        let mut tasks = Vec::new();
        for (i, ticket) in tickets.into_iter().enumerate().rev() {
            let lock = Arc::clone(&lock);
            let order = Arc::clone(&order);
            tasks.push(tokio::spawn(async move {
                let _guard = lock.acquire(ticket, BOUND).await;
                tokio::task::yield_now().await;
                order.lock().unwrap().push(i);
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }
        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2, 3]);
        assert_eq!(lock.forced_releases(), 0);
    }

    #[tokio::test]
    async fn stuck_holder_is_skipped_after_the_bound() {
        let lock = OrderLock::new();
        let first = lock.ticket();
        let second = lock.ticket();
        let held = lock.acquire(first, BOUND).await;

        let started = tokio::time::Instant::now();
        let guard = lock.acquire(second, Duration::from_millis(50)).await;
        assert!(started.elapsed() >= Duration::from_millis(50));
        assert_eq!(lock.forced_releases(), 1);

        // The late holder's release must not rewind the gate.
        drop(held);
        drop(guard);
        let third = lock.ticket();
        let _guard = lock.acquire(third, Duration::from_millis(50)).await;
        assert_eq!(lock.forced_releases(), 1);
    }
}
