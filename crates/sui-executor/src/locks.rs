//! Per-object FIFO locks.
//!
//! The first caller to name an object holds it immediately. Later callers
//! queue behind it, and releasing an object hands it directly to the oldest
//! waiter. All ids of one [`ObjectLocks::acquire`] call are registered in a
//! single critical section, so a waiter only ever waits on earlier
//! registrants and there are no lock cycles.

use std::collections::{HashMap, VecDeque};

use parking_lot::Mutex;
use sui_types::ObjectID;
use tokio::sync::oneshot;
use tracing::trace;

#[derive(Debug, Default)]
pub struct ObjectLocks {
    /// Present while an object is held; the queue holds the waiters.
    queues: Mutex<HashMap<ObjectID, VecDeque<oneshot::Sender<()>>>>,
}

impl ObjectLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until every id in `ids` is held by the caller.
    ///
    /// `ids` must not contain duplicates. Dropping the returned future early
    /// gives up the objects already handed over and the places in line.
    pub async fn acquire(&self, ids: &[ObjectID]) -> ObjectLockGuard<'_> {
        let mut guard = ObjectLockGuard {
            locks: self,
            held: Vec::with_capacity(ids.len()),
            pending: VecDeque::new(),
        };
        {
            let mut queues = self.queues.lock();
            for id in ids {
                match queues.get_mut(id) {
                    Some(waiters) => {
                        let (tx, rx) = oneshot::channel();
                        waiters.push_back(tx);
                        guard.pending.push_back((*id, rx));
                    }
                    None => {
                        queues.insert(*id, VecDeque::new());
                        guard.held.push(*id);
                    }
                }
            }
        }

        while let Some((id, handoff)) = guard.pending.front_mut() {
            trace!(object_id = %id, "waiting for object lock");
            // A dropped sender means the queue was torn down; the id is free.
            let _ = handoff.await;
            if let Some((id, _)) = guard.pending.pop_front() {
                guard.held.push(id);
            }
        }
        guard
    }

    /// Hand `id` to the next live waiter, or free it.
    fn release(queues: &mut HashMap<ObjectID, VecDeque<oneshot::Sender<()>>>, id: &ObjectID) {
        let Some(waiters) = queues.get_mut(id) else {
            return;
        };
        while let Some(next) = waiters.pop_front() {
            // Waiters that gave up have dropped their receiver.
            if next.send(()).is_ok() {
                return;
            }
        }
        queues.remove(id);
    }

    /// Number of objects currently held.
    pub fn held(&self) -> usize {
        self.queues.lock().len()
    }

    /// Number of acquisitions queued behind `id`.
    pub fn waiters(&self, id: &ObjectID) -> usize {
        self.queues.lock().get(id).map_or(0, VecDeque::len)
    }
}

/// Releases its objects when dropped.
#[derive(Debug)]
pub struct ObjectLockGuard<'a> {
    locks: &'a ObjectLocks,
    held: Vec<ObjectID>,
    /// Places in line not yet handed over.
    pending: VecDeque<(ObjectID, oneshot::Receiver<()>)>,
}

impl ObjectLockGuard<'_> {
    pub fn objects(&self) -> &[ObjectID] {
        &self.held
    }
}

impl Drop for ObjectLockGuard<'_> {
    fn drop(&mut self) {
        // Senders only fire under this lock, so a handoff cannot slip in
        // between the check and dropping the receiver.
        let mut queues = self.locks.queues.lock();
        for (id, mut handoff) in self.pending.drain(..) {
            if handoff.try_recv().is_ok() {
                ObjectLocks::release(&mut queues, &id);
            }
        }
        for id in self.held.drain(..) {
            ObjectLocks::release(&mut queues, &id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;
    use sui_types::SuiAddress;

    fn id(n: u16) -> ObjectID {
        SuiAddress::from_u16(n)
    }

    #[tokio::test]
    async fn test_disjoint_sets_do_not_wait() {
        let locks = ObjectLocks::new();
        let a = locks.acquire(&[id(1), id(2)]).await;
        let b = locks.acquire(&[id(3)]).await;
        assert_eq!(locks.held(), 3);
        drop(a);
        drop(b);
        assert_eq!(locks.held(), 0);
    }

    #[tokio::test]
    async fn test_waiters_are_served_in_order() {
        let locks = Arc::new(ObjectLocks::new());
        let order = Arc::new(Mutex::new(Vec::new()));
        let first = locks.acquire(&[id(1)]).await;

        let mut tasks = Vec::new();
        for n in 0..3 {
            let task_locks = locks.clone();
            let order = order.clone();
            tasks.push(tokio::spawn(async move {
                let _guard = task_locks.acquire(&[id(1)]).await;
                order.lock().push(n);
                tokio::time::sleep(Duration::from_millis(2)).await;
            }));
            // register in a known order
            while locks.waiters(&id(1)) < n + 1 {
                tokio::task::yield_now().await;
            }
        }

        drop(first);
        for task in tasks {
            task.await.unwrap();
        }
        assert_eq!(*order.lock(), vec![0, 1, 2]);
        assert_eq!(locks.held(), 0);
    }

    #[tokio::test]
    async fn test_multi_object_waiter_needs_every_release() {
        let locks = Arc::new(ObjectLocks::new());
        let a = locks.acquire(&[id(1)]).await;
        let b = locks.acquire(&[id(2)]).await;

        let waiter = {
            let task_locks = locks.clone();
            tokio::spawn(async move {
                let guard = task_locks.acquire(&[id(1), id(2)]).await;
                guard.objects().len()
            })
        };
        while locks.waiters(&id(2)) == 0 {
            tokio::task::yield_now().await;
        }

        drop(a);
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert!(!waiter.is_finished());
        drop(b);
        assert_eq!(waiter.await.unwrap(), 2);
        assert_eq!(locks.held(), 0);
    }

    #[tokio::test]
    async fn test_abandoned_waiter_is_skipped() {
        let locks = ObjectLocks::new();
        let holder = locks.acquire(&[id(1)]).await;
        let abandoned = tokio::time::timeout(Duration::from_millis(5), locks.acquire(&[id(1)])).await;
        assert!(abandoned.is_err());

        drop(holder);
        assert_eq!(locks.held(), 0);
        let _again = locks.acquire(&[id(1)]).await;
    }
}
