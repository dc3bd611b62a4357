use std::{
    collections::VecDeque,
    fmt,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use log::trace;
use parking_lot::Mutex;

use crate::{
    entry::{create_entry, delete_entry, entry_to_value, Entry},
    error::MarshalResult,
    runtime::Context,
    value::Value,
};

static NEXT_QUEUE_ID: AtomicU64 = AtomicU64::new(1);

struct QueueInner {
    id: u64,
    items: Mutex<VecDeque<Box<Entry>>>,
}

/// Handle to a queue structure shared by every context holding it.
///
/// Cloning shares the same underlying queue; the structure is freed when
/// the last handle in any thread goes away. Entries sitting in the queue
/// are handles too: pushing a queue into itself keeps it alive until that
/// entry is popped.
#[derive(Clone)]
pub struct MessageQueue {
    inner: Arc<QueueInner>,
}

impl fmt::Debug for MessageQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageQueue")
            .field("id", &self.inner.id)
            .field("len", &self.len())
            .finish()
    }
}

impl Default for MessageQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageQueue {
    pub fn new() -> Self {
        let id = NEXT_QUEUE_ID.fetch_add(1, Ordering::Relaxed);
        MessageQueue {
            inner: Arc::new(QueueInner {
                id,
                items: Mutex::new(VecDeque::new()),
            }),
        }
    }

    pub fn id(&self) -> u64 {
        self.inner.id
    }

    pub fn push_entry(&self, entry: Box<Entry>) {
        self.inner.items.lock().push_back(entry);
    }

    pub fn pop_entry(&self) -> Option<Box<Entry>> {
        self.inner.items.lock().pop_front()
    }

    /// Converts `value` in the producer's context and enqueues it.
    pub fn push(&self, ctx: &mut Context, value: &Value) {
        let entry = create_entry(ctx, value);
        trace!("queue {}: push {:?} from context {}", self.inner.id, entry.kind(), ctx.id());
        self.push_entry(entry);
    }

    /// Dequeues and materializes the oldest item in the consumer's context.
    /// The entry is deleted whether or not materialization succeeds.
    pub fn pop(&self, ctx: &mut Context) -> MarshalResult<Option<Value>> {
        let Some(entry) = self.pop_entry() else {
            return Ok(None);
        };
        trace!("queue {}: pop {:?} into context {}", self.inner.id, entry.kind(), ctx.id());
        let result = entry_to_value(ctx, &entry);
        delete_entry(entry);
        result.map(Some)
    }

    pub fn len(&self) -> usize {
        self.inner.items.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.items.lock().is_empty()
    }

    pub fn same_queue(&self, other: &MessageQueue) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Number of live handles (objects and entries) sharing this queue.
    pub fn handle_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_order() {
        let mut ctx = Context::new();
        let queue = MessageQueue::new();
        queue.push(&mut ctx, &Value::Int(1));
        queue.push(&mut ctx, &Value::string("two"));
        assert_eq!(queue.len(), 2);

        assert_eq!(queue.pop(&mut ctx).unwrap(), Some(Value::Int(1)));
        assert_eq!(queue.pop(&mut ctx).unwrap(), Some(Value::string("two")));
        assert_eq!(queue.pop(&mut ctx).unwrap(), None);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_clones_share_storage() {
        let mut ctx = Context::new();
        let queue = MessageQueue::new();
        let other = queue.clone();
        assert!(queue.same_queue(&other));
        assert_eq!(queue.handle_count(), 2);

        other.push(&mut ctx, &Value::Bool(true));
        assert_eq!(queue.pop(&mut ctx).unwrap(), Some(Value::Bool(true)));
        assert_eq!(queue.id(), other.id());
        let fresh = MessageQueue::new();
        assert!(!queue.same_queue(&fresh));
        assert_ne!(queue.id(), fresh.id());
    }

    #[test]
    fn test_self_push_holds_queue_until_popped() {
        let mut ctx = Context::new();
        let holder = ctx.new_message_queue().unwrap();
        let queue = holder.as_object().unwrap().message_queue().unwrap();
        queue.push(&mut ctx, &holder);
        drop(holder);
        assert_eq!(queue.handle_count(), 2);

        let popped = queue.pop(&mut ctx).unwrap().unwrap();
        assert!(popped.as_object().unwrap().message_queue().unwrap().same_queue(&queue));
        drop(popped);
        assert_eq!(queue.handle_count(), 1);
    }
}
