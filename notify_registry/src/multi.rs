use crate::token::{
    registry_weak, CancelToken, NotifyFn, SlotId, SlotRegistry, SubscriptionHandle,
};
use indexmap::IndexMap;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use tracing::trace;

// The per key collection is an insertion ordered indirection table keyed by
// slot id. Appending never moves existing entries and removal resolves the
// slot id directly, which is what the stored position of a token needs.
type SlotList<K, V> = IndexMap<SlotId, Arc<NotifyFn<K, V>>>;

struct MultiState<K, V> {
    map: HashMap<K, SlotList<K, V>>,
    next_slot: SlotId,
}

struct MultiInner<K, V> {
    state: Mutex<MultiState<K, V>>,
}

impl<K, V> SlotRegistry<K> for MultiInner<K, V>
where
    K: Eq + Hash + Send,
{
    fn cancel_slot(&self, key: &K, slot: SlotId) {
        let mut state = self.state.lock();
        if let Some(list) = state.map.get_mut(key) {
            if list.shift_remove(&slot).is_some() {
                trace!(slot, "multi slot subscription canceled");
                // Key presence means at least one live subscriber.
                if list.is_empty() {
                    state.map.remove(key);
                }
            }
        }
    }

    fn slot_live(&self, key: &K, slot: SlotId) -> bool {
        self.state
            .lock()
            .map
            .get(key)
            .map(|list| list.contains_key(&slot))
            .unwrap_or(false)
    }
}

/// A registry with an unbounded, insertion ordered list of subscribers per
/// key. A notification fans out to every subscriber of the key, in the order
/// they registered.
///
/// `notify` takes a snapshot of the key's subscriber list under the lock and
/// iterates the snapshot with the lock released. That makes the dispatch
/// immune to anything a callback does to the registry, including canceling
/// itself, and defines the two accepted races: a subscriber added during a
/// dispatch does not receive that dispatch, and a subscriber canceled during
/// a dispatch may still receive it once (its callback was already copied
/// out).
///
/// Clones share the same state, so callbacks may capture a clone and
/// register or cancel from inside a dispatch.
pub struct MultiNotifier<K, V> {
    inner: Arc<MultiInner<K, V>>,
}

impl<K, V> Clone for MultiNotifier<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, V> Default for MultiNotifier<K, V>
where
    K: Eq + Hash + Clone + Send + 'static,
    V: 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> MultiNotifier<K, V>
where
    K: Eq + Hash + Clone + Send + 'static,
    V: 'static,
{
    /// Returns an empty registry.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MultiInner {
                state: Mutex::new(MultiState {
                    map: HashMap::new(),
                    next_slot: 0,
                }),
            }),
        }
    }

    /// Appends `callback` to the subscribers of `key` and returns a weak
    /// handle to the new subscription. Registration always succeeds.
    pub fn register<F>(&self, key: K, callback: F) -> SubscriptionHandle<K>
    where
        F: Fn(&mut V, &CancelToken<K>) + Send + Sync + 'static,
    {
        let mut state = self.inner.state.lock();
        let slot = state.next_slot;
        state.next_slot += 1;
        state
            .map
            .entry(key.clone())
            .or_default()
            .insert(slot, Arc::new(callback));
        drop(state);
        SubscriptionHandle::new(CancelToken {
            registry: registry_weak(&self.inner),
            key,
            slot,
        })
    }

    /// Invokes every subscriber of `key` with the value by mutable reference,
    /// in registration order. Later callbacks observe the mutations earlier
    /// callbacks made to the value in this same dispatch.
    ///
    /// The subscriber list is snapshotted under the lock and the lock is
    /// released before any callback runs.
    pub fn notify(&self, key: &K, value: &mut V) {
        let snapshot: Vec<(SlotId, Arc<NotifyFn<K, V>>)> = {
            let state = self.inner.state.lock();
            state
                .map
                .get(key)
                .map(|list| {
                    list.iter()
                        .map(|(slot, callback)| (*slot, Arc::clone(callback)))
                        .collect()
                })
                .unwrap_or_default()
        };
        for (slot, callback) in snapshot {
            let token = CancelToken {
                registry: registry_weak(&self.inner),
                key: key.clone(),
                slot,
            };
            callback(value, &token);
        }
    }

    /// The number of active subscribers for `key`.
    pub fn subscriber_count(&self, key: &K) -> usize {
        self.inner
            .state
            .lock()
            .map
            .get(key)
            .map(SlotList::len)
            .unwrap_or(0)
    }

    /// Returns `true` while `key` has at least one active subscriber.
    pub fn has_subscribers(&self, key: &K) -> bool {
        self.inner.state.lock().map.contains_key(key)
    }

    /// The number of keys with at least one active subscriber.
    pub fn len(&self) -> usize {
        self.inner.state.lock().map.len()
    }

    /// Returns `true` when no key has a subscriber.
    pub fn is_empty(&self) -> bool {
        self.inner.state.lock().map.is_empty()
    }
}
