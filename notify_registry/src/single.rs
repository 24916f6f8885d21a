use crate::token::{
    registry_weak, CancelToken, NotifyFn, SlotId, SlotRegistry, SubscriptionHandle,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use tracing::trace;

struct SingleSlot<K, V> {
    callback: Arc<NotifyFn<K, V>>,
    slot: SlotId,
}

struct SingleState<K, V> {
    map: HashMap<K, SingleSlot<K, V>>,
    next_slot: SlotId,
}

struct SingleInner<K, V> {
    state: Mutex<SingleState<K, V>>,
}

impl<K, V> SlotRegistry<K> for SingleInner<K, V>
where
    K: Eq + Hash + Send,
{
    fn cancel_slot(&self, key: &K, slot: SlotId) {
        let mut state = self.state.lock();
        // Only remove when the entry is this exact generation. A younger
        // registration under the same key must survive a stale cancel.
        if state.map.get(key).map(|entry| entry.slot) == Some(slot) {
            state.map.remove(key);
            trace!(slot, "single slot subscription canceled");
        }
    }

    fn slot_live(&self, key: &K, slot: SlotId) -> bool {
        self.state
            .lock()
            .map
            .get(key)
            .map(|entry| entry.slot == slot)
            .unwrap_or(false)
    }
}

/// A registry with at most one active subscriber per key.
///
/// Registering on an occupied key is deliberately rejected instead of
/// silently replacing the previous subscriber: the caller gets back an
/// already expired handle and must check it. Per key the life cycle is
/// unregistered, registered, and back to unregistered through a cancel.
///
/// Cloning the registry is cheap and every clone drives the same state, so a
/// callback can capture a clone and register or cancel from inside a
/// dispatch. The internal lock is never held while a callback runs.
pub struct SingleNotifier<K, V> {
    inner: Arc<SingleInner<K, V>>,
}

impl<K, V> Clone for SingleNotifier<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, V> Default for SingleNotifier<K, V>
where
    K: Eq + Hash + Clone + Send + 'static,
    V: 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> SingleNotifier<K, V>
where
    K: Eq + Hash + Clone + Send + 'static,
    V: 'static,
{
    /// Returns an empty registry.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(SingleInner {
                state: Mutex::new(SingleState {
                    map: HashMap::new(),
                    next_slot: 0,
                }),
            }),
        }
    }

    /// Registers `callback` under `key` and returns a weak handle to the
    /// subscription.
    ///
    /// If the key is already occupied the registration is a no-op and the
    /// returned handle is expired from birth; `lock` on it yields `None`.
    pub fn register<F>(&self, key: K, callback: F) -> SubscriptionHandle<K>
    where
        F: Fn(&mut V, &CancelToken<K>) + Send + Sync + 'static,
    {
        let mut state = self.inner.state.lock();
        if state.map.contains_key(&key) {
            trace!("registration rejected, key already occupied");
            return SubscriptionHandle::expired();
        }
        let slot = state.next_slot;
        state.next_slot += 1;
        state.map.insert(
            key.clone(),
            SingleSlot {
                callback: Arc::new(callback),
                slot,
            },
        );
        drop(state);
        SubscriptionHandle::new(CancelToken {
            registry: registry_weak(&self.inner),
            key,
            slot,
        })
    }

    /// Invokes the subscriber registered under `key`, if any, with the value
    /// by mutable reference and the subscriber's own token.
    ///
    /// The callback and token are copied out under the lock and the lock is
    /// released before the call, so the callback may cancel its own or any
    /// other subscription without deadlocking.
    pub fn notify(&self, key: &K, value: &mut V) {
        let hit = {
            let state = self.inner.state.lock();
            state
                .map
                .get(key)
                .map(|entry| (Arc::clone(&entry.callback), entry.slot))
        };
        if let Some((callback, slot)) = hit {
            let token = CancelToken {
                registry: registry_weak(&self.inner),
                key: key.clone(),
                slot,
            };
            callback(value, &token);
        }
    }

    /// Returns `true` while `key` has an active subscriber.
    pub fn is_registered(&self, key: &K) -> bool {
        self.inner.state.lock().map.contains_key(key)
    }

    /// The number of keys with an active subscriber.
    pub fn len(&self) -> usize {
        self.inner.state.lock().map.len()
    }

    /// Returns `true` when no key has a subscriber.
    pub fn is_empty(&self) -> bool {
        self.inner.state.lock().map.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

    #[test]
    fn test_register_returns_a_live_handle() {
        let notifier: SingleNotifier<u32, String> = SingleNotifier::new();
        let handle = notifier.register(1, |_val, _token| {});
        assert!(handle.lock().is_some());
        assert!(!handle.is_expired());
    }

    #[test]
    fn test_notify_invokes_the_registered_callback() {
        let notifier: SingleNotifier<u32, String> = SingleNotifier::new();
        let fired = Arc::new(AtomicBool::new(false));
        let fired_in_cb = Arc::clone(&fired);
        let _handle = notifier.register(1, move |_val, _token| {
            fired_in_cb.store(true, Ordering::SeqCst);
        });
        assert!(!fired.load(Ordering::SeqCst));
        let mut value = "Random Test String".to_string();
        notifier.notify(&1, &mut value);
        assert!(fired.load(Ordering::SeqCst));
    }

    #[test]
    fn test_notify_submits_the_value_to_the_callback() {
        let notifier: SingleNotifier<u32, String> = SingleNotifier::new();
        let matched = Arc::new(AtomicBool::new(false));
        let matched_in_cb = Arc::clone(&matched);
        let _handle = notifier.register(1, move |val, _token| {
            matched_in_cb.store(val == "testString", Ordering::SeqCst);
        });
        let mut value = "testString".to_string();
        notifier.notify(&1, &mut value);
        assert!(matched.load(Ordering::SeqCst));
        let mut other = "AnotherString".to_string();
        notifier.notify(&1, &mut other);
        assert!(!matched.load(Ordering::SeqCst));
    }

    #[test]
    fn test_cancel_stops_delivery() {
        let notifier: SingleNotifier<u32, String> = SingleNotifier::new();
        let fired = Arc::new(AtomicBool::new(false));
        let fired_in_cb = Arc::clone(&fired);
        let handle = notifier.register(1, move |_val, _token| {
            fired_in_cb.store(true, Ordering::SeqCst);
        });
        handle.lock().unwrap().cancel();
        let mut value = "SomeString".to_string();
        notifier.notify(&1, &mut value);
        assert!(!fired.load(Ordering::SeqCst));
        assert!(handle.lock().is_none());
    }

    #[test]
    fn test_occupied_key_rejects_the_second_registration() {
        let notifier: SingleNotifier<u32, u8> = SingleNotifier::new();
        let token = notifier.register(1, |val, _token| *val = 2);
        let token2 = notifier.register(1, |val, _token| *val = 3);
        assert!(token2.lock().is_none());

        token.lock().unwrap().cancel();
        let token2 = notifier.register(1, |val, _token| *val = 4);
        assert!(token2.lock().is_some());

        let mut value = 0u8;
        notifier.notify(&1, &mut value);
        assert_eq!(4, value);
    }

    #[test]
    fn test_does_not_notify_callbacks_of_other_keys() {
        let notifier: SingleNotifier<u32, u8> = SingleNotifier::new();
        let fired1 = Arc::new(AtomicBool::new(false));
        let fired2 = Arc::new(AtomicBool::new(false));
        let fired1_in_cb = Arc::clone(&fired1);
        let fired2_in_cb = Arc::clone(&fired2);
        let _token = notifier.register(1, move |_val, _token| {
            fired1_in_cb.store(true, Ordering::SeqCst);
        });
        let _token2 = notifier.register(2, move |_val, _token| {
            fired2_in_cb.store(true, Ordering::SeqCst);
        });

        let mut value = 42u8;
        notifier.notify(&1, &mut value);
        assert!(fired1.load(Ordering::SeqCst));
        assert!(!fired2.load(Ordering::SeqCst));
        fired1.store(false, Ordering::SeqCst);
        notifier.notify(&2, &mut value);
        assert!(fired2.load(Ordering::SeqCst));
        assert!(!fired1.load(Ordering::SeqCst));
    }

    #[test]
    fn test_cancelable_from_within_the_callback() {
        let notifier: SingleNotifier<u32, u8> = SingleNotifier::new();
        let _token = notifier.register(1, |val, token| {
            token.cancel();
            *val += 1;
        });
        let _token3 = notifier.register(2, |val, _token| {
            *val += 1;
        });

        let mut value = 42u8;
        notifier.notify(&1, &mut value);
        assert_eq!(43, value);
        notifier.notify(&1, &mut value);
        assert_eq!(43, value);
        notifier.notify(&2, &mut value);
        assert_eq!(44, value);
    }

    #[test]
    fn test_notify_cancel_and_reregister_scenario() {
        let notifier: SingleNotifier<u32, String> = SingleNotifier::new();
        let seen_a = Arc::new(Mutex::new(Vec::new()));
        let seen_a_in_cb = Arc::clone(&seen_a);
        let handle_a = notifier.register(1, move |val, _token| {
            seen_a_in_cb.lock().push(val.clone());
        });

        let mut value = "hello".to_string();
        notifier.notify(&1, &mut value);
        assert_eq!(vec!["hello".to_string()], *seen_a.lock());

        handle_a.cancel();
        let mut value = "world".to_string();
        notifier.notify(&1, &mut value);
        assert_eq!(vec!["hello".to_string()], *seen_a.lock());

        let seen_b = Arc::new(Mutex::new(Vec::new()));
        let seen_b_in_cb = Arc::clone(&seen_b);
        let _handle_b = notifier.register(1, move |val, _token| {
            seen_b_in_cb.lock().push(val.clone());
        });
        let mut value = "again".to_string();
        notifier.notify(&1, &mut value);
        assert_eq!(vec!["again".to_string()], *seen_b.lock());
        assert_eq!(vec!["hello".to_string()], *seen_a.lock());
    }

    #[test]
    fn test_stale_cancel_does_not_remove_a_younger_registration() {
        let notifier: SingleNotifier<u32, u8> = SingleNotifier::new();
        let old_handle = notifier.register(1, |_val, _token| {});
        let old_token = old_handle.lock().unwrap();
        old_token.cancel();
        let _new_handle = notifier.register(1, |val, _token| *val = 7);
        // The stale token targets a dead generation.
        old_token.cancel();
        assert!(notifier.is_registered(&1));
        let mut value = 0u8;
        notifier.notify(&1, &mut value);
        assert_eq!(7, value);
    }

    #[test]
    fn test_dropping_the_registry_expires_all_handles() {
        let notifier: SingleNotifier<u32, u8> = SingleNotifier::new();
        let handle = notifier.register(1, |_val, _token| {});
        let token = handle.lock().unwrap();
        drop(notifier);
        assert!(handle.lock().is_none());
        assert!(!token.is_live());
        token.cancel();
    }

    #[test]
    fn test_concurrent_register_notify_cancel() {
        let notifier: SingleNotifier<u32, u8> = SingleNotifier::new();
        let iterations = 2_000u32;
        let delivered = Arc::new(AtomicU32::new(0));

        let mut workers = Vec::new();
        for id in 0u32..2 {
            let notifier = notifier.clone();
            let delivered = Arc::clone(&delivered);
            workers.push(std::thread::spawn(move || {
                let other = 1 - id;
                for _ in 0..iterations {
                    let delivered = Arc::clone(&delivered);
                    let handle = notifier.register(id, move |_val, _token| {
                        delivered.fetch_add(1, Ordering::SeqCst);
                    });
                    let mut value = 0u8;
                    notifier.notify(&other, &mut value);
                    handle.cancel();
                }
            }));
        }
        for worker in workers {
            worker.join().unwrap();
        }
        assert!(notifier.is_empty());
        // Each notify targets the other thread's transient registration, so
        // it may or may not land, but never more than once per iteration.
        assert!(delivered.load(Ordering::SeqCst) <= 2 * iterations);
    }
}
