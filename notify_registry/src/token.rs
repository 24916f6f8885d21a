use std::sync::{Arc, Weak};
use tracing::trace;

/// The callback type both registries invoke on a notification. The value is
/// passed by mutable reference so a callback can rewrite it in place, and
/// the token is the callback's own subscription so it can cancel itself.
pub type NotifyFn<K, V> = dyn Fn(&mut V, &CancelToken<K>) + Send + Sync;

/// Identifier stamped on every subscription of a registry. Slot ids are
/// allocated from a per registry counter and are never reused, so a stale
/// token can never resolve to a younger subscription under the same key.
pub type SlotId = u64;

/// The resolution interface a registry exposes to its tokens. This is the
/// crate private replacement for a downcast: a token carries its concrete key
/// and slot id, and the registry answers for exactly that pair. A pair the
/// registry does not know about is a no-op, never an error.
pub(crate) trait SlotRegistry<K>: Send + Sync {
    /// Removes the subscription `(key, slot)` if it is still the live one.
    fn cancel_slot(&self, key: &K, slot: SlotId);
    /// Returns `true` while the subscription `(key, slot)` is still registered.
    fn slot_live(&self, key: &K, slot: SlotId) -> bool;
}

/// A resolvable handle to one subscription. Every callback receives a
/// reference to its own token so it can cancel itself mid dispatch.
///
/// The token does not keep the subscription alive: the registry map entry is
/// the authoritative record, and the token only holds a weak reference to the
/// registry plus the `(key, slot)` identity needed to find the entry again.
/// Once the entry is removed, or the registry itself is dropped, every
/// operation on the token becomes a silent no-op.
pub struct CancelToken<K> {
    pub(crate) registry: Weak<dyn SlotRegistry<K>>,
    pub(crate) key: K,
    pub(crate) slot: SlotId,
}

impl<K: Clone> Clone for CancelToken<K> {
    fn clone(&self) -> Self {
        Self {
            registry: Weak::clone(&self.registry),
            key: self.key.clone(),
            slot: self.slot,
        }
    }
}

impl<K> CancelToken<K> {
    /// Asks the owning registry to remove the associated subscription.
    /// Idempotent: canceling an already canceled token, or a token whose
    /// registry has been dropped, does nothing.
    pub fn cancel(&self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.cancel_slot(&self.key, self.slot);
        } else {
            trace!(slot = self.slot, "cancel on a token of a dropped registry");
        }
    }

    /// Returns `true` while the associated subscription is still registered.
    pub fn is_live(&self) -> bool {
        match self.registry.upgrade() {
            Some(registry) => registry.slot_live(&self.key, self.slot),
            None => false,
        }
    }

    /// The key this token was registered under.
    pub fn key(&self) -> &K {
        &self.key
    }
}

/// The weak handle returned by `register`. The caller never owns the
/// subscription through this handle: `lock` yields a usable [`CancelToken`]
/// only while the subscription is still registered, and yields `None` once it
/// was canceled, rejected at registration time, or the registry was dropped.
pub struct SubscriptionHandle<K> {
    token: Option<CancelToken<K>>,
}

impl<K> SubscriptionHandle<K> {
    pub(crate) fn new(token: CancelToken<K>) -> Self {
        Self { token: Some(token) }
    }

    /// A handle that was never backed by a subscription. This is what a
    /// rejected single slot registration returns: callers observe the
    /// rejection by `lock` resolving to nothing.
    pub fn expired() -> Self {
        Self { token: None }
    }

    /// Resolves the handle to a usable token, or `None` if the subscription
    /// is gone.
    pub fn lock(&self) -> Option<CancelToken<K>>
    where
        K: Clone,
    {
        self.token.as_ref().filter(|t| t.is_live()).cloned()
    }

    /// Returns `true` once the handle no longer resolves to a live
    /// subscription.
    pub fn is_expired(&self) -> bool {
        !self.token.as_ref().map(CancelToken::is_live).unwrap_or(false)
    }

    /// Cancels the subscription if it is still live. Shorthand for
    /// `lock` followed by `cancel`, and just as safe to call twice.
    pub fn cancel(&self) {
        if let Some(token) = &self.token {
            token.cancel();
        }
    }
}

impl<K> Default for SubscriptionHandle<K> {
    fn default() -> Self {
        Self::expired()
    }
}

/// Builds the weak registry reference stored inside tokens. The coerced
/// strong reference only lives for the duration of the call.
pub(crate) fn registry_weak<K, R>(inner: &Arc<R>) -> Weak<dyn SlotRegistry<K>>
where
    R: SlotRegistry<K> + 'static,
    K: 'static,
{
    let cloned = Arc::clone(inner);
    let shared: Arc<dyn SlotRegistry<K>> = cloned;
    Arc::downgrade(&shared)
}
