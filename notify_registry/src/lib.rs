// TODO LATER: Implement `Drop` for `SubscriptionHandle` to enable automatic
// cancellation when the subscriber side goes away. This needs an opt in
// wrapper so the existing weak handle semantics stay untouched.
// TODO LATER: Add a `notify_all` that fans a value out to every key of a
// `MultiNotifier` in one pass.

//! # notify_registry
//!
//! A thread safe, cancelable notification registry: independent components
//! register interest in a keyed event stream, receive synchronous callbacks
//! when a matching value is published, and cancel their own registration
//! later, including from inside a callback invoked during the very dispatch
//! that is iterating over subscribers.
//!
//! Two subscription disciplines are provided:
//!
//! - [`SingleNotifier`]: at most one active subscriber per key. A second
//!   registration for an occupied key is rejected and returns an already
//!   expired handle, it never replaces the existing subscriber.
//! - [`MultiNotifier`]: an unbounded, insertion ordered list of subscribers
//!   per key, all invoked on a notification in registration order.
//!
//! Both registries guard their key map with a single lock and never hold it
//! while user callbacks run: the single slot registry copies the matching
//! entry out before calling it, the multi slot registry snapshots the whole
//! per key list. Canceling, re registering or even dropping handles from
//! inside a callback can therefore never deadlock or corrupt a dispatch in
//! progress.
//!
//! # Example
//!
//! ```rust
//! use notify_registry::MultiNotifier;
//!
//! let notifier: MultiNotifier<u32, String> = MultiNotifier::new();
//!
//! // Register two subscribers under the same key.
//! let handle = notifier.register(1, |value, _token| value.push('!'));
//! let _handle2 = notifier.register(1, |value, token| {
//!     // Callbacks see mutations of earlier callbacks in the same dispatch
//!     // and may cancel their own subscription through their token.
//!     assert!(value.ends_with('!'));
//!     token.cancel();
//! });
//!
//! let mut value = "hello".to_string();
//! notifier.notify(&1, &mut value);
//! assert_eq!("hello!", value);
//!
//! // The second subscriber canceled itself, the first one is still there.
//! assert_eq!(1, notifier.subscriber_count(&1));
//! handle.cancel();
//! assert_eq!(0, notifier.subscriber_count(&1));
//! ```

/// Cancellation machinery shared by both registries.
///
/// Defines the [`CancelToken`] a callback receives and the weak
/// [`SubscriptionHandle`] a registration returns. Handles never keep a
/// subscription alive, the registry map entry is the authoritative record.
pub mod token;

/// The single slot registry: at most one subscriber per key.
pub mod single;

/// The multi slot registry: insertion ordered fan out per key with snapshot
/// based dispatch.
pub mod multi;

pub use multi::MultiNotifier;
pub use single::SingleNotifier;
pub use token::{CancelToken, NotifyFn, SlotId, SubscriptionHandle};
