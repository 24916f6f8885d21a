//! # tracked_value
//!
//! A change notifying value wrapper.
//!
//! [`Tracked`] wraps a value and reports every mutation (plain `set` or a
//! compound assignment operator) to a changed subscriber, handing it the
//! operation, the new value and the old one. A changing subscriber can
//! inspect the pending operation first and veto it.
//!
//! # Example
//!
//! ```rust
//! use tracked_value::{ChangeOp, Tracked};
//!
//! let mut counter = Tracked::new(0u32);
//! counter.on_changed(|op, new, old| {
//!     assert_eq!(ChangeOp::Add, op);
//!     assert_eq!(Some(&0), old);
//!     assert_eq!(&5, new);
//! });
//! counter += 5;
//! assert_eq!(5, *counter);
//! ```

/// The wrapper and its callbacks.
pub mod tracked;

pub use tracked::{ChangeOp, ChangedFn, ChangingFn, Tracked};
