use std::fmt;
use std::ops::Deref;

/// The mutation a change callback is reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOp {
    Set,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
}

/// Callback invoked after a mutation went through: `(op, new value, old
/// value)`.
pub type ChangedFn<T> = Box<dyn FnMut(ChangeOp, &T, Option<&T>) + Send>;

/// Callback consulted before a mutation: `(op, operand, current value)`.
/// Returning `false` vetoes the mutation.
pub type ChangingFn<T> = Box<dyn FnMut(ChangeOp, &T, &T) -> bool + Send>;

/// A value wrapper that reports mutations to a subscriber.
///
/// Reads go through `Deref` or [`Tracked::get`]. Writes go through
/// [`Tracked::set`] or the compound assignment operators (`+=`, `-=`, and
/// so on), each of which reports its [`ChangeOp`] together with the old
/// value. A changing subscriber can veto the mutation before it happens.
///
/// At most one changed and one changing subscriber are held at a time;
/// subscribing again replaces the previous callback.
pub struct Tracked<T> {
    value: T,
    on_changed: Option<ChangedFn<T>>,
    on_changing: Option<ChangingFn<T>>,
}

impl<T: Default> Default for Tracked<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> Tracked<T> {
    /// Wraps `value` with no subscribers.
    pub fn new(value: T) -> Self {
        Self {
            value,
            on_changed: None,
            on_changing: None,
        }
    }

    /// A reference to the current value.
    pub fn get(&self) -> &T {
        &self.value
    }

    /// Consumes the wrapper and returns the value.
    pub fn into_inner(self) -> T {
        self.value
    }

    /// Subscribes `callback` to completed mutations, replacing any previous
    /// changed subscriber.
    pub fn on_changed<F>(&mut self, callback: F)
    where
        F: FnMut(ChangeOp, &T, Option<&T>) + Send + 'static,
    {
        self.on_changed = Some(Box::new(callback));
    }

    /// Subscribes `callback` as the veto hook consulted before mutations,
    /// replacing any previous changing subscriber.
    pub fn on_changing<F>(&mut self, callback: F)
    where
        F: FnMut(ChangeOp, &T, &T) -> bool + Send + 'static,
    {
        self.on_changing = Some(Box::new(callback));
    }
}

impl<T: Clone> Tracked<T> {
    /// Replaces the value, reporting [`ChangeOp::Set`]. A changing
    /// subscriber returning `false` leaves the value untouched.
    pub fn set(&mut self, value: T) {
        self.apply(ChangeOp::Set, &value.clone(), |current| *current = value);
    }

    /// Runs one mutation through the changing and changed subscribers.
    /// `operand` is what the changing subscriber gets to inspect.
    fn apply(&mut self, op: ChangeOp, operand: &T, mutate: impl FnOnce(&mut T)) {
        if let Some(changing) = self.on_changing.as_mut() {
            if !changing(op, operand, &self.value) {
                return;
            }
        }
        let old = self.value.clone();
        mutate(&mut self.value);
        if let Some(changed) = self.on_changed.as_mut() {
            changed(op, &self.value, Some(&old));
        }
    }
}

impl<T> Deref for Tracked<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.value
    }
}

impl<T: fmt::Debug> fmt::Debug for Tracked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Tracked").field(&self.value).finish()
    }
}

macro_rules! tracked_op_assign {
    ($op_trait:ident, $op_method:ident, $op:expr) => {
        impl<T> std::ops::$op_trait<T> for Tracked<T>
        where
            T: std::ops::$op_trait<T> + Clone,
        {
            fn $op_method(&mut self, rhs: T) {
                self.apply($op, &rhs.clone(), |current| current.$op_method(rhs));
            }
        }
    };
}

tracked_op_assign!(AddAssign, add_assign, ChangeOp::Add);
tracked_op_assign!(SubAssign, sub_assign, ChangeOp::Sub);
tracked_op_assign!(MulAssign, mul_assign, ChangeOp::Mul);
tracked_op_assign!(DivAssign, div_assign, ChangeOp::Div);
tracked_op_assign!(RemAssign, rem_assign, ChangeOp::Rem);
tracked_op_assign!(BitAndAssign, bitand_assign, ChangeOp::BitAnd);
tracked_op_assign!(BitOrAssign, bitor_assign, ChangeOp::BitOr);
tracked_op_assign!(BitXorAssign, bitxor_assign, ChangeOp::BitXor);
tracked_op_assign!(ShlAssign, shl_assign, ChangeOp::Shl);
tracked_op_assign!(ShrAssign, shr_assign, ChangeOp::Shr);
