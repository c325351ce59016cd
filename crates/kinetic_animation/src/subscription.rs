//! Subscription handles
//!
//! Every registration returns a [`Subscription`]. Cancelling it flips a shared
//! flag; the component holding the registration keeps a [`Liveness`] view of
//! the same flag and checks it before each write, then drops the registration
//! at the start of the next frame. Only the first cancel has an effect.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

/// Lifecycle handle for one registration
#[derive(Clone)]
pub struct Subscription {
    cancelled: Rc<Cell<bool>>,
}

impl Subscription {
    /// A live subscription
    pub fn new() -> Self {
        Self {
            cancelled: Rc::new(Cell::new(false)),
        }
    }

    /// A subscription for a registration that was skipped (already inactive)
    pub fn inert() -> Self {
        Self {
            cancelled: Rc::new(Cell::new(true)),
        }
    }

    /// Cancel the registration
    ///
    /// Returns `true` only for the call that actually cancelled it.
    pub fn cancel(&self) -> bool {
        !self.cancelled.replace(true)
    }

    pub fn is_active(&self) -> bool {
        !self.cancelled.get()
    }

    /// Read-only view handed to the component that owns the registration
    pub fn liveness(&self) -> Liveness {
        Liveness {
            cancelled: self.cancelled.clone(),
        }
    }
}

impl Default for Subscription {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}

/// Shared view of a subscription's cancelled flag
#[derive(Clone)]
pub struct Liveness {
    cancelled: Rc<Cell<bool>>,
}

impl Liveness {
    pub fn is_live(&self) -> bool {
        !self.cancelled.get()
    }
}

impl fmt::Debug for Liveness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Liveness")
            .field("live", &self.is_live())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_is_effective_once() {
        let sub = Subscription::new();
        let live = sub.liveness();
        assert!(live.is_live());

        assert!(sub.cancel());
        assert!(!sub.cancel());
        assert!(!live.is_live());
        assert!(!sub.is_active());
    }

    #[test]
    fn test_clones_share_state() {
        let sub = Subscription::new();
        let other = sub.clone();
        assert!(other.cancel());
        assert!(!sub.is_active());
        assert!(!sub.cancel());
    }

    #[test]
    fn test_inert_is_never_active() {
        let sub = Subscription::inert();
        assert!(!sub.is_active());
        assert!(!sub.cancel());
    }
}
