#![forbid(unsafe_code)]

//! Shared value with change notification.
//!
//! # Design
//!
//! [`Observable<T>`] keeps a value in `Rc<RefCell<..>>` shared by every
//! clone. When [`set`](Observable::set) stores a value that differs (by
//! `PartialEq`) from the current one, the version is bumped and every live
//! subscriber runs, in registration order, with the new value.
//!
//! No borrow is held while callbacks run, so a callback may read the
//! observable or set it again. A nested `set` notifies every subscriber
//! immediately, and the outer notification stops there, so no subscriber
//! sees a superseded value last.
//!
//! # Lifetimes
//!
//! Subscribers are stored as `Weak` callbacks. The [`Subscription`] guard
//! owns the strong side; dropping it makes the callback unreachable. Dead
//! entries are pruned on the next notification.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use tracing::debug_span;
use web_time::Instant;

type CallbackRc<T> = Rc<dyn Fn(&T)>;
type CallbackWeak<T> = Weak<dyn Fn(&T)>;

struct ObservableInner<T> {
    value: T,
    version: u64,
    subscribers: Vec<CallbackWeak<T>>,
}

/// A shared, version-tracked value with change notification.
///
/// Cloning an `Observable` yields another handle to the same value and the
/// same subscriber list.
pub struct Observable<T> {
    inner: Rc<RefCell<ObservableInner<T>>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Observable")
            .field("value", &inner.value)
            .field("version", &inner.version)
            .field("subscriber_count", &inner.subscribers.len())
            .finish()
    }
}

impl<T: Clone + PartialEq + 'static> Observable<T> {
    /// Create an observable at version 0 with no subscribers.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ObservableInner {
                value,
                version: 0,
                subscribers: Vec::new(),
            })),
        }
    }

    #[must_use]
    pub fn get(&self) -> T {
        self.inner.borrow().value.clone()
    }

    /// Store `value`. Returns `true` if it differed from the current value
    /// (and subscribers were notified).
    pub fn set(&self, value: T) -> bool {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.value == value {
                return false;
            }
            inner.value = value;
            inner.version += 1;
        }
        self.notify();
        true
    }

    /// Register `callback`; it runs with the new value after every change.
    ///
    /// The callback stays registered for as long as the returned guard lives.
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        let strong: CallbackRc<T> = Rc::new(callback);
        self.inner
            .borrow_mut()
            .subscribers
            .push(Rc::downgrade(&strong));
        Subscription {
            _guard: Box::new(strong),
        }
    }

    /// Increments by exactly 1 per value-changing `set`.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    /// Registered subscribers, including dropped ones not yet pruned.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscribers.len()
    }

    fn notify(&self) {
        let (callbacks, value, version) = {
            let mut inner = self.inner.borrow_mut();
            inner.subscribers.retain(|w| w.strong_count() > 0);
            let callbacks: Vec<CallbackRc<T>> = inner
                .subscribers
                .iter()
                .filter_map(Weak::upgrade)
                .collect();
            (callbacks, inner.value.clone(), inner.version)
        };

        if callbacks.is_empty() {
            return;
        }

        let start = Instant::now();
        let span = debug_span!(
            "nova.broadcast",
            subscribers = callbacks.len() as u64,
            duration_us = tracing::field::Empty
        );
        let _entered = span.enter();
        for cb in &callbacks {
            // A nested set has already broadcast a newer value to everyone.
            if self.inner.borrow().version != version {
                break;
            }
            cb(&value);
        }
        span.record("duration_us", start.elapsed().as_micros() as u64);
    }
}

/// RAII guard for a subscriber callback.
///
/// Dropping the guard unsubscribes. [`Subscription::empty`] builds a guard
/// that holds nothing, for registrations that completed immediately.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    _guard: Box<dyn std::any::Any>,
}

impl Subscription {
    pub fn empty() -> Self {
        Self {
            _guard: Box::new(()),
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}
