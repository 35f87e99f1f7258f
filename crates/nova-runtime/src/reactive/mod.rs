#![forbid(unsafe_code)]

//! Reactive primitives used for change broadcast.
//!
//! The appearance controller publishes its mode and readiness through
//! [`Observable`] so any part of the UI can react without holding a
//! reference to the controller's internals.

pub mod observable;

pub use observable::{Observable, Subscription};
