//! Request Coalescing Module
//!
//! Collapses concurrent loads of the same key into one execution.
//!
//! # Flow
//! - First caller for a key registers a call and runs the load
//! - Later callers for the same key wait on that call and share its result
//! - The call is removed as soon as the load returns; the next caller starts
//!   a fresh load

mod call;

pub use call::Flight;
