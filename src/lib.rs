//! Deferred, at-most-once invocation for "maybe-callback" arguments.
//!
//! Host APIs often take a trailing optional callback: sometimes a bare
//! callable, sometimes buried among positional arguments in a captured
//! parameter list, sometimes absent entirely. This crate provides
//! [`Guarded<T>`], a wrapper that normalizes such an input once, at
//! construction, and exposes a single guarded `call` operation with two
//! guarantees:
//!
//! - **At-most-once**: the callable runs at most one time per invocation
//!   lineage, including across copies of the wrapper.
//! - **Always asynchronous**: relative to the turn that constructed the
//!   wrapper, the callable never runs reentrantly. An early `call` is
//!   queued for a later cycle; once a full cycle has elapsed, dispatch is
//!   inline with no extra hop.
//!
//! # Features
//!
//! - **Last function wins**: an indexed input is scanned backward for the
//!   intended callback, so extra trailing values after the callback are
//!   handled; every other element is retained in order and retrievable by
//!   index.
//! - **Copy without re-arming**: copying a wrapper duplicates its state
//!   verbatim; an already-called copy stays called.
//! - **Injected scheduling**: all deferral goes through the [`Scheduler`]
//!   trait, with a tokio-backed production implementation (feature
//!   `async-tokio`, default) and a deterministic [`ManualQueue`] for tests
//!   and runtime-less hosts.
//! - **No errors raised**: every non-error outcome is reported by return
//!   value; the wrapper itself never panics.
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use defer_once::{Arg, Guarded, Input, ManualQueue};
//!
//! let queue = Arc::new(ManualQueue::new());
//!
//! // The callback hides at the end of a captured parameter list.
//! let input = Input::Args(vec![
//!    Arg::Value("one"),
//!    Arg::func(|args: Vec<&'static str>| println!("called with {args:?}")),
//! ]);
//! let guarded = Guarded::with_scheduler(input, queue.clone());
//!
//! assert!(guarded.has_callback());
//! assert_eq!(guarded.argument_at(0), Some(&Arg::Value("one")));
//! assert_eq!(guarded.argument_at(1), None);
//!
//! // Calling in the same turn as construction defers the dispatch...
//! assert!(guarded.call(vec!["now"]));
//! // ...and a second call is a no-op that still reports success.
//! assert!(guarded.call(vec!["ignored"]));
//!
//! // The callback runs exactly once, when the queue is pumped.
//! queue.run_until_idle();
//! ```
//!
//! ## Inputs without a callable
//!
//! ```rust
//! use std::sync::Arc;
//! use defer_once::{Guarded, Input, ManualQueue};
//!
//! let queue = Arc::new(ManualQueue::new());
//! let guarded = Guarded::with_scheduler(Input::Value(42), queue.clone());
//!
//! assert!(!guarded.has_callback());
//! assert!(!guarded.call(Vec::new())); // nothing to call, ever
//! assert!(queue.is_empty()); // and nothing was armed
//! ```

/// Core wrapper implementation.
mod guarded;

/// Construction input shapes and normalization.
mod input;

/// Deferral capability and its implementations.
mod schedule;

pub use guarded::Guarded;
pub use input::{Arg, Callee, Input};
#[cfg(feature = "async-tokio")]
pub use schedule::TokioScheduler;
pub use schedule::{Job, ManualQueue, Scheduler};
