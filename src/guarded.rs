//! The guarded callback wrapper.
//!
//! This module provides [`Guarded<T>`], a wrapper around a maybe-callback
//! input that dispatches the wrapped callable at most once and always
//! asynchronously with respect to the turn that constructed the wrapper.
//!
//! The wrapper tracks two flags: `ticked`, set by a one-shot job queued at
//! construction once a full scheduling cycle has elapsed, and `called`, set
//! by the first effective `call`. Together they decide whether a dispatch
//! runs inline (a cycle has already elapsed, so inline cannot be reentrant)
//! or gets queued for a later point.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::input::{Arg, Callee, Input};
#[cfg(feature = "async-tokio")]
use super::schedule::TokioScheduler;
use super::schedule::Scheduler;

/// A deferred, at-most-once callback wrapper.
///
/// Constructed from any [`Input`] shape, the wrapper normalizes the input
/// exactly once: the callable (if any) becomes the callee, everything else
/// is retained as positional arguments retrievable by index. The single
/// [`call`](Self::call) operation then guarantees:
///
/// - **At-most-once**: only the first `call` dispatches; later calls are
///   no-ops that still report the first call's outcome. The guard extends
///   across copies made after the first call.
/// - **Always asynchronous**: a `call` made in the same turn as
///   construction is queued for a later cycle, so the constructing code
///   never observes reentrant dispatch. Once one cycle has elapsed, the
///   extra hop is skipped and dispatch is inline.
///
/// Copying a wrapper (via `Clone`) duplicates its state verbatim and never
/// re-arms the construction tick, so an already-called copy stays called.
///
/// `T` is the positional-value type forwarded to the callee and retained
/// as leftover arguments.
pub struct Guarded<T> {
   callee: Option<Callee<T>>,
   leftover: Vec<Arg<T>>,
   ticked: Arc<AtomicBool>,
   called: AtomicBool,
   scheduler: Arc<dyn Scheduler>,
}

impl<T> Guarded<T> {
   /// Builds a wrapper on the tokio-backed scheduler.
   ///
   /// Must be called from within a tokio runtime context when `input`
   /// carries a callable, because construction queues the readiness tick.
   #[cfg(feature = "async-tokio")]
   #[must_use]
   pub fn new(input: Input<T>) -> Self {
      Self::with_scheduler(input, Arc::new(TokioScheduler))
   }

   /// Builds a wrapper on an explicit scheduler.
   ///
   /// Normalization runs exactly once, here. If a callee was found, one
   /// tick job is queued that marks the wrapper ready for inline dispatch;
   /// nothing is queued otherwise.
   #[must_use]
   pub fn with_scheduler(input: Input<T>, scheduler: Arc<dyn Scheduler>) -> Self {
      let (callee, leftover) = input.normalize();
      let ticked = Arc::new(AtomicBool::new(false));
      if callee.is_some() {
         let flag = Arc::clone(&ticked);
         scheduler.next_tick(Box::new(move || flag.store(true, Ordering::Release)));
      }
      Self {
         callee,
         leftover,
         ticked,
         called: AtomicBool::new(false),
         scheduler,
      }
   }

   /// Builds a wrapper around a bare callable.
   #[cfg(feature = "async-tokio")]
   pub fn from_fn<F>(f: F) -> Self
   where
      F: Fn(Vec<T>) + Send + Sync + 'static,
   {
      Self::new(Input::func(f))
   }

   /// Builds a wrapper from an indexed collection of positional elements.
   #[cfg(feature = "async-tokio")]
   #[must_use]
   pub fn from_args(args: Vec<Arg<T>>) -> Self {
      Self::new(Input::Args(args))
   }

   /// Builds a wrapper with no callable at all.
   ///
   /// Never queues anything, so this is safe outside a runtime context.
   #[cfg(feature = "async-tokio")]
   #[must_use]
   pub fn absent() -> Self {
      Self::new(Input::Absent)
   }

   /// Checks whether a callable was found at construction time.
   ///
   /// Pure predicate; never blocks, never dispatches.
   #[inline]
   pub fn has_callback(&self) -> bool {
      self.callee.is_some()
   }

   /// Checks whether the wrapper has already been effectively called.
   #[inline]
   pub fn is_called(&self) -> bool {
      self.called.load(Ordering::Acquire)
   }

   /// Returns the leftover positional element at `index`.
   ///
   /// Indices are 0-based in original left-to-right order. Out of bounds
   /// is not an error, it is the defined way to detect an omitted optional
   /// parameter: the result is simply `None`.
   #[inline]
   pub fn argument_at(&self, index: usize) -> Option<&Arg<T>> {
      self.leftover.get(index)
   }

   /// Returns the leftover positional element at `index`, or `default`
   /// when `index` is out of bounds.
   #[inline]
   pub fn argument_at_or<'a>(&'a self, index: usize, default: &'a Arg<T>) -> &'a Arg<T> {
      self.argument_at(index).unwrap_or(default)
   }

   /// All leftover positional elements, in original order.
   #[inline]
   pub fn arguments(&self) -> &[Arg<T>] {
      &self.leftover
   }
}

impl<T: Send + 'static> Guarded<T> {
   /// Dispatches the callee at most once, forwarding `args` positionally
   /// and unmodified.
   ///
   /// Returns `false` iff no callable was ever found at construction time;
   /// `true` otherwise, including on every call after the first (which do
   /// nothing).
   ///
   /// If the construction tick has already fired, the callee runs inline,
   /// immediately. Otherwise the callee and `args` are captured and queued
   /// for a later cycle, and this method returns without dispatching.
   ///
   /// A panic raised by the callee itself is not caught here; it
   /// propagates according to where the dispatch runs (the caller's stack
   /// or the scheduler's queue).
   pub fn call(&self, args: Vec<T>) -> bool {
      let Some(callee) = &self.callee else {
         return false;
      };
      // The guard goes up before dispatch: a re-entrant call made from
      // inside the callee already reads "called" and is ignored.
      if self.called.swap(true, Ordering::AcqRel) {
         return true;
      }
      if self.ticked.load(Ordering::Acquire) {
         // At least one cycle has elapsed since construction, so an
         // inline dispatch cannot be reentrant relative to the
         // constructing turn.
         callee(args);
      } else {
         let callee = Arc::clone(callee);
         self.scheduler.defer(Box::new(move || callee(args)));
      }
      true
   }
}

impl<T: Clone> Clone for Guarded<T> {
   /// Copy-construction from an existing wrapper.
   ///
   /// Duplicates the wrapper's state verbatim without re-running
   /// normalization and without re-arming the construction tick. The
   /// callee and the readiness flag are shared with the source; the
   /// called flag is snapshotted, so a copy of an already-called wrapper
   /// stays called and calling it again is a no-op.
   fn clone(&self) -> Self {
      Self {
         callee: self.callee.clone(),
         leftover: self.leftover.clone(),
         ticked: Arc::clone(&self.ticked),
         called: AtomicBool::new(self.called.load(Ordering::Acquire)),
         scheduler: Arc::clone(&self.scheduler),
      }
   }
}

#[cfg(feature = "async-tokio")]
impl<T> Default for Guarded<T> {
   /// Creates a wrapper with no callable, on the tokio-backed scheduler.
   #[inline]
   fn default() -> Self {
      Self::absent()
   }
}

#[cfg(feature = "async-tokio")]
impl<T> From<Input<T>> for Guarded<T> {
   /// Builds a wrapper on the tokio-backed scheduler.
   #[inline]
   fn from(input: Input<T>) -> Self {
      Self::new(input)
   }
}

impl<T: fmt::Debug> fmt::Debug for Guarded<T> {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      f.debug_struct("Guarded")
         .field("has_callback", &self.has_callback())
         .field("leftover", &self.leftover)
         .field("ticked", &self.ticked.load(Ordering::Relaxed))
         .field("called", &self.called.load(Ordering::Relaxed))
         .finish()
   }
}
