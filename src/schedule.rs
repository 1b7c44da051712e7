//! The deferral capability used to arm and dispatch wrappers.
//!
//! Two hops go through this abstraction: the construction-time tick that
//! marks a wrapper ready for synchronous dispatch, and the queued dispatch
//! of a `call` made before that tick has fired. Routing both through the
//! [`Scheduler`] trait lets tests (and hosts without an async runtime)
//! substitute the deterministic [`ManualQueue`] for the tokio-backed
//! production implementation.
//!
//! Nothing here blocks: deferral is queuing, never waiting.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A queued unit of work.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// The two deferral primitives a wrapper relies on.
///
/// Both preserve submission order relative to themselves. Neither runs the
/// job before the current synchronous execution has unwound.
pub trait Scheduler: Send + Sync {
   /// Runs `job` on the next cooperative cycle, after the current
   /// synchronous stack completes and before timer-based work.
   fn next_tick(&self, job: Job);

   /// Runs `job` at a later point in the asynchronous queue.
   fn defer(&self, job: Job);
}

/// Production scheduler backed by the tokio runtime.
///
/// Must be used from within a runtime context. Both hops are spawned
/// tasks; [`next_tick`](Scheduler::next_tick) yields once so the job runs
/// on the cycle after the spawning turn.
#[cfg(feature = "async-tokio")]
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioScheduler;

#[cfg(feature = "async-tokio")]
impl Scheduler for TokioScheduler {
   fn next_tick(&self, job: Job) {
      tokio::spawn(async move {
         tokio::task::yield_now().await;
         job();
      });
   }

   fn defer(&self, job: Job) {
      tokio::spawn(async move {
         job();
      });
   }
}

/// Deterministic FIFO scheduler for tests and runtime-less hosts.
///
/// Jobs accumulate until explicitly pumped with [`run_next`](Self::run_next)
/// or [`run_until_idle`](Self::run_until_idle). Both deferral primitives
/// share the single queue, so pumping replays exactly the submission order.
#[derive(Default)]
pub struct ManualQueue {
   jobs: Mutex<VecDeque<Job>>,
}

impl ManualQueue {
   /// Creates an empty queue.
   #[must_use]
   pub fn new() -> Self {
      Self::default()
   }

   fn queue(&self) -> MutexGuard<'_, VecDeque<Job>> {
      // Jobs never run while the lock is held, so poisoning can only come
      // from a panicking caller of len/is_empty; the queue itself stays
      // consistent.
      self.jobs.lock().unwrap_or_else(PoisonError::into_inner)
   }

   /// Number of jobs currently queued.
   pub fn len(&self) -> usize {
      self.queue().len()
   }

   /// Checks whether the queue is empty.
   pub fn is_empty(&self) -> bool {
      self.queue().is_empty()
   }

   /// Runs the oldest queued job, if any. Returns whether a job ran.
   pub fn run_next(&self) -> bool {
      // Pop first, run after the guard is gone: the job may queue more
      // work on this same queue.
      let job = self.queue().pop_front();
      match job {
         Some(job) => {
            job();
            true
         }
         None => false,
      }
   }

   /// Pumps the queue until it stays empty, including jobs queued by the
   /// jobs themselves. Returns the number of jobs run.
   pub fn run_until_idle(&self) -> usize {
      let mut ran = 0;
      while self.run_next() {
         ran += 1;
      }
      ran
   }
}

impl Scheduler for ManualQueue {
   fn next_tick(&self, job: Job) {
      self.queue().push_back(job);
   }

   fn defer(&self, job: Job) {
      self.queue().push_back(job);
   }
}

impl fmt::Debug for ManualQueue {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      f.debug_struct("ManualQueue")
         .field("queued", &self.len())
         .finish()
   }
}
