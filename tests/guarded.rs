use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use defer_once::{Arg, Guarded, Input, ManualQueue};

/// Mixed positional-value type standing in for the dynamically-typed
/// arguments a host API would forward.
#[derive(Clone, Debug, PartialEq)]
enum Value {
   Int(i64),
   Str(&'static str),
   Error(&'static str),
   Null,
   List(Vec<Value>),
}

fn manual() -> Arc<ManualQueue> {
   Arc::new(ManualQueue::new())
}

#[test]
fn rejects_a_bare_number() {
   let queue = manual();
   let sut: Guarded<Value> = Guarded::with_scheduler(Input::Value(Value::Int(5)), queue.clone());

   assert!(!sut.has_callback());
   assert!(!sut.call(Vec::new()));
   // No callee means nothing was armed either.
   assert!(queue.is_empty());
}

#[test]
fn rejects_a_bare_string() {
   let queue = manual();
   let sut: Guarded<Value> =
      Guarded::with_scheduler(Input::Value(Value::Str("a string")), queue.clone());

   assert!(!sut.has_callback());
   assert!(!sut.call(Vec::new()));
}

#[test]
fn rejects_an_absent_input() {
   let queue = manual();
   let sut: Guarded<Value> = Guarded::with_scheduler(Input::Absent, queue.clone());

   assert!(!sut.has_callback());
   assert!(!sut.call(Vec::new()));
   assert!(queue.is_empty());
}

#[test]
fn rejects_args_without_a_callable() {
   let queue = manual();
   let sut: Guarded<Value> = Guarded::with_scheduler(
      Input::Args(vec![
         Arg::Value(Value::Int(4)),
         Arg::Value(Value::Int(5)),
      ]),
      queue.clone(),
   );

   assert!(!sut.has_callback());
   assert!(!sut.call(Vec::new()));
   assert!(queue.is_empty());
}

#[test]
fn accepts_args_with_a_callable() {
   let queue = manual();
   let sut: Guarded<Value> = Guarded::with_scheduler(
      Input::Args(vec![
         Arg::func(|_args: Vec<Value>| {}),
         Arg::Value(Value::Int(5)),
      ]),
      queue.clone(),
   );

   assert!(sut.has_callback());
   assert!(sut.call(Vec::new()));
   queue.run_until_idle();
}

#[test]
fn chooses_the_last_callable() {
   let queue = manual();
   let first = Arc::new(AtomicUsize::new(0));
   let last = Arc::new(AtomicUsize::new(0));

   let sut: Guarded<Value> = Guarded::with_scheduler(
      Input::Args(vec![
         Arg::Value(Value::Str("a string")),
         Arg::func({
            let first = Arc::clone(&first);
            move |_args: Vec<Value>| {
               first.fetch_add(1, Ordering::SeqCst);
            }
         }),
         Arg::Value(Value::Int(5)),
         Arg::func({
            let last = Arc::clone(&last);
            move |_args: Vec<Value>| {
               last.fetch_add(1, Ordering::SeqCst);
            }
         }),
      ]),
      queue.clone(),
   );

   assert!(sut.has_callback());
   assert!(sut.call(Vec::new()));
   queue.run_until_idle();

   // The last callable wins; the earlier one is retained as a positional
   // element instead.
   assert_eq!(last.load(Ordering::SeqCst), 1);
   assert_eq!(first.load(Ordering::SeqCst), 0);
   assert_eq!(sut.arguments().len(), 3);
   assert!(sut.argument_at(1).is_some_and(Arg::is_func));
}

#[test]
fn copy_shares_the_callable() {
   let queue = manual();
   let count = Arc::new(AtomicUsize::new(0));

   let original: Guarded<Value> = Guarded::with_scheduler(
      Input::func({
         let count = Arc::clone(&count);
         move |_args: Vec<Value>| {
            count.fetch_add(1, Ordering::SeqCst);
         }
      }),
      queue.clone(),
   );
   let copy = original.clone();

   assert!(copy.has_callback());
   assert!(copy.call(Vec::new()));
   queue.run_until_idle();
   assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[test]
fn copy_of_a_called_wrapper_stays_called() {
   let queue = manual();
   let count = Arc::new(AtomicUsize::new(0));

   let original: Guarded<Value> = Guarded::with_scheduler(
      Input::func({
         let count = Arc::clone(&count);
         move |_args: Vec<Value>| {
            count.fetch_add(1, Ordering::SeqCst);
         }
      }),
      queue.clone(),
   );

   let first = original.call(Vec::new());
   let copy = original.clone();
   let second = copy.call(Vec::new());
   queue.run_until_idle();

   // The copy reports success, but never triggers a second dispatch.
   assert!(first);
   assert!(second);
   assert!(copy.is_called());
   assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[test]
fn dispatches_at_most_once() {
   let queue = manual();
   let count = Arc::new(AtomicUsize::new(0));

   let sut: Guarded<Value> = Guarded::with_scheduler(
      Input::func({
         let count = Arc::clone(&count);
         move |_args: Vec<Value>| {
            count.fetch_add(1, Ordering::SeqCst);
         }
      }),
      queue.clone(),
   );

   assert!(sut.call(Vec::new()));
   assert!(sut.call(Vec::new()));
   queue.run_until_idle();
   assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[test]
fn defers_when_called_in_the_construction_turn() {
   let queue = manual();
   let count = Arc::new(AtomicUsize::new(0));

   let sut: Guarded<Value> = Guarded::with_scheduler(
      Input::func({
         let count = Arc::clone(&count);
         move |_args: Vec<Value>| {
            count.fetch_add(1, Ordering::SeqCst);
         }
      }),
      queue.clone(),
   );

   assert!(sut.call(Vec::new()));
   // The dispatch is queued, never inline within the constructing turn.
   assert_eq!(count.load(Ordering::SeqCst), 0);
   queue.run_until_idle();
   assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[test]
fn dispatches_inline_after_the_tick() {
   let queue = manual();
   let count = Arc::new(AtomicUsize::new(0));

   let sut: Guarded<Value> = Guarded::with_scheduler(
      Input::func({
         let count = Arc::clone(&count);
         move |_args: Vec<Value>| {
            count.fetch_add(1, Ordering::SeqCst);
         }
      }),
      queue.clone(),
   );

   // Let the construction tick fire first.
   queue.run_until_idle();

   assert!(sut.call(Vec::new()));
   // A full cycle has elapsed, so the dispatch ran inline with no hop.
   assert_eq!(count.load(Ordering::SeqCst), 1);
   assert!(queue.is_empty());
}

#[test]
fn forwards_arguments_unmodified() {
   let queue = manual();
   let count = Arc::new(AtomicUsize::new(0));

   let sut = Guarded::with_scheduler(
      Input::func({
         let count = Arc::clone(&count);
         move |args: Vec<Value>| {
            assert_eq!(
               args,
               vec![
                  Value::Int(1),
                  Value::Str("two"),
                  Value::Error("this is an error"),
                  Value::Null,
                  Value::List(Vec::new()),
               ]
            );
            count.fetch_add(1, Ordering::SeqCst);
         }
      }),
      queue.clone(),
   );

   assert!(sut.call(vec![
      Value::Int(1),
      Value::Str("two"),
      Value::Error("this is an error"),
      Value::Null,
      Value::List(Vec::new()),
   ]));
   queue.run_until_idle();
   assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[test]
fn reentrant_call_is_ignored() {
   let queue = manual();
   let count = Arc::new(AtomicUsize::new(0));
   let slot: Arc<OnceLock<Guarded<Value>>> = Arc::new(OnceLock::new());

   let sut = Guarded::with_scheduler(
      Input::func({
         let count = Arc::clone(&count);
         let slot = Arc::clone(&slot);
         move |_args: Vec<Value>| {
            count.fetch_add(1, Ordering::SeqCst);
            // The guard is already up while the callee runs, so
            // re-entering reports success without dispatching again.
            assert!(slot.get().unwrap().call(Vec::new()));
         }
      }),
      queue.clone(),
   );
   assert!(slot.set(sut).is_ok());

   assert!(slot.get().unwrap().call(Vec::new()));
   queue.run_until_idle();
   assert_eq!(count.load(Ordering::SeqCst), 1);
}

// --- Tokio-backed tests exercising the production scheduler ---

#[tokio::test]
async fn runs_async_when_called_async() {
   let count = Arc::new(AtomicUsize::new(0));
   let sut: Guarded<Value> = Guarded::from_fn({
      let count = Arc::clone(&count);
      move |_args| {
         count.fetch_add(1, Ordering::SeqCst);
      }
   });

   // Give the construction tick time to fire, as a host would when the
   // wrapper is called from a later timer callback.
   tokio::time::sleep(Duration::from_millis(10)).await;

   assert!(sut.call(Vec::new()));
   // The tick already fired, so the dispatch was inline.
   assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn runs_async_when_called_sync() {
   let count = Arc::new(AtomicUsize::new(0));
   let sut: Guarded<Value> = Guarded::from_fn({
      let count = Arc::clone(&count);
      move |_args| {
         count.fetch_add(1, Ordering::SeqCst);
      }
   });

   // Called within the same turn as construction: the current-thread
   // runtime cannot have run the tick yet, so the dispatch must be queued.
   assert!(sut.call(Vec::new()));
   assert_eq!(count.load(Ordering::SeqCst), 0);

   tokio::time::sleep(Duration::from_millis(10)).await;
   assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn tokio_dispatch_is_still_at_most_once() {
   let count = Arc::new(AtomicUsize::new(0));
   let sut: Guarded<Value> = Guarded::from_fn({
      let count = Arc::clone(&count);
      move |_args| {
         count.fetch_add(1, Ordering::SeqCst);
      }
   });

   assert!(sut.call(Vec::new()));
   assert!(sut.call(Vec::new()));
   tokio::time::sleep(Duration::from_millis(10)).await;
   assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn absent_wrapper_never_dispatches() {
   let sut: Guarded<Value> = Guarded::absent();
   assert!(!sut.has_callback());
   assert!(!sut.call(Vec::new()));
   assert!(!sut.is_called());
}
