use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use defer_once::Guarded;

static RAN: AtomicUsize = AtomicUsize::new(0);

fn wrap() -> Guarded<&'static str> {
   Guarded::from_fn(|args| {
      RAN.fetch_add(1, Ordering::SeqCst);
      println!("callback ran with {args:?}");
   })
}

// Current-thread flavor so nothing runs between a call and the assertion
// that follows it.
#[tokio::main(flavor = "current_thread")]
async fn main() {
   // Early call: the construction tick has not fired yet, so the dispatch
   // is queued for a later cycle.
   let early = wrap();
   early.call(vec!["early"]);
   assert_eq!(RAN.load(Ordering::SeqCst), 0);
   println!("early call queued, nothing ran yet");
   tokio::time::sleep(Duration::from_millis(10)).await;
   assert_eq!(RAN.load(Ordering::SeqCst), 1);

   // Late call: a cycle has elapsed since construction, so the dispatch
   // runs inline without an extra hop.
   let late = wrap();
   tokio::time::sleep(Duration::from_millis(10)).await;
   late.call(vec!["late"]);
   assert_eq!(RAN.load(Ordering::SeqCst), 2);
   println!("late call dispatched inline");
}
