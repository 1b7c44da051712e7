use std::sync::Arc;

use defer_once::{Guarded, Input, ManualQueue};

fn main() {
   // No async runtime here: the deterministic queue stands in for the
   // host's scheduling queue and is pumped by hand.
   let queue = Arc::new(ManualQueue::new());

   let guarded = Guarded::with_scheduler(
      Input::func(|args: Vec<i64>| {
         println!("callback ran with {args:?}");
      }),
      queue.clone(),
   );

   assert!(guarded.call(vec![1, 2, 3]));
   println!("call() returned; {} job(s) queued", queue.len());

   // Pumping the queue runs the construction tick and the deferred
   // dispatch, in submission order.
   let ran = queue.run_until_idle();
   println!("pumped {ran} job(s)");
}
