use std::time::Duration;

use defer_once::{Arg, Guarded};

#[derive(Clone, Debug, PartialEq)]
enum Value {
   Int(i64),
   Str(&'static str),
}

/// A host function that takes ('retries', limit, callback) and wraps the
/// captured parameter list instead of hard-coding the callback's slot.
fn host_operation(params: Vec<Arg<Value>>) -> Guarded<Value> {
   let guarded = Guarded::from_args(params);
   println!(
      "option: {:?}, limit: {:?}",
      guarded.argument_at(0),
      guarded.argument_at(1)
   );
   guarded
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
   let guarded = host_operation(vec![
      Arg::Value(Value::Str("retries")),
      Arg::Value(Value::Int(3)),
      Arg::func(|args: Vec<Value>| {
         println!("callback ran with {args:?}");
      }),
   ]);

   // Calling in the same turn as construction still dispatches
   // asynchronously.
   assert!(guarded.call(vec![Value::Str("done")]));
   println!("call() returned, callback has not run yet");

   tokio::time::sleep(Duration::from_millis(10)).await;

   // A second call reports success but dispatches nothing.
   assert!(guarded.call(vec![Value::Str("ignored")]));
}
