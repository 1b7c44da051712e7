//! Construction input shapes and the normalization pass.
//!
//! A [`Guarded`](crate::Guarded) wrapper can be built from a bare callable,
//! from an indexed collection that mixes values and callables (such as a
//! captured parameter list), from a bare non-callable value, or from nothing
//! at all. This module models those shapes as a tagged union ([`Input`]) and
//! performs the single normalization pass that selects the callee and
//! collects the leftover positional arguments. Shape is inspected exactly
//! once, here, never again at a use site.

use std::fmt;
use std::sync::Arc;

/// The callable selected (or supplied) at construction time.
///
/// Stored behind `Arc` so that copies of a wrapper alias the same callable
/// rather than duplicating it.
pub type Callee<T> = Arc<dyn Fn(Vec<T>) + Send + Sync + 'static>;

/// A single positional element of an indexed input.
///
/// Indexed inputs may interleave plain values and callables, and every
/// element that is not selected as the callee is retained, so the element
/// type has to carry both cases.
#[derive(Clone)]
pub enum Arg<T> {
   /// A plain positional value.
   Value(T),
   /// A callable element.
   Func(Callee<T>),
}

impl<T> Arg<T> {
   /// Wraps a closure as a callable element.
   pub fn func<F>(f: F) -> Self
   where
      F: Fn(Vec<T>) + Send + Sync + 'static,
   {
      Self::Func(Arc::new(f))
   }

   /// Returns the contained value, or `None` for a callable element.
   #[inline]
   pub fn value(&self) -> Option<&T> {
      match self {
         Self::Value(value) => Some(value),
         Self::Func(_) => None,
      }
   }

   /// Checks whether this element is a callable.
   #[inline]
   pub fn is_func(&self) -> bool {
      matches!(self, Self::Func(_))
   }
}

impl<T> From<T> for Arg<T> {
   /// Wraps a plain value as a positional element.
   #[inline]
   fn from(value: T) -> Self {
      Self::Value(value)
   }
}

impl<T: fmt::Debug> fmt::Debug for Arg<T> {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      match self {
         Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
         Self::Func(_) => f.write_str("Func(..)"),
      }
   }
}

impl<T: PartialEq> PartialEq for Arg<T> {
   /// Values compare by `PartialEq`; callables compare by identity
   /// (same shared allocation).
   fn eq(&self, other: &Self) -> bool {
      match (self, other) {
         (Self::Value(a), Self::Value(b)) => a == b,
         (Self::Func(a), Self::Func(b)) => Arc::ptr_eq(a, b),
         _ => false,
      }
   }
}

/// The shapes a wrapper can be constructed from.
///
/// These are the four input shapes a maybe-callback argument can take,
/// resolved in this order: a bare callable, an indexed collection, a bare
/// non-callable value, or nothing. The fifth shape of the source model,
/// "another wrapper instance", is rendered as `Clone` on
/// [`Guarded`](crate::Guarded) itself.
pub enum Input<T> {
   /// A bare callable.
   Func(Callee<T>),
   /// An indexed collection of mixed positional elements, e.g. a captured
   /// parameter list where the callback is not always in the same slot.
   Args(Vec<Arg<T>>),
   /// A bare non-callable value. Nothing to call, nothing retained.
   Value(T),
   /// No input was supplied at all.
   Absent,
}

impl<T> Input<T> {
   /// Wraps a closure as a bare-callable input.
   pub fn func<F>(f: F) -> Self
   where
      F: Fn(Vec<T>) + Send + Sync + 'static,
   {
      Self::Func(Arc::new(f))
   }

   /// Selects the callee and collects the leftover elements.
   ///
   /// The *last* callable of an indexed input wins; every other element,
   /// callable or not, is kept in original left-to-right order. This
   /// matches the common "last function wins" convention for a trailing
   /// callback buried among positional arguments.
   pub(crate) fn normalize(self) -> (Option<Callee<T>>, Vec<Arg<T>>) {
      match self {
         Self::Func(callee) => (Some(callee), Vec::new()),
         Self::Args(args) => {
            let picked = args.iter().rposition(Arg::is_func);
            let mut callee = None;
            let mut leftover = Vec::with_capacity(args.len().saturating_sub(1));
            for (index, arg) in args.into_iter().enumerate() {
               if Some(index) == picked {
                  if let Arg::Func(f) = arg {
                     callee = Some(f);
                  }
               } else {
                  leftover.push(arg);
               }
            }
            (callee, leftover)
         }
         Self::Value(_) | Self::Absent => (None, Vec::new()),
      }
   }
}

impl<T> From<Vec<Arg<T>>> for Input<T> {
   /// Treats a vector of positional elements as an indexed input.
   #[inline]
   fn from(args: Vec<Arg<T>>) -> Self {
      Self::Args(args)
   }
}

impl<T: fmt::Debug> fmt::Debug for Input<T> {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      match self {
         Self::Func(_) => f.write_str("Func(..)"),
         Self::Args(args) => f.debug_tuple("Args").field(args).finish(),
         Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
         Self::Absent => f.write_str("Absent"),
      }
   }
}
