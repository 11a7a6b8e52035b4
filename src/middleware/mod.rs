//! Middleware layers that add cross-cutting behavior to a store chain
//!
//! Each layer wraps one inner [`Store`](crate::Store) implementer and
//! intercepts only the operations it needs; everything else is explicit
//! delegation, following the shape of [`Proxy`](crate::Proxy).

pub mod expires;
pub mod lock;
pub mod transformer;

pub use expires::Expires;
pub use lock::Lock;
pub use transformer::{Transformer, TransformerConfig};
