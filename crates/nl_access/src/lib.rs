#![doc = include_str!("../README.md")]

// -----------------------------------------------------------------------------
// Extern Self

// Usually, we need to use `crate` in the crate itself and use `nl_access` in
// doc testing and derive expansion. An `extern self` ensures `nl_access` can
// be used as an alias for `crate` in both positions.
extern crate self as nl_access;

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

pub mod access;
pub mod impls;
pub mod info;
pub mod node;
pub mod path;

// -----------------------------------------------------------------------------
// Top-Level exports

pub mod __macro_exports;

pub use access::{AccessError, AccessErrorKind, Accessor, AccessorCache, Navigator};
pub use info::{ShapeInfo, Shaped};
pub use node::Node;
pub use path::{NodePath, Segment};

pub use nl_access_derive as derive;
