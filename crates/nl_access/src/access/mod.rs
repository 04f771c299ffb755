//! Compiled, cached, path-based access to node graphs.
//!
//! The module splits the work in two:
//!
//! - **Compilation** ([`Accessor`], [`AccessorCache`]): a single path
//!   segment applied to a single owner shape is compiled into a set of
//!   specialized closures, keyed by (owner type, segment, value type) and
//!   memoized. All shape-level validation happens here, once.
//! - **Navigation** ([`Navigator`]): walks a full [`NodePath`] by chaining
//!   cached accessors, implementing the copy-back protocol for
//!   value-semantics hops, auto-instantiation of absent optionals on
//!   writes, delegation to [`Navigable`] shapes, non-destructive
//!   [validation](Navigator::validate) and graph-node
//!   [collection](Navigator::collect).
//!
//! [`NodePath`]: crate::path::NodePath
//! [`Navigable`]: crate::node::Navigable

mod cache;
mod collect;
mod compile;
mod error;
mod navigate;
mod validate;

pub use cache::AccessorCache;
pub use compile::{Accessor, ValueShape};
pub use error::{AccessError, AccessErrorKind};
pub use navigate::Navigator;
pub use validate::PathCheck;
