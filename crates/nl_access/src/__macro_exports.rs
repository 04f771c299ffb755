//! Items the derive macro expansion depends on.
//!
//! Not part of the public API; derive-generated code references these
//! through `nl_access::__macro_exports` so that expansions do not depend on
//! what the deriving crate happens to import.

pub use alloc::boxed::Box;
