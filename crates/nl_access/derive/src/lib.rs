//! Derive support for `nl_access`.
//!
//! See [`NodeShape`].
#![allow(clippy::std_instead_of_core, reason = "proc-macro lib")]
#![allow(clippy::std_instead_of_alloc, reason = "proc-macro lib")]

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

static NODE_ATTRIBUTE_NAME: &str = "node";

// -----------------------------------------------------------------------------
// Modules

mod derive_data;
mod impls;

// -----------------------------------------------------------------------------
// Macros

/// # Node Shape Derivation
///
/// `#[derive(NodeShape)]` implements the following traits for a non-generic
/// struct with named fields:
///
/// - `Shaped`
/// - `Node`
/// - `Object`
///
/// The deriving type must implement `Clone`. Every named field becomes an
/// addressable member; `Option<T>` fields become *optional* members storing
/// `T` (absent when `None`, clearable, auto-instantiated on mutating walks
/// when `T`'s shape has a default).
///
/// ## Type-level attributes
///
/// ```rust, ignore
/// #[derive(Clone, NodeShape)]
/// #[node(graph_node)]
/// struct Foo { /* ... */ }
/// ```
///
/// - `graph_node`: the shape is a collectable entity, reported by
///   `Navigator::collect` and never reset to a default in place.
/// - `value`: the shape has value semantics; the engine mutates a copy and
///   writes it back through the owning accessor.
/// - `default`: registers `Self::default` as the shape's instantiator
///   (requires `Default`).
/// - `navigable`: the type implements `Navigable` itself and takes over
///   path resolution below it.
///
/// ## Field-level attributes
///
/// ```rust, ignore
/// #[derive(Clone, NodeShape)]
/// struct Item {
///     #[node(readonly)]
///     id: u64,
///     #[node(skip)]
///     scratch: Vec<u8>,
///     value: f32,
/// }
/// ```
///
/// - `readonly`: the member can be read but never written, cleared, or
///   traversed mutably.
/// - `skip`: the field is not a member at all.
///
/// Generic types cannot use the derive; implement `Shaped` and `Node`
/// manually with a `GenericShapeCell` instead.
#[proc_macro_derive(NodeShape, attributes(node))]
pub fn derive_node_shape(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);

    match derive_data::NodeStruct::parse(&ast) {
        Ok(info) => impls::impl_node_shape(&info).into(),
        Err(err) => err.into_compile_error().into(),
    }
}
