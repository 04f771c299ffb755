//! Built-in [`Node`](crate::node::Node) implementations and the static
//! storage cells that back [`Shaped`](crate::info::Shaped).

mod cell;
mod collections;
mod leaf;
mod numeric;

pub use cell::{GenericCell, GenericNameCell, GenericShapeCell, ShapeCell};

pub(crate) use numeric::{numeric_pair, numeric_vtable};
