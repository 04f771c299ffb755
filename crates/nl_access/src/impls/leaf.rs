//! [`Node`] and [`Shaped`] implementations for terminal value types.
//!
//! All leaves carry [value semantics](crate::info::Semantics::Value): they
//! are copied out of their owner on reads and written back whole.

use alloc::boxed::Box;
use alloc::string::String;
use core::fmt;

use crate::impls::ShapeCell;
use crate::info::{ShapeInfo, Shaped};
use crate::node::{Node, NodeMut, NodeRef};

macro_rules! impl_leaf {
    ($($ty:ty => $name:literal),* $(,)?) => {
        $(
            impl Shaped for $ty {
                fn shape_info() -> &'static ShapeInfo {
                    static CELL: ShapeCell = ShapeCell::new();
                    CELL.get_or_init(|| {
                        ShapeInfo::leaf::<$ty>($name)
                            .with_value_semantics()
                            .with_default::<$ty>()
                    })
                }
            }

            impl Node for $ty {
                #[inline]
                fn shape(&self) -> &'static ShapeInfo {
                    <Self as Shaped>::shape_info()
                }

                #[inline]
                fn node_ref(&self) -> NodeRef<'_> {
                    NodeRef::Leaf(self)
                }

                #[inline]
                fn node_mut(&mut self) -> NodeMut<'_> {
                    NodeMut::Leaf(self)
                }

                #[inline]
                fn clone_node(&self) -> Box<dyn Node> {
                    Box::new(self.clone())
                }

                fn set_node(&mut self, value: Box<dyn Node>) -> Result<(), Box<dyn Node>> {
                    *self = value.take::<Self>()?;
                    Ok(())
                }

                #[inline]
                fn debug_node(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    fmt::Debug::fmt(self, f)
                }
            }
        )*
    };
}

impl_leaf! {
    i8 => "i8",
    i16 => "i16",
    i32 => "i32",
    i64 => "i64",
    isize => "isize",
    u8 => "u8",
    u16 => "u16",
    u32 => "u32",
    u64 => "u64",
    usize => "usize",
    f32 => "f32",
    f64 => "f64",
    bool => "bool",
    char => "char",
    String => "String",
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use crate::info::{Semantics, Shaped};
    use crate::node::{Node, NodeKind};
    use alloc::boxed::Box;
    use alloc::string::String;

    #[test]
    fn leaf_shapes() {
        assert_eq!(i32::shape_info().kind(), NodeKind::Leaf);
        assert_eq!(i32::shape_info().name(), "i32");
        assert_eq!(String::shape_info().semantics(), Semantics::Value);
        assert!(f64::shape_info().has_default());
    }

    #[test]
    fn set_node_rejects_other_types() {
        let mut x = 1_i32;
        assert!(x.set_node(Box::new(2_i32)).is_ok());
        assert_eq!(x, 2);
        assert!(x.set_node(Box::new(true)).is_err());
        assert_eq!(x, 2);
    }

    #[test]
    fn shape_info_is_shared() {
        let a: &dyn Node = &1_i32;
        let b: &dyn Node = &2_i32;
        assert!(core::ptr::eq(a.shape(), b.shape()));
    }
}
