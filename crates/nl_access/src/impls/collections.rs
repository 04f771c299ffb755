//! [`Node`] and [`Sequence`] implementations for standard collections.

use alloc::boxed::Box;
use alloc::format;
use alloc::vec::Vec;
use core::any::Any;

use crate::impls::{GenericNameCell, GenericShapeCell};
use crate::info::{ShapeInfo, Shaped};
use crate::node::{Node, NodeMut, NodeRef, Sequence};

fn vec_name<T: Shaped + Any>() -> &'static str {
    static CELL: GenericNameCell = GenericNameCell::new();
    CELL.get_or_insert::<Vec<T>>(|| format!("Vec<{}>", T::shape_info().name()))
}

impl<T: Node + Shaped + Clone> Shaped for Vec<T> {
    fn shape_info() -> &'static ShapeInfo {
        static CELL: GenericShapeCell = GenericShapeCell::new();
        CELL.get_or_insert::<Self>(|| {
            ShapeInfo::sequence::<Self>(vec_name::<T>(), T::shape_info).with_default::<Self>()
        })
    }
}

impl<T: Node + Shaped + Clone> Node for Vec<T> {
    #[inline]
    fn shape(&self) -> &'static ShapeInfo {
        <Self as Shaped>::shape_info()
    }

    #[inline]
    fn node_ref(&self) -> NodeRef<'_> {
        NodeRef::Sequence(self)
    }

    #[inline]
    fn node_mut(&mut self) -> NodeMut<'_> {
        NodeMut::Sequence(self)
    }

    #[inline]
    fn clone_node(&self) -> Box<dyn Node> {
        Box::new(self.clone())
    }

    fn set_node(&mut self, value: Box<dyn Node>) -> Result<(), Box<dyn Node>> {
        *self = value.take::<Self>()?;
        Ok(())
    }
}

impl<T: Node + Shaped + Clone> Sequence for Vec<T> {
    #[inline]
    fn element(&self, index: usize) -> Option<&dyn Node> {
        self.get(index).map(|element| element as &dyn Node)
    }

    #[inline]
    fn element_mut(&mut self, index: usize) -> Option<&mut dyn Node> {
        self.get_mut(index).map(|element| element as &mut dyn Node)
    }

    fn set_element(
        &mut self,
        index: usize,
        value: Box<dyn Node>,
    ) -> Result<(), Box<dyn Node>> {
        let value = value.take::<T>()?;
        self[index] = value;
        Ok(())
    }

    fn insert_element(
        &mut self,
        index: usize,
        value: Box<dyn Node>,
    ) -> Result<(), Box<dyn Node>> {
        let value = value.take::<T>()?;
        self.insert(index, value);
        Ok(())
    }

    fn remove_element(&mut self, index: usize) -> Box<dyn Node> {
        Box::new(self.remove(index))
    }

    fn push_element(&mut self, value: Box<dyn Node>) -> Result<(), Box<dyn Node>> {
        let value = value.take::<T>()?;
        self.push(value);
        Ok(())
    }

    #[inline]
    fn len(&self) -> usize {
        self.len()
    }
}

// -----------------------------------------------------------------------------
// Tests
