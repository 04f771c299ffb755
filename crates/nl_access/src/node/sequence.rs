use alloc::boxed::Box;

use crate::node::Node;

// -----------------------------------------------------------------------------
// Sequence

/// A node shape holding an ordered, homogeneous collection of elements.
///
/// The engine bounds-checks every index against [`len`] before calling the
/// positional methods, so implementations may treat an out-of-range index as
/// a logic error.
///
/// [`len`]: Sequence::len
pub trait Sequence: Node {
    /// Returns the element at `index`.
    fn element(&self, index: usize) -> Option<&dyn Node>;

    /// Returns the element at `index` mutably.
    fn element_mut(&mut self, index: usize) -> Option<&mut dyn Node>;

    /// Replaces the element at `index` with `value`.
    ///
    /// Fails with the rejected box if `value` is not of the element type.
    fn set_element(&mut self, index: usize, value: Box<dyn Node>)
    -> Result<(), Box<dyn Node>>;

    /// Inserts `value` at `index`, shifting subsequent elements.
    ///
    /// Fails with the rejected box if `value` is not of the element type.
    fn insert_element(
        &mut self,
        index: usize,
        value: Box<dyn Node>,
    ) -> Result<(), Box<dyn Node>>;

    /// Removes and returns the element at `index`, shifting subsequent
    /// elements down by one.
    ///
    /// # Panics
    ///
    /// May panic if `index >= len()`; the engine never calls it that way.
    fn remove_element(&mut self, index: usize) -> Box<dyn Node>;

    /// Appends `value` to the end of the collection.
    ///
    /// Fails with the rejected box if `value` is not of the element type.
    fn push_element(&mut self, value: Box<dyn Node>) -> Result<(), Box<dyn Node>>;

    /// Returns the number of elements.
    fn len(&self) -> usize;

    /// Returns `true` if the collection holds no elements.
    #[inline]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
