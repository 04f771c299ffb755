//! Containers for static storage of shape information.
//!
//! These back [`Shaped`](crate::info::Shaped) implementations:
//!
//! - [`ShapeCell`] for non-generic types. Internally an [`OnceLock`], almost
//!   no additional expense.
//! - [`GenericShapeCell`] / [`GenericNameCell`] for generic types, whose
//!   `static CELL` inside the function is shared by every instantiation.
//!   These key the stored value by [`TypeId`] behind an [`RwLock`].

use alloc::boxed::Box;
use alloc::string::String;
use core::any::{Any, TypeId};
use std::sync::{OnceLock, PoisonError, RwLock};

use nl_utils::TypeIdMap;

use crate::info::ShapeInfo;

mod sealed {
    use super::ShapeInfo;
    use alloc::string::String;
    pub trait ShapeProperty: 'static {}

    impl ShapeProperty for String {}
    impl ShapeProperty for ShapeInfo {}
}

use sealed::ShapeProperty;

// -----------------------------------------------------------------------------
// ShapeCell

/// Container for the static shape of a non-generic type.
///
/// ## Example
///
/// ```ignore
/// impl Shaped for Socket {
///     fn shape_info() -> &'static ShapeInfo {
///         static CELL: ShapeCell = ShapeCell::new();
///         CELL.get_or_init(|| {
///             ShapeInfo::object::<Socket>("Socket", [
///                 MemberInfo::new::<String>("label"),
///             ])
///         })
///     }
/// }
/// ```
pub struct ShapeCell(OnceLock<ShapeInfo>);

impl ShapeCell {
    /// Create an empty cell.
    #[inline]
    pub const fn new() -> Self {
        Self(OnceLock::new())
    }

    /// Returns the stored shape, building it with `f` on first access.
    #[inline]
    pub fn get_or_init<F>(&self, f: F) -> &ShapeInfo
    where
        F: FnOnce() -> ShapeInfo,
    {
        self.0.get_or_init(f)
    }
}

impl Default for ShapeCell {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

// -----------------------------------------------------------------------------
// GenericCell

/// Container for static storage of per-instantiation data of a generic type.
///
/// See [`GenericShapeCell`] and [`GenericNameCell`].
pub struct GenericCell<T: ShapeProperty>(RwLock<TypeIdMap<&'static T>>);

/// Container for the static shapes of a generic type's instantiations.
///
/// ## Example
///
/// ```ignore
/// impl<T: Node + Shaped + Clone> Shaped for Vec<T> {
///     fn shape_info() -> &'static ShapeInfo {
///         static CELL: GenericShapeCell = GenericShapeCell::new();
///         CELL.get_or_insert::<Self>(|| {
///             ShapeInfo::sequence::<Self>(/* ... */)
///         })
///     }
/// }
/// ```
pub type GenericShapeCell = GenericCell<ShapeInfo>;

/// Container for the leaked display names of a generic type's
/// instantiations, e.g. `Vec<i32>`.
pub type GenericNameCell = GenericCell<String>;

impl<T: ShapeProperty> GenericCell<T> {
    /// Create an empty cell.
    #[inline]
    pub const fn new() -> Self {
        Self(RwLock::new(TypeIdMap::new()))
    }

    /// Returns the value stored for type `G`, building it with `f` on first
    /// access.
    #[inline(always)]
    pub fn get_or_insert<G: Any + ?Sized>(&self, f: impl FnOnce() -> T) -> &T {
        // Separate to reduce code compilation times
        self.get_or_insert_by_type_id(TypeId::of::<G>(), f)
    }

    // Separate to reduce code compilation times
    #[inline(never)]
    fn get_or_insert_by_type_id(&self, type_id: TypeId, f: impl FnOnce() -> T) -> &T {
        match self.get_by_type_id(type_id) {
            Some(value) => value,
            None => self.insert_by_type_id(type_id, f()),
        }
    }

    // Separate to reduce code compilation times
    #[inline(never)]
    fn get_by_type_id(&self, type_id: TypeId) -> Option<&T> {
        self.0
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&type_id)
            .copied()
    }

    // Separate to reduce code compilation times
    #[inline(never)]
    fn insert_by_type_id(&self, type_id: TypeId, value: T) -> &T {
        self.0
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .get_or_insert(type_id, || Box::leak(Box::new(value)))
    }
}

impl<T: ShapeProperty> Default for GenericCell<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}
