//! The widening-conversion table for numeric leaf types.
//!
//! When a caller requests a numeric value as a different numeric type, the
//! compiler routes the access through `f64` using this table instead of
//! failing with a type mismatch.

use alloc::boxed::Box;
use core::any::TypeId;
use std::sync::OnceLock;

use nl_utils::TypeIdMap;

use crate::node::Node;

/// The conversion hooks registered for one numeric type.
pub(crate) struct NumericVtable {
    /// Reads the value out of a node of this type as `f64`.
    ///
    /// Returns `None` if the node is not actually of this type.
    pub to_f64: fn(&dyn Node) -> Option<f64>,
    /// Builds a node of this type from an `f64`, saturating on overflow.
    pub from_f64: fn(f64) -> Box<dyn Node>,
}

macro_rules! numeric_entry {
    ($table:ident, $ty:ty) => {
        $table.insert(
            TypeId::of::<$ty>(),
            NumericVtable {
                to_f64: |node| node.downcast_ref::<$ty>().map(|value| *value as f64),
                from_f64: |value| Box::new(value as $ty),
            },
        );
    };
}

fn table() -> &'static TypeIdMap<NumericVtable> {
    static TABLE: OnceLock<TypeIdMap<NumericVtable>> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut table = TypeIdMap::new();
        numeric_entry!(table, i8);
        numeric_entry!(table, i16);
        numeric_entry!(table, i32);
        numeric_entry!(table, i64);
        numeric_entry!(table, isize);
        numeric_entry!(table, u8);
        numeric_entry!(table, u16);
        numeric_entry!(table, u32);
        numeric_entry!(table, u64);
        numeric_entry!(table, usize);
        numeric_entry!(table, f32);
        numeric_entry!(table, f64);
        table
    })
}

/// Returns the conversion hooks for `ty_id`, if it is a numeric leaf type.
pub(crate) fn numeric_vtable(ty_id: TypeId) -> Option<&'static NumericVtable> {
    table().get(&ty_id)
}

/// Returns `true` if both types are numeric leaf types.
pub(crate) fn numeric_pair(a: TypeId, b: TypeId) -> bool {
    let table = table();
    table.contains(&a) && table.contains(&b)
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{numeric_pair, numeric_vtable};
    use crate::node::Node;
    use core::any::TypeId;

    #[test]
    fn round_trips_through_f64() {
        let vtable = numeric_vtable(TypeId::of::<i32>()).unwrap();
        let node: &dyn Node = &41_i32;
        let widened = (vtable.to_f64)(node).unwrap();
        assert_eq!(widened, 41.0);

        let rebuilt = (vtable.from_f64)(widened + 1.0);
        assert_eq!(rebuilt.take::<i32>().unwrap(), 42);
    }

    #[test]
    fn non_numeric_types_are_absent() {
        assert!(numeric_vtable(TypeId::of::<bool>()).is_none());
        assert!(numeric_vtable(TypeId::of::<String>()).is_none());
        assert!(numeric_pair(TypeId::of::<u8>(), TypeId::of::<f32>()));
        assert!(!numeric_pair(TypeId::of::<u8>(), TypeId::of::<char>()));
    }
}
