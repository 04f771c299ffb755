use alloc::sync::Arc;
use core::any::TypeId;
use core::fmt;
use std::sync::{PoisonError, RwLock};

use nl_utils::hash::HashMap;

use crate::access::compile::{self, Accessor, ValueShape};
use crate::access::error::AccessErrorKind;
use crate::info::ShapeInfo;
use crate::path::Segment;

// -----------------------------------------------------------------------------
// AccessorCache

/// The memoization table for compiled [`Accessor`]s.
///
/// Keyed by (owner type, segment, value type); only successful compilations
/// are stored, so a failing access recompiles (and re-fails) each time while
/// the table stays bounded by the set of accesses that actually work.
///
/// The cache is internally synchronized and can be shared between threads;
/// concurrent warm-up of the same key may compile twice, but every caller
/// observes the same stored accessor afterwards.
pub struct AccessorCache {
    table: RwLock<HashMap<Key, Arc<Accessor>>>,
}

#[derive(Clone, PartialEq, Eq, Hash)]
struct Key {
    owner: TypeId,
    segment: Segment,
    value: Option<TypeId>,
}

impl AccessorCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self {
            table: RwLock::new(HashMap::default()),
        }
    }

    /// Returns the accessor for the given triple, compiling it on first use.
    ///
    /// # Errors
    ///
    /// Forwards compilation failures; these are never cached.
    pub fn get_or_compile(
        &self,
        owner: &'static ShapeInfo,
        segment: &Segment,
        value: &ValueShape,
    ) -> Result<Arc<Accessor>, AccessErrorKind> {
        let key = Key {
            owner: owner.ty_id(),
            segment: segment.clone(),
            value: value.key(),
        };
        {
            let table = self.table.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(accessor) = table.get(&key) {
                return Ok(accessor.clone());
            }
        }

        let accessor = Arc::new(compile::compile(owner, segment, value)?);
        log::debug!(
            "compiled accessor for `{}`::`{segment}` as `{value}`",
            owner.name()
        );

        let mut table = self.table.write().unwrap_or_else(PoisonError::into_inner);
        Ok(table.entry(key).or_insert(accessor).clone())
    }

    /// Drops every cached accessor.
    pub fn clear(&self) {
        let mut table = self.table.write().unwrap_or_else(PoisonError::into_inner);
        log::debug!("cleared {} cached accessors", table.len());
        table.clear();
    }

    /// Drops the cached accessors compiled against the given owner type.
    ///
    /// Used when a shape's live layout is invalidated, without paying for a
    /// full rebuild of every other shape's routines.
    pub fn clear_shape(&self, owner: TypeId) {
        self.table
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|key, _| key.owner != owner);
    }

    /// Returns the number of cached accessors.
    pub fn len(&self) -> usize {
        self.table
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns `true` if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for AccessorCache {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AccessorCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessorCache")
            .field("len", &self.len())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::AccessorCache;
    use crate::access::compile::ValueShape;
    use crate::info::Shaped;
    use crate::path::Segment;
    use core::any::TypeId;

    use crate::derive::NodeShape;

    #[derive(NodeShape, Clone)]
    struct Holder {
        value: i32,
    }

    #[test]
    fn compiles_once_per_key() {
        let cache = AccessorCache::new();
        let segment = Segment::field("value");

        let a = cache
            .get_or_compile(Holder::shape_info(), &segment, &ValueShape::Any)
            .unwrap();
        let b = cache
            .get_or_compile(Holder::shape_info(), &segment, &ValueShape::Any)
            .unwrap();

        assert!(alloc::sync::Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn value_shape_is_part_of_the_key() {
        let cache = AccessorCache::new();
        let segment = Segment::field("value");

        cache
            .get_or_compile(Holder::shape_info(), &segment, &ValueShape::Any)
            .unwrap();
        cache
            .get_or_compile(Holder::shape_info(), &segment, &ValueShape::of::<i32>())
            .unwrap();

        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn failures_are_not_cached() {
        let cache = AccessorCache::new();
        let segment = Segment::field("missing");

        assert!(
            cache
                .get_or_compile(Holder::shape_info(), &segment, &ValueShape::Any)
                .is_err()
        );
        assert!(cache.is_empty());
    }

    #[test]
    fn recompiling_after_clear_gives_the_same_results() {
        let cache = AccessorCache::new();
        let segment = Segment::field("value");
        let mut holder = Holder { value: 3 };

        let accessor = cache
            .get_or_compile(Holder::shape_info(), &segment, &ValueShape::Any)
            .unwrap();
        assert_eq!(
            accessor.read(&holder).unwrap().downcast_ref::<i32>(),
            Some(&3)
        );
        accessor.write(&mut holder, Box::new(4_i32)).unwrap();

        cache.clear();
        assert!(cache.is_empty());

        let recompiled = cache
            .get_or_compile(Holder::shape_info(), &segment, &ValueShape::Any)
            .unwrap();
        assert_eq!(
            recompiled.read(&holder).unwrap().downcast_ref::<i32>(),
            Some(&4)
        );
        recompiled.write(&mut holder, Box::new(5_i32)).unwrap();
        assert_eq!(holder.value, 5);
    }

    #[test]
    fn clear_shape_is_selective() {
        let cache = AccessorCache::new();
        cache
            .get_or_compile(Holder::shape_info(), &Segment::field("value"), &ValueShape::Any)
            .unwrap();
        cache
            .get_or_compile(<Vec<i32>>::shape_info(), &Segment::Index(0), &ValueShape::Any)
            .unwrap();

        cache.clear_shape(TypeId::of::<Holder>());
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn shared_warm_up() {
        use alloc::sync::Arc;

        let cache = Arc::new(AccessorCache::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let cache = cache.clone();
                std::thread::spawn(move || {
                    cache
                        .get_or_compile(
                            Holder::shape_info(),
                            &Segment::field("value"),
                            &ValueShape::Any,
                        )
                        .unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(cache.len(), 1);
    }
}
