//! One-level equality for selector projections.
//!
//! A selector usually builds a fresh small record on every call, such as
//! `(state.name.clone(), state.stats.clone())`. Comparing those records by
//! reference would re-render on every notification; comparing them deeply
//! would be slow and would see through shared sub-trees. Shallow equality
//! sits in between: it looks at the record's own fields and compares each
//! one by [`Identity`], without recursing.
//!
//! - Primitives and strings are compared by value.
//! - `Arc`, `Rc` and [`Snapshot`] are compared by pointer.
//!
//! So two records `{ a: Arc(x: 1) }` built around different `Arc`s are
//! unequal even though the pointees match, while two records around the
//! same `Arc` are equal.

use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};
use std::rc::Rc;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::store::Snapshot;

/// Same reference, or same primitive value.
pub trait Identity {
    fn same(&self, other: &Self) -> bool;
}

/// Equality that inspects one level of fields by [`Identity`].
pub trait ShallowEq {
    fn shallow_eq(&self, other: &Self) -> bool;
}

macro_rules! by_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Identity for $ty {
                #[inline]
                fn same(&self, other: &Self) -> bool {
                    self == other
                }
            }

            impl ShallowEq for $ty {
                #[inline]
                fn shallow_eq(&self, other: &Self) -> bool {
                    self == other
                }
            }
        )*
    };
}

by_value!(
    (), bool, char,
    u8, u16, u32, u64, u128, usize,
    i8, i16, i32, i64, i128, isize,
    f32, f64,
    str, String, &str,
);

impl<T: ?Sized> Identity for Arc<T> {
    fn same(&self, other: &Self) -> bool {
        Arc::ptr_eq(self, other)
    }
}

impl<T: ?Sized> Identity for Rc<T> {
    fn same(&self, other: &Self) -> bool {
        Rc::ptr_eq(self, other)
    }
}

impl<S> Identity for Snapshot<S> {
    fn same(&self, other: &Self) -> bool {
        Snapshot::ptr_eq(self, other)
    }
}

impl<T: Identity> Identity for Option<T> {
    fn same(&self, other: &Self) -> bool {
        match (self, other) {
            (Some(a), Some(b)) => a.same(b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl<T: ShallowEq + ?Sized> ShallowEq for Arc<T> {
    fn shallow_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(self, other) || (**self).shallow_eq(other)
    }
}

impl<T: ShallowEq + ?Sized> ShallowEq for Rc<T> {
    fn shallow_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(self, other) || (**self).shallow_eq(other)
    }
}

impl<S: ShallowEq> ShallowEq for Snapshot<S> {
    fn shallow_eq(&self, other: &Self) -> bool {
        Snapshot::ptr_eq(self, other) || (**self).shallow_eq(other)
    }
}

impl<T: ShallowEq> ShallowEq for Option<T> {
    fn shallow_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Some(a), Some(b)) => a.shallow_eq(b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl<T: Identity> ShallowEq for [T] {
    fn shallow_eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().zip(other).all(|(a, b)| a.same(b))
    }
}

impl<T: Identity, const N: usize> ShallowEq for [T; N] {
    fn shallow_eq(&self, other: &Self) -> bool {
        self[..].shallow_eq(&other[..])
    }
}

impl<T: Identity> ShallowEq for Vec<T> {
    fn shallow_eq(&self, other: &Self) -> bool {
        self[..].shallow_eq(&other[..])
    }
}

impl<K, V, H> ShallowEq for IndexMap<K, V, H>
where
    K: Hash + Eq,
    V: Identity,
    H: BuildHasher,
{
    fn shallow_eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(key, value)| other.get(key).is_some_and(|theirs| value.same(theirs)))
    }
}

impl<K, V, H> ShallowEq for HashMap<K, V, H>
where
    K: Hash + Eq,
    V: Identity,
    H: BuildHasher,
{
    fn shallow_eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(key, value)| other.get(key).is_some_and(|theirs| value.same(theirs)))
    }
}

impl<K: Ord, V: Identity> ShallowEq for BTreeMap<K, V> {
    fn shallow_eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(key, value)| other.get(key).is_some_and(|theirs| value.same(theirs)))
    }
}

macro_rules! tuple_shallow_eq {
    ($($name:ident . $idx:tt),+) => {
        impl<$($name: Identity),+> ShallowEq for ($($name,)+) {
            fn shallow_eq(&self, other: &Self) -> bool {
                $(self.$idx.same(&other.$idx))&&+
            }
        }
    };
}

tuple_shallow_eq!(A.0);
tuple_shallow_eq!(A.0, B.1);
tuple_shallow_eq!(A.0, B.1, C.2);
tuple_shallow_eq!(A.0, B.1, C.2, D.3);
tuple_shallow_eq!(A.0, B.1, C.2, D.3, E.4);
tuple_shallow_eq!(A.0, B.1, C.2, D.3, E.4, F.5);
tuple_shallow_eq!(A.0, B.1, C.2, D.3, E.4, F.5, G.6);
tuple_shallow_eq!(A.0, B.1, C.2, D.3, E.4, F.5, G.6, H.7);

/// Implement [`ShallowEq`] for a record by comparing the listed fields
/// with [`Identity`].
///
/// ```rust
/// use std::sync::Arc;
/// use bey_core::impl_shallow_eq;
/// use bey_core::subscription::ShallowEq;
///
/// struct Badge {
///     name: String,
///     avatar: Arc<Vec<u8>>,
/// }
///
/// impl_shallow_eq!(Badge { name, avatar });
///
/// let avatar = Arc::new(vec![1, 2, 3]);
/// let a = Badge { name: "Ada".into(), avatar: avatar.clone() };
/// let b = Badge { name: "Ada".into(), avatar };
/// assert!(a.shallow_eq(&b));
/// ```
#[macro_export]
macro_rules! impl_shallow_eq {
    ($ty:ty { $($field:ident),+ $(,)? }) => {
        impl $crate::subscription::ShallowEq for $ty {
            fn shallow_eq(&self, other: &Self) -> bool {
                true $(&& $crate::subscription::Identity::same(&self.$field, &other.$field))+
            }
        }
    };
}
