use serde::{Deserialize, Serialize};

/// Typed `u32` index into an arena.
pub trait EntityRef: Copy + Ord + std::hash::Hash + std::fmt::Debug {
    fn new(index: u32) -> Self;
    fn index(self) -> u32;
}

/// Define a typed entity reference (a newtype over `u32`).
///
/// ```ignore
/// define_entity!(InstrId);
/// ```
#[macro_export]
macro_rules! define_entity {
    ($name:ident) => {
        #[derive(
            Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, serde::Serialize, serde::Deserialize,
        )]
        pub struct $name(u32);

        impl $crate::entity::EntityRef for $name {
            fn new(index: u32) -> Self {
                Self(index)
            }
            fn index(self) -> u32 {
                self.0
            }
        }
    };
}

/// Append-only arena keyed by entity references.
///
/// Keys are handed out densely in push order, so iteration order is creation
/// order. Serializes as a plain `Vec<V>`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrimaryMap<K: EntityRef, V> {
    elems: Vec<V>,
    #[serde(skip)]
    _phantom: std::marker::PhantomData<K>,
}

impl<K: EntityRef, V> Default for PrimaryMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: EntityRef, V> PrimaryMap<K, V> {
    pub fn new() -> Self {
        Self {
            elems: Vec::new(),
            _phantom: std::marker::PhantomData,
        }
    }

    /// Key that the next `push` will return.
    pub fn next_key(&self) -> K {
        K::new(self.elems.len() as u32)
    }

    pub fn push(&mut self, value: V) -> K {
        let key = self.next_key();
        self.elems.push(value);
        key
    }

    pub fn get(&self, key: K) -> Option<&V> {
        self.elems.get(key.index() as usize)
    }

    pub fn len(&self) -> usize {
        self.elems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elems.is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (K, &V)> {
        self.elems
            .iter()
            .enumerate()
            .map(|(i, v)| (K::new(i as u32), v))
    }

    pub fn keys(&self) -> impl DoubleEndedIterator<Item = K> {
        (0..self.elems.len() as u32).map(K::new)
    }

    pub fn values(&self) -> impl DoubleEndedIterator<Item = &V> {
        self.elems.iter()
    }
}

impl<K: EntityRef, V> std::ops::Index<K> for PrimaryMap<K, V> {
    type Output = V;
    fn index(&self, key: K) -> &V {
        &self.elems[key.index() as usize]
    }
}

/// Per-entity side table filled in by an analysis.
///
/// Absent entries read back as `V::default()` through [`SecondaryMap::get`],
/// so a sweep only has to write the entities it has something to say about.
#[derive(Debug, Clone)]
pub struct SecondaryMap<K: EntityRef, V> {
    elems: Vec<V>,
    default: V,
    _phantom: std::marker::PhantomData<K>,
}

impl<K: EntityRef, V: Default + Clone> Default for SecondaryMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: EntityRef, V: Default + Clone> SecondaryMap<K, V> {
    pub fn new() -> Self {
        Self {
            elems: Vec::new(),
            default: V::default(),
            _phantom: std::marker::PhantomData,
        }
    }

    /// Pre-size for `len` entities.
    pub fn with_len(len: usize) -> Self {
        Self {
            elems: vec![V::default(); len],
            default: V::default(),
            _phantom: std::marker::PhantomData,
        }
    }

    pub fn get(&self, key: K) -> &V {
        self.elems.get(key.index() as usize).unwrap_or(&self.default)
    }

    pub fn get_mut(&mut self, key: K) -> &mut V {
        let idx = key.index() as usize;
        if idx >= self.elems.len() {
            self.elems.resize_with(idx + 1, V::default);
        }
        &mut self.elems[idx]
    }

    pub fn insert(&mut self, key: K, value: V) {
        *self.get_mut(key) = value;
    }
}

impl<K: EntityRef, V: Default + Clone> std::ops::Index<K> for SecondaryMap<K, V> {
    type Output = V;
    fn index(&self, key: K) -> &V {
        self.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    crate::define_entity!(TestId);

    #[test]
    fn primary_map_keys_are_dense() {
        let mut map: PrimaryMap<TestId, &str> = PrimaryMap::new();
        assert_eq!(map.next_key(), TestId::new(0));
        let a = map.push("a");
        let b = map.push("b");
        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
        assert_eq!(map[b], "b");
        assert_eq!(map.keys().collect::<Vec<_>>(), vec![a, b]);
    }

    #[test]
    fn secondary_map_reads_default_when_absent() {
        let mut map: SecondaryMap<TestId, bool> = SecondaryMap::new();
        assert!(!map[TestId::new(7)]);
        map.insert(TestId::new(3), true);
        assert!(map[TestId::new(3)]);
        assert!(!map[TestId::new(2)]);
    }
}
