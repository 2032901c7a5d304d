//! Object pools keyed by prototype identity.
//!
//! `ObjectPool<T>` is a free list plus a count of instances ever created. Acquire never fails:
//! an empty free list creates a fresh instance and the pool keeps it forever. `PoolSet` holds
//! one pool per prototype and warms each to the same size the first time it is touched.

use std::hash::Hash;

use bevy::platform::collections::HashMap;
use bevy::prelude::*;

use super::components::PrototypeId;

#[derive(Debug, Clone)]
pub struct ObjectPool<T> {
    free: Vec<T>,
    created: usize,
}

impl<T> Default for ObjectPool<T> {
    fn default() -> Self {
        Self { free: Vec::new(), created: 0 }
    }
}

impl<T> ObjectPool<T> {
    pub fn warmed(size: usize, mut make: impl FnMut() -> T) -> Self {
        let mut pool = Self { free: Vec::with_capacity(size), created: 0 };
        for _ in 0..size {
            let item = make();
            pool.created += 1;
            pool.free.push(item);
        }
        pool
    }

    /// Pop a free instance, or create one if none is free.
    pub fn acquire(&mut self, make: impl FnOnce() -> T) -> T {
        match self.free.pop() {
            Some(item) => item,
            None => {
                self.created += 1;
                make()
            }
        }
    }

    pub fn release(&mut self, item: T) {
        self.free.push(item);
    }

    #[inline]
    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    #[inline]
    pub fn created(&self) -> usize {
        self.created
    }

    #[inline]
    pub fn in_use(&self) -> usize {
        self.created - self.free.len()
    }
}

#[derive(Debug, Clone)]
pub struct PoolSet<K, T> {
    warm_size: usize,
    pools: HashMap<K, ObjectPool<T>>,
}

impl<K: Eq + Hash + Clone, T> PoolSet<K, T> {
    pub fn new(warm_size: usize) -> Self {
        Self { warm_size: warm_size.max(1), pools: HashMap::default() }
    }

    #[inline]
    pub fn warm_size(&self) -> usize {
        self.warm_size
    }

    /// The pool for `key`, warmed with `make` on first use.
    pub fn pool_mut(&mut self, key: &K, make: impl FnMut() -> T) -> &mut ObjectPool<T> {
        let warm = self.warm_size;
        self.pools
            .entry(key.clone())
            .or_insert_with(|| ObjectPool::warmed(warm, make))
    }

    pub fn acquire(&mut self, key: &K, mut make: impl FnMut() -> T) -> T {
        let pool = self.pool_mut(key, &mut make);
        pool.acquire(make)
    }

    pub fn release(&mut self, key: &K, item: T) {
        self.pools.entry(key.clone()).or_default().release(item);
    }

    #[inline]
    pub fn get(&self, key: &K) -> Option<&ObjectPool<T>> {
        self.pools.get(key)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.pools.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }
}

/// The projectile pools. Only the shooter allocator acquires and only the return commit
/// releases.
#[derive(Resource, Debug, Deref, DerefMut)]
pub struct ProjectilePools(pub PoolSet<PrototypeId, Entity>);

impl ProjectilePools {
    pub fn new(warm_size: usize) -> Self {
        Self(PoolSet::new(warm_size))
    }
}
