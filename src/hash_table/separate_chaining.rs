// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy of the MPL was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
use std::borrow::Borrow;
use std::collections::hash_map::RandomState;
use std::hash::{BuildHasher, Hash};
use std::iter;
use std::mem;

use super::{bucket_index, hash_key};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChainingConfig {
    /// Initial number of buckets.
    pub capacity: usize,
    /// The table doubles once `len / capacity` goes above this.
    pub max_load: f64,
}

impl Default for ChainingConfig {
    fn default() -> Self {
        Self {
            capacity: 100,
            max_load: 0.75,
        }
    }
}

impl ChainingConfig {
    fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(Error::InvalidConfig("capacity must be at least 1".into()));
        }
        if self.max_load.is_nan() || self.max_load <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "max load must be positive, got {}",
                self.max_load
            )));
        }
        Ok(())
    }
}

type Link<K, V> = Option<Box<Entry<K, V>>>;

struct Entry<K, V> {
    key: K,
    hash: u64,
    value: V,
    next: Link<K, V>,
}

impl<K, V> Entry<K, V> {
    fn matches<Q>(&self, hash: u64, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        self.hash == hash && self.key.borrow() == key
    }
}

fn chain<K, V>(link: &Link<K, V>) -> impl Iterator<Item = &Entry<K, V>> {
    iter::successors(link.as_deref(), |entry| entry.next.as_deref())
}

fn empty_buckets<K, V>(capacity: usize) -> Vec<Link<K, V>> {
    iter::repeat_with(|| None).take(capacity).collect()
}

/// A hash map resolving collisions with a singly linked chain per bucket.
///
/// New entries are pushed at the head of their chain. Whenever an insert
/// pushes the load over the configured threshold the bucket array doubles
/// and every entry is moved to the bucket its stored hash maps to.
pub struct ChainedHashTable<K, V, S = RandomState> {
    buckets: Vec<Link<K, V>>,
    len: usize,
    max_load: f64,
    hasher: S,
}

impl<K, V> ChainedHashTable<K, V, RandomState> {
    pub fn new() -> Self {
        Self::with_hasher(RandomState::new())
    }

    pub fn with_config(config: ChainingConfig) -> Result<Self> {
        Self::with_config_and_hasher(config, RandomState::new())
    }
}

impl<K, V> Default for ChainedHashTable<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> ChainedHashTable<K, V, S> {
    pub fn with_hasher(hasher: S) -> Self {
        let config = ChainingConfig::default();
        Self {
            buckets: empty_buckets(config.capacity),
            len: 0,
            max_load: config.max_load,
            hasher,
        }
    }

    pub fn with_config_and_hasher(config: ChainingConfig, hasher: S) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            buckets: empty_buckets(config.capacity),
            len: 0,
            max_load: config.max_load,
            hasher,
        })
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of buckets.
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    pub fn load(&self) -> f64 {
        self.len as f64 / self.capacity() as f64
    }

    /// Length of the chain hanging off `bucket`, zero for a bucket outside
    /// the table.
    pub fn chain_len(&self, bucket: usize) -> usize {
        self.buckets.get(bucket).map_or(0, |link| chain(link).count())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.buckets
            .iter()
            .flat_map(|link| chain(link))
            .map(|entry| (&entry.key, &entry.value))
    }
}

impl<K, V, S> ChainedHashTable<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    /// Inserts or updates `key`, returning the value it replaced.
    pub fn set(&mut self, key: K, value: V) -> Option<V> {
        let hash = hash_key(&self.hasher, &key);
        let index = bucket_index(hash, self.capacity());

        let mut cursor = self.buckets[index].as_deref_mut();
        while let Some(entry) = cursor {
            if entry.matches(hash, &key) {
                return Some(mem::replace(&mut entry.value, value));
            }
            cursor = entry.next.as_deref_mut();
        }

        let head = self.buckets[index].take();
        if head.is_some() {
            log::trace!("collision in bucket {index}");
        }
        self.buckets[index] = Some(Box::new(Entry {
            key,
            hash,
            value,
            next: head,
        }));
        self.len += 1;
        self.grow_if_overloaded();
        None
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = hash_key(&self.hasher, key);
        let index = bucket_index(hash, self.capacity());
        chain(&self.buckets[index])
            .find(|entry| entry.matches(hash, key))
            .map(|entry| &entry.value)
    }

    pub fn get_or<'a, Q>(&'a self, key: &Q, default: &'a V) -> &'a V
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get(key).unwrap_or(default)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get(key).is_some()
    }

    /// Unlinks `key` from its chain. An emptied chain leaves the bucket
    /// empty.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = hash_key(&self.hasher, key);
        let index = bucket_index(hash, self.capacity());

        let mut link = &mut self.buckets[index];
        while link
            .as_ref()
            .map_or(false, |entry| !entry.matches(hash, key))
        {
            link = &mut link.as_mut()?.next;
        }
        let removed = link.take()?;
        let Entry { value, next, .. } = *removed;
        *link = next;
        self.len -= 1;
        Some(value)
    }

    fn grow_if_overloaded(&mut self) {
        if self.load() <= self.max_load {
            return;
        }
        let capacity = self.capacity() * 2;
        log::debug!(
            "resizing chained table from {} to {capacity} buckets ({} items)",
            self.capacity(),
            self.len
        );
        // every entry moves: its bucket depends on the capacity
        let old = mem::replace(&mut self.buckets, empty_buckets(capacity));
        for mut link in old {
            while let Some(mut entry) = link {
                link = entry.next.take();
                let index = bucket_index(entry.hash, capacity);
                entry.next = self.buckets[index].take();
                self.buckets[index] = Some(entry);
            }
        }
    }
}

impl<K, V, S> Drop for ChainedHashTable<K, V, S> {
    fn drop(&mut self) {
        // unlink iteratively so long chains cannot overflow the stack
        for bucket in self.buckets.iter_mut() {
            let mut link = bucket.take();
            while let Some(mut entry) = link {
                link = entry.next.take();
            }
        }
    }
}
