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
pub struct ProbingConfig {
    /// Initial number of slots.
    pub capacity: usize,
    /// The table doubles once `len / capacity` goes above this.
    pub max_load: f64,
    /// Fraction of the capacity a single probe sequence may visit.
    pub probe_ratio: f64,
}

impl Default for ProbingConfig {
    fn default() -> Self {
        Self {
            capacity: 100,
            max_load: 0.65,
            probe_ratio: 0.75,
        }
    }
}

impl ProbingConfig {
    fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(Error::InvalidConfig("capacity must be at least 1".into()));
        }
        if !(self.max_load > 0.0 && self.max_load <= 1.0) {
            return Err(Error::InvalidConfig(format!(
                "max load must be in (0, 1], got {}",
                self.max_load
            )));
        }
        if !(self.probe_ratio > 0.0 && self.probe_ratio <= 1.0) {
            return Err(Error::InvalidConfig(format!(
                "probe ratio must be in (0, 1], got {}",
                self.probe_ratio
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Slot<K, V> {
    Empty,
    Tombstone,
    Occupied { hash: u64, key: K, value: V },
}

enum Probe {
    Found(usize),
    Vacant(usize),
    Exhausted,
}

fn empty_slots<K, V>(capacity: usize) -> Vec<Slot<K, V>> {
    iter::repeat_with(|| Slot::Empty).take(capacity).collect()
}

/// A hash map storing entries inline, resolving collisions by linear
/// probing.
///
/// Removal leaves a tombstone so that keys placed further along the probe
/// sequence stay reachable; inserts reuse the first tombstone they pass.
/// Tombstones are only cleared when the table grows. A probe sequence is
/// capped at `probe_ratio * capacity` slots: an insert that runs past the
/// cap grows the table and starts over, while a lookup or removal that
/// runs past it fails with [`Error::ProbeLimitExceeded`].
pub struct ProbingHashTable<K, V, S = RandomState> {
    slots: Vec<Slot<K, V>>,
    len: usize,
    tombstones: usize,
    max_load: f64,
    probe_ratio: f64,
    hasher: S,
}

impl<K, V> ProbingHashTable<K, V, RandomState> {
    pub fn new() -> Self {
        Self::with_hasher(RandomState::new())
    }

    pub fn with_config(config: ProbingConfig) -> Result<Self> {
        Self::with_config_and_hasher(config, RandomState::new())
    }
}

impl<K, V> Default for ProbingHashTable<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> ProbingHashTable<K, V, S> {
    pub fn with_hasher(hasher: S) -> Self {
        let config = ProbingConfig::default();
        Self {
            slots: empty_slots(config.capacity),
            len: 0,
            tombstones: 0,
            max_load: config.max_load,
            probe_ratio: config.probe_ratio,
            hasher,
        }
    }

    pub fn with_config_and_hasher(config: ProbingConfig, hasher: S) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            slots: empty_slots(config.capacity),
            len: 0,
            tombstones: 0,
            max_load: config.max_load,
            probe_ratio: config.probe_ratio,
            hasher,
        })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of slots.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn load(&self) -> f64 {
        self.len as f64 / self.capacity() as f64
    }

    pub fn tombstones(&self) -> usize {
        self.tombstones
    }

    pub fn probe_limit(&self) -> usize {
        ((self.capacity() as f64 * self.probe_ratio) as usize).max(1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.slots.iter().filter_map(|slot| match slot {
            Slot::Occupied { key, value, .. } => Some((key, value)),
            Slot::Empty | Slot::Tombstone => None,
        })
    }

    fn grow(&mut self) {
        let capacity = self.capacity() * 2;
        log::debug!(
            "resizing probing table from {} to {capacity} slots ({} items, {} tombstones dropped)",
            self.capacity(),
            self.len,
            self.tombstones
        );
        let old = mem::replace(&mut self.slots, empty_slots(capacity));
        self.tombstones = 0;
        for slot in old {
            if let Slot::Occupied { hash, key, value } = slot {
                let mut index = bucket_index(hash, capacity);
                while !matches!(self.slots[index], Slot::Empty) {
                    index = (index + 1) % capacity;
                }
                self.slots[index] = Slot::Occupied { hash, key, value };
            }
        }
    }

    fn grow_if_overloaded(&mut self) {
        if self.load() > self.max_load {
            self.grow();
        }
    }
}

impl<K, V, S> ProbingHashTable<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    /// Inserts or updates `key`, returning the value it replaced.
    pub fn set(&mut self, key: K, value: V) -> Option<V> {
        let hash = hash_key(&self.hasher, &key);
        loop {
            match self.probe_for_insert(hash, &key) {
                Probe::Found(index) => {
                    return match &mut self.slots[index] {
                        Slot::Occupied {
                            value: existing, ..
                        } => Some(mem::replace(existing, value)),
                        Slot::Empty | Slot::Tombstone => None,
                    };
                }
                Probe::Vacant(index) => {
                    if matches!(self.slots[index], Slot::Tombstone) {
                        self.tombstones -= 1;
                    }
                    self.slots[index] = Slot::Occupied { hash, key, value };
                    self.len += 1;
                    self.grow_if_overloaded();
                    return None;
                }
                Probe::Exhausted => {
                    log::trace!(
                        "probe limit {} reached while inserting, growing",
                        self.probe_limit()
                    );
                    self.grow();
                }
            }
        }
    }

    pub fn get<Q>(&self, key: &Q) -> Result<Option<&V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let index = self.probe_for_lookup(key)?;
        Ok(index.and_then(|index| match &self.slots[index] {
            Slot::Occupied { value, .. } => Some(value),
            Slot::Empty | Slot::Tombstone => None,
        }))
    }

    pub fn get_or<'a, Q>(&'a self, key: &Q, default: &'a V) -> Result<&'a V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        Ok(self.get(key)?.unwrap_or(default))
    }

    pub fn contains_key<Q>(&self, key: &Q) -> Result<bool>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        Ok(self.probe_for_lookup(key)?.is_some())
    }

    /// Slot currently holding `key`.
    pub fn position<Q>(&self, key: &Q) -> Result<Option<usize>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.probe_for_lookup(key)
    }

    /// Replaces `key`'s slot with a tombstone and returns its value.
    pub fn remove<Q>(&mut self, key: &Q) -> Result<Option<V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let Some(index) = self.probe_for_lookup(key)? else {
            return Ok(None);
        };
        match mem::replace(&mut self.slots[index], Slot::Tombstone) {
            Slot::Occupied { value, .. } => {
                self.len -= 1;
                self.tombstones += 1;
                Ok(Some(value))
            }
            other => {
                self.slots[index] = other;
                Ok(None)
            }
        }
    }

    fn probe_for_insert(&self, hash: u64, key: &K) -> Probe {
        let capacity = self.capacity();
        let start = bucket_index(hash, capacity);
        let mut first_tombstone = None;
        for step in 0..self.probe_limit() {
            let index = (start + step) % capacity;
            match &self.slots[index] {
                Slot::Empty => return Probe::Vacant(first_tombstone.unwrap_or(index)),
                Slot::Tombstone => {
                    if first_tombstone.is_none() {
                        first_tombstone = Some(index);
                    }
                }
                Slot::Occupied {
                    hash: existing_hash,
                    key: existing_key,
                    ..
                } => {
                    if *existing_hash == hash && existing_key == key {
                        return Probe::Found(index);
                    }
                }
            }
        }
        Probe::Exhausted
    }

    fn probe_for_lookup<Q>(&self, key: &Q) -> Result<Option<usize>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = hash_key(&self.hasher, key);
        let capacity = self.capacity();
        let start = bucket_index(hash, capacity);
        let limit = self.probe_limit();
        for step in 0..limit {
            let index = (start + step) % capacity;
            match &self.slots[index] {
                Slot::Empty => return Ok(None),
                Slot::Tombstone => {}
                Slot::Occupied {
                    hash: existing_hash,
                    key: existing_key,
                    ..
                } => {
                    if *existing_hash == hash && existing_key.borrow() == key {
                        return Ok(Some(index));
                    }
                }
            }
        }
        Err(Error::ProbeLimitExceeded { capacity, limit })
    }
}
