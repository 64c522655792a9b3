// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy of the MPL was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
mod open_addressing;
mod separate_chaining;
pub use open_addressing::*;
pub use separate_chaining::*;

use std::hash::{BuildHasher, Hash};

/// `u64` hashes are already non-negative, so reducing modulo the capacity
/// is enough to get a bucket index.
fn hash_key<Q, S>(hasher: &S, key: &Q) -> u64
where
    Q: Hash + ?Sized,
    S: BuildHasher,
{
    hasher.hash_one(key)
}

fn bucket_index(hash: u64, capacity: usize) -> usize {
    (hash % capacity as u64) as usize
}

#[cfg(test)]
pub(crate) mod test_hasher {
    use std::hash::{BuildHasherDefault, Hasher};

    /// Hashes integers to themselves so tests can choose bucket positions.
    #[derive(Default)]
    pub struct IdentityHasher(u64);

    impl Hasher for IdentityHasher {
        fn finish(&self) -> u64 {
            self.0
        }

        fn write(&mut self, bytes: &[u8]) {
            for &b in bytes {
                self.0 = (self.0 << 8) | u64::from(b);
            }
        }

        fn write_u64(&mut self, n: u64) {
            self.0 = n;
        }
    }

    pub type Identity = BuildHasherDefault<IdentityHasher>;

    /// Sends every key to the same bucket.
    #[derive(Default)]
    pub struct ConstantHasher;

    impl Hasher for ConstantHasher {
        fn finish(&self) -> u64 {
            1
        }

        fn write(&mut self, _bytes: &[u8]) {}
    }

    pub type Constant = BuildHasherDefault<ConstantHasher>;
}
