use std::marker::PhantomData;

/// Hands out sequential keys, starting at zero. Keys are never recycled, so
/// a key that has been handed out can't be confused with a newer one while
/// stale references to it are still in flight.
pub struct KeyGenerator<K: From<u32>> {
    next_index: u64,
    limit: u32,
    phantom_k: PhantomData<K>,
}

impl<K: From<u32>> KeyGenerator<K> {
    pub fn new() -> Self {
        Self::with_limit(u32::MAX)
    }

    /// `limit` is the largest key that will be generated
    pub fn with_limit(limit: u32) -> Self {
        Self {
            next_index: 0,
            limit,
            phantom_k: PhantomData,
        }
    }

    /// Returns the next key, or None once every key up to the limit has
    /// been issued
    pub fn generate(&mut self) -> Option<K> {
        let output = u32::try_from(self.next_index).ok()?;
        if output > self.limit {
            return None;
        }
        self.next_index += 1;
        Some(K::from(output))
    }

    /// How many keys have been issued so far
    pub fn issued(&self) -> u64 {
        self.next_index
    }
}

impl<K: From<u32>> Default for KeyGenerator<K> {
    fn default() -> Self {
        Self::new()
    }
}
