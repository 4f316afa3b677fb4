use std::collections::HashMap;

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Named RNG streams derived from one master seed, so breeding draws don't
/// shift when an unrelated concern starts consuming randomness.
pub struct RngManager {
    master: ChaCha8Rng,
    streams: HashMap<String, ChaCha8Rng>,
}

impl RngManager {
    pub fn new(seed: u64) -> Self {
        Self {
            master: ChaCha8Rng::seed_from_u64(seed),
            streams: HashMap::new(),
        }
    }

    pub fn from_entropy() -> Self {
        Self::new(rand::random())
    }

    pub fn stream(&mut self, name: &str) -> StreamRng<'_> {
        let master = &mut self.master;
        let entry = self.streams.entry(name.to_string()).or_insert_with(|| {
            let mut seed_bytes = [0u8; 8];
            master.fill_bytes(&mut seed_bytes);
            ChaCha8Rng::seed_from_u64(u64::from_le_bytes(seed_bytes))
        });
        StreamRng { inner: entry }
    }
}

pub struct StreamRng<'a> {
    inner: &'a mut ChaCha8Rng,
}

impl<'a> RngCore for StreamRng<'a> {
    fn next_u32(&mut self) -> u32 {
        self.inner.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.inner.fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.inner.try_fill_bytes(dest)
    }
}
