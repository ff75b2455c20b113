use std::collections::HashMap;

use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Hands each system its own ChaCha8 stream, derived from the scenario seed
/// in the order systems first ask for one.
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

    pub fn stream(&mut self, name: &str) -> SystemRng<'_> {
        let master = &mut self.master;
        let entry = self.streams.entry(name.to_string()).or_insert_with(|| {
            let mut seed_bytes = [0u8; 8];
            master.fill_bytes(&mut seed_bytes);
            ChaCha8Rng::seed_from_u64(u64::from_le_bytes(seed_bytes))
        });
        SystemRng { inner: entry }
    }
}

/// Randomness handed to a system for one run. Wraps either a managed stream
/// or a caller-supplied source.
pub struct SystemRng<'a> {
    inner: &'a mut dyn RngCore,
}

impl<'a> SystemRng<'a> {
    pub fn borrowed(inner: &'a mut dyn RngCore) -> Self {
        Self { inner }
    }
}

impl<'a> RngCore for SystemRng<'a> {
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

pub trait RngExt {
    /// `true` with probability `p`.
    fn chance(&mut self, p: f64) -> bool;
    fn uniform(&mut self, min: f64, max: f64) -> f64;
}

impl<R: RngCore + ?Sized> RngExt for R {
    fn chance(&mut self, p: f64) -> bool {
        self.gen::<f64>() < p
    }

    fn uniform(&mut self, min: f64, max: f64) -> f64 {
        min + self.gen::<f64>() * (max - min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_stream() {
        let mut a = RngManager::new(42);
        let mut b = RngManager::new(42);
        let x: f64 = a.stream("economy").gen();
        let y: f64 = b.stream("economy").gen();
        assert_eq!(x, y);
    }

    #[test]
    fn streams_are_independent() {
        let mut rng = RngManager::new(42);
        let x: u64 = rng.stream("economy").next_u64();
        let y: u64 = rng.stream("population").next_u64();
        assert_ne!(x, y);
    }
}
