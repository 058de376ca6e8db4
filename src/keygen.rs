use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const KEY_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
pub const KEY_LENGTH: usize = 8;

/// Source of synthetic aliases. One generator is shared by every
/// composition of a client; its lock is the only point where concurrent
/// queries synchronize.
pub struct KeyGenerator {
    rng: Mutex<StdRng>,
}

impl KeyGenerator {
    pub fn new() -> KeyGenerator {
        KeyGenerator::from_rng(StdRng::from_os_rng())
    }

    /// A deterministic generator, for reproducible aliases in tests.
    pub fn seeded(seed: u64) -> KeyGenerator {
        KeyGenerator::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> KeyGenerator {
        KeyGenerator { rng: Mutex::new(rng) }
    }

    pub fn next_key(&self) -> String {
        let mut rng = self.rng.lock();
        (0..KEY_LENGTH)
            .map(|_| KEY_CHARS[rng.random_range(0..KEY_CHARS.len())] as char)
            .collect()
    }
}

impl Default for KeyGenerator {
    fn default() -> Self {
        KeyGenerator::new()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;
    use super::*;

    #[test]
    fn keys_use_fixed_alphabet_and_length() {
        let generator = KeyGenerator::new();
        for _ in 0..100 {
            let key = generator.next_key();
            assert_eq!(key.len(), KEY_LENGTH);
            assert!(key.bytes().all(|b| KEY_CHARS.contains(&b)), "{key}");
        }
    }

    #[test]
    fn seeded_generators_repeat() {
        let first = KeyGenerator::seeded(7);
        let second = KeyGenerator::seeded(7);
        assert_eq!(first.next_key(), second.next_key());
    }

    #[test]
    fn concurrent_draws_do_not_repeat() {
        let generator = Arc::new(KeyGenerator::seeded(42));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let generator = Arc::clone(&generator);
                std::thread::spawn(move || (0..64).map(|_| generator.next_key()).collect::<Vec<_>>())
            })
            .collect();

        let keys: Vec<String> = handles.into_iter().flat_map(|h| h.join().unwrap()).collect();
        let unique: HashSet<&String> = keys.iter().collect();
        assert_eq!(unique.len(), keys.len());
    }
}
