use blake2::{Blake2b512, Digest};
use chacha20::ChaCha20;
use chacha20::cipher::{KeyIvInit, StreamCipher};
use zeroize::{Zeroize, Zeroizing};

const KEY_LEN: usize = 32;
const BUFFER_LEN: usize = 1024;

/// Source of uniform draws handed explicitly to every generator call.
pub trait RandomSource {
    /// Uniform integer in `[0, n)`. `n` must be non-zero.
    fn below(&mut self, n: usize) -> usize;

    /// Uniform element of a non-empty slice.
    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T
    where
        Self: Sized,
    {
        &items[self.below(items.len())]
    }
}

/// ChaCha20 keystream sampled with unbiased rejection.
pub struct KeystreamRng {
    cipher: ChaCha20,
    buffer: Zeroizing<Vec<u8>>,
    pos: usize,
}

impl KeystreamRng {
    pub fn from_key(key: &[u8; KEY_LEN]) -> Self {
        let mut cipher = ChaCha20::new(key.into(), &[0u8; 12].into());
        let mut buffer = Zeroizing::new(vec![0u8; BUFFER_LEN]);
        cipher.apply_keystream(&mut buffer);

        Self {
            cipher,
            buffer,
            pos: 0,
        }
    }

    /// Keys the stream from the operating system's entropy source.
    pub fn from_entropy() -> Result<Self, getrandom::Error> {
        let mut key = Zeroizing::new([0u8; KEY_LEN]);
        getrandom::fill(&mut key[..])?;
        Ok(Self::from_key(&key))
    }

    /// Keys the stream from BLAKE2b-512 of `seed`, truncated to 256 bits.
    pub fn from_seed(seed: &[u8]) -> Self {
        let mut digest = Blake2b512::digest(seed);
        let mut key = Zeroizing::new([0u8; KEY_LEN]);
        key.copy_from_slice(&digest[..KEY_LEN]);
        digest.as_mut_slice().zeroize();
        Self::from_key(&key)
    }

    fn next_u32(&mut self) -> u32 {
        if self.pos + 4 > self.buffer.len() {
            self.buffer.fill(0);
            self.cipher.apply_keystream(&mut self.buffer);
            self.pos = 0;
        }

        let bytes = [
            self.buffer[self.pos],
            self.buffer[self.pos + 1],
            self.buffer[self.pos + 2],
            self.buffer[self.pos + 3],
        ];
        self.pos += 4;
        u32::from_le_bytes(bytes)
    }

    fn next_u64(&mut self) -> u64 {
        u64::from(self.next_u32()) | (u64::from(self.next_u32()) << 32)
    }

    fn below_u32(&mut self, n: u32) -> u32 {
        // Largest multiple of n representable in 2^32; draws at or above it are rejected.
        let zone = (1u64 << 32) - ((1u64 << 32) % u64::from(n));

        loop {
            let random_u32 = self.next_u32();
            if u64::from(random_u32) < zone {
                return random_u32 % n;
            }
        }
    }

    fn below_u64(&mut self, n: u64) -> u64 {
        let zone = (1u128 << 64) - ((1u128 << 64) % u128::from(n));

        loop {
            let random_u64 = self.next_u64();
            if u128::from(random_u64) < zone {
                return random_u64 % n;
            }
        }
    }
}

impl RandomSource for KeystreamRng {
    fn below(&mut self, n: usize) -> usize {
        assert!(n > 0, "cannot draw from an empty range");

        match u32::try_from(n) {
            Ok(n) => self.below_u32(n) as usize,
            Err(_) => self.below_u64(n as u64) as usize,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic_from_key() {
        let key = [42u8; 32];
        let mut a = KeystreamRng::from_key(&key);
        let mut b = KeystreamRng::from_key(&key);

        let draws_a: Vec<usize> = (0..500).map(|_| a.below(2048)).collect();
        let draws_b: Vec<usize> = (0..500).map(|_| b.below(2048)).collect();
        assert_eq!(draws_a, draws_b);
    }

    #[test]
    fn test_different_keys_diverge() {
        let mut a = KeystreamRng::from_key(&[1u8; 32]);
        let mut b = KeystreamRng::from_key(&[2u8; 32]);

        let draws_a: Vec<usize> = (0..64).map(|_| a.below(1 << 20)).collect();
        let draws_b: Vec<usize> = (0..64).map(|_| b.below(1 << 20)).collect();
        assert_ne!(draws_a, draws_b);
    }

    #[test]
    fn test_from_seed_is_stable() {
        let mut a = KeystreamRng::from_seed(b"correct horse");
        let mut b = KeystreamRng::from_seed(b"correct horse");
        let mut c = KeystreamRng::from_seed(b"battery staple");

        let draws_a: Vec<usize> = (0..32).map(|_| a.below(91)).collect();
        let draws_b: Vec<usize> = (0..32).map(|_| b.below(91)).collect();
        let draws_c: Vec<usize> = (0..32).map(|_| c.below(91)).collect();
        assert_eq!(draws_a, draws_b);
        assert_ne!(draws_a, draws_c);
    }

    #[test]
    fn test_below_stays_in_range_across_refills() {
        let mut rng = KeystreamRng::from_key(&[7u8; 32]);
        // Several buffers' worth of draws.
        for _ in 0..2000 {
            assert!(rng.below(29) < 29);
        }
        for _ in 0..10 {
            assert_eq!(rng.below(1), 0);
        }
    }

    #[test]
    fn test_every_value_reachable() {
        let mut rng = KeystreamRng::from_key(&[9u8; 32]);
        let mut seen = [false; 10];
        for _ in 0..1000 {
            seen[rng.below(10)] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn test_below_beyond_u32_range() {
        let mut rng = KeystreamRng::from_key(&[5u8; 32]);
        let n = (u32::MAX as usize) * 4 + 3;

        let draws: Vec<usize> = (0..200).map(|_| rng.below(n)).collect();
        assert!(draws.iter().all(|d| *d < n));
        // A 32-bit draw could never land in the upper three quarters.
        assert!(draws.iter().any(|d| *d > u32::MAX as usize));
    }

    #[test]
    fn test_pick() {
        let mut rng = KeystreamRng::from_key(&[3u8; 32]);
        let items = ['a', 'b', 'c'];
        for _ in 0..50 {
            assert!(items.contains(rng.pick(&items)));
        }
    }

    #[test]
    fn test_from_entropy() {
        let mut rng = KeystreamRng::from_entropy().unwrap();
        assert!(rng.below(100) < 100);
    }

    #[test]
    #[should_panic]
    fn test_below_zero_panics() {
        let mut rng = KeystreamRng::from_key(&[0u8; 32]);
        rng.below(0);
    }
}
